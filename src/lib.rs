//! Fixed-capacity memory pools with stack (LIFO) discipline.
//!
//! A [`Pool`] reserves one contiguous buffer up front and carves blocks out
//! of it one after the other. There is no free list and no search: allocating
//! is just writing a header and moving a cursor forward. The price is that
//! only the most recent block can be given back or resized in place, exactly
//! like a stack.
//!
//! ```text
//!   Pool buffer:
//!
//!   +-------------------------------------------------------------------+
//!   | len | payload A | len |  payload B  | len | C |    Free Space     |
//!   +-------------------------------------------------------------------+
//!   0                                     ^         ^              capacity
//!                                         |         |
//!                                       latest    cursor
//! ```
//!
//! Every block is prefixed by a one word header holding its payload length.
//! Those headers are the only metadata in the buffer. Going back one block
//! after a deallocation therefore means walking the chain of headers from the
//! start of the buffer.
//!
//! ## Crate Structure
//!
//! ```text
//!   stackpool
//!   ├── pool    - Pool, the header-prefixed stack pool
//!   ├── arena   - Arena, the header-less bump flavour
//!   ├── block   - Block views and the chain walk
//!   ├── source  - MemorySource capability (Heap, Pages)
//!   ├── buffer  - Bounds-checked access to the backing buffer (internal)
//!   └── error   - PoolError
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use stackpool::{Pool, HEADER_SIZE};
//!
//! # fn main() -> stackpool::Result<()> {
//! let mut pool: Pool = Pool::with_capacity(64)?;
//!
//! let a = pool.allocate(10)?;
//! let b = pool.allocate(20)?;
//! assert_eq!(30 + 2 * HEADER_SIZE, pool.bytes_used());
//!
//! // Out of order: accepted, but nothing is reclaimed.
//! assert!(!pool.deallocate(a));
//!
//! // Stack order: both come back.
//! assert!(pool.deallocate(b));
//! assert!(pool.deallocate(a));
//! assert_eq!(0, pool.bytes_used());
//! # Ok(())
//! # }
//! ```
//!
//! ## Limitations
//!
//! - **Single owner**: pools can move between threads but are never shared.
//! - **Stack reclamation only**: out of order frees leak until
//!   [`Pool::deallocate_all`].
//! - **No alignment**: blocks are packed, payload pointers are byte aligned.

mod arena;
mod block;
mod buffer;
mod error;
mod pool;
pub mod source;

pub use arena::Arena;
pub use block::{Block, Blocks, HEADER_SIZE};
pub use error::{PoolError, Result};
pub use pool::Pool;
#[cfg(any(unix, windows))]
pub use source::Pages;
pub use source::{Heap, MemorySource};
