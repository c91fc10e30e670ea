use thiserror::Error;

/// Result type returned by every fallible pool operation.
pub type Result<T> = core::result::Result<T, PoolError>;

/// Everything that can go wrong when configuring or using a pool.
///
/// Note that handing a pointer that is not the top of the stack to
/// [`crate::Pool::deallocate`] is *not* an error. That call simply reports
/// `false` and the block stays in the pool until the next reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PoolError {
    /// Zero-sized buffer or zero-sized allocation.
    #[error("requested size must be greater than zero")]
    ZeroSize,

    /// The pool already holds a buffer. Deinitialize it first.
    #[error("pool is already initialized")]
    AlreadyInitialized,

    /// An external buffer was supplied as a null pointer.
    #[error("external buffer pointer is null")]
    NullBuffer,

    /// The memory source could not provide the backing buffer.
    #[error("memory source could not provide {requested} bytes")]
    SourceExhausted {
        /// Size of the buffer we asked for.
        requested: usize,
    },

    /// The pool has no buffer yet (or it was already released).
    #[error("pool is not initialized")]
    Uninitialized,

    /// The request does not fit in what is left of the buffer.
    #[error("out of pool memory: requested {requested} bytes, {available} available")]
    OutOfMemory {
        /// Payload bytes requested.
        requested: usize,
        /// Bytes that were still free at the time of the request.
        available: usize,
    },

    /// The pointer is not the payload of any block living in this pool.
    #[error("pointer {addr:#x} does not belong to a block of this pool")]
    ForeignPointer {
        /// Address of the offending pointer.
        addr: usize,
    },
}
