//! Where a pool gets its backing buffer from.
//!
//! A pool never talks to the system allocator or to the kernel directly. It is
//! handed a [`MemorySource`] at construction time and calls it exactly twice
//! during a buffer's life: once in `initialize` to [`acquire`] the bytes and
//! once in `deinitialize` (or on drop) to [`release`] them. Buffers supplied
//! by the caller never go through the source at all.
//!
//! Two sources are provided:
//!
//! - [`Heap`], the Rust global allocator. This is the default.
//! - [`Pages`], whole pages mapped straight from the OS (`mmap` on unix,
//!   `VirtualAlloc` on Windows).
//!
//! Anything else (a static arena, a test double that counts calls) only has
//! to implement the trait.
//!
//! [`acquire`]: MemorySource::acquire
//! [`release`]: MemorySource::release

use std::{alloc::{self, Layout}, mem, ptr::NonNull};

/// Alignment of buffers handed out by [`Heap`]. Block headers are machine
/// words, so we at least give the first one its natural alignment.
pub const BUFFER_ALIGN: usize = mem::align_of::<usize>();

/// Capability to obtain and give back raw byte buffers.
///
/// # Safety
///
/// Implementors must guarantee that a pointer returned by [`acquire`] is
/// valid for reads and writes of `len` bytes and stays valid until it is
/// passed back to [`release`]. The whole range must be initialized (zeroed
/// memory is fine), since the pool hands out payloads as `&[u8]` before
/// anything was written to them.
///
/// [`acquire`]: MemorySource::acquire
/// [`release`]: MemorySource::release
pub unsafe trait MemorySource {
    /// Request a buffer of `len` bytes. `len` is never zero.
    ///
    /// Returns `None` if the memory could not be provided.
    fn acquire(&self, len: usize) -> Option<NonNull<u8>>;

    /// Give back a buffer previously returned by [`MemorySource::acquire`].
    ///
    /// # Safety
    ///
    /// `addr` and `len` must be exactly what a previous call to `acquire` on
    /// this same source returned and requested, and the buffer must not be
    /// used afterwards.
    unsafe fn release(&self, addr: NonNull<u8>, len: usize);
}

unsafe impl<S: MemorySource + ?Sized> MemorySource for &S {
    fn acquire(&self, len: usize) -> Option<NonNull<u8>> {
        (**self).acquire(len)
    }

    unsafe fn release(&self, addr: NonNull<u8>, len: usize) {
        unsafe { (**self).release(addr, len) }
    }
}

/// Memory source backed by the Rust global allocator.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Heap;

unsafe impl MemorySource for Heap {
    fn acquire(&self, len: usize) -> Option<NonNull<u8>> {
        if len == 0 {
            return None;
        }

        let layout = Layout::from_size_align(len, BUFFER_ALIGN).ok()?;

        // Safety: layout has a non-zero size.
        NonNull::new(unsafe { alloc::alloc_zeroed(layout) })
    }

    unsafe fn release(&self, addr: NonNull<u8>, len: usize) {
        // Same layout as in `acquire`, so this can only fail if the caller
        // broke the contract.
        if let Ok(layout) = Layout::from_size_align(len, BUFFER_ALIGN) {
            unsafe { alloc::dealloc(addr.as_ptr(), layout) }
        }
    }
}

/// Memory source that maps whole pages from the operating system.
///
/// Fresh anonymous mappings are zero filled by the OS.
///
/// The requested length is rounded up to a multiple of the page size before
/// the mapping is made. The pool still only uses the bytes it asked for.
#[cfg(any(unix, windows))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Pages;

#[cfg(any(unix, windows))]
impl Pages {
    /// Virtual memory page size of the computer. This is usually 4096.
    pub fn page_size() -> usize {
        use std::sync::OnceLock;

        static PAGE_SIZE: OnceLock<usize> = OnceLock::new();

        *PAGE_SIZE.get_or_init(|| unsafe { platform::page_size() })
    }

    /// Length of the mapping made for a request of `len` bytes.
    pub fn mapped_len(len: usize) -> Option<usize> {
        round_up(len, Self::page_size())
    }
}

#[cfg(any(unix, windows))]
unsafe impl MemorySource for Pages {
    fn acquire(&self, len: usize) -> Option<NonNull<u8>> {
        if len == 0 {
            return None;
        }

        let mapped = Self::mapped_len(len)?;
        let addr = unsafe { platform::request_memory(mapped) }?;

        log::debug!("mapped {mapped} bytes at {addr:p} for a {len} byte request");

        Some(addr)
    }

    unsafe fn release(&self, addr: NonNull<u8>, len: usize) {
        if let Some(mapped) = Self::mapped_len(len) {
            unsafe { platform::return_memory(addr, mapped) };
            log::debug!("unmapped {mapped} bytes at {addr:p}");
        }
    }
}

/// Rounds `value` up to the next multiple of `alignment`, which must be a
/// power of two. Returns `None` on overflow.
#[cfg(any(unix, windows))]
fn round_up(value: usize, alignment: usize) -> Option<usize> {
    value
        .checked_add(alignment - 1)
        .map(|value| value & !(alignment - 1))
}

#[cfg(unix)]
mod platform {
    use std::{os::raw::{c_int, c_void}, ptr::{self, NonNull}};

    use libc::{mmap, munmap, off_t, size_t};

    pub(super) unsafe fn request_memory(len: usize) -> Option<NonNull<u8>> {
        // Read-Write only memory, not backed by any file.
        const PROT: c_int = libc::PROT_READ | libc::PROT_WRITE;
        const FLAGS: c_int = libc::MAP_PRIVATE | libc::MAP_ANONYMOUS;
        const FD: c_int = -1;
        const OFFSET: off_t = 0;

        unsafe {
            match mmap(ptr::null_mut(), len as size_t, PROT, FLAGS, FD, OFFSET) {
                libc::MAP_FAILED => None,
                addr => NonNull::new(addr.cast::<u8>()),
            }
        }
    }

    pub(super) unsafe fn return_memory(addr: NonNull<u8>, len: usize) {
        if unsafe { munmap(addr.as_ptr().cast::<c_void>(), len as size_t) } != 0 {
            log::error!("munmap of {len} bytes at {addr:p} failed");
        }
    }

    pub(super) unsafe fn page_size() -> usize {
        unsafe { libc::sysconf(libc::_SC_PAGE_SIZE) as usize }
    }
}

#[cfg(windows)]
mod platform {
    use std::{mem::MaybeUninit, os::raw::c_void, ptr::NonNull};

    use windows::Win32::System::{Memory, SystemInformation};

    pub(super) unsafe fn request_memory(len: usize) -> Option<NonNull<u8>> {
        let flags = Memory::MEM_RESERVE | Memory::MEM_COMMIT;

        unsafe { NonNull::new(Memory::VirtualAlloc(None, len, flags, Memory::PAGE_READWRITE).cast()) }
    }

    pub(super) unsafe fn return_memory(addr: NonNull<u8>, _len: usize) {
        // MEM_RELEASE frees the whole reservation, size must be zero.
        if let Err(err) =
            unsafe { Memory::VirtualFree(addr.as_ptr().cast::<c_void>(), 0, Memory::MEM_RELEASE) }
        {
            log::error!("VirtualFree at {addr:p} failed: {err}");
        }
    }

    pub(super) unsafe fn page_size() -> usize {
        unsafe {
            let mut system_info = MaybeUninit::uninit();
            SystemInformation::GetSystemInfo(system_info.as_mut_ptr());

            system_info.assume_init().dwPageSize as usize
        }
    }
}
