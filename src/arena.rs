use std::ptr::NonNull;

use crate::{
    buffer::Storage,
    error::{PoolError, Result},
    source::{Heap, MemorySource},
};

/// Fixed-capacity bump arena without block headers.
///
/// This is the lighter sibling of [`crate::Pool`]: allocations are packed
/// back to back with no length prefix, so nothing is wasted on bookkeeping,
/// but nothing can be reclaimed individually either. Memory only comes back
/// through [`Arena::deallocate_all`].
///
/// ```text
/// +----------------------------------------------------+
/// |  A  |   B   | C |          Free Space              |
/// +----------------------------------------------------+
///               ^   ^
///            latest cursor
/// ```
///
/// The most recent allocation can still be resized in place, since its
/// length is simply `cursor - latest`.
pub struct Arena<'a, S: MemorySource = Heap> {
    storage: Storage<'a, S>,
    cursor: usize,
    /// Start offset of the most recent allocation.
    latest: Option<usize>,
}

// Safety: same reasoning as for `Pool`, the arena is the only owner of its
// buffer.
unsafe impl<S: MemorySource + Send> Send for Arena<'_, S> {}

impl<'a, S: MemorySource + Default> Arena<'a, S> {
    /// Creates an uninitialized arena using the default memory source.
    pub fn new() -> Self {
        Self::with_source(S::default())
    }

    /// Creates an arena and initializes it with a self-owned buffer.
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        let mut arena = Self::new();
        arena.initialize(capacity)?;

        Ok(arena)
    }

    /// Creates an arena working on top of a caller supplied buffer.
    pub fn from_buffer(buffer: &'a mut [u8]) -> Result<Self> {
        let mut arena = Self::new();
        arena.initialize_with(buffer)?;

        Ok(arena)
    }
}

impl<S: MemorySource + Default> Default for Arena<'_, S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, S: MemorySource> Arena<'a, S> {
    /// Creates an uninitialized arena that will take its buffer from `source`.
    pub const fn with_source(source: S) -> Self {
        Self {
            storage: Storage::new(source),
            cursor: 0,
            latest: None,
        }
    }

    /// The memory source this arena was configured with.
    pub fn source(&self) -> &S {
        self.storage.source()
    }

    /// See [`crate::Pool::initialize`].
    pub fn initialize(&mut self, capacity: usize) -> Result<()> {
        self.storage.acquire(capacity)?;
        self.reset();

        Ok(())
    }

    /// See [`crate::Pool::initialize_with`].
    pub fn initialize_with(&mut self, buffer: &'a mut [u8]) -> Result<()> {
        unsafe { self.initialize_raw(buffer.as_mut_ptr(), buffer.len()) }
    }

    /// See [`crate::Pool::initialize_raw`].
    ///
    /// # Safety
    ///
    /// `start` must point to initialized memory valid for reads and writes of
    /// `len` bytes for `'a`, and must not be accessed by anything else while
    /// the arena uses it.
    pub unsafe fn initialize_raw(&mut self, start: *mut u8, len: usize) -> Result<()> {
        unsafe { self.storage.adopt(start, len)? };
        self.reset();

        Ok(())
    }

    /// Stops using the buffer, releasing it if the arena owns it. Does nothing
    /// on an uninitialized arena.
    pub fn deinitialize(&mut self) {
        if self.storage.release() {
            self.reset();
        }
    }

    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.storage.is_initialized()
    }

    /// Whether the buffer came from the memory source.
    pub fn owns_buffer(&self) -> bool {
        self.storage.buffer().is_ok_and(|buffer| buffer.is_owned())
    }

    /// Total size of the buffer. Zero when uninitialized.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.storage.capacity()
    }

    #[inline]
    pub fn bytes_used(&self) -> usize {
        self.cursor
    }

    #[inline]
    pub fn bytes_free(&self) -> usize {
        self.capacity() - self.cursor
    }

    /// Bumps the cursor by `size` bytes and returns where it was.
    pub fn allocate(&mut self, size: usize) -> Result<NonNull<u8>> {
        if size == 0 {
            return Err(PoolError::ZeroSize);
        }

        let buffer = self.storage.buffer()?;
        let available = buffer.len() - self.cursor;

        if size > available {
            return Err(PoolError::OutOfMemory {
                requested: size,
                available,
            });
        }

        let ptr = buffer.at(self.cursor);
        self.latest = Some(self.cursor);
        self.cursor += size;

        log::trace!("arena allocated {size} bytes, {} used", self.cursor);

        Ok(ptr)
    }

    /// Never reclaims anything, the arena does not know block sizes. Always
    /// returns `false`.
    pub fn deallocate(&mut self, ptr: NonNull<u8>) -> bool {
        log::trace!("arena left {ptr:p} in place");
        false
    }

    /// Resizes the allocation at `ptr` from `old_size` to `new_size` bytes.
    ///
    /// The arena records no lengths, so the caller passes the size the block
    /// currently has (the same contract as [`std::alloc::GlobalAlloc::realloc`]).
    ///
    /// - `ptr == None` allocates `new_size` bytes.
    /// - `new_size == 0` returns `Ok(None)` and reclaims nothing.
    /// - The most recent allocation is resized in place.
    /// - Anything else is moved to a new allocation and the first
    ///   `min(old_size, new_size)` bytes are copied over.
    pub fn reallocate(
        &mut self,
        ptr: Option<NonNull<u8>>,
        old_size: usize,
        new_size: usize,
    ) -> Result<Option<NonNull<u8>>> {
        let Some(ptr) = ptr else {
            return self.allocate(new_size).map(Some);
        };

        let buffer = self.storage.buffer()?;

        if new_size == 0 {
            return Ok(None);
        }

        let offset = buffer.offset_of(ptr).ok_or(PoolError::ForeignPointer {
            addr: ptr.as_ptr() as usize,
        })?;

        if self.latest == Some(offset) {
            let available = buffer.len() - offset;
            if new_size > available {
                return Err(PoolError::OutOfMemory {
                    requested: new_size,
                    available,
                });
            }

            self.cursor = offset + new_size;
            log::trace!("arena resized latest allocation to {new_size} bytes");

            return Ok(Some(ptr));
        }

        // Whatever follows `ptr` is not ours to read.
        let count = old_size.min(new_size).min(self.cursor.saturating_sub(offset));

        let new = self.allocate(new_size)?;
        let buffer = self.storage.buffer_mut()?;
        let dst = buffer.offset_of(new).ok_or(PoolError::Uninitialized)?;
        buffer.copy(offset, dst, count);

        Ok(Some(new))
    }

    /// Empties the arena. Capacity and buffer ownership are kept.
    pub fn deallocate_all(&mut self) {
        log::trace!("arena reset, {} bytes reclaimed", self.cursor);
        self.reset();
    }

    fn reset(&mut self) {
        self.cursor = 0;
        self.latest = None;
    }
}
