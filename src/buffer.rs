use std::{marker::PhantomData, mem, ptr::{self, NonNull}, slice};

use crate::{
    error::{PoolError, Result},
    source::MemorySource,
};

/// Size of a machine word, the unit used for block headers.
const WORD: usize = mem::size_of::<usize>();

/// A contiguous byte range that a pool carves blocks from.
///
/// The range is either owned (obtained from a [`MemorySource`] and given back
/// to it later) or borrowed from the caller for `'a`. Either way all access
/// goes through offsets that are checked against `len` before any raw pointer
/// is touched, so a corrupted header can never make us read or write outside
/// the buffer.
///
/// ```text
///  start                                               start + len
///    |                                                      |
///    v                                                      v
///    +------------------------------------------------------+
///    |               bytes addressed by offset              |
///    +------------------------------------------------------+
///    0                                                     len
/// ```
///
/// We keep a raw pointer instead of a `&'a mut [u8]` on purpose: payload
/// pointers handed out to the caller are derived from `start` and must stay
/// usable while we keep writing headers elsewhere in the range.
pub(crate) struct Buffer<'a> {
    /// First byte of the range.
    start: NonNull<u8>,
    /// Length of the range in bytes. Never zero.
    len: usize,
    /// Whether the range came from the pool's memory source.
    owned: bool,
    marker: PhantomData<&'a mut [u8]>,
}

impl<'a> Buffer<'a> {
    /// Wraps a range freshly obtained from a memory source.
    fn owned(start: NonNull<u8>, len: usize) -> Self {
        Self {
            start,
            len,
            owned: true,
            marker: PhantomData,
        }
    }

    /// Wraps a range supplied by the caller. It is never released by us.
    fn borrowed(start: NonNull<u8>, len: usize) -> Self {
        Self {
            start,
            len,
            owned: false,
            marker: PhantomData,
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub(crate) fn is_owned(&self) -> bool {
        self.owned
    }

    /// Pointer to the byte at `offset`. `offset == len` is allowed and gives
    /// the one-past-the-end pointer.
    #[inline]
    pub(crate) fn at(&self, offset: usize) -> NonNull<u8> {
        debug_assert!(offset <= self.len);
        // Safety: offset is within the range or one past its end.
        unsafe { self.start.add(offset) }
    }

    /// Offset of `ptr` inside the buffer, if it points into it (the
    /// one-past-the-end address included).
    pub(crate) fn offset_of(&self, ptr: NonNull<u8>) -> Option<usize> {
        let offset = (ptr.as_ptr() as usize).checked_sub(self.start.as_ptr() as usize)?;

        (offset <= self.len).then_some(offset)
    }

    /// Returns `true` if `offset..offset + count` lies inside the buffer.
    #[inline]
    fn contains(&self, offset: usize, count: usize) -> bool {
        offset
            .checked_add(count)
            .is_some_and(|end| end <= self.len)
    }

    /// Reads the machine word stored at `offset`. Headers are packed with no
    /// padding so the read is unaligned.
    pub(crate) fn read_word(&self, offset: usize) -> Option<usize> {
        if !self.contains(offset, WORD) {
            return None;
        }

        // Safety: the whole word is inside the buffer.
        Some(unsafe { self.at(offset).cast::<usize>().read_unaligned() })
    }

    /// Writes a machine word at `offset`. Returns `false` and writes nothing
    /// if the word does not fit.
    pub(crate) fn write_word(&mut self, offset: usize, value: usize) -> bool {
        if !self.contains(offset, WORD) {
            return false;
        }

        // Safety: the whole word is inside the buffer.
        unsafe { self.at(offset).cast::<usize>().write_unaligned(value) };

        true
    }

    /// Copies `count` bytes from `src` to `dst`, both offsets into this
    /// buffer. The ranges may overlap.
    pub(crate) fn copy(&mut self, src: usize, dst: usize, count: usize) -> bool {
        if !self.contains(src, count) || !self.contains(dst, count) {
            return false;
        }

        // Safety: both ranges were checked above.
        unsafe { ptr::copy(self.at(src).as_ptr(), self.at(dst).as_ptr(), count) };

        true
    }

    /// Shared view of `count` bytes starting at `offset`.
    pub(crate) fn bytes(&self, offset: usize, count: usize) -> Option<&[u8]> {
        self.contains(offset, count)
            .then(|| unsafe { slice::from_raw_parts(self.at(offset).as_ptr(), count) })
    }

    /// Exclusive view of `count` bytes starting at `offset`.
    pub(crate) fn bytes_mut(&mut self, offset: usize, count: usize) -> Option<&mut [u8]> {
        self.contains(offset, count)
            .then(|| unsafe { slice::from_raw_parts_mut(self.at(offset).as_ptr(), count) })
    }
}

/// Owner of a pool's buffer lifecycle: the memory source plus the buffer
/// currently in use, if any.
///
/// Both pool flavours ([`crate::Pool`] and [`crate::Arena`]) delegate
/// `initialize`/`deinitialize` here and only keep their own cursor state.
pub(crate) struct Storage<'a, S: MemorySource> {
    source: S,
    buffer: Option<Buffer<'a>>,
}

impl<'a, S: MemorySource> Storage<'a, S> {
    pub(crate) const fn new(source: S) -> Self {
        Self {
            source,
            buffer: None,
        }
    }

    #[inline]
    pub(crate) fn source(&self) -> &S {
        &self.source
    }

    #[inline]
    pub(crate) fn is_initialized(&self) -> bool {
        self.buffer.is_some()
    }

    pub(crate) fn buffer(&self) -> Result<&Buffer<'a>> {
        self.buffer.as_ref().ok_or(PoolError::Uninitialized)
    }

    pub(crate) fn buffer_mut(&mut self) -> Result<&mut Buffer<'a>> {
        self.buffer.as_mut().ok_or(PoolError::Uninitialized)
    }

    /// Capacity of the current buffer, zero when there is none.
    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.buffer.as_ref().map_or(0, Buffer::len)
    }

    /// Obtains `capacity` bytes from the memory source.
    pub(crate) fn acquire(&mut self, capacity: usize) -> Result<()> {
        if capacity == 0 {
            return Err(PoolError::ZeroSize);
        }
        if self.buffer.is_some() {
            return Err(PoolError::AlreadyInitialized);
        }

        let start = self
            .source
            .acquire(capacity)
            .ok_or(PoolError::SourceExhausted {
                requested: capacity,
            })?;

        log::debug!("acquired {capacity} byte buffer at {start:p}");
        self.buffer = Some(Buffer::owned(start, capacity));

        Ok(())
    }

    /// Adopts a caller supplied range.
    ///
    /// # Safety
    ///
    /// `start` must point to initialized memory valid for reads and writes of
    /// `len` bytes for `'a`, and nothing else may access that memory while the
    /// pool uses it.
    pub(crate) unsafe fn adopt(&mut self, start: *mut u8, len: usize) -> Result<()> {
        let start = NonNull::new(start).ok_or(PoolError::NullBuffer)?;

        if len == 0 {
            return Err(PoolError::ZeroSize);
        }
        if self.buffer.is_some() {
            return Err(PoolError::AlreadyInitialized);
        }

        log::debug!("adopted {len} byte external buffer at {start:p}");
        self.buffer = Some(Buffer::borrowed(start, len));

        Ok(())
    }

    /// Drops the current buffer, handing it back to the source if we own it.
    /// Returns `false` if there was no buffer.
    pub(crate) fn release(&mut self) -> bool {
        let Some(buffer) = self.buffer.take() else {
            return false;
        };

        if buffer.owned {
            // Safety: owned buffers always come from `self.source.acquire`
            // with exactly this length, and the pool forgets it right here.
            unsafe { self.source.release(buffer.start, buffer.len) };
            log::debug!("released {} byte buffer at {:p}", buffer.len, buffer.start);
        } else {
            log::debug!("detached {} byte external buffer at {:p}", buffer.len, buffer.start);
        }

        true
    }
}

impl<S: MemorySource> Drop for Storage<'_, S> {
    fn drop(&mut self) {
        self.release();
    }
}
