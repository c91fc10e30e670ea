use std::ptr::NonNull;

use crate::{
    block::{Block, Blocks, HEADER_SIZE},
    buffer::Storage,
    error::{PoolError, Result},
    source::{Heap, MemorySource},
};

/// Fixed-capacity pool with stack (LIFO) reclamation.
///
/// The pool carves length-prefixed blocks out of one contiguous buffer, one
/// after the other, with no gaps and no padding. Besides the buffer itself it
/// only remembers two offsets: the `cursor`, where the next block will start,
/// and the header of the `latest` surviving block.
///
/// ```text
///   latest
///     |
/// +---|---------------------------------------------------+
/// | H | A  | H |  B  | H |   C    |      Free Space       |
/// +---------------------------------------------------------+
/// 0                  ^            ^                     capacity
///                    |          cursor
///              previous block
///           (found by rescanning)
/// ```
///
/// Only the latest block can be given back or resized in place. Freeing any
/// other block is accepted but does nothing: its bytes stay used until
/// [`Pool::deallocate_all`] resets the whole pool.
///
/// A pool is meant to have a single owner. It can be sent to another thread
/// but it is never shared between threads.
pub struct Pool<'a, S: MemorySource = Heap> {
    storage: Storage<'a, S>,
    /// Offset one past the occupied prefix of the buffer.
    cursor: usize,
    /// Header offset of the most recent surviving block.
    latest: Option<usize>,
}

// Safety: the pool is the only owner of its buffer, moving it to another
// thread moves that ownership along. Nothing in it is shared.
unsafe impl<S: MemorySource + Send> Send for Pool<'_, S> {}

impl<'a, S: MemorySource + Default> Pool<'a, S> {
    /// Creates an uninitialized pool using the default memory source.
    pub fn new() -> Self {
        Self::with_source(S::default())
    }

    /// Creates a pool and initializes it with a self-owned buffer.
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        let mut pool = Self::new();
        pool.initialize(capacity)?;

        Ok(pool)
    }

    /// Creates a pool working on top of a caller supplied buffer.
    pub fn from_buffer(buffer: &'a mut [u8]) -> Result<Self> {
        let mut pool = Self::new();
        pool.initialize_with(buffer)?;

        Ok(pool)
    }
}

impl<S: MemorySource + Default> Default for Pool<'_, S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, S: MemorySource> Pool<'a, S> {
    /// Creates an uninitialized pool that will take its buffer from `source`.
    pub const fn with_source(source: S) -> Self {
        Self {
            storage: Storage::new(source),
            cursor: 0,
            latest: None,
        }
    }

    /// The memory source this pool was configured with.
    pub fn source(&self) -> &S {
        self.storage.source()
    }

    /// Obtains `capacity` bytes from the memory source and starts using them.
    ///
    /// Fails if `capacity` is zero, if the pool is already initialized or if
    /// the source cannot provide the memory. The pool is left untouched on
    /// failure.
    pub fn initialize(&mut self, capacity: usize) -> Result<()> {
        self.storage.acquire(capacity)?;
        self.reset();

        Ok(())
    }

    /// Starts using a buffer supplied by the caller. The pool borrows it for
    /// its whole lifetime and never releases it.
    pub fn initialize_with(&mut self, buffer: &'a mut [u8]) -> Result<()> {
        // Safety: the exclusive borrow is held by the pool for 'a.
        unsafe { self.initialize_raw(buffer.as_mut_ptr(), buffer.len()) }
    }

    /// Starts using the raw byte range `start..start + len`.
    ///
    /// Fails with [`PoolError::NullBuffer`] if `start` is null.
    ///
    /// # Safety
    ///
    /// `start` must point to initialized memory valid for reads and writes of
    /// `len` bytes for `'a`, and must not be accessed by anything else while
    /// the pool uses it.
    pub unsafe fn initialize_raw(&mut self, start: *mut u8, len: usize) -> Result<()> {
        unsafe { self.storage.adopt(start, len)? };
        self.reset();

        Ok(())
    }

    /// Stops using the buffer, releasing it if it was obtained from the
    /// memory source. Every pointer handed out by the pool becomes dangling.
    ///
    /// Calling this on an uninitialized pool does nothing.
    pub fn deinitialize(&mut self) {
        if self.storage.release() {
            self.reset();
        }
    }

    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.storage.is_initialized()
    }

    /// Whether the buffer was obtained from the memory source (and will be
    /// released by the pool) rather than supplied by the caller.
    pub fn owns_buffer(&self) -> bool {
        self.storage.buffer().is_ok_and(|buffer| buffer.is_owned())
    }

    /// Total size of the buffer. Zero when uninitialized.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.storage.capacity()
    }

    /// Bytes taken by blocks, headers included.
    #[inline]
    pub fn bytes_used(&self) -> usize {
        self.cursor
    }

    #[inline]
    pub fn bytes_free(&self) -> usize {
        self.capacity() - self.cursor
    }

    /// The most recently allocated block that is still alive.
    pub fn latest_block(&self) -> Option<Block> {
        let buffer = self.storage.buffer().ok()?;

        self.latest
            .and_then(|offset| Block::read(buffer, offset, self.cursor))
    }

    /// Every block currently in the pool, oldest first. Blocks that were
    /// "freed" out of order are still listed, since they still take space.
    pub fn blocks(&self) -> Blocks<'_, 'a> {
        Blocks::new(self.storage.buffer().ok(), self.cursor)
    }

    /// Allocates `size` usable bytes.
    ///
    /// The block takes `size + HEADER_SIZE` bytes of the buffer. The returned
    /// pointer is not aligned in general.
    pub fn allocate(&mut self, size: usize) -> Result<NonNull<u8>> {
        if size == 0 {
            return Err(PoolError::ZeroSize);
        }

        let buffer = self.storage.buffer_mut()?;
        let available = buffer.len() - self.cursor;

        let header = self.cursor;
        let end = size
            .checked_add(HEADER_SIZE)
            .filter(|&needed| needed <= available)
            .map(|needed| header + needed)
            .ok_or(PoolError::OutOfMemory {
                requested: size,
                available,
            })?;

        buffer.write_word(header, size);
        let payload = buffer.at(header + HEADER_SIZE);

        self.latest = Some(header);
        self.cursor = end;

        log::trace!("allocated {size} bytes at offset {header}, {} used", self.cursor);

        Ok(payload)
    }

    /// Gives back the block whose payload starts at `ptr`.
    ///
    /// Only the latest block can actually be reclaimed. For any other pointer
    /// (including pointers that never came from this pool) nothing happens
    /// and `false` is returned: the block keeps its space until the next
    /// [`Pool::deallocate_all`].
    pub fn deallocate(&mut self, ptr: NonNull<u8>) -> bool {
        let Some(top) = self.top_block(ptr) else {
            log::trace!("{ptr:p} is not the latest block, left in place");
            return false;
        };

        self.cursor = top.header_offset();

        // The pool keeps no backward links, so the new latest block is the
        // last one found walking the chain up to the new cursor.
        self.latest = self.blocks().last().map(|block| block.header_offset());

        log::trace!(
            "reclaimed {} bytes at offset {}, {} used",
            top.len(),
            top.header_offset(),
            self.cursor
        );

        true
    }

    /// Resizes the block at `ptr` to `size` bytes.
    ///
    /// - `ptr == None` allocates a new block.
    /// - `size == 0` deallocates `ptr` and returns `Ok(None)`.
    /// - If `ptr` is the latest block it is resized in place and `ptr` is
    ///   returned.
    /// - Otherwise a new block is allocated and the first
    ///   `min(old len, size)` bytes are copied over. The old block is left in
    ///   place, exactly like a [`Pool::deallocate`] of a non-latest block.
    ///
    /// On failure the pool is left unchanged.
    pub fn reallocate(
        &mut self,
        ptr: Option<NonNull<u8>>,
        size: usize,
    ) -> Result<Option<NonNull<u8>>> {
        let Some(ptr) = ptr else {
            return self.allocate(size).map(Some);
        };

        self.storage.buffer()?;

        if size == 0 {
            self.deallocate(ptr);
            return Ok(None);
        }

        if let Some(top) = self.top_block(ptr) {
            let buffer = self.storage.buffer_mut()?;
            let available = buffer.len() - top.payload_offset();

            if size > available {
                return Err(PoolError::OutOfMemory {
                    requested: size,
                    available,
                });
            }

            buffer.write_word(top.header_offset(), size);
            self.cursor = top.payload_offset() + size;

            log::trace!(
                "resized block at offset {} from {} to {size} bytes",
                top.header_offset(),
                top.len()
            );

            return Ok(Some(ptr));
        }

        let old = self.find_block(ptr)?;
        let new = self.allocate(size)?;

        let buffer = self.storage.buffer_mut()?;
        let dst = buffer.offset_of(new).ok_or(PoolError::Uninitialized)?;
        buffer.copy(old.payload_offset(), dst, old.len().min(size));

        log::trace!(
            "relocated block at offset {} to offset {}",
            old.header_offset(),
            dst - HEADER_SIZE
        );

        Ok(Some(new))
    }

    /// Empties the pool in one go. Capacity and buffer ownership are kept.
    pub fn deallocate_all(&mut self) {
        log::trace!("reset, {} bytes reclaimed", self.cursor);
        self.reset();
    }

    /// Payload of the live block starting at `ptr`.
    pub fn payload(&self, ptr: NonNull<u8>) -> Option<&[u8]> {
        let block = self.find_block(ptr).ok()?;

        self.storage.buffer().ok()?.bytes(block.payload_offset(), block.len())
    }

    /// Mutable payload of the live block starting at `ptr`.
    pub fn payload_mut(&mut self, ptr: NonNull<u8>) -> Option<&mut [u8]> {
        let block = self.find_block(ptr).ok()?;

        self.storage.buffer_mut().ok()?.bytes_mut(block.payload_offset(), block.len())
    }

    /// The latest block, if `ptr` is its payload.
    fn top_block(&self, ptr: NonNull<u8>) -> Option<Block> {
        let buffer = self.storage.buffer().ok()?;

        self.latest_block()
            .filter(|block| buffer.at(block.payload_offset()) == ptr)
    }

    /// Looks for the block whose payload starts at `ptr` by walking the chain.
    fn find_block(&self, ptr: NonNull<u8>) -> Result<Block> {
        let foreign = PoolError::ForeignPointer {
            addr: ptr.as_ptr() as usize,
        };
        let offset = self.storage.buffer()?.offset_of(ptr).ok_or(foreign)?;

        self.blocks()
            .take_while(|block| block.payload_offset() <= offset)
            .find(|block| block.payload_offset() == offset)
            .ok_or(foreign)
    }

    fn reset(&mut self) {
        self.cursor = 0;
        self.latest = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    /// Heap backed source that counts how often it is called.
    #[derive(Default)]
    struct Counting {
        acquired: Cell<usize>,
        released: Cell<usize>,
    }

    unsafe impl MemorySource for Counting {
        fn acquire(&self, len: usize) -> Option<NonNull<u8>> {
            self.acquired.set(self.acquired.get() + 1);
            Heap.acquire(len)
        }

        unsafe fn release(&self, addr: NonNull<u8>, len: usize) {
            self.released.set(self.released.get() + 1);
            unsafe { Heap.release(addr, len) }
        }
    }

    /// Source that never has any memory to give.
    #[derive(Default)]
    struct Exhausted;

    unsafe impl MemorySource for Exhausted {
        fn acquire(&self, _len: usize) -> Option<NonNull<u8>> {
            None
        }

        unsafe fn release(&self, _addr: NonNull<u8>, _len: usize) {
            unreachable!("nothing was ever acquired");
        }
    }

    fn offset(pool: &Pool<'_, impl MemorySource>, ptr: NonNull<u8>) -> usize {
        pool.storage.buffer().unwrap().offset_of(ptr).unwrap()
    }

    #[test]
    fn lifo_scenario() {
        let mut pool: Pool = Pool::with_capacity(64).unwrap();

        let a = pool.allocate(10).unwrap();
        let b = pool.allocate(20).unwrap();
        assert_eq!(10 + 20 + 2 * HEADER_SIZE, pool.bytes_used());
        assert_eq!(64 - pool.bytes_used(), pool.bytes_free());

        assert!(pool.deallocate(b));
        assert_eq!(10 + HEADER_SIZE, pool.bytes_used());
        assert_eq!(Some(0), pool.latest_block().map(|block| block.header_offset()));
        assert_eq!(Some(10), pool.latest_block().map(|block| block.len()));

        assert!(pool.deallocate(a));
        assert_eq!(0, pool.bytes_used());
        assert_eq!(None, pool.latest_block());
    }

    #[test]
    fn rescan_finds_the_previous_block() {
        let mut pool: Pool = Pool::with_capacity(256).unwrap();

        let ptrs: Vec<_> = [3, 17, 1, 40, 8]
            .into_iter()
            .map(|size| pool.allocate(size).unwrap())
            .collect();

        for (i, &ptr) in ptrs.iter().enumerate().rev() {
            let used = pool.bytes_used();
            let len = pool.latest_block().unwrap().len();

            assert!(pool.deallocate(ptr));
            assert_eq!(used - len - HEADER_SIZE, pool.bytes_used());

            match i {
                0 => assert_eq!(None, pool.latest_block()),
                _ => assert_eq!(
                    offset(&pool, ptrs[i - 1]) - HEADER_SIZE,
                    pool.latest_block().unwrap().header_offset()
                ),
            }
        }
    }

    #[test]
    fn allocations_do_not_overlap() {
        let mut pool: Pool = Pool::with_capacity(200).unwrap();
        let sizes = [1, 7, 8, 9, 31];

        let ptrs: Vec<_> = sizes
            .iter()
            .enumerate()
            .map(|(i, &size)| {
                let ptr = pool.allocate(size).unwrap();
                pool.payload_mut(ptr).unwrap().fill(i as u8);
                ptr
            })
            .collect();

        for (i, (&ptr, &size)) in ptrs.iter().zip(&sizes).enumerate() {
            let payload = pool.payload(ptr).unwrap();
            assert_eq!(size, payload.len());
            assert!(payload.iter().all(|&byte| byte == i as u8));
        }

        let blocks: Vec<_> = pool.blocks().collect();
        assert_eq!(sizes.len(), blocks.len());
        assert_eq!(pool.bytes_used(), blocks.last().unwrap().end());
    }

    #[test]
    fn allocation_beyond_capacity_fails_cleanly() {
        let mut pool: Pool = Pool::with_capacity(32).unwrap();
        let a = pool.allocate(8).unwrap();

        let used = pool.bytes_used();
        let available = pool.bytes_free();

        assert_eq!(
            Err(PoolError::OutOfMemory {
                requested: available - HEADER_SIZE + 1,
                available,
            }),
            pool.allocate(available - HEADER_SIZE + 1)
        );
        assert_eq!(
            Err(PoolError::OutOfMemory {
                requested: usize::MAX,
                available,
            }),
            pool.allocate(usize::MAX)
        );
        assert_eq!(used, pool.bytes_used());
        assert_eq!(offset(&pool, a) - HEADER_SIZE, pool.latest_block().unwrap().header_offset());

        // Exactly filling the pool is fine.
        pool.allocate(available - HEADER_SIZE).unwrap();
        assert_eq!(0, pool.bytes_free());
    }

    #[test]
    fn zero_and_uninitialized_requests_fail() {
        let mut pool: Pool = Pool::new();
        assert_eq!(Err(PoolError::Uninitialized), pool.allocate(4));
        assert_eq!(0, pool.capacity());
        assert_eq!(0, pool.bytes_free());

        pool.initialize(16).unwrap();
        assert_eq!(Err(PoolError::ZeroSize), pool.allocate(0));
    }

    #[test]
    fn out_of_order_deallocate_is_ignored() {
        let mut pool: Pool = Pool::with_capacity(64).unwrap();
        let a = pool.allocate(4).unwrap();
        let b = pool.allocate(4).unwrap();

        let used = pool.bytes_used();
        let latest = pool.latest_block();

        assert!(!pool.deallocate(a));
        assert!(!pool.deallocate(a));
        assert!(!pool.deallocate(NonNull::dangling()));
        assert_eq!(used, pool.bytes_used());
        assert_eq!(latest, pool.latest_block());

        // Stack order still works afterwards, `a` is stuck until a reset.
        assert!(pool.deallocate(b));
        assert!(pool.deallocate(a));
        assert_eq!(0, pool.bytes_used());
    }

    #[test]
    fn deallocate_on_uninitialized_pool_is_a_no_op() {
        let mut pool: Pool = Pool::new();
        assert!(!pool.deallocate(NonNull::dangling()));
    }

    #[test]
    fn resize_latest_in_place() {
        let mut pool: Pool = Pool::with_capacity(64).unwrap();
        let _a = pool.allocate(4).unwrap();
        let b = pool.allocate(10).unwrap();
        pool.payload_mut(b).unwrap().copy_from_slice(b"0123456789");

        assert_eq!(Ok(Some(b)), pool.reallocate(Some(b), 4));
        assert_eq!(Some(&b"0123"[..]), pool.payload(b));
        assert_eq!(4 + 4 + 2 * HEADER_SIZE, pool.bytes_used());

        let grown = 64 - (4 + 2 * HEADER_SIZE);
        assert_eq!(Ok(Some(b)), pool.reallocate(Some(b), grown));
        assert_eq!(0, pool.bytes_free());
        assert_eq!(&b"0123"[..], &pool.payload(b).unwrap()[..4]);

        let used = pool.bytes_used();
        assert_eq!(
            Err(PoolError::OutOfMemory {
                requested: grown + 1,
                available: grown,
            }),
            pool.reallocate(Some(b), grown + 1)
        );
        assert_eq!(used, pool.bytes_used());
        assert_eq!(grown, pool.latest_block().unwrap().len());
    }

    #[test]
    fn shrinking_relocation_copies_the_new_size_only() {
        let mut pool: Pool = Pool::with_capacity(128).unwrap();
        let a = pool.allocate(10).unwrap();
        pool.payload_mut(a).unwrap().copy_from_slice(b"abcdefghij");
        let b = pool.allocate(5).unwrap();
        pool.payload_mut(b).unwrap().fill(b'-');

        let c = pool.reallocate(Some(a), 8).unwrap().unwrap();

        assert_ne!(a, c);
        assert_eq!(Some(&b"abcdefgh"[..]), pool.payload(c));
        // `a` and `b` are untouched and `a` is not reclaimed.
        assert_eq!(Some(&b"abcdefghij"[..]), pool.payload(a));
        assert_eq!(Some(&b"-----"[..]), pool.payload(b));
        assert_eq!(10 + 5 + 8 + 3 * HEADER_SIZE, pool.bytes_used());
        assert_eq!(offset(&pool, c) - HEADER_SIZE, pool.latest_block().unwrap().header_offset());
    }

    #[test]
    fn growing_relocation_keeps_old_contents() {
        let mut pool: Pool = Pool::with_capacity(128).unwrap();
        let a = pool.allocate(3).unwrap();
        pool.payload_mut(a).unwrap().copy_from_slice(b"xyz");
        pool.allocate(1).unwrap();

        let c = pool.reallocate(Some(a), 6).unwrap().unwrap();
        assert_eq!(&b"xyz"[..], &pool.payload(c).unwrap()[..3]);
    }

    #[test]
    fn failed_relocation_changes_nothing() {
        let mut pool: Pool = Pool::with_capacity(48).unwrap();
        let a = pool.allocate(4).unwrap();
        pool.allocate(4).unwrap();

        let used = pool.bytes_used();
        assert!(matches!(
            pool.reallocate(Some(a), 48),
            Err(PoolError::OutOfMemory { requested: 48, .. })
        ));
        assert_eq!(used, pool.bytes_used());

        let inside_payload = NonNull::new(a.as_ptr().wrapping_add(1)).unwrap();
        assert_eq!(
            Err(PoolError::ForeignPointer {
                addr: inside_payload.as_ptr() as usize
            }),
            pool.reallocate(Some(inside_payload), 2)
        );
        assert_eq!(used, pool.bytes_used());
    }

    #[test]
    fn reallocate_edge_cases() {
        let mut pool: Pool = Pool::with_capacity(64).unwrap();

        let a = pool.reallocate(None, 12).unwrap().unwrap();
        assert_eq!(12 + HEADER_SIZE, pool.bytes_used());

        assert_eq!(Ok(None), pool.reallocate(Some(a), 0));
        assert_eq!(0, pool.bytes_used());
        assert_eq!(Err(PoolError::ZeroSize), pool.reallocate(None, 0));

        pool.deinitialize();
        assert_eq!(Err(PoolError::Uninitialized), pool.reallocate(None, 4));
        assert_eq!(Err(PoolError::Uninitialized), pool.reallocate(Some(a), 4));
        assert_eq!(Err(PoolError::Uninitialized), pool.reallocate(Some(a), 0));
    }

    #[test]
    fn fresh_payloads_read_as_zero() {
        for _ in 0..16 {
            // Leave stale bytes behind in the global allocator.
            drop(vec![0xAAu8; 4096]);

            let mut pool: Pool = Pool::with_capacity(4096).unwrap();
            let ptr = pool.allocate(64).unwrap();
            assert!(pool.payload(ptr).unwrap().iter().all(|&byte| byte == 0));
        }
    }

    #[test]
    fn reset_then_fill_whole_pool() {
        let mut pool: Pool = Pool::with_capacity(64).unwrap();
        let first = pool.allocate(5).unwrap();
        pool.allocate(9).unwrap();

        pool.deallocate_all();
        assert_eq!(0, pool.bytes_used());
        assert_eq!(None, pool.latest_block());
        assert_eq!(64, pool.capacity());
        assert!(pool.owns_buffer());

        let all = pool.allocate(64 - HEADER_SIZE).unwrap();
        assert_eq!(first, all);
        assert_eq!(HEADER_SIZE, offset(&pool, all));
    }

    #[test]
    fn source_is_called_once_per_lifecycle() {
        let mut pool = Pool::with_source(Counting::default());

        assert_eq!(Err(PoolError::ZeroSize), pool.initialize(0));
        assert_eq!(0, pool.source().acquired.get());

        pool.initialize(32).unwrap();
        assert_eq!(Err(PoolError::AlreadyInitialized), pool.initialize(32));
        assert_eq!(1, pool.source().acquired.get());

        pool.allocate(8).unwrap();
        pool.deinitialize();
        pool.deinitialize();
        assert_eq!(1, pool.source().released.get());
        assert!(!pool.is_initialized());
        assert_eq!(0, pool.bytes_used());

        // A fresh buffer after teardown starts empty.
        pool.initialize(16).unwrap();
        assert_eq!(0, pool.bytes_used());
        drop(pool);
    }

    #[test]
    fn drop_releases_owned_buffer() {
        let source = Counting::default();
        {
            let mut pool = Pool::with_source(&source);
            pool.initialize(8).unwrap();
        }
        assert_eq!(1, source.acquired.get());
        assert_eq!(1, source.released.get());
    }

    #[test]
    fn exhausted_source_leaves_pool_uninitialized() {
        let mut pool: Pool<'_, Exhausted> = Pool::new();

        assert_eq!(
            Err(PoolError::SourceExhausted { requested: 64 }),
            pool.initialize(64)
        );
        assert!(!pool.is_initialized());
    }

    #[test]
    fn borrowed_buffer_is_never_released() {
        let mut bytes = [0u8; 40];
        {
            let mut pool = Pool::with_source(Exhausted);
            pool.initialize_with(&mut bytes).unwrap();
            assert!(!pool.owns_buffer());
            assert_eq!(40, pool.capacity());

            let ptr = pool.allocate(4).unwrap();
            pool.payload_mut(ptr).unwrap().copy_from_slice(&[1, 2, 3, 4]);
            pool.deinitialize();
        }

        assert_eq!(&4usize.to_ne_bytes()[..], &bytes[..HEADER_SIZE]);
        assert_eq!(&[1u8, 2, 3, 4][..], &bytes[HEADER_SIZE..HEADER_SIZE + 4]);
    }

    #[test]
    fn borrowed_buffer_preconditions() {
        let mut empty: [u8; 0] = [];
        assert_eq!(Err(PoolError::ZeroSize), Pool::<Heap>::from_buffer(&mut empty).map(|_| ()));

        let mut bytes = [0u8; 16];
        let mut pool: Pool = Pool::new();
        assert_eq!(
            Err(PoolError::NullBuffer),
            unsafe { pool.initialize_raw(std::ptr::null_mut(), 16) }
        );

        pool.initialize_with(&mut bytes).unwrap();
        assert_eq!(Err(PoolError::AlreadyInitialized), pool.initialize(16));
    }

    #[test]
    fn pools_of_the_same_type_are_independent() {
        let mut first: Pool = Pool::with_capacity(32).unwrap();
        let mut second: Pool = Pool::with_capacity(64).unwrap();

        first.allocate(4).unwrap();
        assert_eq!(0, second.bytes_used());

        second.allocate(16).unwrap();
        first.deallocate_all();
        assert_eq!(16 + HEADER_SIZE, second.bytes_used());
        assert_eq!(32, first.capacity());
    }
}
