use std::{iter::FusedIterator, mem};

use crate::buffer::Buffer;

/// Size of a block header: one machine word holding the payload length.
pub const HEADER_SIZE: usize = mem::size_of::<usize>();

/// View of one block living in a [`crate::Pool`] buffer.
///
/// A block is never stored anywhere as a struct. It is just a length prefix
/// followed by that many payload bytes, and this type is what we get by
/// reading such a prefix back out of the buffer:
///
/// ```text
/// +---------------------+ <------+  header_offset
/// |   len (usize, ne)   |        |  -> Header
/// +---------------------+ <------+  payload_offset
/// |       Payload       |        |
/// |         ...         |        |  -> len bytes
/// |         ...         |        |
/// +---------------------+ <------+  end (next block's header)
/// ```
///
/// Blocks are packed with no padding at all, so neither the header nor the
/// payload are aligned in general.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block {
    offset: usize,
    len: usize,
}

impl Block {
    /// Reads the block whose header starts at `offset`, as long as both the
    /// header and the payload it announces lie before `limit`.
    pub(crate) fn read(buffer: &Buffer<'_>, offset: usize, limit: usize) -> Option<Self> {
        let len = buffer.read_word(offset)?;
        let block = Self { offset, len };

        block
            .payload_offset()
            .checked_add(len)
            .is_some_and(|end| end <= limit)
            .then_some(block)
    }

    /// Offset of the header from the start of the buffer.
    #[inline]
    pub fn header_offset(&self) -> usize {
        self.offset
    }

    /// Offset of the first payload byte from the start of the buffer.
    #[inline]
    pub fn payload_offset(&self) -> usize {
        self.offset + HEADER_SIZE
    }

    /// Payload length in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Offset one past the last payload byte, where the next header starts.
    #[inline]
    pub fn end(&self) -> usize {
        self.payload_offset() + self.len
    }
}

/// Walk over the block chain, following each length prefix from the start of
/// the buffer up to the cursor.
///
/// This is the only way to find a block's predecessor: the pool keeps no
/// backward links, so going back one block means walking forward from zero.
/// The walk stops early if a header announces a block that would run past the
/// cursor.
pub struct Blocks<'b, 'a> {
    buffer: Option<&'b Buffer<'a>>,
    next: usize,
    end: usize,
}

impl<'b, 'a> Blocks<'b, 'a> {
    pub(crate) fn new(buffer: Option<&'b Buffer<'a>>, end: usize) -> Self {
        Self {
            buffer,
            next: 0,
            end,
        }
    }
}

impl Iterator for Blocks<'_, '_> {
    type Item = Block;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.end {
            return None;
        }

        match self.buffer.and_then(|buffer| Block::read(buffer, self.next, self.end)) {
            Some(block) => {
                self.next = block.end();
                Some(block)
            }
            None => {
                log::warn!("block chain broken at offset {}", self.next);
                self.next = self.end;
                None
            }
        }
    }
}

impl FusedIterator for Blocks<'_, '_> {}
