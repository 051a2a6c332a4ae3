// Sliding window over the new-file byte stream.
//
// The buffer holds a bounded readahead of the input. The driver consumes
// bytes through `cursor`; `slide()` discards the consumed prefix once per
// refill cycle so `fill()` always has room to append. `base_offset` tracks
// how many bytes have been discarded, so `base_offset + cursor` is the
// absolute stream position of the next unprocessed byte. Positions only
// move forward, never rewind.

use crate::error::Error;
use crate::io::ByteSource;

/// Smallest window allocation; avoids degenerate refill cycles for tiny
/// block sizes.
const MIN_CAPACITY: usize = 64 * 1024;

/// Blocks of readahead kept per refill cycle.
const BLOCKS_PER_WINDOW: usize = 16;

/// Fixed-capacity readahead buffer over an unbounded input stream.
pub struct Window {
    buf: Vec<u8>,
    valid: usize,
    cursor: usize,
    base_offset: u64,
}

impl Window {
    /// Allocate a window able to hold at least one `block_len`-sized block.
    ///
    /// Allocation failure is reported as `Error::Allocation` before any
    /// input is consumed.
    pub fn new(block_len: usize) -> Result<Self, Error> {
        let capacity = block_len
            .saturating_mul(BLOCKS_PER_WINDOW)
            .max(MIN_CAPACITY)
            .max(block_len);
        let mut buf = Vec::new();
        buf.try_reserve_exact(capacity)
            .map_err(|_| Error::Allocation { bytes: capacity })?;
        buf.resize(capacity, 0);
        Ok(Self {
            buf,
            valid: 0,
            cursor: 0,
            base_offset: 0,
        })
    }

    /// Read from `src` until the buffer is full or the source reports end
    /// of input. Returns the number of bytes appended; 0 means end of
    /// input (the buffer always has free space when this is called after
    /// `slide()`).
    pub fn fill<S: ByteSource + ?Sized>(&mut self, src: &mut S) -> Result<usize, Error> {
        let mut added = 0;
        while self.valid < self.buf.len() {
            let n = src.read(&mut self.buf[self.valid..])?;
            if n == 0 {
                break;
            }
            self.valid += n;
            added += n;
        }
        Ok(added)
    }

    /// Discard the bytes strictly before the cursor, shifting the
    /// remainder to the front of the buffer and advancing `base_offset`
    /// by the discarded count. Must not be called mid-block: the driver
    /// invokes it once per outer refill cycle, after the inner scan has
    /// consumed as much as the readahead allows.
    pub fn slide(&mut self) {
        self.buf.copy_within(self.cursor..self.valid, 0);
        self.base_offset += self.cursor as u64;
        self.valid -= self.cursor;
        self.cursor = 0;
    }

    /// Move the cursor forward over `n` consumed bytes.
    pub fn advance(&mut self, n: usize) {
        debug_assert!(self.cursor + n <= self.valid);
        self.cursor += n;
    }

    /// Bytes buffered but not yet consumed.
    #[inline]
    pub fn remaining(&self) -> &[u8] {
        &self.buf[self.cursor..self.valid]
    }

    /// Current cursor position within the buffer.
    #[inline]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Count of valid bytes in the buffer.
    #[inline]
    pub fn valid(&self) -> usize {
        self.valid
    }

    /// Absolute stream offset of the next unprocessed byte.
    #[inline]
    pub fn absolute_cursor(&self) -> u64 {
        self.base_offset + self.cursor as u64
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
