// Signature stream wire format.
//
// Layout (all integers network byte order):
//
//   u32 magic                 format version identifier
//   u32 block_len             bytes per block, constant except final block
//   repeated until EOF:
//     u32 weak_checksum
//     u8[SUM_LENGTH] strong_checksum
//
// The same layout is read for the old file and written for the new one;
// the writer accumulates into memory because the new signature's place in
// the combined output comes after the copy/literal commands even though
// its entries are computed alongside them.

use crate::error::Error;
use crate::io::{self, ByteSource};
use crate::sum::{StrongSum, SUM_LENGTH};

/// Format version magic for signature streams.
pub const SIG_MAGIC: u32 = 0x7273_0136;

/// Encoded size of one signature entry.
pub const ENTRY_LEN: usize = 4 + SUM_LENGTH;

/// One block's checksum pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockSignature {
    /// Rolling weak checksum of the block.
    pub weak: u32,
    /// Truncated strong digest of the block.
    pub strong: StrongSum,
}

// ---------------------------------------------------------------------------
// Header
// ---------------------------------------------------------------------------

/// Parsed signature stream header.
#[derive(Debug, Clone, Copy)]
pub struct SignatureHeader {
    /// Bytes per block for every entry except possibly the last.
    pub block_len: u32,
}

impl SignatureHeader {
    /// Read and validate a signature stream header.
    ///
    /// Fails with `Error::ProtocolVersion` if the magic is not the one
    /// value this implementation understands, before any output exists.
    pub fn read<S: ByteSource + ?Sized>(src: &mut S) -> Result<Self, Error> {
        let magic = io::read_netlong(src, "signature magic")?;
        if magic != SIG_MAGIC {
            return Err(Error::ProtocolVersion {
                expected: SIG_MAGIC,
                found: magic,
            });
        }
        let block_len = io::read_netlong(src, "signature block length")?;
        if block_len == 0 {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "signature block length must be nonzero",
            )));
        }
        log::trace!("signature block length is {block_len}");
        Ok(Self { block_len })
    }
}

/// Read one entry, or `None` at a clean end of the stream.
pub fn read_entry<S: ByteSource + ?Sized>(
    src: &mut S,
) -> Result<Option<BlockSignature>, Error> {
    let weak = match io::read_netlong_opt(src, "weak checksum")? {
        Some(weak) => weak,
        None => return Ok(None),
    };
    let mut strong = [0u8; SUM_LENGTH];
    if io::read_full(src, &mut strong)? != SUM_LENGTH {
        return Err(Error::TruncatedInput {
            what: "strong checksum",
        });
    }
    Ok(Some(BlockSignature { weak, strong }))
}

// ---------------------------------------------------------------------------
// Writer
// ---------------------------------------------------------------------------

/// Accumulates a complete signature stream in memory.
///
/// The buffered bytes are themselves a valid signature stream, so the
/// flushed payload can serve as the old-file signature of a future encode.
#[derive(Debug)]
pub struct SignatureWriter {
    buf: Vec<u8>,
    entries: u64,
}

impl SignatureWriter {
    /// Start a stream for the given block length; writes the header.
    pub fn new(block_len: u32) -> Self {
        let mut buf = Vec::with_capacity(64);
        buf.extend_from_slice(&SIG_MAGIC.to_be_bytes());
        buf.extend_from_slice(&block_len.to_be_bytes());
        Self { buf, entries: 0 }
    }

    /// Append one block's checksum pair.
    pub fn push(&mut self, weak: u32, strong: &StrongSum) {
        self.buf.extend_from_slice(&weak.to_be_bytes());
        self.buf.extend_from_slice(strong);
        self.entries += 1;
    }

    /// Entries appended so far.
    pub fn entries(&self) -> u64 {
        self.entries
    }

    /// Encoded bytes contributed by entries (the header is framing, not
    /// signature data).
    pub fn entry_bytes(&self) -> u64 {
        self.entries * ENTRY_LEN as u64
    }

    /// The accumulated stream, header included.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
