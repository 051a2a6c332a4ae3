// Combined encode-and-sign driver.
//
// One pass over the new-file stream produces two logical outputs woven
// into a single token stream: copy/literal commands describing the new
// file in terms of the old one, and a fresh block signature of the new
// file itself. The scan keeps a rolling weak checksum over the block at
// the cursor; a verified hit in the old file's signature index becomes a
// copy command and skips the cursor a whole block, a miss emits one
// literal byte and rolls the checksum forward one position.
//
// Readahead policy: a position is processed only while a full block of
// lookahead exists, or unconditionally once end of input was observed, in
// which case the final positions work on a shrinking short block with its
// own independently computed checksums.

use crate::error::Error;
use crate::io::{ByteSink, ByteSource};
use crate::sig::stream::SignatureWriter;
use crate::sig::{SignatureHeader, SignatureIndex};
use crate::sum::{strong_checksum, Rollsum};
use crate::token::TokenWriter;
use crate::window::Window;

/// Command and byte counters for one encode call.
///
/// `literal_bytes + copy_bytes` always equals the new file's length:
/// every input byte is accounted for exactly once. Signature counters
/// cover emitted entries, not sub-stream framing, so an empty input
/// reports all zeroes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EncodeStats {
    /// Literal commands emitted.
    pub literal_cmds: u64,
    /// Bytes carried by literal commands.
    pub literal_bytes: u64,
    /// New-signature entries emitted.
    pub signature_cmds: u64,
    /// Bytes of encoded signature entries.
    pub signature_bytes: u64,
    /// Copy commands emitted.
    pub copy_cmds: u64,
    /// Bytes covered by copy commands.
    pub copy_bytes: u64,
}

/// Encode `input` against the old file's signature stream, writing the
/// combined token stream to `output`.
///
/// The signature source is consumed completely: header first (failing
/// with a version error before any output exists), then every block
/// entry into the lookup index. The produced stream interleaves the
/// delta commands with a signature for `input` at the same block
/// granularity, so a future encode can run against this output's
/// embedded signature without re-reading the file.
pub fn encode<I, O, S>(input: &mut I, output: &mut O, signature: &mut S) -> Result<EncodeStats, Error>
where
    I: ByteSource + ?Sized,
    O: ByteSink + ?Sized,
    S: ByteSource + ?Sized,
{
    let header = SignatureHeader::read(signature)?;
    let block_len = header.block_len as usize;
    // Signature granularity for the produced stream; equals the old
    // file's block length by design.
    let new_block_len = u64::from(header.block_len);

    // Acquire the working buffer before consuming the signature body or
    // touching the sink.
    let mut window = Window::new(block_len)?;
    let index = SignatureIndex::from_reader(signature, header.block_len)?;
    let mut rollsum = Rollsum::new();
    let mut tokens = TokenWriter::new(output)?;
    let mut newsig = SignatureWriter::new(header.block_len);

    loop {
        let added = window.fill(input)?;
        let at_eof = added == 0;

        // With end of input in sight we process right up to the last
        // byte; otherwise we stop as soon as a full block of readahead is
        // no longer available.
        loop {
            let ready = if at_eof {
                window.cursor() < window.valid()
            } else {
                window.cursor() + block_len <= window.valid()
            };
            if !ready {
                break;
            }

            let remaining = window.remaining();
            let this_block_len = block_len.min(remaining.len());
            let block = &remaining[..this_block_len];

            rollsum.update(block, block_len);

            if window.absolute_cursor() % new_block_len == 0 {
                newsig.push(rollsum.weak(), &strong_checksum(block));
            }

            match index.lookup(rollsum.weak(), block) {
                Some(token) => {
                    log::trace!(
                        "matched old block {token} at offset {} length {this_block_len}",
                        window.absolute_cursor()
                    );
                    tokens.copy(u64::from(token) * new_block_len, this_block_len as u32)?;
                    window.advance(this_block_len);
                    // The accumulators no longer correspond to any live
                    // window after the skip.
                    rollsum.invalidate();
                }
                None => {
                    let byte = block[0];
                    tokens.push_literal(byte)?;
                    if this_block_len == block_len {
                        rollsum.rotate_out(byte, block_len);
                    } else {
                        rollsum.invalidate();
                    }
                    window.advance(1);
                }
            }
        }

        if at_eof {
            break;
        }
        window.slide();
    }

    tokens.flush_literal()?;
    tokens.signature(newsig.as_bytes())?;
    tokens.end()?;

    let mut stats = tokens.into_stats();
    stats.signature_cmds = newsig.entries();
    stats.signature_bytes = newsig.entry_bytes();
    log::debug!(
        "completed: literal[{} cmds, {} bytes], signature[{} cmds, {} bytes], copy[{} cmds, {} bytes]",
        stats.literal_cmds,
        stats.literal_bytes,
        stats.signature_cmds,
        stats.signature_bytes,
        stats.copy_cmds,
        stats.copy_bytes
    );
    Ok(stats)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
