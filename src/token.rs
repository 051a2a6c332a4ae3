// Combined token stream: command framing and the emitting writer.
//
// Layout (all integers network byte order):
//
//   u32 magic                  format version identifier
//   repeated commands until End:
//     0x01 LITERAL    u32 len, raw new-file bytes
//     0x02 COPY       u64 old-file byte offset, u32 len
//     0x03 SIGNATURE  u32 len, a fragment of the new signature stream
//     0x00 END        no payload
//
// Four kinds, each self-delimiting. The writer buffers pending literal
// bytes so runs of unmatched input coalesce into one command; the buffer
// is flushed before every copy so commands never reorder bytes, and
// capped so a long unmatched stretch cannot grow it without bound.

use crate::encode::EncodeStats;
use crate::error::Error;
use crate::io::{self, ByteSink, ByteSource};

/// Format version magic for token streams.
pub const TOKEN_MAGIC: u32 = 0x7273_0236;

const OP_END: u8 = 0x00;
const OP_LITERAL: u8 = 0x01;
const OP_COPY: u8 = 0x02;
const OP_SIGNATURE: u8 = 0x03;

/// Pending literals are flushed at this size even without a match.
const MAX_LITERAL_RUN: usize = 64 * 1024;

/// One decoded command of the combined stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Raw new-file bytes not found in the old file.
    Literal(Vec<u8>),
    /// Read `len` bytes from the old file starting at `offset`.
    Copy {
        /// Byte offset into the old file.
        offset: u64,
        /// Bytes to copy.
        len: u32,
    },
    /// A fragment of the new file's signature stream.
    Signature(Vec<u8>),
    /// Terminates the stream.
    End,
}

// ---------------------------------------------------------------------------
// Writer
// ---------------------------------------------------------------------------

/// Serializes commands into a byte sink, tracking per-kind statistics.
pub struct TokenWriter<'a, W: ByteSink + ?Sized> {
    sink: &'a mut W,
    literal: Vec<u8>,
    stats: EncodeStats,
}

impl<'a, W: ByteSink + ?Sized> TokenWriter<'a, W> {
    /// Wrap a sink. The token stream magic is written immediately, before
    /// any command.
    pub fn new(sink: &'a mut W) -> Result<Self, Error> {
        io::write_netlong(sink, TOKEN_MAGIC)?;
        Ok(Self {
            sink,
            literal: Vec::new(),
            stats: EncodeStats::default(),
        })
    }

    /// Buffer one unmatched byte for the next literal command.
    pub fn push_literal(&mut self, byte: u8) -> Result<(), Error> {
        self.literal.push(byte);
        if self.literal.len() >= MAX_LITERAL_RUN {
            self.flush_literal()?;
        }
        Ok(())
    }

    /// Emit any pending literal bytes as one command. An empty flush is a
    /// no-op, not an error.
    pub fn flush_literal(&mut self) -> Result<(), Error> {
        if self.literal.is_empty() {
            return Ok(());
        }
        self.sink.write_all(&[OP_LITERAL])?;
        io::write_netlong(self.sink, self.literal.len() as u32)?;
        self.sink.write_all(&self.literal)?;
        self.stats.literal_cmds += 1;
        self.stats.literal_bytes += self.literal.len() as u64;
        self.literal.clear();
        Ok(())
    }

    /// Emit a copy command, flushing pending literals first so the
    /// command order matches the byte order of the new file.
    pub fn copy(&mut self, offset: u64, len: u32) -> Result<(), Error> {
        self.flush_literal()?;
        self.sink.write_all(&[OP_COPY])?;
        io::write_netlong64(self.sink, offset)?;
        io::write_netlong(self.sink, len)?;
        self.stats.copy_cmds += 1;
        self.stats.copy_bytes += u64::from(len);
        Ok(())
    }

    /// Emit a signature-stream fragment.
    pub fn signature(&mut self, payload: &[u8]) -> Result<(), Error> {
        self.sink.write_all(&[OP_SIGNATURE])?;
        io::write_netlong(self.sink, payload.len() as u32)?;
        self.sink.write_all(payload)?;
        Ok(())
    }

    /// Emit the terminating marker.
    pub fn end(&mut self) -> Result<(), Error> {
        self.sink.write_all(&[OP_END])?;
        Ok(())
    }

    /// Consume the writer, yielding the literal/copy statistics it
    /// accumulated.
    pub fn into_stats(self) -> EncodeStats {
        debug_assert!(self.literal.is_empty(), "pending literals dropped");
        self.stats
    }
}

// ---------------------------------------------------------------------------
// Reader
// ---------------------------------------------------------------------------

/// Read and validate the token stream magic.
pub fn read_token_header<S: ByteSource + ?Sized>(src: &mut S) -> Result<(), Error> {
    let magic = io::read_netlong(src, "token stream magic")?;
    if magic != TOKEN_MAGIC {
        return Err(Error::ProtocolVersion {
            expected: TOKEN_MAGIC,
            found: magic,
        });
    }
    Ok(())
}

/// Parse the next command from the stream.
///
/// The stream must be positioned after the magic. End of input before a
/// complete command is a truncation error; `Command::End` is the only
/// clean way out.
pub fn read_command<S: ByteSource + ?Sized>(src: &mut S) -> Result<Command, Error> {
    let mut tag = [0u8; 1];
    if io::read_full(src, &mut tag)? != 1 {
        return Err(Error::TruncatedInput {
            what: "command tag",
        });
    }
    match tag[0] {
        OP_END => Ok(Command::End),
        OP_LITERAL => {
            let data = read_sized(src, "literal payload")?;
            Ok(Command::Literal(data))
        }
        OP_COPY => {
            let offset = io::read_netlong64(src, "copy offset")?;
            let len = io::read_netlong(src, "copy length")?;
            Ok(Command::Copy { offset, len })
        }
        OP_SIGNATURE => {
            let data = read_sized(src, "signature payload")?;
            Ok(Command::Signature(data))
        }
        other => Err(Error::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("unknown command tag {other:#04x}"),
        ))),
    }
}

fn read_sized<S: ByteSource + ?Sized>(
    src: &mut S,
    what: &'static str,
) -> Result<Vec<u8>, Error> {
    let len = io::read_netlong(src, what)? as usize;
    let mut data = vec![0u8; len];
    if io::read_full(src, &mut data)? != len {
        return Err(Error::TruncatedInput { what });
    }
    Ok(data)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
