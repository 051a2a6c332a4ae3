// Byte stream boundary: source/sink traits, network-order integer codecs,
// and file-level convenience wrappers.
//
// The encoder core never touches files directly; it consumes a
// `ByteSource` and produces into a `ByteSink`. Both are blanket-implemented
// for the standard `Read`/`Write` traits, so any std reader or writer
// plugs in. Optionally computes streaming SHA-256 checksums for the file
// helpers (feature-gated behind `file-io`).

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

#[cfg(feature = "file-io")]
use sha2::Digest;

use crate::encode::{self, EncodeStats};
use crate::error::Error;

// ---------------------------------------------------------------------------
// Source / sink traits
// ---------------------------------------------------------------------------

/// An upstream byte source. One blocking operation: read some bytes.
///
/// Returning `Ok(0)` signals end of input.
pub trait ByteSource {
    /// Read up to `buf.len()` bytes into `buf`, returning the count read.
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;
}

impl<R: Read + ?Sized> ByteSource for R {
    #[inline]
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Read::read(self, buf)
    }
}

/// A downstream byte sink. One blocking operation: write all given bytes.
pub trait ByteSink {
    /// Write the whole buffer or fail.
    fn write_all(&mut self, buf: &[u8]) -> io::Result<()>;
}

impl<W: Write + ?Sized> ByteSink for W {
    #[inline]
    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        Write::write_all(self, buf)
    }
}

// ---------------------------------------------------------------------------
// Network-order integer codecs
// ---------------------------------------------------------------------------

/// Read exactly `buf.len()` bytes unless the source is already at end of
/// input, in which case 0 is returned. A source that ends partway through
/// the buffer yields the partial count.
pub(crate) fn read_full<S: ByteSource + ?Sized>(
    src: &mut S,
    buf: &mut [u8],
) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = src.read(&mut buf[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}

/// Read a big-endian u32, or `None` at a clean end of input.
///
/// A stream that ends inside the field is a truncation error; `what` names
/// the field for diagnostics.
pub(crate) fn read_netlong_opt<S: ByteSource + ?Sized>(
    src: &mut S,
    what: &'static str,
) -> Result<Option<u32>, Error> {
    let mut buf = [0u8; 4];
    match read_full(src, &mut buf)? {
        0 => Ok(None),
        4 => Ok(Some(u32::from_be_bytes(buf))),
        _ => Err(Error::TruncatedInput { what }),
    }
}

/// Read a big-endian u32, treating end of input as truncation.
pub(crate) fn read_netlong<S: ByteSource + ?Sized>(
    src: &mut S,
    what: &'static str,
) -> Result<u32, Error> {
    read_netlong_opt(src, what)?.ok_or(Error::TruncatedInput { what })
}

/// Read a big-endian u64, treating end of input as truncation.
pub(crate) fn read_netlong64<S: ByteSource + ?Sized>(
    src: &mut S,
    what: &'static str,
) -> Result<u64, Error> {
    let mut buf = [0u8; 8];
    if read_full(src, &mut buf)? != 8 {
        return Err(Error::TruncatedInput { what });
    }
    Ok(u64::from_be_bytes(buf))
}

/// Write a big-endian u32.
pub(crate) fn write_netlong<W: ByteSink + ?Sized>(sink: &mut W, value: u32) -> io::Result<()> {
    sink.write_all(&value.to_be_bytes())
}

/// Write a big-endian u64.
pub(crate) fn write_netlong64<W: ByteSink + ?Sized>(sink: &mut W, value: u64) -> io::Result<()> {
    sink.write_all(&value.to_be_bytes())
}

// ---------------------------------------------------------------------------
// Default buffer size
// ---------------------------------------------------------------------------

const BUF_SIZE: usize = 64 * 1024; // 64 KiB

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// Statistics returned by `encode_file()`.
#[derive(Debug, Clone)]
pub struct FileEncodeStats {
    /// New-file size in bytes.
    pub input_size: u64,
    /// Delta output size in bytes.
    pub delta_size: u64,
    /// Command-level statistics from the encoder.
    pub commands: EncodeStats,
    /// SHA-256 of the new file (if `file-io` feature is enabled).
    pub input_sha256: Option<[u8; 32]>,
    /// SHA-256 of the delta output (if `file-io` feature is enabled).
    pub delta_sha256: Option<[u8; 32]>,
}

// ---------------------------------------------------------------------------
// encode_file
// ---------------------------------------------------------------------------

/// Encode a delta-and-sign stream for `input_path` against the old file's
/// signature at `signature_path`, writing the token stream to `delta_path`.
///
/// All three files are streamed through buffered I/O. When the `file-io`
/// feature is enabled, SHA-256 checksums of the input and the delta are
/// computed incrementally as data flows through the pipeline.
pub fn encode_file(
    signature_path: &Path,
    input_path: &Path,
    delta_path: &Path,
) -> Result<FileEncodeStats, Error> {
    let sig_file = File::open(signature_path)?;
    let mut sig_reader = BufReader::with_capacity(BUF_SIZE, sig_file);

    let input_file = File::open(input_path)?;
    let input_size = input_file.metadata()?.len();
    let input_reader = BufReader::with_capacity(BUF_SIZE, input_file);

    let delta_file = File::create(delta_path)?;
    let delta_writer = BufWriter::with_capacity(BUF_SIZE, delta_file);

    #[cfg(feature = "file-io")]
    let (commands, input_sha256, delta_sha256, mut delta_writer) = {
        let mut input_reader = HashingReader {
            inner: input_reader,
            hasher: sha2::Sha256::new(),
        };
        let mut delta_writer = HashingWriter {
            inner: delta_writer,
            hasher: sha2::Sha256::new(),
        };
        let commands = encode::encode(&mut input_reader, &mut delta_writer, &mut sig_reader)?;
        (
            commands,
            Some(input_reader.hasher.finalize().into()),
            Some(delta_writer.hasher.finalize_reset().into()),
            delta_writer.inner,
        )
    };

    #[cfg(not(feature = "file-io"))]
    let (commands, input_sha256, delta_sha256, mut delta_writer) = {
        let mut input_reader = input_reader;
        let mut delta_writer = delta_writer;
        let commands = encode::encode(&mut input_reader, &mut delta_writer, &mut sig_reader)?;
        (commands, None, None, delta_writer)
    };

    delta_writer.flush()?;
    let delta_size = delta_writer.into_inner().map_err(|e| e.into_error())?.metadata()?.len();

    Ok(FileEncodeStats {
        input_size,
        delta_size,
        commands,
        input_sha256,
        delta_sha256,
    })
}

// ---------------------------------------------------------------------------
// Hashing adapters (used with file-io feature)
// ---------------------------------------------------------------------------

#[cfg(feature = "file-io")]
struct HashingReader<R: Read> {
    inner: R,
    hasher: sha2::Sha256,
}

#[cfg(feature = "file-io")]
impl<R: Read> Read for HashingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = Read::read(&mut self.inner, buf)?;
        self.hasher.update(&buf[..n]);
        Ok(n)
    }
}

#[cfg(feature = "file-io")]
struct HashingWriter<W: Write> {
    inner: W,
    hasher: sha2::Sha256,
}

#[cfg(feature = "file-io")]
impl<W: Write> Write for HashingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.hasher.update(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
