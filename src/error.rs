// Error taxonomy for the encode pipeline.
//
// Every failure is fatal and propagated immediately; there are no retries
// and no resumable state. Working buffers are owned values, so they are
// released on every return path without any cleanup protocol.

use thiserror::Error;

/// Errors surfaced by signature parsing and delta encoding.
#[derive(Debug, Error)]
pub enum Error {
    /// The old signature stream announces a format version this
    /// implementation does not understand. Raised before any output is
    /// produced.
    #[error("signature stream declares version {found:#010x}, expected {expected:#010x}")]
    ProtocolVersion {
        /// The one magic value this implementation accepts.
        expected: u32,
        /// The magic value actually present in the stream.
        found: u32,
    },

    /// A fixed-width field of the signature stream ended early.
    #[error("signature stream truncated while reading {what}")]
    TruncatedInput {
        /// The field that could not be completed.
        what: &'static str,
    },

    /// A read or write primitive reported failure. Output already
    /// written to the sink is not retracted.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The fixed-size working buffer could not be acquired. Raised
    /// before any input is consumed.
    #[error("could not allocate {bytes}-byte working buffer")]
    Allocation {
        /// Requested buffer size.
        bytes: usize,
    },
}
