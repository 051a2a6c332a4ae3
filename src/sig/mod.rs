// Block signature streams and the in-memory lookup index.
//
// A signature stream is the wire description of one file: a magic/block
// length header followed by a (weak, strong) checksum pair per block. The
// encoder consumes the old file's stream into a `SignatureIndex` and
// produces a fresh stream for the new file through `SignatureWriter`.

pub mod index;
pub mod stream;

pub use index::SignatureIndex;
pub use stream::{BlockSignature, SignatureHeader, SignatureWriter, SIG_MAGIC};
