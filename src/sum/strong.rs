// Strong block checksum: MD4 truncated to the wire's 8-byte sum.
//
// Used to confirm weak-checksum hits and to populate new signature
// entries. Collision resistance by modern standards is not the goal; the
// format inherits MD4 and the truncated width from the protocol.

use md4::{Digest, Md4};

/// Bytes of strong checksum carried per block on the wire.
pub const SUM_LENGTH: usize = 8;

/// A truncated strong digest of one block.
pub type StrongSum = [u8; SUM_LENGTH];

/// Compute the strong checksum of a block.
pub fn strong_checksum(data: &[u8]) -> StrongSum {
    let digest = Md4::digest(data);
    let mut sum = [0u8; SUM_LENGTH];
    sum.copy_from_slice(&digest[..SUM_LENGTH]);
    sum
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
