// Shared helpers for the integration tests.
//
// Signature generation for the old file and token-stream application are
// the two collaborators that sit outside the encoder: a real deployment
// receives the old signature from a peer and applies deltas elsewhere.
// The tests recreate both here to close the loop.

use std::io::Cursor;

use rollsync::sig::stream::SignatureWriter;
use rollsync::sum::{strong_checksum, weak_checksum};
use rollsync::token::{read_command, read_token_header, Command};

/// Build a signature stream describing `old`, chunked at `block_len`.
pub fn make_signature(old: &[u8], block_len: u32) -> Vec<u8> {
    let mut w = SignatureWriter::new(block_len);
    for block in old.chunks(block_len as usize) {
        w.push(weak_checksum(block), &strong_checksum(block));
    }
    w.as_bytes().to_vec()
}

/// Everything a token stream decomposes into.
pub struct AppliedDelta {
    /// The reconstructed new file.
    pub output: Vec<u8>,
    /// The embedded signature stream for the new file.
    pub signature: Vec<u8>,
    /// Parsed commands, in stream order.
    pub commands: Vec<Command>,
}

/// Apply a token stream against the old file, reconstructing the new one
/// and extracting the embedded signature.
pub fn apply_delta(old: &[u8], delta: &[u8]) -> AppliedDelta {
    let mut src = Cursor::new(delta.to_vec());
    read_token_header(&mut src).expect("bad token header");

    let mut output = Vec::new();
    let mut signature = Vec::new();
    let mut commands = Vec::new();
    loop {
        let cmd = read_command(&mut src).expect("bad command");
        commands.push(cmd.clone());
        match cmd {
            Command::Literal(data) => output.extend_from_slice(&data),
            Command::Copy { offset, len } => {
                let start = offset as usize;
                let end = start + len as usize;
                assert!(end <= old.len(), "copy beyond old file: {start}..{end}");
                output.extend_from_slice(&old[start..end]);
            }
            Command::Signature(payload) => signature.extend_from_slice(&payload),
            Command::End => break,
        }
    }
    assert_eq!(
        src.position() as usize,
        delta.len(),
        "trailing bytes after end marker"
    );
    AppliedDelta {
        output,
        signature,
        commands,
    }
}

/// Encode `new` against a signature of `old`.
pub fn encode_pair(old: &[u8], new: &[u8], block_len: u32) -> (Vec<u8>, rollsync::EncodeStats) {
    let sig = make_signature(old, block_len);
    let mut delta = Vec::new();
    let stats = rollsync::encode(
        &mut Cursor::new(new.to_vec()),
        &mut delta,
        &mut Cursor::new(sig),
    )
    .expect("encode failed");
    (delta, stats)
}
