// End-to-end tests for the combined encode-and-sign stream.
//
// These tests verify:
//   - Reconstruction: applying the token stream to the old file yields
//     the new file exactly
//   - Byte accounting and per-command statistics
//   - Boundary behavior (empty input, exact multiples, short final block)
//   - The embedded signature is reusable as the next encode's old
//     signature

use std::io::Cursor;

use rollsync::token::Command;
use rollsync::Error;

mod common;
use common::{apply_delta, encode_pair, make_signature};

fn copies(commands: &[Command]) -> Vec<(u64, u32)> {
    commands
        .iter()
        .filter_map(|c| match c {
            Command::Copy { offset, len } => Some((*offset, *len)),
            _ => None,
        })
        .collect()
}

// ===========================================================================
// Reconstruction
// ===========================================================================

#[test]
fn identical_files_reconstruct() {
    let data = b"The quick brown fox jumps over the lazy dog.".to_vec();
    let (delta, stats) = encode_pair(&data, &data, 8);
    let applied = apply_delta(&data, &delta);
    assert_eq!(applied.output, data);
    assert_eq!(stats.literal_bytes + stats.copy_bytes, data.len() as u64);
}

#[test]
fn edited_file_reconstructs() {
    let old = b"Hello, world! This is a test of the delta engine.".to_vec();
    let new = b"Hello, earth! This is a better test of the delta engine!!".to_vec();
    let (delta, _) = encode_pair(&old, &new, 8);
    assert_eq!(apply_delta(&old, &delta).output, new);
}

#[test]
fn inserted_prefix_reconstructs() {
    // An unaligned insertion exercises the rolling match at every offset.
    let old: Vec<u8> = (0u8..=255).cycle().take(4096).collect();
    let mut new = b"prefix bytes".to_vec();
    new.extend_from_slice(&old);
    let (delta, stats) = encode_pair(&old, &new, 64);
    assert_eq!(apply_delta(&old, &delta).output, new);
    // The old content sits block-aligned in itself, so nearly all of it
    // should come back as copies.
    assert!(stats.copy_bytes >= 4096 - 64);
}

#[test]
fn empty_old_file_means_all_literal() {
    let new = b"entirely fresh content".to_vec();
    let (delta, stats) = encode_pair(b"", &new, 4);
    let applied = apply_delta(b"", &delta);
    assert_eq!(applied.output, new);
    assert_eq!(stats.copy_cmds, 0);
    assert_eq!(stats.literal_bytes, new.len() as u64);
}

#[test]
fn binary_data_with_scattered_edits_reconstructs() {
    let old: Vec<u8> = (0u8..=255).cycle().take(100_000).collect();
    let mut new = old.clone();
    for i in (0..new.len()).step_by(7919) {
        new[i] = new[i].wrapping_add(13);
    }
    let (delta, stats) = encode_pair(&old, &new, 512);
    assert_eq!(apply_delta(&old, &delta).output, new);
    assert_eq!(stats.literal_bytes + stats.copy_bytes, new.len() as u64);
    assert!(stats.copy_cmds > 0);
}

#[test]
fn random_unrelated_files_reconstruct() {
    use rand::{rngs::StdRng, Rng, SeedableRng};
    let mut rng = StdRng::seed_from_u64(0x5EED);
    let mut old = vec![0u8; 10_000];
    rng.fill(&mut old[..]);
    let mut new = vec![0u8; 12_000];
    rng.fill(&mut new[..]);
    let (delta, stats) = encode_pair(&old, &new, 256);
    assert_eq!(apply_delta(&old, &delta).output, new);
    assert_eq!(stats.literal_bytes + stats.copy_bytes, new.len() as u64);
}

#[test]
fn input_spanning_many_refill_cycles_reconstructs() {
    // Larger than the 64 KiB minimum window, with a mid-stream edit.
    let old: Vec<u8> = (0..400_000u32).map(|i| (i * 31 % 251) as u8).collect();
    let mut new = old.clone();
    new.splice(200_000..200_000, b"inserted run".iter().copied());
    let (delta, _) = encode_pair(&old, &new, 1024);
    assert_eq!(apply_delta(&old, &delta).output, new);
}

// ===========================================================================
// Boundaries
// ===========================================================================

#[test]
fn empty_input_emits_headers_and_end_only() {
    let old = b"old content present".to_vec();
    let (delta, stats) = encode_pair(&old, b"", 4);
    assert_eq!(stats, rollsync::EncodeStats::default());

    let applied = apply_delta(&old, &delta);
    assert!(applied.output.is_empty());
    // The embedded signature is a bare header: magic + block length.
    assert_eq!(applied.signature.len(), 8);
    assert_eq!(applied.commands.len(), 2);
    assert_eq!(applied.commands[1], Command::End);
}

#[test]
fn exact_multiple_has_no_short_block() {
    let data = vec![0xA5u8; 16];
    let (delta, stats) = encode_pair(&data, &data, 4);
    // Four aligned blocks, four copies, four signature entries.
    assert_eq!(stats.copy_cmds, 4);
    assert_eq!(stats.signature_cmds, 4);
    for (_, len) in copies(&apply_delta(&data, &delta).commands) {
        assert_eq!(len, 4);
    }
}

#[test]
fn short_final_block_matches_and_signs() {
    // 2 full blocks plus a 3-byte tail shared by both files.
    let data = b"AAAABBBBCCC".to_vec();
    let (delta, stats) = encode_pair(&data, &data, 4);
    assert_eq!(stats.copy_bytes, 11);
    assert_eq!(stats.literal_bytes, 0);
    assert_eq!(stats.signature_cmds, 3);
    let copies = copies(&apply_delta(&data, &delta).commands);
    assert_eq!(copies, vec![(0, 4), (4, 4), (8, 3)]);
}

#[test]
fn short_tail_not_in_old_file_is_literal() {
    let old = b"AAAABBBB".to_vec();
    let new = b"AAAABBBBzz".to_vec();
    let (delta, stats) = encode_pair(&old, &new, 4);
    assert_eq!(apply_delta(&old, &delta).output, new);
    assert_eq!(stats.copy_bytes, 8);
    assert_eq!(stats.literal_bytes, 2);
}

#[test]
fn block_len_one_degenerates_gracefully() {
    let old = b"abc".to_vec();
    let new = b"cab".to_vec();
    let (delta, stats) = encode_pair(&old, &new, 1);
    assert_eq!(apply_delta(&old, &delta).output, new);
    assert_eq!(stats.copy_bytes + stats.literal_bytes, 3);
}

// ===========================================================================
// Embedded signature
// ===========================================================================

#[test]
fn embedded_signature_describes_new_file() {
    let old = b"one old file".to_vec();
    let new = b"one new file with more bytes".to_vec();
    let (delta, _) = encode_pair(&old, &new, 4);
    let applied = apply_delta(&old, &delta);
    assert_eq!(applied.signature, make_signature(&new, 4));
}

#[test]
fn embedded_signature_feeds_next_generation() {
    // Chain three generations: each delta is computed against the
    // signature carried by the previous one.
    let gen0: Vec<u8> = (0u8..=255).cycle().take(10_000).collect();
    let mut gen1 = gen0.clone();
    gen1.extend_from_slice(b"generation one tail");
    let mut gen2 = gen1.clone();
    gen2[5000] ^= 0x55;

    let (delta1, _) = encode_pair(&gen0, &gen1, 256);
    let applied1 = apply_delta(&gen0, &delta1);
    assert_eq!(applied1.output, gen1);

    // Use the signature embedded in delta1 as the old signature now.
    let mut delta2 = Vec::new();
    rollsync::encode(
        &mut Cursor::new(gen2.clone()),
        &mut delta2,
        &mut Cursor::new(applied1.signature.clone()),
    )
    .expect("second-generation encode failed");
    let applied2 = apply_delta(&gen1, &delta2);
    assert_eq!(applied2.output, gen2);
}

#[test]
fn signature_emission_is_deterministic() {
    let old = b"deterministic old".to_vec();
    let new: Vec<u8> = (0u8..200).collect();
    let (delta_a, _) = encode_pair(&old, &new, 16);
    let (delta_b, _) = encode_pair(&old, &new, 16);
    assert_eq!(delta_a, delta_b);
}

// ===========================================================================
// Statistics
// ===========================================================================

#[test]
fn stats_agree_with_parsed_stream() {
    let old: Vec<u8> = (0u8..=255).cycle().take(3000).collect();
    let mut new = old.clone();
    new[1234] = 0;
    new[2345] = 0;
    let (delta, stats) = encode_pair(&old, &new, 64);

    let applied = apply_delta(&old, &delta);
    let mut literal_bytes = 0u64;
    let mut copy_bytes = 0u64;
    let mut literal_cmds = 0u64;
    let mut copy_cmds = 0u64;
    for cmd in &applied.commands {
        match cmd {
            Command::Literal(data) => {
                literal_cmds += 1;
                literal_bytes += data.len() as u64;
            }
            Command::Copy { len, .. } => {
                copy_cmds += 1;
                copy_bytes += u64::from(*len);
            }
            _ => {}
        }
    }
    assert_eq!(stats.literal_cmds, literal_cmds);
    assert_eq!(stats.literal_bytes, literal_bytes);
    assert_eq!(stats.copy_cmds, copy_cmds);
    assert_eq!(stats.copy_bytes, copy_bytes);
    assert_eq!(literal_bytes + copy_bytes, new.len() as u64);
}

// ===========================================================================
// Errors
// ===========================================================================

#[test]
fn version_mismatch_is_fatal_and_silent() {
    let mut sig = make_signature(b"old", 4);
    // Corrupt the magic.
    sig[0] ^= 0xFF;
    let mut delta = Vec::new();
    let err = rollsync::encode(
        &mut Cursor::new(b"new".to_vec()),
        &mut delta,
        &mut Cursor::new(sig),
    )
    .unwrap_err();
    assert!(matches!(err, Error::ProtocolVersion { .. }));
    assert!(delta.is_empty());
}

#[test]
fn truncated_signature_entry_is_fatal() {
    let sig = make_signature(b"aaaabbbbcccc", 4);
    for cut in [sig.len() - 1, sig.len() - 5, 9, 5] {
        let mut delta = Vec::new();
        let err = rollsync::encode(
            &mut Cursor::new(b"new".to_vec()),
            &mut delta,
            &mut Cursor::new(sig[..cut].to_vec()),
        )
        .unwrap_err();
        assert!(
            matches!(err, Error::TruncatedInput { .. }),
            "cut at {cut} gave {err:?}"
        );
    }
}

#[test]
fn read_failure_propagates() {
    struct FailingReader;
    impl std::io::Read for FailingReader {
        fn read(&mut self, _: &mut [u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                "peer vanished",
            ))
        }
    }

    let sig = make_signature(b"old file", 4);
    let mut delta = Vec::new();
    let err = rollsync::encode(&mut FailingReader, &mut delta, &mut Cursor::new(sig)).unwrap_err();
    assert!(matches!(err, Error::Io(_)));
}

// ===========================================================================
// File helpers
// ===========================================================================

#[test]
fn encode_file_roundtrips() {
    let dir = tempfile::tempdir().unwrap();
    let old: Vec<u8> = (0u8..=255).cycle().take(5000).collect();
    let mut new = old.clone();
    new.truncate(4500);
    new.extend_from_slice(b"fresh tail");

    let sig_path = dir.path().join("old.sig");
    let new_path = dir.path().join("new.bin");
    let delta_path = dir.path().join("out.delta");
    std::fs::write(&sig_path, make_signature(&old, 128)).unwrap();
    std::fs::write(&new_path, &new).unwrap();

    let stats = rollsync::io::encode_file(&sig_path, &new_path, &delta_path).unwrap();
    assert_eq!(stats.input_size, new.len() as u64);
    assert_eq!(
        stats.commands.literal_bytes + stats.commands.copy_bytes,
        new.len() as u64
    );

    let delta = std::fs::read(&delta_path).unwrap();
    assert_eq!(stats.delta_size, delta.len() as u64);
    assert_eq!(apply_delta(&old, &delta).output, new);

    #[cfg(feature = "file-io")]
    {
        use sha2::{Digest, Sha256};
        let expect: [u8; 32] = Sha256::digest(&new).into();
        assert_eq!(stats.input_sha256, Some(expect));
        let expect: [u8; 32] = Sha256::digest(&delta).into();
        assert_eq!(stats.delta_sha256, Some(expect));
    }
}
