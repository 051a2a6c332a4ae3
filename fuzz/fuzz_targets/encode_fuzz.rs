#![no_main]
use libfuzzer_sys::fuzz_target;
use std::io::Cursor;

fuzz_target!(|data: &[u8]| {
    // Split arbitrary bytes into a signature stream and an input stream.
    // The encoder must never panic, only return errors.
    let split = data.len() / 2;
    let (sig, input) = data.split_at(split);
    let mut delta = Vec::new();
    let _ = rollsync::encode(
        &mut Cursor::new(input.to_vec()),
        &mut delta,
        &mut Cursor::new(sig.to_vec()),
    );
});
