#![no_main]
use libfuzzer_sys::fuzz_target;
use rollsync::token;
use std::io::Cursor;

fuzz_target!(|data: &[u8]| {
    // Walk arbitrary bytes as a token stream until an error or End.
    let mut src = Cursor::new(data.to_vec());
    if token::read_token_header(&mut src).is_err() {
        return;
    }
    while let Ok(cmd) = token::read_command(&mut src) {
        if cmd == token::Command::End {
            break;
        }
    }
});
