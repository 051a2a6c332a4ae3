// Block checksums.
//
// Two families, used together: the rolling weak checksum is the cheap
// first-pass filter maintained incrementally across the scan window, and
// the strong checksum confirms a weak hit before a copy command is
// emitted.

pub mod rolling;
pub mod strong;

pub use rolling::{weak_checksum, Rollsum, CHAR_OFFSET};
pub use strong::{strong_checksum, StrongSum, SUM_LENGTH};
