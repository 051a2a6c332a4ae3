//! Rollsync: streaming rsync-style delta encoding with combined signing.
//!
//! Given the block signature of an "old" file and the bytes of a "new"
//! file, the encoder produces a single token stream that both describes
//! the new file as copy/literal commands against the old one and carries
//! a fresh block signature for the new file, so the next delta can be
//! computed without re-reading it.
//!
//! The crate provides:
//! - The streaming encode driver (`encode`)
//! - Signature stream parsing and the weak-checksum index (`sig`)
//! - Rolling and strong block checksums (`sum`)
//! - Token stream commands and framing (`token`)
//! - File-oriented helpers (`io`)
//! - An optional CLI (`cli` feature)
//!
//! # Quick Start
//!
//! ```no_run
//! use std::io::Cursor;
//!
//! // A signature stream for the old file, received from a peer.
//! let old_signature: Vec<u8> = unimplemented!();
//! let new_file = b"the new contents";
//!
//! let mut delta = Vec::new();
//! let stats = rollsync::encode(
//!     &mut Cursor::new(&new_file[..]),
//!     &mut delta,
//!     &mut Cursor::new(&old_signature[..]),
//! )
//! .unwrap();
//! assert_eq!(stats.literal_bytes + stats.copy_bytes, new_file.len() as u64);
//! ```

pub mod encode;
pub mod error;
pub mod io;
pub mod sig;
pub mod sum;
pub mod token;
pub mod window;

#[cfg(feature = "cli")]
pub mod cli;

pub use encode::{encode, EncodeStats};
pub use error::Error;
