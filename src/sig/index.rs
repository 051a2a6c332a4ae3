// Weak-checksum index over an old file's block signatures.
//
// Built once per encode from the incoming signature stream, then queried
// read-only for the whole call. A lookup filters by weak checksum and
// confirms the hit with a strong-checksum comparison, so a weak collision
// never produces a wrong copy command, and a short final block can only
// match an old block with identical bytes.

use std::collections::HashMap;

use crate::error::Error;
use crate::io::ByteSource;
use crate::sig::stream::{self, BlockSignature};
use crate::sum::strong_checksum;

/// Read-only map from weak checksum to verified old-file block numbers.
#[derive(Debug)]
pub struct SignatureIndex {
    block_len: u32,
    blocks: Vec<BlockSignature>,
    by_weak: HashMap<u32, Vec<u32>>,
}

impl SignatureIndex {
    /// Consume the entry region of a signature stream (the header has
    /// already been read) and build the index.
    pub fn from_reader<S: ByteSource + ?Sized>(
        src: &mut S,
        block_len: u32,
    ) -> Result<Self, Error> {
        let mut blocks = Vec::new();
        let mut by_weak: HashMap<u32, Vec<u32>> = HashMap::new();
        while let Some(entry) = stream::read_entry(src)? {
            let block = blocks.len() as u32;
            by_weak.entry(entry.weak).or_default().push(block);
            blocks.push(entry);
        }
        log::trace!("signature index holds {} blocks", blocks.len());
        Ok(Self {
            block_len,
            blocks,
            by_weak,
        })
    }

    /// Look up the block at the scan cursor.
    ///
    /// Returns the 0-based block number of the first old block whose weak
    /// and strong checksums both match `block`, or `None`. Pure query: no
    /// window or checksum state is touched.
    pub fn lookup(&self, weak: u32, block: &[u8]) -> Option<u32> {
        let candidates = self.by_weak.get(&weak)?;
        let strong = strong_checksum(block);
        candidates
            .iter()
            .copied()
            .find(|&n| self.blocks[n as usize].strong == strong)
    }

    /// Bytes per block of the indexed file.
    pub fn block_len(&self) -> u32 {
        self.block_len
    }

    /// Number of indexed blocks.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// True when the old file had no blocks at all.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
