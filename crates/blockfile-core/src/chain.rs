use crate::error::{ChainError, Result};
use crate::{Block, GENESIS_PREVIOUS_NUMBER, ZERO_HASH};
use tracing::{debug, warn};

/// What a backend has to offer for blocks to be appended, read back by index
/// and validated. Lives in the core crate so storage crates can implement it.
pub trait ChainStore {
    /// Number of blocks currently stored.
    fn size(&self) -> Result<u64>;

    fn block_at(&self, index: u64) -> Result<Block>;

    /// Appends a block holding `data` after the current tip.
    fn append(&mut self, data: &[u8]) -> Result<Block>;

    fn last_block(&self) -> Result<Option<Block>> {
        match self.size()? {
            0 => Ok(None),
            size => self.block_at(size - 1).map(Some),
        }
    }

    fn is_valid(&self) -> bool {
        is_valid(self)
    }
}

/// Walks the chain from the tip back to genesis and reports whether every
/// link holds.
///
/// For each block with a successor, the successor's previous hash must equal
/// the block's hash and the successor's own hash must recompute. The tip and
/// genesis blocks also get their own hashes checked directly, so a single
/// corrupted block is caught even without a successor. Every block number
/// must equal its index. An empty chain is valid.
///
/// A block that cannot be read makes the whole chain invalid.
pub fn is_valid<C: ChainStore + ?Sized>(chain: &C) -> bool {
    let size = match chain.size() {
        Ok(size) => size,
        Err(err) => {
            warn!(%err, "unable to determine chain size");
            return false;
        }
    };
    if size == 0 {
        return true;
    }

    let mut next_block: Option<Block> = None;
    for index in (0..size).rev() {
        let working = match chain.block_at(index) {
            Ok(block) => block,
            Err(err) => {
                warn!(index, %err, "unable to read block");
                return false;
            }
        };

        if i64::try_from(index).ok() != Some(working.block_number()) {
            warn!(index, block_number = working.block_number(), "block number does not match index");
            return false;
        }

        match &next_block {
            None => {
                if !working.verify_block_hash() {
                    warn!(index, "tip block hash does not match its contents");
                    return false;
                }
            }
            Some(next) => {
                if next.previous_hash() != working.hash() {
                    warn!(index = index + 1, "previous hash does not link to predecessor");
                    return false;
                }
                if !next.verify_block_hash() {
                    warn!(index = index + 1, "block hash does not match its contents");
                    return false;
                }
            }
        }

        next_block = Some(working);
    }

    if let Some(genesis) = next_block {
        if genesis.previous_hash() != &ZERO_HASH || !genesis.verify_block_hash() {
            warn!(index = 0, "genesis block is not self-consistent");
            return false;
        }
    }

    debug!(size, "chain validated");
    true
}

/// Non-persistent chain kept as a plain vector of blocks.
#[derive(Clone, Debug, Default)]
pub struct MemoryChain {
    blocks: Vec<Block>,
}

impl MemoryChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps blocks as-is, without checking them.
    pub fn from_blocks(blocks: Vec<Block>) -> Self {
        Self { blocks }
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn into_blocks(self) -> Vec<Block> {
        self.blocks
    }
}

impl ChainStore for MemoryChain {
    fn size(&self) -> Result<u64> {
        Ok(self.blocks.len() as u64)
    }

    fn block_at(&self, index: u64) -> Result<Block> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.blocks.get(i))
            .cloned()
            .ok_or(ChainError::IndexOutOfRange {
                index,
                size: self.blocks.len() as u64,
            })
    }

    fn append(&mut self, data: &[u8]) -> Result<Block> {
        let block = match self.blocks.last() {
            Some(last) => Block::new(data, last.block_number(), *last.hash())?,
            None => Block::new(data, GENESIS_PREVIOUS_NUMBER, ZERO_HASH)?,
        };
        self.blocks.push(block.clone());
        Ok(block)
    }
}
