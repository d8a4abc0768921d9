//! Chain of fixed 4096-byte records kept in a caller-owned [`ByteStore`].
//!
//! Block `n` lives at byte offset `n * FIXED_BLOCK_SIZE`; the block count is
//! derived from the store length on every call, never cached. A write that
//! fails or comes up short is undone by truncating the store back to its
//! previous length. Appends are still not crash safe: a process dying
//! mid-write leaves a partial record that makes the store malformed.

use crate::ByteStore;
use blockfile_core::{
    check_payload, codec, is_valid, Block, ChainError, ChainStore, Result, FIXED_BLOCK_SIZE,
    GENESIS_PREVIOUS_NUMBER, ZERO_HASH,
};
use tracing::{debug, warn};

const RECORD: u64 = FIXED_BLOCK_SIZE as u64;

pub struct FixedChain<S> {
    storage: S,
}

impl<S: ByteStore> FixedChain<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Hands the store back to the caller.
    pub fn into_inner(self) -> S {
        self.storage
    }

    fn storage_len(&self) -> Result<u64> {
        self.storage.len().map_err(ChainError::StorageProbeFailed)
    }

    /// Number of whole records, failing if the store ends in a partial one.
    pub fn check_layout(&self) -> Result<u64> {
        let len = self.storage_len()?;
        if len % RECORD != 0 {
            return Err(ChainError::MalformedStore { len });
        }
        Ok(len / RECORD)
    }

    /// Every block from genesis to the tip as of this call. Each item is read
    /// when the iterator reaches it.
    pub fn blocks(&self) -> Result<impl Iterator<Item = Result<Block>> + '_> {
        let size = self.size()?;
        Ok((0..size).map(move |index| self.block_at(index)))
    }

    /// Writes record `index`, which must be the first byte past the current
    /// end of the store. On failure the store is cut back to that length.
    fn write_record(&mut self, index: u64, block: &Block) -> Result<()> {
        let record = codec::encode(block)?;
        let offset = offset_of(index)?;
        if let Err(err) = self.write_whole(offset, &record) {
            if let Err(undo) = self.storage.truncate(offset) {
                warn!(%undo, len = offset, "unable to drop partial record");
            }
            return Err(err);
        }
        Ok(())
    }

    fn write_whole(&mut self, offset: u64, record: &[u8]) -> Result<()> {
        let written = self.storage.write_at(offset, record)?;
        if written != record.len() {
            return Err(ChainError::ShortIo {
                expected: record.len(),
                actual: written,
            });
        }
        self.storage.flush()?;
        Ok(())
    }
}

impl<S: ByteStore> ChainStore for FixedChain<S> {
    fn size(&self) -> Result<u64> {
        Ok(self.storage_len()? / RECORD)
    }

    fn block_at(&self, index: u64) -> Result<Block> {
        let size = self.size()?;
        if index >= size {
            return Err(ChainError::IndexOutOfRange { index, size });
        }

        let mut record = [0u8; FIXED_BLOCK_SIZE];
        let read = self.storage.read_at(offset_of(index)?, &mut record)?;
        if read != FIXED_BLOCK_SIZE {
            return Err(ChainError::ShortIo {
                expected: FIXED_BLOCK_SIZE,
                actual: read,
            });
        }
        codec::decode(&record)
    }

    fn append(&mut self, data: &[u8]) -> Result<Block> {
        check_payload(data)?;

        let count = self.check_layout()?;
        let (previous_number, previous_hash) = match count {
            0 => (GENESIS_PREVIOUS_NUMBER, ZERO_HASH),
            _ => {
                let last = self.block_at(count - 1)?;
                (last.block_number(), *last.hash())
            }
        };

        let block = Block::new(data, previous_number, previous_hash)?;
        self.write_record(count, &block)?;
        debug!(
            block_number = block.block_number(),
            hash = %block.hash_hex(),
            len = data.len(),
            "appended block"
        );
        Ok(block)
    }

    fn is_valid(&self) -> bool {
        if let Err(err) = self.check_layout() {
            warn!(%err, "chain storage is malformed");
            return false;
        }
        is_valid(self)
    }
}

fn offset_of(index: u64) -> Result<u64> {
    index
        .checked_mul(RECORD)
        .ok_or(ChainError::IndexOutOfRange { index, size: u64::MAX / RECORD })
}
