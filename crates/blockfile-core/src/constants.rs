pub const HASH_SIZE: usize = 32;
pub const HASH_HEX_SIZE: usize = HASH_SIZE * 2;

/// Size of one serialized block on disk.
pub const FIXED_BLOCK_SIZE: usize = 4096;
pub const MAX_DATA_SIZE: usize = 4008;

pub const HASH_OFFSET: usize = 0;
pub const PREVIOUS_HASH_OFFSET: usize = HASH_OFFSET + HASH_SIZE;
pub const DATA_LEN_OFFSET: usize = PREVIOUS_HASH_OFFSET + HASH_SIZE;
pub const DATA_OFFSET: usize = DATA_LEN_OFFSET + INT_SLOT_SIZE;
pub const BLOCK_NUMBER_OFFSET: usize = DATA_OFFSET + MAX_DATA_SIZE;
pub const TIMESTAMP_OFFSET: usize = BLOCK_NUMBER_OFFSET + INT_SLOT_SIZE;
pub const INT_SLOT_SIZE: usize = 8;
