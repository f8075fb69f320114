pub mod block;
pub mod error;
pub mod model;

pub use block::{Block, BlockData};
pub use error::{ChainError, InvalidChain, InvalidTransactionData};
pub use model::Blockchain;

/// Difficulty of the genesis block (leading zero bits).
pub const INITIAL_DIFFICULTY: u32 = 3;

/// Target milliseconds per block. Slower blocks lower the difficulty by one,
/// faster ones raise it by one.
pub const MINE_RATE_MS: i64 = 1000;

/// Parent hash and seal hash of the genesis block.
pub const GENESIS_HASH: &str = "0000000000000000000000000000000000000000000000000000000000000000";

/// Opaque payload carried by the genesis block.
pub const GENESIS_DATA: &str = "genesis";
