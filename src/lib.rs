pub mod blockchain;
pub mod config;
pub mod node;
pub mod transaction;
pub mod util;
pub mod wallet;

pub use blockchain::{Block, BlockData, Blockchain, ChainError};
pub use config::Config;
pub use node::Node;
pub use transaction::{Transaction, TransactionError, TransactionPool};
pub use wallet::Wallet;
