pub mod error;
pub mod model;
pub mod pool;

pub use error::TransactionError;
pub use model::{MINING_REWARD, OutputMap, REWARD_ADDRESS, Transaction, TransactionInput};
pub use pool::TransactionPool;
