use thiserror::Error;

use crate::transaction::TransactionError;

/// Why a candidate chain failed structural validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidChain {
    #[error("chain is empty")]
    Empty,

    #[error("chain does not start with the genesis block")]
    GenesisMismatch,

    #[error("block {index} does not link to its parent")]
    BrokenLink { index: usize },

    #[error("block {index} seal hash does not match its contents")]
    HashMismatch { index: usize },

    #[error("block {index} seal hash does not meet its difficulty")]
    InsufficientWork { index: usize },

    #[error("block {index} difficulty jumped from {from} to {to}")]
    DifficultyJump { index: usize, from: u32, to: u32 },
}

/// Why the transactions of a candidate chain were rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidTransactionData {
    #[error("block {index} payload is not a transaction list")]
    OpaquePayload { index: usize },

    #[error("block {index} has more than one miner reward")]
    MultipleRewards { index: usize },

    #[error("block {index} miner reward amount is invalid")]
    InvalidReward { index: usize },

    #[error("block {index}: {source}")]
    InvalidTransaction {
        index: usize,
        #[source]
        source: TransactionError,
    },

    #[error("block {index}: transaction {transaction} claims input {claimed}, balance is {actual}")]
    InputAmountMismatch {
        index: usize,
        transaction: String,
        claimed: u64,
        actual: u64,
    },

    #[error("block {index}: transaction {transaction} appears more than once")]
    DuplicateTransaction { index: usize, transaction: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    #[error("incoming chain must be longer (incoming {incoming}, current {current})")]
    NotLonger { incoming: usize, current: usize },

    #[error("incoming chain is invalid: {0}")]
    InvalidChain(#[from] InvalidChain),

    #[error("incoming chain has invalid transaction data: {0}")]
    InvalidTransactionData(#[from] InvalidTransactionData),

    #[error("mined block no longer extends the chain tip")]
    StaleTip,
}
