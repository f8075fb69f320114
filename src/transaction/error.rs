use thiserror::Error;

/// Failures while building or checking a single transaction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransactionError {
    #[error("amount {amount} exceeds balance {balance}")]
    InsufficientBalance { amount: u64, balance: u64 },

    #[error("invalid transaction {transaction}: outputs total {actual}, input amount {expected}")]
    OutputSumMismatch {
        transaction: String,
        expected: u64,
        actual: u128,
    },

    #[error("invalid signature from {address}")]
    InvalidSignature { address: String },

    #[error("malformed key material: {0}")]
    MalformedKey(String),
}
