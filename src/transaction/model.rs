use chrono::Utc;
use log::error;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use super::TransactionError;
use crate::wallet::{Wallet, verify_signature};

/// Sentinel sender address of a mining reward. Never signature-checked.
pub const REWARD_ADDRESS: &str = "*authorized-reward*";

/// Fixed amount minted to the miner of each block.
pub const MINING_REWARD: u64 = 50;

/// Recipient address -> credited amount. Ordered so the signed payload
/// serializes the same way everywhere.
pub type OutputMap = BTreeMap<String, u64>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TransactionInput {
    pub timestamp: i64, // ms
    /// Sender's balance when the transaction was created.
    pub amount: u64,
    /// Sender's public key (hex, compressed).
    pub address: String,
    /// Hex DER ECDSA signature over the output map.
    pub signature: String,
}

impl TransactionInput {
    /// The sentinel input carried by reward transactions.
    pub fn reward() -> Self {
        Self {
            timestamp: 0,
            amount: MINING_REWARD,
            address: REWARD_ADDRESS.to_string(),
            signature: String::new(),
        }
    }
}

/// A signed transfer from one sender to one or more recipients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Transaction {
    pub id: String,
    pub output_map: OutputMap,
    pub input: TransactionInput,
}

impl Transaction {
    /// Send `amount` from `sender` to `recipient`; the rest of the sender's
    /// balance goes back to the sender as change.
    pub fn new(sender: &Wallet, recipient: &str, amount: u64) -> Result<Self, TransactionError> {
        if amount > sender.balance {
            return Err(TransactionError::InsufficientBalance {
                amount,
                balance: sender.balance,
            });
        }

        let mut output_map = OutputMap::new();
        output_map.insert(recipient.to_string(), amount);
        // A self-transfer leaves the whole balance with the sender.
        *output_map.entry(sender.public_key().to_string()).or_insert(0) +=
            sender.balance - amount;

        let input = Self::signed_input(sender, sender.balance, &output_map);
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            output_map,
            input,
        })
    }

    /// Mint `MINING_REWARD` to `miner`.
    pub fn reward(miner: &Wallet) -> Self {
        let mut output_map = OutputMap::new();
        output_map.insert(miner.public_key().to_string(), MINING_REWARD);
        Self {
            id: Uuid::new_v4().to_string(),
            output_map,
            input: TransactionInput::reward(),
        }
    }

    /// Move another `amount` from the sender's change output to `recipient`
    /// and re-sign. Total outputs stay equal to `input.amount`.
    pub fn update(
        &mut self,
        sender: &Wallet,
        recipient: &str,
        amount: u64,
    ) -> Result<(), TransactionError> {
        let sender_output = self
            .output_map
            .get(sender.public_key())
            .copied()
            .unwrap_or(0);
        if amount > sender_output {
            return Err(TransactionError::InsufficientBalance {
                amount,
                balance: sender_output,
            });
        }

        *self.output_map.entry(recipient.to_string()).or_insert(0) += amount;
        if let Some(change) = self.output_map.get_mut(sender.public_key()) {
            *change -= amount;
        }

        self.input = Self::signed_input(sender, self.input.amount, &self.output_map);
        Ok(())
    }

    pub fn is_reward(&self) -> bool {
        self.input.address == REWARD_ADDRESS
    }

    pub fn total_output_amount(&self) -> u128 {
        self.output_map.values().map(|v| *v as u128).sum()
    }

    /// Check the output total against the input amount and the signature
    /// against the sender's key.
    pub fn check(&self) -> Result<(), TransactionError> {
        let total = self.total_output_amount();
        if total != self.input.amount as u128 {
            return Err(TransactionError::OutputSumMismatch {
                transaction: self.id.clone(),
                expected: self.input.amount,
                actual: total,
            });
        }

        let verified = verify_signature(&self.input.address, &self.output_map, &self.input.signature)
            .unwrap_or(false);
        if !verified {
            return Err(TransactionError::InvalidSignature {
                address: self.input.address.clone(),
            });
        }
        Ok(())
    }

    /// Like [`Transaction::check`] but logs the failure and returns a bool.
    pub fn is_valid(&self) -> bool {
        match self.check() {
            Ok(()) => true,
            Err(e) => {
                error!("{e}");
                false
            }
        }
    }

    fn signed_input(sender: &Wallet, amount: u64, output_map: &OutputMap) -> TransactionInput {
        TransactionInput {
            timestamp: Utc::now().timestamp_millis(),
            amount,
            address: sender.public_key().to_string(),
            signature: sender.sign(output_map),
        }
    }
}
