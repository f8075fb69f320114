use log::{error, info, warn};
use std::collections::HashSet;

use super::{Block, BlockData, ChainError, InvalidChain, InvalidTransactionData};
use crate::transaction::MINING_REWARD;
use crate::util::meets_difficulty;
use crate::wallet::Wallet;

/// In-memory chain of proof-of-work blocks, rooted at genesis.
#[derive(Debug, Clone)]
pub struct Blockchain {
    chain: Vec<Block>,
}

impl Blockchain {
    /// A chain holding only the genesis block.
    pub fn new() -> Self {
        Self {
            chain: vec![Block::genesis()],
        }
    }

    /// Read-only view of the blocks, genesis first. The chain only changes
    /// through [`Blockchain::add_block`], [`Blockchain::append_mined`] and
    /// [`Blockchain::replace_chain`].
    pub fn chain(&self) -> &[Block] {
        &self.chain
    }

    /// Return the last block in the chain.
    pub fn last_block(&self) -> &Block {
        self.chain
            .last()
            .expect("Blockchain should always have at least the genesis block")
    }

    /// Mine `payload` on top of the tip and append it.
    pub fn add_block(&mut self, payload: BlockData) -> &Block {
        let block = Block::mine_block(self.last_block(), payload);
        self.chain.push(block);
        self.last_block()
    }

    /// Append a block mined elsewhere. It must extend the current tip and
    /// carry a valid seal.
    pub fn append_mined(&mut self, block: Block) -> Result<&Block, ChainError> {
        let last = self.last_block();
        if block.parent_hash != last.seal_hash {
            return Err(ChainError::StaleTip);
        }
        let index = self.chain.len();
        check_block(last, &block, index)?;
        self.chain.push(block);
        Ok(self.last_block())
    }

    /// Structural validation of `chain`: genesis root, parent links, seal
    /// hashes, proof of work and difficulty steps of at most one.
    pub fn validate_chain(chain: &[Block]) -> Result<(), InvalidChain> {
        let first = chain.first().ok_or(InvalidChain::Empty)?;
        if *first != Block::genesis() {
            return Err(InvalidChain::GenesisMismatch);
        }

        for (index, pair) in chain.windows(2).enumerate() {
            check_block(&pair[0], &pair[1], index + 1)?;
        }
        Ok(())
    }

    pub fn is_valid_chain(chain: &[Block]) -> bool {
        Self::validate_chain(chain).is_ok()
    }

    /// Validate the transactions of a candidate `chain`. Input amounts are
    /// checked against balances derived from this ledger's own chain, not
    /// the candidate's.
    pub fn check_transaction_data(&self, chain: &[Block]) -> Result<(), InvalidTransactionData> {
        for (index, block) in chain.iter().enumerate().skip(1) {
            let BlockData::Transactions(transactions) = &block.payload else {
                return Err(InvalidTransactionData::OpaquePayload { index });
            };

            let mut seen = HashSet::new();
            let mut reward_count = 0;

            for tx in transactions {
                if tx.is_reward() {
                    reward_count += 1;
                    if reward_count > 1 {
                        return Err(InvalidTransactionData::MultipleRewards { index });
                    }
                    let mut outputs = tx.output_map.values();
                    if outputs.next() != Some(&MINING_REWARD) || outputs.next().is_some() {
                        return Err(InvalidTransactionData::InvalidReward { index });
                    }
                } else {
                    tx.check()
                        .map_err(|source| InvalidTransactionData::InvalidTransaction {
                            index,
                            source,
                        })?;

                    let true_balance = self.balance_of(&tx.input.address);
                    if tx.input.amount != true_balance {
                        return Err(InvalidTransactionData::InputAmountMismatch {
                            index,
                            transaction: tx.id.clone(),
                            claimed: tx.input.amount,
                            actual: true_balance,
                        });
                    }
                }

                if !seen.insert(tx.id.as_str()) {
                    return Err(InvalidTransactionData::DuplicateTransaction {
                        index,
                        transaction: tx.id.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    pub fn valid_transaction_data(&self, chain: &[Block]) -> bool {
        match self.check_transaction_data(chain) {
            Ok(()) => true,
            Err(e) => {
                error!("{e}");
                false
            }
        }
    }

    /// Replace the whole chain with `chain` if it is longer and valid. With
    /// `validate_transactions` its transaction data must also check out.
    /// On rejection nothing changes.
    pub fn replace_chain(
        &mut self,
        chain: Vec<Block>,
        validate_transactions: bool,
    ) -> Result<(), ChainError> {
        if chain.len() <= self.chain.len() {
            warn!(
                "The incoming chain must be longer ({} <= {})",
                chain.len(),
                self.chain.len()
            );
            return Err(ChainError::NotLonger {
                incoming: chain.len(),
                current: self.chain.len(),
            });
        }

        if let Err(e) = Self::validate_chain(&chain) {
            error!("The incoming chain must be valid: {e}");
            return Err(e.into());
        }

        if validate_transactions {
            if let Err(e) = self.check_transaction_data(&chain) {
                error!("The incoming chain has invalid data: {e}");
                return Err(e.into());
            }
        }

        info!(
            "Replacing chain (length {} -> {}, tip {})",
            self.chain.len(),
            chain.len(),
            chain.last().map(|b| b.seal_hash.as_str()).unwrap_or_default()
        );
        self.chain = chain;
        Ok(())
    }

    /// Balance of `address` derived from this chain.
    pub fn balance_of(&self, address: &str) -> u64 {
        Wallet::calculate_balance(&self.chain, address)
    }

    pub fn len(&self) -> usize {
        self.chain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }
}

impl Default for Blockchain {
    fn default() -> Self {
        Self::new()
    }
}

fn check_block(prev: &Block, block: &Block, index: usize) -> Result<(), InvalidChain> {
    if block.parent_hash != prev.seal_hash {
        return Err(InvalidChain::BrokenLink { index });
    }
    if block.seal_hash != block.compute_hash() {
        return Err(InvalidChain::HashMismatch { index });
    }
    if prev.difficulty.abs_diff(block.difficulty) > 1 {
        return Err(InvalidChain::DifficultyJump {
            index,
            from: prev.difficulty,
            to: block.difficulty,
        });
    }
    if !meets_difficulty(&block.seal_hash, block.difficulty) {
        return Err(InvalidChain::InsufficientWork { index });
    }
    Ok(())
}
