use log::{debug, info};

use super::{Node, transaction_ids};
use crate::blockchain::{Block, BlockData, ChainError};
use crate::transaction::Transaction;

impl Node {
    /// Mine every valid staged transaction plus a reward for the node
    /// wallet, then drop the mined transactions from the pool.
    ///
    /// The whole round runs under the miner lock. When the tip moves under
    /// a running round (a `replace_chain`), the transactions are picked
    /// again from the pool against the new chain.
    pub fn mine_transactions(&self) -> Result<Block, ChainError> {
        let _miner = self.lock_miner();
        let mut count = 0;

        let block = self.mine_with(|bc| {
            let on_chain = transaction_ids(bc.chain());
            let mut transactions: Vec<Transaction> = self
                .mineable_transactions()
                .into_iter()
                .filter(|tx| {
                    if on_chain.contains(tx.id.as_str()) {
                        return false;
                    }
                    let balance = bc.balance_of(&tx.input.address);
                    if balance != tx.input.amount {
                        debug!(
                            "MINER - skipping {}: input claims {}, chain balance is {balance}",
                            tx.id, tx.input.amount
                        );
                        return false;
                    }
                    true
                })
                .collect();
            count = transactions.len();
            transactions.push(Transaction::reward(&self.lock_wallet()));
            BlockData::Transactions(transactions)
        })?;

        let bc = self.read_chain();
        self.lock_pool().clear_blockchain_transactions(bc.chain());
        info!("MINER - mined {count} staged transactions into {}", block.seal_hash);
        Ok(block)
    }
}
