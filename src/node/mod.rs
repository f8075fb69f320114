//! Owned handle over the ledger, the staging pool and the node's wallet.
//!
//! Every call takes the relevant locks for its whole duration, so a reader
//! never observes a half-replaced chain or a half-applied pool change.
//! Locks are always taken in the order miner, chain, pool, wallet. The miner
//! lock spans a whole mining round, from payload selection to pool prune,
//! and is also held by calls that edit staged transactions in place.

mod demo;
mod miner;

pub use demo::seed_demo;

use log::{debug, info};
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::blockchain::{Block, BlockData, Blockchain, ChainError};
use crate::transaction::{Transaction, TransactionError, TransactionPool};
use crate::wallet::Wallet;

pub struct Node {
    miner: Mutex<()>,
    blockchain: RwLock<Blockchain>,
    transaction_pool: Mutex<TransactionPool>,
    wallet: Mutex<Wallet>,
}

impl Node {
    /// Genesis-only chain, empty pool, mining rewards paid to `wallet`.
    pub fn new(wallet: Wallet) -> Self {
        Self {
            miner: Mutex::new(()),
            blockchain: RwLock::new(Blockchain::new()),
            transaction_pool: Mutex::new(TransactionPool::new()),
            wallet: Mutex::new(wallet),
        }
    }

    /// Mine `payload` on the current tip and append it. If the tip moves
    /// while mining, the block is re-mined on the new tip without any
    /// transaction the new chain already carries.
    pub fn mine(&self, payload: BlockData) -> Result<Block, ChainError> {
        let _miner = self.lock_miner();
        self.mine_with(|bc| match &payload {
            BlockData::Transactions(txs) => {
                let on_chain = transaction_ids(bc.chain());
                BlockData::Transactions(
                    txs.iter()
                        .filter(|tx| !on_chain.contains(tx.id.as_str()))
                        .cloned()
                        .collect(),
                )
            }
            BlockData::Opaque(_) => payload.clone(),
        })
    }

    /// Build a payload against the current chain, mine it off-lock and
    /// append it, rebuilding the payload each time the tip moves. The
    /// caller holds the miner lock.
    fn mine_with<F>(&self, mut select: F) -> Result<Block, ChainError>
    where
        F: FnMut(&Blockchain) -> BlockData,
    {
        loop {
            let (tip, payload) = {
                let bc = self.read_chain();
                (bc.last_block().clone(), select(&bc))
            };
            let block = Block::mine_block(&tip, payload);

            let mut bc = self.write_chain();
            let height = bc.len();
            match bc.append_mined(block) {
                Ok(block) => {
                    info!(
                        "MINER - sealed block #{} (hash={}, nonce={}, difficulty={})",
                        height,
                        block.seal_hash,
                        block.nonce,
                        block.difficulty
                    );
                    return Ok(block.clone());
                }
                Err(ChainError::StaleTip) => {
                    debug!("MINER - tip moved while mining, rebuilding payload");
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Snapshot of the chain.
    pub fn chain(&self) -> Vec<Block> {
        self.read_chain().chain().to_vec()
    }

    /// Replace the chain with `candidate` if the consensus rules allow it.
    /// On success, staged transactions now on-chain are pruned.
    pub fn replace_chain(
        &self,
        candidate: Vec<Block>,
        validate_transactions: bool,
    ) -> Result<(), ChainError> {
        let mut bc = self.write_chain();
        bc.replace_chain(candidate, validate_transactions)?;
        self.lock_pool().clear_blockchain_transactions(bc.chain());
        Ok(())
    }

    /// Stage `transaction`, replacing any staged entry with the same id.
    pub fn stage_transaction(&self, transaction: Transaction) {
        let _miner = self.lock_miner();
        self.lock_pool().set_transaction(transaction);
    }

    /// Send `amount` from the node wallet to `recipient`. Extends the
    /// wallet's staged transaction if there is one, otherwise creates a new
    /// one from the wallet's on-chain balance. Waits for a running
    /// `mine_transactions` so an update never races the post-mine prune.
    pub fn transact(&self, recipient: &str, amount: u64) -> Result<Transaction, TransactionError> {
        let _miner = self.lock_miner();
        let bc = self.read_chain();
        let mut pool = self.lock_pool();
        let mut wallet = self.lock_wallet();

        if let Some(tx) = pool.existing_transaction_mut(wallet.public_key()) {
            tx.update(&wallet, recipient, amount)?;
            return Ok(tx.clone());
        }

        let tx = wallet.create_transaction(recipient, amount, Some(bc.chain()))?;
        pool.set_transaction(tx.clone());
        Ok(tx)
    }

    /// Create a transaction from some other `sender` against the current
    /// chain and stage it.
    pub fn transact_from(
        &self,
        sender: &mut Wallet,
        recipient: &str,
        amount: u64,
    ) -> Result<Transaction, TransactionError> {
        let bc = self.read_chain();
        let tx = sender.create_transaction(recipient, amount, Some(bc.chain()))?;
        self.lock_pool().set_transaction(tx.clone());
        Ok(tx)
    }

    pub fn staged_transactions(&self) -> HashMap<String, Transaction> {
        self.lock_pool().transaction_map()
    }

    /// Staged transactions that would be accepted into a block.
    pub fn mineable_transactions(&self) -> Vec<Transaction> {
        self.lock_pool().valid_transactions()
    }

    pub fn balance_of(&self, address: &str) -> u64 {
        self.read_chain().balance_of(address)
    }

    /// Node wallet address and its on-chain balance.
    pub fn wallet_info(&self) -> (String, u64) {
        let bc = self.read_chain();
        let wallet = self.lock_wallet();
        let address = wallet.public_key().to_string();
        let balance = bc.balance_of(&address);
        (address, balance)
    }

    pub fn address(&self) -> String {
        self.lock_wallet().public_key().to_string()
    }

    fn lock_miner(&self) -> MutexGuard<'_, ()> {
        self.miner.lock().expect("miner mutex poisoned")
    }

    fn read_chain(&self) -> RwLockReadGuard<'_, Blockchain> {
        self.blockchain.read().expect("blockchain lock poisoned")
    }

    fn write_chain(&self) -> RwLockWriteGuard<'_, Blockchain> {
        self.blockchain.write().expect("blockchain lock poisoned")
    }

    fn lock_pool(&self) -> MutexGuard<'_, TransactionPool> {
        self.transaction_pool.lock().expect("pool mutex poisoned")
    }

    fn lock_wallet(&self) -> MutexGuard<'_, Wallet> {
        self.wallet.lock().expect("wallet mutex poisoned")
    }
}

/// Ids of every transaction carried by `chain`, genesis excluded.
fn transaction_ids(chain: &[Block]) -> HashSet<&str> {
    chain
        .iter()
        .skip(1)
        .flat_map(Block::transactions)
        .map(|tx| tx.id.as_str())
        .collect()
}

impl Default for Node {
    fn default() -> Self {
        Self::new(Wallet::new())
    }
}
