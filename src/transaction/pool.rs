//! Staging area for transactions that are not on-chain yet.

use log::{debug, warn};
use std::collections::{HashMap, HashSet};

use super::{Transaction, TransactionError};
use crate::blockchain::{Block, BlockData};

/// Pending transactions keyed by id.
///
/// Insertion order is kept so that mining picks transactions in the order
/// they were first staged.
#[derive(Debug, Default, Clone)]
pub struct TransactionPool {
    transactions: HashMap<String, Transaction>,
    order: Vec<String>,
}

impl TransactionPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace by id. A replaced transaction keeps its position.
    pub fn set_transaction(&mut self, transaction: Transaction) {
        if !self.transactions.contains_key(&transaction.id) {
            self.order.push(transaction.id.clone());
        }
        debug!("pool - staged transaction {}", transaction.id);
        self.transactions.insert(transaction.id.clone(), transaction);
    }

    /// First staged transaction sent from `address`.
    pub fn existing_transaction(&self, address: &str) -> Option<&Transaction> {
        self.iter().find(|t| t.input.address == address)
    }

    /// Mutable access to the staged transaction sent from `address`.
    pub fn existing_transaction_mut(&mut self, address: &str) -> Option<&mut Transaction> {
        let id = self
            .iter()
            .find(|t| t.input.address == address)?
            .id
            .clone();
        self.transactions.get_mut(&id)
    }

    /// Split staged transactions into the valid ones and the rejected ids
    /// with their failure. Does not modify the pool.
    pub fn screen(&self) -> (Vec<Transaction>, Vec<(String, TransactionError)>) {
        let mut valid = Vec::new();
        let mut rejected = Vec::new();
        for tx in self.iter() {
            match tx.check() {
                Ok(()) => valid.push(tx.clone()),
                Err(e) => rejected.push((tx.id.clone(), e)),
            }
        }
        (valid, rejected)
    }

    /// Transactions that pass validation, in staging order. Invalid entries
    /// stay in the pool; each one is logged.
    pub fn valid_transactions(&self) -> Vec<Transaction> {
        let (valid, rejected) = self.screen();
        for (id, e) in &rejected {
            warn!("pool - skipping transaction {id}: {e}");
        }
        valid
    }

    /// Drop every staged transaction that appears in `chain`.
    pub fn clear_blockchain_transactions(&mut self, chain: &[Block]) {
        let confirmed: HashSet<&str> = chain
            .iter()
            .skip(1)
            .filter_map(|b| match &b.payload {
                BlockData::Transactions(txs) => Some(txs),
                BlockData::Opaque(_) => None,
            })
            .flatten()
            .map(|t| t.id.as_str())
            .collect();

        let before = self.transactions.len();
        self.transactions.retain(|id, _| !confirmed.contains(id.as_str()));
        self.order.retain(|id| !confirmed.contains(id.as_str()));
        debug!(
            "pool - pruned {} confirmed transactions ({} left)",
            before - self.transactions.len(),
            self.transactions.len()
        );
    }

    pub fn clear(&mut self) {
        self.transactions.clear();
        self.order.clear();
    }

    /// Snapshot of the id -> transaction map.
    pub fn transaction_map(&self) -> HashMap<String, Transaction> {
        self.transactions.clone()
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Staged transactions in staging order.
    pub fn iter(&self) -> impl Iterator<Item = &Transaction> {
        self.order.iter().filter_map(|id| self.transactions.get(id))
    }
}
