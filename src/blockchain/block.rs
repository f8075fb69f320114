use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::atomic::{AtomicBool, Ordering};

use super::{GENESIS_DATA, GENESIS_HASH, INITIAL_DIFFICULTY, MINE_RATE_MS};
use crate::transaction::Transaction;
use crate::util::{crypto_hash, meets_difficulty};

/// What a block carries: a list of transactions or any other JSON value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BlockData {
    Transactions(Vec<Transaction>),
    Opaque(Value),
}

impl From<Vec<Transaction>> for BlockData {
    fn from(transactions: Vec<Transaction>) -> Self {
        BlockData::Transactions(transactions)
    }
}

impl From<&str> for BlockData {
    fn from(data: &str) -> Self {
        BlockData::Opaque(Value::String(data.to_string()))
    }
}

/// A proof-of-work sealed block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Block {
    pub timestamp: i64, // Unix ms (UTC)
    pub parent_hash: String,
    /// Hash over every other field; must carry `difficulty` leading zero bits.
    pub seal_hash: String,
    pub difficulty: u32,
    pub nonce: u64,
    pub payload: BlockData,
}

impl Block {
    /// The fixed chain root. Never mined.
    pub fn genesis() -> Self {
        Self {
            timestamp: 0,
            parent_hash: GENESIS_HASH.to_string(),
            seal_hash: GENESIS_HASH.to_string(),
            difficulty: INITIAL_DIFFICULTY,
            nonce: 0,
            payload: BlockData::from(GENESIS_DATA),
        }
    }

    /// Mine a child of `last` carrying `payload`. Runs until a nonce is found.
    pub fn mine_block(last: &Block, payload: BlockData) -> Block {
        let payload_value = json!(payload);
        let mut nonce: u64 = 0;
        loop {
            nonce = nonce.wrapping_add(1);
            if let Some(block) = Self::try_nonce(last, &payload, &payload_value, nonce) {
                return block;
            }
        }
    }

    /// Like [`Block::mine_block`] but checks `stop` between attempts and
    /// returns `None` once it is set.
    pub fn mine_block_until(last: &Block, payload: BlockData, stop: &AtomicBool) -> Option<Block> {
        let payload_value = json!(payload);
        let mut nonce: u64 = 0;
        while !stop.load(Ordering::Relaxed) {
            nonce = nonce.wrapping_add(1);
            if let Some(block) = Self::try_nonce(last, &payload, &payload_value, nonce) {
                return Some(block);
            }
        }
        None
    }

    fn try_nonce(
        last: &Block,
        payload: &BlockData,
        payload_value: &Value,
        nonce: u64,
    ) -> Option<Block> {
        let timestamp = Utc::now().timestamp_millis();
        let difficulty = Self::adjust_difficulty(last, timestamp);
        let seal_hash = seal(timestamp, &last.seal_hash, payload_value, nonce, difficulty);
        if !meets_difficulty(&seal_hash, difficulty) {
            return None;
        }
        Some(Block {
            timestamp,
            parent_hash: last.seal_hash.clone(),
            seal_hash,
            difficulty,
            nonce,
            payload: payload.clone(),
        })
    }

    /// Difficulty for a child of `parent` mined at `timestamp`: one lower
    /// if the interval exceeded `MINE_RATE_MS`, one higher otherwise, never
    /// below 1.
    pub fn adjust_difficulty(parent: &Block, timestamp: i64) -> u32 {
        let difficulty = parent.difficulty;
        if difficulty < 1 {
            return 1;
        }
        if timestamp - parent.timestamp > MINE_RATE_MS {
            return (difficulty - 1).max(1);
        }
        difficulty + 1
    }

    /// Recompute the seal hash from the stored fields.
    pub fn compute_hash(&self) -> String {
        seal(
            self.timestamp,
            &self.parent_hash,
            &json!(self.payload),
            self.nonce,
            self.difficulty,
        )
    }

    /// Stored seal hash matches the contents and carries enough work.
    pub fn is_sealed(&self) -> bool {
        self.seal_hash == self.compute_hash() && meets_difficulty(&self.seal_hash, self.difficulty)
    }

    /// Transactions in the payload; empty for opaque payloads.
    pub fn transactions(&self) -> &[Transaction] {
        match &self.payload {
            BlockData::Transactions(txs) => txs,
            BlockData::Opaque(_) => &[],
        }
    }
}

fn seal(timestamp: i64, parent_hash: &str, payload: &Value, nonce: u64, difficulty: u32) -> String {
    crypto_hash(&[
        json!(timestamp),
        json!(parent_hash),
        payload.clone(),
        json!(nonce),
        json!(difficulty),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::leading_zero_bits;
    use crate::wallet::Wallet;

    fn last_block() -> Block {
        Block {
            timestamp: 2000,
            parent_hash: "foo-hash".into(),
            seal_hash: "bar-hash".into(),
            difficulty: 3,
            nonce: 1,
            payload: BlockData::from("data"),
        }
    }

    #[test]
    fn genesis_is_fixed() {
        let g = Block::genesis();
        assert_eq!(g, Block::genesis());
        assert_eq!(g.timestamp, 0);
        assert_eq!(g.parent_hash, GENESIS_HASH);
        assert_eq!(g.seal_hash, GENESIS_HASH);
        assert_eq!(g.difficulty, INITIAL_DIFFICULTY);
        assert_eq!(g.nonce, 0);
    }

    #[test]
    fn mined_block_links_to_parent() {
        let last = last_block();
        let b = Block::mine_block(&last, BlockData::from("mined data"));
        assert_eq!(b.parent_hash, last.seal_hash);
        assert_eq!(b.payload, BlockData::from("mined data"));
        assert!(b.timestamp > 0);
    }

    #[test]
    fn mined_block_hash_matches_fields() {
        let b = Block::mine_block(&last_block(), BlockData::from("mined data"));
        let expected = crypto_hash(&[
            json!(b.timestamp),
            json!(b.nonce),
            json!(b.difficulty),
            json!(b.parent_hash),
            json!("mined data"),
        ]);
        assert_eq!(b.seal_hash, expected);
        assert_eq!(b.seal_hash, b.compute_hash());
    }

    #[test]
    fn mined_block_meets_its_difficulty() {
        let b = Block::mine_block(&last_block(), BlockData::from("mined data"));
        assert!(leading_zero_bits(&b.seal_hash) >= b.difficulty);
        assert!(b.is_sealed());
    }

    #[test]
    fn mined_block_difficulty_moves_by_one() {
        let last = last_block();
        let b = Block::mine_block(&last, BlockData::from("mined data"));
        let possible = [last.difficulty + 1, last.difficulty - 1];
        assert!(possible.contains(&b.difficulty));
    }

    #[test]
    fn raises_difficulty_for_fast_block() {
        let last = last_block();
        let ts = last.timestamp + MINE_RATE_MS - 100;
        assert_eq!(Block::adjust_difficulty(&last, ts), last.difficulty + 1);
        let ts = last.timestamp + MINE_RATE_MS;
        assert_eq!(Block::adjust_difficulty(&last, ts), last.difficulty + 1);
    }

    #[test]
    fn lowers_difficulty_for_slow_block() {
        let last = last_block();
        let ts = last.timestamp + MINE_RATE_MS + 100;
        assert_eq!(Block::adjust_difficulty(&last, ts), last.difficulty - 1);
    }

    #[test]
    fn difficulty_has_floor_of_one() {
        let mut last = last_block();
        last.difficulty = 0;
        assert_eq!(Block::adjust_difficulty(&last, last.timestamp), 1);
        last.difficulty = 1;
        assert_eq!(Block::adjust_difficulty(&last, last.timestamp + 10 * MINE_RATE_MS), 1);
    }

    #[test]
    fn cancelled_mining_returns_none() {
        let stop = AtomicBool::new(true);
        assert!(Block::mine_block_until(&last_block(), BlockData::from("x"), &stop).is_none());
    }

    #[test]
    fn uncancelled_mining_finishes() {
        let stop = AtomicBool::new(false);
        let b = Block::mine_block_until(&last_block(), BlockData::from("x"), &stop).expect("mined");
        assert!(b.is_sealed());
    }

    #[test]
    fn tampering_breaks_seal() {
        let mut b = Block::mine_block(&last_block(), BlockData::from("mined data"));
        b.payload = BlockData::from("evil data");
        assert!(!b.is_sealed());
    }

    #[test]
    fn hash_survives_json_roundtrip() {
        let tx = Transaction::new(&Wallet::new(), "r", 5).expect("funds");
        let b = Block::mine_block(&last_block(), BlockData::from(vec![tx]));
        let json = serde_json::to_string(&b).expect("serialize");
        assert!(json.contains("sealHash"));
        let back: Block = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, b);
        assert_eq!(back.compute_hash(), b.seal_hash);
        assert_eq!(back.transactions().len(), 1);
    }

    #[test]
    fn unknown_fields_do_not_change_the_seal() {
        let tx = Transaction::new(&Wallet::new(), "r", 5).expect("funds");
        let mut tx_json = serde_json::to_value(&tx).expect("serialize");
        tx_json["memo"] = serde_json::json!("extra");
        let b = Block::mine_block(&last_block(), BlockData::Opaque(Value::Array(vec![tx_json])));

        // Not a transaction list, so it is kept verbatim and still re-hashes.
        let json = serde_json::to_string(&b).expect("serialize");
        let back: Block = serde_json::from_str(&json).expect("deserialize");
        assert!(matches!(back.payload, BlockData::Opaque(_)));
        assert!(back.transactions().is_empty());
        assert!(back.is_sealed());

        let mut block_json = serde_json::to_value(&b).expect("serialize");
        block_json["height"] = serde_json::json!(1);
        assert!(serde_json::from_value::<Block>(block_json).is_err());
    }
}
