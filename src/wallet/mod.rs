use rand::rngs::OsRng;
use secp256k1::{Message, PublicKey, Secp256k1, SecretKey, ecdsa::Signature};
use serde_json::json;

use crate::blockchain::{Block, BlockData};
use crate::transaction::{Transaction, TransactionError};
use crate::util::{crypto_hash, digest_bytes};

/// Balance every address starts with before it appears on-chain.
pub const STARTING_BALANCE: u64 = 1000;

/// A secp256k1 key pair plus a cached balance snapshot.
///
/// The address is the hex of the compressed public key. `balance` is only
/// refreshed when a transaction is created against a chain; the ledger is the
/// authority (see [`Wallet::calculate_balance`]).
#[derive(Debug, Clone)]
pub struct Wallet {
    pub balance: u64,
    secret_key: SecretKey,
    public_key: String,
}

impl Wallet {
    /// Fresh random key pair with `STARTING_BALANCE`.
    pub fn new() -> Self {
        let secp = Secp256k1::new();
        let (sk, pk) = secp.generate_keypair(&mut OsRng);
        Self {
            balance: STARTING_BALANCE,
            secret_key: sk,
            public_key: hex::encode(pk.serialize()),
        }
    }

    /// Restore a wallet from a hex-encoded 32-byte secret key.
    pub fn from_secret_hex(secret_hex: &str) -> Result<Self, TransactionError> {
        let bytes = hex::decode(secret_hex.trim())
            .map_err(|_| TransactionError::MalformedKey("invalid secret key hex".into()))?;
        let sk = SecretKey::from_slice(&bytes)
            .map_err(|_| TransactionError::MalformedKey("invalid secret key bytes".into()))?;
        let secp = Secp256k1::signing_only();
        let pk = PublicKey::from_secret_key(&secp, &sk);
        Ok(Self {
            balance: STARTING_BALANCE,
            secret_key: sk,
            public_key: hex::encode(pk.serialize()),
        })
    }

    /// The wallet's address (compressed public key, hex).
    pub fn public_key(&self) -> &str {
        &self.public_key
    }

    /// Sign the canonical hash of `data`; returns a hex DER signature.
    pub fn sign<T: serde::Serialize>(&self, data: &T) -> String {
        let secp = Secp256k1::signing_only();
        let msg = Message::from_digest(signing_digest(data));
        hex::encode(secp.sign_ecdsa(&msg, &self.secret_key).serialize_der())
    }

    /// Build a transaction from this wallet. When `chain` is given the cached
    /// balance is recomputed from it first.
    pub fn create_transaction(
        &mut self,
        recipient: &str,
        amount: u64,
        chain: Option<&[Block]>,
    ) -> Result<Transaction, TransactionError> {
        if let Some(chain) = chain {
            self.balance = Self::calculate_balance(chain, &self.public_key);
        }
        Transaction::new(self, recipient, amount)
    }

    /// Derive the balance of `address` by walking `chain` backwards from the tip.
    ///
    /// Every output credited to `address` is summed until the walk finishes
    /// the most recent block in which `address` spent. That block's outputs
    /// (the change output included) are part of the result; anything older is
    /// not. Addresses that never spent also get `STARTING_BALANCE`.
    pub fn calculate_balance(chain: &[Block], address: &str) -> u64 {
        let mut has_conducted_transaction = false;
        let mut outputs_total: u64 = 0;

        for block in chain.iter().skip(1).rev() {
            let BlockData::Transactions(transactions) = &block.payload else {
                continue;
            };
            for tx in transactions {
                if tx.input.address == address {
                    has_conducted_transaction = true;
                }
                if let Some(amount) = tx.output_map.get(address) {
                    outputs_total = outputs_total.saturating_add(*amount);
                }
            }
            if has_conducted_transaction {
                break;
            }
        }

        if has_conducted_transaction {
            outputs_total
        } else {
            STARTING_BALANCE.saturating_add(outputs_total)
        }
    }
}

impl Default for Wallet {
    fn default() -> Self {
        Self::new()
    }
}

/// 32-byte message digest signed for `data`.
fn signing_digest<T: serde::Serialize>(data: &T) -> [u8; 32] {
    let hash = crypto_hash(&[json!(data)]);
    // crypto_hash always yields 64 hex chars
    digest_bytes(&hash).unwrap_or([0u8; 32])
}

/// Verify a hex DER signature over `data` against a hex compressed public key.
pub fn verify_signature<T: serde::Serialize>(
    public_key_hex: &str,
    data: &T,
    signature_hex: &str,
) -> Result<bool, TransactionError> {
    let secp = Secp256k1::verification_only();

    let sig_bytes = hex::decode(signature_hex)
        .map_err(|_| TransactionError::MalformedKey("invalid signature hex".into()))?;
    let sig = Signature::from_der(&sig_bytes)
        .map_err(|_| TransactionError::MalformedKey("invalid DER signature".into()))?;

    let pk_bytes = hex::decode(public_key_hex)
        .map_err(|_| TransactionError::MalformedKey("invalid pubkey hex".into()))?;
    let pk = PublicKey::from_slice(&pk_bytes)
        .map_err(|_| TransactionError::MalformedKey("invalid pubkey bytes".into()))?;

    let msg = Message::from_digest(signing_digest(data));
    Ok(secp.verify_ecdsa(&msg, &sig, &pk).is_ok())
}
