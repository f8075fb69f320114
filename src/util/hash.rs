use serde_json::Value;
use sha2::{Digest, Sha256};

/// SHA-256 over a canonical form of `inputs`.
///
/// Each value is serialized to JSON, the resulting strings are sorted and
/// joined with a single space before hashing. Two call sites that pass the
/// same values in a different order therefore get the same digest, which is
/// what lets mining and validation agree on a block's seal hash.
pub fn crypto_hash(inputs: &[Value]) -> String {
    let mut parts: Vec<String> = inputs.iter().map(Value::to_string).collect();
    parts.sort();

    let mut hasher = Sha256::new();
    hasher.update(parts.join(" ").as_bytes());
    hex::encode(hasher.finalize())
}

/// Raw 32-byte form of a hex digest produced by [`crypto_hash`].
pub fn digest_bytes(hash_hex: &str) -> Option<[u8; 32]> {
    let bytes = hex::decode(hash_hex).ok()?;
    bytes.try_into().ok()
}

/// Number of leading zero bits in the binary expansion of a hex digest.
/// Non-hex input counts as zero work.
pub fn leading_zero_bits(hash_hex: &str) -> u32 {
    let mut zeros = 0;
    for c in hash_hex.chars() {
        match c.to_digit(16) {
            Some(0) => zeros += 4,
            Some(nibble) => return zeros + (nibble as u8).leading_zeros() - 4,
            None => return 0,
        }
    }
    zeros
}

/// True when `hash_hex` starts with at least `difficulty` zero bits.
pub fn meets_difficulty(hash_hex: &str, difficulty: u32) -> bool {
    leading_zero_bits(hash_hex) >= difficulty
}
