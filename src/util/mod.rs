pub mod hash;

pub use hash::{crypto_hash, digest_bytes, leading_zero_bits, meets_difficulty};
