use std::env;

/// Process settings read from the environment (and `.env`, via dotenvy).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Hex secp256k1 secret for the node wallet. A random key is used when unset.
    pub node_secret_key: Option<String>,
    /// Mine some demo traffic at startup.
    pub seed_demo: bool,
    pub seed_rounds: usize,
}

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_SEED_ROUNDS: usize = 20;

impl Config {
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup. Unparseable values fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = lookup("PORT")
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_PORT);
        let node_secret_key = lookup("NODE_SECRET_KEY").filter(|v| !v.trim().is_empty());
        let seed_demo = lookup("SEED_DEMO")
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);
        let seed_rounds = lookup("SEED_ROUNDS")
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_SEED_ROUNDS);

        Self {
            host,
            port,
            node_secret_key,
            seed_demo,
            seed_rounds,
        }
    }
}
