use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Sqlite,
    Json,
    Memory,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub backend: Backend,
    pub db_path: PathBuf,
    pub state_path: PathBuf,
    pub flush_debounce: Duration,
    pub seed_samples: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.into());

        let port = var("WHISPR_PORT", "5000")
            .parse()
            .context("WHISPR_PORT must be a port number")?;
        let backend = match var("WHISPR_BACKEND", "sqlite").to_ascii_lowercase().as_str() {
            "sqlite" => Backend::Sqlite,
            "json" => Backend::Json,
            "memory" => Backend::Memory,
            other => bail!("unknown WHISPR_BACKEND '{}'", other),
        };
        let debounce_ms: u64 = var("WHISPR_FLUSH_DEBOUNCE_MS", "250")
            .parse()
            .context("WHISPR_FLUSH_DEBOUNCE_MS must be a number of milliseconds")?;
        let seed_samples = match var("WHISPR_SEED_SAMPLES", "false").to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" => true,
            "0" | "false" | "no" | "" => false,
            other => bail!("WHISPR_SEED_SAMPLES must be true or false, got '{}'", other),
        };

        Ok(Self {
            host: var("WHISPR_HOST", "0.0.0.0"),
            port,
            backend,
            db_path: var("WHISPR_DB_PATH", "whispr.db").into(),
            state_path: var("WHISPR_STATE_PATH", ".data/whispr-state.json").into(),
            flush_debounce: Duration::from_millis(debounce_ms),
            seed_samples,
        })
    }

    pub fn addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid bind address {}:{}", self.host, self.port))
    }
}
