//! Service and editor configuration

use anyhow::{Context, Result};

pub const DEFAULT_MAX_COMBINATIONS: usize = 500;

/// Limits applied to one editing session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditorConfig {
    /// Largest Cartesian product an attribute edit may produce.
    pub max_combinations: usize,
}

impl Default for EditorConfig {
    fn default() -> Self { Self { max_combinations: DEFAULT_MAX_COMBINATIONS } }
}

/// Server configuration loaded from environment variables.
///
/// | Env Var                    | Default   |
/// |----------------------------|-----------|
/// | `HOST`                     | `0.0.0.0` |
/// | `PORT`                     | `8083`    |
/// | `VARIANT_MAX_COMBINATIONS` | `500`     |
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub editor: EditorConfig,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port = match lookup("PORT") {
            Some(raw) => raw.parse().with_context(|| format!("PORT must be a valid u16, got {raw:?}"))?,
            None => 8083,
        };
        let max_combinations = match lookup("VARIANT_MAX_COMBINATIONS") {
            Some(raw) => raw.parse().with_context(|| format!("VARIANT_MAX_COMBINATIONS must be a positive integer, got {raw:?}"))?,
            None => DEFAULT_MAX_COMBINATIONS,
        };
        anyhow::ensure!(max_combinations > 0, "VARIANT_MAX_COMBINATIONS must be greater than zero");
        Ok(Self { host, port, editor: EditorConfig { max_combinations } })
    }

    pub fn bind_addr(&self) -> String { format!("{}:{}", self.host, self.port) }
}
