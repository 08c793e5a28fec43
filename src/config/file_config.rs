use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// `verify-db.toml`. Every key is optional and overrides the CLI.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    /// `postgrest` or `sqlite`
    pub backend: Option<String>,
    pub url: Option<String>,
    pub key: Option<String>,
    pub sqlite_path: Option<String>,
    pub schema: Option<String>,
    pub timeout_sec: Option<u64>,
    pub strict: Option<bool>,

    pub verify: Option<VerifyFileConfig>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct VerifyFileConfig {
    /// Restricts the accessibility loop to these tables, in this order.
    pub tables: Option<Vec<String>>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}
