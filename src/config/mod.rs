mod file_config;

pub use file_config::{FileConfig, VerifyFileConfig};

use anyhow::{anyhow, bail, Result};
use clap::ValueEnum;
use std::path::PathBuf;
use std::time::Duration;

use crate::store::validate_identifier;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Backend {
    /// Remote PostgREST endpoint (Supabase).
    #[default]
    Postgrest,
    /// Local SQLite mirror.
    Sqlite,
}

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub backend: Backend,
    pub url: Option<String>,
    pub key: Option<String>,
    pub sqlite_path: Option<PathBuf>,
    pub schema: Option<String>,
    pub timeout_sec: Option<u64>,
    pub strict: bool,
    pub tables: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StoreSettings {
    Postgrest {
        url: String,
        key: String,
        timeout: Duration,
    },
    Sqlite {
        path: PathBuf,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub store: StoreSettings,
    /// Namespace passed to every store read.
    pub schema: String,
    pub strict: bool,
    /// Custom accessibility roster; `None` means every declared table.
    pub tables: Option<Vec<String>>,
}

pub const DEFAULT_SCHEMA: &str = "public";
pub const DEFAULT_TIMEOUT_SEC: u64 = 30;

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let backend = match file.backend {
            Some(name) => parse_backend(&name)
                .ok_or_else(|| anyhow!("Unknown backend in config file: {:?}", name))?,
            None => cli.backend,
        };

        let timeout_sec = file
            .timeout_sec
            .or(cli.timeout_sec)
            .unwrap_or(DEFAULT_TIMEOUT_SEC);
        if timeout_sec == 0 {
            bail!("timeout_sec must be greater than zero");
        }

        let store = match backend {
            Backend::Postgrest => {
                let url = file.url.or_else(|| cli.url.clone()).ok_or_else(|| {
                    anyhow!("url must be specified via --url, NEXT_PUBLIC_SUPABASE_URL or in config file")
                })?;
                let key = file.key.or_else(|| cli.key.clone()).ok_or_else(|| {
                    anyhow!("key must be specified via --key, SUPABASE_SERVICE_ROLE_KEY or in config file")
                })?;
                if !(url.starts_with("http://") || url.starts_with("https://")) {
                    bail!("url must start with http:// or https://, got {:?}", url);
                }
                StoreSettings::Postgrest {
                    url,
                    key,
                    timeout: Duration::from_secs(timeout_sec),
                }
            }
            Backend::Sqlite => {
                let path = file
                    .sqlite_path
                    .map(PathBuf::from)
                    .or_else(|| cli.sqlite_path.clone())
                    .ok_or_else(|| {
                        anyhow!("sqlite_path must be specified via --sqlite-path or in config file")
                    })?;
                if !path.exists() {
                    bail!("SQLite database does not exist: {:?}", path);
                }
                if !path.is_file() {
                    bail!("sqlite_path is not a file: {:?}", path);
                }
                StoreSettings::Sqlite { path }
            }
        };

        let schema = file
            .schema
            .or_else(|| cli.schema.clone())
            .unwrap_or_else(|| DEFAULT_SCHEMA.to_string());
        if validate_identifier(&schema).is_err() {
            bail!("Invalid schema name: {:?}", schema);
        }

        let strict = file.strict.unwrap_or(cli.strict);

        let tables = file
            .verify
            .and_then(|v| v.tables)
            .or_else(|| (!cli.tables.is_empty()).then(|| cli.tables.clone()));

        Ok(Self {
            store,
            schema,
            strict,
            tables,
        })
    }
}

/// Parses a backend name, case-insensitively.
/// Uses clap's ValueEnum trait for parsing.
fn parse_backend(s: &str) -> Option<Backend> {
    Backend::from_str(s, true).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn postgrest_cli() -> CliConfig {
        CliConfig {
            backend: Backend::Postgrest,
            url: Some("https://abc.supabase.co".to_string()),
            key: Some("service-role".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_parse_backend() {
        assert_eq!(parse_backend("postgrest"), Some(Backend::Postgrest));
        assert_eq!(parse_backend("SQLITE"), Some(Backend::Sqlite));
        assert_eq!(parse_backend("mysql"), None);
    }

    #[test]
    fn test_resolve_cli_only() {
        let config = AppConfig::resolve(&postgrest_cli(), None).unwrap();
        assert_eq!(
            config.store,
            StoreSettings::Postgrest {
                url: "https://abc.supabase.co".to_string(),
                key: "service-role".to_string(),
                timeout: Duration::from_secs(DEFAULT_TIMEOUT_SEC),
            }
        );
        assert_eq!(config.schema, "public");
        assert!(!config.strict);
        assert!(config.tables.is_none());
    }

    #[test]
    fn test_resolve_toml_overrides_cli() {
        let cli = CliConfig {
            timeout_sec: Some(5),
            schema: Some("staging".to_string()),
            tables: vec!["users".to_string()],
            ..postgrest_cli()
        };
        let file = FileConfig {
            url: Some("https://other.supabase.co".to_string()),
            strict: Some(true),
            verify: Some(VerifyFileConfig {
                tables: Some(vec!["orgs".to_string(), "donations".to_string()]),
            }),
            ..Default::default()
        };

        let config = AppConfig::resolve(&cli, Some(file)).unwrap();

        // TOML values should override CLI
        match config.store {
            StoreSettings::Postgrest { url, key, timeout } => {
                assert_eq!(url, "https://other.supabase.co");
                // CLI value used when TOML doesn't specify
                assert_eq!(key, "service-role");
                assert_eq!(timeout, Duration::from_secs(5));
            }
            other => panic!("unexpected store settings: {:?}", other),
        }
        assert!(config.strict);
        assert_eq!(config.schema, "staging");
        assert_eq!(
            config.tables,
            Some(vec!["orgs".to_string(), "donations".to_string()])
        );
    }

    #[test]
    fn test_resolve_cli_tables_become_roster() {
        let cli = CliConfig {
            tables: vec!["users".to_string(), "orgs".to_string()],
            ..postgrest_cli()
        };
        let config = AppConfig::resolve(&cli, None).unwrap();
        assert_eq!(config.tables, Some(vec!["users".to_string(), "orgs".to_string()]));
    }

    #[test]
    fn test_resolve_missing_credentials_error() {
        let cli = CliConfig {
            key: None,
            ..postgrest_cli()
        };
        let err = AppConfig::resolve(&cli, None).unwrap_err();
        assert!(err.to_string().contains("key must be specified"));

        let cli = CliConfig {
            url: None,
            ..postgrest_cli()
        };
        let err = AppConfig::resolve(&cli, None).unwrap_err();
        assert!(err.to_string().contains("url must be specified"));
    }

    #[test]
    fn test_resolve_rejects_non_http_url() {
        let cli = CliConfig {
            url: Some("abc.supabase.co".to_string()),
            ..postgrest_cli()
        };
        let err = AppConfig::resolve(&cli, None).unwrap_err();
        assert!(err.to_string().contains("http://"));
    }

    #[test]
    fn test_resolve_sqlite_requires_existing_file() {
        let cli = CliConfig {
            backend: Backend::Sqlite,
            sqlite_path: Some(PathBuf::from("/nonexistent/mirror.db")),
            ..Default::default()
        };
        let err = AppConfig::resolve(&cli, None).unwrap_err();
        assert!(err.to_string().contains("does not exist"));

        let dir = tempfile::TempDir::new().unwrap();
        let cli = CliConfig {
            backend: Backend::Sqlite,
            sqlite_path: Some(dir.path().to_path_buf()),
            ..Default::default()
        };
        let err = AppConfig::resolve(&cli, None).unwrap_err();
        assert!(err.to_string().contains("not a file"));

        let db = NamedTempFile::new().unwrap();
        let cli = CliConfig {
            backend: Backend::Sqlite,
            sqlite_path: Some(db.path().to_path_buf()),
            ..Default::default()
        };
        let config = AppConfig::resolve(&cli, None).unwrap();
        assert_eq!(
            config.store,
            StoreSettings::Sqlite {
                path: db.path().to_path_buf()
            }
        );
    }

    #[test]
    fn test_resolve_backend_from_file() {
        let db = NamedTempFile::new().unwrap();
        let file = FileConfig {
            backend: Some("sqlite".to_string()),
            sqlite_path: Some(db.path().to_string_lossy().to_string()),
            ..Default::default()
        };
        let config = AppConfig::resolve(&postgrest_cli(), Some(file)).unwrap();
        assert!(matches!(config.store, StoreSettings::Sqlite { .. }));

        let file = FileConfig {
            backend: Some("oracle".to_string()),
            ..Default::default()
        };
        let err = AppConfig::resolve(&postgrest_cli(), Some(file)).unwrap_err();
        assert!(err.to_string().contains("Unknown backend"));
    }

    #[test]
    fn test_resolve_rejects_bad_schema_and_timeout() {
        let cli = CliConfig {
            schema: Some("Public; --".to_string()),
            ..postgrest_cli()
        };
        assert!(AppConfig::resolve(&cli, None)
            .unwrap_err()
            .to_string()
            .contains("Invalid schema name"));

        let cli = CliConfig {
            timeout_sec: Some(0),
            ..postgrest_cli()
        };
        assert!(AppConfig::resolve(&cli, None).is_err());
    }
}
