//! Configuration management for the appointments service.

use std::env;
use std::fmt;
use std::path::PathBuf;

use crate::{Error, Result};

const DEFAULT_DB_PORT: u16 = 5432;
const DEFAULT_DB_PATH: &str = "appointments.db";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_DOCS_DIR: &str = "./docs";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Database connection settings
    pub database: DatabaseConfig,
    /// Maximum number of pooled database connections
    pub max_connections: u32,
    /// Address the standalone server binds to
    pub listen_addr: String,
    /// Directory holding the static API documentation
    pub docs_dir: PathBuf,
}

/// Which database backs the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseConfig {
    /// Networked PostgreSQL server
    Postgres {
        host: String,
        port: u16,
        name: String,
        credentials: Credentials,
    },
    /// Embedded SQLite database file (`:memory:` for a throwaway database)
    Sqlite { path: String },
}

/// Where the PostgreSQL user and password come from.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// `DB_USER` / `DB_PASS`
    Env { user: String, password: String },
    /// JSON secret in AWS Secrets Manager
    Secret { arn: String },
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::Env { user, .. } => f
                .debug_struct("Env")
                .field("user", user)
                .field("password", &"<redacted>")
                .finish(),
            Credentials::Secret { arn } => f.debug_struct("Secret").field("arn", arn).finish(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables, reading a `.env` file first if present.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let database = match var("DB_HOST") {
            Some(host) => {
                let port = match var("DB_PORT") {
                    Some(raw) => raw
                        .parse()
                        .map_err(|_| Error::Config(format!("DB_PORT is not a valid port: {}", raw)))?,
                    None => DEFAULT_DB_PORT,
                };
                let name = var("DB_NAME").ok_or_else(|| Error::Config("DB_NAME not set".into()))?;

                let credentials = match var("DB_SECRET_ARN") {
                    Some(arn) => Credentials::Secret { arn },
                    None => Credentials::Env {
                        user: var("DB_USER").ok_or_else(|| Error::Config("DB_USER not set".into()))?,
                        password: var("DB_PASS")
                            .ok_or_else(|| Error::Config("DB_PASS not set".into()))?,
                    },
                };

                DatabaseConfig::Postgres {
                    host,
                    port,
                    name,
                    credentials,
                }
            }
            None => DatabaseConfig::Sqlite {
                path: var("DB_PATH").unwrap_or_else(|| DEFAULT_DB_PATH.to_string()),
            },
        };

        let max_connections = match var("DB_MAX_CONNECTIONS") {
            Some(raw) => match raw.parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(Error::Config(format!(
                        "DB_MAX_CONNECTIONS must be a positive integer: {}",
                        raw
                    )))
                }
            },
            None => DEFAULT_MAX_CONNECTIONS,
        };

        Ok(Self {
            database,
            max_connections,
            listen_addr: var("LISTEN_ADDR").unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string()),
            docs_dir: var("DOCS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DOCS_DIR)),
        })
    }

    /// Configuration for a private in-memory SQLite database.
    pub fn in_memory() -> Self {
        Self {
            database: DatabaseConfig::Sqlite {
                path: ":memory:".to_string(),
            },
            max_connections: 1,
            listen_addr: DEFAULT_LISTEN_ADDR.to_string(),
            docs_dir: PathBuf::from(DEFAULT_DOCS_DIR),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_to_embedded_sqlite() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(
            config.database,
            DatabaseConfig::Sqlite {
                path: "appointments.db".to_string()
            }
        );
        assert_eq!(config.max_connections, 5);
        assert_eq!(config.listen_addr, "0.0.0.0:8080");
        assert_eq!(config.docs_dir, PathBuf::from("./docs"));
    }

    #[test]
    fn test_postgres_from_env_credentials() {
        let config = Config::from_lookup(lookup(&[
            ("DB_HOST", "db.internal"),
            ("DB_NAME", "clinic"),
            ("DB_USER", "clinic_app"),
            ("DB_PASS", "hunter2"),
        ]))
        .unwrap();

        assert_eq!(
            config.database,
            DatabaseConfig::Postgres {
                host: "db.internal".to_string(),
                port: 5432,
                name: "clinic".to_string(),
                credentials: Credentials::Env {
                    user: "clinic_app".to_string(),
                    password: "hunter2".to_string(),
                },
            }
        );
    }

    #[test]
    fn test_secret_arn_replaces_user_and_password() {
        let config = Config::from_lookup(lookup(&[
            ("DB_HOST", "db.internal"),
            ("DB_PORT", "6543"),
            ("DB_NAME", "clinic"),
            ("DB_SECRET_ARN", "arn:aws:secretsmanager:us-east-1:123:secret:db"),
        ]))
        .unwrap();

        match config.database {
            DatabaseConfig::Postgres {
                port, credentials, ..
            } => {
                assert_eq!(port, 6543);
                assert!(matches!(credentials, Credentials::Secret { .. }));
            }
            other => panic!("expected postgres, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_password_is_config_error() {
        let err = Config::from_lookup(lookup(&[
            ("DB_HOST", "db.internal"),
            ("DB_NAME", "clinic"),
            ("DB_USER", "clinic_app"),
        ]))
        .unwrap_err();
        assert!(matches!(err, Error::Config(ref msg) if msg.contains("DB_PASS")));
    }

    #[test]
    fn test_invalid_numbers_are_rejected() {
        let err = Config::from_lookup(lookup(&[
            ("DB_HOST", "db.internal"),
            ("DB_PORT", "not-a-port"),
            ("DB_NAME", "clinic"),
        ]))
        .unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let err = Config::from_lookup(lookup(&[("DB_MAX_CONNECTIONS", "0")])).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_empty_host_means_sqlite() {
        let config =
            Config::from_lookup(lookup(&[("DB_HOST", ""), ("DB_PATH", "/var/lib/clinic.db")]))
                .unwrap();
        assert_eq!(
            config.database,
            DatabaseConfig::Sqlite {
                path: "/var/lib/clinic.db".to_string()
            }
        );
    }

    #[test]
    fn test_debug_redacts_password() {
        let creds = Credentials::Env {
            user: "clinic_app".to_string(),
            password: "hunter2".to_string(),
        };
        let rendered = format!("{:?}", creds);
        assert!(rendered.contains("clinic_app"));
        assert!(!rendered.contains("hunter2"));
    }
}
