//! Database connection management.

use sqlx::any::AnyPoolOptions;
use sqlx::AnyPool;
use std::time::Duration;

use crate::config::{Config, DatabaseConfig};
use crate::secrets::resolve_credentials;
use crate::{Error, Result};

const CREATE_TABLE_POSTGRES: &str = r#"
CREATE TABLE IF NOT EXISTS appointments (
    id        BIGSERIAL PRIMARY KEY,
    name      TEXT NOT NULL DEFAULT '',
    email     TEXT NOT NULL DEFAULT '',
    phone     TEXT NOT NULL DEFAULT '',
    doctor    TEXT NOT NULL DEFAULT '',
    date_time TEXT NOT NULL DEFAULT ''
)
"#;

const CREATE_TABLE_SQLITE: &str = r#"
CREATE TABLE IF NOT EXISTS appointments (
    id        INTEGER PRIMARY KEY AUTOINCREMENT,
    name      TEXT NOT NULL DEFAULT '',
    email     TEXT NOT NULL DEFAULT '',
    phone     TEXT NOT NULL DEFAULT '',
    doctor    TEXT NOT NULL DEFAULT '',
    date_time TEXT NOT NULL DEFAULT ''
)
"#;

/// Create a database connection pool and make sure the schema exists.
pub async fn create_pool(config: &Config) -> Result<AnyPool> {
    sqlx::any::install_default_drivers();

    let database_url = database_url(&config.database).await?;

    let mut options = AnyPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(3));

    // An in-memory database lives exactly as long as its connection.
    if is_in_memory(&config.database) {
        options = options
            .max_connections(1)
            .idle_timeout(None::<Duration>)
            .max_lifetime(None::<Duration>);
    }

    let pool = options
        .connect(&database_url)
        .await
        .map_err(Error::Database)?;

    ensure_schema(&pool, &config.database).await?;

    Ok(pool)
}

/// Create the `appointments` table if it is missing.
pub async fn ensure_schema(pool: &AnyPool, database: &DatabaseConfig) -> Result<()> {
    let ddl = match database {
        DatabaseConfig::Postgres { .. } => CREATE_TABLE_POSTGRES,
        DatabaseConfig::Sqlite { .. } => CREATE_TABLE_SQLITE,
    };

    sqlx::query(ddl).execute(pool).await?;
    tracing::info!("appointments schema ready");

    Ok(())
}

async fn database_url(database: &DatabaseConfig) -> Result<String> {
    match database {
        DatabaseConfig::Postgres {
            host,
            port,
            name,
            credentials,
        } => {
            let creds = resolve_credentials(credentials).await?;
            // Userinfo must be percent-encoded or `@`, `/`, `#` in a password re-split the URL.
            Ok(format!(
                "postgres://{}:{}@{}:{}/{}",
                urlencoding::encode(&creds.username),
                urlencoding::encode(&creds.password),
                host,
                port,
                name
            ))
        }
        DatabaseConfig::Sqlite { path } if path == ":memory:" => Ok("sqlite::memory:".to_string()),
        DatabaseConfig::Sqlite { path } => Ok(format!("sqlite:{}?mode=rwc", path)),
    }
}

fn is_in_memory(database: &DatabaseConfig) -> bool {
    matches!(database, DatabaseConfig::Sqlite { path } if path == ":memory:")
}
