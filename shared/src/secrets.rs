//! Database credential resolution, including AWS Secrets Manager lookups.

use aws_sdk_secretsmanager::Client as SecretsClient;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::OnceLock;
use tokio::sync::RwLock;

use crate::config::Credentials;
use crate::{Error, Result};

/// Secret strings already fetched by this process, keyed by ARN.
static SECRETS_CACHE: OnceLock<RwLock<HashMap<String, String>>> = OnceLock::new();

fn get_cache() -> &'static RwLock<HashMap<String, String>> {
    SECRETS_CACHE.get_or_init(|| RwLock::new(HashMap::new()))
}

/// Database credentials as stored in a Secrets Manager secret.
#[derive(Debug, Deserialize)]
pub struct DatabaseCredentials {
    pub username: String,
    pub password: String,
}

/// Resolve the user and password to connect with.
///
/// Environment credentials are returned as-is. A secret ARN is fetched from
/// Secrets Manager on first use and served from the process cache afterwards.
pub async fn resolve_credentials(credentials: &Credentials) -> Result<DatabaseCredentials> {
    match credentials {
        Credentials::Env { user, password } => Ok(DatabaseCredentials {
            username: user.clone(),
            password: password.clone(),
        }),
        Credentials::Secret { arn } => {
            let secret_string = match cached_secret(arn).await {
                Some(cached) => cached,
                None => {
                    let fetched = fetch_secret(arn).await?;
                    cache_secret(arn, &fetched).await;
                    fetched
                }
            };
            parse_credentials(&secret_string)
        }
    }
}

async fn cached_secret(arn: &str) -> Option<String> {
    get_cache().read().await.get(arn).cloned()
}

async fn cache_secret(arn: &str, secret_string: &str) {
    get_cache()
        .write()
        .await
        .insert(arn.to_string(), secret_string.to_string());
}

async fn fetch_secret(arn: &str) -> Result<String> {
    let sdk_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let client = SecretsClient::new(&sdk_config);

    let response = client
        .get_secret_value()
        .secret_id(arn)
        .send()
        .await
        .map_err(|e| Error::Aws(format!("Failed to get secret {}: {}", arn, e)))?;

    tracing::info!(%arn, "loaded database credentials from Secrets Manager");

    response
        .secret_string()
        .map(str::to_string)
        .ok_or_else(|| Error::Aws(format!("Secret {} has no string value", arn)))
}

fn parse_credentials(secret_string: &str) -> Result<DatabaseCredentials> {
    serde_json::from_str(secret_string)
        .map_err(|e| Error::Aws(format!("Failed to parse database credentials: {}", e)))
}
