use super::Authenticator;
use futures_util::future::BoxFuture;
use sha2::{Digest, Sha256};
use sqlx::SqlitePool;
use tracing::{debug, warn};

/// Looks credentials up in the `users` table
#[derive(Clone)]
pub struct SqliteAuthenticator {
    pool: SqlitePool,
}

impl SqliteAuthenticator {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn hash_secret(secret: &str) -> String {
        hex::encode(Sha256::digest(secret.as_bytes()))
    }

    async fn stored_hash(&self, nickname: &str) -> Option<String> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT password_hash FROM users WHERE nickname = $1")
                .bind(nickname)
                .fetch_optional(&self.pool)
                .await
                .inspect_err(|err| warn!(nickname, %err, "Credential lookup failed"))
                .ok()?;

        row.map(|(hash,)| hash)
    }
}

impl Authenticator for SqliteAuthenticator {
    fn verify<'a>(&'a self, nickname: &'a str, secret: &'a str) -> BoxFuture<'a, bool> {
        Box::pin(async move {
            let Some(stored) = self.stored_hash(nickname).await else {
                debug!(nickname, "Unknown nickname");
                return false;
            };
            stored == Self::hash_secret(secret)
        })
    }
}
