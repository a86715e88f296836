use match_relay::{Authenticator, SqliteAuthenticator};
use sqlx::SqlitePool;

#[sqlx::test]
async fn migrations_run_successfully(pool: SqlitePool) {
    // Verify users table has the 2 seeded accounts
    let user_count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(user_count.0, 2);
}

#[sqlx::test]
async fn seeded_accounts_verify(pool: SqlitePool) {
    let auth = SqliteAuthenticator::new(pool);

    assert!(auth.verify("player1", "senha123").await);
    assert!(auth.verify("player2", "abc123").await);
}

#[sqlx::test]
async fn wrong_secret_or_unknown_user_is_rejected(pool: SqlitePool) {
    let auth = SqliteAuthenticator::new(pool);

    assert!(!auth.verify("player1", "abc123").await);
    assert!(!auth.verify("player3", "senha123").await);
    assert!(!auth.verify("", "").await);
}

#[sqlx::test]
async fn stored_hashes_match_hash_secret(pool: SqlitePool) {
    let hash: (String,) = sqlx::query_as("SELECT password_hash FROM users WHERE nickname = $1")
        .bind("player1")
        .fetch_one(&pool)
        .await
        .unwrap();

    assert_eq!(hash.0, SqliteAuthenticator::hash_secret("senha123"));
}
