use sqlx::PgPool;

use super::manager::{DatabaseError, DatabaseManager};

/// Idempotent schema bootstrap, run once at startup.
///
/// Statements are `IF NOT EXISTS` so redeploys are safe; a failure here
/// (typically an unreachable database) leaves the server running with a
/// degraded /health rather than aborting.
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id            UUID PRIMARY KEY,
        username      TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        created_at    TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS records (
        id          UUID PRIMARY KEY,
        user_id     UUID NOT NULL REFERENCES users (id),
        record_type TEXT NOT NULL,
        data        JSONB NOT NULL,
        stored_at   TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS records_user_type_idx
        ON records (user_id, record_type)
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS records_user_stored_idx
        ON records (user_id, stored_at)
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS quarantine (
        id          UUID PRIMARY KEY,
        user_id     UUID NOT NULL,
        record_type TEXT NOT NULL,
        data        JSONB NOT NULL,
        reason      TEXT NOT NULL,
        stored_at   TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS record_fields (
        user_id     UUID NOT NULL,
        record_type TEXT NOT NULL,
        fields      TEXT[] NOT NULL DEFAULT '{}',
        PRIMARY KEY (user_id, record_type)
    )
    "#,
];

pub async fn ensure_schema() -> Result<(), DatabaseError> {
    let pool = DatabaseManager::service_pool().await?;
    apply_schema(&pool).await
}

pub async fn apply_schema(pool: &PgPool) -> Result<(), DatabaseError> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}
