use sqlx::PgPool;
use uuid::Uuid;

use super::models::User;

#[derive(Debug, thiserror::Error)]
pub enum UserStoreError {
    #[error("username already taken: {0}")]
    UsernameTaken(String),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Account storage: one row per user, password kept as a bcrypt hash.
pub struct UserStore {
    pool: PgPool,
}

impl UserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new user record (with an already-hashed password).
    pub async fn create_user(
        &self,
        username: &str,
        password_hash: &str,
    ) -> Result<User, UserStoreError> {
        if self.find_by_username(username).await?.is_some() {
            return Err(UserStoreError::UsernameTaken(username.to_string()));
        }

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, username, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, username, password_hash, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(username)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    /// Look up a user by username.
    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>, UserStoreError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, password_hash, created_at FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }
}
