//! User repository for roomrelay.

use std::str::FromStr;

use super::user::{NewUser, Role, User};
use super::DbPool;
use crate::Result;

/// Database row type for User.
#[derive(sqlx::FromRow)]
struct UserRow {
    user_id: i64,
    username: String,
    role: Option<String>,
    registered_at: String,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.user_id,
            username: row.username,
            // Unknown role strings degrade to "no role" rather than failing the read.
            role: row.role.as_deref().and_then(|r| Role::from_str(r).ok()),
            registered_at: row.registered_at,
        }
    }
}

/// Repository for user operations.
pub struct UserRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new UserRepository with the given database pool reference.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Insert the user if absent. An existing row is left untouched.
    ///
    /// Returns true if a row was inserted.
    pub async fn upsert(&self, new_user: &NewUser) -> Result<bool> {
        let result =
            sqlx::query("INSERT OR IGNORE INTO users (user_id, username, role) VALUES (?, ?, ?)")
                .bind(new_user.id)
                .bind(&new_user.username)
                .bind(new_user.role.map(|r| r.as_str()))
                .execute(self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Get a user by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT user_id, username, role, registered_at FROM users WHERE user_id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(row.map(User::from))
    }

    /// Check if a user exists.
    pub async fn exists(&self, id: i64) -> Result<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE user_id = ?)")
            .bind(id)
            .fetch_one(self.pool)
            .await?;
        Ok(exists)
    }
}
