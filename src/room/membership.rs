//! Membership repository for roomrelay.
//!
//! A membership is the durable `(room, user, role)` triple. At most one row
//! exists per `(room, user)` pair.

use std::str::FromStr;

use super::types::{Member, MemberRow, Recipient};
use crate::db::{DbPool, Role};
use crate::Result;

/// Repository for room membership rows.
pub struct MembershipRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> MembershipRepository<'a> {
    /// Create a new MembershipRepository with the given database pool reference.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Add a user to a room.
    ///
    /// Insert-or-ignore on `(room_id, user_id)`: an existing membership keeps
    /// its role. Returns true if a row was inserted.
    pub async fn add(&self, room_id: i64, user_id: i64, role: Role) -> Result<bool> {
        let result = sqlx::query(
            "INSERT OR IGNORE INTO room_members (room_id, user_id, role) VALUES (?, ?, ?)",
        )
        .bind(room_id)
        .bind(user_id)
        .bind(role.as_str())
        .execute(self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// List members of a room with their names and roles.
    pub async fn list_members(&self, room_id: i64) -> Result<Vec<Member>> {
        let rows = sqlx::query_as::<_, MemberRow>(
            "SELECT u.user_id, u.username, rm.role
             FROM users u
             JOIN room_members rm ON u.user_id = rm.user_id
             WHERE rm.room_id = ?
             ORDER BY rm.id",
        )
        .bind(room_id)
        .fetch_all(self.pool)
        .await?;
        Ok(rows.into_iter().map(Member::from).collect())
    }

    /// List every member of a room except `excluding_user_id`.
    pub async fn list_others(&self, room_id: i64, excluding_user_id: i64) -> Result<Vec<Recipient>> {
        let rows: Vec<(i64, String)> = sqlx::query_as(
            "SELECT user_id, role FROM room_members
             WHERE room_id = ? AND user_id != ?
             ORDER BY id",
        )
        .bind(room_id)
        .bind(excluding_user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(user_id, role)| Recipient {
                user_id,
                role: Role::from_str(&role).ok(),
            })
            .collect())
    }

    /// Get a user's role in a room.
    ///
    /// Returns None if the user is not a member, or if the stored role is
    /// not one this version understands.
    pub async fn get_role(&self, room_id: i64, user_id: i64) -> Result<Option<Role>> {
        let role: Option<String> =
            sqlx::query_scalar("SELECT role FROM room_members WHERE room_id = ? AND user_id = ?")
                .bind(room_id)
                .bind(user_id)
                .fetch_optional(self.pool)
                .await?;
        Ok(role.and_then(|r| Role::from_str(&r).ok()))
    }

    /// Check whether a user belongs to a room.
    pub async fn is_member(&self, user_id: i64, room_id: i64) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM room_members WHERE user_id = ? AND room_id = ?)",
        )
        .bind(user_id)
        .bind(room_id)
        .fetch_one(self.pool)
        .await?;
        Ok(exists)
    }
}
