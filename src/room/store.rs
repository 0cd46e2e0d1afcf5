//! Room store facade.
//!
//! `RoomStore` is the single entry point the relay, admin and bot layers use
//! for durable state. Single-row operations go through the repositories;
//! multi-row lifecycle operations run in one transaction.

use tracing::info;

use super::history::{render_export, HistoryRepository};
use super::membership::MembershipRepository;
use super::repository::{validate_room_name, RoomRepository};
use super::types::{HistoryRecord, Member, Recipient, Room};
use crate::db::{Database, NewUser, Role, User, UserRepository};
use crate::{RelayError, Result};

/// Durable CRUD and queries over users, rooms, memberships and history.
pub struct RoomStore<'a> {
    db: &'a Database,
}

impl<'a> RoomStore<'a> {
    /// Create a new RoomStore with the given database reference.
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    fn users(&self) -> UserRepository<'_> {
        UserRepository::new(self.db.pool())
    }

    fn rooms(&self) -> RoomRepository<'_> {
        RoomRepository::new(self.db.pool())
    }

    fn members(&self) -> MembershipRepository<'_> {
        MembershipRepository::new(self.db.pool())
    }

    fn history(&self) -> HistoryRepository<'_> {
        HistoryRepository::new(self.db.pool())
    }

    // ---- users ----

    /// Insert a user if absent. Never overwrites an existing row.
    pub async fn upsert_user(&self, id: i64, name: &str, role: Option<Role>) -> Result<bool> {
        let mut new_user = NewUser::new(id, name);
        new_user.role = role;
        self.users().upsert(&new_user).await
    }

    /// Get a user by ID.
    pub async fn get_user(&self, id: i64) -> Result<Option<User>> {
        self.users().get_by_id(id).await
    }

    /// Check whether a user is known.
    pub async fn user_exists(&self, id: i64) -> Result<bool> {
        self.users().exists(id).await
    }

    // ---- rooms ----

    /// Create an empty room. Fails with `Validation` on an empty name.
    pub async fn create_room(&self, name: &str) -> Result<i64> {
        let room = self.rooms().create(name).await?;
        info!(room_id = room.id, "Room created");
        Ok(room.id)
    }

    /// Create a room together with its memberships in one transaction.
    ///
    /// Members the store does not know yet are provisioned as placeholder
    /// users named after their role (`client_<id>`, `coder_<id>`). Either the
    /// room, every user and every membership are written, or nothing is.
    pub async fn create_room_with_members(
        &self,
        name: &str,
        members: &[(i64, Role)],
    ) -> Result<Room> {
        validate_room_name(name)?;

        let mut tx = self.db.begin().await?;

        let room_id: i64 =
            sqlx::query_scalar("INSERT INTO rooms (name) VALUES (?) RETURNING room_id")
                .bind(name)
                .fetch_one(&mut *tx)
                .await?;

        for &(user_id, role) in members {
            let placeholder = NewUser::placeholder(user_id, role);
            sqlx::query("INSERT OR IGNORE INTO users (user_id, username, role) VALUES (?, ?, ?)")
                .bind(placeholder.id)
                .bind(&placeholder.username)
                .bind(placeholder.role.map(|r| r.as_str()))
                .execute(&mut *tx)
                .await?;

            sqlx::query(
                "INSERT OR IGNORE INTO room_members (room_id, user_id, role) VALUES (?, ?, ?)",
            )
            .bind(room_id)
            .bind(user_id)
            .bind(role.as_str())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        info!(room_id, members = members.len(), "Room provisioned");

        self.get_room(room_id)
            .await?
            .ok_or_else(|| RelayError::NotFound(format!("room {room_id}")))
    }

    /// Get a room by ID.
    pub async fn get_room(&self, room_id: i64) -> Result<Option<Room>> {
        self.rooms().get_by_id(room_id).await
    }

    /// List every room.
    pub async fn list_all_rooms(&self) -> Result<Vec<Room>> {
        self.rooms().list_all().await
    }

    /// List the rooms a user is a member of.
    pub async fn list_rooms_for_user(&self, user_id: i64) -> Result<Vec<Room>> {
        self.rooms().list_for_user(user_id).await
    }

    /// Delete a room with its history and memberships.
    ///
    /// History, then memberships, then the room row, all in one transaction.
    /// Returns false if the room did not exist.
    pub async fn delete_room(&self, room_id: i64) -> Result<bool> {
        let mut tx = self.db.begin().await?;

        let messages = sqlx::query("DELETE FROM messages WHERE room_id = ?")
            .bind(room_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let members = sqlx::query("DELETE FROM room_members WHERE room_id = ?")
            .bind(room_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let rooms = sqlx::query("DELETE FROM rooms WHERE room_id = ?")
            .bind(room_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;

        if rooms > 0 {
            info!(room_id, messages, members, "Room deleted");
        }
        Ok(rooms > 0)
    }

    // ---- memberships ----

    /// Add a membership. Idempotent; an existing role is not updated.
    pub async fn add_membership(&self, room_id: i64, user_id: i64, role: Role) -> Result<bool> {
        self.members().add(room_id, user_id, role).await
    }

    /// List members of a room with names and roles.
    pub async fn list_members(&self, room_id: i64) -> Result<Vec<Member>> {
        self.members().list_members(room_id).await
    }

    /// List the members of a room other than `excluding_user_id`.
    pub async fn list_other_members(
        &self,
        room_id: i64,
        excluding_user_id: i64,
    ) -> Result<Vec<Recipient>> {
        self.members().list_others(room_id, excluding_user_id).await
    }

    /// Get a user's role in a room.
    pub async fn get_membership_role(&self, room_id: i64, user_id: i64) -> Result<Option<Role>> {
        self.members().get_role(room_id, user_id).await
    }

    /// Check whether a user belongs to a room.
    pub async fn is_member(&self, user_id: i64, room_id: i64) -> Result<bool> {
        self.members().is_member(user_id, room_id).await
    }

    // ---- history ----

    /// Append a history entry. Returns the entry ID.
    pub async fn append_history(&self, room_id: i64, user_id: i64, text: &str) -> Result<i64> {
        self.history().append(room_id, user_id, text).await
    }

    /// List a room's history in chronological order.
    pub async fn list_history(&self, room_id: i64) -> Result<Vec<HistoryRecord>> {
        self.history().list_for_room(room_id).await
    }

    /// Serialize a room's history as a versioned text document.
    pub async fn export_history(&self, room_id: i64) -> Result<Vec<u8>> {
        let room = self
            .get_room(room_id)
            .await?
            .ok_or_else(|| RelayError::NotFound(format!("room {room_id}")))?;
        let records = self.list_history(room_id).await?;
        Ok(render_export(&room, &records))
    }
}
