//! Admin-only room operations.
//!
//! Every method checks the allow-list first.

use tracing::info;

use super::access::AdminAccess;
use crate::db::{Database, Role};
use crate::outbound::{notify, Outbound};
use crate::room::{export_file_name, Member, Room, RoomStore};
use crate::session::SessionStore;
use crate::{RelayError, Result};

/// A room with its members.
#[derive(Debug, Clone, PartialEq)]
pub struct RoomInfo {
    pub room: Room,
    pub members: Vec<Member>,
}

/// A deleted room and the users whose active room it was.
#[derive(Debug, Clone, PartialEq)]
pub struct DeletedRoom {
    pub room: Room,
    pub evicted: Vec<i64>,
}

/// An exported history document.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryExport {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Service for admin room management.
pub struct AdminService<'a> {
    db: &'a Database,
    sessions: &'a SessionStore,
    admins: &'a AdminAccess,
    outbound: &'a dyn Outbound,
}

impl<'a> AdminService<'a> {
    pub fn new(
        db: &'a Database,
        sessions: &'a SessionStore,
        admins: &'a AdminAccess,
        outbound: &'a dyn Outbound,
    ) -> Self {
        Self {
            db,
            sessions,
            admins,
            outbound,
        }
    }

    fn store(&self) -> RoomStore<'a> {
        RoomStore::new(self.db)
    }

    async fn require_room(&self, room_id: i64) -> Result<Room> {
        self.store()
            .get_room(room_id)
            .await?
            .ok_or_else(|| RelayError::NotFound(format!("room {room_id}")))
    }

    /// List every room.
    pub async fn list_rooms(&self, admin_id: i64) -> Result<Vec<Room>> {
        self.admins.require(admin_id)?;
        self.store().list_all_rooms().await
    }

    /// Get a room and its members.
    pub async fn room_info(&self, admin_id: i64, room_id: i64) -> Result<RoomInfo> {
        self.admins.require(admin_id)?;
        let room = self.require_room(room_id).await?;
        let members = self.store().list_members(room_id).await?;
        Ok(RoomInfo { room, members })
    }

    /// Enter a room as administrator.
    ///
    /// Adds an `admin` membership unless the admin already belongs to the
    /// room (an existing role is kept), then makes it the active room.
    pub async fn enter_room(&self, admin_id: i64, room_id: i64) -> Result<Room> {
        self.admins.require(admin_id)?;
        let room = self.require_room(room_id).await?;

        let store = self.store();
        if !store.is_member(admin_id, room_id).await? {
            store.add_membership(room_id, admin_id, Role::Admin).await?;
        }
        self.sessions.set_active_room(admin_id, room_id).await;

        info!(user_id = admin_id, room_id, "Admin entered room");
        Ok(room)
    }

    /// Export a room's history.
    pub async fn export_history(&self, admin_id: i64, room_id: i64) -> Result<HistoryExport> {
        self.admins.require(admin_id)?;
        let bytes = self.store().export_history(room_id).await?;
        info!(user_id = admin_id, room_id, size = bytes.len(), "History exported");
        Ok(HistoryExport {
            file_name: export_file_name(room_id),
            bytes,
        })
    }

    /// Delete a room with its memberships and history.
    ///
    /// Users currently inside the room are moved out of it and told so,
    /// best-effort. The acting admin is not notified here.
    pub async fn delete_room(&self, admin_id: i64, room_id: i64) -> Result<DeletedRoom> {
        self.admins.require(admin_id)?;
        let room = self.require_room(room_id).await?;

        if !self.store().delete_room(room_id).await? {
            return Err(RelayError::NotFound(format!("room {room_id}")));
        }
        let evicted = self.sessions.evict_room(room_id).await;

        let notice = format!("The room '{}' was deleted by an administrator.", room.name);
        for &user_id in evicted.iter().filter(|&&id| id != admin_id) {
            notify(self.outbound, user_id, &notice).await;
        }

        info!(
            user_id = admin_id,
            room_id,
            evicted = evicted.len(),
            "Room deleted by admin"
        );
        Ok(DeletedRoom { room, evicted })
    }
}
