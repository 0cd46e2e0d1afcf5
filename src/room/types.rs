//! Room, membership and history types.

use std::str::FromStr;

use crate::db::Role;

/// A room pairing a client and a coder.
#[derive(Debug, Clone, PartialEq)]
pub struct Room {
    /// Unique, monotonically assigned room ID.
    pub id: i64,
    /// Room name (never empty).
    pub name: String,
    /// Creation timestamp.
    pub created_at: String,
}

/// A room member with their display name.
#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    /// User ID.
    pub user_id: i64,
    /// Display name of the user.
    pub username: String,
    /// Role within the room, None if the stored value is unrecognised.
    pub role: Option<Role>,
}

/// A relay recipient: another member of the sender's room.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Recipient {
    /// User ID.
    pub user_id: i64,
    /// Role within the room.
    pub role: Option<Role>,
}

/// An immutable history entry.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryRecord {
    /// Entry ID.
    pub id: i64,
    /// Room the message was relayed in.
    pub room_id: i64,
    /// Sender's user ID.
    pub user_id: i64,
    /// Sender's display name at export time.
    pub username: String,
    /// Stored text: literal for text messages, a bracketed tag for media.
    pub text: String,
    /// Timestamp when the message was relayed.
    pub sent_at: String,
}

#[derive(sqlx::FromRow)]
pub(super) struct RoomRow {
    pub room_id: i64,
    pub name: String,
    pub created_at: String,
}

impl From<RoomRow> for Room {
    fn from(row: RoomRow) -> Self {
        Self {
            id: row.room_id,
            name: row.name,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
pub(super) struct MemberRow {
    pub user_id: i64,
    pub username: String,
    pub role: String,
}

impl From<MemberRow> for Member {
    fn from(row: MemberRow) -> Self {
        Self {
            user_id: row.user_id,
            username: row.username,
            role: Role::from_str(&row.role).ok(),
        }
    }
}

#[derive(sqlx::FromRow)]
pub(super) struct HistoryRow {
    pub message_id: i64,
    pub room_id: i64,
    pub user_id: i64,
    pub username: Option<String>,
    pub text: String,
    pub sent_at: String,
}

impl From<HistoryRow> for HistoryRecord {
    fn from(row: HistoryRow) -> Self {
        let username = row
            .username
            .unwrap_or_else(|| format!("user_{}", row.user_id));
        Self {
            id: row.message_id,
            room_id: row.room_id,
            user_id: row.user_id,
            username,
            text: row.text,
            sent_at: row.sent_at,
        }
    }
}
