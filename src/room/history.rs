//! Relay history storage and export.
//!
//! History is append-only: entries are never updated, and are removed only
//! together with their room.

use std::fmt::Write as _;

use chrono::Utc;

use super::types::{HistoryRecord, HistoryRow, Room};
use crate::db::DbPool;
use crate::Result;

/// First line of every export document.
pub const EXPORT_HEADER: &str = "# roomrelay history v1";

/// Repository for history entries.
pub struct HistoryRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> HistoryRepository<'a> {
    /// Create a new HistoryRepository with the given database pool reference.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Append an entry. Returns the new entry ID.
    pub async fn append(&self, room_id: i64, user_id: i64, text: &str) -> Result<i64> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO messages (room_id, user_id, text) VALUES (?, ?, ?) RETURNING message_id",
        )
        .bind(room_id)
        .bind(user_id)
        .bind(text)
        .fetch_one(self.pool)
        .await?;
        Ok(id)
    }

    /// List a room's entries in chronological order.
    pub async fn list_for_room(&self, room_id: i64) -> Result<Vec<HistoryRecord>> {
        let rows = sqlx::query_as::<_, HistoryRow>(
            "SELECT m.message_id, m.room_id, m.user_id, u.username, m.text, m.sent_at
             FROM messages m
             LEFT JOIN users u ON u.user_id = m.user_id
             WHERE m.room_id = ?
             ORDER BY m.message_id",
        )
        .bind(room_id)
        .fetch_all(self.pool)
        .await?;
        Ok(rows.into_iter().map(HistoryRecord::from).collect())
    }
}

/// File name offered to the chat client for an export.
pub fn export_file_name(room_id: i64) -> String {
    format!("room_{room_id}_history.txt")
}

/// Render a room's history as a versioned, newline-delimited document.
///
/// ```text
/// # roomrelay history v1
/// # room <id> <name>
/// # exported <rfc3339>
/// <sent_at>\t<user_id>\t<username>\t<text>
/// ```
///
/// Backslashes, tabs and newlines inside fields are escaped so every record
/// stays on one line.
pub fn render_export(room: &Room, records: &[HistoryRecord]) -> Vec<u8> {
    let mut out = String::new();
    let _ = writeln!(out, "{EXPORT_HEADER}");
    let _ = writeln!(out, "# room {} {}", room.id, escape_field(&room.name));
    let _ = writeln!(out, "# exported {}", Utc::now().to_rfc3339());
    for record in records {
        let _ = writeln!(
            out,
            "{}\t{}\t{}\t{}",
            record.sent_at,
            record.user_id,
            escape_field(&record.username),
            escape_field(&record.text)
        );
    }
    out.into_bytes()
}

fn escape_field(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '\t' => escaped.push_str("\\t"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            other => escaped.push(other),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{Database, NewUser, UserRepository};
    use crate::room::RoomRepository;

    fn record(id: i64, text: &str) -> HistoryRecord {
        HistoryRecord {
            id,
            room_id: 1,
            user_id: 100,
            username: "alice".to_string(),
            text: text.to_string(),
            sent_at: "2026-01-01 10:00:00".to_string(),
        }
    }

    #[tokio::test]
    async fn test_append_and_list() {
        let db = Database::open_in_memory().await.unwrap();
        UserRepository::new(db.pool())
            .upsert(&NewUser::new(100, "alice"))
            .await
            .unwrap();
        let room = RoomRepository::new(db.pool()).create("Alpha").await.unwrap();
        let repo = HistoryRepository::new(db.pool());

        let first = repo.append(room.id, 100, "ping").await.unwrap();
        let second = repo.append(room.id, 100, "[STICKER]").await.unwrap();
        assert!(second > first);

        let records = repo.list_for_room(room.id).await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].text, "ping");
        assert_eq!(records[0].username, "alice");
        assert_eq!(records[1].text, "[STICKER]");
    }

    #[tokio::test]
    async fn test_append_unknown_room_is_storage_error() {
        let db = Database::open_in_memory().await.unwrap();
        UserRepository::new(db.pool())
            .upsert(&NewUser::new(100, "alice"))
            .await
            .unwrap();
        let repo = HistoryRepository::new(db.pool());

        let result = repo.append(999, 100, "ping").await;
        assert!(matches!(result, Err(crate::RelayError::Storage(_))));
    }

    #[test]
    fn test_render_export_format() {
        let room = Room {
            id: 1,
            name: "Alpha".to_string(),
            created_at: "2026-01-01 09:00:00".to_string(),
        };
        let bytes = render_export(&room, &[record(1, "ping"), record(2, "[PHOTO] hi")]);
        let text = String::from_utf8(bytes).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], EXPORT_HEADER);
        assert_eq!(lines[1], "# room 1 Alpha");
        assert!(lines[2].starts_with("# exported "));
        assert_eq!(lines[3], "2026-01-01 10:00:00\t100\talice\tping");
        assert_eq!(lines[4], "2026-01-01 10:00:00\t100\talice\t[PHOTO] hi");
        assert_eq!(lines.len(), 5);
    }

    #[test]
    fn test_render_export_escapes_multiline_text() {
        let room = Room {
            id: 3,
            name: "Beta".to_string(),
            created_at: String::new(),
        };
        let bytes = render_export(&room, &[record(1, "line one\nline\ttwo \\ end")]);
        let text = String::from_utf8(bytes).unwrap();
        let last = text.lines().last().unwrap();
        assert!(last.ends_with("line one\\nline\\ttwo \\\\ end"));
        assert_eq!(text.lines().count(), 4);
    }

    #[test]
    fn test_export_file_name() {
        assert_eq!(export_file_name(12), "room_12_history.txt");
    }
}
