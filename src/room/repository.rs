//! Room repository for roomrelay.

use super::types::{Room, RoomRow};
use crate::db::DbPool;
use crate::{RelayError, Result};

/// Repository for room rows.
pub struct RoomRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> RoomRepository<'a> {
    /// Create a new RoomRepository with the given database pool reference.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Create a room.
    ///
    /// Returns the created room with its freshly assigned ID.
    pub async fn create(&self, name: &str) -> Result<Room> {
        validate_room_name(name)?;

        let id: i64 = sqlx::query_scalar("INSERT INTO rooms (name) VALUES (?) RETURNING room_id")
            .bind(name)
            .fetch_one(self.pool)
            .await?;

        self.get_by_id(id)
            .await?
            .ok_or_else(|| RelayError::NotFound("room".to_string()))
    }

    /// Get a room by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<Room>> {
        let row = sqlx::query_as::<_, RoomRow>(
            "SELECT room_id, name, created_at FROM rooms WHERE room_id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(row.map(Room::from))
    }

    /// List every room, oldest first.
    pub async fn list_all(&self) -> Result<Vec<Room>> {
        let rows = sqlx::query_as::<_, RoomRow>(
            "SELECT room_id, name, created_at FROM rooms ORDER BY room_id",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(rows.into_iter().map(Room::from).collect())
    }

    /// List the rooms a user is a member of.
    pub async fn list_for_user(&self, user_id: i64) -> Result<Vec<Room>> {
        let rows = sqlx::query_as::<_, RoomRow>(
            "SELECT r.room_id, r.name, r.created_at
             FROM rooms r
             JOIN room_members rm ON r.room_id = rm.room_id
             WHERE rm.user_id = ?
             ORDER BY r.room_id",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;
        Ok(rows.into_iter().map(Room::from).collect())
    }

}

/// Reject empty (or whitespace-only) room names.
pub(super) fn validate_room_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(RelayError::Validation(
            "room name must not be empty".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    async fn setup_db() -> Database {
        Database::open_in_memory().await.unwrap()
    }

    #[tokio::test]
    async fn test_create_room() {
        let db = setup_db().await;
        let repo = RoomRepository::new(db.pool());

        let room = repo.create("Alpha").await.unwrap();
        assert_eq!(room.name, "Alpha");
        assert!(room.id > 0);
        assert!(!room.created_at.is_empty());
    }

    #[tokio::test]
    async fn test_create_room_ids_are_unique() {
        let db = setup_db().await;
        let repo = RoomRepository::new(db.pool());

        let a = repo.create("Alpha").await.unwrap();
        let b = repo.create("Alpha").await.unwrap();
        assert!(b.id > a.id);
    }

    #[tokio::test]
    async fn test_create_room_empty_name() {
        let db = setup_db().await;
        let repo = RoomRepository::new(db.pool());

        assert!(matches!(
            repo.create("").await,
            Err(RelayError::Validation(_))
        ));
        assert!(matches!(
            repo.create("   ").await,
            Err(RelayError::Validation(_))
        ));
        assert!(repo.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_missing_room() {
        let db = setup_db().await;
        let repo = RoomRepository::new(db.pool());
        assert!(repo.get_by_id(42).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_all_ordered() {
        let db = setup_db().await;
        let repo = RoomRepository::new(db.pool());

        repo.create("First").await.unwrap();
        repo.create("Second").await.unwrap();

        let rooms = repo.list_all().await.unwrap();
        assert_eq!(rooms.len(), 2);
        assert_eq!(rooms[0].name, "First");
        assert_eq!(rooms[1].name, "Second");
    }
}
