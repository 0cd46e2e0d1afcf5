//! Database schema and migrations for roomrelay.
//!
//! Migrations are applied sequentially when the database is first opened or
//! upgraded.

/// Database migrations.
///
/// Each migration is a SQL script executed in order. The schema_version table
/// tracks which migrations have been applied.
pub const MIGRATIONS: &[&str] = &[
    // v1: users, rooms, memberships, history
    r#"
-- Users are keyed by their chat-platform id and created on first contact
CREATE TABLE users (
    user_id         INTEGER PRIMARY KEY,
    username        TEXT NOT NULL,
    role            TEXT,                   -- 'client', 'coder', NULL for admins/unknown
    registered_at   TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE rooms (
    room_id     INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL CHECK (length(name) > 0),
    created_at  TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE room_members (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    room_id     INTEGER NOT NULL REFERENCES rooms(room_id),
    user_id     INTEGER NOT NULL REFERENCES users(user_id),
    role        TEXT NOT NULL,              -- 'client', 'coder', 'admin'
    UNIQUE(room_id, user_id)
);

CREATE INDEX idx_room_members_user_id ON room_members(user_id);

-- Append-only relay history
CREATE TABLE messages (
    message_id  INTEGER PRIMARY KEY AUTOINCREMENT,
    room_id     INTEGER NOT NULL REFERENCES rooms(room_id),
    user_id     INTEGER NOT NULL REFERENCES users(user_id),
    text        TEXT NOT NULL,
    sent_at     TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX idx_messages_room_id ON messages(room_id);
"#,
];
