//! User model for roomrelay.
//!
//! This module defines the User struct and the Role enum shared by users
//! and room memberships.

use std::fmt;
use std::str::FromStr;

/// Role of a participant, either globally (on the user) or per room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// The customer side of a room.
    Client,
    /// The developer side of a room.
    Coder,
    /// An administrator visiting a room. Only used for memberships.
    Admin,
}

impl Role {
    /// Convert role to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Client => "client",
            Role::Coder => "coder",
            Role::Admin => "admin",
        }
    }

    /// Label shown to other room members in front of relayed messages.
    pub fn title(&self) -> &'static str {
        match self {
            Role::Client => "Client",
            Role::Coder => "Coder",
            Role::Admin => "Administrator",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "client" => Ok(Role::Client),
            "coder" => Ok(Role::Coder),
            "admin" => Ok(Role::Admin),
            _ => Err(format!("unknown role: {s}")),
        }
    }
}

/// A user known to the bot.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    /// Chat-platform user ID.
    pub id: i64,
    /// Display name (platform username or a generated placeholder).
    pub username: String,
    /// Global role, unset for admins and users who only pressed /start.
    pub role: Option<Role>,
    /// First contact timestamp.
    pub registered_at: String,
}

/// Data for inserting a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Chat-platform user ID.
    pub id: i64,
    /// Display name.
    pub username: String,
    /// Global role.
    pub role: Option<Role>,
}

impl NewUser {
    /// Create a new user without a global role.
    pub fn new(id: i64, username: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            role: None,
        }
    }

    /// Placeholder user provisioned by an admin before first contact,
    /// named `client_<id>` / `coder_<id>`.
    pub fn placeholder(id: i64, role: Role) -> Self {
        Self::new(id, format!("{}_{}", role.as_str(), id)).with_role(role)
    }

    /// Set the global role.
    pub fn with_role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }
}
