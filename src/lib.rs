//! roomrelay - a Telegram relay bot
//!
//! An administrator pairs a client and a coder in a room; the bot relays
//! every message between room members and keeps a history per room.

pub mod admin;
pub mod bot;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod outbound;
pub mod relay;
pub mod room;
pub mod session;

pub use admin::{AdminAccess, AdminService, RoomWizard, WizardStep};
pub use bot::{AppContext, Dispatcher, EventKind, InboundEvent, Sender};
pub use config::Config;
pub use db::{Database, NewUser, Role, User, UserRepository};
pub use error::{RelayError, Result};
pub use outbound::{Button, DeliveryError, Outbound};
pub use relay::{Content, RelayEngine, RelayOutcome};
pub use room::{HistoryRecord, Member, Recipient, Room, RoomStore};
pub use session::{DraftField, RoomDraft, SessionStore, WizardState};
