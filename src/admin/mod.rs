//! Administration for roomrelay.
//!
//! This module provides:
//! - The static admin allow-list ([`AdminAccess`])
//! - The room-creation wizard ([`RoomWizard`])
//! - Room listing, inspection, entry, export and deletion ([`AdminService`])
//!
//! Access is controlled by the allow-list alone; per-room roles grant no
//! admin rights.

mod access;
mod service;
mod wizard;

pub use access::AdminAccess;
pub use service::{AdminService, DeletedRoom, HistoryExport, RoomInfo};
pub use wizard::{
    RoomWizard, WizardStep, CANCELLED_NOTICE, CLIENT_ID_PROMPT, CODER_ID_PROMPT,
    EMPTY_NAME_NOTICE, NON_NUMERIC_ID_NOTICE, ROOM_NAME_PROMPT, SAME_ID_NOTICE,
};
