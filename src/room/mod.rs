//! Rooms, memberships and relay history.
//!
//! The repositories wrap single tables; [`RoomStore`] combines them and owns
//! the transactional lifecycle operations (provisioning and deletion).

mod history;
mod membership;
mod repository;
mod store;
mod types;

pub use history::{export_file_name, render_export, HistoryRepository, EXPORT_HEADER};
pub use membership::MembershipRepository;
pub use repository::RoomRepository;
pub use store::RoomStore;
pub use types::{HistoryRecord, Member, Recipient, Room};
