//! Message relay between room members.
//!
//! - [`Content`]: the closed set of relayable content kinds
//! - [`sender_title`]: the label shown in front of relayed messages
//! - [`RelayEngine`]: history write plus fan-out to the other members

mod content;
mod engine;
mod title;

pub use content::{Content, MAX_CAPTION_LEN, MAX_TEXT_LEN};
pub use engine::{RelayEngine, RelayOutcome, ALONE_NOTICE, NOT_IN_ROOM_NOTICE, ROOM_GONE_NOTICE};
pub use title::{sender_title, DEFAULT_TITLE};
