//! The relay engine: one inbound message in, one history entry and a
//! fan-out of copies to the other room members out.

use futures::future::join_all;
use tracing::{debug, info, warn};

use super::content::Content;
use super::title::sender_title;
use crate::admin::AdminAccess;
use crate::db::Database;
use crate::outbound::{notify, DeliveryResult, Outbound};
use crate::room::{Recipient, RoomStore};
use crate::session::SessionStore;
use crate::Result;

/// Notice for senders outside any room.
pub const NOT_IN_ROOM_NOTICE: &str = "You are not in a room. Use /start to pick one.";
/// Notice for senders whose active room was deleted.
pub const ROOM_GONE_NOTICE: &str = "This room no longer exists. Use /start to pick another one.";
/// Notice for senders with nobody to relay to.
pub const ALONE_NOTICE: &str = "There are no other participants in the room.";

/// What happened to a relayed message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayOutcome {
    /// Sender has no active room. Nothing stored.
    NotInRoom,
    /// Active room was deleted. The active room is cleared, nothing stored.
    RoomGone,
    /// Stored, but nobody else is in the room.
    Alone { history_id: i64 },
    /// Stored and fanned out. `failed` counts per-recipient send failures.
    Delivered {
        history_id: i64,
        delivered: usize,
        failed: usize,
    },
}

/// Relays messages between members of a room.
pub struct RelayEngine<'a> {
    db: &'a Database,
    sessions: &'a SessionStore,
    admins: &'a AdminAccess,
    outbound: &'a dyn Outbound,
}

impl<'a> RelayEngine<'a> {
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

    /// Relay `content` from `sender_id` to everyone else in the sender's
    /// active room.
    ///
    /// History is written once the room resolves, whether or not anybody
    /// else is there. Send failures are logged per recipient and never
    /// abort the fan-out. Storage failures propagate.
    pub async fn relay(&self, sender_id: i64, content: &Content) -> Result<RelayOutcome> {
        let Some(room_id) = self.sessions.active_room(sender_id).await else {
            notify(self.outbound, sender_id, NOT_IN_ROOM_NOTICE).await;
            return Ok(RelayOutcome::NotInRoom);
        };

        let store = RoomStore::new(self.db);
        if store.get_room(room_id).await?.is_none() {
            self.sessions.clear_active_room(sender_id).await;
            notify(self.outbound, sender_id, ROOM_GONE_NOTICE).await;
            return Ok(RelayOutcome::RoomGone);
        }

        let is_admin = self.admins.is_admin(sender_id);
        let room_role = store.get_membership_role(room_id, sender_id).await?;
        let title = sender_title(is_admin, room_role);

        let recipients = store.list_other_members(room_id, sender_id).await?;
        let history_id = store
            .append_history(room_id, sender_id, &content.history_text())
            .await?;

        if recipients.is_empty() {
            notify(self.outbound, sender_id, ALONE_NOTICE).await;
            debug!(user_id = sender_id, room_id, "Relay with no recipients");
            return Ok(RelayOutcome::Alone { history_id });
        }

        let caption = content.relay_caption(title);
        let sends = recipients
            .iter()
            .map(|recipient| self.deliver(recipient, content, caption.as_deref()));
        let results = join_all(sends).await;

        let mut failed = 0;
        for (recipient, result) in recipients.iter().zip(results) {
            if let Err(e) = result {
                failed += 1;
                warn!(
                    user_id = sender_id,
                    room_id,
                    recipient = recipient.user_id,
                    kind = content.kind(),
                    error = %e,
                    "Relay delivery failed"
                );
            }
        }
        let delivered = recipients.len() - failed;

        info!(
            user_id = sender_id,
            room_id,
            kind = content.kind(),
            delivered,
            failed,
            "Message relayed"
        );

        Ok(RelayOutcome::Delivered {
            history_id,
            delivered,
            failed,
        })
    }

    async fn deliver(
        &self,
        recipient: &Recipient,
        content: &Content,
        caption: Option<&str>,
    ) -> DeliveryResult {
        match content {
            Content::Other {
                chat_id,
                message_id,
                ..
            } => {
                self.outbound
                    .forward(recipient.user_id, *chat_id, *message_id)
                    .await
            }
            _ => {
                self.outbound
                    .send_content(recipient.user_id, content, caption)
                    .await
            }
        }
    }
}
