//! Room-creation wizard.
//!
//! ```text
//! Idle --start--> AwaitingRoomName --name--> AwaitingClientId
//!      --client id--> AwaitingCoderId --coder id--> Idle (room created)
//! ```
//!
//! Invalid input keeps the current step and re-prompts. A coder id equal to
//! the client id counts as invalid. The allow-list is
//! checked on every step, not only at start.

use tracing::{info, warn};

use super::access::AdminAccess;
use crate::db::{Database, Role};
use crate::outbound::{notify, Outbound};
use crate::room::{Room, RoomStore};
use crate::session::{DraftField, SessionStore, WizardState};
use crate::{RelayError, Result};

pub const ROOM_NAME_PROMPT: &str = "Enter the room name:";
pub const CLIENT_ID_PROMPT: &str = "Enter the client's user ID:";
pub const CODER_ID_PROMPT: &str = "Enter the coder's user ID:";
pub const EMPTY_NAME_NOTICE: &str = "The room name cannot be empty. Try again:";
pub const NON_NUMERIC_ID_NOTICE: &str = "The ID must be a number. Try again:";
pub const SAME_ID_NOTICE: &str = "The coder must be a different user from the client. Try again:";
pub const CANCELLED_NOTICE: &str = "Room creation cancelled.";

/// Result of feeding one input to the wizard.
#[derive(Debug, Clone, PartialEq)]
pub enum WizardStep {
    /// No wizard was in progress; the input was not consumed.
    Inactive,
    /// Input accepted; the wizard moved to the contained step.
    Advanced(WizardState),
    /// Input rejected; the wizard stays on the contained step.
    Rejected(WizardState),
    /// Last input accepted and the room was created.
    Created(Room),
}

/// Drives the room-creation wizard for administrators.
pub struct RoomWizard<'a> {
    db: &'a Database,
    sessions: &'a SessionStore,
    admins: &'a AdminAccess,
    outbound: &'a dyn Outbound,
}

impl<'a> RoomWizard<'a> {
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

    /// Start (or restart) the wizard, discarding any stale draft.
    pub async fn start(&self, admin_id: i64) -> Result<()> {
        self.admins.require(admin_id)?;

        self.sessions.clear_scratch(admin_id).await;
        self.sessions
            .set_wizard_state(admin_id, WizardState::AwaitingRoomName)
            .await;
        notify(self.outbound, admin_id, ROOM_NAME_PROMPT).await;
        Ok(())
    }

    /// Abort the wizard. Returns true if one was in progress.
    pub async fn cancel(&self, user_id: i64) -> bool {
        let cancelled = self.sessions.cancel_wizard(user_id).await;
        if cancelled {
            notify(self.outbound, user_id, CANCELLED_NOTICE).await;
        }
        cancelled
    }

    /// Feed one text input to the user's wizard.
    ///
    /// A user who lost admin rights mid-wizard gets `Authorization` and the
    /// wizard is reset. Storage errors while creating the room propagate
    /// and leave the wizard on its last step.
    pub async fn handle_input(&self, user_id: i64, input: &str) -> Result<WizardStep> {
        let state = self.sessions.wizard_state(user_id).await;
        if !state.is_active() {
            return Ok(WizardStep::Inactive);
        }

        if let Err(e) = self.admins.require(user_id) {
            self.sessions.cancel_wizard(user_id).await;
            return Err(e);
        }

        let input = input.trim();
        match state {
            WizardState::Idle => Ok(WizardStep::Inactive),
            WizardState::AwaitingRoomName => {
                if input.is_empty() {
                    return Ok(self.reject(user_id, state, EMPTY_NAME_NOTICE).await);
                }
                self.advance(
                    user_id,
                    DraftField::Name(input.to_string()),
                    WizardState::AwaitingClientId,
                    CLIENT_ID_PROMPT,
                )
                .await
            }
            WizardState::AwaitingClientId => match parse_user_id(input) {
                Some(id) => {
                    self.advance(
                        user_id,
                        DraftField::ClientId(id),
                        WizardState::AwaitingCoderId,
                        CODER_ID_PROMPT,
                    )
                    .await
                }
                None => Ok(self.reject(user_id, state, NON_NUMERIC_ID_NOTICE).await),
            },
            WizardState::AwaitingCoderId => {
                let Some(coder_id) = parse_user_id(input) else {
                    return Ok(self.reject(user_id, state, NON_NUMERIC_ID_NOTICE).await);
                };
                let client_id = self.sessions.scratch(user_id).await.client_id;
                if client_id == Some(coder_id) {
                    return Ok(self.reject(user_id, state, SAME_ID_NOTICE).await);
                }
                self.finish(user_id, coder_id).await
            }
        }
    }

    async fn advance(
        &self,
        user_id: i64,
        field: DraftField,
        next: WizardState,
        prompt: &str,
    ) -> Result<WizardStep> {
        self.sessions.advance_wizard(user_id, field, next).await;
        notify(self.outbound, user_id, prompt).await;
        Ok(WizardStep::Advanced(next))
    }

    async fn reject(&self, user_id: i64, state: WizardState, notice: &str) -> WizardStep {
        notify(self.outbound, user_id, notice).await;
        WizardStep::Rejected(state)
    }

    async fn finish(&self, admin_id: i64, coder_id: i64) -> Result<WizardStep> {
        let draft = self.sessions.scratch(admin_id).await;
        let (Some(name), Some(client_id)) = (draft.name, draft.client_id) else {
            // Draft lost its earlier fields; start over.
            self.sessions.cancel_wizard(admin_id).await;
            return Err(RelayError::Validation(
                "room draft is incomplete".to_string(),
            ));
        };

        let room = RoomStore::new(self.db)
            .create_room_with_members(&name, &[(client_id, Role::Client), (coder_id, Role::Coder)])
            .await?;

        self.sessions
            .set_wizard_state(admin_id, WizardState::Idle)
            .await;

        info!(
            user_id = admin_id,
            room_id = room.id,
            client_id,
            coder_id,
            "Room created via wizard"
        );

        let summary = format!(
            "Room '{}' created.\nRoom ID: {}\nClient: {}\nCoder: {}",
            room.name, room.id, client_id, coder_id
        );
        notify(self.outbound, admin_id, &summary).await;

        let invite = format!(
            "You have been added to the room '{}'. Use /start to enter it.",
            room.name
        );
        for member in [client_id, coder_id] {
            if let Err(e) = self.outbound.send_text(member, &invite).await {
                warn!(room_id = room.id, recipient = member, error = %e, "Failed to notify new member");
            }
        }

        Ok(WizardStep::Created(room))
    }
}

fn parse_user_id(input: &str) -> Option<i64> {
    input.parse::<i64>().ok()
}
