//! In-memory per-user session state.
//!
//! A session tracks which room a user is currently relaying through and
//! where the user stands in the room-creation wizard. Sessions live only in
//! process memory and are lost on restart.
//!
//! The store is shared across every event handler. Handlers for different
//! users touch independent entries; two handlers for the same user serialize
//! on the map lock, so each update is applied whole (last write wins).

use std::collections::HashMap;

use tokio::sync::RwLock;

/// Step of the room-creation wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WizardState {
    /// No wizard in progress.
    #[default]
    Idle,
    /// Waiting for the room name.
    AwaitingRoomName,
    /// Waiting for the client's numeric user id.
    AwaitingClientId,
    /// Waiting for the coder's numeric user id.
    AwaitingCoderId,
}

impl WizardState {
    /// Whether a wizard is in progress.
    pub fn is_active(&self) -> bool {
        !matches!(self, WizardState::Idle)
    }
}

/// Partially collected room-creation payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoomDraft {
    pub name: Option<String>,
    pub client_id: Option<i64>,
    pub coder_id: Option<i64>,
}

/// One field of a [`RoomDraft`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftField {
    Name(String),
    ClientId(i64),
    CoderId(i64),
}

impl RoomDraft {
    fn set(&mut self, field: DraftField) {
        match field {
            DraftField::Name(name) => self.name = Some(name),
            DraftField::ClientId(id) => self.client_id = Some(id),
            DraftField::CoderId(id) => self.coder_id = Some(id),
        }
    }
}

#[derive(Debug, Default)]
struct UserSession {
    active_room: Option<i64>,
    wizard: WizardState,
    draft: RoomDraft,
}

impl UserSession {
    fn is_empty(&self) -> bool {
        self.active_room.is_none() && !self.wizard.is_active() && self.draft == RoomDraft::default()
    }
}

/// Process-wide session store keyed by user id.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<i64, UserSession>>,
}

impl SessionStore {
    /// Create an empty session store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply `f` to the user's session, dropping the entry if it ends up empty.
    async fn update<R>(&self, user_id: i64, f: impl FnOnce(&mut UserSession) -> R) -> R {
        let mut sessions = self.sessions.write().await;
        let session = sessions.entry(user_id).or_default();
        let result = f(session);
        if session.is_empty() {
            sessions.remove(&user_id);
        }
        result
    }

    // ---- active room ----

    /// Get the room the user is currently inside.
    pub async fn active_room(&self, user_id: i64) -> Option<i64> {
        self.sessions
            .read()
            .await
            .get(&user_id)
            .and_then(|s| s.active_room)
    }

    /// Whether the user is currently inside a room.
    pub async fn is_in_active_room(&self, user_id: i64) -> bool {
        self.active_room(user_id).await.is_some()
    }

    /// Make `room_id` the user's active room.
    ///
    /// Callers check membership first; the store does not.
    pub async fn set_active_room(&self, user_id: i64, room_id: i64) {
        self.update(user_id, |s| s.active_room = Some(room_id)).await
    }

    /// Leave the active room. Returns the room the user was in.
    pub async fn clear_active_room(&self, user_id: i64) -> Option<i64> {
        self.update(user_id, |s| s.active_room.take()).await
    }

    /// Clear the active room of every user inside `room_id`.
    ///
    /// Returns the evicted user ids, sorted.
    pub async fn evict_room(&self, room_id: i64) -> Vec<i64> {
        let mut sessions = self.sessions.write().await;
        let mut evicted = Vec::new();
        for (user_id, session) in sessions.iter_mut() {
            if session.active_room == Some(room_id) {
                session.active_room = None;
                evicted.push(*user_id);
            }
        }
        sessions.retain(|_, s| !s.is_empty());
        evicted.sort_unstable();
        evicted
    }

    // ---- wizard ----

    /// Get the user's wizard step.
    pub async fn wizard_state(&self, user_id: i64) -> WizardState {
        self.sessions
            .read()
            .await
            .get(&user_id)
            .map(|s| s.wizard)
            .unwrap_or_default()
    }

    /// Move the wizard to `state`. Moving to `Idle` clears the draft.
    pub async fn set_wizard_state(&self, user_id: i64, state: WizardState) {
        self.update(user_id, |s| {
            s.wizard = state;
            if !state.is_active() {
                s.draft = RoomDraft::default();
            }
        })
        .await
    }

    /// Store one draft field and move to `next` in a single update.
    pub async fn advance_wizard(&self, user_id: i64, field: DraftField, next: WizardState) {
        self.update(user_id, |s| {
            s.draft.set(field);
            s.wizard = next;
            if !next.is_active() {
                s.draft = RoomDraft::default();
            }
        })
        .await
    }

    /// Get a copy of the user's draft.
    pub async fn scratch(&self, user_id: i64) -> RoomDraft {
        self.sessions
            .read()
            .await
            .get(&user_id)
            .map(|s| s.draft.clone())
            .unwrap_or_default()
    }

    /// Set one draft field without changing the wizard step.
    ///
    /// Ignored while the wizard is idle: a draft only exists mid-wizard.
    pub async fn set_scratch_field(&self, user_id: i64, field: DraftField) {
        self.update(user_id, |s| {
            if s.wizard.is_active() {
                s.draft.set(field);
            }
        })
        .await
    }

    /// Discard the user's draft.
    pub async fn clear_scratch(&self, user_id: i64) {
        self.update(user_id, |s| s.draft = RoomDraft::default())
            .await
    }

    /// Abort the wizard. Returns true if one was in progress.
    pub async fn cancel_wizard(&self, user_id: i64) -> bool {
        self.update(user_id, |s| {
            let was_active = s.wizard.is_active();
            s.wizard = WizardState::Idle;
            s.draft = RoomDraft::default();
            was_active
        })
        .await
    }

    /// Number of users with non-empty session state.
    #[cfg(test)]
    pub(crate) async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Whether no user has session state.
    #[cfg(test)]
    pub(crate) async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
