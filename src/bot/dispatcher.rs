//! Inbound event routing.
//!
//! Every event is handled on its own task. Tasks for different users run
//! concurrently; tasks for one user run one at a time in arrival order.
//! Validation, authorization and not-found errors turn into a notice to the
//! user; storage errors are logged and end only the event that hit them.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use super::action::Action;
use super::context::AppContext;
use super::menu::{self, ACCESS_DENIED_NOTICE, HELP_TEXT, ROOM_NOT_FOUND_NOTICE};
use crate::admin::WizardStep;
use crate::outbound::{notify, notify_menu};
use crate::relay::Content;
use crate::{RelayError, Result};

/// Who sent an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sender {
    pub id: i64,
    /// Platform username, if the user has one.
    pub username: Option<String>,
}

impl Sender {
    pub fn new(id: i64, username: Option<String>) -> Self {
        Self { id, username }
    }

    /// Name stored for the user on first contact.
    pub fn display_name(&self) -> String {
        self.username
            .clone()
            .unwrap_or_else(|| format!("user_{}", self.id))
    }
}

/// Slash commands the bot understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Cancel,
    Help,
}

impl Command {
    /// Parse `/start`, `/cancel`, `/help`, with or without `@botname`.
    pub fn parse(text: &str) -> Option<Self> {
        let word = text.trim().split_whitespace().next()?;
        let name = word.strip_prefix('/')?;
        let name = name.split('@').next().unwrap_or(name);
        match name {
            "start" => Some(Command::Start),
            "cancel" => Some(Command::Cancel),
            "help" => Some(Command::Help),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    Command(Command),
    Message(Content),
    /// Inline button press carrying an opaque token.
    Action(String),
}

/// One inbound event from the chat platform.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundEvent {
    pub sender: Sender,
    pub kind: EventKind,
}

impl InboundEvent {
    pub fn new(sender: Sender, kind: EventKind) -> Self {
        Self { sender, kind }
    }
}

/// Tail of one user's event chain: the completion signal of the most
/// recently dispatched event, tagged with its sequence number.
struct Tail {
    seq: u64,
    done: oneshot::Receiver<()>,
}

#[derive(Default)]
struct Lanes {
    next_seq: u64,
    tails: HashMap<i64, Tail>,
}

/// Routes inbound events to the relay, the wizard and the admin service.
#[derive(Clone)]
pub struct Dispatcher {
    ctx: Arc<AppContext>,
    lanes: Arc<Mutex<Lanes>>,
}

impl Dispatcher {
    pub fn new(ctx: Arc<AppContext>) -> Self {
        Self {
            ctx,
            lanes: Arc::new(Mutex::new(Lanes::default())),
        }
    }

    pub fn context(&self) -> &AppContext {
        &self.ctx
    }

    /// Handle `event` on a new task. Errors are logged, never propagated.
    ///
    /// The task waits for the sender's previously dispatched event to
    /// finish first, so one user's events are handled in dispatch order.
    pub fn dispatch(&self, event: InboundEvent) -> JoinHandle<()> {
        let user_id = event.sender.id;
        let (done_tx, done_rx) = oneshot::channel();
        let (seq, prev) = {
            let mut lanes = self.lanes.lock().unwrap_or_else(PoisonError::into_inner);
            lanes.next_seq += 1;
            let seq = lanes.next_seq;
            let prev = lanes.tails.insert(user_id, Tail { seq, done: done_rx });
            (seq, prev)
        };

        let dispatcher = self.clone();
        tokio::spawn(async move {
            if let Some(prev) = prev {
                // A dropped sender means the earlier task panicked; go on.
                let _ = prev.done.await;
            }
            if let Err(e) = dispatcher.handle(event).await {
                error!(user_id, error = %e, "Failed to handle event");
            }

            {
                let mut lanes = dispatcher
                    .lanes
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner);
                if lanes.tails.get(&user_id).is_some_and(|tail| tail.seq == seq) {
                    lanes.tails.remove(&user_id);
                }
            }
            let _ = done_tx.send(());
        })
    }

    /// Number of users with a dispatched event still in flight.
    #[cfg(test)]
    fn lanes_in_flight(&self) -> usize {
        self.lanes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .tails
            .len()
    }

    /// Handle one event to completion.
    ///
    /// Only storage (and other non-recoverable) errors are returned.
    pub async fn handle(&self, event: InboundEvent) -> Result<()> {
        let user_id = event.sender.id;
        self.ctx
            .store()
            .upsert_user(user_id, &event.sender.display_name(), None)
            .await?;

        let result = match event.kind {
            EventKind::Command(command) => self.on_command(user_id, command).await,
            EventKind::Message(content) => self.on_message(user_id, &content).await,
            EventKind::Action(token) => self.on_action(user_id, &token).await,
        };

        match result {
            Ok(()) => Ok(()),
            Err(e) => self.recover(user_id, e).await,
        }
    }

    async fn recover(&self, user_id: i64, err: RelayError) -> Result<()> {
        let notice = match &err {
            RelayError::Authorization(_) => ACCESS_DENIED_NOTICE.to_string(),
            RelayError::NotFound(_) => ROOM_NOT_FOUND_NOTICE.to_string(),
            RelayError::Validation(msg) => format!("Invalid input: {msg}"),
            _ => return Err(err),
        };
        debug!(user_id, error = %err, "Recovered from user-facing error");
        notify(self.ctx.outbound.as_ref(), user_id, &notice).await;
        Ok(())
    }

    // ---- commands ----

    async fn on_command(&self, user_id: i64, command: Command) -> Result<()> {
        match command {
            Command::Start => self.start(user_id).await,
            Command::Cancel => {
                if !self.ctx.wizard().cancel(user_id).await {
                    notify(
                        self.ctx.outbound.as_ref(),
                        user_id,
                        menu::NOTHING_TO_CANCEL_NOTICE,
                    )
                    .await;
                }
                Ok(())
            }
            Command::Help => {
                self.help(user_id).await;
                Ok(())
            }
        }
    }

    async fn start(&self, user_id: i64) -> Result<()> {
        let outbound = self.ctx.outbound.as_ref();

        if self.ctx.is_admin(user_id) {
            notify_menu(
                outbound,
                user_id,
                "Welcome! You are signed in as an administrator.",
                &menu::main_menu(true),
            )
            .await;
            return Ok(());
        }

        let rooms = self.ctx.store().list_rooms_for_user(user_id).await?;
        match rooms.as_slice() {
            [] => {
                notify_menu(
                    outbound,
                    user_id,
                    "Hello! You have no rooms yet. Wait until an administrator adds you to one.",
                    &menu::main_menu(false),
                )
                .await;
            }
            [room] => {
                self.ctx.sessions.set_active_room(user_id, room.id).await;
                info!(user_id, room_id = room.id, "Auto-entered only room");
                notify_menu(
                    outbound,
                    user_id,
                    &menu::entered_room_text(room),
                    &menu::room_exit(),
                )
                .await;
            }
            _ => {
                notify_menu(
                    outbound,
                    user_id,
                    "You have several rooms. Choose one to enter:",
                    &menu::room_picker(&rooms, false),
                )
                .await;
            }
        }
        Ok(())
    }

    async fn help(&self, user_id: i64) {
        notify_menu(
            self.ctx.outbound.as_ref(),
            user_id,
            HELP_TEXT,
            &menu::main_menu(self.ctx.is_admin(user_id)),
        )
        .await;
    }

    // ---- messages ----

    async fn on_message(&self, user_id: i64, content: &Content) -> Result<()> {
        if let Content::Text { text } = content {
            if self.ctx.sessions.wizard_state(user_id).await.is_active() {
                match self.ctx.wizard().handle_input(user_id, text).await? {
                    WizardStep::Inactive => {}
                    _ => return Ok(()),
                }
            }
        }

        if self.ctx.sessions.is_in_active_room(user_id).await {
            self.ctx.relay().relay(user_id, content).await?;
            return Ok(());
        }

        self.help(user_id).await;
        Ok(())
    }

    // ---- actions ----

    async fn on_action(&self, user_id: i64, token: &str) -> Result<()> {
        let Some(action) = Action::parse(token) else {
            debug!(user_id, token, "Ignoring unknown action");
            return Ok(());
        };
        debug!(user_id, %action, "Handling action");

        let outbound = self.ctx.outbound.as_ref();
        match action {
            Action::ViewRooms => {
                let rooms = self.ctx.store().list_rooms_for_user(user_id).await?;
                if rooms.is_empty() {
                    notify_menu(
                        outbound,
                        user_id,
                        "You have no rooms yet.",
                        &menu::back_to_main(),
                    )
                    .await;
                } else {
                    notify_menu(
                        outbound,
                        user_id,
                        "Your rooms:",
                        &menu::room_picker(&rooms, true),
                    )
                    .await;
                }
            }
            Action::MainMenu => {
                notify_menu(
                    outbound,
                    user_id,
                    "Main menu:",
                    &menu::main_menu(self.ctx.is_admin(user_id)),
                )
                .await;
            }
            Action::EnterRoom(room_id) => {
                let store = self.ctx.store();
                if !store.is_member(user_id, room_id).await? {
                    notify(outbound, user_id, menu::NO_ROOM_ACCESS_NOTICE).await;
                    return Ok(());
                }
                let room = store
                    .get_room(room_id)
                    .await?
                    .ok_or_else(|| RelayError::NotFound(format!("room {room_id}")))?;
                self.ctx.sessions.set_active_room(user_id, room_id).await;
                info!(user_id, room_id, "Entered room");
                notify_menu(
                    outbound,
                    user_id,
                    &menu::entered_room_text(&room),
                    &menu::room_exit(),
                )
                .await;
            }
            Action::ExitRoom => match self.ctx.sessions.clear_active_room(user_id).await {
                Some(room_id) => {
                    info!(user_id, room_id, "Left room");
                    notify_menu(
                        outbound,
                        user_id,
                        "You have left the room.",
                        &menu::after_exit(),
                    )
                    .await;
                }
                None => notify(outbound, user_id, menu::NOT_IN_ANY_ROOM_NOTICE).await,
            },
            Action::AdminPanel => {
                self.ctx.admins.require(user_id)?;
                notify_menu(outbound, user_id, "Admin panel:", &menu::admin_panel()).await;
            }
            Action::CreateRoom => self.ctx.wizard().start(user_id).await?,
            Action::ListRooms => {
                let rooms = self.ctx.admin().list_rooms(user_id).await?;
                if rooms.is_empty() {
                    notify_menu(
                        outbound,
                        user_id,
                        "No rooms have been created yet.",
                        &menu::admin_panel(),
                    )
                    .await;
                } else {
                    notify_menu(outbound, user_id, "All rooms:", &menu::room_list(&rooms)).await;
                }
            }
            Action::RoomInfo(room_id) => {
                let info = self.ctx.admin().room_info(user_id, room_id).await?;
                notify_menu(
                    outbound,
                    user_id,
                    &menu::room_info_text(&info),
                    &menu::room_actions(room_id),
                )
                .await;
            }
            Action::AdminEnterRoom(room_id) => {
                let room = self.ctx.admin().enter_room(user_id, room_id).await?;
                notify_menu(
                    outbound,
                    user_id,
                    &menu::admin_entered_room_text(&room),
                    &menu::room_exit(),
                )
                .await;
            }
            Action::ExportHistory(room_id) => {
                let export = self.ctx.admin().export_history(user_id, room_id).await?;
                if let Err(e) = outbound
                    .send_file(user_id, &export.file_name, export.bytes)
                    .await
                {
                    error!(user_id, room_id, error = %e, "Failed to send history export");
                }
            }
            Action::DeleteRoom(room_id) => {
                let deleted = self.ctx.admin().delete_room(user_id, room_id).await?;
                let text = format!(
                    "Room '{}' (ID: {}) deleted.\n\nAdmin panel:",
                    deleted.room.name, deleted.room.id
                );
                notify_menu(outbound, user_id, &text, &menu::admin_panel()).await;
            }
        }
        Ok(())
    }
}
