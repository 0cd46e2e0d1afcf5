//! Test helpers for the integration tests.
//!
//! Provides a recording [`Outbound`] and a [`TestApp`] wrapping a
//! dispatcher over an in-memory database.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use roomrelay::bot::Command;
use roomrelay::outbound::DeliveryResult;
use roomrelay::{
    AdminAccess, AppContext, Button, Content, Database, DeliveryError, Dispatcher, EventKind,
    InboundEvent, Outbound, Sender,
};

pub const ADMIN: i64 = 1;
pub const CLIENT: i64 = 100;
pub const CODER: i64 = 200;

/// One message the bot tried to deliver.
#[derive(Debug, Clone, PartialEq)]
pub enum Sent {
    Text {
        to: i64,
        text: String,
    },
    Menu {
        to: i64,
        text: String,
        rows: Vec<Vec<Button>>,
    },
    Content {
        to: i64,
        content: Content,
        caption: Option<String>,
    },
    Forward {
        to: i64,
        from_chat: i64,
        message_id: i32,
    },
    File {
        to: i64,
        file_name: String,
        bytes: Vec<u8>,
    },
}

impl Sent {
    pub fn to(&self) -> i64 {
        match self {
            Sent::Text { to, .. }
            | Sent::Menu { to, .. }
            | Sent::Content { to, .. }
            | Sent::Forward { to, .. }
            | Sent::File { to, .. } => *to,
        }
    }
}

/// Records every delivery; recipients marked with `fail_for` error out.
#[derive(Default)]
pub struct RecordingOutbound {
    sent: Mutex<Vec<Sent>>,
    failing: Mutex<HashSet<i64>>,
}

impl RecordingOutbound {
    pub fn fail_for(&self, user_id: i64) {
        self.failing.lock().unwrap().insert(user_id);
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_to(&self, user_id: i64) -> Vec<Sent> {
        self.sent().into_iter().filter(|s| s.to() == user_id).collect()
    }

    /// Texts of plain messages and menus sent to `user_id`.
    pub fn texts_to(&self, user_id: i64) -> Vec<String> {
        self.sent_to(user_id)
            .into_iter()
            .filter_map(|s| match s {
                Sent::Text { text, .. } | Sent::Menu { text, .. } => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.sent.lock().unwrap().clear();
    }

    fn record(&self, sent: Sent) -> DeliveryResult {
        let to = sent.to();
        if self.failing.lock().unwrap().contains(&to) {
            return Err(DeliveryError::new(to, "bot was blocked by the user"));
        }
        self.sent.lock().unwrap().push(sent);
        Ok(())
    }
}

#[async_trait]
impl Outbound for RecordingOutbound {
    async fn send_text(&self, to: i64, text: &str) -> DeliveryResult {
        self.record(Sent::Text {
            to,
            text: text.to_string(),
        })
    }

    async fn send_menu(&self, to: i64, text: &str, rows: &[Vec<Button>]) -> DeliveryResult {
        self.record(Sent::Menu {
            to,
            text: text.to_string(),
            rows: rows.to_vec(),
        })
    }

    async fn send_content(
        &self,
        to: i64,
        content: &Content,
        caption: Option<&str>,
    ) -> DeliveryResult {
        self.record(Sent::Content {
            to,
            content: content.clone(),
            caption: caption.map(str::to_string),
        })
    }

    async fn forward(&self, to: i64, from_chat: i64, message_id: i32) -> DeliveryResult {
        self.record(Sent::Forward {
            to,
            from_chat,
            message_id,
        })
    }

    async fn send_file(&self, to: i64, file_name: &str, bytes: Vec<u8>) -> DeliveryResult {
        self.record(Sent::File {
            to,
            file_name: file_name.to_string(),
            bytes,
        })
    }
}

/// A dispatcher wired to an in-memory database and a recording outbound.
pub struct TestApp {
    pub dispatcher: Dispatcher,
    pub outbound: Arc<RecordingOutbound>,
}

impl TestApp {
    /// Create an app with [`ADMIN`] as the only administrator.
    pub async fn new() -> Self {
        Self::with_admins([ADMIN]).await
    }

    pub async fn with_admins(admins: impl IntoIterator<Item = i64>) -> Self {
        let db = Database::open_in_memory().await.unwrap();
        let outbound = Arc::new(RecordingOutbound::default());
        let ctx = AppContext::new(db, AdminAccess::new(admins), outbound.clone());
        Self {
            dispatcher: Dispatcher::new(Arc::new(ctx)),
            outbound,
        }
    }

    pub fn ctx(&self) -> &AppContext {
        self.dispatcher.context()
    }

    pub async fn event(&self, user_id: i64, kind: EventKind) {
        self.dispatcher
            .handle(InboundEvent::new(Sender::new(user_id, None), kind))
            .await
            .unwrap();
    }

    pub async fn command(&self, user_id: i64, command: Command) {
        self.event(user_id, EventKind::Command(command)).await;
    }

    pub async fn text(&self, user_id: i64, text: &str) {
        self.event(user_id, EventKind::Message(Content::text(text)))
            .await;
    }

    pub async fn press(&self, user_id: i64, token: impl Into<String>) {
        self.event(user_id, EventKind::Action(token.into())).await;
    }

    /// Run the room wizard as [`ADMIN`] and return the new room's id.
    pub async fn create_room(&self, name: &str, client: i64, coder: i64) -> i64 {
        self.press(ADMIN, "create_room").await;
        self.text(ADMIN, name).await;
        self.text(ADMIN, &client.to_string()).await;
        self.text(ADMIN, &coder.to_string()).await;

        let rooms = self.ctx().store().list_all_rooms().await.unwrap();
        rooms
            .iter()
            .rev()
            .find(|room| room.name == name)
            .map(|room| room.id)
            .unwrap()
    }
}
