//! Telegram transport via teloxide.
//!
//! Inbound: manual long polling with `getUpdates`, converting each
//! `Message` / `CallbackQuery` into an [`InboundEvent`].
//! Outbound: [`TelegramOutbound`] implements [`Outbound`] on top of the Bot
//! API, reusing file ids so media is never re-uploaded.

use std::time::Duration;

use async_trait::async_trait;
use teloxide::{
    payloads::setters::*,
    prelude::*,
    types::{
        AllowedUpdate, CallbackQuery, ChatId, InlineKeyboardButton, InlineKeyboardMarkup,
        InputFile, MediaKind, MessageId, MessageKind, UpdateKind,
    },
    ApiError, RequestError,
};
use tracing::{debug, info, warn};

use super::dispatcher::{Command, Dispatcher, EventKind, InboundEvent, Sender};
use crate::config::TelegramConfig;
use crate::outbound::{Button, DeliveryError, DeliveryResult, Outbound};
use crate::relay::Content;
use crate::{RelayError, Result};

/// Build a bot whose HTTP timeout outlasts the long-polling timeout.
pub fn build_bot(config: &TelegramConfig) -> Result<Bot> {
    let client = teloxide::net::default_reqwest_settings()
        .timeout(Duration::from_secs(config.client_timeout_secs))
        .build()
        .map_err(|e| RelayError::Telegram(format!("failed to build HTTP client: {e}")))?;
    Ok(Bot::with_client(config.token.clone(), client))
}

/// Outbound sender backed by the Telegram Bot API.
#[derive(Clone)]
pub struct TelegramOutbound {
    bot: Bot,
}

impl TelegramOutbound {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

fn keyboard(rows: &[Vec<Button>]) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(rows.iter().map(|row| {
        row.iter()
            .map(|b| InlineKeyboardButton::callback(b.label.clone(), b.action.clone()))
            .collect::<Vec<_>>()
    }))
}

fn delivery<T>(to: i64, result: std::result::Result<T, RequestError>) -> DeliveryResult {
    result
        .map(|_| ())
        .map_err(|e| DeliveryError::new(to, e.to_string()))
}

/// Own caption if none was supplied.
fn caption_or(caption: Option<&str>, own: &Option<String>) -> Option<String> {
    caption.map(str::to_string).or_else(|| own.clone())
}

#[async_trait]
impl Outbound for TelegramOutbound {
    async fn send_text(&self, to: i64, text: &str) -> DeliveryResult {
        delivery(to, self.bot.send_message(ChatId(to), text).await)
    }

    async fn send_menu(&self, to: i64, text: &str, rows: &[Vec<Button>]) -> DeliveryResult {
        let result = self
            .bot
            .send_message(ChatId(to), text)
            .reply_markup(keyboard(rows))
            .await;
        delivery(to, result)
    }

    async fn send_content(
        &self,
        to: i64,
        content: &Content,
        caption: Option<&str>,
    ) -> DeliveryResult {
        let chat = ChatId(to);
        let bot = &self.bot;

        macro_rules! captioned {
            ($method:ident, $file_id:expr, $own:expr) => {{
                let mut req = bot.$method(chat, InputFile::file_id($file_id.clone()));
                if let Some(caption) = caption_or(caption, $own) {
                    req = req.caption(caption);
                }
                delivery(to, req.await)
            }};
        }

        match content {
            Content::Text { text } => {
                let body = caption.unwrap_or(text);
                delivery(to, bot.send_message(chat, body).await)
            }
            Content::Photo { file_id, caption: own } => captioned!(send_photo, file_id, own),
            Content::Video { file_id, caption: own } => captioned!(send_video, file_id, own),
            Content::Audio { file_id, caption: own } => captioned!(send_audio, file_id, own),
            Content::Voice { file_id, caption: own } => captioned!(send_voice, file_id, own),
            Content::Document { file_id, caption: own } => {
                captioned!(send_document, file_id, own)
            }
            Content::Animation { file_id, caption: own } => {
                captioned!(send_animation, file_id, own)
            }
            Content::Sticker { file_id } => delivery(
                to,
                bot.send_sticker(chat, InputFile::file_id(file_id.clone()))
                    .await,
            ),
            Content::VideoNote { file_id } => delivery(
                to,
                bot.send_video_note(chat, InputFile::file_id(file_id.clone()))
                    .await,
            ),
            Content::Location {
                latitude,
                longitude,
            } => delivery(to, bot.send_location(chat, *latitude, *longitude).await),
            Content::Contact {
                phone_number,
                first_name,
                last_name,
            } => {
                let mut req = bot.send_contact(chat, phone_number.clone(), first_name.clone());
                if let Some(last_name) = last_name {
                    req = req.last_name(last_name.clone());
                }
                delivery(to, req.await)
            }
            Content::Venue {
                latitude,
                longitude,
                title,
                address,
            } => delivery(
                to,
                bot.send_venue(chat, *latitude, *longitude, title.clone(), address.clone())
                    .await,
            ),
            Content::Other {
                chat_id,
                message_id,
                ..
            } => self.forward(to, *chat_id, *message_id).await,
        }
    }

    async fn forward(&self, to: i64, from_chat: i64, message_id: i32) -> DeliveryResult {
        let result = self
            .bot
            .forward_message(ChatId(to), ChatId(from_chat), MessageId(message_id))
            .await;
        delivery(to, result)
    }

    async fn send_file(&self, to: i64, file_name: &str, bytes: Vec<u8>) -> DeliveryResult {
        let input = InputFile::memory(bytes).file_name(file_name.to_string());
        delivery(to, self.bot.send_document(ChatId(to), input).await)
    }
}

// ---- inbound conversion ----

/// Convert a message's payload into relayable content.
pub fn content_from_message(msg: &Message) -> Option<Content> {
    let MessageKind::Common(common) = &msg.kind else {
        return None;
    };

    let content = match &common.media_kind {
        MediaKind::Text(t) => Content::Text {
            text: t.text.clone(),
        },
        MediaKind::Photo(p) => Content::Photo {
            file_id: p.photo.last()?.file.id.clone(),
            caption: p.caption.clone(),
        },
        MediaKind::Video(v) => Content::Video {
            file_id: v.video.file.id.clone(),
            caption: v.caption.clone(),
        },
        MediaKind::Audio(a) => Content::Audio {
            file_id: a.audio.file.id.clone(),
            caption: a.caption.clone(),
        },
        MediaKind::Voice(v) => Content::Voice {
            file_id: v.voice.file.id.clone(),
            caption: v.caption.clone(),
        },
        MediaKind::Document(d) => Content::Document {
            file_id: d.document.file.id.clone(),
            caption: d.caption.clone(),
        },
        MediaKind::Animation(a) => Content::Animation {
            file_id: a.animation.file.id.clone(),
            caption: a.caption.clone(),
        },
        MediaKind::Sticker(s) => Content::Sticker {
            file_id: s.sticker.file.id.clone(),
        },
        MediaKind::VideoNote(v) => Content::VideoNote {
            file_id: v.video_note.file.id.clone(),
        },
        MediaKind::Location(l) => Content::Location {
            latitude: l.location.latitude,
            longitude: l.location.longitude,
        },
        MediaKind::Contact(c) => Content::Contact {
            phone_number: c.contact.phone_number.clone(),
            first_name: c.contact.first_name.clone(),
            last_name: c.contact.last_name.clone(),
        },
        MediaKind::Venue(v) => Content::Venue {
            latitude: v.venue.location.latitude,
            longitude: v.venue.location.longitude,
            title: v.venue.title.clone(),
            address: v.venue.address.clone(),
        },
        other => Content::Other {
            kind: other_kind(other).to_string(),
            chat_id: msg.chat.id.0,
            message_id: msg.id.0,
        },
    };
    Some(content)
}

fn other_kind(kind: &MediaKind) -> &'static str {
    match kind {
        MediaKind::Game(_) => "game",
        MediaKind::Poll(_) => "poll",
        _ => "unknown",
    }
}

/// Convert a private-chat message into an inbound event.
///
/// Messages without a human sender are dropped.
pub fn event_from_message(msg: &Message) -> Option<InboundEvent> {
    let user = msg.from.as_ref()?;
    if user.is_bot {
        return None;
    }
    let sender = Sender::new(user.id.0 as i64, user.username.clone());

    if let Some(command) = msg.text().and_then(Command::parse) {
        return Some(InboundEvent::new(sender, EventKind::Command(command)));
    }
    let content = content_from_message(msg)?;
    Some(InboundEvent::new(sender, EventKind::Message(content)))
}

/// Convert a button press into an inbound event.
pub fn event_from_callback(query: &CallbackQuery) -> Option<InboundEvent> {
    let data = query.data.clone()?;
    let sender = Sender::new(query.from.id.0 as i64, query.from.username.clone());
    Some(InboundEvent::new(sender, EventKind::Action(data)))
}

// ---- polling ----

/// Run the long-polling loop until the process is stopped.
///
/// Each update is dispatched on its own task. Polling errors are logged
/// and retried after `retry_delay_secs`; only a competing instance with the
/// same token stops the loop.
pub async fn run_polling(bot: Bot, config: &TelegramConfig, dispatcher: Dispatcher) -> Result<()> {
    let me = bot
        .get_me()
        .await
        .map_err(|e| RelayError::Telegram(format!("failed to verify bot token: {e}")))?;
    bot.delete_webhook()
        .send()
        .await
        .map_err(|e| RelayError::Telegram(format!("failed to delete webhook: {e}")))?;

    info!(username = ?me.username, "Telegram bot connected (webhook cleared)");

    let retry_delay = Duration::from_secs(config.retry_delay_secs);
    let mut offset: i32 = 0;

    loop {
        let result = bot
            .get_updates()
            .offset(offset)
            .timeout(config.poll_timeout_secs)
            .allowed_updates(vec![AllowedUpdate::Message, AllowedUpdate::CallbackQuery])
            .await;

        let updates = match result {
            Ok(updates) => updates,
            Err(RequestError::Api(ApiError::TerminatedByOtherGetUpdates)) => {
                return Err(RelayError::Telegram(
                    "another bot instance is already polling with this token".to_string(),
                ));
            }
            Err(e) => {
                warn!(error = %e, "getUpdates failed, retrying");
                tokio::time::sleep(retry_delay).await;
                continue;
            }
        };

        if !updates.is_empty() {
            debug!(count = updates.len(), "Got telegram updates");
        }

        for update in updates {
            offset = update.id.as_offset();
            match update.kind {
                UpdateKind::Message(msg) => {
                    if !msg.chat.is_private() {
                        debug!(chat_id = msg.chat.id.0, "Ignoring non-private message");
                        continue;
                    }
                    if let Some(event) = event_from_message(&msg) {
                        dispatcher.dispatch(event);
                    }
                }
                UpdateKind::CallbackQuery(query) => {
                    // Dismiss the loading spinner; the reply comes as a message.
                    if let Err(e) = bot.answer_callback_query(query.id.clone()).await {
                        debug!(error = %e, "Failed to answer callback query");
                    }
                    if let Some(event) = event_from_callback(&query) {
                        dispatcher.dispatch(event);
                    }
                }
                other => debug!("Ignoring update: {other:?}"),
            }
        }
    }
}
