//! Chat-platform glue.
//!
//! - [`action`]: inline button tokens
//! - [`menu`]: keyboards and user-facing texts
//! - [`dispatcher`]: per-event routing to relay, wizard and admin service
//! - [`telegram`]: the teloxide transport

pub mod action;
mod context;
pub mod dispatcher;
pub mod menu;
pub mod telegram;

pub use action::Action;
pub use context::AppContext;
pub use dispatcher::{Command, Dispatcher, EventKind, InboundEvent, Sender};
pub use telegram::{build_bot, run_polling, TelegramOutbound};
