//! Channel abstraction for update I/O.
//!
//! A channel turns its native transport into a stream of `ChannelEvent`s and
//! delivers `Reply`s back. The dialog engine never sees transport details;
//! callback tags are decoded into typed actions by the event loop.

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;

use crate::error::ChannelError;
use crate::ui::keyboards::Keyboard;

/// The user behind an update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelUser {
    pub id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
}

/// What the user did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    /// Free-text message.
    Text(String),
    /// Button tap. `callback_id` is acknowledged back to the transport,
    /// `tag` identifies the button.
    Action { callback_id: String, tag: String },
}

/// One inbound update, already normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelEvent {
    pub user: ChannelUser,
    pub chat_id: String,
    pub kind: EventKind,
}

/// One outbound message: prompt text plus an optional choice set.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub text: String,
    pub keyboard: Option<Keyboard>,
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            keyboard: None,
        }
    }

    pub fn with_keyboard(text: impl Into<String>, keyboard: Keyboard) -> Self {
        Self {
            text: text.into(),
            keyboard: Some(keyboard),
        }
    }
}

pub type EventStream = Pin<Box<dyn Stream<Item = ChannelEvent> + Send>>;

/// A message transport.
#[async_trait]
pub trait Channel: Send + Sync {
    fn name(&self) -> &str;

    /// Start listening and return the event stream.
    async fn start(&self) -> Result<EventStream, ChannelError>;

    /// Deliver a reply to a chat.
    async fn send(&self, chat_id: &str, reply: &Reply) -> Result<(), ChannelError>;

    /// Acknowledge a button tap so the client stops its spinner.
    async fn ack_action(&self, callback_id: &str) -> Result<(), ChannelError>;

    /// Forward a plain-text notification to an operator recipient.
    /// Failures here must never fail the calling flow.
    async fn notify(&self, recipient: &str, text: &str) -> Result<(), ChannelError>;

    async fn health_check(&self) -> Result<(), ChannelError>;
}
