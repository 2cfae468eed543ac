//! Telegram channel — long-polls the Bot API for updates.
//!
//! Native Bot API implementation: `getUpdates` with message and
//! callback_query updates, `sendMessage` with inline keyboards, and
//! `answerCallbackQuery` for button acknowledgements.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use crate::channels::channel::{
    Channel, ChannelEvent, ChannelUser, EventKind, EventStream, Reply,
};
use crate::error::ChannelError;
use crate::ui::keyboards::{ButtonKind, Keyboard};

/// Maximum message length for Telegram's sendMessage API.
const TELEGRAM_MAX_MESSAGE_LENGTH: usize = 4096;

/// Telegram channel — connects to the Bot API via long-polling.
pub struct TelegramChannel {
    bot_token: SecretString,
    client: reqwest::Client,
}

impl TelegramChannel {
    pub fn new(bot_token: SecretString) -> Self {
        Self {
            bot_token,
            client: reqwest::Client::new(),
        }
    }

    fn api_url(&self, method: &str) -> String {
        format!(
            "https://api.telegram.org/bot{}/{method}",
            self.bot_token.expose_secret()
        )
    }

    /// Send a text message, trying Markdown first with plain text fallback.
    /// Splits long messages that exceed Telegram's 4096 char limit; the
    /// keyboard is attached to the last chunk.
    async fn send_message(
        &self,
        chat_id: &str,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<(), ChannelError> {
        let chunks = split_message(text, TELEGRAM_MAX_MESSAGE_LENGTH);
        let last = chunks.len().saturating_sub(1);

        for (i, chunk) in chunks.iter().enumerate() {
            let kb = if i == last { keyboard } else { None };
            self.send_message_chunk(chat_id, chunk, kb).await?;
        }
        Ok(())
    }

    /// Send a single message chunk (≤4096 chars), Markdown-first with fallback.
    async fn send_message_chunk(
        &self,
        chat_id: &str,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<(), ChannelError> {
        let mut markdown_body = serde_json::json!({
            "chat_id": chat_id,
            "text": text,
            "parse_mode": "Markdown"
        });
        if let Some(kb) = keyboard {
            markdown_body["reply_markup"] = keyboard_json(kb);
        }

        let markdown_resp = self
            .client
            .post(self.api_url("sendMessage"))
            .json(&markdown_body)
            .send()
            .await
            .map_err(|e| ChannelError::SendFailed {
                name: "telegram".into(),
                reason: e.to_string(),
            })?;

        if markdown_resp.status().is_success() {
            return Ok(());
        }

        let markdown_status = markdown_resp.status();
        tracing::warn!(
            status = ?markdown_status,
            "Telegram sendMessage with Markdown failed; retrying without parse_mode"
        );

        let mut plain_body = serde_json::json!({
            "chat_id": chat_id,
            "text": text,
        });
        if let Some(kb) = keyboard {
            plain_body["reply_markup"] = keyboard_json(kb);
        }
        let plain_resp = self
            .client
            .post(self.api_url("sendMessage"))
            .json(&plain_body)
            .send()
            .await
            .map_err(|e| ChannelError::SendFailed {
                name: "telegram".into(),
                reason: e.to_string(),
            })?;

        if !plain_resp.status().is_success() {
            let plain_err = plain_resp.text().await.unwrap_or_default();
            return Err(ChannelError::SendFailed {
                name: "telegram".into(),
                reason: format!(
                    "sendMessage failed (markdown: {markdown_status}, plain: {plain_err})"
                ),
            });
        }

        Ok(())
    }
}

// ── Channel trait implementation ────────────────────────────────────

#[async_trait]
impl Channel for TelegramChannel {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn start(&self) -> Result<EventStream, ChannelError> {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        let url = self.api_url("getUpdates");
        let client = self.client.clone();

        tokio::spawn(async move {
            let mut offset: i64 = 0;

            tracing::info!("Telegram channel listening for updates...");

            loop {
                let body = serde_json::json!({
                    "offset": offset,
                    "timeout": 30,
                    "allowed_updates": ["message", "callback_query"]
                });

                let resp = match client.post(&url).json(&body).send().await {
                    Ok(r) => r,
                    Err(e) => {
                        tracing::warn!("Telegram poll error: {e}");
                        tokio::time::sleep(std::time::Duration::from_secs(5)).await;
                        continue;
                    }
                };

                let data: serde_json::Value = match resp.json().await {
                    Ok(d) => d,
                    Err(e) => {
                        tracing::warn!("Telegram parse error: {e}");
                        tokio::time::sleep(std::time::Duration::from_secs(5)).await;
                        continue;
                    }
                };

                if let Some(results) = data.get("result").and_then(serde_json::Value::as_array) {
                    for update in results {
                        if let Some(uid) =
                            update.get("update_id").and_then(serde_json::Value::as_i64)
                        {
                            offset = uid + 1;
                        }

                        let Some(event) = parse_update(update) else {
                            continue;
                        };

                        if tx.send(event).is_err() {
                            tracing::info!("Telegram listener channel closed");
                            return;
                        }
                    }
                }
            }
        });

        let stream = futures::stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|event| (event, rx))
        });

        Ok(Box::pin(stream))
    }

    async fn send(&self, chat_id: &str, reply: &Reply) -> Result<(), ChannelError> {
        self.send_message(chat_id, &reply.text, reply.keyboard.as_ref())
            .await
    }

    async fn ack_action(&self, callback_id: &str) -> Result<(), ChannelError> {
        let resp = self
            .client
            .post(self.api_url("answerCallbackQuery"))
            .json(&serde_json::json!({ "callback_query_id": callback_id }))
            .send()
            .await
            .map_err(|e| ChannelError::SendFailed {
                name: "telegram".into(),
                reason: e.to_string(),
            })?;

        if !resp.status().is_success() {
            let err = resp.text().await.unwrap_or_default();
            return Err(ChannelError::SendFailed {
                name: "telegram".into(),
                reason: format!("answerCallbackQuery failed: {err}"),
            });
        }
        Ok(())
    }

    async fn notify(&self, recipient: &str, text: &str) -> Result<(), ChannelError> {
        self.send_message(recipient, text, None).await
    }

    async fn health_check(&self) -> Result<(), ChannelError> {
        let resp = self
            .client
            .get(self.api_url("getMe"))
            .send()
            .await
            .map_err(|e| ChannelError::StartupFailed {
                name: "telegram".into(),
                reason: e.to_string(),
            })?;

        if resp.status().is_success() {
            Ok(())
        } else {
            Err(ChannelError::StartupFailed {
                name: "telegram".into(),
                reason: format!("getMe returned {}", resp.status()),
            })
        }
    }
}

// ── Helpers ─────────────────────────────────────────────────────────

/// Convert one `getUpdates` entry into a `ChannelEvent`.
/// Unsupported update shapes yield `None` and are skipped.
fn parse_update(update: &serde_json::Value) -> Option<ChannelEvent> {
    if let Some(message) = update.get("message") {
        let text = message.get("text").and_then(serde_json::Value::as_str)?;
        let user = parse_user(message.get("from")?)?;
        let chat_id = message
            .get("chat")
            .and_then(|c| c.get("id"))
            .and_then(serde_json::Value::as_i64)?;

        return Some(ChannelEvent {
            user,
            chat_id: chat_id.to_string(),
            kind: EventKind::Text(text.to_string()),
        });
    }

    if let Some(callback) = update.get("callback_query") {
        let callback_id = callback.get("id").and_then(serde_json::Value::as_str)?;
        let tag = callback.get("data").and_then(serde_json::Value::as_str)?;
        let user = parse_user(callback.get("from")?)?;
        // The chat the button message lives in; fall back to the user's
        // private chat when the original message is no longer available.
        let chat_id = callback
            .get("message")
            .and_then(|m| m.get("chat"))
            .and_then(|c| c.get("id"))
            .and_then(serde_json::Value::as_i64)
            .unwrap_or(user.id);

        return Some(ChannelEvent {
            user,
            chat_id: chat_id.to_string(),
            kind: EventKind::Action {
                callback_id: callback_id.to_string(),
                tag: tag.to_string(),
            },
        });
    }

    None
}

fn parse_user(from: &serde_json::Value) -> Option<ChannelUser> {
    let id = from.get("id").and_then(serde_json::Value::as_i64)?;
    Some(ChannelUser {
        id,
        username: from
            .get("username")
            .and_then(serde_json::Value::as_str)
            .map(String::from),
        first_name: from
            .get("first_name")
            .and_then(serde_json::Value::as_str)
            .map(String::from),
    })
}

/// Encode a keyboard as Telegram `reply_markup` JSON.
fn keyboard_json(keyboard: &Keyboard) -> serde_json::Value {
    let rows: Vec<Vec<serde_json::Value>> = keyboard
        .rows
        .iter()
        .map(|row| {
            row.iter()
                .map(|button| match &button.kind {
                    ButtonKind::Callback(tag) => serde_json::json!({
                        "text": button.label,
                        "callback_data": tag,
                    }),
                    ButtonKind::Url(url) => serde_json::json!({
                        "text": button.label,
                        "url": url,
                    }),
                })
                .collect()
        })
        .collect();
    serde_json::json!({ "inline_keyboard": rows })
}

/// Split a message into chunks that fit Telegram's character limit.
/// Tries to split on newlines, then spaces, then hard-cuts.
fn split_message(text: &str, max_len: usize) -> Vec<String> {
    if text.len() <= max_len {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut remaining = text;

    while !remaining.is_empty() {
        if remaining.len() <= max_len {
            chunks.push(remaining.to_string());
            break;
        }

        let chunk = &remaining[..max_len];
        let split_at = chunk
            .rfind('\n')
            .or_else(|| chunk.rfind(' '))
            .unwrap_or(max_len);

        // Don't split at position 0 (infinite loop guard)
        let split_at = if split_at == 0 { max_len } else { split_at };

        chunks.push(remaining[..split_at].to_string());
        remaining = remaining[split_at..].trim_start();
    }

    chunks
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn channel() -> TelegramChannel {
        TelegramChannel::new(SecretString::from("123:ABC".to_string()))
    }

    #[test]
    fn telegram_channel_name() {
        assert_eq!(channel().name(), "telegram");
    }

    #[test]
    fn telegram_api_url() {
        assert_eq!(
            channel().api_url("getMe"),
            "https://api.telegram.org/bot123:ABC/getMe"
        );
    }

    // ── Update parsing ──────────────────────────────────────────────

    #[test]
    fn parse_text_message() {
        let update = serde_json::json!({
            "update_id": 10,
            "message": {
                "from": {"id": 42, "username": "alice", "first_name": "Alice"},
                "chat": {"id": 42},
                "text": "15 000 000"
            }
        });

        let event = parse_update(&update).unwrap();
        assert_eq!(event.user.id, 42);
        assert_eq!(event.user.username.as_deref(), Some("alice"));
        assert_eq!(event.chat_id, "42");
        assert_eq!(event.kind, EventKind::Text("15 000 000".into()));
    }

    #[test]
    fn parse_callback_query() {
        let update = serde_json::json!({
            "update_id": 11,
            "callback_query": {
                "id": "cb-1",
                "from": {"id": 42, "first_name": "Alice"},
                "message": {"chat": {"id": 4242}},
                "data": "calc_country_korea"
            }
        });

        let event = parse_update(&update).unwrap();
        assert_eq!(event.chat_id, "4242");
        assert_eq!(
            event.kind,
            EventKind::Action {
                callback_id: "cb-1".into(),
                tag: "calc_country_korea".into(),
            }
        );
    }

    #[test]
    fn parse_callback_without_message_falls_back_to_user_chat() {
        let update = serde_json::json!({
            "update_id": 12,
            "callback_query": {
                "id": "cb-2",
                "from": {"id": 7},
                "data": "action_main_menu"
            }
        });

        let event = parse_update(&update).unwrap();
        assert_eq!(event.chat_id, "7");
    }

    #[test]
    fn parse_skips_non_text_messages() {
        let update = serde_json::json!({
            "update_id": 13,
            "message": {
                "from": {"id": 42},
                "chat": {"id": 42},
                "sticker": {"emoji": "👍"}
            }
        });
        assert!(parse_update(&update).is_none());
    }

    // ── Keyboard encoding ───────────────────────────────────────────

    #[test]
    fn keyboard_json_shape() {
        use crate::dialog::action::Action;
        use crate::ui::keyboards::Button;

        let keyboard = Keyboard {
            rows: vec![
                vec![Button::callback("Назад", Action::Back)],
                vec![Button::url("Сайт", "https://example.com")],
            ],
        };
        let json = keyboard_json(&keyboard);
        assert_eq!(
            json["inline_keyboard"][0][0]["callback_data"],
            "action_back"
        );
        assert_eq!(json["inline_keyboard"][1][0]["url"], "https://example.com");
        assert!(json["inline_keyboard"][1][0].get("callback_data").is_none());
    }

    // ── Message splitting ───────────────────────────────────────────

    #[test]
    fn split_message_short() {
        let chunks = split_message("Hello", 4096);
        assert_eq!(chunks, vec!["Hello"]);
    }

    #[test]
    fn split_message_exact_limit() {
        let msg = "a".repeat(4096);
        let chunks = split_message(&msg, 4096);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].len(), 4096);
    }

    #[test]
    fn split_message_over_limit_on_newline() {
        let msg = format!("{}\n{}", "a".repeat(2000), "b".repeat(3000));
        let chunks = split_message(&msg, 4096);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0], "a".repeat(2000));
        assert_eq!(chunks[1], "b".repeat(3000));
    }

    #[test]
    fn split_message_no_good_split_point() {
        let msg = "a".repeat(5000);
        let chunks = split_message(&msg, 4096);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].len(), 4096);
        assert_eq!(chunks[1].len(), 904);
    }
}
