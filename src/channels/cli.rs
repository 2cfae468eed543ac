//! CLI channel — stdin/stdout REPL for local testing.
//!
//! Choice sets are printed as `label → tag` rows; typing a tag simulates the
//! corresponding button tap.

use async_trait::async_trait;
use futures::stream;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::channels::channel::{
    Channel, ChannelEvent, ChannelUser, EventKind, EventStream, Reply,
};
use crate::error::ChannelError;
use crate::ui::keyboards::ButtonKind;

/// User ID assigned to the local operator.
const LOCAL_USER_ID: i64 = 0;

pub struct CliChannel;

impl CliChannel {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CliChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Channel for CliChannel {
    fn name(&self) -> &str {
        "cli"
    }

    async fn start(&self) -> Result<EventStream, ChannelError> {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();

        tokio::spawn(async move {
            let stdin = tokio::io::stdin();
            let reader = BufReader::new(stdin);
            let mut lines = reader.lines();

            eprint!("> ");

            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        let line = line.trim().to_string();
                        if line.is_empty() {
                            eprint!("> ");
                            continue;
                        }
                        // Callback tags all share these prefixes; everything
                        // else is free text.
                        let kind = if line.starts_with("action_") || line.starts_with("calc_") {
                            EventKind::Action {
                                callback_id: String::new(),
                                tag: line,
                            }
                        } else {
                            EventKind::Text(line)
                        };
                        let event = ChannelEvent {
                            user: ChannelUser {
                                id: LOCAL_USER_ID,
                                username: Some("local-user".to_string()),
                                first_name: None,
                            },
                            chat_id: LOCAL_USER_ID.to_string(),
                            kind,
                        };
                        if tx.send(event).is_err() {
                            break;
                        }
                    }
                    Ok(None) => break, // EOF
                    Err(e) => {
                        tracing::error!("Error reading stdin: {e}");
                        break;
                    }
                }
            }
        });

        let stream = stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|event| (event, rx))
        });

        Ok(Box::pin(stream))
    }

    async fn send(&self, _chat_id: &str, reply: &Reply) -> Result<(), ChannelError> {
        println!("\n{}", reply.text);
        if let Some(keyboard) = &reply.keyboard {
            for row in &keyboard.rows {
                for button in row {
                    match &button.kind {
                        ButtonKind::Callback(tag) => println!("  [{}]  {}", tag, button.label),
                        ButtonKind::Url(url) => println!("  <{}>  {}", url, button.label),
                    }
                }
            }
        }
        println!();
        eprint!("> ");
        Ok(())
    }

    async fn ack_action(&self, _callback_id: &str) -> Result<(), ChannelError> {
        Ok(())
    }

    async fn notify(&self, recipient: &str, text: &str) -> Result<(), ChannelError> {
        eprintln!("📣 [notify → {recipient}] {text}");
        Ok(())
    }

    async fn health_check(&self) -> Result<(), ChannelError> {
        Ok(())
    }
}
