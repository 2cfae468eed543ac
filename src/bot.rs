//! Event loop — bridges a channel to the dialog engine.
//!
//! Updates are handled in spawned tasks, so users never block each other;
//! per-user ordering is preserved by the session slot mutex inside the
//! engine. This is also the outermost catch: an update can log a failure,
//! but it can never take the loop down.

use std::sync::Arc;

use futures::StreamExt;

use crate::channels::{Channel, ChannelEvent, EventKind};
use crate::dialog::action::Action;
use crate::dialog::{DialogEngine, Input, UserRef};
use crate::error::Error;

/// Run the bot until the channel's event stream ends.
pub async fn run(channel: Arc<dyn Channel>, engine: Arc<DialogEngine>) -> Result<(), Error> {
    let mut events = channel.start().await?;

    while let Some(event) = events.next().await {
        let channel = Arc::clone(&channel);
        let engine = Arc::clone(&engine);
        tokio::spawn(async move {
            process(channel, engine, event).await;
        });
    }

    tracing::info!("Event stream ended, shutting down");
    Ok(())
}

/// Handle one inbound update end to end.
async fn process(channel: Arc<dyn Channel>, engine: Arc<DialogEngine>, event: ChannelEvent) {
    let user = UserRef {
        id: event.user.id,
        username: event.user.username.clone(),
    };

    let input = match &event.kind {
        EventKind::Text(text) => Input::Text(text.as_str()),
        EventKind::Action { callback_id, tag } => {
            // Stop the client spinner regardless of what the tag decodes to.
            if !callback_id.is_empty() {
                if let Err(e) = channel.ack_action(callback_id).await {
                    tracing::warn!(error = %e, "Failed to acknowledge callback");
                }
            }
            match Action::decode(tag) {
                Some(action) => Input::Action(action),
                None => {
                    tracing::debug!(tag = %tag, "Unknown callback tag ignored");
                    return;
                }
            }
        }
    };

    let replies = engine.handle(&user, input).await;
    for reply in &replies {
        if let Err(e) = channel.send(&event.chat_id, reply).await {
            tracing::error!(
                chat_id = %event.chat_id,
                error = %e,
                "Failed to deliver reply"
            );
        }
    }
}
