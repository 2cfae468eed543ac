//! Lead-capture scene: name → phone → confirmation → persist + notify.

use std::sync::LazyLock;

use regex::Regex;

use crate::channels::{Channel, Reply};
use crate::config::SiteLinks;
use crate::error::Error;
use crate::store::{Database, NewLead};
use crate::ui::{keyboards, messages};

use super::action::Action;
use super::{Input, Outcome, UserRef};

/// Which input the lead scene currently expects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeadState {
    AwaitName,
    AwaitPhone { name: String },
    AwaitConfirm { name: String, phone: String },
}

/// Dependencies the lead scene needs to finish.
pub struct LeadContext<'a> {
    pub db: &'a dyn Database,
    pub notifier: Option<&'a dyn Channel>,
    pub admin_chat_id: Option<&'a str>,
    pub links: &'a SiteLinks,
    pub user: &'a UserRef,
}

/// Enter the scene: prompt for the name.
pub fn enter() -> (LeadState, Vec<Reply>) {
    (
        LeadState::AwaitName,
        vec![
            Reply::text(messages::LEAD_START),
            Reply::with_keyboard(messages::LEAD_NAME, keyboards::cancel_scene()),
        ],
    )
}

/// Handle one update while the lead scene is active.
pub async fn handle(
    state: LeadState,
    input: Input<'_>,
    ctx: &LeadContext<'_>,
) -> Result<Outcome<LeadState>, Error> {
    if let Input::Action(Action::CancelScene) = input {
        return Ok(exit_cancelled(ctx.links));
    }

    Ok(match state {
        LeadState::AwaitName => match input {
            // Backing out of the first question cancels the whole flow.
            Input::Action(Action::Back) => exit_cancelled(ctx.links),
            Input::Text(text) if !text.trim().is_empty() => Outcome::Continue(
                LeadState::AwaitPhone {
                    name: text.trim().to_string(),
                },
                vec![Reply::with_keyboard(
                    messages::LEAD_PHONE,
                    keyboards::back_only(Action::Back),
                )],
            ),
            _ => Outcome::Continue(LeadState::AwaitName, vec![Reply::text(messages::LEAD_NAME)]),
        },

        LeadState::AwaitPhone { name } => match input {
            Input::Action(Action::Back) => Outcome::Continue(
                LeadState::AwaitName,
                vec![Reply::with_keyboard(
                    messages::LEAD_NAME,
                    keyboards::cancel_scene(),
                )],
            ),
            Input::Text(text) => match normalize_phone(text) {
                Some(phone) => {
                    let confirm = Reply::with_keyboard(
                        messages::lead_confirm(&name, &phone),
                        keyboards::lead_confirm(),
                    );
                    Outcome::Continue(LeadState::AwaitConfirm { name, phone }, vec![confirm])
                }
                None => Outcome::Continue(
                    LeadState::AwaitPhone { name },
                    vec![Reply::text(messages::INVALID_PHONE)],
                ),
            },
            _ => Outcome::Continue(
                LeadState::AwaitPhone { name },
                vec![Reply::text(messages::LEAD_PHONE)],
            ),
        },

        LeadState::AwaitConfirm { name, phone } => match input {
            Input::Action(Action::SendLead) => submit(name, phone, ctx).await?,
            Input::Action(Action::Back) => Outcome::Continue(
                LeadState::AwaitPhone { name },
                vec![Reply::with_keyboard(
                    messages::LEAD_PHONE,
                    keyboards::back_only(Action::Back),
                )],
            ),
            _ => {
                let confirm = Reply::with_keyboard(
                    messages::lead_confirm(&name, &phone),
                    keyboards::lead_confirm(),
                );
                Outcome::Continue(
                    LeadState::AwaitConfirm { name, phone },
                    vec![Reply::text(messages::PLEASE_USE_BUTTONS), confirm],
                )
            }
        },
    })
}

/// Persist the lead and forward it to the operator chat. A notification
/// failure is logged and does not fail the flow.
async fn submit(
    name: String,
    phone: String,
    ctx: &LeadContext<'_>,
) -> Result<Outcome<LeadState>, Error> {
    let lead = NewLead {
        name: name.clone(),
        phone: phone.clone(),
        telegram_user_id: ctx.user.id,
        telegram_username: ctx.user.username.clone(),
    };
    let id = ctx.db.save_lead(&lead).await?;
    tracing::info!(lead_id = %id, user_id = ctx.user.id, "Lead saved");

    match (ctx.notifier, ctx.admin_chat_id) {
        (Some(notifier), Some(admin)) => {
            let text = messages::lead_forwarded(&name, &phone, ctx.user.username.as_deref());
            if let Err(e) = notifier.notify(admin, &text).await {
                tracing::warn!(error = %e, "Failed to forward lead to operator");
            }
        }
        _ => {
            tracing::warn!("Operator chat not configured, lead notification skipped");
        }
    }

    Ok(Outcome::Exit(vec![Reply::with_keyboard(
        messages::LEAD_SENT,
        keyboards::back_to_main_menu(),
    )]))
}

fn exit_cancelled(links: &SiteLinks) -> Outcome<LeadState> {
    Outcome::Exit(vec![
        Reply::text(messages::ACTION_CANCELLED),
        Reply::with_keyboard(messages::MAIN_MENU, keyboards::main_menu(links)),
    ])
}

// ── Phone validation ────────────────────────────────────────────────

static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\+?[78]?[\s-]?\(?\d{3}\)?[\s-]?\d{3}[\s-]?\d{2}[\s-]?\d{2}$")
        .expect("phone regex is valid")
});

/// Validate and normalize a phone number: keep digits and `+`, rewrite a
/// leading `8` to `+7`.
fn normalize_phone(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if !PHONE_RE.is_match(trimmed) {
        return None;
    }
    let compact: String = trimmed
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect();
    Some(match compact.strip_prefix('8') {
        Some(rest) => format!("+7{rest}"),
        None => compact,
    })
}

// ── Tests ───────────────────────────────────────────────────────────
