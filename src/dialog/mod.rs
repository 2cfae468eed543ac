//! Conversation engine — per-user scenes, global actions, error recovery.
//!
//! `DialogEngine::handle` is the single entry point for normalized updates.
//! It never fails: internal errors are logged, the session is cleared, and
//! the user gets a generic message plus the main menu, so there is always a
//! valid next action.

pub mod action;
pub mod calculator;
pub mod lead;
pub mod session;

use std::sync::Arc;

use crate::channels::{Channel, Reply};
use crate::config::SiteLinks;
use crate::error::Error;
use crate::rates::RateProvider;
use crate::store::Database;
use crate::ui::{keyboards, messages};

use action::Action;
use calculator::CalcState;
use session::{Scene, SessionSlot, SessionStore};

/// One normalized inbound update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Input<'a> {
    Text(&'a str),
    Action(Action),
}

/// Result of a scene step.
pub enum Outcome<S> {
    /// Stay in the scene with the given state.
    Continue(S, Vec<Reply>),
    /// Leave the scene.
    Exit(Vec<Reply>),
}

/// The user behind an update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRef {
    pub id: i64,
    pub username: Option<String>,
}

/// Routes updates to the active scene and owns the session store.
pub struct DialogEngine {
    sessions: SessionStore,
    rates: RateProvider,
    db: Arc<dyn Database>,
    notifier: Option<Arc<dyn Channel>>,
    admin_chat_id: Option<String>,
    links: SiteLinks,
}

impl DialogEngine {
    pub fn new(
        rates: RateProvider,
        db: Arc<dyn Database>,
        links: SiteLinks,
        admin_chat_id: Option<String>,
        notifier: Option<Arc<dyn Channel>>,
    ) -> Self {
        Self {
            sessions: SessionStore::new(),
            rates,
            db,
            notifier,
            admin_chat_id,
            links,
        }
    }

    /// Handle one update. Never fails — see the module docs.
    pub async fn handle(&self, user: &UserRef, input: Input<'_>) -> Vec<Reply> {
        let slot = self.sessions.slot(user.id);
        let mut scene = slot.scene.lock().await;

        match self.dispatch(user, &slot, &mut scene, input).await {
            Ok(replies) => replies,
            Err(e) => {
                tracing::error!(user_id = user.id, error = %e, "Update handling failed");
                *scene = None;
                vec![
                    Reply::text(messages::GENERIC_ERROR),
                    self.menu_reply(messages::MAIN_MENU),
                ]
            }
        }
    }

    async fn dispatch(
        &self,
        user: &UserRef,
        slot: &Arc<SessionSlot>,
        scene: &mut Option<Scene>,
        input: Input<'_>,
    ) -> Result<Vec<Reply>, Error> {
        // /start and /cancel abort any scene; other text flows to the scene.
        if let Input::Text(text) = input {
            match text.trim() {
                "/start" => {
                    let mut replies = cancel_notice(scene);
                    replies.push(Reply::with_keyboard(
                        messages::START,
                        keyboards::main_menu(&self.links),
                    ));
                    return Ok(replies);
                }
                "/cancel" | "/menu" => {
                    let mut replies = cancel_notice(scene);
                    replies.push(self.menu_reply(messages::MAIN_MENU));
                    return Ok(replies);
                }
                _ => {}
            }
        }

        // The menu action exits whatever scene is active.
        if let Input::Action(Action::MainMenu) = input {
            *scene = None;
            return Ok(vec![self.menu_reply(messages::MAIN_MENU)]);
        }

        match scene.take() {
            None => Ok(self.global(input, scene)),
            Some(Scene::Calculator(state)) => {
                if matches!(input, Input::Action(Action::Recalculate))
                    && matches!(state, CalcState::AwaitPostResult { .. })
                {
                    return Ok(self.recalculate(slot, scene, state));
                }
                let outcome = calculator::handle(state, input, &self.rates).await;
                Ok(apply(outcome, scene, Scene::Calculator))
            }
            Some(Scene::Lead(state)) => {
                let ctx = lead::LeadContext {
                    db: self.db.as_ref(),
                    notifier: self.notifier.as_deref(),
                    admin_chat_id: self.admin_chat_id.as_deref(),
                    links: &self.links,
                    user,
                };
                let outcome = lead::handle(state, input, &ctx).await?;
                Ok(apply(outcome, scene, Scene::Lead))
            }
        }
    }

    /// Actions available outside any scene. Unknown signals fall through
    /// silently — another surface may own them.
    fn global(&self, input: Input<'_>, scene: &mut Option<Scene>) -> Vec<Reply> {
        match input {
            Input::Action(Action::StartCalculator) => {
                let (state, replies) = calculator::enter();
                *scene = Some(Scene::Calculator(state));
                replies
            }
            Input::Action(Action::StartLead) => {
                let (state, replies) = lead::enter();
                *scene = Some(Scene::Lead(state));
                replies
            }
            Input::Action(Action::WebsiteMenu) => vec![Reply::with_keyboard(
                messages::SELECT_WEBSITE,
                keyboards::website_menu(&self.links),
            )],
            Input::Action(action) => {
                tracing::debug!(?action, "Action outside any scene ignored");
                Vec::new()
            }
            Input::Text(_) => Vec::new(),
        }
    }

    /// Restart the calculator, guarded against duplicate taps: the second of
    /// two near-simultaneous triggers is acknowledged but changes nothing.
    fn recalculate(
        &self,
        slot: &Arc<SessionSlot>,
        scene: &mut Option<Scene>,
        state: CalcState,
    ) -> Vec<Reply> {
        match slot.try_begin_recalculate() {
            Some(_guard) => {
                let (next, mut replies) = calculator::enter();
                replies.insert(0, Reply::text(messages::RECALC_RESTART));
                *scene = Some(Scene::Calculator(next));
                replies
            }
            None => {
                *scene = Some(Scene::Calculator(state));
                vec![Reply::text(messages::PROCESSING)]
            }
        }
    }

    fn menu_reply(&self, text: &str) -> Reply {
        Reply::with_keyboard(text, keyboards::main_menu(&self.links))
    }
}

/// Commit a scene outcome to the session.
fn apply<S>(outcome: Outcome<S>, scene: &mut Option<Scene>, wrap: fn(S) -> Scene) -> Vec<Reply> {
    match outcome {
        Outcome::Continue(state, replies) => {
            *scene = Some(wrap(state));
            replies
        }
        Outcome::Exit(replies) => {
            *scene = None;
            replies
        }
    }
}

fn cancel_notice(scene: &mut Option<Scene>) -> Vec<Reply> {
    if scene.take().is_some() {
        vec![Reply::text(messages::ACTION_CANCELLED)]
    } else {
        Vec::new()
    }
}
