//! Per-user session slots and the recalculation guard.
//!
//! Each user gets one `SessionSlot`. The scene mutex serializes update
//! handling for that user; the recalculation flag is a compare-and-swap
//! guard against duplicate "recalculate" taps arriving before the first
//! one finishes. The guard releases on drop, error paths included.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use super::calculator::CalcState;
use super::lead::LeadState;

/// Active scene of a session.
#[derive(Debug, Clone, PartialEq)]
pub enum Scene {
    Calculator(CalcState),
    Lead(LeadState),
}

/// One user's conversation state.
pub struct SessionSlot {
    /// Active scene, if any. Held locked while one update is handled, so a
    /// user's updates are processed strictly in sequence.
    pub scene: tokio::sync::Mutex<Option<Scene>>,
    recalc_in_flight: AtomicBool,
}

impl SessionSlot {
    fn new() -> Self {
        Self {
            scene: tokio::sync::Mutex::new(None),
            recalc_in_flight: AtomicBool::new(false),
        }
    }

    /// Try to take the recalculation guard. Returns `None` while another
    /// recalculation for this session is still in flight.
    pub fn try_begin_recalculate(self: &Arc<Self>) -> Option<RecalcGuard> {
        self.recalc_in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| RecalcGuard {
                slot: Arc::clone(self),
            })
    }
}

/// Releases the recalculation flag when dropped.
pub struct RecalcGuard {
    slot: Arc<SessionSlot>,
}

impl Drop for RecalcGuard {
    fn drop(&mut self) {
        self.slot.recalc_in_flight.store(false, Ordering::Release);
    }
}

/// All sessions, keyed by user ID.
#[derive(Default)]
pub struct SessionStore {
    slots: Mutex<HashMap<i64, Arc<SessionSlot>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or create the slot for a user.
    pub fn slot(&self, user_id: i64) -> Arc<SessionSlot> {
        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        Arc::clone(
            slots
                .entry(user_id)
                .or_insert_with(|| Arc::new(SessionSlot::new())),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recalc_guard_is_exclusive() {
        let slot = Arc::new(SessionSlot::new());

        let first = slot.try_begin_recalculate();
        assert!(first.is_some());

        // Second tap while the first is in flight is refused.
        assert!(slot.try_begin_recalculate().is_none());

        drop(first);

        // Released on drop — a later restart can proceed.
        assert!(slot.try_begin_recalculate().is_some());
    }

    #[test]
    fn store_returns_same_slot_per_user() {
        let store = SessionStore::new();
        let a = store.slot(1);
        let b = store.slot(1);
        let c = store.slot(2);
        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &c));
    }
}
