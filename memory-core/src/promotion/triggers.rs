//! Drives [`super::engine::PromotionEngine`] on a schedule and on events
//! (C7).
//!
//! The periodic timer is a cancellable background task; the event
//! triggers are plain functions the session-state layer calls at the
//! right moments (session pause/close, the pending store hitting its
//! cap, or an agent decision being staged).

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::constants::{DEFAULT_CLOSE_THRESHOLD, DEFAULT_MAX_PENDING_ITEMS, DEFAULT_PROMOTION_THRESHOLD};

/// Why a promotion run was invoked. Determines which threshold applies;
/// it never changes which items are *eligible* (agent decisions always
/// bypass the threshold, per [`crate::pending::PendingMemories::ready_for_promotion`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerKind {
    Periodic,
    SessionPause,
    SessionClose,
    MemoryLimit,
    AgentDecision,
}

impl TriggerKind {
    /// The implicit-item score threshold to run with for this trigger.
    /// Session close uses the lower close threshold to flush more
    /// aggressively before the session's working state is discarded.
    #[must_use]
    pub fn threshold(self) -> f64 {
        match self {
            TriggerKind::SessionClose => DEFAULT_CLOSE_THRESHOLD,
            _ => DEFAULT_PROMOTION_THRESHOLD,
        }
    }
}

/// Whether the pending store has reached a size that should force an
/// out-of-band promotion run before more items can be staged.
#[must_use]
pub fn memory_limit_reached(pending_size: usize) -> bool {
    pending_size >= DEFAULT_MAX_PENDING_ITEMS
}

/// A cancellable handle to a periodic promotion task.
pub struct PeriodicPromotion {
    handle: JoinHandle<()>,
}

impl PeriodicPromotion {
    /// Spawn a background task that calls `tick` every `interval`, passing
    /// [`TriggerKind::Periodic`]. The caller's `tick` closure is
    /// responsible for locking whatever session state it needs and
    /// invoking [`super::engine::PromotionEngine::run`].
    pub fn spawn<F, Fut>(interval: Duration, mut tick: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send,
    {
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                tick().await;
            }
        });
        Self { handle }
    }

    /// Stop the periodic task. Safe to call even if it's mid-tick; the
    /// in-flight tick is allowed to finish before the task is dropped.
    pub fn cancel(self) {
        self.handle.abort();
    }
}

impl Drop for PeriodicPromotion {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn session_close_uses_lower_threshold() {
        assert!(TriggerKind::SessionClose.threshold() < TriggerKind::Periodic.threshold());
    }

    #[test]
    fn memory_limit_trigger_fires_at_cap() {
        assert!(!memory_limit_reached(DEFAULT_MAX_PENDING_ITEMS - 1));
        assert!(memory_limit_reached(DEFAULT_MAX_PENDING_ITEMS));
    }

    #[tokio::test(start_paused = true)]
    async fn periodic_promotion_ticks_and_can_be_cancelled() {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&count);
        let periodic = PeriodicPromotion::spawn(Duration::from_millis(10), move || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });
        tokio::time::advance(Duration::from_millis(35)).await;
        tokio::task::yield_now().await;
        assert!(count.load(Ordering::SeqCst) >= 2);
        periodic.cancel();
    }
}
