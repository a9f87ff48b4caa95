//! # Stop notification shared by all workers of a session.
//!
//! A [`CancellationToken`] cannot be un-cancelled, so [`StopSignal`] keeps the
//! current token behind a lock and swaps in a fresh one on [`reset`](StopSignal::reset).
//! Workers receive a clone of the token that was current when they were spawned.

use std::sync::{Arc, PoisonError, RwLock};

use tokio_util::sync::CancellationToken;

/// Resettable, session-wide stop notification.
#[derive(Clone, Debug, Default)]
pub struct StopSignal {
    current: Arc<RwLock<CancellationToken>>,
}

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Token handed to workers spawned from now until the next reset.
    pub fn token(&self) -> CancellationToken {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Tells every worker holding the current token to stop.
    pub fn broadcast(&self) {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .cancel();
    }

    /// Returns `true` once [`broadcast`](Self::broadcast) ran for the current token.
    pub fn is_broadcast(&self) -> bool {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_cancelled()
    }

    /// Installs a fresh token so a later spawn cycle starts clean.
    pub fn reset(&self) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = CancellationToken::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_does_not_revive_old_tokens() {
        let stop = StopSignal::new();
        let old = stop.token();

        stop.broadcast();
        assert!(old.is_cancelled());
        assert!(stop.is_broadcast());

        stop.reset();
        assert!(!stop.is_broadcast());
        assert!(!stop.token().is_cancelled());
        assert!(old.is_cancelled());
    }
}
