//! Connectivity signal plumbing
//!
//! The hosting environment reports binary online/offline state through a
//! [`ConnectivityMonitor`]; the sync coordinator subscribes and treats the
//! offline-to-online transition as a trigger for an immediate sync pass.
//! Receivers are handed out explicitly so the subscription lifecycle is
//! visible: the coordinator's background loop owns its receiver and drops it
//! on stop.

use clubsync_domain::ConnectivityState;
use tokio::sync::watch;
use tracing::{info, warn};

/// Publisher side of the connectivity signal.
pub struct ConnectivityMonitor {
    tx: watch::Sender<ConnectivityState>,
}

impl ConnectivityMonitor {
    /// Create a monitor with the given initial state.
    pub fn new(initial: ConnectivityState) -> Self {
        Self { tx: watch::channel(initial).0 }
    }

    /// Current state as last reported by the environment.
    pub fn state(&self) -> ConnectivityState {
        *self.tx.borrow()
    }

    /// Report that connectivity is available.
    pub fn set_online(&self) {
        self.set_state(ConnectivityState::Online);
    }

    /// Report that connectivity has been lost.
    pub fn set_offline(&self) {
        self.set_state(ConnectivityState::Offline);
    }

    /// Report a new state; subscribers are only notified on transitions.
    pub fn set_state(&self, state: ConnectivityState) {
        let modified = self.tx.send_if_modified(|current| {
            if *current == state {
                return false;
            }
            *current = state;
            true
        });

        if modified {
            match state {
                ConnectivityState::Online => info!("connectivity restored"),
                ConnectivityState::Offline => warn!("connectivity lost"),
            }
        }
    }

    /// Subscribe to state transitions.
    pub fn subscribe(&self) -> watch::Receiver<ConnectivityState> {
        self.tx.subscribe()
    }
}

impl Default for ConnectivityMonitor {
    fn default() -> Self {
        Self::new(ConnectivityState::Online)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscribers_see_transitions() {
        let monitor = ConnectivityMonitor::new(ConnectivityState::Offline);
        let mut rx = monitor.subscribe();

        assert!(!rx.borrow().is_online());

        monitor.set_online();
        rx.changed().await.expect("transition delivered");
        assert!(rx.borrow_and_update().is_online());
    }

    #[tokio::test]
    async fn repeated_state_does_not_notify() {
        let monitor = ConnectivityMonitor::new(ConnectivityState::Online);
        let mut rx = monitor.subscribe();

        // Same state again: no notification should be queued.
        monitor.set_online();
        assert!(!rx.has_changed().expect("channel open"));

        monitor.set_offline();
        assert!(rx.has_changed().expect("channel open"));
    }

    #[test]
    fn state_reflects_last_report() {
        let monitor = ConnectivityMonitor::default();
        assert!(monitor.state().is_online());

        monitor.set_offline();
        assert!(!monitor.state().is_online());
    }
}
