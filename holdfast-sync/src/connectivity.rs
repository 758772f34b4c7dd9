//! Connection state shared between the sync engine and its callers.

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{info, warn};

/// Whether the remote store is believed reachable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Connectivity {
    /// No remote call has completed yet.
    #[default]
    Unknown,
    Online,
    Offline,
}

/// Publishes [`Connectivity`] changes to any number of subscribers.
#[derive(Debug)]
pub struct ConnectionMonitor {
    state: watch::Sender<Connectivity>,
}

impl ConnectionMonitor {
    pub fn new() -> Self {
        let (state, _) = watch::channel(Connectivity::Unknown);
        Self { state }
    }

    /// Current state.
    pub fn state(&self) -> Connectivity {
        *self.state.borrow()
    }

    pub fn is_offline(&self) -> bool {
        self.state() == Connectivity::Offline
    }

    /// Records a new state. Subscribers are only woken on an actual change.
    pub fn set(&self, next: Connectivity) {
        let changed = self.state.send_if_modified(|current| {
            if *current == next {
                return false;
            }
            *current = next;
            true
        });
        if changed {
            match next {
                Connectivity::Offline => warn!("remote store went offline"),
                Connectivity::Online => info!("remote store online"),
                Connectivity::Unknown => {}
            }
        }
    }

    /// Returns a receiver that observes every subsequent change.
    pub fn subscribe(&self) -> watch::Receiver<Connectivity> {
        self.state.subscribe()
    }
}

impl Default for ConnectionMonitor {
    fn default() -> Self {
        Self::new()
    }
}
