//! Observable connectivity flag.
//!
//! Platform adapters feed `online`/`offline` events in; everything else only
//! reads the current value or subscribes to changes.

use std::sync::Arc;

use tokio::sync::watch;

/// Platform connectivity transition
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NetworkEvent {
    Online,
    Offline,
}

/// Shared "is this client connected" value
#[derive(Clone, Debug)]
pub struct NetworkMonitor {
    sender: Arc<watch::Sender<bool>>,
}

impl NetworkMonitor {
    /// Seed from the platform's reported connectivity; `None` means no signal and counts as online.
    pub fn new(platform_online: Option<bool>) -> Self {
        let (sender, _receiver) = watch::channel(platform_online.unwrap_or(true));
        Self {
            sender: Arc::new(sender),
        }
    }

    pub fn is_online(&self) -> bool {
        *self.sender.borrow()
    }

    /// Apply a platform event; returns true when the value changed
    pub fn handle_event(&self, event: NetworkEvent) -> bool {
        let online = event == NetworkEvent::Online;
        let changed = self.sender.send_if_modified(|current| {
            if *current == online {
                false
            } else {
                *current = online;
                true
            }
        });

        if changed {
            tracing::debug!("Network is now {}", if online { "online" } else { "offline" });
        }
        changed
    }

    /// Receiver notified on every change of the flag
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.sender.subscribe()
    }
}

impl Default for NetworkMonitor {
    fn default() -> Self {
        Self::new(None)
    }
}
