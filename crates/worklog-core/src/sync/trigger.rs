//! Decides when a drain pass runs.

use std::sync::atomic::{AtomicBool, Ordering};

use thiserror::Error;

use crate::config::SYNC_TAG;
use crate::error::Result;
use crate::network::NetworkMonitor;

use super::api::WorkLogApi;
use super::processor::{SyncProcessor, SyncReport};

/// Platform background wake-up registration failed
#[derive(Debug, Error)]
#[error("Wake-up registration failed: {0}")]
pub struct WakeUpError(pub String);

/// Platform capability that re-invokes the client later under a named tag
pub trait WakeUpScheduler: Send + Sync {
    fn register(&self, tag: &str) -> std::result::Result<(), WakeUpError>;
}

/// Invoked after a pass that removed at least one item
pub type SuccessCallback = Box<dyn Fn(&SyncReport) + Send + Sync>;

/// What a sync request ended up doing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Network reported offline; nothing was sent
    Offline,
    /// Handed off to the platform wake-up scheduler
    Scheduled,
    /// A pass was already running and will drain again when it finishes
    Coalesced,
    /// A pass ran in the current context
    Completed(SyncReport),
}

impl SyncOutcome {
    /// The report of a pass that ran here, if any
    pub const fn report(&self) -> Option<&SyncReport> {
        match self {
            Self::Completed(report) => Some(report),
            _ => None,
        }
    }
}

pub struct SyncTrigger<A> {
    processor: SyncProcessor<A>,
    network: NetworkMonitor,
    scheduler: Option<Box<dyn WakeUpScheduler>>,
    on_success: Option<SuccessCallback>,
    running: AtomicBool,
    rerun: AtomicBool,
}

/// Clears the running flag however the pass ends
struct PassGuard<'a>(&'a AtomicBool);

impl Drop for PassGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl<A: WorkLogApi> SyncTrigger<A> {
    pub fn new(processor: SyncProcessor<A>, network: NetworkMonitor) -> Self {
        Self {
            processor,
            network,
            scheduler: None,
            on_success: None,
            running: AtomicBool::new(false),
            rerun: AtomicBool::new(false),
        }
    }

    #[must_use]
    pub fn with_scheduler(mut self, scheduler: Option<Box<dyn WakeUpScheduler>>) -> Self {
        self.scheduler = scheduler;
        self
    }

    #[must_use]
    pub fn with_success_callback(mut self, callback: Option<SuccessCallback>) -> Self {
        self.on_success = callback;
        self
    }

    pub const fn network(&self) -> &NetworkMonitor {
        &self.network
    }

    pub const fn processor(&self) -> &SyncProcessor<A> {
        &self.processor
    }

    /// True while a pass is draining the queue
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Ask for a sync after a local change.
    ///
    /// Offline is a no-op. Online, the wake-up scheduler is preferred; without
    /// one, or when registration fails, a pass runs right here.
    pub async fn request_sync(&self) -> Result<SyncOutcome> {
        if !self.network.is_online() {
            tracing::debug!("Offline; sync request deferred");
            return Ok(SyncOutcome::Offline);
        }

        if let Some(scheduler) = &self.scheduler {
            match scheduler.register(SYNC_TAG) {
                Ok(()) => {
                    tracing::debug!("Registered wake-up tag {}", SYNC_TAG);
                    return Ok(SyncOutcome::Scheduled);
                }
                Err(error) => {
                    tracing::warn!("{}; syncing immediately", error);
                }
            }
        }

        self.run_pass().await
    }

    /// Run a pass now, bypassing the scheduler
    pub async fn sync_now(&self) -> Result<SyncOutcome> {
        if !self.network.is_online() {
            tracing::info!("Offline; sync skipped");
            return Ok(SyncOutcome::Offline);
        }
        self.run_pass().await
    }

    /// Platform wake-up entry point; tags other than ours are ignored
    pub async fn on_wake_up(&self, tag: &str) -> Result<Option<SyncOutcome>> {
        if tag != SYNC_TAG {
            return Ok(None);
        }
        self.sync_now().await.map(Some)
    }

    /// Requests a sync on every offline to online transition.
    ///
    /// Runs until the monitor's sender is gone, which in practice means until
    /// the caller drops this future.
    pub async fn watch_reconnects(&self) {
        let mut receiver = self.network.subscribe();
        let mut was_online = *receiver.borrow_and_update();

        while receiver.changed().await.is_ok() {
            let online = *receiver.borrow_and_update();
            if online && !was_online {
                tracing::info!("Network reconnected; requesting sync");
                if let Err(error) = self.request_sync().await {
                    tracing::warn!("Reconnect sync failed: {}", error);
                }
            }
            was_online = online;
        }
    }

    async fn run_pass(&self) -> Result<SyncOutcome> {
        if self.running.swap(true, Ordering::SeqCst) {
            self.rerun.store(true, Ordering::SeqCst);
            tracing::debug!("Sync pass already running; coalesced");
            return Ok(SyncOutcome::Coalesced);
        }

        let mut report = SyncReport::default();
        loop {
            let guard = PassGuard(&self.running);
            loop {
                self.rerun.store(false, Ordering::SeqCst);
                report.absorb(self.processor.drain_and_sync().await?);
                if !self.rerun.load(Ordering::SeqCst) {
                    break;
                }
                tracing::debug!("Sync requested during pass; draining again");
            }
            drop(guard);

            if !self.reclaim_for_rerun() {
                break;
            }
            tracing::debug!("Sync requested while releasing pass; draining again");
        }

        if report.has_success() {
            if let Some(callback) = &self.on_success {
                callback(&report);
            }
        }
        Ok(SyncOutcome::Completed(report))
    }

    /// Called after a pass is released. A request that coalesced between the
    /// last rerun check and the release has left `rerun` set with no pass
    /// running; take the pass back in that case.
    fn reclaim_for_rerun(&self) -> bool {
        self.rerun.load(Ordering::SeqCst) && !self.running.swap(true, Ordering::SeqCst)
    }
}
