//! Sync engine: remote API seam, queue processor and triggers

mod api;
mod processor;
#[cfg(test)]
pub(crate) mod testing;
mod trigger;

pub use api::{
    HttpWorkLogApi, RemoteReceipt, RemoteRequest, SyncError, SyncResult, WorkLogApi,
    WorkLogPayload,
};
pub use processor::{SyncProcessor, SyncReport};
pub use trigger::{SuccessCallback, SyncOutcome, SyncTrigger, WakeUpError, WakeUpScheduler};
