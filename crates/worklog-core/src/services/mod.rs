//! Shared service layer used by clients

mod worklog;

pub use worklog::{ServiceOptions, WorkLogService};
