//! worklog-core - Core library for Worklog
//!
//! Offline-first sync engine for work time tracking: a local replica store,
//! a durable mutation queue, offline actions, and the processor and triggers
//! that replay queued mutations against the remote API.

pub mod actions;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod network;
pub mod queue;
pub mod services;
pub mod state;
pub mod sync;
pub mod util;

pub use error::{Error, Result};
pub use models::{WorkLog, WorkLogId};
