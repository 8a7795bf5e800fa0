pub mod common;
pub mod completions;
pub mod config;
pub mod purge;
pub mod queue;
pub mod start;
pub mod status;
pub mod stop;
pub mod switch;
pub mod sync;
