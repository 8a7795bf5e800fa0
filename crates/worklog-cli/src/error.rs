use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] worklog_core::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("No work description provided")]
    EmptyDescription,
    #[error("Already tracking \"{0}\"; use `worklog switch` or `worklog stop` first")]
    AlreadyActive(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error(
        "No API configured. Run `worklog config init --api-url <URL>` or set WORKLOG_API_URL."
    )]
    ApiNotConfigured,
}
