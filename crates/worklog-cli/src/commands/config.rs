use worklog_core::util::trimmed_non_empty;

use crate::cli::ConfigCommands;
use crate::config::{default_config_path, CliConfig};
use crate::error::CliError;

pub fn run_config(command: ConfigCommands) -> Result<(), CliError> {
    match command {
        ConfigCommands::Init {
            api_url,
            api_token,
            user_id,
        } => run_config_init(api_url, api_token, user_id),
        ConfigCommands::Show => run_config_show(),
    }
}

pub fn run_config_init(
    api_url: Option<String>,
    api_token: Option<String>,
    user_id: Option<String>,
) -> Result<(), CliError> {
    let existing = CliConfig::load()?;
    let config = merge_config_init(existing, api_url, api_token, user_id)?;
    let path = config.save()?;

    println!("Config written to {}", path.display());
    if config.api_base_url.is_none() {
        println!("No API URL set; changes will stay queued locally.");
    }
    Ok(())
}

/// Explicit values win over the existing file; URLs are validated before saving
pub fn merge_config_init(
    existing: CliConfig,
    api_url: Option<String>,
    api_token: Option<String>,
    user_id: Option<String>,
) -> Result<CliConfig, CliError> {
    let mut config = existing;
    if let Some(url) = trimmed_non_empty(api_url) {
        config.api_base_url = Some(url);
    }
    if let Some(token) = trimmed_non_empty(api_token) {
        config.api_token = Some(token);
    }
    if let Some(user_id) = trimmed_non_empty(user_id) {
        config.user_id = Some(user_id);
    }

    let config = config.normalized();
    config.api_config()?;
    Ok(config)
}

pub fn run_config_show() -> Result<(), CliError> {
    let config = CliConfig::load()?.with_env_overrides();
    for line in format_config_lines(&config) {
        println!("{line}");
    }
    println!("config file: {}", default_config_path().display());
    Ok(())
}

pub fn format_config_lines(config: &CliConfig) -> Vec<String> {
    vec![
        format!(
            "api_base_url: {}",
            config.api_base_url.as_deref().unwrap_or("(not set)")
        ),
        format!(
            "api_token: {}",
            if config.api_token.is_some() {
                "(set)"
            } else {
                "(not set)"
            }
        ),
        format!("user_id: {}", config.user_id()),
    ]
}
