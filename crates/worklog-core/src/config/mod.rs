//! Sync engine configuration.
//!
//! Holds the retry schedule used by the sync processor, the remote API
//! endpoint settings, and the wake-up tag shared with platform schedulers.

use std::fmt;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::util::{has_http_scheme, trimmed_non_empty};

/// Attempts allowed per queue item before it is abandoned for the pass.
pub const MAX_RETRY: u32 = 5;

/// First backoff delay; each further retry doubles it.
pub const BASE_DELAY_MS: u64 = 2000;

/// Tag registered with a platform wake-up capability.
pub const SYNC_TAG: &str = "sync-worklogs";

/// Bounded retry with exponential backoff and no jitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum attempts per item (including the first one)
    pub max_retries: u32,
    /// Delay after the first failed attempt
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub const fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    /// Delay to wait after a failure that brought the item to `retry_count`.
    ///
    /// `base_delay * 2^(retry_count - 1)`; only arithmetic overflow saturates.
    pub fn delay_for(&self, retry_count: u32) -> Duration {
        let exponent = retry_count.saturating_sub(1);
        let factor = 2u32.checked_pow(exponent).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor)
    }

    /// Whether an item that has failed `retry_count` times may be attempted again.
    pub const fn allows_retry(&self, retry_count: u32) -> bool {
        retry_count < self.max_retries
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(MAX_RETRY, Duration::from_millis(BASE_DELAY_MS))
    }
}

/// Remote work log API endpoint.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiConfig {
    base_url: String,
    auth_token: Option<String>,
}

impl ApiConfig {
    /// Validate and normalize an API base URL (`http://` or `https://`, no trailing slash).
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let base_url = trimmed_non_empty(Some(base_url.into()))
            .ok_or_else(|| Error::InvalidInput("API base URL must not be empty".to_string()))?;
        if !has_http_scheme(&base_url) {
            return Err(Error::InvalidInput(
                "API base URL must include http:// or https://".to_string(),
            ));
        }

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_token: None,
        })
    }

    /// Attach a bearer token sent with every request
    #[must_use]
    pub fn with_auth_token(mut self, token: Option<String>) -> Self {
        self.auth_token = trimmed_non_empty(token);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn auth_token(&self) -> Option<&str> {
        self.auth_token.as_deref()
    }
}

impl fmt::Debug for ApiConfig {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("ApiConfig")
            .field("base_url", &self.base_url)
            .field(
                "auth_token",
                &self.auth_token.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_matches_documented_schedule() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_retries, 5);
        assert_eq!(policy.delay_for(1), Duration::from_millis(2000));
        assert_eq!(policy.delay_for(2), Duration::from_millis(4000));
        assert_eq!(policy.delay_for(3), Duration::from_millis(8000));
        assert_eq!(policy.delay_for(4), Duration::from_millis(16000));
    }

    #[test]
    fn delay_is_uncapped_until_overflow() {
        let policy = RetryPolicy::new(100, Duration::from_millis(1));
        assert_eq!(policy.delay_for(21), Duration::from_millis(1 << 20));
        assert!(policy.delay_for(90) > Duration::from_secs(1_000_000));
    }

    #[test]
    fn allows_retry_below_limit_only() {
        let policy = RetryPolicy::default();
        assert!(policy.allows_retry(4));
        assert!(!policy.allows_retry(5));
        assert!(!policy.allows_retry(6));
    }

    #[test]
    fn api_config_rejects_invalid_urls() {
        assert!(ApiConfig::new("  ").is_err());
        assert!(ApiConfig::new("api.example.com").is_err());
    }

    #[test]
    fn api_config_trims_trailing_slash_and_redacts_token() {
        let config = ApiConfig::new(" https://api.example.com/ ")
            .unwrap()
            .with_auth_token(Some("secret".to_string()));
        assert_eq!(config.base_url(), "https://api.example.com");
        assert_eq!(config.auth_token(), Some("secret"));

        let debug = format!("{config:?}");
        assert!(!debug.contains("secret"));
        assert!(debug.contains("[REDACTED]"));
    }
}
