//! Small helpers for config values, tags and error text.

/// Longest error text kept on a queue item
pub const MAX_ERROR_CHARS: usize = 180;

/// The trimmed value, or `None` for missing and blank input
pub fn trimmed_non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

pub fn has_http_scheme(value: &str) -> bool {
    ["http://", "https://"]
        .iter()
        .any(|scheme| value.starts_with(scheme))
}

/// Trimmed and clipped to [`MAX_ERROR_CHARS`]
pub fn clip_error_text(value: &str) -> String {
    value.trim().chars().take(MAX_ERROR_CHARS).collect()
}

/// Current Unix timestamp in milliseconds.
pub fn unix_millis_now() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Trim, lowercase and de-duplicate tags, keeping first-seen order.
pub fn normalize_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut normalized: Vec<String> = Vec::new();
    for tag in tags {
        let tag = tag.as_ref().trim().to_lowercase();
        if !tag.is_empty() && !normalized.contains(&tag) {
            normalized.push(tag);
        }
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_config_values_become_none() {
        assert_eq!(trimmed_non_empty(None), None);
        assert_eq!(trimmed_non_empty(Some(" \t ".to_string())), None);
        assert_eq!(
            trimmed_non_empty(Some("  user-7 ".to_string())).as_deref(),
            Some("user-7")
        );
    }

    #[test]
    fn api_urls_need_an_http_scheme() {
        assert!(has_http_scheme("http://127.0.0.1:8080"));
        assert!(has_http_scheme("https://worklog.example"));
        assert!(!has_http_scheme("ws://worklog.example"));
        assert!(!has_http_scheme("worklog.example/api"));
    }

    #[test]
    fn error_text_is_clipped() {
        let body = format!("  {}  ", "x".repeat(MAX_ERROR_CHARS + 20));
        assert_eq!(clip_error_text(&body).len(), MAX_ERROR_CHARS);
        assert_eq!(clip_error_text(" gateway timeout "), "gateway timeout");
    }

    #[test]
    fn normalize_tags_dedupes_in_order() {
        let tags = normalize_tags([" Deep-Work", "", "meetings", "deep-work "]);
        assert_eq!(tags, vec!["deep-work", "meetings"]);
    }
}
