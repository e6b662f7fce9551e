//! URL helpers for building API endpoint addresses.
//!
//! The configured base URL may or may not carry a trailing slash; these
//! helpers keep endpoint construction consistent either way.

/// Strip trailing slashes from a base URL.
///
/// # Examples
///
/// ```
/// use maum::utils::url::normalize_base_url;
///
/// assert_eq!(normalize_base_url("https://example.com/api"), "https://example.com/api");
/// assert_eq!(normalize_base_url("https://example.com/api/"), "https://example.com/api");
/// ```
pub fn normalize_base_url(base_url: &str) -> String {
    base_url.trim_end_matches('/').to_string()
}

/// Join a base URL and an endpoint path with exactly one slash between them.
///
/// # Examples
///
/// ```
/// use maum::utils::url::construct_api_url;
///
/// assert_eq!(
///     construct_api_url("https://example.com/api", "chat/send"),
///     "https://example.com/api/chat/send"
/// );
/// assert_eq!(
///     construct_api_url("https://example.com/api/", "/chat/send"),
///     "https://example.com/api/chat/send"
/// );
/// ```
pub fn construct_api_url(base_url: &str, endpoint: &str) -> String {
    let normalized_base = normalize_base_url(base_url);
    let endpoint = endpoint.trim_start_matches('/');
    format!("{}/{}", normalized_base, endpoint)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_trailing_slashes() {
        assert_eq!(
            normalize_base_url("https://example.com/api///"),
            "https://example.com/api"
        );
        assert_eq!(normalize_base_url("https://example.com"), "https://example.com");
    }

    #[test]
    fn joins_base_and_endpoint_without_double_slashes() {
        assert_eq!(
            construct_api_url("https://example.com/api/", "chat/usage/check"),
            "https://example.com/api/chat/usage/check"
        );
        assert_eq!(
            construct_api_url("https://example.com/api", "/auth/me"),
            "https://example.com/api/auth/me"
        );
    }
}
