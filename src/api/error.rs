//! Error type for API calls.

use std::fmt;

/// Classified outcome of a failed API call.
///
/// `Unauthorized` and `RateLimited` get dedicated variants because the
/// client reacts to them structurally: a 401 ends the session, a 429
/// triggers a usage re-check instead of an error banner. Transport failures
/// are carried as `Network` and are the trigger for offline fallback
/// replies.
#[derive(Debug, Clone)]
pub enum ApiError {
    /// HTTP 401. The stored session has already been cleared by the time
    /// callers see this.
    Unauthorized,
    /// HTTP 429, optionally with the server's limit message.
    RateLimited { message: Option<String> },
    /// Any other non-success status.
    Api { status: u16, message: String },
    /// Transport-level failure: connect, timeout, TLS.
    Network(String),
    /// The response arrived but its body was not the expected shape.
    Decode(String),
}

impl ApiError {
    pub fn network(err: &reqwest::Error) -> ApiError {
        ApiError::Network(err.to_string())
    }

    pub fn is_network(&self) -> bool {
        matches!(self, ApiError::Network(_))
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, ApiError::RateLimited { .. })
    }

    /// Message suitable for showing to the user; server-provided text when
    /// available, otherwise the given generic fallback.
    pub fn user_message(&self, generic: &str) -> String {
        match self {
            ApiError::Api { message, .. } if !message.is_empty() => message.clone(),
            ApiError::RateLimited {
                message: Some(message),
            } => message.clone(),
            ApiError::RateLimited { message: None } => {
                "오늘의 대화 한도에 도달했습니다.".to_string()
            }
            ApiError::Unauthorized => self.to_string(),
            _ => generic.to_string(),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Unauthorized => {
                write!(f, "세션이 만료되었습니다. 다시 로그인해주세요.")
            }
            ApiError::RateLimited { message } => match message {
                Some(message) => write!(f, "{message}"),
                None => write!(f, "오늘의 대화 한도에 도달했습니다."),
            },
            ApiError::Api { status, message } => {
                write!(f, "API error (status {status}): {message}")
            }
            ApiError::Network(message) => write!(f, "network error: {message}"),
            ApiError::Decode(message) => write!(f, "unexpected response: {message}"),
        }
    }
}

impl std::error::Error for ApiError {}
