//! HTTP client wrapper for the Maum API.
//!
//! One shared `reqwest::Client` with a 30 second request timeout and a
//! cookie store (the service also accepts session cookies). The bearer
//! token is injected from the [`SessionStore`] on every request, and every
//! response funnels through a single status handler: a 401 clears the
//! stored session before surfacing [`ApiError::Unauthorized`].

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::core::message::ConversationStyle;
use crate::core::store::SessionStore;
use crate::utils::url::construct_api_url;

use super::error::ApiError;
use super::{
    AccountDeleteRequest, Acknowledgement, AuthResponse, ChatReply, ConversationsResponse,
    EmotionRecordRequest, EmotionRecordsResponse, EmotionSummaryResponse, LoginRequest,
    MeResponse, MessagesResponse, PasswordChangeRequest, ProfileResponse, ProfileUpdateRequest,
    SendMessageRequest, SignupRequest, TitleUpdateRequest, UsageCheckResponse,
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    store: Arc<dyn SessionStore>,
}

impl ApiClient {
    pub fn new(
        base_url: impl Into<String>,
        store: Arc<dyn SessionStore>,
    ) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .cookie_store(true)
            .build()
            .map_err(|err| ApiError::network(&err))?;
        Ok(ApiClient {
            http,
            base_url: base_url.into(),
            store,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    /// `Authorization` header value for the current session, if any.
    pub fn auth_header(&self) -> Option<String> {
        self.store.token().map(|token| format!("Bearer {token}"))
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let mut builder = self
            .http
            .request(method, construct_api_url(&self.base_url, path));
        if let Some(header) = self.auth_header() {
            builder = builder.header(reqwest::header::AUTHORIZATION, header);
        }
        builder
    }

    async fn execute<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ApiError> {
        let response = builder.send().await.map_err(|err| ApiError::network(&err))?;
        let status = response.status();
        if status.is_success() {
            response
                .json::<T>()
                .await
                .map_err(|err| ApiError::Decode(err.to_string()))
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(self.error_for_status(status, &body))
        }
    }

    /// Single classification point for non-success statuses. On 401 the
    /// stored token and cached user are cleared here, once, before any
    /// caller sees the error.
    fn error_for_status(&self, status: StatusCode, body: &str) -> ApiError {
        let message = extract_message(body);
        match status {
            StatusCode::UNAUTHORIZED => {
                debug!("received 401; clearing stored session");
                self.store.clear_session();
                ApiError::Unauthorized
            }
            StatusCode::TOO_MANY_REQUESTS => ApiError::RateLimited { message },
            _ => ApiError::Api {
                status: status.as_u16(),
                message: message.unwrap_or_default(),
            },
        }
    }

    // Auth

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ApiError> {
        self.execute(
            self.request(Method::POST, "auth/login")
                .json(&LoginRequest { email, password }),
        )
        .await
    }

    pub async fn signup(
        &self,
        email: &str,
        password: &str,
        name: Option<&str>,
    ) -> Result<AuthResponse, ApiError> {
        self.execute(self.request(Method::POST, "auth/signup").json(&SignupRequest {
            email,
            password,
            name,
        }))
        .await
    }

    pub async fn current_user(&self) -> Result<MeResponse, ApiError> {
        self.execute(self.request(Method::GET, "auth/me")).await
    }

    pub async fn logout(&self) -> Result<Acknowledgement, ApiError> {
        self.execute(self.request(Method::POST, "auth/logout")).await
    }

    // Chat

    pub async fn send_message(
        &self,
        message: &str,
        conversation_id: Option<u64>,
        style: ConversationStyle,
    ) -> Result<ChatReply, ApiError> {
        self.execute(
            self.request(Method::POST, "chat/send")
                .json(&SendMessageRequest {
                    message,
                    conversation_id,
                    conversation_style: style.as_str(),
                }),
        )
        .await
    }

    pub async fn conversations(&self) -> Result<ConversationsResponse, ApiError> {
        self.execute(self.request(Method::GET, "chat/conversations"))
            .await
    }

    pub async fn conversation_messages(&self, id: u64) -> Result<MessagesResponse, ApiError> {
        self.execute(self.request(Method::GET, &format!("chat/messages/{id}")))
            .await
    }

    pub async fn delete_conversation(&self, id: u64) -> Result<Acknowledgement, ApiError> {
        self.execute(self.request(Method::DELETE, &format!("chat/conversations/{id}")))
            .await
    }

    pub async fn update_conversation_title(
        &self,
        id: u64,
        title: &str,
    ) -> Result<Acknowledgement, ApiError> {
        self.execute(
            self.request(Method::PUT, &format!("chat/conversations/{id}/title"))
                .json(&TitleUpdateRequest { title }),
        )
        .await
    }

    pub async fn check_usage(&self) -> Result<UsageCheckResponse, ApiError> {
        self.execute(self.request(Method::GET, "chat/usage/check"))
            .await
    }

    // Emotion records

    pub async fn record_emotion(
        &self,
        record: &EmotionRecordRequest<'_>,
    ) -> Result<Acknowledgement, ApiError> {
        self.execute(self.request(Method::POST, "emotion/record").json(record))
            .await
    }

    pub async fn emotion_records(
        &self,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<EmotionRecordsResponse, ApiError> {
        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(start) = start_date {
            query.push(("startDate", start.to_string()));
        }
        if let Some(end) = end_date {
            query.push(("endDate", end.to_string()));
        }
        self.execute(self.request(Method::GET, "emotion/records").query(&query))
            .await
    }

    pub async fn emotion_summary(&self) -> Result<EmotionSummaryResponse, ApiError> {
        self.execute(self.request(Method::GET, "emotion/summary"))
            .await
    }

    // User

    pub async fn profile(&self) -> Result<ProfileResponse, ApiError> {
        self.execute(self.request(Method::GET, "user/profile")).await
    }

    pub async fn update_profile(&self, name: &str) -> Result<ProfileResponse, ApiError> {
        self.execute(
            self.request(Method::PUT, "user/profile")
                .json(&ProfileUpdateRequest { name }),
        )
        .await
    }

    pub async fn change_password(
        &self,
        current_password: &str,
        new_password: &str,
    ) -> Result<Acknowledgement, ApiError> {
        self.execute(
            self.request(Method::PUT, "user/password")
                .json(&PasswordChangeRequest {
                    current_password,
                    new_password,
                }),
        )
        .await
    }

    pub async fn delete_account(&self, password: &str) -> Result<Acknowledgement, ApiError> {
        self.execute(
            self.request(Method::DELETE, "user/account")
                .json(&AccountDeleteRequest { password }),
        )
        .await
    }
}

/// Pull a human-readable message out of an error body. The service wraps
/// errors as `{message}`, `{error: {message}}`, or a bare `{error: "..."}`.
fn extract_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    let message = value
        .pointer("/message")
        .and_then(|v| v.as_str())
        .map(str::to_owned)
        .or_else(|| {
            value.get("error").and_then(|v| match v {
                serde_json::Value::String(s) => Some(s.clone()),
                serde_json::Value::Object(map) => map
                    .get("message")
                    .and_then(|message| message.as_str().map(str::to_owned)),
                _ => None,
            })
        })?;
    let trimmed = message.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::message::User;
    use crate::core::store::testing::MemorySessionStore;

    fn client_with_store() -> (ApiClient, Arc<MemorySessionStore>) {
        let store = Arc::new(MemorySessionStore::new());
        let client = ApiClient::new("http://localhost:4000/api", store.clone()).unwrap();
        (client, store)
    }

    #[test]
    fn unauthorized_clears_token_and_user_exactly_once() {
        let (client, store) = client_with_store();
        store.set_token("stale-token").unwrap();
        store
            .set_cached_user(&User {
                id: 1,
                email: "user@example.com".into(),
                name: None,
            })
            .unwrap();

        let err = client.error_for_status(StatusCode::UNAUTHORIZED, "{}");
        assert!(matches!(err, ApiError::Unauthorized));
        assert!(store.token().is_none());
        assert!(store.cached_user().is_none());
        assert_eq!(store.clear_count(), 1);
    }

    #[test]
    fn rate_limit_carries_the_server_message() {
        let (client, store) = client_with_store();
        let err = client.error_for_status(
            StatusCode::TOO_MANY_REQUESTS,
            r#"{"message": "오늘의 대화 한도에 도달했습니다."}"#,
        );
        match err {
            ApiError::RateLimited { message } => {
                assert_eq!(message.as_deref(), Some("오늘의 대화 한도에 도달했습니다."));
            }
            other => panic!("expected RateLimited, got {other:?}"),
        }
        // Only a 401 may clear the session.
        assert_eq!(store.clear_count(), 0);
    }

    #[test]
    fn other_statuses_map_to_api_errors_without_touching_the_session() {
        let (client, store) = client_with_store();
        store.set_token("still-valid").unwrap();

        let err = client.error_for_status(
            StatusCode::BAD_REQUEST,
            r#"{"error": {"message": "잘못된 요청입니다."}}"#,
        );
        match err {
            ApiError::Api { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "잘못된 요청입니다.");
            }
            other => panic!("expected Api, got {other:?}"),
        }
        assert_eq!(store.token().as_deref(), Some("still-valid"));
    }

    #[test]
    fn auth_header_reflects_the_stored_token() {
        let (client, store) = client_with_store();
        assert!(client.auth_header().is_none());

        store.set_token("tok-abc").unwrap();
        assert_eq!(client.auth_header().as_deref(), Some("Bearer tok-abc"));
    }

    #[test]
    fn extracts_messages_from_the_shapes_the_service_uses() {
        assert_eq!(
            extract_message(r#"{"message": "plain"}"#).as_deref(),
            Some("plain")
        );
        assert_eq!(
            extract_message(r#"{"error": "bare"}"#).as_deref(),
            Some("bare")
        );
        assert_eq!(
            extract_message(r#"{"error": {"message": "nested"}}"#).as_deref(),
            Some("nested")
        );
        assert_eq!(extract_message("not json"), None);
        assert_eq!(extract_message(r#"{"message": "  "}"#), None);
    }
}
