//! Auth session: login, register, logout, and startup token validation.
//!
//! An explicit context object owned by the CLI entry point; it is created
//! once at startup and handed to whatever command needs it. Holds the
//! current user and the last user-visible error. Token persistence goes
//! through the [`crate::core::store::SessionStore`] behind the API client.

use tracing::debug;

use crate::api::{ApiClient, ApiError, AuthResponse};
use crate::core::store::SessionStore;
use crate::utils::validation::{
    validate_email, validate_password, validate_password_confirmation, ValidationError,
};

const GENERIC_LOGIN_ERROR: &str = "로그인 중 오류가 발생했습니다. 다시 시도해주세요.";
const GENERIC_SIGNUP_ERROR: &str = "회원가입 중 오류가 발생했습니다. 다시 시도해주세요.";

pub struct AuthSession {
    client: ApiClient,
    pub user: Option<crate::core::message::User>,
    pub error: Option<String>,
}

impl AuthSession {
    pub fn new(client: ApiClient) -> Self {
        AuthSession {
            client,
            user: None,
            error: None,
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    /// Startup validation: when a token is stored, fetch the current user to
    /// confirm it is still good, clearing the session if not. Without a
    /// token this is a no-op (anonymous use is allowed).
    pub async fn load_user(&mut self) {
        if self.client.store().token().is_none() {
            return;
        }
        match self.client.current_user().await {
            Ok(me) if me.success && me.authenticated => {
                self.user = me.user;
            }
            Ok(_) => {
                debug!("stored token rejected by /auth/me; clearing session");
                self.client.store().clear_session();
            }
            Err(ApiError::Unauthorized) => {
                // The 401 funnel already cleared the session.
            }
            Err(err) => {
                debug!(error = %err, "could not validate stored session");
                self.client.store().clear_session();
            }
        }
    }

    /// Returns true on success. Validation failures set `error` without any
    /// network call. Only presence and email shape are checked here; the
    /// password length floor applies at signup, so accounts created before
    /// the floor can still log in.
    pub async fn login(&mut self, email: &str, password: &str) -> bool {
        self.error = None;
        let validated = if password.is_empty() {
            Err(ValidationError::MissingField)
        } else {
            validate_email(email)
        };
        if let Err(err) = validated {
            self.error = Some(err.to_string());
            return false;
        }

        match self.client.login(email, password).await {
            Ok(response) => self.adopt_auth(response, GENERIC_LOGIN_ERROR),
            Err(err) => self.fail_auth(&err, GENERIC_LOGIN_ERROR),
        }
    }

    /// Returns true on success. Email, password length, and confirmation are
    /// all checked locally first.
    pub async fn register(
        &mut self,
        email: &str,
        password: &str,
        confirmation: &str,
        name: Option<&str>,
    ) -> bool {
        self.error = None;
        let validated = validate_email(email)
            .and_then(|_| validate_password(password))
            .and_then(|_| validate_password_confirmation(password, confirmation));
        if let Err(err) = validated {
            self.error = Some(err.to_string());
            return false;
        }

        match self.client.signup(email, password, name).await {
            Ok(response) => self.adopt_auth(response, GENERIC_SIGNUP_ERROR),
            Err(err) => self.fail_auth(&err, GENERIC_SIGNUP_ERROR),
        }
    }

    /// Best-effort server logout, then an unconditional local clear.
    pub async fn logout(&mut self) {
        if let Err(err) = self.client.logout().await {
            debug!(error = %err, "logout request failed");
        }
        self.client.store().clear_session();
        self.user = None;
        self.error = None;
    }

    fn adopt_auth(&mut self, response: AuthResponse, generic: &str) -> bool {
        if response.success {
            if let (Some(token), Some(user)) = (response.token, response.user) {
                let stored = self
                    .client
                    .store()
                    .set_token(&token)
                    .and_then(|_| self.client.store().set_cached_user(&user));
                if let Err(err) = stored {
                    debug!(error = %err, "failed to persist session");
                    self.client.store().clear_session();
                    self.error = Some(generic.to_string());
                    return false;
                }
                self.user = Some(user);
                return true;
            }
        }
        // A claimed success without token+user is treated as a failure; make
        // sure nothing half-set lingers.
        self.client.store().clear_session();
        self.error = Some(response.message.unwrap_or_else(|| generic.to_string()));
        false
    }

    fn fail_auth(&mut self, err: &ApiError, generic: &str) -> bool {
        self.error = Some(err.user_message(generic));
        self.client.store().clear_session();
        self.user = None;
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::message::User;
    use crate::core::store::testing::MemorySessionStore;
    use std::sync::Arc;

    fn session_with_store() -> (AuthSession, Arc<MemorySessionStore>) {
        let store = Arc::new(MemorySessionStore::new());
        // Unroutable base URL: these tests must never reach the network.
        let client = ApiClient::new("http://127.0.0.1:9/api", store.clone()).unwrap();
        (AuthSession::new(client), store)
    }

    fn auth_response(token: &str, email: &str) -> AuthResponse {
        AuthResponse {
            success: true,
            token: Some(token.to_string()),
            user: Some(User {
                id: 1,
                email: email.to_string(),
                name: None,
            }),
            message: None,
        }
    }

    #[tokio::test]
    async fn malformed_email_is_rejected_locally() {
        let (mut session, store) = session_with_store();
        let ok = session.login("not-an-email", "secret123").await;
        assert!(!ok);
        assert_eq!(
            session.error.as_deref(),
            Some("유효한 이메일 주소를 입력해주세요.")
        );
        // Rejected before any request; nothing was stored or cleared.
        assert!(store.token().is_none());
        assert_eq!(store.clear_count(), 0);
    }

    #[tokio::test]
    async fn login_sends_short_passwords_to_the_server() {
        let (mut session, store) = session_with_store();
        // No length floor at login: the request goes out and fails against
        // the unroutable host, not against local validation.
        let ok = session.login("user@example.com", "12345").await;
        assert!(!ok);
        assert_eq!(session.error.as_deref(), Some(GENERIC_LOGIN_ERROR));
        // The failed request cleared the session, proof it was attempted.
        assert_eq!(store.clear_count(), 1);
    }

    #[tokio::test]
    async fn login_rejects_an_empty_password_locally() {
        let (mut session, store) = session_with_store();
        let ok = session.login("user@example.com", "").await;
        assert!(!ok);
        assert_eq!(
            session.error.as_deref(),
            Some("모든 필수 항목을 입력해주세요.")
        );
        assert_eq!(store.clear_count(), 0);
    }

    #[tokio::test]
    async fn short_password_is_rejected_locally_on_register() {
        let (mut session, store) = session_with_store();
        let ok = session
            .register("user@example.com", "12345", "12345", None)
            .await;
        assert!(!ok);
        assert_eq!(
            session.error.as_deref(),
            Some("비밀번호는 최소 6자 이상이어야 합니다.")
        );
        assert_eq!(store.clear_count(), 0);
    }

    #[tokio::test]
    async fn mismatched_confirmation_is_rejected_locally() {
        let (mut session, _store) = session_with_store();
        let ok = session
            .register("user@example.com", "secret123", "secret124", None)
            .await;
        assert!(!ok);
        assert_eq!(
            session.error.as_deref(),
            Some("비밀번호가 일치하지 않습니다.")
        );
    }

    #[test]
    fn successful_auth_persists_token_and_user() {
        let (mut session, store) = session_with_store();
        let adopted = session.adopt_auth(
            auth_response("tok-xyz", "user@example.com"),
            GENERIC_LOGIN_ERROR,
        );
        assert!(adopted);
        assert_eq!(session.user.as_ref().unwrap().email, "user@example.com");
        assert_eq!(store.token().as_deref(), Some("tok-xyz"));
        // The token is now attached to subsequent requests.
        assert_eq!(
            session.client().auth_header().as_deref(),
            Some("Bearer tok-xyz")
        );
    }

    #[test]
    fn claimed_success_without_token_clears_any_partial_state() {
        let (mut session, store) = session_with_store();
        store.set_token("partial").unwrap();
        let adopted = session.adopt_auth(
            AuthResponse {
                success: true,
                token: None,
                user: None,
                message: Some("서버 오류".to_string()),
            },
            GENERIC_LOGIN_ERROR,
        );
        assert!(!adopted);
        assert_eq!(session.error.as_deref(), Some("서버 오류"));
        assert!(store.token().is_none());
    }

    #[test]
    fn api_failure_uses_server_message_with_generic_fallback() {
        let (mut session, _store) = session_with_store();
        session.fail_auth(
            &ApiError::Api {
                status: 400,
                message: "이미 가입된 이메일입니다.".to_string(),
            },
            GENERIC_SIGNUP_ERROR,
        );
        assert_eq!(session.error.as_deref(), Some("이미 가입된 이메일입니다."));

        session.fail_auth(&ApiError::Network("timeout".into()), GENERIC_SIGNUP_ERROR);
        assert_eq!(session.error.as_deref(), Some(GENERIC_SIGNUP_ERROR));
    }
}
