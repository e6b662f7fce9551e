//! Chat session state machine.
//!
//! All transitions are synchronous `begin_*`/`apply_*` pairs: `begin_send`
//! and `begin_probe` hand out tickets describing the network work to do,
//! and the matching `apply_*` folds the result back in. The UI loop owns
//! the actual I/O, so the machine is testable without any network.
//!
//! Every ticket carries the generation it was issued under. Starting a new
//! conversation bumps the generation, and completions from an older
//! generation are dropped without touching state, so a slow reply for an
//! abandoned conversation can never leak into the one on screen.

use tracing::debug;

use crate::api::{ApiError, ChatReply};
use crate::core::fallback::fallback_response;
use crate::core::message::{ConversationStyle, Message, UsageStatus};

/// Conversation id sentinel: no server-side conversation minted yet.
pub const NO_CONVERSATION: u64 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Connecting,
    Connected,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeReason {
    /// Initial connect or a manual retry; the outcome moves
    /// `ConnectionStatus`.
    Connect,
    /// Usage re-check after a 429; connection status is left alone.
    UsageRecheck,
}

#[derive(Debug, Clone)]
pub struct ProbeTicket {
    pub generation: u64,
    pub reason: ProbeReason,
}

#[derive(Debug, Clone)]
pub struct SendTicket {
    pub generation: u64,
    pub text: String,
    pub conversation_id: Option<u64>,
    pub style: ConversationStyle,
}

/// What the caller should do after folding in a send result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    Applied,
    /// The server minted a conversation for this exchange; callers with a
    /// conversation list should refresh it.
    NewConversation(u64),
    /// 429: re-probe usage limits.
    RecheckUsage,
    /// 401: the session is gone; leave the chat.
    SessionExpired,
    /// Stale generation; nothing happened.
    Dropped,
}

pub struct ChatSession {
    pub messages: Vec<Message>,
    pub status: ConnectionStatus,
    pub is_loading: bool,
    pub usage: Option<UsageStatus>,
    pub crisis_alert: bool,
    pub conversation_id: u64,
    pub style: ConversationStyle,
    pub error: Option<String>,
    generation: u64,
}

const GENERIC_SEND_ERROR: &str = "메시지 전송 중 오류가 발생했습니다. 다시 시도해주세요.";
const DEFAULT_LIMIT_MESSAGE: &str = "오늘의 대화 한도에 도달했습니다.";
const CONNECT_ERROR: &str = "서버에 연결할 수 없습니다. 연결을 다시 시도해주세요.";

impl ChatSession {
    pub fn new(style: ConversationStyle) -> Self {
        ChatSession {
            messages: Vec::new(),
            status: ConnectionStatus::Connecting,
            is_loading: false,
            usage: None,
            crisis_alert: false,
            conversation_id: NO_CONVERSATION,
            style,
            error: None,
            generation: 0,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Replace the transcript with a conversation loaded from the server.
    /// Bumps the generation so anything still in flight is dropped.
    pub fn resume(&mut self, conversation_id: u64, messages: Vec<Message>) {
        self.conversation_id = conversation_id;
        self.messages = messages;
        self.crisis_alert = false;
        self.is_loading = false;
        self.error = None;
        self.generation += 1;
    }

    pub fn set_style(&mut self, style: ConversationStyle) {
        self.style = style;
    }

    pub fn begin_probe(&mut self, reason: ProbeReason) -> ProbeTicket {
        if reason == ProbeReason::Connect {
            self.status = ConnectionStatus::Connecting;
        }
        ProbeTicket {
            generation: self.generation,
            reason,
        }
    }

    pub fn apply_probe(&mut self, ticket: &ProbeTicket, result: Result<UsageStatus, ApiError>) {
        if ticket.generation != self.generation {
            debug!("dropping stale probe result");
            return;
        }
        match (ticket.reason, result) {
            (ProbeReason::Connect, Ok(usage)) => {
                self.status = ConnectionStatus::Connected;
                self.error = limit_error(&usage);
                self.usage = Some(usage);
            }
            (ProbeReason::Connect, Err(err)) => {
                self.status = ConnectionStatus::Error;
                self.error = Some(err.user_message(CONNECT_ERROR));
            }
            (ProbeReason::UsageRecheck, Ok(usage)) => {
                self.error = limit_error(&usage);
                self.usage = Some(usage);
            }
            (ProbeReason::UsageRecheck, Err(err)) => {
                // Matches the original client: a failed usage check after a
                // 429 is logged, not surfaced.
                debug!(error = %err, "usage re-check failed");
            }
        }
    }

    pub fn can_send(&self, text: &str) -> bool {
        self.status == ConnectionStatus::Connected
            && !self.is_loading
            && !text.trim().is_empty()
    }

    /// Optimistically append the user message and return the work to do, or
    /// `None` when sending is not currently permitted (in which case no
    /// network call may be made).
    pub fn begin_send(&mut self, text: &str) -> Option<SendTicket> {
        if !self.can_send(text) {
            return None;
        }
        self.messages.push(Message::user(text));
        self.is_loading = true;
        self.error = None;
        Some(SendTicket {
            generation: self.generation,
            text: text.to_string(),
            conversation_id: (self.conversation_id != NO_CONVERSATION)
                .then_some(self.conversation_id),
            style: self.style,
        })
    }

    pub fn apply_send(
        &mut self,
        ticket: &SendTicket,
        result: Result<ChatReply, ApiError>,
    ) -> SendOutcome {
        if ticket.generation != self.generation {
            debug!("dropping reply for an abandoned conversation");
            return SendOutcome::Dropped;
        }
        self.is_loading = false;

        match result {
            Ok(reply) => {
                self.messages.push(Message::assistant(reply.message));
                if reply.has_crisis_signal {
                    self.crisis_alert = true;
                }
                if let Some(usage) = reply.usage {
                    self.error = limit_error(&usage);
                    self.usage = Some(usage);
                }
                if self.conversation_id == NO_CONVERSATION {
                    if let Some(id) = reply.conversation_id {
                        self.conversation_id = id;
                        return SendOutcome::NewConversation(id);
                    }
                }
                SendOutcome::Applied
            }
            Err(ApiError::Unauthorized) => {
                self.status = ConnectionStatus::Error;
                self.error = Some(ApiError::Unauthorized.to_string());
                SendOutcome::SessionExpired
            }
            Err(err) if err.is_rate_limited() => {
                self.error = Some(err.user_message(DEFAULT_LIMIT_MESSAGE));
                SendOutcome::RecheckUsage
            }
            Err(err) if err.is_network() => {
                // Backend unreachable: degrade to a canned reply instead of
                // a failure banner.
                debug!(error = %err, "chat endpoint unreachable; using fallback response");
                self.messages
                    .push(Message::assistant(fallback_response(&ticket.text, ticket.style)));
                SendOutcome::Applied
            }
            Err(err) => {
                self.error = Some(err.user_message(GENERIC_SEND_ERROR));
                SendOutcome::Applied
            }
        }
    }

    /// Clear the transcript and the crisis advisory, drop any in-flight
    /// work, and go back to "no conversation yet".
    pub fn new_conversation(&mut self) {
        self.messages.clear();
        self.crisis_alert = false;
        self.error = None;
        self.is_loading = false;
        self.conversation_id = NO_CONVERSATION;
        self.generation += 1;
    }
}

fn limit_error(usage: &UsageStatus) -> Option<String> {
    if usage.allowed {
        None
    } else {
        Some(
            usage
                .limit_message
                .clone()
                .unwrap_or_else(|| DEFAULT_LIMIT_MESSAGE.to_string()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::message::{LimitType, Role};

    fn usage(remaining: u32) -> UsageStatus {
        UsageStatus {
            remaining_count: remaining,
            limit_type: LimitType::Authenticated,
            allowed: true,
            limit_message: None,
        }
    }

    fn reply(text: &str) -> ChatReply {
        ChatReply {
            success: true,
            message: text.to_string(),
            conversation_id: None,
            usage: None,
            has_crisis_signal: false,
        }
    }

    fn connected_session() -> ChatSession {
        let mut session = ChatSession::new(ConversationStyle::Default);
        let probe = session.begin_probe(ProbeReason::Connect);
        session.apply_probe(&probe, Ok(usage(10)));
        session
    }

    #[test]
    fn probe_success_connects_and_records_usage() {
        let mut session = ChatSession::new(ConversationStyle::Default);
        assert_eq!(session.status, ConnectionStatus::Connecting);

        let probe = session.begin_probe(ProbeReason::Connect);
        session.apply_probe(&probe, Ok(usage(3)));
        assert_eq!(session.status, ConnectionStatus::Connected);
        assert_eq!(session.usage.as_ref().unwrap().remaining_count, 3);
        assert!(session.error.is_none());
    }

    #[test]
    fn probe_failure_enters_error_and_manual_retry_recovers() {
        let mut session = ChatSession::new(ConversationStyle::Default);
        let probe = session.begin_probe(ProbeReason::Connect);
        session.apply_probe(&probe, Err(ApiError::Network("refused".into())));
        assert_eq!(session.status, ConnectionStatus::Error);
        assert!(session.error.is_some());

        let retry = session.begin_probe(ProbeReason::Connect);
        assert_eq!(session.status, ConnectionStatus::Connecting);
        session.apply_probe(&retry, Ok(usage(5)));
        assert_eq!(session.status, ConnectionStatus::Connected);
        assert!(session.error.is_none());
    }

    #[test]
    fn exhausted_limit_surfaces_the_limit_message() {
        let mut session = ChatSession::new(ConversationStyle::Default);
        let probe = session.begin_probe(ProbeReason::Connect);
        session.apply_probe(
            &probe,
            Ok(UsageStatus {
                remaining_count: 0,
                limit_type: LimitType::Anonymous,
                allowed: false,
                limit_message: None,
            }),
        );
        assert_eq!(session.status, ConnectionStatus::Connected);
        assert_eq!(session.error.as_deref(), Some(DEFAULT_LIMIT_MESSAGE));
    }

    #[test]
    fn send_is_refused_unless_connected_idle_and_nonblank() {
        let mut session = ChatSession::new(ConversationStyle::Default);
        // Still connecting: no ticket, no optimistic append.
        assert!(session.begin_send("안녕하세요").is_none());
        assert!(session.messages.is_empty());

        let mut session = connected_session();
        assert!(session.begin_send("   ").is_none());

        session.is_loading = true;
        assert!(session.begin_send("안녕하세요").is_none());

        session.is_loading = false;
        assert!(session.begin_send("안녕하세요").is_some());
    }

    #[test]
    fn refused_send_while_loading_is_a_complete_noop() {
        let mut session = connected_session();
        let ticket = session.begin_send("첫 메시지").unwrap();

        // Connected but still waiting on the reply: no ticket, and the
        // attempt leaves no trace in the transcript or flags.
        assert!(session.begin_send("성급한 두 번째 메시지").is_none());
        assert_eq!(session.messages.len(), 1);
        assert!(session.is_loading);
        assert!(session.error.is_none());

        // The in-flight exchange still completes normally.
        let outcome = session.apply_send(&ticket, Ok(reply("천천히 답해드릴게요.")));
        assert_eq!(outcome, SendOutcome::Applied);
        assert_eq!(session.messages.len(), 2);
        assert!(!session.is_loading);
    }

    #[test]
    fn send_appends_optimistically_and_success_appends_the_reply() {
        let mut session = connected_session();
        let ticket = session.begin_send("요즘 고민이 많아요").unwrap();
        assert!(session.is_loading);
        assert_eq!(session.messages.len(), 1);
        assert_eq!(session.messages[0].role, Role::User);

        let outcome = session.apply_send(&ticket, Ok(reply("천천히 이야기해 주세요.")));
        assert_eq!(outcome, SendOutcome::Applied);
        assert!(!session.is_loading);
        assert_eq!(session.messages.len(), 2);
        assert_eq!(session.messages[1].role, Role::Assistant);
    }

    #[test]
    fn first_reply_adopts_the_minted_conversation_id() {
        let mut session = connected_session();
        let ticket = session.begin_send("처음 보내는 메시지").unwrap();
        assert_eq!(ticket.conversation_id, None);

        let mut minted = reply("반갑습니다.");
        minted.conversation_id = Some(42);
        let outcome = session.apply_send(&ticket, Ok(minted));
        assert_eq!(outcome, SendOutcome::NewConversation(42));
        assert_eq!(session.conversation_id, 42);

        // Follow-up sends carry the adopted id.
        let next = session.begin_send("두 번째 메시지").unwrap();
        assert_eq!(next.conversation_id, Some(42));
    }

    #[test]
    fn crisis_flag_latches_until_a_new_conversation() {
        let mut session = connected_session();
        let ticket = session.begin_send("너무 괴로워요").unwrap();
        let mut flagged = reply("많이 힘드셨겠어요.");
        flagged.has_crisis_signal = true;
        session.apply_send(&ticket, Ok(flagged));
        assert!(session.crisis_alert);

        // A calm follow-up does not clear the advisory.
        let ticket = session.begin_send("괜찮아졌어요").unwrap();
        session.apply_send(&ticket, Ok(reply("다행이에요.")));
        assert!(session.crisis_alert);

        session.new_conversation();
        assert!(!session.crisis_alert);
    }

    #[test]
    fn rate_limit_requests_a_usage_recheck_without_dropping_the_connection() {
        let mut session = connected_session();
        let ticket = session.begin_send("한 번 더").unwrap();
        let outcome = session.apply_send(&ticket, Err(ApiError::RateLimited { message: None }));
        assert_eq!(outcome, SendOutcome::RecheckUsage);
        assert_eq!(session.status, ConnectionStatus::Connected);

        // The re-check only refreshes usage.
        let probe = session.begin_probe(ProbeReason::UsageRecheck);
        assert_eq!(session.status, ConnectionStatus::Connected);
        session.apply_probe(&probe, Ok(usage(0)));
        assert_eq!(session.usage.as_ref().unwrap().remaining_count, 0);
        assert_eq!(session.status, ConnectionStatus::Connected);
    }

    #[test]
    fn network_failure_degrades_to_a_fallback_reply() {
        let mut session = connected_session();
        let ticket = session.begin_send("오늘 하루 이야기").unwrap();
        let outcome = session.apply_send(&ticket, Err(ApiError::Network("timed out".into())));
        assert_eq!(outcome, SendOutcome::Applied);
        assert_eq!(session.messages.len(), 2);
        assert!(session.messages[1].role.is_assistant());
        assert!(!session.messages[1].content.is_empty());
        assert!(session.error.is_none());
        assert_eq!(session.status, ConnectionStatus::Connected);
    }

    #[test]
    fn session_expiry_ends_the_chat() {
        let mut session = connected_session();
        let ticket = session.begin_send("안녕하세요").unwrap();
        let outcome = session.apply_send(&ticket, Err(ApiError::Unauthorized));
        assert_eq!(outcome, SendOutcome::SessionExpired);
        assert_eq!(session.status, ConnectionStatus::Error);
    }

    #[test]
    fn new_conversation_resets_regardless_of_prior_state() {
        let mut session = connected_session();
        let ticket = session.begin_send("기록을 남겨요").unwrap();
        let mut flagged = reply("네.");
        flagged.has_crisis_signal = true;
        flagged.conversation_id = Some(7);
        session.apply_send(&ticket, Ok(flagged));
        session.error = Some("something".into());

        session.new_conversation();
        assert!(session.messages.is_empty());
        assert!(!session.crisis_alert);
        assert!(session.error.is_none());
        assert!(!session.is_loading);
        assert_eq!(session.conversation_id, NO_CONVERSATION);
    }

    #[test]
    fn completions_from_an_older_generation_are_dropped() {
        let mut session = connected_session();
        let stale = session.begin_send("첫 대화에서 보낸 메시지").unwrap();

        session.new_conversation();
        assert!(session.messages.is_empty());

        let outcome = session.apply_send(&stale, Ok(reply("늦게 도착한 응답")));
        assert_eq!(outcome, SendOutcome::Dropped);
        assert!(session.messages.is_empty());
        assert!(!session.is_loading);

        // Stale probes are ignored the same way.
        let mut session = connected_session();
        let probe = session.begin_probe(ProbeReason::Connect);
        session.new_conversation();
        session.apply_probe(&probe, Err(ApiError::Network("late".into())));
        assert_ne!(session.status, ConnectionStatus::Error);
    }

    #[test]
    fn resume_replaces_the_transcript_and_invalidates_in_flight_work() {
        let mut session = connected_session();
        let stale = session.begin_send("이전 대화").unwrap();

        session.resume(
            9,
            vec![Message::user("예전 질문"), Message::assistant("예전 답변")],
        );
        assert_eq!(session.conversation_id, 9);
        assert_eq!(session.messages.len(), 2);

        assert_eq!(
            session.apply_send(&stale, Ok(reply("무시되어야 함"))),
            SendOutcome::Dropped
        );
        assert_eq!(session.messages.len(), 2);
    }
}
