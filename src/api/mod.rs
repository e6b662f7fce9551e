//! Wire payloads and the HTTP client for the Maum REST API.
//!
//! Every endpoint gets an explicit request/response pair instead of probing
//! optional fields on loosely typed JSON. Field names follow the service's
//! JSON, which mixes camelCase (chat, usage) and snake_case (conversation
//! timestamps).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::message::{Conversation, EmotionRecord, EmotionSummary, Message, UsageStatus, User};

pub mod client;
pub mod error;
pub mod retry;

pub use client::ApiClient;
pub use error::ApiError;

#[derive(Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Serialize)]
pub struct SignupRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<&'a str>,
}

#[derive(Deserialize)]
pub struct AuthResponse {
    pub success: bool,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Deserialize)]
pub struct MeResponse {
    pub success: bool,
    #[serde(default)]
    pub authenticated: bool,
    #[serde(default)]
    pub user: Option<User>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest<'a> {
    pub message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<u64>,
    pub conversation_style: &'a str,
}

/// Reply to `POST /chat/send`. `conversation_id` is set when the server
/// minted a new conversation for this message; `has_crisis_signal` marks
/// detected self-harm/distress language.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatReply {
    pub success: bool,
    pub message: String,
    #[serde(default)]
    pub conversation_id: Option<u64>,
    #[serde(default)]
    pub usage: Option<UsageStatus>,
    #[serde(default)]
    pub has_crisis_signal: bool,
}

#[derive(Deserialize)]
pub struct UsageCheckResponse {
    pub success: bool,
    pub usage: UsageStatus,
}

#[derive(Deserialize)]
pub struct ConversationsResponse {
    pub success: bool,
    #[serde(default)]
    pub conversations: Vec<Conversation>,
}

#[derive(Deserialize)]
pub struct MessagesResponse {
    pub success: bool,
    #[serde(default)]
    pub messages: Vec<Message>,
}

#[derive(Serialize)]
pub struct TitleUpdateRequest<'a> {
    pub title: &'a str,
}

#[derive(Serialize)]
pub struct EmotionRecordRequest<'a> {
    pub score: u8,
    pub date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<&'a str>,
    #[serde(skip_serializing_if = "<[_]>::is_empty")]
    pub keywords: &'a [String],
}

#[derive(Deserialize)]
pub struct EmotionRecordsResponse {
    pub success: bool,
    #[serde(default)]
    pub records: Vec<EmotionRecord>,
}

#[derive(Deserialize)]
pub struct EmotionSummaryResponse {
    pub success: bool,
    pub summary: EmotionSummary,
}

#[derive(Deserialize)]
pub struct ProfileResponse {
    pub success: bool,
    pub user: User,
}

#[derive(Serialize)]
pub struct ProfileUpdateRequest<'a> {
    pub name: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordChangeRequest<'a> {
    pub current_password: &'a str,
    pub new_password: &'a str,
}

#[derive(Serialize)]
pub struct AccountDeleteRequest<'a> {
    pub password: &'a str,
}

/// Generic `{success, message?}` acknowledgement body.
#[derive(Deserialize)]
pub struct Acknowledgement {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}
