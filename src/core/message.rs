//! Domain types shared between the API layer and the UI: transcript
//! messages, conversations, usage snapshots, users, and mood records.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
        }
    }

    pub fn is_user(self) -> bool {
        self == Role::User
    }

    pub fn is_assistant(self) -> bool {
        self == Role::Assistant
    }
}

/// One transcript entry. Message lists are append-only: within a rendered
/// session entries are never edited in place, only pushed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub role: Role,
    pub content: String,
    #[serde(
        default,
        rename = "createdAt",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<String>,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Message {
            id: None,
            role: Role::User,
            content: content.into(),
            created_at: None,
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Message {
            id: None,
            role: Role::Assistant,
            content: content.into(),
            created_at: None,
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Message {
            id: None,
            role: Role::System,
            content: content.into(),
            created_at: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub id: u64,
    pub title: String,
    pub created_at: String,
    pub updated_at: String,
    #[serde(default)]
    pub last_message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LimitType {
    Anonymous,
    Authenticated,
}

/// Server-reported usage snapshot. Never locally authoritative: the client
/// only updates it from responses and never restores the remaining count on
/// its own.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageStatus {
    pub remaining_count: u32,
    pub limit_type: LimitType,
    #[serde(default = "default_allowed")]
    pub allowed: bool,
    #[serde(default)]
    pub limit_message: Option<String>,
}

fn default_allowed() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
}

impl User {
    /// Name to greet the user with; falls back to the email's local part.
    pub fn display_name(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => self.email.split('@').next().unwrap_or(&self.email),
        }
    }
}

/// One mood dashboard entry. The server allows several entries on the same
/// day; the client re-sorts by date for display and otherwise treats the
/// list as append-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmotionRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub date: NaiveDate,
    pub score: u8,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmotionSummary {
    pub average_score: f64,
    pub record_count: u32,
    #[serde(default)]
    pub top_keywords: Vec<String>,
}

/// Stable sort by date, so same-day entries keep their server order.
pub fn sort_records_by_date(records: &mut [EmotionRecord]) {
    records.sort_by_key(|record| record.date);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConversationStyle {
    #[default]
    Default,
    Cheerful,
    Calm,
    Wise,
}

impl ConversationStyle {
    pub const ALL: [ConversationStyle; 4] = [
        ConversationStyle::Default,
        ConversationStyle::Cheerful,
        ConversationStyle::Calm,
        ConversationStyle::Wise,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ConversationStyle::Default => "default",
            ConversationStyle::Cheerful => "cheerful",
            ConversationStyle::Calm => "calm",
            ConversationStyle::Wise => "wise",
        }
    }

    /// Total: unrecognized names fall through to the default style.
    pub fn parse(name: &str) -> ConversationStyle {
        match name.trim().to_lowercase().as_str() {
            "cheerful" => ConversationStyle::Cheerful,
            "calm" => ConversationStyle::Calm,
            "wise" => ConversationStyle::Wise,
            _ => ConversationStyle::Default,
        }
    }
}
