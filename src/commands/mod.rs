//! Slash commands for the interactive chat.
//!
//! Anything that does not start with `/` (or names no known command) is
//! passed through as a chat message.

use crate::core::chat::ChatSession;
use crate::core::message::{ConversationStyle, Message};
use crate::utils::logging::LoggingState;

pub enum CommandResult {
    Continue,
    /// Show this in the status line.
    Status(String),
    ProcessAsMessage(String),
    /// Reset to a fresh conversation.
    NewConversation,
}

pub fn process_input(
    chat: &mut ChatSession,
    logging: &mut LoggingState,
    input: &str,
) -> CommandResult {
    let trimmed = input.trim();

    if !trimmed.starts_with('/') {
        return CommandResult::ProcessAsMessage(input.to_string());
    }

    let mut parts = trimmed[1..].splitn(2, ' ');
    let command_name = match parts.next() {
        Some(name) if !name.is_empty() => name,
        _ => return CommandResult::ProcessAsMessage(input.to_string()),
    };
    let args = parts.next().unwrap_or("").trim();

    match command_name {
        "new" => CommandResult::NewConversation,
        "style" => handle_style(chat, args),
        "log" => handle_log(logging, args),
        "help" => handle_help(chat),
        _ => CommandResult::ProcessAsMessage(input.to_string()),
    }
}

fn handle_style(chat: &mut ChatSession, args: &str) -> CommandResult {
    if args.is_empty() {
        let names: Vec<&str> = ConversationStyle::ALL
            .iter()
            .map(|style| style.as_str())
            .collect();
        return CommandResult::Status(format!(
            "현재 스타일: {} (사용 가능: {})",
            chat.style.as_str(),
            names.join(", ")
        ));
    }
    let style = ConversationStyle::parse(args);
    chat.set_style(style);
    CommandResult::Status(format!("대화 스타일을 '{}'(으)로 바꿨습니다.", style.as_str()))
}

fn handle_log(logging: &mut LoggingState, args: &str) -> CommandResult {
    let result = if args.is_empty() {
        logging.toggle_logging()
    } else {
        logging.set_log_file(args.to_string())
    };
    match result {
        Ok(message) => CommandResult::Status(message),
        Err(err) => CommandResult::Status(format!("Log error: {}", err)),
    }
}

fn handle_help(chat: &mut ChatSession) -> CommandResult {
    let help = "\
사용할 수 있는 명령어:
  /new           새 대화를 시작합니다
  /style [이름]   대화 스타일을 바꿉니다 (default, cheerful, calm, wise)
  /log [파일]     대화 기록 저장을 켜거나 끕니다
  /help          이 도움말을 표시합니다

Ctrl+C 종료, Ctrl+R 재연결, ↑/↓ 스크롤";
    chat.messages.push(Message::system(help));
    CommandResult::Continue
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixtures() -> (ChatSession, LoggingState) {
        (
            ChatSession::new(ConversationStyle::Default),
            LoggingState::new(None),
        )
    }

    #[test]
    fn plain_text_passes_through_as_a_message() {
        let (mut chat, mut logging) = fixtures();
        match process_input(&mut chat, &mut logging, "안녕하세요") {
            CommandResult::ProcessAsMessage(text) => assert_eq!(text, "안녕하세요"),
            _ => panic!("expected pass-through"),
        }
    }

    #[test]
    fn unknown_commands_also_pass_through() {
        let (mut chat, mut logging) = fixtures();
        match process_input(&mut chat, &mut logging, "/frobnicate") {
            CommandResult::ProcessAsMessage(text) => assert_eq!(text, "/frobnicate"),
            _ => panic!("expected pass-through"),
        }
    }

    #[test]
    fn new_requests_a_conversation_reset() {
        let (mut chat, mut logging) = fixtures();
        assert!(matches!(
            process_input(&mut chat, &mut logging, "/new"),
            CommandResult::NewConversation
        ));
    }

    #[test]
    fn style_with_an_argument_switches_the_style() {
        let (mut chat, mut logging) = fixtures();
        let result = process_input(&mut chat, &mut logging, "/style calm");
        assert!(matches!(result, CommandResult::Status(_)));
        assert_eq!(chat.style, ConversationStyle::Calm);
    }

    #[test]
    fn style_without_an_argument_reports_the_current_style() {
        let (mut chat, mut logging) = fixtures();
        chat.set_style(ConversationStyle::Wise);
        match process_input(&mut chat, &mut logging, "/style") {
            CommandResult::Status(status) => assert!(status.contains("wise")),
            _ => panic!("expected a status line"),
        }
        assert_eq!(chat.style, ConversationStyle::Wise);
    }

    #[test]
    fn log_toggles_logging_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chat.log");
        let (mut chat, mut logging) = fixtures();

        let result = process_input(
            &mut chat,
            &mut logging,
            &format!("/log {}", path.display()),
        );
        assert!(matches!(result, CommandResult::Status(_)));
        assert!(logging.is_active());

        process_input(&mut chat, &mut logging, "/log");
        assert!(!logging.is_active());
    }

    #[test]
    fn help_appends_a_system_message() {
        let (mut chat, mut logging) = fixtures();
        process_input(&mut chat, &mut logging, "/help");
        assert_eq!(chat.messages.len(), 1);
        assert!(chat.messages[0].content.contains("/new"));
    }
}
