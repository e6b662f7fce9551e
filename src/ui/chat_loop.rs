//! Full-screen interactive chat session.
//!
//! Single-threaded event loop over a 50 ms poll: draw, handle one terminal
//! event, then drain completed network calls from the channel. Network work
//! runs in spawned tasks that send `(ticket, result)` pairs back; the
//! session state machine decides what each completion means, including
//! dropping completions from conversations that were already abandoned.

use std::error::Error;
use std::io;
use std::time::Duration;

use ratatui::{
    backend::CrosstermBackend,
    crossterm::{
        event::{self, Event, KeyCode, KeyEventKind, KeyModifiers, MouseEventKind},
        execute,
        terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    },
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame, Terminal,
};
use tokio::sync::mpsc;
use unicode_width::UnicodeWidthStr;

use crate::api::{retry::with_default_retry, ApiClient, ApiError, ChatReply};
use crate::commands::{process_input, CommandResult};
use crate::core::chat::{
    ChatSession, ConnectionStatus, ProbeReason, ProbeTicket, SendOutcome, SendTicket,
};
use crate::core::fallback::style_greeting;
use crate::core::message::{ConversationStyle, Message, Role, UsageStatus, User};
use crate::utils::logging::LoggingState;

const POLL_INTERVAL: Duration = Duration::from_millis(50);
const CRISIS_BANNER: &str =
    "힘든 시간을 보내고 계시는군요. 자살예방상담전화 1393, 청소년전화 1388에서 24시간 도움을 받을 수 있어요.";
const SESSION_EXPIRED_ADVICE: &str =
    "세션이 만료되었습니다. `maum login`으로 다시 로그인해주세요.";

enum NetEvent {
    Probe(ProbeTicket, Result<UsageStatus, ApiError>),
    Reply(SendTicket, Result<ChatReply, ApiError>),
}

struct App {
    chat: ChatSession,
    logging: LoggingState,
    input: String,
    status: Option<String>,
    user_label: String,
    scroll_offset: u16,
    auto_scroll: bool,
}

impl App {
    fn greet(&mut self) {
        self.chat
            .messages
            .push(Message::assistant(style_greeting(self.chat.style)));
    }

    fn build_display_lines(&self) -> Vec<Line<'_>> {
        let mut lines = Vec::new();
        for msg in &self.chat.messages {
            match msg.role {
                Role::User => {
                    lines.push(Line::from(vec![
                        Span::styled(
                            format!("{}: ", self.user_label),
                            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                        ),
                        Span::styled(msg.content.clone(), Style::default().fg(Color::Cyan)),
                    ]));
                    lines.push(Line::from(""));
                }
                Role::System => {
                    for content_line in msg.content.lines() {
                        lines.push(Line::from(Span::styled(
                            content_line.to_string(),
                            Style::default().fg(Color::DarkGray),
                        )));
                    }
                    lines.push(Line::from(""));
                }
                Role::Assistant => {
                    for content_line in msg.content.lines() {
                        lines.push(Line::from(Span::styled(
                            content_line.to_string(),
                            Style::default().fg(Color::White),
                        )));
                    }
                    lines.push(Line::from(""));
                }
            }
        }
        if self.chat.is_loading {
            lines.push(Line::from(Span::styled(
                "…",
                Style::default().fg(Color::DarkGray),
            )));
        }
        lines
    }

    fn max_scroll_offset(&self, available_height: u16) -> u16 {
        (self.build_display_lines().len() as u16).saturating_sub(available_height)
    }

    /// Transcript rows for a given terminal height, mirroring the layout in
    /// `draw`: crisis banner (when latched), the transcript title line, the
    /// status line, and the 3-row input box.
    fn transcript_height(&self, terminal_height: u16) -> u16 {
        let banner = if self.chat.crisis_alert { 2 } else { 0 };
        terminal_height.saturating_sub(5 + banner)
    }

    fn scroll_to_bottom(&mut self, available_height: u16) {
        if self.auto_scroll {
            self.scroll_offset = self.max_scroll_offset(available_height);
        }
    }

    fn status_line(&self) -> Line<'_> {
        if let Some(error) = &self.chat.error {
            return Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            ));
        }
        if let Some(status) = &self.status {
            return Line::from(Span::styled(
                status.clone(),
                Style::default().fg(Color::Yellow),
            ));
        }
        let mut parts = vec![match self.chat.status {
            ConnectionStatus::Connecting => "연결 중...".to_string(),
            ConnectionStatus::Connected => "연결됨".to_string(),
            ConnectionStatus::Error => "연결 실패 (Ctrl+R 재시도)".to_string(),
        }];
        if let Some(usage) = &self.chat.usage {
            parts.push(format!("남은 대화 {}회", usage.remaining_count));
        }
        parts.push(format!("스타일 {}", self.chat.style.as_str()));
        Line::from(Span::styled(
            parts.join(" · "),
            Style::default().fg(Color::DarkGray),
        ))
    }
}

fn draw(f: &mut Frame, app: &App) {
    let crisis_height = if app.chat.crisis_alert { 2 } else { 0 };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(crisis_height),
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Length(3),
        ])
        .split(f.area());

    if app.chat.crisis_alert {
        let banner = Paragraph::new(CRISIS_BANNER)
            .style(
                Style::default()
                    .fg(Color::White)
                    .bg(Color::Red)
                    .add_modifier(Modifier::BOLD),
            )
            .wrap(Wrap { trim: true });
        f.render_widget(banner, chunks[0]);
    }

    let lines = app.build_display_lines();
    let available_height = chunks[1].height.saturating_sub(1);
    let max_offset = (lines.len() as u16).saturating_sub(available_height);
    let transcript = Paragraph::new(lines)
        .block(Block::default().title("마음돌봄이"))
        .wrap(Wrap { trim: true })
        .scroll((app.scroll_offset.min(max_offset), 0));
    f.render_widget(transcript, chunks[1]);

    f.render_widget(Paragraph::new(app.status_line()), chunks[2]);

    let input = Paragraph::new(app.input.as_str())
        .style(Style::default().fg(Color::Yellow))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("메시지를 입력하세요 (Enter 전송, /help 도움말)"),
        );
    f.render_widget(input, chunks[3]);

    // Hangul occupies two cells; place the cursor by display width, not by
    // char count.
    f.set_cursor_position((
        chunks[3].x + app.input.width() as u16 + 1,
        chunks[3].y + 1,
    ));
}

fn spawn_probe(client: &ApiClient, ticket: ProbeTicket, tx: mpsc::UnboundedSender<NetEvent>) {
    let client = client.clone();
    tokio::spawn(async move {
        let result = with_default_retry(|| {
            let client = client.clone();
            async move { client.check_usage().await.map(|response| response.usage) }
        })
        .await;
        let _ = tx.send(NetEvent::Probe(ticket, result));
    });
}

fn spawn_send(client: &ApiClient, ticket: SendTicket, tx: mpsc::UnboundedSender<NetEvent>) {
    let client = client.clone();
    tokio::spawn(async move {
        let result = with_default_retry(|| {
            let client = client.clone();
            let ticket = ticket.clone();
            async move {
                client
                    .send_message(&ticket.text, ticket.conversation_id, ticket.style)
                    .await
            }
        })
        .await;
        let _ = tx.send(NetEvent::Reply(ticket, result));
    });
}

/// Run the interactive chat until the user quits or the session expires.
pub async fn run_chat(
    client: ApiClient,
    user: Option<User>,
    style: ConversationStyle,
    log_file: Option<String>,
    resume: Option<u64>,
) -> Result<(), Box<dyn Error>> {
    let mut app = App {
        chat: ChatSession::new(style),
        logging: LoggingState::new(log_file),
        input: String::new(),
        status: None,
        user_label: user
            .as_ref()
            .map(|u| u.display_name().to_string())
            .unwrap_or_else(|| "나".to_string()),
        scroll_offset: 0,
        auto_scroll: true,
    };

    // Resume before touching the terminal so a failure is a plain error.
    if let Some(id) = resume {
        let messages = client.conversation_messages(id).await?.messages;
        app.chat.resume(id, messages);
    } else {
        app.greet();
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, &mut app, &client).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Ok(true) = &result {
        eprintln!("⚠️  {SESSION_EXPIRED_ADVICE}");
    }
    result.map(|_| ())
}

/// Ok(true) means the loop ended because the session expired.
async fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    client: &ApiClient,
) -> Result<bool, Box<dyn Error>> {
    let (tx, mut rx) = mpsc::unbounded_channel::<NetEvent>();

    let probe = app.chat.begin_probe(ProbeReason::Connect);
    spawn_probe(client, probe, tx.clone());

    loop {
        terminal.draw(|f| draw(f, app))?;
        let term_height = terminal.size().map(|size| size.height).unwrap_or_default();
        let available_height = app.transcript_height(term_height);

        if event::poll(POLL_INTERVAL)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                    KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                        return Ok(false);
                    }
                    KeyCode::Char('r') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                        if app.chat.status == ConnectionStatus::Error {
                            let probe = app.chat.begin_probe(ProbeReason::Connect);
                            spawn_probe(client, probe, tx.clone());
                        }
                    }
                    KeyCode::Enter => {
                        let input = std::mem::take(&mut app.input);
                        if input.trim().is_empty() {
                            continue;
                        }
                        app.status = None;
                        match process_input(&mut app.chat, &mut app.logging, &input) {
                            CommandResult::Continue => {}
                            CommandResult::Status(status) => app.status = Some(status),
                            CommandResult::NewConversation => {
                                app.chat.new_conversation();
                                app.greet();
                                app.scroll_offset = 0;
                                app.auto_scroll = true;
                            }
                            CommandResult::ProcessAsMessage(text) => {
                                if let Some(ticket) = app.chat.begin_send(&text) {
                                    let _ = app
                                        .logging
                                        .log_message(&format!("{}: {}", app.user_label, text));
                                    spawn_send(client, ticket, tx.clone());
                                    app.scroll_to_bottom(available_height);
                                } else {
                                    // Refused send is a no-op: keep what
                                    // they typed.
                                    if app.chat.status != ConnectionStatus::Connected {
                                        app.status =
                                            Some("아직 연결되지 않았습니다.".to_string());
                                    } else if app.chat.is_loading {
                                        app.status =
                                            Some("답변을 기다리는 중입니다.".to_string());
                                    }
                                    app.input = text;
                                }
                            }
                        }
                    }
                    KeyCode::Char(c) => app.input.push(c),
                    KeyCode::Backspace => {
                        app.input.pop();
                    }
                    KeyCode::Up => {
                        app.auto_scroll = false;
                        app.scroll_offset = app.scroll_offset.saturating_sub(1);
                    }
                    KeyCode::Down => {
                        let max = app.max_scroll_offset(available_height);
                        app.scroll_offset = app.scroll_offset.saturating_add(1).min(max);
                        if app.scroll_offset >= max {
                            app.auto_scroll = true;
                        }
                    }
                    _ => {}
                },
                Event::Mouse(mouse) => match mouse.kind {
                    MouseEventKind::ScrollUp => {
                        app.auto_scroll = false;
                        app.scroll_offset = app.scroll_offset.saturating_sub(3);
                    }
                    MouseEventKind::ScrollDown => {
                        let max = app.max_scroll_offset(available_height);
                        app.scroll_offset = app.scroll_offset.saturating_add(3).min(max);
                        if app.scroll_offset >= max {
                            app.auto_scroll = true;
                        }
                    }
                    _ => {}
                },
                _ => {}
            }
        }

        while let Ok(event) = rx.try_recv() {
            match event {
                NetEvent::Probe(ticket, result) => {
                    app.chat.apply_probe(&ticket, result);
                }
                NetEvent::Reply(ticket, result) => {
                    match app.chat.apply_send(&ticket, result) {
                        SendOutcome::Applied | SendOutcome::NewConversation(_) => {
                            if let Some(reply) = app.chat.messages.last() {
                                if reply.role.is_assistant() {
                                    let _ = app
                                        .logging
                                        .log_message(&format!("마음돌봄이: {}", reply.content));
                                }
                            }
                        }
                        SendOutcome::RecheckUsage => {
                            let probe = app.chat.begin_probe(ProbeReason::UsageRecheck);
                            spawn_probe(client, probe, tx.clone());
                        }
                        SendOutcome::SessionExpired => return Ok(true),
                        SendOutcome::Dropped => {}
                    }
                    // The reply may have just latched the crisis banner, so
                    // the transcript height is recomputed.
                    app.scroll_to_bottom(app.transcript_height(term_height));
                }
            }
        }
    }
}
