//! Full-screen mood chart.
//!
//! Plots emotion scores over time as a line chart and waits for any key.

use std::error::Error;
use std::io;
use std::time::Duration;

use ratatui::{
    backend::CrosstermBackend,
    crossterm::{
        event::{self, Event, KeyEventKind},
        execute,
        terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    },
    style::{Color, Modifier, Style},
    symbols,
    text::Span,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};

use crate::api::ApiClient;
use crate::core::message::{sort_records_by_date, EmotionRecord};

/// Fetch all emotion records and display them as a chart. Returns without
/// touching the terminal when there is nothing to plot.
pub async fn show_chart(client: &ApiClient) -> Result<(), Box<dyn Error>> {
    let mut records = client.emotion_records(None, None).await?.records;
    if records.is_empty() {
        eprintln!("⚠️  아직 감정 기록이 없습니다. `maum mood record`로 시작해보세요.");
        return Ok(());
    }
    sort_records_by_date(&mut records);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let result = (|| -> Result<(), Box<dyn Error>> {
        loop {
            terminal.draw(|f| draw(f, &records))?;
            if event::poll(Duration::from_millis(250))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        return Ok(());
                    }
                }
            }
        }
    })();

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    result
}

fn draw(f: &mut Frame, records: &[EmotionRecord]) {
    let points: Vec<(f64, f64)> = records
        .iter()
        .enumerate()
        .map(|(i, record)| (i as f64, record.score as f64))
        .collect();

    let first = records.first().map(|r| r.date.to_string()).unwrap_or_default();
    let last = records.last().map(|r| r.date.to_string()).unwrap_or_default();
    let x_max = (records.len().saturating_sub(1)).max(1) as f64;

    let dataset = Dataset::default()
        .name("감정 점수")
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Cyan))
        .data(&points);

    let chart = Chart::new(vec![dataset])
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("감정 변화 (아무 키나 누르면 닫힙니다)"),
        )
        .x_axis(
            Axis::default()
                .title("날짜")
                .style(Style::default().fg(Color::DarkGray))
                .bounds([0.0, x_max])
                .labels(vec![Span::raw(first), Span::raw(last)]),
        )
        .y_axis(
            Axis::default()
                .title("점수")
                .style(Style::default().fg(Color::DarkGray))
                .bounds([0.0, 10.0])
                .labels(
                    ["0", "5", "10"]
                        .iter()
                        .map(|label| {
                            Span::styled(*label, Style::default().add_modifier(Modifier::DIM))
                        })
                        .collect::<Vec<_>>(),
                ),
        );
    f.render_widget(chart, f.area());
}
