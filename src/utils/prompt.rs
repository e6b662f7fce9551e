//! Small stdin prompts for the non-interactive commands (login, register,
//! password change, account deletion).

use std::io::{self, Write};

use ratatui::crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use ratatui::crossterm::terminal::{disable_raw_mode, enable_raw_mode};

/// Read one visible line after printing `label`.
pub fn prompt_line(label: &str) -> io::Result<String> {
    print!("{label}");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// Read a line with the input masked as `*`. Ctrl+C cancels and returns an
/// empty string so callers treat it like a blank submission.
pub fn prompt_password(label: &str) -> io::Result<String> {
    print!("{label}");
    io::stdout().flush()?;

    enable_raw_mode()?;
    let result = read_masked_line();
    disable_raw_mode()?;
    println!();
    result
}

fn read_masked_line() -> io::Result<String> {
    let mut value = String::new();
    loop {
        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match key.code {
                KeyCode::Enter => break,
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    value.clear();
                    break;
                }
                KeyCode::Char(c) => {
                    value.push(c);
                    print!("*");
                    io::stdout().flush()?;
                }
                KeyCode::Backspace => {
                    if value.pop().is_some() {
                        print!("\u{8} \u{8}");
                        io::stdout().flush()?;
                    }
                }
                _ => {}
            }
        }
    }
    Ok(value)
}

/// Ask a yes/no question; anything other than `y`/`yes` counts as no.
pub fn confirm(label: &str) -> io::Result<bool> {
    let answer = prompt_line(&format!("{label} [y/N]: "))?;
    Ok(matches!(answer.to_lowercase().as_str(), "y" | "yes"))
}
