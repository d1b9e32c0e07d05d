//! Terminal UI for HiwarBot

use colored::*;
use crossterm::{
    event::{self, Event, KeyCode},
    terminal::{disable_raw_mode, enable_raw_mode, size},
};
use std::io::{self, IsTerminal, Write};

use hiwar_core::{ChatTurn, Result};

use crate::session::MAX_QUERY_CHARS;

/// Display the startup banner
pub fn display_banner() {
    let terminal_width = size().map(|(w, _)| w as usize).unwrap_or(80);
    let banner_width = std::cmp::min(64, terminal_width.saturating_sub(4)).max(24);

    let top_border = format!("┌{}┐", "─".repeat(banner_width - 2));
    let bottom_border = format!("└{}┘", "─".repeat(banner_width - 2));
    let empty_line = format!("│{}│", " ".repeat(banner_width - 2));

    println!();
    println!("{}", top_border.green());
    println!("{}", empty_line.green());

    let title = "HiwarBot";
    let title_line = format!(
        "│  {}{}│",
        title.green().bold(),
        " ".repeat(banner_width.saturating_sub(title.len() + 4))
    );
    println!("{}", title_line);

    println!("{}", empty_line.green());

    let feature_lines = vec![
        "🕌 Ask questions about Islam, in English",
        "",
        "• Answers are grounded in indexed dialogue passages",
        "• Questions are capped at 300 characters",
        "• ⬆️/⬇️ navigate your question history",
        "",
        "v0.1.0",
    ];

    for line in feature_lines {
        if line.is_empty() {
            println!("{}", empty_line.green());
        } else {
            let padding = " ".repeat(banner_width.saturating_sub(line.len() + 4));
            let content = if line.starts_with("v0.1.0") {
                format!("│  {}{}│", line.dimmed(), padding)
            } else {
                format!("│  {}{}│", line, padding)
            };
            println!("{}", content.green());
        }
    }

    println!("{}", empty_line.green());
    println!("{}", bottom_border.green());
    println!();
    println!("{}", "Welcome to HiwarBot!".bold());
    println!(
        "{}",
        "💡 Tip: type your question, or 'help' for commands".dimmed()
    );
    println!();
}

/// Read one question, with history navigation and the input-length cap.
/// Characters past the cap are ignored at capture time, so an over-length
/// question never reaches the session.
pub async fn read_question(history: &mut Vec<String>) -> Result<String> {
    // Piped input: read a line straight from stdin
    if !io::stdin().is_terminal() {
        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        let input = input.trim().to_string();
        if !input.is_empty() {
            history.push(input.clone());
        }
        return Ok(input);
    }

    enable_raw_mode()?;
    let mut input = String::new();
    let mut history_index: Option<usize> = None;

    print!("{} ", "you>".cyan().bold());
    io::stdout().flush()?;

    loop {
        if let Event::Key(key_event) = event::read()? {
            match key_event.code {
                KeyCode::Enter => {
                    disable_raw_mode()?;
                    println!();
                    if !input.is_empty() {
                        history.push(input.clone());
                    }
                    return Ok(input);
                }
                KeyCode::Char(c) => {
                    if input.chars().count() < MAX_QUERY_CHARS {
                        input.push(c);
                        print!("\r{} {}", "you>".cyan().bold(), input);
                        io::stdout().flush()?;
                    }
                }
                KeyCode::Backspace => {
                    if input.pop().is_some() {
                        print!(
                            "\r{} {}  \r{} {}",
                            "you>".cyan().bold(),
                            input,
                            "you>".cyan().bold(),
                            input
                        );
                        io::stdout().flush()?;
                    }
                }
                KeyCode::Up => {
                    if !history.is_empty() {
                        let new_index = match history_index {
                            None => history.len() - 1,
                            Some(idx) if idx > 0 => idx - 1,
                            Some(idx) => idx,
                        };
                        history_index = Some(new_index);
                        input = history[new_index].clone();
                        redraw_line(&input)?;
                    }
                }
                KeyCode::Down => {
                    if let Some(idx) = history_index {
                        if idx < history.len() - 1 {
                            history_index = Some(idx + 1);
                            input = history[idx + 1].clone();
                        } else {
                            history_index = None;
                            input.clear();
                        }
                        redraw_line(&input)?;
                    }
                }
                KeyCode::Esc => {
                    disable_raw_mode()?;
                    println!();
                    return Ok(String::new());
                }
                _ => {}
            }
        }
    }
}

fn redraw_line(input: &str) -> Result<()> {
    print!(
        "\r{} {}  \r{} {}",
        "you>".cyan().bold(),
        " ".repeat(60),
        "you>".cyan().bold(),
        input
    );
    io::stdout().flush()?;
    Ok(())
}

/// Render one exchanged turn as a styled block
pub fn render_turn(turn: &ChatTurn) {
    let stamp = turn.timestamp.format("%H:%M").to_string();
    match turn.role {
        hiwar_core::ChatRole::User => {
            println!("{} {}", format!("You [{}]", stamp).cyan().bold(), turn.content);
        }
        hiwar_core::ChatRole::Assistant => {
            println!(
                "{} {}",
                format!("HiwarBot [{}]", stamp).green().bold(),
                turn.content
            );
        }
    }
    println!();
}

/// Render a failure as a status line; the session keeps running
pub fn render_error(error: &hiwar_core::Error) {
    println!("{} {}", "❌".red(), error.to_string().red());
    println!();
}

/// Display help message
pub fn print_help() {
    println!("{}", "Available commands:".bold());
    println!(
        "  {} - Ask a question about Islam (max 300 characters)",
        "question".green()
    );
    println!("  {} - Show this help message", "help".green());
    println!("  {} - Exit the application", "exit/quit".green());
    println!();
    println!("{}", "Examples:".bold());
    println!("  What is Zakat?");
    println!("  What are the five pillars of Islam?");
}
