//! Interactive full-screen mode.

use crate::{render, store};
use anyhow::Result;
use crossterm::{
    cursor::{Hide, MoveTo, Show},
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{disable_raw_mode, enable_raw_mode, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};
use onemoveleft_core::{Direction, GenerationProgress, Generator, Session, Status};
use std::io::{self, Write};
use std::path::Path;

const EOL: &str = "\r\n";

enum Action {
    Move(Direction),
    Retry,
    Next,
    Hint,
    Quit,
}

fn action_for(key: KeyEvent) -> Option<Action> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(Action::Quit);
    }
    let action = match key.code {
        KeyCode::Up | KeyCode::Char('w') => Action::Move(Direction::Up),
        KeyCode::Down | KeyCode::Char('s') => Action::Move(Direction::Down),
        KeyCode::Left | KeyCode::Char('a') => Action::Move(Direction::Left),
        KeyCode::Right | KeyCode::Char('d') => Action::Move(Direction::Right),
        KeyCode::Char('r') => Action::Retry,
        KeyCode::Char('n') | KeyCode::Enter => Action::Next,
        KeyCode::Char('h') | KeyCode::Char('?') => Action::Hint,
        KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
        _ => return None,
    };
    Some(action)
}

pub fn run(save_path: &Path, generator: &mut Generator, verbose: bool) -> Result<()> {
    let json = store::load(save_path)?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, Hide)?;

    let mut session = Session::restore_or_start_with_progress(json.as_deref(), generator, |p| {
        draw_notice(&mut stdout, &progress_line(&p)).ok();
    });
    let result = event_loop(&mut stdout, &mut session, generator, save_path, verbose);

    disable_raw_mode()?;
    execute!(stdout, Show, LeaveAlternateScreen)?;
    result
}

fn event_loop(
    stdout: &mut io::Stdout,
    session: &mut Session,
    generator: &mut Generator,
    save_path: &Path,
    verbose: bool,
) -> Result<()> {
    let (first, mut raw) = take_lines(session, verbose);
    let mut message = first.unwrap_or_default();
    store::save(save_path, session)?;

    loop {
        draw(stdout, session, &message, raw.as_deref())?;

        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        let Some(action) = action_for(key) else {
            continue;
        };

        message = match action {
            Action::Move(direction) => match session.apply_move(direction) {
                Ok(_) => String::new(),
                Err(e) => capitalize(&e.to_string()),
            },
            Action::Retry => {
                session.retry();
                String::new()
            }
            Action::Next => {
                if session.status() == Status::Won {
                    draw_notice(stdout, &format!("Generating level {}", session.level() + 1))?;
                }
                let advanced = session.advance_with_progress(generator, |p| {
                    draw_notice(stdout, &progress_line(&p)).ok();
                });
                if advanced {
                    String::new()
                } else {
                    "Finish the level first".to_string()
                }
            }
            Action::Hint => render::hint_text(&session.hint()),
            Action::Quit => break,
        };
        let (line, json) = take_lines(session, verbose);
        if let Some(line) = line {
            message = line;
        }
        if json.is_some() {
            raw = json;
        }
        store::save(save_path, session)?;
    }
    Ok(())
}

/// Drain queued events: the last player-facing line and, when verbose, the
/// last event as raw JSON
fn take_lines(session: &mut Session, verbose: bool) -> (Option<String>, Option<String>) {
    let events = session.drain_events();
    let line = events.iter().filter_map(render::describe_event).last();
    let raw = if verbose {
        events.last().and_then(|e| serde_json::to_string(e).ok())
    } else {
        None
    };
    (line, raw)
}

fn progress_line(progress: &GenerationProgress) -> String {
    format!(
        "Generating level {}: {}/{} boards tried",
        progress.level, progress.attempt, progress.max_attempts
    )
}

/// Replace the screen with a single status line while a level is built
fn draw_notice(stdout: &mut io::Stdout, text: &str) -> io::Result<()> {
    queue!(
        stdout,
        Clear(ClearType::All),
        MoveTo(0, 0),
        SetForegroundColor(Color::DarkGrey),
        Print(text),
        ResetColor
    )?;
    stdout.flush()
}

fn draw(stdout: &mut io::Stdout, session: &Session, message: &str, raw: Option<&str>) -> io::Result<()> {
    queue!(stdout, Clear(ClearType::All), MoveTo(0, 0))?;
    render::render_status(stdout, session, EOL)?;
    queue!(stdout, Print(EOL))?;
    render::render_board(stdout, session.grid(), EOL)?;
    queue!(
        stdout,
        Print(EOL),
        SetForegroundColor(Color::Yellow),
        Print(message),
        Print(EOL),
        SetForegroundColor(Color::DarkGrey),
        Print(raw.unwrap_or_default()),
        Print(EOL),
        Print("arrows/wasd move   r retry   n next   h hint   q quit"),
        ResetColor
    )?;
    stdout.flush()
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
