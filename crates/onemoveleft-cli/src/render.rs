use crossterm::queue;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use onemoveleft_core::{
    Direction, GameEvent, Grid, Hint, Position, Session, SolveStats, Status, COLORS, SYMBOLS,
};
use std::io::{self, Write};

/// Terminal colour per tile colour
const PALETTE: [Color; COLORS] = [
    Color::Cyan,
    Color::Magenta,
    Color::Green,
    Color::Yellow,
    Color::Red,
];

pub fn render_board<W: Write>(out: &mut W, grid: &Grid, eol: &str) -> io::Result<()> {
    for row in 0..grid.size() {
        queue!(out, Print("  "))?;
        for col in 0..grid.size() {
            match grid.get(Position::new(row, col)) {
                Some(c) => queue!(
                    out,
                    SetForegroundColor(PALETTE[c as usize]),
                    Print(format!(" {}", SYMBOLS[c as usize]))
                )?,
                None => queue!(out, SetForegroundColor(Color::DarkGrey), Print(" ·"))?,
            }
        }
        queue!(out, ResetColor, Print(eol))?;
    }
    Ok(())
}

pub fn render_status<W: Write>(out: &mut W, session: &Session, eol: &str) -> io::Result<()> {
    queue!(
        out,
        SetForegroundColor(Color::White),
        Print(format!(
            "Level {}   Score {}   Best {}",
            session.level(),
            session.score(),
            session.best()
        )),
        Print(eol),
        SetForegroundColor(Color::Cyan),
        Print(format!("Goal: {}", session.goal_text())),
        Print(eol),
        SetForegroundColor(Color::Grey),
        Print(format!(
            "Remaining: {}   Moves left: {}",
            session.remaining_text(),
            session.moves_left()
        )),
        Print(eol)
    )?;

    let (color, text) = match session.status() {
        Status::Playing => (Color::DarkGrey, "Playing"),
        Status::Won => (Color::Green, "Level complete"),
        Status::Lost => (Color::Red, "Out of moves"),
    };
    queue!(out, SetForegroundColor(color), Print(text), ResetColor, Print(eol))
}

/// Board plus status, as printed by the one-shot commands
pub fn render_session<W: Write>(out: &mut W, session: &Session, eol: &str) -> io::Result<()> {
    render_status(out, session, eol)?;
    queue!(out, Print(eol))?;
    render_board(out, session.grid(), eol)?;
    out.flush()
}

/// One line for the player, or `None` for events hosts only track
pub fn describe_event(event: &GameEvent) -> Option<String> {
    let line = match event {
        GameEvent::LevelGenerated {
            level,
            size,
            moves,
            goal,
            fallback,
        } => {
            let mut line = format!("Level {level} ({size}×{size}): {goal} in {moves} moves");
            if *fallback {
                line.push_str(" (unverified)");
            }
            line
        }
        GameEvent::SessionRestored { level } => {
            format!("Restored your last session (level {level})")
        }
        GameEvent::SnapshotDiscarded { reason } => format!("Saved game ignored: {reason}"),
        GameEvent::ChainResolved {
            steps,
            popped,
            score,
        } => {
            if *steps > 1 {
                format!("Chain ×{steps}! Popped {popped} tiles (+{score})")
            } else {
                format!("Popped {popped} tiles (+{score})")
            }
        }
        GameEvent::LevelWon { level, .. } => format!("Level {level} complete!"),
        GameEvent::LevelLost {
            goal, remaining, ..
        } => format!("Out of moves. Goal: {goal}, remaining {remaining}"),
        GameEvent::LevelRetried { level } => format!("Retrying level {level}"),
        GameEvent::HintRequested { .. } => return None,
    };
    Some(line)
}

pub fn format_moves(moves: &[Direction]) -> String {
    if moves.is_empty() {
        return "no moves needed".to_string();
    }
    moves
        .iter()
        .map(|d| d.as_str())
        .collect::<Vec<_>>()
        .join(" → ")
}

pub fn hint_text(hint: &Hint) -> String {
    let line = match &hint.solution {
        Some(moves) => format!("from the start: {}", format_moves(moves)),
        None => "no winning line found".to_string(),
    };
    format!(
        "Hint: {} (remaining {}, {} moves left), {}",
        hint.goal_text, hint.remaining_text, hint.moves_left, line
    )
}

pub fn stats_text(stats: &SolveStats) -> String {
    let mut text = format!(
        "{} nodes, {} memo hits, {} pruned",
        stats.nodes, stats.memo_hits, stats.pruned
    );
    if stats.exhausted {
        text.push_str(", node limit reached");
    }
    text
}
