//! onemoveleft: play the One Move Left puzzle in the terminal.

mod play;
mod render;
mod store;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use onemoveleft_core::{Direction, GameEvent, GenerationProgress, Generator, Session};
use std::io;
use std::path::PathBuf;

/// Slide coloured tiles, pop groups of three, meet the goal within the move budget.
#[derive(Debug, Parser)]
#[command(name = "onemoveleft", version)]
struct Args {
    /// Saved game file (defaults to the local data directory)
    #[arg(long, value_name = "FILE", global = true)]
    save: Option<PathBuf>,

    /// Seed level generation for reproducible boards
    #[arg(long, value_name = "N", global = true)]
    seed: Option<u64>,

    /// Print generation progress, solver statistics and raw events (play mode shows them on screen)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Full-screen interactive game (default)
    Play,
    /// Start a new game; the best score is kept
    New {
        #[arg(long, default_value = "1", value_name = "N")]
        level: u32,
    },
    /// Print the current board and goal
    Show,
    /// Play one or more moves: up, down, left, right (or u, d, l, r)
    Move {
        #[arg(required = true, value_name = "DIR")]
        directions: Vec<Direction>,
    },
    /// Restart the current level from its first board
    Retry,
    /// Go to the next level after a win
    Next,
    /// Show the goal and a winning line from the level start
    Hint,
    /// Search for a win from the current position
    Solve,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let save_path = args.save.clone().unwrap_or_else(store::default_path);
    let mut generator = match args.seed {
        Some(seed) => Generator::with_seed(seed),
        None => Generator::new(),
    };
    let verbose = args.verbose;

    let command = args.command.unwrap_or(Command::Play);
    if let Command::Play = command {
        return play::run(&save_path, &mut generator, verbose);
    }

    let mut session = match command {
        Command::New { level } => Session::start_with_progress(
            &mut generator,
            level,
            store::saved_best(&save_path),
            progress_reporter(verbose),
        ),
        _ => {
            let json = store::load(&save_path)?;
            Session::restore_or_start_with_progress(
                json.as_deref(),
                &mut generator,
                progress_reporter(verbose),
            )
        }
    };
    report(&mut session, verbose);

    match command {
        Command::Play | Command::New { .. } | Command::Show => {}
        Command::Move { directions } => {
            for direction in directions {
                match session.apply_move(direction) {
                    Ok(outcome) => {
                        report(&mut session, verbose);
                        if outcome.chain.is_empty() {
                            println!("{direction}: nothing popped");
                        }
                    }
                    Err(e) => {
                        eprintln!("{direction}: {e}");
                        break;
                    }
                }
            }
        }
        Command::Retry => session.retry(),
        Command::Next => {
            if !session.advance_with_progress(&mut generator, progress_reporter(verbose)) {
                eprintln!("Finish the level first");
            }
        }
        Command::Hint => println!("{}", render::hint_text(&session.hint())),
        Command::Solve => {
            let (path, stats) = generator.solver().solve_with_stats(
                session.grid(),
                session.goal(),
                session.moves_left(),
            );
            match path {
                Some(moves) => println!("Winning line: {}", render::format_moves(&moves)),
                None => println!("No win within {} moves", session.moves_left()),
            }
            if verbose || stats.exhausted {
                eprintln!("solver: {}", render::stats_text(&stats));
            }
        }
    }
    report(&mut session, verbose);

    render::render_session(&mut io::stdout(), &session, "\n")?;
    store::save(&save_path, &session)
        .with_context(|| format!("could not save game to {}", save_path.display()))
}

fn progress_reporter(verbose: bool) -> impl FnMut(GenerationProgress) {
    move |p| {
        if verbose {
            eprintln!(
                "level {}: no provable goal after {}/{} boards",
                p.level, p.attempt, p.max_attempts
            );
        }
    }
}

/// Print queued events: player lines to stdout, the raw stream to stderr
fn report(session: &mut Session, verbose: bool) {
    for event in session.drain_events() {
        if verbose {
            if let Ok(json) = serde_json::to_string(&event) {
                eprintln!("event: {json}");
            }
        }
        match (&event, render::describe_event(&event)) {
            (GameEvent::SnapshotDiscarded { .. }, Some(line)) => eprintln!("warning: {line}"),
            (_, Some(line)) => println!("{line}"),
            (_, None) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_moves() {
        let args = Args::try_parse_from(["onemoveleft", "move", "up", "L", "right"]).unwrap();
        match args.command {
            Some(Command::Move { directions }) => assert_eq!(
                directions,
                vec![Direction::Up, Direction::Left, Direction::Right]
            ),
            other => panic!("unexpected {other:?}"),
        }
        assert!(Args::try_parse_from(["onemoveleft", "move", "sideways"]).is_err());
        assert!(Args::try_parse_from(["onemoveleft", "move"]).is_err());
    }

    #[test]
    fn test_global_flags() {
        let args =
            Args::try_parse_from(["onemoveleft", "new", "--level", "7", "--seed", "9", "-v"]).unwrap();
        assert!(args.verbose);
        assert_eq!(args.seed, Some(9));
        assert!(matches!(args.command, Some(Command::New { level: 7 })));

        let args = Args::try_parse_from(["onemoveleft"]).unwrap();
        assert!(args.command.is_none());
        assert!(args.save.is_none());
    }
}
