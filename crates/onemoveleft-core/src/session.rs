//! Live play state for one player.
//!
//! A `Session` owns the board, goal, budget and score of the level being
//! played, plus the immutable [`LevelAttempt`] it started from. Hosts feed it
//! directions and read back state and events.

use crate::{
    resolve_chain, shift, ChainOutcome, Direction, GenerationProgress, Generator, Goal, Grid,
    LevelAttempt, Solver,
};
use serde::Serialize;
use thiserror::Error;

/// Where the current level stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Status {
    Playing,
    Won,
    Lost,
}

/// Something a host may want to announce, log or track
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GameEvent {
    LevelGenerated {
        level: u32,
        size: usize,
        moves: u32,
        goal: String,
        fallback: bool,
    },
    SessionRestored {
        level: u32,
    },
    SnapshotDiscarded {
        reason: String,
    },
    ChainResolved {
        steps: u32,
        popped: u32,
        score: u64,
    },
    LevelWon {
        level: u32,
        score: u64,
        moves_left: u32,
    },
    LevelLost {
        level: u32,
        goal: String,
        remaining: String,
    },
    LevelRetried {
        level: u32,
    },
    HintRequested {
        level: u32,
        goal_kind: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("the level is already complete")]
    LevelComplete,
    #[error("no moves left")]
    NoMovesLeft,
    #[error("no movement {0}")]
    Blocked(Direction),
}

/// Result of one accepted move
#[derive(Debug, Clone, PartialEq)]
pub struct MoveOutcome {
    pub direction: Direction,
    pub chain: ChainOutcome,
    pub moves_left: u32,
    pub status: Status,
}

/// Hint text plus the winning line from the level start
#[derive(Debug, Clone, PartialEq)]
pub struct Hint {
    pub goal_text: String,
    pub remaining_text: String,
    pub moves_left: u32,
    pub solution: Option<Vec<Direction>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub(crate) level: u32,
    pub(crate) score: u64,
    pub(crate) best: u64,
    pub(crate) moves_left: u32,
    pub(crate) grid: Grid,
    pub(crate) goal: Goal,
    pub(crate) attempt: LevelAttempt,
    pub(crate) solution: Option<Vec<Direction>>,
    pub(crate) events: Vec<GameEvent>,
}

impl Session {
    /// Generate `level` and start playing it with a zero score
    pub fn start(generator: &mut Generator, level: u32) -> Self {
        Self::start_with_progress(generator, level, 0, |_| {})
    }

    /// Start a new game at `level`, keeping a previous best score
    pub fn start_with_progress<F>(generator: &mut Generator, level: u32, best: u64, on_progress: F) -> Self
    where
        F: FnMut(GenerationProgress),
    {
        let attempt = generator.generate_level_with_progress(level.max(1), on_progress);
        let mut session = Self::from_attempt(attempt, 0, best);
        session.announce_level();
        session
    }

    /// Start playing an already generated level
    pub fn from_attempt(attempt: LevelAttempt, score: u64, best: u64) -> Self {
        Self {
            level: attempt.level,
            score,
            best: best.max(score),
            moves_left: attempt.moves,
            grid: attempt.grid.clone(),
            goal: attempt.goal.clone(),
            solution: attempt.solution.clone(),
            attempt,
            events: Vec::new(),
        }
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn best(&self) -> u64 {
        self.best
    }

    pub fn moves_left(&self) -> u32 {
        self.moves_left
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn goal(&self) -> &Goal {
        &self.goal
    }

    /// The level as it was when it started
    pub fn attempt(&self) -> &LevelAttempt {
        &self.attempt
    }

    pub fn goal_text(&self) -> String {
        self.goal.to_string()
    }

    pub fn remaining_text(&self) -> String {
        self.goal.remaining_text(&self.grid)
    }

    pub fn status(&self) -> Status {
        if self.goal.is_satisfied(&self.grid) {
            Status::Won
        } else if self.moves_left == 0 {
            Status::Lost
        } else {
            Status::Playing
        }
    }

    /// Shift the board, resolve the chain and update goal, score and budget.
    ///
    /// A rejected move leaves the session untouched.
    pub fn apply_move(&mut self, direction: Direction) -> Result<MoveOutcome, MoveError> {
        match self.status() {
            Status::Won => return Err(MoveError::LevelComplete),
            Status::Lost => return Err(MoveError::NoMovesLeft),
            Status::Playing => {}
        }
        if !shift(&mut self.grid, direction) {
            return Err(MoveError::Blocked(direction));
        }
        self.moves_left -= 1;

        let chain = resolve_chain(&mut self.grid, direction);
        self.goal.apply_chain(&chain);
        self.add_score(chain.score);
        if !chain.is_empty() {
            self.events.push(GameEvent::ChainResolved {
                steps: chain.steps,
                popped: chain.total_popped,
                score: chain.score,
            });
        }

        let status = self.status();
        match status {
            Status::Won => self.events.push(GameEvent::LevelWon {
                level: self.level,
                score: self.score,
                moves_left: self.moves_left,
            }),
            Status::Lost => self.events.push(GameEvent::LevelLost {
                level: self.level,
                goal: self.goal_text(),
                remaining: self.remaining_text(),
            }),
            Status::Playing => {}
        }

        Ok(MoveOutcome {
            direction,
            chain,
            moves_left: self.moves_left,
            status,
        })
    }

    /// Replay the current level from its start; the score carries over
    pub fn retry(&mut self) {
        self.grid = self.attempt.grid.clone();
        self.goal = self.attempt.goal.clone();
        self.moves_left = self.attempt.moves;
        self.events.push(GameEvent::LevelRetried { level: self.level });
    }

    /// Move on to a freshly generated next level. Only a won level advances.
    pub fn advance(&mut self, generator: &mut Generator) -> bool {
        self.advance_with_progress(generator, |_| {})
    }

    pub fn advance_with_progress<F>(&mut self, generator: &mut Generator, on_progress: F) -> bool
    where
        F: FnMut(GenerationProgress),
    {
        if self.status() != Status::Won {
            return false;
        }
        let attempt = generator.generate_level_with_progress(self.level + 1, on_progress);
        self.load_attempt(attempt);
        self.announce_level();
        true
    }

    /// Hint for the current level. The solution runs from the level start and
    /// is computed on first request when generation did not provide one.
    pub fn hint(&mut self) -> Hint {
        self.hint_with(&Solver::new())
    }

    pub fn hint_with(&mut self, solver: &Solver) -> Hint {
        if self.solution.is_none() && self.attempt.moves > 0 {
            self.solution = solver.solve(&self.attempt.grid, &self.attempt.goal, self.attempt.moves);
        }
        self.events.push(GameEvent::HintRequested {
            level: self.level,
            goal_kind: self.goal.kind().to_string(),
        });
        Hint {
            goal_text: self.goal_text(),
            remaining_text: self.remaining_text(),
            moves_left: self.moves_left,
            solution: self.solution.clone(),
        }
    }

    /// Take every event queued since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    fn load_attempt(&mut self, attempt: LevelAttempt) {
        self.level = attempt.level;
        self.moves_left = attempt.moves;
        self.grid = attempt.grid.clone();
        self.goal = attempt.goal.clone();
        self.solution = attempt.solution.clone();
        self.attempt = attempt;
    }

    fn announce_level(&mut self) {
        self.events.push(GameEvent::LevelGenerated {
            level: self.level,
            size: self.grid.size(),
            moves: self.moves_left,
            goal: self.goal_text(),
            fallback: self.attempt.fallback,
        });
    }

    fn add_score(&mut self, points: u64) {
        self.score += points;
        if self.score > self.best {
            self.best = self.score;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attempt(board: &str, goal: Goal, moves: u32) -> LevelAttempt {
        LevelAttempt {
            level: 3,
            grid: Grid::from_string(board).unwrap(),
            goal,
            moves,
            solution: None,
            fallback: false,
        }
    }

    #[test]
    fn test_start_announces_level() {
        let mut generator = Generator::with_seed(42);
        let mut session = Session::start(&mut generator, 1);
        assert_eq!(session.level(), 1);
        assert_eq!(session.moves_left(), session.attempt().moves);
        assert_eq!(session.grid(), &session.attempt().grid);

        let events = session.drain_events();
        assert!(matches!(events[0], GameEvent::LevelGenerated { level: 1, .. }));
        assert!(session.drain_events().is_empty());
    }

    #[test]
    fn test_new_game_keeps_best() {
        let mut generator = Generator::with_seed(5);
        let session = Session::start_with_progress(&mut generator, 0, 640, |_| {});
        assert_eq!(session.level(), 1);
        assert_eq!(session.score(), 0);
        assert_eq!(session.best(), 640);
    }

    #[test]
    fn test_winning_move() {
        let mut session = Session::from_attempt(attempt(".... .... .... AA.A", Goal::pop_total(3), 2), 0, 0);

        assert_eq!(session.apply_move(Direction::Down), Err(MoveError::Blocked(Direction::Down)));
        assert_eq!(session.moves_left(), 2);

        let outcome = session.apply_move(Direction::Left).unwrap();
        assert_eq!(outcome.chain.total_popped, 3);
        assert_eq!(outcome.moves_left, 1);
        assert_eq!(outcome.status, Status::Won);
        assert_eq!(session.score(), 30);
        assert_eq!(session.best(), 30);
        assert_eq!(session.remaining_text(), "0");

        assert_eq!(
            session.drain_events(),
            vec![
                GameEvent::ChainResolved { steps: 1, popped: 3, score: 30 },
                GameEvent::LevelWon { level: 3, score: 30, moves_left: 1 },
            ]
        );
        assert_eq!(session.apply_move(Direction::Up), Err(MoveError::LevelComplete));
    }

    #[test]
    fn test_running_out_of_moves() {
        let mut session = Session::from_attempt(attempt(".... .... .... AA.A", Goal::pop_total(5), 1), 10, 50);
        let outcome = session.apply_move(Direction::Up).unwrap();
        assert!(outcome.chain.is_empty());
        assert_eq!(outcome.status, Status::Lost);
        assert_eq!(session.best(), 50);
        assert_eq!(
            session.drain_events(),
            vec![GameEvent::LevelLost {
                level: 3,
                goal: "Pop 5 tiles".to_string(),
                remaining: "5".to_string(),
            }]
        );
        assert_eq!(session.apply_move(Direction::Left), Err(MoveError::NoMovesLeft));
    }

    #[test]
    fn test_retry_restores_level_start() {
        let mut session = Session::from_attempt(attempt(".... .... .... AA.A", Goal::pop_total(3), 2), 0, 0);
        session.apply_move(Direction::Left).unwrap();
        assert_eq!(session.status(), Status::Won);

        session.retry();
        assert_eq!(session.grid(), &session.attempt().grid);
        assert_eq!(session.goal(), &Goal::pop_total(3));
        assert_eq!(session.moves_left(), 2);
        assert_eq!(session.score(), 30);
        assert_eq!(session.status(), Status::Playing);
    }

    #[test]
    fn test_hint_solves_from_level_start() {
        let mut session = Session::from_attempt(attempt(".... .... .... AA.A", Goal::pop_total(3), 2), 0, 0);
        session.apply_move(Direction::Up).unwrap();

        let hint = session.hint();
        assert_eq!(hint.goal_text, "Pop 3 tiles");
        assert_eq!(hint.moves_left, 1);
        assert_eq!(hint.solution, Some(vec![Direction::Up, Direction::Left]));
        assert!(matches!(
            session.drain_events().last(),
            Some(GameEvent::HintRequested { level: 3, .. })
        ));
    }

    #[test]
    fn test_advance_only_after_win() {
        let mut generator = Generator::with_seed(1);
        let mut session = Session::from_attempt(attempt(".... .... .... AA.A", Goal::pop_total(3), 2), 0, 0);
        assert!(!session.advance(&mut generator));
        assert_eq!(session.level(), 3);

        session.apply_move(Direction::Left).unwrap();
        assert!(session.advance(&mut generator));
        assert_eq!(session.level(), 4);
        assert_eq!(session.score(), 30);
        assert_eq!(session.moves_left(), session.attempt().moves);
    }

    #[test]
    fn test_density_goal_can_start_satisfied() {
        let session = Session::from_attempt(attempt("AB.. CD.. EA.. BC..", Goal::density_below(0.5), 3), 0, 0);
        assert_eq!(session.status(), Status::Won);
        assert_eq!(session.moves_left(), 3);
    }
}
