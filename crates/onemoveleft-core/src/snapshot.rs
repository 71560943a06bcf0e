use crate::{
    Direction, GameEvent, GenerationProgress, Generator, Goal, Grid, GridError, LevelAttempt, Session,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Format version written to `v`
pub const SNAPSHOT_VERSION: u32 = 1;

/// Persisted form of a [`Session`].
///
/// Grids are plain `size × size` integer matrices with `-1` for empty cells,
/// so the file stays readable and editable by hand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedState {
    pub v: u32,
    pub level: u32,
    pub size: usize,
    pub score: u64,
    pub best: u64,
    pub moves_left: u32,
    pub goal: Option<Goal>,
    pub grid_colors: Vec<Vec<i8>>,
    pub current_level_grid: Option<Vec<Vec<i8>>>,
    pub current_level_goal: Option<Goal>,
    pub current_level_moves: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solution_moves: Option<Vec<Direction>>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub fallback: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("unsupported snapshot version {0}")]
    UnsupportedVersion(u32),
    #[error("level must be at least 1")]
    InvalidLevel,
    #[error("expected {expected} rows, found {found}")]
    SizeMismatch { expected: usize, found: usize },
    #[error(transparent)]
    Grid(#[from] GridError),
    #[error("snapshot has no goal")]
    MissingGoal,
    #[error("goal {0} references a colour outside the palette")]
    GoalOutOfRange(&'static str),
    #[error("goal {0} has more remaining than its target")]
    GoalOverTarget(&'static str),
    #[error("live goal {live} does not belong to level goal {start}")]
    GoalMismatch {
        live: &'static str,
        start: &'static str,
    },
    #[error("snapshot has no level start")]
    MissingLevelStart,
    #[error("{moves_left} moves left exceeds the level budget of {budget}")]
    MovesExceedBudget { moves_left: u32, budget: u32 },
    #[error("malformed snapshot: {0}")]
    Json(#[from] serde_json::Error),
}

impl SavedState {
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Session {
    pub fn to_snapshot(&self) -> SavedState {
        SavedState {
            v: SNAPSHOT_VERSION,
            level: self.level,
            size: self.grid.size(),
            score: self.score,
            best: self.best,
            moves_left: self.moves_left,
            goal: Some(self.goal.clone()),
            grid_colors: self.grid.to_rows(),
            current_level_grid: Some(self.attempt.grid.to_rows()),
            current_level_goal: Some(self.attempt.goal.clone()),
            current_level_moves: self.attempt.moves,
            solution_moves: self.solution.clone(),
            fallback: self.attempt.fallback,
        }
    }

    /// Rebuild a session from saved state, validating every field first
    pub fn from_snapshot(state: SavedState) -> Result<Self, SnapshotError> {
        if state.v != SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion(state.v));
        }
        if state.level == 0 {
            return Err(SnapshotError::InvalidLevel);
        }

        let grid = load_grid(&state.grid_colors, state.size)?;
        let goal = check_goal(state.goal.ok_or(SnapshotError::MissingGoal)?)?;
        let start_rows = state
            .current_level_grid
            .as_ref()
            .ok_or(SnapshotError::MissingLevelStart)?;
        let start_grid = load_grid(start_rows, state.size)?;
        let start_goal = check_goal(
            state
                .current_level_goal
                .ok_or(SnapshotError::MissingLevelStart)?,
        )?;
        if !same_goal(&goal, &start_goal) {
            return Err(SnapshotError::GoalMismatch {
                live: goal.kind(),
                start: start_goal.kind(),
            });
        }
        if state.moves_left > state.current_level_moves {
            return Err(SnapshotError::MovesExceedBudget {
                moves_left: state.moves_left,
                budget: state.current_level_moves,
            });
        }

        let attempt = LevelAttempt {
            level: state.level,
            grid: start_grid,
            goal: start_goal,
            moves: state.current_level_moves,
            solution: state.solution_moves.clone(),
            fallback: state.fallback,
        };
        let mut session = Session::from_attempt(attempt, state.score, state.best);
        session.grid = grid;
        session.goal = goal;
        session.moves_left = state.moves_left;
        Ok(session)
    }

    /// Resume from saved JSON when it is present and valid, otherwise start a
    /// fresh game at level 1. A rejected snapshot is reported as an event.
    pub fn restore_or_start(json: Option<&str>, generator: &mut Generator) -> Self {
        Self::restore_or_start_with_progress(json, generator, |_| {})
    }

    /// Like [`Session::restore_or_start`], reporting generation progress
    /// when a fresh level has to be built.
    pub fn restore_or_start_with_progress<F>(
        json: Option<&str>,
        generator: &mut Generator,
        on_progress: F,
    ) -> Self
    where
        F: FnMut(GenerationProgress),
    {
        let restored = json.map(|text| SavedState::from_json(text).and_then(Session::from_snapshot));
        match restored {
            Some(Ok(mut session)) => {
                session.events.push(GameEvent::SessionRestored {
                    level: session.level,
                });
                session
            }
            Some(Err(err)) => {
                let mut session = Session::start_with_progress(generator, 1, 0, on_progress);
                session.events.insert(
                    0,
                    GameEvent::SnapshotDiscarded {
                        reason: err.to_string(),
                    },
                );
                session
            }
            None => Session::start_with_progress(generator, 1, 0, on_progress),
        }
    }
}

fn load_grid(rows: &[Vec<i8>], size: usize) -> Result<Grid, SnapshotError> {
    if rows.len() != size {
        return Err(SnapshotError::SizeMismatch {
            expected: size,
            found: rows.len(),
        });
    }
    Ok(Grid::from_rows(rows)?)
}

fn check_goal(goal: Goal) -> Result<Goal, SnapshotError> {
    if !goal.colors_in_range() {
        return Err(SnapshotError::GoalOutOfRange(goal.kind()));
    }
    let within_target = match &goal {
        Goal::PopTotal { target, remaining } | Goal::ClearColor { target, remaining, .. } => {
            remaining <= target
        }
        Goal::ClearMulti { items } => items.iter().all(|it| it.remaining <= it.target),
        Goal::DensityBelow { .. } => true,
    };
    if within_target {
        Ok(goal)
    } else {
        Err(SnapshotError::GoalOverTarget(goal.kind()))
    }
}

/// Whether `live` is `start` with only its remaining counters changed
fn same_goal(live: &Goal, start: &Goal) -> bool {
    match (live, start) {
        (Goal::PopTotal { target: a, .. }, Goal::PopTotal { target: b, .. }) => a == b,
        (
            Goal::ClearColor { color: ca, target: ta, .. },
            Goal::ClearColor { color: cb, target: tb, .. },
        ) => ca == cb && ta == tb,
        (Goal::ClearMulti { items: a }, Goal::ClearMulti { items: b }) => {
            a.len() == b.len()
                && a
                    .iter()
                    .zip(b)
                    .all(|(x, y)| x.color == y.color && x.target == y.target)
        }
        (Goal::DensityBelow { threshold: a }, Goal::DensityBelow { threshold: b }) => a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ColorQuota, GeneratorConfig, Status};

    fn session() -> Session {
        let attempt = LevelAttempt {
            level: 4,
            grid: Grid::from_string(".... B... C... AA.A").unwrap(),
            goal: Goal::clear_multi(&[(0, 3), (2, 1)]),
            moves: 3,
            solution: None,
            fallback: false,
        };
        Session::from_attempt(attempt, 120, 300)
    }

    #[test]
    fn test_round_trip_mid_level() {
        let mut original = session();
        original.apply_move(Direction::Left).unwrap();
        original.drain_events();

        let json = original.to_snapshot().to_json().unwrap();
        let restored = Session::from_snapshot(SavedState::from_json(&json).unwrap()).unwrap();

        assert_eq!(restored, original);
        assert_eq!(restored.status(), Status::Playing);
        assert_eq!(restored.moves_left(), 2);
    }

    #[test]
    fn test_field_names() {
        let value = serde_json::to_value(session().to_snapshot()).unwrap();
        assert_eq!(value["v"], 1);
        assert_eq!(value["movesLeft"], 3);
        assert_eq!(value["currentLevelMoves"], 3);
        assert_eq!(value["gridColors"][0][0], -1);
        assert_eq!(value["gridColors"][3][0], 0);
        assert_eq!(value["goal"]["type"], "clearMulti");
        assert!(value.get("solutionMoves").is_none());
        assert!(value.get("fallback").is_none());
    }

    #[test]
    fn test_solution_is_kept() {
        let mut original = session();
        let hint = original.hint();
        assert!(hint.solution.is_none());

        let mut with_solution = Session::from_attempt(
            LevelAttempt {
                solution: Some(vec![Direction::Up, Direction::Left]),
                ..original.attempt().clone()
            },
            0,
            0,
        );
        let value = serde_json::to_value(with_solution.to_snapshot()).unwrap();
        assert_eq!(value["solutionMoves"], serde_json::json!(["up", "left"]));

        let mut restored = Session::from_snapshot(with_solution.to_snapshot()).unwrap();
        assert_eq!(restored.attempt().solution, Some(vec![Direction::Up, Direction::Left]));
        assert_eq!(restored.hint().solution, with_solution.hint().solution);
    }

    #[test]
    fn test_rejects_bad_snapshots() {
        let good = session().to_snapshot();

        let state = SavedState { v: 2, ..good.clone() };
        assert!(matches!(
            Session::from_snapshot(state),
            Err(SnapshotError::UnsupportedVersion(2))
        ));

        let state = SavedState { size: 5, ..good.clone() };
        assert!(matches!(
            Session::from_snapshot(state),
            Err(SnapshotError::SizeMismatch { expected: 5, found: 4 })
        ));

        let mut state = good.clone();
        state.grid_colors[1][1] = 9;
        assert!(matches!(
            Session::from_snapshot(state),
            Err(SnapshotError::Grid(GridError::ColorOutOfRange(9)))
        ));

        let mut state = good.clone();
        state.grid_colors[2].pop();
        assert!(matches!(
            Session::from_snapshot(state),
            Err(SnapshotError::Grid(GridError::NotSquare { row: 2, .. }))
        ));

        let state = SavedState {
            goal: Some(Goal::clear_color(7, 3)),
            ..good.clone()
        };
        assert!(matches!(
            Session::from_snapshot(state),
            Err(SnapshotError::GoalOutOfRange("clearColor"))
        ));

        let state = SavedState {
            current_level_grid: None,
            ..good.clone()
        };
        assert!(matches!(
            Session::from_snapshot(state),
            Err(SnapshotError::MissingLevelStart)
        ));

        let state = SavedState { moves_left: 9, ..good };
        assert!(matches!(
            Session::from_snapshot(state),
            Err(SnapshotError::MovesExceedBudget { moves_left: 9, budget: 3 })
        ));
    }

    #[test]
    fn test_rejects_goal_not_from_level_start() {
        let good = session().to_snapshot();

        let state = SavedState {
            goal: Some(Goal::pop_total(3)),
            ..good.clone()
        };
        assert!(matches!(
            Session::from_snapshot(state),
            Err(SnapshotError::GoalMismatch { live: "popTotal", start: "clearMulti" })
        ));

        let state = SavedState {
            goal: Some(Goal::clear_multi(&[(0, 3), (3, 1)])),
            ..good.clone()
        };
        assert!(matches!(
            Session::from_snapshot(state),
            Err(SnapshotError::GoalMismatch { .. })
        ));

        let state = SavedState {
            goal: Some(Goal::ClearMulti {
                items: vec![ColorQuota { color: 0, target: 3, remaining: 5 }, ColorQuota::new(2, 1)],
            }),
            ..good.clone()
        };
        assert!(matches!(
            Session::from_snapshot(state),
            Err(SnapshotError::GoalOverTarget("clearMulti"))
        ));

        let state = SavedState {
            goal: Some(Goal::clear_multi(&[(0, 3), (2, 1)])),
            current_level_goal: Some(Goal::PopTotal { target: 4, remaining: 6 }),
            ..good.clone()
        };
        assert!(matches!(
            Session::from_snapshot(state),
            Err(SnapshotError::GoalOverTarget("popTotal"))
        ));

        // Progress on the live goal alone is fine
        let state = SavedState {
            goal: Some(Goal::ClearMulti {
                items: vec![ColorQuota { color: 0, target: 3, remaining: 0 }, ColorQuota::new(2, 1)],
            }),
            ..good
        };
        assert!(Session::from_snapshot(state).is_ok());
    }

    #[test]
    fn test_restore_or_start() {
        let mut generator = Generator::with_seed(8);
        let json = session().to_snapshot().to_json().unwrap();

        let mut restored = Session::restore_or_start(Some(&json), &mut generator);
        assert_eq!(restored.level(), 4);
        assert_eq!(restored.score(), 120);
        assert_eq!(
            restored.drain_events(),
            vec![GameEvent::SessionRestored { level: 4 }]
        );

        let mut fresh = Session::restore_or_start(Some("{\"v\": 1"), &mut generator);
        assert_eq!(fresh.level(), 1);
        assert_eq!(fresh.score(), 0);
        let events = fresh.drain_events();
        assert!(matches!(events[0], GameEvent::SnapshotDiscarded { .. }));
        assert!(matches!(events[1], GameEvent::LevelGenerated { level: 1, .. }));

        let mut fresh = Session::restore_or_start(None, &mut generator);
        assert!(matches!(
            fresh.drain_events().as_slice(),
            [GameEvent::LevelGenerated { level: 1, .. }]
        ));
    }

    #[test]
    fn test_fresh_start_reports_progress() {
        // No goals are tried, so every board fails and the level falls back
        let config = GeneratorConfig {
            max_attempts: 4,
            goals_per_attempt: 0,
            progress_every: 2,
            ..GeneratorConfig::default()
        };
        let mut generator = Generator::with_config_and_seed(config, 11);
        let mut seen = Vec::new();
        let fresh = Session::restore_or_start_with_progress(Some("not json"), &mut generator, |p| {
            seen.push((p.level, p.attempt, p.max_attempts))
        });
        assert_eq!(seen, vec![(1, 2, 4), (1, 4, 4)]);
        assert_eq!(fresh.level(), 1);
        assert_eq!(fresh.goal(), &Goal::pop_total(10));

        // A good snapshot never touches the generator
        let json = session().to_snapshot().to_json().unwrap();
        let mut calls = 0;
        let restored =
            Session::restore_or_start_with_progress(Some(&json), &mut generator, |_| calls += 1);
        assert_eq!(calls, 0);
        assert_eq!(restored.level(), 4);
    }
}
