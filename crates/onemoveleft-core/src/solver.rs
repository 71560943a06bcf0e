//! Bounded depth-first solver.
//!
//! Proves a (board, goal, move budget) combination winnable by exhaustive
//! search over the four moves, returning the first winning move sequence in
//! `up, down, left, right` order. Used to gate level generation and to
//! produce hints.

use crate::{resolve_chain, shift, ChainOutcome, Direction, Goal, Grid, COLORS};
use std::collections::HashSet;

/// Solver tuning
#[derive(Debug, Clone)]
pub struct SolverConfig {
    /// Maximum number of states expanded before giving up
    pub node_limit: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            node_limit: 1_000_000,
        }
    }
}

/// Counters from one search
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SolveStats {
    /// States expanded
    pub nodes: usize,
    /// States skipped because they were already visited
    pub memo_hits: usize,
    /// States cut by the pop-total feasibility bound
    pub pruned: usize,
    /// Search stopped at the node limit
    pub exhausted: bool,
}

/// Goal progress with every counter flattened into plain values.
///
/// Sibling branches each derive their own copy, so no branch can observe
/// another's pops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Progress {
    PopTotal(u32),
    Colors([u32; COLORS]),
    Density,
}

impl Progress {
    fn from_goal(goal: &Goal) -> Self {
        match goal {
            Goal::PopTotal { remaining, .. } => Progress::PopTotal(*remaining),
            Goal::ClearColor { color, remaining, .. } => {
                let mut by_color = [0; COLORS];
                if let Some(slot) = by_color.get_mut(*color as usize) {
                    *slot = *remaining;
                }
                Progress::Colors(by_color)
            }
            Goal::ClearMulti { items } => {
                let mut by_color = [0; COLORS];
                for it in items {
                    if let Some(slot) = by_color.get_mut(it.color as usize) {
                        *slot = (*slot).max(it.remaining);
                    }
                }
                Progress::Colors(by_color)
            }
            Goal::DensityBelow { .. } => Progress::Density,
        }
    }

    fn after(self, outcome: &ChainOutcome) -> Self {
        match self {
            Progress::PopTotal(remaining) => {
                Progress::PopTotal(remaining.saturating_sub(outcome.total_popped))
            }
            Progress::Colors(mut by_color) => {
                for (left, popped) in by_color.iter_mut().zip(outcome.popped_by_color) {
                    *left = left.saturating_sub(popped);
                }
                Progress::Colors(by_color)
            }
            Progress::Density => Progress::Density,
        }
    }

    fn is_satisfied(&self, grid: &Grid, threshold: f64) -> bool {
        match self {
            Progress::PopTotal(remaining) => *remaining == 0,
            Progress::Colors(by_color) => by_color.iter().all(|&v| v == 0),
            Progress::Density => grid.fill_fraction() <= threshold,
        }
    }
}

/// Memoization key. Includes the remaining move count: a state that failed
/// with `k` moves left says nothing about the same state with more.
#[derive(PartialEq, Eq, Hash)]
struct StateKey {
    grid: Grid,
    progress: Progress,
    moves_left: u32,
}

/// Stateless solver; all search state is created per call.
#[derive(Debug, Clone, Default)]
pub struct Solver {
    config: SolverConfig,
}

impl Solver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: SolverConfig) -> Self {
        Self { config }
    }

    /// First winning move sequence within `budget` moves, or `None`.
    ///
    /// `None` is an ordinary answer, not an error. The inputs are never
    /// modified.
    pub fn solve(&self, grid: &Grid, goal: &Goal, budget: u32) -> Option<Vec<Direction>> {
        self.solve_with_stats(grid, goal, budget).0
    }

    pub fn solve_with_stats(
        &self,
        grid: &Grid,
        goal: &Goal,
        budget: u32,
    ) -> (Option<Vec<Direction>>, SolveStats) {
        debug_assert!(goal.colors_in_range(), "goal colour outside the palette: {goal:?}");
        if !goal.colors_in_range() {
            return (None, SolveStats::default());
        }
        let threshold = match goal {
            Goal::DensityBelow { threshold } => *threshold,
            _ => 0.0,
        };
        let mut search = Search {
            memo: HashSet::new(),
            path: Vec::with_capacity(budget as usize),
            threshold,
            node_limit: self.config.node_limit,
            stats: SolveStats::default(),
        };
        let found = search.dfs(grid, Progress::from_goal(goal), budget);
        let path = found.then(|| search.path.clone());
        (path, search.stats)
    }
}

/// Solve with the default configuration
pub fn is_solvable(grid: &Grid, goal: &Goal, budget: u32) -> Option<Vec<Direction>> {
    Solver::new().solve(grid, goal, budget)
}

/// Replay `moves` from `grid` the way a player would and report whether
/// `goal` is met at or before the last move. A move that shifts nothing makes
/// the sequence invalid.
pub fn verify_solution(grid: &Grid, goal: &Goal, moves: &[Direction]) -> bool {
    let mut grid = grid.clone();
    let mut goal = goal.clone();
    if goal.is_satisfied(&grid) {
        return true;
    }
    for &dir in moves {
        if !shift(&mut grid, dir) {
            return false;
        }
        let outcome = resolve_chain(&mut grid, dir);
        goal.apply_chain(&outcome);
        if goal.is_satisfied(&grid) {
            return true;
        }
    }
    false
}

struct Search {
    memo: HashSet<StateKey>,
    path: Vec<Direction>,
    threshold: f64,
    node_limit: usize,
    stats: SolveStats,
}

impl Search {
    fn dfs(&mut self, grid: &Grid, progress: Progress, moves_left: u32) -> bool {
        if progress.is_satisfied(grid, self.threshold) {
            return true;
        }
        if moves_left == 0 {
            return false;
        }
        if self.stats.nodes >= self.node_limit {
            self.stats.exhausted = true;
            return false;
        }

        let key = StateKey {
            grid: grid.clone(),
            progress,
            moves_left,
        };
        if !self.memo.insert(key) {
            self.stats.memo_hits += 1;
            return false;
        }
        self.stats.nodes += 1;

        if let Progress::PopTotal(remaining) = progress {
            if remaining as usize > grid.filled_count() {
                self.stats.pruned += 1;
                return false;
            }
        }

        for dir in Direction::ALL {
            let mut next = grid.clone();
            if !shift(&mut next, dir) {
                continue;
            }
            let outcome = resolve_chain(&mut next, dir);
            let next_progress = progress.after(&outcome);

            self.path.push(dir);
            if self.dfs(&next, next_progress, moves_left - 1) {
                return true;
            }
            self.path.pop();
        }
        false
    }
}
