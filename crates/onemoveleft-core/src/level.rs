use crate::{Direction, Goal, Grid, COLORS};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Difficulty-scaled parameters for one level
#[derive(Debug, Clone, PartialEq)]
pub struct LevelParams {
    pub level: u32,
    pub size: usize,
    pub fill: f64,
    pub moves: u32,
    pub band: u32,
}

impl LevelParams {
    /// Parameters for `level`; the board size is drawn from the level's range.
    pub fn for_level<R: Rng + ?Sized>(level: u32, rng: &mut R) -> Self {
        let (small, large) = Self::size_range(level);
        let size = if rng.gen_bool(0.5) { small } else { large };
        Self {
            level,
            size,
            fill: Self::fill_for(level),
            moves: Self::moves_for(level),
            band: Self::band_for(level),
        }
    }

    /// Difficulty band 0..=3
    pub fn band_for(level: u32) -> u32 {
        match level {
            0..=3 => 0,
            4..=10 => 1,
            11..=25 => 2,
            _ => 3,
        }
    }

    /// The two board sizes a level may use
    pub fn size_range(level: u32) -> (usize, usize) {
        match level {
            0..=3 => (5, 6),
            4..=10 => (6, 7),
            _ => (7, 8),
        }
    }

    pub fn moves_for(level: u32) -> u32 {
        match level {
            0..=2 => 4,
            3..=6 => 5,
            7..=14 => 6,
            _ => 7,
        }
    }

    /// Boards fill up slowly as levels grow
    pub fn fill_for(level: u32) -> f64 {
        (0.78 + level as f64 * 0.006).min(0.92)
    }

    /// Candidate goals the generator samples from
    pub fn goal_templates(&self) -> Vec<Goal> {
        let b = self.band;
        let lv = self.level;
        let mut list = vec![
            Goal::pop_total(15 + b * 10 + (lv * 2).min(30)),
            Goal::pop_total(20 + b * 12 + lv * 3 / 2),
        ];

        list.extend((0..COLORS as u8).map(|c| Goal::clear_color(c, 10 + b * 5)));

        list.push(Goal::clear_multi(&[(2, 12 + b * 4), (4, 8 + b * 3)]));
        list.push(Goal::clear_multi(&[(0, 10 + b * 4), (1, 10 + b * 4)]));

        let threshold = match b {
            0 => 0.55,
            1 => 0.48,
            2 => 0.42,
            _ => 0.38,
        };
        list.push(Goal::density_below(threshold));

        list.push(Goal::pop_total(25 + b * 8));
        list.push(Goal::pop_total(30 + b * 10 + lv));

        for c in 0..COLORS as u8 {
            list.push(Goal::clear_color(c, 12 + b * 3));
            list.push(Goal::clear_color(c, 15 + b * 4));
        }

        list.push(Goal::clear_multi(&[(1, 12 + b * 3), (3, 10 + b * 3)]));
        list.push(Goal::clear_multi(&[(2, 15 + b * 4), (4, 10 + b * 3)]));

        if b >= 2 {
            list.push(Goal::clear_multi(&[(3, 15 + b * 3), (4, 12 + b * 3)]));
            list.push(Goal::pop_total(35 + b * 8));
        }
        list
    }
}

/// A generated level: the starting board and goal, the move budget, and the
/// witness solution when one was found. Never mutated once accepted; retry
/// and hint both read from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelAttempt {
    pub level: u32,
    pub grid: Grid,
    pub goal: Goal,
    pub moves: u32,
    pub solution: Option<Vec<Direction>>,
    /// Generation ran out of attempts and fell back to an easy goal
    #[serde(default)]
    pub fallback: bool,
}
