use crate::{find_clusters, shift, Cluster, Direction, Grid, COLORS, MIN_CLUSTER};
use serde::{Deserialize, Serialize};

/// Maximum pop/shift waves resolved for a single move.
///
/// Interactive play and the solver share this cap so a level rated solvable
/// plays out the same way on the board.
pub const MAX_CHAIN_STEPS: usize = 12;

/// Aggregate result of resolving one move's chain
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainOutcome {
    /// Tiles popped across all steps
    pub total_popped: u32,
    /// Tiles popped per colour
    pub popped_by_color: [u32; COLORS],
    /// Number of pop waves (0 when nothing popped)
    pub steps: u32,
    /// Points earned by this chain
    pub score: u64,
}

impl ChainOutcome {
    pub fn is_empty(&self) -> bool {
        self.steps == 0
    }
}

/// Pop clusters and re-apply `direction` until the board is stable, up to
/// [`MAX_CHAIN_STEPS`] waves. Mutates `grid` in place.
pub fn resolve_chain(grid: &mut Grid, direction: Direction) -> ChainOutcome {
    resolve_chain_with_limit(grid, direction, MAX_CHAIN_STEPS)
}

/// [`resolve_chain`] with an explicit wave cap.
pub fn resolve_chain_with_limit(grid: &mut Grid, direction: Direction, limit: usize) -> ChainOutcome {
    let mut outcome = ChainOutcome::default();

    for step in 1..=limit {
        let clusters = find_clusters(grid);
        if clusters.is_empty() {
            break;
        }

        for cluster in &clusters {
            pop(grid, cluster, &mut outcome);
            outcome.score += cluster_score(cluster.len(), step);
        }
        outcome.steps += 1;

        shift(grid, direction);
    }
    outcome
}

fn pop(grid: &mut Grid, cluster: &Cluster, outcome: &mut ChainOutcome) {
    for &pos in &cluster.cells {
        if let Some(color) = grid.get(pos) {
            grid.set(pos, None);
            outcome.total_popped += 1;
            outcome.popped_by_color[color as usize] += 1;
        }
    }
}

/// `(10 per tile + 5 per tile beyond the minimum) × chain step`
pub fn cluster_score(popped: usize, step: usize) -> u64 {
    let base = popped as u64 * 10;
    let bonus = popped.saturating_sub(MIN_CLUSTER) as u64 * 5;
    (base + bonus) * step as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_step_board() -> Grid {
        Grid::from_string(
            "B...
             A...
             A...
             ABB.",
        )
        .unwrap()
    }

    #[test]
    fn test_two_step_chain() {
        let mut grid = two_step_board();
        let before = grid.filled_count();
        let outcome = resolve_chain(&mut grid, Direction::Down);

        assert_eq!(outcome.steps, 2);
        assert_eq!(outcome.total_popped, 6);
        assert_eq!(outcome.popped_by_color, [3, 3, 0, 0, 0]);
        // 30 at step one, 30 × 2 at step two
        assert_eq!(outcome.score, 90);
        assert_eq!(grid.filled_count(), before - outcome.total_popped as usize);
        assert_eq!(grid.filled_count(), 0);
    }

    #[test]
    fn test_limit_stops_after_cap() {
        let mut grid = two_step_board();
        let outcome = resolve_chain_with_limit(&mut grid, Direction::Down, 1);

        assert_eq!(outcome.steps, 1);
        assert_eq!(outcome.total_popped, 3);
        // The shift after the first wave still ran
        assert_eq!(grid, Grid::from_string(".... .... .... BBB.").unwrap());

        let rest = resolve_chain(&mut grid, Direction::Down);
        assert_eq!(rest.steps, 1);
        assert_eq!(rest.total_popped, 3);
    }

    #[test]
    fn test_stable_board_pops_nothing() {
        let mut grid = Grid::from_string("AB. BA. ...").unwrap();
        let copy = grid.clone();
        let outcome = resolve_chain(&mut grid, Direction::Left);
        assert!(outcome.is_empty());
        assert_eq!(outcome, ChainOutcome::default());
        assert_eq!(grid, copy);
    }

    #[test]
    fn test_simultaneous_clusters_pop_in_one_step() {
        let mut grid = Grid::from_string("AAA. .... CCCC ....").unwrap();
        let outcome = resolve_chain(&mut grid, Direction::Up);
        assert_eq!(outcome.steps, 1);
        assert_eq!(outcome.total_popped, 7);
        assert_eq!(outcome.popped_by_color, [3, 0, 4, 0, 0]);
        assert_eq!(outcome.score, 30 + 45);
    }

    /// Full 8×8 board whose downward chain runs for 20 waves when uncapped
    fn long_chain_board() -> Grid {
        Grid::from_string(
            "BDEBDACA
             CACACBCB
             ACADAEAC
             AEDBECAC
             CBCEBEEC
             BABDBCDA
             EEBAADAD
             ACDDEDCD",
        )
        .unwrap()
    }

    #[test]
    fn test_chain_stops_at_cap() {
        let mut grid = long_chain_board();
        // Already full, so the move itself slides nothing
        assert!(!shift(&mut grid, Direction::Down));

        let mut uncapped = grid.clone();
        let outcome = resolve_chain(&mut grid, Direction::Down);
        assert_eq!(outcome.steps as usize, MAX_CHAIN_STEPS);
        assert_eq!(outcome.total_popped, 37);
        assert_eq!(outcome.popped_by_color, [12, 9, 9, 3, 4]);
        assert_eq!(outcome.score, 2400);
        assert_eq!(grid.filled_count(), 64 - 37);

        let longer = resolve_chain_with_limit(&mut uncapped, Direction::Down, 40);
        assert_eq!(longer.steps, 20);
        assert_eq!(longer.total_popped, 61);
    }

    #[test]
    fn test_chain_is_reproducible() {
        let board = long_chain_board();
        let mut first = board.clone();
        let mut second = board.clone();
        let a = resolve_chain(&mut first, Direction::Down);
        let b = resolve_chain(&mut second, Direction::Down);
        assert_eq!(a, b);
        assert_eq!(first, second);
    }

    #[test]
    fn test_cluster_score() {
        assert_eq!(cluster_score(3, 1), 30);
        assert_eq!(cluster_score(5, 1), 60);
        assert_eq!(cluster_score(4, 3), 135);
    }
}
