use crate::{Grid, Position, MIN_CLUSTER};

/// A 4-connected group of same-coloured tiles large enough to pop
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cluster {
    pub color: u8,
    pub cells: Vec<Position>,
}

impl Cluster {
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Find every poppable cluster.
///
/// Cells are scanned row-major and each region is grown with a stack-based
/// flood fill, so the output order is deterministic. Clusters are disjoint.
pub fn find_clusters(grid: &Grid) -> Vec<Cluster> {
    let n = grid.size();
    let mut visited = vec![false; n * n];
    let mut clusters = Vec::new();
    let mut stack = Vec::new();

    for start in grid.positions() {
        let Some(color) = grid.get(start) else {
            continue;
        };
        if visited[start.row * n + start.col] {
            continue;
        }

        visited[start.row * n + start.col] = true;
        stack.push(start);
        let mut cells = Vec::new();

        while let Some(pos) = stack.pop() {
            cells.push(pos);
            for next in neighbours(pos, n) {
                let idx = next.row * n + next.col;
                if !visited[idx] && grid.get(next) == Some(color) {
                    visited[idx] = true;
                    stack.push(next);
                }
            }
        }

        if cells.len() >= MIN_CLUSTER {
            clusters.push(Cluster { color, cells });
        }
    }
    clusters
}

/// Orthogonal neighbours inside an `n × n` board: up, down, left, right.
fn neighbours(pos: Position, n: usize) -> impl Iterator<Item = Position> {
    let Position { row, col } = pos;
    [
        (row > 0).then(|| Position::new(row - 1, col)),
        (row + 1 < n).then(|| Position::new(row + 1, col)),
        (col > 0).then(|| Position::new(row, col - 1)),
        (col + 1 < n).then(|| Position::new(row, col + 1)),
    ]
    .into_iter()
    .flatten()
}
