use crate::{Direction, Grid, Position};

/// Slide every tile as far as it goes in `direction`.
///
/// Cells nearest the target edge are visited first, so each tile only ever
/// stops against the boundary or a tile that has already settled. Tiles never
/// merge or change colour. Returns whether any tile changed position.
pub fn shift(grid: &mut Grid, direction: Direction) -> bool {
    let n = grid.size();
    let (dr, dc) = direction.delta();
    let rows = traversal(n, dr > 0);
    let cols = traversal(n, dc > 0);
    let limit = n as isize;

    let mut moved = false;
    for &r in &rows {
        for &c in &cols {
            let from = Position::new(r, c);
            let Some(color) = grid.get(from) else {
                continue;
            };

            let (mut nr, mut nc) = (r as isize, c as isize);
            loop {
                let (rr, cc) = (nr + dr, nc + dc);
                if rr < 0 || cc < 0 || rr >= limit || cc >= limit {
                    break;
                }
                if grid.is_occupied(Position::new(rr as usize, cc as usize)) {
                    break;
                }
                nr = rr;
                nc = cc;
            }

            let to = Position::new(nr as usize, nc as usize);
            if to == from {
                continue;
            }
            grid.set(to, Some(color));
            grid.set(from, None);
            moved = true;
        }
    }
    moved
}

fn traversal(n: usize, reversed: bool) -> Vec<usize> {
    if reversed {
        (0..n).rev().collect()
    } else {
        (0..n).collect()
    }
}
