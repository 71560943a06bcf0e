use crate::COLORS;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A cell position on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("grid has no rows")]
    Empty,
    #[error("row {row} has {len} cells, expected {size}")]
    NotSquare { row: usize, len: usize, size: usize },
    #[error("colour {0} is outside the palette")]
    ColorOutOfRange(i64),
    #[error("unexpected character {0:?} in grid text")]
    InvalidChar(char),
}

/// Square board of colour indices.
///
/// Cells are stored row-major; `None` is an empty cell. Equality and hashing
/// cover every cell, so a `Grid` doubles as its own memoization key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<i8>>", into = "Vec<Vec<i8>>")]
pub struct Grid {
    size: usize,
    cells: Vec<Option<u8>>,
}

impl Grid {
    /// Create an empty `size × size` grid
    pub fn new(size: usize) -> Self {
        Self {
            size,
            cells: vec![None; size * size],
        }
    }

    /// Build a grid from rows of colour indices, `-1` marking an empty cell.
    pub fn from_rows<R: AsRef<[i8]>>(rows: &[R]) -> Result<Self, GridError> {
        let size = rows.len();
        if size == 0 {
            return Err(GridError::Empty);
        }
        let mut grid = Self::new(size);
        for (row, values) in rows.iter().enumerate() {
            let values = values.as_ref();
            if values.len() != size {
                return Err(GridError::NotSquare {
                    row,
                    len: values.len(),
                    size,
                });
            }
            for (col, &v) in values.iter().enumerate() {
                let cell = match v {
                    -1 => None,
                    c if c >= 0 && (c as usize) < COLORS => Some(c as u8),
                    c => return Err(GridError::ColorOutOfRange(c as i64)),
                };
                grid.set(Position::new(row, col), cell);
            }
        }
        Ok(grid)
    }

    /// Rows of colour indices with `-1` for empty cells
    pub fn to_rows(&self) -> Vec<Vec<i8>> {
        self.cells
            .chunks(self.size.max(1))
            .map(|row| row.iter().map(|c| c.map_or(-1, |v| v as i8)).collect())
            .collect()
    }

    /// Parse the text notation: one row per line, `A`..`E` for colours, `.` for empty.
    ///
    /// Whitespace separates rows, so `"AB. .CA ..B"` is a valid 3×3 grid.
    pub fn from_string(s: &str) -> Result<Self, GridError> {
        let rows: Vec<Vec<i8>> = s
            .split_whitespace()
            .map(|line| {
                line.chars()
                    .map(|ch| match ch {
                        '.' => Ok(-1),
                        'A'..='Z' => {
                            let c = ch as i64 - 'A' as i64;
                            if (c as usize) < COLORS {
                                Ok(c as i8)
                            } else {
                                Err(GridError::ColorOutOfRange(c))
                            }
                        }
                        other => Err(GridError::InvalidChar(other)),
                    })
                    .collect()
            })
            .collect::<Result<_, _>>()?;
        Self::from_rows(&rows)
    }

    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    fn index(&self, pos: Position) -> usize {
        debug_assert!(pos.row < self.size && pos.col < self.size);
        pos.row * self.size + pos.col
    }

    #[inline]
    pub fn get(&self, pos: Position) -> Option<u8> {
        self.cells[self.index(pos)]
    }

    #[inline]
    pub fn set(&mut self, pos: Position, cell: Option<u8>) {
        debug_assert!(cell.map_or(true, |c| (c as usize) < COLORS));
        let idx = self.index(pos);
        self.cells[idx] = cell;
    }

    #[inline]
    pub fn is_occupied(&self, pos: Position) -> bool {
        self.get(pos).is_some()
    }

    /// All positions in row-major order
    pub fn positions(&self) -> impl Iterator<Item = Position> {
        let size = self.size;
        (0..size).flat_map(move |row| (0..size).map(move |col| Position::new(row, col)))
    }

    /// Number of occupied cells
    pub fn filled_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    /// Fraction of occupied cells, `filled / size²`
    pub fn fill_fraction(&self) -> f64 {
        if self.cells.is_empty() {
            return 0.0;
        }
        self.filled_count() as f64 / self.cells.len() as f64
    }

    /// Occupied cells per colour
    pub fn color_counts(&self) -> [usize; COLORS] {
        let mut counts = [0; COLORS];
        for c in self.cells.iter().flatten() {
            counts[*c as usize] += 1;
        }
        counts
    }
}

impl TryFrom<Vec<Vec<i8>>> for Grid {
    type Error = GridError;

    fn try_from(rows: Vec<Vec<i8>>) -> Result<Self, Self::Error> {
        Self::from_rows(&rows)
    }
}

impl From<Grid> for Vec<Vec<i8>> {
    fn from(grid: Grid) -> Self {
        grid.to_rows()
    }
}

impl FromStr for Grid {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_string(s)
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.cells.chunks(self.size.max(1)).enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            for cell in row {
                let ch = match cell {
                    Some(c) => (b'A' + c) as char,
                    None => '.',
                };
                write!(f, "{}", ch)?;
            }
        }
        Ok(())
    }
}
