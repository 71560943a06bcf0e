//! One Move Left puzzle engine.
//!
//! A square board of coloured tiles is shifted in one of four directions.
//! Tiles slide until blocked, 4-connected groups of three or more tiles of one
//! colour pop, and the board keeps sliding in the move's direction until no
//! more groups form. Each level carries a goal and a move budget; the
//! [`Generator`] only hands out levels the [`Solver`] has proven winnable.
//!
//! Nothing in this crate performs I/O. Hosts drive a [`Session`], read its
//! state, and drain its [`GameEvent`]s.

mod chain;
mod cluster;
mod direction;
mod generator;
mod goal;
mod grid;
mod level;
mod session;
mod shift;
mod snapshot;
mod solver;

pub use chain::{resolve_chain, resolve_chain_with_limit, ChainOutcome, MAX_CHAIN_STEPS};
pub use cluster::{find_clusters, Cluster};
pub use direction::{Direction, ParseDirectionError};
pub use generator::{GenerationProgress, Generator, GeneratorConfig};
pub use goal::{ColorQuota, Goal};
pub use grid::{Grid, GridError, Position};
pub use level::{LevelAttempt, LevelParams};
pub use session::{GameEvent, Hint, MoveError, MoveOutcome, Session, Status};
pub use shift::shift;
pub use snapshot::{SavedState, SnapshotError, SNAPSHOT_VERSION};
pub use solver::{is_solvable, verify_solution, SolveStats, Solver, SolverConfig};

/// Number of tile colours on the palette.
pub const COLORS: usize = 5;

/// Smallest group of same-coloured tiles that pops.
pub const MIN_CLUSTER: usize = 3;

/// Display names, indexed by colour.
pub const COLOR_NAMES: [&str; COLORS] = ["Cyan", "Purple", "Green", "Yellow", "Red"];

/// Display symbols, indexed by colour.
pub const SYMBOLS: [&str; COLORS] = ["◆", "✦", "▲", "●", "✖"];
