use crate::{Goal, Grid, LevelAttempt, LevelParams, Solver, SolverConfig, COLORS};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Configuration for level generation
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Random boards tried before falling back
    pub max_attempts: usize,
    /// Candidate goals tested against each board
    pub goals_per_attempt: usize,
    /// Report progress every this many failed attempts
    pub progress_every: usize,
    /// Pop-total target of the fallback goal
    pub fallback_target: u32,
    /// Solver used to prove candidates
    pub solver: SolverConfig,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            max_attempts: 120,
            goals_per_attempt: 6,
            progress_every: 10,
            fallback_target: 10,
            solver: SolverConfig::default(),
        }
    }
}

/// Periodic report from a long generation run; hosts can redraw or yield
/// when they receive one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationProgress {
    pub level: u32,
    pub attempt: usize,
    pub max_attempts: usize,
}

/// Level generator: samples boards and goals until the solver proves a pair
/// winnable.
pub struct Generator {
    config: GeneratorConfig,
    solver: Solver,
    rng: StdRng,
}

impl Default for Generator {
    fn default() -> Self {
        Self::new()
    }
}

impl Generator {
    /// Create a generator seeded from OS entropy
    pub fn new() -> Self {
        Self::with_config(GeneratorConfig::default())
    }

    /// Create a generator with custom configuration
    pub fn with_config(config: GeneratorConfig) -> Self {
        Self::build(config, StdRng::from_entropy())
    }

    /// Create a generator with a specific seed for reproducibility
    pub fn with_seed(seed: u64) -> Self {
        Self::build(GeneratorConfig::default(), StdRng::seed_from_u64(seed))
    }

    pub fn with_config_and_seed(config: GeneratorConfig, seed: u64) -> Self {
        Self::build(config, StdRng::seed_from_u64(seed))
    }

    fn build(config: GeneratorConfig, rng: StdRng) -> Self {
        let solver = Solver::with_config(config.solver.clone());
        Self { config, solver, rng }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn solver(&self) -> &Solver {
        &self.solver
    }

    /// Generate a provably solvable level, or a fallback level when the
    /// attempt budget runs out.
    pub fn generate_level(&mut self, level: u32) -> LevelAttempt {
        self.generate_level_with_progress(level, |_| {})
    }

    pub fn generate_level_with_progress<F>(&mut self, level: u32, on_progress: F) -> LevelAttempt
    where
        F: FnMut(GenerationProgress),
    {
        let params = LevelParams::for_level(level, &mut self.rng);
        let candidates = params.goal_templates();
        self.generate_with(&params, &candidates, on_progress)
    }

    /// Generation loop over explicit parameters and candidate goals.
    ///
    /// Always returns within `max_attempts` boards.
    pub fn generate_with<F>(
        &mut self,
        params: &LevelParams,
        candidates: &[Goal],
        mut on_progress: F,
    ) -> LevelAttempt
    where
        F: FnMut(GenerationProgress),
    {
        let max_attempts = self.config.max_attempts;
        let mut last_board = None;

        for attempt in 1..=max_attempts {
            let board = self.random_board(params.size, params.fill);
            let picked: Vec<Goal> = candidates
                .choose_multiple(&mut self.rng, self.config.goals_per_attempt)
                .cloned()
                .collect();

            for goal in picked {
                if let Some(solution) = self.solver.solve(&board, &goal, params.moves) {
                    return LevelAttempt {
                        level: params.level,
                        grid: board,
                        goal,
                        moves: params.moves,
                        solution: Some(solution),
                        fallback: false,
                    };
                }
            }

            last_board = Some(board);
            if self.config.progress_every > 0 && attempt % self.config.progress_every == 0 {
                on_progress(GenerationProgress {
                    level: params.level,
                    attempt,
                    max_attempts,
                });
            }
        }

        let grid = match last_board {
            Some(board) => board,
            None => self.random_board(params.size, params.fill),
        };
        LevelAttempt {
            level: params.level,
            grid,
            goal: Goal::pop_total(self.config.fallback_target),
            moves: params.moves,
            solution: None,
            fallback: true,
        }
    }

    /// Random board where each cell is occupied with probability `fill`
    pub fn random_board(&mut self, size: usize, fill: f64) -> Grid {
        let mut grid = Grid::new(size);
        let fill = fill.clamp(0.0, 1.0);
        let positions: Vec<_> = grid.positions().collect();
        for pos in positions {
            if self.rng.gen_bool(fill) {
                grid.set(pos, Some(self.rng.gen_range(0..COLORS as u8)));
            }
        }
        grid
    }
}
