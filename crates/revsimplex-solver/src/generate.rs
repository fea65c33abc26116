use std::ops::Range;

use nalgebra::{DMatrix, DVector};
use rand::Rng;
use tracing::debug;

use crate::problem::Problem;
use crate::simplex::{Outcome, Simplex};

/// Shape and scale of generated problems.
///
/// Degenerate values are clamped rather than rejected: `max_rows` and
/// `max_vars` below 1 act as 1, and an empty `scale_range` always yields
/// `min_scale`.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorConfig {
    /// Constraint rows are drawn from `1..=max_rows`
    pub max_rows: usize,
    /// Structural variables are drawn from `1..=max_vars`
    pub max_vars: usize,
    /// Range the coefficient scale is drawn from
    pub scale_range: Range<i32>,
    /// Scales smaller than this in magnitude are replaced by it
    pub min_scale: i32,
    /// Round every coefficient to the nearest integer
    pub round: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            max_rows: 15,
            max_vars: 17,
            scale_range: -25..475,
            min_scale: 8,
            round: false,
        }
    }
}

/// Builds random problems that start from a feasible slack basis.
///
/// The random source is always passed in, so a seeded generator reproduces
/// the same problems.
#[derive(Debug, Clone, Default)]
pub struct ProblemGenerator {
    config: GeneratorConfig,
}

impl ProblemGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Draw one problem.
    ///
    /// The matrix is `height x (width + height)` with an identity in the
    /// trailing block, the slack costs are zero, `b` is non-negative and the
    /// basis is the slack columns.
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> Problem {
        let mut scale = if self.config.scale_range.is_empty() {
            self.config.min_scale
        } else {
            rng.random_range(self.config.scale_range.clone())
        };
        if scale.abs() < self.config.min_scale {
            scale = self.config.min_scale;
        }
        let scale = f64::from(scale);
        let height = rng.random_range(1..=self.config.max_rows.max(1));
        let width = rng.random_range(1..=self.config.max_vars.max(1));
        let cols = width + height;

        let mut a = DMatrix::from_fn(height, cols, |i, j| {
            if j < width {
                rng.random_range(-1.0..=1.0) * scale
            } else if j - width == i {
                1.0
            } else {
                0.0
            }
        });
        let mut b = DVector::from_fn(height, |_, _| rng.random_range(0.0..=1.0) * scale.abs());
        let mut costs = DVector::from_fn(cols, |j, _| {
            if j < width {
                rng.random_range(-1.0..=1.0) * scale
            } else {
                0.0
            }
        });

        if self.config.round {
            a = a.map(f64::round);
            b = b.map(f64::round);
            costs = costs.map(f64::round);
        }

        let basis = (width..cols).collect();
        Problem::from_parts(a, b, costs, basis)
    }

    /// Generate problems until `solver` reaches an optimal basis on one.
    ///
    /// Returns the problem as generated (its basis untouched) and the number
    /// of attempts it took, or `None` once `max_attempts` are used up.
    pub fn find_solvable<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        solver: &Simplex,
        max_attempts: usize,
    ) -> Option<(Problem, usize)> {
        for attempt in 1..=max_attempts {
            let problem = self.generate(rng);
            let mut trial = problem.clone();
            match solver.run(&mut trial) {
                Outcome::Optimal { .. } => {
                    debug!(attempt, rows = problem.num_rows(), vars = problem.num_vars(), "found solvable problem");
                    return Some((problem, attempt));
                }
                outcome => debug!(attempt, ?outcome, "discarding random problem"),
            }
        }
        None
    }
}
