//! Revised simplex method for dense linear programs in standard form:
//! minimize `cᵗx` subject to `Ax <= b`, `x >= 0`, starting from a basis the
//! caller provides.

pub mod generate;
pub mod linalg;
mod error;
mod problem;
mod simplex;
mod solution;

pub use error::{ProblemError, SingularBasis};
pub use generate::{GeneratorConfig, ProblemGenerator};
pub use problem::{Pivot, Problem, format_row};
pub use simplex::{
    DEFAULT_MAX_ITERATIONS, DEFAULT_SINGULARITY_THRESHOLD, Evaluation, Outcome, Simplex, Step,
    inverse_basis_matrix, is_optimal, pivot_column, pivot_row, simplex_multipliers,
};
pub use solution::{Solution, SolutionStatus};
