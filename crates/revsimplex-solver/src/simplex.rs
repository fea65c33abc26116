use nalgebra::{DMatrix, DVector};
use tracing::{debug, info, trace, warn};

use crate::error::SingularBasis;
use crate::linalg::{arg_min, complement_indices, select, select_cols};
use crate::problem::{Pivot, Problem, format_row};
use crate::solution::Solution;

pub const DEFAULT_MAX_ITERATIONS: usize = 1000;
pub const DEFAULT_SINGULARITY_THRESHOLD: f64 = 1e-4;

/// Revised simplex solver for problems that come with a feasible basis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Simplex {
    /// Iterations before giving up
    max_iterations: usize,
    /// `|det(B)|` below this is treated as a singular basis
    singularity_threshold: f64,
}

impl Default for Simplex {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            singularity_threshold: DEFAULT_SINGULARITY_THRESHOLD,
        }
    }
}

/// Result of a single iteration
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step {
    /// A pivot was taken; `objective` is the value of the basis before it
    Continue { objective: f64, pivot: Pivot },
    /// Every non-basic reduced cost is non-negative
    Optimal { objective: f64 },
    /// The entering column has no positive ratio in any row
    Unbounded { entering: usize },
    SingularBasis { determinant: f64 },
}

/// How [`Simplex::run`] stopped. `pivots` counts the basis changes made.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Outcome {
    Optimal { objective: f64, pivots: usize },
    Unbounded { entering: usize, pivots: usize },
    SingularBasis { determinant: f64, pivots: usize },
    /// The iteration cap was hit; `objective` is the last one computed
    IterationLimit { objective: f64, pivots: usize },
}

/// Everything one iteration derives from the current basis
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    /// B⁻¹
    pub inverse_basis: DMatrix<f64>,
    /// y = c_Bᵗ B⁻¹
    pub multipliers: DVector<f64>,
    /// c − Aᵗy
    pub reduced_costs: DVector<f64>,
    /// B⁻¹b
    pub transformed_b: DVector<f64>,
    /// B⁻¹A
    pub transformed_a: DMatrix<f64>,
    /// yᵗb
    pub objective: f64,
}

impl Evaluation {
    /// Decide what the iteration does without touching the problem.
    pub fn step(&self, basis: &[usize]) -> Step {
        if is_optimal(&self.reduced_costs, basis) {
            return Step::Optimal { objective: self.objective };
        }

        let column = pivot_column(&self.reduced_costs, basis);
        match pivot_row(&self.transformed_a, &self.transformed_b, column) {
            Some(row) => Step::Continue {
                objective: self.objective,
                pivot: Pivot { row, column },
            },
            None => Step::Unbounded { entering: column },
        }
    }
}

impl Simplex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn with_singularity_threshold(mut self, threshold: f64) -> Self {
        self.singularity_threshold = threshold;
        self
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    pub fn singularity_threshold(&self) -> f64 {
        self.singularity_threshold
    }

    /// Compute B⁻¹, the multipliers, reduced costs and transformed data for
    /// the current basis. Nothing is cached between calls.
    pub fn evaluate(&self, problem: &Problem) -> Result<Evaluation, SingularBasis> {
        let a = problem.a();
        let b = problem.b();
        let costs = problem.costs();
        let basis = problem.basis();

        let inverse_basis = inverse_basis_matrix(a, basis, self.singularity_threshold)?;
        let multipliers = simplex_multipliers(&inverse_basis, costs, basis);

        let reduced_costs = costs - a.transpose() * &multipliers;
        let transformed_b = &inverse_basis * b;
        let transformed_a = &inverse_basis * a;
        let objective = multipliers.dot(b);

        Ok(Evaluation {
            inverse_basis,
            multipliers,
            reduced_costs,
            transformed_b,
            transformed_a,
            objective,
        })
    }

    /// Run one iteration. Only a `Continue` step changes the basis.
    pub fn iterate(&self, problem: &mut Problem) -> Step {
        let evaluation = match self.evaluate(problem) {
            Ok(evaluation) => evaluation,
            Err(SingularBasis { determinant }) => {
                return Step::SingularBasis { determinant };
            }
        };

        trace!("B-1   = {}", evaluation.inverse_basis);
        trace!("B-1*A = {}", evaluation.transformed_a);
        trace!("mults = {}", format_row(evaluation.multipliers.as_slice()));
        trace!("new_c = {}", format_row(evaluation.reduced_costs.as_slice()));
        trace!("new_b = {}", format_row(evaluation.transformed_b.as_slice()));

        let step = evaluation.step(problem.basis());
        if let Step::Continue { pivot, .. } = step {
            match problem.apply_pivot(pivot) {
                Ok(()) => {
                    debug!(row = pivot.row, column = pivot.column, basis = ?problem.basis(), "pivot")
                }
                Err(error) => warn!(%error, "pivot rejected, basis unchanged"),
            }
        }
        step
    }

    /// Iterate until the basis is optimal, the problem turns out unbounded,
    /// the basis becomes singular, or `max_iterations` is reached.
    pub fn run(&self, problem: &mut Problem) -> Outcome {
        let mut objective = f64::INFINITY;
        let mut pivots = 0;

        for iteration in 0..self.max_iterations {
            match self.iterate(problem) {
                Step::Continue { objective: value, .. } => {
                    objective = value;
                    pivots += 1;
                    debug!(iteration, objective, "iteration");
                }
                Step::Optimal { objective } => {
                    info!(objective, pivots, "optimal basis reached");
                    return Outcome::Optimal { objective, pivots };
                }
                Step::Unbounded { entering } => {
                    info!(entering, pivots, "problem is unbounded");
                    return Outcome::Unbounded { entering, pivots };
                }
                Step::SingularBasis { determinant } => {
                    warn!(determinant, pivots, "basis matrix is singular");
                    return Outcome::SingularBasis { determinant, pivots };
                }
            }
        }

        warn!(max_iterations = self.max_iterations, objective, "iteration limit reached");
        Outcome::IterationLimit { objective, pivots }
    }

    /// Full decision vector of the current basis: `B⁻¹b` at the basic
    /// positions, zero elsewhere.
    pub fn solution_vector(&self, problem: &Problem) -> Result<DVector<f64>, SingularBasis> {
        let inverse_basis =
            inverse_basis_matrix(problem.a(), problem.basis(), self.singularity_threshold)?;
        let values = inverse_basis * problem.b();

        let mut x = DVector::zeros(problem.num_vars());
        for (row, &var) in problem.basis().iter().enumerate() {
            x[var] = values[row];
        }
        Ok(x)
    }

    /// Run the simplex method and package the outcome as a [`Solution`]
    pub fn solve(&self, problem: &mut Problem) -> Solution {
        match self.run(problem) {
            Outcome::Optimal { objective, pivots } => {
                Solution::optimal(self.values(problem), objective, pivots)
            }
            Outcome::Unbounded { pivots, .. } => Solution::unbounded(pivots),
            Outcome::SingularBasis { pivots, .. } => Solution::singular_basis(pivots),
            Outcome::IterationLimit { objective, pivots } => {
                Solution::iteration_limit(self.values(problem), objective, pivots)
            }
        }
    }

    fn values(&self, problem: &Problem) -> Vec<f64> {
        self.solution_vector(problem)
            .map(|x| x.as_slice().to_vec())
            .unwrap_or_default()
    }
}

/// Invert the basis matrix, the columns of `a` named by `basis`.
pub fn inverse_basis_matrix(
    a: &DMatrix<f64>,
    basis: &[usize],
    threshold: f64,
) -> Result<DMatrix<f64>, SingularBasis> {
    let basis_matrix = select_cols(a, basis);
    let determinant = basis_matrix.determinant();
    if determinant.is_nan() || determinant.abs() < threshold {
        return Err(SingularBasis { determinant });
    }
    basis_matrix.try_inverse().ok_or(SingularBasis { determinant })
}

/// y = c_Bᵗ B⁻¹, returned as a column vector
pub fn simplex_multipliers(
    inverse_basis: &DMatrix<f64>,
    costs: &DVector<f64>,
    basis: &[usize],
) -> DVector<f64> {
    let basic_costs = select(costs, basis);
    inverse_basis.transpose() * basic_costs
}

/// True when no non-basic reduced cost is negative
pub fn is_optimal(reduced_costs: &DVector<f64>, basis: &[usize]) -> bool {
    complement_indices(basis, reduced_costs.len())
        .into_iter()
        .all(|j| reduced_costs[j] >= 0.0)
}

/// Entering variable by Dantzig's rule: the most negative non-basic reduced
/// cost, lowest index on ties.
///
/// Panics if every variable is basic.
pub fn pivot_column(reduced_costs: &DVector<f64>, basis: &[usize]) -> usize {
    let non_basic = complement_indices(basis, reduced_costs.len());
    let candidates = select(reduced_costs, &non_basic);
    non_basic[arg_min(candidates.as_slice())]
}

/// Leaving row by the minimum ratio test on `column`.
///
/// Rows whose coefficient or ratio is not positive can never bind and are
/// skipped. Returns `None` when no row is left, i.e. the problem is
/// unbounded along the entering direction.
pub fn pivot_row(a_prime: &DMatrix<f64>, b_prime: &DVector<f64>, column: usize) -> Option<usize> {
    let ratios: Vec<f64> = (0..b_prime.len())
        .map(|i| {
            let coefficient = a_prime[(i, column)];
            let ratio = b_prime[i] / coefficient;
            if coefficient > 0.0 && ratio > 0.0 {
                ratio
            } else {
                f64::INFINITY
            }
        })
        .collect();

    if ratios.is_empty() {
        return None;
    }
    let row = arg_min(&ratios);
    if ratios[row].is_infinite() { None } else { Some(row) }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// min -2x1 - 3x2 s.t. x1 + x2 <= 4, x1 + 2x2 <= 6 with slacks x3, x4
    fn two_constraints() -> Problem {
        let a = DMatrix::from_row_slice(2, 4, &[1.0, 1.0, 1.0, 0.0, 1.0, 2.0, 0.0, 1.0]);
        let b = DVector::from_vec(vec![4.0, 6.0]);
        let costs = DVector::from_vec(vec![-2.0, -3.0, 0.0, 0.0]);
        Problem::with_slack_basis(a, b, costs).unwrap()
    }

    #[test]
    fn test_two_pivots_to_optimum() {
        let mut problem = two_constraints();
        let solver = Simplex::new();

        let first = solver.iterate(&mut problem);
        assert_eq!(
            first,
            Step::Continue { objective: 0.0, pivot: Pivot { row: 1, column: 1 } }
        );
        assert_eq!(problem.basis(), &[2, 1]);

        let second = solver.iterate(&mut problem);
        match second {
            Step::Continue { objective, pivot } => {
                assert!((objective + 9.0).abs() < 1e-9, "obj = {} (expected -9)", objective);
                assert_eq!(pivot, Pivot { row: 0, column: 0 });
            }
            other => panic!("expected a pivot, got {:?}", other),
        }
        assert_eq!(problem.basis(), &[0, 1]);

        match solver.iterate(&mut problem) {
            Step::Optimal { objective } => {
                assert!((objective + 10.0).abs() < 1e-9, "obj = {} (expected -10)", objective);
            }
            other => panic!("expected optimality, got {:?}", other),
        }
        assert_eq!(problem.basis(), &[0, 1]);
    }

    #[test]
    fn test_run_reports_pivot_count() {
        let mut problem = two_constraints();
        let outcome = Simplex::new().run(&mut problem);

        match outcome {
            Outcome::Optimal { objective, pivots } => {
                assert!((objective + 10.0).abs() < 1e-9, "obj = {} (expected -10)", objective);
                assert_eq!(pivots, 2);
            }
            other => panic!("expected optimality, got {:?}", other),
        }

        let x = Simplex::new().solution_vector(&problem).unwrap();
        assert!((x[0] - 2.0).abs() < 1e-9, "x1 = {} (expected 2)", x[0]);
        assert!((x[1] - 2.0).abs() < 1e-9, "x2 = {} (expected 2)", x[1]);
        assert!(x[2].abs() < 1e-9 && x[3].abs() < 1e-9);
    }

    #[test]
    fn test_solve_fills_solution() {
        let mut problem = two_constraints();
        let solution = Simplex::new().solve(&mut problem);

        assert_eq!(solution.status, crate::SolutionStatus::Optimal);
        assert_eq!(solution.values.len(), 4);
        assert!((solution.objective_value + 10.0).abs() < 1e-9);
        assert_eq!(solution.pivots, 2);
    }

    #[test]
    fn test_unbounded_entering_column() {
        // min -x1 s.t. -x1 + x2 <= 1
        let a = DMatrix::from_row_slice(1, 2, &[-1.0, 1.0]);
        let b = DVector::from_vec(vec![1.0]);
        let costs = DVector::from_vec(vec![-1.0, 0.0]);
        let mut problem = Problem::with_slack_basis(a, b, costs).unwrap();

        let solver = Simplex::new();
        assert_eq!(solver.iterate(&mut problem), Step::Unbounded { entering: 0 });
        assert_eq!(problem.basis(), &[1]);
        assert_eq!(
            solver.run(&mut problem),
            Outcome::Unbounded { entering: 0, pivots: 0 }
        );
    }

    #[test]
    fn test_already_optimal_keeps_basis() {
        let a = DMatrix::from_row_slice(2, 4, &[1.0, 1.0, 1.0, 0.0, 1.0, 2.0, 0.0, 1.0]);
        let b = DVector::from_vec(vec![4.0, 6.0]);
        let costs = DVector::from_vec(vec![1.0, 1.0, 0.0, 0.0]);
        let mut problem = Problem::with_slack_basis(a, b, costs).unwrap();

        let outcome = Simplex::new().run(&mut problem);
        assert_eq!(outcome, Outcome::Optimal { objective: 0.0, pivots: 0 });
        assert_eq!(problem.basis(), &[2, 3]);
    }

    #[test]
    fn test_singular_basis_is_reported() {
        let a = DMatrix::from_row_slice(2, 3, &[1.0, 2.0, 0.0, 2.0, 4.0, 1.0]);
        let b = DVector::from_vec(vec![1.0, 1.0]);
        let costs = DVector::from_vec(vec![-1.0, -1.0, 0.0]);
        let mut problem = Problem::new(a, b, costs, vec![0, 1]).unwrap();

        let solver = Simplex::new();
        match solver.iterate(&mut problem) {
            Step::SingularBasis { determinant } => assert!(determinant.abs() < 1e-4),
            other => panic!("expected a singular basis, got {:?}", other),
        }
        assert!(solver.solution_vector(&problem).is_err());
        assert_eq!(problem.basis(), &[0, 1]);
    }

    #[test]
    fn test_iteration_limit_returns_last_objective() {
        let mut problem = two_constraints();
        let outcome = Simplex::new().with_max_iterations(1).run(&mut problem);
        assert_eq!(outcome, Outcome::IterationLimit { objective: 0.0, pivots: 1 });

        let solution = Simplex::new().with_max_iterations(1).solve(&mut two_constraints());
        assert_eq!(solution.status, crate::SolutionStatus::IterationLimit);
        let expected = [0.0, 3.0, 1.0, 0.0];
        assert_eq!(solution.values.len(), expected.len());
        for (value, want) in solution.values.iter().zip(expected) {
            assert!((value - want).abs() < 1e-9, "values = {:?}", solution.values);
        }
    }

    #[test]
    fn test_threshold_is_configurable() {
        // det(B) = 0.5 * 0.5 = 0.25
        let a = DMatrix::from_row_slice(2, 2, &[0.5, 0.0, 0.0, 0.5]);
        let b = DVector::from_vec(vec![1.0, 1.0]);
        let costs = DVector::from_vec(vec![0.0, 0.0]);
        let problem = Problem::with_slack_basis(a, b, costs).unwrap();

        assert!(Simplex::new().evaluate(&problem).is_ok());
        assert_eq!(
            Simplex::new().with_singularity_threshold(0.5).evaluate(&problem),
            Err(SingularBasis { determinant: 0.25 })
        );
    }

    #[test]
    fn test_pivot_column_tie_break() {
        let reduced = DVector::from_vec(vec![0.0, -4.0, 1.0, -4.0, -4.0]);
        // Variable 1 is basic, so the first eligible minimum is variable 3
        assert_eq!(pivot_column(&reduced, &[1, 2]), 3);
        assert_eq!(pivot_column(&reduced, &[0, 2]), 1);
    }

    #[test]
    fn test_pivot_row_skips_non_positive_rows() {
        let a_prime = DMatrix::from_row_slice(4, 1, &[-1.0, 0.0, 2.0, 4.0]);
        let b_prime = DVector::from_vec(vec![-1.0, 0.0, 8.0, 16.0]);
        // Row 0 has ratio 1 but a negative coefficient; rows 2 and 3 tie at 4
        assert_eq!(pivot_row(&a_prime, &b_prime, 0), Some(2));

        let degenerate = DVector::from_vec(vec![1.0, 1.0, 0.0, 0.0]);
        assert_eq!(pivot_row(&a_prime, &degenerate, 0), None);
    }

    #[test]
    fn test_multipliers_and_reduced_costs() {
        let mut problem = two_constraints();
        problem.apply_pivot(Pivot { row: 1, column: 1 }).unwrap();
        let evaluation = Simplex::new().evaluate(&problem).unwrap();

        assert!((evaluation.multipliers[0]).abs() < 1e-12);
        assert!((evaluation.multipliers[1] + 1.5).abs() < 1e-12);
        assert!((evaluation.reduced_costs[0] + 0.5).abs() < 1e-12);
        assert!((evaluation.reduced_costs[3] - 1.5).abs() < 1e-12);
        assert!((evaluation.transformed_b[0] - 1.0).abs() < 1e-12);
        assert!((evaluation.transformed_b[1] - 3.0).abs() < 1e-12);
    }
}
