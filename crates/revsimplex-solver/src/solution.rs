/// The result of running the simplex method on a problem
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    /// Solution status
    pub status: SolutionStatus,
    /// Value of every variable for the final basis (empty when unavailable)
    pub values: Vec<f64>,
    /// Objective value of the final basis
    pub objective_value: f64,
    /// Number of basis changes performed
    pub pivots: usize,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolutionStatus {
    /// An optimal basis was found
    Optimal,
    /// The objective decreases without limit
    Unbounded,
    /// The basis matrix became numerically singular
    SingularBasis,
    /// The iteration cap was reached before either signal
    IterationLimit,
}

impl Solution {
    pub fn optimal(values: Vec<f64>, objective_value: f64, pivots: usize) -> Self {
        Self {
            status: SolutionStatus::Optimal,
            values,
            objective_value,
            pivots,
        }
    }

    pub fn unbounded(pivots: usize) -> Self {
        Self {
            status: SolutionStatus::Unbounded,
            values: Vec::new(),
            objective_value: f64::NEG_INFINITY,
            pivots,
        }
    }

    pub fn singular_basis(pivots: usize) -> Self {
        Self {
            status: SolutionStatus::SingularBasis,
            values: Vec::new(),
            objective_value: f64::NAN,
            pivots,
        }
    }

    pub fn iteration_limit(values: Vec<f64>, objective_value: f64, pivots: usize) -> Self {
        Self {
            status: SolutionStatus::IterationLimit,
            values,
            objective_value,
            pivots,
        }
    }

    pub fn is_optimal(&self) -> bool {
        self.status == SolutionStatus::Optimal
    }
}
