use std::fmt;

use nalgebra::{DMatrix, DVector};

use crate::error::ProblemError;
use crate::linalg::complement_indices;

/// A standard-form linear program: minimize `costs · x` subject to
/// `a x <= b`, `x >= 0`, together with the current basis.
///
/// `a`, `b` and `costs` never change after construction. The basis only
/// moves through [`Problem::apply_pivot`].
#[derive(Debug, Clone, PartialEq)]
pub struct Problem {
    a: DMatrix<f64>,
    b: DVector<f64>,
    costs: DVector<f64>,
    basic_vars: Vec<usize>,
}

/// Row of the leaving variable and column of the entering one
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pivot {
    pub row: usize,
    pub column: usize,
}

impl Problem {
    /// Build a problem from explicit data.
    ///
    /// Only shapes and basis indices are checked. Whether the basis matrix is
    /// invertible, or the basic solution feasible, is left to the solver.
    pub fn new(
        a: DMatrix<f64>,
        b: DVector<f64>,
        costs: DVector<f64>,
        basic_vars: Vec<usize>,
    ) -> Result<Self, ProblemError> {
        let (rows, cols) = a.shape();
        if b.len() != rows {
            return Err(ProblemError::RhsLength { expected: rows, found: b.len() });
        }
        if costs.len() != cols {
            return Err(ProblemError::CostLength { expected: cols, found: costs.len() });
        }
        if cols < rows {
            return Err(ProblemError::TooFewColumns { rows, cols });
        }
        if basic_vars.len() != rows {
            return Err(ProblemError::BasisLength { expected: rows, found: basic_vars.len() });
        }
        for (k, &index) in basic_vars.iter().enumerate() {
            if index >= cols {
                return Err(ProblemError::BasisOutOfRange { index, cols });
            }
            if basic_vars[..k].contains(&index) {
                return Err(ProblemError::DuplicateBasisIndex(index));
            }
        }

        Ok(Self::from_parts(a, b, costs, basic_vars))
    }

    /// Assemble a problem whose shapes the caller already guarantees
    pub(crate) fn from_parts(
        a: DMatrix<f64>,
        b: DVector<f64>,
        costs: DVector<f64>,
        basic_vars: Vec<usize>,
    ) -> Self {
        Self { a, b, costs, basic_vars }
    }

    /// Build a problem whose starting basis is the trailing `m` columns,
    /// i.e. the slack block of a matrix that ends in an identity.
    pub fn with_slack_basis(
        a: DMatrix<f64>,
        b: DVector<f64>,
        costs: DVector<f64>,
    ) -> Result<Self, ProblemError> {
        let (rows, cols) = a.shape();
        if cols < rows {
            return Err(ProblemError::TooFewColumns { rows, cols });
        }
        let basis = (cols - rows..cols).collect();
        Self::new(a, b, costs, basis)
    }

    pub fn a(&self) -> &DMatrix<f64> {
        &self.a
    }

    pub fn b(&self) -> &DVector<f64> {
        &self.b
    }

    pub fn costs(&self) -> &DVector<f64> {
        &self.costs
    }

    /// Current basis, in basis-row order
    pub fn basis(&self) -> &[usize] {
        &self.basic_vars
    }

    pub fn num_rows(&self) -> usize {
        self.a.nrows()
    }

    pub fn num_vars(&self) -> usize {
        self.a.ncols()
    }

    /// Non-basic variables in ascending order
    pub fn non_basic(&self) -> Vec<usize> {
        complement_indices(&self.basic_vars, self.num_vars())
    }

    /// Replace the basic variable of `pivot.row` with `pivot.column`.
    ///
    /// The entering column must be an in-range non-basic variable; the basis
    /// is left untouched when the pivot is rejected.
    pub fn apply_pivot(&mut self, pivot: Pivot) -> Result<(), ProblemError> {
        let rows = self.basic_vars.len();
        if pivot.row >= rows {
            return Err(ProblemError::PivotRowOutOfRange { row: pivot.row, rows });
        }
        if pivot.column >= self.num_vars() {
            return Err(ProblemError::BasisOutOfRange {
                index: pivot.column,
                cols: self.num_vars(),
            });
        }
        if self.basic_vars.contains(&pivot.column) {
            return Err(ProblemError::DuplicateBasisIndex(pivot.column));
        }
        self.basic_vars[pivot.row] = pivot.column;
        Ok(())
    }
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "A     = {}", self.a)?;
        writeln!(f, "b     = {}", format_row(self.b.as_slice()))?;
        writeln!(f, "costs = {}", format_row(self.costs.as_slice()))?;
        let basis: Vec<String> = self.basic_vars.iter().map(|i| i.to_string()).collect();
        write!(f, "basis = [{}]", basis.join(" "))
    }
}

/// `[v0 v1 ...]` on a single line
pub fn format_row(values: &[f64]) -> String {
    let parts: Vec<String> = values.iter().map(|v| v.to_string()).collect();
    format!("[{}]", parts.join(" "))
}
