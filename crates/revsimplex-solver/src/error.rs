use thiserror::Error;

/// Shape or basis problems detected while building or pivoting a
/// [`crate::Problem`]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProblemError {
    #[error("right-hand side has {found} entries but the matrix has {expected} rows")]
    RhsLength { expected: usize, found: usize },
    #[error("cost vector has {found} entries but the matrix has {expected} columns")]
    CostLength { expected: usize, found: usize },
    #[error("basis has {found} entries but the matrix has {expected} rows")]
    BasisLength { expected: usize, found: usize },
    #[error("matrix has {rows} rows but only {cols} columns")]
    TooFewColumns { rows: usize, cols: usize },
    #[error("basis index {index} is out of range for {cols} columns")]
    BasisOutOfRange { index: usize, cols: usize },
    #[error("basis index {0} appears more than once")]
    DuplicateBasisIndex(usize),
    #[error("pivot row {row} is out of range for {rows} basis rows")]
    PivotRowOutOfRange { row: usize, rows: usize },
}

/// The basis matrix could not be inverted
#[derive(Error, Debug, Clone, Copy, PartialEq)]
#[error("basis matrix is numerically singular (|det| = {determinant:e})")]
pub struct SingularBasis {
    pub determinant: f64,
}
