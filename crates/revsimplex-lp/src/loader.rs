use std::fs;
use std::path::{Path, PathBuf};

use nalgebra::{DMatrix, DVector};
use revsimplex_solver::{Problem, ProblemError};
use thiserror::Error;

use crate::ast::LpFile;
use crate::parser::{ParseError, Parser};
use crate::writer::write_problem;

/// Largest number of columns a file may describe
pub const MAX_VARIABLES: usize = 1_000_000;

/// Largest number of coefficients in the dense constraint matrix
pub const MAX_MATRIX_ENTRIES: usize = 100_000_000;

#[derive(Error, Debug)]
pub enum LpError {
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),
    #[error("Invalid problem: {0}")]
    Problem(#[from] ProblemError),
    #[error("The 'Subject To' section has no constraints")]
    NoConstraints,
    #[error("Problem too large: {rows} constraints over {vars} variables")]
    TooLarge { rows: usize, vars: usize },
    #[error("Failed to read {}: {}", .path.display(), .source)]
    Read { path: PathBuf, source: std::io::Error },
    #[error("Failed to write {}: {}", .path.display(), .source)]
    Write { path: PathBuf, source: std::io::Error },
}

/// Turn a parsed file into a [`Problem`].
///
/// Columns run up to the highest variable mentioned, missing coefficients
/// are zero, and the starting basis is the trailing `m` columns. No slack
/// columns are added: the file is expected to carry its own identity block.
///
/// Files naming more than [`MAX_VARIABLES`] columns, or whose matrix would
/// hold more than [`MAX_MATRIX_ENTRIES`] coefficients, are rejected before
/// anything is allocated.
pub fn build_problem(file: &LpFile) -> Result<Problem, LpError> {
    let m = file.constraints.len();
    if m == 0 {
        return Err(LpError::NoConstraints);
    }
    let n = file.num_vars();
    let too_large = LpError::TooLarge { rows: m, vars: n };
    if n > MAX_VARIABLES {
        return Err(too_large);
    }
    match m.checked_mul(n) {
        Some(entries) if entries <= MAX_MATRIX_ENTRIES => {}
        _ => return Err(too_large),
    }

    let mut a = DMatrix::<f64>::zeros(m, n);
    for (i, constraint) in file.constraints.iter().enumerate() {
        for term in &constraint.terms {
            a[(i, term.variable)] += term.coefficient;
        }
    }
    let b = DVector::from_iterator(m, file.constraints.iter().map(|c| c.rhs));

    let mut costs = DVector::<f64>::zeros(n);
    for term in &file.objective.terms {
        costs[term.variable] += term.coefficient;
    }

    Ok(Problem::with_slack_basis(a, b, costs)?)
}

/// Parse LP text and build the problem it describes
pub fn load_problem(source: &str) -> Result<Problem, LpError> {
    let file = Parser::parse(source)?;
    build_problem(&file)
}

pub fn read_problem(path: impl AsRef<Path>) -> Result<Problem, LpError> {
    let path = path.as_ref();
    let source = fs::read_to_string(path).map_err(|source| LpError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    load_problem(&source)
}

pub fn save_problem(path: impl AsRef<Path>, problem: &Problem) -> Result<(), LpError> {
    let path = path.as_ref();
    fs::write(path, write_problem(problem)).map_err(|source| LpError::Write {
        path: path.to_path_buf(),
        source,
    })
}
