use crate::lexer::Span;

/// A parsed LP file
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct LpFile {
    pub objective: Objective,
    pub constraints: Vec<Constraint>,
    pub bounds: Vec<Bound>,
}

/// The `Minimize` row
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Objective {
    pub span: Span,
    pub label: Option<String>,
    pub terms: Vec<Term>,
}

/// One `terms <= rhs` row of the `Subject To` section
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    pub span: Span,
    pub label: Option<String>,
    pub terms: Vec<Term>,
    pub rhs: f64,
}

/// `coefficient x<k>`; `variable` is the zero-based column, `k - 1`
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Term {
    pub span: Span,
    pub coefficient: f64,
    pub variable: usize,
}

/// `x<k> >= lower` from the `Bounds` section
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Bound {
    pub span: Span,
    pub variable: usize,
    pub lower: f64,
}

impl LpFile {
    /// Number of columns: one past the highest variable mentioned anywhere
    pub fn num_vars(&self) -> usize {
        let objective = self.objective.terms.iter().map(|t| t.variable);
        let constraints = self.constraints.iter().flat_map(|c| c.terms.iter().map(|t| t.variable));
        let bounds = self.bounds.iter().map(|b| b.variable);
        objective
            .chain(constraints)
            .chain(bounds)
            .max()
            .map_or(0, |highest| highest + 1)
    }
}
