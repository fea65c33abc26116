//! Plain-text LP files for `revsimplex`: a lexer and parser for the
//! `Minimize` / `Subject To` / `Bounds` / `End` format, the conversion to a
//! [`revsimplex_solver::Problem`], and a writer that produces text the
//! parser reads back exactly.

pub mod ast;
pub mod lexer;
pub mod loader;
pub mod parser;
pub mod writer;

pub use ast::*;
pub use lexer::{Lexer, Span, Token, TokenKind};
pub use loader::{
    LpError, MAX_MATRIX_ENTRIES, MAX_VARIABLES, build_problem, load_problem, read_problem,
    save_problem,
};
pub use parser::{ParseError, Parser};
pub use writer::write_problem;
