use crate::ast::*;
use crate::lexer::{Lexer, Span, Token, TokenKind};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Unexpected token: expected {expected}, found {found} at position {span:?}")]
    UnexpectedToken {
        expected: String,
        found: String,
        span: Span,
    },
    #[error("Unexpected end of file")]
    UnexpectedEof,
    #[error("Invalid number: {0}")]
    InvalidNumber(String),
    #[error("Invalid variable '{name}' at position {span:?}: expected x1, x2, ...")]
    InvalidVariable { name: String, span: Span },
    #[error("Unsupported bound on {name} at position {span:?}: only '>= 0' is allowed")]
    UnsupportedBound { name: String, span: Span },
}

/// Line-oriented parser for the LP format.
///
/// Newlines are significant inside a row, so only blank lines and comments
/// between rows are skipped.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    pub fn parse(source: &str) -> Result<LpFile, ParseError> {
        let tokens = Lexer::tokenize(source);
        let mut parser = Parser::new(tokens);
        parser.parse_file()
    }

    fn current(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> TokenKind {
        self.current().map(|t| t.kind).unwrap_or(TokenKind::Eof)
    }

    fn peek_kind_at(&self, offset: usize) -> TokenKind {
        self.tokens
            .get(self.pos + offset)
            .map(|t| t.kind)
            .unwrap_or(TokenKind::Eof)
    }

    fn advance(&mut self) -> Option<&Token> {
        let token = self.tokens.get(self.pos);
        self.pos += 1;
        token
    }

    fn skip_blank_lines(&mut self) {
        while matches!(self.peek_kind(), TokenKind::Newline | TokenKind::Comment) {
            self.advance();
        }
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        match self.current() {
            Some(t) if t.kind != TokenKind::Eof => ParseError::UnexpectedToken {
                expected: expected.to_string(),
                found: if t.text.is_empty() {
                    format!("{:?}", t.kind)
                } else {
                    format!("'{}'", t.text)
                },
                span: t.span,
            },
            _ => ParseError::UnexpectedEof,
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
        match self.current().cloned() {
            Some(t) if t.kind == kind => {
                self.advance();
                Ok(t)
            }
            _ => Err(self.unexpected(&format!("{:?}", kind))),
        }
    }

    /// True when the current token is the section keyword `name` and not the
    /// label of a row that happens to share its spelling.
    fn at_section(&self, name: &str) -> bool {
        matches!(self.current(), Some(t) if t.kind == TokenKind::Ident && t.text == name)
            && self.peek_kind_at(1) != TokenKind::Colon
    }

    fn expect_keyword(&mut self, name: &str) -> Result<(), ParseError> {
        if self.at_section(name) {
            self.advance();
            Ok(())
        } else {
            Err(self.unexpected(name))
        }
    }

    /// Consume the end of a row: an optional comment, then a newline or EOF
    fn expect_line_end(&mut self) -> Result<(), ParseError> {
        if self.peek_kind() == TokenKind::Comment {
            self.advance();
        }
        match self.peek_kind() {
            TokenKind::Newline => {
                self.advance();
                Ok(())
            }
            TokenKind::Eof => Ok(()),
            _ => Err(self.unexpected("end of line")),
        }
    }

    fn parse_file(&mut self) -> Result<LpFile, ParseError> {
        self.skip_blank_lines();
        self.expect_keyword("Minimize")?;
        self.expect_line_end()?;

        self.skip_blank_lines();
        let objective = self.parse_objective()?;

        self.skip_blank_lines();
        self.expect_keyword("Subject")?;
        self.expect_keyword("To")?;
        self.expect_line_end()?;

        let mut constraints = Vec::new();
        loop {
            self.skip_blank_lines();
            if self.peek_kind() == TokenKind::Eof || self.at_section("Bounds") || self.at_section("End") {
                break;
            }
            constraints.push(self.parse_constraint()?);
        }

        let mut bounds = Vec::new();
        if self.at_section("Bounds") {
            self.advance();
            self.expect_line_end()?;
            loop {
                self.skip_blank_lines();
                if self.peek_kind() == TokenKind::Eof || self.at_section("End") {
                    break;
                }
                bounds.push(self.parse_bound()?);
            }
        }

        if self.at_section("End") {
            self.advance();
        }
        self.skip_blank_lines();
        if self.peek_kind() != TokenKind::Eof {
            return Err(self.unexpected("end of file"));
        }

        Ok(LpFile {
            objective,
            constraints,
            bounds,
        })
    }

    fn parse_objective(&mut self) -> Result<Objective, ParseError> {
        let start = self.current().map(|t| t.span).unwrap_or(Span::new(0, 0));

        // "Minimize" directly followed by "Subject To" means a zero objective
        if self.at_section("Subject") {
            return Ok(Objective {
                span: start,
                label: None,
                terms: Vec::new(),
            });
        }

        let label = self.parse_label();
        let terms = self.parse_terms()?;
        let span = terms.last().map_or(start, |t| start.merge(t.span));
        self.expect_line_end()?;

        Ok(Objective { span, label, terms })
    }

    fn parse_constraint(&mut self) -> Result<Constraint, ParseError> {
        let start = self.current().map(|t| t.span).unwrap_or(Span::new(0, 0));
        let label = self.parse_label();
        let terms = self.parse_terms()?;

        if self.peek_kind() != TokenKind::Le {
            return Err(self.unexpected("<="));
        }
        self.advance();

        let sign = self.parse_sign();
        let rhs_token = self.expect(TokenKind::Number)?;
        let rhs = sign * parse_number(&rhs_token)?;
        self.expect_line_end()?;

        Ok(Constraint {
            span: start.merge(rhs_token.span),
            label,
            terms,
            rhs,
        })
    }

    fn parse_bound(&mut self) -> Result<Bound, ParseError> {
        let var_token = self.expect(TokenKind::Ident)?;
        let variable = parse_variable(&var_token)?;

        if self.peek_kind() != TokenKind::Ge {
            return Err(self.unexpected(">="));
        }
        self.advance();

        let sign = self.parse_sign();
        let value_token = self.expect(TokenKind::Number)?;
        let lower = sign * parse_number(&value_token)?;
        let span = var_token.span.merge(value_token.span);
        if lower != 0.0 {
            return Err(ParseError::UnsupportedBound {
                name: var_token.text,
                span,
            });
        }

        Ok(Bound {
            span,
            variable,
            lower,
        })
    }

    /// `name:` at the start of a row
    fn parse_label(&mut self) -> Option<String> {
        if self.peek_kind() == TokenKind::Ident && self.peek_kind_at(1) == TokenKind::Colon {
            let label = self.advance().map(|t| t.text.clone());
            self.advance();
            label
        } else {
            None
        }
    }

    fn parse_terms(&mut self) -> Result<Vec<Term>, ParseError> {
        let mut terms = Vec::new();
        while matches!(
            self.peek_kind(),
            TokenKind::Plus | TokenKind::Minus | TokenKind::Number | TokenKind::Ident
        ) {
            terms.push(self.parse_term()?);
        }
        Ok(terms)
    }

    fn parse_term(&mut self) -> Result<Term, ParseError> {
        let start = self.current().map(|t| t.span).unwrap_or(Span::new(0, 0));
        let sign = self.parse_sign();

        let coefficient = if self.peek_kind() == TokenKind::Number {
            let token = self.expect(TokenKind::Number)?;
            parse_number(&token)?
        } else {
            1.0
        };

        let var_token = self.expect(TokenKind::Ident)?;
        let variable = parse_variable(&var_token)?;

        Ok(Term {
            span: start.merge(var_token.span),
            coefficient: sign * coefficient,
            variable,
        })
    }

    fn parse_sign(&mut self) -> f64 {
        let mut sign = 1.0;
        loop {
            match self.peek_kind() {
                TokenKind::Plus => {}
                TokenKind::Minus => sign = -sign,
                _ => break,
            }
            self.advance();
        }
        sign
    }
}

fn parse_number(token: &Token) -> Result<f64, ParseError> {
    token
        .text
        .parse()
        .map_err(|_| ParseError::InvalidNumber(token.text.clone()))
}

/// `x<k>` with `k >= 1`, mapped to column `k - 1`
fn parse_variable(token: &Token) -> Result<usize, ParseError> {
    let invalid = || ParseError::InvalidVariable {
        name: token.text.clone(),
        span: token.span,
    };
    let digits = token.text.strip_prefix('x').ok_or_else(invalid)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    match digits.parse::<usize>() {
        Ok(k) if k >= 1 => Ok(k - 1),
        _ => Err(invalid()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"\Generated by revsimplex

Minimize
 obj: -2 x1 -3 x2
Subject To
 c1: +1 x1 +1 x2 +1 x3 <= 4
 c2: +1 x1 +2 x2 +1 x4 <= 6
Bounds
 x1 >= 0
 x2 >= 0
 x3 >= 0
 x4 >= 0

End"#;

    #[test]
    fn test_parse_sample() {
        let file = Parser::parse(SAMPLE).unwrap();

        assert_eq!(file.objective.label.as_deref(), Some("obj"));
        let costs: Vec<_> = file
            .objective
            .terms
            .iter()
            .map(|t| (t.variable, t.coefficient))
            .collect();
        assert_eq!(costs, vec![(0, -2.0), (1, -3.0)]);

        assert_eq!(file.constraints.len(), 2);
        assert_eq!(file.constraints[1].label.as_deref(), Some("c2"));
        assert_eq!(file.constraints[1].rhs, 6.0);
        assert_eq!(file.constraints[1].terms[2].variable, 3);
        assert_eq!(file.bounds.len(), 4);
        assert_eq!(file.num_vars(), 4);
    }

    #[test]
    fn test_implicit_coefficients_and_signs() {
        let source = "Minimize\n obj: x1 - x2 + 2.5 x3\nSubject To\n c1: -x1 + 3x2 <= -1.5\n";
        let file = Parser::parse(source).unwrap();

        let costs: Vec<_> = file.objective.terms.iter().map(|t| t.coefficient).collect();
        assert_eq!(costs, vec![1.0, -1.0, 2.5]);
        let row: Vec<_> = file.constraints[0].terms.iter().map(|t| t.coefficient).collect();
        assert_eq!(row, vec![-1.0, 3.0]);
        assert_eq!(file.constraints[0].rhs, -1.5);
        assert!(file.bounds.is_empty());
    }

    #[test]
    fn test_bounds_on_one_line() {
        let source = "Minimize\n obj: +1 x1\nSubject To\n c1: +1 x1 +1 x2 <= 1\nBounds\n x1 >= 0 x2 >= 0\n\nEnd";
        let file = Parser::parse(source).unwrap();
        assert_eq!(file.bounds.len(), 2);
        assert_eq!(file.bounds[1].variable, 1);
    }

    #[test]
    fn test_empty_objective() {
        let source = "Minimize\nSubject To\n c1: +1 x1 <= 1\n";
        let file = Parser::parse(source).unwrap();
        assert!(file.objective.terms.is_empty());
        assert_eq!(file.constraints.len(), 1);
    }

    #[test]
    fn test_rejects_ge_constraint() {
        let source = "Minimize\n obj: +1 x1\nSubject To\n c1: +1 x1 >= 1\n";
        match Parser::parse(source) {
            Err(ParseError::UnexpectedToken { expected, found, .. }) => {
                assert_eq!(expected, "<=");
                assert_eq!(found, "'>='");
            }
            other => panic!("expected an unexpected-token error, got {:?}", other),
        }
    }

    #[test]
    fn test_rejects_bad_variables() {
        for name in ["y1", "x0", "x", "x1a"] {
            let source = format!("Minimize\n obj: +1 {}\nSubject To\n", name);
            assert!(
                matches!(Parser::parse(&source), Err(ParseError::InvalidVariable { .. })),
                "{} should be rejected",
                name
            );
        }
    }

    #[test]
    fn test_rejects_non_zero_bound() {
        let source = "Minimize\n obj: +1 x1\nSubject To\n c1: +1 x1 <= 1\nBounds\n x1 >= 2\nEnd";
        assert_eq!(
            Parser::parse(source),
            Err(ParseError::UnsupportedBound {
                name: "x1".to_string(),
                span: Span::new(56, 63),
            })
        );
    }

    #[test]
    fn test_requires_minimize() {
        assert!(matches!(
            Parser::parse("Maximize\n obj: +1 x1\n"),
            Err(ParseError::UnexpectedToken { .. })
        ));
        assert_eq!(Parser::parse(""), Err(ParseError::UnexpectedEof));
    }

    #[test]
    fn test_rejects_trailing_content() {
        let source = "Minimize\n obj: +1 x1\nSubject To\n c1: +1 x1 <= 1\nEnd\n c2: +1 x1 <= 2";
        assert!(matches!(
            Parser::parse(source),
            Err(ParseError::UnexpectedToken { .. })
        ));
    }
}
