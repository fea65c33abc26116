use std::str::Chars;

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn merge(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    // Literals
    Ident,
    Number,

    // Operators
    Plus,
    Minus,
    Colon,
    Le,
    Ge,

    // Special
    Newline,
    Comment,
    Eof,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    pub text: String,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span, text: impl Into<String>) -> Self {
        Self {
            kind,
            span,
            text: text.into(),
        }
    }
}

/// Tokenizer for the LP text format.
///
/// Section names (`Minimize`, `Subject To`, `Bounds`, `End`) come out as
/// plain identifiers; the parser decides what they mean from their position.
pub struct Lexer<'a> {
    source: &'a str,
    chars: Chars<'a>,
    pos: usize,
    current: Option<char>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        let mut chars = source.chars();
        let current = chars.next();
        Self {
            source,
            chars,
            pos: 0,
            current,
        }
    }

    pub fn tokenize(source: &str) -> Vec<Token> {
        let mut lexer = Lexer::new(source);
        let mut tokens = Vec::new();
        loop {
            let token = lexer.next_token();
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        tokens
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.current;
        self.current = self.chars.next();
        if let Some(c) = c {
            self.pos += c.len_utf8();
        }
        c
    }

    fn peek(&self) -> Option<char> {
        self.current
    }

    fn peek_next(&self) -> Option<char> {
        self.chars.clone().next()
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if c == ' ' || c == '\t' || c == '\r' {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn skip_line_comment(&mut self) -> Token {
        let start = self.pos;
        self.advance(); // backslash
        while let Some(c) = self.peek() {
            if c == '\n' {
                break;
            }
            self.advance();
        }
        Token::new(
            TokenKind::Comment,
            Span::new(start, self.pos),
            &self.source[start..self.pos],
        )
    }

    fn skip_digits(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn read_number(&mut self) -> Token {
        let start = self.pos;

        self.skip_digits();
        if self.peek() == Some('.') {
            self.advance();
            self.skip_digits();
        }

        // Exponent, only when digits follow (optionally signed)
        if matches!(self.peek(), Some('e' | 'E')) {
            let mut ahead = self.chars.clone();
            let exponent = match ahead.next() {
                Some('+' | '-') => ahead.next().is_some_and(|c| c.is_ascii_digit()),
                Some(c) => c.is_ascii_digit(),
                None => false,
            };
            if exponent {
                self.advance(); // e
                if matches!(self.peek(), Some('+' | '-')) {
                    self.advance();
                }
                self.skip_digits();
            }
        }

        Token::new(
            TokenKind::Number,
            Span::new(start, self.pos),
            &self.source[start..self.pos],
        )
    }

    fn read_ident(&mut self) -> Token {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' {
                self.advance();
            } else {
                break;
            }
        }
        Token::new(
            TokenKind::Ident,
            Span::new(start, self.pos),
            &self.source[start..self.pos],
        )
    }

    /// `<=` or `>=`; a lone `<` or `>` is an error token
    fn read_comparison(&mut self, kind: TokenKind) -> Token {
        let start = self.pos;
        self.advance();
        if self.peek() == Some('=') {
            self.advance();
            Token::new(kind, Span::new(start, self.pos), &self.source[start..self.pos])
        } else {
            Token::new(
                TokenKind::Error,
                Span::new(start, self.pos),
                &self.source[start..self.pos],
            )
        }
    }

    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();

        let start = self.pos;

        let Some(c) = self.peek() else {
            return Token::new(TokenKind::Eof, Span::new(start, start), "");
        };

        match c {
            '\n' => {
                self.advance();
                Token::new(TokenKind::Newline, Span::new(start, self.pos), "\n")
            }
            '\\' => self.skip_line_comment(),
            '+' => {
                self.advance();
                Token::new(TokenKind::Plus, Span::new(start, self.pos), "+")
            }
            '-' => {
                self.advance();
                Token::new(TokenKind::Minus, Span::new(start, self.pos), "-")
            }
            ':' => {
                self.advance();
                Token::new(TokenKind::Colon, Span::new(start, self.pos), ":")
            }
            '<' => self.read_comparison(TokenKind::Le),
            '>' => self.read_comparison(TokenKind::Ge),
            '.' if self.peek_next().is_some_and(|n| n.is_ascii_digit()) => self.read_number(),
            c if c.is_ascii_digit() => self.read_number(),
            c if c.is_alphabetic() || c == '_' => self.read_ident(),
            _ => {
                self.advance();
                Token::new(
                    TokenKind::Error,
                    Span::new(start, self.pos),
                    &self.source[start..self.pos],
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::tokenize(source).iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_numbers() {
        let tokens = Lexer::tokenize("100 8.5 0.005 .5 1e-05 2.5E+3 3.");
        let texts: Vec<_> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["100", "8.5", "0.005", ".5", "1e-05", "2.5E+3", "3.", ""]);
    }

    #[test]
    fn test_number_followed_by_variable() {
        let tokens = Lexer::tokenize("3x1 2e1");
        let texts: Vec<_> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["3", "x1", "2e1", ""]);
    }

    #[test]
    fn test_operators() {
        assert_eq!(
            kinds("+ - : <= >="),
            vec![
                TokenKind::Plus,
                TokenKind::Minus,
                TokenKind::Colon,
                TokenKind::Le,
                TokenKind::Ge,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_lone_comparison_is_error() {
        assert_eq!(kinds("< 3"), vec![TokenKind::Error, TokenKind::Number, TokenKind::Eof]);
    }

    #[test]
    fn test_comments() {
        assert_eq!(
            kinds("\\Generated @ 01-01-2020\nMinimize"),
            vec![
                TokenKind::Comment,
                TokenKind::Newline,
                TokenKind::Ident,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_constraint_line() {
        let source = " c1: +1 x1 -2.5 x3 <= 4";
        let tokens = Lexer::tokenize(source);
        assert_eq!(
            tokens.iter().map(|t| t.kind).collect::<Vec<_>>(),
            vec![
                TokenKind::Ident, // c1
                TokenKind::Colon,
                TokenKind::Plus,
                TokenKind::Number,
                TokenKind::Ident, // x1
                TokenKind::Minus,
                TokenKind::Number,
                TokenKind::Ident, // x3
                TokenKind::Le,
                TokenKind::Number,
                TokenKind::Eof,
            ]
        );
        assert_eq!(tokens[6].span, Span::new(12, 15));
    }
}
