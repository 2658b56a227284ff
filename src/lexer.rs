use crate::{
    diagnostics::SourceSpan,
    token::{lookup_ident, Token, TokenKind},
};

/// On-demand scanner over a source string.
///
/// `next_token` never fails: bytes the language does not know become
/// `Illegal` tokens, and once the input is consumed every further call
/// yields `Eof`. Iterating the lexer stops right after the first `Eof`.
pub struct Lexer<'a> {
    source: &'a str,
    current: usize,
    exhausted: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            current: 0,
            exhausted: false,
        }
    }

    fn peek(&self) -> Option<char> {
        self.source[self.current..].chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        self.source[self.current..].chars().nth(1)
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.current += ch.len_utf8();
        Some(ch)
    }

    fn match_next(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.current += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn collect_while<F>(&mut self, mut predicate: F)
    where
        F: FnMut(char) -> bool,
    {
        while let Some(ch) = self.peek() {
            if !predicate(ch) {
                break;
            }
            self.bump();
        }
    }

    fn skip_whitespace(&mut self) {
        self.collect_while(|ch| matches!(ch, ' ' | '\t' | '\r' | '\n'));
    }

    fn span_from(&self, start: usize) -> SourceSpan {
        SourceSpan::new(start, self.current)
    }

    fn simple_token(&self, start: usize, kind: TokenKind) -> Token {
        Token::new(kind, &self.source[start..self.current], self.span_from(start))
    }

    fn identifier_or_keyword(&mut self, start: usize) -> Token {
        self.collect_while(|ch| ch.is_ascii_alphabetic() || ch == '_');
        let lexeme = &self.source[start..self.current];
        Token::new(lookup_ident(lexeme), lexeme, self.span_from(start))
    }

    fn number_literal(&mut self, start: usize) -> Token {
        self.collect_while(|ch| ch.is_ascii_digit());
        // `1..5` is a range, so a dot only continues the number when a digit follows it.
        let is_double = self.peek() == Some('.')
            && self.peek_second().is_some_and(|ch| ch.is_ascii_digit());
        if is_double {
            self.bump();
            self.collect_while(|ch| ch.is_ascii_digit());
            self.simple_token(start, TokenKind::Double)
        } else {
            self.simple_token(start, TokenKind::Int)
        }
    }

    fn string_literal(&mut self, start: usize) -> Token {
        let mut value = String::new();
        while let Some(ch) = self.bump() {
            match ch {
                '"' => break,
                '\\' => match self.bump() {
                    Some('n') => value.push('\n'),
                    Some('r') => value.push('\r'),
                    Some('t') => value.push('\t'),
                    Some('"') => value.push('"'),
                    Some('\\') => value.push('\\'),
                    Some(other) => value.push(other),
                    None => break,
                },
                _ => value.push(ch),
            }
        }
        Token::new(TokenKind::String, value, self.span_from(start))
    }

    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();
        let start = self.current;
        let Some(ch) = self.bump() else {
            return Token::new(TokenKind::Eof, "", self.span_from(start));
        };

        match ch {
            'a'..='z' | 'A'..='Z' | '_' => self.identifier_or_keyword(start),
            '0'..='9' => self.number_literal(start),
            '"' => self.string_literal(start),
            '=' => {
                if self.match_next('=') {
                    self.simple_token(start, TokenKind::Equal)
                } else {
                    self.simple_token(start, TokenKind::Assign)
                }
            }
            '!' => {
                if self.match_next('=') {
                    self.simple_token(start, TokenKind::NotEqual)
                } else {
                    self.simple_token(start, TokenKind::Bang)
                }
            }
            '<' => {
                if self.match_next('=') {
                    self.simple_token(start, TokenKind::LessEqual)
                } else {
                    self.simple_token(start, TokenKind::Less)
                }
            }
            '>' => {
                if self.match_next('=') {
                    self.simple_token(start, TokenKind::GreaterEqual)
                } else {
                    self.simple_token(start, TokenKind::Greater)
                }
            }
            '&' => {
                if self.match_next('&') {
                    self.simple_token(start, TokenKind::And)
                } else {
                    self.simple_token(start, TokenKind::Illegal)
                }
            }
            '|' => {
                if self.match_next('|') {
                    self.simple_token(start, TokenKind::Or)
                } else {
                    self.simple_token(start, TokenKind::Illegal)
                }
            }
            '.' => {
                if self.match_next('.') {
                    self.simple_token(start, TokenKind::DotDot)
                } else {
                    self.simple_token(start, TokenKind::Illegal)
                }
            }
            '+' => self.simple_token(start, TokenKind::Plus),
            '-' => self.simple_token(start, TokenKind::Minus),
            '*' => self.simple_token(start, TokenKind::Asterisk),
            '/' => self.simple_token(start, TokenKind::Slash),
            '%' => self.simple_token(start, TokenKind::Percent),
            ',' => self.simple_token(start, TokenKind::Comma),
            ':' => self.simple_token(start, TokenKind::Colon),
            ';' => self.simple_token(start, TokenKind::Semicolon),
            '(' => self.simple_token(start, TokenKind::LParen),
            ')' => self.simple_token(start, TokenKind::RParen),
            '{' => self.simple_token(start, TokenKind::LBrace),
            '}' => self.simple_token(start, TokenKind::RBrace),
            '[' => self.simple_token(start, TokenKind::LBracket),
            ']' => self.simple_token(start, TokenKind::RBracket),
            _ => self.simple_token(start, TokenKind::Illegal),
        }
    }

    /// Scans the whole input; the last element is always the single `Eof`.
    pub fn tokenize(self) -> Vec<Token> {
        self.collect()
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if self.exhausted {
            return None;
        }
        let token = self.next_token();
        if token.kind == TokenKind::Eof {
            self.exhausted = true;
        }
        Some(token)
    }
}
