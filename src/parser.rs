use std::rc::Rc;

use tracing::debug;

use crate::{
    ast::{
        BlockStatement, Expression, FunctionLiteral, Identifier, InfixOperator, PrefixOperator,
        Program, Statement,
    },
    diagnostics::Diagnostic,
    lexer::Lexer,
    token::{Token, TokenKind},
};

/// Parses `source` into a program plus every error met along the way.
/// A non-empty error list means the program must not be evaluated.
pub fn parse_program(source: &str) -> (Program, Vec<Diagnostic>) {
    let mut parser = Parser::new(Lexer::new(source));
    let program = parser.parse_program();
    (program, parser.into_errors())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Precedence {
    Lowest,
    Equals,
    Range,
    LessGreater,
    Boolean,
    Sum,
    Product,
    Modulo,
    Prefix,
    Call,
    Index,
}

fn precedence_of(kind: TokenKind) -> Precedence {
    match kind {
        TokenKind::Equal | TokenKind::NotEqual => Precedence::Equals,
        TokenKind::DotDot => Precedence::Range,
        TokenKind::Less | TokenKind::Greater | TokenKind::LessEqual | TokenKind::GreaterEqual => {
            Precedence::LessGreater
        }
        TokenKind::And | TokenKind::Or => Precedence::Boolean,
        TokenKind::Plus | TokenKind::Minus => Precedence::Sum,
        TokenKind::Asterisk | TokenKind::Slash => Precedence::Product,
        TokenKind::Percent => Precedence::Modulo,
        TokenKind::LParen => Precedence::Call,
        TokenKind::LBracket => Precedence::Index,
        _ => Precedence::Lowest,
    }
}

fn infix_operator(kind: TokenKind) -> Option<InfixOperator> {
    let operator = match kind {
        TokenKind::Plus => InfixOperator::Add,
        TokenKind::Minus => InfixOperator::Sub,
        TokenKind::Asterisk => InfixOperator::Mul,
        TokenKind::Slash => InfixOperator::Div,
        TokenKind::Percent => InfixOperator::Mod,
        TokenKind::Equal => InfixOperator::Equal,
        TokenKind::NotEqual => InfixOperator::NotEqual,
        TokenKind::Less => InfixOperator::Less,
        TokenKind::LessEqual => InfixOperator::LessEqual,
        TokenKind::Greater => InfixOperator::Greater,
        TokenKind::GreaterEqual => InfixOperator::GreaterEqual,
        TokenKind::And => InfixOperator::And,
        TokenKind::Or => InfixOperator::Or,
        _ => return None,
    };
    Some(operator)
}

/// Pratt parser over a two-token window (`current`, `peek`).
///
/// Errors are collected rather than returned: a production that cannot be
/// completed records a diagnostic and yields `None`, and parsing resumes at
/// the next token.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
    peek: Token,
    errors: Vec<Diagnostic>,
}

impl<'a> Parser<'a> {
    pub fn new(mut lexer: Lexer<'a>) -> Self {
        let current = lexer.next_token();
        let peek = lexer.next_token();
        Self {
            lexer,
            current,
            peek,
            errors: Vec::new(),
        }
    }

    pub fn errors(&self) -> &[Diagnostic] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<Diagnostic> {
        self.errors
    }

    pub fn parse_program(&mut self) -> Program {
        let mut statements = Vec::new();
        while !self.current_is(TokenKind::Eof) {
            if let Some(stmt) = self.parse_statement() {
                statements.push(stmt);
            }
            self.next_token();
        }
        debug!(
            statements = statements.len(),
            errors = self.errors.len(),
            "parsed program"
        );
        Program { statements }
    }

    fn parse_statement(&mut self) -> Option<Statement> {
        match self.current.kind {
            TokenKind::Let => self.parse_let(),
            TokenKind::Return => self.parse_return(),
            _ => self.parse_expression_statement(),
        }
    }

    fn parse_let(&mut self) -> Option<Statement> {
        self.expect_peek(TokenKind::Ident)?;
        let name = Identifier::new(self.current.literal.clone());
        self.expect_peek(TokenKind::Assign)?;
        self.next_token();
        let value = self.parse_expression(Precedence::Lowest)?;
        self.consume_optional_semicolon();
        Some(Statement::Let { name, value })
    }

    fn parse_return(&mut self) -> Option<Statement> {
        if matches!(
            self.peek.kind,
            TokenKind::Semicolon | TokenKind::RBrace | TokenKind::Eof
        ) {
            self.consume_optional_semicolon();
            return Some(Statement::Return(None));
        }
        self.next_token();
        let value = self.parse_expression(Precedence::Lowest)?;
        self.consume_optional_semicolon();
        Some(Statement::Return(Some(value)))
    }

    fn parse_expression_statement(&mut self) -> Option<Statement> {
        let expr = self.parse_expression(Precedence::Lowest)?;
        self.consume_optional_semicolon();
        Some(Statement::Expression(expr))
    }

    fn parse_expression(&mut self, precedence: Precedence) -> Option<Expression> {
        let mut left = self.parse_prefix()?;
        while precedence < precedence_of(self.peek.kind) {
            self.next_token();
            left = self.parse_infix(left)?;
        }
        Some(left)
    }

    fn parse_prefix(&mut self) -> Option<Expression> {
        match self.current.kind {
            TokenKind::Ident => Some(Expression::Identifier(Identifier::new(
                self.current.literal.clone(),
            ))),
            TokenKind::Int => self.parse_integer(),
            TokenKind::Double => self.parse_double(),
            TokenKind::String => Some(Expression::String(self.current.literal.clone())),
            TokenKind::True => Some(Expression::Boolean(true)),
            TokenKind::False => Some(Expression::Boolean(false)),
            TokenKind::Bang => self.parse_prefix_expression(PrefixOperator::Not),
            TokenKind::Minus => self.parse_prefix_expression(PrefixOperator::Negate),
            TokenKind::LParen => self.parse_grouped(),
            TokenKind::If => self.parse_if(),
            TokenKind::While => self.parse_while(),
            TokenKind::Function => self.parse_function_literal(),
            TokenKind::LBracket => self
                .parse_expression_list(TokenKind::RBracket)
                .map(Expression::Array),
            TokenKind::LBrace => self.parse_hash(),
            other => {
                let message = format!("no prefix parse function for {other} found");
                self.error_at_current(message);
                None
            }
        }
    }

    fn parse_infix(&mut self, left: Expression) -> Option<Expression> {
        match self.current.kind {
            TokenKind::LParen => {
                let arguments = self.parse_expression_list(TokenKind::RParen)?;
                Some(Expression::Call {
                    callee: Box::new(left),
                    arguments,
                })
            }
            TokenKind::LBracket => {
                self.next_token();
                let index = self.parse_expression(Precedence::Lowest)?;
                self.expect_peek(TokenKind::RBracket)?;
                Some(Expression::Index {
                    collection: Box::new(left),
                    index: Box::new(index),
                })
            }
            TokenKind::DotDot => {
                let precedence = precedence_of(self.current.kind);
                self.next_token();
                let hi = self.parse_expression(precedence)?;
                Some(Expression::Range {
                    lo: Box::new(left),
                    hi: Box::new(hi),
                })
            }
            kind => {
                let operator = infix_operator(kind)?;
                let precedence = precedence_of(kind);
                self.next_token();
                let right = self.parse_expression(precedence)?;
                Some(Expression::Infix {
                    operator,
                    left: Box::new(left),
                    right: Box::new(right),
                })
            }
        }
    }

    fn parse_integer(&mut self) -> Option<Expression> {
        match self.current.literal.parse::<i64>() {
            Ok(value) => Some(Expression::Integer(value)),
            Err(_) => {
                let message = format!("could not parse {} as integer", self.current.literal);
                self.error_at_current(message);
                None
            }
        }
    }

    fn parse_double(&mut self) -> Option<Expression> {
        match self.current.literal.parse::<f64>() {
            Ok(value) => Some(Expression::Double(value)),
            Err(_) => {
                let message = format!("could not parse {} as double", self.current.literal);
                self.error_at_current(message);
                None
            }
        }
    }

    fn parse_prefix_expression(&mut self, operator: PrefixOperator) -> Option<Expression> {
        self.next_token();
        let operand = self.parse_expression(Precedence::Prefix)?;
        Some(Expression::Prefix {
            operator,
            operand: Box::new(operand),
        })
    }

    fn parse_grouped(&mut self) -> Option<Expression> {
        self.next_token();
        let expr = self.parse_expression(Precedence::Lowest)?;
        self.expect_peek(TokenKind::RParen)?;
        Some(expr)
    }

    fn parse_if(&mut self) -> Option<Expression> {
        let condition = self.parse_parenthesized_condition()?;
        self.expect_peek(TokenKind::LBrace)?;
        let consequence = self.parse_block();
        let alternative = if self.peek_is(TokenKind::Else) {
            self.next_token();
            self.expect_peek(TokenKind::LBrace)?;
            Some(self.parse_block())
        } else {
            None
        };
        Some(Expression::If {
            condition: Box::new(condition),
            consequence,
            alternative,
        })
    }

    fn parse_while(&mut self) -> Option<Expression> {
        let condition = self.parse_parenthesized_condition()?;
        self.expect_peek(TokenKind::LBrace)?;
        let body = self.parse_block();
        Some(Expression::While {
            condition: Box::new(condition),
            body,
        })
    }

    fn parse_parenthesized_condition(&mut self) -> Option<Expression> {
        self.expect_peek(TokenKind::LParen)?;
        self.next_token();
        let condition = self.parse_expression(Precedence::Lowest)?;
        self.expect_peek(TokenKind::RParen)?;
        Some(condition)
    }

    /// Expects `current` to be `{`; stops on the matching `}` or at end of input.
    fn parse_block(&mut self) -> BlockStatement {
        let mut statements = Vec::new();
        self.next_token();
        while !self.current_is(TokenKind::RBrace) && !self.current_is(TokenKind::Eof) {
            if let Some(stmt) = self.parse_statement() {
                statements.push(stmt);
            }
            self.next_token();
        }
        BlockStatement { statements }
    }

    fn parse_function_literal(&mut self) -> Option<Expression> {
        self.expect_peek(TokenKind::LParen)?;
        let parameters = self.parse_function_parameters()?;
        self.expect_peek(TokenKind::LBrace)?;
        let body = self.parse_block();
        Some(Expression::Function(Rc::new(FunctionLiteral {
            parameters,
            body,
        })))
    }

    fn parse_function_parameters(&mut self) -> Option<Vec<Identifier>> {
        let mut parameters = Vec::new();
        if self.peek_is(TokenKind::RParen) {
            self.next_token();
            return Some(parameters);
        }
        self.expect_peek(TokenKind::Ident)?;
        parameters.push(Identifier::new(self.current.literal.clone()));
        while self.peek_is(TokenKind::Comma) {
            self.next_token();
            self.expect_peek(TokenKind::Ident)?;
            parameters.push(Identifier::new(self.current.literal.clone()));
        }
        self.expect_peek(TokenKind::RParen)?;
        Some(parameters)
    }

    fn parse_expression_list(&mut self, end: TokenKind) -> Option<Vec<Expression>> {
        let mut items = Vec::new();
        if self.peek_is(end) {
            self.next_token();
            return Some(items);
        }
        self.next_token();
        items.push(self.parse_expression(Precedence::Lowest)?);
        while self.peek_is(TokenKind::Comma) {
            self.next_token();
            self.next_token();
            items.push(self.parse_expression(Precedence::Lowest)?);
        }
        self.expect_peek(end)?;
        Some(items)
    }

    fn parse_hash(&mut self) -> Option<Expression> {
        let mut pairs = Vec::new();
        while !self.peek_is(TokenKind::RBrace) {
            self.next_token();
            let key = self.parse_expression(Precedence::Lowest)?;
            self.expect_peek(TokenKind::Colon)?;
            self.next_token();
            let value = self.parse_expression(Precedence::Lowest)?;
            pairs.push((key, value));
            if !self.peek_is(TokenKind::RBrace) {
                self.expect_peek(TokenKind::Comma)?;
            }
        }
        self.expect_peek(TokenKind::RBrace)?;
        Some(Expression::Hash(pairs))
    }

    fn next_token(&mut self) {
        self.current = std::mem::replace(&mut self.peek, self.lexer.next_token());
    }

    fn current_is(&self, kind: TokenKind) -> bool {
        self.current.kind == kind
    }

    fn peek_is(&self, kind: TokenKind) -> bool {
        self.peek.kind == kind
    }

    fn consume_optional_semicolon(&mut self) {
        if self.peek_is(TokenKind::Semicolon) {
            self.next_token();
        }
    }

    /// Advances when `peek` has the wanted kind, otherwise records an error.
    fn expect_peek(&mut self, kind: TokenKind) -> Option<()> {
        if self.peek_is(kind) {
            self.next_token();
            Some(())
        } else {
            let message = format!(
                "expected next token to be {kind}, got {} instead",
                self.peek.kind
            );
            self.errors
                .push(Diagnostic::new(message).with_span(self.peek.span));
            None
        }
    }

    fn error_at_current(&mut self, message: String) {
        self.errors
            .push(Diagnostic::new(message).with_span(self.current.span));
    }
}
