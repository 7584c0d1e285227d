use std::fmt;

use crate::ast::Expression;
use crate::lexer::{Lexer, LexicalError, Token, TokenKind};

/// Whether the expression being parsed sits under a quote. Empty lists
/// and unquote markers are only meaningful in some of these.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum QuoteContext {
    NoQuote,
    Quote,
    QuasiQuote,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Expected {
    CloseParen,
    Expression,
}

impl fmt::Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expected::CloseParen => write!(f, "')'"),
            Expected::Expression => write!(f, "an expression"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    #[error("premature end of input, expected {expected}")]
    PrematureEndOfInput { expected: Expected },
    #[error("unexpected token {got}, expected {expected}")]
    UnexpectedToken { expected: Expected, got: Token },
    #[error("empty list is not a valid expression, near {got}")]
    EmptyList { got: Token },
    #[error("unquote {got} outside quasiquote")]
    UnquoteOutsideQuasiQuote { got: Token },
    #[error("ill-formed list, expected ')' after the cdr following {got}")]
    IllFormedList { got: Token },
    #[error("bytevector element {got} is not an integer")]
    NonIntegerByteElement { got: Token },
    #[error("bytevector element {got} is out of range 0..=255")]
    InvalidByteElement { got: Token },
}

/// Recursive-descent parser over a [`Lexer`]. Lexical errors do not
/// abort parsing, they are collected on the side while the parser
/// continues with the next sound token.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    peeked: Option<Token>,
    lexical_errors: Vec<LexicalError>,
}

impl<'a> Parser<'a> {
    pub fn new(lexer: Lexer<'a>) -> Self {
        Parser {
            lexer,
            peeked: None,
            lexical_errors: Vec::new(),
        }
    }

    pub fn take_lexical_errors(&mut self) -> Vec<LexicalError> {
        std::mem::take(&mut self.lexical_errors)
    }

    fn advance(&mut self) -> Option<Token> {
        match self.peeked.take() {
            Some(token) => Some(token),
            None => loop {
                match self.lexer.next() {
                    Some(Ok(token)) => return Some(token),
                    Some(Err(error)) => self.lexical_errors.push(error),
                    None => return None,
                }
            },
        }
    }

    fn peek(&mut self) -> Option<&Token> {
        if self.peeked.is_none() {
            self.peeked = self.advance();
        }
        self.peeked.as_ref()
    }

    fn skip_comments(&mut self) {
        while matches!(
            self.peek().map(|token| &token.kind),
            Some(TokenKind::Comment(_))
        ) {
            self.advance();
        }
    }

    pub fn parse_expression(&mut self, context: QuoteContext) -> Result<Expression, ParseError> {
        let token = self.advance().ok_or(ParseError::PrematureEndOfInput {
            expected: Expected::Expression,
        })?;
        match token.kind {
            TokenKind::Comment(_) => self.parse_expression(context),
            TokenKind::Bool(value) => Ok(Expression::BoolLiteral(value)),
            TokenKind::Char(value) => Ok(Expression::CharLiteral(value)),
            TokenKind::Integer(value) => Ok(Expression::IntegerLiteral(value)),
            TokenKind::Rational(numerator, denominator) => {
                Ok(Expression::RationalLiteral(numerator, denominator))
            }
            TokenKind::Real(value) => Ok(Expression::RealLiteral(value)),
            TokenKind::Complex(real, imag) => Ok(Expression::ComplexLiteral(real, imag)),
            TokenKind::Str(value) => Ok(Expression::StringLiteral(value)),
            TokenKind::Ident(name) => Ok(Expression::Identifier(name)),
            TokenKind::Quote => {
                let inner = self.parse_expression(QuoteContext::Quote)?;
                Ok(Expression::QuotedExpression(Box::new(inner)))
            }
            TokenKind::Quasiquote => {
                let inner = self.parse_expression(QuoteContext::QuasiQuote)?;
                Ok(Expression::QuasiQuotedExpression(Box::new(inner)))
            }
            TokenKind::Unquote | TokenKind::UnquoteSplicing => {
                if context != QuoteContext::QuasiQuote {
                    return Err(ParseError::UnquoteOutsideQuasiQuote { got: token });
                }
                let inner = self.parse_expression(QuoteContext::NoQuote)?;
                Ok(Expression::UnquotedElement(Box::new(inner)))
            }
            TokenKind::LParen => self.parse_list(context),
            TokenKind::VectorOpen => self.parse_vector(context),
            TokenKind::ByteVectorOpen => self.parse_bytevector(),
            TokenKind::RParen | TokenKind::Dot => Err(ParseError::UnexpectedToken {
                expected: Expected::Expression,
                got: token,
            }),
        }
    }

    fn parse_list(&mut self, context: QuoteContext) -> Result<Expression, ParseError> {
        self.skip_comments();
        match self.peek().map(|token| &token.kind) {
            Some(TokenKind::RParen) => {
                let token = self.advance().expect("peeked");
                if context == QuoteContext::NoQuote {
                    Err(ParseError::EmptyList { got: token })
                } else {
                    Ok(Expression::Nil)
                }
            }
            Some(_) => {
                let car = self.parse_expression(context)?;
                self.parse_list_tail(car, context)
            }
            None => Err(ParseError::PrematureEndOfInput {
                expected: Expected::CloseParen,
            }),
        }
    }

    fn parse_list_tail(
        &mut self,
        car: Expression,
        context: QuoteContext,
    ) -> Result<Expression, ParseError> {
        self.skip_comments();
        match self.peek().map(|token| &token.kind) {
            Some(TokenKind::RParen) => {
                self.advance();
                Ok(Expression::Cons {
                    car: Box::new(car),
                    cdr: Box::new(Expression::Nil),
                })
            }
            Some(TokenKind::Dot) => {
                let dot = self.advance().expect("peeked");
                let cdr = self.parse_expression(context)?;
                self.skip_comments();
                match self.peek().map(|token| &token.kind) {
                    Some(TokenKind::RParen) => {
                        self.advance();
                        Ok(Expression::Cons {
                            car: Box::new(car),
                            cdr: Box::new(cdr),
                        })
                    }
                    _ => {
                        self.synchronize_to_close();
                        Err(ParseError::IllFormedList { got: dot })
                    }
                }
            }
            Some(_) => {
                let next = self.parse_expression(context)?;
                let rest = self.parse_list_tail(next, context)?;
                Ok(Expression::Cons {
                    car: Box::new(car),
                    cdr: Box::new(rest),
                })
            }
            None => Err(ParseError::PrematureEndOfInput {
                expected: Expected::CloseParen,
            }),
        }
    }

    /// Discard tokens through the next ')' so the parser can resume at
    /// the following form.
    fn synchronize_to_close(&mut self) {
        while let Some(token) = self.advance() {
            if token.kind == TokenKind::RParen {
                break;
            }
        }
    }

    fn parse_vector(&mut self, context: QuoteContext) -> Result<Expression, ParseError> {
        let mut elements = Vec::new();
        loop {
            self.skip_comments();
            match self.peek().map(|token| &token.kind) {
                Some(TokenKind::RParen) => {
                    self.advance();
                    return Ok(Expression::Vector(elements));
                }
                Some(_) => elements.push(self.parse_expression(context)?),
                None => {
                    return Err(ParseError::PrematureEndOfInput {
                        expected: Expected::CloseParen,
                    })
                }
            }
        }
    }

    fn parse_bytevector(&mut self) -> Result<Expression, ParseError> {
        let mut bytes = Vec::new();
        loop {
            self.skip_comments();
            let token = self.advance().ok_or(ParseError::PrematureEndOfInput {
                expected: Expected::CloseParen,
            })?;
            match token.kind {
                TokenKind::RParen => return Ok(Expression::ByteVector(bytes)),
                TokenKind::Integer(value) if (0..=255).contains(&value) => {
                    bytes.push(value as u8)
                }
                TokenKind::Integer(_) => return Err(ParseError::InvalidByteElement { got: token }),
                _ => return Err(ParseError::NonIntegerByteElement { got: token }),
            }
        }
    }
}

impl<'a> Iterator for Parser<'a> {
    type Item = Result<Expression, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.skip_comments();
        self.peek()?;
        Some(self.parse_expression(QuoteContext::NoQuote))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_one(input: &str) -> Result<Expression, ParseError> {
        Parser::new(Lexer::new(input)).next().expect("one expression")
    }

    #[test]
    fn test_lists() {
        let tests = vec![
            ("(a b c)", "(a b c)"),
            ("(a . b)", "(a . b)"),
            ("(a b c . d)", "(a b c . d)"),
            ("((a) (b c))", "((a) (b c))"),
            ("(+ 1 2.5 3/4)", "(+ 1 2.5 3/4)"),
        ];
        for (input, expected) in tests {
            let expression = parse_one(input).expect("valid input");
            assert_eq!(expression.to_string(), expected, "input {:?}", input);
        }
    }

    #[test]
    fn test_quote_forms() {
        let tests = vec![
            ("'a", "'a"),
            ("'(1 2)", "'(1 2)"),
            ("'()", "'()"),
            ("''a", "''a"),
            ("`(a ,b)", "`(a ,b)"),
            ("`(a (b ,c))", "`(a (b ,c))"),
            ("`,x", "`,x"),
            ("'(a . b)", "'(a . b)"),
        ];
        for (input, expected) in tests {
            let expression = parse_one(input).expect("valid input");
            assert_eq!(expression.to_string(), expected, "input {:?}", input);
        }
    }

    #[test]
    fn test_vectors() {
        let tests = vec![
            ("#(1 2 3)", "#(1 2 3)"),
            ("#()", "#()"),
            ("#(#(1) 2)", "#(#(1) 2)"),
            ("#u8(0 128 255)", "#u8(0 128 255)"),
            ("#u8()", "#u8()"),
        ];
        for (input, expected) in tests {
            let expression = parse_one(input).expect("valid input");
            assert_eq!(expression.to_string(), expected, "input {:?}", input);
        }
    }

    #[test]
    fn test_comments_are_transparent() {
        let tests = vec![
            ("(1 ; mid\n 2)", "(1 2)"),
            ("#| lead |# (a)", "(a)"),
            ("(a #| mid |# . b)", "(a . b)"),
        ];
        for (input, expected) in tests {
            let expression = parse_one(input).expect("valid input");
            assert_eq!(expression.to_string(), expected, "input {:?}", input);
        }
    }

    #[test]
    fn test_errors() {
        assert!(matches!(
            parse_one("()"),
            Err(ParseError::EmptyList { .. })
        ));
        assert!(matches!(
            parse_one(",x"),
            Err(ParseError::UnquoteOutsideQuasiQuote { .. })
        ));
        assert!(matches!(
            parse_one("'(,x)"),
            Err(ParseError::UnquoteOutsideQuasiQuote { .. })
        ));
        assert!(matches!(
            parse_one("(a . b c)"),
            Err(ParseError::IllFormedList { .. })
        ));
        assert!(matches!(
            parse_one("(a . )"),
            Err(ParseError::UnexpectedToken { .. })
        ));
        assert!(matches!(
            parse_one(")"),
            Err(ParseError::UnexpectedToken { .. })
        ));
        assert!(matches!(
            parse_one("(a"),
            Err(ParseError::PrematureEndOfInput { .. })
        ));
        assert!(matches!(
            parse_one("#u8(1 300)"),
            Err(ParseError::InvalidByteElement { .. })
        ));
        assert!(matches!(
            parse_one("#u8(a)"),
            Err(ParseError::NonIntegerByteElement { .. })
        ));
    }

    #[test]
    fn test_recovery_after_ill_formed_list() {
        let mut parser = Parser::new(Lexer::new("(a . b c) 5"));
        assert!(matches!(
            parser.next(),
            Some(Err(ParseError::IllFormedList { .. }))
        ));
        let next = parser.next().expect("one more expression");
        assert_eq!(next, Ok(Expression::IntegerLiteral(5)));
        assert_eq!(parser.next(), None);
    }

    #[test]
    fn test_lexical_errors_are_collected() {
        let mut parser = Parser::new(Lexer::new("(1 #q 2)"));
        let expression = parser.next().expect("one expression").expect("valid list");
        assert_eq!(expression.to_string(), "(1 2)");
        let errors = parser.take_lexical_errors();
        assert_eq!(errors.len(), 1);
    }
}
