use std::fmt;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    LParen,
    RParen,
    Quote,
    Quasiquote,
    Unquote,
    UnquoteSplicing,
    Dot,
    VectorOpen,
    ByteVectorOpen,
    Bool(bool),
    Char(char),
    Integer(i64),
    Rational(i64, i64),
    Real(f64),
    Complex(f64, f64),
    Str(String),
    Ident(Rc<str>),
    Comment(String),
}

/// A token together with the exact source slice it was read from and
/// the position of its first character.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub line: u32,
    pub column: u32,
    pub offset: usize,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' at {}:{}", self.text, self.line, self.column)
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{line}:{column}: {kind}")]
pub struct LexicalError {
    pub kind: LexicalErrorKind,
    pub line: u32,
    pub column: u32,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LexicalErrorKind {
    #[error("unexpected end of input")]
    UnexpectedEof,
    #[error("unterminated string literal")]
    UnterminatedString,
    #[error("unterminated |identifier|")]
    UnterminatedIdentifier,
    #[error("unterminated block comment")]
    UnterminatedBlockComment,
    #[error("invalid escape character '{0}'")]
    InvalidEscape(char),
    #[error("invalid hex escape, expected two hex digits")]
    InvalidHexEscape,
    #[error("invalid boolean literal")]
    InvalidBoolean,
    #[error("unknown character name")]
    InvalidCharacterName,
    #[error("invalid number prefix '#{0}'")]
    InvalidNumberPrefix(char),
    #[error("expected '#u8(' to open a bytevector")]
    InvalidByteVectorOpen,
    #[error("expected a digit after '{0}'")]
    ExpectedDigit(char),
    #[error("expected a number")]
    ExpectedNumber,
    #[error("number literal out of range")]
    NumberOutOfRange,
    #[error("expected 'i' to close an imaginary part")]
    ExpectedImaginaryUnit,
    #[error("expected a delimiter after token")]
    MissingDelimiter,
    #[error("unrecognized character '{0}'")]
    UnrecognizedCharacter(char),
}

static NAMED_CHARS: phf::Map<&'static str, char> = phf::phf_map! {
    "alarm" => '\x07',
    "backspace" => '\x08',
    "delete" => '\x7f',
    "escape" => '\x1b',
    "newline" => '\n',
    "null" => '\0',
    "return" => '\r',
    "space" => ' ',
    "tab" => '\t',
};

fn is_initial(ch: char) -> bool {
    ch.is_alphabetic() || "!$%&*/:<=>?@^_~".contains(ch)
}

fn is_subsequent(ch: char) -> bool {
    is_initial(ch) || ch.is_ascii_digit() || matches!(ch, '+' | '-' | '.')
}

fn is_delimiter(ch: Option<char>) -> bool {
    match ch {
        None => true,
        Some(c) => c.is_whitespace() || matches!(c, '(' | ')' | '"' | ';' | '|'),
    }
}

/// A sign run like `-inf.0` or `+i` reads as a number, while `->foo`
/// reads as an identifier. The probe re-lexes the candidate run and
/// accepts only if the whole run is one number.
fn spells_number(text: &str) -> bool {
    let mut probe = Lexer::new(text);
    probe.lex_number().is_ok() && probe.pos == text.len()
}

/// The magnitude of one real part of a number literal, before it is
/// combined into a full token.
enum Magnitude {
    Int(i64),
    Rat(i64, i64),
    Flt(f64),
}

impl Magnitude {
    fn to_f64(&self) -> f64 {
        match *self {
            Magnitude::Int(value) => value as f64,
            Magnitude::Rat(numerator, denominator) => numerator as f64 / denominator as f64,
            Magnitude::Flt(value) => value,
        }
    }
}

pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
    line: u32,
    column: u32,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self::with_start_line(input, 1)
    }

    /// Start counting lines at `line` instead of 1, so a caller feeding
    /// one line at a time can keep positions cumulative.
    pub fn with_start_line(input: &'a str, line: u32) -> Self {
        Lexer {
            input,
            pos: 0,
            line,
            column: 1,
        }
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        self.peek_nth(1)
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        self.rest().chars().nth(n)
    }

    fn is_delimiter_at(&self, n: usize) -> bool {
        is_delimiter(self.peek_nth(n))
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    fn skip_whitespace(&mut self) {
        while self.peek().map_or(false, |c| c.is_whitespace()) {
            self.bump();
        }
    }

    fn error(&self, kind: LexicalErrorKind) -> LexicalError {
        LexicalError {
            kind,
            line: self.line,
            column: self.column,
        }
    }

    fn check_delimiter(&self) -> Result<(), LexicalError> {
        if is_delimiter(self.peek()) {
            Ok(())
        } else {
            Err(self.error(LexicalErrorKind::MissingDelimiter))
        }
    }

    fn eat_digits(&mut self, radix: u32) -> usize {
        let mut count = 0;
        while self.peek().map_or(false, |c| c.is_digit(radix)) {
            self.bump();
            count += 1;
        }
        count
    }

    fn lex_kind(&mut self) -> Result<TokenKind, LexicalError> {
        let ch = match self.peek() {
            Some(ch) => ch,
            None => return Err(self.error(LexicalErrorKind::UnexpectedEof)),
        };
        match ch {
            '(' => {
                self.bump();
                Ok(TokenKind::LParen)
            }
            ')' => {
                self.bump();
                Ok(TokenKind::RParen)
            }
            '\'' => {
                self.bump();
                Ok(TokenKind::Quote)
            }
            '`' => {
                self.bump();
                Ok(TokenKind::Quasiquote)
            }
            ',' => {
                self.bump();
                if self.peek() == Some('@') {
                    self.bump();
                    Ok(TokenKind::UnquoteSplicing)
                } else {
                    Ok(TokenKind::Unquote)
                }
            }
            ';' => self.lex_line_comment(),
            '"' => self.lex_string(),
            '|' => self.lex_pipe_identifier(),
            '#' => self.lex_hash(),
            '.' => {
                if self.peek_second().map_or(false, |c| c.is_ascii_digit()) {
                    self.lex_number()
                } else if is_delimiter(self.peek_second()) {
                    self.bump();
                    Ok(TokenKind::Dot)
                } else {
                    self.lex_identifier()
                }
            }
            '+' | '-' => self.lex_sign(),
            c if c.is_ascii_digit() => self.lex_number(),
            c if is_initial(c) => self.lex_identifier(),
            other => {
                self.bump();
                Err(self.error(LexicalErrorKind::UnrecognizedCharacter(other)))
            }
        }
    }

    fn lex_hash(&mut self) -> Result<TokenKind, LexicalError> {
        match self.peek_second() {
            Some('(') => {
                self.bump();
                self.bump();
                Ok(TokenKind::VectorOpen)
            }
            Some('|') => self.lex_block_comment(),
            Some('\\') => self.lex_char(),
            Some('t' | 'T' | 'f' | 'F') => self.lex_bool(),
            Some('u' | 'U') => self.lex_bytevector_open(),
            Some(c) if matches!(c.to_ascii_lowercase(), 'b' | 'o' | 'd' | 'x' | 'e' | 'i') => {
                self.lex_number()
            }
            Some(other) => {
                self.bump();
                self.bump();
                Err(self.error(LexicalErrorKind::InvalidNumberPrefix(other)))
            }
            None => {
                self.bump();
                Err(self.error(LexicalErrorKind::UnexpectedEof))
            }
        }
    }

    fn lex_line_comment(&mut self) -> Result<TokenKind, LexicalError> {
        let input = self.input;
        self.bump();
        let start = self.pos;
        while self.peek().map_or(false, |c| c != '\n') {
            self.bump();
        }
        Ok(TokenKind::Comment(input[start..self.pos].to_owned()))
    }

    fn lex_block_comment(&mut self) -> Result<TokenKind, LexicalError> {
        let input = self.input;
        self.bump();
        self.bump();
        let start = self.pos;
        let mut depth = 1u32;
        loop {
            if self.rest().starts_with("#|") {
                self.bump();
                self.bump();
                depth += 1;
            } else if self.rest().starts_with("|#") {
                self.bump();
                self.bump();
                depth -= 1;
                if depth == 0 {
                    return Ok(TokenKind::Comment(input[start..self.pos - 2].to_owned()));
                }
            } else if self.bump().is_none() {
                return Err(self.error(LexicalErrorKind::UnterminatedBlockComment));
            }
        }
    }

    fn lex_string(&mut self) -> Result<TokenKind, LexicalError> {
        self.bump();
        let mut value = String::new();
        loop {
            match self.bump() {
                None => return Err(self.error(LexicalErrorKind::UnterminatedString)),
                Some('"') => {
                    self.check_delimiter()?;
                    return Ok(TokenKind::Str(value));
                }
                Some('\\') => match self.bump() {
                    None => return Err(self.error(LexicalErrorKind::UnterminatedString)),
                    Some('a') => value.push('\x07'),
                    Some('b') => value.push('\x08'),
                    Some('t') => value.push('\t'),
                    Some('n') => value.push('\n'),
                    Some('r') => value.push('\r'),
                    Some('"') => value.push('"'),
                    Some('\\') => value.push('\\'),
                    Some('|') => value.push('|'),
                    Some('x' | 'X') => value.push(self.lex_hex_escape()?),
                    Some(ch) if ch.is_whitespace() => self.skip_line_continuation(ch)?,
                    Some(other) => {
                        return Err(self.error(LexicalErrorKind::InvalidEscape(other)))
                    }
                },
                Some(ch) => value.push(ch),
            }
        }
    }

    /// A backslash before a line break elides the break and the
    /// intraline whitespace around it.
    fn skip_line_continuation(&mut self, first: char) -> Result<(), LexicalError> {
        let mut seen_newline = first == '\n';
        while !seen_newline {
            match self.peek() {
                Some('\n') => {
                    self.bump();
                    seen_newline = true;
                }
                Some(' ' | '\t' | '\r') => {
                    self.bump();
                }
                _ => return Err(self.error(LexicalErrorKind::InvalidEscape(first))),
            }
        }
        while matches!(self.peek(), Some(' ' | '\t')) {
            self.bump();
        }
        Ok(())
    }

    fn lex_hex_escape(&mut self) -> Result<char, LexicalError> {
        let mut code = 0u32;
        for _ in 0..2 {
            match self.bump() {
                Some(ch) if ch.is_ascii_hexdigit() => {
                    code = code * 16 + ch.to_digit(16).expect("checked hex digit");
                }
                _ => return Err(self.error(LexicalErrorKind::InvalidHexEscape)),
            }
        }
        Ok(char::from(code as u8))
    }

    fn lex_pipe_identifier(&mut self) -> Result<TokenKind, LexicalError> {
        self.bump();
        let mut name = String::new();
        loop {
            match self.bump() {
                None => return Err(self.error(LexicalErrorKind::UnterminatedIdentifier)),
                Some('|') => {
                    self.check_delimiter()?;
                    return Ok(TokenKind::Ident(name.into()));
                }
                Some('\\') => match self.bump() {
                    None => return Err(self.error(LexicalErrorKind::UnterminatedIdentifier)),
                    Some('a') => name.push('\x07'),
                    Some('b') => name.push('\x08'),
                    Some('t') => name.push('\t'),
                    Some('n') => name.push('\n'),
                    Some('r') => name.push('\r'),
                    Some('"') => name.push('"'),
                    Some('|') => name.push('|'),
                    Some('\\') => name.push('\\'),
                    Some('x' | 'X') => name.push(self.lex_hex_escape()?),
                    Some(ch) if ch.is_whitespace() => self.skip_line_continuation(ch)?,
                    Some(other) => {
                        return Err(self.error(LexicalErrorKind::InvalidEscape(other)))
                    }
                },
                Some(ch) => name.push(ch),
            }
        }
    }

    fn lex_identifier(&mut self) -> Result<TokenKind, LexicalError> {
        let input = self.input;
        let start = self.pos;
        self.bump();
        while self.peek().map_or(false, is_subsequent) {
            self.bump();
        }
        self.check_delimiter()?;
        Ok(TokenKind::Ident(input[start..self.pos].into()))
    }

    fn lex_sign(&mut self) -> Result<TokenKind, LexicalError> {
        let second = self.peek_second();
        if second.map_or(false, |c| c.is_ascii_digit())
            || second == Some('.') && self.peek_nth(2).map_or(false, |c| c.is_ascii_digit())
        {
            return self.lex_number();
        }
        let input = self.input;
        let saved = (self.pos, self.line, self.column);
        let start = self.pos;
        self.bump();
        while self.peek().map_or(false, is_subsequent) {
            self.bump();
        }
        let text = &input[start..self.pos];
        if spells_number(text) {
            (self.pos, self.line, self.column) = saved;
            return self.lex_number();
        }
        self.check_delimiter()?;
        Ok(TokenKind::Ident(text.into()))
    }

    fn lex_bool(&mut self) -> Result<TokenKind, LexicalError> {
        let input = self.input;
        self.bump();
        let start = self.pos;
        while self.peek().map_or(false, |c| c.is_alphabetic()) {
            self.bump();
        }
        let value = match input[start..self.pos].to_ascii_lowercase().as_str() {
            "t" | "true" => true,
            "f" | "false" => false,
            _ => return Err(self.error(LexicalErrorKind::InvalidBoolean)),
        };
        self.check_delimiter()?;
        Ok(TokenKind::Bool(value))
    }

    fn lex_bytevector_open(&mut self) -> Result<TokenKind, LexicalError> {
        self.bump();
        self.bump();
        if self.peek() == Some('8') && self.peek_second() == Some('(') {
            self.bump();
            self.bump();
            Ok(TokenKind::ByteVectorOpen)
        } else {
            Err(self.error(LexicalErrorKind::InvalidByteVectorOpen))
        }
    }

    fn lex_char(&mut self) -> Result<TokenKind, LexicalError> {
        let input = self.input;
        self.bump();
        self.bump();
        let first = match self.bump() {
            Some(ch) => ch,
            None => return Err(self.error(LexicalErrorKind::UnexpectedEof)),
        };
        let ch = if matches!(first, 'x' | 'X')
            && self.peek().map_or(false, |c| c.is_ascii_hexdigit())
        {
            let digit_start = self.pos;
            while self.peek().map_or(false, |c| c.is_ascii_hexdigit()) {
                self.bump();
            }
            let code = u32::from_str_radix(&input[digit_start..self.pos], 16)
                .map_err(|_| self.error(LexicalErrorKind::NumberOutOfRange))?;
            char::from_u32(code).ok_or_else(|| self.error(LexicalErrorKind::NumberOutOfRange))?
        } else if first.is_alphabetic() && self.peek().map_or(false, |c| c.is_alphabetic()) {
            let name_start = self.pos - first.len_utf8();
            while self.peek().map_or(false, |c| c.is_alphabetic()) {
                self.bump();
            }
            let name = input[name_start..self.pos].to_ascii_lowercase();
            match NAMED_CHARS.get(name.as_str()) {
                Some(named) => *named,
                None => return Err(self.error(LexicalErrorKind::InvalidCharacterName)),
            }
        } else {
            first
        };
        self.check_delimiter()?;
        Ok(TokenKind::Char(ch))
    }

    fn lex_number(&mut self) -> Result<TokenKind, LexicalError> {
        let mut radix = 10;
        while self.peek() == Some('#') {
            self.bump();
            match self.bump() {
                Some(c) => match c.to_ascii_lowercase() {
                    'b' => radix = 2,
                    'o' => radix = 8,
                    'd' => radix = 10,
                    'x' => radix = 16,
                    // exactness prefixes are accepted, the literal
                    // keeps whichever kind its digits spell
                    'e' | 'i' => {}
                    other => {
                        return Err(self.error(LexicalErrorKind::InvalidNumberPrefix(other)))
                    }
                },
                None => return Err(self.error(LexicalErrorKind::UnexpectedEof)),
            }
        }
        if matches!(self.peek(), Some('+' | '-'))
            && self.peek_second() == Some('i')
            && self.is_delimiter_at(2)
        {
            let sign = if self.peek() == Some('-') { -1.0 } else { 1.0 };
            self.bump();
            self.bump();
            return Ok(TokenKind::Complex(0.0, sign));
        }
        let first = self.parse_real(radix)?;
        let kind = match self.peek() {
            Some('@') => {
                self.bump();
                let angle = self.parse_real(radix)?.to_f64();
                let magnitude = first.to_f64();
                TokenKind::Complex(magnitude * angle.cos(), magnitude * angle.sin())
            }
            Some('+' | '-') => {
                let imag = self.parse_imaginary(radix)?;
                TokenKind::Complex(first.to_f64(), imag)
            }
            Some('i') if self.is_delimiter_at(1) => {
                self.bump();
                TokenKind::Complex(0.0, first.to_f64())
            }
            _ => match first {
                Magnitude::Int(value) => TokenKind::Integer(value),
                Magnitude::Rat(numerator, denominator) => {
                    TokenKind::Rational(numerator, denominator)
                }
                Magnitude::Flt(value) => TokenKind::Real(value),
            },
        };
        self.check_delimiter()?;
        Ok(kind)
    }

    fn parse_real(&mut self, radix: u32) -> Result<Magnitude, LexicalError> {
        // only the signed forms +inf.0/-inf.0/+nan.0/-nan.0 exist
        let (signed, negative) = match self.peek() {
            Some('+') => {
                self.bump();
                (true, false)
            }
            Some('-') => {
                self.bump();
                (true, true)
            }
            _ => (false, false),
        };
        if signed && self.rest().starts_with("inf.0") {
            for _ in 0..5 {
                self.bump();
            }
            let value = if negative {
                f64::NEG_INFINITY
            } else {
                f64::INFINITY
            };
            return Ok(Magnitude::Flt(value));
        }
        if signed && self.rest().starts_with("nan.0") {
            for _ in 0..5 {
                self.bump();
            }
            return Ok(Magnitude::Flt(f64::NAN));
        }
        self.parse_unsigned(radix, negative)
    }

    fn parse_imaginary(&mut self, radix: u32) -> Result<f64, LexicalError> {
        let sign = if self.bump() == Some('-') { -1.0 } else { 1.0 };
        if self.peek() == Some('i') && self.is_delimiter_at(1) {
            self.bump();
            return Ok(sign);
        }
        let value = if self.rest().starts_with("inf.0") {
            for _ in 0..5 {
                self.bump();
            }
            f64::INFINITY
        } else if self.rest().starts_with("nan.0") {
            for _ in 0..5 {
                self.bump();
            }
            f64::NAN
        } else {
            self.parse_unsigned(radix, false)?.to_f64()
        };
        if self.peek() != Some('i') {
            return Err(self.error(LexicalErrorKind::ExpectedImaginaryUnit));
        }
        self.bump();
        Ok(sign * value)
    }

    fn parse_unsigned(&mut self, radix: u32, negative: bool) -> Result<Magnitude, LexicalError> {
        let input = self.input;
        let start = self.pos;
        let int_digits = self.eat_digits(radix);
        if radix == 10 {
            let mut is_float = false;
            if self.peek() == Some('.')
                && (int_digits > 0 || self.peek_second().map_or(false, |c| c.is_ascii_digit()))
            {
                self.bump();
                self.eat_digits(10);
                is_float = true;
            }
            if int_digits == 0 && !is_float {
                return Err(self.error(LexicalErrorKind::ExpectedNumber));
            }
            if matches!(self.peek(), Some('e' | 'E')) {
                self.bump();
                if matches!(self.peek(), Some('+' | '-')) {
                    self.bump();
                }
                if self.eat_digits(10) == 0 {
                    return Err(self.error(LexicalErrorKind::ExpectedDigit('e')));
                }
                is_float = true;
            }
            if is_float {
                let value: f64 = input[start..self.pos]
                    .parse()
                    .map_err(|_| self.error(LexicalErrorKind::ExpectedNumber))?;
                return Ok(Magnitude::Flt(if negative { -value } else { value }));
            }
        } else if int_digits == 0 {
            return Err(self.error(LexicalErrorKind::ExpectedNumber));
        }
        let numerator = i64::from_str_radix(&input[start..self.pos], radix)
            .map_err(|_| self.error(LexicalErrorKind::NumberOutOfRange))?;
        let numerator = if negative { -numerator } else { numerator };
        if self.peek() == Some('/') {
            self.bump();
            let denominator_start = self.pos;
            if self.eat_digits(radix) == 0 {
                return Err(self.error(LexicalErrorKind::ExpectedDigit('/')));
            }
            let denominator = i64::from_str_radix(&input[denominator_start..self.pos], radix)
                .map_err(|_| self.error(LexicalErrorKind::NumberOutOfRange))?;
            return Ok(Magnitude::Rat(numerator, denominator));
        }
        Ok(Magnitude::Int(numerator))
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Result<Token, LexicalError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.skip_whitespace();
        self.peek()?;
        let start = self.pos;
        let line = self.line;
        let column = self.column;
        let result = self.lex_kind();
        Some(result.map(|kind| Token {
            kind,
            text: self.input[start..self.pos].to_owned(),
            line,
            column,
            offset: start,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<Result<TokenKind, LexicalErrorKind>> {
        Lexer::new(input)
            .map(|result| result.map(|token| token.kind).map_err(|error| error.kind))
            .collect()
    }

    fn single(input: &str) -> TokenKind {
        let mut lexer = Lexer::new(input);
        let token = lexer.next().expect("one token").expect("valid token");
        assert_eq!(lexer.next(), None, "input {:?} left extra tokens", input);
        token.kind
    }

    #[test]
    fn test_simple_tokens() {
        assert_eq!(
            kinds("(+ 1 2)"),
            vec![
                Ok(TokenKind::LParen),
                Ok(TokenKind::Ident("+".into())),
                Ok(TokenKind::Integer(1)),
                Ok(TokenKind::Integer(2)),
                Ok(TokenKind::RParen),
            ]
        );
        assert_eq!(
            kinds("'a `b ,c ,@d"),
            vec![
                Ok(TokenKind::Quote),
                Ok(TokenKind::Ident("a".into())),
                Ok(TokenKind::Quasiquote),
                Ok(TokenKind::Ident("b".into())),
                Ok(TokenKind::Unquote),
                Ok(TokenKind::Ident("c".into())),
                Ok(TokenKind::UnquoteSplicing),
                Ok(TokenKind::Ident("d".into())),
            ]
        );
        assert_eq!(
            kinds("#(1) #u8(2) (a . b)"),
            vec![
                Ok(TokenKind::VectorOpen),
                Ok(TokenKind::Integer(1)),
                Ok(TokenKind::RParen),
                Ok(TokenKind::ByteVectorOpen),
                Ok(TokenKind::Integer(2)),
                Ok(TokenKind::RParen),
                Ok(TokenKind::LParen),
                Ok(TokenKind::Ident("a".into())),
                Ok(TokenKind::Dot),
                Ok(TokenKind::Ident("b".into())),
                Ok(TokenKind::RParen),
            ]
        );
    }

    #[test]
    fn test_radix_and_exactness_prefixes() {
        let tests = vec![
            ("#b10110", TokenKind::Integer(22)),
            ("#o777", TokenKind::Integer(511)),
            ("#o#I3324", TokenKind::Integer(1748)),
            ("#d999", TokenKind::Integer(999)),
            ("#x1A", TokenKind::Integer(26)),
            ("#E1234/5678", TokenKind::Rational(1234, 5678)),
            ("#X1a2B/C28a", TokenKind::Rational(6699, 49802)),
            ("#b-101", TokenKind::Integer(-5)),
        ];
        for (input, expected) in tests {
            assert_eq!(single(input), expected, "input {:?}", input);
        }
    }

    #[test]
    fn test_decimal_numbers() {
        let tests = vec![
            ("0", TokenKind::Integer(0)),
            ("-42", TokenKind::Integer(-42)),
            ("12.34", TokenKind::Real(12.34)),
            ("-0.5", TokenKind::Real(-0.5)),
            (".5", TokenKind::Real(0.5)),
            ("5.", TokenKind::Real(5.0)),
            ("1e3", TokenKind::Real(1000.0)),
            ("6.02e23", TokenKind::Real(6.02e23)),
            ("1E-2", TokenKind::Real(0.01)),
            ("3/4", TokenKind::Rational(3, 4)),
            ("-3/4", TokenKind::Rational(-3, 4)),
            ("+inf.0", TokenKind::Real(f64::INFINITY)),
            ("-inf.0", TokenKind::Real(f64::NEG_INFINITY)),
        ];
        for (input, expected) in tests {
            assert_eq!(single(input), expected, "input {:?}", input);
        }

        match single("+nan.0") {
            TokenKind::Real(value) => assert!(value.is_nan()),
            other => panic!("expected a real, got {:?}", other),
        }
    }

    #[test]
    fn test_complex_numbers() {
        let tests = vec![
            ("12.34-567.1i", TokenKind::Complex(12.34, -567.1)),
            ("3+4i", TokenKind::Complex(3.0, 4.0)),
            ("1-i", TokenKind::Complex(1.0, -1.0)),
            ("+i", TokenKind::Complex(0.0, 1.0)),
            ("-i", TokenKind::Complex(0.0, -1.0)),
            ("+inf.0i", TokenKind::Complex(0.0, f64::INFINITY)),
            ("-2/3i", TokenKind::Complex(0.0, -2.0 / 3.0)),
            (
                "10@10",
                TokenKind::Complex(10.0 * 10f64.cos(), 10.0 * 10f64.sin()),
            ),
            (
                "#b10@10",
                TokenKind::Complex(2.0 * 2f64.cos(), 2.0 * 2f64.sin()),
            ),
            (
                "#o10@10",
                TokenKind::Complex(8.0 * 8f64.cos(), 8.0 * 8f64.sin()),
            ),
            (
                "#x10@10",
                TokenKind::Complex(16.0 * 16f64.cos(), 16.0 * 16f64.sin()),
            ),
        ];
        for (input, expected) in tests {
            assert_eq!(single(input), expected, "input {:?}", input);
        }
    }

    #[test]
    fn test_identifiers() {
        let tests = vec![
            "foo",
            "list->vector",
            "->foo",
            "+",
            "-",
            "...",
            "set!",
            "string<=?",
            "+soup+",
            // without a sign these spell identifiers, not numbers
            "inf.0",
            "nan.0",
        ];
        for input in tests {
            assert_eq!(
                single(input),
                TokenKind::Ident(input.into()),
                "input {:?}",
                input
            );
        }

        assert_eq!(single("|two words|"), TokenKind::Ident("two words".into()));
        assert_eq!(single("|a\\x41b|"), TokenKind::Ident("aAb".into()));
        assert_eq!(single("|pipe \\| bar|"), TokenKind::Ident("pipe | bar".into()));
        // pipe identifiers share the string escape set
        assert_eq!(single("|a\\\"b|"), TokenKind::Ident("a\"b".into()));
        assert_eq!(single("|a\\nb|"), TokenKind::Ident("a\nb".into()));
        assert_eq!(single("|a\\\n  b|"), TokenKind::Ident("ab".into()));
    }

    #[test]
    fn test_characters() {
        let tests = vec![
            ("#\\a", 'a'),
            ("#\\Z", 'Z'),
            ("#\\(", '('),
            ("#\\space", ' '),
            ("#\\Newline", '\n'),
            ("#\\TAB", '\t'),
            ("#\\x41", 'A'),
            ("#\\x", 'x'),
        ];
        for (input, expected) in tests {
            assert_eq!(single(input), TokenKind::Char(expected), "input {:?}", input);
        }
    }

    #[test]
    fn test_strings() {
        let tests = vec![
            (r#""hello""#, "hello"),
            (r#""a\nb""#, "a\nb"),
            (r#""quote \" slash \\""#, "quote \" slash \\"),
            (r#""\x41\x42""#, "AB"),
            ("\"one \\\n  two\"", "one two"),
            ("\"one \\ \n  two\"", "one two"),
        ];
        for (input, expected) in tests {
            assert_eq!(
                single(input),
                TokenKind::Str(expected.to_owned()),
                "input {:?}",
                input
            );
        }

        // a closing quote is itself a delimiter for the next token
        assert_eq!(
            kinds("\"a\"\"b\""),
            vec![
                Ok(TokenKind::Str("a".to_owned())),
                Ok(TokenKind::Str("b".to_owned())),
            ]
        );
    }

    #[test]
    fn test_comments() {
        assert_eq!(
            kinds("; hi\n1"),
            vec![
                Ok(TokenKind::Comment(" hi".to_owned())),
                Ok(TokenKind::Integer(1)),
            ]
        );
        assert_eq!(
            single("#|#||#|#"),
            TokenKind::Comment("#||#".to_owned())
        );
        assert_eq!(
            kinds("1 #| dead |# 2"),
            vec![
                Ok(TokenKind::Integer(1)),
                Ok(TokenKind::Comment(" dead ".to_owned())),
                Ok(TokenKind::Integer(2)),
            ]
        );
    }

    #[test]
    fn test_errors_and_recovery() {
        assert_eq!(
            kinds("#|abc"),
            vec![Err(LexicalErrorKind::UnterminatedBlockComment)]
        );
        assert_eq!(
            kinds("123abc"),
            vec![
                Err(LexicalErrorKind::MissingDelimiter),
                Ok(TokenKind::Ident("abc".into())),
            ]
        );
        assert_eq!(
            kinds("\"abc"),
            vec![Err(LexicalErrorKind::UnterminatedString)]
        );
        assert_eq!(
            kinds("#q 1"),
            vec![
                Err(LexicalErrorKind::InvalidNumberPrefix('q')),
                Ok(TokenKind::Integer(1)),
            ]
        );
        assert_eq!(
            kinds("#\\frobnicate"),
            vec![Err(LexicalErrorKind::InvalidCharacterName)]
        );
        assert_eq!(
            kinds("#troo"),
            vec![Err(LexicalErrorKind::InvalidBoolean)]
        );
        assert_eq!(
            kinds("1e 2"),
            vec![
                Err(LexicalErrorKind::ExpectedDigit('e')),
                Ok(TokenKind::Integer(2)),
            ]
        );
        assert_eq!(
            kinds("3/ 4"),
            vec![
                Err(LexicalErrorKind::ExpectedDigit('/')),
                Ok(TokenKind::Integer(4)),
            ]
        );
        assert_eq!(
            kinds("3+2j"),
            vec![
                Err(LexicalErrorKind::ExpectedImaginaryUnit),
                Ok(TokenKind::Ident("j".into())),
            ]
        );
        assert_eq!(
            kinds("#u16(1)"),
            vec![
                Err(LexicalErrorKind::InvalidByteVectorOpen),
                Ok(TokenKind::Integer(16)),
                Ok(TokenKind::LParen),
                Ok(TokenKind::Integer(1)),
                Ok(TokenKind::RParen),
            ]
        );
        assert_eq!(
            kinds("99999999999999999999"),
            vec![Err(LexicalErrorKind::NumberOutOfRange)]
        );
        assert_eq!(
            kinds("#dinf.0"),
            vec![
                Err(LexicalErrorKind::ExpectedNumber),
                Ok(TokenKind::Ident("inf.0".into())),
            ]
        );
        assert_eq!(
            kinds("\"a\"b"),
            vec![
                Err(LexicalErrorKind::MissingDelimiter),
                Ok(TokenKind::Ident("b".into())),
            ]
        );
        assert_eq!(
            kinds("|a|b"),
            vec![
                Err(LexicalErrorKind::MissingDelimiter),
                Ok(TokenKind::Ident("b".into())),
            ]
        );
    }

    #[test]
    fn test_booleans() {
        let tests = vec![
            ("#t", true),
            ("#T", true),
            ("#true", true),
            ("#f", false),
            ("#False", false),
        ];
        for (input, expected) in tests {
            assert_eq!(single(input), TokenKind::Bool(expected), "input {:?}", input);
        }
    }

    #[test]
    fn test_positions() {
        let tokens: Vec<Token> = Lexer::new("ab\n  cd")
            .collect::<Result<_, _>>()
            .expect("valid tokens");
        assert_eq!((tokens[0].line, tokens[0].column), (1, 1));
        assert_eq!((tokens[1].line, tokens[1].column), (2, 3));
        assert_eq!(tokens[1].offset, 5);

        let tokens: Vec<Token> = Lexer::with_start_line("x", 7)
            .collect::<Result<_, _>>()
            .expect("valid tokens");
        assert_eq!(tokens[0].line, 7);
    }

    #[test]
    fn test_token_text() {
        let tests = vec!["#x1A", "#\\space", "'", "12.34-567.1i", "|two words|"];
        for input in tests {
            let mut lexer = Lexer::new(input);
            let token = lexer.next().expect("one token").expect("valid token");
            assert_eq!(token.text, input);
        }
    }

    #[test]
    fn test_token_text_relexes_to_same_kind() {
        let input = "(+ 1/2 #x1A #\\space \"s\" |p q| 3+4i 2.5 #t foo '`)";
        let tokens: Vec<Token> = Lexer::new(input)
            .collect::<Result<_, _>>()
            .expect("valid tokens");
        for token in tokens {
            let again = Lexer::new(&token.text)
                .next()
                .expect("one token")
                .expect("valid token");
            assert_eq!(again.kind, token.kind, "token {:?}", token.text);
        }
    }
}
