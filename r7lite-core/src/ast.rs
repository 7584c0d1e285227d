use std::fmt;
use std::rc::Rc;

/// One parsed S-expression node. A well-formed list is a right-leaning
/// chain of `Cons` terminated by `Nil`; a dotted pair is a chain whose
/// final cdr is neither `Nil` nor `Cons`.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Identifier(Rc<str>),
    BoolLiteral(bool),
    CharLiteral(char),
    IntegerLiteral(i64),
    RationalLiteral(i64, i64),
    RealLiteral(f64),
    ComplexLiteral(f64, f64),
    StringLiteral(String),
    Vector(Vec<Expression>),
    ByteVector(Vec<u8>),
    QuotedExpression(Box<Expression>),
    QuasiQuotedExpression(Box<Expression>),
    UnquotedElement(Box<Expression>),
    Cons {
        car: Box<Expression>,
        cdr: Box<Expression>,
    },
    Nil,
}

pub fn write_char(f: &mut fmt::Formatter<'_>, ch: char) -> fmt::Result {
    let name = match ch {
        '\0' => "null",
        '\x07' => "alarm",
        '\x08' => "backspace",
        '\t' => "tab",
        '\n' => "newline",
        '\r' => "return",
        '\x1b' => "escape",
        ' ' => "space",
        '\x7f' => "delete",
        _ => return write!(f, "#\\{}", ch),
    };
    write!(f, "#\\{}", name)
}

pub fn write_real(f: &mut fmt::Formatter<'_>, value: f64) -> fmt::Result {
    if value.is_nan() {
        write!(f, "+nan.0")
    } else if value.is_infinite() {
        write!(f, "{}", if value > 0.0 { "+inf.0" } else { "-inf.0" })
    } else {
        write!(f, "{:?}", value)
    }
}

pub fn write_complex(f: &mut fmt::Formatter<'_>, real: f64, imag: f64) -> fmt::Result {
    write_real(f, real)?;
    // inf/nan render with their own sign
    if imag.is_finite() && !imag.is_sign_negative() {
        write!(f, "+")?;
    }
    write_real(f, imag)?;
    write!(f, "i")
}

pub fn write_string(f: &mut fmt::Formatter<'_>, value: &str) -> fmt::Result {
    write!(f, "\"")?;
    for ch in value.chars() {
        match ch {
            '"' => write!(f, "\\\"")?,
            '\\' => write!(f, "\\\\")?,
            '\n' => write!(f, "\\n")?,
            '\t' => write!(f, "\\t")?,
            '\r' => write!(f, "\\r")?,
            _ => write!(f, "{}", ch)?,
        }
    }
    write!(f, "\"")
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Identifier(name) => write!(f, "{}", name),
            Expression::BoolLiteral(true) => write!(f, "#t"),
            Expression::BoolLiteral(false) => write!(f, "#f"),
            Expression::CharLiteral(ch) => write_char(f, *ch),
            Expression::IntegerLiteral(value) => write!(f, "{}", value),
            Expression::RationalLiteral(numerator, denominator) => {
                write!(f, "{}/{}", numerator, denominator)
            }
            Expression::RealLiteral(value) => write_real(f, *value),
            Expression::ComplexLiteral(real, imag) => write_complex(f, *real, *imag),
            Expression::StringLiteral(value) => write_string(f, value),
            Expression::Vector(elements) => {
                write!(f, "#(")?;
                for (i, element) in elements.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", element)?;
                }
                write!(f, ")")
            }
            Expression::ByteVector(bytes) => {
                write!(f, "#u8(")?;
                for (i, byte) in bytes.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", byte)?;
                }
                write!(f, ")")
            }
            Expression::QuotedExpression(inner) => write!(f, "'{}", inner),
            Expression::QuasiQuotedExpression(inner) => write!(f, "`{}", inner),
            Expression::UnquotedElement(inner) => write!(f, ",{}", inner),
            Expression::Cons { car, cdr } => {
                write!(f, "({}", car)?;
                let mut rest = cdr.as_ref();
                loop {
                    match rest {
                        Expression::Cons { car, cdr } => {
                            write!(f, " {}", car)?;
                            rest = cdr;
                        }
                        Expression::Nil => break,
                        other => {
                            write!(f, " . {}", other)?;
                            break;
                        }
                    }
                }
                write!(f, ")")
            }
            Expression::Nil => write!(f, "()"),
        }
    }
}
