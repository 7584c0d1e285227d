use std::fmt;
use std::rc::Rc;

use r7lite_core::ast;

thread_local! {
    static NIL: Rc<Value> = Rc::new(Value::Nil);
    static TRUE: Rc<Value> = Rc::new(Value::Bool(true));
    static FALSE: Rc<Value> = Rc::new(Value::Bool(false));
}

/// A runtime value. Values are shared through `Rc`, so `eq?` identity
/// on aggregates is pointer identity of the cells.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Nil,
    Bool(bool),
    Char(char),
    Integer(i64),
    Rational(i64, i64),
    Real(f64),
    Complex(f64, f64),
    String(Rc<str>),
    Symbol(Rc<str>),
    Cons { car: Rc<Value>, cdr: Rc<Value> },
    Vector(Vec<Rc<Value>>),
    ByteVector(Vec<u8>),
    Procedure(Builtin),
}

impl Value {
    pub fn nil() -> Rc<Value> {
        NIL.with(Rc::clone)
    }

    pub fn boolean(value: bool) -> Rc<Value> {
        if value {
            TRUE.with(Rc::clone)
        } else {
            FALSE.with(Rc::clone)
        }
    }

    pub fn integer(value: i64) -> Rc<Value> {
        Rc::new(Value::Integer(value))
    }

    pub fn symbol(name: Rc<str>) -> Rc<Value> {
        Rc::new(Value::Symbol(name))
    }
}

/// A native procedure. `arity` of `None` means variadic; a fixed arity
/// is enforced by the evaluator before the call.
#[derive(Clone, Copy)]
pub struct Builtin {
    pub name: &'static str,
    pub arity: Option<usize>,
    pub func: fn(&[Rc<Value>]) -> Result<Rc<Value>, EvaluationError>,
}

impl PartialEq for Builtin {
    fn eq(&self, other: &Self) -> bool {
        self.func as usize == other.func as usize
    }
}

impl fmt::Debug for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Builtin").field("name", &self.name).finish()
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvaluationError {
    #[error("Unknown identifier: {0}")]
    UnboundIdentifier(Rc<str>),
    #[error("not a procedure: {0}")]
    NotAProcedure(Rc<Value>),
    #[error("{name} expects {expected} arguments, got {actual}")]
    WrongArgumentCount {
        name: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("{0} expects at least one argument")]
    MissingArguments(&'static str),
    #[error("division by zero")]
    DivisionByZero,
    #[error("cannot compare {0}")]
    IncomparableOperand(Rc<Value>),
    #[error("improper argument list")]
    ImproperArgumentList,
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "()"),
            Value::Bool(true) => write!(f, "#t"),
            Value::Bool(false) => write!(f, "#f"),
            Value::Char(ch) => ast::write_char(f, *ch),
            Value::Integer(value) => write!(f, "{}", value),
            Value::Rational(numerator, denominator) => {
                write!(f, "{}/{}", numerator, denominator)
            }
            Value::Real(value) => ast::write_real(f, *value),
            Value::Complex(real, imag) => ast::write_complex(f, *real, *imag),
            Value::String(value) => ast::write_string(f, value),
            Value::Symbol(name) => write!(f, "{}", name),
            Value::Cons { car, cdr } => {
                write!(f, "({}", car)?;
                let mut rest = cdr.as_ref();
                loop {
                    match rest {
                        Value::Cons { car, cdr } => {
                            write!(f, " {}", car)?;
                            rest = cdr;
                        }
                        Value::Nil => break,
                        other => {
                            write!(f, " . {}", other)?;
                            break;
                        }
                    }
                }
                write!(f, ")")
            }
            Value::Vector(elements) => {
                write!(f, "#(")?;
                for (i, element) in elements.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", element)?;
                }
                write!(f, ")")
            }
            Value::ByteVector(bytes) => {
                write!(f, "#u8(")?;
                for (i, byte) in bytes.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", byte)?;
                }
                write!(f, ")")
            }
            Value::Procedure(builtin) => write!(f, "#<procedure {}>", builtin.name),
        }
    }
}
