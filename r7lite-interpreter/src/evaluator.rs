use std::rc::Rc;

use r7lite_core::ast::Expression;

use crate::environment::Environment;
use crate::value::{EvaluationError, Value};

/// Tree-walking evaluator. Runtime errors never abort evaluation: they
/// are recorded as diagnostics and the failing sub-expression yields
/// `()` so the surrounding computation can keep going.
pub struct Interpreter {
    environment: Environment,
    diagnostics: Vec<EvaluationError>,
}

impl Interpreter {
    pub fn new() -> Self {
        Interpreter::with_environment(Environment::new())
    }

    pub fn with_environment(environment: Environment) -> Self {
        Interpreter {
            environment,
            diagnostics: Vec::new(),
        }
    }

    pub fn take_diagnostics(&mut self) -> Vec<EvaluationError> {
        std::mem::take(&mut self.diagnostics)
    }

    fn report(&mut self, error: EvaluationError) -> Rc<Value> {
        self.diagnostics.push(error);
        Value::nil()
    }

    pub fn eval(&mut self, expression: &Expression) -> Rc<Value> {
        match expression {
            Expression::Identifier(name) => match self.environment.get(name) {
                Some(value) => value,
                None => self.report(EvaluationError::UnboundIdentifier(name.clone())),
            },
            Expression::BoolLiteral(value) => Value::boolean(*value),
            Expression::CharLiteral(value) => Rc::new(Value::Char(*value)),
            Expression::IntegerLiteral(value) => Value::integer(*value),
            Expression::RationalLiteral(numerator, denominator) => {
                Rc::new(Value::Rational(*numerator, *denominator))
            }
            Expression::RealLiteral(value) => Rc::new(Value::Real(*value)),
            Expression::ComplexLiteral(real, imag) => Rc::new(Value::Complex(*real, *imag)),
            Expression::StringLiteral(value) => Rc::new(Value::String(value.as_str().into())),
            Expression::Vector(elements) => {
                let values = elements.iter().map(|element| self.eval(element)).collect();
                Rc::new(Value::Vector(values))
            }
            Expression::ByteVector(bytes) => Rc::new(Value::ByteVector(bytes.clone())),
            Expression::QuotedExpression(inner) => quote_value(inner),
            // quasiquote is shallow: only an immediately unquoted
            // operand is evaluated, everything else quotes
            Expression::QuasiQuotedExpression(inner) => match inner.as_ref() {
                Expression::UnquotedElement(unquoted) => self.eval(unquoted),
                other => quote_value(other),
            },
            Expression::UnquotedElement(inner) => self.eval(inner),
            Expression::Cons { car, cdr } => self.eval_application(car, cdr),
            Expression::Nil => Value::nil(),
        }
    }

    fn eval_application(&mut self, car: &Expression, cdr: &Expression) -> Rc<Value> {
        let procedure = self.eval(car);
        let builtin = match procedure.as_ref() {
            Value::Procedure(builtin) => *builtin,
            _ => return self.report(EvaluationError::NotAProcedure(procedure)),
        };

        let mut arguments = Vec::new();
        let mut rest = cdr;
        loop {
            match rest {
                Expression::Cons { car, cdr } => {
                    arguments.push(self.eval(car));
                    rest = cdr;
                }
                Expression::Nil => break,
                _ => return self.report(EvaluationError::ImproperArgumentList),
            }
        }

        if let Some(expected) = builtin.arity {
            if arguments.len() != expected {
                return self.report(EvaluationError::WrongArgumentCount {
                    name: builtin.name,
                    expected,
                    actual: arguments.len(),
                });
            }
        }

        match (builtin.func)(&arguments) {
            Ok(value) => value,
            Err(error) => self.report(error),
        }
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Interpreter::new()
    }
}

/// Converts a quoted expression tree into a value tree without any
/// evaluation. Identifiers become symbols; quote markers that were
/// parsed inside the quoted region come back as tagged lists.
fn quote_value(expression: &Expression) -> Rc<Value> {
    match expression {
        Expression::Identifier(name) => Value::symbol(name.clone()),
        Expression::BoolLiteral(value) => Value::boolean(*value),
        Expression::CharLiteral(value) => Rc::new(Value::Char(*value)),
        Expression::IntegerLiteral(value) => Value::integer(*value),
        Expression::RationalLiteral(numerator, denominator) => {
            Rc::new(Value::Rational(*numerator, *denominator))
        }
        Expression::RealLiteral(value) => Rc::new(Value::Real(*value)),
        Expression::ComplexLiteral(real, imag) => Rc::new(Value::Complex(*real, *imag)),
        Expression::StringLiteral(value) => Rc::new(Value::String(value.as_str().into())),
        Expression::Vector(elements) => {
            Rc::new(Value::Vector(elements.iter().map(quote_value).collect()))
        }
        Expression::ByteVector(bytes) => Rc::new(Value::ByteVector(bytes.clone())),
        Expression::QuotedExpression(inner) => tagged_list("quote", inner),
        Expression::QuasiQuotedExpression(inner) => tagged_list("quasiquote", inner),
        Expression::UnquotedElement(inner) => tagged_list("unquote", inner),
        Expression::Cons { car, cdr } => Rc::new(Value::Cons {
            car: quote_value(car),
            cdr: quote_value(cdr),
        }),
        Expression::Nil => Value::nil(),
    }
}

fn tagged_list(tag: &str, inner: &Expression) -> Rc<Value> {
    Rc::new(Value::Cons {
        car: Value::symbol(tag.into()),
        cdr: Rc::new(Value::Cons {
            car: quote_value(inner),
            cdr: Value::nil(),
        }),
    })
}
