use std::cmp::Ordering;
use std::rc::Rc;

use crate::numeric::{self, Number};
use crate::value::{Builtin, EvaluationError, Value};

static BUILTINS: &[Builtin] = &[
    Builtin { name: "+", arity: None, func: builtin_add },
    Builtin { name: "-", arity: None, func: builtin_sub },
    Builtin { name: "*", arity: None, func: builtin_mul },
    Builtin { name: "/", arity: None, func: builtin_div },
    Builtin { name: "<", arity: None, func: builtin_lt },
    Builtin { name: ">", arity: None, func: builtin_gt },
    Builtin { name: "<=", arity: None, func: builtin_le },
    Builtin { name: ">=", arity: None, func: builtin_ge },
    Builtin { name: "=", arity: None, func: builtin_num_eq },
    Builtin { name: "eq?", arity: Some(2), func: builtin_eq },
    Builtin { name: "eqv?", arity: Some(2), func: builtin_eqv },
    Builtin { name: "equal?", arity: Some(2), func: builtin_equal },
    Builtin { name: "if", arity: Some(3), func: builtin_if },
    Builtin { name: "or", arity: None, func: builtin_or },
];

pub fn all() -> impl Iterator<Item = &'static Builtin> {
    BUILTINS.iter()
}

/// Folds `+` and `*`. A non-numeric operand quietly ends the fold and
/// the accumulator so far is the result.
fn fold_arithmetic(
    identity: Number,
    args: &[Rc<Value>],
    op: fn(Number, Number) -> Number,
) -> Rc<Value> {
    let mut accumulator = identity;
    for arg in args {
        match numeric::classify(arg) {
            Some(number) => accumulator = op(accumulator, number),
            None => break,
        }
    }
    accumulator.into_value()
}

fn builtin_add(args: &[Rc<Value>]) -> Result<Rc<Value>, EvaluationError> {
    Ok(fold_arithmetic(Number::Int(0), args, Number::add))
}

fn builtin_mul(args: &[Rc<Value>]) -> Result<Rc<Value>, EvaluationError> {
    Ok(fold_arithmetic(Number::Int(1), args, Number::mul))
}

fn builtin_sub(args: &[Rc<Value>]) -> Result<Rc<Value>, EvaluationError> {
    let (first, rest) = args
        .split_first()
        .ok_or(EvaluationError::MissingArguments("-"))?;
    let mut accumulator = match numeric::classify(first) {
        Some(number) => number,
        None => return Ok(first.clone()),
    };
    if rest.is_empty() {
        return Ok(accumulator.negate().into_value());
    }
    for arg in rest {
        match numeric::classify(arg) {
            Some(number) => accumulator = accumulator.sub(number),
            None => break,
        }
    }
    Ok(accumulator.into_value())
}

fn builtin_div(args: &[Rc<Value>]) -> Result<Rc<Value>, EvaluationError> {
    let (first, rest) = args
        .split_first()
        .ok_or(EvaluationError::MissingArguments("/"))?;
    let mut accumulator = match numeric::classify(first) {
        Some(number) => number,
        None => return Ok(first.clone()),
    };
    if rest.is_empty() {
        return Ok(accumulator.invert()?.into_value());
    }
    for arg in rest {
        match numeric::classify(arg) {
            Some(number) => accumulator = accumulator.div(number)?,
            None => break,
        }
    }
    Ok(accumulator.into_value())
}

/// Chained comparison over adjacent pairs: `(< a b c)` holds when
/// `a < b` and `b < c`.
fn fold_comparison(
    args: &[Rc<Value>],
    accept: fn(Ordering) -> bool,
) -> Result<Rc<Value>, EvaluationError> {
    for pair in args.windows(2) {
        let left = numeric::classify(&pair[0])
            .ok_or_else(|| EvaluationError::IncomparableOperand(pair[0].clone()))?;
        let right = numeric::classify(&pair[1])
            .ok_or_else(|| EvaluationError::IncomparableOperand(pair[1].clone()))?;
        match left.compare(right) {
            Some(ordering) if accept(ordering) => {}
            Some(_) => return Ok(Value::boolean(false)),
            None => return Err(EvaluationError::IncomparableOperand(pair[1].clone())),
        }
    }
    Ok(Value::boolean(true))
}

fn builtin_lt(args: &[Rc<Value>]) -> Result<Rc<Value>, EvaluationError> {
    fold_comparison(args, |ordering| ordering == Ordering::Less)
}

fn builtin_gt(args: &[Rc<Value>]) -> Result<Rc<Value>, EvaluationError> {
    fold_comparison(args, |ordering| ordering == Ordering::Greater)
}

fn builtin_le(args: &[Rc<Value>]) -> Result<Rc<Value>, EvaluationError> {
    fold_comparison(args, |ordering| ordering != Ordering::Greater)
}

fn builtin_ge(args: &[Rc<Value>]) -> Result<Rc<Value>, EvaluationError> {
    fold_comparison(args, |ordering| ordering != Ordering::Less)
}

fn builtin_num_eq(args: &[Rc<Value>]) -> Result<Rc<Value>, EvaluationError> {
    for pair in args.windows(2) {
        let left = numeric::classify(&pair[0])
            .ok_or_else(|| EvaluationError::IncomparableOperand(pair[0].clone()))?;
        let right = numeric::classify(&pair[1])
            .ok_or_else(|| EvaluationError::IncomparableOperand(pair[1].clone()))?;
        if !left.equal(right) {
            return Ok(Value::boolean(false));
        }
    }
    Ok(Value::boolean(true))
}

/// `eq?`/`eqv?` kernel: value equality for atoms, pointer identity for
/// aggregates.
fn shallow_eq(left: &Rc<Value>, right: &Rc<Value>) -> bool {
    if let (Some(a), Some(b)) = (numeric::classify(left), numeric::classify(right)) {
        return a.eqv(b);
    }
    match (left.as_ref(), right.as_ref()) {
        (Value::Nil, Value::Nil) => true,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Char(a), Value::Char(b)) => a == b,
        (Value::Symbol(a), Value::Symbol(b)) => a == b,
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Cons { .. }, Value::Cons { .. })
        | (Value::Vector(_), Value::Vector(_))
        | (Value::ByteVector(_), Value::ByteVector(_)) => Rc::ptr_eq(left, right),
        (Value::Procedure(a), Value::Procedure(b)) => a == b,
        _ => false,
    }
}

fn structural_eq(left: &Rc<Value>, right: &Rc<Value>) -> bool {
    match (left.as_ref(), right.as_ref()) {
        (Value::Cons { car: a, cdr: b }, Value::Cons { car: c, cdr: d }) => {
            structural_eq(a, c) && structural_eq(b, d)
        }
        (Value::Vector(a), Value::Vector(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| structural_eq(x, y))
        }
        (Value::ByteVector(a), Value::ByteVector(b)) => a == b,
        _ => shallow_eq(left, right),
    }
}

fn builtin_eqv(args: &[Rc<Value>]) -> Result<Rc<Value>, EvaluationError> {
    Ok(Value::boolean(shallow_eq(&args[0], &args[1])))
}

fn builtin_eq(args: &[Rc<Value>]) -> Result<Rc<Value>, EvaluationError> {
    builtin_eqv(args)
}

fn builtin_equal(args: &[Rc<Value>]) -> Result<Rc<Value>, EvaluationError> {
    Ok(Value::boolean(structural_eq(&args[0], &args[1])))
}

/// Both branches were already evaluated by the time the call happens,
/// so this only selects between the two computed values.
fn builtin_if(args: &[Rc<Value>]) -> Result<Rc<Value>, EvaluationError> {
    if matches!(args[0].as_ref(), Value::Bool(false)) {
        Ok(args[2].clone())
    } else {
        Ok(args[1].clone())
    }
}

fn builtin_or(args: &[Rc<Value>]) -> Result<Rc<Value>, EvaluationError> {
    for arg in args {
        if !matches!(arg.as_ref(), Value::Bool(false)) {
            return Ok(arg.clone());
        }
    }
    Ok(Value::boolean(false))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold_stops_at_non_number() {
        let args = vec![
            Value::integer(1),
            Value::integer(2),
            Rc::new(Value::String("x".into())),
            Value::integer(100),
        ];
        assert_eq!(
            builtin_add(&args),
            Ok(Value::integer(3)),
            "the fold should stop quietly at the string"
        );
    }

    #[test]
    fn test_sub_and_div_unary() {
        assert_eq!(builtin_sub(&[Value::integer(5)]), Ok(Value::integer(-5)));
        assert_eq!(
            builtin_div(&[Value::integer(2)]),
            Ok(Rc::new(Value::Rational(1, 2)))
        );
        assert_eq!(builtin_sub(&[]), Err(EvaluationError::MissingArguments("-")));
    }

    #[test]
    fn test_shallow_and_structural_equality() {
        let list = Rc::new(Value::Cons {
            car: Value::integer(1),
            cdr: Value::nil(),
        });
        let same_shape = Rc::new(Value::Cons {
            car: Value::integer(1),
            cdr: Value::nil(),
        });
        assert!(shallow_eq(&list, &list.clone()));
        assert!(!shallow_eq(&list, &same_shape));
        assert!(structural_eq(&list, &same_shape));

        assert!(shallow_eq(
            &Rc::new(Value::Symbol("a".into())),
            &Rc::new(Value::Symbol("a".into()))
        ));
        assert!(!shallow_eq(&Value::integer(1), &Rc::new(Value::Real(1.0))));
        assert!(shallow_eq(
            &Rc::new(Value::Rational(1, 2)),
            &Rc::new(Value::Rational(2, 4))
        ));
    }

    #[test]
    fn test_comparisons() {
        let one = Value::integer(1);
        let two = Value::integer(2);
        let half = Rc::new(Value::Rational(1, 2));
        assert_eq!(
            builtin_lt(&[half.clone(), one.clone(), two.clone()]),
            Ok(Value::boolean(true))
        );
        assert_eq!(
            builtin_ge(&[one.clone(), two.clone()]),
            Ok(Value::boolean(false))
        );
        assert_eq!(
            builtin_num_eq(&[one.clone(), Rc::new(Value::Rational(1, 1))]),
            Ok(Value::boolean(true))
        );
        assert!(matches!(
            builtin_lt(&[one, Rc::new(Value::Complex(1.0, 1.0))]),
            Err(EvaluationError::IncomparableOperand(_))
        ));
    }

    #[test]
    fn test_if_and_or_select_computed_values() {
        let one = Value::integer(1);
        let two = Value::integer(2);
        assert_eq!(
            builtin_if(&[Value::boolean(false), one.clone(), two.clone()]),
            Ok(two.clone())
        );
        // anything that is not #f counts as true
        assert_eq!(
            builtin_if(&[Value::nil(), one.clone(), two.clone()]),
            Ok(one.clone())
        );
        assert_eq!(
            builtin_or(&[Value::boolean(false), two.clone(), one]),
            Ok(two)
        );
        assert_eq!(builtin_or(&[]), Ok(Value::boolean(false)));
    }
}
