use std::cmp::Ordering;
use std::rc::Rc;

use crate::value::{EvaluationError, Value};

/// The numeric tower, ordered by promotion: an operation on two numbers
/// is carried out at the wider of the two kinds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Number {
    Int(i64),
    Rat(i64, i64),
    Real(f64),
    Complex(f64, f64),
}

pub(crate) fn classify(value: &Value) -> Option<Number> {
    match *value {
        Value::Integer(v) => Some(Number::Int(v)),
        Value::Rational(n, d) => Some(Number::Rat(n, d)),
        Value::Real(v) => Some(Number::Real(v)),
        Value::Complex(re, im) => Some(Number::Complex(re, im)),
        _ => None,
    }
}

/// Rationals are kept unreduced. When an unreduced intermediate no
/// longer fits in i64 the result degrades to a real instead of
/// panicking.
fn make_rat(numerator: i128, denominator: i128) -> Number {
    match (i64::try_from(numerator), i64::try_from(denominator)) {
        (Ok(n), Ok(d)) => Number::Rat(n, d),
        _ => Number::Real(numerator as f64 / denominator as f64),
    }
}

fn rat_add(a: i64, b: i64, c: i64, d: i64) -> Number {
    make_rat(
        a as i128 * d as i128 + c as i128 * b as i128,
        b as i128 * d as i128,
    )
}

fn rat_sub(a: i64, b: i64, c: i64, d: i64) -> Number {
    make_rat(
        a as i128 * d as i128 - c as i128 * b as i128,
        b as i128 * d as i128,
    )
}

fn rat_mul(a: i64, b: i64, c: i64, d: i64) -> Number {
    make_rat(a as i128 * c as i128, b as i128 * d as i128)
}

fn cross_compare(a: i64, b: i64, c: i64, d: i64) -> Option<Ordering> {
    let left = a as i128 * d as i128;
    let right = c as i128 * b as i128;
    // a negative denominator flips the comparison
    match (b as i128 * d as i128).signum() {
        1 => Some(left.cmp(&right)),
        -1 => Some(right.cmp(&left)),
        _ => None,
    }
}

impl Number {
    pub(crate) fn into_value(self) -> Rc<Value> {
        Rc::new(match self {
            Number::Int(v) => Value::Integer(v),
            Number::Rat(n, d) => Value::Rational(n, d),
            Number::Real(v) => Value::Real(v),
            Number::Complex(re, im) => Value::Complex(re, im),
        })
    }

    fn to_f64(self) -> f64 {
        match self {
            Number::Int(v) => v as f64,
            Number::Rat(n, d) => n as f64 / d as f64,
            Number::Real(v) => v,
            Number::Complex(re, _) => re,
        }
    }

    fn as_complex(self) -> (f64, f64) {
        match self {
            Number::Complex(re, im) => (re, im),
            other => (other.to_f64(), 0.0),
        }
    }

    fn is_exact(self) -> bool {
        matches!(self, Number::Int(_) | Number::Rat(..))
    }

    pub(crate) fn add(self, other: Number) -> Number {
        match (self, other) {
            (Number::Complex(..), _) | (_, Number::Complex(..)) => {
                let (a, b) = self.as_complex();
                let (c, d) = other.as_complex();
                Number::Complex(a + c, b + d)
            }
            (Number::Real(..), _) | (_, Number::Real(..)) => {
                Number::Real(self.to_f64() + other.to_f64())
            }
            (Number::Int(a), Number::Int(b)) => match a.checked_add(b) {
                Some(sum) => Number::Int(sum),
                None => Number::Real(a as f64 + b as f64),
            },
            (Number::Int(a), Number::Rat(n, d)) => rat_add(a, 1, n, d),
            (Number::Rat(n, d), Number::Int(b)) => rat_add(n, d, b, 1),
            (Number::Rat(a, b), Number::Rat(c, d)) => rat_add(a, b, c, d),
        }
    }

    pub(crate) fn sub(self, other: Number) -> Number {
        match (self, other) {
            (Number::Complex(..), _) | (_, Number::Complex(..)) => {
                let (a, b) = self.as_complex();
                let (c, d) = other.as_complex();
                Number::Complex(a - c, b - d)
            }
            (Number::Real(..), _) | (_, Number::Real(..)) => {
                Number::Real(self.to_f64() - other.to_f64())
            }
            (Number::Int(a), Number::Int(b)) => match a.checked_sub(b) {
                Some(difference) => Number::Int(difference),
                None => Number::Real(a as f64 - b as f64),
            },
            (Number::Int(a), Number::Rat(n, d)) => rat_sub(a, 1, n, d),
            (Number::Rat(n, d), Number::Int(b)) => rat_sub(n, d, b, 1),
            (Number::Rat(a, b), Number::Rat(c, d)) => rat_sub(a, b, c, d),
        }
    }

    pub(crate) fn mul(self, other: Number) -> Number {
        match (self, other) {
            (Number::Complex(..), _) | (_, Number::Complex(..)) => {
                let (a, b) = self.as_complex();
                let (c, d) = other.as_complex();
                Number::Complex(a * c - b * d, a * d + b * c)
            }
            (Number::Real(..), _) | (_, Number::Real(..)) => {
                Number::Real(self.to_f64() * other.to_f64())
            }
            (Number::Int(a), Number::Int(b)) => match a.checked_mul(b) {
                Some(product) => Number::Int(product),
                None => Number::Real(a as f64 * b as f64),
            },
            (Number::Int(a), Number::Rat(n, d)) => rat_mul(a, 1, n, d),
            (Number::Rat(n, d), Number::Int(b)) => rat_mul(n, d, b, 1),
            (Number::Rat(a, b), Number::Rat(c, d)) => rat_mul(a, b, c, d),
        }
    }

    pub(crate) fn div(self, other: Number) -> Result<Number, EvaluationError> {
        match (self, other) {
            (_, Number::Int(0)) | (_, Number::Rat(0, _)) => Err(EvaluationError::DivisionByZero),
            (Number::Complex(..), _) | (_, Number::Complex(..)) => {
                let (a, b) = self.as_complex();
                let (c, d) = other.as_complex();
                let modulus = c * c + d * d;
                Ok(Number::Complex(
                    (a * c + b * d) / modulus,
                    (b * c - a * d) / modulus,
                ))
            }
            (Number::Real(..), _) | (_, Number::Real(..)) => {
                Ok(Number::Real(self.to_f64() / other.to_f64()))
            }
            (Number::Int(a), Number::Int(b)) => Ok(Number::Rat(a, b)),
            (Number::Int(a), Number::Rat(n, d)) => Ok(make_rat(a as i128 * d as i128, n as i128)),
            (Number::Rat(n, d), Number::Int(b)) => Ok(make_rat(n as i128, d as i128 * b as i128)),
            (Number::Rat(a, b), Number::Rat(c, d)) => {
                Ok(make_rat(a as i128 * d as i128, b as i128 * c as i128))
            }
        }
    }

    pub(crate) fn negate(self) -> Number {
        match self {
            Number::Int(v) => match v.checked_neg() {
                Some(negated) => Number::Int(negated),
                None => Number::Real(-(v as f64)),
            },
            Number::Rat(n, d) => match n.checked_neg() {
                Some(negated) => Number::Rat(negated, d),
                None => Number::Real(-(n as f64) / d as f64),
            },
            Number::Real(v) => Number::Real(-v),
            Number::Complex(re, im) => Number::Complex(-re, -im),
        }
    }

    pub(crate) fn invert(self) -> Result<Number, EvaluationError> {
        Number::Int(1).div(self)
    }

    /// Ordering for `< > <= >=`. Complex numbers are unordered, as are
    /// comparisons involving NaN and rationals with a zero denominator.
    pub(crate) fn compare(self, other: Number) -> Option<Ordering> {
        match (self, other) {
            (Number::Complex(..), _) | (_, Number::Complex(..)) => None,
            (Number::Real(..), _) | (_, Number::Real(..)) => {
                self.to_f64().partial_cmp(&other.to_f64())
            }
            (Number::Int(a), Number::Int(b)) => Some(a.cmp(&b)),
            (Number::Int(a), Number::Rat(n, d)) => cross_compare(a, 1, n, d),
            (Number::Rat(n, d), Number::Int(b)) => cross_compare(n, d, b, 1),
            (Number::Rat(a, b), Number::Rat(c, d)) => cross_compare(a, b, c, d),
        }
    }

    /// Numeric `=`: value equality across exactness.
    pub(crate) fn equal(self, other: Number) -> bool {
        match (self, other) {
            (Number::Complex(..), _) | (_, Number::Complex(..)) => {
                self.as_complex() == other.as_complex()
            }
            _ => self.compare(other) == Some(Ordering::Equal),
        }
    }

    /// `eqv?` on numbers: like `=`, except an exact and an inexact
    /// number are never equivalent.
    pub(crate) fn eqv(self, other: Number) -> bool {
        self.is_exact() == other.is_exact() && self.equal(other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_promotion() {
        let tests = vec![
            (Number::Int(1).add(Number::Int(2)), Number::Int(3)),
            (
                Number::Int(1).add(Number::Rat(1, 2)),
                Number::Rat(3, 2),
            ),
            (Number::Int(1).add(Number::Real(0.5)), Number::Real(1.5)),
            (
                Number::Int(1).add(Number::Complex(1.0, 2.0)),
                Number::Complex(2.0, 2.0),
            ),
            (
                Number::Rat(1, 2).mul(Number::Rat(2, 3)),
                Number::Rat(2, 6),
            ),
            (
                Number::Rat(1, 2).sub(Number::Real(0.5)),
                Number::Real(0.0),
            ),
        ];
        for (got, expected) in tests {
            assert_eq!(got, expected);
        }
    }

    #[test]
    fn test_division() {
        assert_eq!(Number::Int(4).div(Number::Int(2)), Ok(Number::Rat(4, 2)));
        assert_eq!(Number::Int(2).invert(), Ok(Number::Rat(1, 2)));
        assert_eq!(Number::Real(1.0).div(Number::Int(4)), Ok(Number::Real(0.25)));
        assert_eq!(
            Number::Int(1).div(Number::Int(0)),
            Err(EvaluationError::DivisionByZero)
        );
        assert_eq!(
            Number::Real(1.0).div(Number::Rat(0, 5)),
            Err(EvaluationError::DivisionByZero)
        );
        assert_eq!(
            Number::Complex(1.0, 0.0).div(Number::Complex(0.0, 1.0)),
            Ok(Number::Complex(0.0, -1.0))
        );
    }

    #[test]
    fn test_overflow_degrades() {
        assert_eq!(
            Number::Int(i64::MAX).add(Number::Int(1)),
            Number::Real(i64::MAX as f64 + 1.0)
        );
        match Number::Rat(i64::MAX, 2).mul(Number::Rat(3, 1)) {
            Number::Real(_) => {}
            other => panic!("expected degradation to real, got {:?}", other),
        }
    }

    #[test]
    fn test_compare() {
        assert_eq!(
            Number::Int(1).compare(Number::Rat(3, 2)),
            Some(Ordering::Less)
        );
        assert_eq!(
            Number::Rat(1, -2).compare(Number::Int(0)),
            Some(Ordering::Less)
        );
        assert_eq!(
            Number::Rat(2, 4).compare(Number::Rat(1, 2)),
            Some(Ordering::Equal)
        );
        assert_eq!(Number::Complex(1.0, 0.0).compare(Number::Int(1)), None);
        assert_eq!(Number::Real(f64::NAN).compare(Number::Int(1)), None);
    }

    #[test]
    fn test_equality() {
        assert!(Number::Int(1).equal(Number::Rat(1, 1)));
        assert!(Number::Int(1).equal(Number::Real(1.0)));
        assert!(Number::Real(1.0).equal(Number::Complex(1.0, 0.0)));
        assert!(!Number::Int(1).eqv(Number::Real(1.0)));
        assert!(Number::Rat(1, 2).eqv(Number::Rat(2, 4)));
        assert!(Number::Real(0.5).eqv(Number::Complex(0.5, 0.0)));
    }
}
