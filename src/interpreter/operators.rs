//! Binary operator semantics
//!
//! Operands arrive dereferenced. When both sides of `+ - * / %` are
//! integers the result is an integer: division floors and the remainder
//! takes the sign of the divisor. An overflowing sum, difference or
//! product falls back to `f64`. Any other numeric operands use `f64`. The
//! bitwise and shift operators truncate both sides to `i64` first.

use crate::error::{ScriptError, ScriptResult};
use crate::parser::Punct;
use crate::value::{Value, ValueKind};

/// Apply a binary operator
pub(crate) fn binary(op: Punct, lhs: &Value, rhs: &Value) -> ScriptResult<Value> {
    let value = match op {
        Punct::Plus => return plus(lhs, rhs),
        Punct::Minus | Punct::Star | Punct::Slash | Punct::Percent => {
            return arithmetic(op, lhs, rhs);
        }

        Punct::Pipe => integer(lhs, rhs, |a, b| a | b)?,
        Punct::Caret => integer(lhs, rhs, |a, b| a ^ b)?,
        Punct::Amp => integer(lhs, rhs, |a, b| a & b)?,
        Punct::LtLt => integer(lhs, rhs, |a, b| a.wrapping_shl(b as u32))?,
        Punct::GtGt => integer(lhs, rhs, |a, b| a.wrapping_shr(b as u32))?,

        Punct::EqEq => Value::Bool(equals(lhs, rhs)?),
        Punct::BangEq => Value::Bool(!equals(lhs, rhs)?),

        Punct::Lt => Value::Bool(lhs.to_number_value()? < rhs.to_number_value()?),
        Punct::LtEq => Value::Bool(lhs.to_number_value()? <= rhs.to_number_value()?),
        Punct::Gt => Value::Bool(lhs.to_number_value()? > rhs.to_number_value()?),
        Punct::GtEq => Value::Bool(lhs.to_number_value()? >= rhs.to_number_value()?),

        other => {
            return Err(ScriptError::syntax(format!(
                "'{}' is not a binary operator",
                other
            )));
        }
    };
    Ok(value)
}

/// `- * / %` and the numeric half of `+`
fn arithmetic(op: Punct, lhs: &Value, rhs: &Value) -> ScriptResult<Value> {
    if let (Value::Int(a), Value::Int(b)) = (lhs, rhs) {
        if let Some(value) = integer_arithmetic(op, *a, *b)? {
            return Ok(value);
        }
    }

    let (a, b) = (lhs.to_number_value()?, rhs.to_number_value()?);
    let n = match op {
        Punct::Plus => a + b,
        Punct::Minus => a - b,
        Punct::Star => a * b,
        Punct::Slash => a / b,
        _ => floor_rem(a, b),
    };
    Ok(Value::Number(n))
}

/// Integer result, or `None` when it overflows `i64`
fn integer_arithmetic(op: Punct, a: i64, b: i64) -> ScriptResult<Option<Value>> {
    if b == 0 && matches!(op, Punct::Slash | Punct::Percent) {
        return Err(ScriptError::Range("Integer division by zero".to_string()));
    }
    let result = match op {
        Punct::Plus => a.checked_add(b),
        Punct::Minus => a.checked_sub(b),
        Punct::Star => a.checked_mul(b),
        Punct::Slash => a.checked_div(b).map(|q| {
            if a % b != 0 && (a < 0) != (b < 0) { q - 1 } else { q }
        }),
        _ => a.checked_rem(b).map(|r| {
            if r != 0 && (r < 0) != (b < 0) { r + b } else { r }
        }),
    };
    Ok(result.map(Value::Int))
}

fn floor_rem(a: f64, b: f64) -> f64 {
    let r = a % b;
    if r != 0.0 && (r < 0.0) != (b < 0.0) { r + b } else { r }
}

/// Map a compound assignment to the operator it applies
pub(crate) fn compound(op: Punct) -> Option<Punct> {
    match op {
        Punct::PlusEq => Some(Punct::Plus),
        Punct::MinusEq => Some(Punct::Minus),
        Punct::StarEq => Some(Punct::Star),
        Punct::SlashEq => Some(Punct::Slash),
        _ => None,
    }
}

/// String concatenation if either side is a string, numeric addition
/// otherwise
pub(crate) fn plus(lhs: &Value, rhs: &Value) -> ScriptResult<Value> {
    if lhs.is_type(ValueKind::String) || rhs.is_type(ValueKind::String) {
        let mut s = lhs.to_string_value()?;
        s.push_str(&rhs.to_string_value()?);
        Ok(Value::from(s))
    } else {
        arithmetic(Punct::Plus, lhs, rhs)
    }
}

/// Strings and booleans compare by kind; everything else numerically
pub(crate) fn equals(lhs: &Value, rhs: &Value) -> ScriptResult<bool> {
    match (lhs, rhs) {
        (Value::String(a), Value::String(b)) => Ok(a == b),
        (Value::Bool(a), Value::Bool(b)) => Ok(a == b),
        (Value::Int(a), Value::Int(b)) => Ok(a == b),
        _ => Ok(lhs.to_number_value()? == rhs.to_number_value()?),
    }
}

fn integer(lhs: &Value, rhs: &Value, f: impl Fn(i64, i64) -> i64) -> ScriptResult<Value> {
    let a = lhs.to_integer_value()?;
    let b = rhs.to_integer_value()?;
    Ok(Value::Int(f(a, b)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(v: ScriptResult<Value>) -> f64 {
        match v.unwrap() {
            Value::Number(n) => n,
            other => panic!("expected a float, got {:?}", other),
        }
    }

    fn int(v: ScriptResult<Value>) -> i64 {
        match v.unwrap() {
            Value::Int(i) => i,
            other => panic!("expected an integer, got {:?}", other),
        }
    }

    #[test]
    fn test_arithmetic() {
        let (a, b) = (Value::Number(7.0), Value::Number(2.0));
        assert_eq!(num(binary(Punct::Minus, &a, &b)), 5.0);
        assert_eq!(num(binary(Punct::Slash, &a, &b)), 3.5);
        assert_eq!(num(binary(Punct::Percent, &Value::Number(-7.0), &b)), 1.0);
        assert_eq!(num(binary(Punct::Percent, &Value::Number(7.5), &Value::Number(-2.0))), -0.5);
        assert!(num(binary(Punct::Slash, &a, &Value::Number(0.0))).is_infinite());
    }

    #[test]
    fn test_integer_arithmetic() {
        let (a, b) = (Value::Int(7), Value::Int(2));
        assert_eq!(int(binary(Punct::Slash, &a, &b)), 3);
        assert_eq!(int(binary(Punct::Slash, &Value::Int(-7), &b)), -4);
        assert_eq!(int(binary(Punct::Slash, &a, &Value::Int(-2))), -4);
        assert_eq!(int(binary(Punct::Percent, &Value::Int(-7), &b)), 1);
        assert_eq!(int(binary(Punct::Percent, &a, &Value::Int(-2))), -1);
        assert_eq!(int(binary(Punct::Star, &a, &b)), 14);
        assert_eq!(int(plus(&a, &b)), 9);
    }

    #[test]
    fn test_mixed_arithmetic_uses_floats() {
        assert_eq!(num(binary(Punct::Slash, &Value::Number(7.0), &Value::Int(2))), 3.5);
        assert_eq!(num(binary(Punct::Minus, &Value::Int(1), &Value::Number(0.5))), 0.5);
        // Numeric strings convert to floats
        assert_eq!(num(binary(Punct::Slash, &Value::from("7"), &Value::Int(2))), 3.5);
    }

    #[test]
    fn test_integer_overflow_falls_back_to_float() {
        let v = num(binary(Punct::Star, &Value::Int(i64::MAX), &Value::Int(2)));
        assert_eq!(v, i64::MAX as f64 * 2.0);
        assert_eq!(num(plus(&Value::Int(i64::MAX), &Value::Int(1))), i64::MAX as f64 + 1.0);
    }

    #[test]
    fn test_integer_division_by_zero() {
        let err = binary(Punct::Slash, &Value::Int(1), &Value::Int(0)).unwrap_err();
        assert!(matches!(err, ScriptError::Range(_)));
        assert!(binary(Punct::Percent, &Value::Int(1), &Value::Int(0)).is_err());
    }

    #[test]
    fn test_plus_concatenates() {
        let v = plus(&Value::from("n="), &Value::Int(3)).unwrap();
        assert_eq!(v.to_string_value().unwrap(), "n=3");
        let v = plus(&Value::Number(1.5), &Value::from("x")).unwrap();
        assert_eq!(v.to_string_value().unwrap(), "1.5x");
    }

    #[test]
    fn test_bitwise_truncates() {
        let (a, b) = (Value::Number(6.9), Value::Number(3.2));
        assert_eq!(int(binary(Punct::Pipe, &a, &b)), 7);
        assert_eq!(int(binary(Punct::Amp, &a, &b)), 2);
        assert_eq!(int(binary(Punct::Caret, &a, &b)), 5);
        assert_eq!(int(binary(Punct::LtLt, &Value::Int(1), &Value::Int(4))), 16);
    }

    #[test]
    fn test_equality() {
        assert!(equals(&Value::from("a"), &Value::from("a")).unwrap());
        assert!(equals(&Value::Bool(false), &Value::Bool(false)).unwrap());
        // Mixed kinds compare numerically
        assert!(equals(&Value::from("2"), &Value::Int(2)).unwrap());
        assert!(equals(&Value::Number(2.0), &Value::Int(2)).unwrap());
        assert!(equals(&Value::Null, &Value::Null).is_err());
    }

    #[test]
    fn test_relational_is_numeric() {
        let v = binary(Punct::Lt, &Value::from("10"), &Value::from("9")).unwrap();
        assert!(matches!(v, Value::Bool(false)));
    }

    #[test]
    fn test_compound_mapping() {
        assert_eq!(compound(Punct::StarEq), Some(Punct::Star));
        assert_eq!(compound(Punct::SlashEq), Some(Punct::Slash));
        assert_eq!(compound(Punct::Eq), None);
    }
}
