//! Runtime values.
//!
//! A value wraps exactly one of the primitives the language knows
//! about. The data model also describes "a user-defined object with a
//! mutable field map and a method table", but nothing in the grammar
//! can construct one — there is no class or `new` syntax, and
//! user-defined types are an explicit non-goal — so that variant has
//! no constructor here.

use std::cmp::Ordering;
use std::fmt;

use bigdecimal::BigDecimal;
use num_bigint::BigInt;

use plc_util::SemanticError;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Nil,
    Bool(bool),
    Char(char),
    Int(BigInt),
    Decimal(BigDecimal),
    Str(String),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "Nil",
            Value::Bool(_) => "Boolean",
            Value::Char(_) => "Character",
            Value::Int(_) => "Integer",
            Value::Decimal(_) => "Decimal",
            Value::Str(_) => "String",
        }
    }

    pub fn as_bool(&self) -> Result<bool, SemanticError> {
        match self {
            Value::Bool(b) => Ok(*b),
            other => Err(SemanticError::new(format!("expected Boolean, found {}", other.type_name()))),
        }
    }

    /// Ordered comparison, for `<`, `<=`, `>`, `>=`.
    pub fn compare(&self, other: &Value) -> Result<Ordering, SemanticError> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => Ok(a.cmp(b)),
            (Value::Decimal(a), Value::Decimal(b)) => Ok(a.cmp(b)),
            (Value::Char(a), Value::Char(b)) => Ok(a.cmp(b)),
            (Value::Str(a), Value::Str(b)) => Ok(a.cmp(b)),
            (a, b) => Err(SemanticError::new(format!(
                "cannot order {} against {}",
                a.type_name(),
                b.type_name()
            ))),
        }
    }
}

impl fmt::Display for Value {
    /// The printable representation `print/1` writes. Strings are
    /// written raw, without surrounding quotes.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Char(c) => write!(f, "{c}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Decimal(d) => write!(f, "{d}"),
            Value::Str(s) => write!(f, "{s}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn strings_display_without_quotes() {
        assert_eq!(Value::Str("hi".into()).to_string(), "hi");
    }

    #[test]
    fn integers_compare_by_natural_order() {
        let a = Value::Int(BigInt::from(1));
        let b = Value::Int(BigInt::from(2));
        assert_eq!(a.compare(&b), Ok(Ordering::Less));
    }

    #[test]
    fn mismatched_types_cannot_be_ordered() {
        let a = Value::Int(BigInt::from(1));
        let b = Value::Str("x".into());
        assert!(a.compare(&b).is_err());
    }

    #[test]
    fn decimal_displays_in_fixed_point() {
        let d = Value::Decimal(BigDecimal::from_str("3.50").unwrap());
        assert_eq!(d.to_string(), "3.50");
    }
}
