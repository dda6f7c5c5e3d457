use std::cmp::Ordering;

use crate::types::datatype::ColumnType;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Integer(i32),
    Real(f64),
    Text(String),
    Null,
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// True when a non-null value carries the tag its column declares.
    /// Null matches every type; nullability is checked by the encoder.
    pub fn matches_type(&self, dtype: &ColumnType) -> bool {
        match (self, dtype) {
            (Value::Null, _) => true,
            (Value::Integer(_), ColumnType::Integer) => true,
            (Value::Real(_), ColumnType::Real) => true,
            (Value::Text(_), ColumnType::FixedText(_) | ColumnType::VarText) => true,
            _ => false,
        }
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Integer(n)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Real(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

/// Orders two values for predicate evaluation. Integers and reals compare
/// numerically; anything compared with null, or text against a number, is
/// unordered.
pub fn compare_values(lhs: &Value, rhs: &Value) -> Option<Ordering> {
    match (lhs, rhs) {
        (Value::Integer(a), Value::Integer(b)) => Some(a.cmp(b)),
        (Value::Real(a), Value::Real(b)) => a.partial_cmp(b),
        (Value::Integer(a), Value::Real(b)) => f64::from(*a).partial_cmp(b),
        (Value::Real(a), Value::Integer(b)) => a.partial_cmp(&f64::from(*b)),
        (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
        _ => None,
    }
}
