use std::cmp::Ordering;

use tracing::trace;

use crate::error::Result;
use crate::types::value::{Value, compare_values};

/// Column values of the row a cursor is positioned on, looked up by name.
pub trait RowSource {
    fn value_of(&self, column: &str) -> Result<Value>;
}

/// Row filter evaluated against the live values of a cursor.
pub trait Predicate {
    fn is_satisfied(&self, row: &dyn RowSource) -> Result<bool>;

    /// Column names the predicate reads; a cursor binds these on open.
    fn columns(&self) -> Vec<&str> {
        Vec::new()
    }
}

/// Used when a scan has no filtering clause.
#[derive(Debug, Clone, Copy, Default)]
pub struct TruePredicate;

impl Predicate for TruePredicate {
    fn is_satisfied(&self, _row: &dyn RowSource) -> Result<bool> {
        Ok(true)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompareOp {
    fn holds(self, ord: Ordering) -> bool {
        match self {
            CompareOp::Eq => ord == Ordering::Equal,
            CompareOp::Ne => ord != Ordering::Equal,
            CompareOp::Lt => ord == Ordering::Less,
            CompareOp::Le => ord != Ordering::Greater,
            CompareOp::Gt => ord == Ordering::Greater,
            CompareOp::Ge => ord != Ordering::Less,
        }
    }
}

/// Boolean condition tree over column values.
///
/// A comparison involving null, or between a number and text, is false.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Compare {
        column: String,
        op: CompareOp,
        literal: Value,
    },
    IsNull(String),
    And(Box<Condition>, Box<Condition>),
    Or(Box<Condition>, Box<Condition>),
    Not(Box<Condition>),
}

impl Condition {
    pub fn compare(column: impl Into<String>, op: CompareOp, literal: impl Into<Value>) -> Self {
        Condition::Compare {
            column: column.into(),
            op,
            literal: literal.into(),
        }
    }

    pub fn is_null(column: impl Into<String>) -> Self {
        Condition::IsNull(column.into())
    }

    pub fn and(self, other: Condition) -> Self {
        Condition::And(Box::new(self), Box::new(other))
    }

    pub fn or(self, other: Condition) -> Self {
        Condition::Or(Box::new(self), Box::new(other))
    }

    pub fn negate(self) -> Self {
        Condition::Not(Box::new(self))
    }

    fn collect_columns<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Condition::Compare { column, .. } | Condition::IsNull(column) => {
                if !out.contains(&column.as_str()) {
                    out.push(column.as_str());
                }
            }
            Condition::And(l, r) | Condition::Or(l, r) => {
                l.collect_columns(out);
                r.collect_columns(out);
            }
            Condition::Not(inner) => inner.collect_columns(out),
        }
    }
}

impl Predicate for Condition {
    fn is_satisfied(&self, row: &dyn RowSource) -> Result<bool> {
        match self {
            Condition::Compare {
                column,
                op,
                literal,
            } => {
                let cell = row.value_of(column)?;
                let outcome = compare_values(&cell, literal).is_some_and(|ord| op.holds(ord));
                trace!(column = %column, ?op, outcome, "comparison evaluated");
                Ok(outcome)
            }
            Condition::IsNull(column) => Ok(row.value_of(column)?.is_null()),
            Condition::And(l, r) => Ok(l.is_satisfied(row)? && r.is_satisfied(row)?),
            Condition::Or(l, r) => Ok(l.is_satisfied(row)? || r.is_satisfied(row)?),
            Condition::Not(inner) => Ok(!inner.is_satisfied(row)?),
        }
    }

    fn columns(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_columns(&mut out);
        out
    }
}
