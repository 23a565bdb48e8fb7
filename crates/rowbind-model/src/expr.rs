//! Typed boolean expression trees.
//!
//! An [`Expr`] is the strongly-typed filter input shape: comparisons,
//! method-style predicates (contains / startsWith / endsWith / membership),
//! boolean composition, and negation. The predicate compiler lowers an
//! expression tree into a canonical [`QueryGroup`](crate::QueryGroup).
//!
//! The `&`/`|`/`!` operators build trees directly:
//!
//! ```
//! use rowbind_model::Expr;
//!
//! let filter = Expr::gt("age", 18) & !Expr::any_of("status", vec!["banned".into()]);
//! ```

use crate::value::Value;
use serde::{Deserialize, Serialize};

/// Comparison operator in a typed expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CmpOp {
    /// Equal (==).
    Eq,
    /// Not equal (!=).
    Ne,
    /// Less than (<).
    Lt,
    /// Less than or equal (<=).
    Le,
    /// Greater than (>).
    Gt,
    /// Greater than or equal (>=).
    Ge,
}

/// A typed boolean expression over entity fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    /// Both sides must hold (&&).
    And(Box<Expr>, Box<Expr>),
    /// Either side must hold (||).
    Or(Box<Expr>, Box<Expr>),
    /// Logical negation (!).
    Not(Box<Expr>),
    /// A predicate compared to a boolean literal (`p == true` / `p == false`).
    Is(Box<Expr>, bool),
    /// Field compared to a value. Comparing with [`Value::Null`] under
    /// `Eq`/`Ne` expresses an explicit null check.
    Cmp {
        /// Field name.
        field: String,
        /// Comparison operator.
        op: CmpOp,
        /// Right-hand value.
        value: Value,
    },
    /// Field is one of the given values (`values.contains(field)`).
    AnyOf {
        /// Field name.
        field: String,
        /// Candidate values.
        values: Vec<Value>,
    },
    /// Field contains a substring (`field.contains(text)`).
    Contains {
        /// Field name.
        field: String,
        /// Substring to match.
        text: String,
    },
    /// Field starts with a prefix (`field.startsWith(text)`).
    StartsWith {
        /// Field name.
        field: String,
        /// Prefix to match.
        text: String,
    },
    /// Field ends with a suffix (`field.endsWith(text)`).
    EndsWith {
        /// Field name.
        field: String,
        /// Suffix to match.
        text: String,
    },
}

impl Expr {
    /// Field equals value.
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::cmp(field, CmpOp::Eq, value)
    }

    /// Field not equals value.
    pub fn ne(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::cmp(field, CmpOp::Ne, value)
    }

    /// Field less than value.
    pub fn lt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::cmp(field, CmpOp::Lt, value)
    }

    /// Field less than or equal to value.
    pub fn le(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::cmp(field, CmpOp::Le, value)
    }

    /// Field greater than value.
    pub fn gt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::cmp(field, CmpOp::Gt, value)
    }

    /// Field greater than or equal to value.
    pub fn ge(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::cmp(field, CmpOp::Ge, value)
    }

    /// Field is one of the given values.
    pub fn any_of(field: impl Into<String>, values: Vec<Value>) -> Self {
        Expr::AnyOf {
            field: field.into(),
            values,
        }
    }

    /// Field contains a substring.
    pub fn contains(field: impl Into<String>, text: impl Into<String>) -> Self {
        Expr::Contains {
            field: field.into(),
            text: text.into(),
        }
    }

    /// Field starts with a prefix.
    pub fn starts_with(field: impl Into<String>, text: impl Into<String>) -> Self {
        Expr::StartsWith {
            field: field.into(),
            text: text.into(),
        }
    }

    /// Field ends with a suffix.
    pub fn ends_with(field: impl Into<String>, text: impl Into<String>) -> Self {
        Expr::EndsWith {
            field: field.into(),
            text: text.into(),
        }
    }

    /// Compare this predicate to a boolean literal.
    ///
    /// `p.is(true)` is equivalent to `p`; `p.is(false)` negates it.
    pub fn is(self, value: bool) -> Self {
        Expr::Is(Box::new(self), value)
    }

    fn cmp(field: impl Into<String>, op: CmpOp, value: impl Into<Value>) -> Self {
        Expr::Cmp {
            field: field.into(),
            op,
            value: value.into(),
        }
    }

    /// A short name for the expression shape, used in error messages.
    pub fn describe(&self) -> &'static str {
        match self {
            Expr::And(_, _) => "and group",
            Expr::Or(_, _) => "or group",
            Expr::Not(_) => "negation",
            Expr::Is(_, _) => "boolean comparison",
            Expr::Cmp { .. } => "comparison",
            Expr::AnyOf { .. } => "membership test",
            Expr::Contains { .. } => "contains",
            Expr::StartsWith { .. } => "startsWith",
            Expr::EndsWith { .. } => "endsWith",
        }
    }
}

impl std::ops::BitAnd for Expr {
    type Output = Expr;

    fn bitand(self, rhs: Expr) -> Expr {
        Expr::And(Box::new(self), Box::new(rhs))
    }
}

impl std::ops::BitOr for Expr {
    type Output = Expr;

    fn bitor(self, rhs: Expr) -> Expr {
        Expr::Or(Box::new(self), Box::new(rhs))
    }
}

impl std::ops::Not for Expr {
    type Output = Expr;

    fn not(self) -> Expr {
        Expr::Not(Box::new(self))
    }
}
