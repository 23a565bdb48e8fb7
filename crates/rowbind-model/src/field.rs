//! Column references and ordering directives.

use serde::{Deserialize, Serialize};

/// Declared data type of a field.
///
/// Type hints are optional; a `Field` without one still participates in
/// predicates and projections, it just carries no decode guidance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldType {
    /// Boolean.
    Bool,
    /// 32-bit signed integer.
    Int32,
    /// 64-bit signed integer.
    Int64,
    /// 64-bit floating point.
    Float64,
    /// UTF-8 string.
    String,
    /// Binary data.
    Bytes,
    /// Timestamp as microseconds since Unix epoch.
    Timestamp,
    /// UUID.
    Uuid,
}

/// A named, optionally typed column reference.
///
/// Identity is by name. Whether name comparison is case-sensitive is an
/// engine configuration concern; [`Field::matches`] takes the policy as an
/// argument so the model stays policy-free.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    /// Field name.
    pub name: String,
    /// Optional declared type.
    pub field_type: Option<FieldType>,
}

impl Field {
    /// Create an untyped field reference.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field_type: None,
        }
    }

    /// Create a typed field reference.
    pub fn typed(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type: Some(field_type),
        }
    }

    /// Compare this field's name against another name under the given
    /// case policy.
    pub fn matches(&self, name: &str, case_insensitive: bool) -> bool {
        if case_insensitive {
            self.name.eq_ignore_ascii_case(name)
        } else {
            self.name == name
        }
    }
}

impl From<&str> for Field {
    fn from(name: &str) -> Self {
        Field::new(name)
    }
}

impl From<String> for Field {
    fn from(name: String) -> Self {
        Field::new(name)
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderDirection {
    /// Ascending order.
    Asc,
    /// Descending order.
    Desc,
}

/// Order specification for sorting results.
///
/// A sequence of order fields defines precedence left to right. When no
/// ordered field is unique, ties fall back to the driver's natural row
/// order, which is not deterministic across calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderField {
    /// Field to order by.
    pub field: String,
    /// Sort direction.
    pub direction: OrderDirection,
}

impl OrderField {
    /// Create an ascending order field.
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: OrderDirection::Asc,
        }
    }

    /// Create a descending order field.
    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: OrderDirection::Desc,
        }
    }
}
