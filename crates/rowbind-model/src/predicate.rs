//! Predicate model: query fields, groups, and the operation set.
//!
//! A [`QueryField`] is a single column/operation/value atom; a
//! [`QueryGroup`] is an AND/OR conjunction of fields and nested groups.
//! Operation/value arity is enforced by construction: `QueryField` keeps
//! its parts private and only exposes typed constructors, so a `Between`
//! without a range or an `In` without a list cannot be represented.

use crate::value::Value;
use serde::{Deserialize, Serialize};

/// The closed set of predicate operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    /// Field equals value.
    Equal,
    /// Field not equals value.
    NotEqual,
    /// Field less than value.
    LessThan,
    /// Field less than or equal to value.
    LessThanOrEqual,
    /// Field greater than value.
    GreaterThan,
    /// Field greater than or equal to value.
    GreaterThanOrEqual,
    /// Field matches a LIKE pattern.
    Like,
    /// Field does not match a LIKE pattern.
    NotLike,
    /// Field is within an inclusive range.
    Between,
    /// Field is outside an inclusive range.
    NotBetween,
    /// Field is in a set of values.
    In,
    /// Field is not in a set of values.
    NotIn,
    /// Field is null.
    IsNull,
    /// Field is not null.
    IsNotNull,
}

impl Operation {
    /// The logical complement of this operation.
    ///
    /// Negation is applied at the operation level rather than by wrapping
    /// the rendered SQL in NOT, so semantics stay uniform across dialects.
    pub fn negated(self) -> Self {
        match self {
            Operation::Equal => Operation::NotEqual,
            Operation::NotEqual => Operation::Equal,
            Operation::LessThan => Operation::GreaterThanOrEqual,
            Operation::LessThanOrEqual => Operation::GreaterThan,
            Operation::GreaterThan => Operation::LessThanOrEqual,
            Operation::GreaterThanOrEqual => Operation::LessThan,
            Operation::Like => Operation::NotLike,
            Operation::NotLike => Operation::Like,
            Operation::Between => Operation::NotBetween,
            Operation::NotBetween => Operation::Between,
            Operation::In => Operation::NotIn,
            Operation::NotIn => Operation::In,
            Operation::IsNull => Operation::IsNotNull,
            Operation::IsNotNull => Operation::IsNull,
        }
    }
}

/// The value shape paired with an operation.
///
/// Each variant carries exactly the arity its operations require: `None`
/// for null checks, `Single` for comparisons and LIKE, `Range` for
/// BETWEEN, `List` for IN.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Operand {
    /// No bound value (IsNull / IsNotNull).
    None,
    /// One bound value.
    Single(Value),
    /// Inclusive lower and upper bound.
    Range(Value, Value),
    /// A sequence of values.
    List(Vec<Value>),
}

impl Operand {
    /// Number of parameters this operand binds into a statement.
    pub fn param_count(&self) -> usize {
        match self {
            Operand::None => 0,
            Operand::Single(_) => 1,
            Operand::Range(_, _) => 2,
            Operand::List(values) => values.len(),
        }
    }

    /// Iterate the bound values in binding order.
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        let slice: Vec<&Value> = match self {
            Operand::None => vec![],
            Operand::Single(v) => vec![v],
            Operand::Range(lo, hi) => vec![lo, hi],
            Operand::List(values) => values.iter().collect(),
        };
        slice.into_iter()
    }
}

/// A single field/operation/value predicate atom.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryField {
    field: String,
    operation: Operation,
    operand: Operand,
}

impl QueryField {
    /// Field equals value.
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::single(field, Operation::Equal, value)
    }

    /// Field not equals value.
    pub fn ne(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::single(field, Operation::NotEqual, value)
    }

    /// Field less than value.
    pub fn lt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::single(field, Operation::LessThan, value)
    }

    /// Field less than or equal to value.
    pub fn le(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::single(field, Operation::LessThanOrEqual, value)
    }

    /// Field greater than value.
    pub fn gt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::single(field, Operation::GreaterThan, value)
    }

    /// Field greater than or equal to value.
    pub fn ge(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::single(field, Operation::GreaterThanOrEqual, value)
    }

    /// Field matches a LIKE pattern.
    pub fn like(field: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::single(field, Operation::Like, Value::String(pattern.into()))
    }

    /// Field does not match a LIKE pattern.
    pub fn not_like(field: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::single(field, Operation::NotLike, Value::String(pattern.into()))
    }

    /// Field is within the inclusive range `[lo, hi]`.
    pub fn between(field: impl Into<String>, lo: impl Into<Value>, hi: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            operation: Operation::Between,
            operand: Operand::Range(lo.into(), hi.into()),
        }
    }

    /// Field is outside the inclusive range `[lo, hi]`.
    pub fn not_between(
        field: impl Into<String>,
        lo: impl Into<Value>,
        hi: impl Into<Value>,
    ) -> Self {
        Self {
            field: field.into(),
            operation: Operation::NotBetween,
            operand: Operand::Range(lo.into(), hi.into()),
        }
    }

    /// Field is in a set of values.
    pub fn is_in(field: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            field: field.into(),
            operation: Operation::In,
            operand: Operand::List(values),
        }
    }

    /// Field is not in a set of values.
    pub fn not_in(field: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            field: field.into(),
            operation: Operation::NotIn,
            operand: Operand::List(values),
        }
    }

    /// Field is null.
    pub fn is_null(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            operation: Operation::IsNull,
            operand: Operand::None,
        }
    }

    /// Field is not null.
    pub fn is_not_null(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            operation: Operation::IsNotNull,
            operand: Operand::None,
        }
    }

    fn single(field: impl Into<String>, operation: Operation, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            operation,
            operand: Operand::Single(value.into()),
        }
    }

    /// Field name.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Predicate operation.
    pub fn operation(&self) -> Operation {
        self.operation
    }

    /// Bound value shape.
    pub fn operand(&self) -> &Operand {
        &self.operand
    }

    /// This predicate with its operation logically negated.
    ///
    /// The operand is unchanged; only the operation flips (e.g. In becomes
    /// NotIn, Like becomes NotLike).
    pub fn negated(&self) -> Self {
        Self {
            field: self.field.clone(),
            operation: self.operation.negated(),
            operand: self.operand.clone(),
        }
    }
}

/// How the children of a group combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Conjunction {
    /// All children must hold.
    And,
    /// At least one child must hold.
    Or,
}

/// A child of a query group: either a leaf predicate or a nested group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum QueryItem {
    /// A leaf predicate.
    Field(QueryField),
    /// A nested group.
    Group(QueryGroup),
}

impl From<QueryField> for QueryItem {
    fn from(field: QueryField) -> Self {
        QueryItem::Field(field)
    }
}

impl From<QueryGroup> for QueryItem {
    fn from(group: QueryGroup) -> Self {
        QueryItem::Group(group)
    }
}

/// An ordered conjunction of predicates and nested groups.
///
/// Nesting is unbounded. An empty group compiles to "no filter" (matches
/// all rows), not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryGroup {
    /// Children in declaration order.
    pub children: Vec<QueryItem>,
    /// How the children combine.
    pub conjunction: Conjunction,
}

impl QueryGroup {
    /// Create an empty AND group.
    pub fn and() -> Self {
        Self {
            children: Vec::new(),
            conjunction: Conjunction::And,
        }
    }

    /// Create an empty OR group.
    pub fn or() -> Self {
        Self {
            children: Vec::new(),
            conjunction: Conjunction::Or,
        }
    }

    /// Create an AND group from leaf predicates.
    pub fn all_of(fields: impl IntoIterator<Item = QueryField>) -> Self {
        Self {
            children: fields.into_iter().map(QueryItem::Field).collect(),
            conjunction: Conjunction::And,
        }
    }

    /// Create an OR group from leaf predicates.
    pub fn any_of(fields: impl IntoIterator<Item = QueryField>) -> Self {
        Self {
            children: fields.into_iter().map(QueryItem::Field).collect(),
            conjunction: Conjunction::Or,
        }
    }

    /// Add a leaf predicate.
    pub fn with_field(mut self, field: QueryField) -> Self {
        self.children.push(QueryItem::Field(field));
        self
    }

    /// Add a nested group.
    pub fn with_group(mut self, group: QueryGroup) -> Self {
        self.children.push(QueryItem::Group(group));
        self
    }

    /// Add a child of either kind.
    pub fn with_item(mut self, item: impl Into<QueryItem>) -> Self {
        self.children.push(item.into());
        self
    }

    /// Add a child in place.
    pub fn push(&mut self, item: impl Into<QueryItem>) {
        self.children.push(item.into());
    }

    /// Whether this group has no predicates at any depth.
    pub fn is_empty(&self) -> bool {
        self.children.iter().all(|child| match child {
            QueryItem::Field(_) => false,
            QueryItem::Group(g) => g.is_empty(),
        })
    }

    /// Every field name referenced at any depth, in depth-first order.
    pub fn field_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_field_names(&mut names);
        names
    }

    fn collect_field_names<'a>(&'a self, names: &mut Vec<&'a str>) {
        for child in &self.children {
            match child {
                QueryItem::Field(f) => names.push(f.field()),
                QueryItem::Group(g) => g.collect_field_names(names),
            }
        }
    }

    /// Total bound parameters across all predicates at any depth.
    pub fn param_count(&self) -> usize {
        self.children
            .iter()
            .map(|child| match child {
                QueryItem::Field(f) => f.operand().param_count(),
                QueryItem::Group(g) => g.param_count(),
            })
            .sum()
    }
}

/// A value entry in an anonymous field bag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BagValue {
    /// A plain value, compiled to an equality predicate.
    Value(Value),
    /// An explicit predicate, passed through the compiler untouched.
    Field(QueryField),
}

/// An anonymous, insertion-ordered field/value bag.
///
/// The ergonomic equivalent of filtering by an anonymous object: each
/// plain entry compiles to `field = value`; an entry that is already a
/// [`QueryField`] keeps its own operation and binding.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FieldBag {
    entries: Vec<(String, BagValue)>,
}

impl FieldBag {
    /// Create an empty bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a plain value entry.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.entries
            .push((field.into(), BagValue::Value(value.into())));
        self
    }

    /// Add an explicit predicate entry, passed through as-is.
    pub fn with_predicate(mut self, field: QueryField) -> Self {
        self.entries
            .push((field.field().to_string(), BagValue::Field(field)));
        self
    }

    /// Entries in insertion order.
    pub fn entries(&self) -> &[(String, BagValue)] {
        &self.entries
    }

    /// Whether the bag has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negation_is_involutive() {
        let ops = [
            Operation::Equal,
            Operation::NotEqual,
            Operation::LessThan,
            Operation::LessThanOrEqual,
            Operation::GreaterThan,
            Operation::GreaterThanOrEqual,
            Operation::Like,
            Operation::NotLike,
            Operation::Between,
            Operation::NotBetween,
            Operation::In,
            Operation::NotIn,
            Operation::IsNull,
            Operation::IsNotNull,
        ];
        for op in ops {
            assert_eq!(op.negated().negated(), op);
        }
    }

    #[test]
    fn test_operand_arity() {
        assert_eq!(QueryField::is_null("a").operand().param_count(), 0);
        assert_eq!(QueryField::eq("a", 1).operand().param_count(), 1);
        assert_eq!(QueryField::between("a", 1, 9).operand().param_count(), 2);
        let f = QueryField::is_in("a", vec![1.into(), 2.into(), 3.into()]);
        assert_eq!(f.operand().param_count(), 3);
    }

    #[test]
    fn test_group_field_names_depth_first() {
        let group = QueryGroup::and()
            .with_field(QueryField::eq("a", 1))
            .with_group(
                QueryGroup::or()
                    .with_field(QueryField::gt("b", 2))
                    .with_field(QueryField::lt("c", 3)),
            );
        assert_eq!(group.field_names(), vec!["a", "b", "c"]);
        assert_eq!(group.param_count(), 3);
    }

    #[test]
    fn test_empty_group_nested() {
        let group = QueryGroup::and().with_group(QueryGroup::or());
        assert!(group.is_empty());
        assert!(!QueryGroup::and().with_field(QueryField::eq("a", 1)).is_empty());
    }

    #[test]
    fn test_bag_preserves_predicate_entries() {
        let bag = FieldBag::new()
            .with("name", "alice")
            .with_predicate(QueryField::gt("age", 18));
        assert_eq!(bag.entries().len(), 2);
        assert!(matches!(bag.entries()[1].1, BagValue::Field(_)));
    }
}
