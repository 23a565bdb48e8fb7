//! Predicate compiler: normalizes heterogeneous filter inputs into one
//! canonical [`QueryGroup`].
//!
//! Six input shapes are accepted: nothing, a single predicate, a
//! predicate list, an already-built group, an anonymous field/value bag,
//! and a typed boolean expression tree. Each shape has exactly one
//! compilation rule; an input the compiler cannot normalize fails with
//! [`Error::UnsupportedPredicate`] before anything reaches a driver.

use rowbind_model::{BagValue, CmpOp, Expr, FieldBag, Operation, QueryField, QueryGroup, QueryItem, Value};
use tracing::debug;

use crate::error::Error;

/// The polymorphic filter input accepted by [`compile`].
#[derive(Debug, Clone, PartialEq)]
pub enum PredicateInput {
    /// No filter: matches all rows.
    None,
    /// A single predicate, compiled to a one-field AND group.
    Field(QueryField),
    /// A predicate list, compiled to an AND group.
    Fields(Vec<QueryField>),
    /// An already-canonical group, passed through unchanged.
    Group(QueryGroup),
    /// An anonymous field/value bag; plain entries become equality
    /// predicates, explicit predicates pass through as-is.
    Bag(FieldBag),
    /// A typed boolean expression tree, lowered recursively.
    Expr(Expr),
}

impl From<QueryField> for PredicateInput {
    fn from(field: QueryField) -> Self {
        PredicateInput::Field(field)
    }
}

impl From<Vec<QueryField>> for PredicateInput {
    fn from(fields: Vec<QueryField>) -> Self {
        PredicateInput::Fields(fields)
    }
}

impl From<QueryGroup> for PredicateInput {
    fn from(group: QueryGroup) -> Self {
        PredicateInput::Group(group)
    }
}

impl From<FieldBag> for PredicateInput {
    fn from(bag: FieldBag) -> Self {
        PredicateInput::Bag(bag)
    }
}

impl From<Expr> for PredicateInput {
    fn from(expr: Expr) -> Self {
        PredicateInput::Expr(expr)
    }
}

impl<T: Into<PredicateInput>> From<Option<T>> for PredicateInput {
    fn from(input: Option<T>) -> Self {
        match input {
            Some(inner) => inner.into(),
            None => PredicateInput::None,
        }
    }
}

/// Compile a filter input into its canonical [`QueryGroup`].
///
/// Total over every [`PredicateInput`] shape; only expression trees can
/// fail, and only with [`Error::UnsupportedPredicate`].
pub fn compile(input: impl Into<PredicateInput>) -> Result<QueryGroup, Error> {
    let input = input.into();
    let group = match input {
        PredicateInput::None => QueryGroup::and(),
        PredicateInput::Field(field) => QueryGroup::all_of([field]),
        PredicateInput::Fields(fields) => QueryGroup::all_of(fields),
        PredicateInput::Group(group) => group,
        PredicateInput::Bag(bag) => compile_bag(bag),
        PredicateInput::Expr(expr) => {
            let group = compile_expr(&expr)?;
            debug!(predicates = group.param_count(), "lowered expression tree");
            group
        }
    };
    Ok(group)
}

fn compile_bag(bag: FieldBag) -> QueryGroup {
    let mut group = QueryGroup::and();
    for (name, entry) in bag.entries() {
        match entry {
            BagValue::Value(value) => {
                group.push(QueryField::eq(name.clone(), value.clone()));
            }
            // Parameter-with-explicit-name wrapper: never re-bound.
            BagValue::Field(field) => group.push(field.clone()),
        }
    }
    group
}

fn compile_expr(expr: &Expr) -> Result<QueryGroup, Error> {
    match lower(expr, false)? {
        QueryItem::Group(group) => Ok(group),
        QueryItem::Field(field) => Ok(QueryGroup::and().with_field(field)),
    }
}

/// Lower one expression node. `negate` is the accumulated logical
/// negation; it is resolved at the operation level on each leaf so the
/// rendered SQL never needs a NOT wrapper.
fn lower(expr: &Expr, negate: bool) -> Result<QueryItem, Error> {
    match expr {
        Expr::And(lhs, rhs) | Expr::Or(lhs, rhs) => {
            if negate {
                return Err(Error::UnsupportedPredicate(format!(
                    "cannot negate an {}; push the negation onto its members",
                    expr.describe()
                )));
            }
            let group = match expr {
                Expr::And(_, _) => QueryGroup::and(),
                _ => QueryGroup::or(),
            };
            let group = group
                .with_item(lower(lhs, false)?)
                .with_item(lower(rhs, false)?);
            Ok(QueryItem::Group(group))
        }
        Expr::Not(inner) => lower(inner, !negate),
        Expr::Is(inner, literal) => lower(inner, negate ^ !literal),
        Expr::Cmp { field, op, value } => lower_cmp(field, *op, value, negate),
        Expr::AnyOf { field, values } => {
            let query_field = if negate {
                QueryField::not_in(field.clone(), values.clone())
            } else {
                QueryField::is_in(field.clone(), values.clone())
            };
            Ok(QueryItem::Field(query_field))
        }
        Expr::Contains { field, text } => Ok(QueryItem::Field(like_field(
            field,
            format!("%{text}%"),
            negate,
        ))),
        Expr::StartsWith { field, text } => Ok(QueryItem::Field(like_field(
            field,
            format!("{text}%"),
            negate,
        ))),
        Expr::EndsWith { field, text } => Ok(QueryItem::Field(like_field(
            field,
            format!("%{text}"),
            negate,
        ))),
    }
}

fn lower_cmp(field: &str, op: CmpOp, value: &Value, negate: bool) -> Result<QueryItem, Error> {
    // Comparisons against null compile to explicit null checks; an
    // equality predicate carrying a null value would silently match
    // nothing on most engines.
    if value.is_null() {
        let operation = match op {
            CmpOp::Eq => Operation::IsNull,
            CmpOp::Ne => Operation::IsNotNull,
            _ => {
                return Err(Error::UnsupportedPredicate(
                    "ordering comparison against null".into(),
                ))
            }
        };
        let operation = if negate { operation.negated() } else { operation };
        let query_field = match operation {
            Operation::IsNull => QueryField::is_null(field),
            _ => QueryField::is_not_null(field),
        };
        return Ok(QueryItem::Field(query_field));
    }

    let operation = match op {
        CmpOp::Eq => Operation::Equal,
        CmpOp::Ne => Operation::NotEqual,
        CmpOp::Lt => Operation::LessThan,
        CmpOp::Le => Operation::LessThanOrEqual,
        CmpOp::Gt => Operation::GreaterThan,
        CmpOp::Ge => Operation::GreaterThanOrEqual,
    };
    let operation = if negate { operation.negated() } else { operation };

    let value = value.clone();
    let query_field = match operation {
        Operation::Equal => QueryField::eq(field, value),
        Operation::NotEqual => QueryField::ne(field, value),
        Operation::LessThan => QueryField::lt(field, value),
        Operation::LessThanOrEqual => QueryField::le(field, value),
        Operation::GreaterThan => QueryField::gt(field, value),
        _ => QueryField::ge(field, value),
    };
    Ok(QueryItem::Field(query_field))
}

fn like_field(field: &str, pattern: String, negate: bool) -> QueryField {
    if negate {
        QueryField::not_like(field, pattern)
    } else {
        QueryField::like(field, pattern)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rowbind_model::Conjunction;

    fn leaf(group: &QueryGroup, index: usize) -> &QueryField {
        match &group.children[index] {
            QueryItem::Field(f) => f,
            QueryItem::Group(_) => panic!("expected leaf at index {index}"),
        }
    }

    #[test]
    fn test_none_matches_all() {
        let group = compile(PredicateInput::None).unwrap();
        assert!(group.is_empty());
        assert_eq!(group.conjunction, Conjunction::And);
    }

    #[test]
    fn test_group_identity() {
        let group = QueryGroup::or()
            .with_field(QueryField::eq("a", 1))
            .with_group(QueryGroup::and().with_field(QueryField::lt("b", 2)));
        assert_eq!(compile(group.clone()).unwrap(), group);
    }

    #[test]
    fn test_bag_matches_explicit_equality() {
        let bag = FieldBag::new().with("name", "alice").with("age", 30);
        let from_bag = compile(bag).unwrap();
        let explicit = compile(vec![
            QueryField::eq("name", "alice"),
            QueryField::eq("age", 30),
        ])
        .unwrap();
        assert_eq!(from_bag, explicit);
    }

    #[test]
    fn test_bag_passes_predicate_through() {
        let bag = FieldBag::new()
            .with("name", "alice")
            .with_predicate(QueryField::gt("age", 18));
        let group = compile(bag).unwrap();
        assert_eq!(leaf(&group, 1).operation(), Operation::GreaterThan);
    }

    #[test]
    fn test_expr_boolean_composition() {
        let expr = Expr::gt("a", 1) & (Expr::eq("b", 2) | Expr::eq("b", 3));
        let group = compile(expr).unwrap();
        assert_eq!(group.conjunction, Conjunction::And);
        assert_eq!(group.children.len(), 2);
        match &group.children[1] {
            QueryItem::Group(inner) => assert_eq!(inner.conjunction, Conjunction::Or),
            QueryItem::Field(_) => panic!("expected nested or group"),
        }
    }

    #[test]
    fn test_method_predicates() {
        let group = compile(Expr::contains("name", "li")).unwrap();
        let f = leaf(&group, 0);
        assert_eq!(f.operation(), Operation::Like);
        assert_eq!(
            f.operand(),
            &rowbind_model::Operand::Single(Value::String("%li%".into()))
        );

        let group = compile(Expr::starts_with("name", "al")).unwrap();
        assert_eq!(
            leaf(&group, 0).operand(),
            &rowbind_model::Operand::Single(Value::String("al%".into()))
        );

        let group = compile(Expr::ends_with("name", "ce")).unwrap();
        assert_eq!(
            leaf(&group, 0).operand(),
            &rowbind_model::Operand::Single(Value::String("%ce".into()))
        );
    }

    #[test]
    fn test_negation_flips_operation() {
        let group = compile(!Expr::any_of("id", vec![1.into(), 2.into()])).unwrap();
        assert_eq!(leaf(&group, 0).operation(), Operation::NotIn);

        let group = compile(!Expr::contains("name", "x")).unwrap();
        assert_eq!(leaf(&group, 0).operation(), Operation::NotLike);

        let group = compile(!Expr::lt("a", 5)).unwrap();
        assert_eq!(leaf(&group, 0).operation(), Operation::GreaterThanOrEqual);
    }

    #[test]
    fn test_is_false_equals_bang() {
        let via_is = compile(Expr::any_of("id", vec![1.into()]).is(false)).unwrap();
        let via_not = compile(!Expr::any_of("id", vec![1.into()])).unwrap();
        assert_eq!(via_is, via_not);
        assert_eq!(leaf(&via_is, 0).operation(), Operation::NotIn);
    }

    #[test]
    fn test_is_true_is_identity() {
        let bare = compile(Expr::contains("name", "x")).unwrap();
        let wrapped = compile(Expr::contains("name", "x").is(true)).unwrap();
        assert_eq!(bare, wrapped);
    }

    #[test]
    fn test_double_negation_cancels() {
        let once = compile(Expr::eq("a", 1)).unwrap();
        let twice = compile(!!Expr::eq("a", 1)).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_null_comparisons() {
        let group = compile(Expr::eq("deleted_at", Value::Null)).unwrap();
        assert_eq!(leaf(&group, 0).operation(), Operation::IsNull);

        let group = compile(Expr::ne("deleted_at", Value::Null)).unwrap();
        assert_eq!(leaf(&group, 0).operation(), Operation::IsNotNull);

        let group = compile(!Expr::eq("deleted_at", Value::Null)).unwrap();
        assert_eq!(leaf(&group, 0).operation(), Operation::IsNotNull);

        let err = compile(Expr::gt("deleted_at", Value::Null)).unwrap_err();
        assert!(matches!(err, Error::UnsupportedPredicate(_)));
    }

    #[test]
    fn test_negated_group_is_unsupported() {
        let err = compile(!(Expr::eq("a", 1) & Expr::eq("b", 2))).unwrap_err();
        match err {
            Error::UnsupportedPredicate(msg) => assert!(msg.contains("and group")),
            other => panic!("expected UnsupportedPredicate, got {other:?}"),
        }
    }
}
