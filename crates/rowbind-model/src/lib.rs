//! Rowbind predicate and value model.
//!
//! This crate defines the immutable value objects the Rowbind engine
//! operates on: runtime [`Value`]s, [`Field`] and ordering references, the
//! [`QueryField`]/[`QueryGroup`] predicate model with its closed
//! [`Operation`] set, anonymous [`FieldBag`]s, and typed boolean
//! [`Expr`] trees. None of these hold process-wide state; everything is
//! constructed per call and discarded after.

pub mod expr;
pub mod field;
pub mod predicate;
pub mod value;

pub use expr::{CmpOp, Expr};
pub use field::{Field, FieldType, OrderDirection, OrderField};
pub use predicate::{
    BagValue, Conjunction, FieldBag, Operand, Operation, QueryField, QueryGroup, QueryItem,
};
pub use value::Value;
