//! Rowbind - a micro-ORM core.
//!
//! Callers describe what rows to read or write with typed, composable
//! predicate objects; Rowbind compiles that description into a canonical
//! predicate tree with uniquely named parameters, plans bounded batches
//! for multi-entity writes, and materializes raw rows back into typed
//! records, open maps, or scalars. The dialect SQL synthesizer and the
//! database driver are collaborator traits supplied by the caller.
//!
//! # Filtering
//!
//! ```
//! use rowbind::{compile, Expr, FieldBag, QueryField};
//!
//! // Typed expression tree
//! let group = compile(Expr::gt("age", 18) & Expr::contains("name", "li")).unwrap();
//!
//! // Anonymous field/value bag: each entry becomes an equality predicate
//! let group = compile(FieldBag::new().with("status", "active")).unwrap();
//!
//! // Explicit predicates
//! let group = compile(vec![
//!     QueryField::between("price", 10, 99),
//!     QueryField::is_not_null("sku"),
//! ])
//! .unwrap();
//! # let _ = group;
//! ```
//!
//! # Paged reads
//!
//! ```
//! use rowbind::{compile, window, Expr, OrderField};
//!
//! let filter = compile(Expr::gt("n", 10) & Expr::le("n", 20)).unwrap();
//! let page = window(0, 4, vec![OrderField::asc("n")], filter);
//! assert_eq!(page.window.offset, 0);
//! assert_eq!(page.window.limit, 4);
//! ```

pub use rowbind_core::{
    bind_parameters, compile, execute_plan, materialize, materialize_maps, materialize_scalars,
    plan_batches, window, BatchPlan, BatchStatement, CancelToken, Driver, EngineConfig, Entity,
    Error, ExecuteResult, FromRow, FromValue, MultiResult, OpenMap, Parameter, PredicateInput,
    QueryStatement, RenderedStatement, RowBuffer, RowView, RowWindow, SchemaCache,
    StatementBuilder, WindowDescriptor, DEFAULT_PARAMETER_CEILING,
};
pub use rowbind_model::{
    BagValue, CmpOp, Conjunction, Expr, Field, FieldBag, FieldType, Operand, Operation,
    OrderDirection, OrderField, QueryField, QueryGroup, QueryItem, Value,
};
