//! Rowbind Core - predicate compilation, batch planning, and result
//! materialization.
//!
//! This crate is the engine of the Rowbind micro-ORM: callers describe
//! what rows to read or write with typed predicate objects, and the
//! engine normalizes them into a canonical
//! [`QueryGroup`](rowbind_model::QueryGroup), partitions multi-entity
//! writes into bounded batches,
//! and decodes raw row buffers back into typed records, open maps, or
//! scalars. Dialect SQL rendering and the database connection live behind
//! the [`StatementBuilder`] and [`Driver`] traits.
//!
//! Every component is a pure function of its inputs; the engine holds no
//! shared mutable state, so direct and deferred execution modes need no
//! internal synchronization.

pub mod compiler;
pub mod config;
pub mod error;
pub mod exec;
pub mod materializer;
pub mod planner;
pub mod schema;
pub mod statement;
pub mod window;

pub use compiler::{compile, PredicateInput};
pub use config::{EngineConfig, DEFAULT_PARAMETER_CEILING};
pub use error::Error;
pub use exec::{execute_plan, CancelToken};
pub use materializer::{
    materialize, materialize_maps, materialize_scalars, FromRow, FromValue, MultiResult, OpenMap,
    RowBuffer, RowView,
};
pub use planner::{plan_batches, BatchPlan};
pub use schema::{Entity, SchemaCache};
pub use statement::{
    bind_parameters, BatchStatement, Driver, ExecuteResult, Parameter, QueryStatement,
    RenderedStatement, StatementBuilder,
};
pub use window::{window, RowWindow, WindowDescriptor};

/// Re-export the model types.
pub use rowbind_model as model;
