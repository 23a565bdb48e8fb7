//! Statement assembly and the collaborator seams.
//!
//! A [`QueryStatement`] bundles a compiled filter with projection,
//! ordering, and an optional row window, validates every referenced field
//! against the resolved schema, and binds parameters with statement-wide
//! unique names. The dialect-specific SQL text synthesizer and the
//! database driver sit behind the [`StatementBuilder`] and [`Driver`]
//! traits; the engine guarantees parameter names are unique and stably
//! ordered, the builder guarantees syntactic validity for its dialect.

use std::collections::{HashMap, HashSet};

use rowbind_model::{Field, OrderField, QueryField, QueryGroup, QueryItem, Value};
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::error::Error;
use crate::materializer::RowBuffer;
use crate::window::RowWindow;

/// A named bound parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    /// Unique name within the statement.
    pub name: String,
    /// Bound value.
    pub value: Value,
}

impl Parameter {
    /// Create a parameter.
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Dialect SQL text plus its bound parameters, ready for a driver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedStatement {
    /// Literal SQL text.
    pub sql: String,
    /// Parameters in binding order.
    pub params: Vec<Parameter>,
}

/// A read statement: filter, projection, ordering, optional window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryStatement {
    /// Target entity (table) name.
    pub entity: String,
    /// Projected fields, in declaration order.
    pub projection: Vec<Field>,
    /// Row filter (empty group = match all).
    pub filter: QueryGroup,
    /// Ordering; empty means driver natural order.
    pub order: Vec<OrderField>,
    /// Optional row window.
    pub window: Option<RowWindow>,
}

impl QueryStatement {
    /// Create a statement over an entity with no projection or filter.
    pub fn new(entity: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            projection: Vec::new(),
            filter: QueryGroup::and(),
            order: Vec::new(),
            window: None,
        }
    }

    /// Add a projected field.
    pub fn select(mut self, field: impl Into<Field>) -> Self {
        self.projection.push(field.into());
        self
    }

    /// Set the projection.
    pub fn with_projection(mut self, fields: Vec<Field>) -> Self {
        self.projection = fields;
        self
    }

    /// Set the filter.
    pub fn with_filter(mut self, filter: QueryGroup) -> Self {
        self.filter = filter;
        self
    }

    /// Add an order field.
    pub fn with_order(mut self, order: OrderField) -> Self {
        self.order.push(order);
        self
    }

    /// Set the row window.
    pub fn with_window(mut self, window: RowWindow) -> Self {
        self.window = Some(window);
        self
    }

    /// Check every referenced field against the resolved schema.
    ///
    /// Projection, filter, and ordering references must all exist;
    /// the first unknown name fails with [`Error::MissingField`]. Runs
    /// before any statement reaches a driver.
    pub fn validate(&self, schema: &[Field], config: &EngineConfig) -> Result<(), Error> {
        let known = |name: &str| {
            schema
                .iter()
                .any(|f| f.matches(name, config.case_insensitive_fields))
        };

        for field in &self.projection {
            if !known(&field.name) {
                return Err(Error::MissingField {
                    field: field.name.clone(),
                });
            }
        }
        for name in self.filter.field_names() {
            if !known(name) {
                return Err(Error::MissingField { field: name.into() });
            }
        }
        for order in &self.order {
            if !known(&order.field) {
                return Err(Error::MissingField {
                    field: order.field.clone(),
                });
            }
        }
        Ok(())
    }

    /// Bind the filter's parameters with statement-wide unique names.
    pub fn parameters(&self) -> Vec<Parameter> {
        bind_parameters(&self.filter)
    }
}

/// Bind every operand value in a group to a uniquely named parameter.
///
/// Names derive from the field name, lower-cased; repeats of the same
/// base name (the same column used twice, a range's two bounds, an IN
/// list) take a numeric suffix. A suffixed candidate can itself collide
/// with a column literally named that way, so every emitted name is
/// checked against the set already taken. Depth-first order, stable
/// across calls.
pub fn bind_parameters(group: &QueryGroup) -> Vec<Parameter> {
    let mut binder = Binder::default();
    binder.bind_group(group);
    binder.params
}

#[derive(Default)]
struct Binder {
    params: Vec<Parameter>,
    counts: HashMap<String, usize>,
    taken: HashSet<String>,
}

impl Binder {
    fn bind_group(&mut self, group: &QueryGroup) {
        for child in &group.children {
            match child {
                QueryItem::Field(field) => self.bind_field(field),
                QueryItem::Group(inner) => self.bind_group(inner),
            }
        }
    }

    fn bind_field(&mut self, field: &QueryField) {
        let base = field.field().to_ascii_lowercase();
        for value in field.operand().values() {
            let count = self.counts.entry(base.clone()).or_insert(0);
            let name = loop {
                *count += 1;
                let candidate = if *count == 1 {
                    base.clone()
                } else {
                    format!("{base}_{count}")
                };
                if self.taken.insert(candidate.clone()) {
                    break candidate;
                }
            };
            self.params.push(Parameter::new(name, value.clone()));
        }
    }
}

/// One batch of an upsert-style write, handed to the statement builder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchStatement {
    /// Target entity (table) name.
    pub entity: String,
    /// Entity fields, in column order.
    pub fields: Vec<Field>,
    /// Fields used to match existing rows.
    pub qualifiers: Vec<Field>,
    /// One row of values per entity, positional per `fields`.
    pub rows: Vec<Vec<Value>>,
}

/// What a driver returns for one statement.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecuteResult {
    /// A result set.
    Rows(RowBuffer),
    /// An affected-row count.
    Affected(u64),
}

/// Dialect-specific SQL text synthesizer.
///
/// Out of scope for this engine; callers supply an implementation per
/// target dialect. The engine hands it validated statements with unique,
/// stably ordered parameters.
pub trait StatementBuilder {
    /// Render a read statement.
    fn render(&self, statement: &QueryStatement) -> Result<RenderedStatement, Error>;

    /// Render one MERGE-style batch of an upsert.
    fn render_merge(&self, batch: &BatchStatement) -> Result<RenderedStatement, Error>;
}

/// Database driver connection.
///
/// Execution failures are passed through unchanged; the engine never
/// retries or swallows them. Timeouts are the driver's concern.
pub trait Driver {
    /// Execute one statement.
    fn execute(&mut self, statement: &RenderedStatement) -> Result<ExecuteResult, Error>;

    /// Execute several statements in one round trip, returning results
    /// in the same order the statements were supplied.
    fn execute_many(
        &mut self,
        statements: &[RenderedStatement],
    ) -> Result<Vec<ExecuteResult>, Error>;
}
