//! Schema collaborator: the entity contract and the field cache handle.
//!
//! The engine never inspects record types at runtime. A record opts in by
//! implementing [`Entity`], a statically declared schema description,
//! and the [`SchemaCache`] memoizes the declared field lists per entity
//! name. The cache is an explicitly passed, externally owned handle, not
//! ambient global state, so the core components stay pure and
//! independently testable.

use std::sync::Arc;

use dashmap::DashMap;
use rowbind_model::{Field, Value};

/// A record type with a statically declared schema.
pub trait Entity {
    /// Entity (table) name.
    fn entity() -> &'static str;

    /// Declared fields, in column order.
    fn fields() -> Vec<Field>;

    /// Declared primary/identity key fields. May be empty when the entity
    /// has no usable key; upsert planning then requires explicit
    /// qualifiers.
    fn key_fields() -> Vec<Field>;

    /// The value of a field on this instance, or `None` when the field
    /// does not exist on the type.
    fn value(&self, field: &str) -> Option<Value>;
}

/// Caches declared field lists per entity name.
///
/// Read-mostly and safe to share across threads; resolution happens once
/// per entity type and every later lookup is a map hit.
#[derive(Debug, Default)]
pub struct SchemaCache {
    fields: DashMap<&'static str, Arc<Vec<Field>>>,
    keys: DashMap<&'static str, Arc<Vec<Field>>>,
}

impl SchemaCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// The declared fields of `E`, resolved once and cached.
    pub fn fields_of<E: Entity>(&self) -> Arc<Vec<Field>> {
        self.fields
            .entry(E::entity())
            .or_insert_with(|| Arc::new(E::fields()))
            .clone()
    }

    /// The declared key fields of `E`, resolved once and cached.
    pub fn key_fields_of<E: Entity>(&self) -> Arc<Vec<Field>> {
        self.keys
            .entry(E::entity())
            .or_insert_with(|| Arc::new(E::key_fields()))
            .clone()
    }

    /// Number of entity types resolved so far.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether no entity type has been resolved yet.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
