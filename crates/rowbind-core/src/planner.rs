//! Batch planner: qualifier resolution and bounded partitioning for
//! multi-entity writes.
//!
//! The planner only partitions; it never executes. Each batch is an
//! entity-index range destined for one MERGE-style statement, bounded so
//! its total bound parameters stay under the driver's parameter ceiling.
//! Batch order always matches input order.

use std::ops::Range;

use rowbind_model::{Field, Value};
use tracing::debug;

use crate::config::EngineConfig;
use crate::error::Error;
use crate::schema::Entity;

/// The derived partition of an entity set into execution batches.
///
/// Produced fresh per call, never mutated after creation. Re-planning
/// identical input yields an identical partition.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchPlan {
    /// Entity-index ranges, contiguous, non-overlapping, input-ordered,
    /// covering the whole input.
    pub batches: Vec<Range<usize>>,
    /// The resolved row-matching fields.
    pub qualifiers: Vec<Field>,
    /// Entities per full batch; the final batch may be smaller.
    pub batch_size: usize,
}

impl BatchPlan {
    /// Total entities covered by the plan.
    pub fn entity_count(&self) -> usize {
        self.batches.iter().map(|r| r.len()).sum()
    }
}

/// Partition `entities` into bounded batches and resolve the qualifier
/// fields used for row matching.
///
/// Qualifier resolution: explicit `qualifiers` win; otherwise the
/// entity's declared key fields; if neither exists the whole operation
/// fails with [`Error::KeyFieldNotFound`] before any batch executes.
/// With no explicit `batch_size`, the modular size is the largest entity
/// count whose bound parameters stay under the configured ceiling.
pub fn plan_batches<E: Entity>(
    entities: &[E],
    batch_size: Option<usize>,
    qualifiers: Option<&[Field]>,
    config: &EngineConfig,
) -> Result<BatchPlan, Error> {
    let fields = E::fields();
    let keys = E::key_fields();

    let resolved = resolve_qualifiers::<E>(&fields, &keys, qualifiers, config)?;
    validate_key_values(entities, &resolved, &keys, config)?;

    let size = match batch_size {
        Some(0) => return Err(Error::InvalidBatchSize(0)),
        Some(explicit) => explicit,
        None => modular_batch_size(fields.len().max(1), config),
    };

    let mut batches = Vec::new();
    let mut start = 0;
    while start < entities.len() {
        let end = (start + size).min(entities.len());
        batches.push(start..end);
        start = end;
    }

    debug!(
        entity = E::entity(),
        batches = batches.len(),
        batch_size = size,
        "planned batches"
    );

    Ok(BatchPlan {
        batches,
        qualifiers: resolved,
        batch_size: size,
    })
}

/// The largest entity count per statement that keeps bound parameters
/// under the configured ceiling, given the entity's field count.
fn modular_batch_size(fields_per_entity: usize, config: &EngineConfig) -> usize {
    (config.parameter_ceiling / fields_per_entity).max(1)
}

fn resolve_qualifiers<E: Entity>(
    fields: &[Field],
    keys: &[Field],
    qualifiers: Option<&[Field]>,
    config: &EngineConfig,
) -> Result<Vec<Field>, Error> {
    match qualifiers {
        Some(explicit) => {
            if explicit.is_empty() {
                return Err(Error::InvalidQualifiers {
                    entity: E::entity().into(),
                    reason: "empty qualifier set".into(),
                });
            }
            for qualifier in explicit {
                let exists = fields
                    .iter()
                    .any(|f| f.matches(&qualifier.name, config.case_insensitive_fields));
                if !exists {
                    return Err(Error::InvalidQualifiers {
                        entity: E::entity().into(),
                        reason: format!("{} is not a field of the entity", qualifier.name),
                    });
                }
            }
            Ok(explicit.to_vec())
        }
        None => {
            if keys.is_empty() {
                return Err(Error::KeyFieldNotFound {
                    entity: E::entity().into(),
                });
            }
            Ok(keys.to_vec())
        }
    }
}

/// A key field used for matching requires every entity to carry a
/// non-null value for it; entities without identity values cannot be
/// matched and are invalid input rather than silently skipped.
fn validate_key_values<E: Entity>(
    entities: &[E],
    resolved: &[Field],
    keys: &[Field],
    config: &EngineConfig,
) -> Result<(), Error> {
    let key_qualifiers: Vec<&Field> = resolved
        .iter()
        .filter(|q| {
            keys.iter()
                .any(|k| k.matches(&q.name, config.case_insensitive_fields))
        })
        .collect();
    if key_qualifiers.is_empty() {
        return Ok(());
    }

    for (index, entity) in entities.iter().enumerate() {
        for qualifier in &key_qualifiers {
            let value = entity.value(&qualifier.name);
            if matches!(value, None | Some(Value::Null)) {
                return Err(Error::InvalidQualifiers {
                    entity: E::entity().into(),
                    reason: format!(
                        "entity {index} has no value for key qualifier {}",
                        qualifier.name
                    ),
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rowbind_model::FieldType;

    struct Order {
        id: Option<i64>,
        customer: String,
        total: f64,
    }

    impl Entity for Order {
        fn entity() -> &'static str {
            "Order"
        }

        fn fields() -> Vec<Field> {
            vec![
                Field::typed("id", FieldType::Int64),
                Field::typed("customer", FieldType::String),
                Field::typed("total", FieldType::Float64),
            ]
        }

        fn key_fields() -> Vec<Field> {
            vec![Field::typed("id", FieldType::Int64)]
        }

        fn value(&self, field: &str) -> Option<Value> {
            match field {
                "id" => Some(self.id.into()),
                "customer" => Some(Value::String(self.customer.clone())),
                "total" => Some(Value::Float64(self.total)),
                _ => None,
            }
        }
    }

    fn orders(n: usize) -> Vec<Order> {
        (0..n)
            .map(|i| Order {
                id: Some(i as i64),
                customer: format!("c{i}"),
                total: i as f64,
            })
            .collect()
    }

    #[test]
    fn test_explicit_batch_size_partition() {
        let entities = orders(10);
        let plan = plan_batches(&entities, Some(4), None, &EngineConfig::default()).unwrap();
        assert_eq!(plan.batches, vec![0..4, 4..8, 8..10]);
        assert_eq!(plan.batch_size, 4);
        assert_eq!(plan.entity_count(), 10);
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let entities = orders(3);
        let err = plan_batches(&entities, Some(0), None, &EngineConfig::default()).unwrap_err();
        assert!(matches!(err, Error::InvalidBatchSize(0)));
    }

    #[test]
    fn test_modular_size_from_parameter_ceiling() {
        // 3 fields per entity, ceiling 10 -> 3 entities per batch.
        let config = EngineConfig::new().with_parameter_ceiling(10);
        let entities = orders(8);
        let plan = plan_batches(&entities, None, None, &config).unwrap();
        assert_eq!(plan.batch_size, 3);
        assert_eq!(plan.batches, vec![0..3, 3..6, 6..8]);
    }

    #[test]
    fn test_qualifier_defaults_to_key() {
        let entities = orders(5);
        let plan = plan_batches(&entities, Some(2), None, &EngineConfig::default()).unwrap();
        assert_eq!(plan.qualifiers.len(), 1);
        assert_eq!(plan.qualifiers[0].name, "id");
    }

    #[test]
    fn test_explicit_qualifier_overrides_key() {
        let entities = orders(5);
        let qualifiers = vec![Field::new("customer")];
        let plan =
            plan_batches(&entities, Some(2), Some(&qualifiers), &EngineConfig::default()).unwrap();
        assert_eq!(plan.qualifiers[0].name, "customer");
    }

    #[test]
    fn test_unknown_qualifier_rejected() {
        let entities = orders(2);
        let qualifiers = vec![Field::new("warehouse")];
        let err = plan_batches(&entities, None, Some(&qualifiers), &EngineConfig::default())
            .unwrap_err();
        match err {
            Error::InvalidQualifiers { reason, .. } => assert!(reason.contains("warehouse")),
            other => panic!("expected InvalidQualifiers, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_identity_value_rejected() {
        let mut entities = orders(3);
        entities[1].id = None;
        let err = plan_batches(&entities, None, None, &EngineConfig::default()).unwrap_err();
        match err {
            Error::InvalidQualifiers { reason, .. } => {
                assert!(reason.contains("entity 1"));
            }
            other => panic!("expected InvalidQualifiers, got {other:?}"),
        }
    }

    #[test]
    fn test_no_key_and_no_qualifiers() {
        struct Keyless;
        impl Entity for Keyless {
            fn entity() -> &'static str {
                "Keyless"
            }
            fn fields() -> Vec<Field> {
                vec![Field::new("a")]
            }
            fn key_fields() -> Vec<Field> {
                vec![]
            }
            fn value(&self, _field: &str) -> Option<Value> {
                Some(Value::Null)
            }
        }

        let err =
            plan_batches(&[Keyless, Keyless], None, None, &EngineConfig::default()).unwrap_err();
        assert!(matches!(err, Error::KeyFieldNotFound { .. }));
    }

    #[test]
    fn test_replanning_is_idempotent() {
        let entities = orders(19);
        let config = EngineConfig::new().with_parameter_ceiling(21);
        let first = plan_batches(&entities, None, None, &config).unwrap();
        let second = plan_batches(&entities, None, None, &config).unwrap();
        assert_eq!(first, second);
    }
}
