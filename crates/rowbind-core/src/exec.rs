//! Sequential execution of a batch plan against a driver.
//!
//! Batches run in plan order over one driver handle. A failure in batch
//! *k* aborts batches after *k* but leaves earlier batches committed;
//! partial completion is the documented outcome unless the caller wraps
//! the operation in an external transaction. Cancellation is observed
//! between batches only.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rowbind_model::Value;
use tracing::debug;

use crate::error::Error;
use crate::planner::BatchPlan;
use crate::schema::Entity;
use crate::statement::{BatchStatement, Driver, ExecuteResult, StatementBuilder};

/// An externally supplied cancellation signal.
///
/// Cloning shares the flag. The engine checks it between batches;
/// mid-batch granularity is not provided.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create a token in the not-cancelled state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Execute every batch of a plan and sum the affected-row counts.
///
/// The plan must have been derived from `entities`; a plan covering more
/// entities than the slice holds fails with [`Error::PlanMismatch`]
/// before any batch executes. Each batch is rendered through `builder`
/// and executed on `driver` in plan order. A driver failure on batch *k*
/// surfaces as [`Error::Execution`] with the batch index; a cancellation
/// observed before batch *k* surfaces as [`Error::Cancelled`] with the
/// number of batches already committed.
pub fn execute_plan<E, B, D>(
    builder: &B,
    driver: &mut D,
    entities: &[E],
    plan: &BatchPlan,
    cancel: Option<&CancelToken>,
) -> Result<u64, Error>
where
    E: Entity,
    B: StatementBuilder + ?Sized,
    D: Driver + ?Sized,
{
    if plan.entity_count() > entities.len() {
        return Err(Error::PlanMismatch {
            planned: plan.entity_count(),
            supplied: entities.len(),
        });
    }

    let fields = E::fields();
    let mut affected = 0u64;

    for (index, range) in plan.batches.iter().enumerate() {
        if let Some(token) = cancel {
            if token.is_cancelled() {
                return Err(Error::Cancelled { completed: index });
            }
        }

        let rows = entities[range.clone()]
            .iter()
            .map(|entity| {
                fields
                    .iter()
                    .map(|field| entity.value(&field.name).unwrap_or(Value::Null))
                    .collect()
            })
            .collect();

        let batch = BatchStatement {
            entity: E::entity().into(),
            fields: fields.clone(),
            qualifiers: plan.qualifiers.clone(),
            rows,
        };

        let result = builder
            .render_merge(&batch)
            .and_then(|rendered| driver.execute(&rendered))
            .map_err(|source| Error::Execution {
                batch: index,
                source: Box::new(source),
            })?;

        match result {
            ExecuteResult::Affected(count) => affected += count,
            ExecuteResult::Rows(_) => {
                return Err(Error::Execution {
                    batch: index,
                    source: Box::new(Error::Driver(
                        "merge statement returned a result set".into(),
                    )),
                });
            }
        }

        debug!(batch = index, rows = range.len(), "executed batch");
    }

    Ok(affected)
}
