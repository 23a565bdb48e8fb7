//! Engine error types.
//!
//! All validation errors (unsupported predicate, missing field, bad
//! qualifiers) are detectable without touching a database; execution
//! errors carry the batch index so the caller can decide whether to retry
//! the remainder. Nothing is logged or swallowed internally.

use thiserror::Error;

/// Core engine errors.
#[derive(Debug, Error)]
pub enum Error {
    /// A predicate input shape the compiler cannot normalize.
    #[error("unsupported predicate: {0}")]
    UnsupportedPredicate(String),

    /// A referenced field does not exist in the resolved schema.
    #[error("unknown field: {field}")]
    MissingField {
        /// The offending field name.
        field: String,
    },

    /// No qualifier fields were supplied and the entity declares no key.
    #[error("no key field declared for entity {entity} and no qualifiers supplied")]
    KeyFieldNotFound {
        /// Entity type name.
        entity: String,
    },

    /// Supplied qualifiers do not correspond to actual entity fields, or
    /// a key qualifier is unmatched by entity values.
    #[error("invalid qualifiers for entity {entity}: {reason}")]
    InvalidQualifiers {
        /// Entity type name.
        entity: String,
        /// What made the qualifiers invalid.
        reason: String,
    },

    /// An explicit batch size that cannot partition anything.
    #[error("invalid batch size: {0}")]
    InvalidBatchSize(usize),

    /// A scalar target was requested against a multi-column projection.
    #[error("scalar target requires a single-column projection, got {columns} columns")]
    ProjectionShape {
        /// Number of projected columns.
        columns: usize,
    },

    /// A scalar value could not be decoded into the requested type.
    #[error("cannot decode scalar at row {row} into the requested type")]
    ScalarDecode {
        /// Row index within the buffer.
        row: usize,
    },

    /// More result sets were extracted than the driver returned.
    #[error("result sets exhausted: extraction {requested} of {available}")]
    ResultSetExhausted {
        /// Number of buffers the driver returned.
        available: usize,
        /// The 1-based extraction that failed.
        requested: usize,
    },

    /// Driver-level execution failure, passed through unchanged.
    #[error("driver error: {0}")]
    Driver(String),

    /// A plan was executed against a different entity slice than the one
    /// it was derived from.
    #[error("plan covers {planned} entities but {supplied} were supplied")]
    PlanMismatch {
        /// Entities the plan partitions.
        planned: usize,
        /// Entities handed to the executor.
        supplied: usize,
    },

    /// A batch failed during plan execution. Batches before `batch` are
    /// already committed unless the caller supplied an enclosing
    /// transaction; batches after it were not sent.
    #[error("batch {batch} failed")]
    Execution {
        /// Zero-based index of the failed batch.
        batch: usize,
        /// The underlying failure.
        #[source]
        source: Box<Error>,
    },

    /// Plan execution was cancelled between batches.
    #[error("operation cancelled after {completed} completed batches")]
    Cancelled {
        /// Batches that completed before the token was observed.
        completed: usize,
    },
}
