//! Paging cursor: deterministic row windows from (page, size, order).

use rowbind_model::{OrderField, QueryGroup};
use serde::{Deserialize, Serialize};

/// A half-open row range `[offset, offset + limit)` under a total order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowWindow {
    /// Rows to skip.
    pub offset: usize,
    /// Maximum rows to return.
    pub limit: usize,
}

impl RowWindow {
    /// Create a window.
    pub fn new(offset: usize, limit: usize) -> Self {
        Self { offset, limit }
    }
}

/// A windowed read description handed to the statement builder.
///
/// The filter restricts the candidate set first; ordering and the row
/// window apply on top. Filters are never partially applied per page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowDescriptor {
    /// Row filter (empty group = match all).
    pub filter: QueryGroup,
    /// Total order; precedence left to right.
    pub order: Vec<OrderField>,
    /// The row range under that order.
    pub window: RowWindow,
}

/// Translate a zero-based page index and fixed page size into a row
/// window over the filtered, ordered row set.
///
/// Each call is stateless; no cursor is retained between calls. An empty
/// `order` is accepted, but row identity within a page is then only as
/// stable as the underlying store's natural order.
pub fn window(
    page: usize,
    rows_per_batch: usize,
    order: Vec<OrderField>,
    filter: QueryGroup,
) -> WindowDescriptor {
    WindowDescriptor {
        filter,
        order,
        window: RowWindow::new(page * rows_per_batch, rows_per_batch),
    }
}
