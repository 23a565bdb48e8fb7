//! Result materialization: decoding raw row buffers into target shapes.
//!
//! A [`RowBuffer`] is positional row data under a declared projection
//! header. It can be decoded three ways: into typed records through
//! [`FromRow`], into insertion-ordered [`OpenMap`]s, or into scalars.
//! [`MultiResult`] handles the multi-result-set round trip: buffers are
//! consumed strictly in arrival order, so result set *i* can never be
//! decoded against descriptor *j*'s shape.

use std::collections::VecDeque;

use rowbind_model::{Field, Value};
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::error::Error;

static NULL: Value = Value::Null;

/// Positional row data under a declared projection.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RowBuffer {
    /// Projected fields, in column order.
    pub fields: Vec<Field>,
    /// Rows, positional per `fields`. Rows shorter than the projection
    /// read as null in the missing positions.
    pub rows: Vec<Vec<Value>>,
}

impl RowBuffer {
    /// Create an empty buffer with the given projection.
    pub fn new(fields: Vec<Field>) -> Self {
        Self {
            fields,
            rows: Vec::new(),
        }
    }

    /// Create a buffer with data.
    pub fn with_rows(fields: Vec<Field>, rows: Vec<Vec<Value>>) -> Self {
        Self { fields, rows }
    }

    /// Append a row.
    pub fn push_row(&mut self, row: Vec<Value>) {
        self.rows.push(row);
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the buffer has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Column index of a field name under the given case policy.
    fn column_index(&self, name: &str, case_insensitive: bool) -> Option<usize> {
        self.fields
            .iter()
            .position(|f| f.matches(name, case_insensitive))
    }
}

/// A borrowed view over one row, keyed by projection field name.
#[derive(Debug, Clone, Copy)]
pub struct RowView<'a> {
    buffer: &'a RowBuffer,
    row: usize,
    case_insensitive: bool,
}

impl<'a> RowView<'a> {
    /// The value of a projected column, or `None` when the projection
    /// does not contain the field. A typed record decoding a missing
    /// field falls back to its default; that is not an error.
    pub fn get(&self, name: &str) -> Option<&'a Value> {
        let column = self.buffer.column_index(name, self.case_insensitive)?;
        Some(self.buffer.rows[self.row].get(column).unwrap_or(&NULL))
    }

    /// The value at a column position.
    pub fn get_at(&self, column: usize) -> Option<&'a Value> {
        if column >= self.buffer.fields.len() {
            return None;
        }
        Some(self.buffer.rows[self.row].get(column).unwrap_or(&NULL))
    }
}

/// A record type decodable from a projected row.
///
/// Implementations pull fields by name through [`RowView::get`]; a field
/// absent from the projection decodes to the type's default state.
pub trait FromRow: Sized {
    /// Decode one row.
    fn from_row(row: &RowView<'_>) -> Self;
}

/// A scalar type decodable from a single projected column.
pub trait FromValue: Sized {
    /// Decode a value, or `None` when the value has the wrong shape.
    fn from_value(value: &Value) -> Option<Self>;
}

impl FromValue for bool {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_bool()
    }
}

impl FromValue for i32 {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_i32()
    }
}

impl FromValue for i64 {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_i64()
    }
}

impl FromValue for f64 {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_f64()
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_str().map(str::to_string)
    }
}

impl FromValue for Vec<u8> {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_bytes().map(<[u8]>::to_vec)
    }
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Option<Self> {
        Some(value.clone())
    }
}

/// An insertion-ordered, string-keyed value container, the open-shape
/// materialization target. Values are exactly as the driver returned
/// them; no coercion is applied.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OpenMap {
    entries: Vec<(String, Value)>,
}

impl OpenMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// The value under a key (exact match).
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn push(&mut self, key: String, value: Value) {
        self.entries.push((key, value));
    }
}

impl IntoIterator for OpenMap {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Decode every row into a typed record.
///
/// Projection fields absent from the record are ignored; record fields
/// absent from the projection decode to their defaults.
pub fn materialize<T: FromRow>(buffer: &RowBuffer, config: &EngineConfig) -> Vec<T> {
    (0..buffer.rows.len())
        .map(|row| {
            T::from_row(&RowView {
                buffer,
                row,
                case_insensitive: config.case_insensitive_fields,
            })
        })
        .collect()
}

/// Decode every row into an insertion-ordered open map, one key per
/// projected column.
pub fn materialize_maps(buffer: &RowBuffer) -> Vec<OpenMap> {
    buffer
        .rows
        .iter()
        .map(|row| {
            let mut map = OpenMap::new();
            for (column, field) in buffer.fields.iter().enumerate() {
                let value = row.get(column).cloned().unwrap_or(Value::Null);
                map.push(field.name.clone(), value);
            }
            map
        })
        .collect()
}

/// Decode a single-column projection into scalars.
///
/// A multi-column projection is a [`Error::ProjectionShape`]; a value the
/// target type cannot represent is a [`Error::ScalarDecode`] naming the
/// row.
pub fn materialize_scalars<T: FromValue>(buffer: &RowBuffer) -> Result<Vec<T>, Error> {
    if buffer.fields.len() != 1 {
        return Err(Error::ProjectionShape {
            columns: buffer.fields.len(),
        });
    }
    buffer
        .rows
        .iter()
        .enumerate()
        .map(|(row, values)| {
            let value = values.first().unwrap_or(&NULL);
            T::from_value(value).ok_or(Error::ScalarDecode { row })
        })
        .collect()
}

/// The N result sets of one multi-statement round trip.
///
/// Buffers are extracted strictly in the order the driver returned them,
/// which is the order the descriptors were supplied; each extraction
/// decodes exactly one buffer against the caller's chosen target.
#[derive(Debug)]
pub struct MultiResult {
    buffers: VecDeque<RowBuffer>,
    config: EngineConfig,
    total: usize,
    taken: usize,
}

impl MultiResult {
    /// Wrap the ordered buffers of one round trip.
    pub fn new(buffers: Vec<RowBuffer>, config: EngineConfig) -> Self {
        let total = buffers.len();
        Self {
            buffers: buffers.into(),
            config,
            total,
            taken: 0,
        }
    }

    /// Result sets not yet extracted.
    pub fn remaining(&self) -> usize {
        self.buffers.len()
    }

    /// Extract the next result set as typed records.
    pub fn next_records<T: FromRow>(&mut self) -> Result<Vec<T>, Error> {
        let buffer = self.take()?;
        Ok(materialize(&buffer, &self.config))
    }

    /// Extract the next result set as open maps.
    pub fn next_maps(&mut self) -> Result<Vec<OpenMap>, Error> {
        let buffer = self.take()?;
        Ok(materialize_maps(&buffer))
    }

    /// Extract the next result set as scalars.
    pub fn next_scalars<T: FromValue>(&mut self) -> Result<Vec<T>, Error> {
        let buffer = self.take()?;
        materialize_scalars(&buffer)
    }

    fn take(&mut self) -> Result<RowBuffer, Error> {
        self.taken += 1;
        self.buffers.pop_front().ok_or(Error::ResultSetExhausted {
            available: self.total,
            requested: self.taken,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rowbind_model::FieldType;

    #[derive(Debug, Default, PartialEq)]
    struct Person {
        id: i64,
        name: String,
        nickname: Option<String>,
    }

    impl FromRow for Person {
        fn from_row(row: &RowView<'_>) -> Self {
            Self {
                id: row.get("id").and_then(Value::as_i64).unwrap_or_default(),
                name: row
                    .get("name")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                nickname: row
                    .get("nickname")
                    .and_then(Value::as_str)
                    .map(str::to_string),
            }
        }
    }

    fn person_buffer() -> RowBuffer {
        RowBuffer::with_rows(
            vec![
                Field::typed("Id", FieldType::Int64),
                Field::typed("Name", FieldType::String),
                Field::typed("Extra", FieldType::String),
            ],
            vec![
                vec![Value::Int64(1), Value::String("alice".into()), Value::Null],
                vec![
                    Value::Int64(2),
                    Value::String("bob".into()),
                    Value::String("ignored".into()),
                ],
            ],
        )
    }

    #[test]
    fn test_typed_records_case_insensitive() {
        let people: Vec<Person> = materialize(&person_buffer(), &EngineConfig::default());
        assert_eq!(people.len(), 2);
        assert_eq!(people[0].id, 1);
        assert_eq!(people[1].name, "bob");
        // "nickname" is not projected: default, not an error.
        assert_eq!(people[0].nickname, None);
    }

    #[test]
    fn test_typed_records_case_sensitive_miss_defaults() {
        let config = EngineConfig::new().with_case_sensitive_fields();
        let people: Vec<Person> = materialize(&person_buffer(), &config);
        // "id" does not match "Id" under the strict policy.
        assert_eq!(people[0].id, 0);
    }

    #[test]
    fn test_open_maps_preserve_projection_order() {
        let maps = materialize_maps(&person_buffer());
        let keys: Vec<&str> = maps[0].keys().collect();
        assert_eq!(keys, vec!["Id", "Name", "Extra"]);
        assert_eq!(maps[1].get("Name"), Some(&Value::String("bob".into())));
    }

    #[test]
    fn test_short_row_reads_null() {
        let buffer = RowBuffer::with_rows(
            vec![Field::new("a"), Field::new("b")],
            vec![vec![Value::Int32(1)]],
        );
        let maps = materialize_maps(&buffer);
        assert_eq!(maps[0].get("b"), Some(&Value::Null));
    }

    #[test]
    fn test_scalars() {
        let buffer = RowBuffer::with_rows(
            vec![Field::new("count")],
            vec![vec![Value::Int64(10)], vec![Value::Int64(20)]],
        );
        let counts: Vec<i64> = materialize_scalars(&buffer).unwrap();
        assert_eq!(counts, vec![10, 20]);
    }

    #[test]
    fn test_scalar_rejects_multi_column_projection() {
        let err = materialize_scalars::<i64>(&person_buffer()).unwrap_err();
        match err {
            Error::ProjectionShape { columns } => assert_eq!(columns, 3),
            other => panic!("expected ProjectionShape, got {other:?}"),
        }
    }

    #[test]
    fn test_scalar_decode_failure_names_row() {
        let buffer = RowBuffer::with_rows(
            vec![Field::new("n")],
            vec![vec![Value::Int64(1)], vec![Value::String("oops".into())]],
        );
        let err = materialize_scalars::<i64>(&buffer).unwrap_err();
        assert!(matches!(err, Error::ScalarDecode { row: 1 }));
    }

    #[test]
    fn test_multi_result_order_and_exhaustion() {
        let first = person_buffer();
        let second = RowBuffer::with_rows(
            vec![Field::new("total")],
            vec![vec![Value::Int64(42)]],
        );
        let mut multi = MultiResult::new(vec![first, second], EngineConfig::default());
        assert_eq!(multi.remaining(), 2);

        let people: Vec<Person> = multi.next_records().unwrap();
        assert_eq!(people.len(), 2);

        let totals: Vec<i64> = multi.next_scalars().unwrap();
        assert_eq!(totals, vec![42]);

        let err = multi.next_maps().unwrap_err();
        assert!(matches!(
            err,
            Error::ResultSetExhausted {
                available: 2,
                requested: 3
            }
        ));
    }
}
