use std::cmp::Ordering;

use bumpalo::Bump;
use bytes::{Bytes, BytesMut};

use crate::codec;
use crate::error::{KeyError, Result};
use crate::schema::{KeySchema, KeyValue};

/// An immutable, fully-built composite key.
///
/// Owns its encoded bytes; ordering and equality are by unsigned lexicographic
/// byte comparison, which by construction matches the column-wise logical order
/// of the values. Safe to share across threads once built.
///
/// `values()` may be shorter than `num_key_columns()` when the key is a
/// deliberate prefix built for a range bound. The `'a` lifetime ties the key to
/// whatever owns the variable-width column payloads: the decode arena, or the
/// caller's storage on the build path.
#[derive(Debug, Clone)]
pub struct EncodedKey<'a> {
    bytes: Bytes,
    values: Vec<KeyValue<'a>>,
    num_key_columns: usize,
}

impl<'a> EncodedKey<'a> {
    pub(crate) fn from_parts(
        bytes: Bytes,
        values: Vec<KeyValue<'a>>,
        num_key_columns: usize,
    ) -> Self {
        debug_assert!(values.len() <= num_key_columns);
        Self {
            bytes,
            values,
            num_key_columns,
        }
    }

    /// Decode a previously-encoded key under the same schema.
    ///
    /// Every key column is populated; variable-width payloads are hosted in
    /// `arena` and the returned key borrows from it. `encoded` is copied into a
    /// fresh owned buffer, so the caller's storage is not held onto.
    pub fn decode(schema: &KeySchema, arena: &'a Bump, encoded: &[u8]) -> Result<Self> {
        let values = schema.decode_row_key(encoded, arena)?;
        Ok(Self {
            bytes: Bytes::copy_from_slice(encoded),
            values,
            num_key_columns: schema.num_key_columns(),
        })
    }

    /// Raw encoded bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Cheap shared handle to the encoded bytes.
    pub fn encoded(&self) -> Bytes {
        self.bytes.clone()
    }

    /// The column values this key was built from or decoded into, in schema
    /// order. May be a prefix of the full key.
    pub fn values(&self) -> &[KeyValue<'a>] {
        &self.values
    }

    /// The schema's total key-column count, which can exceed `values().len()`
    /// for prefix keys.
    pub fn num_key_columns(&self) -> usize {
        self.num_key_columns
    }

    /// Lowercase hex rendering of the encoded bytes, for diagnostics.
    pub fn to_hex_string(&self) -> String {
        hex::encode(&self.bytes)
    }

    /// Replace this key with its immediate lexicographic successor.
    ///
    /// Turns an inclusive bound into the minimal exclusive one for a half-open
    /// scan range. Fails with [`KeyError::NoSuccessor`], leaving the key
    /// unmodified, when the key is already the maximum representable value.
    ///
    /// # Panics
    /// Panics when the key is a prefix rather than a complete key for `schema`;
    /// incrementing a partial key is a caller bug.
    pub fn increment(&mut self, schema: &KeySchema) -> Result<()> {
        assert_eq!(
            self.num_key_columns,
            schema.num_key_columns(),
            "key and schema disagree on key-column count"
        );
        assert_eq!(
            self.values.len(),
            self.num_key_columns,
            "cannot increment a prefix key"
        );

        let mut builder = KeyBuilder::new(schema);
        for value in &self.values {
            builder.add_column_key(*value);
        }
        match builder.build_successor_encoded_key() {
            Some(successor) => {
                *self = successor;
                Ok(())
            }
            None => Err(KeyError::NoSuccessor),
        }
    }

    /// Debug rendering of the key's values.
    ///
    /// A single-column key renders bare; multi-column keys render as a
    /// parenthesized tuple with `*` for trailing columns a prefix key leaves
    /// unconstrained.
    pub fn stringify(&self, schema: &KeySchema) -> String {
        if self.num_key_columns == 1 {
            return schema.column(0).stringify(&self.values[0]);
        }
        let mut out = String::from("(");
        for idx in 0..self.num_key_columns {
            if idx > 0 {
                out.push(',');
            }
            match self.values.get(idx) {
                Some(value) => out.push_str(&schema.column(idx).stringify(value)),
                None => out.push('*'),
            }
        }
        out.push(')');
        out
    }

    /// Debug rendering of a scan range bounded by `lower` and/or `upper`.
    ///
    /// Both bounds absent is caller misuse: it trips a debug assertion and, in
    /// release builds, yields a fixed `"invalid key range"` placeholder that
    /// callers must not treat as meaningful output.
    pub fn range_to_string(lower: Option<&EncodedKey<'_>>, upper: Option<&EncodedKey<'_>>) -> String {
        match (lower, upper) {
            (Some(l), Some(u)) => {
                format!(
                    "encoded key BETWEEN {} AND {}",
                    l.to_hex_string(),
                    u.to_hex_string()
                )
            }
            (Some(l), None) => format!("encoded key >= {}", l.to_hex_string()),
            (None, Some(u)) => format!("encoded key <= {}", u.to_hex_string()),
            (None, None) => {
                tracing::error!("key range rendered with neither bound set");
                debug_assert!(false, "key range rendered with neither bound set");
                "invalid key range".to_string()
            }
        }
    }
}

impl PartialEq for EncodedKey<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.bytes == other.bytes
    }
}

impl Eq for EncodedKey<'_> {}

impl PartialOrd for EncodedKey<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for EncodedKey<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.bytes.cmp(&other.bytes)
    }
}

/// Where a builder stands in assembling one key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuilderState {
    /// No columns added yet.
    Empty,
    /// Some, but not all, key columns added.
    Accumulating,
    /// Every key column added; ready to finalize.
    Complete,
}

/// Incremental, schema-bound assembler for [`EncodedKey`]s.
///
/// Feed column values in schema order with [`add_column_key`], then finalize
/// with [`build_encoded_key`] or [`build_successor_encoded_key`]. Reusable
/// across many keys; [`reset`] clears accumulated state while keeping buffer
/// capacity. Not for concurrent use without external locking.
///
/// [`add_column_key`]: KeyBuilder::add_column_key
/// [`build_encoded_key`]: KeyBuilder::build_encoded_key
/// [`build_successor_encoded_key`]: KeyBuilder::build_successor_encoded_key
/// [`reset`]: KeyBuilder::reset
#[derive(Debug)]
pub struct KeyBuilder<'s, 'a> {
    schema: &'s KeySchema,
    buf: BytesMut,
    values: Vec<KeyValue<'a>>,
}

impl<'s, 'a> KeyBuilder<'s, 'a> {
    /// Bind a builder to `schema`, pre-sizing the buffer to the schema's key
    /// byte budget.
    pub fn new(schema: &'s KeySchema) -> Self {
        Self {
            schema,
            buf: BytesMut::with_capacity(schema.key_byte_size()),
            values: Vec::with_capacity(schema.num_key_columns()),
        }
    }

    pub fn schema(&self) -> &'s KeySchema {
        self.schema
    }

    pub fn state(&self) -> BuilderState {
        if self.values.is_empty() {
            BuilderState::Empty
        } else if self.values.len() < self.schema.num_key_columns() {
            BuilderState::Accumulating
        } else {
            BuilderState::Complete
        }
    }

    /// Append the encoding of `value` for the next schema column.
    ///
    /// # Panics
    /// Panics when all key columns have already been added, when the column is
    /// nullable, or when `value`'s type does not match the column. All three
    /// are caller bugs, not recoverable conditions.
    pub fn add_column_key(&mut self, value: KeyValue<'a>) {
        let idx = self.values.len();
        assert!(
            idx < self.schema.num_key_columns(),
            "all {} key columns have already been added",
            self.schema.num_key_columns()
        );
        let col = self.schema.column(idx);
        assert!(
            !col.is_nullable(),
            "key column `{}` must not be nullable",
            col.name()
        );
        assert_eq!(
            value.kind(),
            col.ty(),
            "key column `{}` expects {:?}",
            col.name(),
            col.ty()
        );

        let is_last = idx + 1 == self.schema.num_key_columns();
        codec::encode_value(&value, is_last, &mut self.buf);
        self.values.push(value);
    }

    /// Finalize the accumulated columns into an [`EncodedKey`].
    ///
    /// Returns `None` when no columns were added; an empty key is not
    /// meaningful. Otherwise the buffer and value list move into the new key
    /// and the builder returns to `Empty`, ready for the next key.
    pub fn build_encoded_key(&mut self) -> Option<EncodedKey<'a>> {
        if self.values.is_empty() {
            return None;
        }
        let bytes = self.buf.split().freeze();
        let values = std::mem::take(&mut self.values);
        Some(EncodedKey::from_parts(
            bytes,
            values,
            self.schema.num_key_columns(),
        ))
    }

    /// Advance the accumulated buffer to its immediate successor, then
    /// finalize.
    ///
    /// Returns `None` without finalizing when the buffer is already the maximum
    /// representable value; the builder's state is left intact in that case.
    pub fn build_successor_encoded_key(&mut self) -> Option<EncodedKey<'a>> {
        if self.values.is_empty() {
            return None;
        }
        if !codec::advance_to_successor(&mut self.buf, self.schema.key_byte_size()) {
            return None;
        }
        self.build_encoded_key()
    }

    /// Deep-copy another builder's in-progress state into this one.
    ///
    /// The two builders must be bound to structurally identical schemas (same
    /// column count, types, and order); a mismatch is a caller bug and trips a
    /// debug assertion. Useful for snapshotting a "last key seen" without
    /// re-deriving it.
    pub fn assign_copy(&mut self, other: &KeyBuilder<'_, 'a>) {
        debug_assert!(
            self.schema.same_structure(other.schema),
            "builders must be bound to structurally identical schemas"
        );
        self.buf.clear();
        self.buf.extend_from_slice(&other.buf);
        self.values.clear();
        self.values.extend_from_slice(&other.values);
    }

    /// Return to `Empty`: cursor and values cleared, buffer contents cleared
    /// with capacity retained, so repeated build/reset cycles amortize
    /// allocation.
    pub fn reset(&mut self) {
        self.buf.clear();
        self.values.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{KeyColumn, KeyType};

    fn two_col_schema() -> KeySchema {
        KeySchema::new(vec![
            KeyColumn::new("a", KeyType::Int32),
            KeyColumn::new("b", KeyType::String),
        ])
    }

    #[test]
    fn should_walk_state_machine_while_accumulating() {
        // Arrange
        let schema = two_col_schema();
        let mut builder = KeyBuilder::new(&schema);

        // Act/Assert
        assert_eq!(builder.state(), BuilderState::Empty);
        builder.add_column_key(KeyValue::Int32(5));
        assert_eq!(builder.state(), BuilderState::Accumulating);
        builder.add_column_key(KeyValue::String("x"));
        assert_eq!(builder.state(), BuilderState::Complete);
        builder.reset();
        assert_eq!(builder.state(), BuilderState::Empty);
    }

    #[test]
    fn should_return_none_when_building_from_empty() {
        let schema = two_col_schema();
        let mut builder = KeyBuilder::new(&schema);
        assert!(builder.build_encoded_key().is_none());
        assert!(builder.build_successor_encoded_key().is_none());
    }

    #[test]
    fn should_leave_builder_empty_after_finalize() {
        // Arrange
        let schema = two_col_schema();
        let mut builder = KeyBuilder::new(&schema);
        builder.add_column_key(KeyValue::Int32(5));
        builder.add_column_key(KeyValue::String("x"));

        // Act
        let key = builder.build_encoded_key();

        // Assert
        assert!(key.is_some());
        assert_eq!(builder.state(), BuilderState::Empty);
    }

    #[test]
    fn should_copy_in_progress_state_with_assign_copy() {
        // Arrange
        let schema = two_col_schema();
        let mut original = KeyBuilder::new(&schema);
        original.add_column_key(KeyValue::Int32(7));
        let mut snapshot = KeyBuilder::new(&schema);

        // Act
        snapshot.assign_copy(&original);
        snapshot.add_column_key(KeyValue::String("snap"));
        original.add_column_key(KeyValue::String("orig"));

        // Assert: both finalize independently from the shared prefix
        let snap_key = snapshot.build_encoded_key().unwrap();
        let orig_key = original.build_encoded_key().unwrap();
        assert_ne!(snap_key.as_bytes(), orig_key.as_bytes());
        assert_eq!(snap_key.as_bytes()[..4], orig_key.as_bytes()[..4]);
    }

    #[test]
    #[should_panic]
    fn should_panic_when_overfilling_builder() {
        let schema = KeySchema::new(vec![KeyColumn::new("a", KeyType::Int32)]);
        let mut builder = KeyBuilder::new(&schema);
        builder.add_column_key(KeyValue::Int32(1));
        builder.add_column_key(KeyValue::Int32(2));
    }

    #[test]
    #[should_panic]
    fn should_panic_on_column_type_mismatch() {
        let schema = two_col_schema();
        let mut builder = KeyBuilder::new(&schema);
        builder.add_column_key(KeyValue::Int64(5));
    }

    #[test]
    #[should_panic]
    fn should_panic_when_key_column_is_nullable() {
        let schema = KeySchema::new(vec![KeyColumn::nullable("a", KeyType::Int32)]);
        let mut builder = KeyBuilder::new(&schema);
        builder.add_column_key(KeyValue::Int32(1));
    }
}
