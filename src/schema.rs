use std::fmt;

use bumpalo::Bump;
use uuid::Uuid;

use crate::codec;
use crate::error::{KeyError, Result};

/// Type tag for a key column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyType {
    Bool,
    Int32,
    Int64,
    UInt64,
    Float64,
    Uuid,
    String,
    Binary,
}

impl KeyType {
    /// Encoded width used to pre-size buffers and compute `KeySchema::key_byte_size`.
    ///
    /// Exact for fixed-width types; a nominal slot for variable-width ones, which
    /// may encode longer.
    pub(crate) fn encoded_size_hint(self) -> usize {
        match self {
            KeyType::Bool => 1,
            KeyType::Int32 => 4,
            KeyType::Int64 | KeyType::UInt64 | KeyType::Float64 => 8,
            KeyType::Uuid => 16,
            KeyType::String | KeyType::Binary => 16,
        }
    }
}

/// A single typed key-column value.
///
/// Scalar variants are held by value. `String` and `Binary` borrow storage owned
/// by someone else: the caller's memory on the build path, or a decode arena on
/// the decode path. A `KeyValue` never borrows from the encoded key bytes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KeyValue<'a> {
    Bool(bool),
    Int32(i32),
    Int64(i64),
    UInt64(u64),
    Float64(f64),
    Uuid(Uuid),
    String(&'a str),
    Binary(&'a [u8]),
}

impl KeyValue<'_> {
    /// The type tag this value encodes as.
    pub fn kind(&self) -> KeyType {
        match self {
            KeyValue::Bool(_) => KeyType::Bool,
            KeyValue::Int32(_) => KeyType::Int32,
            KeyValue::Int64(_) => KeyType::Int64,
            KeyValue::UInt64(_) => KeyType::UInt64,
            KeyValue::Float64(_) => KeyType::Float64,
            KeyValue::Uuid(_) => KeyType::Uuid,
            KeyValue::String(_) => KeyType::String,
            KeyValue::Binary(_) => KeyType::Binary,
        }
    }
}

impl fmt::Display for KeyValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyValue::Bool(b) => write!(f, "{b}"),
            KeyValue::Int32(n) => write!(f, "{n}"),
            KeyValue::Int64(n) => write!(f, "{n}"),
            KeyValue::UInt64(n) => write!(f, "{n}"),
            KeyValue::Float64(x) => write!(f, "{x}"),
            KeyValue::Uuid(u) => write!(f, "{u}"),
            KeyValue::String(s) => write!(f, "{s}"),
            KeyValue::Binary(b) => write!(f, "{}", hex::encode(b)),
        }
    }
}

/// Descriptor for one key column: name, type, nullability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyColumn {
    name: String,
    ty: KeyType,
    nullable: bool,
}

impl KeyColumn {
    /// A non-nullable column. Key columns are never null; this is the normal
    /// constructor.
    pub fn new(name: impl Into<String>, ty: KeyType) -> Self {
        Self {
            name: name.into(),
            ty,
            nullable: false,
        }
    }

    /// A nullable column descriptor. Placing one in a key schema is legal, but
    /// the builder rejects it at `add_column_key` time.
    pub fn nullable(name: impl Into<String>, ty: KeyType) -> Self {
        Self {
            name: name.into(),
            ty,
            nullable: true,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ty(&self) -> KeyType {
        self.ty
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    /// Debug rendering of a value under this column's type formatter.
    pub fn stringify(&self, value: &KeyValue<'_>) -> String {
        value.to_string()
    }
}

/// Ordered description of a table's key columns.
///
/// This is the single authority for how many columns a key has, what type each
/// one is, and how an encoded key decodes back into values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySchema {
    columns: Vec<KeyColumn>,
}

impl KeySchema {
    /// Build a schema from ordered key columns.
    ///
    /// # Panics
    /// Panics when `columns` is empty; a key needs at least one column.
    pub fn new(columns: Vec<KeyColumn>) -> Self {
        assert!(!columns.is_empty(), "a key schema needs at least one column");
        Self { columns }
    }

    pub fn num_key_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn column(&self, idx: usize) -> &KeyColumn {
        &self.columns[idx]
    }

    pub fn columns(&self) -> &[KeyColumn] {
        &self.columns
    }

    /// Byte budget for an encoded key under this schema.
    ///
    /// Sized from per-type width hints; used to pre-size builder buffers and as
    /// the length at which successor computation switches from appending to
    /// carrying (see `codec::advance_to_successor`).
    pub fn key_byte_size(&self) -> usize {
        self.columns
            .iter()
            .map(|c| c.ty().encoded_size_hint())
            .sum()
    }

    /// Whether two schemas agree on column count, types, and order.
    ///
    /// Column names are irrelevant here; this is the compatibility notion used
    /// when copying state between builders.
    pub fn same_structure(&self, other: &KeySchema) -> bool {
        self.columns.len() == other.columns.len()
            && self
                .columns
                .iter()
                .zip(other.columns.iter())
                .all(|(a, b)| a.ty() == b.ty())
    }

    /// Decode every key column of `encoded`, hosting variable-width payloads in
    /// `arena`.
    ///
    /// Fails with `KeyError::Decode` on malformed or truncated input, including
    /// trailing bytes after the last column, and with `KeyError::OutOfMemory`
    /// when the arena cannot supply storage.
    pub fn decode_row_key<'a>(&self, encoded: &[u8], arena: &'a Bump) -> Result<Vec<KeyValue<'a>>> {
        let mut values = Vec::with_capacity(self.columns.len());
        let mut rest = encoded;
        for (idx, col) in self.columns.iter().enumerate() {
            let is_last = idx + 1 == self.columns.len();
            let (value, used) =
                codec::decode_value(col.ty(), rest, is_last, arena).map_err(|e| match e {
                    KeyError::Decode(msg) => {
                        KeyError::Decode(format!("key column `{}`: {msg}", col.name()))
                    }
                    other => other,
                })?;
            rest = &rest[used..];
            values.push(value);
        }
        if !rest.is_empty() {
            return Err(KeyError::Decode(format!(
                "{} trailing bytes after the last key column",
                rest.len()
            )));
        }
        Ok(values)
    }
}
