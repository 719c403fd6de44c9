//! Rowkey: order-preserving byte encoding for composite primary keys.
//!
//! A table's key columns are encoded into a single byte string whose unsigned
//! lexicographic order matches the row's logical sort order, so sorted storage
//! and scan planning can compare keys with plain `memcmp`. The crate provides:
//! - `KeySchema`: ordered, typed key-column descriptions, plus row-key decode.
//! - `KeyBuilder`: reusable, schema-bound incremental key assembly.
//! - `EncodedKey`: the immutable result, with in-place successor computation
//!   for turning inclusive scan bounds into exclusive ones.
//!
//! Decoded variable-width values live in a caller-owned `bumpalo` arena; the
//! borrow checker ties each decoded key to its arena's lifetime.
//!
//! Quick start
//!
//! ```
//! use bumpalo::Bump;
//! use rowkey::{EncodedKey, KeyBuilder, KeyColumn, KeySchema, KeyType, KeyValue};
//!
//! let schema = KeySchema::new(vec![
//!     KeyColumn::new("host", KeyType::String),
//!     KeyColumn::new("ts", KeyType::Int64),
//! ]);
//!
//! // Build a key column by column.
//! let mut builder = KeyBuilder::new(&schema);
//! builder.add_column_key(KeyValue::String("web-01"));
//! builder.add_column_key(KeyValue::Int64(1_700_000_000));
//! let key = builder.build_encoded_key().unwrap();
//!
//! // Decode it back; string payloads land in the arena.
//! let arena = Bump::new();
//! let decoded = EncodedKey::decode(&schema, &arena, key.as_bytes()).unwrap();
//! assert_eq!(decoded.values(), key.values());
//!
//! // Exclusive upper bound for a scan ending at `key` inclusive.
//! let mut upper = decoded.clone();
//! upper.increment(&schema).unwrap();
//! assert!(upper.as_bytes() > key.as_bytes());
//! ```
pub mod codec;
pub mod error;
pub mod key;
pub mod schema;

// Re-export the working set at the crate root for convenient imports.
pub use error::{KeyError, Result};
pub use key::{BuilderState, EncodedKey, KeyBuilder};
pub use schema::{KeyColumn, KeySchema, KeyType, KeyValue};
