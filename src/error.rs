use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, KeyError>;

/// Recoverable failures of the row-key core.
///
/// Caller misuse (over-filling a builder, supplying a value of the wrong type,
/// incrementing a prefix key) is not represented here; those are contract
/// violations and panic instead.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyError {
    /// The arena could not supply storage for decoded column values.
    #[error("arena allocation failed while decoding a row key")]
    OutOfMemory,

    /// The encoded input was malformed or did not match the schema.
    #[error("malformed encoded key: {0}")]
    Decode(String),

    /// The key is already the maximum representable value for its schema.
    ///
    /// Expected at the top of the key space; callers should treat it as "no
    /// exclusive upper bound narrower than unbounded exists".
    #[error("no lexicographically greater key exists")]
    NoSuccessor,
}
