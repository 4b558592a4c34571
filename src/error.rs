use thiserror::Error;

/// Errors raised while building dictionaries, encoding text or persisting state.
#[derive(Debug, Error)]
pub enum EncodingError {
    /// An out-of-vocabulary token was met while unknown tokens are rejected.
    #[error("unknown token: {0:?}")]
    UnknownToken(String),
    /// Matrix data does not fit the declared shape.
    #[error("shape mismatch: expected {expected} elements, found {found}")]
    Shape { expected: usize, found: usize },
    /// A shape had to be inferred from an empty matrix.
    #[error("cannot infer a shape from an empty matrix")]
    EmptyShape,
    /// A sentinel label does not fit the label columns of the output.
    #[error("sentinel label {label} is out of range (at most {limit})")]
    SentinelOutOfRange { label: usize, limit: usize },
    /// The archive was written by an encoder with a different policy.
    #[error("archive holds a {found:?} encoder, expected {expected:?}")]
    PolicyMismatch { expected: String, found: String },
    /// A serialized dictionary lists the same token twice.
    #[error("duplicated token in dictionary: {0:?}")]
    DuplicatedToken(String),
    /// The archive was written by a newer format version.
    #[error("unsupported archive version {0}")]
    UnsupportedVersion(u32),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("bincode error: {0}")]
    Bincode(#[from] bincode::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EncodingError>;
