use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid hex string: {0}")]
    InvalidHex(String),

    #[error("invalid byte length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    /// The all-zero id was supplied where a concrete id is required.
    #[error("id is unset")]
    UnsetId,

    /// One or more fields required by a validation case are absent.
    #[error("missing the following {entity} fields: {}", fields.join(", "))]
    MissingFields {
        entity: &'static str,
        fields: Vec<&'static str>,
    },

    #[error("unrecognized validation case '{case}' for {entity}")]
    UnsupportedCase {
        entity: &'static str,
        case: &'static str,
    },

    #[error("password error: {0}")]
    Password(String),
}
