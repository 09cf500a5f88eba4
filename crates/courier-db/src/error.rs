use std::time::Duration;

use courier_store::StoreError;
use courier_types::TypeError;
use thiserror::Error;

/// Errors surfaced by the persistence core and the entity services.
#[derive(Debug, Error)]
pub enum DbError {
    /// Required fields for the requested operation class are missing.
    #[error("{0}")]
    Validation(String),

    /// No live document matched.
    #[error("no {collection} document matched")]
    NotFound { collection: String },

    /// The entity collides with a stored document.
    #[error("{collection} document already exists")]
    Duplicate { collection: String },

    /// A referenced entity does not exist.
    #[error("{0}")]
    Dependency(String),

    /// An id or document could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("operation timed out after {0:?}")]
    Timeout(Duration),

    #[error("store error: {0}")]
    Store(StoreError),

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl DbError {
    pub fn not_found(collection: impl Into<String>) -> Self {
        Self::NotFound {
            collection: collection.into(),
        }
    }

    pub fn duplicate(collection: impl Into<String>) -> Self {
        Self::Duplicate {
            collection: collection.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<TypeError> for DbError {
    fn from(e: TypeError) -> Self {
        match e {
            TypeError::MissingFields { .. } | TypeError::UnsupportedCase { .. } => {
                Self::Validation(e.to_string())
            }
            TypeError::Password(msg) => Self::Auth(msg),
            TypeError::InvalidHex(_) | TypeError::InvalidLength { .. } | TypeError::UnsetId => {
                Self::Serialization(e.to_string())
            }
        }
    }
}

impl From<StoreError> for DbError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::DuplicateKey { collection, .. } => Self::Duplicate { collection },
            StoreError::DeadlineExceeded(budget) => Self::Timeout(budget),
            StoreError::Serialization(msg) => Self::Serialization(msg),
            other => Self::Store(other),
        }
    }
}

impl From<serde_json::Error> for DbError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

/// Result alias for persistence operations.
pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_errors_map_by_kind() {
        let missing = TypeError::MissingFields {
            entity: "group",
            fields: vec!["name"],
        };
        assert!(matches!(DbError::from(missing), DbError::Validation(m) if m.contains("name")));
        assert!(matches!(DbError::from(TypeError::UnsetId), DbError::Serialization(_)));
        assert!(matches!(
            DbError::from(TypeError::Password("bad".into())),
            DbError::Auth(_)
        ));
    }

    #[test]
    fn store_errors_map_by_kind() {
        let dup = StoreError::DuplicateKey {
            collection: "users".into(),
            id: "x".into(),
        };
        assert!(matches!(DbError::from(dup), DbError::Duplicate { collection } if collection == "users"));
        let late = StoreError::DeadlineExceeded(Duration::from_secs(1));
        assert!(matches!(DbError::from(late), DbError::Timeout(_)));
        let backend = StoreError::Backend("down".into());
        assert!(matches!(DbError::from(backend), DbError::Store(_)));
    }

    #[test]
    fn display_names_the_collection() {
        assert_eq!(DbError::not_found("messages").to_string(), "no messages document matched");
        assert_eq!(DbError::duplicate("groups").to_string(), "groups document already exists");
    }
}
