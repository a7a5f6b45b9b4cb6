use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure of a single booking operation
///
/// Every variant carries a human readable message. The serialized form is
/// externally tagged, e.g. `{"NotFound": "Train with id .. not found"}`.
///
/// A failed operation never leaves partial writes behind: validation always
/// runs before anything is committed.
#[derive(Clone, Debug, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum Error {
    /// A record referenced by key does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// The payload is empty or malformed
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The payload is well-formed but violates a booking rule
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    /// The storage backend failed
    #[error("storage failure: {0}")]
    Storage(String),
}

impl Error {
    /// Name of the variant as it appears on the wire
    pub fn tag(&self) -> &'static str {
        match self {
            Error::NotFound(_) => "NotFound",
            Error::InvalidArgument(_) => "InvalidArgument",
            Error::InvalidPayload(_) => "InvalidPayload",
            Error::Storage(_) => "Storage",
        }
    }

    /// The human readable message
    pub fn message(&self) -> &str {
        match self {
            Error::NotFound(msg)
            | Error::InvalidArgument(msg)
            | Error::InvalidPayload(msg)
            | Error::Storage(msg) => msg,
        }
    }
}

/// Result of a booking operation
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_externally_tagged() {
        let err = Error::NotFound("Train with id t1 not found".into());
        let json = serde_json::to_string(&err).unwrap();
        assert_eq!(json, r#"{"NotFound":"Train with id t1 not found"}"#);
        assert_eq!(err.tag(), "NotFound");
        assert_eq!(err.message(), "Train with id t1 not found");
    }
}
