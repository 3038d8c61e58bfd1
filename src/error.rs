// ⚠️ Error Types
// Every failure the registry, codec and storage layer can report

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the library. Surfaces (console, terminal form, CLI)
/// catch these, report them and keep going.
#[derive(Debug, Error)]
pub enum GymError {
    #[error("Invalid {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("A member with ID {0} already exists")]
    DuplicateId(String),

    #[error("Member with ID {0} not found")]
    NotFound(String),

    #[error("Could not read {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not write {path}: {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Line {line}: {reason}")]
    MalformedRow { line: u64, reason: String },
}

impl GymError {
    pub fn invalid(field: &str, reason: impl Into<String>) -> Self {
        GymError::InvalidInput {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T, E = GymError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = GymError::invalid("month", "must be between 1 and 12");
        assert_eq!(err.to_string(), "Invalid month: must be between 1 and 12");

        let err = GymError::MalformedRow {
            line: 3,
            reason: "expected 5 fields, found 2".to_string(),
        };
        assert_eq!(err.to_string(), "Line 3: expected 5 fields, found 2");

        assert_eq!(
            GymError::DuplicateId("M001".to_string()).to_string(),
            "A member with ID M001 already exists"
        );
    }
}
