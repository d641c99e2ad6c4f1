//! Error types for fms.
//!
//! This module defines every error the persistence core can raise. Each
//! variant belongs to one [`ErrorKind`], which is what an outer API layer
//! uses to pick a response status.

use std::path::PathBuf;
use thiserror::Error;

use crate::category::Category;

/// The main error type for fms operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Input Errors ===
    /// Malformed input rejected before an entity reaches a repository.
    #[error("invalid {field}: {message}")]
    Validation {
        /// Name of the offending field.
        field: &'static str,
        /// Description of the validation failure.
        message: String,
    },

    // === Repository Errors ===
    /// An entity with the same identifier is already present.
    #[error("{category} '{identifier}' already exists")]
    DuplicateIdentifier {
        /// Category of the repository.
        category: Category,
        /// The conflicting identifier.
        identifier: String,
    },

    /// No entity with this identifier exists.
    #[error("{category} '{identifier}' not found")]
    NotFound {
        /// Category that was searched.
        category: Category,
        /// The missing identifier.
        identifier: String,
    },

    /// The flight has no seat left for another reservation.
    #[error("flight {flight} is full ({capacity} seats)")]
    CapacityExceeded {
        /// Flight number.
        flight: String,
        /// Capacity of the assigned airplane.
        capacity: u32,
    },

    /// The airplane is already assigned to a flight.
    #[error("airplane {registration} is already assigned to a flight")]
    AirplaneUnavailable {
        /// Registration of the airplane.
        registration: String,
    },

    // === Storage Errors ===
    /// A document path does not exist.
    #[error("document not found: {path}")]
    DocumentNotFound {
        /// Path that was read.
        path: PathBuf,
    },

    /// A file could not be created, read, written or deleted.
    #[error("storage I/O failed at {path}: {source}")]
    StorageIo {
        /// Path of the attempted operation.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The category has no on-disk collection.
    #[error("category '{category}' has no storage collection")]
    NoCollection {
        /// The category that was routed.
        category: Category,
    },

    // === Serialization Errors ===
    /// JSON encoding or decoding failed.
    #[error("JSON error for {context}: {source}")]
    Serialization {
        /// What was being encoded or decoded.
        context: String,
        /// The underlying error.
        #[source]
        source: serde_json::Error,
    },

    // === Session Errors ===
    /// Email and password did not match any account.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The operation requires a logged in user.
    #[error("no active session")]
    NotAuthenticated,

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === Generic Errors ===
    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for fms operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Bad input.
    Validation,
    /// Identifier already taken.
    Duplicate,
    /// Entity or document missing.
    NotFound,
    /// Filesystem failure.
    StorageIo,
    /// JSON failure.
    Serialization,
    /// Login required or refused.
    Unauthorized,
    /// Request conflicts with current state.
    Conflict,
    /// Bad configuration.
    Configuration,
    /// Bug.
    Internal,
}

impl ErrorKind {
    /// HTTP status an API layer should answer with.
    #[must_use]
    pub fn status_code(self) -> u16 {
        match self {
            Self::Validation => 400,
            Self::Unauthorized => 401,
            Self::NotFound => 404,
            Self::Duplicate | Self::Conflict => 409,
            Self::StorageIo | Self::Serialization | Self::Configuration | Self::Internal => 500,
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Validation => "validation",
            Self::Duplicate => "duplicate",
            Self::NotFound => "not_found",
            Self::StorageIo => "storage_io",
            Self::Serialization => "serialization",
            Self::Unauthorized => "unauthorized",
            Self::Conflict => "conflict",
            Self::Configuration => "configuration",
            Self::Internal => "internal",
        };
        f.write_str(name)
    }
}

impl Error {
    /// Create a validation error for `field`.
    #[must_use]
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    /// Create a not-found error.
    #[must_use]
    pub fn not_found(category: Category, identifier: impl Into<String>) -> Self {
        Self::NotFound {
            category,
            identifier: identifier.into(),
        }
    }

    /// Create a duplicate identifier error.
    #[must_use]
    pub fn duplicate(category: Category, identifier: impl Into<String>) -> Self {
        Self::DuplicateIdentifier {
            category,
            identifier: identifier.into(),
        }
    }

    /// Create a storage I/O error for `path`.
    #[must_use]
    pub fn storage_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::StorageIo {
            path: path.into(),
            source,
        }
    }

    /// Create a serialization error.
    #[must_use]
    pub fn serialization(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Serialization {
            context: context.into(),
            source,
        }
    }

    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Classify this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } => ErrorKind::Validation,
            Self::DuplicateIdentifier { .. } => ErrorKind::Duplicate,
            Self::NotFound { .. } | Self::DocumentNotFound { .. } => ErrorKind::NotFound,
            Self::CapacityExceeded { .. } | Self::AirplaneUnavailable { .. } => ErrorKind::Conflict,
            Self::StorageIo { .. } | Self::DirectoryCreate { .. } => ErrorKind::StorageIo,
            Self::Serialization { .. } => ErrorKind::Serialization,
            Self::InvalidCredentials | Self::NotAuthenticated => ErrorKind::Unauthorized,
            Self::ConfigLoad(_) | Self::ConfigValidation { .. } => ErrorKind::Configuration,
            Self::NoCollection { .. } | Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Check if this error means something was missing.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    /// Check if this error is an identifier collision.
    #[must_use]
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::DuplicateIdentifier { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::not_found(Category::Airplane, "EI-XYZ");
        assert_eq!(err.to_string(), "airplane 'EI-XYZ' not found");

        let err = Error::duplicate(Category::Flight, "FR123");
        assert_eq!(err.to_string(), "flight 'FR123' already exists");
    }

    #[test]
    fn test_validation_error_display() {
        let err = Error::validation("capacity", "must be greater than 0");
        assert_eq!(err.to_string(), "invalid capacity: must be greater than 0");
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_kind_status_codes() {
        assert_eq!(
            Error::validation("x", "y").kind().status_code(),
            400
        );
        assert_eq!(
            Error::duplicate(Category::Airport, "LPPT").kind().status_code(),
            409
        );
        assert_eq!(
            Error::not_found(Category::Staff, "AB12CD").kind().status_code(),
            404
        );
        assert_eq!(Error::InvalidCredentials.kind().status_code(), 401);
        assert_eq!(Error::internal("boom").kind().status_code(), 500);
    }

    #[test]
    fn test_document_not_found_is_distinct_from_io() {
        let missing = Error::DocumentNotFound {
            path: PathBuf::from("/tmp/fms/airplane/X.json"),
        };
        let io = Error::storage_io(
            "/tmp/fms/airplane/X.json",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(missing.is_not_found());
        assert!(!io.is_not_found());
        assert_eq!(io.kind(), ErrorKind::StorageIo);
    }

    #[test]
    fn test_is_duplicate() {
        assert!(Error::duplicate(Category::Airplane, "EI-ABC").is_duplicate());
        assert!(!Error::not_found(Category::Airplane, "EI-ABC").is_duplicate());
    }

    #[test]
    fn test_storage_io_display_includes_path() {
        let err = Error::storage_io(
            "/root/forbidden/doc.json",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied"),
        );
        let msg = err.to_string();
        assert!(msg.contains("/root/forbidden/doc.json"));
        assert!(msg.contains("access denied"));
    }

    #[test]
    fn test_directory_create_error_display() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = Error::DirectoryCreate {
            path: PathBuf::from("/root/forbidden"),
            source: io_err,
        };
        assert!(err.to_string().contains("/root/forbidden"));
        assert_eq!(err.kind(), ErrorKind::StorageIo);
    }

    #[test]
    fn test_serialization_error() {
        let json_err = serde_json::from_str::<i32>("not valid json").unwrap_err();
        let err = Error::serialization("airplane EI-ABC", json_err);
        assert!(err.to_string().contains("airplane EI-ABC"));
        assert_eq!(err.kind(), ErrorKind::Serialization);
    }

    #[test]
    fn test_conflict_errors() {
        let err = Error::CapacityExceeded {
            flight: "FR100".to_string(),
            capacity: 2,
        };
        assert!(err.to_string().contains("FR100"));
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(err.kind().status_code(), 409);
    }

    #[test]
    fn test_config_validation_error_display() {
        let err = Error::ConfigValidation {
            message: "root is empty".to_string(),
        };
        assert!(err.to_string().contains("root is empty"));
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn test_error_kind_display() {
        assert_eq!(ErrorKind::NotFound.to_string(), "not_found");
        assert_eq!(ErrorKind::StorageIo.to_string(), "storage_io");
    }
}
