//! Error types for field access, variant dispatch and lifecycle operations.

use crate::mgmt::ApiError;
use thiserror::Error;

/// Errors that abort a synchronization operation.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The management API call failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// No expand/flatten pair is registered for the discriminant.
    #[error("unsupported {family} variant: {discriminant:?}")]
    UnsupportedVariant {
        family: &'static str,
        discriminant: String,
    },

    /// A declared value did not have the type the field requires.
    #[error("field {field:?}: expected {expected}, found {found}")]
    TypeMismatch {
        field: String,
        expected: &'static str,
        found: &'static str,
    },

    /// A declared value has the right type but is not acceptable.
    #[error("field {field:?}: {reason}")]
    InvalidValue { field: String, reason: String },

    /// A field required for this operation is not declared.
    #[error("missing required field {0:?}")]
    MissingField(String),

    /// The change cannot be applied in place.
    #[error("changing {field:?} requires replacing the resource")]
    ReplacementRequired { field: String },

    /// Payload encoding or response decoding failed.
    #[error("encoding error: {0}")]
    Encode(#[from] serde_json::Error),
}

impl SyncError {
    /// Whether the error is a local invariant violation (nothing was sent).
    pub fn is_local(&self) -> bool {
        !matches!(self, SyncError::Api(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, SyncError::Api(err) if err.is_not_found())
    }
}

/// Convenience Result type for synchronization operations.
pub type Result<T> = std::result::Result<T, SyncError>;
