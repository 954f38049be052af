use thiserror::Error;

// ── Error codes ─────────────────────────────────────────────────────
//
// Stable identifiers handed to whatever transport sits in front of the
// core. Callers match on these, never on the message text.

/// Stable error code constants.
pub mod error_code {
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const ALREADY_EXISTS: &str = "ALREADY_EXISTS";
    pub const VALIDATION_FAILED: &str = "VALIDATION_FAILED";
    pub const PERMISSION_DENIED: &str = "PERMISSION_DENIED";
    pub const INTERNAL: &str = "INTERNAL";
    pub const STORAGE_ERROR: &str = "STORAGE_ERROR";
}

// ── ServiceError ────────────────────────────────────────────────────

/// Unified error type for every OpenCourse service.
///
/// Each variant maps to a stable error code (see [`error_code`]) and an
/// HTTP-equivalent status so a controller can translate it without the
/// core depending on a web framework.
///
/// Declined-but-harmless outcomes (a repeated like, a delete by someone
/// without rights) are not errors; operations report them as `false`.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Entity does not exist. 404.
    #[error("{0}")]
    NotFound(String),

    /// Uniqueness violation on create. 409.
    #[error("{0}")]
    Conflict(String),

    /// Input data is invalid. 400.
    #[error("{0}")]
    Validation(String),

    /// Caller is not allowed to touch this entity. 403.
    #[error("{0}")]
    PermissionDenied(String),

    /// Storage backend failure or corrupt row. 500.
    #[error("{0}")]
    Storage(String),

    /// Unexpected internal error. 500.
    #[error("{0}")]
    Internal(String),
}

impl ServiceError {
    /// Stable, machine-readable error code.
    pub fn error_code(&self) -> &'static str {
        match self {
            ServiceError::NotFound(_) => error_code::NOT_FOUND,
            ServiceError::Conflict(_) => error_code::ALREADY_EXISTS,
            ServiceError::Validation(_) => error_code::VALIDATION_FAILED,
            ServiceError::PermissionDenied(_) => error_code::PERMISSION_DENIED,
            ServiceError::Storage(_) => error_code::STORAGE_ERROR,
            ServiceError::Internal(_) => error_code::INTERNAL,
        }
    }

    /// HTTP-equivalent status for this error.
    pub fn http_status(&self) -> u16 {
        match self {
            ServiceError::NotFound(_) => 404,
            ServiceError::Conflict(_) => 409,
            ServiceError::Validation(_) => 400,
            ServiceError::PermissionDenied(_) => 403,
            ServiceError::Storage(_) | ServiceError::Internal(_) => 500,
        }
    }

    /// Whether the error came from the storage layer rather than the caller.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ServiceError::Storage(_) | ServiceError::Internal(_))
    }
}
