//! Error type for the CRUD operations.

use crate::transport::TransportError;
use crate::validation::ValidationErrors;

/// Why a CRUD operation failed.
///
/// Validation failures and transport failures are separate variants so callers can bind
/// field errors to a form without inspecting the shape of a transport error.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CrudError {
    /// The server rejected the record with HTTP 422.
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Neither a path override nor a resource name to derive one from was given.
    #[error("No path specified for resource '{resource}'")]
    MissingPath { resource: String },

    #[error("Failed to encode request body: {0}")]
    Encode(String),

    /// A create/update response did not unwrap to a single record.
    #[error("Unexpected response payload: {0}")]
    UnexpectedPayload(String),
}

impl CrudError {
    pub fn validation_errors(&self) -> Option<&ValidationErrors> {
        match self {
            CrudError::Validation(errors) => Some(errors),
            _ => None,
        }
    }

    /// HTTP status of a transport rejection.
    pub fn status(&self) -> Option<u16> {
        match self {
            CrudError::Transport(e) => Some(e.status()),
            _ => None,
        }
    }
}
