//! Error types for the todo API client.
//!
//! # Design
//! The server has two caller-facing failures, 404 and 422, each with an
//! `errorMsg`; they get their own variants. Any other non-200 response lands
//! in `HttpError` with the raw status and body.

use thiserror::Error;

/// Errors returned by `TodoClient` build and parse methods.
#[derive(Debug, Error)]
pub enum ApiError {
    /// 404: no todo has the requested id.
    #[error("not found: {0}")]
    NotFound(String),

    /// 422: a required field was missing or empty.
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    #[error("serialization failed: {0}")]
    SerializationError(String),
}
