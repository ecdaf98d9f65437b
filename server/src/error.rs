//! Failures the todo handler reports to HTTP callers.
//!
//! # Design
//! Two failures are the caller's fault in the todo sense: a missing or empty
//! input (`Validation`, 422) and an unknown id (`NotFound`, 404). A body that
//! cannot be read at all keeps the status axum assigned it (`Rejected`, e.g.
//! 413). Everything else comes out of the store and is answered with a
//! generic 500; the cause is logged, never echoed. Every body has the shape
//! `{"errorMsg": "..."}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::store::StoreError;

pub const MISSING_TITLE: &str = "Missing parameter 'title'";
pub const NOTHING_TO_UPDATE: &str = "Must have at least one parameter updated";
pub const TODO_NOT_FOUND: &str = "No todo task found for this id";
pub const INTERNAL_ERROR: &str = "Internal server error";

#[derive(Debug, Error)]
pub enum TodoError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    /// The request body could not be read at all, e.g. it is over the size limit.
    #[error("{message}")]
    Rejected { status: StatusCode, message: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl TodoError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound(TODO_NOT_FOUND.to_string())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Rejected { status, .. } => *status,
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// JSON body of every failed request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub error_msg: String,
}

impl IntoResponse for TodoError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error_msg = match self {
            Self::Store(error) => {
                tracing::error!(%error, "todo store failure");
                INTERNAL_ERROR.to_string()
            }
            Self::Validation(message)
            | Self::NotFound(message)
            | Self::Rejected { message, .. } => message,
        };
        (status, Json(ErrorBody { error_msg })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_of(error: TodoError) -> (StatusCode, ErrorBody) {
        let response = error.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn validation_is_422_with_message() {
        let (status, body) = body_of(TodoError::validation(MISSING_TITLE)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body.error_msg, MISSING_TITLE);
    }

    #[tokio::test]
    async fn not_found_is_404() {
        let (status, body) = body_of(TodoError::not_found()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.error_msg, TODO_NOT_FOUND);
    }

    #[tokio::test]
    async fn store_failures_hide_their_cause() {
        let error = TodoError::from(StoreError::InvalidId("zzz".to_string()));
        let (status, body) = body_of(error).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error_msg, INTERNAL_ERROR);
    }

    #[tokio::test]
    async fn rejected_keeps_its_status() {
        let error = TodoError::Rejected {
            status: StatusCode::PAYLOAD_TOO_LARGE,
            message: "Failed to buffer the request body".to_string(),
        };
        let (status, body) = body_of(error).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body.error_msg, "Failed to buffer the request body");
    }

    #[test]
    fn error_body_uses_camel_case() {
        let json = serde_json::to_value(ErrorBody {
            error_msg: "boom".to_string(),
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({ "errorMsg": "boom" }));
    }
}
