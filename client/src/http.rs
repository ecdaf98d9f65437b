//! HTTP transport types for the host-does-IO pattern.
//!
//! Requests and responses are plain data with owned fields; the caller moves
//! the bytes.

use serde::Serialize;

use crate::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

/// An HTTP request described as plain data.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    /// A request with no body and no headers.
    pub fn bare(method: HttpMethod, path: String) -> Self {
        Self {
            method,
            path,
            headers: Vec::new(),
            body: None,
        }
    }

    /// A request carrying `payload` as a JSON body.
    pub fn json<T: Serialize>(
        method: HttpMethod,
        path: String,
        payload: &T,
    ) -> Result<Self, ApiError> {
        let body =
            serde_json::to_string(payload).map_err(|e| ApiError::SerializationError(e.to_string()))?;
        Ok(Self {
            method,
            path,
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: Some(body),
        })
    }
}

/// An HTTP response described as plain data, filled in by the caller.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}
