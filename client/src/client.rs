//! Stateless HTTP request builder and response parser for the todo API.
//!
//! # Design
//! `TodoClient` holds only a `base_url`. Each operation is split into a
//! `build_*` method that produces an `HttpRequest` and a `parse_*` method
//! that consumes an `HttpResponse`. Every success is a 200; create, update
//! and delete all answer with the id they touched.

use serde::de::DeserializeOwned;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{CreateTodo, ErrorBody, Todo, TodoIdBody, UpdateTodo};

/// Synchronous, stateless client for the todo API.
#[derive(Debug, Clone)]
pub struct TodoClient {
    base_url: String,
}

impl TodoClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn collection_path(&self) -> String {
        format!("{}/todos", self.base_url)
    }

    fn item_path(&self, id: &str) -> String {
        format!("{}/todos/{id}", self.base_url)
    }

    pub fn build_list_todos(&self) -> HttpRequest {
        HttpRequest::bare(HttpMethod::Get, self.collection_path())
    }

    pub fn build_create_todo(&self, input: &CreateTodo) -> Result<HttpRequest, ApiError> {
        HttpRequest::json(HttpMethod::Post, self.collection_path(), input)
    }

    pub fn build_update_todo(&self, id: &str, input: &UpdateTodo) -> Result<HttpRequest, ApiError> {
        HttpRequest::json(HttpMethod::Put, self.item_path(id), input)
    }

    pub fn build_delete_todo(&self, id: &str) -> HttpRequest {
        HttpRequest::bare(HttpMethod::Delete, self.item_path(id))
    }

    pub fn parse_list_todos(&self, response: HttpResponse) -> Result<Vec<Todo>, ApiError> {
        parse_ok(response)
    }

    /// Returns the id of the new todo.
    pub fn parse_create_todo(&self, response: HttpResponse) -> Result<String, ApiError> {
        parse_ok::<TodoIdBody>(response).map(|body| body.id)
    }

    pub fn parse_update_todo(&self, response: HttpResponse) -> Result<String, ApiError> {
        parse_ok::<TodoIdBody>(response).map(|body| body.id)
    }

    pub fn parse_delete_todo(&self, response: HttpResponse) -> Result<String, ApiError> {
        parse_ok::<TodoIdBody>(response).map(|body| body.id)
    }
}

fn parse_ok<T: DeserializeOwned>(response: HttpResponse) -> Result<T, ApiError> {
    check_status(&response)?;
    serde_json::from_str(&response.body).map_err(|e| ApiError::DeserializationError(e.to_string()))
}

/// Map non-200 statuses to the matching `ApiError` variant.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    match response.status {
        200 => Ok(()),
        404 => Err(ApiError::NotFound(error_message(response))),
        422 => Err(ApiError::Validation(error_message(response))),
        status => Err(ApiError::HttpError {
            status,
            body: response.body.clone(),
        }),
    }
}

/// `errorMsg` from the body, or the raw body when it is not an error object.
fn error_message(response: &HttpResponse) -> String {
    serde_json::from_str::<ErrorBody>(&response.body)
        .map(|body| body.error_msg)
        .unwrap_or_else(|_| response.body.clone())
}
