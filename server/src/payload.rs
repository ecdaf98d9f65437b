//! Request-body fields for create and update.
//!
//! # Design
//! Bodies arrive either as JSON or as `application/x-www-form-urlencoded`;
//! both are normalised to a JSON object before the field rules run. A field
//! counts as supplied unless it is absent, `null` or the empty string. For
//! `completed` that means `false` is a supplied value, not a missing one.

use std::collections::HashMap;

use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
    http::{header::CONTENT_TYPE, StatusCode},
    Form,
};
use serde_json::{Map, Value};

use crate::error::TodoError;

/// The `title` and `completed` fields of a request body, each `None` when not
/// supplied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoFields {
    pub title: Option<String>,
    pub completed: Option<bool>,
}

impl TodoFields {
    pub fn from_object(fields: &Map<String, Value>) -> Result<Self, TodoError> {
        Ok(Self {
            title: title_field(fields.get("title"))?,
            completed: completed_field(fields.get("completed"))?,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.completed.is_none()
    }
}

fn title_field(value: Option<&Value>) -> Result<Option<String>, TodoError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(title)) if title.is_empty() => Ok(None),
        Some(Value::String(title)) => Ok(Some(title.clone())),
        Some(_) => Err(TodoError::validation("'title' must be a string")),
    }
}

fn completed_field(value: Option<&Value>) -> Result<Option<bool>, TodoError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(completed)) => Ok(Some(*completed)),
        // form bodies carry everything as text
        Some(Value::String(raw)) => match raw.as_str() {
            "" => Ok(None),
            "true" | "1" => Ok(Some(true)),
            "false" | "0" => Ok(Some(false)),
            _ => Err(TodoError::validation("'completed' must be a boolean")),
        },
        Some(_) => Err(TodoError::validation("'completed' must be a boolean")),
    }
}

/// Undecodable bodies are a validation failure; anything else (an oversized
/// or unreadable body) keeps the status axum gave it.
fn body_rejection(status: StatusCode, message: String) -> TodoError {
    if status == StatusCode::UNPROCESSABLE_ENTITY {
        TodoError::Validation(message)
    } else {
        TodoError::Rejected { status, message }
    }
}

fn is_form(req: &Request) -> bool {
    req.headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/x-www-form-urlencoded"))
}

impl<S> FromRequest<S> for TodoFields
where
    S: Send + Sync,
{
    type Rejection = TodoError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if is_form(&req) {
            let Form(fields) = Form::<HashMap<String, String>>::from_request(req, state)
                .await
                .map_err(|rejection| body_rejection(rejection.status(), rejection.body_text()))?;
            let fields: Map<String, Value> = fields
                .into_iter()
                .map(|(key, value)| (key, Value::String(value)))
                .collect();
            return Self::from_object(&fields);
        }

        let body = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| TodoError::Rejected {
                status: rejection.status(),
                message: rejection.body_text(),
            })?;
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }

        match serde_json::from_slice::<Value>(&body) {
            Ok(Value::Object(fields)) => Self::from_object(&fields),
            Ok(_) => Err(TodoError::validation("Request body must be a JSON object")),
            Err(error) => Err(TodoError::validation(format!("Invalid JSON body: {error}"))),
        }
    }
}
