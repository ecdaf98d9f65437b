//! Synchronous client core for the `/todos` API.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network (host-does-IO pattern). The caller executes the
//! actual HTTP round-trip.
//!
//! # Design
//! - `TodoClient` is stateless; it holds only `base_url`.
//! - Each operation is split into `build_*` (produces request) and `parse_*`
//!   (consumes response).
//! - Failures the server reports as `{"errorMsg": ...}` come back as typed
//!   `ApiError` variants carrying that message.
//! - DTOs are defined independently from the server crate; the end-to-end
//!   test catches schema drift.

pub mod client;
pub mod error;
pub mod http;
pub mod types;

pub use client::TodoClient;
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use types::{CreateTodo, Todo, TodoIdBody, UpdateTodo};
