//! Synchronous client core for the WhatsAMenu restaurant-menu API.
//!
//! # Overview
//! Every operation validates its input locally, builds an `HttpRequest`,
//! hands it to a [`Transport`] and parses the `HttpResponse` into a typed
//! result. Request building and response parsing never touch the network;
//! only the transport does, so the whole surface is testable with an
//! in-memory transport.
//!
//! # Design
//! - `MenuHttpClient` is immutable after construction and holds only the
//!   base URL, the API key and the transport.
//! - Validation is declarative: each input has a `Schema` in
//!   `schema::registry`, interpreted by one generic evaluator that reports
//!   Ajv-compatible violation records.
//! - A rejected input fails with `ApiError` before any request exists.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch drift between the two.

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod resources;
pub mod schema;
pub mod transport;
pub mod types;
pub mod upload;
pub mod validator;

pub use api::MenuApi;
pub use client::MenuHttpClient;
pub use config::ClientConfig;
pub use error::ApiError;
pub use http::{HttpBody, HttpMethod, HttpRequest, HttpResponse, MultipartForm};
pub use schema::{Violation, Violations};
pub use transport::{Transport, UreqTransport};
pub use upload::UploadPayload;
