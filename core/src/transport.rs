//! The I/O seam between request building and response parsing.
//!
//! `MenuHttpClient` hands every `HttpRequest` to a `Transport` and parses
//! whatever `HttpResponse` comes back. Non-2xx statuses are data, not
//! errors: a transport only fails when no response was received at all.

use std::time::Duration;

use ureq::typestate::WithBody;
use ureq::unversioned::multipart::{Form, Part};
use ureq::RequestBuilder;

use crate::error::ApiError;
use crate::http::{HttpBody, HttpMethod, HttpRequest, HttpResponse};

/// Executes one HTTP round-trip.
pub trait Transport {
    /// Return the response for any status code; `Err` means the request
    /// never produced a response and must be `ApiError::Network`.
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        (**self).execute(request)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        (**self).execute(request)
    }
}

/// Blocking transport backed by a `ureq` agent.
///
/// The agent keeps its connection pool, so one `UreqTransport` should be
/// reused for the lifetime of a client.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        Self::with_timeout(None)
    }

    pub fn with_timeout(timeout: Option<Duration>) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(timeout)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        let url = request.url.as_str();
        let headers = &request.headers;
        let body = request.body.as_ref();

        let mut response = match request.method {
            HttpMethod::Get => with_headers(self.agent.get(url), headers)
                .call()
                .map_err(network)?,
            HttpMethod::Delete => with_headers(self.agent.delete(url), headers)
                .call()
                .map_err(network)?,
            HttpMethod::Post => send(with_headers(self.agent.post(url), headers), body)?,
            HttpMethod::Put => send(with_headers(self.agent.put(url), headers), body)?,
            HttpMethod::Patch => send(with_headers(self.agent.patch(url), headers), body)?,
        };

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        let body = response.body_mut().read_to_string().map_err(network)?;

        Ok(HttpResponse { status, headers, body })
    }
}

fn with_headers<B>(builder: RequestBuilder<B>, headers: &[(String, String)]) -> RequestBuilder<B> {
    headers
        .iter()
        .fold(builder, |builder, (name, value)| builder.header(name.as_str(), value.as_str()))
}

fn network(err: ureq::Error) -> ApiError {
    ApiError::Network(err.to_string())
}

/// Send `body`. Multipart forms are encoded by ureq, which also sets the
/// boundary in `content-type`.
fn send(
    builder: RequestBuilder<WithBody>,
    body: Option<&HttpBody>,
) -> Result<ureq::http::Response<ureq::Body>, ApiError> {
    match body {
        None => builder.send_empty().map_err(network),
        Some(HttpBody::Json(text)) => builder.send(text.as_bytes()).map_err(network),
        Some(HttpBody::Multipart(form)) => {
            let part = Part::bytes(&form.bytes)
                .file_name(&form.file_name)
                .mime_str(&form.content_type)
                .map_err(|e| ApiError::Serialization(e.to_string()))?;
            builder
                .send(Form::new().part(&form.field_name, part))
                .map_err(network)
        }
    }
}
