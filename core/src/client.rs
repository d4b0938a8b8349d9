//! Configured HTTP client shared by every resource client.
//!
//! # Design
//! `MenuHttpClient` is built once per base URL + API key pair and is
//! immutable afterwards. It splits each call the same way throughout:
//! `build_request` produces an `HttpRequest` (credential header attached),
//! the `Transport` performs the round-trip, and `parse_response` either
//! unwraps the body into the caller's type or normalizes the error
//! envelope. Resource clients only ever see typed results or `ApiError`.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};
use url::Url;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpBody, HttpMethod, HttpRequest, HttpResponse, MultipartForm};
use crate::transport::{Transport, UreqTransport};

/// Header carrying the credential on every request.
pub const API_KEY_HEADER: &str = "X-API-Key";

/// Every issued API key starts with this marker.
pub const API_KEY_PREFIX: &str = "WM.";

const UNDEFINED: &str = "undefined";

/// HTTP client bound to one base URL and one API key.
#[derive(Debug, Clone)]
pub struct MenuHttpClient<T> {
    base_url: String,
    api_key: String,
    transport: T,
}

impl MenuHttpClient<UreqTransport> {
    /// Build a client backed by `UreqTransport`, honouring `config.timeout`.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ApiError> {
        Self::create(config, UreqTransport::with_timeout(config.timeout))
    }
}

impl<T: Transport> MenuHttpClient<T> {
    /// Validate `config` and bind it to `transport`.
    ///
    /// Checks run in a fixed order: API key, base URL presence, base URL
    /// shape. The first failure is returned as `ApiError::Configuration`.
    pub fn create(config: &ClientConfig, transport: T) -> Result<Self, ApiError> {
        let api_key = check_api_key(config.api_key.as_deref())?;
        let base_url = check_base_url(config.base_url.as_deref())?;
        Ok(Self {
            base_url,
            api_key,
            transport,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Headers attached to every request.
    pub fn default_headers(&self) -> Vec<(String, String)> {
        vec![(API_KEY_HEADER.to_string(), self.api_key.clone())]
    }

    pub fn build_request(&self, method: HttpMethod, path: &str, body: Option<HttpBody>) -> HttpRequest {
        let mut headers = self.default_headers();
        if let Some(HttpBody::Json(_)) = body {
            headers.push(("content-type".to_string(), "application/json".to_string()));
        }
        HttpRequest {
            method,
            url: format!("{}{path}", self.base_url),
            headers,
            body,
        }
    }

    /// Execute `request` and unwrap the response into `R`.
    pub fn send<R: DeserializeOwned>(&self, request: HttpRequest) -> Result<R, ApiError> {
        debug!(method = %request.method, url = %request.url, "dispatching request");
        let response = self.transport.execute(&request).inspect_err(|e| {
            warn!(method = %request.method, url = %request.url, error = %e, "request failed without a response");
        })?;
        debug!(status = response.status, url = %request.url, "received response");
        parse_response(response)
    }

    pub fn get<R: DeserializeOwned>(&self, path: &str) -> Result<R, ApiError> {
        self.send(self.build_request(HttpMethod::Get, path, None))
    }

    pub fn delete<R: DeserializeOwned>(&self, path: &str) -> Result<R, ApiError> {
        self.send(self.build_request(HttpMethod::Delete, path, None))
    }

    pub fn post<B, R>(&self, path: &str, body: &B) -> Result<R, ApiError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.send_json(HttpMethod::Post, path, body)
    }

    pub fn put<B, R>(&self, path: &str, body: &B) -> Result<R, ApiError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.send_json(HttpMethod::Put, path, body)
    }

    pub fn patch<B, R>(&self, path: &str, body: &B) -> Result<R, ApiError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.send_json(HttpMethod::Patch, path, body)
    }

    /// `PUT` a multipart form.
    pub fn put_form<R: DeserializeOwned>(&self, path: &str, form: MultipartForm) -> Result<R, ApiError> {
        self.send(self.build_request(HttpMethod::Put, path, Some(HttpBody::Multipart(form))))
    }

    fn send_json<B, R>(&self, method: HttpMethod, path: &str, body: &B) -> Result<R, ApiError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let body = serde_json::to_string(body).map_err(|e| ApiError::Serialization(e.to_string()))?;
        self.send(self.build_request(method, path, Some(HttpBody::Json(body))))
    }
}

fn check_api_key(api_key: Option<&str>) -> Result<String, ApiError> {
    match api_key {
        Some(key) if key.starts_with(API_KEY_PREFIX) => Ok(key.to_string()),
        other => Err(ApiError::Configuration(format!(
            "unexpected API Key token received: {}",
            other.unwrap_or(UNDEFINED)
        ))),
    }
}

fn check_base_url(base_url: Option<&str>) -> Result<String, ApiError> {
    let base_url = match base_url {
        Some(url) if !url.is_empty() => url,
        other => {
            return Err(ApiError::Configuration(format!(
                "cannot create an axios client with an undefined baseURL: {}",
                other.unwrap_or(UNDEFINED)
            )))
        }
    };

    // Paths are appended to the base URL, so it cannot end in a query or fragment.
    let is_http = Url::parse(base_url).is_ok_and(|url| {
        matches!(url.scheme(), "http" | "https") && url.query().is_none() && url.fragment().is_none()
    });
    if !is_http {
        return Err(ApiError::Configuration(format!(
            "unexpected url provided as baseURL for axios: {base_url}"
        )));
    }
    Ok(base_url.trim_end_matches('/').to_string())
}

/// Unwrap a 2xx body into `R`, or normalize a non-2xx response into
/// `ApiError::Transport { status, body }`.
///
/// An empty success body reads as JSON `null`, so `R = ()` or
/// `Option<_>` accept it.
pub fn parse_response<R: DeserializeOwned>(response: HttpResponse) -> Result<R, ApiError> {
    if !response.is_success() {
        return Err(normalize_error(response));
    }
    let body = if response.body.trim().is_empty() {
        "null"
    } else {
        response.body.as_str()
    };
    serde_json::from_str(body).map_err(|e| ApiError::Deserialization(e.to_string()))
}

/// Spread the response's JSON object next to its status. A body that is not
/// a JSON object is kept whole under `message`.
fn normalize_error(response: HttpResponse) -> ApiError {
    let body = match serde_json::from_str::<Value>(&response.body) {
        Ok(Value::Object(fields)) => fields,
        _ if response.body.trim().is_empty() => Map::new(),
        _ => {
            let mut fields = Map::new();
            fields.insert("message".to_string(), Value::String(response.body));
            fields
        }
    };
    ApiError::Transport {
        status: response.status,
        body,
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::*;
    use crate::types::ResponseMessage;

    const BASE_URL: &str = "https://whatsamenu.core.wiredmartians.com/v1";

    struct Offline;

    impl Transport for Offline {
        fn execute(&self, _request: &HttpRequest) -> Result<HttpResponse, ApiError> {
            Err(ApiError::Network("offline".to_string()))
        }
    }

    fn config(base_url: Option<&str>, api_key: Option<&str>) -> ClientConfig {
        ClientConfig {
            base_url: base_url.map(str::to_string),
            api_key: api_key.map(str::to_string),
            timeout: None,
        }
    }

    fn create_error(base_url: Option<&str>, api_key: Option<&str>) -> String {
        match MenuHttpClient::create(&config(base_url, api_key), Offline) {
            Err(ApiError::Configuration(message)) => message,
            Err(other) => panic!("unexpected error: {other:?}"),
            Ok(_) => panic!("expected construction to fail"),
        }
    }

    #[test]
    fn creates_client_with_api_key_header() {
        let client = MenuHttpClient::create(&config(Some(BASE_URL), Some("WM.xxxxxxxx")), Offline).unwrap();
        assert_eq!(client.base_url(), BASE_URL);
        assert_eq!(
            client.default_headers(),
            vec![("X-API-Key".to_string(), "WM.xxxxxxxx".to_string())]
        );
    }

    #[test]
    fn identical_configs_build_independent_equal_clients() {
        let cfg = config(Some(BASE_URL), Some("WM.xxxxxxxx"));
        let a = MenuHttpClient::create(&cfg, Offline).unwrap();
        let b = MenuHttpClient::create(&cfg, Offline).unwrap();
        assert_eq!(a.base_url(), b.base_url());
        assert_eq!(a.default_headers(), b.default_headers());
    }

    #[rstest]
    #[case::wrong_prefix(Some("xx.xxxxx"), "unexpected API Key token received: xx.xxxxx")]
    #[case::missing(None, "unexpected API Key token received: undefined")]
    #[case::empty(Some(""), "unexpected API Key token received: ")]
    fn rejects_bad_api_keys(#[case] api_key: Option<&str>, #[case] expected: &str) {
        assert_eq!(create_error(Some(BASE_URL), api_key), expected);
    }

    #[rstest]
    #[case::mailto(
        Some("mailto://mail@whatsamenu.core.wiredmartians.com/v1"),
        "unexpected url provided as baseURL for axios: mailto://mail@whatsamenu.core.wiredmartians.com/v1"
    )]
    #[case::relative(Some("/v1"), "unexpected url provided as baseURL for axios: /v1")]
    #[case::query(
        Some("http://localhost:3000/v1?tenant=a"),
        "unexpected url provided as baseURL for axios: http://localhost:3000/v1?tenant=a"
    )]
    #[case::fragment(
        Some("http://localhost:3000/v1#top"),
        "unexpected url provided as baseURL for axios: http://localhost:3000/v1#top"
    )]
    #[case::missing(None, "cannot create an axios client with an undefined baseURL: undefined")]
    #[case::empty(Some(""), "cannot create an axios client with an undefined baseURL: ")]
    fn rejects_bad_base_urls(#[case] base_url: Option<&str>, #[case] expected: &str) {
        assert_eq!(create_error(base_url, Some("WM.xxxxx")), expected);
    }

    #[test]
    fn api_key_is_checked_before_base_url() {
        assert_eq!(create_error(None, None), "unexpected API Key token received: undefined");
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let client = MenuHttpClient::create(&config(Some("http://localhost:3000/"), Some("WM.k")), Offline).unwrap();
        let req = client.build_request(HttpMethod::Get, "/allergens", None);
        assert_eq!(req.url, "http://localhost:3000/allergens");
    }

    #[test]
    fn json_requests_carry_content_type() {
        let client = MenuHttpClient::create(&config(Some(BASE_URL), Some("WM.k")), Offline).unwrap();
        let req = client.build_request(HttpMethod::Post, "/auth/sign-in", Some(HttpBody::Json("{}".to_string())));
        assert_eq!(req.header("X-API-Key"), Some("WM.k"));
        assert_eq!(req.header("content-type"), Some("application/json"));

        let req = client.build_request(HttpMethod::Delete, "/menu/1", None);
        assert_eq!(req.header("content-type"), None);
    }

    #[test]
    fn network_failures_propagate_unchanged() {
        let client = MenuHttpClient::create(&config(Some(BASE_URL), Some("WM.k")), Offline).unwrap();
        let err = client.get::<Value>("/allergens").unwrap_err();
        assert!(matches!(err, ApiError::Network(ref message) if message == "offline"));
    }

    #[test]
    fn parse_success_unwraps_body() {
        let message: ResponseMessage =
            parse_response(HttpResponse::new(200, r#"{"message":"restaurant created"}"#)).unwrap();
        assert_eq!(message.message, "restaurant created");
    }

    #[test]
    fn parse_empty_success_body_as_null() {
        parse_response::<()>(HttpResponse::new(204, "")).unwrap();
        let absent: Option<ResponseMessage> = parse_response(HttpResponse::new(200, "  ")).unwrap();
        assert!(absent.is_none());
    }

    #[test]
    fn parse_bad_json_is_deserialization_error() {
        let err = parse_response::<ResponseMessage>(HttpResponse::new(200, "not json")).unwrap_err();
        assert!(matches!(err, ApiError::Deserialization(_)));
    }

    #[test]
    fn error_body_fields_are_spread_next_to_status() {
        let err = parse_response::<Value>(HttpResponse::new(404, r#"{"error":"API key not found"}"#)).unwrap_err();
        match err {
            ApiError::Transport { status, body } => {
                assert_eq!(status, 404);
                assert_eq!(Value::Object(body), json!({"error": "API key not found"}));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn non_object_error_body_is_kept_as_message() {
        let err = parse_response::<Value>(HttpResponse::new(500, "internal error")).unwrap_err();
        match err {
            ApiError::Transport { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(Value::Object(body), json!({"message": "internal error"}));
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let err = parse_response::<Value>(HttpResponse::new(502, "")).unwrap_err();
        assert!(matches!(err, ApiError::Transport { status: 502, ref body } if body.is_empty()));
    }
}
