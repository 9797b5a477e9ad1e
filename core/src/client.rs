//! Request pipeline shared by every endpoint.
//!
//! # Design
//! `KankaClient` holds the configuration and a transport and carries no
//! mutable state between calls. Requests are built as plain `HttpRequest`
//! values (URL resolution and authentication happen there), handed to the
//! transport once, and the response status is classified before any body is
//! decoded. Every failure reaches the caller as an `ApiError`; nothing is
//! retried.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument, warn, Span};

use crate::config::ClientConfig;
use crate::error::{ApiError, NetworkError, ValidationError};
use crate::http::{HttpMethod, HttpRequest, HttpResponse, MultipartForm, RequestBody};
use crate::query::QueryParams;
use crate::schema::{self, ROOT_PATH};
use crate::transport::{ReqwestTransport, Transport};

/// Path used for request payloads that fail to serialize.
pub const REQUEST_PATH: &str = "$request";

/// Options for `KankaClient::upload_file`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadOptions {
    /// Method used for the multipart request. The default-thumbnail
    /// endpoint expects its removal as a DELETE carrying a form body.
    pub method: HttpMethod,
}

impl Default for UploadOptions {
    fn default() -> Self {
        Self {
            method: HttpMethod::Post,
        }
    }
}

/// Authenticated client for the Kanka API.
pub struct KankaClient<T = ReqwestTransport> {
    config: ClientConfig,
    transport: Arc<T>,
}

impl<T> Clone for KankaClient<T> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            transport: Arc::clone(&self.transport),
        }
    }
}

impl<T> std::fmt::Debug for KankaClient<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KankaClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl KankaClient<ReqwestTransport> {
    /// Client using the default reqwest transport.
    pub fn new(config: ClientConfig) -> Result<Self, NetworkError> {
        Ok(Self::with_transport(config, ReqwestTransport::new()?))
    }
}

impl<T> KankaClient<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        Self {
            config,
            transport: Arc::new(transport),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Builds an authenticated request for `path`, relative to the base URL.
    pub fn request(&self, method: HttpMethod, path: &str) -> HttpRequest {
        HttpRequest {
            method,
            url: self.url(path),
            query: QueryParams::new(),
            headers: vec![
                (
                    "authorization".to_string(),
                    format!("Bearer {}", self.config.api_key()),
                ),
                ("accept".to_string(), "application/json".to_string()),
            ],
            body: RequestBody::Empty,
        }
    }

    /// Same as `request` with a JSON body.
    pub fn json_request<B: Serialize + ?Sized>(
        &self,
        method: HttpMethod,
        path: &str,
        body: &B,
    ) -> Result<HttpRequest, ApiError> {
        let json = serde_json::to_string(body)
            .map_err(|e| ValidationError::new(REQUEST_PATH, e.to_string()))?;
        let mut request = self.request(method, path);
        request
            .headers
            .push(("content-type".to_string(), "application/json".to_string()));
        request.body = RequestBody::Json(json);
        Ok(request)
    }

    /// Same as `request` with a multipart body. The transport sets the
    /// content type, boundary included.
    pub fn multipart_request(
        &self,
        method: HttpMethod,
        path: &str,
        form: MultipartForm,
    ) -> HttpRequest {
        let mut request = self.request(method, path);
        request.body = RequestBody::Multipart(form);
        request
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url(), path.trim_start_matches('/'))
    }
}

impl<T: Transport> KankaClient<T> {
    /// Sends `request` and fails on any status outside 200-299.
    #[instrument(
        name = "kanka_request",
        skip(self, request),
        fields(
            http.method = %request.method,
            http.url = %request.url,
            http.status_code = tracing::field::Empty,
        )
    )]
    pub async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let response = match self.transport.send(request).await {
            Ok(response) => response,
            Err(err) => {
                warn!(error = %err, "request failed before a response arrived");
                return Err(err.into());
            }
        };
        Span::current().record("http.status_code", response.status);
        check_status(response)
    }

    /// Sends `request` and decodes the body as `R`.
    pub async fn fetch<R: DeserializeOwned>(&self, request: HttpRequest) -> Result<R, ApiError> {
        let response = self.execute(request).await?;
        decode_body(&response)
    }

    pub async fn get(&self, path: &str, query: QueryParams) -> Result<Value, ApiError> {
        let mut request = self.request(HttpMethod::Get, path);
        request.query = query;
        self.send_raw(request).await
    }

    pub async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Value, ApiError> {
        let request = self.json_request(HttpMethod::Post, path, body)?;
        self.send_raw(request).await
    }

    pub async fn put<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Value, ApiError> {
        let request = self.json_request(HttpMethod::Put, path, body)?;
        self.send_raw(request).await
    }

    pub async fn patch<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Value, ApiError> {
        let request = self.json_request(HttpMethod::Patch, path, body)?;
        self.send_raw(request).await
    }

    pub async fn delete(&self, path: &str) -> Result<Value, ApiError> {
        let request = self.request(HttpMethod::Delete, path);
        self.send_raw(request).await
    }

    /// Sends a multipart form, by default as POST.
    pub async fn upload_file(
        &self,
        path: &str,
        form: MultipartForm,
        options: UploadOptions,
    ) -> Result<Value, ApiError> {
        let request = self.multipart_request(options.method, path, form);
        self.send_raw(request).await
    }

    async fn send_raw(&self, request: HttpRequest) -> Result<Value, ApiError> {
        let response = self.execute(request).await?;
        raw_body(&response)
    }
}

/// Maps a non-2xx status to `ApiError::Http`, keeping the body verbatim.
pub fn check_status(response: HttpResponse) -> Result<HttpResponse, ApiError> {
    if response.is_success() {
        debug!(status = response.status, "request succeeded");
        return Ok(response);
    }
    warn!(status = response.status, "server returned an error status");
    Err(ApiError::Http {
        status: response.status,
        body: response.body,
    })
}

/// Decodes a successful response body against `R`.
pub fn decode_body<R: DeserializeOwned>(response: &HttpResponse) -> Result<R, ApiError> {
    schema::decode(&response.body).map_err(|err| {
        warn!(path = %err.path, "response did not match the expected schema");
        ApiError::from(err)
    })
}

/// Parses a successful body as untyped JSON. An empty body is `null`.
pub fn raw_body(response: &HttpResponse) -> Result<Value, ApiError> {
    if response.body.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(&response.body)
        .map_err(|e| ValidationError::new(ROOT_PATH, e.to_string()).into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> KankaClient<()> {
        KankaClient::with_transport(
            ClientConfig::new("secret").with_base_url("http://localhost:3000"),
            (),
        )
    }

    #[test]
    fn request_resolves_path_and_authenticates() {
        let req = client().request(HttpMethod::Get, "campaigns/1/characters");
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "http://localhost:3000/campaigns/1/characters");
        assert_eq!(req.header("Authorization"), Some("Bearer secret"));
        assert_eq!(req.header("Accept"), Some("application/json"));
        assert!(req.body.is_empty());
        assert!(req.query.is_empty());
    }

    #[test]
    fn leading_slash_is_tolerated() {
        let client = KankaClient::with_transport(
            ClientConfig::new("k").with_base_url("http://localhost:3000/"),
            (),
        );
        let req = client.request(HttpMethod::Get, "/campaigns");
        assert_eq!(req.url, "http://localhost:3000/campaigns");
    }

    #[test]
    fn json_request_sets_content_type() {
        let body = serde_json::json!({ "name": "Ari", "is_private": false });
        let req = client()
            .json_request(HttpMethod::Post, "campaigns/1/characters", &body)
            .unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.header("content-type"), Some("application/json"));
        let sent: Value = serde_json::from_str(req.body.as_json().unwrap()).unwrap();
        assert_eq!(sent, body);
    }

    #[test]
    fn unserializable_payload_is_a_validation_error() {
        let mut body = std::collections::HashMap::new();
        body.insert(vec![1u8], "map keys must be strings");
        let err = client()
            .json_request(HttpMethod::Post, "x", &body)
            .unwrap_err();
        match err {
            ApiError::Validation(v) => assert_eq!(v.path, REQUEST_PATH),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn multipart_request_leaves_content_type_to_transport() {
        let form = MultipartForm::new().text("entity_type", "character");
        let req = client().multipart_request(HttpMethod::Delete, "campaigns/1/default-thumbnails", form);
        assert_eq!(req.method, HttpMethod::Delete);
        assert!(req.header("content-type").is_none());
        assert!(matches!(req.body, RequestBody::Multipart(_)));
    }

    #[test]
    fn check_status_accepts_2xx_only() {
        assert!(check_status(HttpResponse::new(201, "{}")).is_ok());
        let err = check_status(HttpResponse::new(404, r#"{"message":"Not found"}"#)).unwrap_err();
        assert!(matches!(err, ApiError::Http { status: 404, .. }));
        assert_eq!(err.json_body().unwrap()["message"], "Not found");
    }

    #[test]
    fn raw_body_handles_empty_and_invalid() {
        assert_eq!(raw_body(&HttpResponse::new(204, "")).unwrap(), Value::Null);
        assert_eq!(
            raw_body(&HttpResponse::new(200, r#"{"data":true}"#)).unwrap()["data"],
            true
        );
        let err = raw_body(&HttpResponse::new(200, "<html>")).unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn upload_defaults_to_post() {
        assert_eq!(UploadOptions::default().method, HttpMethod::Post);
    }
}
