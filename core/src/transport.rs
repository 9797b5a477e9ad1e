//! Executes `HttpRequest` values over the network.
//!
//! # Design
//! A transport performs exactly one round-trip per call and reports every
//! received response as data, 4xx and 5xx included. Status interpretation
//! belongs to `KankaClient`. Connection pooling, TLS and timeouts are left
//! to the underlying HTTP client. Dropping the returned future aborts the
//! request.

use std::future::Future;
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method};

use crate::error::{NetworkError, NetworkErrorKind};
use crate::http::{FormPart, HttpMethod, HttpRequest, HttpResponse, MultipartForm, RequestBody};

/// Performs one HTTP round-trip.
pub trait Transport: Send + Sync {
    fn send(
        &self,
        request: HttpRequest,
    ) -> impl Future<Output = Result<HttpResponse, NetworkError>> + Send;
}

/// `Transport` backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Transport with reqwest defaults and no request timeout.
    pub fn new() -> Result<Self, NetworkError> {
        Self::build(None)
    }

    /// Transport that fails requests running longer than `timeout`.
    pub fn with_timeout(timeout: Duration) -> Result<Self, NetworkError> {
        Self::build(Some(timeout))
    }

    /// Wraps an already configured reqwest client.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    fn build(timeout: Option<Duration>) -> Result<Self, NetworkError> {
        let mut builder = Client::builder().user_agent(concat!("kanka-core/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| NetworkError::new(NetworkErrorKind::Request, e))?;
        Ok(Self { client })
    }
}

impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, NetworkError> {
        let mut builder = self.client.request(to_reqwest_method(request.method), &request.url);
        if !request.query.is_empty() {
            builder = builder.query(request.query.pairs());
        }
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(json) => builder.body(json),
            RequestBody::Multipart(form) => builder.multipart(to_reqwest_form(form)?),
        };

        let response = builder.send().await.map_err(map_error)?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response
            .text()
            .await
            .map_err(|e| NetworkError::new(NetworkErrorKind::Body, e))?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

fn to_reqwest_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Patch => Method::PATCH,
        HttpMethod::Delete => Method::DELETE,
    }
}

fn to_reqwest_form(form: MultipartForm) -> Result<Form, NetworkError> {
    let mut out = Form::new();
    for part in form.parts {
        out = match part {
            FormPart::Text { name, value } => out.text(name, value),
            FormPart::File {
                name,
                file_name,
                mime,
                bytes,
            } => {
                let part = Part::bytes(bytes)
                    .file_name(file_name)
                    .mime_str(&mime)
                    .map_err(|e| NetworkError::new(NetworkErrorKind::Request, e))?;
                out.part(name, part)
            }
        };
    }
    Ok(out)
}

fn map_error(error: reqwest::Error) -> NetworkError {
    let kind = if error.is_timeout() {
        NetworkErrorKind::Timeout
    } else if error.is_connect() {
        NetworkErrorKind::Connect
    } else if error.is_body() || error.is_decode() {
        NetworkErrorKind::Body
    } else {
        NetworkErrorKind::Request
    };
    NetworkError::new(kind, error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::QueryParams;

    #[test]
    fn methods_map_to_reqwest() {
        assert_eq!(to_reqwest_method(HttpMethod::Get), Method::GET);
        assert_eq!(to_reqwest_method(HttpMethod::Patch), Method::PATCH);
        assert_eq!(to_reqwest_method(HttpMethod::Delete), Method::DELETE);
    }

    #[test]
    fn invalid_mime_is_a_request_error() {
        let form = MultipartForm::new().file("f", "a.bin", "not a mime", vec![0]);
        let err = to_reqwest_form(form).unwrap_err();
        assert_eq!(err.kind, NetworkErrorKind::Request);
    }

    #[tokio::test]
    async fn refused_connection_is_a_network_error() {
        // Bind then drop to get a port nobody listens on.
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let transport = ReqwestTransport::with_timeout(Duration::from_secs(5)).unwrap();
        let request = HttpRequest {
            method: HttpMethod::Get,
            url: format!("http://127.0.0.1:{port}/campaigns"),
            query: QueryParams::new(),
            headers: Vec::new(),
            body: RequestBody::Empty,
        };
        let err = transport.send(request).await.unwrap_err();
        assert_eq!(err.kind, NetworkErrorKind::Connect);
    }
}
