//! Blocking HTTP transport seam.
//!
//! The protocol layer talks to [`Transport`] rather than to an HTTP client
//! directly, so tests can script responses and capture outgoing requests.
//! [`ReqwestTransport`] is the production implementation.

use reqwest::header::CONTENT_TYPE;

use crate::error::{Error, Result};

/// Body of an outgoing request.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// Form-encoded key/value pairs.
    Form(Vec<(&'static str, String)>),
    /// A JSON document.
    Json(serde_json::Value),
}

/// An outgoing POST request. Every call in the upload protocol is a POST.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    /// Absolute request URL.
    pub url: String,
    /// Access token to attach as a bearer credential, if any.
    pub bearer: Option<String>,
    /// Request body.
    pub body: RequestBody,
}

/// A completed response, body fully read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Raw `Content-Type` header value, if present.
    pub content_type: Option<String>,
    /// Response body as text.
    pub body: String,
}

impl HttpResponse {
    /// True when the media type is `application/json`, ignoring parameters
    /// such as `charset`.
    pub fn is_json(&self) -> bool {
        self.content_type
            .as_deref()
            .and_then(|ct| ct.split(';').next())
            .is_some_and(|mt| mt.trim().eq_ignore_ascii_case("application/json"))
    }
}

/// Blocking request executor.
///
/// A transport that cannot reach the server reports [`Error::Server`]; it
/// never invents a response.
pub trait Transport: Send {
    /// Executes one POST round trip.
    fn post(&mut self, request: &HttpRequest) -> Result<HttpResponse>;
}

/// Production transport over [`reqwest::blocking`].
pub struct ReqwestTransport {
    http: reqwest::blocking::Client,
}

impl ReqwestTransport {
    /// Builds a transport with reqwest's default configuration.
    pub fn new() -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .build()
            .map_err(|err| Error::Server(format!("failed to build http client: {err}")))?;
        Ok(Self { http })
    }
}

impl Transport for ReqwestTransport {
    fn post(&mut self, request: &HttpRequest) -> Result<HttpResponse> {
        let mut builder = self.http.post(&request.url);
        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }
        builder = match &request.body {
            RequestBody::Form(fields) => builder.form(fields),
            RequestBody::Json(value) => builder.json(value),
        };

        let response = builder
            .send()
            .map_err(|err| Error::Server(format!("transport failure: {err}")))?;
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        let body = response
            .text()
            .map_err(|err| Error::Server(format!("failed to read response body: {err}")))?;

        Ok(HttpResponse {
            status,
            content_type,
            body,
        })
    }
}
