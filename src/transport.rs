//! The HTTP layer underneath [`Client`](crate::Client).
//!
//! The client only needs "send this GET, give me status and body", so that is
//! all [`Transport`] asks for. [`HttpTransport`] does it with reqwest; tests
//! plug in [`FakeTransport`](crate::testing::FakeTransport) instead.

use reqwest::blocking::Client as HttpClient;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Method, StatusCode};
use std::fmt;
use std::io::Write;
use std::time::Duration;
use url::Url;

use crate::error::Result;

#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
}

impl HttpRequest {
    pub fn get(url: Url) -> Self {
        Self {
            method: Method::GET,
            url,
            headers: HeaderMap::new(),
        }
    }

    pub fn with_header(mut self, name: reqwest::header::HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}

/// A fully read response.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    /// Response body as text; empty when the server sent none or when the
    /// body was streamed elsewhere by [`Transport::download`].
    pub body: String,
}

pub trait Transport: Send + Sync + fmt::Debug {
    /// Performs the request and reads the whole body as text.
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse>;

    /// Performs the request and, on a success status, copies the body into
    /// `sink`. On any other status nothing is written and the body is returned
    /// as text instead.
    fn download(&self, request: &HttpRequest, sink: &mut dyn Write) -> Result<HttpResponse>;
}

/// [`Transport`] backed by a blocking reqwest client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: HttpClient,
}

impl HttpTransport {
    /// Builds a transport without an overall request timeout, so that large
    /// delivery files are not cut off mid-transfer.
    pub fn new() -> Result<Self> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("postcodenl-data-rs/{}", env!("CARGO_PKG_VERSION")))
                .unwrap_or(HeaderValue::from_static("postcodenl-data-rs")),
        );

        let http = HttpClient::builder()
            .default_headers(default_headers)
            .timeout(None::<Duration>)
            .build()?;

        Ok(Self { http })
    }

    /// Wraps a preconfigured reqwest client (proxies, custom TLS, timeouts).
    pub fn from_client(http: HttpClient) -> Self {
        Self { http }
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse> {
        let resp = self
            .http
            .request(request.method.clone(), request.url.clone())
            .headers(request.headers.clone())
            .send()?;

        let status = resp.status();
        let headers = resp.headers().clone();
        let body = resp.text()?;
        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }

    fn download(&self, request: &HttpRequest, sink: &mut dyn Write) -> Result<HttpResponse> {
        let mut resp = self
            .http
            .request(request.method.clone(), request.url.clone())
            .headers(request.headers.clone())
            .send()?;

        let status = resp.status();
        let headers = resp.headers().clone();
        if !status.is_success() {
            let body = resp.text()?;
            return Ok(HttpResponse {
                status,
                headers,
                body,
            });
        }

        std::io::copy(&mut resp, sink)?;
        sink.flush()?;
        Ok(HttpResponse {
            status,
            headers,
            body: String::new(),
        })
    }
}
