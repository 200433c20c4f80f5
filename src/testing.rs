//! In-memory [`Transport`] for exercising a [`Client`](crate::Client) without
//! network access.

use reqwest::StatusCode;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use std::collections::HashMap;
use std::io::Write;
use std::sync::Mutex;
use url::Url;

use crate::error::Result;
use crate::transport::{HttpRequest, HttpResponse, Transport};

#[derive(Debug, Clone)]
struct CannedResponse {
    status: StatusCode,
    content_type: Option<&'static str>,
    body: Vec<u8>,
}

/// Answers requests from a table of canned responses keyed by the exact
/// request URI. Unknown URIs get an empty `404 Not Found`.
///
/// Every request is recorded and can be inspected through
/// [`FakeTransport::requests`].
///
/// ```
/// use std::sync::Arc;
/// use postcodenl_data::{Client, DEFAULT_BASE_URI};
/// use postcodenl_data::testing::FakeTransport;
///
/// let fake = Arc::new(FakeTransport::new().with_json_response(
///     "https://data.postcode.nl/rest/subscription/accounts",
///     "[]",
/// ));
/// let client =
///     Client::new_with_transport("key", "secret", DEFAULT_BASE_URI, fake.clone()).unwrap();
///
/// assert!(client.list_accounts(None).unwrap().is_empty());
/// assert_eq!(fake.requests().len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct FakeTransport {
    responses: HashMap<String, CannedResponse>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answers `uri` with `status` and `body`.
    pub fn with_response(mut self, uri: &str, status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
        self.responses.insert(
            normalize(uri),
            CannedResponse {
                status,
                content_type: None,
                body: body.into(),
            },
        );
        self
    }

    /// Answers `uri` with `200 OK` and a JSON body.
    pub fn with_json_response(mut self, uri: &str, json: impl Into<String>) -> Self {
        self.responses.insert(
            normalize(uri),
            CannedResponse {
                status: StatusCode::OK,
                content_type: Some("application/json"),
                body: json.into().into_bytes(),
            },
        );
        self
    }

    /// Answers `uri` with `status` and no body.
    pub fn with_empty_response(self, uri: &str, status: StatusCode) -> Self {
        self.with_response(uri, status, Vec::new())
    }

    /// All requests seen so far, oldest first.
    ///
    /// # Panics
    ///
    /// Panics if a thread panicked while recording a request.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().expect("request log poisoned").clone()
    }

    pub fn last_request(&self) -> Option<HttpRequest> {
        self.requests().pop()
    }

    fn answer(&self, request: &HttpRequest) -> CannedResponse {
        self.requests
            .lock()
            .expect("request log poisoned")
            .push(request.clone());
        self.responses
            .get(request.url.as_str())
            .cloned()
            .unwrap_or(CannedResponse {
                status: StatusCode::NOT_FOUND,
                content_type: None,
                body: Vec::new(),
            })
    }
}

// Keys go through the same URL serialization as request URIs so that
// equivalent spellings match.
fn normalize(uri: &str) -> String {
    Url::parse(uri)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| uri.to_string())
}

fn headers_for(canned: &CannedResponse) -> HeaderMap {
    let mut headers = HeaderMap::new();
    if let Some(content_type) = canned.content_type {
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    }
    headers
}

impl Transport for FakeTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse> {
        let canned = self.answer(request);
        Ok(HttpResponse {
            status: canned.status,
            headers: headers_for(&canned),
            body: String::from_utf8_lossy(&canned.body).into_owned(),
        })
    }

    fn download(&self, request: &HttpRequest, sink: &mut dyn Write) -> Result<HttpResponse> {
        let canned = self.answer(request);
        let headers = headers_for(&canned);
        if !canned.status.is_success() {
            return Ok(HttpResponse {
                status: canned.status,
                headers,
                body: String::from_utf8_lossy(&canned.body).into_owned(),
            });
        }

        sink.write_all(&canned.body)?;
        sink.flush()?;
        Ok(HttpResponse {
            status: canned.status,
            headers,
            body: String::new(),
        })
    }
}
