use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderValue};
use serde::de::DeserializeOwned;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use url::Url;

use crate::config::load_config;
use crate::entities::{Account, Delivery};
use crate::error::{ApiError, Error, Result};
use crate::query::{DeliveryQuery, QueryParams};
use crate::transport::{HttpRequest, HttpTransport, Transport};
use crate::util::encode_path_segment;

/// Base URI of the production DATA API.
pub const DEFAULT_BASE_URI: &str = "https://data.postcode.nl/rest/";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base API URI, typically [`DEFAULT_BASE_URI`].
    pub url: String,
    /// API key (the HTTP Basic user name).
    pub key: String,
    /// API secret (the HTTP Basic password).
    pub secret: String,
}

/// Key and secret used for HTTP Basic authentication.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    key: String,
    secret: String,
}

impl Credentials {
    pub fn new(key: impl Into<String>, secret: impl Into<String>) -> Result<Self> {
        let key = key.into();
        let secret = secret.into();
        if key.trim().is_empty() {
            return Err(Error::InvalidArgument {
                name: "key",
                reason: "must not be empty",
            });
        }
        if secret.trim().is_empty() {
            return Err(Error::InvalidArgument {
                name: "secret",
                reason: "must not be empty",
            });
        }
        Ok(Self { key, secret })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Value for the `Authorization` header: `Basic base64(key:secret)`.
    pub fn authorization(&self) -> String {
        format!(
            "Basic {}",
            BASE64.encode(format!("{}:{}", self.key, self.secret))
        )
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("key", &self.key)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Client for the postcode.nl DATA API.
///
/// Every operation is a single blocking GET. The client holds no per-call
/// state, so it can be cloned freely and shared between threads.
#[derive(Debug, Clone)]
pub struct Client {
    base_uri: Url,
    credentials: Credentials,
    progress: bool,

    transport: Arc<dyn Transport>,
}

impl Client {
    /// Creates a client for the production API at [`DEFAULT_BASE_URI`].
    pub fn new(key: impl Into<String>, secret: impl Into<String>) -> Result<Self> {
        Self::with_base_uri(key, secret, DEFAULT_BASE_URI)
    }

    /// Creates a client for the API at `base_uri`, which must be absolute.
    pub fn with_base_uri(
        key: impl Into<String>,
        secret: impl Into<String>,
        base_uri: &str,
    ) -> Result<Self> {
        let credentials = Credentials::new(key, secret)?;
        let base_uri = parse_base_uri(base_uri)?;
        let transport = Arc::new(HttpTransport::new()?);

        Ok(Self {
            base_uri,
            credentials,
            progress: false,
            transport,
        })
    }

    /// Creates a client for the API at `base_uri` that sends its requests
    /// through `transport` instead of a reqwest client.
    pub fn new_with_transport(
        key: impl Into<String>,
        secret: impl Into<String>,
        base_uri: &str,
        transport: Arc<dyn Transport>,
    ) -> Result<Self> {
        Ok(Self {
            base_uri: parse_base_uri(base_uri)?,
            credentials: Credentials::new(key, secret)?,
            progress: false,
            transport,
        })
    }

    pub fn from_config(cfg: ClientConfig) -> Result<Self> {
        Self::with_base_uri(cfg.key, cfg.secret, &cfg.url)
    }

    /// Creates a client using (in order of precedence):
    /// - environment variables `POSTCODENL_URL` / `POSTCODENL_KEY` / `POSTCODENL_SECRET`
    /// - config file from `POSTCODENL_RC` or `.postcodenlrc` (current directory, then home)
    pub fn from_env() -> Result<Self> {
        Self::from_config(load_config(None, None, None)?)
    }

    /// Replaces the HTTP layer, e.g. with a
    /// [`FakeTransport`](crate::testing::FakeTransport). Prefer
    /// [`Client::new_with_transport`] when the reqwest client is never needed.
    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = transport;
        self
    }

    /// Shows a progress bar on stderr while downloading files.
    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    pub fn base_uri(&self) -> &Url {
        &self.base_uri
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Retrieves a single subscription account.
    pub fn get_account(&self, account_id: i64) -> Result<Account> {
        let uri = self.build_uri(
            &format!("subscription/accounts/{}", account_id),
            &QueryParams::new(),
        )?;
        self.api_json(uri)
    }

    /// Retrieves the accounts available to these credentials, optionally only
    /// those for one product code. Order is the server's.
    pub fn list_accounts(&self, product_code: Option<&str>) -> Result<Vec<Account>> {
        let mut params = QueryParams::new();
        if let Some(code) = product_code {
            params.push("productCode", code);
        }
        let uri = self.build_uri("subscription/accounts", &params)?;
        self.api_json(uri)
    }

    /// Retrieves a single delivery.
    ///
    /// The id is escaped as one path segment, so ids containing `/`, `?`, `&`
    /// and the like are safe to pass as-is. The dot segments `.` and `..`
    /// cannot be escaped past URI resolution and are rejected.
    pub fn get_delivery(&self, delivery_id: &str) -> Result<Delivery> {
        if delivery_id.trim().is_empty() {
            return Err(Error::InvalidArgument {
                name: "delivery_id",
                reason: "must not be empty",
            });
        }
        if matches!(delivery_id, "." | "..") {
            return Err(Error::InvalidArgument {
                name: "delivery_id",
                reason: "must not be a dot segment",
            });
        }
        let path = format!(
            "subscription/deliveries/{}",
            encode_path_segment(delivery_id)
        );
        let uri = self.build_uri(&path, &QueryParams::new())?;
        self.api_json(uri)
    }

    /// Retrieves the deliveries matching `query`.
    ///
    /// Fails with [`Error::InvalidOperation`] without contacting the server
    /// when the query sets no filter at all.
    pub fn list_deliveries(&self, query: &DeliveryQuery) -> Result<Vec<Delivery>> {
        let params = query.to_query_params();
        if params.is_empty() {
            return Err(Error::InvalidOperation(
                "No query arguments provided".to_string(),
            ));
        }
        let uri = self.build_uri("subscription/deliveries", &params)?;
        self.api_json(uri)
    }

    /// Downloads the file of `delivery` to `destination`.
    pub fn download_delivery(&self, delivery: &Delivery, destination: &Path) -> Result<u64> {
        self.download_file(&delivery.download_url, destination)
    }

    /// Downloads `uri` to `destination`, replacing any existing file, and
    /// returns the number of bytes written.
    ///
    /// The body is streamed into `<destination>.part` first and renamed into
    /// place once complete; a failed download leaves an existing destination
    /// file untouched.
    pub fn download_file(&self, uri: &Url, destination: &Path) -> Result<u64> {
        if destination.as_os_str().is_empty() {
            return Err(Error::InvalidArgument {
                name: "destination",
                reason: "must not be empty",
            });
        }

        if let Some(parent) = destination.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let partial = partial_path(destination);
        tracing::debug!(%uri, destination = %destination.display(), "downloading file");

        match self.download_to(uri, &partial) {
            Ok(()) => {
                fs::rename(&partial, destination)?;
                let written = fs::metadata(destination)?.len();
                tracing::debug!(%uri, bytes = written, "download complete");
                Ok(written)
            }
            Err(e) => {
                let _ = fs::remove_file(&partial);
                Err(e)
            }
        }
    }

    fn download_to(&self, uri: &Url, partial: &Path) -> Result<()> {
        let request = HttpRequest::get(uri.clone());
        let mut file = File::create(partial)?;

        let pb = if self.progress {
            let pb = ProgressBar::new_spinner();
            if let Ok(style) = ProgressStyle::with_template(
                "{spinner:.green} {bytes} ({bytes_per_sec}) {elapsed} {msg}",
            ) {
                pb.set_style(style);
            }
            pb.set_message(
                partial
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default(),
            );
            Some(pb)
        } else {
            None
        };

        let response = match &pb {
            Some(pb) => {
                let mut sink = pb.wrap_write(&mut file);
                self.transport.download(&request, &mut sink)?
            }
            None => self.transport.download(&request, &mut file)?,
        };
        file.flush()?;
        file.sync_all()?;

        if let Some(pb) = &pb {
            pb.finish_and_clear();
        }

        if !response.status.is_success() {
            tracing::debug!(%uri, status = %response.status, "download rejected");
            return Err(ApiError::from_response(uri.clone(), response).into());
        }
        Ok(())
    }

    /// Joins `path` onto the base URI and appends `params` as a
    /// form-urlencoded query string.
    fn build_uri(&self, path: &str, params: &QueryParams) -> Result<Url> {
        let mut uri = self
            .base_uri
            .join(path)
            .map_err(|_| ApiError::invalid_uri())?;

        if !params.is_empty() {
            uri.query_pairs_mut().extend_pairs(params.iter());
        }
        Ok(uri)
    }

    fn api_json<T: DeserializeOwned>(&self, uri: Url) -> Result<T> {
        let request = HttpRequest::get(uri.clone())
            .with_header(ACCEPT, HeaderValue::from_static("application/json"))
            .with_header(AUTHORIZATION, self.authorization_header()?);

        tracing::debug!(%uri, "GET");
        let response = self.transport.send(&request)?;
        let status = response.status;
        tracing::debug!(%uri, %status, bytes = response.body.len(), "response received");

        if !status.is_success() {
            return Err(ApiError::from_response(uri, response).into());
        }

        serde_json::from_str::<T>(&response.body).map_err(|source| Error::Parse { uri, source })
    }

    fn authorization_header(&self) -> Result<HeaderValue> {
        let mut value = HeaderValue::from_str(&self.credentials.authorization()).map_err(|_| {
            Error::InvalidArgument {
                name: "credentials",
                reason: "not representable in an HTTP header",
            }
        })?;
        value.set_sensitive(true);
        Ok(value)
    }
}

fn parse_base_uri(base_uri: &str) -> Result<Url> {
    let mut uri = Url::parse(base_uri.trim()).map_err(|e| match e {
        url::ParseError::RelativeUrlWithoutBase => {
            Error::InvalidConfiguration(format!("base URI must be absolute: {}", base_uri))
        }
        other => Error::InvalidConfiguration(format!("invalid base URI {}: {}", base_uri, other)),
    })?;

    if uri.cannot_be_a_base() {
        return Err(Error::InvalidConfiguration(format!(
            "base URI cannot have paths joined onto it: {}",
            base_uri
        )));
    }

    // Relative paths join beneath the base only if it ends with a slash.
    if !uri.path().ends_with('/') {
        let path = format!("{}/", uri.path());
        uri.set_path(&path);
    }
    Ok(uri)
}

fn partial_path(destination: &Path) -> PathBuf {
    let mut name = destination.as_os_str().to_os_string();
    name.push(".part");
    PathBuf::from(name)
}
