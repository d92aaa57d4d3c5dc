//! Authenticated HTTP access to the expense tracker backend.
//!
//! Wraps a blocking `reqwest` client with a shared cookie store, so the
//! session cookie travels with every request, and attaches the session
//! credential to authenticated calls. Calls that need a credential fail with
//! [`TrackerError::MissingCredential`] before any request is sent when none
//! was configured.

use std::fmt;
use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{HeaderName, AUTHORIZATION, CONTENT_DISPOSITION, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde_json::Value;

use crate::error::{Result, TrackerError};
use crate::models::{DownloadedReceipt, Submission};

// ---------------------------------------------------------------------------
// Credential
// ---------------------------------------------------------------------------

/// Session credential sent as a bearer token.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wrap a token. Blank tokens count as no credential at all.
    pub fn new(token: &str) -> Option<Self> {
        let token = token.trim();
        if token.is_empty() {
            None
        } else {
            Some(Self(token.to_string()))
        }
    }

    /// Value for the `Authorization` header. Tokens already carrying the
    /// `Bearer ` scheme are sent verbatim.
    pub fn header_value(&self) -> String {
        if self.0.starts_with("Bearer ") {
            self.0.clone()
        } else {
            format!("Bearer {}", self.0)
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

// ---------------------------------------------------------------------------
// ApiClient
// ---------------------------------------------------------------------------

/// HTTP client bound to one backend and one session credential.
pub struct ApiClient {
    /// Backend base URL, without a trailing slash.
    pub base_url: String,
    credential: Option<Credential>,
    client: Client,
}

impl ApiClient {
    /// Create a client for `base_url`.
    ///
    /// `timeout` of `None` leaves requests unbounded.
    pub fn new(
        base_url: &str,
        credential: Option<Credential>,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(TrackerError::InvalidArgument(
                "backend base URL must not be empty".into(),
            ));
        }
        let client = Client::builder()
            .timeout(timeout)
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;
        Ok(Self {
            base_url,
            credential,
            client,
        })
    }

    pub fn has_credential(&self) -> bool {
        self.credential.is_some()
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn credential(&self) -> Result<&Credential> {
        self.credential.as_ref().ok_or_else(|| {
            tracing::debug!("No credential configured; skipping authenticated request");
            TrackerError::MissingCredential
        })
    }

    fn authorized(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let credential = self.credential()?;
        Ok(self
            .client
            .request(method, self.url(path))
            .header(AUTHORIZATION, credential.header_value()))
    }

    /// GET a JSON document from an authenticated endpoint.
    pub fn get_json(&self, path: &str, query: &[(&str, String)]) -> Result<Value> {
        let resp = self.authorized(Method::GET, path)?.query(query).send()?;
        let resp = check_status(resp)?;
        Ok(resp.json()?)
    }

    /// Send a multipart submission (create or update).
    pub fn send_multipart(&self, method: Method, path: &str, submission: &Submission) -> Result<()> {
        let form = submission.to_multipart()?;
        let resp = self.authorized(method, path)?.multipart(form).send()?;
        check_status(resp)?;
        Ok(())
    }

    pub fn delete(&self, path: &str) -> Result<()> {
        let resp = self.authorized(Method::DELETE, path)?.send()?;
        check_status(resp)?;
        Ok(())
    }

    /// Download a receipt document for `transaction_id` from `path`.
    pub fn download(&self, path: &str, transaction_id: &str) -> Result<DownloadedReceipt> {
        let resp = self.authorized(Method::GET, path)?.send()?;
        let resp = check_status(resp)?;
        let header = |name: HeaderName| {
            resp.headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        let content_disposition = header(CONTENT_DISPOSITION);
        let content_type = header(CONTENT_TYPE);
        let bytes = resp.bytes()?.to_vec();
        Ok(DownloadedReceipt::from_response_parts(
            transaction_id,
            content_disposition.as_deref(),
            content_type.as_deref(),
            bytes,
        ))
    }

    /// GET an authenticated endpoint and return only its status.
    pub fn probe(&self, path: &str) -> Result<StatusCode> {
        let resp = self.authorized(Method::GET, path)?.send()?;
        Ok(resp.status())
    }

    /// POST without a body, relying on the session cookie alone.
    pub fn post_empty(&self, path: &str) -> Result<StatusCode> {
        let resp = self.client.post(self.url(path)).send()?;
        Ok(resp.status())
    }

    /// POST a JSON body and return the status plus the parsed response body
    /// (`Value::Null` when the body is empty or not JSON).
    pub fn post_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        authenticated: bool,
    ) -> Result<(StatusCode, Value)> {
        let builder = if authenticated {
            self.authorized(Method::POST, path)?
        } else {
            self.client.post(self.url(path))
        };
        let resp = builder.json(body).send()?;
        let status = resp.status();
        let text = resp.text()?;
        let value = serde_json::from_str(&text).unwrap_or(Value::Null);
        Ok((status, value))
    }
}

/// Turn a non-success response into [`TrackerError::Status`].
fn check_status(resp: Response) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().unwrap_or_default();
    Err(TrackerError::Status {
        status: status.as_u16(),
        body,
    })
}

/// The backend's `message` field, if the error body carries one.
pub fn error_message(body: &Value) -> Option<String> {
    body.get("message")
        .and_then(Value::as_str)
        .map(str::to_string)
}
