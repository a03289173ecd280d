use std::fmt;
use std::io::Cursor;

use bytes::Bytes;
use http::{HeaderMap, Method, StatusCode};
use serde::de::DeserializeOwned;

use super::ApiClientError;

/// Outcome of an executed [`ApiCall`](super::ApiCall).
///
/// A `CallResult` is produced for every execution, even a failed one:
///
/// - when no response was received (request construction failure, network error,
///   cancellation) only [`error`](Self::error) is meaningful and the status code is `0`;
/// - when a response was received, whatever its status, the status and body are
///   available; [`error`](Self::error) is only set if the body could not be read.
///
/// HTTP error statuses are not errors here, use [`is_success`](Self::is_success)
/// or [`error_for_status`](Self::error_for_status) to classify them.
///
/// # Example
///
/// ```rust,no_run
/// use restline_core::ApiClient;
/// # use serde::Deserialize;
/// # #[derive(Deserialize)]
/// # struct User { id: u32 }
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = ApiClient::new("https://api.example.com")?;
///
/// let result = client.get("/users/123").await;
/// if result.is_success() {
///     let user: User = result.into_json()?;
/// } else {
///     eprintln!("{result}: {}", String::from_utf8_lossy(result.body()));
/// }
/// # Ok(())
/// # }
/// ```
#[derive(derive_more::Debug)]
pub struct CallResult {
    method: Method,
    uri: String,
    status: Option<StatusCode>,
    headers: HeaderMap,
    #[debug("{} bytes", body.len())]
    body: Bytes,
    error: Option<ApiClientError>,
}

impl CallResult {
    pub(in crate::client) fn failed(method: Method, uri: String, error: ApiClientError) -> Self {
        Self {
            method,
            uri,
            status: None,
            headers: HeaderMap::new(),
            body: Bytes::new(),
            error: Some(error),
        }
    }

    pub(in crate::client) fn received(
        method: Method,
        uri: String,
        status: StatusCode,
        headers: HeaderMap,
        body: Result<Bytes, ApiClientError>,
    ) -> Self {
        let (body, error) = match body {
            Ok(body) => (body, None),
            Err(error) => (Bytes::new(), Some(error)),
        };
        Self {
            method,
            uri,
            status: Some(status),
            headers,
            body,
            error,
        }
    }

    /// Returns `true` for a `2xx` status.
    pub fn is_success(&self) -> bool {
        self.status.is_some_and(|status| status.is_success())
    }

    /// Returns the response status, `None` if no response was received.
    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    /// Returns the numeric status code, `0` if no response was received.
    pub fn status_code(&self) -> u16 {
        self.status.map_or(0, |status| status.as_u16())
    }

    /// Returns the status line text (e.g. `404 Not Found`), empty if no response was received.
    pub fn status_text(&self) -> String {
        self.status.map(|status| status.to_string()).unwrap_or_default()
    }

    /// Returns the response headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the response body, empty if no body could be read.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Returns the error of this execution, if any.
    pub fn error(&self) -> Option<&ApiClientError> {
        self.error.as_ref()
    }

    /// Returns the body bytes, or the execution error.
    ///
    /// # Errors
    ///
    /// Returns the error of this execution, if any.
    pub fn bytes(&self) -> Result<&Bytes, &ApiClientError> {
        match &self.error {
            Some(error) => Err(error),
            None => Ok(&self.body),
        }
    }

    /// Returns a reader over the body bytes, or the execution error.
    ///
    /// # Errors
    ///
    /// Returns the error of this execution, if any.
    pub fn reader(&self) -> Result<Cursor<Bytes>, &ApiClientError> {
        self.bytes().map(|body| Cursor::new(body.clone()))
    }

    /// Returns the body as UTF-8 text.
    ///
    /// # Errors
    ///
    /// Returns [`ApiClientError::InvalidText`] if the body is not valid UTF-8.
    pub fn text(&self) -> Result<&str, ApiClientError> {
        std::str::from_utf8(&self.body).map_err(|error| ApiClientError::InvalidText { error })
    }

    /// Returns an error built from the status line.
    pub fn status_error(&self) -> ApiClientError {
        ApiClientError::StatusError {
            status: self.status_text(),
        }
    }

    /// Returns the execution error, if any.
    ///
    /// # Errors
    ///
    /// Returns the error of this execution.
    pub fn into_result(self) -> Result<Self, ApiClientError> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self),
        }
    }

    /// Returns the execution error, or a [`ApiClientError::StatusError`] for a non `2xx` status.
    ///
    /// # Errors
    ///
    /// Returns an error if the execution failed or the status is not a success.
    pub fn error_for_status(self) -> Result<Self, ApiClientError> {
        let result = self.into_result()?;
        if result.is_success() {
            Ok(result)
        } else {
            Err(result.status_error())
        }
    }

    /// Deserializes the JSON body.
    ///
    /// The status is not checked: an error payload can be decoded the same way.
    ///
    /// # Errors
    ///
    /// Returns the execution error, or [`ApiClientError::JsonError`] with the JSON path
    /// of the first mismatch.
    pub fn into_json<T>(self) -> Result<T, ApiClientError>
    where
        T: DeserializeOwned,
    {
        let result = self.into_result()?;
        let deserializer = &mut serde_json::Deserializer::from_slice(&result.body);
        serde_path_to_error::deserialize(deserializer).map_err(|err| ApiClientError::JsonError {
            path: err.path().to_string(),
            error: err.into_inner(),
            body: String::from_utf8_lossy(&result.body).into_owned(),
        })
    }
}

impl fmt::Display for CallResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.uri)?;
        if let Some(status) = self.status {
            write!(f, " {status}")?;
        }
        if let Some(error) = &self.error {
            write!(f, " ({error})")?;
        }
        Ok(())
    }
}
