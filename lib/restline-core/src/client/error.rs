use super::auth::AuthenticationError;
use super::transport::TransportError;

/// Errors that can occur when using the [`ApiClient`](super::ApiClient).
///
/// HTTP error status codes (4xx/5xx) are never reported through this type by the
/// executor: a received response is a completed exchange, inspect
/// [`CallResult::is_success`](super::CallResult::is_success) to classify it.
#[derive(Debug, derive_more::Error, derive_more::Display, derive_more::From)]
pub enum ApiClientError {
    /// The base URL given at construction time is missing, has no scheme or cannot be parsed.
    ///
    /// This is a configuration error: no request can be built from such a client.
    #[display("Invalid base URL '{url}': {reason}")]
    #[from(skip)]
    InvalidBaseUrl {
        /// The rejected base URL.
        url: String,
        /// Why the URL was rejected.
        reason: String,
    },

    /// URL parsing error when joining a group or a request path onto the base URL.
    UrlError(url::ParseError),

    /// HTTP protocol error from the http crate.
    ///
    /// Occurs when the final request cannot be assembled.
    HttpError(http::Error),

    /// The HTTP method is not a valid token.
    InvalidMethod(http::method::InvalidMethod),

    /// Invalid HTTP header name.
    InvalidHeaderName(http::header::InvalidHeaderName),

    /// Invalid HTTP header value.
    InvalidHeaderValue(http::header::InvalidHeaderValue),

    /// The body content type cannot be parsed as a media type.
    #[display("Invalid content type '{content_type}'")]
    #[from(skip)]
    InvalidContentType {
        /// The rejected content type.
        content_type: String,
    },

    /// JSON serialization error for request bodies.
    JsonValueError(serde_json::Error),

    /// Query parameter serialization error.
    QuerySerializationError(serde_urlencoded::ser::Error),

    /// Reading a body from a reader failed.
    IoError(std::io::Error),

    /// The authenticator refused to sign the request.
    AuthenticationError(AuthenticationError),

    /// The transport failed before any response was received.
    ///
    /// Network failures and timeouts enforced by the transport land here.
    TransportError(TransportError),

    /// The response body could not be fully read after a valid status line.
    #[display("Failed to read response body: {source}")]
    #[from(skip)]
    ResponseReadError {
        /// The underlying transport error.
        source: TransportError,
    },

    /// The call was cancelled by the caller.
    #[display("Request cancelled")]
    #[from(skip)]
    Cancelled,

    /// The caller deadline elapsed before the exchange completed.
    #[display("Request deadline exceeded")]
    #[from(skip)]
    DeadlineExceeded,

    /// JSON response deserialization failure.
    #[display("Failed to deserialize JSON at '{path}': {error}\n{body}")]
    #[from(skip)]
    JsonError {
        /// The JSON path where the error occurred.
        path: String,
        /// The underlying JSON parsing error.
        error: serde_json::Error,
        /// The response body that failed to parse.
        body: String,
    },

    /// The response body is not valid UTF-8 text.
    #[display("Response body is not valid UTF-8: {error}")]
    #[from(skip)]
    InvalidText {
        /// The underlying decoding error.
        error: std::str::Utf8Error,
    },

    /// Status line of a non successful response, see [`CallResult::status_error`](super::CallResult::status_error).
    #[display("{status}")]
    #[from(skip)]
    StatusError {
        /// The status line, e.g. `404 Not Found`.
        status: String,
    },
}

/// Coarse classification of an [`ApiClientError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or scheme-less base URL.
    Configuration,
    /// Malformed relative path passed to a group or request.
    UrlParse,
    /// The request could not be assembled (method, headers, body, signature).
    RequestConstruction,
    /// Network failure, timeout or cancellation before a response was received.
    Transport,
    /// The response body could not be read.
    ResponseRead,
    /// Errors raised while decoding or classifying a received response.
    Response,
}

impl ApiClientError {
    /// Returns the category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidBaseUrl { .. } => ErrorKind::Configuration,
            Self::UrlError(_) => ErrorKind::UrlParse,
            Self::HttpError(_)
            | Self::InvalidMethod(_)
            | Self::InvalidHeaderName(_)
            | Self::InvalidHeaderValue(_)
            | Self::InvalidContentType { .. }
            | Self::JsonValueError(_)
            | Self::QuerySerializationError(_)
            | Self::IoError(_)
            | Self::AuthenticationError(_) => ErrorKind::RequestConstruction,
            Self::TransportError(_) | Self::Cancelled | Self::DeadlineExceeded => {
                ErrorKind::Transport
            }
            Self::ResponseReadError { .. } => ErrorKind::ResponseRead,
            Self::JsonError { .. } | Self::InvalidText { .. } | Self::StatusError { .. } => {
                ErrorKind::Response
            }
        }
    }

    /// Returns `true` if the caller cancelled the call or its deadline elapsed.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled | Self::DeadlineExceeded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_client_error_is_send_and_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<ApiClientError>();
        assert_sync::<ApiClientError>();
    }

    #[test]
    fn test_error_kind_classification() {
        let error = ApiClientError::InvalidBaseUrl {
            url: "localhost".to_string(),
            reason: "missing scheme".to_string(),
        };
        assert_eq!(error.kind(), ErrorKind::Configuration);

        let error = ApiClientError::from(url::ParseError::InvalidPort);
        assert_eq!(error.kind(), ErrorKind::UrlParse);

        assert_eq!(ApiClientError::Cancelled.kind(), ErrorKind::Transport);
        assert!(ApiClientError::DeadlineExceeded.is_cancelled());
    }

    #[test]
    fn test_error_display() {
        let error = ApiClientError::InvalidBaseUrl {
            url: "api.example.com".to_string(),
            reason: "missing scheme".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Invalid base URL 'api.example.com': missing scheme"
        );

        let error = ApiClientError::StatusError {
            status: "404 Not Found".to_string(),
        };
        assert_eq!(error.to_string(), "404 Not Found");
    }
}
