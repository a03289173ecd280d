use std::fmt;
use std::sync::Arc;

use http::{HeaderValue, Method};
use reqwest::header::{AUTHORIZATION, HeaderName};
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::{ApiCall, CallHeaders};

/// Errors that can occur during authentication processing.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Error, derive_more::Display)]
pub enum AuthenticationError {
    /// Bearer token contains invalid characters for HTTP headers.
    #[display("Bearer token contains invalid characters: {message}")]
    InvalidBearerToken {
        /// Description of the invalid characters or format issue.
        message: String,
    },

    /// Basic authentication username contains invalid characters.
    #[display("Basic auth username contains invalid characters: {message}")]
    InvalidUsername {
        /// Description of the invalid characters or format issue.
        message: String,
    },

    /// Basic authentication password contains invalid characters.
    #[display("Basic auth password contains invalid characters: {message}")]
    InvalidPassword {
        /// Description of the invalid characters or format issue.
        message: String,
    },

    /// API key header name is invalid.
    #[display("Invalid API key header name '{header_name}': {message}")]
    InvalidHeaderName {
        /// The invalid header name that was provided.
        header_name: String,
        /// Description of why the header name is invalid.
        message: String,
    },

    /// API key value contains invalid characters for HTTP headers.
    #[display("API key contains invalid characters: {message}")]
    InvalidApiKey {
        /// Description of the invalid characters or format issue.
        message: String,
    },

    /// A custom authenticator could not sign the request.
    #[display("Signing failed: {message}")]
    SigningFailed {
        /// Description of the signing failure.
        message: String,
    },
}

/// Signs or stamps a request right before it is sent.
///
/// The authenticator is invoked once per finalization, after the URL and body are
/// fully resolved. `uri` is the final path followed by `?query` when the query is
/// not empty, `body` the exact bytes that will be transmitted. Only the headers
/// can be changed at this point.
///
/// # Example
///
/// ```rust
/// use http::Method;
/// use restline_core::{AuthenticationError, Authenticator, CallHeaders};
///
/// #[derive(Debug)]
/// struct Stamp;
///
/// impl Authenticator for Stamp {
///     fn authenticate(
///         &self,
///         headers: &mut CallHeaders,
///         method: &Method,
///         uri: &str,
///         body: &[u8],
///     ) -> Result<(), AuthenticationError> {
///         headers.set("X-Stamp", format!("{method} {uri} {}", body.len()));
///         Ok(())
///     }
/// }
/// ```
pub trait Authenticator: Send + Sync + fmt::Debug {
    /// Adds the authentication headers for the given final request line and body.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be signed.
    fn authenticate(
        &self,
        headers: &mut CallHeaders,
        method: &Method,
        uri: &str,
        body: &[u8],
    ) -> Result<(), AuthenticationError>;
}

/// Lets an authenticator touch the call before its URL and body are resolved.
///
/// Use it to inject parameters that must be covered by the signature, like a
/// nonce or a timestamp. Register such authenticators with
/// [`ApiCall::with_preparing_auth`].
pub trait PrepareAuth: Send + Sync {
    /// Returns the call with the authentication parameters added.
    fn prepare_auth(&self, call: ApiCall) -> ApiCall;
}

pub(in crate::client) trait PreparingAuthenticator: Authenticator + PrepareAuth {}

impl<T> PreparingAuthenticator for T where T: Authenticator + PrepareAuth {}

/// The authenticator attached to a call.
#[derive(Clone, Debug)]
pub(in crate::client) enum CallAuth {
    Plain(Arc<dyn Authenticator>),
    Preparing(Arc<dyn PreparingAuthenticator>),
}

impl CallAuth {
    pub(in crate::client) fn prepare(&self, call: ApiCall) -> ApiCall {
        match self {
            Self::Plain(_) => call,
            Self::Preparing(auth) => auth.prepare_auth(call),
        }
    }

    pub(in crate::client) fn authenticate(
        &self,
        headers: &mut CallHeaders,
        method: &Method,
        uri: &str,
        body: &[u8],
    ) -> Result<(), AuthenticationError> {
        match self {
            Self::Plain(auth) => auth.authenticate(headers, method, uri, body),
            Self::Preparing(auth) => auth.authenticate(headers, method, uri, body),
        }
    }
}

/// Secure wrapper for sensitive string data that automatically zeroes memory on drop.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SecureString(String);

impl SecureString {
    /// Creates a new secure string from the provided value.
    pub fn new(value: String) -> Self {
        Self(value)
    }

    /// Returns a reference to the inner string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `SecureString` and returns the inner String.
    pub fn into_string(mut self) -> String {
        std::mem::take(&mut self.0)
    }

    fn mask_sensitive(value: &str) -> String {
        if value.len() <= 8 {
            "***".to_string()
        } else {
            let head = value.get(..4).unwrap_or_default();
            let tail = value.get(value.len() - 4..).unwrap_or_default();
            format!("{head}...{tail}")
        }
    }
}

impl fmt::Debug for SecureString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecureString")
            .field("value", &"[REDACTED]")
            .finish()
    }
}

impl fmt::Display for SecureString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Self::mask_sensitive(&self.0))
    }
}

impl From<String> for SecureString {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for SecureString {
    fn from(value: &str) -> Self {
        Self::new(value.to_string())
    }
}

impl Serialize for SecureString {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SecureString {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        String::deserialize(deserializer).map(Self::new)
    }
}

/// Built-in static credentials.
///
/// These authenticators only set a header: they do not depend on the request
/// line or the body.
///
/// # Examples
///
/// ```rust
/// use restline_core::Authentication;
///
/// // Adds `Authorization: Bearer my-api-token`
/// let auth = Authentication::Bearer("my-api-token".into());
///
/// // Adds `Authorization: Basic dXNlcjpwYXNz`
/// let auth = Authentication::Basic {
///     username: "user".to_string(),
///     password: "pass".into(),
/// };
///
/// // Adds `X-API-Key: secret-key`
/// let auth = Authentication::ApiKey {
///     header_name: "X-API-Key".to_string(),
///     key: "secret-key".into(),
/// };
/// ```
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Authentication {
    /// Bearer token authentication (RFC 6750).
    /// Adds `Authorization: Bearer <token>` header.
    Bearer(SecureString),

    /// HTTP Basic authentication (RFC 7617).
    /// Adds `Authorization: Basic <base64(username:password)>` header.
    Basic {
        /// The username for Basic authentication.
        username: String,
        /// The password for Basic authentication.
        password: SecureString,
    },

    /// API key authentication with custom header.
    /// Adds `<header_name>: <key>` header.
    ApiKey {
        /// The header name for the API key.
        header_name: String,
        /// The API key value.
        key: SecureString,
    },
}

impl Authentication {
    /// Converts the authentication into an HTTP header.
    ///
    /// # Errors
    ///
    /// Returns `AuthenticationError` if the authentication data contains invalid characters
    /// or cannot be properly formatted for HTTP headers.
    pub fn to_header(&self) -> Result<(HeaderName, HeaderValue), AuthenticationError> {
        match self {
            Authentication::Bearer(token) => {
                let header_value = format!("Bearer {}", token.as_str());
                let value = HeaderValue::from_str(&header_value).map_err(|e| {
                    AuthenticationError::InvalidBearerToken {
                        message: e.to_string(),
                    }
                })?;
                Ok((AUTHORIZATION, value))
            }

            Authentication::Basic { username, password } => {
                if username.contains(':') {
                    return Err(AuthenticationError::InvalidUsername {
                        message: "Username cannot contain colon (:) character".to_string(),
                    });
                }

                use base64::Engine;
                let credentials_str = format!("{}:{}", username, password.as_str());
                let credentials = base64::engine::general_purpose::STANDARD.encode(credentials_str);

                let header_value = format!("Basic {credentials}");
                let value = HeaderValue::from_str(&header_value).map_err(|e| {
                    AuthenticationError::InvalidPassword {
                        message: e.to_string(),
                    }
                })?;
                Ok((AUTHORIZATION, value))
            }

            Authentication::ApiKey { header_name, key } => {
                let header = HeaderName::from_bytes(header_name.as_bytes()).map_err(|e| {
                    AuthenticationError::InvalidHeaderName {
                        header_name: header_name.clone(),
                        message: e.to_string(),
                    }
                })?;
                let value = HeaderValue::from_str(key.as_str()).map_err(|e| {
                    AuthenticationError::InvalidApiKey {
                        message: e.to_string(),
                    }
                })?;
                Ok((header, value))
            }
        }
    }
}

impl Authenticator for Authentication {
    fn authenticate(
        &self,
        headers: &mut CallHeaders,
        _method: &Method,
        _uri: &str,
        _body: &[u8],
    ) -> Result<(), AuthenticationError> {
        let (name, value) = self.to_header()?;
        // `to_header` only builds values from `&str`, so they are valid UTF-8
        let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
        headers.set(name.as_str(), value);
        Ok(())
    }
}

impl fmt::Debug for Authentication {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bearer(_) => f.debug_tuple("Bearer").field(&"[REDACTED]").finish(),
            Self::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"[REDACTED]")
                .finish(),
            Self::ApiKey { header_name, .. } => f
                .debug_struct("ApiKey")
                .field("header_name", header_name)
                .field("key", &"[REDACTED]")
                .finish(),
        }
    }
}

impl fmt::Display for Authentication {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bearer(token) => write!(f, "Bearer {token}"),
            Self::Basic { username, .. } => write!(f, "Basic (username: {username})"),
            Self::ApiKey { header_name, key } => write!(f, "ApiKey ({header_name}: {key})"),
        }
    }
}
