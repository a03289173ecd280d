//! The network side of the client.
//!
//! A [`Transport`] sends one fully built request and hands back the response
//! status line, headers and a pending [`ResponseBody`]. TLS, timeouts, proxies
//! and connection pooling belong to the transport, not to the request builder.

use std::error::Error as StdError;
use std::fmt;
use std::future::Future;
use std::pin::Pin;

use bytes::Bytes;
use tracing::debug;

/// A boxed, sendable future.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Errors raised by a [`Transport`].
#[derive(Debug, derive_more::Error, derive_more::Display, derive_more::From)]
pub enum TransportError {
    /// HTTP client error from the underlying reqwest library.
    ReqwestError(reqwest::Error),

    /// Any other transport failure.
    #[from(skip)]
    #[error(ignore)]
    Other(Box<dyn StdError + Send + Sync>),
}

impl TransportError {
    /// Wraps any error as a transport error.
    pub fn other(error: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
        Self::Other(error.into())
    }

    /// Returns `true` if the transport gave up because of its own timeout.
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::ReqwestError(error) => error.is_timeout(),
            Self::Other(_) => false,
        }
    }
}

/// The not yet consumed body of a response.
///
/// The underlying resource (connection, stream) is released exactly once: when
/// the body is read with [`read`](Self::read) or when it is dropped.
pub struct ResponseBody {
    pending: BoxFuture<'static, Result<Bytes, TransportError>>,
}

impl ResponseBody {
    /// Creates a body from a future reading it entirely.
    pub fn new<F>(read: F) -> Self
    where
        F: Future<Output = Result<Bytes, TransportError>> + Send + 'static,
    {
        Self {
            pending: Box::pin(read),
        }
    }

    /// Creates an already available body.
    pub fn from_bytes(data: impl Into<Bytes>) -> Self {
        let data = data.into();
        Self::new(async move { Ok(data) })
    }

    /// Creates an empty body.
    pub fn empty() -> Self {
        Self::from_bytes(Bytes::new())
    }

    /// Reads the whole body into memory.
    ///
    /// # Errors
    ///
    /// Returns the transport error interrupting the read.
    pub async fn read(self) -> Result<Bytes, TransportError> {
        self.pending.await
    }
}

impl fmt::Debug for ResponseBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponseBody").finish_non_exhaustive()
    }
}

/// Capability to send HTTP requests.
///
/// The request URL is absolute. Implementations must honour cancellation by
/// drop: dropping the returned future (or the [`ResponseBody`]) aborts the call.
///
/// # Example
///
/// ```rust
/// use bytes::Bytes;
/// use restline_core::{BoxFuture, ResponseBody, Transport, TransportError};
///
/// #[derive(Debug)]
/// struct Teapot;
///
/// impl Transport for Teapot {
///     fn send(
///         &self,
///         _request: http::Request<Bytes>,
///     ) -> BoxFuture<'_, Result<http::Response<ResponseBody>, TransportError>> {
///         Box::pin(async {
///             http::Response::builder()
///                 .status(418)
///                 .body(ResponseBody::from_bytes("short and stout"))
///                 .map_err(TransportError::other)
///         })
///     }
/// }
/// ```
pub trait Transport: Send + Sync + fmt::Debug {
    /// Sends the request and returns the response with a pending body.
    fn send(
        &self,
        request: http::Request<Bytes>,
    ) -> BoxFuture<'_, Result<http::Response<ResponseBody>, TransportError>>;
}

/// Default [`Transport`] backed by a [`reqwest::Client`].
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Uses an already configured reqwest client (TLS, timeouts, proxies, ...).
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Returns the underlying reqwest client.
    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }
}

impl From<reqwest::Client> for ReqwestTransport {
    fn from(client: reqwest::Client) -> Self {
        Self::new(client)
    }
}

impl Transport for ReqwestTransport {
    fn send(
        &self,
        request: http::Request<Bytes>,
    ) -> BoxFuture<'_, Result<http::Response<ResponseBody>, TransportError>> {
        Box::pin(async move {
            let request = reqwest::Request::try_from(request)?;
            let response = self.client.execute(request).await?;
            debug!(status = %response.status(), url = %response.url(), "reqwest response");

            let mut builder = http::Response::builder()
                .status(response.status())
                .version(response.version());
            if let Some(headers) = builder.headers_mut() {
                headers.extend(response.headers().clone());
            }
            let body = ResponseBody::new(async move { response.bytes().await.map_err(TransportError::from) });

            builder.body(body).map_err(TransportError::other)
        })
    }
}
