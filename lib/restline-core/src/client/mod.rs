use std::sync::Arc;

use bytes::Bytes;
use http::Method;
use http::header::HOST;
use http::uri::PathAndQuery;
use ::url::Url;
use tracing::debug;

mod builder;
pub use self::builder::{ApiClientBuilder, OnRequest};

mod call;
pub use self::call::ApiCall;

mod parameters;
pub use self::parameters::{CallBody, CallHeaders, CallParams, CallQuery, ParamValue};

mod auth;
use self::auth::CallAuth;
pub use self::auth::{
    Authentication, AuthenticationError, Authenticator, PrepareAuth, SecureString,
};

mod url;
pub use self::url::join_group;

mod transport;
pub use self::transport::{BoxFuture, ReqwestTransport, ResponseBody, Transport, TransportError};

mod result;
pub use self::result::CallResult;

mod error;
pub use self::error::{ApiClientError, ErrorKind};

/// HTTP client bound to a base URL.
///
/// An `ApiClient` is a cheap to clone handle: the transport and the request hook
/// are shared. It creates [`ApiCall`]s whose URI is joined onto the base URL when
/// the call is finalized.
///
/// # Example
///
/// ```rust,no_run
/// use restline_core::ApiClient;
/// # use serde::Deserialize;
/// # #[derive(Deserialize)]
/// # struct User { id: u32, name: String }
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let client = ApiClient::new("https://api.example.com")?;
/// let users = client.group("/v1/users")?;
///
/// let user: User = users.get("/123").await.into_json()?;
/// # Ok(())
/// # }
/// ```
///
/// # Thread Safety
///
/// `ApiClient` is `Send + Sync`; calls created from the same client can run concurrently.
#[derive(Clone, derive_more::Debug)]
pub struct ApiClient {
    base: Url,
    transport: Arc<dyn Transport>,
    #[debug(skip)]
    auth: Option<CallAuth>,
    #[debug(skip)]
    on_request: Option<OnRequest>,
}

// Create
impl ApiClient {
    /// Creates a client for `base_url` with the default [`ReqwestTransport`].
    ///
    /// # Errors
    ///
    /// Returns [`ApiClientError::InvalidBaseUrl`] if the URL is empty, has no
    /// scheme or no host.
    pub fn new(base_url: &str) -> Result<Self, ApiClientError> {
        Self::builder().with_base_url(base_url).build()
    }

    /// Returns a builder to configure the client.
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::default()
    }

    /// Returns a client whose base is `path` joined onto this client base.
    ///
    /// The transport, authentication and request hook are shared with this client.
    ///
    /// # Example
    ///
    /// ```rust
    /// use restline_core::ApiClient;
    ///
    /// # fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let client = ApiClient::new("https://api.example.com?tenant=acme")?;
    /// let v1 = client.group("/v1")?;
    /// assert_eq!(v1.base_url().as_str(), "https://api.example.com/v1?tenant=acme");
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`ApiClientError::UrlError`] if `path` is not a valid URL reference.
    pub fn group(&self, path: &str) -> Result<Self, ApiClientError> {
        let base = join_group(&self.base, path)?;
        Ok(Self {
            base,
            ..self.clone()
        })
    }
}

// Configuration
impl ApiClient {
    /// Returns the base URL of the client.
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Replaces the transport of this client.
    ///
    /// Clones and groups created earlier keep the previous transport.
    pub fn use_transport<T>(&mut self, transport: T)
    where
        T: Transport + 'static,
    {
        self.transport = Arc::new(transport);
    }

    /// Returns the transport used by this client.
    pub fn transport(&self) -> Arc<dyn Transport> {
        Arc::clone(&self.transport)
    }
}

// Calls
impl ApiClient {
    /// Creates a call with any method.
    ///
    /// The default authentication is attached, then the request hook, if any, runs.
    pub fn call(&self, method: Method, uri: impl Into<String>) -> ApiCall {
        let uri = uri.into();
        let mut call = ApiCall::build(self.clone(), method.clone(), uri.clone());
        call.auth.clone_from(&self.auth);

        match &self.on_request {
            Some(on_request) => on_request(call, &method, &uri),
            None => call,
        }
    }

    /// Creates a call with a method given by name, e.g. `PROPFIND`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiClientError::InvalidMethod`] if `method` is not a valid token.
    pub fn custom(&self, method: &str, uri: impl Into<String>) -> Result<ApiCall, ApiClientError> {
        let method = Method::from_bytes(method.as_bytes())?;
        Ok(self.call(method, uri))
    }

    pub fn get(&self, uri: impl Into<String>) -> ApiCall {
        self.call(Method::GET, uri)
    }

    pub fn post(&self, uri: impl Into<String>) -> ApiCall {
        self.call(Method::POST, uri)
    }

    pub fn put(&self, uri: impl Into<String>) -> ApiCall {
        self.call(Method::PUT, uri)
    }

    pub fn patch(&self, uri: impl Into<String>) -> ApiCall {
        self.call(Method::PATCH, uri)
    }

    pub fn delete(&self, uri: impl Into<String>) -> ApiCall {
        self.call(Method::DELETE, uri)
    }

    pub fn head(&self, uri: impl Into<String>) -> ApiCall {
        self.call(Method::HEAD, uri)
    }
}

// Forward
impl ApiClient {
    /// Relays an incoming request to the same path and query under the client base.
    ///
    /// Method, headers and body are kept, except `Host` which is set by the
    /// transport for the upstream server. The request hook and the default
    /// authentication are not applied. The whole upstream response is returned,
    /// whatever its status, for the caller to copy into its own response.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use bytes::Bytes;
    /// use restline_core::ApiClient;
    ///
    /// # async fn example(incoming: http::Request<Bytes>) -> Result<(), Box<dyn std::error::Error>> {
    /// let upstream = ApiClient::new("http://10.0.0.12:8080")?.group("/internal")?;
    ///
    /// // GET /reports?year=2024 is sent to http://10.0.0.12:8080/internal/reports?year=2024
    /// let response = upstream.forward(incoming).await?;
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an error if the target cannot be joined, the transport fails or
    /// the upstream body cannot be read.
    pub async fn forward(
        &self,
        request: http::Request<Bytes>,
    ) -> Result<http::Response<Bytes>, ApiClientError> {
        let (parts, body) = request.into_parts();
        let target = parts
            .uri
            .path_and_query()
            .map_or("/", PathAndQuery::as_str);
        let url = join_group(&self.base, target)?;

        let mut request = http::Request::builder()
            .method(parts.method)
            .uri(url.as_str())
            .body(body)?;
        *request.headers_mut() = parts.headers;
        request.headers_mut().remove(HOST);

        debug!(?request, "forwarding...");
        let response = self.transport.send(request).await?;
        debug!(?response, "...forwarded");

        let (parts, body) = response.into_parts();
        let body = body
            .read()
            .await
            .map_err(|source| ApiClientError::ResponseReadError { source })?;

        Ok(http::Response::from_parts(parts, body))
    }
}
