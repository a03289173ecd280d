use std::sync::Arc;

use ::url::{ParseError, Url};
use http::Method;
use http::uri::Scheme;

use super::auth::{Authentication, CallAuth};
use super::{ApiCall, ApiClient, ApiClientError, ReqwestTransport, Transport, join_group};

/// Hook run on every call created by a client, before it is returned to the caller.
///
/// It receives the new call, its method and its URI as given to the entry point.
pub type OnRequest = Arc<dyn Fn(ApiCall, &Method, &str) -> ApiCall + Send + Sync>;

/// Builder for creating `ApiClient` instances.
///
/// The base URL is given either whole with [`with_base_url`](Self::with_base_url),
/// or piecewise with [`with_scheme`](Self::with_scheme), [`with_host`](Self::with_host)
/// and [`with_port`](Self::with_port). A [`with_base_path`](Self::with_base_path) is
/// joined onto it in both cases.
///
/// # Default Configuration
///
/// - **Scheme**: HTTP
/// - **Host**: 127.0.0.1 (localhost)
/// - **Port**: scheme default
/// - **Transport**: [`ReqwestTransport`] over a default `reqwest::Client`
/// - **Authentication**: None
///
/// # Example
///
/// ```rust
/// use restline_core::{ApiClient, Authentication};
/// use http::uri::Scheme;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = ApiClient::builder()
///     .with_scheme(Scheme::HTTPS)
///     .with_host("api.example.com")
///     .with_base_path("/v1")
///     .with_authentication(Authentication::Bearer("my-token".into()))
///     .on_request(|call, _method, _uri| call.with_header("User-Agent", "restline"))
///     .build()?;
///
/// assert_eq!(client.base_url().as_str(), "https://api.example.com/v1");
/// # Ok(())
/// # }
/// ```
#[derive(Clone, derive_more::Debug)]
pub struct ApiClientBuilder {
    base_url: Option<String>,
    scheme: Scheme,
    host: String,
    port: Option<u16>,
    base_path: Option<String>,
    transport: Option<Arc<dyn Transport>>,
    authentication: Option<Authentication>,
    #[debug(skip)]
    on_request: Option<OnRequest>,
}

impl Default for ApiClientBuilder {
    fn default() -> Self {
        Self {
            base_url: None,
            scheme: Scheme::HTTP,
            host: "127.0.0.1".to_string(),
            port: None,
            base_path: None,
            transport: None,
            authentication: None,
            on_request: None,
        }
    }
}

impl ApiClientBuilder {
    /// Builds the final `ApiClient` instance with all configured settings.
    ///
    /// # Errors
    ///
    /// Returns [`ApiClientError::InvalidBaseUrl`] if the base URL is empty, has no
    /// scheme or no host, and [`ApiClientError::UrlError`] if the base path cannot
    /// be joined onto it.
    pub fn build(self) -> Result<ApiClient, ApiClientError> {
        let Self {
            base_url,
            scheme,
            host,
            port,
            base_path,
            transport,
            authentication,
            on_request,
        } = self;

        let base_url = base_url.unwrap_or_else(|| match port {
            Some(port) => format!("{scheme}://{host}:{port}"),
            None => format!("{scheme}://{host}"),
        });
        let mut base = parse_base_url(&base_url)?;
        if let Some(path) = &base_path {
            base = join_group(&base, path)?;
        }

        let transport = transport.unwrap_or_else(|| Arc::new(ReqwestTransport::default()));
        let auth = authentication.map(|auth| CallAuth::Plain(Arc::new(auth)));

        Ok(ApiClient {
            base,
            transport,
            auth,
            on_request,
        })
    }

    /// Sets the whole base URL, e.g. `https://api.example.com/v1?tenant=acme`.
    ///
    /// It takes precedence over the scheme, host and port. Its query is sent with
    /// every request.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Sets the HTTP scheme (protocol) for the API client.
    ///
    /// # Default
    ///
    /// If not specified, defaults to `Scheme::HTTP`.
    pub fn with_scheme(mut self, scheme: Scheme) -> Self {
        self.scheme = scheme;
        self
    }

    /// Sets the hostname for the API client.
    ///
    /// # Example
    ///
    /// ```rust
    /// use restline_core::ApiClient;
    ///
    /// # fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let client = ApiClient::builder()
    ///     .with_host("192.168.1.10")
    ///     .with_port(8080)
    ///     .build()?;
    /// assert_eq!(client.base_url().as_str(), "http://192.168.1.10:8080/");
    /// # Ok(())
    /// # }
    /// ```
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Sets the port number for the API client.
    ///
    /// # Default
    ///
    /// If not specified, the scheme default port is used.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Sets a base path joined onto the base URL, like [`ApiClient::group`].
    pub fn with_base_path(mut self, base_path: impl Into<String>) -> Self {
        self.base_path = Some(base_path.into());
        self
    }

    /// Sets the transport used to send requests.
    pub fn with_transport<T>(mut self, transport: T) -> Self
    where
        T: Transport + 'static,
    {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Sends requests with an already configured reqwest client (TLS, timeouts, proxies, ...).
    ///
    /// # Example
    ///
    /// ```rust
    /// use std::time::Duration;
    /// use restline_core::ApiClient;
    ///
    /// # fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let reqwest_client = reqwest::Client::builder()
    ///     .timeout(Duration::from_secs(30))
    ///     .build()?;
    ///
    /// let client = ApiClient::builder()
    ///     .with_base_url("http://localhost:8080")
    ///     .with_reqwest_client(reqwest_client)
    ///     .build()?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn with_reqwest_client(self, client: reqwest::Client) -> Self {
        self.with_transport(ReqwestTransport::new(client))
    }

    /// Sets the default authentication of every call created by the client.
    ///
    /// A call can still replace it with [`ApiCall::with_auth`] or drop it with
    /// [`ApiCall::without_auth`].
    pub fn with_authentication(mut self, authentication: Authentication) -> Self {
        self.authentication = Some(authentication);
        self
    }

    /// Sets the hook run on every call created by the client and its groups.
    pub fn on_request<F>(mut self, on_request: F) -> Self
    where
        F: Fn(ApiCall, &Method, &str) -> ApiCall + Send + Sync + 'static,
    {
        self.on_request = Some(Arc::new(on_request));
        self
    }
}

fn parse_base_url(base_url: &str) -> Result<Url, ApiClientError> {
    let invalid = |reason: &str| ApiClientError::InvalidBaseUrl {
        url: base_url.to_string(),
        reason: reason.to_string(),
    };

    if base_url.trim().is_empty() {
        return Err(invalid("empty URL"));
    }

    let url = Url::parse(base_url).map_err(|err| match err {
        ParseError::RelativeUrlWithoutBase => invalid("missing scheme"),
        err => invalid(&err.to_string()),
    })?;
    if url.cannot_be_a_base() || !url.has_host() {
        return Err(invalid("missing host"));
    }

    Ok(url)
}
