use http::Method;

use super::ApiClient;
use super::auth::CallAuth;
use super::{CallBody, CallHeaders, CallParams, CallQuery};

mod builder;
mod execution;
mod finalize;
#[cfg(test)]
mod tests;

/// A single HTTP request under construction.
///
/// `ApiCall` is created by the [`ApiClient`] entry points and configured with a
/// fluent interface. Nothing is validated until the call is finalized, so the
/// builder methods never fail except when serializing a body.
///
/// # Method Groups
///
/// ## Parameter Methods
/// - [`with_param(name, value)`](Self::with_param) - Method dependent parameter (query or JSON body)
/// - [`with_query_param(name, value)`](Self::with_query_param) - Explicit query parameter
/// - [`with_header(name, value)`](Self::with_header) - Append a header
/// - [`with_headers(headers)`](Self::with_headers) - Replace all headers
///
/// ## Request Body Methods
/// - [`json(data)`](Self::json) - JSON request body
/// - [`form(data)`](Self::form) - Form-encoded request body
/// - [`text(content)`](Self::text) - Plain text request body
/// - [`raw(bytes, content_type)`](Self::raw) - Raw request body
/// - [`reader(reader, content_type)`](Self::reader) - Body read from any [`std::io::Read`]
/// - [`with_body(body)`](Self::with_body) - Prepared [`CallBody`]
///
/// ## Authentication
/// - [`with_auth(authenticator)`](Self::with_auth) - Sign the final request
/// - [`with_preparing_auth(authenticator)`](Self::with_preparing_auth) - Also add parameters before signing
/// - [`with_bearer_token(token)`](Self::with_bearer_token) - `Authorization: Bearer <token>`
///
/// ## Finalization and Execution
/// - [`http_request()`](Self::http_request) - Build the exact request that would be sent
/// - `.await` / [`exchange()`](Self::exchange) - Send the request
/// - [`exchange_until(signal)`](Self::exchange_until) - Send, abort when `signal` completes
/// - [`exchange_with_timeout(duration)`](Self::exchange_with_timeout) - Send with a deadline
///
/// # Parameters placement
///
/// Parameters set with [`with_param`](Self::with_param) go to the JSON body for
/// `PUT`, `POST` and `PATCH`, and to the query string for every other method.
/// An explicit body takes precedence over body parameters.
///
/// # Example
///
/// ```rust,no_run
/// use restline_core::ApiClient;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = ApiClient::new("https://api.example.com")?.group("/v1")?;
///
/// let result = client
///     .post("/orders")
///     .with_param("qty", 3)
///     .with_bearer_token("my-token")
///     .await;
/// assert!(result.is_success());
/// # Ok(())
/// # }
/// ```
#[derive(Clone, derive_more::Debug)]
pub struct ApiCall {
    #[debug(skip)]
    pub(super) client: ApiClient,

    pub(super) method: Method,
    pub(super) uri: String,
    pub(super) params: CallParams,
    pub(super) query: CallQuery,
    pub(super) headers: CallHeaders,

    pub(super) body: Option<CallBody>,

    #[debug(skip)]
    pub(super) auth: Option<CallAuth>,
}

impl ApiCall {
    pub(in crate::client) fn build(client: ApiClient, method: Method, uri: impl Into<String>) -> Self {
        Self {
            client,
            method,
            uri: uri.into(),
            params: CallParams::default(),
            query: CallQuery::default(),
            headers: CallHeaders::default(),
            body: None,
            auth: None,
        }
    }

    /// Returns the HTTP method of the call.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the URI relative to the client base, as given at creation.
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Returns the method dependent parameters.
    pub fn params(&self) -> &CallParams {
        &self.params
    }

    /// Returns the explicit query parameters.
    pub fn query(&self) -> &CallQuery {
        &self.query
    }

    /// Returns the headers set so far.
    pub fn headers(&self) -> &CallHeaders {
        &self.headers
    }

    /// Returns the explicit body, if any.
    pub fn body(&self) -> Option<&CallBody> {
        self.body.as_ref()
    }

    /// Returns the client this call was created from.
    pub fn client(&self) -> &ApiClient {
        &self.client
    }
}
