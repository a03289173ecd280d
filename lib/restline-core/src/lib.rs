//! # Restline Core
//!
//! Fluent HTTP requests against a REST API rooted at a base URL.
//!
//! - **[`ApiClient`]** - A base URL, a transport and an optional request hook; groups share them
//! - **[`ApiCall`]** - Request builder: parameters, query, headers, body and authenticator
//! - **[`CallResult`]** - Status, headers and body of an execution, or why there is none
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use restline_core::ApiClient;
//! # use serde::Deserialize;
//! # #[derive(Deserialize)]
//! # struct User { id: u32, name: String }
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ApiClient::new("https://api.example.com")?;
//! let v1 = client.group("/v1")?;
//!
//! // GET https://api.example.com/v1/users/123
//! let result = v1.get("/users/123").await;  // ← Direct await using IntoFuture
//! if result.is_success() {
//!     let user: User = result.into_json()?;
//! }
//!
//! // POST https://api.example.com/v1/orders with body {"qty":3}
//! let result = v1.post("/orders").with_param("qty", 3).await;
//! # Ok(())
//! # }
//! ```
//!
//! ## URL Composition
//!
//! Every request URI, and every group path, is joined onto the base URL with
//! [`join_group`]: exactly one `/` between the base path and the relative path,
//! base query first then the relative query, scheme and host always from the base.
//!
//! ```text
//! https://api.example.com/v1?k=v  +  /users?active=true  →  https://api.example.com/v1/users?k=v&active=true
//! https://api.example.com/v1      +  https://other.example.com/users  →  https://api.example.com/v1/users
//! ```
//!
//! ## Parameters
//!
//! [`ApiCall::with_param`] is method dependent: `PUT`, `POST` and `PATCH` send the
//! parameters as a JSON object body, every other method appends them to the
//! query string. [`ApiCall::with_query_param`] always targets the query string, and an
//! explicit body ([`ApiCall::json`], [`ApiCall::form`], [`ApiCall::raw`], ...) takes
//! precedence over body parameters.
//!
//! ## Authentication
//!
//! An [`Authenticator`] signs the final request: it receives the method, the
//! final `path?query` and the exact body bytes, and may only change headers.
//! Implement [`PrepareAuth`] as well to add parameters (nonce, timestamp) before
//! the URL and body are resolved, and register it with [`ApiCall::with_preparing_auth`].
//!
//! ```rust
//! use http::Method;
//! use restline_core::{ApiCall, ApiClient, AuthenticationError, Authenticator, CallHeaders, PrepareAuth};
//!
//! #[derive(Debug)]
//! struct Signer;
//!
//! impl PrepareAuth for Signer {
//!     fn prepare_auth(&self, call: ApiCall) -> ApiCall {
//!         call.with_query_param("nonce", 42)
//!     }
//! }
//!
//! impl Authenticator for Signer {
//!     fn authenticate(
//!         &self,
//!         headers: &mut CallHeaders,
//!         method: &Method,
//!         uri: &str,
//!         body: &[u8],
//!     ) -> Result<(), AuthenticationError> {
//!         headers.set("X-Signature", format!("{method} {uri} {}", body.len()));
//!         Ok(())
//!     }
//! }
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ApiClient::new("https://api.example.com")?;
//! let request = client.get("/wallet").with_preparing_auth(Signer).http_request()?;
//! assert_eq!(request.headers()["x-signature"], "GET /wallet?nonce=42 0");
//! # Ok(())
//! # }
//! ```
//!
//! ## Execution and Cancellation
//!
//! Executing a call never fails: a [`CallResult`] is always produced. A response
//! with a `4xx`/`5xx` status is a completed exchange, and [`CallResult::error`] is
//! only set when no response (or no complete body) was received.
//!
//! - `.await` / [`ApiCall::exchange`] - run to completion, dropping the future aborts
//! - [`ApiCall::exchange_until`] - abort when a signal future completes
//! - [`ApiCall::exchange_with_timeout`] - abort after a deadline
//!
//! ## Transport
//!
//! Requests are sent through a [`Transport`]; the default [`ReqwestTransport`]
//! wraps a `reqwest::Client` which owns TLS, timeouts, proxies and pooling.
//!
//! HTTPS needs a TLS backend in reqwest, selected with a crate feature:
//!
//! - `rustls` (default) - `reqwest/rustls`
//! - `native-tls` - `reqwest/native-tls`, the platform TLS library
//!
//! With `default-features = false` and neither feature, only `http://` URLs can be reached
//! by the default transport.
//!
//! ## Error Handling
//!
//! - [`ApiClientError`] - every failure, classified with [`ApiClientError::kind`]
//! - [`AuthenticationError`] - invalid credentials or signing failure
//! - [`TransportError`] - network failure reported by a [`Transport`]
//!
//! ## Re-exports
//!
//! All commonly used types are re-exported from the crate root for convenience.

mod client;

// Public API - only expose user-facing types and functions
pub use self::client::{
    ApiCall, ApiClient, ApiClientBuilder, ApiClientError, Authentication, AuthenticationError,
    Authenticator, BoxFuture, CallBody, CallHeaders, CallParams, CallQuery, CallResult, ErrorKind,
    OnRequest, ParamValue, PrepareAuth, ReqwestTransport, ResponseBody, SecureString, Transport,
    TransportError, join_group,
};
