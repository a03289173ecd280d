use std::io::Read;
use std::sync::Arc;

use bytes::Bytes;
use headers::ContentType;
use http::header::AUTHORIZATION;
use serde::Serialize;

use super::ApiCall;
use crate::client::auth::{Authenticator, CallAuth, PrepareAuth};
use crate::client::{ApiClientError, CallBody, CallHeaders, CallQuery, ParamValue};

impl ApiCall {
    // =============================================================================
    // Parameters Methods
    // =============================================================================

    /// Sets a method dependent parameter, replacing any previous value.
    ///
    /// The parameter lands in the JSON body for `PUT`, `POST` and `PATCH`, and in
    /// the query string for every other method.
    ///
    /// A name is unique among parameters only. In the query string it is appended
    /// after the URI query and the explicit query, which may already carry the same
    /// key: `get("/users?page=1").with_query_param("page", 2).with_param("page", 3)`
    /// sends `?page=1&page=2&page=3`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use restline_core::ApiClient;
    /// # fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let client = ApiClient::new("https://api.example.com")?;
    ///
    /// let request = client.get("/users").with_param("page", 2).http_request()?;
    /// assert_eq!(request.uri(), "https://api.example.com/users?page=2");
    ///
    /// let request = client.post("/orders").with_param("qty", 3).http_request()?;
    /// assert_eq!(request.body().as_ref(), br#"{"qty":3}"#);
    /// # Ok(())
    /// # }
    /// ```
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.params.set(name, value);
        self
    }

    /// Removes a method dependent parameter.
    pub fn without_param(mut self, name: &str) -> Self {
        self.params.remove(name);
        self
    }

    /// Sets an explicit query parameter, whatever the method.
    ///
    /// Explicit query parameters come after the query of the request URI and
    /// before the method dependent parameters.
    pub fn with_query_param(
        mut self,
        name: impl Into<String>,
        value: impl Into<ParamValue>,
    ) -> Self {
        self.query.set(name, value);
        self
    }

    /// Removes an explicit query parameter.
    pub fn without_query_param(mut self, name: &str) -> Self {
        self.query.remove(name);
        self
    }

    /// Merges explicit query parameters into the call.
    pub fn with_query(mut self, query: CallQuery) -> Self {
        self.query = std::mem::take(&mut self.query).merge(query);
        self
    }

    /// Appends a header, keeping any previous value with the same name.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use restline_core::ApiClient;
    /// # fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let client = ApiClient::new("https://api.example.com")?;
    /// let request = client
    ///     .get("/users")
    ///     .with_header("Accept", "application/json")
    ///     .with_header("X-Request-ID", "abc-123")
    ///     .http_request()?;
    /// assert_eq!(request.headers()["x-request-id"], "abc-123");
    /// # Ok(())
    /// # }
    /// ```
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.headers.append(name, value);
        self
    }

    /// Replaces all the headers of the call.
    pub fn with_headers(mut self, headers: CallHeaders) -> Self {
        self.headers = headers;
        self
    }

    /// Removes every value of a header.
    pub fn without_header(mut self, name: &str) -> Self {
        self.headers.remove(name);
        self
    }

    // =============================================================================
    // Request Body Methods
    // =============================================================================

    /// Sets the request body, taking precedence over body parameters.
    ///
    /// The body is only sent for `PUT`, `POST` and `PATCH`.
    pub fn with_body(mut self, body: CallBody) -> Self {
        self.body = Some(body);
        self
    }

    /// Sets a JSON body.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be serialized.
    pub fn json<T>(self, t: &T) -> Result<Self, ApiClientError>
    where
        T: Serialize + ?Sized,
    {
        let body = CallBody::json(t)?;
        Ok(self.with_body(body))
    }

    /// Sets a form-encoded body.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use restline_core::ApiClient;
    /// # use serde::Serialize;
    /// # fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// #[derive(Serialize)]
    /// struct Login {
    ///     username: String,
    /// }
    ///
    /// let client = ApiClient::new("https://api.example.com")?;
    /// let request = client
    ///     .post("/login")
    ///     .form(&Login { username: "user".to_string() })?
    ///     .http_request()?;
    /// assert_eq!(request.headers()["content-type"], "application/x-www-form-urlencoded");
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be form-encoded.
    pub fn form<T>(self, t: &T) -> Result<Self, ApiClientError>
    where
        T: Serialize + ?Sized,
    {
        let body = CallBody::form(t)?;
        Ok(self.with_body(body))
    }

    /// Sets a `text/plain` body.
    pub fn text(self, text: impl Into<String>) -> Self {
        self.with_body(CallBody::text(text))
    }

    /// Sets a raw body with its content type.
    pub fn raw(self, data: impl Into<Bytes>, content_type: ContentType) -> Self {
        self.with_body(CallBody::raw(data, content_type))
    }

    /// Sets a body read verbatim from `reader`.
    ///
    /// # Errors
    ///
    /// Returns an error if the reader fails or the content type is not a valid media type.
    pub fn reader<R>(self, reader: R, content_type: &str) -> Result<Self, ApiClientError>
    where
        R: Read,
    {
        let body = CallBody::from_reader(reader, content_type)?;
        Ok(self.with_body(body))
    }

    // =============================================================================
    // Authentication Methods
    // =============================================================================

    /// Signs the final request with `authenticator`, replacing any previous one.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use restline_core::{ApiClient, Authentication};
    /// # fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let client = ApiClient::new("https://api.example.com")?;
    /// let request = client
    ///     .get("/me")
    ///     .with_auth(Authentication::ApiKey {
    ///         header_name: "X-API-Key".to_string(),
    ///         key: "secret".into(),
    ///     })
    ///     .http_request()?;
    /// assert_eq!(request.headers()["x-api-key"], "secret");
    /// # Ok(())
    /// # }
    /// ```
    pub fn with_auth<A>(mut self, authenticator: A) -> Self
    where
        A: Authenticator + 'static,
    {
        self.auth = Some(CallAuth::Plain(Arc::new(authenticator)));
        self
    }

    /// Registers an authenticator that also prepares the call before it is resolved.
    ///
    /// [`PrepareAuth::prepare_auth`] runs on a copy of the call right after the URL is
    /// joined, so the parameters it adds are covered by the signature.
    pub fn with_preparing_auth<A>(mut self, authenticator: A) -> Self
    where
        A: Authenticator + PrepareAuth + 'static,
    {
        self.auth = Some(CallAuth::Preparing(Arc::new(authenticator)));
        self
    }

    /// Sets the `Authorization: Bearer <token>` header.
    ///
    /// Only the header is replaced: an authenticator set with [`with_auth`](Self::with_auth)
    /// still signs the request.
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.headers
            .set(AUTHORIZATION.as_str(), format!("Bearer {}", token.into()));
        self
    }

    /// Removes the authenticator of the call.
    pub fn without_auth(mut self) -> Self {
        self.auth = None;
        self
    }
}
