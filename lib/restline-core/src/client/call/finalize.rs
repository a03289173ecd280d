use std::borrow::Cow;

use bytes::Bytes;
use http::Method;
use http::header::CONTENT_TYPE;
use url::Url;

use super::ApiCall;
use crate::client::url::{append_query, join_group};
use crate::client::{ApiClientError, CallBody};

impl ApiCall {
    /// Builds the exact HTTP request this call would send.
    ///
    /// Finalization runs in this order:
    ///
    /// 1. the call URI is joined onto the client base (see [`join_group`](crate::join_group));
    /// 2. a preparing authenticator may add parameters, query or headers;
    /// 3. explicit query parameters are appended to the URL query;
    /// 4. for `PUT`, `POST` and `PATCH` the body is the explicit body, or the JSON
    ///    object of the parameters if any, and its content type replaces any
    ///    `Content-Type` header; for other methods the parameters are appended to
    ///    the query and no body is sent;
    /// 5. the authenticator signs the method, the final `path?query` and the body bytes;
    /// 6. the request is assembled.
    ///
    /// The call itself is left untouched: finalizing it twice yields the same request.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use restline_core::ApiClient;
    /// # fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let client = ApiClient::new("https://api.example.com")?.group("/v1")?;
    ///
    /// let request = client
    ///     .get("/users?active=true")
    ///     .with_query_param("page", 2)
    ///     .http_request()?;
    ///
    /// assert_eq!(
    ///     request.uri(),
    ///     "https://api.example.com/v1/users?active=true&page=2"
    /// );
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an error if the URI cannot be joined, a parameter or body cannot be
    /// serialized, the authenticator fails, or a header is invalid.
    pub fn http_request(&self) -> Result<http::Request<Bytes>, ApiClientError> {
        let mut url = join_group(self.client.base_url(), &self.uri)?;

        let call = match &self.auth {
            Some(auth) => Cow::Owned(auth.prepare(self.clone())),
            None => Cow::Borrowed(self),
        };
        let mut headers = call.headers.clone();

        if !call.query.is_empty() {
            append_query(&mut url, &call.query.to_query_string()?);
        }

        let body = if has_body(&self.method) {
            let body = match (&call.body, call.params.is_empty()) {
                (Some(body), _) => Some(body.clone()),
                (None, false) => Some(CallBody::json(&call.params)?),
                (None, true) => None,
            };
            match body {
                Some(body) => {
                    headers.set(CONTENT_TYPE.as_str(), body.content_type.to_string());
                    body.data
                }
                None => Bytes::new(),
            }
        } else {
            if !call.params.is_empty() {
                append_query(&mut url, &call.params.to_query_string()?);
            }
            Bytes::new()
        };

        if let Some(auth) = &self.auth {
            let uri = signed_uri(&url);
            auth.authenticate(&mut headers, &self.method, &uri, &body)?;
        }

        let mut request = http::Request::builder()
            .method(self.method.clone())
            .uri(url.as_str())
            .body(body)?;
        *request.headers_mut() = headers.to_header_map()?;

        Ok(request)
    }
}

fn has_body(method: &Method) -> bool {
    matches!(*method, Method::PUT | Method::POST | Method::PATCH)
}

/// The request target as seen by the authenticator: path, then `?query` if any.
fn signed_uri(url: &Url) -> String {
    match url.query() {
        Some(query) if !query.is_empty() => format!("{}?{query}", url.path()),
        _ => url.path().to_string(),
    }
}
