use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::Bytes;
use http::{HeaderMap, Method};
use rstest::rstest;
use serde::Serialize;

use super::ApiCall;
use crate::client::{
    ApiClient, ApiClientError, AuthenticationError, Authenticator, BoxFuture, CallHeaders,
    ErrorKind, PrepareAuth, ResponseBody, Transport, TransportError,
};

#[derive(Debug, Serialize)]
struct Order {
    qty: u32,
    sku: String,
}

#[derive(Debug, Clone, Copy)]
enum Reply {
    Status(u16, &'static str),
    Fail,
    Hang,
    HangBody,
}

#[derive(Debug, Clone)]
struct FakeTransport {
    reply: Reply,
    requests: Arc<Mutex<Vec<http::Request<Bytes>>>>,
}

impl FakeTransport {
    fn new(reply: Reply) -> Self {
        Self {
            reply,
            requests: Arc::default(),
        }
    }

    fn sent(&self) -> Vec<http::Request<Bytes>> {
        std::mem::take(&mut *self.requests.lock().expect("lock"))
    }
}

impl Transport for FakeTransport {
    fn send(
        &self,
        request: http::Request<Bytes>,
    ) -> BoxFuture<'_, Result<http::Response<ResponseBody>, TransportError>> {
        self.requests.lock().expect("lock").push(request);
        let reply = self.reply;
        Box::pin(async move {
            match reply {
                Reply::Status(status, body) => http::Response::builder()
                    .status(status)
                    .header("content-type", "application/json")
                    .body(ResponseBody::from_bytes(body))
                    .map_err(TransportError::other),
                Reply::Fail => Err(TransportError::other("connection refused")),
                Reply::Hang => std::future::pending().await,
                Reply::HangBody => http::Response::builder()
                    .status(200)
                    .body(ResponseBody::new(std::future::pending()))
                    .map_err(TransportError::other),
            }
        })
    }
}

#[derive(Debug, Clone, Default)]
struct RecordingAuth {
    seen: Arc<Mutex<Vec<(Method, String, Bytes)>>>,
}

impl RecordingAuth {
    fn seen(&self) -> Vec<(Method, String, Bytes)> {
        self.seen.lock().expect("lock").clone()
    }
}

impl Authenticator for RecordingAuth {
    fn authenticate(
        &self,
        headers: &mut CallHeaders,
        method: &Method,
        uri: &str,
        body: &[u8],
    ) -> Result<(), AuthenticationError> {
        self.seen
            .lock()
            .expect("lock")
            .push((method.clone(), uri.to_string(), Bytes::copy_from_slice(body)));
        headers.set("X-Signature", format!("{method} {uri} {}", body.len()));
        Ok(())
    }
}

#[derive(Debug)]
struct NonceAuth;

impl PrepareAuth for NonceAuth {
    fn prepare_auth(&self, call: ApiCall) -> ApiCall {
        call.with_param("nonce", "n-1")
            .with_header("X-Nonce", "n-1")
    }
}

impl Authenticator for NonceAuth {
    fn authenticate(
        &self,
        headers: &mut CallHeaders,
        _method: &Method,
        uri: &str,
        body: &[u8],
    ) -> Result<(), AuthenticationError> {
        headers.set(
            "X-Signature",
            format!("{uri}|{}", String::from_utf8_lossy(body)),
        );
        Ok(())
    }
}

#[derive(Debug)]
struct RefusingAuth;

impl Authenticator for RefusingAuth {
    fn authenticate(
        &self,
        _headers: &mut CallHeaders,
        _method: &Method,
        _uri: &str,
        _body: &[u8],
    ) -> Result<(), AuthenticationError> {
        Err(AuthenticationError::SigningFailed {
            message: "key expired".to_string(),
        })
    }
}

fn client() -> ApiClient {
    ApiClient::new("https://api.example.com").expect("valid base url")
}

fn client_with(reply: Reply) -> (ApiClient, FakeTransport) {
    let transport = FakeTransport::new(reply);
    let client = ApiClient::builder()
        .with_base_url("https://api.example.com")
        .with_transport(transport.clone())
        .build()
        .expect("valid base url");
    (client, transport)
}

fn header_values(headers: &HeaderMap, name: &str) -> Vec<String> {
    headers
        .get_all(name)
        .iter()
        .map(|value| value.to_str().expect("ascii").to_string())
        .collect()
}

// =============================================================================
// Finalization
// =============================================================================

#[test]
fn test_get_params_go_to_query() {
    let request = client()
        .get("/users")
        .with_param("page", 2)
        .with_param("active", true)
        .http_request()
        .expect("should finalize");

    assert_eq!(request.method(), Method::GET);
    insta::assert_snapshot!(request.uri(), @"https://api.example.com/users?page=2&active=true");
    assert!(request.body().is_empty());
    assert!(request.headers().get("content-type").is_none());
}

#[rstest]
fn test_body_methods_send_params_as_json(
    #[values(Method::POST, Method::PUT, Method::PATCH)] method: Method,
) {
    let request = client()
        .call(method.clone(), "/orders")
        .with_param("qty", 3)
        .http_request()
        .expect("should finalize");

    assert_eq!(request.method(), method);
    assert_eq!(request.uri(), "https://api.example.com/orders");
    assert_eq!(request.body().as_ref(), br#"{"qty":3}"#);
    assert_eq!(
        header_values(request.headers(), "content-type"),
        ["application/json"]
    );
}

#[rstest]
fn test_other_methods_never_send_a_body(
    #[values(Method::GET, Method::DELETE, Method::HEAD, Method::OPTIONS)] method: Method,
) {
    let request = client()
        .call(method, "/orders/1")
        .with_param("force", true)
        .text("ignored")
        .http_request()
        .expect("should finalize");

    assert_eq!(request.uri(), "https://api.example.com/orders/1?force=true");
    assert!(request.body().is_empty());
    assert!(request.headers().get("content-type").is_none());
}

#[test]
fn test_post_without_params_has_no_body() {
    let request = client()
        .post("/orders/1/cancel")
        .http_request()
        .expect("should finalize");

    assert!(request.body().is_empty());
    assert!(request.headers().get("content-type").is_none());
}

#[test]
fn test_explicit_body_takes_precedence_over_params() {
    let order = Order {
        qty: 2,
        sku: "A-12".to_string(),
    };

    let request = client()
        .post("/orders")
        .with_param("qty", 3)
        .json(&order)
        .expect("json body")
        .http_request()
        .expect("should finalize");

    assert_eq!(request.uri(), "https://api.example.com/orders");
    assert_eq!(request.body().as_ref(), br#"{"qty":2,"sku":"A-12"}"#);
}

#[test]
fn test_body_content_type_replaces_caller_header() {
    let request = client()
        .post("/login")
        .with_header("Content-Type", "application/json")
        .with_header("content-type", "text/plain")
        .reader("user=me".as_bytes(), "application/x-www-form-urlencoded")
        .expect("reader body")
        .http_request()
        .expect("should finalize");

    assert_eq!(
        header_values(request.headers(), "content-type"),
        ["application/x-www-form-urlencoded"]
    );
    assert_eq!(request.body().as_ref(), b"user=me");
}

#[test]
fn test_group_query_and_explicit_query_are_merged() {
    let v1 = client().group("/v1").expect("valid group");

    let request = v1
        .get("/users?active=true")
        .with_query_param("page", 2)
        .http_request()
        .expect("should finalize");

    insta::assert_snapshot!(request.uri(), @"https://api.example.com/v1/users?active=true&page=2");
}

#[test]
fn test_query_order_uri_then_explicit_then_params() {
    let client = ApiClient::new("https://api.example.com?k=v").expect("valid base url");

    let request = client
        .get("/search?q=rust")
        .with_param("limit", 10)
        .with_query_param("lang", "en")
        .http_request()
        .expect("should finalize");

    assert_eq!(
        request.uri(),
        "https://api.example.com/search?k=v&q=rust&lang=en&limit=10"
    );
}

#[test]
fn test_query_values_are_encoded() {
    let request = client()
        .get("/search")
        .with_param("q", "a&b c")
        .with_query_param("tag", "ü")
        .http_request()
        .expect("should finalize");

    assert_eq!(
        request.uri(),
        "https://api.example.com/search?tag=%C3%BC&q=a%26b+c"
    );
}

#[test]
fn test_same_key_in_every_query_source_is_kept() {
    let request = client()
        .get("/users?page=1")
        .with_query_param("page", 2)
        .with_param("page", 3)
        .http_request()
        .expect("should finalize");

    assert_eq!(
        request.uri(),
        "https://api.example.com/users?page=1&page=2&page=3"
    );
}

#[test]
fn test_without_param_and_query_param() {
    let request = client()
        .get("/users")
        .with_param("page", 2)
        .with_param("page", 3)
        .with_param("sort", "name")
        .without_param("sort")
        .with_query_param("debug", true)
        .without_query_param("debug")
        .http_request()
        .expect("should finalize");

    assert_eq!(request.uri(), "https://api.example.com/users?page=3");
}

#[test]
fn test_repeated_headers_keep_insertion_order() {
    let request = client()
        .get("/users")
        .with_header("X-Trace", "first")
        .with_header("Accept", "application/json")
        .with_header("x-trace", "second")
        .http_request()
        .expect("should finalize");

    assert_eq!(
        header_values(request.headers(), "x-trace"),
        ["first", "second"]
    );
}

#[test]
fn test_with_headers_replaces_all_headers() {
    let request = client()
        .get("/users")
        .with_header("X-Old", "1")
        .with_headers(CallHeaders::new().add_header("X-New", "2"))
        .http_request()
        .expect("should finalize");

    assert!(request.headers().get("x-old").is_none());
    assert_eq!(request.headers()["x-new"], "2");
}

#[test]
fn test_finalization_is_idempotent() {
    let call = client()
        .post("/orders?src=web")
        .with_param("qty", 3)
        .with_header("X-Trace", "a")
        .with_auth(RecordingAuth::default());

    let first = call.http_request().expect("should finalize");
    let second = call.http_request().expect("should finalize");

    assert_eq!(first.method(), second.method());
    assert_eq!(first.uri(), second.uri());
    assert_eq!(first.headers(), second.headers());
    assert_eq!(first.body(), second.body());
    assert_eq!(header_values(second.headers(), "content-type").len(), 1);
    assert!(call.headers().get("content-type").is_none());
}

#[test]
fn test_invalid_header_fails_finalization() {
    let error = client()
        .get("/users")
        .with_header("Invalid Header", "value")
        .http_request()
        .expect_err("should fail");

    assert!(matches!(error, ApiClientError::InvalidHeaderName(_)));
    assert_eq!(error.kind(), ErrorKind::RequestConstruction);
}

#[test]
fn test_malformed_uri_fails_finalization() {
    let error = client()
        .get("http://[::1/users")
        .http_request()
        .expect_err("should fail");

    assert_eq!(error.kind(), ErrorKind::UrlParse);
}

// =============================================================================
// Authentication
// =============================================================================

#[test]
fn test_authenticator_sees_what_is_sent() {
    let auth = RecordingAuth::default();

    let request = client()
        .group("/v1")
        .expect("valid group")
        .post("/orders?src=web")
        .with_param("qty", 3)
        .with_auth(auth.clone())
        .http_request()
        .expect("should finalize");

    let seen = auth.seen();
    assert_eq!(seen.len(), 1);
    let (method, uri, body) = &seen[0];
    assert_eq!(method, Method::POST);
    assert_eq!(uri, "/v1/orders?src=web");
    assert_eq!(body, request.body());
    assert_eq!(
        request.headers()["x-signature"],
        "POST /v1/orders?src=web 9"
    );
}

#[test]
fn test_authenticator_without_query() {
    let auth = RecordingAuth::default();

    client()
        .delete("/orders/1")
        .with_auth(auth.clone())
        .http_request()
        .expect("should finalize");

    let seen = auth.seen();
    assert_eq!(seen[0].1, "/orders/1");
    assert!(seen[0].2.is_empty());
}

#[test]
fn test_preparing_authenticator_adds_signed_params() {
    let call = client()
        .post("/transfers")
        .with_param("amount", 10)
        .with_preparing_auth(NonceAuth);

    let request = call.http_request().expect("should finalize");

    assert_eq!(request.body().as_ref(), br#"{"amount":10,"nonce":"n-1"}"#);
    assert_eq!(request.headers()["x-nonce"], "n-1");
    assert_eq!(
        request.headers()["x-signature"],
        r#"/transfers|{"amount":10,"nonce":"n-1"}"#
    );
    // the prepared parameters live on a copy
    assert!(call.params().get("nonce").is_none());
}

#[test]
fn test_preparing_authenticator_on_query_method() {
    let request = client()
        .get("/balance")
        .with_preparing_auth(NonceAuth)
        .http_request()
        .expect("should finalize");

    assert_eq!(request.uri(), "https://api.example.com/balance?nonce=n-1");
    assert_eq!(request.headers()["x-signature"], "/balance?nonce=n-1|");
}

#[test]
fn test_bearer_token() {
    let request = client()
        .get("/me")
        .with_bearer_token("my-token")
        .http_request()
        .expect("should finalize");

    assert_eq!(request.headers()["authorization"], "Bearer my-token");
}

#[test]
fn test_bearer_token_keeps_authenticator() {
    let auth = RecordingAuth::default();

    let request = client()
        .get("/me")
        .with_auth(auth.clone())
        .with_bearer_token("my-token")
        .http_request()
        .expect("should finalize");

    assert_eq!(auth.seen().len(), 1);
    assert_eq!(request.headers()["x-signature"], "GET /me 0");
    assert_eq!(request.headers()["authorization"], "Bearer my-token");
}

#[test]
fn test_bearer_token_replaces_authorization_header() {
    let request = client()
        .get("/me")
        .with_header("Authorization", "Basic xyz")
        .with_bearer_token("first")
        .with_bearer_token("second")
        .http_request()
        .expect("should finalize");

    let values: Vec<_> = request
        .headers()
        .get_all("authorization")
        .iter()
        .map(|value| value.to_str().expect("ascii"))
        .collect();
    assert_eq!(values, ["Bearer second"]);
}

#[test]
fn test_last_authenticator_wins() {
    let auth = RecordingAuth::default();

    let request = client()
        .get("/me")
        .with_auth(RefusingAuth)
        .with_auth(auth.clone())
        .http_request()
        .expect("should finalize");

    assert_eq!(auth.seen().len(), 1);
    assert_eq!(request.headers()["x-signature"], "GET /me 0");
}

#[test]
fn test_authenticator_failure() {
    let error = client()
        .get("/me")
        .with_auth(RefusingAuth)
        .http_request()
        .expect_err("should fail");

    assert_eq!(error.to_string(), "Signing failed: key expired");
    assert_eq!(error.kind(), ErrorKind::RequestConstruction);
}

#[test]
fn test_on_request_hook() {
    let client = ApiClient::builder()
        .with_base_url("https://api.example.com")
        .on_request(|call, method, uri| {
            call.with_header("X-Origin", format!("{method} {uri}"))
                .with_query_param("client", "restline")
        })
        .build()
        .expect("valid base url");
    let v2 = client.group("/v2").expect("valid group");

    let request = v2
        .patch("/users/1")
        .http_request()
        .expect("should finalize");

    assert_eq!(request.headers()["x-origin"], "PATCH /users/1");
    assert_eq!(
        request.uri(),
        "https://api.example.com/v2/users/1?client=restline"
    );
}

#[test]
fn test_custom_method() {
    let request = client()
        .custom("PROPFIND", "/files")
        .expect("valid method")
        .with_param("depth", 1)
        .http_request()
        .expect("should finalize");

    assert_eq!(request.method().as_str(), "PROPFIND");
    assert_eq!(request.uri(), "https://api.example.com/files?depth=1");

    let error = client().custom("BAD METHOD", "/files").expect_err("invalid");
    assert!(matches!(error, ApiClientError::InvalidMethod(_)));
}

// =============================================================================
// Execution
// =============================================================================

#[tokio::test]
async fn test_exchange_sends_finalized_request() {
    let (client, transport) = client_with(Reply::Status(201, r#"{"id":1}"#));

    let result = client.post("/orders").with_param("qty", 3).await;

    assert!(result.is_success());
    assert_eq!(result.status_code(), 201);
    assert_eq!(result.body(), br#"{"id":1}"#);
    assert_eq!(result.headers()["content-type"], "application/json");
    assert_eq!(result.to_string(), "POST /orders 201 Created");

    let sent = transport.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].uri(), "https://api.example.com/orders");
    assert_eq!(sent[0].body().as_ref(), br#"{"qty":3}"#);
}

#[tokio::test]
async fn test_error_status_is_not_an_error() {
    let (client, _) = client_with(Reply::Status(404, r#"{"error":"not found"}"#));

    let result = client.get("/orders/9").exchange().await;

    assert!(!result.is_success());
    assert!(result.error().is_none());
    assert_eq!(result.status_text(), "404 Not Found");
    assert_eq!(result.body(), br#"{"error":"not found"}"#);
}

#[tokio::test]
async fn test_transport_failure_has_zero_status() {
    let (client, _) = client_with(Reply::Fail);

    let result = client.get("/orders").await;

    assert_eq!(result.status_code(), 0);
    assert!(result.body().is_empty());
    let error = result.error().expect("should fail");
    assert_eq!(error.kind(), ErrorKind::Transport);
    assert!(!error.is_cancelled());
}

#[tokio::test]
async fn test_construction_failure_is_reported_without_sending() {
    let (client, transport) = client_with(Reply::Status(200, ""));

    let result = client.get("/orders").with_header("Bad Name", "x").await;

    assert_eq!(result.status_code(), 0);
    assert_eq!(
        result.error().map(ApiClientError::kind),
        Some(ErrorKind::RequestConstruction)
    );
    assert!(transport.sent().is_empty());
}

#[tokio::test]
async fn test_exchange_until_cancelled_before_response() {
    let (client, _) = client_with(Reply::Hang);

    let result = client
        .get("/reports")
        .exchange_until(std::future::ready(()))
        .await;

    assert!(matches!(result.error(), Some(ApiClientError::Cancelled)));
    assert_eq!(result.status(), None);
}

#[tokio::test]
async fn test_exchange_until_signal_not_fired() {
    let (client, _) = client_with(Reply::Status(200, "ok"));
    let (_cancel, cancelled) = tokio::sync::oneshot::channel::<()>();

    let result = client.get("/reports").exchange_until(cancelled).await;

    assert!(result.is_success());
    assert_eq!(result.body(), b"ok");
}

#[tokio::test]
async fn test_exchange_with_timeout_before_response() {
    let (client, _) = client_with(Reply::Hang);

    let result = client
        .get("/reports")
        .exchange_with_timeout(Duration::from_millis(20))
        .await;

    let error = result.error().expect("should time out");
    assert!(matches!(error, ApiClientError::DeadlineExceeded));
    assert!(error.is_cancelled());
    assert_eq!(result.status_code(), 0);
}

#[tokio::test]
async fn test_exchange_with_timeout_while_reading_body_keeps_status() {
    let (client, _) = client_with(Reply::HangBody);

    let result = client
        .get("/reports")
        .exchange_with_timeout(Duration::from_millis(20))
        .await;

    assert_eq!(result.status_code(), 200);
    assert!(matches!(
        result.error(),
        Some(ApiClientError::DeadlineExceeded)
    ));
}

#[test]
fn test_api_call_into_future_type_requirements() {
    use std::future::IntoFuture;

    fn assert_into_future<T>(_: T)
    where
        T: IntoFuture<Output = crate::client::CallResult>,
        T::IntoFuture: Send + 'static,
    {
    }

    assert_into_future(client().get("/users"));
}
