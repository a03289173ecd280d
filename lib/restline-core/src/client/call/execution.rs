use std::future::{Future, IntoFuture};
use std::time::Duration;

use tracing::debug;

use super::ApiCall;
use crate::client::transport::BoxFuture;
use crate::client::{ApiClientError, CallResult};

impl ApiCall {
    /// Executes the call and waits for the whole response.
    ///
    /// This never fails: request construction and transport failures are reported
    /// through [`CallResult::error`] with a zero status. A response with an error
    /// status is a completed exchange, check [`CallResult::is_success`].
    ///
    /// Dropping the returned future aborts the call.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use restline_core::ApiClient;
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let client = ApiClient::new("https://api.example.com")?;
    ///
    /// let result = client.delete("/users/123").exchange().await;
    /// if let Some(error) = result.error() {
    ///     eprintln!("no response: {error}");
    /// } else if !result.is_success() {
    ///     eprintln!("rejected: {}", result.status_text());
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn exchange(self) -> CallResult {
        self.run(std::future::pending::<()>(), || ApiClientError::Cancelled)
            .await
    }

    /// Executes the call, aborting it as soon as `signal` completes.
    ///
    /// Cancellation before the status line is received yields
    /// [`ApiClientError::Cancelled`] with a zero status. Cancellation while the
    /// body is read keeps the received status and headers.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use restline_core::ApiClient;
    /// use tokio::sync::oneshot;
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let client = ApiClient::new("https://api.example.com")?;
    /// let (cancel, cancelled) = oneshot::channel::<()>();
    ///
    /// let call = tokio::spawn(client.get("/reports/slow").exchange_until(cancelled));
    /// let _ = cancel.send(());
    ///
    /// let result = call.await?;
    /// assert!(result.error().is_some_and(|error| error.is_cancelled()));
    /// # Ok(())
    /// # }
    /// ```
    pub async fn exchange_until<F>(self, signal: F) -> CallResult
    where
        F: Future + Send,
    {
        self.run(signal, || ApiClientError::Cancelled).await
    }

    /// Executes the call with a deadline covering the send and the body read.
    ///
    /// When the deadline elapses the result carries [`ApiClientError::DeadlineExceeded`].
    pub async fn exchange_with_timeout(self, timeout: Duration) -> CallResult {
        self.run(tokio::time::sleep(timeout), || {
            ApiClientError::DeadlineExceeded
        })
        .await
    }

    async fn run<F>(self, interrupt: F, interrupted: fn() -> ApiClientError) -> CallResult
    where
        F: Future + Send,
    {
        let method = self.method.clone();
        let uri = self.uri.clone();

        let request = match self.http_request() {
            Ok(request) => request,
            Err(error) => return CallResult::failed(method, uri, error),
        };
        let transport = self.client.transport();

        tokio::pin!(interrupt);

        debug!(?request, "sending...");
        let response = tokio::select! {
            biased;
            _ = &mut interrupt => {
                debug!(%method, %uri, "cancelled before response");
                return CallResult::failed(method, uri, interrupted());
            }
            response = transport.send(request) => response,
        };
        let response = match response {
            Ok(response) => response,
            Err(error) => {
                debug!(%method, %uri, %error, "transport failure");
                return CallResult::failed(method, uri, error.into());
            }
        };
        debug!(?response, "...receiving");

        let (parts, body) = response.into_parts();
        let body = tokio::select! {
            biased;
            _ = &mut interrupt => Err(interrupted()),
            body = body.read() => body.map_err(|source| ApiClientError::ResponseReadError { source }),
        };

        CallResult::received(method, uri, parts.status, parts.headers, body)
    }
}

/// Implement IntoFuture for ApiCall to enable direct .await syntax
///
/// ```rust,no_run
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// # let client = restline_core::ApiClient::new("https://api.example.com")?;
/// let result = client.get("/users").await;
/// # Ok(())
/// # }
/// ```
impl IntoFuture for ApiCall {
    type Output = CallResult;
    type IntoFuture = BoxFuture<'static, CallResult>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(self.exchange())
    }
}
