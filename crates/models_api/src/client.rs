use std::sync::{atomic::AtomicBool, atomic::Ordering, Arc};
use std::time::Duration;

use futures_util::{Stream, StreamExt};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Client, Response};

use crate::config::ModelsApiConfig;
use crate::error::{parse_error_message, ChatApiError};
use crate::events::StreamEvent;
use crate::payload::ChatRequest;
use crate::retry::{is_retryable_http_error, retry_delay, MAX_RETRIES};
use crate::sse::{classify_line, SseLineDecoder};
use crate::url::normalize_chat_url;

/// Optional cancellation signal shared across request and stream loops.
pub type CancellationSignal = Arc<AtomicBool>;

/// Streaming HTTP client for the chat-completions endpoint.
#[derive(Debug)]
pub struct ModelsApiClient {
    http: Client,
    config: ModelsApiConfig,
}

impl ModelsApiClient {
    pub fn new(config: ModelsApiConfig) -> Result<Self, ChatApiError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        let http = builder.build().map_err(ChatApiError::from)?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ModelsApiConfig {
        &self.config
    }

    pub fn normalized_endpoint(&self) -> String {
        normalize_chat_url(&self.config.base_url)
    }

    fn bearer_headers(&self, token: &str) -> Result<HeaderMap, ChatApiError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(ChatApiError::MissingAccessToken);
        }

        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|_| ChatApiError::InvalidHeader("authorization"))?,
        );
        headers.insert(ACCEPT, HeaderValue::from_static("text/event-stream"));
        if let Some(user_agent) = self.config.user_agent.as_deref() {
            headers.insert(
                USER_AGENT,
                HeaderValue::from_str(user_agent)
                    .map_err(|_| ChatApiError::InvalidHeader("user-agent"))?,
            );
        }
        Ok(headers)
    }

    /// Issue the request, retrying transient failures with backoff.
    ///
    /// Token validation happens before any I/O; a missing token never puts a
    /// request on the wire. The wait for each response head is bounded by
    /// the configured first-byte timeout.
    pub async fn send_with_retry(
        &self,
        token: &str,
        request: &ChatRequest,
        cancellation: Option<&CancellationSignal>,
    ) -> Result<Response, ChatApiError> {
        let headers = self.bearer_headers(token)?;
        let mut last_error = String::new();

        for attempt in 0..=MAX_RETRIES {
            if is_cancelled(cancellation) {
                return Err(ChatApiError::Cancelled);
            }

            let send = self
                .http
                .post(self.normalized_endpoint())
                .headers(headers.clone())
                .json(request)
                .send();
            let response = tokio::time::timeout(self.config.first_byte_timeout, send)
                .await
                .map_err(|_| ChatApiError::StreamStalled(self.config.first_byte_timeout))?;

            match response {
                Ok(response) if response.status().is_success() => return Ok(response),
                Ok(response) => {
                    let status = response.status();
                    let body = response.text().await.unwrap_or_default();
                    let message = parse_error_message(status, &body);
                    if attempt < MAX_RETRIES && is_retryable_http_error(status.as_u16(), &message) {
                        last_error = message;
                        tokio::time::sleep(retry_delay(attempt)).await;
                        continue;
                    }
                    return Err(ChatApiError::Status(status, message));
                }
                Err(error) => {
                    last_error = error.to_string();
                    if attempt < MAX_RETRIES {
                        tokio::time::sleep(retry_delay(attempt)).await;
                        continue;
                    }
                }
            }
        }

        Err(ChatApiError::RetryExhausted {
            attempts: MAX_RETRIES + 1,
            last_error,
        })
    }

    /// Stream one chat response, invoking `on_delta` per text increment in
    /// arrival order. Returns once the terminal sentinel arrives or the
    /// stream ends; an empty response is a normal settlement, not an error.
    pub async fn stream_chat<F>(
        &self,
        token: &str,
        request: &ChatRequest,
        cancellation: Option<&CancellationSignal>,
        on_delta: F,
    ) -> Result<(), ChatApiError>
    where
        F: FnMut(&str),
    {
        let response = self.send_with_retry(token, request, cancellation).await?;
        let bytes = response.bytes_stream().map(|chunk| {
            chunk
                .map(|bytes| bytes.to_vec())
                .map_err(ChatApiError::from)
        });
        drain_delta_stream(bytes, self.config.idle_timeout, cancellation, on_delta).await
    }
}

/// Drain a byte-chunk stream through the frame decoder and delta extractor.
///
/// Factored over any chunk stream so the byte-to-delta pipeline is testable
/// without HTTP. Once the terminal sentinel is observed, no further bytes
/// are interpreted. Each gap between chunks is bounded by `idle_timeout`.
pub async fn drain_delta_stream<S, F>(
    bytes: S,
    idle_timeout: Duration,
    cancellation: Option<&CancellationSignal>,
    mut on_delta: F,
) -> Result<(), ChatApiError>
where
    S: Stream<Item = Result<Vec<u8>, ChatApiError>>,
    F: FnMut(&str),
{
    let mut bytes = Box::pin(bytes);
    let mut decoder = SseLineDecoder::default();

    'stream: loop {
        if is_cancelled(cancellation) {
            return Err(ChatApiError::Cancelled);
        }

        let next = tokio::time::timeout(idle_timeout, bytes.next())
            .await
            .map_err(|_| ChatApiError::StreamStalled(idle_timeout))?;
        let Some(chunk) = next else {
            break;
        };

        for line in decoder.feed(&chunk?) {
            match classify_line(&line) {
                Some(StreamEvent::Delta { text }) => on_delta(&text),
                Some(StreamEvent::Terminal) => break 'stream,
                Some(StreamEvent::Malformed) => {
                    tracing::debug!(line = %line, "skipping malformed stream record");
                }
                None => {}
            }
        }
    }

    Ok(())
}

fn is_cancelled(cancellation: Option<&CancellationSignal>) -> bool {
    cancellation.is_some_and(|signal| signal.load(Ordering::Acquire))
}
