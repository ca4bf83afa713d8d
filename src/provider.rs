use async_trait::async_trait;
use models_api::{ChatApiError, ChatRequest, ModelsApiClient};

/// Transport contract the session drives.
///
/// Implementations deliver decoded text deltas in arrival order through
/// `on_delta` and return once the stream settles or fails. The callback is
/// serial from the caller's perspective; each invocation runs to completion
/// before the next chunk is processed.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn stream_chat(
        &self,
        token: &str,
        request: &ChatRequest,
        on_delta: &mut (dyn for<'a> FnMut(&'a str) + Send),
    ) -> Result<(), ChatApiError>;
}

#[async_trait]
impl ChatTransport for ModelsApiClient {
    async fn stream_chat(
        &self,
        token: &str,
        request: &ChatRequest,
        on_delta: &mut (dyn for<'a> FnMut(&'a str) + Send),
    ) -> Result<(), ChatApiError> {
        ModelsApiClient::stream_chat(self, token, request, None, on_delta).await
    }
}
