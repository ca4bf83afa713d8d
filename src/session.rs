use std::sync::Arc;

use models_api::{ChatApiError, ChatMessage, ChatRequest};
use thiserror::Error;
use transcript_store::{Message, Role, Transcript, TranscriptStore, HISTORY_CAP};

use crate::credentials::CredentialProvider;
use crate::provider::ChatTransport;

/// Lifecycle of one conversation session.
///
/// Every entry into `Awaiting`/`Streaming` reaches `Settled` or `Failed`;
/// both settle back to `Idle` before `send` returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Awaiting,
    Streaming,
    Settled,
    Failed,
}

/// How a send settled.
///
/// Transport failures settle here rather than erroring out of `send`; the
/// diagnostic message is already committed to the transcript when the
/// caller sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    Settled { content: String },
    Failed { diagnostic: String },
}

/// Caller errors: the two cases that reject a send before any request is
/// issued and before the transcript is touched.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("a send is already in flight (state: {0:?})")]
    Busy(SessionState),
    #[error("no bearer token is available; configure credentials first")]
    MissingCredential,
}

/// Per-session knobs supplied by the embedder.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Model identifier, carried opaquely in the request payload.
    pub model: String,
    /// Synthesized as the first wire message of every request; never stored
    /// in the transcript.
    pub system_prompt: String,
}

impl SessionConfig {
    pub fn new(model: impl Into<String>, system_prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            system_prompt: system_prompt.into(),
        }
    }
}

/// Conversation-session state machine.
///
/// Owns the transcript and drives the transport. Exactly one send can be in
/// flight; a send issued while another is active is rejected rather than
/// cancelling the in-flight stream.
pub struct ChatSession<T: ChatTransport> {
    transport: T,
    credentials: Arc<dyn CredentialProvider>,
    store: TranscriptStore,
    config: SessionConfig,
    transcript: Transcript,
    state: SessionState,
}

impl<T: ChatTransport> ChatSession<T> {
    /// Opens a session, restoring any persisted transcript. A missing or
    /// damaged snapshot starts the session empty instead of failing.
    pub fn open(
        transport: T,
        credentials: Arc<dyn CredentialProvider>,
        store: TranscriptStore,
        config: SessionConfig,
    ) -> Self {
        let transcript = store.load_or_default(HISTORY_CAP);
        Self {
            transport,
            credentials,
            store,
            config,
            transcript,
            state: SessionState::Idle,
        }
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    #[must_use]
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Sends one user message and streams the assistant response.
    ///
    /// `render` receives the cumulative assistant text once per delta with
    /// `is_final == false`, then exactly once more at settlement with
    /// `is_final == true`. The user message is committed before the request
    /// goes out and survives any later failure.
    pub async fn send<F>(
        &mut self,
        user_text: impl Into<String>,
        mut render: F,
    ) -> Result<SendOutcome, SessionError>
    where
        F: FnMut(&str, bool) + Send,
    {
        if self.state != SessionState::Idle {
            return Err(SessionError::Busy(self.state));
        }
        let token = self
            .credentials
            .bearer_token()
            .filter(|token| !token.trim().is_empty())
            .ok_or(SessionError::MissingCredential)?;

        self.transcript.append(Message::user(user_text));
        self.state = SessionState::Awaiting;
        let request = self.build_request();

        let mut pending = String::new();
        let state = &mut self.state;
        let result = self
            .transport
            .stream_chat(&token, &request, &mut |delta| {
                *state = SessionState::Streaming;
                pending.push_str(delta);
                render(&pending, false);
            })
            .await;

        match result {
            Ok(()) => {
                let content = std::mem::take(&mut pending);
                render(&content, true);
                self.transcript.append(Message::assistant(content.clone()));
                self.settle(SessionState::Settled);
                Ok(SendOutcome::Settled { content })
            }
            Err(error) => {
                let diagnostic = failure_diagnostic(&error);
                render(&diagnostic, true);
                self.transcript
                    .append(Message::assistant(diagnostic.clone()));
                self.settle(SessionState::Failed);
                Ok(SendOutcome::Failed { diagnostic })
            }
        }
    }

    /// Drops every message and erases the persisted snapshot.
    pub fn clear(&mut self) {
        self.transcript.clear();
        if let Err(error) = self.store.clear() {
            tracing::warn!(%error, "failed to erase persisted transcript");
        }
    }

    fn build_request(&self) -> ChatRequest {
        let mut messages = Vec::with_capacity(self.transcript.len() + 1);
        messages.push(ChatMessage::new(
            Role::System.as_str(),
            self.config.system_prompt.clone(),
        ));
        messages.extend(
            self.transcript
                .messages()
                .map(|message| ChatMessage::new(message.role.as_str(), message.content.clone())),
        );
        ChatRequest::new(self.config.model.clone(), messages)
    }

    /// Commit the terminal state, mirror the transcript to disk, and return
    /// to `Idle`. Persistence is lagging and best-effort: a failed write is
    /// logged and never stalls or fails the settlement.
    fn settle(&mut self, terminal: SessionState) {
        self.state = terminal;
        if let Err(error) = self.store.save(&self.transcript) {
            tracing::warn!(%error, "failed to persist transcript snapshot");
        }
        self.state = SessionState::Idle;
    }
}

fn failure_diagnostic(error: &ChatApiError) -> String {
    format!(
        "The request to the model failed: {error}. Check network access and that \
         your token carries the `models:read` scope."
    )
}
