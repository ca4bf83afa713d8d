//! Streaming chat client core for GitHub Models.
//!
//! Three layers composed bottom-up: `models_api` decodes the streamed wire
//! protocol into text deltas, `transcript_store` keeps the durable capped
//! conversation log, and [`ChatSession`] owns the request lifecycle that
//! connects the two. Rendering and credential storage stay outside; the
//! session sees only a render callback and a [`CredentialProvider`].

pub mod credentials;
pub mod provider;
pub mod session;

pub use credentials::{CredentialProvider, EnvCredentialProvider, StaticCredentialProvider};
pub use provider::ChatTransport;
pub use session::{ChatSession, SendOutcome, SessionConfig, SessionError, SessionState};

pub use models_api::{ChatApiError, ChatMessage, ChatRequest, ModelsApiClient, ModelsApiConfig};
pub use transcript_store::{Message, Role, Transcript, TranscriptStore, HISTORY_CAP};
