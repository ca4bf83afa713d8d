//! Transport-only client primitives for streamed chat completions.
//!
//! This crate owns request building, SSE frame decoding, and delta
//! extraction for the GitHub Models chat endpoint. It contains no session
//! state and no persistence; callers own accumulation and settlement.
//!
//! The tolerance contract is two-level: lines without the event prefix are
//! framing noise and unparsable payloads are skipped, so heartbeats,
//! intermediary buffering quirks, and forward-incompatible schema fields
//! never terminate a response early.

pub mod client;
pub mod config;
pub mod error;
pub mod events;
pub mod payload;
pub mod retry;
pub mod sse;
pub mod url;

pub use client::{drain_delta_stream, CancellationSignal, ModelsApiClient};
pub use config::ModelsApiConfig;
pub use error::ChatApiError;
pub use events::StreamEvent;
pub use payload::{ChatMessage, ChatRequest};
pub use sse::{classify_line, SseLineDecoder};
pub use url::normalize_chat_url;
