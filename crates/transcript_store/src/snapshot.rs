use serde::{Deserialize, Serialize};

/// Persisted snapshot format version understood by this build.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Author of a conversation message.
///
/// Serialized as `system`/`user`/`assistant`, matching both the wire payload
/// and the persisted snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// One committed conversation message. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }
}

/// Whole-transcript persisted form.
///
/// `version` gates forward compatibility; `cap` records the eviction bound
/// in force when the snapshot was written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptSnapshot {
    pub version: u32,
    pub saved_at: String,
    pub cap: usize,
    pub messages: Vec<Message>,
}

impl TranscriptSnapshot {
    #[must_use]
    pub fn v1(saved_at: impl Into<String>, cap: usize, messages: Vec<Message>) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            saved_at: saved_at.into(),
            cap,
            messages,
        }
    }
}
