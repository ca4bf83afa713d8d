mod error;
mod paths;
mod snapshot;
mod store;
mod transcript;

pub use error::TranscriptStoreError;
pub use paths::{transcript_path, transcript_root, TRANSCRIPT_FILE};
pub use snapshot::{Message, Role, TranscriptSnapshot, SNAPSHOT_VERSION};
pub use store::TranscriptStore;
pub use transcript::{Transcript, HISTORY_CAP};
