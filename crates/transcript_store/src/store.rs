use std::fs;
use std::path::{Path, PathBuf};

use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::error::TranscriptStoreError;
use crate::snapshot::{TranscriptSnapshot, SNAPSHOT_VERSION};
use crate::transcript::Transcript;

/// File-backed persistence for one conversation transcript.
///
/// The in-memory transcript is the source of truth while a session runs;
/// this store is a lagging mirror refreshed after settlements and on
/// explicit clears.
#[derive(Debug, Clone)]
pub struct TranscriptStore {
    path: PathBuf,
}

impl TranscriptStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Strict load: a missing file, unreadable JSON, and an unknown snapshot
    /// version are distinct errors.
    pub fn load(&self) -> Result<TranscriptSnapshot, TranscriptStoreError> {
        let raw = fs::read_to_string(&self.path)
            .map_err(|source| TranscriptStoreError::io("reading snapshot", &self.path, source))?;
        let snapshot =
            serde_json::from_str::<TranscriptSnapshot>(&raw).map_err(|source| {
                TranscriptStoreError::SnapshotParse {
                    path: self.path.clone(),
                    source,
                }
            })?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(TranscriptStoreError::UnsupportedVersion {
                path: self.path.clone(),
                found: snapshot.version,
                expected: SNAPSHOT_VERSION,
            });
        }
        Ok(snapshot)
    }

    /// Tolerant load used at session startup: any failure yields an empty
    /// transcript so a damaged snapshot never blocks the chat flow.
    #[must_use]
    pub fn load_or_default(&self, cap: usize) -> Transcript {
        match self.load() {
            Ok(snapshot) => Transcript::from_snapshot(snapshot, cap),
            Err(error) if error.is_not_found() => Transcript::with_cap(cap),
            Err(error) => {
                tracing::warn!(%error, "discarding unreadable transcript snapshot");
                Transcript::with_cap(cap)
            }
        }
    }

    /// Write the whole-transcript snapshot, replacing any previous one.
    ///
    /// The snapshot goes through a staging file and a rename so a crash
    /// mid-write leaves the previous snapshot intact.
    pub fn save(&self, transcript: &Transcript) -> Result<(), TranscriptStoreError> {
        let snapshot =
            TranscriptSnapshot::v1(now_rfc3339()?, transcript.cap(), transcript.to_messages());
        let raw = serde_json::to_string(&snapshot).map_err(|source| {
            TranscriptStoreError::SnapshotSerialize {
                path: self.path.clone(),
                source,
            }
        })?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| {
                TranscriptStoreError::io("creating snapshot directory", parent, source)
            })?;
        }
        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, raw)
            .map_err(|source| TranscriptStoreError::io("writing snapshot", &staging, source))?;
        fs::rename(&staging, &self.path)
            .map_err(|source| TranscriptStoreError::io("replacing snapshot", &self.path, source))
    }

    /// Erase the persisted snapshot. An already-absent file is a success.
    pub fn clear(&self) -> Result<(), TranscriptStoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(TranscriptStoreError::io(
                "removing snapshot",
                &self.path,
                source,
            )),
        }
    }
}

fn now_rfc3339() -> Result<String, TranscriptStoreError> {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .map_err(TranscriptStoreError::ClockFormat)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;
    use time::format_description::well_known::Rfc3339;
    use time::OffsetDateTime;

    use super::TranscriptStore;
    use crate::error::TranscriptStoreError;
    use crate::snapshot::{Message, TranscriptSnapshot};
    use crate::transcript::Transcript;

    fn store_in(dir: &tempfile::TempDir) -> TranscriptStore {
        TranscriptStore::new(dir.path().join("transcript.json"))
    }

    #[test]
    fn save_then_load_round_trips_the_transcript() {
        let dir = tempdir().expect("tempdir");
        let store = store_in(&dir);

        let mut transcript = Transcript::new();
        transcript.append(Message::user("hello"));
        transcript.append(Message::assistant("hi there"));
        store.save(&transcript).expect("save should succeed");

        let snapshot = store.load().expect("load should succeed");
        assert_eq!(snapshot.version, 1);
        assert_eq!(snapshot.cap, transcript.cap());
        assert_eq!(snapshot.messages, transcript.to_messages());
        assert!(
            OffsetDateTime::parse(&snapshot.saved_at, &Rfc3339).is_ok(),
            "saved_at must be RFC3339, got {}",
            snapshot.saved_at
        );
    }

    #[test]
    fn save_creates_missing_parent_directories() {
        let dir = tempdir().expect("tempdir");
        let store = TranscriptStore::new(dir.path().join("nested/deeper/transcript.json"));

        store.save(&Transcript::new()).expect("save should succeed");
        assert!(store.path().exists());
    }

    #[test]
    fn save_replaces_the_previous_snapshot() {
        let dir = tempdir().expect("tempdir");
        let store = store_in(&dir);

        let mut transcript = Transcript::new();
        transcript.append(Message::user("first"));
        store.save(&transcript).expect("save should succeed");
        transcript.append(Message::assistant("second"));
        store.save(&transcript).expect("save should succeed");

        let snapshot = store.load().expect("load should succeed");
        assert_eq!(snapshot.messages.len(), 2);
    }

    #[test]
    fn missing_snapshot_loads_as_an_empty_transcript() {
        let dir = tempdir().expect("tempdir");
        let store = store_in(&dir);

        assert!(store.load().expect_err("missing file is strict-load error").is_not_found());
        assert!(store.load_or_default(60).is_empty());
    }

    #[test]
    fn corrupt_snapshot_is_treated_as_empty_by_the_tolerant_path() {
        let dir = tempdir().expect("tempdir");
        let store = store_in(&dir);
        fs::write(store.path(), "{not json").expect("write fixture");

        assert!(matches!(
            store.load(),
            Err(TranscriptStoreError::SnapshotParse { .. })
        ));
        assert!(store.load_or_default(60).is_empty());
    }

    #[test]
    fn future_snapshot_versions_are_rejected_but_not_fatal() {
        let dir = tempdir().expect("tempdir");
        let store = store_in(&dir);
        let mut snapshot =
            TranscriptSnapshot::v1("2026-08-25T12:00:00Z", 60, vec![Message::user("hi")]);
        snapshot.version = 2;
        fs::write(
            store.path(),
            serde_json::to_string(&snapshot).expect("serialize fixture"),
        )
        .expect("write fixture");

        assert!(matches!(
            store.load(),
            Err(TranscriptStoreError::UnsupportedVersion { found: 2, .. })
        ));
        assert!(store.load_or_default(60).is_empty());
    }

    #[test]
    fn restore_applies_the_cap_to_oversized_snapshots() {
        let dir = tempdir().expect("tempdir");
        let store = store_in(&dir);

        let messages: Vec<Message> = (0..80).map(|i| Message::user(format!("m{i}"))).collect();
        let snapshot = TranscriptSnapshot::v1("2026-08-25T12:00:00Z", 80, messages);
        fs::write(
            store.path(),
            serde_json::to_string(&snapshot).expect("serialize fixture"),
        )
        .expect("write fixture");

        let transcript = store.load_or_default(60);
        assert_eq!(transcript.len(), 60);
        assert_eq!(
            transcript.messages().next().map(|m| m.content.as_str()),
            Some("m20")
        );
    }

    #[test]
    fn clear_removes_the_snapshot_and_is_idempotent() {
        let dir = tempdir().expect("tempdir");
        let store = store_in(&dir);

        store.save(&Transcript::new()).expect("save should succeed");
        assert!(store.path().exists());
        store.clear().expect("clear should succeed");
        assert!(!store.path().exists());
        store.clear().expect("second clear should also succeed");
    }
}
