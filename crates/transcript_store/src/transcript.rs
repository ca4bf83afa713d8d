use std::collections::VecDeque;

use crate::snapshot::{Message, TranscriptSnapshot};

/// Maximum number of messages a transcript retains.
pub const HISTORY_CAP: usize = 60;

/// Ordered, append-only, size-bounded conversation log.
///
/// The cap is enforced eagerly: after every [`Transcript::append`] the log
/// holds at most `cap` messages, dropping the oldest first. Relative order
/// among retained messages is preserved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript {
    messages: VecDeque<Message>,
    cap: usize,
}

impl Default for Transcript {
    fn default() -> Self {
        Self::new()
    }
}

impl Transcript {
    #[must_use]
    pub fn new() -> Self {
        Self::with_cap(HISTORY_CAP)
    }

    /// Creates an empty transcript with a custom eviction bound.
    ///
    /// A zero cap is clamped to one so an append is never a silent no-op.
    #[must_use]
    pub fn with_cap(cap: usize) -> Self {
        Self {
            messages: VecDeque::new(),
            cap: cap.max(1),
        }
    }

    pub fn append(&mut self, message: Message) {
        self.messages.push_back(message);
        while self.messages.len() > self.cap {
            self.messages.pop_front();
        }
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    #[must_use]
    pub fn cap(&self) -> usize {
        self.cap
    }

    pub fn messages(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter()
    }

    /// Restores from a persisted snapshot, keeping only the most recent
    /// `cap` entries when the snapshot holds more.
    #[must_use]
    pub fn from_snapshot(snapshot: TranscriptSnapshot, cap: usize) -> Self {
        let mut transcript = Self::with_cap(cap);
        let skip = snapshot.messages.len().saturating_sub(transcript.cap);
        transcript
            .messages
            .extend(snapshot.messages.into_iter().skip(skip));
        transcript
    }

    #[must_use]
    pub fn to_messages(&self) -> Vec<Message> {
        self.messages.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{Transcript, HISTORY_CAP};
    use crate::snapshot::{Message, TranscriptSnapshot};

    fn numbered(index: usize) -> Message {
        Message::user(format!("message {index}"))
    }

    #[test]
    fn append_enforces_the_cap_eagerly() {
        let mut transcript = Transcript::new();
        for index in 0..HISTORY_CAP + 10 {
            transcript.append(numbered(index));
            assert!(transcript.len() <= HISTORY_CAP);
        }

        assert_eq!(transcript.len(), HISTORY_CAP);
        let contents: Vec<&str> = transcript
            .messages()
            .map(|message| message.content.as_str())
            .collect();
        assert_eq!(contents.first(), Some(&"message 10"));
        assert_eq!(contents.last(), Some(&"message 69"));
    }

    #[test]
    fn retained_suffix_preserves_append_order() {
        let mut transcript = Transcript::with_cap(3);
        for index in 0..5 {
            transcript.append(numbered(index));
        }

        let contents: Vec<&str> = transcript
            .messages()
            .map(|message| message.content.as_str())
            .collect();
        assert_eq!(contents, vec!["message 2", "message 3", "message 4"]);
    }

    #[test]
    fn zero_cap_is_clamped() {
        let mut transcript = Transcript::with_cap(0);
        transcript.append(numbered(0));
        assert_eq!(transcript.len(), 1);
        transcript.append(numbered(1));
        assert_eq!(transcript.len(), 1);
    }

    #[test]
    fn oversized_snapshots_are_truncated_to_the_most_recent_entries() {
        let messages: Vec<Message> = (0..10).map(numbered).collect();
        let snapshot = TranscriptSnapshot::v1("2026-08-25T12:00:00Z", 10, messages);

        let transcript = Transcript::from_snapshot(snapshot, 4);
        let contents: Vec<&str> = transcript
            .messages()
            .map(|message| message.content.as_str())
            .collect();
        assert_eq!(
            contents,
            vec!["message 6", "message 7", "message 8", "message 9"]
        );
    }

    #[test]
    fn clear_empties_the_log() {
        let mut transcript = Transcript::new();
        transcript.append(numbered(0));
        transcript.clear();
        assert!(transcript.is_empty());
    }
}
