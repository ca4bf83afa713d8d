/// Decoded protocol unit produced by the delta extractor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// One incremental fragment of assistant text.
    Delta { text: String },
    /// Terminal sentinel; no further deltas follow for this response.
    Terminal,
    /// Unparsable payload, skipped without aborting the stream.
    Malformed,
}

impl StreamEvent {
    /// Returns true when this event ends delta extraction for the response.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Terminal)
    }
}
