use serde::Deserialize;

use crate::events::StreamEvent;

/// Event-prefix convention for streamed chat-completions lines.
const DATA_PREFIX: &str = "data:";
/// Reserved payload signalling that no further deltas will arrive.
const TERMINAL_SENTINEL: &str = "[DONE]";

/// Incremental line decoder for SSE byte streams.
///
/// Transport chunks arrive at arbitrary boundaries; the decoder carries both
/// an incomplete multi-byte UTF-8 sequence and an incomplete line across
/// calls, so any re-chunking of the same bytes yields the same line sequence.
#[derive(Debug, Default)]
pub struct SseLineDecoder {
    /// Undecoded tail of a multi-byte character split across chunks.
    pending: Vec<u8>,
    /// Decoded text still missing its line terminator.
    carry: String,
}

impl SseLineDecoder {
    /// Feed one transport chunk and drain all complete lines.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        if chunk.is_empty() {
            return Vec::new();
        }
        self.pending.extend_from_slice(chunk);
        self.decode_pending();

        let mut lines = Vec::new();
        while let Some(split) = self.carry.find('\n') {
            let mut line: String = self.carry.drain(..=split).collect();
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
            lines.push(line);
        }
        lines
    }

    /// Move every decodable byte from `pending` into `carry`.
    ///
    /// A truncated multi-byte sequence stays pending until the next chunk;
    /// genuinely invalid bytes are replaced so one bad chunk cannot wedge
    /// the stream.
    fn decode_pending(&mut self) {
        loop {
            match std::str::from_utf8(&self.pending) {
                Ok(text) => {
                    self.carry.push_str(text);
                    self.pending.clear();
                    return;
                }
                Err(error) => {
                    let valid = error.valid_up_to();
                    self.carry
                        .push_str(std::str::from_utf8(&self.pending[..valid]).unwrap_or_default());
                    match error.error_len() {
                        Some(invalid) => {
                            self.carry.push(char::REPLACEMENT_CHARACTER);
                            self.pending.drain(..valid + invalid);
                        }
                        None => {
                            self.pending.drain(..valid);
                            return;
                        }
                    }
                }
            }
        }
    }

    /// Consume the decoder at end of stream.
    ///
    /// A trailing fragment without a terminator is not a valid record; it is
    /// returned for diagnostics only and must never be classified.
    #[must_use]
    pub fn finish(self) -> Option<String> {
        let mut remainder = self.carry;
        remainder.push_str(&String::from_utf8_lossy(&self.pending));
        if remainder.is_empty() {
            None
        } else {
            Some(remainder)
        }
    }
}

/// Classify one decoded line into at most one stream event.
///
/// Lines without the `data:` prefix (keep-alive blanks, `:` comments) are
/// framing noise, not protocol violations. An unparsable payload is reported
/// as [`StreamEvent::Malformed`] without aborting the stream, and a parsed
/// record without incremental text yields nothing.
#[must_use]
pub fn classify_line(line: &str) -> Option<StreamEvent> {
    let payload = line.strip_prefix(DATA_PREFIX)?.trim();
    if payload == TERMINAL_SENTINEL {
        return Some(StreamEvent::Terminal);
    }
    if payload.is_empty() {
        return None;
    }
    match serde_json::from_str::<ChatCompletionChunk>(payload) {
        Ok(chunk) => chunk.delta_text().map(|text| StreamEvent::Delta { text }),
        Err(_) => Some(StreamEvent::Malformed),
    }
}

/// One streamed chat-completions chunk, reduced to the fields the consumer
/// reads. Schema fields this client does not understand pass through serde
/// untouched.
#[derive(Debug, Deserialize)]
struct ChatCompletionChunk {
    #[serde(default)]
    choices: Vec<ChunkChoice>,
}

#[derive(Debug, Deserialize)]
struct ChunkChoice {
    #[serde(default)]
    delta: ChunkDelta,
}

#[derive(Debug, Default, Deserialize)]
struct ChunkDelta {
    #[serde(default)]
    content: Option<String>,
}

impl ChatCompletionChunk {
    /// Incremental text of the first choice, when present and non-empty.
    fn delta_text(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.delta.content)
            .filter(|text| !text.is_empty())
    }
}
