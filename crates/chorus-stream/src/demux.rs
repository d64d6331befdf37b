// SPDX-FileCopyrightText: 2026 Chorus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Splits a token stream into visible speech and an annotation payload.
//!
//! The model appends [`ANNOTATION_DELIMITER`] followed by JSON after its
//! visible remark. Characters that could be the start of the delimiter are
//! held back until they either complete it or prove to be ordinary text.
//! Once the delimiter is seen, everything after it is payload and is never
//! shown.

/// Separates visible speech from the annotation payload.
pub const ANNOTATION_DELIMITER: &str = "\n---annotations---";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DemuxState {
    /// Passing characters through.
    Streaming,
    /// Holding a possible delimiter prefix.
    Buffering,
    /// Delimiter seen; the rest is payload.
    SideChannel,
}

/// Result of a finished stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemuxOutput {
    /// Held-back text released at end of stream. Not yet emitted.
    pub tail: String,
    /// Everything shown to the writer, including `tail`.
    pub display: String,
    /// Trimmed text after the delimiter, if the delimiter appeared.
    pub payload: Option<String>,
}

#[derive(Debug)]
pub struct AnnotationDemux {
    enabled: bool,
    state: DemuxState,
    buffer: String,
    display: String,
    payload: String,
}

impl AnnotationDemux {
    /// With `enabled` false every character is display text.
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            state: DemuxState::Streaming,
            buffer: String::new(),
            display: String::new(),
            payload: String::new(),
        }
    }

    pub fn state(&self) -> DemuxState {
        self.state
    }

    /// Feed one chunk. Returns the text that may be shown now, possibly empty.
    pub fn push(&mut self, chunk: &str) -> String {
        if !self.enabled {
            self.display.push_str(chunk);
            return chunk.to_string();
        }

        let mut out = String::new();
        for c in chunk.chars() {
            if self.state == DemuxState::SideChannel {
                self.payload.push(c);
                continue;
            }
            self.buffer.push(c);
            if ANNOTATION_DELIMITER.starts_with(self.buffer.as_str()) {
                if self.buffer.len() == ANNOTATION_DELIMITER.len() {
                    self.buffer.clear();
                    self.state = DemuxState::SideChannel;
                } else {
                    self.state = DemuxState::Buffering;
                }
                continue;
            }
            // False alarm. Keep the longest suffix that could still start
            // the delimiter and release the rest.
            let keep_from = self
                .buffer
                .char_indices()
                .skip(1)
                .map(|(i, _)| i)
                .find(|&i| ANNOTATION_DELIMITER.starts_with(&self.buffer[i..]))
                .unwrap_or(self.buffer.len());
            out.push_str(&self.buffer[..keep_from]);
            self.buffer.drain(..keep_from);
            self.state = if self.buffer.is_empty() {
                DemuxState::Streaming
            } else {
                DemuxState::Buffering
            };
        }
        self.display.push_str(&out);
        out
    }

    /// End of stream. A partial delimiter is released as display text.
    pub fn finish(mut self) -> DemuxOutput {
        let tail = std::mem::take(&mut self.buffer);
        self.display.push_str(&tail);
        let payload =
            (self.state == DemuxState::SideChannel).then(|| self.payload.trim().to_string());
        DemuxOutput {
            tail,
            display: self.display,
            payload,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(chunks: &[&str]) -> (String, DemuxOutput) {
        let mut demux = AnnotationDemux::new(true);
        let mut shown = String::new();
        for chunk in chunks {
            shown.push_str(&demux.push(chunk));
        }
        let out = demux.finish();
        shown.push_str(&out.tail);
        (shown, out)
    }

    #[test]
    fn separates_display_from_payload() {
        let (shown, out) = run(&["Hi there.\n---annotations---\n{\"highlights\":[\"there\"]}"]);
        assert_eq!(shown, "Hi there.");
        assert_eq!(out.display, "Hi there.");
        assert_eq!(out.payload.as_deref(), Some("{\"highlights\":[\"there\"]}"));
    }

    #[test]
    fn delimiter_split_across_chunks() {
        let (shown, out) = run(&["Hi", " there.\n--", "-annot", "ations---", "\n{}"]);
        assert_eq!(shown, "Hi there.");
        assert_eq!(out.payload.as_deref(), Some("{}"));
    }

    #[test]
    fn near_miss_is_flushed_in_order() {
        let (shown, out) = run(&["line one\n--- not a delimiter\nline two"]);
        assert_eq!(shown, "line one\n--- not a delimiter\nline two");
        assert_eq!(out.payload, None);
    }

    #[test]
    fn partial_delimiter_at_end_is_released() {
        let (shown, out) = run(&["Done.\n---annot"]);
        assert_eq!(shown, "Done.\n---annot");
        assert_eq!(out.tail, "\n---annot");
        assert_eq!(out.payload, None);
    }

    #[test]
    fn delimiter_right_after_near_miss_is_detected() {
        let (shown, out) = run(&["ok\n-\n---annotations---{\"a\":1}"]);
        assert_eq!(shown, "ok\n-");
        assert_eq!(out.payload.as_deref(), Some("{\"a\":1}"));
    }

    #[test]
    fn buffering_state_is_visible() {
        let mut demux = AnnotationDemux::new(true);
        assert!(demux.push("text\n--").eq("text"));
        assert_eq!(demux.state(), DemuxState::Buffering);
        demux.push("-annotations---");
        assert_eq!(demux.state(), DemuxState::SideChannel);
    }

    #[test]
    fn disabled_passes_everything_through() {
        let mut demux = AnnotationDemux::new(false);
        assert_eq!(demux.push("a\n---annotations---b"), "a\n---annotations---b");
        let out = demux.finish();
        assert_eq!(out.display, "a\n---annotations---b");
        assert_eq!(out.payload, None);
    }

    #[test]
    fn multibyte_text_is_preserved() {
        let (shown, _) = run(&["café\n", "—ü", "日本"]);
        assert_eq!(shown, "café\n—ü日本");
    }
}
