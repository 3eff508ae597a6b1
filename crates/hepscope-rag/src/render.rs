//! Citation markers in answer text.
//!
//! Answers reference their sources with bracketed numbers, `[1]`, `[2]`, …
//! where `[n]` points at citation key `n - 1`.

use std::collections::BTreeMap;

use hepscope_literature::models::Citation;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

lazy_static! {
    static ref MARKER: Regex = Regex::new(r"\[(\d+)\]").unwrap();
    // Also covers the `[n:m]` range form some answers use.
    static ref COPY_MARKER: Regex = Regex::new(r"\s*\[\d+(?::\d+)?\]").unwrap();
}

/// A piece of rendered answer text.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnswerSegment {
    Text { text: String },
    Citation {
        /// Number as written in the answer.
        marker: u32,
        /// Number shown on the badge.
        display: u32,
        paper_id: u64,
        snippet: String,
    },
}

fn push_text(segments: &mut Vec<AnswerSegment>, text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(AnswerSegment::Text { text: last }) = segments.last_mut() {
        last.push_str(text);
    } else {
        segments.push(AnswerSegment::Text { text: text.to_string() });
    }
}

/// Split `text` into plain text and citation badges.
///
/// Markers without a matching citation stay in the text verbatim.
pub fn render_with_citations(text: &str, citations: &BTreeMap<u32, Citation>) -> Vec<AnswerSegment> {
    let mut segments = Vec::new();
    let mut last = 0;

    for caps in MARKER.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        push_text(&mut segments, &text[last..whole.start()]);
        last = whole.end();

        let marker = caps[1].parse::<u32>().ok();
        let citation = marker
            .and_then(|n| n.checked_sub(1))
            .and_then(|key| citations.get(&key));

        match (marker, citation) {
            (Some(marker), Some(c)) => segments.push(AnswerSegment::Citation {
                marker,
                display: c.doc_id,
                paper_id: c.control_number,
                snippet: c.snippet.clone(),
            }),
            _ => push_text(&mut segments, whole.as_str()),
        }
    }
    push_text(&mut segments, &text[last..]);
    segments
}

/// Answer text for the clipboard: citation markers and the whitespace in
/// front of them removed, everything else untouched.
pub fn strip_citation_markers(text: &str) -> String {
    COPY_MARKER.replace_all(text, "").into_owned()
}
