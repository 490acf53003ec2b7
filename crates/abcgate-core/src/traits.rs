//! Core trait definitions for notation parsers.
//!
//! The feature extractor only ever sees a [`ParsedTune`], so any parser that
//! can report pitches and bar boundaries can be substituted for the built-in
//! [`AbcParser`](crate::parser::AbcParser).

use serde::{Deserialize, Serialize};

use crate::error::ParseError;

// ---------------------------------------------------------------------------
// Notation parser trait
// ---------------------------------------------------------------------------

/// Trait for backends that turn notation text into a structured tune.
pub trait NotationParser: Send + Sync {
    /// Human-readable parser name (e.g. "abc").
    fn name(&self) -> &str;

    /// Parse notation text into a tune.
    fn parse(&self, text: &str) -> Result<ParsedTune, ParseError>;
}

/// A single musical event, in document order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TuneEvent {
    /// A note head. Chords produce one event per head.
    Note {
        /// MIDI pitch number (60 = middle C).
        pitch: u8,
        /// The note continues a tie from the previous note and does not
        /// sound again.
        tie_continuation: bool,
    },
    /// A rest or spacer.
    Rest,
    /// A bar-boundary marker.
    Bar,
}

/// A parsed tune: header fields plus the flattened event stream of every
/// voice.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedTune {
    /// Header fields as `(letter, value)` in source order.
    pub headers: Vec<(char, String)>,
    /// Events of all voices in document order.
    pub events: Vec<TuneEvent>,
    /// Number of body (staff) lines that contained music.
    pub staff_lines: usize,
}

impl ParsedTune {
    /// Returns the first value of a header field.
    pub fn header(&self, field: char) -> Option<&str> {
        self.headers
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, v)| v.as_str())
    }

    /// Returns `true` if at least one staff line was found.
    pub fn has_staff(&self) -> bool {
        self.staff_lines > 0
    }

    /// Every sounding pitch in performance order. Rests and tie
    /// continuations are excluded.
    pub fn sounding_pitches(&self) -> Vec<u8> {
        self.events
            .iter()
            .filter_map(|event| match event {
                TuneEvent::Note {
                    pitch,
                    tie_continuation: false,
                } => Some(*pitch),
                _ => None,
            })
            .collect()
    }

    /// Number of bar-boundary markers.
    pub fn bar_count(&self) -> usize {
        self.events
            .iter()
            .filter(|event| matches!(event, TuneEvent::Bar))
            .count()
    }
}

// ---------------------------------------------------------------------------
// Fenced block extraction
// ---------------------------------------------------------------------------

/// Extract the bodies of fenced code blocks tagged with `tag`.
///
/// The tag comparison is case-insensitive. An unterminated block at the end
/// of the document is still returned.
pub fn extract_fenced_blocks(document: &str, tag: &str) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut in_block = false;
    let mut is_tagged = false;
    let mut current_block = String::new();

    for line in document.lines() {
        let trimmed = line.trim();

        if !in_block && trimmed.starts_with("```") {
            in_block = true;
            let lang = trimmed.trim_start_matches('`').trim().to_lowercase();
            is_tagged = lang == tag;
            current_block.clear();
            continue;
        }

        if in_block && trimmed == "```" {
            in_block = false;
            if is_tagged {
                blocks.push(current_block.clone());
            }
            current_block.clear();
            continue;
        }

        if in_block {
            if !current_block.is_empty() {
                current_block.push('\n');
            }
            current_block.push_str(line);
        }
    }

    if in_block && is_tagged && !current_block.is_empty() {
        blocks.push(current_block);
    }

    blocks
}
