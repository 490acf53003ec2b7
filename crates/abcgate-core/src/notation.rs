//! Document-level helpers for ABC notation.
//!
//! Validates excerpts, pulls fenced ```abc blocks out of surrounding
//! Markdown, reads header metadata, and normalizes formatting.

use crate::error::ParseError;
use crate::model::{AbcMetadata, HeaderCheck, NotationBlock};
use crate::parser::{split_field_line, AbcParser};
use crate::traits::{extract_fenced_blocks, NotationParser};

/// Fence tag that marks a notation block.
pub const NOTATION_TAG: &str = "abc";

/// Title used when a document has neither a heading nor a titled block.
pub const UNTITLED: &str = "Untitled Material";

/// Header fields every publishable excerpt must carry, with display names.
pub const REQUIRED_HEADERS: [(&str, &str); 5] = [
    ("X:", "index"),
    ("T:", "title"),
    ("M:", "meter"),
    ("L:", "default length"),
    ("K:", "key"),
];

/// Validate ABC text with the built-in parser.
///
/// Returns `None` when the text parses, or a human-readable error message.
pub fn validate_syntax(text: &str) -> Option<String> {
    validate_syntax_with(&AbcParser, text)
}

/// Validate ABC text with an arbitrary parser.
pub fn validate_syntax_with(parser: &dyn NotationParser, text: &str) -> Option<String> {
    if text.trim().is_empty() {
        return Some(ParseError::Empty.to_string());
    }
    match parser.parse(text) {
        Ok(tune) if !tune.has_staff() => Some(ParseError::NoStaff.to_string()),
        Ok(_) => None,
        Err(e) if e.is_structural() => Some(e.to_string()),
        Err(e) => Some(format!("syntax error: {e}")),
    }
}

/// Extract every fenced notation block from a document, in order.
pub fn extract_blocks(document: &str) -> Vec<NotationBlock> {
    extract_fenced_blocks(document, NOTATION_TAG)
        .into_iter()
        .enumerate()
        .map(|(idx, raw_text)| {
            let ordinal = idx + 1;
            let title = raw_text
                .lines()
                .find_map(|line| {
                    let title = line.trim().strip_prefix("T:")?.trim();
                    (!title.is_empty()).then(|| title.to_string())
                })
                .unwrap_or_else(|| format!("楽譜 {ordinal}"));
            NotationBlock {
                id: format!("block-{ordinal}"),
                title,
                raw_text,
            }
        })
        .collect()
}

/// Read header metadata in a single pass. The first occurrence of each
/// field wins.
pub fn extract_metadata(raw_text: &str) -> AbcMetadata {
    let mut meta = AbcMetadata::default();

    for line in raw_text.lines() {
        let Some((field, value)) = split_field_line(line.trim()) else {
            continue;
        };
        if value.is_empty() {
            continue;
        }
        let slot = match field {
            'T' => &mut meta.title,
            'C' => &mut meta.composer,
            'M' => &mut meta.meter,
            'K' => &mut meta.key,
            'L' => &mut meta.length,
            'Q' => {
                if meta.tempo.is_none() {
                    meta.tempo = parse_tempo(value);
                }
                continue;
            }
            _ => continue,
        };
        if slot.is_none() {
            *slot = Some(value.to_string());
        }
    }

    meta
}

/// Parse a `Q:` value into quarter notes per minute.
///
/// Accepts `1/4=120`, `"Allegro" 1/4=132`, or a bare `100`.
pub fn parse_tempo(value: &str) -> Option<u32> {
    let digits_after = |s: &str| -> Option<u32> {
        let digits: String = s
            .trim_start()
            .chars()
            .take_while(|c| c.is_ascii_digit())
            .collect();
        digits.parse().ok()
    };

    match value.split_once('=') {
        Some((_, bpm)) => digits_after(bpm),
        None => {
            let trimmed = value.trim();
            if !trimmed.is_empty() && trimmed.chars().all(|c| c.is_ascii_digit()) {
                trimmed.parse().ok()
            } else {
                None
            }
        }
    }
}

/// Check that the five required header fields appear somewhere in the text.
pub fn has_required_headers(raw_text: &str) -> HeaderCheck {
    let missing: Vec<String> = REQUIRED_HEADERS
        .iter()
        .filter(|(marker, _)| !raw_text.contains(marker))
        .map(|(_, name)| name.to_string())
        .collect();

    HeaderCheck {
        valid: missing.is_empty(),
        missing,
    }
}

/// Normalize an excerpt's layout.
///
/// Header lines are kept verbatim up to and including `K:`, followed by
/// exactly one blank line. Body lines are trimmed with whitespace runs
/// collapsed; blank body lines and any body text before `K:` are dropped.
pub fn format_abc(raw_text: &str) -> String {
    let mut out: Vec<String> = Vec::new();
    let mut in_header = true;

    for line in raw_text.lines() {
        let trimmed = line.trim();

        if in_header {
            if split_field_line(trimmed).is_some() || trimmed.starts_with('%') {
                out.push(line.to_string());
                if trimmed.starts_with("K:") {
                    out.push(String::new());
                    in_header = false;
                }
            }
            continue;
        }

        if trimmed.is_empty() {
            continue;
        }
        out.push(trimmed.split_whitespace().collect::<Vec<_>>().join(" "));
    }

    out.join("\n")
}

/// Pick a display title for a document: its first `# ` heading, else the
/// first notation block's title, else [`UNTITLED`].
pub fn extract_title(document: &str) -> String {
    let mut in_fence = false;
    for line in document.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with("```") {
            in_fence = !in_fence;
            continue;
        }
        if in_fence {
            continue;
        }
        if let Some(heading) = trimmed.strip_prefix("# ") {
            let heading = heading.trim();
            if !heading.is_empty() {
                return heading.to_string();
            }
        }
    }

    extract_blocks(document)
        .into_iter()
        .next()
        .map(|block| block.title)
        .unwrap_or_else(|| UNTITLED.to_string())
}
