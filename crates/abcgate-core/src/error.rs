//! Notation parse error types.
//!
//! These errors describe why a piece of ABC text could not be turned into a
//! [`ParsedTune`](crate::traits::ParsedTune). They never cross the public
//! analysis boundary as faults: the validator turns them into messages and
//! the feature extractor turns them into `None`.

use thiserror::Error;

/// Errors that can occur while parsing ABC notation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The input contained no text at all.
    #[error("notation is empty")]
    Empty,

    /// Headers were present but no body line produced any music.
    #[error("structure invalid, no staff found")]
    NoStaff,

    /// A `[` chord was opened but never closed on the same line.
    #[error("unterminated chord at line {line}, column {column}")]
    UnterminatedChord { line: usize, column: usize },

    /// A `{` grace group was opened but never closed on the same line.
    #[error("unterminated grace notes at line {line}, column {column}")]
    UnterminatedGrace { line: usize, column: usize },

    /// A `"` annotation or chord symbol was opened but never closed.
    #[error("unterminated annotation at line {line}, column {column}")]
    UnterminatedAnnotation { line: usize, column: usize },

    /// A `!` or `+` decoration was opened but never closed.
    #[error("unterminated decoration at line {line}, column {column}")]
    UnterminatedDecoration { line: usize, column: usize },

    /// A character that has no meaning in a tune body.
    #[error("unexpected character '{ch}' at line {line}, column {column}")]
    UnexpectedCharacter { ch: char, line: usize, column: usize },

    /// A note was pushed outside the MIDI pitch range by octave marks.
    #[error("pitch out of range at line {line}, column {column}")]
    PitchOutOfRange { line: usize, column: usize },
}

impl ParseError {
    /// Returns `true` if the text itself was structurally unusable, as
    /// opposed to containing a localized syntax mistake.
    pub fn is_structural(&self) -> bool {
        matches!(self, ParseError::Empty | ParseError::NoStaff)
    }

    /// Returns the 1-based source line of a localized syntax error.
    pub fn line(&self) -> Option<usize> {
        match self {
            ParseError::UnterminatedChord { line, .. }
            | ParseError::UnterminatedGrace { line, .. }
            | ParseError::UnterminatedAnnotation { line, .. }
            | ParseError::UnterminatedDecoration { line, .. }
            | ParseError::UnexpectedCharacter { line, .. }
            | ParseError::PitchOutOfRange { line, .. } => Some(*line),
            ParseError::Empty | ParseError::NoStaff => None,
        }
    }
}
