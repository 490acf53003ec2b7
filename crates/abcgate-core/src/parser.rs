//! ABC notation parser.
//!
//! A compact, line-oriented parser that understands just enough of ABC 2.1
//! to recover every sounding pitch and every bar boundary. Durations,
//! ornaments, lyrics, and layout directives are consumed and discarded.

use std::collections::HashMap;

use crate::error::ParseError;
use crate::traits::{NotationParser, ParsedTune, TuneEvent};

/// Semitone offset of each natural note letter from C, indexed C D E F G A B.
const STEP_SEMITONES: [i32; 7] = [0, 2, 4, 5, 7, 9, 11];

/// Letter indices in the order sharps are added to a key signature.
const SHARP_ORDER: [usize; 7] = [3, 0, 4, 1, 5, 2, 6];

/// Letter indices in the order flats are added to a key signature.
const FLAT_ORDER: [usize; 7] = [6, 2, 5, 1, 4, 0, 3];

/// Clef names that may stand alone in a `K:` field.
const CLEF_NAMES: &[&str] = &["treble", "bass", "baritone", "alto", "tenor", "perc"];

/// Decoration shorthand characters that may prefix a note.
const DECORATION_SHORTHANDS: &[char] = &['.', '~', 'H', 'L', 'M', 'O', 'P', 'S', 'T', 'u', 'v'];

/// The built-in ABC parser.
#[derive(Debug, Clone, Copy, Default)]
pub struct AbcParser;

impl NotationParser for AbcParser {
    fn name(&self) -> &str {
        "abc"
    }

    fn parse(&self, text: &str) -> Result<ParsedTune, ParseError> {
        parse_abc(text)
    }
}

/// Parse ABC text into a [`ParsedTune`].
pub fn parse_abc(text: &str) -> Result<ParsedTune, ParseError> {
    if text.trim().is_empty() {
        return Err(ParseError::Empty);
    }

    let mut tune = ParsedTune::default();
    let mut state = BodyState::default();

    for (idx, raw_line) in text.lines().enumerate() {
        if raw_line.trim_start().starts_with("%%") {
            continue;
        }
        let line = strip_comment(raw_line);
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        if let Some((field, value)) = split_field_line(trimmed) {
            state.apply_field(field, value);
            tune.headers.push((field, value.to_string()));
            continue;
        }

        let before = tune.events.len();
        LineScanner::new(line, idx + 1, &mut state, &mut tune).scan()?;
        if tune.events.len() > before {
            tune.staff_lines += 1;
        }
    }

    if !tune.has_staff() {
        return Err(ParseError::NoStaff);
    }

    Ok(tune)
}

/// Split an `X:value` information field line. Returns `None` for body lines.
pub(crate) fn split_field_line(line: &str) -> Option<(char, &str)> {
    let mut chars = line.chars();
    let field = chars.next()?;
    if !(field.is_ascii_alphabetic() || field == '+') {
        return None;
    }
    if chars.next()? != ':' {
        return None;
    }
    Some((field, line[2..].trim()))
}

fn strip_comment(line: &str) -> &str {
    match line.find('%') {
        Some(pos) => &line[..pos],
        None => line,
    }
}

// ---------------------------------------------------------------------------
// Key signatures
// ---------------------------------------------------------------------------

/// Accidental (in semitones) that a key signature applies to each letter,
/// indexed C D E F G A B.
pub fn key_signature(value: &str) -> [i32; 7] {
    let mut accidentals = [0i32; 7];
    let mut tokens = value.split_whitespace();
    let Some(first) = tokens.next() else {
        return accidentals;
    };

    if first.eq_ignore_ascii_case("none")
        || first.eq_ignore_ascii_case("hp")
        || is_clef(first)
    {
        return accidentals;
    }

    let mut chars = first.chars().peekable();
    let Some(root) = chars.next() else {
        return accidentals;
    };
    let mut fifths = match root.to_ascii_uppercase() {
        'C' => 0,
        'G' => 1,
        'D' => 2,
        'A' => 3,
        'E' => 4,
        'B' => 5,
        'F' => -1,
        _ => return accidentals,
    };
    match chars.peek() {
        Some('#') => {
            fifths += 7;
            chars.next();
        }
        Some('b') => {
            fifths -= 7;
            chars.next();
        }
        _ => {}
    }

    let mut mode: String = chars.collect::<String>().to_lowercase();
    if mode.is_empty() {
        if let Some(next) = tokens.next() {
            if !next.contains('=') {
                mode = next.to_lowercase();
            }
        }
    }
    fifths += mode_offset(&mode);

    let fifths = fifths.clamp(-7, 7);
    if fifths > 0 {
        for &letter in &SHARP_ORDER[..fifths as usize] {
            accidentals[letter] = 1;
        }
    } else if fifths < 0 {
        for &letter in &FLAT_ORDER[..fifths.unsigned_abs() as usize] {
            accidentals[letter] = -1;
        }
    }
    accidentals
}

/// A `K:` field may name only a clef, in which case no key is set.
fn is_clef(token: &str) -> bool {
    let token = token.to_ascii_lowercase();
    token.starts_with("clef=")
        || CLEF_NAMES.iter().any(|name| token.starts_with(name))
}

fn mode_offset(mode: &str) -> i32 {
    if mode == "m" {
        return -3;
    }
    let prefix: String = mode.chars().take(3).collect();
    match prefix.as_str() {
        "min" | "aeo" => -3,
        "mix" => -1,
        "dor" => -2,
        "phr" => -4,
        "lyd" => 1,
        "loc" => -5,
        _ => 0,
    }
}

// ---------------------------------------------------------------------------
// Body scanning
// ---------------------------------------------------------------------------

/// State that carries across body lines.
#[derive(Debug, Default)]
struct BodyState {
    key: [i32; 7],
    /// Explicit accidentals in the current measure, keyed by (letter, octave).
    measure: HashMap<(usize, i32), i32>,
    /// Pitches tied into the next note or chord.
    tied: Vec<u8>,
    /// Accidentals of tied notes carried over a bar line, valid for the
    /// next note or chord only.
    carried: HashMap<(usize, i32), i32>,
}

impl BodyState {
    fn apply_field(&mut self, field: char, value: &str) {
        if field == 'K' {
            self.key = key_signature(value);
            self.measure.clear();
        }
    }

    fn bar(&mut self) {
        let tied = &self.tied;
        self.carried = self
            .measure
            .drain()
            .filter(|&((step, octave), acc)| {
                u8::try_from(midi_pitch(step, octave, acc)).is_ok_and(|p| tied.contains(&p))
            })
            .collect();
    }

    fn take_tied(&mut self) -> Vec<u8> {
        self.carried.clear();
        std::mem::take(&mut self.tied)
    }
}

/// One parsed note head, before tie resolution.
struct NoteHead {
    pitch: u8,
    tie_out: bool,
}

struct LineScanner<'a> {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    state: &'a mut BodyState,
    tune: &'a mut ParsedTune,
}

impl<'a> LineScanner<'a> {
    fn new(text: &str, line: usize, state: &'a mut BodyState, tune: &'a mut ParsedTune) -> Self {
        Self {
            chars: text.chars().collect(),
            pos: 0,
            line,
            state,
            tune,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn column(&self) -> usize {
        self.pos + 1
    }

    fn scan(mut self) -> Result<(), ParseError> {
        while let Some(c) = self.peek() {
            match c {
                c if c.is_whitespace() => self.pos += 1,
                '`' | '\\' | '&' | '$' | ')' | '>' | '<' | '-' | 'y' => self.pos += 1,
                '|' | ':' => self.scan_bar(),
                '[' => self.scan_bracket()?,
                '{' => self.skip_until('}', |line, column| ParseError::UnterminatedGrace {
                    line,
                    column,
                })?,
                '"' => self.skip_until('"', |line, column| {
                    ParseError::UnterminatedAnnotation { line, column }
                })?,
                '!' => self.skip_until('!', |line, column| {
                    ParseError::UnterminatedDecoration { line, column }
                })?,
                '+' => self.skip_until('+', |line, column| {
                    ParseError::UnterminatedDecoration { line, column }
                })?,
                '(' => self.scan_tuplet_or_slur(),
                'z' | 'x' | 'Z' | 'X' => {
                    self.pos += 1;
                    self.skip_length();
                    self.state.take_tied();
                    self.tune.events.push(TuneEvent::Rest);
                }
                c if DECORATION_SHORTHANDS.contains(&c) => self.pos += 1,
                '^' | '_' | '=' | 'A'..='G' | 'a'..='g' => {
                    let head = self.scan_note()?;
                    let tied_in = self.state.take_tied();
                    self.push_head(&head, &tied_in);
                    if head.tie_out {
                        self.state.tied.push(head.pitch);
                    }
                }
                ch => {
                    return Err(ParseError::UnexpectedCharacter {
                        ch,
                        line: self.line,
                        column: self.column(),
                    })
                }
            }
        }
        Ok(())
    }

    fn push_head(&mut self, head: &NoteHead, tied_in: &[u8]) {
        self.tune.events.push(TuneEvent::Note {
            pitch: head.pitch,
            tie_continuation: tied_in.contains(&head.pitch),
        });
    }

    /// Consume one contiguous bar token (`|`, `||`, `|]`, `:|`, `|:`, `::`,
    /// ...) plus any volta numbers that follow it.
    fn scan_bar(&mut self) {
        while matches!(self.peek(), Some('|') | Some(':')) {
            self.pos += 1;
        }
        if self.peek() == Some(']') {
            self.pos += 1;
        }
        self.skip_volta();
        self.state.bar();
        self.tune.events.push(TuneEvent::Bar);
    }

    fn skip_volta(&mut self) {
        while let Some(c) = self.peek() {
            let continues_list =
                (c == ',' || c == '-') && self.peek_at(1).is_some_and(|n| n.is_ascii_digit());
            if c.is_ascii_digit() || continues_list {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    fn scan_bracket(&mut self) -> Result<(), ParseError> {
        let column = self.column();
        match self.peek_at(1) {
            Some('|') => {
                self.pos += 1;
                self.scan_bar();
                Ok(())
            }
            Some(d) if d.is_ascii_digit() => {
                self.pos += 1;
                self.skip_volta();
                Ok(())
            }
            Some(f) if f.is_ascii_alphabetic() && self.peek_at(2) == Some(':') => {
                let start = self.pos + 1;
                let Some(len) = self.chars[start..].iter().position(|&c| c == ']') else {
                    return Err(ParseError::UnterminatedChord {
                        line: self.line,
                        column,
                    });
                };
                let field: String = self.chars[start..start + len].iter().collect();
                if let Some((letter, value)) = split_field_line(&field) {
                    self.state.apply_field(letter, value);
                    self.tune.headers.push((letter, value.to_string()));
                }
                self.pos = start + len + 1;
                Ok(())
            }
            _ => self.scan_chord(column),
        }
    }

    fn scan_chord(&mut self, column: usize) -> Result<(), ParseError> {
        self.pos += 1;
        let mut heads = Vec::new();
        loop {
            match self.peek() {
                None => {
                    return Err(ParseError::UnterminatedChord {
                        line: self.line,
                        column,
                    })
                }
                Some(']') => {
                    self.pos += 1;
                    break;
                }
                Some('"') => self.skip_until('"', |line, column| {
                    ParseError::UnterminatedAnnotation { line, column }
                })?,
                Some('!') => self.skip_until('!', |line, column| {
                    ParseError::UnterminatedDecoration { line, column }
                })?,
                Some(c) if c.is_whitespace() || DECORATION_SHORTHANDS.contains(&c) => {
                    self.pos += 1
                }
                Some('^' | '_' | '=' | 'A'..='G' | 'a'..='g') => heads.push(self.scan_note()?),
                Some(ch) => {
                    return Err(ParseError::UnexpectedCharacter {
                        ch,
                        line: self.line,
                        column: self.column(),
                    })
                }
            }
        }

        self.skip_length();
        let chord_tied = self.peek() == Some('-');
        if chord_tied {
            self.pos += 1;
        }

        let tied_in = self.state.take_tied();
        for head in &heads {
            self.push_head(head, &tied_in);
            if chord_tied || head.tie_out {
                self.state.tied.push(head.pitch);
            }
        }
        Ok(())
    }

    fn scan_note(&mut self) -> Result<NoteHead, ParseError> {
        let column = self.column();

        let mut explicit: Option<i32> = None;
        loop {
            match self.peek() {
                Some('^') => *explicit.get_or_insert(0) += 1,
                Some('_') => *explicit.get_or_insert(0) -= 1,
                Some('=') => explicit = Some(0),
                _ => break,
            }
            self.pos += 1;
        }

        let letter = match self.peek() {
            Some(c @ ('A'..='G' | 'a'..='g')) => c,
            Some(ch) => {
                return Err(ParseError::UnexpectedCharacter {
                    ch,
                    line: self.line,
                    column: self.column(),
                })
            }
            None => {
                return Err(ParseError::UnexpectedCharacter {
                    ch: self.chars[self.pos - 1],
                    line: self.line,
                    column: self.pos,
                })
            }
        };
        self.pos += 1;

        let mut octave = if letter.is_ascii_lowercase() { 1 } else { 0 };
        while let Some(mark) = self.peek() {
            match mark {
                '\'' => octave += 1,
                ',' => octave -= 1,
                _ => break,
            }
            self.pos += 1;
        }

        let step = letter_index(letter);
        let accidental = match explicit {
            Some(acc) => {
                self.state.measure.insert((step, octave), acc);
                acc
            }
            None => self
                .state
                .measure
                .get(&(step, octave))
                .or_else(|| self.state.carried.get(&(step, octave)))
                .copied()
                .unwrap_or(self.state.key[step]),
        };

        let midi = midi_pitch(step, octave, accidental);
        let pitch = u8::try_from(midi)
            .ok()
            .filter(|p| *p <= 127)
            .ok_or(ParseError::PitchOutOfRange {
                line: self.line,
                column,
            })?;

        self.skip_length();
        let tie_out = self.peek() == Some('-');
        if tie_out {
            self.pos += 1;
        }

        Ok(NoteHead { pitch, tie_out })
    }

    /// Skip a duration such as `2`, `/`, `3/2`, or `//`.
    fn skip_length(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_ascii_digit() || c == '/') {
            self.pos += 1;
        }
    }

    fn scan_tuplet_or_slur(&mut self) {
        self.pos += 1;
        if !self.peek().is_some_and(|c| c.is_ascii_digit()) {
            return;
        }
        while matches!(self.peek(), Some(c) if c.is_ascii_digit() || c == ':') {
            self.pos += 1;
        }
    }

    fn skip_until(
        &mut self,
        close: char,
        unterminated: impl FnOnce(usize, usize) -> ParseError,
    ) -> Result<(), ParseError> {
        let column = self.column();
        let start = self.pos + 1;
        match self.chars[start..].iter().position(|&c| c == close) {
            Some(len) => {
                self.pos = start + len + 1;
                Ok(())
            }
            None => Err(unterminated(self.line, column)),
        }
    }
}

fn midi_pitch(step: usize, octave: i32, accidental: i32) -> i32 {
    60 + 12 * octave + STEP_SEMITONES[step] + accidental
}

fn letter_index(letter: char) -> usize {
    match letter.to_ascii_uppercase() {
        'C' => 0,
        'D' => 1,
        'E' => 2,
        'F' => 3,
        'G' => 4,
        'A' => 5,
        _ => 6,
    }
}
