//! Feature extraction from parsed tunes.
//!
//! Walks the flattened note sequence once for range and interval
//! statistics, then once more with a 4-note window for repetition.

use std::collections::{BTreeSet, HashMap};

use crate::instruments::InstrumentProfile;
use crate::model::{AnalysisFeatures, DifficultyLevel};
use crate::notation::parse_tempo;
use crate::traits::{NotationParser, ParsedTune};

/// Tempo assumed when the tune has no usable `Q:` header.
pub const DEFAULT_TEMPO_QPM: u32 = 120;

/// Width of the repetition window, in notes.
pub const REPETITION_WINDOW: usize = 4;

/// Smallest interval counted as a leap (a perfect fourth).
pub const LEAP_SEMITONES: u8 = 5;

/// Parse `text` and extract features for an instrument profile.
///
/// Returns `None` when the text does not parse or contains no sounding notes.
pub fn extract_features(
    parser: &dyn NotationParser,
    text: &str,
    profile: &InstrumentProfile,
) -> Option<AnalysisFeatures> {
    let tune = match parser.parse(text) {
        Ok(tune) => tune,
        Err(e) => {
            tracing::debug!(parser = parser.name(), "notation did not parse: {e}");
            return None;
        }
    };
    features_from_tune(&tune, profile)
}

/// Extract features from an already-parsed tune.
pub fn features_from_tune(
    tune: &ParsedTune,
    profile: &InstrumentProfile,
) -> Option<AnalysisFeatures> {
    let notes = tune.sounding_pitches();
    if notes.is_empty() {
        tracing::debug!("tune has no sounding notes");
        return None;
    }

    let note_count = notes.len();
    let measure_count = tune.bar_count().max(1);
    let unique_pitches = notes.iter().collect::<BTreeSet<_>>().len();

    let range_min = notes.iter().copied().min().unwrap_or_default();
    let range_max = notes.iter().copied().max().unwrap_or_default();
    let range_ok = range_min >= profile.comfortable_min && range_max <= profile.comfortable_max;

    let leaps = LeapStats::from_notes(&notes);
    let chromatic_density = chromatic_density(&notes);
    let notes_per_measure = note_count as f64 / measure_count as f64;
    let repetition = RepetitionStats::from_notes(&notes);
    let tempo_qpm = tune
        .header('Q')
        .and_then(parse_tempo)
        .unwrap_or(DEFAULT_TEMPO_QPM);

    let range_span = range_max - range_min;
    let difficulty_level =
        difficulty_level(range_span, leaps.mean, notes_per_measure, tempo_qpm);

    Some(AnalysisFeatures {
        note_count,
        measure_count,
        unique_pitches,
        range_min,
        range_max,
        range_span,
        range_ok,
        leap_mean: leaps.mean,
        leap_max: leaps.max,
        leap_count: leaps.count,
        chromatic_density,
        notes_per_measure,
        repetition_ratio: repetition.ratio,
        sequence_count: repetition.sequence_count,
        tempo_qpm,
        difficulty_level,
    })
}

/// Interval statistics over consecutive notes. Repeated pitches are not
/// leaps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LeapStats {
    pub mean: f64,
    pub max: u8,
    /// Leaps of at least [`LEAP_SEMITONES`].
    pub count: usize,
}

impl LeapStats {
    pub fn from_notes(notes: &[u8]) -> Self {
        let leaps: Vec<u8> = notes
            .windows(2)
            .map(|pair| pair[1].abs_diff(pair[0]))
            .filter(|&leap| leap != 0)
            .collect();

        if leaps.is_empty() {
            return Self {
                mean: 0.0,
                max: 0,
                count: 0,
            };
        }

        let sum: u64 = leaps.iter().map(|&l| u64::from(l)).sum();
        Self {
            mean: sum as f64 / leaps.len() as f64,
            max: leaps.iter().copied().max().unwrap_or_default(),
            count: leaps.iter().filter(|&&l| l >= LEAP_SEMITONES).count(),
        }
    }
}

/// Fraction of consecutive pairs exactly one semitone apart.
pub fn chromatic_density(notes: &[u8]) -> f64 {
    if notes.len() < 2 {
        return 0.0;
    }
    let semitones = notes
        .windows(2)
        .filter(|pair| pair[1].abs_diff(pair[0]) == 1)
        .count();
    semitones as f64 / (notes.len() - 1) as f64
}

/// Repetition of 4-note windows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RepetitionStats {
    /// Distinct windows seen at least twice.
    pub sequence_count: usize,
    /// Occurrences of repeated windows over distinct windows, capped at 1.
    pub ratio: f64,
}

impl RepetitionStats {
    pub fn from_notes(notes: &[u8]) -> Self {
        if notes.len() < REPETITION_WINDOW {
            return Self {
                sequence_count: 0,
                ratio: 0.0,
            };
        }

        let mut counts: HashMap<&[u8], usize> = HashMap::new();
        for window in notes.windows(REPETITION_WINDOW) {
            *counts.entry(window).or_default() += 1;
        }

        let repeated: Vec<usize> = counts.values().copied().filter(|&c| c >= 2).collect();
        let occurrences: usize = repeated.iter().sum();
        let ratio = occurrences as f64 / counts.len() as f64;

        Self {
            sequence_count: repeated.len(),
            ratio: ratio.min(1.0),
        }
    }
}

/// Additive difficulty estimate from range, leaps, density, and tempo.
pub fn difficulty_level(
    range_span: u8,
    leap_mean: f64,
    notes_per_measure: f64,
    tempo_qpm: u32,
) -> DifficultyLevel {
    let mut points = 0;

    points += if range_span > 24 {
        2
    } else if range_span > 12 {
        1
    } else {
        0
    };
    points += if leap_mean > 5.0 {
        2
    } else if leap_mean > 3.0 {
        1
    } else {
        0
    };
    points += if notes_per_measure > 8.0 {
        2
    } else if notes_per_measure > 4.0 {
        1
    } else {
        0
    };
    points += if tempo_qpm > 140 {
        2
    } else if tempo_qpm > 100 {
        1
    } else {
        0
    };

    match points {
        6.. => DifficultyLevel::Advanced,
        3.. => DifficultyLevel::Intermediate,
        _ => DifficultyLevel::Beginner,
    }
}
