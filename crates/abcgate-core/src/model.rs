//! Core data model types for abcgate.
//!
//! These are the plain, serializable records that flow from the parser
//! through feature extraction and scoring to the quality gate.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One fenced ABC excerpt extracted from a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotationBlock {
    /// Ordinal identifier, unique within the document (e.g. "block-1").
    pub id: String,
    /// Title from the `T:` header, or an ordinal label.
    pub title: String,
    /// The raw ABC text inside the fence.
    pub raw_text: String,
}

/// Header metadata read from an ABC excerpt.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbcMetadata {
    /// `T:` title.
    #[serde(default)]
    pub title: Option<String>,
    /// `C:` composer.
    #[serde(default)]
    pub composer: Option<String>,
    /// `M:` meter.
    #[serde(default)]
    pub meter: Option<String>,
    /// `Q:` tempo in quarter notes per minute.
    #[serde(default)]
    pub tempo: Option<u32>,
    /// `K:` key.
    #[serde(default)]
    pub key: Option<String>,
    /// `L:` default note length.
    #[serde(default)]
    pub length: Option<String>,
}

/// Result of checking an excerpt for the required header fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderCheck {
    /// All required headers are present.
    pub valid: bool,
    /// Human-readable names of the missing headers.
    pub missing: Vec<String>,
}

/// Estimated difficulty bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyLevel {
    Beginner,
    Intermediate,
    Advanced,
}

impl fmt::Display for DifficultyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DifficultyLevel::Beginner => write!(f, "beginner"),
            DifficultyLevel::Intermediate => write!(f, "intermediate"),
            DifficultyLevel::Advanced => write!(f, "advanced"),
        }
    }
}

impl FromStr for DifficultyLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "beginner" => Ok(DifficultyLevel::Beginner),
            "intermediate" => Ok(DifficultyLevel::Intermediate),
            "advanced" => Ok(DifficultyLevel::Advanced),
            other => Err(format!("unknown difficulty level: {other}")),
        }
    }
}

/// Numeric features extracted from one tune.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisFeatures {
    /// Number of sounding notes.
    pub note_count: usize,
    /// Number of bar markers, at least 1.
    pub measure_count: usize,
    /// Number of distinct pitches.
    pub unique_pitches: usize,
    /// Lowest MIDI pitch.
    pub range_min: u8,
    /// Highest MIDI pitch.
    pub range_max: u8,
    /// `range_max - range_min`.
    pub range_span: u8,
    /// The whole range lies inside the instrument's comfortable range.
    pub range_ok: bool,
    /// Mean of the non-zero consecutive intervals, in semitones.
    pub leap_mean: f64,
    /// Largest consecutive interval, in semitones.
    pub leap_max: u8,
    /// Number of intervals of a fourth (5 semitones) or more.
    pub leap_count: usize,
    /// Fraction of consecutive pairs a semitone apart.
    pub chromatic_density: f64,
    /// `note_count / measure_count`.
    pub notes_per_measure: f64,
    /// Repeated 4-note windows relative to distinct windows, in `[0, 1]`.
    pub repetition_ratio: f64,
    /// Number of distinct 4-note windows that occur at least twice.
    pub sequence_count: usize,
    /// Tempo in quarter notes per minute.
    pub tempo_qpm: u32,
    /// Estimated difficulty.
    pub difficulty_level: DifficultyLevel,
}

/// The public analysis result: features plus scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbcAnalysis {
    #[serde(flatten)]
    pub features: AnalysisFeatures,
    /// Heuristic playability, `0.0..=10.0`.
    pub playability_score: f64,
    /// Heuristic learning value, `0.0..=10.0`.
    pub learning_value_score: f64,
    /// Normalized instrument name the analysis was scored for.
    pub instrument: String,
}

/// Publication status decided by the quality gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityStatus {
    /// No notation found; routed to manual review.
    Pending,
    /// Notation is invalid or below the quality bar.
    Draft,
    /// Passed the gate and may be published.
    Approved,
}

impl QualityStatus {
    /// Whether a resubmission may move a record from `self` to `next`.
    ///
    /// `approved` is terminal for a submission.
    pub fn can_transition_to(self, next: QualityStatus) -> bool {
        match self {
            QualityStatus::Pending | QualityStatus::Draft => {
                matches!(next, QualityStatus::Draft | QualityStatus::Approved)
            }
            QualityStatus::Approved => false,
        }
    }
}

impl fmt::Display for QualityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QualityStatus::Pending => write!(f, "pending"),
            QualityStatus::Draft => write!(f, "draft"),
            QualityStatus::Approved => write!(f, "approved"),
        }
    }
}

/// Outcome of running one document through the quality gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityGateResult {
    pub status: QualityStatus,
    /// `true` exactly when `status` is `approved`.
    pub can_publish: bool,
    pub playability_score: f64,
    pub learning_value_score: f64,
    /// Present whenever the first notation block could be analyzed.
    #[serde(default)]
    pub analysis: Option<AbcAnalysis>,
    pub message: String,
    /// Improvement suggestions for analyzed tunes below the bar.
    #[serde(default)]
    pub suggestions: Vec<String>,
}

/// Direction of recent quality scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Improving,
    Declining,
    Stable,
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trend::Improving => write!(f, "improving"),
            Trend::Declining => write!(f, "declining"),
            Trend::Stable => write!(f, "stable"),
        }
    }
}

/// Population-level summary of learning-value scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityTrend {
    pub average: f64,
    pub trend: Trend,
    /// Mean of the last 10 scores.
    pub recent_average: f64,
    pub overall_average: f64,
    /// Percentage (0-100) of scores at or above the threshold.
    pub pass_rate: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn difficulty_display_and_parse() {
        assert_eq!(DifficultyLevel::Intermediate.to_string(), "intermediate");
        assert_eq!(
            "Advanced".parse::<DifficultyLevel>().unwrap(),
            DifficultyLevel::Advanced
        );
        assert!("expert".parse::<DifficultyLevel>().is_err());
    }

    #[test]
    fn status_transitions() {
        use QualityStatus::*;
        assert!(Pending.can_transition_to(Draft));
        assert!(Pending.can_transition_to(Approved));
        assert!(!Pending.can_transition_to(Pending));
        assert!(Draft.can_transition_to(Draft));
        assert!(Draft.can_transition_to(Approved));
        assert!(!Draft.can_transition_to(Pending));
        assert!(!Approved.can_transition_to(Draft));
        assert!(!Approved.can_transition_to(Approved));
    }

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&QualityStatus::Approved).unwrap(),
            "\"approved\""
        );
        assert_eq!(Trend::Stable.to_string(), "stable");
    }

    #[test]
    fn analysis_flattens_features() {
        let analysis = AbcAnalysis {
            features: AnalysisFeatures {
                note_count: 4,
                measure_count: 1,
                unique_pitches: 4,
                range_min: 60,
                range_max: 65,
                range_span: 5,
                range_ok: true,
                leap_mean: 1.67,
                leap_max: 2,
                leap_count: 0,
                chromatic_density: 0.33,
                notes_per_measure: 4.0,
                repetition_ratio: 0.0,
                sequence_count: 0,
                tempo_qpm: 120,
                difficulty_level: DifficultyLevel::Beginner,
            },
            playability_score: 10.0,
            learning_value_score: 9.8,
            instrument: "piano".into(),
        };
        let value = serde_json::to_value(&analysis).unwrap();
        assert_eq!(value["note_count"], 4);
        assert_eq!(value["difficulty_level"], "beginner");
        assert_eq!(value["instrument"], "piano");
    }
}
