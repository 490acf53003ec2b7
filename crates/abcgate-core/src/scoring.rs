//! Heuristic playability and learning-value scoring.
//!
//! Both scores are fixed rule tables. A table is an ordered list of groups;
//! within a group only the first rule whose predicate holds contributes its
//! delta. The sum is added to a base value and clamped to `[0, 10]`.

use serde::Serialize;

use crate::instruments::Coefficients;
use crate::model::{AnalysisFeatures, DifficultyLevel};

/// Lower bound of every score.
pub const MIN_SCORE: f64 = 0.0;
/// Upper bound of every score, and the playability starting value.
pub const MAX_SCORE: f64 = 10.0;

/// One `(predicate, delta)` pair.
pub struct ScoreRule<I> {
    /// Stable identifier, e.g. `"leap_large"`.
    pub id: &'static str,
    /// Human-readable condition.
    pub description: &'static str,
    pub applies: fn(&I) -> bool,
    pub delta: f64,
}

impl<I> ScoreRule<I> {
    pub fn new(
        id: &'static str,
        description: &'static str,
        applies: fn(&I) -> bool,
        delta: f64,
    ) -> Self {
        Self {
            id,
            description,
            applies,
            delta,
        }
    }
}

/// Mutually exclusive rules; the first match wins.
pub struct RuleGroup<I> {
    pub name: &'static str,
    pub rules: Vec<ScoreRule<I>>,
}

impl<I> RuleGroup<I> {
    /// The first rule in this group that applies to `inputs`.
    pub fn first_match(&self, inputs: &I) -> Option<&ScoreRule<I>> {
        self.rules.iter().find(|rule| (rule.applies)(inputs))
    }
}

/// An ordered list of rule groups.
pub struct RuleTable<I> {
    pub groups: Vec<RuleGroup<I>>,
}

impl<I> RuleTable<I> {
    /// Apply every group to `inputs`, starting from `base`.
    pub fn evaluate(&self, base: f64, inputs: &I) -> ScoreBreakdown {
        let applied: Vec<AppliedRule> = self
            .groups
            .iter()
            .filter_map(|group| group.first_match(inputs))
            .map(|rule| AppliedRule {
                id: rule.id,
                description: rule.description,
                delta: rule.delta,
            })
            .collect();

        let raw: f64 = base + applied.iter().map(|r| r.delta).sum::<f64>();
        ScoreBreakdown {
            base,
            applied,
            score: raw.clamp(MIN_SCORE, MAX_SCORE),
        }
    }

    /// Iterate over every rule in table order.
    pub fn rules(&self) -> impl Iterator<Item = &ScoreRule<I>> {
        self.groups.iter().flat_map(|g| g.rules.iter())
    }
}

/// A rule that contributed to a score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppliedRule {
    pub id: &'static str,
    pub description: &'static str,
    pub delta: f64,
}

/// How a score was reached.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub base: f64,
    pub applied: Vec<AppliedRule>,
    /// Final clamped score.
    pub score: f64,
}

// ---------------------------------------------------------------------------
// Playability
// ---------------------------------------------------------------------------

/// Inputs to the playability table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayabilityInputs {
    pub range_ok: bool,
    pub leap_mean: f64,
    pub chromatic_density: f64,
    pub tempo_qpm: u32,
    pub coefficients: Coefficients,
}

impl PlayabilityInputs {
    pub fn from_features(features: &AnalysisFeatures, coefficients: Coefficients) -> Self {
        Self {
            range_ok: features.range_ok,
            leap_mean: features.leap_mean,
            chromatic_density: features.chromatic_density,
            tempo_qpm: features.tempo_qpm,
            coefficients,
        }
    }

    /// Mean leap scaled by the instrument's leap coefficient.
    pub fn adjusted_leap(&self) -> f64 {
        self.leap_mean * self.coefficients.leap
    }

    /// Tempo scaled by the instrument's tempo coefficient.
    pub fn adjusted_tempo(&self) -> f64 {
        f64::from(self.tempo_qpm) * self.coefficients.tempo
    }
}

/// The standard playability rule table.
#[rustfmt::skip]
pub fn playability_table() -> RuleTable<PlayabilityInputs> {
    type Rule = ScoreRule<PlayabilityInputs>;

    RuleTable {
        groups: vec![
            RuleGroup {
                name: "range",
                rules: vec![Rule::new(
                    "range_outside_comfort",
                    "notes outside the comfortable range",
                    |i| !i.range_ok,
                    -3.0,
                )],
            },
            RuleGroup {
                name: "leap",
                rules: vec![
                    Rule::new("leap_very_large", "adjusted mean leap > 7", |i| i.adjusted_leap() > 7.0, -2.5),
                    Rule::new("leap_large", "adjusted mean leap > 5", |i| i.adjusted_leap() > 5.0, -1.5),
                    Rule::new("leap_moderate", "adjusted mean leap > 3", |i| i.adjusted_leap() > 3.0, -0.5),
                ],
            },
            RuleGroup {
                name: "chromatic",
                rules: vec![
                    Rule::new("chromatic_high", "chromatic density > 0.4", |i| i.chromatic_density > 0.4, -1.5),
                    Rule::new("chromatic_moderate", "chromatic density > 0.2", |i| i.chromatic_density > 0.2, -0.5),
                ],
            },
            RuleGroup {
                name: "tempo",
                rules: vec![
                    Rule::new("tempo_very_fast", "adjusted tempo > 160", |i| i.adjusted_tempo() > 160.0, -2.0),
                    Rule::new("tempo_fast", "adjusted tempo > 120", |i| i.adjusted_tempo() > 120.0, -1.0),
                    Rule::new("tempo_slow", "adjusted tempo < 60", |i| i.adjusted_tempo() < 60.0, -0.5),
                ],
            },
        ],
    }
}

// ---------------------------------------------------------------------------
// Learning value
// ---------------------------------------------------------------------------

/// Inputs to the learning-value table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LearningInputs {
    pub playability_score: f64,
    pub repetition_ratio: f64,
    pub sequence_count: usize,
    pub notes_per_measure: f64,
    pub difficulty_level: DifficultyLevel,
}

impl LearningInputs {
    pub fn from_features(features: &AnalysisFeatures, playability_score: f64) -> Self {
        Self {
            playability_score,
            repetition_ratio: features.repetition_ratio,
            sequence_count: features.sequence_count,
            notes_per_measure: features.notes_per_measure,
            difficulty_level: features.difficulty_level,
        }
    }
}

/// The standard learning-value rule table.
#[rustfmt::skip]
pub fn learning_value_table() -> RuleTable<LearningInputs> {
    type Rule = ScoreRule<LearningInputs>;

    RuleTable {
        groups: vec![
            RuleGroup {
                name: "repetition",
                rules: vec![
                    Rule::new("repetition_balanced", "repetition ratio in [0.3, 0.6]", |i| (0.3..=0.6).contains(&i.repetition_ratio), 1.5),
                    Rule::new("repetition_excessive", "repetition ratio > 0.6", |i| i.repetition_ratio > 0.6, -1.0),
                    Rule::new("repetition_scarce", "repetition ratio < 0.1", |i| i.repetition_ratio < 0.1, -0.5),
                ],
            },
            RuleGroup {
                name: "sequences",
                rules: vec![
                    Rule::new("sequences_balanced", "repeated patterns in [3, 8]", |i| (3..=8).contains(&i.sequence_count), 1.0),
                    Rule::new("sequences_excessive", "repeated patterns > 8", |i| i.sequence_count > 8, -0.5),
                ],
            },
            RuleGroup {
                name: "density",
                rules: vec![
                    Rule::new("density_balanced", "notes per measure in [4, 8]", |i| (4.0..=8.0).contains(&i.notes_per_measure), 0.5),
                    Rule::new("density_crowded", "notes per measure > 12", |i| i.notes_per_measure > 12.0, -1.0),
                    Rule::new("density_sparse", "notes per measure < 2", |i| i.notes_per_measure < 2.0, -0.5),
                ],
            },
            RuleGroup {
                name: "difficulty",
                rules: vec![
                    Rule::new("difficulty_intermediate", "intermediate difficulty", |i| i.difficulty_level == DifficultyLevel::Intermediate, 0.5),
                    Rule::new("difficulty_beginner", "beginner difficulty", |i| i.difficulty_level == DifficultyLevel::Beginner, 0.3),
                ],
            },
        ],
    }
}

/// Both standard rule tables.
pub struct ScoringRules {
    pub playability: RuleTable<PlayabilityInputs>,
    pub learning_value: RuleTable<LearningInputs>,
}

impl ScoringRules {
    pub fn standard() -> Self {
        Self {
            playability: playability_table(),
            learning_value: learning_value_table(),
        }
    }

    pub fn playability(&self, inputs: &PlayabilityInputs) -> ScoreBreakdown {
        self.playability.evaluate(MAX_SCORE, inputs)
    }

    pub fn learning_value(&self, inputs: &LearningInputs) -> ScoreBreakdown {
        self.learning_value.evaluate(inputs.playability_score, inputs)
    }
}

impl Default for ScoringRules {
    fn default() -> Self {
        Self::standard()
    }
}

/// Playability score with the standard table.
pub fn playability_score(
    range_ok: bool,
    leap_mean: f64,
    chromatic_density: f64,
    tempo_qpm: u32,
    coefficients: Coefficients,
) -> f64 {
    let inputs = PlayabilityInputs {
        range_ok,
        leap_mean,
        chromatic_density,
        tempo_qpm,
        coefficients,
    };
    playability_table().evaluate(MAX_SCORE, &inputs).score
}

/// Learning-value score with the standard table.
pub fn learning_value_score(
    playability_score: f64,
    repetition_ratio: f64,
    sequence_count: usize,
    notes_per_measure: f64,
    difficulty_level: DifficultyLevel,
) -> f64 {
    let inputs = LearningInputs {
        playability_score,
        repetition_ratio,
        sequence_count,
        notes_per_measure,
        difficulty_level,
    };
    learning_value_table()
        .evaluate(playability_score, &inputs)
        .score
}

#[cfg(test)]
mod tests {
    use super::*;

    const UNIT: Coefficients = Coefficients {
        tempo: 1.0,
        leap: 1.0,
    };

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn perfect_playability() {
        assert!(approx(playability_score(true, 2.0, 0.1, 100, UNIT), 10.0));
    }

    #[test]
    fn each_playability_rule() {
        assert!(approx(playability_score(false, 0.0, 0.0, 100, UNIT), 7.0));
        assert!(approx(playability_score(true, 7.5, 0.0, 100, UNIT), 7.5));
        assert!(approx(playability_score(true, 6.0, 0.0, 100, UNIT), 8.5));
        assert!(approx(playability_score(true, 4.0, 0.0, 100, UNIT), 9.5));
        assert!(approx(playability_score(true, 0.0, 0.5, 100, UNIT), 8.5));
        assert!(approx(playability_score(true, 0.0, 0.3, 100, UNIT), 9.5));
        assert!(approx(playability_score(true, 0.0, 0.0, 170, UNIT), 8.0));
        assert!(approx(playability_score(true, 0.0, 0.0, 130, UNIT), 9.0));
        assert!(approx(playability_score(true, 0.0, 0.0, 50, UNIT), 9.5));
    }

    #[test]
    fn playability_boundaries_are_strict() {
        assert!(approx(playability_score(true, 3.0, 0.2, 120, UNIT), 10.0));
        assert!(approx(playability_score(true, 0.0, 0.0, 60, UNIT), 10.0));
        assert!(approx(playability_score(true, 0.0, 0.0, 160, UNIT), 9.0));
    }

    #[test]
    fn coefficients_scale_leap_and_tempo() {
        let wind = Coefficients {
            tempo: 1.5,
            leap: 2.0,
        };
        // leap 3.0 * 2.0 = 6.0 -> -1.5; tempo 100 * 1.5 = 150 -> -1.0
        assert!(approx(playability_score(true, 3.0, 0.0, 100, wind), 7.5));
    }

    #[test]
    fn worst_case_playability_stays_in_bounds() {
        let harsh = Coefficients {
            tempo: 3.0,
            leap: 3.0,
        };
        let score = playability_score(false, 10.0, 0.9, 200, harsh);
        // 10 - 3 - 2.5 - 1.5 - 2 = 1.0
        assert!(approx(score, 1.0));
        assert!(score >= MIN_SCORE);
    }

    #[test]
    fn monotonic_leap_penalty() {
        let mut previous = f64::INFINITY;
        for leap in [0.0, 3.0, 3.1, 5.0, 5.1, 7.0, 7.1, 12.0] {
            let score = playability_score(true, leap, 0.0, 100, UNIT);
            assert!(score <= previous, "leap {leap} raised score");
            previous = score;
        }
    }

    #[test]
    fn each_learning_rule() {
        use DifficultyLevel::*;
        let base = 5.0;
        assert!(approx(learning_value_score(base, 0.45, 0, 10.0, Advanced), 6.5));
        assert!(approx(learning_value_score(base, 0.8, 0, 10.0, Advanced), 4.0));
        assert!(approx(learning_value_score(base, 0.05, 0, 10.0, Advanced), 4.5));
        assert!(approx(learning_value_score(base, 0.2, 5, 10.0, Advanced), 6.0));
        assert!(approx(learning_value_score(base, 0.2, 9, 10.0, Advanced), 4.5));
        assert!(approx(learning_value_score(base, 0.2, 0, 6.0, Advanced), 5.5));
        assert!(approx(learning_value_score(base, 0.2, 0, 13.0, Advanced), 4.0));
        assert!(approx(learning_value_score(base, 0.2, 0, 1.0, Advanced), 4.5));
        assert!(approx(learning_value_score(base, 0.2, 0, 10.0, Intermediate), 5.5));
        assert!(approx(learning_value_score(base, 0.2, 0, 10.0, Beginner), 5.3));
    }

    #[test]
    fn learning_inclusive_ranges() {
        use DifficultyLevel::*;
        assert!(approx(learning_value_score(5.0, 0.3, 3, 4.0, Advanced), 8.0));
        assert!(approx(learning_value_score(5.0, 0.6, 8, 8.0, Advanced), 8.0));
    }

    #[test]
    fn learning_clamps_to_ten() {
        let score = learning_value_score(10.0, 0.5, 4, 6.0, DifficultyLevel::Intermediate);
        assert!(approx(score, 10.0));
    }

    #[test]
    fn breakdown_lists_fired_rules() {
        let rules = ScoringRules::standard();
        let inputs = PlayabilityInputs {
            range_ok: false,
            leap_mean: 6.0,
            chromatic_density: 0.0,
            tempo_qpm: 100,
            coefficients: UNIT,
        };
        let breakdown = rules.playability(&inputs);
        let ids: Vec<&str> = breakdown.applied.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["range_outside_comfort", "leap_large"]);
        assert!(approx(breakdown.score, 5.5));
    }

    #[test]
    fn rule_ids_are_unique() {
        let rules = ScoringRules::standard();
        let mut ids: Vec<&str> = rules
            .playability
            .rules()
            .map(|r| r.id)
            .chain(rules.learning_value.rules().map(|r| r.id))
            .collect();
        let total = ids.len();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), total);
    }
}
