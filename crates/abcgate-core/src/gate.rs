//! Publication gate.
//!
//! Decides whether a document's first notation block may be published,
//! held as a draft, or routed to manual review.

use crate::engine::AnalysisEngine;
use crate::instruments::InstrumentCatalog;
use crate::model::{AbcAnalysis, QualityGateResult, QualityStatus};
use crate::notation::extract_blocks;

pub use crate::statistics::DEFAULT_THRESHOLD;

/// Message for documents without any notation block.
pub const NO_NOTATION_MESSAGE: &str = "notation not found, manual review required";

/// Message for notation that could not be analyzed.
pub const INVALID_SYNTAX_MESSAGE: &str = "invalid syntax";

/// Run a document through the gate.
pub fn check_quality_gate(
    engine: &AnalysisEngine,
    document: &str,
    instrument: &str,
    threshold: f64,
) -> QualityGateResult {
    let blocks = extract_blocks(document);
    let Some(block) = blocks.first() else {
        tracing::debug!("no notation block, routing to manual review");
        return rejected(QualityStatus::Pending, NO_NOTATION_MESSAGE);
    };

    let Some(analysis) = engine.analyze(&block.raw_text, instrument) else {
        tracing::debug!(block = %block.id, "notation block could not be analyzed");
        return rejected(QualityStatus::Draft, INVALID_SYNTAX_MESSAGE);
    };

    let score = analysis.learning_value_score;
    let passes = score >= threshold;
    let (status, message, suggestions) = if passes {
        (
            QualityStatus::Approved,
            format!("approved, learning value {score:.1} meets threshold {threshold:.1}"),
            Vec::new(),
        )
    } else {
        (
            QualityStatus::Draft,
            format!("learning value {score:.1} is below threshold {threshold:.1}"),
            suggest_improvements(&analysis, engine.catalog()),
        )
    };

    tracing::debug!(
        block = %block.id,
        status = %status,
        learning_value = score,
        threshold,
        "gate decision"
    );

    QualityGateResult {
        status,
        can_publish: passes,
        playability_score: analysis.playability_score,
        learning_value_score: score,
        analysis: Some(analysis),
        message,
        suggestions,
    }
}

fn rejected(status: QualityStatus, message: &str) -> QualityGateResult {
    QualityGateResult {
        status,
        can_publish: false,
        playability_score: 0.0,
        learning_value_score: 0.0,
        analysis: None,
        message: message.to_string(),
        suggestions: Vec::new(),
    }
}

/// Suggestions for each heuristic the analysis violates.
///
/// Returns a single affirmative message when nothing is violated.
pub fn suggest_improvements(analysis: &AbcAnalysis, catalog: &InstrumentCatalog) -> Vec<String> {
    let features = &analysis.features;
    let mut suggestions = Vec::new();

    if !features.range_ok {
        let range = catalog.range(&analysis.instrument);
        suggestions.push(format!(
            "keep notes within the comfortable range for {} (MIDI {}-{}); this passage spans {}-{}",
            analysis.instrument,
            range.comfortable_min,
            range.comfortable_max,
            features.range_min,
            features.range_max
        ));
    }
    if features.leap_mean > 5.0 {
        suggestions.push(format!(
            "reduce large leaps (average {:.1} semitones); favor stepwise motion",
            features.leap_mean
        ));
    }
    if features.chromatic_density > 0.4 {
        suggestions.push(format!(
            "reduce chromatic passages ({:.1}% semitone steps)",
            features.chromatic_density * 100.0
        ));
    }
    if features.tempo_qpm > 160 {
        suggestions.push(format!(
            "lower the tempo ({} bpm is very fast for practice)",
            features.tempo_qpm
        ));
    } else if features.tempo_qpm < 60 {
        suggestions.push(format!(
            "raise the tempo ({} bpm is very slow)",
            features.tempo_qpm
        ));
    }
    if features.repetition_ratio < 0.1 {
        suggestions.push("add repeated motifs so the material is easier to memorize".to_string());
    } else if features.repetition_ratio > 0.6 {
        suggestions.push("vary the material, too many phrases repeat".to_string());
    }
    if features.notes_per_measure > 12.0 {
        suggestions.push(format!(
            "thin out dense measures ({:.1} notes per measure)",
            features.notes_per_measure
        ));
    } else if features.notes_per_measure < 2.0 {
        suggestions.push(format!(
            "add more notes per measure ({:.1} notes per measure)",
            features.notes_per_measure
        ));
    }

    if suggestions.is_empty() {
        suggestions.push("no issues found, the material is well balanced".to_string());
    }
    suggestions
}
