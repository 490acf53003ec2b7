//! Human-readable explanations and batch gate reports with JSON persistence.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::engine::ExplainedAnalysis;
use crate::model::{AbcAnalysis, QualityGateResult, QualityStatus, QualityTrend};
use crate::scoring::ScoreBreakdown;
use crate::statistics::analyze_quality_trend;

/// Render an analysis as labeled lines.
///
/// Scores are printed to one decimal, ratios as percentages to one decimal.
pub fn explain(analysis: &AbcAnalysis) -> String {
    let f = &analysis.features;
    let comfort = if f.range_ok {
        "comfortable"
    } else {
        "outside comfortable range"
    };

    let mut out = String::new();
    let _ = writeln!(out, "Instrument: {}", analysis.instrument);
    let _ = writeln!(out, "Playability: {:.1} / 10", analysis.playability_score);
    let _ = writeln!(out, "Learning value: {:.1} / 10", analysis.learning_value_score);
    let _ = writeln!(out, "Difficulty: {}", f.difficulty_level);
    let _ = writeln!(out, "Notes: {} ({} unique)", f.note_count, f.unique_pitches);
    let _ = writeln!(
        out,
        "Measures: {} ({:.1} notes per measure)",
        f.measure_count, f.notes_per_measure
    );
    let _ = writeln!(
        out,
        "Range: {}-{} ({} semitones, {comfort})",
        f.range_min, f.range_max, f.range_span
    );
    let _ = writeln!(
        out,
        "Leaps: mean {:.1}, max {}, {} of a fourth or more",
        f.leap_mean, f.leap_max, f.leap_count
    );
    let _ = writeln!(out, "Chromatic density: {:.1}%", f.chromatic_density * 100.0);
    let _ = writeln!(
        out,
        "Repetition: {:.1}% ({} repeated patterns)",
        f.repetition_ratio * 100.0,
        f.sequence_count
    );
    let _ = write!(out, "Tempo: {} bpm", f.tempo_qpm);
    out
}

/// Render the rules that fired for both scores.
pub fn explain_rules(explained: &ExplainedAnalysis) -> String {
    let mut out = String::new();
    write_breakdown(&mut out, "Playability", &explained.playability);
    out.push('\n');
    write_breakdown(&mut out, "Learning value", &explained.learning_value);
    out
}

fn write_breakdown(out: &mut String, label: &str, breakdown: &ScoreBreakdown) {
    let _ = writeln!(out, "{label}: start {:.1}", breakdown.base);
    if breakdown.applied.is_empty() {
        let _ = writeln!(out, "  (no rules applied)");
    }
    for rule in &breakdown.applied {
        let _ = writeln!(out, "  {:+.1}  {} ({})", rule.delta, rule.id, rule.description);
    }
    let _ = write!(out, "  = {:.1}", breakdown.score);
}

// ---------------------------------------------------------------------------
// Batch gate report
// ---------------------------------------------------------------------------

/// The gate decision for one source document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateEntry {
    /// Where the document came from, usually a file path.
    pub source: String,
    /// Display title of the document.
    pub title: String,
    pub result: QualityGateResult,
}

/// Gate decisions for a batch of documents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateReport {
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    /// Threshold the batch was gated at.
    pub threshold: f64,
    /// Normalized instrument the batch was scored for.
    pub instrument: String,
    pub entries: Vec<GateEntry>,
    /// Trend over the learning values of analyzed entries, in entry order.
    pub trend: QualityTrend,
}

impl GateReport {
    pub fn new(threshold: f64, instrument: impl Into<String>, entries: Vec<GateEntry>) -> Self {
        let scores = analyzed_scores(&entries);
        Self {
            created_at: Utc::now(),
            threshold,
            instrument: instrument.into(),
            trend: analyze_quality_trend(&scores, threshold),
            entries,
        }
    }

    /// Learning values of every entry that was analyzed.
    pub fn scores(&self) -> Vec<f64> {
        analyzed_scores(&self.entries)
    }

    /// Number of entries with the given status.
    pub fn count(&self, status: QualityStatus) -> usize {
        self.entries
            .iter()
            .filter(|e| e.result.status == status)
            .count()
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: GateReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }

    /// Format the report as markdown.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        let _ = writeln!(md, "## Quality gate: {}\n", self.instrument);
        let _ = writeln!(
            md,
            "**Summary:** {} approved, {} draft, {} pending (threshold {:.1})\n",
            self.count(QualityStatus::Approved),
            self.count(QualityStatus::Draft),
            self.count(QualityStatus::Pending),
            self.threshold
        );

        if !self.entries.is_empty() {
            md.push_str("| Source | Title | Status | Playability | Learning value |\n");
            md.push_str("|--------|-------|--------|-------------|----------------|\n");
            for e in &self.entries {
                let _ = writeln!(
                    md,
                    "| {} | {} | {} | {:.1} | {:.1} |",
                    e.source,
                    e.title,
                    e.result.status,
                    e.result.playability_score,
                    e.result.learning_value_score
                );
            }
            md.push('\n');
        }

        let _ = write!(
            md,
            "**Trend:** {} (recent {:.1}, overall {:.1}, pass rate {:.1}%)",
            self.trend.trend,
            self.trend.recent_average,
            self.trend.overall_average,
            self.trend.pass_rate
        );
        md
    }
}

fn analyzed_scores(entries: &[GateEntry]) -> Vec<f64> {
    entries
        .iter()
        .filter(|e| e.result.analysis.is_some())
        .map(|e| e.result.learning_value_score)
        .collect()
}
