//! Central analysis engine.
//!
//! Wires a notation parser, an instrument catalog, and the scoring rule
//! tables into a single `analyze` call. Every call is independent and pure,
//! so one engine can be shared freely across threads.

use std::sync::Arc;

use crate::features::extract_features;
use crate::instruments::{normalize_instrument_name, InstrumentCatalog};
use crate::model::AbcAnalysis;
use crate::parser::AbcParser;
use crate::scoring::{LearningInputs, PlayabilityInputs, ScoreBreakdown, ScoringRules};
use crate::traits::NotationParser;

/// The analysis engine.
pub struct AnalysisEngine {
    parser: Arc<dyn NotationParser>,
    catalog: InstrumentCatalog,
    rules: ScoringRules,
}

/// An analysis together with the rules that produced its scores.
#[derive(Debug, Clone)]
pub struct ExplainedAnalysis {
    pub analysis: AbcAnalysis,
    pub playability: ScoreBreakdown,
    pub learning_value: ScoreBreakdown,
}

impl AnalysisEngine {
    pub fn new(
        parser: Arc<dyn NotationParser>,
        catalog: InstrumentCatalog,
        rules: ScoringRules,
    ) -> Self {
        Self {
            parser,
            catalog,
            rules,
        }
    }

    /// An engine with the built-in parser, catalog, and rules.
    pub fn standard() -> Self {
        Self::new(
            Arc::new(AbcParser),
            InstrumentCatalog::standard(),
            ScoringRules::standard(),
        )
    }

    /// Replace the instrument catalog.
    pub fn with_catalog(mut self, catalog: InstrumentCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn parser(&self) -> &dyn NotationParser {
        self.parser.as_ref()
    }

    pub fn catalog(&self) -> &InstrumentCatalog {
        &self.catalog
    }

    pub fn rules(&self) -> &ScoringRules {
        &self.rules
    }

    /// Analyze ABC text for an instrument.
    ///
    /// Returns `None` when the text does not parse or has no sounding notes.
    pub fn analyze(&self, text: &str, instrument: &str) -> Option<AbcAnalysis> {
        self.analyze_explained(text, instrument)
            .map(|explained| explained.analysis)
    }

    /// Analyze ABC text and keep the score breakdowns.
    pub fn analyze_explained(&self, text: &str, instrument: &str) -> Option<ExplainedAnalysis> {
        let instrument = normalize_instrument_name(instrument);
        let profile = self.catalog.profile(&instrument);
        if !self.catalog.contains(&instrument) {
            tracing::debug!(instrument, "unknown instrument, using default profile");
        }

        let features = extract_features(self.parser.as_ref(), text, profile)?;

        let playability = self.rules.playability(&PlayabilityInputs::from_features(
            &features,
            profile.coefficients(),
        ));
        let learning_value = self
            .rules
            .learning_value(&LearningInputs::from_features(&features, playability.score));

        Some(ExplainedAnalysis {
            analysis: AbcAnalysis {
                features,
                playability_score: playability.score,
                learning_value_score: learning_value.score,
                instrument,
            },
            playability,
            learning_value,
        })
    }
}

impl Default for AnalysisEngine {
    fn default() -> Self {
        Self::standard()
    }
}
