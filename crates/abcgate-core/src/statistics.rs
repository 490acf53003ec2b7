//! Population statistics over learning-value scores.
//!
//! Used by the operations view to adapt the publish threshold and to plot
//! whether generated material is getting better or worse over time.

use crate::model::{QualityTrend, Trend};

/// Default publish threshold for learning value.
pub const DEFAULT_THRESHOLD: f64 = 6.0;

/// Minimum number of samples before the threshold adapts.
pub const MIN_DYNAMIC_SAMPLES: usize = 10;

/// Bounds of an adapted threshold.
pub const DYNAMIC_THRESHOLD_RANGE: (f64, f64) = (5.0, 7.0);

/// Number of most recent scores that make up the "recent" window.
pub const RECENT_WINDOW: usize = 10;

/// Difference between recent and overall averages that counts as a trend.
pub const TREND_MARGIN: f64 = 0.5;

/// Arithmetic mean, or 0 for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation, or 0 for an empty slice.
pub fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Adapt the publish threshold to recent scores.
///
/// With fewer than [`MIN_DYNAMIC_SAMPLES`] scores the default is returned
/// unchanged. Otherwise the threshold is one standard deviation below the
/// mean, clamped to [`DYNAMIC_THRESHOLD_RANGE`].
pub fn calculate_dynamic_threshold(recent_scores: &[f64], default: f64) -> f64 {
    if recent_scores.len() < MIN_DYNAMIC_SAMPLES {
        return default;
    }
    let (low, high) = DYNAMIC_THRESHOLD_RANGE;
    let threshold = mean(recent_scores) - std_dev(recent_scores);
    tracing::debug!(
        samples = recent_scores.len(),
        threshold,
        "computed dynamic threshold"
    );
    threshold.clamp(low, high)
}

/// Summarize a chronological series of scores.
pub fn analyze_quality_trend(scores: &[f64], threshold: f64) -> QualityTrend {
    if scores.is_empty() {
        return QualityTrend {
            average: 0.0,
            trend: Trend::Stable,
            recent_average: 0.0,
            overall_average: 0.0,
            pass_rate: 0.0,
        };
    }

    let overall_average = mean(scores);
    let recent = &scores[scores.len().saturating_sub(RECENT_WINDOW)..];
    let recent_average = mean(recent);

    let delta = recent_average - overall_average;
    let trend = if delta > TREND_MARGIN {
        Trend::Improving
    } else if delta < -TREND_MARGIN {
        Trend::Declining
    } else {
        Trend::Stable
    };

    let passed = scores.iter().filter(|&&s| s >= threshold).count();
    let pass_rate = passed as f64 / scores.len() as f64 * 100.0;

    QualityTrend {
        average: overall_average,
        trend,
        recent_average,
        overall_average,
        pass_rate,
    }
}
