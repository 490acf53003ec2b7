//! The `abcgate trend` command.

use std::path::PathBuf;

use anyhow::Result;
use serde::Serialize;

use abcgate_core::config::load_config_from;
use abcgate_core::model::QualityTrend;
use abcgate_core::report::GateReport;
use abcgate_core::statistics::{analyze_quality_trend, calculate_dynamic_threshold};

#[derive(Serialize)]
struct TrendSummary {
    reports: usize,
    samples: usize,
    threshold: f64,
    dynamic_threshold: f64,
    #[serde(flatten)]
    trend: QualityTrend,
}

pub fn execute(
    report_paths: Vec<PathBuf>,
    threshold: Option<f64>,
    format: String,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let threshold = threshold.unwrap_or(config.threshold);

    let mut reports = report_paths
        .iter()
        .map(|p| GateReport::load_json(p))
        .collect::<Result<Vec<_>>>()?;
    reports.sort_by_key(|r| r.created_at);

    let scores: Vec<f64> = reports.iter().flat_map(|r| r.scores()).collect();
    let summary = TrendSummary {
        reports: reports.len(),
        samples: scores.len(),
        threshold,
        dynamic_threshold: calculate_dynamic_threshold(&scores, threshold),
        trend: analyze_quality_trend(&scores, threshold),
    };

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    let t = &summary.trend;
    println!(
        "Quality trend over {} scores from {} report(s)",
        summary.samples, summary.reports
    );
    println!("  Trend:             {}", t.trend);
    println!("  Overall average:   {:.1}", t.overall_average);
    println!("  Recent average:    {:.1}", t.recent_average);
    println!("  Pass rate:         {:.1}% (threshold {:.1})", t.pass_rate, threshold);
    println!("  Dynamic threshold: {:.1}", summary.dynamic_threshold);

    Ok(())
}
