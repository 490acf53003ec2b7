//! The `abcgate gate` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use abcgate_core::config::load_config_from;
use abcgate_core::gate::check_quality_gate;
use abcgate_core::model::QualityStatus;
use abcgate_core::notation::extract_title;
use abcgate_core::report::{GateEntry, GateReport};
use abcgate_core::statistics::calculate_dynamic_threshold;

use super::{collect_documents, engine_for, read_document, resolve_instrument};

pub struct GateArgs {
    pub paths: Vec<PathBuf>,
    pub instrument: Option<String>,
    pub threshold: Option<f64>,
    pub dynamic: bool,
    pub history: Vec<PathBuf>,
    pub output: Option<PathBuf>,
    pub format: String,
    pub fail_on_draft: bool,
    pub config: Option<PathBuf>,
}

pub fn execute(args: GateArgs) -> Result<()> {
    let config = load_config_from(args.config.as_deref())?;
    let instrument = resolve_instrument(args.instrument, &config);
    let engine = engine_for(&config);

    let base_threshold = args.threshold.unwrap_or(config.threshold);
    anyhow::ensure!(
        (0.0..=10.0).contains(&base_threshold),
        "threshold must be between 0 and 10"
    );

    let sources = collect_documents(&args.paths)?;
    anyhow::ensure!(!sources.is_empty(), "no documents to gate");

    let documents: Vec<(PathBuf, String)> = sources
        .into_iter()
        .map(|path| read_document(&path).map(|doc| (path, doc)))
        .collect::<Result<_>>()?;

    let threshold = if args.dynamic || config.dynamic_threshold {
        let recent = if args.history.is_empty() {
            // No history: adapt to this batch's own scores.
            documents
                .iter()
                .filter_map(|(_, doc)| {
                    check_quality_gate(&engine, doc, &instrument, base_threshold)
                        .analysis
                        .map(|a| a.learning_value_score)
                })
                .collect()
        } else {
            history_scores(&args.history)?
        };
        let adapted = calculate_dynamic_threshold(&recent, base_threshold);
        tracing::info!(
            samples = recent.len(),
            threshold = adapted,
            "using dynamic threshold"
        );
        adapted
    } else {
        base_threshold
    };

    let entries: Vec<GateEntry> = documents
        .iter()
        .map(|(path, doc)| GateEntry {
            source: path.display().to_string(),
            title: extract_title(doc),
            result: check_quality_gate(&engine, doc, &instrument, threshold),
        })
        .collect();

    let report = GateReport::new(threshold, instrument, entries);

    match args.format.as_str() {
        "markdown" | "md" => println!("{}", report.to_markdown()),
        "json" => println!("{}", serde_json::to_string_pretty(&report)?),
        _ => print_summary(&report),
    }

    if let Some(path) = &args.output {
        report.save_json(path)?;
        eprintln!("Report saved to: {}", path.display());
    }

    if args.fail_on_draft && report.count(QualityStatus::Approved) < report.entries.len() {
        std::process::exit(1);
    }

    Ok(())
}

/// Learning values from earlier reports, oldest report first.
fn history_scores(paths: &[PathBuf]) -> Result<Vec<f64>> {
    let mut reports = paths
        .iter()
        .map(|p| GateReport::load_json(p))
        .collect::<Result<Vec<_>>>()?;
    reports.sort_by_key(|r| r.created_at);
    Ok(reports.iter().flat_map(|r| r.scores()).collect())
}

fn print_summary(report: &GateReport) {
    let mut table = Table::new();
    table.set_header(vec![
        "Document",
        "Title",
        "Status",
        "Playability",
        "Learning",
        "Message",
    ]);

    for entry in &report.entries {
        let r = &entry.result;
        table.add_row(vec![
            Cell::new(&entry.source),
            Cell::new(&entry.title),
            Cell::new(r.status),
            Cell::new(format!("{:.1}", r.playability_score)),
            Cell::new(format!("{:.1}", r.learning_value_score)),
            Cell::new(&r.message),
        ]);
    }

    println!("{table}");
    println!(
        "\nGate ({}, threshold {:.1}): {} approved, {} draft, {} pending",
        report.instrument,
        report.threshold,
        report.count(QualityStatus::Approved),
        report.count(QualityStatus::Draft),
        report.count(QualityStatus::Pending),
    );

    for entry in &report.entries {
        if entry.result.suggestions.is_empty() {
            continue;
        }
        println!("\nSuggestions for {}:", entry.source);
        for suggestion in &entry.result.suggestions {
            println!("  - {suggestion}");
        }
    }
}
