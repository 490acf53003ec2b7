//! The `abcgate analyze` command.

use std::path::PathBuf;

use anyhow::Result;
use serde::Serialize;

use abcgate_core::config::load_config_from;
use abcgate_core::model::AbcAnalysis;
use abcgate_core::notation::{extract_blocks, validate_syntax};
use abcgate_core::report::{explain, explain_rules};

use super::{engine_for, read_document, resolve_instrument};

/// Analysis of one notation block, as printed in JSON output.
#[derive(Serialize)]
struct BlockAnalysis {
    id: String,
    title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    analysis: Option<AbcAnalysis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

pub fn execute(
    file: PathBuf,
    instrument: Option<String>,
    show_rules: bool,
    format: String,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let instrument = resolve_instrument(instrument, &config);
    let engine = engine_for(&config);

    let document = read_document(&file)?;
    let blocks = extract_blocks(&document);
    anyhow::ensure!(
        !blocks.is_empty(),
        "no notation blocks found in {}",
        file.display()
    );

    let mut results = Vec::with_capacity(blocks.len());
    for block in blocks {
        let explained = engine.analyze_explained(&block.raw_text, &instrument);
        let error = match &explained {
            Some(_) => None,
            None => Some(
                validate_syntax(&block.raw_text)
                    .unwrap_or_else(|| "no sounding notes".to_string()),
            ),
        };
        results.push((block, explained, error));
    }

    if format == "json" {
        let out: Vec<BlockAnalysis> = results
            .into_iter()
            .map(|(block, explained, error)| BlockAnalysis {
                id: block.id,
                title: block.title,
                analysis: explained.map(|e| e.analysis),
                error,
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    for (i, (block, explained, error)) in results.iter().enumerate() {
        if i > 0 {
            println!();
        }
        println!("[{}] {}", block.id, block.title);
        match (explained, error) {
            (Some(explained), _) => {
                println!("{}", explain(&explained.analysis));
                if show_rules {
                    println!("\n{}", explain_rules(explained));
                }
            }
            (None, Some(error)) => println!("Not analyzed: {error}"),
            (None, None) => println!("Not analyzed"),
        }
    }

    Ok(())
}
