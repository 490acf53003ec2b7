//! Subcommand implementations and the helpers they share.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use abcgate_core::config::GateConfig;
use abcgate_core::engine::AnalysisEngine;
use abcgate_core::instruments::normalize_instrument_name;
use abcgate_core::notation::NOTATION_TAG;

pub mod analyze;
pub mod format;
pub mod gate;
pub mod init;
pub mod instruments;
pub mod trend;
pub mod validate;

/// File extensions picked up when a directory is given.
const DOCUMENT_EXTENSIONS: [&str; 3] = ["md", "markdown", "abc"];

/// Whether a path holds bare ABC rather than a Markdown document.
pub fn is_bare_abc(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some("abc")
}

/// Read a document. Bare `.abc` files are wrapped in a notation fence so
/// every command sees the same document shape.
pub fn read_document(path: &Path) -> Result<String> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    if is_bare_abc(path) {
        Ok(format!("```{NOTATION_TAG}\n{}\n```\n", content.trim_end()))
    } else {
        Ok(content)
    }
}

/// Expand directories into the documents they contain, sorted by path.
pub fn collect_documents(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut documents = Vec::new();
    for path in paths {
        if path.is_dir() {
            let mut found: Vec<PathBuf> = std::fs::read_dir(path)
                .with_context(|| format!("failed to read directory {}", path.display()))?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|p| {
                    p.extension()
                        .and_then(|e| e.to_str())
                        .is_some_and(|e| DOCUMENT_EXTENSIONS.contains(&e))
                })
                .collect();
            if found.is_empty() {
                tracing::warn!(dir = %path.display(), "no documents found in directory");
            }
            found.sort();
            documents.extend(found);
        } else if path.exists() {
            documents.push(path.clone());
        } else {
            anyhow::bail!("file not found: {}", path.display());
        }
    }
    Ok(documents)
}

/// Build an engine whose catalog carries the config's instrument overrides.
pub fn engine_for(config: &GateConfig) -> AnalysisEngine {
    AnalysisEngine::standard().with_catalog(config.catalog())
}

/// Resolve the instrument from the command line or the config default.
pub fn resolve_instrument(arg: Option<String>, config: &GateConfig) -> String {
    let instrument = arg
        .map(|name| normalize_instrument_name(&name))
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| config.default_instrument.clone());
    if !config.catalog().contains(&instrument) {
        tracing::warn!(instrument, "unknown instrument, scoring with the default profile");
    }
    instrument
}
