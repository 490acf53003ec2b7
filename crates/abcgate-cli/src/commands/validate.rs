//! The `abcgate validate` command.

use std::path::PathBuf;

use anyhow::Result;

use abcgate_core::notation::{extract_blocks, extract_metadata, has_required_headers, validate_syntax};

use super::read_document;

pub fn execute(file: PathBuf) -> Result<()> {
    let document = read_document(&file)?;
    let blocks = extract_blocks(&document);

    println!("Document: {} ({} blocks)", file.display(), blocks.len());
    if blocks.is_empty() {
        println!("  WARNING: no notation found, the gate will route this to manual review");
        return Ok(());
    }

    let mut errors = 0;
    let mut warnings = 0;

    for block in &blocks {
        let meta = extract_metadata(&block.raw_text);
        let key = meta.key.as_deref().unwrap_or("?");
        println!("  [{}] {} (key {key})", block.id, block.title);

        if let Some(message) = validate_syntax(&block.raw_text) {
            println!("    ERROR: {message}");
            errors += 1;
        }

        let headers = has_required_headers(&block.raw_text);
        if !headers.valid {
            println!("    WARNING: missing headers: {}", headers.missing.join(", "));
            warnings += 1;
        }
    }

    if errors == 0 && warnings == 0 {
        println!("All notation valid.");
    } else if errors == 0 {
        println!("\n{warnings} warning(s) found.");
    } else {
        anyhow::bail!("{errors} invalid notation block(s), {warnings} warning(s)");
    }

    Ok(())
}
