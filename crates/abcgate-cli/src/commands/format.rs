//! The `abcgate format` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use abcgate_core::notation::{format_abc, NOTATION_TAG};

use super::is_bare_abc;

pub fn execute(file: PathBuf, in_place: bool) -> Result<()> {
    let content = std::fs::read_to_string(&file)
        .with_context(|| format!("failed to read {}", file.display()))?;

    let formatted = if is_bare_abc(&file) {
        format_abc(&content) + "\n"
    } else {
        format_fenced(&content)
    };

    if in_place {
        if formatted == content {
            println!("{} already formatted", file.display());
        } else {
            std::fs::write(&file, &formatted)
                .with_context(|| format!("failed to write {}", file.display()))?;
            println!("Formatted {}", file.display());
        }
    } else {
        print!("{formatted}");
    }

    Ok(())
}

/// Format the inside of each notation fence, leaving the prose untouched.
fn format_fenced(document: &str) -> String {
    let mut out = String::with_capacity(document.len());
    let mut block: Option<String> = None;

    for line in document.lines() {
        let trimmed = line.trim();
        match block.as_mut() {
            Some(body) if trimmed.starts_with("```") => {
                out.push_str(&format_abc(body));
                out.push('\n');
                out.push_str(line);
                out.push('\n');
                block = None;
            }
            Some(body) => {
                body.push_str(line);
                body.push('\n');
            }
            None => {
                let opens = trimmed
                    .strip_prefix("```")
                    .is_some_and(|tag| tag.trim().eq_ignore_ascii_case(NOTATION_TAG));
                out.push_str(line);
                out.push('\n');
                if opens {
                    block = Some(String::new());
                }
            }
        }
    }

    // Unclosed fence: keep the body as written.
    if let Some(body) = block {
        out.push_str(&body);
    }
    out
}
