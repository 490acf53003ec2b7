//! The `abcgate instruments` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use abcgate_core::config::load_config_from;

pub fn execute(config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let catalog = config.catalog();

    let mut table = Table::new();
    table.set_header(vec![
        "Instrument",
        "Family",
        "Tempo x",
        "Leap x",
        "Playable",
        "Comfortable",
    ]);

    for name in catalog.names() {
        let profile = catalog.profile(name);
        table.add_row(vec![
            Cell::new(name),
            Cell::new(profile.family),
            Cell::new(format!("{:.1}", profile.tempo_coefficient)),
            Cell::new(format!("{:.1}", profile.leap_coefficient)),
            Cell::new(format!("{}-{}", profile.min, profile.max)),
            Cell::new(format!(
                "{}-{}",
                profile.comfortable_min, profile.comfortable_max
            )),
        ]);
    }

    println!("{table}");
    let fallback = catalog.default_profile();
    println!(
        "\n{} instruments. Unknown names use tempo x{:.1}, leap x{:.1}, comfortable {}-{}.",
        catalog.len(),
        fallback.tempo_coefficient,
        fallback.leap_coefficient,
        fallback.comfortable_min,
        fallback.comfortable_max
    );

    Ok(())
}
