//! The `abcgate init` command.

use anyhow::Result;

use abcgate_core::config::CONFIG_FILE_NAME;

pub fn execute() -> Result<()> {
    if std::path::Path::new(CONFIG_FILE_NAME).exists() {
        println!("{CONFIG_FILE_NAME} already exists, skipping.");
    } else {
        std::fs::write(CONFIG_FILE_NAME, SAMPLE_CONFIG)?;
        println!("Created {CONFIG_FILE_NAME}");
    }

    std::fs::create_dir_all("lessons")?;
    let example_path = std::path::Path::new("lessons/example.md");
    if example_path.exists() {
        println!("lessons/example.md already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_LESSON)?;
        println!("Created lessons/example.md");
    }

    println!("\nNext steps:");
    println!("  1. Edit {CONFIG_FILE_NAME} to set your threshold and instruments");
    println!("  2. Run: abcgate validate lessons/example.md");
    println!("  3. Run: abcgate gate lessons --output gate-report.json");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# abcgate configuration

# Learning-value score (0-10) required to publish.
threshold = 6.0

# Adapt the threshold to recent scores (mean minus one standard deviation,
# kept within 5.0-7.0).
dynamic_threshold = false

default_instrument = "piano"

# Add or override instrument profiles. Pitches are MIDI numbers.
# [instruments.tin_whistle]
# tempo_coefficient = 1.1
# leap_coefficient = 1.2
# min = 74
# max = 98
# comfortable_min = 74
# comfortable_max = 93
# family = "wind"
"#;

const EXAMPLE_LESSON: &str = r#"# Stepwise Warm-up

Play each bar slowly, then repeat it at tempo.

```abc
X:1
T:Stepwise Warm-up
M:4/4
L:1/4
Q:1/4=96
K:C
C D E C | C D E C | E F G2 | E F G2 |
G A G F | E C D2 | G A G F | E C C2 |]
```
"#;
