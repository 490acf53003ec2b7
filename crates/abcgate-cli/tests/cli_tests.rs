//! CLI integration tests using assert_cmd.

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const SCALE_LESSON: &str = "# C Major Scale\n\nWarm up with this.\n\n```abc\nX:1\nT:Scale\nM:4/4\nL:1/4\nQ:1/4=120\nK:C\nC D E F | G A B c |\n```\n";

const BROKEN_LESSON: &str = "# Broken\n\n```abc\nX:1\nT:Broken\nM:4/4\nL:1/4\nK:C\nC [EG\n```\n";

/// A command running in `dir` with no config or env overrides leaking in.
fn abcgate(dir: &Path) -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("abcgate").unwrap();
    cmd.current_dir(dir)
        .env("HOME", dir)
        .env_remove("ABCGATE_THRESHOLD")
        .env_remove("ABCGATE_INSTRUMENT")
        .env_remove("RUST_LOG");
    cmd
}

fn write(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
    path
}

#[test]
fn help_output() {
    let dir = TempDir::new().unwrap();
    abcgate(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Quality gate for ABC notation"));
}

#[test]
fn version_output() {
    let dir = TempDir::new().unwrap();
    abcgate(dir.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("abcgate"));
}

#[test]
fn init_creates_files() {
    let dir = TempDir::new().unwrap();

    abcgate(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created abcgate.toml"))
        .stdout(predicate::str::contains("Created lessons/example.md"));

    assert!(dir.path().join("abcgate.toml").exists());
    assert!(dir.path().join("lessons/example.md").exists());
}

#[test]
fn init_skips_existing() {
    let dir = TempDir::new().unwrap();

    abcgate(dir.path()).arg("init").assert().success();

    abcgate(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn init_then_gate_example() {
    let dir = TempDir::new().unwrap();
    abcgate(dir.path()).arg("init").assert().success();

    abcgate(dir.path())
        .args(["gate", "lessons", "--fail-on-draft"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 approved, 0 draft, 0 pending"));
}

#[test]
fn validate_valid_document() {
    let dir = TempDir::new().unwrap();
    write(&dir, "scale.md", SCALE_LESSON);

    abcgate(dir.path())
        .args(["validate", "scale.md"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[block-1] Scale (key C)"))
        .stdout(predicate::str::contains("All notation valid"));
}

#[test]
fn validate_invalid_document() {
    let dir = TempDir::new().unwrap();
    write(&dir, "broken.md", BROKEN_LESSON);

    abcgate(dir.path())
        .args(["validate", "broken.md"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("ERROR: syntax error"))
        .stderr(predicate::str::contains("1 invalid notation block"));
}

#[test]
fn validate_reports_missing_headers() {
    let dir = TempDir::new().unwrap();
    write(&dir, "tune.abc", "X:1\nK:C\nCDEF|");

    abcgate(dir.path())
        .args(["validate", "tune.abc"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "missing headers: title, meter, default length",
        ));
}

#[test]
fn validate_nonexistent_file() {
    let dir = TempDir::new().unwrap();
    abcgate(dir.path())
        .args(["validate", "nonexistent.md"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn analyze_text_output() {
    let dir = TempDir::new().unwrap();
    write(&dir, "scale.md", SCALE_LESSON);

    abcgate(dir.path())
        .args(["analyze", "scale.md", "--instrument", "Piano"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[block-1] Scale"))
        .stdout(predicate::str::contains("Instrument: piano"))
        .stdout(predicate::str::contains("Playability: 9.5 / 10"))
        .stdout(predicate::str::contains("Learning value: 9.8 / 10"))
        .stdout(predicate::str::contains("Chromatic density: 28.6%"));
}

#[test]
fn analyze_explain_lists_rules() {
    let dir = TempDir::new().unwrap();
    write(&dir, "scale.md", SCALE_LESSON);

    abcgate(dir.path())
        .args(["analyze", "scale.md", "--explain"])
        .assert()
        .success()
        .stdout(predicate::str::contains("chromatic_moderate"))
        .stdout(predicate::str::contains("repetition_scarce"));
}

#[test]
fn analyze_json_output() {
    let dir = TempDir::new().unwrap();
    write(&dir, "scale.md", SCALE_LESSON);

    let output = abcgate(dir.path())
        .args(["analyze", "scale.md", "--format", "json", "--instrument", "violin"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let block = &json[0];
    assert_eq!(block["id"], "block-1");
    assert_eq!(block["analysis"]["instrument"], "violin");
    assert_eq!(block["analysis"]["note_count"], 8);
    assert_eq!(block["analysis"]["difficulty_level"], "beginner");
}

#[test]
fn analyze_reports_unparsable_block() {
    let dir = TempDir::new().unwrap();
    write(&dir, "broken.md", BROKEN_LESSON);

    abcgate(dir.path())
        .args(["analyze", "broken.md"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Not analyzed: syntax error"));
}

#[test]
fn analyze_bare_abc_file() {
    let dir = TempDir::new().unwrap();
    write(&dir, "tune.abc", "X:1\nT:Bare\nK:G\nGABc dBAG|");

    abcgate(dir.path())
        .args(["analyze", "tune.abc"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[block-1] Bare"));
}

#[test]
fn analyze_without_notation_fails() {
    let dir = TempDir::new().unwrap();
    write(&dir, "prose.md", "# Notes\n\nJust words.\n");

    abcgate(dir.path())
        .args(["analyze", "prose.md"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no notation blocks found"));
}

#[test]
fn gate_directory_and_save_report() {
    let dir = TempDir::new().unwrap();
    write(&dir, "lessons/01-scale.md", SCALE_LESSON);
    write(&dir, "lessons/02-broken.md", BROKEN_LESSON);
    write(&dir, "lessons/03-prose.md", "# Notes only\n");
    write(&dir, "lessons/ignored.txt", SCALE_LESSON);

    abcgate(dir.path())
        .args(["gate", "lessons", "--output", "out/report.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 approved, 1 draft, 1 pending"))
        .stdout(predicate::str::contains("invalid syntax"))
        .stderr(predicate::str::contains("Report saved to"));

    let saved = std::fs::read_to_string(dir.path().join("out/report.json")).unwrap();
    let json: serde_json::Value = serde_json::from_str(&saved).unwrap();
    assert_eq!(json["instrument"], "piano");
    assert_eq!(json["threshold"], 6.0);
    assert_eq!(json["entries"].as_array().unwrap().len(), 3);
    assert_eq!(json["entries"][0]["title"], "C Major Scale");
    assert_eq!(json["entries"][0]["result"]["status"], "approved");
    assert_eq!(json["entries"][0]["result"]["can_publish"], true);
    assert_eq!(json["entries"][2]["result"]["status"], "pending");
}

#[test]
fn gate_fail_on_draft() {
    let dir = TempDir::new().unwrap();
    write(&dir, "broken.md", BROKEN_LESSON);

    abcgate(dir.path())
        .args(["gate", "broken.md", "--fail-on-draft"])
        .assert()
        .failure();
}

#[test]
fn gate_threshold_is_inclusive() {
    let dir = TempDir::new().unwrap();
    write(&dir, "scale.md", SCALE_LESSON);

    abcgate(dir.path())
        .args(["gate", "scale.md", "--threshold", "9.8", "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"status\": \"approved\""));

    abcgate(dir.path())
        .args(["gate", "scale.md", "--threshold", "9.9", "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"status\": \"draft\""))
        .stdout(predicate::str::contains("add repeated motifs"));
}

#[test]
fn gate_threshold_from_env() {
    let dir = TempDir::new().unwrap();
    write(&dir, "scale.md", SCALE_LESSON);

    abcgate(dir.path())
        .env("ABCGATE_THRESHOLD", "10")
        .args(["gate", "scale.md"])
        .assert()
        .success()
        .stdout(predicate::str::contains("0 approved, 1 draft"))
        .stdout(predicate::str::contains("Suggestions for"));
}

#[test]
fn gate_markdown_output() {
    let dir = TempDir::new().unwrap();
    write(&dir, "scale.md", SCALE_LESSON);

    abcgate(dir.path())
        .args(["gate", "scale.md", "--format", "markdown"])
        .assert()
        .success()
        .stdout(predicate::str::contains("## Quality gate: piano"))
        .stdout(predicate::str::contains("| approved | 9.5 | 9.8 |"));
}

/// Write `count` copies of the scale lesson under `dir/sub`.
fn write_scales(dir: &TempDir, sub: &str, count: usize) {
    for i in 0..count {
        write(dir, &format!("{sub}/{i:02}-scale.md"), SCALE_LESSON);
    }
}

fn gate_json(cmd: &mut Command) -> serde_json::Value {
    let output = cmd.assert().success().get_output().stdout.clone();
    serde_json::from_slice(&output).unwrap()
}

#[test]
fn gate_dynamic_threshold_from_batch() {
    let dir = TempDir::new().unwrap();
    write_scales(&dir, "lessons", 10);

    let json = gate_json(abcgate(dir.path()).args([
        "gate",
        "lessons",
        "--dynamic",
        "--format",
        "json",
    ]));

    let threshold = json["threshold"].as_f64().unwrap();
    assert!((5.0..=7.0).contains(&threshold));
    // Ten identical 9.8 scores sit above the range and clamp to its top.
    assert_eq!(threshold, 7.0);
    assert_eq!(json["entries"].as_array().unwrap().len(), 10);
    assert_eq!(json["entries"][0]["result"]["status"], "approved");
}

#[test]
fn gate_dynamic_needs_ten_samples() {
    let dir = TempDir::new().unwrap();
    write_scales(&dir, "lessons", 9);

    let json = gate_json(abcgate(dir.path()).args([
        "gate",
        "lessons",
        "--dynamic",
        "--threshold",
        "6.5",
        "--format",
        "json",
    ]));

    assert_eq!(json["threshold"], 6.5);
}

#[test]
fn gate_dynamic_from_config() {
    let dir = TempDir::new().unwrap();
    write(&dir, "abcgate.toml", "dynamic_threshold = true
");
    write_scales(&dir, "lessons", 10);

    let json = gate_json(abcgate(dir.path()).args(["gate", "lessons", "--format", "json"]));
    assert_eq!(json["threshold"], 7.0);
}

#[test]
fn gate_dynamic_reads_history_reports() {
    let dir = TempDir::new().unwrap();
    write_scales(&dir, "batch", 5);
    write(&dir, "scale.md", SCALE_LESSON);

    abcgate(dir.path())
        .args(["gate", "batch", "--output", "first.json"])
        .assert()
        .success();
    abcgate(dir.path())
        .args(["gate", "batch", "--output", "second.json"])
        .assert()
        .success();

    // One report holds five scores, too few to adapt.
    let json = gate_json(abcgate(dir.path()).args([
        "gate",
        "scale.md",
        "--dynamic",
        "--history",
        "first.json",
        "--format",
        "json",
    ]));
    assert_eq!(json["threshold"], 6.0);

    // Both reports together hold ten.
    let json = gate_json(abcgate(dir.path()).args([
        "gate",
        "scale.md",
        "--dynamic",
        "--history",
        "second.json",
        "--history",
        "first.json",
        "--format",
        "json",
    ]));
    assert_eq!(json["threshold"], 7.0);
    assert_eq!(json["entries"].as_array().unwrap().len(), 1);
}

#[test]
fn gate_history_must_exist() {
    let dir = TempDir::new().unwrap();
    write(&dir, "scale.md", SCALE_LESSON);

    abcgate(dir.path())
        .args(["gate", "scale.md", "--dynamic", "--history", "missing.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read report"));
}

#[test]
fn gate_nonexistent_path() {
    let dir = TempDir::new().unwrap();
    abcgate(dir.path())
        .args(["gate", "missing.md"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("file not found"));
}

#[test]
fn trend_from_saved_reports() {
    let dir = TempDir::new().unwrap();
    write(&dir, "scale.md", SCALE_LESSON);

    abcgate(dir.path())
        .args(["gate", "scale.md", "--output", "first.json"])
        .assert()
        .success();
    abcgate(dir.path())
        .args(["gate", "scale.md", "--output", "second.json"])
        .assert()
        .success();

    abcgate(dir.path())
        .args(["trend", "first.json", "second.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("over 2 scores from 2 report(s)"))
        .stdout(predicate::str::contains("Trend:             stable"))
        .stdout(predicate::str::contains("Pass rate:         100.0%"))
        .stdout(predicate::str::contains("Dynamic threshold: 6.0"));
}

#[test]
fn trend_missing_report() {
    let dir = TempDir::new().unwrap();
    abcgate(dir.path())
        .args(["trend", "no_such_report.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read report"));
}

#[test]
fn instruments_lists_catalog() {
    let dir = TempDir::new().unwrap();
    abcgate(dir.path())
        .arg("instruments")
        .assert()
        .success()
        .stdout(predicate::str::contains("cello"))
        .stdout(predicate::str::contains("27 instruments"));
}

#[test]
fn instruments_include_config_overrides() {
    let dir = TempDir::new().unwrap();
    write(
        &dir,
        "abcgate.toml",
        "[instruments.tin_whistle]\ntempo_coefficient = 1.1\nleap_coefficient = 1.2\nmin = 74\nmax = 98\ncomfortable_min = 74\ncomfortable_max = 93\nfamily = \"wind\"\n",
    );

    abcgate(dir.path())
        .arg("instruments")
        .assert()
        .success()
        .stdout(predicate::str::contains("tin_whistle"))
        .stdout(predicate::str::contains("28 instruments"));
}

#[test]
fn explicit_config_must_exist() {
    let dir = TempDir::new().unwrap();
    abcgate(dir.path())
        .args(["instruments", "--config", "nope.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("config file not found"));
}

#[test]
fn format_prints_normalized_document() {
    let dir = TempDir::new().unwrap();
    write(&dir, "messy.md", "# Tune\n\n```abc\nX:1\nK:C\n\n\n  C  D   E |\n```\n");

    abcgate(dir.path())
        .args(["format", "messy.md"])
        .assert()
        .success()
        .stdout(predicate::str::diff(
            "# Tune\n\n```abc\nX:1\nK:C\n\nC D E |\n```\n",
        ));
}

#[test]
fn format_in_place() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "tune.abc", "X:1\nK:C\n  C  D |\n");

    abcgate(dir.path())
        .args(["format", "tune.abc", "--in-place"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Formatted tune.abc"));
    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        "X:1\nK:C\n\nC D |\n"
    );

    abcgate(dir.path())
        .args(["format", "tune.abc", "--in-place"])
        .assert()
        .success()
        .stdout(predicate::str::contains("already formatted"));
}
