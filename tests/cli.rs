use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const HEADER: &str = ",Industry,Year,Metric,Attribute,Scenario,Value\n";

fn write_csv(dir: &Path, name: &str, body: &str) {
    std::fs::write(dir.join(name), format!("{HEADER}{body}")).unwrap();
}

fn fixture() -> (TempDir, TempDir) {
    let home = TempDir::new().unwrap();
    let data = TempDir::new().unwrap();
    write_csv(
        data.path(),
        "base.csv",
        "0,Mining,2035,10Employment,Direct,Base Case,100\n\
         1,Agriculture,2035,10Employment,Direct,Base Case,50\n\
         2,Government,2040,11LaborIncome,Total,Base Case,1000\n\
         3,Government,2040,10Employment,Induced,Base Case,7\n",
    );
    write_csv(
        data.path(),
        "higher.csv",
        "0,Mining,2035,10Employment,Direct,Higher Receipt,100\n\
         1,Agriculture,2035,10Employment,Direct,Higher Receipt,50\n\
         2,Government,2040,11LaborIncome,Total,Higher Receipt,1000\n",
    );
    (home, data)
}

fn cmd(home: &TempDir, data: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("impact-dash").unwrap();
    cmd.env("HOME", home.path())
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .arg("--data-dir")
        .arg(data.path());
    cmd
}

#[test]
fn test_choices_lists_effects_and_scales() {
    let (home, data) = fixture();
    cmd(&home, &data)
        .arg("choices")
        .assert()
        .success()
        .stdout(predicate::str::contains("Number of Jobs"))
        .stdout(predicate::str::contains("Labor Income ($)"))
        .stdout(predicate::str::contains("Direct"))
        .stdout(predicate::str::contains("Induced").not())
        .stdout(predicate::str::contains("Base Case, Higher Receipt"));
}

#[test]
fn test_show_groups_industries() {
    let (home, data) = fixture();
    cmd(&home, &data)
        .args(["show", "--effect", "Number of Jobs", "--scale", "Direct"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Mining, Manufacturing, and Agriculture"))
        .stdout(predicate::str::contains("150.00"))
        .stdout(predicate::str::contains("0-05"));
}

#[test]
fn test_show_rejects_unknown_effect() {
    let (home, data) = fixture();
    cmd(&home, &data)
        .args(["show", "--effect", "Happiness"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid effect selection: 'Happiness'"));
}

#[test]
fn test_show_money_metric() {
    let (home, data) = fixture();
    cmd(&home, &data)
        .args(["show", "--effect", "Labor Income ($)", "--scale", "Total"])
        .assert()
        .success()
        .stdout(predicate::str::contains("$1,000.00"))
        .stdout(predicate::str::contains("05-10"));
}

#[test]
fn test_export_writes_rows_and_spec() {
    let (home, data) = fixture();
    let out = data.path().join("out");
    cmd(&home, &data)
        .args(["export", "--effect", "Number of Jobs", "--scale", "Direct", "--output"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("chart_rows.csv"));

    let rows = std::fs::read_to_string(out.join("chart_rows.csv")).unwrap();
    assert!(rows.starts_with("Industry,Year,Value,Description,Scenario"));
    assert_eq!(rows.lines().count(), 3);
    assert!(rows.contains("Base Case"));
    assert!(rows.contains("Higher Receipt"));

    let spec: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(out.join("chart.json")).unwrap()).unwrap();
    assert_eq!(spec["effect"], "Number of Jobs");
    assert_eq!(spec["frame_order"].as_array().unwrap().len(), 16);
    assert_eq!(spec["panels"].as_array().unwrap().len(), 2);
}

#[test]
fn test_check_reports_misalignment() {
    let (home, data) = fixture();
    write_csv(
        data.path(),
        "extra.csv",
        "0,Government,2040,10Employment,Direct,Base Case,12\n",
    );
    cmd(&home, &data)
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("Raw rows:      8"))
        .stdout(predicate::str::contains("missing from a scenario"));
}

#[test]
fn test_unmapped_year_fails() {
    let (home, data) = fixture();
    write_csv(
        data.path(),
        "stray.csv",
        "0,Mining,2036,10Employment,Direct,Base Case,1\n",
    );
    cmd(&home, &data)
        .arg("choices")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Year 2036 has no interval label"));
}

#[test]
fn test_missing_column_fails() {
    let home = TempDir::new().unwrap();
    let data = TempDir::new().unwrap();
    std::fs::write(
        data.path().join("bad.csv"),
        "Industry,Year,Metric,Attribute,Scenario\nMining,2035,10Employment,Direct,Base Case\n",
    )
    .unwrap();
    cmd(&home, &data)
        .arg("check")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("bad.csv: missing required column 'Value'"));
}

#[test]
fn test_empty_data_dir_fails() {
    let home = TempDir::new().unwrap();
    let data = TempDir::new().unwrap();
    cmd(&home, &data)
        .arg("check")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("No CSV files found"));
}

#[test]
fn test_tables_prints_variant() {
    let (home, data) = fixture();
    cmd(&home, &data)
        .args(["--variant", "vertical", "tables"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Transportation and Utilities"));
}

#[test]
fn test_init_saves_settings() {
    let (home, data) = fixture();
    cmd(&home, &data)
        .args(["--variant", "grouped", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved settings"));

    let saved = home.path().join(".config/impact-dash/settings.json");
    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(saved).unwrap()).unwrap();
    assert_eq!(json["variant"], "grouped");
}
