use std::{fs, process::Command};

#[test]
fn empty_floor_settles_immediately() {
    let output = Command::new(env!("CARGO_BIN_EXE_warehouse"))
        .args(["--width", "4", "--height", "3", "--robots", "1", "--boxes", "0"])
        .output()
        .expect("failed to launch the warehouse binary");

    assert!(output.status.success(), "warehouse run should succeed");
    let stdout = String::from_utf8(output.stdout).expect("utf-8 output");
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 4, "three floor rows and a summary: {stdout}");
    assert_eq!(stdout.matches('R').count(), 1);
    assert!(lines[3].starts_with("ticks=0 towers=0 carried=0 robots=1"));
}

#[test]
fn history_is_exported_as_json() {
    let path = std::env::temp_dir().join(format!("warehouse-history-{}.json", std::process::id()));
    let status = Command::new(env!("CARGO_BIN_EXE_warehouse"))
        .args(["--width", "5", "--height", "5", "--robots", "2", "--boxes", "8"])
        .args(["--seed", "11", "--max-ticks", "25", "--history"])
        .arg(&path)
        .status()
        .expect("failed to launch the warehouse binary");
    assert!(status.success(), "warehouse run should succeed");

    let contents = fs::read_to_string(&path).expect("history file");
    let history: serde_json::Value = serde_json::from_str(&contents).expect("history is json");
    let snapshots = history.as_array().expect("history is a list of snapshots");
    assert!(!snapshots.is_empty());
    assert!(snapshots.len() <= 25);
    for snapshot in snapshots {
        assert_eq!(snapshot["width"], 5);
        assert_eq!(snapshot["codes"].as_array().map(Vec::len), Some(25));
    }
    let _ = fs::remove_file(&path);
}

#[test]
fn invalid_configuration_fails() {
    let output = Command::new(env!("CARGO_BIN_EXE_warehouse"))
        .args(["--width", "2", "--height", "2", "--boxes", "13"])
        .output()
        .expect("failed to launch the warehouse binary");

    assert!(!output.status.success());
}
