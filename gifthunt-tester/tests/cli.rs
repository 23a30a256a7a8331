use std::process::Command;

fn temp_path(label: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!(
        "gifthunt-cli-{label}-{}",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos()
    ))
}

#[test]
fn cli_list_lineups_writes_output() {
    let exe = env!("CARGO_BIN_EXE_gifthunt-tester");
    let output_path = temp_path("list");
    let status = Command::new(exe)
        .args(["--list-lineups", "--output"])
        .arg(&output_path)
        .status()
        .expect("run cli");
    assert!(status.success());
    let content = std::fs::read_to_string(output_path).expect("read output");
    assert!(content.contains("Available lineups"));
    assert!(content.contains("arcade"));
}

#[test]
fn cli_runs_every_lineup_with_json_report() {
    let exe = env!("CARGO_BIN_EXE_gifthunt-tester");
    let output_path = temp_path("run");
    let output = Command::new(exe)
        .args([
            "--lineup",
            "all",
            "--report",
            "json",
            "--iterations",
            "1",
            "--seeds",
            "1,2",
            "--output",
        ])
        .arg(&output_path)
        .output()
        .expect("run cli");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Gift Hunt Automated Tester"));

    let content = std::fs::read_to_string(output_path).expect("read output");
    let report: serde_json::Value = serde_json::from_str(&content).expect("json report");
    let results = report.as_array().expect("array of results");
    assert_eq!(results.len(), 6);
    assert!(results.iter().all(|r| r["passed"] == true));
}

#[test]
fn cli_rejects_unknown_lineup() {
    let exe = env!("CARGO_BIN_EXE_gifthunt-tester");
    let output = Command::new(exe)
        .args(["--lineup", "snake", "--iterations", "1"])
        .output()
        .expect("run cli");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Unknown lineup"));
}

#[test]
fn cli_refuses_unwinnable_config() {
    let exe = env!("CARGO_BIN_EXE_gifthunt-tester");
    let config_path = temp_path("config");
    std::fs::write(
        &config_path,
        r#"{"catalog": [{"name": "Teddy", "icon": "🧸", "caption": "Soft"}]}"#,
    )
    .expect("write config");
    let output = Command::new(exe)
        .args(["--lineup", "gift-box", "--config"])
        .arg(&config_path)
        .output()
        .expect("run cli");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("cannot be played"));
}

#[test]
fn cli_plays_the_lineup_from_the_config_file() {
    let exe = env!("CARGO_BIN_EXE_gifthunt-tester");
    let config_path = temp_path("own-lineup");
    let output_path = temp_path("own-lineup-report");
    std::fs::write(
        &config_path,
        r#"{
            "catalog": [
                {"name": "Teddy", "icon": "🧸", "caption": "Soft"},
                {"name": "Roses", "icon": "🌹", "caption": "Red"}
            ],
            "lineup": ["quiz", "pop-reveal"]
        }"#,
    )
    .expect("write config");
    let output = Command::new(exe)
        .args(["--iterations", "1", "--report", "json", "--config"])
        .arg(&config_path)
        .arg("--output")
        .arg(&output_path)
        .output()
        .expect("run cli");
    assert!(
        output.status.success(),
        "{}",
        String::from_utf8_lossy(&output.stderr)
    );

    let content = std::fs::read_to_string(output_path).expect("read output");
    let report: serde_json::Value = serde_json::from_str(&content).expect("json report");
    let results = report.as_array().expect("array of results");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["scenario_name"], "config");
    assert_eq!(results[0]["passed"], true);
}
