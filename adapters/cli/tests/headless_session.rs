use std::process::Command;

fn run(args: &[&str]) -> serde_json::Value {
    let output = Command::new(env!("CARGO_BIN_EXE_spellstorm"))
        .args(args)
        .env("RUST_LOG", "warn")
        .output()
        .expect("failed to invoke spellstorm binary");
    assert!(output.status.success(), "spellstorm exited with {}", output.status);
    serde_json::from_slice(&output.stdout).expect("summary is valid json")
}

#[test]
fn json_summary_reports_the_session() {
    let summary = run(&["--json", "--duration-secs", "30", "--seed", "11"]);

    assert_eq!(summary["seed"], 11);
    assert!(summary["elapsed_secs"].as_f64().expect("elapsed") > 0.0);
    assert!(summary["waves_triggered"].as_u64().expect("waves") >= 1);
    assert_eq!(summary["abilities"][0][0], "fireball");
}

#[test]
fn same_seed_produces_same_summary() {
    let args = ["--json", "--duration-secs", "45", "--seed", "3"];
    assert_eq!(run(&args), run(&args));
}

#[test]
fn missing_content_directory_fails() {
    let status = Command::new(env!("CARGO_BIN_EXE_spellstorm"))
        .args(["--content", "/nonexistent/spellstorm-content"])
        .env("RUST_LOG", "off")
        .status()
        .expect("failed to invoke spellstorm binary");
    assert!(!status.success());
}
