use std::{fs, process::Command};

use stackbots_core::{RunStatus, SimulationState};

fn stackbots(args: &[&str]) -> String {
    let output = Command::new(env!("CARGO_BIN_EXE_stackbots"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to launch stackbots");

    assert!(
        output.status.success(),
        "stackbots failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).expect("utf-8 output")
}

#[test]
fn json_format_emits_one_state_per_step() {
    let stdout = stackbots(&[
        "run",
        "--robots",
        "0",
        "--items",
        "4",
        "--max-steps",
        "6",
        "--format",
        "json",
    ]);

    let states: Vec<SimulationState> = stdout
        .lines()
        .map(|line| serde_json::from_str(line).expect("state line"))
        .collect();

    assert_eq!(states.len(), 7);
    assert_eq!(states[0].step, 0);
    assert_eq!(states[6].step, 6);
    assert_eq!(states[6].status, RunStatus::TimedOut);
    assert!(states[..6]
        .iter()
        .all(|state| state.status == RunStatus::Running));
}

#[test]
fn summary_format_prints_a_line_per_run() {
    let stdout = stackbots(&["run", "--runs", "3", "--max-steps", "20", "--seed", "5"]);
    let lines: Vec<&str> = stdout.lines().collect();

    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("seed=5 "));
    assert!(lines[2].starts_with("seed=7 "));
}

#[test]
fn frames_format_draws_the_floor() {
    let stdout = stackbots(&[
        "run", "--width", "6", "--height", "5", "--robots", "1", "--items", "2", "--max-steps",
        "1", "--format", "frames",
    ]);

    let frame: Vec<&str> = stdout.lines().skip(1).take(5).collect();
    assert_eq!(frame.first(), Some(&"######"));
    assert_eq!(frame.last(), Some(&"######"));
    assert!(frame.iter().all(|row| row.len() == 6));
}

#[test]
fn config_file_is_read_and_overridden() {
    let path = std::env::temp_dir().join(format!("stackbots-cli-{}.toml", std::process::id()));
    fs::write(&path, "[simulation]\nrobots = 0\nitems = 3\nmax_steps = 2\nseed = 40\n")
        .expect("write temp config");

    let stdout = stackbots(&[
        "run",
        "--config",
        path.to_str().expect("utf-8 temp path"),
        "--seed",
        "41",
    ]);
    let _ = fs::remove_file(&path);

    assert_eq!(
        stdout.trim(),
        "seed=41 status=timed_out steps=2 robot_moves=0 stacks=0 lone_items=3 items=3"
    );
}

#[test]
fn overcrowded_floor_fails_with_context() {
    let output = Command::new(env!("CARGO_BIN_EXE_stackbots"))
        .args(["run", "--width", "4", "--height", "4", "--robots", "1", "--items", "5"])
        .output()
        .expect("failed to launch stackbots");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to start run"), "{stderr}");
}
