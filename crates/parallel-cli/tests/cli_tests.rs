//! CLI integration tests.
//!
//! These verify argument parsing and output formatting by invoking the
//! built binary as a process. Commands that would open the store run
//! against a throwaway data directory with the passphrase supplied via
//! the environment; nothing here needs a reachable chain or backend.

use std::path::PathBuf;
use std::process::Command;
use std::sync::atomic::{AtomicU32, Ordering};

static COUNTER: AtomicU32 = AtomicU32::new(0);

fn temp_dir() -> PathBuf {
    let id = COUNTER.fetch_add(1, Ordering::SeqCst);
    let dir = std::env::temp_dir().join(format!(
        "parallel-cli-test-{}-{}",
        std::process::id(),
        id,
    ));
    let _ = std::fs::create_dir_all(&dir);
    dir
}

/// Runs the CLI binary with args and captures output.
/// Returns (exit_code, stdout, stderr).
fn run_cli(args: &[&str], passphrase: Option<&str>) -> (i32, String, String) {
    let mut command = Command::new(env!("CARGO_BIN_EXE_parallel"));
    command.args(args).env_remove("PARALLEL_PASSPHRASE");
    if let Some(pass) = passphrase {
        command.env("PARALLEL_PASSPHRASE", pass);
    }

    match command.output() {
        Ok(o) => {
            let code = o.status.code().unwrap_or(-1);
            let stdout = String::from_utf8_lossy(&o.stdout).to_string();
            let stderr = String::from_utf8_lossy(&o.stderr).to_string();
            (code, stdout, stderr)
        }
        Err(e) => {
            eprintln!("WARNING: could not run binary: {e}");
            (-1, String::new(), e.to_string())
        }
    }
}

// -----------------------------------------------------------------------
// Clap parsing tests
// -----------------------------------------------------------------------

#[test]
fn help_flag_exits_zero() {
    let (code, stdout, _) = run_cli(&["--help"], None);
    assert_eq!(code, 0, "--help should exit 0");
    assert!(stdout.contains("Parallel"), "help should mention Parallel");
}

#[test]
fn version_flag_exits_zero() {
    let (code, stdout, _) = run_cli(&["--version"], None);
    assert_eq!(code, 0, "--version should exit 0");
    assert!(
        stdout.contains("parallel"),
        "version should print program name"
    );
}

#[test]
fn unknown_command_fails() {
    let (code, _, stderr) = run_cli(&["nonexistent"], None);
    assert_ne!(code, 0, "unknown command should fail");
    assert!(
        stderr.contains("error") || stderr.contains("unrecognized"),
        "stderr should indicate error: {stderr}"
    );
}

#[test]
fn tx_send_missing_args_fails() {
    let (code, _, stderr) = run_cli(&["tx", "send"], None);
    assert_ne!(code, 0, "tx send without args should fail");
    assert!(
        !stderr.is_empty(),
        "should print error about missing arguments"
    );
}

#[test]
fn wallet_help() {
    let (code, stdout, _) = run_cli(&["wallet", "--help"], None);
    assert_eq!(code, 0);
    assert!(stdout.contains("create") || stdout.contains("Create"));
}

#[test]
fn balance_help() {
    let (code, stdout, _) = run_cli(&["balance", "--help"], None);
    assert_eq!(code, 0);
    assert!(stdout.contains("show") || stdout.contains("Show"));
}

#[test]
fn history_help() {
    let (code, stdout, _) = run_cli(&["history", "--help"], None);
    assert_eq!(code, 0);
    assert!(stdout.contains("list") || stdout.contains("List"));
}

#[test]
fn gov_help() {
    let (code, stdout, _) = run_cli(&["gov", "--help"], None);
    assert_eq!(code, 0);
    assert!(stdout.contains("vote") || stdout.contains("Vote"));
}

#[test]
fn governance_alias_accepted() {
    let (code, stdout, _) = run_cli(&["governance", "--help"], None);
    assert_eq!(code, 0);
    assert!(stdout.contains("proposals") || stdout.contains("Proposals"));
}

// -----------------------------------------------------------------------
// Store-backed runs
// -----------------------------------------------------------------------

#[test]
fn wallet_status_reports_a_fresh_store() {
    let dir = temp_dir();
    let (code, stdout, _) = run_cli(
        &["--json", "--data-dir", dir.to_str().unwrap(), "wallet", "status"],
        Some("cli test passphrase"),
    );
    assert_eq!(code, 0, "wallet status on a fresh store should succeed");

    let parsed: serde_json::Value =
        serde_json::from_str(stdout.trim()).unwrap_or_else(|_| panic!("invalid JSON: {stdout}"));
    assert_eq!(parsed["wallet_exists"], false);
    assert_eq!(parsed["pin_set"], false);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn blank_passphrase_error_is_json_in_json_mode() {
    let dir = temp_dir();
    // An empty passphrase is refused before anything touches the
    // network, and in JSON mode the refusal must parse as JSON.
    let (code, _, stderr) = run_cli(
        &["--json", "--data-dir", dir.to_str().unwrap(), "wallet", "status"],
        Some(""),
    );
    assert_ne!(code, 0);

    let parsed: serde_json::Value =
        serde_json::from_str(stderr.trim()).unwrap_or_else(|_| panic!("invalid JSON: {stderr}"));
    assert!(parsed["error"].is_string());

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn wallet_clear_requires_confirmation() {
    let dir = temp_dir();
    let (code, _, stderr) = run_cli(
        &["--data-dir", dir.to_str().unwrap(), "wallet", "clear"],
        Some("cli test passphrase"),
    );
    assert_ne!(code, 0, "clear without --yes should fail");
    assert!(stderr.contains("--yes"), "stderr should mention --yes: {stderr}");

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn bad_amount_is_rejected_before_any_prompt() {
    let dir = temp_dir();
    let (code, _, stderr) = run_cli(
        &[
            "--data-dir",
            dir.to_str().unwrap(),
            "tx",
            "estimate",
            "rbtc",
            "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266",
            "1,5",
        ],
        Some("cli test passphrase"),
    );
    assert_ne!(code, 0);
    assert!(
        stderr.contains("non-digit"),
        "stderr should name the bad amount: {stderr}"
    );

    let _ = std::fs::remove_dir_all(&dir);
}
