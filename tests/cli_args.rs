//! Integration tests for CLI argument handling
//!
//! Runs the binary with arguments that are rejected before the terminal is
//! touched, plus `--once` against unreachable services.

use std::process::Command;

/// Helper to run the CLI with given args and capture output
fn run_cli(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_riverwatch"))
        .args(args)
        .output()
        .expect("Failed to execute riverwatch")
}

#[test]
fn test_help_flag_exits_successfully() {
    let output = run_cli(&["--help"]);
    assert!(
        output.status.success(),
        "Expected --help to exit successfully"
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("riverwatch"), "Help should mention riverwatch");
    assert!(stdout.contains("--once"), "Help should mention --once flag");
    assert!(stdout.contains("--timeout"), "Help should mention --timeout flag");
}

#[test]
fn test_zero_timeout_prints_error_and_exits() {
    let output = run_cli(&["--timeout", "0"]);
    assert!(!output.status.success(), "Expected zero timeout to fail");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Invalid timeout"),
        "Should print error message about the timeout: {}",
        stderr
    );
}

#[test]
fn test_invalid_url_prints_error_and_exits() {
    let output = run_cli(&["--once", "--water-url", "waterservices.usgs.gov"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Invalid URL"), "unexpected stderr: {}", stderr);
}

#[test]
fn test_json_without_once_is_rejected() {
    let output = run_cli(&["--json"]);
    assert!(!output.status.success());
}

#[test]
fn test_once_against_unreachable_services_degrades() {
    let output = run_cli(&[
        "--once",
        "--timeout",
        "2",
        "--water-url",
        "http://127.0.0.1:9/iv/",
        "--weather-url",
        "http://127.0.0.1:9",
    ]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Unable to load water monitoring data"));
    assert!(stdout.contains("Weather forecast temporarily unavailable"));
    assert!(stdout.contains("Unable to load E. coli data"));
}

#[test]
fn test_once_json_against_unreachable_services() {
    let output = run_cli(&[
        "--once",
        "--json",
        "--timeout",
        "2",
        "--water-url",
        "http://127.0.0.1:9/iv/",
        "--weather-url",
        "http://127.0.0.1:9",
    ]);
    assert!(output.status.success());

    let value: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    assert_eq!(value["sites"].as_array().map(Vec::len), Some(0));
    assert_eq!(
        value["weather_state"]["error"],
        "Weather forecast temporarily unavailable"
    );
}

#[cfg(test)]
mod unit_tests {
    //! Unit tests for CLI parsing that don't require running the binary

    use clap::Parser;
    use riverwatch::cli::{Cli, CliError, OutputMode, StartupConfig};
    use riverwatch::refresh::RefreshConfig;

    #[test]
    fn test_cli_no_args_is_interactive() {
        let cli = Cli::parse_from(["riverwatch"]);
        let config = StartupConfig::from_cli(&cli).unwrap();
        assert_eq!(config.mode, OutputMode::Interactive);
        assert_eq!(config.refresh, RefreshConfig::default());
    }

    #[test]
    fn test_cli_once_json() {
        let cli = Cli::parse_from(["riverwatch", "--once", "--json"]);
        let config = StartupConfig::from_cli(&cli).unwrap();
        assert_eq!(config.mode, OutputMode::Json);
    }

    #[test]
    fn test_cli_refresh_minutes() {
        let cli = Cli::parse_from(["riverwatch", "--refresh", "5"]);
        let config = StartupConfig::from_cli(&cli).unwrap();
        assert_eq!(config.refresh, RefreshConfig::from_minutes(5));
    }

    #[test]
    fn test_cli_invalid_weather_url() {
        let cli = Cli::parse_from(["riverwatch", "--weather-url", "localhost"]);
        let result = StartupConfig::from_cli(&cli);
        assert!(matches!(result, Err(CliError::InvalidUrl(_))));
    }
}
