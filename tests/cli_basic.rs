//! Integration tests for basic CLI behavior.
//!
//! Tests that the binary exists, accepts standard flags, each subcommand
//! responds to `--help`, and bad input fails before any network call.

#![allow(deprecated)] // cargo_bin deprecation; replacement not yet stable

use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::NamedTempFile;

/// Helper: get a Command for the `reelsource` binary with an isolated config.
fn reelsource(config: &NamedTempFile) -> Command {
    let mut cmd = Command::cargo_bin("reelsource").expect("binary 'reelsource' should be built");
    cmd.arg("--config")
        .arg(config.path())
        .env_remove("TMDB_API_KEY")
        .env_remove("REELSOURCE_CONFIG")
        .env("RUST_LOG", "warn");
    cmd
}

fn empty_config() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "# defaults").unwrap();
    file
}

// ─── Top-level flags ─────────────────────────────────────────────────────────

#[test]
fn help_flag_shows_usage() {
    reelsource(&empty_config())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage: reelsource"))
        .stdout(predicate::str::contains("movie"))
        .stdout(predicate::str::contains("tv"))
        .stdout(predicate::str::contains("serve"));
}

#[test]
fn version_flag_shows_semver() {
    reelsource(&empty_config())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"^reelsource \d+\.\d+\.\d+\n$").unwrap());
}

#[test]
fn no_args_shows_error_and_usage() {
    reelsource(&empty_config())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage: reelsource"));
}

// ─── Subcommand help ─────────────────────────────────────────────────────────

#[test]
fn movie_help() {
    reelsource(&empty_config())
        .args(["movie", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Resolve a movie"))
        .stdout(predicate::str::contains("<TMDB_ID>"))
        .stdout(predicate::str::contains("--provider"))
        .stdout(predicate::str::contains("--server"));
}

#[test]
fn tv_help() {
    reelsource(&empty_config())
        .args(["tv", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--season"))
        .stdout(predicate::str::contains("--episode"));
}

#[test]
fn serve_help() {
    reelsource(&empty_config())
        .args(["serve", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("HTTP server"))
        .stdout(predicate::str::contains("--bind"));
}

// ─── Argument validation ─────────────────────────────────────────────────────

#[test]
fn movie_missing_id_fails() {
    reelsource(&empty_config())
        .arg("movie")
        .assert()
        .failure()
        .stderr(predicate::str::contains("<TMDB_ID>"));
}

#[test]
fn tv_missing_season_fails() {
    reelsource(&empty_config())
        .args(["tv", "1399", "--episode", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--season"));
}

#[test]
fn tv_zero_episode_fails() {
    reelsource(&empty_config())
        .args(["tv", "1399", "--season", "1", "--episode", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("episode must be a positive integer"));
}

#[test]
fn blank_movie_id_fails() {
    reelsource(&empty_config())
        .args(["movie", " "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("tmdb id is required"));
}

// ─── Configuration ───────────────────────────────────────────────────────────

#[test]
fn missing_config_file_fails() {
    Command::cargo_bin("reelsource")
        .unwrap()
        .args(["--config", "/nonexistent/reelsource.toml", "movie", "603"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load configuration"));
}

#[test]
fn unconfigured_provider_fails() {
    reelsource(&empty_config())
        .args(["movie", "603", "--provider", "zoechip"])
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("no scraper plugin configured for 'zoechip'"));
}

#[cfg(unix)]
#[test]
fn resolves_through_plugin_with_no_embeds() {
    let mut config = NamedTempFile::new().unwrap();
    writeln!(
        config,
        r#"
default_provider = "zoechip"

[[providers]]
id = "zoechip"
binary = "/bin/sh"
args = ["-c", "cat >/dev/null; echo '{{\"embeds\":[]}}'"]
"#
    )
    .unwrap();

    reelsource(&config)
        .args(["--compact", "movie", "603"])
        .assert()
        .success()
        .stdout(r#"{"sources":[],"subtitles":[]}"#.to_string() + "\n")
        .stderr(predicate::str::contains("No playable stream found"));
}
