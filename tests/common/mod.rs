//! Shared integration-test harness for running the `stormgen` binary.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Returns the path to a fixture directory holding a `storm_config.ini`.
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Runs `stormgen` with the given arguments and waits for it to exit.
#[allow(clippy::missing_panics_doc)]
pub fn spawn_command(args: &[&str]) -> Output {
    spawn_command_with_env(args, &[])
}

/// Runs `stormgen` with extra environment variables.
#[allow(clippy::missing_panics_doc)]
pub fn spawn_command_with_env(args: &[&str], envs: &[(&str, &str)]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_stormgen"))
        .args(args)
        .env_remove("STORMGEN_CONFIG_DIR")
        .env_remove("STORMGEN_LOG_LEVEL")
        .env("NO_COLOR", "1")
        .envs(envs.iter().copied())
        .output()
        .expect("failed to spawn stormgen")
}

/// Fixture directory as a `&str` argument.
#[allow(clippy::missing_panics_doc)]
pub fn fixture_arg(name: &str) -> String {
    fixture_path(name)
        .to_str()
        .expect("non-UTF-8 fixture path")
        .to_string()
}

/// Runs `generate` for a fixture, writing to `output`.
pub fn generate(fixture: &str, output: &Path, seed: u64) -> Output {
    spawn_command(&[
        "generate",
        "--config-dir",
        &fixture_arg(fixture),
        "--output-file",
        output.to_str().expect("non-UTF-8 output path"),
        "--seed",
        &seed.to_string(),
    ])
}

/// Lossy stdout.
pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

/// Lossy stderr.
pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}
