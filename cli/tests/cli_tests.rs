// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! End-to-end tests for the `konductor` binary.
//!
//! Each test runs in its own scratch directory with HOME pointed at it, so no
//! user or working-directory configuration leaks in.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

const WEATHER_MANIFEST: &str = r#"apiVersion: konductor.dev/v1
kind: Tool
metadata:
  name: weather-tool
spec:
  type: pythonFunction
  description: Get the weather report for a city
  source:
    file: tools/weather.py
    functionName: get_weather_report
---
apiVersion: konductor.dev/v1
kind: Model
metadata:
  name: gemini_flash_model
spec:
  provider: google
  modelId: gemini-2.5-flash
---
apiVersion: konductor.dev/v1
kind: LlmAgent
metadata:
  name: test_agent
spec:
  modelRef: gemini_flash_model
  instruction: Use the weather tool to answer questions about the weather.
  toolRefs: [weather-tool]
"#;

fn konductor(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_konductor"))
        .args(args)
        .current_dir(dir)
        .env("HOME", dir)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .env_remove("KONDUCTOR_CONFIG_PATH")
        .env_remove("KONDUCTOR_PROVIDER")
        .env_remove("KONDUCTOR_OUTPUT_DIR")
        .env_remove("KONDUCTOR_TOOL_PATH")
        .env_remove("KONDUCTOR_LOG_LEVEL")
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn weather_project(manifest: &str) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("agents.yaml"), manifest).unwrap();
    fs::create_dir_all(dir.path().join("tools")).unwrap();
    fs::write(
        dir.path().join("tools/weather.py"),
        "def get_weather_report(city: str) -> dict:\n    return {\"city\": city}\n",
    )
    .unwrap();
    dir
}

#[test]
fn test_generate_weather_agent() {
    let dir = weather_project(WEATHER_MANIFEST);
    let output = konductor(
        dir.path(),
        &["generate", "agents.yaml", "-p", "google_adk", "-o", "generated_agent"],
    );
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let out = dir.path().join("generated_agent");
    let agent = fs::read_to_string(out.join("agent.py")).unwrap();
    assert_eq!(agent.matches("TOOL_FUNCTION_MAP[").count(), 1);
    assert!(agent.contains("MODEL_CONFIG_MAP[\"gemini_flash_model\"]"));

    let requirements = fs::read_to_string(out.join("requirements.txt")).unwrap();
    assert!(requirements.lines().any(|line| line == "google-adk>=1.10.0"));
    assert!(stdout(&output).contains("test_agent"));
}

#[test]
fn test_generate_uses_configured_defaults() {
    let dir = weather_project(WEATHER_MANIFEST);
    fs::write(
        dir.path().join("konductor-config.yaml"),
        "apiVersion: konductor.dev/v1\nkind: KonductorConfig\nspec:\n  default_provider: stub\n  output_dir: topology_out\n",
    )
    .unwrap();

    let output = konductor(dir.path(), &["generate", "agents.yaml"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(dir.path().join("topology_out/topology.json").is_file());
}

#[test]
fn test_nonexistent_tool_fails_without_output() {
    let dir = weather_project(&WEATHER_MANIFEST.replace("[weather-tool]", "[nonexistent-tool]"));
    let output = konductor(dir.path(), &["generate", "agents.yaml", "-o", "generated_agent"]);

    assert_eq!(output.status.code(), Some(1));
    let err = stderr(&output);
    assert!(err.contains("Error:"));
    assert!(err.contains("nonexistent-tool"));
    assert!(!dir.path().join("generated_agent").exists());
}

#[test]
fn test_unknown_provider_lists_available() {
    let dir = weather_project(WEATHER_MANIFEST);
    let output = konductor(dir.path(), &["generate", "agents.yaml", "-p", "crewai"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("google_adk, stub"));
}

#[test]
fn test_validate_does_not_write() {
    let dir = weather_project(WEATHER_MANIFEST);
    let output = konductor(dir.path(), &["validate", "agents.yaml"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("1 tool(s), 1 model(s)"));
    assert!(!dir.path().join("generated_agent").exists());
}

#[test]
fn test_list_providers_in_registration_order() {
    let dir = tempfile::tempdir().unwrap();
    let output = konductor(dir.path(), &["list-providers"]);

    assert!(output.status.success());
    assert_eq!(stdout(&output), "google_adk\nstub\n");
}

#[test]
fn test_dependencies() {
    let dir = tempfile::tempdir().unwrap();

    let output = konductor(dir.path(), &["dependencies", "-p", "google_adk"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output), "google-adk>=1.10.0\n");

    let output = konductor(dir.path(), &["dependencies", "-p", "stub"]);
    assert!(output.status.success());
    assert!(stdout(&output).is_empty());
}

#[test]
fn test_config_generate_then_validate() {
    let dir = tempfile::tempdir().unwrap();

    let output = konductor(dir.path(), &["config", "generate", "--examples"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(dir.path().join("konductor-config.yaml").is_file());

    let output = konductor(dir.path(), &["config", "validate"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
}

#[test]
fn test_missing_explicit_config_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let output = konductor(dir.path(), &["--config", "missing.yaml", "dependencies"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("missing.yaml"));
}
