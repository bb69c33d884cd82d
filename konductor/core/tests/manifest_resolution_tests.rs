// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Integration tests for manifest parsing and reference resolution.
//!
//! Covers parse idempotence, multi-file merging, namespace rules,
//! dangling and mistyped references, and sub-agent cycle detection.

use konductor_core::domain::errors::{KonductorError, ResolutionError};
use konductor_core::domain::resource::ResourceKind;
use konductor_core::infrastructure::manifest_parser::ManifestParser;
use konductor_core::infrastructure::reference_resolver::ReferenceResolver;
use std::fs;
use std::path::PathBuf;

const TOOL: &str = r#"
apiVersion: konductor.dev/v1
kind: Tool
metadata:
  name: weather-tool
spec:
  type: pythonFunction
  description: Look up the weather for a city
  source:
    file: tools/weather.py
    functionName: get_weather_report
  parameters:
    - name: city
      type: string
      description: City name
"#;

const MODEL: &str = r#"
apiVersion: konductor.dev/v1
kind: Model
metadata:
  name: gemini_flash_model
spec:
  provider: google
  modelId: gemini-2.5-flash
  parameters:
    temperature: 0.2
"#;

fn agent(name: &str, tool_refs: &str, model_ref: &str) -> String {
    format!(
        r#"
apiVersion: konductor.dev/v1
kind: LlmAgent
metadata:
  name: {name}
spec:
  modelRef: {model_ref}
  instruction: Help the user.
  toolRefs: {tool_refs}
"#
    )
}

fn composite(kind: &str, name: &str, subs: &str) -> String {
    format!(
        r#"
apiVersion: konductor.dev/v1
kind: {kind}
metadata:
  name: {name}
spec:
  subAgentRefs: {subs}
"#
    )
}

fn documents(docs: &[&str]) -> String {
    docs.join("---\n")
}

fn write(dir: &tempfile::TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_parsing_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let yaml = documents(&[
        TOOL,
        MODEL,
        &agent("test_agent", "[weather-tool]", "gemini_flash_model"),
    ]);
    let path = write(&dir, "agents.yaml", &yaml);

    let first = ManifestParser::parse_file(&path).unwrap();
    let second = ManifestParser::parse_file(&path).unwrap();

    assert_eq!(first, second);
    assert_eq!(first.len(), 3);
}

#[test]
fn test_multiple_files_merge() {
    let dir = tempfile::tempdir().unwrap();
    let resources = write(&dir, "resources.yaml", &documents(&[TOOL, MODEL]));
    let agents = write(
        &dir,
        "agents.yaml",
        &agent("test_agent", "[weather-tool]", "gemini_flash_model"),
    );

    let parsed = ManifestParser::parse_files(&[resources, agents]).unwrap();
    let resolved = ReferenceResolver::resolve(parsed, None).unwrap();

    let test_agent = resolved.agent("test_agent").unwrap();
    assert_eq!(test_agent.tools[0].name(), "weather-tool");
    assert_eq!(
        test_agent.model.as_ref().unwrap().model_id(),
        "gemini-2.5-flash"
    );
}

#[test]
fn test_duplicate_name_across_files_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let first = write(&dir, "a.yaml", TOOL);
    let second = write(&dir, "b.yaml", TOOL);

    let err = ManifestParser::parse_files(&[first, second.clone()]).unwrap_err();
    match err {
        KonductorError::Validation(e) => {
            assert_eq!(e.field, "metadata.name");
            assert_eq!(e.location.file, Some(second));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_same_name_in_different_namespaces_is_allowed() {
    let model_named_like_tool = MODEL.replace("gemini_flash_model", "weather-tool");
    let yaml = documents(&[
        TOOL,
        &model_named_like_tool,
        &agent("test_agent", "[weather-tool]", "weather-tool"),
    ]);

    let parsed = ManifestParser::parse_yaml(&yaml).unwrap();
    let resolved = ReferenceResolver::resolve(parsed, None).unwrap();

    let test_agent = resolved.agent("test_agent").unwrap();
    assert_eq!(test_agent.tools[0].spec.source.function_name, "get_weather_report");
    assert_eq!(
        test_agent.model.as_ref().unwrap().model_id(),
        "gemini-2.5-flash"
    );
}

#[test]
fn test_dangling_tool_ref_names_tool_and_agent() {
    let yaml = documents(&[
        TOOL,
        MODEL,
        &agent("test_agent", "[nonexistent-tool]", "gemini_flash_model"),
    ]);
    let parsed = ManifestParser::parse_yaml(&yaml).unwrap();

    let err = ReferenceResolver::resolve(parsed, None).unwrap_err();
    match err {
        KonductorError::Resolution(ResolutionError::UnknownReference {
            referrer, name, ..
        }) => {
            assert_eq!(referrer, "test_agent");
            assert_eq!(name, "nonexistent-tool");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_model_ref_to_tool_is_wrong_kind() {
    let yaml = documents(&[TOOL, &agent("test_agent", "[]", "weather-tool")]);
    let parsed = ManifestParser::parse_yaml(&yaml).unwrap();

    let err = ReferenceResolver::resolve(parsed, None).unwrap_err();
    match err {
        KonductorError::Resolution(ResolutionError::WrongKind { found, name, .. }) => {
            assert_eq!(found, ResourceKind::Tool);
            assert_eq!(name, "weather-tool");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_model_ref_to_agent_is_wrong_kind() {
    let yaml = documents(&[
        MODEL,
        &agent("helper", "[]", "gemini_flash_model"),
        &agent("test_agent", "[]", "helper"),
    ]);
    let parsed = ManifestParser::parse_yaml(&yaml).unwrap();

    let err = ReferenceResolver::resolve(parsed, None).unwrap_err();
    assert!(matches!(
        err,
        KonductorError::Resolution(ResolutionError::WrongKind {
            found: ResourceKind::LlmAgent,
            ..
        })
    ));
}

#[test]
fn test_self_reference_is_a_cycle() {
    let yaml = composite("SequentialAgent", "pipeline", "[pipeline]");
    let parsed = ManifestParser::parse_yaml(&yaml).unwrap();

    match ReferenceResolver::resolve(parsed, None).unwrap_err() {
        KonductorError::Cycle(e) => assert_eq!(e.path, vec!["pipeline", "pipeline"]),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_mutual_reference_is_a_cycle() {
    let yaml = documents(&[
        &composite("SequentialAgent", "outer", "[inner]"),
        &composite("ParallelAgent", "inner", "[outer]"),
    ]);
    let parsed = ManifestParser::parse_yaml(&yaml).unwrap();

    match ReferenceResolver::resolve(parsed, None).unwrap_err() {
        KonductorError::Cycle(e) => {
            assert_eq!(e.path.first(), e.path.last());
            assert!(e.path.contains(&"outer".to_string()));
            assert!(e.path.contains(&"inner".to_string()));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_nested_composites_resolve_in_dependency_order() {
    let yaml = documents(&[
        MODEL,
        &composite("SequentialAgent", "root", "[refine, summarize]"),
        &composite("LoopAgent", "refine", "[draft]"),
        &agent("draft", "[]", "gemini_flash_model"),
        &agent("summarize", "[]", "gemini_flash_model"),
    ]);
    let parsed = ManifestParser::parse_yaml(&yaml).unwrap();
    let resolved = ReferenceResolver::resolve(parsed, None).unwrap();

    let order: Vec<&str> = resolved.agents.iter().map(|a| a.name()).collect();
    let position = |name: &str| order.iter().position(|n| *n == name).unwrap();
    assert!(position("draft") < position("refine"));
    assert!(position("refine") < position("root"));
    assert!(position("summarize") < position("root"));
    assert_eq!(resolved.root_agent.as_deref(), Some("root"));
    assert_eq!(resolved.root_agents, vec!["root".to_string()]);
}
