// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Stub Provider
//
// Writes the resolved graph as topology.json instead of framework code.
// Has no dependencies and accepts every manifest the resolver accepts;
// used to inspect resolution results and to exercise the pipeline in tests.

use crate::domain::errors::GenerationError;
use crate::domain::generator::{CodeGenerator, GenerateOptions};
use crate::domain::manifest::ResolvedManifest;
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Topology<'a> {
    provider: &'a str,
    app_name: &'a str,
    root_agent: Option<&'a str>,
    root_agents: &'a [String],
    tools: Vec<ToolNode<'a>>,
    models: Vec<ModelNode<'a>>,
    /// Dependency order
    agents: Vec<AgentNode<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ToolNode<'a> {
    name: &'a str,
    file: &'a str,
    function_name: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ModelNode<'a> {
    name: &'a str,
    provider: &'a str,
    model_id: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AgentNode<'a> {
    name: &'a str,
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    model_ref: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    model_id: Option<&'a str>,
    tools: Vec<&'a str>,
    sub_agents: Vec<&'a str>,
}

#[derive(Debug, Default)]
pub struct StubGenerator;

impl StubGenerator {
    pub const NAME: &'static str = "stub";

    pub fn new() -> Self {
        Self
    }

    fn topology<'a>(manifest: &'a ResolvedManifest, options: &'a GenerateOptions) -> Topology<'a> {
        Topology {
            provider: Self::NAME,
            app_name: &options.app_name,
            root_agent: manifest.root_agent.as_deref(),
            root_agents: &manifest.root_agents,
            tools: manifest
                .manifest
                .tools()
                .iter()
                .map(|tool| ToolNode {
                    name: tool.name(),
                    file: &tool.spec.source.file,
                    function_name: &tool.spec.source.function_name,
                })
                .collect(),
            models: manifest
                .manifest
                .models()
                .iter()
                .map(|model| ModelNode {
                    name: model.name(),
                    provider: &model.spec.provider,
                    model_id: &model.spec.model_id,
                })
                .collect(),
            agents: manifest
                .agents
                .iter()
                .map(|agent| AgentNode {
                    name: agent.name(),
                    kind: agent.kind().as_str(),
                    model_ref: agent
                        .model
                        .as_ref()
                        .and_then(|model| model.resource())
                        .map(|model| model.name()),
                    model_id: agent.model.as_ref().map(|model| model.model_id()),
                    tools: agent.tools.iter().map(|tool| tool.name()).collect(),
                    sub_agents: agent.sub_agents.iter().map(|sub| sub.name()).collect(),
                })
                .collect(),
        }
    }
}

impl CodeGenerator for StubGenerator {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn generate_code(
        &self,
        manifest: &ResolvedManifest,
        output_dir: &Path,
        options: &GenerateOptions,
    ) -> Result<Vec<PathBuf>, GenerationError> {
        let mut json = serde_json::to_string_pretty(&Self::topology(manifest, options)).map_err(
            |e| GenerationError::Serialize {
                what: "topology.json".to_string(),
                message: e.to_string(),
            },
        )?;
        json.push('\n');

        super::write_files(output_dir, vec![("topology.json", json)])
    }

    fn required_dependencies(&self) -> Vec<String> {
        Vec::new()
    }

    fn validate_manifest_for_provider(&self, _manifest: &ResolvedManifest) -> Vec<String> {
        Vec::new()
    }
}
