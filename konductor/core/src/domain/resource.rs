// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Resource
//!
//! Typed manifest resources: tools, models and the four agent kinds.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Validated, immutable representation of manifest entries
//!
//! Resources are built once by the manifest parser and shared behind `Arc`
//! through resolution and generation; nothing mutates them afterwards.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Manifest `kind` values understood by the parser
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ResourceKind {
    Tool,
    Model,
    LlmAgent,
    SequentialAgent,
    ParallelAgent,
    LoopAgent,
}

impl ResourceKind {
    /// Parse a manifest `kind` string. `LlmModel` is kept as an alias of `Model`.
    pub fn from_manifest_kind(kind: &str) -> Option<Self> {
        match kind {
            "Tool" => Some(ResourceKind::Tool),
            "Model" | "LlmModel" => Some(ResourceKind::Model),
            "LlmAgent" => Some(ResourceKind::LlmAgent),
            "SequentialAgent" => Some(ResourceKind::SequentialAgent),
            "ParallelAgent" => Some(ResourceKind::ParallelAgent),
            "LoopAgent" => Some(ResourceKind::LoopAgent),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Tool => "Tool",
            ResourceKind::Model => "Model",
            ResourceKind::LlmAgent => "LlmAgent",
            ResourceKind::SequentialAgent => "SequentialAgent",
            ResourceKind::ParallelAgent => "ParallelAgent",
            ResourceKind::LoopAgent => "LoopAgent",
        }
    }

    pub fn is_agent(&self) -> bool {
        !matches!(self, ResourceKind::Tool | ResourceKind::Model)
    }

    pub fn namespace(&self) -> Namespace {
        match self {
            ResourceKind::Tool => Namespace::Tools,
            ResourceKind::Model => Namespace::Models,
            _ => Namespace::Agents,
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scope inside which `metadata.name` must be unique.
///
/// All agent kinds share one namespace because sub-agent references
/// name agents without saying which kind they are.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Namespace {
    Tools,
    Models,
    Agents,
}

impl Namespace {
    /// Human-readable singular used in error messages
    pub fn noun(&self) -> &'static str {
        match self {
            Namespace::Tools => "tool",
            Namespace::Models => "model",
            Namespace::Agents => "sub-agent",
        }
    }
}

/// Kubernetes-style metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceMetadata {
    pub name: String,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,
}

impl ResourceMetadata {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            labels: BTreeMap::new(),
            annotations: BTreeMap::new(),
        }
    }

    /// Validate a resource name: a letter followed by letters, digits, `-` or `_`
    pub fn validate_name(name: &str) -> Result<(), String> {
        let mut chars = name.chars();
        match chars.next() {
            None => return Err("name cannot be empty".to_string()),
            Some(first) if !first.is_ascii_alphabetic() => {
                return Err(format!("'{}' must start with a letter", name));
            }
            _ => {}
        }
        if let Some(bad) = chars.find(|c| !c.is_ascii_alphanumeric() && *c != '-' && *c != '_') {
            return Err(format!(
                "'{}' contains invalid character '{}' (allowed: letters, digits, '-', '_')",
                name, bad
            ));
        }
        Ok(())
    }
}

// ============================================================================
// Tool
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ToolType {
    #[serde(rename = "pythonFunction")]
    PythonFunction,
}

impl ToolType {
    pub const ALLOWED: &'static [&'static str] = &["pythonFunction"];

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pythonFunction" => Some(ToolType::PythonFunction),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ToolType::PythonFunction => "pythonFunction",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolSource {
    /// Implementation file, relative to the tool search path
    pub file: String,
    pub function_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolParameter {
    pub name: String,
    #[serde(rename = "type")]
    pub param_type: String,
    pub description: String,
    pub required: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolSpec {
    #[serde(rename = "type")]
    pub tool_type: ToolType,
    pub description: String,
    pub source: ToolSource,
    pub parameters: Vec<ToolParameter>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tool {
    pub api_version: String,
    pub metadata: ResourceMetadata,
    pub spec: ToolSpec,
}

impl Tool {
    pub fn name(&self) -> &str {
        &self.metadata.name
    }
}

// ============================================================================
// Model
// ============================================================================

/// Retry policy for model requests
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetryOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attempts: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_delay: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_delay: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp_base: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jitter: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub http_status_codes: Vec<u16>,
}

impl RetryOptions {
    pub fn is_empty(&self) -> bool {
        self == &RetryOptions::default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelSpec {
    pub provider: String,
    pub model_id: String,

    /// Generation parameters (temperature, top_k, ...), sorted by key
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub parameters: BTreeMap<String, serde_json::Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_options: Option<RetryOptions>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Model {
    pub api_version: String,
    pub metadata: ResourceMetadata,
    pub spec: ModelSpec,
}

impl Model {
    pub fn name(&self) -> &str {
        &self.metadata.name
    }
}

// ============================================================================
// Agents
// ============================================================================

/// How an LLM agent picks its model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ModelBinding {
    /// Name of a `Model` resource
    Ref(String),
    /// Model identifier given directly on the agent
    Inline(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum AgentVariant {
    LlmAgent {
        model: ModelBinding,
        instruction: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        output_key: Option<String>,
    },
    SequentialAgent {
        sub_agent_refs: Vec<String>,
    },
    ParallelAgent {
        sub_agent_refs: Vec<String>,
    },
    LoopAgent {
        sub_agent_refs: Vec<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        max_iterations: Option<u32>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Tool names in declared order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_refs: Vec<String>,

    #[serde(flatten)]
    pub variant: AgentVariant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    pub api_version: String,
    pub metadata: ResourceMetadata,
    pub spec: AgentSpec,
}

impl Agent {
    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    pub fn kind(&self) -> ResourceKind {
        match self.spec.variant {
            AgentVariant::LlmAgent { .. } => ResourceKind::LlmAgent,
            AgentVariant::SequentialAgent { .. } => ResourceKind::SequentialAgent,
            AgentVariant::ParallelAgent { .. } => ResourceKind::ParallelAgent,
            AgentVariant::LoopAgent { .. } => ResourceKind::LoopAgent,
        }
    }

    /// Sub-agent names in declared order; empty for LLM agents
    pub fn sub_agent_refs(&self) -> &[String] {
        match &self.spec.variant {
            AgentVariant::LlmAgent { .. } => &[],
            AgentVariant::SequentialAgent { sub_agent_refs }
            | AgentVariant::ParallelAgent { sub_agent_refs }
            | AgentVariant::LoopAgent { sub_agent_refs, .. } => sub_agent_refs.as_slice(),
        }
    }

    pub fn is_composite(&self) -> bool {
        !matches!(self.spec.variant, AgentVariant::LlmAgent { .. })
    }
}

/// Any manifest resource
#[derive(Debug, Clone, PartialEq)]
pub enum Resource {
    Tool(Tool),
    Model(Model),
    Agent(Agent),
}

impl Resource {
    pub fn name(&self) -> &str {
        match self {
            Resource::Tool(tool) => tool.name(),
            Resource::Model(model) => model.name(),
            Resource::Agent(agent) => agent.name(),
        }
    }

    pub fn kind(&self) -> ResourceKind {
        match self {
            Resource::Tool(_) => ResourceKind::Tool,
            Resource::Model(_) => ResourceKind::Model,
            Resource::Agent(agent) => agent.kind(),
        }
    }
}
