// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Manifest
//!
//! The flat resource set produced by parsing, and the linked graph produced
//! by resolution.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Aggregate roots handed from parser to resolver to providers

use std::sync::Arc;

use super::errors::{DocumentLocation, ValidationError};
use super::resource::{Agent, Model, Namespace, Resource, ResourceKind, Tool};

// ============================================================================
// Parsed (unresolved) manifest
// ============================================================================

/// All resources declared across one or more manifest files.
///
/// Invariants:
/// - Names are unique per [`Namespace`]
/// - Each collection keeps declaration order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedManifest {
    tools: Vec<Arc<Tool>>,
    models: Vec<Arc<Model>>,
    agents: Vec<Arc<Agent>>,
}

impl ParsedManifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a resource, rejecting a second resource with the same name in its namespace
    pub fn insert(
        &mut self,
        resource: Resource,
        location: &DocumentLocation,
    ) -> Result<(), ValidationError> {
        let namespace = resource.kind().namespace();
        if let Some(existing) = self.kind_in_namespace(namespace, resource.name()) {
            return Err(ValidationError::new(
                location.clone(),
                "metadata.name",
                format!(
                    "duplicate name '{}': already declared by a {}",
                    resource.name(),
                    existing
                ),
            ));
        }

        match resource {
            Resource::Tool(tool) => self.tools.push(Arc::new(tool)),
            Resource::Model(model) => self.models.push(Arc::new(model)),
            Resource::Agent(agent) => self.agents.push(Arc::new(agent)),
        }
        Ok(())
    }

    pub fn tools(&self) -> &[Arc<Tool>] {
        &self.tools
    }

    pub fn models(&self) -> &[Arc<Model>] {
        &self.models
    }

    /// Agents of every kind, in declaration order
    pub fn agents(&self) -> &[Arc<Agent>] {
        &self.agents
    }

    pub fn agents_of_kind(&self, kind: ResourceKind) -> impl Iterator<Item = &Arc<Agent>> {
        self.agents.iter().filter(move |agent| agent.kind() == kind)
    }

    pub fn tool(&self, name: &str) -> Option<&Arc<Tool>> {
        self.tools.iter().find(|tool| tool.name() == name)
    }

    pub fn model(&self, name: &str) -> Option<&Arc<Model>> {
        self.models.iter().find(|model| model.name() == name)
    }

    pub fn agent(&self, name: &str) -> Option<&Arc<Agent>> {
        self.agents.iter().find(|agent| agent.name() == name)
    }

    /// Kind of the resource called `name` inside `namespace`, if any
    pub fn kind_in_namespace(&self, namespace: Namespace, name: &str) -> Option<ResourceKind> {
        match namespace {
            Namespace::Tools => self.tool(name).map(|_| ResourceKind::Tool),
            Namespace::Models => self.model(name).map(|_| ResourceKind::Model),
            Namespace::Agents => self.agent(name).map(|agent| agent.kind()),
        }
    }

    /// Kinds of every resource called `name`, across all namespaces
    pub fn kinds_named(&self, name: &str) -> Vec<ResourceKind> {
        [Namespace::Tools, Namespace::Models, Namespace::Agents]
            .into_iter()
            .filter_map(|namespace| self.kind_in_namespace(namespace, name))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len() + self.models.len() + self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// One-line count summary, e.g. for logging
    pub fn summary(&self) -> String {
        format!(
            "{} tool(s), {} model(s), {} LlmAgent(s), {} SequentialAgent(s), {} LoopAgent(s), {} ParallelAgent(s)",
            self.tools.len(),
            self.models.len(),
            self.agents_of_kind(ResourceKind::LlmAgent).count(),
            self.agents_of_kind(ResourceKind::SequentialAgent).count(),
            self.agents_of_kind(ResourceKind::LoopAgent).count(),
            self.agents_of_kind(ResourceKind::ParallelAgent).count(),
        )
    }
}

// ============================================================================
// Resolved manifest
// ============================================================================

/// Model configuration an LLM agent ends up with
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedModel {
    Resource { model: Arc<Model> },
    Inline { model_id: String },
}

impl ResolvedModel {
    /// Provider model identifier (e.g. `gemini-2.5-flash`)
    pub fn model_id(&self) -> &str {
        match self {
            ResolvedModel::Resource { model } => &model.spec.model_id,
            ResolvedModel::Inline { model_id } => model_id,
        }
    }

    pub fn resource(&self) -> Option<&Arc<Model>> {
        match self {
            ResolvedModel::Resource { model } => Some(model),
            ResolvedModel::Inline { .. } => None,
        }
    }
}

/// An agent with every reference replaced by the resource it names
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedAgent {
    pub agent: Arc<Agent>,

    /// Set for LLM agents only
    pub model: Option<ResolvedModel>,

    /// Tools in `toolRefs` order
    pub tools: Vec<Arc<Tool>>,

    /// Sub-agents in `subAgentRefs` order
    pub sub_agents: Vec<Arc<Agent>>,
}

impl ResolvedAgent {
    pub fn name(&self) -> &str {
        self.agent.name()
    }

    pub fn kind(&self) -> ResourceKind {
        self.agent.kind()
    }
}

/// Fully linked resource graph, ready for a provider.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedManifest {
    pub manifest: ParsedManifest,

    /// Every agent, sub-agents before the composites that contain them
    pub agents: Vec<ResolvedAgent>,

    /// Agents that no composite agent references, in declaration order
    pub root_agents: Vec<String>,

    /// Entry point of the generated project; `None` when no agents are declared
    pub root_agent: Option<String>,
}

impl ResolvedManifest {
    pub fn agent(&self, name: &str) -> Option<&ResolvedAgent> {
        self.agents.iter().find(|agent| agent.name() == name)
    }

    /// Agents of one kind, in dependency order
    pub fn agents_of_kind(&self, kind: ResourceKind) -> impl Iterator<Item = &ResolvedAgent> {
        self.agents.iter().filter(move |agent| agent.kind() == kind)
    }

    pub fn root(&self) -> Option<&ResolvedAgent> {
        self.root_agent.as_deref().and_then(|name| self.agent(name))
    }

    /// Composite agents that list `name` as a sub-agent
    pub fn parents_of(&self, name: &str) -> Vec<&str> {
        self.agents
            .iter()
            .filter(|candidate| candidate.sub_agents.iter().any(|sub| sub.name() == name))
            .map(|candidate| candidate.name())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::resource::*;

    fn tool(name: &str) -> Resource {
        Resource::Tool(Tool {
            api_version: "konductor.dev/v1".into(),
            metadata: ResourceMetadata::named(name),
            spec: ToolSpec {
                tool_type: ToolType::PythonFunction,
                description: "test".into(),
                source: ToolSource {
                    file: "tools/test.py".into(),
                    function_name: "run".into(),
                },
                parameters: vec![],
            },
        })
    }

    fn model(name: &str) -> Resource {
        Resource::Model(Model {
            api_version: "konductor.dev/v1".into(),
            metadata: ResourceMetadata::named(name),
            spec: ModelSpec {
                provider: "google".into(),
                model_id: "gemini-2.5-flash".into(),
                parameters: Default::default(),
                retry_options: None,
            },
        })
    }

    #[test]
    fn test_duplicate_name_in_namespace_rejected() {
        let mut manifest = ParsedManifest::new();
        let location = DocumentLocation::new(None, 1);
        manifest.insert(tool("search"), &location).unwrap();

        let err = manifest.insert(tool("search"), &location).unwrap_err();
        assert_eq!(err.field, "metadata.name");
        assert!(err.message.contains("duplicate name 'search'"));
    }

    #[test]
    fn test_same_name_across_namespaces_allowed() {
        let mut manifest = ParsedManifest::new();
        let location = DocumentLocation::new(None, 1);
        manifest.insert(tool("x"), &location).unwrap();
        manifest.insert(model("x"), &location).unwrap();

        assert_eq!(manifest.kinds_named("x"), vec![ResourceKind::Tool, ResourceKind::Model]);
        assert_eq!(manifest.len(), 2);
    }

    #[test]
    fn test_declaration_order_preserved() {
        let mut manifest = ParsedManifest::new();
        let location = DocumentLocation::new(None, 1);
        for name in ["c", "a", "b"] {
            manifest.insert(tool(name), &location).unwrap();
        }
        let names: Vec<_> = manifest.tools().iter().map(|t| t.name().to_string()).collect();
        assert_eq!(names, vec!["c", "a", "b"]);
    }
}
