// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Reference Resolver
//!
//! Links the name-based references of a parsed manifest (`toolRefs`,
//! `modelRef`, `subAgentRefs`) to the resources they name.
//!
//! # Architecture
//!
//! - **Layer:** Infrastructure
//! - **Purpose:** ParsedManifest → ResolvedManifest
//!
//! Checks run in a fixed order so that the reported error is deterministic:
//! references of every agent in declaration order, then sub-agent cycles,
//! then the root agent.

use crate::domain::errors::{CycleError, KonductorError, ResolutionError};
use crate::domain::manifest::{ParsedManifest, ResolvedAgent, ResolvedManifest, ResolvedModel};
use crate::domain::resource::{Agent, AgentVariant, ModelBinding, Namespace};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, warn};

pub struct ReferenceResolver;

impl ReferenceResolver {
    /// Resolve every reference of `manifest`.
    ///
    /// `root_agent` selects the entry point; the first agent that no
    /// composite references is used otherwise.
    pub fn resolve(
        manifest: ParsedManifest,
        root_agent: Option<&str>,
    ) -> Result<ResolvedManifest, KonductorError> {
        for agent in manifest.agents() {
            Self::check_references(&manifest, agent)?;
        }

        let order = Self::dependency_order(&manifest)?;

        let mut agents = Vec::with_capacity(order.len());
        for name in &order {
            if let Some(agent) = manifest.agent(name) {
                agents.push(Self::link(&manifest, agent));
            }
        }

        let referenced: HashSet<&str> = manifest
            .agents()
            .iter()
            .flat_map(|agent| agent.sub_agent_refs().iter().map(String::as_str))
            .collect();
        let root_agents: Vec<String> = manifest
            .agents()
            .iter()
            .map(|agent| agent.name())
            .filter(|name| !referenced.contains(name))
            .map(str::to_string)
            .collect();

        let root_agent = match root_agent {
            Some(name) => {
                if manifest.agent(name).is_none() {
                    return Err(ResolutionError::UnknownRootAgent(name.to_string()).into());
                }
                Some(name.to_string())
            }
            None => {
                if root_agents.len() > 1 {
                    warn!(
                        "Multiple root agents found ({}); using '{}'",
                        root_agents.join(", "),
                        root_agents[0]
                    );
                }
                root_agents.first().cloned()
            }
        };
        if let Some(root) = &root_agent {
            debug!("Root agent: '{}'", root);
        }

        Ok(ResolvedManifest {
            manifest,
            agents,
            root_agents,
            root_agent,
        })
    }

    fn check_references(manifest: &ParsedManifest, agent: &Agent) -> Result<(), ResolutionError> {
        for tool in &agent.spec.tool_refs {
            Self::require(manifest, agent, Namespace::Tools, tool)?;
        }
        if let AgentVariant::LlmAgent {
            model: ModelBinding::Ref(model),
            ..
        } = &agent.spec.variant
        {
            Self::require(manifest, agent, Namespace::Models, model)?;
        }
        for sub_agent in agent.sub_agent_refs() {
            Self::require(manifest, agent, Namespace::Agents, sub_agent)?;
        }
        Ok(())
    }

    /// Require `name` to exist in `namespace`
    fn require(
        manifest: &ParsedManifest,
        referrer: &Agent,
        namespace: Namespace,
        name: &str,
    ) -> Result<(), ResolutionError> {
        if manifest.kind_in_namespace(namespace, name).is_some() {
            return Ok(());
        }

        match manifest.kinds_named(name).first() {
            Some(found) => Err(ResolutionError::WrongKind {
                referrer_kind: referrer.kind(),
                referrer: referrer.name().to_string(),
                expected: namespace.noun(),
                found: *found,
                name: name.to_string(),
            }),
            None => Err(ResolutionError::UnknownReference {
                referrer_kind: referrer.kind(),
                referrer: referrer.name().to_string(),
                expected: namespace.noun(),
                name: name.to_string(),
            }),
        }
    }

    /// Agent names with every sub-agent before its parents.
    ///
    /// Depth-first walk in declaration order; a sub-agent that is still on
    /// the walk stack closes a cycle.
    fn dependency_order(manifest: &ParsedManifest) -> Result<Vec<String>, CycleError> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            InProgress,
            Done,
        }

        fn visit<'a>(
            agent: &'a Agent,
            manifest: &'a ParsedManifest,
            marks: &mut HashMap<&'a str, Mark>,
            stack: &mut Vec<&'a str>,
            order: &mut Vec<String>,
        ) -> Result<(), CycleError> {
            marks.insert(agent.name(), Mark::InProgress);
            stack.push(agent.name());

            for sub_name in agent.sub_agent_refs() {
                match marks.get(sub_name.as_str()).copied() {
                    Some(Mark::Done) => {}
                    Some(Mark::InProgress) => {
                        let start = stack
                            .iter()
                            .position(|name| *name == sub_name.as_str())
                            .unwrap_or(0);
                        let mut path: Vec<String> =
                            stack[start..].iter().map(|name| name.to_string()).collect();
                        path.push(sub_name.clone());
                        return Err(CycleError { path });
                    }
                    None => {
                        if let Some(sub_agent) = manifest.agent(sub_name) {
                            visit(sub_agent, manifest, marks, stack, order)?;
                        }
                    }
                }
            }

            stack.pop();
            marks.insert(agent.name(), Mark::Done);
            order.push(agent.name().to_string());
            Ok(())
        }

        let mut marks = HashMap::new();
        let mut stack = Vec::new();
        let mut order = Vec::with_capacity(manifest.agents().len());

        for agent in manifest.agents() {
            if !marks.contains_key(agent.name()) {
                visit(agent, manifest, &mut marks, &mut stack, &mut order)?;
            }
        }
        Ok(order)
    }

    /// Replace names by resources; references were checked beforehand
    fn link(manifest: &ParsedManifest, agent: &Arc<Agent>) -> ResolvedAgent {
        let model = match &agent.spec.variant {
            AgentVariant::LlmAgent { model, .. } => match model {
                ModelBinding::Ref(name) => manifest
                    .model(name)
                    .map(|model| ResolvedModel::Resource {
                        model: Arc::clone(model),
                    }),
                ModelBinding::Inline(model_id) => Some(ResolvedModel::Inline {
                    model_id: model_id.clone(),
                }),
            },
            _ => None,
        };

        let tools = agent
            .spec
            .tool_refs
            .iter()
            .filter_map(|name| manifest.tool(name).cloned())
            .collect();
        let sub_agents = agent
            .sub_agent_refs()
            .iter()
            .filter_map(|name| manifest.agent(name).cloned())
            .collect();

        debug!("Resolved {} '{}'", agent.kind(), agent.name());
        ResolvedAgent {
            agent: Arc::clone(agent),
            model,
            tools,
            sub_agents,
        }
    }
}
