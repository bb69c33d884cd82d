// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Google ADK Provider
//!
//! Renders a resolved manifest into a Python package for the Google Agent
//! Development Kit.
//!
//! # Architecture
//!
//! - **Layer:** Infrastructure
//! - **Purpose:** CodeGenerator implementation for `google_adk`
//!
//! # Output
//!
//! | File               | Contents                                         |
//! |--------------------|--------------------------------------------------|
//! | `tools.py`         | tool imports and `TOOL_FUNCTION_MAP`             |
//! | `agent.py`         | `MODEL_CONFIG_MAP`, one block per agent, `root_agent` |
//! | `main.py`          | async runner entry point                         |
//! | `__init__.py`      | package marker                                   |
//! | `requirements.txt` | pip requirements                                 |
//!
//! Agents are emitted in dependency order so every sub-agent variable is
//! defined before the composite agent that lists it.

use crate::domain::errors::GenerationError;
use crate::domain::generator::{CodeGenerator, GenerateOptions};
use crate::domain::manifest::{ResolvedAgent, ResolvedManifest, ResolvedModel};
use crate::domain::resource::{AgentVariant, ModelBinding, ModelSpec, RetryOptions};
use crate::infrastructure::python;
use crate::infrastructure::template_engine::TemplateEngine;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use tracing::debug;

const TEMPLATES: &[(&str, &str)] = &[
    ("tools.py", include_str!("../../../templates/google_adk/tools.py.hbs")),
    ("agent.py", include_str!("../../../templates/google_adk/agent.py.hbs")),
    (
        "agent_definition",
        include_str!("../../../templates/google_adk/agent_definition.py.hbs"),
    ),
    ("main.py", include_str!("../../../templates/google_adk/main.py.hbs")),
    ("__init__.py", include_str!("../../../templates/google_adk/__init__.py.hbs")),
    (
        "requirements.txt",
        include_str!("../../../templates/google_adk/requirements.txt.hbs"),
    ),
];

const DEPENDENCIES: &[&str] = &["google-adk>=1.10.0"];

const GOOGLE_MODEL_PREFIXES: &[&str] = &["gemini", "text", "chat"];

/// Agent name the ADK reserves for the human side of a conversation
const RESERVED_AGENT_NAME: &str = "user";

// ============================================================================
// Template Contexts
// ============================================================================

// Every string below is already a Python expression or literal.

#[derive(Debug, Serialize)]
struct ToolsContext {
    imports: Vec<ImportView>,
    tools: Vec<ToolEntryView>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct ImportView {
    module: String,
    function: String,
}

#[derive(Debug, Serialize)]
struct ToolEntryView {
    name: String,
    function: String,
}

#[derive(Debug, Serialize)]
struct AgentFileContext {
    agent_classes: String,
    models: Vec<ModelView>,
    agents: Vec<String>,
    root_variable: String,
}

#[derive(Debug, Serialize)]
struct ModelView {
    name: String,
    model_id: String,
    generate_content_config: String,
}

#[derive(Debug, Default, Serialize)]
struct AgentView {
    kind: String,
    name: String,
    variable: String,
    identifier: String,
    model: Option<String>,
    description: Option<String>,
    instruction: Option<String>,
    tools: Option<String>,
    generate_content_config: Option<String>,
    output_key: Option<String>,
    sub_agents: Option<String>,
    max_iterations: Option<u32>,
}

#[derive(Debug, Serialize)]
struct MainContext {
    app_name: String,
}

#[derive(Debug, Serialize)]
struct RequirementsContext<'a> {
    provider: &'a str,
    dependencies: Vec<String>,
}

// ============================================================================
// Generator
// ============================================================================

pub struct GoogleAdkGenerator {
    engine: TemplateEngine,
}

impl GoogleAdkGenerator {
    pub const NAME: &'static str = "google_adk";

    pub fn new() -> Result<Self, GenerationError> {
        Ok(Self {
            engine: TemplateEngine::with_templates(TEMPLATES)?,
        })
    }

    /// Python variable holding the agent object
    fn variable(name: &str) -> String {
        format!("agent_{}", python::identifier(name))
    }

    fn render_tools(&self, manifest: &ResolvedManifest) -> Result<String, GenerationError> {
        let mut imports: Vec<ImportView> = Vec::new();
        let mut tools = Vec::new();

        for tool in manifest.manifest.tools() {
            let source = &tool.spec.source;
            let module = python::module_path(&source.file).ok_or_else(|| {
                GenerationError::InvalidModulePath {
                    tool: tool.name().to_string(),
                    file: source.file.clone(),
                }
            })?;

            let import = ImportView {
                module,
                function: source.function_name.clone(),
            };
            if !imports.contains(&import) {
                imports.push(import);
            }
            tools.push(ToolEntryView {
                name: python::string_literal(tool.name()),
                function: source.function_name.clone(),
            });
        }

        self.engine.render("tools.py", &ToolsContext { imports, tools })
    }

    fn render_agents(
        &self,
        manifest: &ResolvedManifest,
        root: &ResolvedAgent,
    ) -> Result<String, GenerationError> {
        let classes: BTreeSet<&str> = manifest.agents.iter().map(|a| a.kind().as_str()).collect();

        let models = manifest
            .manifest
            .models()
            .iter()
            .map(|model| ModelView {
                name: python::string_literal(model.name()),
                model_id: python::string_literal(&model.spec.model_id),
                generate_content_config: content_config(&model.spec)
                    .unwrap_or_else(|| "None".to_string()),
            })
            .collect();

        let mut agents = Vec::with_capacity(manifest.agents.len());
        for agent in &manifest.agents {
            debug!("Rendering {} '{}'", agent.kind(), agent.name());
            let block = self.engine.render("agent_definition", &Self::agent_view(agent))?;
            agents.push(block.trim_end().to_string());
        }

        self.engine.render(
            "agent.py",
            &AgentFileContext {
                agent_classes: classes.into_iter().collect::<Vec<_>>().join(", "),
                models,
                agents,
                root_variable: Self::variable(root.name()),
            },
        )
    }

    fn agent_view(agent: &ResolvedAgent) -> AgentView {
        let spec = &agent.agent.spec;
        let mut view = AgentView {
            kind: agent.kind().as_str().to_string(),
            name: agent.name().to_string(),
            variable: Self::variable(agent.name()),
            identifier: python::string_literal(&python::identifier(agent.name())),
            description: spec.description.as_deref().map(python::string_literal),
            ..AgentView::default()
        };

        if !agent.tools.is_empty() {
            let tools: Vec<String> = agent
                .tools
                .iter()
                .map(|tool| format!("TOOL_FUNCTION_MAP[{}]", python::string_literal(tool.name())))
                .collect();
            view.tools = Some(format!("[{}]", tools.join(", ")));
        }

        if !agent.sub_agents.is_empty() {
            let subs: Vec<String> =
                agent.sub_agents.iter().map(|sub| Self::variable(sub.name())).collect();
            view.sub_agents = Some(format!("[{}]", subs.join(", ")));
        }

        match &spec.variant {
            AgentVariant::LlmAgent {
                instruction,
                output_key,
                ..
            } => {
                view.instruction = Some(python::string_literal(instruction));
                view.output_key = output_key.as_deref().map(python::string_literal);
            }
            AgentVariant::LoopAgent { max_iterations, .. } => {
                view.max_iterations = *max_iterations;
            }
            AgentVariant::SequentialAgent { .. } | AgentVariant::ParallelAgent { .. } => {}
        }

        match &agent.model {
            Some(ResolvedModel::Resource { model }) => {
                let key = python::string_literal(model.name());
                view.model = Some(format!("MODEL_CONFIG_MAP[{}][\"model\"]", key));
                if content_config(&model.spec).is_some() {
                    view.generate_content_config =
                        Some(format!("MODEL_CONFIG_MAP[{}][\"generate_content_config\"]", key));
                }
            }
            Some(ResolvedModel::Inline { model_id }) => {
                view.model = Some(python::string_literal(model_id));
            }
            None => {}
        }

        view
    }
}

/// `types.GenerateContentConfig(...)` for a model, `None` when it sets nothing
fn content_config(spec: &ModelSpec) -> Option<String> {
    let mut args: Vec<String> = spec
        .parameters
        .iter()
        .map(|(key, value)| format!("{}={}", python::snake_case(key), python::literal(value)))
        .collect();

    if let Some(retry) = spec.retry_options.as_ref().filter(|retry| !retry.is_empty()) {
        args.push(format!(
            "http_options=types.HttpOptions(retry_options={})",
            retry_literal(retry)
        ));
    }

    if args.is_empty() {
        None
    } else {
        Some(format!("types.GenerateContentConfig({})", args.join(", ")))
    }
}

fn retry_literal(retry: &RetryOptions) -> String {
    let mut args = Vec::new();
    if let Some(attempts) = retry.attempts {
        args.push(format!("attempts={}", attempts));
    }
    for (field, value) in [
        ("initial_delay", retry.initial_delay),
        ("max_delay", retry.max_delay),
        ("exp_base", retry.exp_base),
        ("jitter", retry.jitter),
    ] {
        if let Some(value) = value {
            args.push(format!("{}={}", field, python::float_literal(value)));
        }
    }
    if !retry.http_status_codes.is_empty() {
        let codes: Vec<String> = retry.http_status_codes.iter().map(u16::to_string).collect();
        args.push(format!("http_status_codes=[{}]", codes.join(", ")));
    }
    format!("types.HttpRetryOptions({})", args.join(", "))
}

fn is_google_model(model_id: &str) -> bool {
    GOOGLE_MODEL_PREFIXES
        .iter()
        .any(|prefix| model_id.starts_with(prefix))
}

impl CodeGenerator for GoogleAdkGenerator {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn generate_code(
        &self,
        manifest: &ResolvedManifest,
        output_dir: &Path,
        options: &GenerateOptions,
    ) -> Result<Vec<PathBuf>, GenerationError> {
        let root = manifest.root().ok_or(GenerationError::NoRootAgent)?;

        for tool in manifest.manifest.tools() {
            let file = &tool.spec.source.file;
            if let (None, searched) = options.locate_tool_source(file) {
                return Err(GenerationError::MissingToolSource {
                    tool: tool.name().to_string(),
                    file: file.clone(),
                    searched,
                });
            }
        }

        // Render everything before touching the filesystem
        let files = vec![
            ("tools.py", self.render_tools(manifest)?),
            ("agent.py", self.render_agents(manifest, root)?),
            (
                "main.py",
                self.engine.render(
                    "main.py",
                    &MainContext {
                        app_name: python::string_literal(&options.app_name),
                    },
                )?,
            ),
            ("__init__.py", self.engine.render("__init__.py", &serde_json::json!({}))?),
            (
                "requirements.txt",
                self.engine.render(
                    "requirements.txt",
                    &RequirementsContext {
                        provider: Self::NAME,
                        dependencies: self.required_dependencies(),
                    },
                )?,
            ),
        ];

        super::write_files(output_dir, files)
    }

    fn required_dependencies(&self) -> Vec<String> {
        DEPENDENCIES.iter().map(|dep| dep.to_string()).collect()
    }

    fn validate_manifest_for_provider(&self, manifest: &ResolvedManifest) -> Vec<String> {
        let mut errors = Vec::new();
        let parsed = &manifest.manifest;

        if parsed.agents().is_empty() {
            errors.push("Google ADK requires at least one agent".to_string());
        }

        for model in parsed.models() {
            if model.spec.provider != "google" {
                errors.push(format!(
                    "Model '{}' uses provider '{}', but Google ADK only supports 'google' provider",
                    model.name(),
                    model.spec.provider
                ));
            }
            if !is_google_model(&model.spec.model_id) {
                errors.push(format!(
                    "Model '{}' has modelId '{}' which doesn't appear to be a Google model",
                    model.name(),
                    model.spec.model_id
                ));
            }
            for key in model.spec.parameters.keys() {
                if !python::is_identifier(&python::snake_case(key)) {
                    errors.push(format!(
                        "Model '{}' parameter '{}' is not a valid GenerateContentConfig field name",
                        model.name(),
                        key
                    ));
                }
            }
        }

        let mut functions: HashMap<&str, (&str, Option<String>)> = HashMap::new();
        for tool in parsed.tools() {
            let source = &tool.spec.source;
            let module = python::module_path(&source.file);
            if module.is_none() {
                errors.push(format!(
                    "Tool '{}' source '{}' is not a valid Python module path",
                    tool.name(),
                    source.file
                ));
            }
            if !python::is_identifier(&source.function_name) {
                errors.push(format!(
                    "Tool '{}' functionName '{}' is not a valid Python identifier",
                    tool.name(),
                    source.function_name
                ));
            }
            match functions.get(source.function_name.as_str()) {
                Some((other, other_module)) if *other_module != module => {
                    errors.push(format!(
                        "Tools '{}' and '{}' both import a function named '{}' from different modules",
                        other,
                        tool.name(),
                        source.function_name
                    ));
                }
                Some(_) => {}
                None => {
                    functions.insert(&source.function_name, (tool.name(), module));
                }
            }
        }

        let mut identifiers: HashMap<String, &str> = HashMap::new();
        for agent in parsed.agents() {
            let identifier = python::identifier(agent.name());
            if identifier == RESERVED_AGENT_NAME {
                errors.push(format!(
                    "Agent '{}' uses the name '{}', which Google ADK reserves",
                    agent.name(),
                    RESERVED_AGENT_NAME
                ));
            }
            if let Some(other) = identifiers.get(&identifier) {
                errors.push(format!(
                    "Agents '{}' and '{}' both map to the Python identifier '{}'",
                    other,
                    agent.name(),
                    identifier
                ));
            } else {
                identifiers.insert(identifier, agent.name());
            }

            match &agent.spec.variant {
                AgentVariant::LlmAgent {
                    model: ModelBinding::Inline(model_id),
                    ..
                } if !is_google_model(model_id) => {
                    errors.push(format!(
                        "LlmAgent '{}' uses model '{}' which doesn't appear to be a Google model",
                        agent.name(),
                        model_id
                    ));
                }
                _ => {}
            }

            if agent.is_composite() && !agent.spec.tool_refs.is_empty() {
                errors.push(format!(
                    "{} '{}' declares tools, but Google ADK only attaches tools to LlmAgent",
                    agent.kind(),
                    agent.name()
                ));
            }

            let parents = manifest.parents_of(agent.name());
            if parents.len() > 1 {
                errors.push(format!(
                    "Agent '{}' is a sub-agent of {}, but Google ADK agents can have only one parent",
                    agent.name(),
                    parents
                        .iter()
                        .map(|parent| format!("'{}'", parent))
                        .collect::<Vec<_>>()
                        .join(", ")
                ));
            }
        }

        errors
    }
}

// ============================================================================
// Tests
// ============================================================================
