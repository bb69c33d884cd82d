// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Generation Pipeline Use Case
//!
//! Application service that turns manifest files into a generated project.
//!
//! # DDD Pattern: Application Service
//!
//! - **Layer:** Application
//! - **Responsibility:** Orchestrate one generation run from manifest files to output tree
//! - **Collaborators:**
//!   - Domain: ParsedManifest, ResolvedManifest, CodeGenerator
//!   - Infrastructure: ManifestParser, ReferenceResolver, ProviderRegistry
//!
//! # Flow
//!
//! 1. Parsing: read and validate every manifest file, merged into one resource set
//! 2. Resolving: link references, order agents, pick the root agent
//! 3. Resolving: look up the provider and run its manifest checks
//! 4. Resolving: locate every tool source file on the search path
//! 5. Generating: render and write the output tree
//! 6. Return a [`GenerationReport`]
//!
//! Nothing is written before step 5, so a run that fails earlier leaves the
//! output directory untouched.
//!
//! # Error Handling
//!
//! Returns [`KonductorError`] unchanged from the stage that detected it and
//! records `Failed(stage)`. No stage retries.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info, info_span};

use crate::domain::errors::{GenerationError, KonductorError};
use crate::domain::generator::{CodeGenerator, GenerateOptions};
use crate::domain::manifest::ResolvedManifest;
use crate::infrastructure::manifest_parser::ManifestParser;
use crate::infrastructure::providers::ProviderRegistry;
use crate::infrastructure::reference_resolver::ReferenceResolver;

/// Where a generation run currently is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineStage {
    Idle,
    Parsing,
    Resolving,
    Generating,
    Done,
    /// Terminal; holds the stage whose component failed
    Failed(Box<PipelineStage>),
}

impl PipelineStage {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineStage::Done | PipelineStage::Failed(_))
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineStage::Idle => write!(f, "idle"),
            PipelineStage::Parsing => write!(f, "parsing"),
            PipelineStage::Resolving => write!(f, "resolving"),
            PipelineStage::Generating => write!(f, "generating"),
            PipelineStage::Done => write!(f, "done"),
            PipelineStage::Failed(stage) => write!(f, "failed during {}", stage),
        }
    }
}

/// Input of one run
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// Manifest files, merged in order
    pub manifests: Vec<PathBuf>,

    /// Registry key of the provider
    pub provider: String,

    /// Ignored by `validate`
    pub output_dir: PathBuf,

    pub options: GenerateOptions,
}

impl GenerationRequest {
    pub fn new(
        manifests: Vec<PathBuf>,
        provider: impl Into<String>,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            manifests,
            provider: provider.into(),
            output_dir: output_dir.into(),
            options: GenerateOptions::new(),
        }
    }

    pub fn with_options(mut self, options: GenerateOptions) -> Self {
        self.options = options;
        self
    }
}

/// Result of a successful `generate`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationReport {
    pub provider: String,
    pub output_dir: PathBuf,
    pub root_agent: Option<String>,

    /// Written files, in write order
    pub files: Vec<PathBuf>,
}

/// Result of a successful `validate`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    pub provider: String,

    /// Resource counts, see `ParsedManifest::summary`
    pub summary: String,

    pub root_agent: Option<String>,
    pub root_agents: Vec<String>,

    /// Agent names in dependency order
    pub agents: Vec<String>,
}

/// Everything the Generating stage needs
struct Prepared {
    manifest: ResolvedManifest,
    generator: Arc<dyn CodeGenerator>,
    options: GenerateOptions,
}

pub struct GenerationPipeline {
    registry: Arc<ProviderRegistry>,
    stage: PipelineStage,
}

impl GenerationPipeline {
    pub fn new(registry: Arc<ProviderRegistry>) -> Self {
        Self {
            registry,
            stage: PipelineStage::Idle,
        }
    }

    pub fn stage(&self) -> &PipelineStage {
        &self.stage
    }

    /// Run the full pipeline and write the generated project
    pub fn generate(
        &mut self,
        request: &GenerationRequest,
    ) -> Result<GenerationReport, KonductorError> {
        let span = info_span!("generate", provider = %request.provider);
        let _enter = span.enter();

        let prepared = self.prepare(request)?;

        let output_dir = request.output_dir.clone();
        let files = self.run_stage(PipelineStage::Generating, || {
            prepared
                .generator
                .generate_code(&prepared.manifest, &output_dir, &prepared.options)
                .map_err(KonductorError::from)
        })?;

        self.enter(PipelineStage::Done);
        info!(
            "Generated {} file(s) into {}",
            files.len(),
            request.output_dir.display()
        );

        Ok(GenerationReport {
            provider: request.provider.clone(),
            output_dir: request.output_dir.clone(),
            root_agent: prepared.manifest.root_agent.clone(),
            files,
        })
    }

    /// Run every check `generate` runs, without writing anything
    pub fn validate(
        &mut self,
        request: &GenerationRequest,
    ) -> Result<ValidationReport, KonductorError> {
        let span = info_span!("validate", provider = %request.provider);
        let _enter = span.enter();

        let prepared = self.prepare(request)?;
        self.enter(PipelineStage::Done);

        let manifest = prepared.manifest;
        Ok(ValidationReport {
            provider: request.provider.clone(),
            summary: manifest.manifest.summary(),
            agents: manifest
                .agents
                .iter()
                .map(|agent| agent.name().to_string())
                .collect(),
            root_agent: manifest.root_agent,
            root_agents: manifest.root_agents,
        })
    }

    fn prepare(&mut self, request: &GenerationRequest) -> Result<Prepared, KonductorError> {
        if self.stage.is_terminal() {
            debug!("Restarting pipeline after {}", self.stage);
        }
        self.stage = PipelineStage::Idle;

        let parsed = self.run_stage(PipelineStage::Parsing, || {
            ManifestParser::parse_files(&request.manifests)
        })?;

        let registry = Arc::clone(&self.registry);
        self.run_stage(PipelineStage::Resolving, || {
            let manifest =
                ReferenceResolver::resolve(parsed, request.options.root_agent.as_deref())?;
            let generator = registry.get(&request.provider)?;

            let messages = generator.validate_manifest_for_provider(&manifest);
            if !messages.is_empty() {
                return Err(KonductorError::ProviderValidation {
                    provider: request.provider.clone(),
                    messages,
                });
            }

            let options = Self::effective_options(request);
            Self::check_tool_sources(&manifest, &options)?;

            Ok(Prepared {
                manifest,
                generator,
                options,
            })
        })
    }

    fn enter(&mut self, stage: PipelineStage) {
        debug!("Pipeline stage: {}", stage);
        self.stage = stage;
    }

    fn run_stage<T>(
        &mut self,
        stage: PipelineStage,
        body: impl FnOnce() -> Result<T, KonductorError>,
    ) -> Result<T, KonductorError> {
        self.enter(stage.clone());
        body().inspect_err(|e| {
            debug!("Pipeline failed during {}: {}", stage, e);
            self.stage = PipelineStage::Failed(Box::new(stage));
        })
    }

    /// Tool search path: manifest directories, configured paths, then the working directory
    fn effective_options(request: &GenerationRequest) -> GenerateOptions {
        let mut options = request.options.clone();

        let mut search: Vec<PathBuf> = Vec::new();
        for manifest in &request.manifests {
            let dir = match manifest.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
                _ => PathBuf::from("."),
            };
            push_unique(&mut search, dir);
        }
        for path in &request.options.tool_search_paths {
            push_unique(&mut search, path.clone());
        }
        if let Ok(cwd) = std::env::current_dir() {
            push_unique(&mut search, cwd);
        }

        options.tool_search_paths = search;
        options
    }

    fn check_tool_sources(
        manifest: &ResolvedManifest,
        options: &GenerateOptions,
    ) -> Result<(), KonductorError> {
        for tool in manifest.manifest.tools() {
            let file = &tool.spec.source.file;
            match options.locate_tool_source(file) {
                (Some(found), _) => debug!("Tool '{}' source: {}", tool.name(), found.display()),
                (None, searched) => {
                    return Err(GenerationError::MissingToolSource {
                        tool: tool.name().to_string(),
                        file: file.clone(),
                        searched,
                    }
                    .into())
                }
            }
        }
        Ok(())
    }
}

fn push_unique(paths: &mut Vec<PathBuf>, path: PathBuf) {
    if !paths.contains(&path) {
        paths.push(path);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::ResolutionError;

    const MANIFEST: &str = r#"
apiVersion: v1
kind: Tool
metadata: { name: weather-tool }
spec:
  description: Weather lookup
  source: { file: tools/weather.py, functionName: get_weather_report }
---
apiVersion: v1
kind: Model
metadata: { name: gemini_flash_model }
spec: { provider: google, modelId: gemini-2.5-flash }
---
apiVersion: v1
kind: LlmAgent
metadata: { name: test_agent }
spec:
  modelRef: gemini_flash_model
  instruction: Answer weather questions.
  toolRefs: [weather-tool]
"#;

    fn pipeline() -> GenerationPipeline {
        GenerationPipeline::new(Arc::new(ProviderRegistry::with_builtin_providers().unwrap()))
    }

    fn project(manifest: &str, with_tool: bool) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("agents.yaml"), manifest).unwrap();
        if with_tool {
            std::fs::create_dir_all(dir.path().join("tools")).unwrap();
            std::fs::write(
                dir.path().join("tools/weather.py"),
                "def get_weather_report(city: str) -> dict:\n    return {}\n",
            )
            .unwrap();
        }
        dir
    }

    #[test]
    fn test_generate_reaches_done() {
        let dir = project(MANIFEST, true);
        let out = dir.path().join("out");
        let request =
            GenerationRequest::new(vec![dir.path().join("agents.yaml")], "stub", &out);

        let mut pipeline = pipeline();
        let report = pipeline.generate(&request).unwrap();

        assert_eq!(pipeline.stage(), &PipelineStage::Done);
        assert!(pipeline.stage().is_terminal());
        assert_eq!(report.root_agent.as_deref(), Some("test_agent"));
        assert_eq!(report.files, vec![out.join("topology.json")]);
    }

    #[test]
    fn test_terminal_stages() {
        assert!(!PipelineStage::Idle.is_terminal());
        assert!(!PipelineStage::Generating.is_terminal());
        assert!(PipelineStage::Done.is_terminal());
        assert!(PipelineStage::Failed(Box::new(PipelineStage::Parsing)).is_terminal());
    }

    #[test]
    fn test_tool_found_next_to_manifest() {
        let dir = project(MANIFEST, true);
        let request = GenerationRequest::new(
            vec![dir.path().join("agents.yaml")],
            "google_adk",
            dir.path().join("out"),
        );
        let options = GenerationPipeline::effective_options(&request);
        assert_eq!(options.tool_search_paths[0], dir.path());
    }

    #[test]
    fn test_resolution_failure_records_stage_and_writes_nothing() {
        let broken = MANIFEST.replace("toolRefs: [weather-tool]", "toolRefs: [nonexistent-tool]");
        let dir = project(&broken, true);
        let out = dir.path().join("out");
        let request =
            GenerationRequest::new(vec![dir.path().join("agents.yaml")], "google_adk", &out);

        let mut pipeline = pipeline();
        let err = pipeline.generate(&request).unwrap_err();

        match err {
            KonductorError::Resolution(ref e) => assert_eq!(e.reference(), "nonexistent-tool"),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(
            pipeline.stage(),
            &PipelineStage::Failed(Box::new(PipelineStage::Resolving))
        );
        assert!(pipeline.stage().is_terminal());
        assert!(!out.exists());
    }

    #[test]
    fn test_missing_tool_source_fails_before_output() {
        let dir = project(MANIFEST, false);
        let out = dir.path().join("out");
        let request = GenerationRequest::new(vec![dir.path().join("agents.yaml")], "stub", &out);

        let err = pipeline().generate(&request).unwrap_err();
        assert!(matches!(
            err,
            KonductorError::Generation(GenerationError::MissingToolSource { .. })
        ));
        assert!(!out.exists());
    }

    #[test]
    fn test_provider_validation_is_fatal() {
        let other = MANIFEST.replace("provider: google", "provider: openai");
        let dir = project(&other, true);
        let out = dir.path().join("out");
        let request =
            GenerationRequest::new(vec![dir.path().join("agents.yaml")], "google_adk", &out);

        let err = pipeline().generate(&request).unwrap_err();
        match err {
            KonductorError::ProviderValidation { provider, messages } => {
                assert_eq!(provider, "google_adk");
                assert!(messages[0].contains("openai"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(!out.exists());
    }

    #[test]
    fn test_unknown_provider() {
        let dir = project(MANIFEST, true);
        let request = GenerationRequest::new(
            vec![dir.path().join("agents.yaml")],
            "crewai",
            dir.path().join("out"),
        );
        let err = pipeline().validate(&request).unwrap_err();
        assert!(err.to_string().contains("google_adk, stub"));
    }

    #[test]
    fn test_unknown_root_agent() {
        let dir = project(MANIFEST, true);
        let request = GenerationRequest::new(
            vec![dir.path().join("agents.yaml")],
            "stub",
            dir.path().join("out"),
        )
        .with_options(GenerateOptions::new().root_agent("ghost"));

        let err = pipeline().validate(&request).unwrap_err();
        assert!(matches!(
            err,
            KonductorError::Resolution(ResolutionError::UnknownRootAgent(_))
        ));
    }

    #[test]
    fn test_validate_reports_without_writing() {
        let dir = project(MANIFEST, true);
        let out = dir.path().join("out");
        let request =
            GenerationRequest::new(vec![dir.path().join("agents.yaml")], "google_adk", &out);

        let report = pipeline().validate(&request).unwrap();
        assert_eq!(report.agents, vec!["test_agent".to_string()]);
        assert_eq!(report.root_agents, vec!["test_agent".to_string()]);
        assert!(report.summary.starts_with("1 tool(s), 1 model(s), 1 LlmAgent(s)"));
        assert!(!out.exists());
    }

    #[test]
    fn test_parse_failure_records_parsing_stage() {
        let dir = tempfile::tempdir().unwrap();
        let request = GenerationRequest::new(
            vec![dir.path().join("missing.yaml")],
            "stub",
            dir.path().join("out"),
        );
        let mut pipeline = pipeline();
        let err = pipeline.validate(&request).unwrap_err();

        assert!(matches!(err, KonductorError::Io { .. }));
        assert_eq!(
            pipeline.stage(),
            &PipelineStage::Failed(Box::new(PipelineStage::Parsing))
        );
    }
}
