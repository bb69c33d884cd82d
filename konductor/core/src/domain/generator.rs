// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Generator
//!
//! Provides the provider contract for code generation.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Contract every target framework implements, plus the options a generation run is given

// Code Generator Domain Interface
//
// Every target agent framework is one implementation of this trait.
// Implementations live in infrastructure/providers/ and are registered
// explicitly at startup; there is no runtime discovery.

use std::path::{Path, PathBuf};

use super::errors::GenerationError;
use super::manifest::ResolvedManifest;

pub const DEFAULT_APP_NAME: &str = "generated-konductor-app";

/// Domain interface for provider-specific generators
pub trait CodeGenerator: Send + Sync {
    /// Registry key (e.g. "google_adk")
    fn name(&self) -> &str;

    /// Render the manifest into `output_dir` and return the written paths in write order
    fn generate_code(
        &self,
        manifest: &ResolvedManifest,
        output_dir: &Path,
        options: &GenerateOptions,
    ) -> Result<Vec<PathBuf>, GenerationError>;

    /// Dependency specifiers the generated project needs, in a stable order
    fn required_dependencies(&self) -> Vec<String>;

    /// Provider-specific checks; an empty list means the manifest is usable
    fn validate_manifest_for_provider(&self, manifest: &ResolvedManifest) -> Vec<String>;
}

/// Options passed unchanged from the caller to the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateOptions {
    /// Directories searched, in order, for tool source files
    pub tool_search_paths: Vec<PathBuf>,

    /// Explicit root agent; the first unreferenced agent is used otherwise
    pub root_agent: Option<String>,

    /// Application name baked into the generated entry point
    pub app_name: String,
}

impl GenerateOptions {
    pub fn new() -> Self {
        Self {
            tool_search_paths: Vec::new(),
            root_agent: None,
            app_name: DEFAULT_APP_NAME.to_string(),
        }
    }

    /// Builder-style setter for the tool search path
    pub fn tool_search_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.tool_search_paths.push(path.into());
        self
    }

    /// Builder-style setter for the root agent
    pub fn root_agent(mut self, name: impl Into<String>) -> Self {
        self.root_agent = Some(name.into());
        self
    }

    /// Builder-style setter for the application name
    pub fn app_name(mut self, name: impl Into<String>) -> Self {
        self.app_name = name.into();
        self
    }

    /// First existing `<search path>/<file>`, plus every candidate that was tried
    pub fn locate_tool_source(&self, file: &str) -> (Option<PathBuf>, Vec<PathBuf>) {
        let relative = Path::new(file);
        if relative.is_absolute() {
            let found = relative.is_file().then(|| relative.to_path_buf());
            return (found, vec![relative.to_path_buf()]);
        }

        let mut searched = Vec::with_capacity(self.tool_search_paths.len());
        for base in &self.tool_search_paths {
            let candidate = base.join(relative);
            if candidate.is_file() {
                return (Some(candidate), searched);
            }
            searched.push(candidate);
        }
        (None, searched)
    }
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self::new()
    }
}
