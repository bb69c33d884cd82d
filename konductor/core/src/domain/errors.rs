// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Errors
//!
//! Error taxonomy shared by every stage of a generation run.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** One error type per failure class, aggregated by [`KonductorError`]
//!
//! Errors are raised where they are detected and travel unchanged to the CLI,
//! which is the only place that turns them into text and an exit code.

use std::fmt;
use std::path::PathBuf;

use super::resource::ResourceKind;

/// Position of a document inside the manifest set.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DocumentLocation {
    /// Source file, if the document was read from disk
    pub file: Option<PathBuf>,

    /// 1-based index of the YAML document inside the file
    pub document: usize,
}

impl DocumentLocation {
    pub fn new(file: Option<PathBuf>, document: usize) -> Self {
        Self { file, document }
    }
}

impl fmt::Display for DocumentLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.file {
            Some(file) => write!(f, "{} (document {})", file.display(), self.document),
            None => write!(f, "<inline> (document {})", self.document),
        }
    }
}

/// Malformed or missing manifest field.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Validation error in {location}: field '{field}': {message}")]
pub struct ValidationError {
    pub location: DocumentLocation,

    /// Dotted path of the offending field (e.g. `spec.source.file`)
    pub field: String,

    pub message: String,
}

impl ValidationError {
    pub fn new(
        location: DocumentLocation,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            location,
            field: field.into(),
            message: message.into(),
        }
    }
}

/// A name-based reference that could not be linked to a resource.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolutionError {
    #[error("{referrer_kind} '{referrer}' references unknown {expected} '{name}'")]
    UnknownReference {
        referrer_kind: ResourceKind,
        referrer: String,
        expected: &'static str,
        name: String,
    },

    #[error("{referrer_kind} '{referrer}' references '{name}' as {expected}, but '{name}' is a {found}")]
    WrongKind {
        referrer_kind: ResourceKind,
        referrer: String,
        expected: &'static str,
        found: ResourceKind,
        name: String,
    },

    #[error("Root agent '{0}' is not declared in the manifest")]
    UnknownRootAgent(String),
}

impl ResolutionError {
    /// Name that failed to resolve
    pub fn reference(&self) -> &str {
        match self {
            ResolutionError::UnknownReference { name, .. } => name,
            ResolutionError::WrongKind { name, .. } => name,
            ResolutionError::UnknownRootAgent(name) => name,
        }
    }
}

/// Composite agents whose sub-agent references loop back on themselves.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Circular sub-agent reference: {}", .path.join(" -> "))]
pub struct CycleError {
    /// Agents along the cycle; the first name is repeated at the end
    pub path: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("Unknown provider: '{name}'. Available providers: {}", format_available(.available))]
    UnknownProvider { name: String, available: Vec<String> },

    #[error("Provider '{0}' is already registered")]
    AlreadyRegistered(String),
}

fn format_available(available: &[String]) -> String {
    if available.is_empty() {
        "(none)".to_string()
    } else {
        available.join(", ")
    }
}

/// Rendering or writing of output files failed.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("Tool '{tool}' source file '{file}' not found (searched: {})", format_paths(.searched))]
    MissingToolSource {
        tool: String,
        file: String,
        searched: Vec<PathBuf>,
    },

    #[error("Tool '{tool}' source '{file}' is not a valid module path")]
    InvalidModulePath { tool: String, file: String },

    #[error("No root agent to generate: the manifest declares no agents")]
    NoRootAgent,

    #[error("Failed to render template '{template}': {message}")]
    Template { template: String, message: String },

    #[error("Failed to serialize {what}: {message}")]
    Serialize { what: String, message: String },

    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn format_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Every failure a generation run can end in.
#[derive(Debug, thiserror::Error)]
pub enum KonductorError {
    #[error("Failed to read manifest {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error(transparent)]
    Cycle(#[from] CycleError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("Provider validation failed for '{provider}':\n{}", .messages.join("\n"))]
    ProviderValidation {
        provider: String,
        messages: Vec<String>,
    },

    #[error(transparent)]
    Generation(#[from] GenerationError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_names_file_document_and_field() {
        let err = ValidationError::new(
            DocumentLocation::new(Some(PathBuf::from("agents.yaml")), 3),
            "spec.type",
            "unsupported tool type 'shell'",
        );
        let text = err.to_string();
        assert!(text.contains("agents.yaml"));
        assert!(text.contains("document 3"));
        assert!(text.contains("spec.type"));
    }

    #[test]
    fn test_cycle_error_display() {
        let err = CycleError {
            path: vec!["a".into(), "b".into(), "a".into()],
        };
        assert_eq!(err.to_string(), "Circular sub-agent reference: a -> b -> a");
    }

    #[test]
    fn test_unknown_provider_lists_available() {
        let err = RegistryError::UnknownProvider {
            name: "crewai".into(),
            available: vec!["google_adk".into(), "stub".into()],
        };
        let text = err.to_string();
        assert!(text.contains("crewai"));
        assert!(text.contains("google_adk, stub"));
    }
}
