// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Manifest YAML Parser
//!
//! This module provides infrastructure for parsing multi-document agent
//! manifests into domain resources.
//!
//! # Architecture
//!
//! - **Layer:** Infrastructure
//! - **Purpose:** Parse external YAML → Domain objects
//! - **Anti-Corruption:** Translates YAML schema to domain model
//!
//! # Manifest Format
//!
//! ```yaml
//! apiVersion: konductor.dev/v1
//! kind: Tool
//! metadata:
//!   name: weather-tool
//! spec:
//!   type: pythonFunction
//!   description: "Current weather for a city"
//!   source:
//!     file: tools/weather.py
//!     functionName: get_weather_report
//!   parameters:
//!     - name: city
//!       type: string
//!       description: "City name"
//! ---
//! apiVersion: konductor.dev/v1
//! kind: LlmAgent
//! metadata:
//!   name: weather_agent
//! spec:
//!   modelRef: gemini_flash_model
//!   instruction: "Answer weather questions."
//!   toolRefs: [weather-tool]
//! ```
//!
//! Parsing stops at the first invalid document.

use crate::domain::errors::{DocumentLocation, KonductorError, ValidationError};
use crate::domain::manifest::ParsedManifest;
use crate::domain::resource::*;
use serde::Deserialize;
use serde_yaml::Value;
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

// ============================================================================
// YAML Schema (External Representation)
// ============================================================================

// Required scalars are `Option` here so that a missing field is reported
// with its full path instead of serde's bare "missing field" message.

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MetadataYaml {
    pub name: Option<String>,
    #[serde(default)]
    pub labels: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub annotations: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolSpecYaml {
    #[serde(rename = "type")]
    pub tool_type: Option<String>,
    pub description: Option<String>,
    pub source: Option<ToolSourceYaml>,
    #[serde(default)]
    pub parameters: Option<Vec<ToolParameterYaml>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolSourceYaml {
    pub file: Option<String>,
    pub function_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ToolParameterYaml {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub param_type: Option<String>,
    pub description: Option<String>,
    #[serde(default = "default_true")]
    pub required: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelSpecYaml {
    pub provider: Option<String>,
    pub model_id: Option<String>,
    #[serde(default)]
    pub parameters: Option<BTreeMap<String, Value>>,
    #[serde(default)]
    pub retry_options: Option<RetryOptions>,
}

/// Union of the fields of every agent kind; the kind decides which are allowed
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentSpecYaml {
    pub description: Option<String>,
    pub instruction: Option<String>,
    pub model_ref: Option<String>,
    pub model: Option<String>,
    #[serde(rename = "output_key", alias = "outputKey")]
    pub output_key: Option<String>,
    pub tool_refs: Option<Vec<String>>,
    pub sub_agent_refs: Option<Vec<String>>,
    pub max_iterations: Option<u32>,
}

// ============================================================================
// Parser
// ============================================================================

/// Manifest parser (Infrastructure service)
pub struct ManifestParser;

impl ManifestParser {
    /// Parse a single manifest file
    pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<ParsedManifest, KonductorError> {
        Self::parse_files(&[path])
    }

    /// Parse several manifest files and merge them into one resource set.
    ///
    /// Names must stay unique per namespace across all files.
    pub fn parse_files<P: AsRef<Path>>(paths: &[P]) -> Result<ParsedManifest, KonductorError> {
        let mut manifest = ParsedManifest::new();
        for path in paths {
            let path = path.as_ref();
            let content = fs::read_to_string(path).map_err(|source| KonductorError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            Self::parse_into(&mut manifest, &content, Some(path))?;
        }

        info!("Parsed {}", manifest.summary());
        Ok(manifest)
    }

    /// Parse manifest documents held in memory
    pub fn parse_yaml(yaml: &str) -> Result<ParsedManifest, ValidationError> {
        let mut manifest = ParsedManifest::new();
        Self::parse_into(&mut manifest, yaml, None)?;
        Ok(manifest)
    }

    /// Parse every document of `yaml` and add the resources to `manifest`
    pub fn parse_into(
        manifest: &mut ParsedManifest,
        yaml: &str,
        file: Option<&Path>,
    ) -> Result<(), ValidationError> {
        for (index, document) in serde_yaml::Deserializer::from_str(yaml).enumerate() {
            let location = DocumentLocation::new(file.map(Path::to_path_buf), index + 1);

            let value = Value::deserialize(document).map_err(|e| {
                ValidationError::new(location.clone(), "<document>", format!("invalid YAML: {}", e))
            })?;

            if let Some(resource) = Self::parse_document(value, &location)? {
                debug!("{} '{}' parsed from {}", resource.kind(), resource.name(), location);
                manifest.insert(resource, &location)?;
            }
        }
        Ok(())
    }

    /// Convert one YAML document; `None` for empty documents and unknown kinds
    fn parse_document(
        value: Value,
        location: &DocumentLocation,
    ) -> Result<Option<Resource>, ValidationError> {
        match &value {
            Value::Null => return Ok(None),
            Value::Mapping(_) => {}
            other => {
                return Err(ValidationError::new(
                    location.clone(),
                    "<document>",
                    format!("expected a mapping, found {}", describe(other)),
                ))
            }
        }

        let kind_name = match value.get("kind") {
            None | Some(Value::Null) => return Err(missing(location, "kind")),
            Some(Value::String(kind)) => kind.as_str(),
            Some(other) => return Err(wrong_type(location, "kind", "a string", other)),
        };
        let Some(kind) = ResourceKind::from_manifest_kind(kind_name) else {
            warn!("Unknown kind '{}' found in {}. Skipping.", kind_name, location);
            return Ok(None);
        };

        let api_version = match value.get("apiVersion") {
            None | Some(Value::Null) => return Err(missing(location, "apiVersion")),
            Some(Value::String(version)) if version.trim().is_empty() => {
                return Err(ValidationError::new(location.clone(), "apiVersion", "cannot be empty"))
            }
            Some(Value::String(version)) => version.clone(),
            Some(other) => return Err(wrong_type(location, "apiVersion", "a string", other)),
        };

        let metadata = Self::convert_metadata(value.get("metadata"), location)?;

        let spec = match value.get("spec") {
            None | Some(Value::Null) => return Err(missing(location, "spec")),
            Some(spec @ Value::Mapping(_)) => spec.clone(),
            Some(other) => return Err(wrong_type(location, "spec", "a mapping", other)),
        };

        let resource = match kind {
            ResourceKind::Tool => Resource::Tool(Tool {
                api_version,
                metadata,
                spec: Self::convert_tool_spec(deserialize_at(spec, "spec", location)?, location)?,
            }),
            ResourceKind::Model => Resource::Model(Model {
                api_version,
                metadata,
                spec: Self::convert_model_spec(deserialize_at(spec, "spec", location)?, location)?,
            }),
            agent_kind => Resource::Agent(Agent {
                api_version,
                metadata,
                spec: Self::convert_agent_spec(agent_kind, deserialize_at(spec, "spec", location)?, location)?,
            }),
        };
        Ok(Some(resource))
    }

    fn convert_metadata(
        value: Option<&Value>,
        location: &DocumentLocation,
    ) -> Result<ResourceMetadata, ValidationError> {
        let value = match value {
            None | Some(Value::Null) => return Err(missing(location, "metadata")),
            Some(value @ Value::Mapping(_)) => value.clone(),
            Some(other) => return Err(wrong_type(location, "metadata", "a mapping", other)),
        };
        let yaml: MetadataYaml = deserialize_at(value, "metadata", location)?;

        let name = yaml.name.ok_or_else(|| missing(location, "metadata.name"))?;
        ResourceMetadata::validate_name(&name)
            .map_err(|message| ValidationError::new(location.clone(), "metadata.name", message))?;

        Ok(ResourceMetadata {
            name,
            labels: yaml.labels.unwrap_or_default(),
            annotations: yaml.annotations.unwrap_or_default(),
        })
    }

    fn convert_tool_spec(
        yaml: ToolSpecYaml,
        location: &DocumentLocation,
    ) -> Result<ToolSpec, ValidationError> {
        let tool_type = match yaml.tool_type.as_deref() {
            None => ToolType::PythonFunction,
            Some(value) => ToolType::parse(value).ok_or_else(|| {
                ValidationError::new(
                    location.clone(),
                    "spec.type",
                    format!(
                        "unsupported tool type '{}' (allowed: {})",
                        value,
                        ToolType::ALLOWED.join(", ")
                    ),
                )
            })?,
        };

        let description = required_text(yaml.description, location, "spec.description")?;
        let source = yaml.source.ok_or_else(|| missing(location, "spec.source"))?;
        let source = ToolSource {
            file: required_text(source.file, location, "spec.source.file")?,
            function_name: required_text(
                source.function_name,
                location,
                "spec.source.functionName",
            )?,
        };

        let mut parameters = Vec::new();
        let mut seen = HashSet::new();
        for (index, parameter) in yaml.parameters.unwrap_or_default().into_iter().enumerate() {
            let field = |name: &str| format!("spec.parameters[{}].{}", index, name);
            let name = required_text(parameter.name, location, &field("name"))?;
            if !seen.insert(name.clone()) {
                return Err(ValidationError::new(
                    location.clone(),
                    field("name"),
                    format!("duplicate parameter '{}'", name),
                ));
            }
            parameters.push(ToolParameter {
                name,
                param_type: required_text(parameter.param_type, location, &field("type"))?,
                description: required_text(parameter.description, location, &field("description"))?,
                required: parameter.required,
            });
        }

        Ok(ToolSpec {
            tool_type,
            description,
            source,
            parameters,
        })
    }

    fn convert_model_spec(
        yaml: ModelSpecYaml,
        location: &DocumentLocation,
    ) -> Result<ModelSpec, ValidationError> {
        let provider = required_text(yaml.provider, location, "spec.provider")?;
        let model_id = required_text(yaml.model_id, location, "spec.modelId")?;

        let retry_options = match yaml.retry_options {
            Some(retry) => {
                validate_retry_options(&retry, location)?;
                Some(retry)
            }
            None => None,
        };

        let mut parameters = BTreeMap::new();
        for (key, value) in yaml.parameters.unwrap_or_default() {
            let field = format!("spec.parameters.{}", key);
            check_finite(&value, &field, location)?;
            let value = serde_json::to_value(&value)
                .map_err(|e| ValidationError::new(location.clone(), field, e.to_string()))?;
            parameters.insert(key, value);
        }

        Ok(ModelSpec {
            provider,
            model_id,
            parameters,
            retry_options,
        })
    }

    fn convert_agent_spec(
        kind: ResourceKind,
        yaml: AgentSpecYaml,
        location: &DocumentLocation,
    ) -> Result<AgentSpec, ValidationError> {
        let tool_refs = reference_list(yaml.tool_refs, location, "spec.toolRefs", false)?;

        let variant = if kind == ResourceKind::LlmAgent {
            if yaml.sub_agent_refs.is_some() {
                return Err(not_allowed(location, "spec.subAgentRefs", kind));
            }
            if yaml.max_iterations.is_some() {
                return Err(not_allowed(location, "spec.maxIterations", kind));
            }

            let model = match (yaml.model_ref, yaml.model) {
                (Some(_), Some(_)) => {
                    return Err(ValidationError::new(
                        location.clone(),
                        "spec.modelRef",
                        "set either 'modelRef' or 'model', not both",
                    ))
                }
                (Some(name), None) => {
                    ModelBinding::Ref(required_text(Some(name), location, "spec.modelRef")?)
                }
                (None, Some(model_id)) => {
                    ModelBinding::Inline(required_text(Some(model_id), location, "spec.model")?)
                }
                (None, None) => {
                    return Err(ValidationError::new(
                        location.clone(),
                        "spec.modelRef",
                        "missing required field (or give an inline 'model')",
                    ))
                }
            };

            AgentVariant::LlmAgent {
                model,
                instruction: required_text(yaml.instruction, location, "spec.instruction")?,
                output_key: match yaml.output_key {
                    Some(key) => Some(required_text(Some(key), location, "spec.output_key")?),
                    None => None,
                },
            }
        } else {
            for (field, present) in [
                ("spec.instruction", yaml.instruction.is_some()),
                ("spec.modelRef", yaml.model_ref.is_some()),
                ("spec.model", yaml.model.is_some()),
                ("spec.output_key", yaml.output_key.is_some()),
            ] {
                if present {
                    return Err(not_allowed(location, field, kind));
                }
            }
            if yaml.max_iterations.is_some() && kind != ResourceKind::LoopAgent {
                return Err(not_allowed(location, "spec.maxIterations", kind));
            }

            let sub_agent_refs =
                reference_list(yaml.sub_agent_refs, location, "spec.subAgentRefs", true)?;

            match kind {
                ResourceKind::SequentialAgent => AgentVariant::SequentialAgent { sub_agent_refs },
                ResourceKind::ParallelAgent => AgentVariant::ParallelAgent { sub_agent_refs },
                _ => {
                    if yaml.max_iterations == Some(0) {
                        return Err(ValidationError::new(
                            location.clone(),
                            "spec.maxIterations",
                            "must be greater than 0",
                        ));
                    }
                    AgentVariant::LoopAgent {
                        sub_agent_refs,
                        max_iterations: yaml.max_iterations,
                    }
                }
            }
        };

        Ok(AgentSpec {
            description: yaml.description,
            tool_refs,
            variant,
        })
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Deserializes `value` and reports a failure at the offending field below `root`
fn deserialize_at<T: serde::de::DeserializeOwned>(
    value: Value,
    root: &str,
    location: &DocumentLocation,
) -> Result<T, ValidationError> {
    serde_path_to_error::deserialize(value).map_err(|e| {
        let path = e.path().to_string();
        let field = match path.as_str() {
            "." => root.to_string(),
            p if p.starts_with('[') => format!("{}{}", root, p),
            p => format!("{}.{}", root, p),
        };
        ValidationError::new(location.clone(), field, e.into_inner().to_string())
    })
}

/// Rejects NaN and infinities anywhere inside a generation parameter
fn check_finite(
    value: &Value,
    field: &str,
    location: &DocumentLocation,
) -> Result<(), ValidationError> {
    match value {
        Value::Number(number) if number.as_f64().is_some_and(|v| !v.is_finite()) => Err(
            ValidationError::new(location.clone(), field, "must be a finite number"),
        ),
        Value::Sequence(items) => items.iter().enumerate().try_for_each(|(index, item)| {
            check_finite(item, &format!("{}[{}]", field, index), location)
        }),
        Value::Mapping(entries) => entries.iter().try_for_each(|(key, item)| {
            check_finite(item, &format!("{}.{}", field, describe_key(key)), location)
        }),
        Value::Tagged(tagged) => check_finite(&tagged.value, field, location),
        _ => Ok(()),
    }
}

fn describe_key(key: &Value) -> String {
    match key {
        Value::String(key) => key.clone(),
        other => serde_yaml::to_string(other)
            .map(|text| text.trim_end().to_string())
            .unwrap_or_else(|_| "?".to_string()),
    }
}

fn missing(location: &DocumentLocation, field: &str) -> ValidationError {
    ValidationError::new(location.clone(), field, "missing required field")
}

fn wrong_type(
    location: &DocumentLocation,
    field: &str,
    expected: &str,
    found: &Value,
) -> ValidationError {
    ValidationError::new(
        location.clone(),
        field,
        format!("expected {}, found {}", expected, describe(found)),
    )
}

fn not_allowed(location: &DocumentLocation, field: &str, kind: ResourceKind) -> ValidationError {
    ValidationError::new(location.clone(), field, format!("not allowed on a {}", kind))
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

fn required_text(
    value: Option<String>,
    location: &DocumentLocation,
    field: &str,
) -> Result<String, ValidationError> {
    match value {
        None => Err(missing(location, field)),
        Some(text) if text.trim().is_empty() => {
            Err(ValidationError::new(location.clone(), field, "cannot be empty"))
        }
        Some(text) => Ok(text),
    }
}

/// Ordered, duplicate-free list of resource names
fn reference_list(
    refs: Option<Vec<String>>,
    location: &DocumentLocation,
    field: &str,
    required: bool,
) -> Result<Vec<String>, ValidationError> {
    let refs = match refs {
        Some(refs) => refs,
        None if required => return Err(missing(location, field)),
        None => return Ok(Vec::new()),
    };
    if required && refs.is_empty() {
        return Err(ValidationError::new(location.clone(), field, "must list at least one name"));
    }

    let mut seen = HashSet::with_capacity(refs.len());
    for (index, name) in refs.iter().enumerate() {
        if name.trim().is_empty() {
            return Err(ValidationError::new(
                location.clone(),
                format!("{}[{}]", field, index),
                "cannot be empty",
            ));
        }
        if !seen.insert(name.clone()) {
            return Err(ValidationError::new(
                location.clone(),
                format!("{}[{}]", field, index),
                format!("duplicate reference '{}'", name),
            ));
        }
    }
    Ok(refs)
}

fn validate_retry_options(
    retry: &RetryOptions,
    location: &DocumentLocation,
) -> Result<(), ValidationError> {
    let positive = |value: Option<f64>, field: &str| match value {
        Some(v) if !v.is_finite() || v <= 0.0 => Err(ValidationError::new(
            location.clone(),
            format!("spec.retryOptions.{}", field),
            "must be a finite number greater than 0",
        )),
        _ => Ok(()),
    };

    if retry.attempts == Some(0) {
        return Err(ValidationError::new(
            location.clone(),
            "spec.retryOptions.attempts",
            "must be greater than 0",
        ));
    }
    positive(retry.initial_delay, "initialDelay")?;
    positive(retry.max_delay, "maxDelay")?;
    positive(retry.exp_base, "expBase")?;

    if let Some(jitter) = retry.jitter {
        if !jitter.is_finite() || jitter < 0.0 {
            return Err(ValidationError::new(
                location.clone(),
                "spec.retryOptions.jitter",
                "must be a finite number, not negative",
            ));
        }
    }

    if let (Some(initial), Some(max)) = (retry.initial_delay, retry.max_delay) {
        if max < initial {
            return Err(ValidationError::new(
                location.clone(),
                "spec.retryOptions.maxDelay",
                format!("must not be smaller than initialDelay ({})", initial),
            ));
        }
    }

    for (index, code) in retry.http_status_codes.iter().enumerate() {
        if !(100..=599).contains(code) {
            return Err(ValidationError::new(
                location.clone(),
                format!("spec.retryOptions.httpStatusCodes[{}]", index),
                format!("{} is not an HTTP status code", code),
            ));
        }
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
