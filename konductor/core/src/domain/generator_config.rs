// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Generator Configuration Types
//
// Defines the configuration schema for the konductor CLI, including:
// - Kubernetes-style manifest format (apiVersion/kind/metadata/spec)
// - Default provider and output location
// - Tool source search paths
//
// Precedence: CLI flags > environment overrides > config file > defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::generator::DEFAULT_APP_NAME;

pub const CONFIG_API_VERSION: &str = "konductor.dev/v1";
pub const CONFIG_KIND: &str = "KonductorConfig";
pub const DEFAULT_PROVIDER: &str = "google_adk";
pub const DEFAULT_OUTPUT_DIR: &str = "generated_agent";

/// Top-level Kubernetes-style generator configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KonductorConfig {
    /// API version (must be "konductor.dev/v1")
    #[serde(rename = "apiVersion")]
    pub api_version: String,

    /// Resource kind (must be "KonductorConfig")
    pub kind: String,

    #[serde(default)]
    pub metadata: ConfigMetadata,

    #[serde(default)]
    pub spec: KonductorConfigSpec,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigMetadata {
    pub name: String,
}

impl Default for ConfigMetadata {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
        }
    }
}

/// Generator settings (content under spec:)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KonductorConfigSpec {
    /// Provider used when `--provider` is not given
    #[serde(default = "default_provider")]
    pub default_provider: String,

    /// Output directory used when `--output-dir` is not given
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Application name written into the generated entry point
    #[serde(default = "default_app_name")]
    pub app_name: String,

    /// Extra directories searched for tool source files, after the manifest directory
    #[serde(default)]
    pub tool_search_paths: Vec<PathBuf>,
}

fn default_provider() -> String {
    DEFAULT_PROVIDER.to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_DIR)
}

fn default_app_name() -> String {
    DEFAULT_APP_NAME.to_string()
}

impl Default for KonductorConfigSpec {
    fn default() -> Self {
        Self {
            default_provider: default_provider(),
            output_dir: default_output_dir(),
            app_name: default_app_name(),
            tool_search_paths: Vec::new(),
        }
    }
}

impl Default for KonductorConfig {
    fn default() -> Self {
        Self {
            api_version: CONFIG_API_VERSION.to_string(),
            kind: CONFIG_KIND.to_string(),
            metadata: ConfigMetadata::default(),
            spec: KonductorConfigSpec::default(),
        }
    }
}

impl KonductorConfig {
    /// Load configuration from YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Save configuration to YAML file
    pub fn to_yaml_file(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        let config = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Discover configuration file using precedence order
    /// 1. KONDUCTOR_CONFIG_PATH environment variable
    /// 2. ./konductor-config.yaml (working directory)
    /// 3. ~/.konductor/config.yaml (user home)
    /// 4. /etc/konductor/config.yaml (system, Unix) or C:\ProgramData\Konductor\config.yaml (Windows)
    pub fn discover_config() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("KONDUCTOR_CONFIG_PATH") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        let cwd = PathBuf::from("./konductor-config.yaml");
        if cwd.exists() {
            return Some(cwd);
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".konductor").join("config.yaml");
            if user_config.exists() {
                return Some(user_config);
            }
        }

        #[cfg(unix)]
        let system_config = PathBuf::from("/etc/konductor/config.yaml");
        #[cfg(windows)]
        let system_config = PathBuf::from("C:\\ProgramData\\Konductor\\config.yaml");

        if system_config.exists() {
            return Some(system_config);
        }

        None
    }

    /// Load configuration with discovery, fallback to default
    pub fn load_or_default(cli_path: Option<PathBuf>) -> anyhow::Result<Self> {
        // Explicit path must exist and parse
        if let Some(path) = cli_path {
            tracing::info!("Loading configuration from explicit path: {:?}", path);
            let mut config = Self::from_yaml_file(&path)
                .map_err(|e| anyhow::anyhow!("Failed to load config at {:?}: {}", path, e))?;
            config.apply_env_overrides();
            return Ok(config);
        }

        let mut config = match Self::discover_config() {
            Some(config_path) => {
                tracing::info!("Loading configuration from discovered path: {:?}", config_path);
                Self::from_yaml_file(&config_path).map_err(|e| {
                    anyhow::anyhow!("Failed to load config at {:?}: {}", config_path, e)
                })?
            }
            None => {
                tracing::debug!("No configuration file found in standard locations. Using defaults.");
                Self::default()
            }
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides to configuration
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("KONDUCTOR_PROVIDER") {
            if !val.is_empty() {
                tracing::info!("Environment override: KONDUCTOR_PROVIDER={}", val);
                self.spec.default_provider = val;
            }
        }

        if let Ok(val) = std::env::var("KONDUCTOR_OUTPUT_DIR") {
            if !val.is_empty() {
                tracing::info!("Environment override: KONDUCTOR_OUTPUT_DIR={}", val);
                self.spec.output_dir = PathBuf::from(val);
            }
        }

        if let Some(val) = std::env::var_os("KONDUCTOR_TOOL_PATH") {
            let paths: Vec<PathBuf> = std::env::split_paths(&val)
                .filter(|p| !p.as_os_str().is_empty())
                .collect();
            if !paths.is_empty() {
                tracing::info!("Environment override: KONDUCTOR_TOOL_PATH ({} path(s))", paths.len());
                self.spec.tool_search_paths = paths;
            }
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.api_version != CONFIG_API_VERSION {
            anyhow::bail!(
                "Invalid apiVersion: '{}'. Must be '{}'",
                self.api_version,
                CONFIG_API_VERSION
            );
        }

        if self.kind != CONFIG_KIND {
            anyhow::bail!("Invalid kind: '{}'. Must be '{}'", self.kind, CONFIG_KIND);
        }

        if self.metadata.name.is_empty() {
            anyhow::bail!("metadata.name cannot be empty");
        }

        if self.spec.default_provider.is_empty() {
            anyhow::bail!("spec.default_provider cannot be empty");
        }

        if self.spec.output_dir.as_os_str().is_empty() {
            anyhow::bail!("spec.output_dir cannot be empty");
        }

        if self.spec.app_name.trim().is_empty() {
            anyhow::bail!("spec.app_name cannot be empty");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = KonductorConfig::default();
        assert_eq!(config.api_version, "konductor.dev/v1");
        assert_eq!(config.kind, "KonductorConfig");
        assert_eq!(config.spec.default_provider, "google_adk");
        assert_eq!(config.spec.output_dir, PathBuf::from("generated_agent"));
        assert_eq!(config.spec.app_name, "generated-konductor-app");
        assert!(config.spec.tool_search_paths.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_spec_uses_defaults() {
        let yaml = r#"
apiVersion: konductor.dev/v1
kind: KonductorConfig
spec:
  default_provider: stub
  tool_search_paths:
    - ./shared
"#;
        let config = KonductorConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.spec.default_provider, "stub");
        assert_eq!(config.spec.output_dir, PathBuf::from("generated_agent"));
        assert_eq!(config.spec.tool_search_paths, vec![PathBuf::from("./shared")]);
        assert_eq!(config.metadata.name, "default");
    }

    #[test]
    fn test_yaml_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");

        let mut config = KonductorConfig::default();
        config.spec.app_name = "weather-app".to_string();
        config.to_yaml_file(&path).unwrap();

        let loaded = KonductorConfig::from_yaml_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_validation() {
        let mut config = KonductorConfig::default();

        config.api_version = "wrong/v1".to_string();
        assert!(config.validate().is_err());
        config.api_version = CONFIG_API_VERSION.to_string();

        config.kind = "NodeConfig".to_string();
        assert!(config.validate().is_err());
        config.kind = CONFIG_KIND.to_string();

        config.spec.default_provider = String::new();
        assert!(config.validate().is_err());
        config.spec.default_provider = DEFAULT_PROVIDER.to_string();

        config.spec.app_name = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_explicit_missing_path_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = KonductorConfig::load_or_default(Some(dir.path().join("missing.yaml")));
        assert!(result.is_err());
    }
}
