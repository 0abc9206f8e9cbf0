//! Configuration types for Frostgate.
//!
//! Configuration is loaded from a YAML file (conventionally `frostgate.yaml`)
//! and combined with the registry seed files it references into a single
//! `FrostgateConfig` structure.
//!
//! # Configuration Files
//!
//! - **frostgate.yaml**: engine settings, statement permissions, registry sources
//! - **registry/*.yaml**: additional resource type definitions (see [`registry`])

pub mod permissions;
pub mod registry;

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub use permissions::StatementPermissionsConfig;
pub use registry::{
    AttributeConstraint, AttributeDefinition, AttributeType, CrossFieldRule, ManagerKind,
    RegistrySeed, Rendering, ResourceTypeDefinition, Scope,
};

/// Complete Frostgate configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FrostgateConfig {
    /// Project name.
    #[serde(default)]
    pub project: Option<String>,

    /// Where resource type definitions come from.
    #[serde(default)]
    pub registry: RegistryConfig,

    /// Allow/deny table for free-form statements.
    #[serde(default)]
    pub statement_permissions: StatementPermissionsConfig,

    /// SQL parsing settings.
    #[serde(default)]
    pub sql: SqlConfig,

    /// Enumeration limits for `list_objects`.
    #[serde(default)]
    pub listing: ListingConfig,

    /// MCP server settings.
    #[serde(default)]
    pub server: ServerConfig,
}

/// Sources of resource type definitions.
///
/// Types are registered in this order: the built-in catalog (when enabled),
/// then every file in `files`, then the inline `resource_types`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Whether the built-in catalog is registered.
    #[serde(default = "default_true")]
    pub builtin: bool,

    /// Registry seed files, relative to the configuration file.
    #[serde(default)]
    pub files: Vec<PathBuf>,

    /// Inline resource type definitions.
    #[serde(default)]
    pub resource_types: Vec<ResourceTypeDefinition>,

    /// Definitions read from `files` by [`FrostgateConfig::load_with_context`].
    #[serde(skip)]
    pub file_types: Vec<ResourceTypeDefinition>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            builtin: true,
            files: Vec::new(),
            resource_types: Vec::new(),
            file_types: Vec::new(),
        }
    }
}

impl RegistryConfig {
    /// All resource type definitions in registration order.
    pub fn definitions(&self) -> Result<Vec<ResourceTypeDefinition>, ConfigError> {
        let mut definitions = Vec::new();
        if self.builtin {
            definitions.extend(RegistrySeed::builtin()?.resource_types);
        }
        definitions.extend(self.file_types.iter().cloned());
        definitions.extend(self.resource_types.iter().cloned());
        Ok(definitions)
    }
}

/// SQL dialect used to parse free-form statements and view bodies.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SqlDialect {
    #[default]
    Snowflake,
    Generic,
    Postgres,
    Ansi,
}

/// SQL parsing configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SqlConfig {
    #[serde(default)]
    pub dialect: SqlDialect,
}

/// Limits applied to `list_objects`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingConfig {
    /// Limit used when the caller does not give one.
    #[serde(default = "default_list_limit")]
    pub default_limit: u64,

    /// Largest limit a caller may request.
    #[serde(default = "default_max_list_limit")]
    pub max_limit: u64,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            default_limit: default_list_limit(),
            max_limit: default_max_list_limit(),
        }
    }
}

/// MCP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server name reported on `initialize`.
    #[serde(default = "default_server_name")]
    pub name: String,

    /// Whether the gated `execute_statement` tool is exposed.
    #[serde(default = "default_true")]
    pub execute_statement_tool: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: default_server_name(),
            execute_statement_tool: true,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_list_limit() -> u64 {
    100
}

fn default_max_list_limit() -> u64 {
    10_000
}

fn default_server_name() -> String {
    "frostgate".to_string()
}

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl FrostgateConfig {
    /// Load configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML content.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration and resolve all external references.
    ///
    /// Registry files are resolved relative to the configuration file's
    /// directory. A missing registry file is an error, since a silently
    /// absent resource type would only surface later as `not_found`.
    pub fn load_with_context(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let mut config = Self::from_file(path)?;

        let base_dir = path
            .parent()
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));

        for file in &config.registry.files.clone() {
            let seed_path = if file.is_absolute() {
                file.clone()
            } else {
                base_dir.join(file)
            };

            if !seed_path.exists() {
                return Err(ConfigError::Config(format!(
                    "registry file not found: {}",
                    seed_path.display()
                )));
            }

            let seed = RegistrySeed::from_file(&seed_path)?;
            config.registry.file_types.extend(seed.resource_types);
        }

        Ok(config)
    }

    /// Check settings that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.listing.default_limit == 0 || self.listing.max_limit == 0 {
            return Err(ConfigError::Config(
                "listing limits must be at least 1".to_string(),
            ));
        }
        if self.listing.default_limit > self.listing.max_limit {
            return Err(ConfigError::Config(format!(
                "listing.default_limit ({}) exceeds listing.max_limit ({})",
                self.listing.default_limit, self.listing.max_limit
            )));
        }
        self.statement_permissions.entries()?;
        Ok(())
    }
}
