//! Configuration schema (snowgen.toml)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Well-known folder holding SQL text templates
pub const SQL_TEMPLATES_FOLDER: &str = "sql_templates";

/// Well-known folder holding per-schema data templates
pub const DATA_TEMPLATES_FOLDER: &str = "data_templates";

/// Where generated objects and templates live, relative to the project root
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Root of the generated object tree (`databases/<db>/schemas/...`)
    #[serde(default = "default_objects_path")]
    pub objects: PathBuf,

    /// SQL templates folder; located by name when unset
    #[serde(default)]
    pub sql_templates: Option<PathBuf>,

    /// Data templates folder; located by name when unset
    #[serde(default)]
    pub data_templates: Option<PathBuf>,

    /// Schema templates YAML file
    #[serde(default = "default_schema_templates_path")]
    pub schema_templates: PathBuf,
}

fn default_objects_path() -> PathBuf {
    PathBuf::from("snowflake/snowflake_objects")
}

fn default_schema_templates_path() -> PathBuf {
    PathBuf::from("templates/schema_templates/schemas.yaml")
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            objects: default_objects_path(),
            sql_templates: None,
            data_templates: None,
            schema_templates: default_schema_templates_path(),
        }
    }
}

/// Rendering options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Value substituted for `{env}`
    ///
    /// Defaults to the literal `{env}` so environment parametrization
    /// survives into the generated files.
    #[serde(default = "default_env")]
    pub env: String,
}

fn default_env() -> String {
    "{env}".to_string()
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self { env: default_env() }
    }
}

/// Data template options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataConfig {
    /// Field delimiter of data template header rows
    #[serde(default = "default_delimiter")]
    pub delimiter: String,
}

fn default_delimiter() -> String {
    ",".to_string()
}

impl Default for DataConfig {
    fn default() -> Self {
        Self { delimiter: default_delimiter() }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub paths: PathsConfig,

    #[serde(default)]
    pub render: RenderConfig,

    #[serde(default)]
    pub data: DataConfig,

    /// Project root path (for resolving relative paths)
    #[serde(skip)]
    pub project_root: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            paths: PathsConfig::default(),
            render: RenderConfig::default(),
            data: DataConfig::default(),
            project_root: std::env::current_dir().unwrap_or_default(),
        }
    }
}

impl Config {
    /// Load config from TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        let mut config = Self::from_toml(&contents)?;

        // Set project root to parent of config file
        if let Some(parent) = path.parent() {
            config.project_root = if parent.as_os_str().is_empty() {
                PathBuf::from(".")
            } else {
                parent.to_path_buf()
            };
        }

        Ok(config)
    }

    /// Load config from TOML string
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(toml)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;

        if config.data.delimiter.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "data.delimiter".to_string(),
                message: "delimiter must not be empty".to_string(),
            });
        }

        Ok(config)
    }

    /// Save config to TOML file
    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let toml = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(path, toml)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }

    /// Resolve a configured path against the project root
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.project_root.join(path)
        }
    }

    /// Absolute root of the generated object tree
    pub fn objects_root(&self) -> PathBuf {
        self.resolve(&self.paths.objects)
    }

    /// Absolute path of the schema templates file
    pub fn schema_templates_path(&self) -> PathBuf {
        self.resolve(&self.paths.schema_templates)
    }
}

/// Config error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),

    #[error("Invalid value for `{key}`: {message}")]
    InvalidValue { key: String, message: String },
}
