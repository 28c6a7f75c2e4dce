use anyhow::{Context, Result};
use optgen_build::{DEFAULT_RUNTIME_PATH, DEFAULT_SENSITIVE_NAMES};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "optgen.toml";

/// Project the CLI runs in: the nearest ancestor holding `Cargo.toml`, or the
/// starting directory when there is none.
pub struct ProjectContext {
    pub project_root: PathBuf,
    pub config_path: PathBuf,
    /// Loaded configuration
    pub config: Option<OptgenConfig>,
}

/// Contents of `optgen.toml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OptgenConfig {
    #[serde(default)]
    pub optgen: OptgenSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptgenSettings {
    #[serde(default = "default_sensitive_field_name_matches")]
    pub sensitive_field_name_matches: String,
    #[serde(default = "default_runtime_path")]
    pub runtime_path: String,
    /// Relative to the project root.
    #[serde(default = "default_src_root")]
    pub src_root: String,
}

impl Default for OptgenSettings {
    fn default() -> Self {
        Self {
            sensitive_field_name_matches: default_sensitive_field_name_matches(),
            runtime_path: default_runtime_path(),
            src_root: default_src_root(),
        }
    }
}

fn default_sensitive_field_name_matches() -> String {
    DEFAULT_SENSITIVE_NAMES.to_string()
}

fn default_runtime_path() -> String {
    DEFAULT_RUNTIME_PATH.to_string()
}

fn default_src_root() -> String {
    "src".to_string()
}

impl ProjectContext {
    pub fn discover(start: &Path) -> Result<Self> {
        let project_root = Self::find_project_root(start).unwrap_or_else(|| start.to_path_buf());
        Self::from_root(project_root)
    }

    pub fn from_root(project_root: PathBuf) -> Result<Self> {
        let config_path = project_root.join(CONFIG_FILE);

        let config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read {}", config_path.display()))?;
            let config: OptgenConfig = toml::from_str(&content)
                .with_context(|| format!("Failed to parse {}", config_path.display()))?;
            log::debug!("loaded configuration from {}", config_path.display());
            Some(config)
        } else {
            None
        };

        Ok(Self {
            project_root,
            config_path,
            config,
        })
    }

    pub fn settings(&self) -> OptgenSettings {
        self.config
            .as_ref()
            .map(|config| config.optgen.clone())
            .unwrap_or_default()
    }

    pub fn src_root(&self) -> PathBuf {
        self.project_root.join(self.settings().src_root)
    }

    fn find_project_root(start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .find(|dir| dir.join("Cargo.toml").exists())
            .map(Path::to_path_buf)
    }
}
