//! TaskPlanner configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::extract::{Template, TemplateLibrary, builtin_templates};
use crate::gantt::LayoutEngine;

/// Main TaskPlanner configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[serde(rename = "log-level")]
    pub log_level: Option<String>,

    /// LLM provider configuration
    pub llm: LlmConfig,

    /// Extraction and allocation settings
    pub planning: PlanningConfig,

    /// Chart display settings
    pub gantt: GanttConfig,
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config: .taskplanner.yml
        let local_config = PathBuf::from(".taskplanner.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // Try user config: ~/.config/taskplanner/taskplanner.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("taskplanner").join("taskplanner.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        // No config file found, use defaults
        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Read only the log level, before logging is set up
    ///
    /// Errors are swallowed; the full load later reports them properly.
    pub fn load_log_level(config_path: Option<&PathBuf>) -> Option<String> {
        Self::load(config_path).ok().and_then(|c| c.log_level)
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Fallback template library described by this config
    pub fn template_library(&self) -> TemplateLibrary {
        TemplateLibrary::new(self.planning.templates.clone(), &self.planning.default_template)
    }

    /// Layout engine with the configured display options
    pub fn layout_engine(&self) -> LayoutEngine {
        LayoutEngine::new(self.gantt.month_label_format.clone())
    }
}

/// LLM provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider name ("anthropic" or "openai")
    pub provider: String,

    /// Model identifier
    pub model: String,

    /// Environment variable containing the API key
    #[serde(rename = "api-key-env")]
    pub api_key_env: String,

    /// File containing the API key, used when the env var is unset
    #[serde(rename = "api-key-file")]
    pub api_key_file: Option<PathBuf>,

    /// API base URL (change it along with `provider`)
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Maximum tokens per response
    #[serde(rename = "max-tokens")]
    pub max_tokens: u32,

    /// Request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "anthropic".to_string(),
            model: "claude-sonnet-4-20250514".to_string(),
            api_key_env: "ANTHROPIC_API_KEY".to_string(),
            api_key_file: None,
            base_url: "https://api.anthropic.com".to_string(),
            max_tokens: 4096,
            timeout_ms: 120_000,
        }
    }
}

impl LlmConfig {
    /// Resolve the API key from the env var, then the key file
    pub fn get_api_key(&self) -> Result<String> {
        debug!(api_key_env = %self.api_key_env, "LlmConfig::get_api_key: called");
        if let Ok(key) = std::env::var(&self.api_key_env)
            && !key.trim().is_empty()
        {
            debug!("LlmConfig::get_api_key: found in environment");
            return Ok(key.trim().to_string());
        }

        if let Some(path) = &self.api_key_file {
            let expanded = expand_home(path);
            let key = fs::read_to_string(&expanded)
                .context(format!("Failed to read API key file {}", expanded.display()))?;
            if !key.trim().is_empty() {
                debug!("LlmConfig::get_api_key: found in key file");
                return Ok(key.trim().to_string());
            }
        }

        Err(eyre::eyre!(
            "LLM API key not found. Set the {} environment variable or api-key-file.",
            self.api_key_env
        ))
    }
}

fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => dirs::home_dir().map(|home| home.join(rest)).unwrap_or_else(|| path.to_path_buf()),
        Err(_) => path.to_path_buf(),
    }
}

/// Extraction and allocation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanningConfig {
    /// Use model-proposed dates instead of allocating, when they are valid
    #[serde(rename = "use-suggested-dates")]
    pub use_suggested_dates: bool,

    /// Template used when no keyword matches
    #[serde(rename = "default-template")]
    pub default_template: String,

    /// Fallback templates, searched in order
    pub templates: Vec<Template>,
}

impl Default for PlanningConfig {
    fn default() -> Self {
        Self {
            use_suggested_dates: false,
            default_template: "general".to_string(),
            templates: builtin_templates(),
        }
    }
}

/// Chart display settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GanttConfig {
    /// strftime format for month axis labels
    #[serde(rename = "month-label-format")]
    pub month_label_format: String,

    /// Bar area width in columns for text output
    #[serde(rename = "chart-width")]
    pub chart_width: usize,
}

impl Default for GanttConfig {
    fn default() -> Self {
        Self {
            month_label_format: "%B %Y".to_string(),
            chart_width: 60,
        }
    }
}
