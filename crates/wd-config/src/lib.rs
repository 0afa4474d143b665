//! Configuration management for wdocs.
//!
//! Parses `wdocs.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `markdown.include_root`
//! - `highlight.theme`

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override include root directory.
    pub include_root: Option<PathBuf>,
    /// Override cache enabled flag.
    pub cache_enabled: Option<bool>,
    /// Override highlighting enabled flag.
    pub highlight_enabled: Option<bool>,
    /// Override highlighting theme.
    pub theme: Option<String>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "wdocs.toml";

/// Default highlighting theme, one of syntect's bundled themes.
const DEFAULT_THEME: &str = "InspiredGitHub";

/// Default cache TTL in seconds.
const DEFAULT_TTL_SECS: u64 = 300;

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Result cache configuration.
    pub cache: CacheConfig,
    /// Markdown feature configuration (paths are relative strings from TOML).
    markdown: MarkdownConfigRaw,
    /// Syntax highlighting configuration.
    pub highlight: HighlightConfig,

    /// Resolved markdown configuration (set after loading).
    #[serde(skip)]
    pub markdown_resolved: MarkdownConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Result cache configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Whether parse results are cached.
    pub enabled: bool,
    /// Entry lifetime in seconds.
    pub ttl_secs: u64,
}

impl CacheConfig {
    #[must_use]
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_secs: DEFAULT_TTL_SECS,
        }
    }
}

/// Raw markdown configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct MarkdownConfigRaw {
    include_root: Option<String>,
    containers: Option<Vec<String>>,
    alerts: Option<bool>,
    code_copy: Option<bool>,
    mermaid: Option<bool>,
    anchors: Option<bool>,
}

/// Resolved markdown feature configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkdownConfig {
    /// Root directory for `!!!include(...)!!!` directives. `None` disables includes.
    pub include_root: Option<PathBuf>,
    /// Container type names recognized as `:::type` blocks.
    pub containers: Vec<String>,
    /// Render containers as alert callouts.
    pub alerts: bool,
    /// Wrap fenced code blocks with a copy button.
    pub code_copy: bool,
    /// Render `mermaid` fences as diagram containers.
    pub mermaid: bool,
    /// Add heading anchors and collect the table of contents.
    pub anchors: bool,
}

impl Default for MarkdownConfig {
    fn default() -> Self {
        Self {
            include_root: None,
            containers: default_containers(),
            alerts: true,
            code_copy: true,
            mermaid: true,
            anchors: true,
        }
    }
}

fn default_containers() -> Vec<String> {
    ["info", "tip", "warning", "danger", "details"]
        .into_iter()
        .map(str::to_owned)
        .collect()
}

/// Syntax highlighting configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    /// Whether fenced code is highlighted.
    pub enabled: bool,
    /// Theme name.
    pub theme: String,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            theme: DEFAULT_THEME.to_owned(),
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`highlight.theme`").
        field: String,
        /// Error message (e.g., "${`WD_THEME`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `wdocs.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist or parsing fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(include_root) = &settings.include_root {
            self.markdown_resolved.include_root = Some(include_root.clone());
        }
        if let Some(cache_enabled) = settings.cache_enabled {
            self.cache.enabled = cache_enabled;
        }
        if let Some(highlight_enabled) = settings.highlight_enabled {
            self.highlight.enabled = highlight_enabled;
        }
        if let Some(theme) = &settings.theme {
            self.highlight.theme.clone_from(theme);
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;
        Self::discover_from(&current)
    }

    fn discover_from(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand environment variables before path resolution
        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading from file and after CLI settings
    /// are applied.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_cache()?;
        self.validate_markdown()?;
        self.validate_highlight()?;
        Ok(())
    }

    fn validate_cache(&self) -> Result<(), ConfigError> {
        if self.cache.enabled && self.cache.ttl_secs == 0 {
            return Err(ConfigError::Validation(
                "cache.ttl_secs must be greater than 0 when the cache is enabled".to_owned(),
            ));
        }
        Ok(())
    }

    fn validate_markdown(&self) -> Result<(), ConfigError> {
        let containers = &self.markdown_resolved.containers;
        for (i, kind) in containers.iter().enumerate() {
            require_non_empty(kind, "markdown.containers")?;
            if kind.chars().any(char::is_whitespace) {
                return Err(ConfigError::Validation(format!(
                    "markdown.containers entry '{kind}' cannot contain whitespace"
                )));
            }
            if containers[..i].contains(kind) {
                return Err(ConfigError::Validation(format!(
                    "markdown.containers lists '{kind}' more than once"
                )));
            }
        }
        if let Some(root) = &self.markdown_resolved.include_root {
            require_non_empty(&root.to_string_lossy(), "markdown.include_root")?;
        }
        Ok(())
    }

    fn validate_highlight(&self) -> Result<(), ConfigError> {
        if self.highlight.enabled {
            require_non_empty(&self.highlight.theme, "highlight.theme")?;
        }
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        if let Some(ref root) = self.markdown.include_root {
            self.markdown.include_root =
                Some(expand::expand_env(root, "markdown.include_root")?);
        }
        self.highlight.theme = expand::expand_env(&self.highlight.theme, "highlight.theme")?;
        Ok(())
    }

    /// Resolve raw markdown settings, joining relative paths onto the config
    /// directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let defaults = MarkdownConfig::default();
        let raw = &self.markdown;
        self.markdown_resolved = MarkdownConfig {
            include_root: raw.include_root.as_deref().map(|p| config_dir.join(p)),
            containers: raw.containers.clone().unwrap_or(defaults.containers),
            alerts: raw.alerts.unwrap_or(defaults.alerts),
            code_copy: raw.code_copy.unwrap_or(defaults.code_copy),
            mermaid: raw.mermaid.unwrap_or(defaults.mermaid),
            anchors: raw.anchors.unwrap_or(defaults.anchors),
        };
    }
}
