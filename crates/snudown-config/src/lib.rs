//! Configuration management for snudown.
//!
//! Parses `snudown.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ```toml
//! [render]
//! mode = "wiki"
//! nofollow = true
//! target = "_blank"
//! toc = true
//! toc_id_prefix = "x-"
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use snudown::{Mode, RenderRequest};

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override rendering mode.
    pub mode: Option<Mode>,
    /// Override nofollow flag.
    pub nofollow: Option<bool>,
    /// Override link target.
    pub target: Option<String>,
    /// Override table of contents flag.
    pub toc: Option<bool>,
    /// Override heading anchor prefix.
    pub toc_id_prefix: Option<String>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "snudown.toml";

/// Characters not allowed in values written into HTML attributes.
const FORBIDDEN_ATTRIBUTE_CHARS: &[char] = &['"', '\'', '<', '>'];

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Rendering configuration.
    pub render: RenderConfig,

    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Rendering configuration.
#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    /// Moderation mode.
    pub mode: Mode,
    /// Add `rel="nofollow"` to links.
    pub nofollow: bool,
    /// `target` attribute for links.
    pub target: Option<String>,
    /// Prepend a table of contents.
    pub toc: bool,
    /// Prefix for heading anchors.
    pub toc_id_prefix: Option<String>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            mode: Mode::PlainText,
            nofollow: false,
            target: None,
            toc: false,
            toc_id_prefix: None,
        }
    }
}

impl RenderConfig {
    /// Render request borrowing this configuration.
    #[must_use]
    pub fn request(&self) -> RenderRequest<'_> {
        RenderRequest {
            nofollow: self.nofollow,
            link_target: self.target.as_deref(),
            toc_id_prefix: self.toc_id_prefix.as_deref(),
            enable_toc: self.toc,
        }
    }

    /// Validate rendering configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if `target` or `toc_id_prefix` is
    /// empty or contains whitespace, quotes or angle brackets.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(target) = &self.target {
            require_attribute_value(target, "render.target")?;
        }
        if let Some(prefix) = &self.toc_id_prefix {
            require_attribute_value(prefix, "render.toc_id_prefix")?;
        }
        Ok(())
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
}

/// Require a value that is safe to place inside an HTML attribute.
fn require_attribute_value(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    if value
        .chars()
        .any(|c| c.is_whitespace() || FORBIDDEN_ATTRIBUTE_CHARS.contains(&c))
    {
        return Err(ConfigError::Validation(format!(
            "{field} must not contain whitespace, quotes or angle brackets"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `snudown.toml` in current directory and parents,
    /// falling back to defaults when none is found.
    ///
    /// CLI settings are applied after loading, and the merged result is
    /// validated.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails
    /// or a value is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let discovered = match config_path {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::NotFound(path.to_path_buf()));
                }
                Some(path.to_path_buf())
            }
            None => std::env::current_dir()
                .ok()
                .and_then(|cwd| discover_config(&cwd)),
        };

        let mut config = match discovered {
            Some(path) => Self::load_from_file(&path)?,
            None => Self::default(),
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }
        config.render.validate()?;

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(mode) = settings.mode {
            self.render.mode = mode;
        }
        if let Some(nofollow) = settings.nofollow {
            self.render.nofollow = nofollow;
        }
        if let Some(target) = &settings.target {
            self.render.target = Some(target.clone());
        }
        if let Some(toc) = settings.toc {
            self.render.toc = toc;
        }
        if let Some(prefix) = &settings.toc_id_prefix {
            self.render.toc_id_prefix = Some(prefix.clone());
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;
        config.config_path = Some(path.to_path_buf());
        Ok(config)
    }
}

/// Search for a config file in `start` and its parents.
fn discover_config(start: &Path) -> Option<PathBuf> {
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
