//! Configuration management for puml.
//!
//! Parses `puml.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! `renderer.executable` supports environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//! - a bare `$` is kept as written

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override renderer executable.
    pub executable: Option<String>,
    /// Override output directory.
    pub output_dir: Option<PathBuf>,
    /// Override renderer timeout in seconds.
    pub timeout_secs: Option<u64>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "puml.toml";

/// Upper bound for `renderer.timeout_secs`.
const MAX_TIMEOUT_SECS: u64 = 3600;

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// External renderer configuration.
    pub renderer: RendererConfig,
    /// Output configuration (paths are relative strings from TOML).
    output: OutputConfigRaw,

    /// Resolved output configuration (set after loading).
    #[serde(skip)]
    pub output_resolved: OutputConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// External renderer configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// Renderer command. Split on whitespace, so it may carry arguments
    /// (e.g. `java -jar plantuml.jar`).
    pub executable: String,
    /// Image format requested for LaTeX output (`-t<format>`).
    pub latex_format: String,
    /// Image format requested for HTML output (`-t<format>`).
    pub html_format: String,
    /// Seconds to wait for the renderer before killing it.
    pub timeout_secs: u64,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            executable: "plantuml".to_owned(),
            latex_format: "eps".to_owned(),
            html_format: "png".to_owned(),
            timeout_secs: 60,
        }
    }
}

impl RendererConfig {
    /// Renderer timeout as a [`Duration`].
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Raw output configuration as parsed from TOML (paths as strings).
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct OutputConfigRaw {
    dir: Option<String>,
    images_dir: Option<String>,
}

/// Resolved output configuration with absolute paths.
#[derive(Debug, Default)]
pub struct OutputConfig {
    /// Directory receiving rewritten documents.
    pub dir: PathBuf,
    /// Directory receiving rendered images (inside `dir`).
    pub images_dir: PathBuf,
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
        /// Config field path (e.g., "`renderer.executable`").
        field: String,
        /// Error message (e.g., "${`PLANTUML_JAR`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require an image format to be a bare extension such as `png`.
fn require_format(value: &str, field: &str) -> Result<(), ConfigError> {
    require_non_empty(value, field)?;
    if !value.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ConfigError::Validation(format!(
            "{field} must contain only ASCII letters and digits, got '{value}'"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `puml.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails, or
    /// the settings are invalid.
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
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(executable) = &settings.executable {
            self.renderer.executable.clone_from(executable);
        }
        if let Some(timeout_secs) = settings.timeout_secs {
            self.renderer.timeout_secs = timeout_secs;
        }
        if let Some(output_dir) = &settings.output_dir {
            let images_rel = self
                .output
                .images_dir
                .clone()
                .unwrap_or_else(|| "_images".to_owned());
            self.output_resolved = OutputConfig {
                dir: output_dir.clone(),
                images_dir: output_dir.join(images_rel),
            };
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
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

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            renderer: RendererConfig::default(),
            output: OutputConfigRaw::default(),
            output_resolved: OutputConfig {
                dir: base.join("_build"),
                images_dir: base.join("_build").join("_images"),
            },
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir)?;
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading from file and after CLI overrides.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_renderer()?;
        Ok(())
    }

    /// Validate renderer configuration.
    fn validate_renderer(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.renderer.executable, "renderer.executable")?;
        require_format(&self.renderer.latex_format, "renderer.latex_format")?;
        require_format(&self.renderer.html_format, "renderer.html_format")?;

        let timeout = self.renderer.timeout_secs;
        if timeout == 0 {
            return Err(ConfigError::Validation(
                "renderer.timeout_secs must be greater than 0".to_owned(),
            ));
        }
        if timeout > MAX_TIMEOUT_SECS {
            return Err(ConfigError::Validation(format!(
                "renderer.timeout_secs cannot exceed {MAX_TIMEOUT_SECS}"
            )));
        }

        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.renderer.executable =
            expand::expand_env(&self.renderer.executable, "renderer.executable")?;
        Ok(())
    }

    /// Resolve relative paths to absolute paths based on config directory.
    ///
    /// Rejects an absolute `output.images_dir`: images must live inside the
    /// output directory so documents can reference them relatively.
    fn resolve_paths(&mut self, config_dir: &Path) -> Result<(), ConfigError> {
        let dir = config_dir.join(self.output.dir.as_deref().unwrap_or("_build"));
        let images_rel = self.output.images_dir.as_deref().unwrap_or("_images");
        if Path::new(images_rel).is_absolute() {
            return Err(ConfigError::Validation(
                "output.images_dir must be relative to output.dir".to_owned(),
            ));
        }

        self.output_resolved = OutputConfig {
            images_dir: dir.join(images_rel),
            dir,
        };

        Ok(())
    }
}
