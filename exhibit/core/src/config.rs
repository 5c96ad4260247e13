//! TOML Configuration File Support
//!
//! Configuration is read from `~/.config/zoo-exhibit/config.toml`.
//!
//! # Configuration Priority
//!
//! Values are loaded with the following priority (highest first):
//! 1. CLI arguments ([`ConfigOverrides`])
//! 2. Environment variables
//! 3. TOML configuration file
//! 4. Default values
//!
//! # Example Configuration
//!
//! ```toml
//! [backend]
//! kind = "gemini"
//! model = "gemini-2.5-flash"
//! api_key = "..."
//! temperature = 0.9
//!
//! [generation]
//! timeout_secs = 60
//! max_field_chars = 200
//!
//! [export]
//! directory = "/home/me/Pictures"
//! timeout_secs = 30
//! cell_width = 10
//! cell_height = 20
//! font_size = 16.0
//! ```

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::backend::BackendConfig;

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur when loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file at {path}: {source}")]
    ReadError {
        /// The path that was attempted
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("Failed to parse TOML config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

// =============================================================================
// Configuration Source Tracking
// =============================================================================

/// Tracks where a configuration value came from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Value from command-line argument
    Cli,
    /// Value from environment variable
    Env,
    /// Value from TOML configuration file
    File,
    /// Default value
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cli => write!(f, "CLI"),
            Self::Env => write!(f, "environment"),
            Self::File => write!(f, "config file"),
            Self::Default => write!(f, "default"),
        }
    }
}

// =============================================================================
// Backend Selection
// =============================================================================

/// Which LLM service answers generation requests
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Local Ollama server
    #[default]
    Ollama,
    /// Google Gemini API
    Gemini,
}

impl BackendKind {
    /// Model used when none is configured
    #[must_use]
    pub fn default_model(self) -> &'static str {
        match self {
            Self::Ollama => "llama3.2",
            Self::Gemini => "gemini-2.5-flash",
        }
    }
}

impl FromStr for BackendKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ollama" => Ok(Self::Ollama),
            "gemini" => Ok(Self::Gemini),
            other => Err(ConfigError::ValidationError(format!(
                "unknown backend '{other}' (expected 'ollama' or 'gemini')"
            ))),
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ollama => write!(f, "ollama"),
            Self::Gemini => write!(f, "gemini"),
        }
    }
}

// =============================================================================
// TOML Configuration Structures
// =============================================================================

/// Backend section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendToml {
    /// `ollama` or `gemini`
    pub kind: Option<BackendKind>,

    /// Ollama host
    pub host: Option<String>,

    /// Ollama port
    pub port: Option<u16>,

    /// Model name
    pub model: Option<String>,

    /// Gemini API key
    pub api_key: Option<String>,

    /// Gemini base URL
    pub base_url: Option<String>,

    /// Sampling temperature
    pub temperature: Option<f32>,
}

/// Generation section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationToml {
    /// Seconds to wait for a signboard before failing
    pub timeout_secs: Option<u64>,

    /// Maximum characters per input field
    pub max_field_chars: Option<usize>,
}

/// Export section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportToml {
    /// Directory PNG files are written to
    pub directory: Option<PathBuf>,

    /// Seconds to wait for an export before reporting failure
    pub timeout_secs: Option<u64>,

    /// Pixel width of one terminal cell
    pub cell_width: Option<u32>,

    /// Pixel height of one terminal cell
    pub cell_height: Option<u32>,

    /// Font size in pixels
    pub font_size: Option<f32>,
}

/// Top-level TOML configuration structure
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExhibitToml {
    /// Backend configuration section
    pub backend: BackendToml,

    /// Generation configuration section
    pub generation: GenerationToml,

    /// Export configuration section
    pub export: ExportToml,
}

// =============================================================================
// Main Configuration Struct
// =============================================================================

/// Resolved configuration for the exhibit creator
#[derive(Clone, Debug)]
pub struct ExhibitConfig {
    /// Which backend to talk to
    pub backend_kind: BackendKind,

    /// Ollama host
    pub ollama_host: String,

    /// Ollama port
    pub ollama_port: u16,

    /// Gemini API key
    pub gemini_api_key: Option<String>,

    /// Gemini base URL override
    pub gemini_base_url: Option<String>,

    /// Explicit model name
    pub model: Option<String>,

    /// Sampling temperature
    pub temperature: f32,

    /// Upper bound on one generation request
    pub generation_timeout: Duration,

    /// Maximum characters per input field
    pub max_field_chars: usize,

    /// Where exported images go (`None` = downloads directory)
    pub export_directory: Option<PathBuf>,

    /// Upper bound on one export
    pub export_timeout: Duration,

    /// Pixel width of one terminal cell in exported images
    pub cell_width: u32,

    /// Pixel height of one terminal cell in exported images
    pub cell_height: u32,

    /// Font size in exported images
    pub font_size: f32,

    /// Path to the config file that was loaded (if any)
    pub config_file_path: Option<PathBuf>,

    source: ConfigSource,
}

impl Default for ExhibitConfig {
    fn default() -> Self {
        Self {
            backend_kind: BackendKind::default(),
            ollama_host: "localhost".to_string(),
            ollama_port: 11434,
            gemini_api_key: None,
            gemini_base_url: None,
            model: None,
            temperature: 0.9,
            generation_timeout: Duration::from_secs(60),
            max_field_chars: 200,
            export_directory: None,
            export_timeout: Duration::from_secs(30),
            cell_width: 10,
            cell_height: 20,
            font_size: 16.0,
            config_file_path: None,
            source: ConfigSource::Default,
        }
    }
}

impl ExhibitConfig {
    /// Create a new configuration with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the primary source of this configuration
    #[must_use]
    pub fn source(&self) -> ConfigSource {
        self.source
    }

    /// Set the configuration source
    pub fn set_source(&mut self, source: ConfigSource) {
        self.source = source;
    }

    /// Model to request, falling back to the backend's default
    #[must_use]
    pub fn model_name(&self) -> &str {
        self.model
            .as_deref()
            .unwrap_or_else(|| self.backend_kind.default_model())
    }

    /// Connection settings for the selected backend
    ///
    /// # Errors
    ///
    /// Returns a validation error when Gemini is selected without an API key.
    pub fn backend_config(&self) -> Result<BackendConfig, ConfigError> {
        match self.backend_kind {
            BackendKind::Ollama => Ok(BackendConfig::ollama(
                self.ollama_host.clone(),
                self.ollama_port,
            )),
            BackendKind::Gemini => {
                let api_key = self
                    .gemini_api_key
                    .as_deref()
                    .filter(|k| !k.trim().is_empty())
                    .ok_or_else(|| {
                        ConfigError::ValidationError(
                            "gemini backend needs an API key (GEMINI_API_KEY)".to_string(),
                        )
                    })?;
                Ok(BackendConfig::Gemini {
                    api_key: api_key.to_string(),
                    base_url: self.gemini_base_url.clone(),
                })
            }
        }
    }

    /// Check value ranges
    ///
    /// # Errors
    ///
    /// Returns the first value that is out of range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.generation_timeout.is_zero() {
            return Err(ConfigError::ValidationError(
                "generation timeout must be positive".to_string(),
            ));
        }
        if self.export_timeout.is_zero() {
            return Err(ConfigError::ValidationError(
                "export timeout must be positive".to_string(),
            ));
        }
        if self.max_field_chars == 0 {
            return Err(ConfigError::ValidationError(
                "max_field_chars must be positive".to_string(),
            ));
        }
        if self.cell_width == 0 || self.cell_height == 0 {
            return Err(ConfigError::ValidationError(
                "export cell size must be positive".to_string(),
            ));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::ValidationError(format!(
                "temperature {} outside 0.0..=2.0",
                self.temperature
            )));
        }
        Ok(())
    }
}

// =============================================================================
// Configuration Loading
// =============================================================================

/// Get the default configuration file path
///
/// Returns `$XDG_CONFIG_HOME/zoo-exhibit/config.toml` or
/// `~/.config/zoo-exhibit/config.toml` if `XDG_CONFIG_HOME` is not set.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("zoo-exhibit").join("config.toml"))
}

/// Load configuration from all sources with proper priority
///
/// CLI overrides are not handled here; apply [`ConfigOverrides`] afterwards.
///
/// # Errors
///
/// Returns an error if the config file exists but cannot be parsed.
/// A missing config file is not an error (defaults are used).
pub fn load_config() -> Result<ExhibitConfig, ConfigError> {
    load_config_from_path(default_config_path())
}

/// Load configuration from a specific path
///
/// # Errors
///
/// Returns an error if the specified config file cannot be read or parsed.
pub fn load_config_from_path(path: Option<PathBuf>) -> Result<ExhibitConfig, ConfigError> {
    let mut config = ExhibitConfig::default();

    if let Some(ref config_path) = path {
        if config_path.exists() {
            let toml_content =
                std::fs::read_to_string(config_path).map_err(|e| ConfigError::ReadError {
                    path: config_path.clone(),
                    source: e,
                })?;

            let toml_config: ExhibitToml = toml::from_str(&toml_content)?;
            apply_toml_config(&mut config, &toml_config);
            config.config_file_path = Some(config_path.clone());
            config.source = ConfigSource::File;

            tracing::info!(
                path = %config_path.display(),
                "Loaded configuration from file"
            );
        } else {
            tracing::debug!(
                path = %config_path.display(),
                "Config file not found, using defaults"
            );
        }
    }

    apply_env_config(&mut config)?;

    Ok(config)
}

fn apply_toml_config(config: &mut ExhibitConfig, toml: &ExhibitToml) {
    // Backend
    if let Some(kind) = toml.backend.kind {
        config.backend_kind = kind;
    }
    if let Some(ref host) = toml.backend.host {
        config.ollama_host = host.clone();
    }
    if let Some(port) = toml.backend.port {
        config.ollama_port = port;
    }
    if toml.backend.model.is_some() {
        config.model = toml.backend.model.clone();
    }
    if toml.backend.api_key.is_some() {
        config.gemini_api_key = toml.backend.api_key.clone();
    }
    if toml.backend.base_url.is_some() {
        config.gemini_base_url = toml.backend.base_url.clone();
    }
    if let Some(temperature) = toml.backend.temperature {
        config.temperature = temperature;
    }

    // Generation
    if let Some(secs) = toml.generation.timeout_secs {
        config.generation_timeout = Duration::from_secs(secs);
    }
    if let Some(max) = toml.generation.max_field_chars {
        config.max_field_chars = max;
    }

    // Export
    if toml.export.directory.is_some() {
        config.export_directory = toml.export.directory.clone();
    }
    if let Some(secs) = toml.export.timeout_secs {
        config.export_timeout = Duration::from_secs(secs);
    }
    if let Some(w) = toml.export.cell_width {
        config.cell_width = w;
    }
    if let Some(h) = toml.export.cell_height {
        config.cell_height = h;
    }
    if let Some(size) = toml.export.font_size {
        config.font_size = size;
    }
}

fn apply_env_config(config: &mut ExhibitConfig) -> Result<(), ConfigError> {
    if let Ok(kind) = std::env::var("ZOO_EXHIBIT_BACKEND") {
        config.backend_kind = kind.parse()?;
        config.source = ConfigSource::Env;
    }
    if let Ok(model) = std::env::var("ZOO_EXHIBIT_MODEL") {
        config.model = Some(model);
        config.source = ConfigSource::Env;
    }
    if let Ok(host) = std::env::var("OLLAMA_HOST") {
        config.ollama_host = host;
        config.source = ConfigSource::Env;
    }
    if let Ok(port) = std::env::var("OLLAMA_PORT") {
        if let Ok(p) = port.parse::<u16>() {
            config.ollama_port = p;
            config.source = ConfigSource::Env;
        }
    }
    if let Ok(key) = std::env::var("GEMINI_API_KEY") {
        config.gemini_api_key = Some(key);
        config.source = ConfigSource::Env;
    }
    if let Ok(timeout) = std::env::var("ZOO_EXHIBIT_GENERATION_TIMEOUT") {
        if let Ok(secs) = timeout.parse::<u64>() {
            config.generation_timeout = Duration::from_secs(secs);
            config.source = ConfigSource::Env;
        }
    }
    if let Ok(dir) = std::env::var("ZOO_EXHIBIT_EXPORT_DIR") {
        config.export_directory = Some(PathBuf::from(dir));
        config.source = ConfigSource::Env;
    }
    Ok(())
}

// =============================================================================
// CLI Override Support
// =============================================================================

/// Builder for applying CLI overrides to configuration
///
/// Use this after [`load_config`] to apply command-line argument overrides.
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    /// Backend override
    pub backend_kind: Option<BackendKind>,

    /// Model override
    pub model: Option<String>,

    /// Export directory override
    pub export_directory: Option<PathBuf>,

    /// Generation timeout override (seconds)
    pub generation_timeout_secs: Option<u64>,
}

impl ConfigOverrides {
    /// Create a new empty set of overrides
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set backend override
    #[must_use]
    pub fn with_backend_kind(mut self, kind: BackendKind) -> Self {
        self.backend_kind = Some(kind);
        self
    }

    /// Set model override
    #[must_use]
    pub fn with_model(mut self, model: String) -> Self {
        self.model = Some(model);
        self
    }

    /// Set export directory override
    #[must_use]
    pub fn with_export_directory(mut self, dir: PathBuf) -> Self {
        self.export_directory = Some(dir);
        self
    }

    /// Set generation timeout override
    #[must_use]
    pub fn with_generation_timeout_secs(mut self, secs: u64) -> Self {
        self.generation_timeout_secs = Some(secs);
        self
    }

    /// Apply overrides to a configuration
    pub fn apply(&self, config: &mut ExhibitConfig) {
        if self.backend_kind.is_some()
            || self.model.is_some()
            || self.export_directory.is_some()
            || self.generation_timeout_secs.is_some()
        {
            config.source = ConfigSource::Cli;
        }

        if let Some(kind) = self.backend_kind {
            config.backend_kind = kind;
        }
        if let Some(ref model) = self.model {
            config.model = Some(model.clone());
        }
        if let Some(ref dir) = self.export_directory {
            config.export_directory = Some(dir.clone());
        }
        if let Some(secs) = self.generation_timeout_secs {
            config.generation_timeout = Duration::from_secs(secs);
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
