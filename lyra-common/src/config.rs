//! Configuration loading and resolution
//!
//! Configuration file resolution follows this priority order:
//! 1. Explicit path (command-line argument, highest priority)
//! 2. `LYRA_CONFIG` environment variable
//! 3. User config file (`~/.config/lyra/lyra.toml` on Linux)
//! 4. System config file (`/etc/lyra/lyra.toml`, Linux only)
//! 5. Compiled defaults (fallback)
//!
//! A missing or unreadable config file never aborts startup: a warning is
//! logged and compiled defaults are used instead.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "LYRA_CONFIG";

/// Environment variable overriding `logging.level`
pub const LOG_LEVEL_ENV_VAR: &str = "LYRA_LOG_LEVEL";

/// Top-level TOML configuration file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Analysis engine settings (optional)
    #[serde(default)]
    pub analysis: AnalysisSettings,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Include module targets in log lines
    #[serde(default)]
    pub with_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            with_target: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Analysis engine settings
///
/// Raw values as they appear in TOML. The engine validates them when it
/// builds its own configuration, so out-of-range values are reported there.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    /// Maximum accepted input length in characters; longer input is truncated
    pub max_input_chars: usize,
    /// Non-empty line count above which longform segmentation is used
    pub longform_line_threshold: usize,
    /// Lines per inferred block when text carries no boundary markers
    pub block_size: usize,
    /// Maximum deviation of any section BPM from the global estimate
    pub section_bpm_delta: f64,
    /// Section BPM range above which the curve is flagged as fractured
    pub fracture_threshold: f64,
    /// Capacity of the per-request phrase score cache
    pub phrase_cache_capacity: usize,
    /// Engine strategy: "standard" or "legacy_blend"
    pub strategy: String,
    /// Apply genre conflict suggestions to computed (non-explicit) genres
    pub auto_resolve_genre_conflicts: bool,
    /// Translate non-Latin phrases before scoring when a translator is injected
    pub translate_non_latin: bool,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            max_input_chars: 6000,
            longform_line_threshold: 120,
            block_size: 4,
            section_bpm_delta: 5.0,
            fracture_threshold: 6.0,
            phrase_cache_capacity: 256,
            strategy: "standard".to_string(),
            auto_resolve_genre_conflicts: true,
            translate_non_latin: true,
        }
    }
}

/// Where the active configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    CommandLine(PathBuf),
    Environment(PathBuf),
    UserFile(PathBuf),
    SystemFile(PathBuf),
    CompiledDefaults,
}

impl ConfigSource {
    /// Path of the config file, if one was used
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::CommandLine(p) | Self::Environment(p) | Self::UserFile(p) | Self::SystemFile(p) => {
                Some(p)
            }
            Self::CompiledDefaults => None,
        }
    }
}

/// Resolves and loads the Lyra configuration file
#[derive(Debug, Clone, Default)]
pub struct ConfigResolver {
    cli_path: Option<PathBuf>,
    skip_system_paths: bool,
}

impl ConfigResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Explicit config path from the command line (highest priority)
    pub fn with_cli_path(mut self, path: Option<PathBuf>) -> Self {
        self.cli_path = path;
        self
    }

    /// Ignore user and system config files (used by tests and embedders)
    pub fn without_system_paths(mut self) -> Self {
        self.skip_system_paths = true;
        self
    }

    /// Determine which config source applies
    pub fn resolve_source(&self) -> ConfigSource {
        // Priority 1: Command-line argument
        if let Some(path) = &self.cli_path {
            return ConfigSource::CommandLine(path.clone());
        }

        // Priority 2: Environment variable
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            if !path.trim().is_empty() {
                return ConfigSource::Environment(PathBuf::from(path));
            }
        }

        if !self.skip_system_paths {
            // Priority 3: User config file
            if let Some(path) = user_config_path() {
                if path.exists() {
                    return ConfigSource::UserFile(path);
                }
            }

            // Priority 4: System config file
            if cfg!(target_os = "linux") {
                let system = PathBuf::from("/etc/lyra/lyra.toml");
                if system.exists() {
                    return ConfigSource::SystemFile(system);
                }
            }
        }

        // Priority 5: Compiled defaults
        ConfigSource::CompiledDefaults
    }

    /// Load configuration with graceful degradation
    ///
    /// Never fails: unreadable or invalid files produce a warning and the
    /// compiled defaults. `LYRA_LOG_LEVEL` is applied last.
    pub fn load(&self) -> (TomlConfig, ConfigSource) {
        let source = self.resolve_source();

        let mut config = match source.path() {
            Some(path) => match load_from_path(path) {
                Ok(config) => {
                    info!("Loaded configuration from {}", path.display());
                    config
                }
                Err(e) => {
                    warn!("{} - using compiled defaults", e);
                    TomlConfig::default()
                }
            },
            None => {
                debug!("No config file found, using compiled defaults");
                TomlConfig::default()
            }
        };

        apply_env_overrides(&mut config);
        (config, source)
    }
}

/// Read and parse a TOML config file
pub fn load_from_path(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    parse_config(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
}

/// Parse TOML config text
pub fn parse_config(content: &str) -> Result<TomlConfig> {
    toml::from_str(content).map_err(|e| Error::Config(e.to_string()))
}

fn apply_env_overrides(config: &mut TomlConfig) {
    if let Ok(level) = std::env::var(LOG_LEVEL_ENV_VAR) {
        let level = level.trim().to_lowercase();
        if !level.is_empty() {
            debug!("Log level overridden by {}: {}", LOG_LEVEL_ENV_VAR, level);
            config.logging.level = level;
        }
    }
}

/// Get the per-user config file path for the platform
fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("lyra").join("lyra.toml"))
}
