//! Application configuration.
//!
//! Configuration is loaded from a TOML file at:
//! 1. `$SQUISHMB_CONFIG` (environment variable)
//! 2. `~/.config/squishmb/config.toml` (Linux/macOS)
//!    `%APPDATA%\squishmb\config.toml` (Windows)
//! 3. Built-in defaults (no areas)

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::area::{AreaKind, SquishArea};
use crate::area::MessageBase;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General behavior settings.
    pub general: GeneralConfig,
    /// The message areas this installation knows about.
    #[serde(rename = "area")]
    pub areas: Vec<AreaConfig>,
}

/// General behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub log_level: String,
    /// Override directory for the log file.
    pub log_dir: Option<PathBuf>,
    /// Default charset label for areas that do not set their own.
    pub charset: Option<String>,
}

/// One message area.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AreaConfig {
    /// Short area name used on the command line.
    pub name: String,
    /// Base path of the file triad (extensions are appended).
    pub path: PathBuf,
    /// Area kind; controls destination addressing.
    #[serde(default)]
    pub kind: AreaKind,
    /// Charset label for this area (e.g. "ibm866").
    pub charset: Option<String>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            log_dir: None,
            charset: None,
        }
    }
}

impl Config {
    /// Find an area by name (case-insensitive).
    pub fn area(&self, name: &str) -> Option<&AreaConfig> {
        self.areas.iter().find(|a| a.name.eq_ignore_ascii_case(name))
    }
}

impl AreaConfig {
    /// Open a handle on this area, applying its charset (or the
    /// installation default).
    pub fn open(&self, config: &Config) -> SquishArea {
        let mut area = SquishArea::new(&self.name, &self.path, self.kind);
        let charset = self.charset.clone().or_else(|| config.general.charset.clone());
        area.set_charset(charset);
        area
    }
}

// ── Load / save ─────────────────────────────────────────────────

/// Load configuration, searching standard locations.
///
/// Returns the default configuration if no file is found or on parse error.
pub fn load_config() -> Config {
    if let Some(path) = config_file_path() {
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(contents) => match toml::from_str::<Config>(&contents) {
                    Ok(cfg) => {
                        tracing::info!(path = %path.display(), "Loaded config");
                        return cfg;
                    }
                    Err(e) => {
                        tracing::warn!(
                            path = %path.display(),
                            error = %e,
                            "Failed to parse config, using defaults"
                        );
                    }
                },
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "Failed to read config file, using defaults"
                    );
                }
            }
        }
    }
    Config::default()
}

/// Determine the config file path (checking env var first, then standard dirs).
pub fn config_file_path() -> Option<PathBuf> {
    // 1. Environment variable override
    if let Ok(env_path) = std::env::var("SQUISHMB_CONFIG") {
        return Some(PathBuf::from(env_path));
    }

    // 2. Standard config directory
    dirs::config_dir().map(|d| d.join("squishmb").join("config.toml"))
}

/// Return the directory for log output.
pub fn log_dir(config: &Config) -> PathBuf {
    if let Some(ref dir) = config.general.log_dir {
        return dir.clone();
    }
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("squishmb")
}
