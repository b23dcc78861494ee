//! User configuration for glreview.
//!
//! Read from `$XDG_CONFIG_HOME/glreview/config.toml` (or
//! `~/.config/glreview/config.toml`). Every key is optional; a missing or
//! unparsable file falls back to defaults and never aborts startup.

use serde::Deserialize;

/// Settings read from `config.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Max level for log output on stderr: `error`, `warn`, `info`, `debug`, `trace`.
    pub log_level: String,
    /// Context lines around each change when diffing local files.
    pub context_lines: usize,
    /// Project id used for review ids of local files.
    pub project_id: u64,
    /// Merge request iid used for review ids of local files.
    pub mr_id: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            context_lines: 3,
            project_id: 0,
            mr_id: 0,
        }
    }
}

impl Config {
    /// Max tracing level, `INFO` when `log_level` is not a level name.
    pub fn level(&self) -> tracing::Level {
        self.log_level.parse().unwrap_or(tracing::Level::INFO)
    }
}

/// Returns the path to the glreview config file.
///
/// Prefers `$XDG_CONFIG_HOME/glreview/config.toml`; falls back to
/// `~/.config/glreview/config.toml` when the env var is absent.
pub fn config_path() -> std::path::PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .ok()
        .map(std::path::PathBuf::from)
        .or_else(|| {
            std::env::var("HOME")
                .ok()
                .map(|h| std::path::PathBuf::from(h).join(".config"))
        })
        .unwrap_or_else(|| std::path::PathBuf::from(".config"));
    base.join("glreview").join("config.toml")
}

/// Loads the config file, falling back to defaults.
///
/// Runs before logging is set up, so parse errors go to stderr directly.
pub fn load() -> Config {
    let path = config_path();
    let raw = match std::fs::read_to_string(&path) {
        Ok(s) => s,
        Err(_) => return Config::default(),
    };
    parse(&raw).unwrap_or_else(|e| {
        eprintln!("glreview: config parse error in {:?}: {}", path, e);
        Config::default()
    })
}

pub fn parse(raw: &str) -> Result<Config, toml::de::Error> {
    toml::from_str(raw)
}
