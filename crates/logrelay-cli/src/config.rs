//! File-backed configuration.
//!
//! Reads `~/.config/logrelay/config.toml` (XDG-resolved, or an explicit
//! `--config` path), creating a default file on first run if none exists.
//! The parsed [`FileConfig`] is then converted into the core's validated
//! [`logrelay_core::EngineConfig`].

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use logrelay_core::config::{EngineConfig, TargetSpec};
use serde::{Deserialize, Serialize};

/// One target as read from the TOML `[[targets]]` array.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileTarget {
    /// Stable identifier, unique among configured targets.
    pub name: String,
    /// URL the transport adapter sends to.
    pub url: String,
    /// Configured weight; zero means never selected.
    pub weight: f64,
}

/// The on-disk configuration shape, matching the engine's target list
/// one-for-one. Durations are stored in seconds to keep the TOML human
/// editable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileConfig {
    /// Size of the worker pool.
    pub workers: usize,
    /// Intake buffer capacity.
    pub capacity: usize,
    /// Additional attempts after the first.
    pub retries: u32,
    /// First backoff interval, in seconds.
    pub base_delay_secs: f64,
    /// Per-attempt transport send timeout, in seconds.
    pub send_timeout_secs: f64,
    /// Health monitor tick period, in seconds.
    pub health_interval_secs: f64,
    /// Per-probe transport timeout, in seconds.
    pub probe_timeout_secs: f64,
    /// Configured downstream analyzer targets.
    pub targets: Vec<FileTarget>,
}

impl Default for FileConfig {
    fn default() -> Self {
        let defaults = EngineConfig::default();
        Self {
            workers: defaults.workers,
            capacity: defaults.capacity,
            retries: defaults.retries,
            base_delay_secs: defaults.base_delay.as_secs_f64(),
            send_timeout_secs: defaults.send_timeout.as_secs_f64(),
            health_interval_secs: defaults.health_interval.as_secs_f64(),
            probe_timeout_secs: defaults.probe_timeout.as_secs_f64(),
            targets: Vec::new(),
        }
    }
}

impl FileConfig {
    /// Converts the parsed file config into the core's validated
    /// `EngineConfig`. Parse/validation failures surface through the same
    /// `ConfigError` the core would otherwise reject a directly-constructed
    /// config with.
    pub fn into_engine_config(self) -> Result<EngineConfig> {
        let config = EngineConfig {
            workers: self.workers,
            capacity: self.capacity,
            retries: self.retries,
            base_delay: Duration::from_secs_f64(self.base_delay_secs),
            send_timeout: Duration::from_secs_f64(self.send_timeout_secs),
            health_interval: Duration::from_secs_f64(self.health_interval_secs),
            probe_timeout: Duration::from_secs_f64(self.probe_timeout_secs),
            targets: self
                .targets
                .into_iter()
                .map(|t| TargetSpec { name: t.name, url: t.url, weight: t.weight })
                .collect(),
        };
        config.validate().context("invalid configuration")?;
        Ok(config)
    }
}

/// Resolves the default config file path under the XDG config home.
pub fn default_config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("logrelay")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Loads configuration from `path`, or from the default XDG path when
/// `path` is `None`. Creates a default file at that location if none
/// exists.
pub fn load_or_init(path: Option<&Path>) -> Result<FileConfig> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => default_config_path()?,
    };

    if !path.exists() {
        let default_cfg = FileConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!(path = %path.display(), "created default config; add targets before running");
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path).with_context(|| format!("reading config at {}", path.display()))?;
    let cfg: FileConfig = toml::from_str(&data).with_context(|| format!("parsing config at {}", path.display()))?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_file_config_matches_engine_defaults() {
        let file_cfg = FileConfig::default();
        assert_eq!(file_cfg.workers, 10);
        assert_eq!(file_cfg.retries, 2);
        assert!(file_cfg.targets.is_empty());
    }

    #[test]
    fn toml_roundtrip_preserves_targets() {
        let mut file_cfg = FileConfig::default();
        file_cfg.targets.push(FileTarget { name: "a".into(), url: "http://a".into(), weight: 0.6 });
        file_cfg.targets.push(FileTarget { name: "b".into(), url: "http://b".into(), weight: 0.4 });

        let toml = toml::to_string_pretty(&file_cfg).unwrap();
        let parsed: FileConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.targets.len(), 2);
        assert_eq!(parsed.targets[0].name, "a");
        assert_eq!(parsed.targets[1].weight, 0.4);
    }

    #[test]
    fn into_engine_config_rejects_empty_targets() {
        let file_cfg = FileConfig::default();
        assert!(file_cfg.into_engine_config().is_err());
    }

    #[test]
    fn into_engine_config_converts_seconds_to_durations() {
        let mut file_cfg = FileConfig::default();
        file_cfg.targets.push(FileTarget { name: "a".into(), url: "http://a".into(), weight: 1.0 });
        file_cfg.base_delay_secs = 0.5;

        let cfg = file_cfg.into_engine_config().unwrap();
        assert_eq!(cfg.base_delay, Duration::from_millis(500));
    }
}
