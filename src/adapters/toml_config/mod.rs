// TOML config adapter - Layered configuration from file, environment and defaults

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::errors::DomainError;
use crate::domain::model::*;
use crate::error::{ClipGrabError, ClipGrabResult};
use crate::utils::logging::{LogLevel, LoggingConfig};
use crate::utils::path::PathUtils;

/// Config file looked up in the working directory
pub const LOCAL_CONFIG_FILE: &str = "clipgrab.toml";
/// Prefix for environment overrides
pub const ENV_PREFIX: &str = "CLIPGRAB_";

/// Complete application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub tools: ToolsConfig,
    pub fetch: FetchConfig,
    pub export: ExportConfig,
    pub logging: LoggingConfig,
}

/// Locations of the external tools
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub yt_dlp: Option<PathBuf>,
    pub ffmpeg: Option<PathBuf>,
    pub ffprobe: Option<PathBuf>,
    /// Directory holding bundled tool binaries
    pub bin_dir: Option<PathBuf>,
}

/// Fetch engine tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub socket_timeout_secs: u64,
    pub kill_grace_secs: u64,
    /// Parent of the per-attempt scratch directories; system temp when unset
    pub scratch_root: Option<PathBuf>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            socket_timeout_secs: 30,
            kill_grace_secs: 3,
            scratch_root: None,
        }
    }
}

impl FetchConfig {
    pub fn kill_grace(&self) -> Duration {
        Duration::from_secs(self.kill_grace_secs)
    }
}

/// Session-wide export defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub codec: Codec,
    pub bitrate_mbps: Option<u32>,
    pub resolution: Resolution,
    pub fps: Option<u32>,
    pub audio: bool,
    pub speed: f64,
    pub output_folder: Option<PathBuf>,
    /// Per-job transcode time budget; unlimited when unset
    pub timeout_secs: Option<u64>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        let defaults = EncodingSettings::default();
        Self {
            codec: defaults.codec,
            bitrate_mbps: defaults.bitrate_mbps,
            resolution: defaults.resolution,
            fps: defaults.fps,
            audio: defaults.audio,
            speed: defaults.speed,
            output_folder: None,
            timeout_secs: None,
        }
    }
}

impl ExportConfig {
    pub fn encoding_defaults(&self) -> EncodingSettings {
        EncodingSettings {
            codec: self.codec,
            bitrate_mbps: self.bitrate_mbps,
            resolution: self.resolution,
            fps: self.fps,
            audio: self.audio,
            speed: self.speed,
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

/// Loads `AppConfig` with precedence environment > file > defaults;
/// CLI flags are applied on top by the caller
pub struct TomlConfigAdapter;

impl TomlConfigAdapter {
    /// Parse a config file
    pub fn load_file(path: &Path) -> ClipGrabResult<AppConfig> {
        let content = std::fs::read_to_string(path).map_err(|e| ClipGrabError::Config {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::parse(&content).map_err(|e| ClipGrabError::Config {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    pub fn parse(content: &str) -> ClipGrabResult<AppConfig> {
        let config: AppConfig = toml::from_str(content)?;
        config.export.encoding_defaults().validate()?;
        Ok(config)
    }

    /// Candidate files in lookup order
    pub fn search_paths(explicit: Option<&Path>) -> Vec<PathBuf> {
        if let Some(path) = explicit {
            return vec![path.to_path_buf()];
        }
        let mut paths = vec![PathBuf::from(LOCAL_CONFIG_FILE)];
        paths.extend(PathUtils::user_config_file("clipgrab"));
        paths
    }

    /// Load the first config file that exists, falling back to defaults.
    /// An explicit path that does not exist is an error.
    pub fn discover(explicit: Option<&Path>) -> ClipGrabResult<(AppConfig, Option<PathBuf>)> {
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(ClipGrabError::Config {
                    path: path.display().to_string(),
                    message: "file does not exist".to_string(),
                });
            }
        }

        for path in Self::search_paths(explicit) {
            if path.is_file() {
                info!(path = %path.display(), "Loading configuration");
                return Ok((Self::load_file(&path)?, Some(path)));
            }
            debug!(path = %path.display(), "No config file here");
        }
        Ok((AppConfig::default(), None))
    }

    /// Apply `CLIPGRAB_*` overrides through `lookup`
    pub fn apply_env<F>(config: &mut AppConfig, lookup: F) -> ClipGrabResult<usize>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| {
            lookup(&format!("{}{}", ENV_PREFIX, name)).filter(|value| !value.trim().is_empty())
        };
        let invalid = |name: &str, message: String| ClipGrabError::Config {
            path: format!("${}{}", ENV_PREFIX, name),
            message,
        };
        let mut applied = 0;

        for (name, slot) in [
            ("YT_DLP", &mut config.tools.yt_dlp),
            ("FFMPEG", &mut config.tools.ffmpeg),
            ("FFPROBE", &mut config.tools.ffprobe),
            ("BIN_DIR", &mut config.tools.bin_dir),
            ("SCRATCH_ROOT", &mut config.fetch.scratch_root),
            ("OUTPUT_FOLDER", &mut config.export.output_folder),
        ] {
            if let Some(value) = var(name) {
                *slot = Some(PathBuf::from(value));
                applied += 1;
            }
        }

        if let Some(value) = var("CODEC") {
            config.export.codec = value
                .parse()
                .map_err(|e: DomainError| invalid("CODEC", e.to_string()))?;
            applied += 1;
        }
        if let Some(value) = var("RESOLUTION") {
            config.export.resolution = value
                .parse()
                .map_err(|e: DomainError| invalid("RESOLUTION", e.to_string()))?;
            applied += 1;
        }
        if let Some(value) = var("LOG_LEVEL") {
            config.logging.level =
                LogLevel::parse(&value).map_err(|e| invalid("LOG_LEVEL", e.to_string()))?;
            applied += 1;
        }
        if let Some(value) = var("SOCKET_TIMEOUT_SECS") {
            config.fetch.socket_timeout_secs = value
                .trim()
                .parse()
                .map_err(|e: std::num::ParseIntError| {
                    invalid("SOCKET_TIMEOUT_SECS", e.to_string())
                })?;
            applied += 1;
        }

        if applied > 0 {
            info!("Applied {} environment variable overrides", applied);
        }
        Ok(applied)
    }

    /// Defaults, then file, then process environment
    pub fn load(explicit: Option<&Path>) -> ClipGrabResult<(AppConfig, Option<PathBuf>)> {
        let (mut config, source) = Self::discover(explicit)?;
        Self::apply_env(&mut config, |name| std::env::var(name).ok())?;
        Ok((config, source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.fetch.socket_timeout_secs, 30);
        assert_eq!(config.fetch.kill_grace(), Duration::from_secs(3));
        assert_eq!(config.export.encoding_defaults(), EncodingSettings::default());
        assert_eq!(config.export.timeout(), None);
    }

    #[test]
    fn test_parse_partial_file() {
        let config = TomlConfigAdapter::parse(
            r#"
            [tools]
            ffmpeg = "/opt/ffmpeg/bin/ffmpeg"

            [export]
            codec = "prores422"
            resolution = "720"
            audio = false
            "#,
        )
        .unwrap();

        assert_eq!(config.tools.ffmpeg, Some(PathBuf::from("/opt/ffmpeg/bin/ffmpeg")));
        assert_eq!(config.export.codec, Codec::ProRes422);
        assert_eq!(config.export.resolution, Resolution::P720);
        assert!(!config.export.audio);
        assert_eq!(config.export.bitrate_mbps, Some(25));
        assert_eq!(config.fetch.kill_grace_secs, 3);
    }

    #[test]
    fn test_parse_rejects_bad_values() {
        assert!(TomlConfigAdapter::parse("[export]\ncodec = \"mpeg2\"").is_err());
        assert!(TomlConfigAdapter::parse("[export]\nspeed = 0.0").is_err());
    }

    #[test]
    fn test_env_overrides_file() {
        let mut config = TomlConfigAdapter::parse("[export]\ncodec = \"h265\"").unwrap();
        let env: HashMap<&str, &str> = [
            ("CLIPGRAB_CODEC", "vp9"),
            ("CLIPGRAB_FFPROBE", "/usr/local/bin/ffprobe"),
            ("CLIPGRAB_LOG_LEVEL", "debug"),
            ("CLIPGRAB_BIN_DIR", ""),
        ]
        .into_iter()
        .collect();

        let applied =
            TomlConfigAdapter::apply_env(&mut config, |name| env.get(name).map(|v| v.to_string()))
                .unwrap();

        assert_eq!(applied, 3);
        assert_eq!(config.export.codec, Codec::Vp9);
        assert_eq!(config.tools.ffprobe, Some(PathBuf::from("/usr/local/bin/ffprobe")));
        assert_eq!(config.logging.level, LogLevel::Debug);
        assert_eq!(config.tools.bin_dir, None);
    }

    #[test]
    fn test_env_rejects_unknown_codec() {
        let mut config = AppConfig::default();
        let result = TomlConfigAdapter::apply_env(&mut config, |name| {
            (name == "CLIPGRAB_CODEC").then(|| "divx".to_string())
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_discover_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "[fetch]\nkill_grace_secs = 1\n").unwrap();

        let (config, source) = TomlConfigAdapter::discover(Some(&path)).unwrap();
        assert_eq!(config.fetch.kill_grace_secs, 1);
        assert_eq!(source, Some(path));

        let missing = dir.path().join("missing.toml");
        assert!(TomlConfigAdapter::discover(Some(&missing)).is_err());
    }
}
