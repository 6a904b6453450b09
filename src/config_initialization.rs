//! Configuration initialization and hierarchy management

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::info;

use crate::adapters::{AppConfig, TomlConfigAdapter};
use crate::cli::{Cli, Commands};
use crate::utils::logging::LogLevel;

/// Resolved configuration plus where it came from
#[derive(Debug, Clone)]
pub struct LoadedConfiguration {
    pub config: AppConfig,
    pub file: Option<PathBuf>,
    pub env_overrides: usize,
    pub cli_overrides: usize,
}

/// Initialize configuration hierarchy following precedence: CLI > Env > File > Defaults
pub fn initialize_configuration_hierarchy(cli: &Cli) -> Result<LoadedConfiguration> {
    initialize_with_env(cli, |name| std::env::var(name).ok())
}

/// Same as [`initialize_configuration_hierarchy`] with an injectable environment
pub fn initialize_with_env<F>(cli: &Cli, lookup: F) -> Result<LoadedConfiguration>
where
    F: Fn(&str) -> Option<String>,
{
    let (mut config, file) =
        TomlConfigAdapter::discover(cli.config.as_deref()).context("Failed to load configuration")?;
    let env_overrides = TomlConfigAdapter::apply_env(&mut config, lookup)
        .context("Invalid environment configuration")?;
    let cli_overrides = apply_cli_configuration_overrides(&mut config, cli)?;

    Ok(LoadedConfiguration {
        config,
        file,
        env_overrides,
        cli_overrides,
    })
}

/// Apply CLI argument overrides to configuration
pub fn apply_cli_configuration_overrides(config: &mut AppConfig, cli: &Cli) -> Result<usize> {
    let mut cli_overrides = 0;

    if let Some(level) = &cli.log_level {
        config.logging.level = LogLevel::parse(level)?;
        cli_overrides += 1;
    }

    for (value, slot) in [
        (&cli.yt_dlp, &mut config.tools.yt_dlp),
        (&cli.ffmpeg, &mut config.tools.ffmpeg),
        (&cli.ffprobe, &mut config.tools.ffprobe),
        (&cli.scratch_root, &mut config.fetch.scratch_root),
    ] {
        if let Some(path) = value {
            *slot = Some(path.clone());
            cli_overrides += 1;
        }
    }

    match &cli.command {
        Commands::Fetch(args) => {
            if let Some(secs) = args.socket_timeout {
                config.fetch.socket_timeout_secs = secs;
                cli_overrides += 1;
            }
        }
        Commands::Export(args) => {
            if let Some(folder) = &args.output_folder {
                config.export.output_folder = Some(folder.clone());
                cli_overrides += 1;
            }
            if let Some(codec) = args.codec {
                config.export.codec = codec;
                cli_overrides += 1;
            }
            if let Some(bitrate) = args.bitrate {
                config.export.bitrate_mbps = Some(bitrate);
                cli_overrides += 1;
            }
            if let Some(resolution) = args.resolution {
                config.export.resolution = resolution;
                cli_overrides += 1;
            }
            if let Some(timeout) = args.timeout {
                config.export.timeout_secs = Some(timeout);
                cli_overrides += 1;
            }
        }
        Commands::Probe(_) | Commands::Strategies(_) => {}
    }

    if cli_overrides > 0 {
        info!("Applied {} CLI configuration overrides", cli_overrides);
    }
    Ok(cli_overrides)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Codec;
    use clap::Parser;
    use std::collections::HashMap;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_cli_beats_env_beats_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("clipgrab.toml");
        std::fs::write(
            &file,
            "[export]\ncodec = \"h265\"\nresolution = \"720\"\n\n[tools]\nffmpeg = \"/file/ffmpeg\"\n",
        )
        .unwrap();
        let config_arg = file.to_string_lossy().into_owned();

        let env: HashMap<String, String> = [
            ("CLIPGRAB_CODEC", "vp9"),
            ("CLIPGRAB_FFMPEG", "/env/ffmpeg"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let cli = parse(&[
            "clipgrab",
            "--config",
            &config_arg,
            "export",
            "--source",
            "in.mp4",
            "--queue",
            "q.toml",
            "--codec",
            "dnxhd",
        ]);
        let loaded = initialize_with_env(&cli, |name| env.get(name).cloned()).unwrap();

        assert_eq!(loaded.file.as_deref(), Some(file.as_path()));
        assert_eq!(loaded.config.export.codec, Codec::Dnxhd);
        assert_eq!(loaded.config.tools.ffmpeg, Some(PathBuf::from("/env/ffmpeg")));
        assert_eq!(loaded.config.export.resolution.key(), "720");
        assert_eq!(loaded.env_overrides, 2);
        assert_eq!(loaded.cli_overrides, 1);
    }

    #[test]
    fn test_global_tool_flags_and_log_level() {
        let cli = parse(&[
            "clipgrab",
            "--log-level",
            "debug",
            "--ffprobe",
            "/cli/ffprobe",
            "--scratch-root",
            "/scratch",
            "probe",
            "in.mp4",
        ]);
        let mut config = AppConfig::default();
        let applied = apply_cli_configuration_overrides(&mut config, &cli).unwrap();

        assert_eq!(applied, 3);
        assert_eq!(config.logging.level, LogLevel::Debug);
        assert_eq!(config.tools.ffprobe, Some(PathBuf::from("/cli/ffprobe")));
        assert_eq!(config.fetch.scratch_root, Some(PathBuf::from("/scratch")));
    }

    #[test]
    fn test_bad_log_level_is_rejected() {
        let cli = parse(&["clipgrab", "--log-level", "loud", "strategies", "https://x"]);
        let mut config = AppConfig::default();
        assert!(apply_cli_configuration_overrides(&mut config, &cli).is_err());
    }

    #[test]
    fn test_missing_explicit_config_fails() {
        let cli = parse(&[
            "clipgrab",
            "--config",
            "/no/such/clipgrab.toml",
            "strategies",
            "https://x",
        ]);
        assert!(initialize_with_env(&cli, |_| None).is_err());
    }
}
