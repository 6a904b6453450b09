//! CLI module for ClipGrab
//!
//! This module handles command-line argument parsing and command execution.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub mod args;
pub mod commands;
pub mod reporter;

pub use args::{ExportArgs, FetchArgs, ProbeArgs, StrategiesArgs};
pub use reporter::Reporter;

/// ClipGrab
///
/// Downloads a video with site-aware retry strategies, then exports queued
/// clips and still frames from it through ffmpeg.
#[derive(Parser, Debug)]
#[command(name = "clipgrab")]
#[command(about = "ClipGrab - Fetch videos and batch-export clips and frames")]
#[command(version)]
#[command(long_about = None)]
pub struct Cli {
    /// Configuration file (default: ./clipgrab.toml, then the user config directory)
    #[arg(long, env = "CLIPGRAB_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Logging level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Print results and progress events as JSON lines
    #[arg(long, global = true)]
    pub json: bool,

    /// Path to the yt-dlp binary
    #[arg(long, global = true)]
    pub yt_dlp: Option<PathBuf>,

    /// Path to the ffmpeg binary
    #[arg(long, global = true)]
    pub ffmpeg: Option<PathBuf>,

    /// Path to the ffprobe binary
    #[arg(long, global = true)]
    pub ffprobe: Option<PathBuf>,

    /// Parent directory for per-attempt download scratch directories
    #[arg(long, global = true)]
    pub scratch_root: Option<PathBuf>,

    /// The command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download a video, trying the site's strategies in order
    Fetch(FetchArgs),
    /// Print the duration of a media file
    Probe(ProbeArgs),
    /// Show the strategies that would be tried for a URL
    Strategies(StrategiesArgs),
    /// Export the clips and frames described by a queue file
    Export(ExportArgs),
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_command_tree_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "clipgrab",
            "fetch",
            "https://youtu.be/x",
            "--json",
            "--yt-dlp",
            "/opt/yt-dlp",
        ])
        .unwrap();
        assert!(cli.json);
        assert_eq!(cli.yt_dlp, Some(PathBuf::from("/opt/yt-dlp")));
        match cli.command {
            Commands::Fetch(args) => assert_eq!(args.url, "https://youtu.be/x"),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_export_requires_source_and_queue() {
        assert!(Cli::try_parse_from(["clipgrab", "export", "--source", "a.mp4"]).is_err());
        let cli = Cli::try_parse_from([
            "clipgrab",
            "export",
            "--source",
            "a.mp4",
            "--queue",
            "q.toml",
            "--codec",
            "vp9",
            "--bitrate",
            "40",
        ])
        .unwrap();
        match cli.command {
            Commands::Export(args) => {
                assert_eq!(args.queue, PathBuf::from("q.toml"));
                assert_eq!(args.bitrate, Some(40));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_bitrate_range_is_enforced() {
        let result = Cli::try_parse_from([
            "clipgrab", "export", "--source", "a.mp4", "--queue", "q.toml", "--bitrate", "0",
        ]);
        assert!(result.is_err());
    }
}
