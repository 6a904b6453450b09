//! Command-line argument definitions

use std::path::PathBuf;

use clap::Args;
use clap_num::number_range;

use crate::domain::model::{Codec, Resolution};

fn bitrate_mbps(s: &str) -> Result<u32, String> {
    number_range(s, 1, 500)
}

fn socket_timeout_secs(s: &str) -> Result<u64, String> {
    number_range(s, 1, 3600)
}

/// Arguments for the fetch command
#[derive(Args, Debug)]
pub struct FetchArgs {
    /// Video page URL
    pub url: String,

    /// Network socket timeout handed to the fetch tool, in seconds
    #[arg(long, value_parser = socket_timeout_secs)]
    pub socket_timeout: Option<u64>,
}

/// Arguments for the probe command
#[derive(Args, Debug)]
pub struct ProbeArgs {
    /// Media file path
    pub path: PathBuf,
}

/// Arguments for the strategies command
#[derive(Args, Debug)]
pub struct StrategiesArgs {
    /// Video page URL
    pub url: String,
}

/// Arguments for the export command
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Source video: a local file or a URL to fetch first
    #[arg(short, long)]
    pub source: String,

    /// Queue file (.toml, .json, .yaml or .yml)
    #[arg(short, long)]
    pub queue: PathBuf,

    /// Default output folder for items that do not set one
    #[arg(short, long)]
    pub output_folder: Option<PathBuf>,

    /// Default codec (h264, h265, prores422, prores4444, dnxhd, vp9)
    #[arg(long)]
    pub codec: Option<Codec>,

    /// Default video bitrate in Mbps
    #[arg(long, value_parser = bitrate_mbps)]
    pub bitrate: Option<u32>,

    /// Default output height (native, 2160p, 1440p, 1080p, 720p, 480p)
    #[arg(long)]
    pub resolution: Option<Resolution>,

    /// Per-item transcode time budget in seconds
    #[arg(long)]
    pub timeout: Option<u64>,
}
