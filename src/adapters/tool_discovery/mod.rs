// Tool discovery - Locate the external fetch, transcode and probe binaries

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use crate::adapters::toml_config::ToolsConfig;
use crate::utils::path::PathUtils;

/// External tools the application drives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    YtDlp,
    Ffmpeg,
    Ffprobe,
}

impl Tool {
    pub fn binary_name(&self) -> &'static str {
        match self {
            Tool::YtDlp => "yt-dlp",
            Tool::Ffmpeg => "ffmpeg",
            Tool::Ffprobe => "ffprobe",
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.binary_name())
    }
}

/// Resolved tool locations
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolPaths {
    pub yt_dlp: PathBuf,
    pub ffmpeg: PathBuf,
    pub ffprobe: PathBuf,
}

impl ToolPaths {
    /// Explicit path, then bundled directory, then `PATH`, then the bare name
    pub fn discover(config: &ToolsConfig) -> Self {
        let locator = ToolLocator::new(config.bin_dir.clone());
        Self {
            yt_dlp: locator.resolve(Tool::YtDlp, config.yt_dlp.as_deref()),
            ffmpeg: locator.resolve(Tool::Ffmpeg, config.ffmpeg.as_deref()),
            ffprobe: locator.resolve(Tool::Ffprobe, config.ffprobe.as_deref()),
        }
    }
}

/// Looks tools up in a bundled directory and on `PATH`
#[derive(Debug, Clone, Default)]
pub struct ToolLocator {
    bin_dir: Option<PathBuf>,
}

impl ToolLocator {
    pub fn new(bin_dir: Option<PathBuf>) -> Self {
        Self { bin_dir }
    }

    pub fn resolve(&self, tool: Tool, explicit: Option<&Path>) -> PathBuf {
        if let Some(path) = explicit {
            debug!(%tool, path = %path.display(), "Using configured tool path");
            return path.to_path_buf();
        }

        let name = PathUtils::executable_name(tool.binary_name());
        if let Some(bundled) = self
            .bin_dir
            .as_ref()
            .map(|dir| dir.join(&name))
            .filter(|candidate| candidate.is_file())
        {
            debug!(%tool, path = %bundled.display(), "Using bundled tool");
            return bundled;
        }

        match which::which(tool.binary_name()) {
            Ok(found) => {
                debug!(%tool, path = %found.display(), "Found tool on PATH");
                found
            }
            Err(_) => {
                debug!(%tool, "Tool not found, relying on the bare name");
                PathBuf::from(name)
            }
        }
    }
}
