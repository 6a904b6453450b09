//! Argument assembly for the metadata probe tool

use std::path::Path;

/// Asks the probe tool for the container duration only
pub struct ProbeCommandBuilder;

impl ProbeCommandBuilder {
    pub fn duration_args(path: &Path) -> Vec<String> {
        vec![
            "-v".into(),
            "error".into(),
            "-show_entries".into(),
            "format=duration".into(),
            "-of".into(),
            "default=noprint_wrappers=1:nokey=1".into(),
            path.to_string_lossy().into_owned(),
        ]
    }
}
