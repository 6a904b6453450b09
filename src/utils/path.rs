//! Path utilities shared by the session, config and tool discovery

use std::path::{Path, PathBuf};

use crate::domain::errors::DomainError;

/// Folder created next to the source when no output folder is set
pub const DEFAULT_OUTPUT_SUBDIR: &str = "clips";

/// Path helpers
pub struct PathUtils;

impl PathUtils {
    /// Whether `source` names a remote resource rather than a local file
    pub fn is_url(source: &str) -> bool {
        let lower = source.trim().to_ascii_lowercase();
        lower.starts_with("http://") || lower.starts_with("https://")
    }

    /// `<source dir>/clips`
    pub fn default_output_folder(source: &Path) -> PathBuf {
        source
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(DEFAULT_OUTPUT_SUBDIR)
    }

    /// Platform executable file name for a tool
    pub fn executable_name(name: &str) -> String {
        if cfg!(windows) {
            format!("{}.exe", name)
        } else {
            name.to_string()
        }
    }

    /// Per-user config file location
    pub fn user_config_file(app: &str) -> Option<PathBuf> {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return Some(PathBuf::from(appdata).join(app).join("config.toml"));
        }
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
            return Some(PathBuf::from(xdg).join(app).join("config.toml"));
        }
        std::env::var_os("HOME").map(|home| {
            PathBuf::from(home)
                .join(".config")
                .join(app)
                .join("config.toml")
        })
    }

    /// A display filename must be a bare name: no separators, no reserved characters
    pub fn validate_filename(name: &str) -> Result<(), DomainError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(DomainError::BadArgs("Filename cannot be empty".to_string()));
        }
        if trimmed == "." || trimmed == ".." {
            return Err(DomainError::BadArgs(format!("Invalid filename '{}'", name)));
        }

        let invalid_chars = ['/', '\\', '<', '>', ':', '"', '|', '?', '*'];
        if let Some(ch) = trimmed.chars().find(|c| invalid_chars.contains(c) || c.is_control()) {
            return Err(DomainError::BadArgs(format!(
                "Invalid character '{}' in filename '{}'",
                ch.escape_default(),
                name
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_url() {
        assert!(PathUtils::is_url("https://youtu.be/x"));
        assert!(PathUtils::is_url("HTTP://example.org/v.mp4"));
        assert!(!PathUtils::is_url("/videos/a.mp4"));
        assert!(!PathUtils::is_url("ftp.mp4"));
    }

    #[test]
    fn test_default_output_folder() {
        assert_eq!(
            PathUtils::default_output_folder(Path::new("/videos/a.mp4")),
            PathBuf::from("/videos/clips")
        );
    }

    #[test]
    fn test_validate_filename() {
        assert!(PathUtils::validate_filename("clip_001.mp4").is_ok());
        assert!(PathUtils::validate_filename("my clip (final).mov").is_ok());
        assert!(PathUtils::validate_filename("../escape.mp4").is_err());
        assert!(PathUtils::validate_filename("a:b.mp4").is_err());
        assert!(PathUtils::validate_filename("   ").is_err());
    }
}
