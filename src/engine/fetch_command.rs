//! Argument assembly for the video-fetch tool

use std::path::{Path, PathBuf};

use crate::domain::model::FetchStrategy;
use crate::domain::rules::DownloadedFileSelector;

/// Builds one fetch-tool invocation from a strategy
#[derive(Debug, Clone)]
pub struct FetchCommandBuilder {
    socket_timeout_secs: u64,
}

impl Default for FetchCommandBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl FetchCommandBuilder {
    pub const DEFAULT_SOCKET_TIMEOUT_SECS: u64 = 30;

    pub fn new() -> Self {
        Self {
            socket_timeout_secs: Self::DEFAULT_SOCKET_TIMEOUT_SECS,
        }
    }

    pub fn with_socket_timeout(mut self, secs: u64) -> Self {
        self.socket_timeout_secs = secs;
        self
    }

    /// Output template inside the scratch directory; the tool fills in the extension
    pub fn output_template(scratch_dir: &Path) -> PathBuf {
        scratch_dir.join(format!("{}.%(ext)s", DownloadedFileSelector::BASE_NAME))
    }

    /// Fixed flags, then the strategy's optional ones; the URL is always last
    pub fn build(&self, strategy: &FetchStrategy, url: &str, scratch_dir: &Path) -> Vec<String> {
        let mut args: Vec<String> = vec![
            "--no-playlist".into(),
            "--no-check-certificate".into(),
            "--socket-timeout".into(),
            self.socket_timeout_secs.to_string(),
            "-o".into(),
            Self::output_template(scratch_dir).to_string_lossy().into_owned(),
        ];

        if let Some(browser) = &strategy.browser {
            args.push("--cookies-from-browser".into());
            args.push(browser.clone());
        }
        if let Some(referer) = &strategy.referer {
            args.push("--referer".into());
            args.push(referer.clone());
        }
        if let Some(user_agent) = &strategy.user_agent {
            args.push("--user-agent".into());
            args.push(user_agent.clone());
        }
        for (key, value) in &strategy.headers {
            args.push("--add-header".into());
            args.push(format!("{}:{}", key, value));
        }
        if let Some(extractor_args) = &strategy.extractor_args {
            args.push("--extractor-args".into());
            args.push(extractor_args.clone());
        }
        if strategy.aggressive {
            args.push("--geo-bypass".into());
            args.push("--force-ipv4".into());
        }
        if let Some(format) = &strategy.format {
            args.push("-f".into());
            args.push(format.clone());
        }

        args.push(url.to_string());
        args
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_strategy() {
        let strategy = FetchStrategy::new("plain");
        let args =
            FetchCommandBuilder::new().build(&strategy, "https://x.test/v", Path::new("/tmp/s"));
        assert_eq!(
            args,
            vec![
                "--no-playlist",
                "--no-check-certificate",
                "--socket-timeout",
                "30",
                "-o",
                "/tmp/s/video.%(ext)s",
                "https://x.test/v",
            ]
        );
    }

    #[test]
    fn test_full_strategy_order() {
        let strategy = FetchStrategy::new("full")
            .with_browser_cookies("firefox")
            .with_referer("https://ref.test/")
            .with_user_agent("UA")
            .with_header("DNT", "1")
            .with_header("Accept", "*/*")
            .with_extractor_args("site:key=value")
            .aggressive()
            .with_format("best");
        let args = FetchCommandBuilder::new()
            .with_socket_timeout(10)
            .build(&strategy, "URL", Path::new("/s"));

        assert_eq!(
            args[6..],
            [
                "--cookies-from-browser",
                "firefox",
                "--referer",
                "https://ref.test/",
                "--user-agent",
                "UA",
                "--add-header",
                "Accept:*/*",
                "--add-header",
                "DNT:1",
                "--extractor-args",
                "site:key=value",
                "--geo-bypass",
                "--force-ipv4",
                "-f",
                "best",
                "URL",
            ]
        );
        assert_eq!(args[3], "10");
    }
}
