// Fetch interactor - Runs the ordered strategy list against the fetch tool

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, instrument, warn};

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::domain::rules::*;
use crate::engine::FetchCommandBuilder;
use crate::ports::*;

/// Interactor for the fetch use case
pub struct FetchInteractor {
    process_port: Arc<dyn ProcessPort>,
    fs_port: Arc<dyn FsPort>,
    event_port: Arc<dyn EventPort>,
    fetch_tool: PathBuf,
    command: FetchCommandBuilder,
    scratch_root: Option<PathBuf>,
    kill_grace: Duration,
}

impl FetchInteractor {
    /// Create new fetch interactor with injected ports
    pub fn new(
        process_port: Arc<dyn ProcessPort>,
        fs_port: Arc<dyn FsPort>,
        event_port: Arc<dyn EventPort>,
        fetch_tool: impl Into<PathBuf>,
    ) -> Self {
        Self {
            process_port,
            fs_port,
            event_port,
            fetch_tool: fetch_tool.into(),
            command: FetchCommandBuilder::new(),
            scratch_root: None,
            kill_grace: ProcessRequest::DEFAULT_KILL_GRACE,
        }
    }

    pub fn with_command_builder(mut self, command: FetchCommandBuilder) -> Self {
        self.command = command;
        self
    }

    pub fn with_scratch_root(mut self, root: Option<PathBuf>) -> Self {
        self.scratch_root = root;
        self
    }

    pub fn with_kill_grace(mut self, grace: Duration) -> Self {
        self.kill_grace = grace;
        self
    }

    /// Download `url` with the canned strategies for its site class
    pub async fn fetch(&self, url: &str) -> Result<PathBuf, DomainError> {
        let (site, strategies) = StrategyCatalog::for_url(url);
        self.fetch_with(url, site, &strategies).await
    }

    /// Try `strategies` strictly in order; the first success wins.
    /// When all fail, the last error text is classified for `site`.
    #[instrument(skip(self, site, strategies), fields(site = %site, strategies = strategies.len()))]
    pub async fn fetch_with(
        &self,
        url: &str,
        site: SiteClass,
        strategies: &[FetchStrategy],
    ) -> Result<PathBuf, DomainError> {
        let mut last_stderr = String::new();

        for (index, strategy) in strategies.iter().enumerate() {
            let attempt_number = index + 1;
            let message = if attempt_number == 1 {
                "Downloading video...".to_string()
            } else {
                format!("Downloading video (attempt {})...", attempt_number)
            };
            self.event_port.emit(AppEvent::DownloadStatus { message });
            info!(attempt = attempt_number, strategy = %strategy.name, "Starting fetch attempt");

            let result = self.attempt(strategy, url).await;
            if result.success {
                if let Some(path) = result.path {
                    info!(attempt = attempt_number, path = %path.display(), "Fetch succeeded");
                    return Ok(path);
                }
            }

            warn!(
                attempt = attempt_number,
                strategy = %strategy.name,
                timed_out = result.timed_out,
                "Fetch attempt failed"
            );
            if let Some(scratch_dir) = &result.scratch_dir {
                self.discard_scratch(scratch_dir).await;
            }
            last_stderr = result.stderr;
        }

        let message = FailureClassifier::classify(site, &last_stderr);
        warn!(%site, "All fetch strategies failed");
        Err(DomainError::FetchExhausted(message))
    }

    /// Run one strategy in a fresh scratch directory
    pub async fn attempt(&self, strategy: &FetchStrategy, url: &str) -> FetchAttemptResult {
        let scratch_dir = match self
            .fs_port
            .create_scratch_dir(self.scratch_root.as_deref())
            .await
        {
            Ok(dir) => dir,
            Err(e) => return FetchAttemptResult::failure(None, String::new(), e.to_string()),
        };

        let args = self.command.build(strategy, url, &scratch_dir);
        let request = ProcessRequest::new(&self.fetch_tool, args)
            .with_timeout(strategy.timeout)
            .with_kill_grace(self.kill_grace);

        let events = Arc::clone(&self.event_port);
        let on_stdout = move |chunk: &str| {
            if let Some(percent) = ProgressParser::extract_percent(chunk) {
                events.emit(AppEvent::DownloadProgress { percent });
            }
        };

        let output = match self.process_port.run(&request, &on_stdout).await {
            Ok(output) => output,
            Err(e) => {
                return FetchAttemptResult::failure(Some(&scratch_dir), String::new(), e.to_string())
            }
        };

        if output.timed_out {
            return FetchAttemptResult::timeout(&scratch_dir, output.stdout, strategy.timeout);
        }
        if !output.success() {
            return FetchAttemptResult::failure(Some(&scratch_dir), output.stdout, output.stderr);
        }

        match self.locate_download(&scratch_dir).await {
            Ok(Some(path)) => FetchAttemptResult::success(path, &scratch_dir, output.stdout),
            Ok(None) => {
                let stderr = if output.stderr.trim().is_empty() {
                    format!(
                        "Download completed but no video file was found in {}",
                        scratch_dir.display()
                    )
                } else {
                    output.stderr
                };
                FetchAttemptResult::failure(Some(&scratch_dir), output.stdout, stderr)
            }
            Err(e) => FetchAttemptResult::failure(Some(&scratch_dir), output.stdout, e.to_string()),
        }
    }

    /// Delete the scratch directory holding a file returned by [`Self::fetch`]
    pub async fn release(&self, downloaded: &Path) {
        match downloaded.parent() {
            Some(scratch_dir) => {
                info!(dir = %scratch_dir.display(), "Releasing downloaded source");
                self.discard_scratch(scratch_dir).await;
            }
            None => warn!(path = %downloaded.display(), "Download has no scratch directory"),
        }
    }

    async fn locate_download(&self, scratch_dir: &Path) -> Result<Option<PathBuf>, DomainError> {
        let files = self.fs_port.list_files(scratch_dir).await?;
        debug!(files = ?files, "Scratch directory contents");
        Ok(DownloadedFileSelector::select(&files))
    }

    async fn discard_scratch(&self, scratch_dir: &Path) {
        if let Err(e) = self.fs_port.remove_dir_all(scratch_dir).await {
            debug!(dir = %scratch_dir.display(), "Could not remove scratch directory: {}", e);
        }
    }
}
