// Export interactor - Sequential queue flush through the transcode tool

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{info, instrument, warn};

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::domain::rules::*;
use crate::engine::TranscodeCommandBuilder;
use crate::ports::*;

/// Interactor for the export use case
pub struct ExportInteractor {
    process_port: Arc<dyn ProcessPort>,
    fs_port: Arc<dyn FsPort>,
    event_port: Arc<dyn EventPort>,
    transcoder: PathBuf,
    job_timeout: Option<Duration>,
    kill_grace: Duration,
}

impl ExportInteractor {
    /// Create new export interactor with injected ports
    pub fn new(
        process_port: Arc<dyn ProcessPort>,
        fs_port: Arc<dyn FsPort>,
        event_port: Arc<dyn EventPort>,
        transcoder: impl Into<PathBuf>,
    ) -> Self {
        Self {
            process_port,
            fs_port,
            event_port,
            transcoder: transcoder.into(),
            job_timeout: None,
            kill_grace: ProcessRequest::DEFAULT_KILL_GRACE,
        }
    }

    pub fn with_job_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.job_timeout = timeout;
        self
    }

    pub fn with_kill_grace(mut self, grace: Duration) -> Self {
        self.kill_grace = grace;
        self
    }

    /// Export every job in order. Never fails as a whole: per-item failures are
    /// counted and listed, and a progress event follows every item.
    #[instrument(skip(self, source, jobs), fields(source = %source.display(), jobs = jobs.len()))]
    pub async fn export_queue(&self, source: &Path, jobs: &[ExportJob]) -> ExportRunResult {
        let started = Instant::now();
        let total = jobs.len();
        let mut result = ExportRunResult::default();

        for (index, job) in jobs.iter().enumerate() {
            let job = Self::with_corrected_extension(job);
            let current = index + 1;

            match self.export_one(source, &job).await {
                Ok(()) => {
                    result.exported += 1;
                    info!(
                        current,
                        total,
                        filename = %job.filename,
                        kind = job.kind.label(),
                        "Exported"
                    );
                }
                Err(e) => {
                    result.failed += 1;
                    warn!(current, total, filename = %job.filename, "Export failed: {}", e);
                    result.failures.push(ExportFailure {
                        index: current,
                        filename: job.filename.clone(),
                        reason: e.to_string(),
                    });
                }
            }

            self.event_port.emit(AppEvent::ExportProgress {
                current,
                total,
                filename: job.filename.clone(),
            });
        }

        result.elapsed_seconds = started.elapsed().as_secs_f64();
        info!(
            exported = result.exported,
            failed = result.failed,
            elapsed = result.elapsed_seconds,
            "Export finished"
        );
        result
    }

    /// Re-derive the extension from the job's effective codec
    pub fn with_corrected_extension(job: &ExportJob) -> ExportJob {
        let filename =
            OutputNaming::corrected_filename(&job.filename, &job.kind, job.settings.codec);
        if filename != job.filename {
            info!(from = %job.filename, to = %filename, "Corrected output extension");
        }
        ExportJob {
            filename,
            ..job.clone()
        }
    }

    async fn export_one(&self, source: &Path, job: &ExportJob) -> Result<(), DomainError> {
        self.fs_port.create_dir_all(&job.output_folder).await?;

        let args = TranscodeCommandBuilder::job_args(source, job);
        let mut request =
            ProcessRequest::new(&self.transcoder, args).with_kill_grace(self.kill_grace);
        if let Some(timeout) = self.job_timeout {
            request = request.with_timeout(timeout);
        }

        let output = self.process_port.run(&request, &|_: &str| {}).await?;
        if output.timed_out {
            return Err(DomainError::ToolFailed(format!(
                "transcode exceeded {} seconds",
                self.job_timeout.map(|t| t.as_secs()).unwrap_or_default()
            )));
        }
        if !output.success() {
            let tail = FailureClassifier::error_tail(&output.stderr);
            let reason = if tail.is_empty() {
                match output.exit_code {
                    Some(code) => format!("exit code {}", code),
                    None => "terminated by signal".to_string(),
                }
            } else {
                tail
            };
            return Err(DomainError::ToolFailed(reason));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests;
