// Probe interactor - Ask the probe tool for a media duration

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::domain::errors::*;
use crate::domain::rules::FailureClassifier;
use crate::engine::ProbeCommandBuilder;
use crate::ports::*;

/// Interactor for duration probing
pub struct ProbeInteractor {
    process_port: Arc<dyn ProcessPort>,
    prober: PathBuf,
}

impl ProbeInteractor {
    pub fn new(process_port: Arc<dyn ProcessPort>, prober: impl Into<PathBuf>) -> Self {
        Self {
            process_port,
            prober: prober.into(),
        }
    }

    /// Container duration in seconds; a nonzero exit or unparsable output is an error
    #[instrument(skip(self, path), fields(path = %path.display()))]
    pub async fn probe_duration(&self, path: &Path) -> Result<f64, DomainError> {
        let request = ProcessRequest::new(&self.prober, ProbeCommandBuilder::duration_args(path));
        let output = self.process_port.run(&request, &|_: &str| {}).await?;

        if !output.success() {
            let tail = FailureClassifier::error_tail(&output.stderr);
            return Err(DomainError::ProbeFailed(if tail.is_empty() {
                format!("probe exited with {:?}", output.exit_code)
            } else {
                tail
            }));
        }

        let text = output.stdout.trim();
        let seconds = text
            .lines()
            .next()
            .unwrap_or_default()
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|seconds| seconds.is_finite() && *seconds >= 0.0)
            .ok_or_else(|| {
                DomainError::ProbeFailed(format!("unexpected probe output '{}'", text))
            })?;
        debug!(seconds, "Probed duration");
        Ok(seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::test_support::{FakeProcess, Step};

    fn interactor(steps: Vec<Step>) -> (ProbeInteractor, Arc<FakeProcess>) {
        let process = Arc::new(FakeProcess::new(steps));
        let interactor =
            ProbeInteractor::new(Arc::clone(&process) as Arc<dyn ProcessPort>, "ffprobe");
        (interactor, process)
    }

    #[tokio::test]
    async fn test_parses_duration() {
        let (interactor, process) = interactor(vec![Step::Print("125.480000\n")]);
        let seconds = interactor.probe_duration(Path::new("/v/a.mp4")).await.unwrap();

        assert_eq!(seconds, 125.48);
        let request = &process.requests()[0];
        assert_eq!(request.program, PathBuf::from("ffprobe"));
        assert_eq!(request.args.last().map(String::as_str), Some("/v/a.mp4"));
        assert_eq!(request.timeout, None);
    }

    #[tokio::test]
    async fn test_nonzero_exit_is_error() {
        let (interactor, _) = interactor(vec![Step::Exit {
            code: 1,
            stderr: "/v/missing.mp4: No such file or directory",
        }]);
        let err = interactor
            .probe_duration(Path::new("/v/missing.mp4"))
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Failed to get video duration: /v/missing.mp4: No such file or directory"
        );
    }

    #[tokio::test]
    async fn test_garbage_output_is_error() {
        let (interactor, _) = interactor(vec![Step::Print("N/A\n")]);
        let result = interactor.probe_duration(Path::new("/v/a.mp4")).await;
        assert!(matches!(result, Err(DomainError::ProbeFailed(_))));
    }

    #[tokio::test]
    async fn test_launch_error_propagates() {
        let (interactor, _) = interactor(vec![Step::LaunchError]);
        let result = interactor.probe_duration(Path::new("/v/a.mp4")).await;
        assert!(matches!(result, Err(DomainError::ProcessLaunch(_))));
    }
}
