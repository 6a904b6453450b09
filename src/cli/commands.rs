//! Command implementations

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::adapters::AppConfig;
use crate::app::{AppContainer, ClipSession, QueueFile};
use crate::cli::args::{ExportArgs, FetchArgs, ProbeArgs, StrategiesArgs};
use crate::cli::Reporter;
use crate::domain::model::ExportRunResult;
use crate::domain::rules::StrategyCatalog;
use crate::error::ClipGrabError;
use crate::utils::path::{PathUtils, DEFAULT_OUTPUT_SUBDIR};

/// Execute the fetch command
pub async fn fetch(
    container: &dyn AppContainer,
    reporter: Reporter,
    args: &FetchArgs,
) -> Result<PathBuf> {
    info!(url = %args.url, "Starting fetch");
    let path = container
        .fetch_interactor()
        .fetch(&args.url)
        .await
        .map_err(ClipGrabError::from)?;

    let size = tokio::fs::metadata(&path).await.ok().map(|meta| meta.len());
    reporter.fetched(&path, size);
    Ok(path)
}

/// Execute the probe command
pub async fn probe(
    container: &dyn AppContainer,
    reporter: Reporter,
    args: &ProbeArgs,
) -> Result<f64> {
    require_file(&args.path)?;
    let seconds = container
        .probe_interactor()
        .probe_duration(&args.path)
        .await
        .with_context(|| format!("Could not probe {}", args.path.display()))?;
    reporter.duration(&args.path, seconds);
    Ok(seconds)
}

/// Execute the strategies command; nothing is launched
pub fn strategies(reporter: Reporter, args: &StrategiesArgs) -> Result<()> {
    let (site, strategies) = StrategyCatalog::for_url(&args.url);
    reporter.strategies(site, &strategies);
    Ok(())
}

/// Execute the export command: load the queue, resolve the source, flush once.
/// A source fetched from a URL is deleted afterwards, whatever the outcome.
pub async fn export(
    container: &dyn AppContainer,
    config: &AppConfig,
    reporter: Reporter,
    args: &ExportArgs,
) -> Result<ExportRunResult> {
    let queue = QueueFile::load(&args.queue)?;
    info!(queue = %args.queue.display(), items = queue.items.len(), "Queue loaded");

    if PathUtils::is_url(&args.source) {
        let source = container
            .fetch_interactor()
            .fetch(&args.source)
            .await
            .map_err(ClipGrabError::from)?;
        let outcome = export_source(container, config, reporter, args, queue, &source, true).await;
        container.fetch_interactor().release(&source).await;
        outcome
    } else {
        let path = PathBuf::from(&args.source);
        require_file(&path)?;
        let source = tokio::fs::canonicalize(&path)
            .await
            .with_context(|| format!("Could not resolve {}", path.display()))?;
        export_source(container, config, reporter, args, queue, &source, false).await
    }
}

async fn export_source(
    container: &dyn AppContainer,
    config: &AppConfig,
    reporter: Reporter,
    args: &ExportArgs,
    queue: QueueFile,
    source: &Path,
    fetched: bool,
) -> Result<ExportRunResult> {
    let duration = match container.probe_interactor().probe_duration(source).await {
        Ok(seconds) => Some(seconds),
        Err(e) => {
            warn!(source = %source.display(), "Duration unknown: {}", e);
            None
        }
    };

    let mut session = ClipSession::new(config.export.encoding_defaults());
    session.load_source(source, duration);
    session.set_default_output_folder(default_output_folder(config, fetched)?);
    queue
        .apply_to(&mut session)
        .with_context(|| format!("Could not queue the items of {}", args.queue.display()))?;

    let jobs = session.take_jobs().map_err(ClipGrabError::from)?;
    let result = container.export_interactor().export_queue(source, &jobs).await;
    reporter.export_result(&result);
    Ok(result)
}

/// Configured folder; a downloaded source lives in a scratch directory, so
/// its clips go under the working directory instead of next to it
fn default_output_folder(config: &AppConfig, fetched: bool) -> Result<Option<PathBuf>> {
    if let Some(folder) = &config.export.output_folder {
        return Ok(Some(folder.clone()));
    }
    if fetched {
        let cwd = std::env::current_dir().context("Could not read the working directory")?;
        return Ok(Some(cwd.join(DEFAULT_OUTPUT_SUBDIR)));
    }
    Ok(None)
}

fn require_file(path: &Path) -> Result<(), ClipGrabError> {
    if path.is_file() {
        Ok(())
    } else {
        Err(ClipGrabError::SourceNotFound {
            source_ref: path.display().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_reported() {
        let err = require_file(Path::new("/definitely/not/here.mp4")).unwrap_err();
        assert_eq!(err.to_string(), "Source not found: /definitely/not/here.mp4");
    }

    #[test]
    fn test_output_folder_for_fetched_source() {
        let mut config = AppConfig::default();
        assert_eq!(default_output_folder(&config, false).unwrap(), None);

        let fetched = default_output_folder(&config, true).unwrap().unwrap();
        assert!(fetched.ends_with("clips"));

        config.export.output_folder = Some(PathBuf::from("/exports"));
        assert_eq!(
            default_output_folder(&config, true).unwrap(),
            Some(PathBuf::from("/exports"))
        );
    }
}
