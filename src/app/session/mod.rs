// Clip session - The loaded source, the export queue and the session-wide defaults

use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use serde::Serialize;
use tracing::{debug, info};

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::domain::rules::OutputNaming;
use crate::utils::path::PathUtils;

pub mod queue_file;

pub use queue_file::{QueueFile, QueueFileItem};

/// The video every queued job extracts from
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadedSource {
    pub path: PathBuf,
    /// Duration in seconds when known
    pub duration: Option<f64>,
}

/// One queued, still-editable extraction request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueueItem {
    pub kind: JobKind,
    pub filename: String,
    pub output_folder: PathBuf,
    /// Unset fields follow the session defaults at flush time
    pub overrides: EncodingOverrides,
    /// Clip spans the whole source
    pub full_video: bool,
}

impl QueueItem {
    /// Short human-readable summary of what the item extracts
    pub fn describe(&self) -> String {
        match &self.kind {
            JobKind::Clip { .. } if self.full_video => "(FULL VIDEO)".to_string(),
            JobKind::Clip { start, end } => format!("({} -> {})", start, end),
            JobKind::Frame { timestamp } => format!("({})", timestamp),
        }
    }
}

/// Explicit session state shared by the queue editor and the export flush
#[derive(Debug, Clone)]
pub struct ClipSession {
    source: Option<LoadedSource>,
    queue: Vec<QueueItem>,
    defaults: EncodingSettings,
    output_folder: Option<PathBuf>,
    clock: fn() -> NaiveDateTime,
}

impl Default for ClipSession {
    fn default() -> Self {
        Self::new(EncodingSettings::default())
    }
}

fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

impl ClipSession {
    /// Slack for probe rounding when comparing against the source duration
    const DURATION_TOLERANCE: f64 = 0.001;

    pub fn new(defaults: EncodingSettings) -> Self {
        Self {
            source: None,
            queue: Vec::new(),
            defaults,
            output_folder: None,
            clock: local_now,
        }
    }

    /// Replace the wall clock used in generated filenames
    pub fn with_clock(mut self, clock: fn() -> NaiveDateTime) -> Self {
        self.clock = clock;
        self
    }

    pub fn load_source(&mut self, path: impl Into<PathBuf>, duration: Option<f64>) {
        let path = path.into();
        info!(path = %path.display(), ?duration, "Source loaded");
        self.source = Some(LoadedSource { path, duration });
    }

    pub fn source(&self) -> Option<&LoadedSource> {
        self.source.as_ref()
    }

    pub fn items(&self) -> &[QueueItem] {
        &self.queue
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn defaults(&self) -> &EncodingSettings {
        &self.defaults
    }

    /// Replace the defaults; clips without a codec override follow the new codec's extension
    pub fn set_defaults(&mut self, settings: EncodingSettings) -> Result<(), DomainError> {
        settings.validate()?;
        self.defaults = settings;
        let defaults = &self.defaults;
        for item in self.queue.iter_mut().filter(|item| item.overrides.codec.is_none()) {
            Self::refresh_extension(item, defaults);
        }
        Ok(())
    }

    /// Folder new items are written to
    pub fn default_output_folder(&self) -> Option<PathBuf> {
        self.output_folder.clone().or_else(|| {
            self.source
                .as_ref()
                .map(|source| PathUtils::default_output_folder(&source.path))
        })
    }

    pub fn set_default_output_folder(&mut self, folder: Option<PathBuf>) {
        self.output_folder = folder;
    }

    /// Queue a clip. Missing bounds mean the start and the end of the source.
    pub fn add_clip(
        &mut self,
        start: Option<TimeSpec>,
        end: Option<TimeSpec>,
    ) -> Result<usize, DomainError> {
        let source = self.require_source()?;
        let full_video = start.is_none() && end.is_none();
        let start = start.unwrap_or_else(|| TimeSpec::from_seconds(0.0));
        let end = match end {
            Some(end) => end,
            None => TimeSpec::from_seconds(source.duration.ok_or_else(|| {
                DomainError::InvalidState(
                    "Source duration is unknown; an explicit end time is required".to_string(),
                )
            })?),
        };
        if let Some(duration) = source.duration {
            if end.as_seconds() > duration + Self::DURATION_TOLERANCE {
                return Err(DomainError::InvalidTimeRange(format!(
                    "end ({}) is past the end of the video ({})",
                    end,
                    TimeSpec::from_seconds(duration)
                )));
            }
        }
        let kind = JobKind::clip(start, end)?;

        let prefix = if full_video { "video" } else { "clip" };
        let filename = format!(
            "{}_{:03}_{}.{}",
            prefix,
            self.queue.len() + 1,
            self.timestamp(),
            self.defaults.codec.extension()
        );
        self.push(QueueItem {
            kind,
            filename,
            output_folder: self.require_output_folder()?,
            overrides: EncodingOverrides::default(),
            full_video,
        })
    }

    /// Queue a single-frame capture
    pub fn add_frame(&mut self, timestamp: TimeSpec) -> Result<usize, DomainError> {
        let source = self.require_source()?;
        if let Some(duration) = source.duration {
            if timestamp.as_seconds() > duration + Self::DURATION_TOLERANCE {
                return Err(DomainError::InvalidTimeRange(format!(
                    "frame time ({}) is past the end of the video",
                    timestamp
                )));
            }
        }

        let filename = format!("frame_{:03}_{}.jpg", self.queue.len() + 1, self.timestamp());
        self.push(QueueItem {
            kind: JobKind::frame(timestamp),
            filename,
            output_folder: self.require_output_folder()?,
            overrides: EncodingOverrides::default(),
            full_video: false,
        })
    }

    pub fn rename(&mut self, index: usize, name: &str) -> Result<(), DomainError> {
        PathUtils::validate_filename(name)?;
        let item = self.item_mut(index)?;
        item.filename = name.trim().to_string();
        Ok(())
    }

    /// Replace an item's overrides; a clip's extension follows its new effective codec
    pub fn set_overrides(
        &mut self,
        index: usize,
        overrides: EncodingOverrides,
    ) -> Result<(), DomainError> {
        overrides.resolve(&self.defaults).validate()?;
        let defaults = self.defaults.clone();
        let item = self.item_mut(index)?;
        item.overrides = overrides;
        Self::refresh_extension(item, &defaults);
        Ok(())
    }

    pub fn set_output_folder(
        &mut self,
        index: usize,
        folder: impl Into<PathBuf>,
    ) -> Result<(), DomainError> {
        self.item_mut(index)?.output_folder = folder.into();
        Ok(())
    }

    pub fn remove(&mut self, index: usize) -> Result<QueueItem, DomainError> {
        self.check_index(index)?;
        Ok(self.queue.remove(index))
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }

    /// Snapshot the queue into immutable jobs with the current defaults applied
    pub fn resolve_jobs(&self) -> Result<Vec<ExportJob>, DomainError> {
        self.queue
            .iter()
            .map(|item| {
                let settings = item.overrides.resolve(&self.defaults);
                let filename =
                    OutputNaming::corrected_filename(&item.filename, &item.kind, settings.codec);
                ExportJob::new(
                    item.kind.clone(),
                    filename,
                    item.output_folder.clone(),
                    settings,
                )
            })
            .collect()
    }

    /// Resolve the jobs and discard the queue, as one export pass consumes it
    pub fn take_jobs(&mut self) -> Result<Vec<ExportJob>, DomainError> {
        let jobs = self.resolve_jobs()?;
        self.queue.clear();
        debug!(jobs = jobs.len(), "Queue handed off for export");
        Ok(jobs)
    }

    fn refresh_extension(item: &mut QueueItem, defaults: &EncodingSettings) {
        if matches!(item.kind, JobKind::Clip { .. }) {
            let codec = item.overrides.effective_codec(defaults);
            item.filename = OutputNaming::corrected_filename(&item.filename, &item.kind, codec);
        }
    }

    fn push(&mut self, item: QueueItem) -> Result<usize, DomainError> {
        info!(filename = %item.filename, kind = item.kind.label(), "Queued {}", item.describe());
        self.queue.push(item);
        Ok(self.queue.len() - 1)
    }

    fn timestamp(&self) -> String {
        (self.clock)().format("%Y%m%d_%H%M%S").to_string()
    }

    fn require_source(&self) -> Result<LoadedSource, DomainError> {
        self.source
            .clone()
            .ok_or_else(|| DomainError::InvalidState("No video loaded".to_string()))
    }

    fn require_output_folder(&self) -> Result<PathBuf, DomainError> {
        self.default_output_folder()
            .ok_or_else(|| DomainError::InvalidState("No output folder available".to_string()))
    }

    fn check_index(&self, index: usize) -> Result<(), DomainError> {
        if index >= self.queue.len() {
            return Err(DomainError::InvalidState(format!(
                "Queue index {} out of bounds (queue has {} items)",
                index,
                self.queue.len()
            )));
        }
        Ok(())
    }

    fn item_mut(&mut self, index: usize) -> Result<&mut QueueItem, DomainError> {
        self.check_index(index)?;
        Ok(&mut self.queue[index])
    }

    /// Source path, for callers that need it after the queue is taken
    pub fn source_path(&self) -> Option<&Path> {
        self.source.as_ref().map(|source| source.path.as_path())
    }
}

#[cfg(test)]
mod tests;
