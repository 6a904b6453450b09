// Queue files - Batch export requests written as TOML, JSON or YAML

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::domain::model::*;
use crate::error::{ClipGrabError, ClipGrabResult};

use super::ClipSession;

/// One entry of a queue file
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum QueueFileItem {
    Clip {
        #[serde(default)]
        start: Option<TimeSpec>,
        #[serde(default)]
        end: Option<TimeSpec>,
        #[serde(default)]
        filename: Option<String>,
        #[serde(default)]
        output_folder: Option<PathBuf>,
        #[serde(default)]
        overrides: EncodingOverrides,
    },
    Frame {
        timestamp: TimeSpec,
        #[serde(default)]
        filename: Option<String>,
        #[serde(default)]
        output_folder: Option<PathBuf>,
    },
}

/// A whole batch: session defaults plus the ordered items
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct QueueFile {
    /// Applied on top of the configured export defaults
    pub defaults: EncodingOverrides,
    pub output_folder: Option<PathBuf>,
    pub items: Vec<QueueFileItem>,
}

impl QueueFile {
    /// Load a queue file, picking the format from its extension (TOML when unknown)
    pub fn load(path: &Path) -> ClipGrabResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ClipGrabError::Queue {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());

        let parsed = match extension.as_deref() {
            Some("json") => Self::from_json(&content),
            Some("yaml") | Some("yml") => Self::from_yaml(&content),
            _ => Self::from_toml(&content),
        };
        let queue = parsed.map_err(|e| ClipGrabError::Queue {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        debug!(path = %path.display(), items = queue.items.len(), "Loaded queue file");
        Ok(queue)
    }

    pub fn from_toml(content: &str) -> ClipGrabResult<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_json(content: &str) -> ClipGrabResult<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn from_yaml(content: &str) -> ClipGrabResult<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Feed the batch into `session`, which must already have its source loaded.
    /// Returns the number of items queued.
    pub fn apply_to(&self, session: &mut ClipSession) -> ClipGrabResult<usize> {
        if !self.defaults.is_empty() {
            let defaults = self.defaults.resolve(session.defaults());
            session.set_defaults(defaults)?;
        }
        if self.output_folder.is_some() {
            session.set_default_output_folder(self.output_folder.clone());
        }

        for item in &self.items {
            match item {
                QueueFileItem::Clip {
                    start,
                    end,
                    filename,
                    output_folder,
                    overrides,
                } => {
                    let index = session.add_clip(*start, *end)?;
                    if !overrides.is_empty() {
                        session.set_overrides(index, overrides.clone())?;
                    }
                    Self::customize(session, index, filename.as_deref(), output_folder.as_ref())?;
                }
                QueueFileItem::Frame {
                    timestamp,
                    filename,
                    output_folder,
                } => {
                    let index = session.add_frame(*timestamp)?;
                    Self::customize(session, index, filename.as_deref(), output_folder.as_ref())?;
                }
            }
        }
        Ok(self.items.len())
    }

    fn customize(
        session: &mut ClipSession,
        index: usize,
        filename: Option<&str>,
        output_folder: Option<&PathBuf>,
    ) -> ClipGrabResult<()> {
        if let Some(name) = filename {
            session.rename(index, name)?;
        }
        if let Some(folder) = output_folder {
            session.set_output_folder(index, folder.clone())?;
        }
        Ok(())
    }
}
