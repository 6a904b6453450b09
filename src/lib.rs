//! ClipGrab Library
//!
//! Fetches a video with site-aware, ordered fallback strategies and exports
//! queued clips and frames from it, driving yt-dlp, ffmpeg and ffprobe as
//! subprocesses behind port traits.

pub mod adapters;
pub mod app;
pub mod cli;
pub mod config_initialization;
pub mod domain;
pub mod engine;
pub mod error;
pub mod ports;
pub mod utils;

// Re-export commonly used types
pub use app::{ClipSession, DefaultAppContainer, ExportInteractor, FetchInteractor, ProbeInteractor};
pub use domain::errors::DomainError;
pub use domain::model::{
    AppEvent, Codec, EncodingSettings, ExportJob, ExportRunResult, JobKind, TimeSpec,
};
pub use error::{ClipGrabError, ClipGrabResult};
