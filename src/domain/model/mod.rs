// Domain models - Core types and data structures

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;

/// Time specification with precision - represents time in seconds with fractional precision
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "TimeValue", into = "String")]
pub struct TimeSpec {
    pub seconds: f64,
}

/// Raw time value as written in queue files: either plain seconds or a timecode string
#[derive(Deserialize)]
#[serde(untagged)]
enum TimeValue {
    Seconds(f64),
    Text(String),
}

impl TryFrom<TimeValue> for TimeSpec {
    type Error = DomainError;

    fn try_from(value: TimeValue) -> Result<Self, Self::Error> {
        match value {
            TimeValue::Seconds(seconds) if seconds >= 0.0 && seconds.is_finite() => {
                Ok(Self::from_seconds(seconds))
            }
            TimeValue::Seconds(seconds) => Err(DomainError::BadArgs(format!(
                "Time cannot be negative: {}",
                seconds
            ))),
            TimeValue::Text(text) => Self::parse(&text),
        }
    }
}

impl From<TimeSpec> for String {
    fn from(time: TimeSpec) -> Self {
        time.to_timecode()
    }
}

impl TimeSpec {
    /// Create a new TimeSpec from seconds
    pub fn from_seconds(seconds: f64) -> Self {
        Self { seconds }
    }

    /// Create a new TimeSpec from hours, minutes, seconds, milliseconds
    pub fn from_components(hours: u32, minutes: u32, seconds: u32, milliseconds: u32) -> Self {
        let total_seconds = hours as f64 * 3600.0
            + minutes as f64 * 60.0
            + seconds as f64
            + milliseconds as f64 / 1000.0;
        Self {
            seconds: total_seconds,
        }
    }

    pub fn as_seconds(&self) -> f64 {
        self.seconds
    }

    /// Convert to Duration
    pub fn to_duration(&self) -> Duration {
        Duration::from_secs_f64(self.seconds.max(0.0))
    }

    /// Parse time string in various formats
    pub fn parse(time_str: &str) -> Result<Self, DomainError> {
        let trimmed = time_str.trim();

        // Try parsing as seconds (float)
        if let Ok(seconds) = trimmed.parse::<f64>() {
            if seconds < 0.0 || !seconds.is_finite() {
                return Err(DomainError::BadArgs("Time cannot be negative".to_string()));
            }
            return Ok(Self::from_seconds(seconds));
        }

        let parts: Vec<&str> = trimmed.split(':').collect();
        match parts.as_slice() {
            [minutes, seconds] => {
                let minutes = minutes
                    .parse::<u32>()
                    .map_err(|_| DomainError::BadArgs("Invalid minutes format".to_string()))?;
                let seconds = Self::parse_seconds_part(seconds)?;
                Ok(Self::from_seconds(minutes as f64 * 60.0 + seconds))
            }
            [hours, minutes, seconds] => {
                let hours = hours
                    .parse::<u32>()
                    .map_err(|_| DomainError::BadArgs("Invalid hours format".to_string()))?;
                let minutes = minutes
                    .parse::<u32>()
                    .map_err(|_| DomainError::BadArgs("Invalid minutes format".to_string()))?;
                if minutes >= 60 {
                    return Err(DomainError::BadArgs(
                        "Minutes must be less than 60".to_string(),
                    ));
                }
                let seconds = Self::parse_seconds_part(seconds)?;
                Ok(Self::from_seconds(
                    hours as f64 * 3600.0 + minutes as f64 * 60.0 + seconds,
                ))
            }
            _ => Err(DomainError::BadArgs(format!(
                "Invalid time format '{}'. Supported formats: seconds (e.g., 123.45), MM:SS.ms (e.g., 2:30.5), HH:MM:SS.ms (e.g., 1:02:30.5)",
                trimmed
            ))),
        }
    }

    fn parse_seconds_part(part: &str) -> Result<f64, DomainError> {
        let seconds = part
            .parse::<f64>()
            .map_err(|_| DomainError::BadArgs("Invalid seconds format".to_string()))?;
        if !(0.0..60.0).contains(&seconds) {
            return Err(DomainError::BadArgs(
                "Seconds must be less than 60".to_string(),
            ));
        }
        Ok(seconds)
    }

    fn components(&self) -> (u64, u64, u64, u64) {
        let total_ms = (self.seconds.max(0.0) * 1000.0).round() as u64;
        let hours = total_ms / 3_600_000;
        let minutes = (total_ms % 3_600_000) / 60_000;
        let seconds = (total_ms % 60_000) / 1000;
        (hours, minutes, seconds, total_ms % 1000)
    }

    /// Format as HH:MM:SS.mmm, the form handed to the transcoder
    pub fn to_timecode(&self) -> String {
        let (hours, minutes, seconds, ms) = self.components();
        format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, seconds, ms)
    }

    /// Compact form for filenames, e.g. 000130 for 1m30s
    pub fn to_compact(&self) -> String {
        let (hours, minutes, seconds, _) = self.components();
        format!("{:02}{:02}{:02}", hours, minutes, seconds)
    }
}

impl fmt::Display for TimeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (hours, minutes, seconds, ms) = self.components();
        if hours > 0 {
            write!(f, "{:02}:{:02}:{:02}.{:03}", hours, minutes, seconds, ms)
        } else {
            write!(f, "{:02}:{:02}.{:03}", minutes, seconds, ms)
        }
    }
}

/// Output codec key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Codec {
    #[default]
    #[serde(rename = "h264")]
    H264,
    #[serde(rename = "h265")]
    H265,
    #[serde(rename = "prores422")]
    ProRes422,
    #[serde(rename = "prores4444")]
    ProRes4444,
    #[serde(rename = "dnxhd")]
    Dnxhd,
    #[serde(rename = "vp9")]
    Vp9,
}

impl Codec {
    pub const ALL: [Codec; 6] = [
        Codec::H264,
        Codec::H265,
        Codec::ProRes422,
        Codec::ProRes4444,
        Codec::Dnxhd,
        Codec::Vp9,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Codec::H264 => "h264",
            Codec::H265 => "h265",
            Codec::ProRes422 => "prores422",
            Codec::ProRes4444 => "prores4444",
            Codec::Dnxhd => "dnxhd",
            Codec::Vp9 => "vp9",
        }
    }

    /// Container extension for files encoded with this codec
    pub fn extension(&self) -> &'static str {
        match self {
            Codec::ProRes422 | Codec::ProRes4444 | Codec::Dnxhd => "mov",
            Codec::Vp9 => "webm",
            Codec::H264 | Codec::H265 => "mp4",
        }
    }

    /// Edit-friendly intermediate codecs: fixed bitrate, MOV container
    pub fn is_intermediate(&self) -> bool {
        matches!(self, Codec::ProRes422 | Codec::ProRes4444 | Codec::Dnxhd)
    }
}

impl FromStr for Codec {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase();
        Codec::ALL
            .into_iter()
            .find(|codec| codec.key() == key)
            .ok_or_else(|| {
                DomainError::UnsupportedCodec(format!(
                    "{}. Valid codecs: h264, h265, prores422, prores4444, dnxhd, vp9",
                    s
                ))
            })
    }
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Output height bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Resolution {
    #[default]
    Native,
    P2160,
    P1440,
    P1080,
    P720,
    P480,
}

impl Resolution {
    pub fn height(&self) -> Option<u32> {
        match self {
            Resolution::Native => None,
            Resolution::P2160 => Some(2160),
            Resolution::P1440 => Some(1440),
            Resolution::P1080 => Some(1080),
            Resolution::P720 => Some(720),
            Resolution::P480 => Some(480),
        }
    }

    pub fn key(&self) -> String {
        match self.height() {
            Some(height) => height.to_string(),
            None => "native".to_string(),
        }
    }
}

impl FromStr for Resolution {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().trim_end_matches('p') {
            "native" => Ok(Resolution::Native),
            "2160" => Ok(Resolution::P2160),
            "1440" => Ok(Resolution::P1440),
            "1080" => Ok(Resolution::P1080),
            "720" => Ok(Resolution::P720),
            "480" => Ok(Resolution::P480),
            _ => Err(DomainError::BadArgs(format!(
                "Invalid resolution: {}. Valid values: native, 2160, 1440, 1080, 720, 480",
                s
            ))),
        }
    }
}

impl TryFrom<String> for Resolution {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Resolution> for String {
    fn from(resolution: Resolution) -> Self {
        resolution.key()
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

/// Fully-resolved encoding configuration for one job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncodingSettings {
    pub codec: Codec,
    /// Video bitrate cap in Mbps; ignored by the intermediate codecs
    pub bitrate_mbps: Option<u32>,
    pub resolution: Resolution,
    pub fps: Option<u32>,
    pub audio: bool,
    /// Playback-speed multiplier
    pub speed: f64,
}

impl Default for EncodingSettings {
    fn default() -> Self {
        Self {
            codec: Codec::H264,
            bitrate_mbps: Some(25),
            resolution: Resolution::Native,
            fps: None,
            audio: true,
            speed: 1.0,
        }
    }
}

impl EncodingSettings {
    pub fn validate(&self) -> Result<(), DomainError> {
        validate_speed(self.speed)?;
        if self.fps == Some(0) {
            return Err(DomainError::BadArgs("Frame rate must be positive".to_string()));
        }
        if self.bitrate_mbps == Some(0) {
            return Err(DomainError::BadArgs("Bitrate must be positive".to_string()));
        }
        Ok(())
    }
}

fn validate_speed(speed: f64) -> Result<(), DomainError> {
    if !speed.is_finite() || speed <= 0.0 {
        return Err(DomainError::BadArgs(format!(
            "Playback speed must be a positive number, got {}",
            speed
        )));
    }
    Ok(())
}

/// Per-job encoding overrides; unset fields fall back to session defaults at flush time
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodingOverrides {
    pub codec: Option<Codec>,
    pub bitrate_mbps: Option<u32>,
    pub resolution: Option<Resolution>,
    pub fps: Option<u32>,
    pub audio: Option<bool>,
    pub speed: Option<f64>,
}

impl EncodingOverrides {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Codec that will be used once the overrides are applied on top of `defaults`
    pub fn effective_codec(&self, defaults: &EncodingSettings) -> Codec {
        self.codec.unwrap_or(defaults.codec)
    }

    pub fn resolve(&self, defaults: &EncodingSettings) -> EncodingSettings {
        EncodingSettings {
            codec: self.effective_codec(defaults),
            bitrate_mbps: self.bitrate_mbps.or(defaults.bitrate_mbps),
            resolution: self.resolution.unwrap_or(defaults.resolution),
            fps: self.fps.or(defaults.fps),
            audio: self.audio.unwrap_or(defaults.audio),
            speed: self.speed.unwrap_or(defaults.speed),
        }
    }
}

/// What one export job extracts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum JobKind {
    Clip { start: TimeSpec, end: TimeSpec },
    Frame { timestamp: TimeSpec },
}

impl JobKind {
    /// Build a clip range; the end must be strictly after the start
    pub fn clip(start: TimeSpec, end: TimeSpec) -> Result<Self, DomainError> {
        if end.seconds <= start.seconds {
            return Err(DomainError::InvalidTimeRange(format!(
                "end ({}) must be after start ({})",
                end, start
            )));
        }
        Ok(JobKind::Clip { start, end })
    }

    pub fn frame(timestamp: TimeSpec) -> Self {
        JobKind::Frame { timestamp }
    }

    pub fn label(&self) -> &'static str {
        match self {
            JobKind::Clip { .. } => "clip",
            JobKind::Frame { .. } => "frame",
        }
    }
}

/// One resolved, immutable export request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportJob {
    pub kind: JobKind,
    pub filename: String,
    pub output_folder: PathBuf,
    pub settings: EncodingSettings,
}

impl ExportJob {
    pub fn new(
        kind: JobKind,
        filename: impl Into<String>,
        output_folder: impl Into<PathBuf>,
        settings: EncodingSettings,
    ) -> Result<Self, DomainError> {
        let filename = filename.into();
        if filename.trim().is_empty() {
            return Err(DomainError::BadArgs("Filename cannot be empty".to_string()));
        }
        settings.validate()?;
        Ok(Self {
            kind,
            filename,
            output_folder: output_folder.into(),
            settings,
        })
    }

    /// Clip length in seconds, `None` for frame jobs
    pub fn duration_seconds(&self) -> Option<f64> {
        match &self.kind {
            JobKind::Clip { start, end } => Some((end.seconds - start.seconds).max(0.0)),
            JobKind::Frame { .. } => None,
        }
    }

    pub fn output_path(&self) -> PathBuf {
        self.output_folder.join(&self.filename)
    }
}

/// A job that did not export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportFailure {
    /// 1-based position in the queue
    pub index: usize,
    pub filename: String,
    pub reason: String,
}

/// Aggregate outcome of one queue flush
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExportRunResult {
    pub exported: usize,
    pub failed: usize,
    pub elapsed_seconds: f64,
    pub failures: Vec<ExportFailure>,
}

impl ExportRunResult {
    pub fn total(&self) -> usize {
        self.exported + self.failed
    }
}

/// Hosting-site class a URL belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SiteClass {
    Pinterest,
    YouTube,
    Vimeo,
    Generic,
}

impl SiteClass {
    pub fn display_name(&self) -> &'static str {
        match self {
            SiteClass::Pinterest => "Pinterest",
            SiteClass::YouTube => "YouTube",
            SiteClass::Vimeo => "Vimeo",
            SiteClass::Generic => "Generic",
        }
    }
}

impl fmt::Display for SiteClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// One fetch attempt configuration
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FetchStrategy {
    pub name: String,
    /// Browser whose cookie store is used for credentialed access
    pub browser: Option<String>,
    pub referer: Option<String>,
    pub user_agent: Option<String>,
    pub headers: BTreeMap<String, String>,
    pub extractor_args: Option<String>,
    pub format: Option<String>,
    /// Bypass geographic/IP restrictions
    pub aggressive: bool,
    #[serde(with = "duration_secs")]
    pub timeout: Duration,
}

impl FetchStrategy {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            browser: None,
            referer: None,
            user_agent: None,
            headers: BTreeMap::new(),
            extractor_args: None,
            format: None,
            aggressive: false,
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    pub fn with_browser_cookies(mut self, browser: impl Into<String>) -> Self {
        self.browser = Some(browser.into());
        self
    }

    pub fn with_referer(mut self, referer: impl Into<String>) -> Self {
        self.referer = Some(referer.into());
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    pub fn with_extractor_args(mut self, args: impl Into<String>) -> Self {
        self.extractor_args = Some(args.into());
        self
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn aggressive(mut self) -> Self {
        self.aggressive = true;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn requires_credentials(&self) -> bool {
        self.browser.is_some()
    }
}

mod duration_secs {
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(duration.as_secs())
    }
}

/// Outcome of one strategy execution
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchAttemptResult {
    pub success: bool,
    pub path: Option<PathBuf>,
    pub scratch_dir: Option<PathBuf>,
    pub stdout: String,
    pub stderr: String,
    /// The process outlived its time budget and was killed
    pub timed_out: bool,
}

impl FetchAttemptResult {
    pub fn success(path: PathBuf, scratch_dir: &Path, stdout: String) -> Self {
        Self {
            success: true,
            path: Some(path),
            scratch_dir: Some(scratch_dir.to_path_buf()),
            stdout,
            ..Self::default()
        }
    }

    pub fn failure(scratch_dir: Option<&Path>, stdout: String, stderr: String) -> Self {
        Self {
            scratch_dir: scratch_dir.map(Path::to_path_buf),
            stdout,
            stderr,
            ..Self::default()
        }
    }

    pub fn timeout(scratch_dir: &Path, stdout: String, timeout: Duration) -> Self {
        Self {
            scratch_dir: Some(scratch_dir.to_path_buf()),
            stdout,
            stderr: format!(
                "Timeout: Process took longer than {} seconds",
                timeout.as_secs()
            ),
            timed_out: true,
            ..Self::default()
        }
    }
}

/// Notifications emitted while a request runs
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum AppEvent {
    DownloadStatus { message: String },
    DownloadProgress { percent: f64 },
    ExportProgress {
        current: usize,
        total: usize,
        filename: String,
    },
}
