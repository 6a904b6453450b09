// Domain rules - Business logic and policies

use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

use regex::Regex;

use crate::domain::model::*;

const CHROME_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
const FIREFOX_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:121.0) Gecko/20100101 Firefox/121.0";
const BROWSER_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";

/// Business rules for mapping a URL onto a site class
pub struct SiteClassifier;

impl SiteClassifier {
    /// Case-sensitive host-fragment match; the first class with a hit wins
    pub fn classify(url: &str) -> SiteClass {
        const MARKERS: &[(SiteClass, &[&str])] = &[
            (SiteClass::Pinterest, &["pinterest.com", "pin.it"]),
            (SiteClass::YouTube, &["youtube.com", "youtu.be"]),
            (SiteClass::Vimeo, &["vimeo.com"]),
        ];

        MARKERS
            .iter()
            .find(|(_, needles)| needles.iter().any(|needle| url.contains(needle)))
            .map(|(class, _)| *class)
            .unwrap_or(SiteClass::Generic)
    }
}

/// Canned, ordered retry strategies per site class
pub struct StrategyCatalog;

impl StrategyCatalog {
    pub fn for_url(url: &str) -> (SiteClass, Vec<FetchStrategy>) {
        let site = SiteClassifier::classify(url);
        (site, Self::strategies_for(site))
    }

    /// Credentialed strategies first; every list ends with one that needs no cookies
    pub fn strategies_for(site: SiteClass) -> Vec<FetchStrategy> {
        match site {
            SiteClass::Pinterest => Self::pinterest(),
            SiteClass::YouTube => Self::youtube(),
            SiteClass::Vimeo => Self::vimeo(),
            SiteClass::Generic => Self::generic(),
        }
    }

    fn pinterest() -> Vec<FetchStrategy> {
        let timeout = Duration::from_secs(90);
        let referer = "https://www.pinterest.com/";
        vec![
            FetchStrategy::new("Pinterest with Chrome cookies")
                .with_browser_cookies("chrome")
                .with_referer(referer)
                .with_user_agent(CHROME_USER_AGENT)
                .with_header("Accept", BROWSER_ACCEPT)
                .with_header("Accept-Language", "en-US,en;q=0.9")
                .with_header("DNT", "1")
                .with_header("Upgrade-Insecure-Requests", "1")
                .with_timeout(timeout),
            FetchStrategy::new("Pinterest with Firefox cookies")
                .with_browser_cookies("firefox")
                .with_referer(referer)
                .with_user_agent(FIREFOX_USER_AGENT)
                .with_timeout(timeout),
            FetchStrategy::new("Pinterest without cookies")
                .with_referer(referer)
                .with_user_agent(CHROME_USER_AGENT)
                .with_header("Accept", BROWSER_ACCEPT)
                .with_header("Accept-Language", "en-US,en;q=0.9")
                .with_timeout(timeout),
        ]
    }

    fn youtube() -> Vec<FetchStrategy> {
        let timeout = Duration::from_secs(180);
        let format = "best[ext=mp4]/best";
        vec![
            FetchStrategy::new("YouTube with Chrome cookies")
                .with_browser_cookies("chrome")
                .with_format(format)
                .with_timeout(timeout),
            FetchStrategy::new("YouTube with Firefox cookies")
                .with_browser_cookies("firefox")
                .with_format(format)
                .with_timeout(timeout),
            FetchStrategy::new("YouTube without cookies")
                .with_format(format)
                .with_timeout(timeout),
        ]
    }

    fn vimeo() -> Vec<FetchStrategy> {
        let timeout = Duration::from_secs(120);
        let referer = "https://vimeo.com/";
        let extractor_args = "vimeo:api_version=3.4";
        vec![
            FetchStrategy::new("Vimeo with Chrome cookies")
                .with_browser_cookies("chrome")
                .with_referer(referer)
                .with_extractor_args(extractor_args)
                .with_timeout(timeout),
            FetchStrategy::new("Vimeo with Firefox cookies")
                .with_browser_cookies("firefox")
                .with_referer(referer)
                .with_extractor_args(extractor_args)
                .with_timeout(timeout),
            FetchStrategy::new("Vimeo without cookies, aggressive")
                .with_referer(referer)
                .with_user_agent(CHROME_USER_AGENT)
                .with_extractor_args(extractor_args)
                .aggressive()
                .with_timeout(timeout),
        ]
    }

    fn generic() -> Vec<FetchStrategy> {
        vec![FetchStrategy::new("Default download")
            .with_user_agent(CHROME_USER_AGENT)
            .with_timeout(Duration::from_secs(120))]
    }
}

/// One classification rule: fires when the captured error text contains any needle
#[derive(Debug, Clone, Copy)]
pub struct FailureRule {
    pub needles: &'static [&'static str],
    pub message: &'static str,
}

impl FailureRule {
    pub fn matches(&self, stderr: &str) -> bool {
        self.needles.iter().any(|needle| stderr.contains(needle))
    }
}

const PINTEREST_RULES: &[FailureRule] = &[
    FailureRule {
        needles: &["No video formats found", "Unsupported URL"],
        message: "No video found on this Pinterest pin.\n\nThis pin may contain only images, not videos. Pinterest also has strict bot protection which can block downloads.",
    },
    FailureRule {
        needles: &["HTTP Error 404"],
        message: "Pinterest pin not found (404).\n\nCheck if the URL is correct.",
    },
    FailureRule {
        needles: &["Unable to download JSON metadata", "HTTP Error 403"],
        message: "Pinterest blocked the download.\n\nPinterest has very aggressive bot protection. Try:\n1. Log into Pinterest in your browser\n2. View the pin to confirm it has a video\n3. Close all browser windows\n4. Try again\n\nNote: Some Pinterest videos may not be downloadable due to restrictions.",
    },
];

const YOUTUBE_RULES: &[FailureRule] = &[
    FailureRule {
        needles: &["Sign in to confirm", "requires login"],
        message: "YouTube requires authentication.\n\nLog into YouTube in your browser, close all windows, then try again.",
    },
    FailureRule {
        needles: &["Private video"],
        message: "This is a private YouTube video.\n\nLog into the correct YouTube account in your browser.",
    },
    FailureRule {
        needles: &["HTTP Error 404"],
        message: "Video not found (404).",
    },
];

const VIMEO_RULES: &[FailureRule] = &[
    FailureRule {
        needles: &["logged-in", "HTTP Error 401", "requires login"],
        message: "Vimeo requires authentication.\n\nLog into Vimeo in your browser, close all windows, then try again.",
    },
    FailureRule {
        needles: &["HTTP Error 404"],
        message: "Vimeo video not found (404).",
    },
    FailureRule {
        needles: &["HTTP Error 403"],
        message: "Vimeo refused the download (403).\n\nThe video may be embed-only or restricted to certain domains.",
    },
];

/// Turns the last captured error text into one human-readable message
pub struct FailureClassifier;

impl FailureClassifier {
    const TAIL_LINES: usize = 5;
    const TAIL_CHARS: usize = 300;

    pub fn rules_for(site: SiteClass) -> &'static [FailureRule] {
        match site {
            SiteClass::Pinterest => PINTEREST_RULES,
            SiteClass::YouTube => YOUTUBE_RULES,
            SiteClass::Vimeo => VIMEO_RULES,
            SiteClass::Generic => &[],
        }
    }

    /// First matching rule wins; otherwise a generic message with the error tail
    pub fn classify(site: SiteClass, stderr: &str) -> String {
        if let Some(rule) = Self::rules_for(site).iter().find(|rule| rule.matches(stderr)) {
            return rule.message.to_string();
        }

        let heading = match site {
            SiteClass::Generic => "Download failed:".to_string(),
            other => format!("{} download failed:", other.display_name()),
        };
        let tail = Self::error_tail(stderr);
        if tail.is_empty() {
            format!(
                "{}\n\nDownload failed after trying all available methods.",
                heading
            )
        } else {
            format!("{}\n\n{}", heading, tail)
        }
    }

    /// Last few non-warning lines, bounded in length
    pub fn error_tail(stderr: &str) -> String {
        let lines: Vec<&str> = stderr
            .lines()
            .filter(|line| !line.trim().is_empty() && !line.contains("WARNING"))
            .collect();
        let start = lines.len().saturating_sub(Self::TAIL_LINES);
        lines[start..]
            .join("\n")
            .chars()
            .take(Self::TAIL_CHARS)
            .collect()
    }
}

/// Pulls download percentages out of fetch-tool output
pub struct ProgressParser;

impl ProgressParser {
    fn pattern() -> Option<&'static Regex> {
        static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
        PATTERN
            .get_or_init(|| Regex::new(r"(\d+\.\d+)%").ok())
            .as_ref()
    }

    /// Latest percentage in the chunk, if any
    pub fn extract_percent(chunk: &str) -> Option<f64> {
        Self::pattern()?
            .captures_iter(chunk)
            .filter_map(|caps| caps.get(1)?.as_str().parse::<f64>().ok())
            .last()
    }
}

/// Output filename rules shared by the session and the export orchestrator
pub struct OutputNaming;

impl OutputNaming {
    const FRAME_EXTENSIONS: &'static [&'static str] = &["jpg", "jpeg", "png"];

    /// Expected extension for a job kind under the given effective codec
    pub fn extension_for(kind: &JobKind, codec: Codec) -> &'static str {
        match kind {
            JobKind::Clip { .. } => codec.extension(),
            JobKind::Frame { .. } => "jpg",
        }
    }

    /// Rewrite `filename` so its extension matches the effective codec
    pub fn corrected_filename(filename: &str, kind: &JobKind, codec: Codec) -> String {
        let current = Self::extension_of(filename);
        let expected = Self::extension_for(kind, codec);
        let keep = match kind {
            JobKind::Clip { .. } => current.as_deref() == Some(expected),
            JobKind::Frame { .. } => current
                .as_deref()
                .is_some_and(|ext| Self::FRAME_EXTENSIONS.contains(&ext)),
        };
        if keep {
            return filename.to_string();
        }
        format!("{}.{}", Self::stem_of(filename), expected)
    }

    /// Lowercase extension after the last dot, ignoring a leading dot
    pub fn extension_of(filename: &str) -> Option<String> {
        match filename.rfind('.') {
            Some(0) | None => None,
            Some(index) => Some(filename[index + 1..].to_lowercase()),
        }
    }

    pub fn stem_of(filename: &str) -> &str {
        match filename.rfind('.') {
            Some(0) | None => filename,
            Some(index) => &filename[..index],
        }
    }
}

/// Picks the produced media file out of a scratch directory listing
pub struct DownloadedFileSelector;

impl DownloadedFileSelector {
    /// Fixed base name the fetch tool is told to write
    pub const BASE_NAME: &'static str = "video";

    const PARTIAL_EXTENSIONS: &'static [&'static str] = &["part", "ytdl", "temp", "tmp"];
    const PREFERRED_CONTAINERS: &'static [&'static str] = &["mp4", "mkv", "webm", "mov"];

    /// Candidates share the base name exactly (format-split intermediates like
    /// `video.f137.mp4` and partial downloads are skipped). Among several, the
    /// preferred container order decides, then the name.
    pub fn select(entries: &[PathBuf]) -> Option<PathBuf> {
        let mut candidates: Vec<&PathBuf> = entries
            .iter()
            .filter(|path| Self::is_candidate(path))
            .collect();
        candidates.sort_by_key(|path| {
            (
                Self::container_rank(path),
                path.file_name().map(|n| n.to_os_string()),
            )
        });
        candidates.first().map(|path| (*path).clone())
    }

    fn is_candidate(path: &Path) -> bool {
        let stem_matches = path
            .file_stem()
            .is_some_and(|stem| stem == Self::BASE_NAME);
        let extension = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase());
        stem_matches
            && extension
                .as_deref()
                .is_some_and(|ext| !Self::PARTIAL_EXTENSIONS.contains(&ext))
    }

    fn container_rank(path: &Path) -> usize {
        let extension = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        Self::PREFERRED_CONTAINERS
            .iter()
            .position(|preferred| *preferred == extension)
            .unwrap_or(Self::PREFERRED_CONTAINERS.len())
    }
}
