//! Terminal rendering of results and progress events

use std::io::Write;
use std::path::Path;

use serde::Serialize;
use serde_json::json;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;
use tracing::warn;

use crate::domain::model::{AppEvent, ExportRunResult, FetchStrategy, SiteClass, TimeSpec};
use crate::utils::Utils;

/// Writes command output either as text or as JSON lines on stdout.
/// Progress goes to stderr in text mode so stdout stays scriptable.
#[derive(Debug, Clone, Copy, Default)]
pub struct Reporter {
    json: bool,
}

impl Reporter {
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    pub fn is_json(&self) -> bool {
        self.json
    }

    /// Print events as they arrive until every sender is dropped
    pub fn spawn_event_printer(self, mut events: UnboundedReceiver<AppEvent>) -> JoinHandle<()> {
        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                self.event(&event);
            }
        })
    }

    pub fn event(&self, event: &AppEvent) {
        if self.json {
            self.json_line(event);
            return;
        }
        match event {
            AppEvent::DownloadStatus { message } => eprintln!("{}", message),
            AppEvent::DownloadProgress { percent } => eprintln!("  {:5.1}%", percent),
            AppEvent::ExportProgress {
                current,
                total,
                filename,
            } => eprintln!("[{}/{}] {}", current, total, filename),
        }
    }

    pub fn fetched(&self, path: &Path, size: Option<u64>) {
        if self.json {
            self.json_line(&json!({ "result": "fetch", "path": path, "size_bytes": size }));
            return;
        }
        if let Some(size) = size {
            eprintln!("Downloaded {}", Utils::format_file_size(size));
        }
        println!("{}", path.display());
    }

    pub fn duration(&self, path: &Path, seconds: f64) {
        if self.json {
            self.json_line(&json!({
                "result": "probe",
                "path": path,
                "duration_seconds": seconds,
            }));
        } else {
            println!("{} ({}s)", TimeSpec::from_seconds(seconds).to_timecode(), seconds);
        }
    }

    pub fn strategies(&self, site: SiteClass, strategies: &[FetchStrategy]) {
        if self.json {
            self.json_line(&json!({
                "result": "strategies",
                "site": site.display_name(),
                "strategies": strategies,
            }));
            return;
        }

        println!("Site: {}", site);
        for (index, strategy) in strategies.iter().enumerate() {
            let cookies = strategy
                .browser
                .as_deref()
                .map(|browser| format!(", cookies from {}", browser))
                .unwrap_or_default();
            println!(
                "  {}. {} (timeout {}s{})",
                index + 1,
                strategy.name,
                strategy.timeout.as_secs(),
                cookies
            );
        }
    }

    pub fn export_result(&self, result: &ExportRunResult) {
        if self.json {
            self.json_line(&json!({ "result": "export", "summary": result }));
            return;
        }

        println!(
            "Exported {} of {} items in {}",
            result.exported,
            result.total(),
            Utils::format_duration(std::time::Duration::from_secs_f64(result.elapsed_seconds))
        );
        for failure in &result.failures {
            println!("  #{} {}: {}", failure.index, failure.filename, failure.reason);
        }
    }

    pub fn error(&self, message: &str) {
        if self.json {
            self.json_line(&json!({ "error": message }));
        } else {
            eprintln!("Error: {}", message);
        }
    }

    fn json_line<T: Serialize + ?Sized>(&self, value: &T) {
        match serde_json::to_string(value) {
            Ok(line) => {
                let mut stdout = std::io::stdout().lock();
                let _ = writeln!(stdout, "{}", line);
                let _ = stdout.flush();
            }
            Err(e) => warn!("Could not serialize output: {}", e),
        }
    }
}
