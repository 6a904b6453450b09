// Ports - Interface definitions (contracts)

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::errors::*;
use crate::domain::model::*;

/// One external tool invocation
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessRequest {
    pub program: PathBuf,
    pub args: Vec<String>,
    /// Time budget; `None` runs until exit
    pub timeout: Option<Duration>,
    /// Wait between the graceful termination signal and the forceful kill
    pub kill_grace: Duration,
}

impl ProcessRequest {
    pub const DEFAULT_KILL_GRACE: Duration = Duration::from_secs(3);

    pub fn new(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            timeout: None,
            kill_grace: Self::DEFAULT_KILL_GRACE,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_kill_grace(mut self, grace: Duration) -> Self {
        self.kill_grace = grace;
        self
    }
}

/// Captured outcome of a finished (or killed) process
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessOutput {
    /// `None` when the process was terminated by a signal
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub timed_out: bool,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        !self.timed_out && self.exit_code == Some(0)
    }
}

/// Port for launching external tools
#[async_trait]
pub trait ProcessPort: Send + Sync {
    /// Run to completion; `on_stdout` sees every standard-output chunk in arrival order.
    /// Launch failures are errors, nonzero exits and timeouts are not.
    async fn run(
        &self,
        request: &ProcessRequest,
        on_stdout: &(dyn for<'a> Fn(&'a str) + Send + Sync),
    ) -> Result<ProcessOutput, DomainError>;
}

/// Port for file system operations
#[async_trait]
pub trait FsPort: Send + Sync {
    /// Create a fresh, uniquely named scratch directory under `root` (system temp when `None`)
    async fn create_scratch_dir(&self, root: Option<&Path>) -> Result<PathBuf, DomainError>;

    /// Create directory (including parent directories); succeeds if it already exists
    async fn create_dir_all(&self, dir: &Path) -> Result<(), DomainError>;

    /// Regular files directly inside `dir`
    async fn list_files(&self, dir: &Path) -> Result<Vec<PathBuf>, DomainError>;

    /// Delete directory recursively
    async fn remove_dir_all(&self, dir: &Path) -> Result<(), DomainError>;
}

/// Port for progress and status notifications
pub trait EventPort: Send + Sync {
    fn emit(&self, event: AppEvent);
}
