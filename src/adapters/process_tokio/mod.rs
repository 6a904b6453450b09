// Tokio process adapter - Runs external tools with streamed output and timeout escalation

use std::process::{ExitStatus, Stdio};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::domain::errors::*;
use crate::ports::*;

const READ_CHUNK: usize = 8192;
/// How long pipes may stay open after the process itself is gone
const PIPE_DRAIN_LIMIT: Duration = Duration::from_millis(500);

/// Re-assembles raw pipe reads into whole lines ending in `\n` or `\r`
#[derive(Debug, Default)]
struct LineBuffer {
    pending: Vec<u8>,
}

impl LineBuffer {
    /// Append `bytes`; returns the completed lines, terminators included
    fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(bytes);
        let mut lines = Vec::new();
        while let Some(end) = self.pending.iter().position(|b| *b == b'\n' || *b == b'\r') {
            let line: Vec<u8> = self.pending.drain(..=end).collect();
            lines.push(String::from_utf8_lossy(&line).into_owned());
        }
        lines
    }

    /// Unterminated tail left once the pipe closes
    fn finish(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            return None;
        }
        let rest = std::mem::take(&mut self.pending);
        Some(String::from_utf8_lossy(&rest).into_owned())
    }
}

/// Process adapter backed by `tokio::process`
#[derive(Debug, Clone, Default)]
pub struct TokioProcessAdapter;

impl TokioProcessAdapter {
    pub fn new() -> Self {
        Self
    }

    /// Graceful termination first, forceful kill once `grace` elapses
    async fn terminate(child: &mut Child, grace: Duration) {
        #[cfg(unix)]
        if let Some(pid) = child.id() {
            // SAFETY: plain signal delivery to a pid we spawned and have not reaped yet
            let rc = unsafe { libc::kill(pid as libc::pid_t, libc::SIGTERM) };
            if rc == 0 {
                if let Ok(Ok(status)) = tokio::time::timeout(grace, child.wait()).await {
                    debug!(?status, "Process exited after SIGTERM");
                    return;
                }
            }
        }

        warn!("Process ignored graceful termination, killing");
        if let Err(e) = child.kill().await {
            warn!("Failed to kill process: {}", e);
        }
    }

    /// Spawn a task that accumulates everything read from `reader`
    fn collect<R>(mut reader: R) -> (Arc<Mutex<Vec<u8>>>, tokio::task::JoinHandle<()>)
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let sink = Arc::new(Mutex::new(Vec::new()));
        let task_sink = Arc::clone(&sink);
        let handle = tokio::spawn(async move {
            let mut buf = vec![0u8; READ_CHUNK];
            loop {
                match reader.read(&mut buf).await {
                    Ok(0) | Err(_) => break,
                    Ok(n) => {
                        if let Ok(mut bytes) = task_sink.lock() {
                            bytes.extend_from_slice(&buf[..n]);
                        }
                    }
                }
            }
        });
        (sink, handle)
    }

    async fn finish_collect(
        sink: Arc<Mutex<Vec<u8>>>,
        handle: tokio::task::JoinHandle<()>,
    ) -> String {
        let abort = handle.abort_handle();
        if tokio::time::timeout(PIPE_DRAIN_LIMIT, handle).await.is_err() {
            abort.abort();
        }
        let text = sink
            .lock()
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
            .unwrap_or_default();
        text
    }

    async fn wait_deadline(deadline: Option<Instant>) {
        match deadline {
            Some(deadline) => tokio::time::sleep_until(deadline).await,
            None => std::future::pending::<()>().await,
        }
    }
}

#[async_trait]
impl ProcessPort for TokioProcessAdapter {
    async fn run(
        &self,
        request: &ProcessRequest,
        on_stdout: &(dyn for<'a> Fn(&'a str) + Send + Sync),
    ) -> Result<ProcessOutput, DomainError> {
        debug!(program = %request.program.display(), args = ?request.args, "Spawning process");

        let mut child = Command::new(&request.program)
            .args(&request.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                DomainError::ProcessLaunch(format!("{}: {}", request.program.display(), e))
            })?;

        let mut stdout = child
            .stdout
            .take()
            .ok_or_else(|| DomainError::InternalError("stdout was not captured".to_string()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| DomainError::InternalError("stderr was not captured".to_string()))?;
        let (stderr_sink, stderr_task) = Self::collect(stderr);

        let deadline = request.timeout.map(|timeout| Instant::now() + timeout);
        let mut captured = String::new();
        let mut lines = LineBuffer::default();
        let mut buf = vec![0u8; READ_CHUNK];
        let mut stdout_open = true;

        let status: Option<ExitStatus> = loop {
            tokio::select! {
                read = stdout.read(&mut buf), if stdout_open => match read {
                    Ok(0) | Err(_) => stdout_open = false,
                    Ok(n) => {
                        for line in lines.push(&buf[..n]) {
                            on_stdout(&line);
                            captured.push_str(&line);
                        }
                    }
                },
                waited = child.wait() => {
                    let status = waited.map_err(|e| {
                        DomainError::ProcessLaunch(format!("Failed waiting for process: {}", e))
                    })?;
                    break Some(status);
                }
                _ = Self::wait_deadline(deadline) => break None,
            }
        };

        let timed_out = status.is_none();
        if timed_out {
            warn!(
                program = %request.program.display(),
                timeout = ?request.timeout,
                "Process timed out"
            );
            Self::terminate(&mut child, request.kill_grace).await;
        }

        // Output written just before exit may still be buffered in the pipe
        if stdout_open {
            let drain = async {
                loop {
                    match stdout.read(&mut buf).await {
                        Ok(0) | Err(_) => break,
                        Ok(n) => {
                            for line in lines.push(&buf[..n]) {
                                on_stdout(&line);
                                captured.push_str(&line);
                            }
                        }
                    }
                }
            };
            let _ = tokio::time::timeout(PIPE_DRAIN_LIMIT, drain).await;
        }
        if let Some(rest) = lines.finish() {
            on_stdout(&rest);
            captured.push_str(&rest);
        }

        let stderr_text = Self::finish_collect(stderr_sink, stderr_task).await;
        let exit_code = status.and_then(|status| status.code());
        debug!(?exit_code, timed_out, "Process finished");

        Ok(ProcessOutput {
            exit_code,
            stdout: captured,
            stderr: stderr_text,
            timed_out,
        })
    }
}
