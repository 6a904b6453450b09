// Test doubles for the ports

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::errors::DomainError;
use crate::ports::*;

/// One scripted process outcome
#[derive(Debug, Clone)]
pub enum Step {
    /// Exit 0 after writing `files` next to the `-o` output template
    Produce { files: Vec<&'static str>, stdout: &'static str },
    /// Exit 0 with the given standard output
    Print(&'static str),
    Exit { code: i32, stderr: &'static str },
    Timeout,
    LaunchError,
}

/// Process port that replays a script and records every request
#[derive(Default)]
pub struct FakeProcess {
    script: Mutex<VecDeque<Step>>,
    requests: Mutex<Vec<ProcessRequest>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeProcess {
    pub fn new(steps: Vec<Step>) -> Self {
        Self {
            script: Mutex::new(steps.into()),
            ..Self::default()
        }
    }

    pub fn requests(&self) -> Vec<ProcessRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Directory of the `-o` template, i.e. the attempt's scratch directory
    pub fn output_dir(request: &ProcessRequest) -> PathBuf {
        let index = request.args.iter().position(|arg| arg == "-o").unwrap();
        Path::new(&request.args[index + 1]).parent().unwrap().to_path_buf()
    }
}

#[async_trait]
impl ProcessPort for FakeProcess {
    async fn run(
        &self,
        request: &ProcessRequest,
        on_stdout: &(dyn for<'a> Fn(&'a str) + Send + Sync),
    ) -> Result<ProcessOutput, DomainError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());

        tokio::task::yield_now().await;

        let step = self.script.lock().unwrap().pop_front();
        let step = step.unwrap_or(Step::Exit {
            code: 1,
            stderr: "unscripted call",
        });
        let result = match step {
            Step::Produce { files, stdout } => {
                let dir = Self::output_dir(request);
                for file in files {
                    std::fs::write(dir.join(file), b"media").unwrap();
                }
                on_stdout(stdout);
                Ok(ProcessOutput {
                    exit_code: Some(0),
                    stdout: stdout.to_string(),
                    ..ProcessOutput::default()
                })
            }
            Step::Print(stdout) => {
                on_stdout(stdout);
                Ok(ProcessOutput {
                    exit_code: Some(0),
                    stdout: stdout.to_string(),
                    ..ProcessOutput::default()
                })
            }
            Step::Exit { code, stderr } => Ok(ProcessOutput {
                exit_code: Some(code),
                stderr: stderr.to_string(),
                ..ProcessOutput::default()
            }),
            Step::Timeout => Ok(ProcessOutput {
                timed_out: true,
                ..ProcessOutput::default()
            }),
            Step::LaunchError => Err(DomainError::ProcessLaunch(format!(
                "{}: No such file or directory",
                request.program.display()
            ))),
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}
