//! Claude CLI process backend
//!
//! Every invocation spawns one `claude -p` process. A reader task forwards
//! parsed stdout lines into the [`BackendStream`] channel and enforces the
//! wall-clock timeout of the request's [`ExecutionConfig`].
//!
//! [`ExecutionConfig`]: council_domain::ExecutionConfig

use super::error::ClaudeCliError;
use super::protocol::parse_line;
use crate::config::FileBackendConfig;
use async_trait::async_trait;
use council_application::{AgentBackend, BackendError, BackendRequest, BackendStream};
use council_domain::BackendEvent;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::{Child, ChildStderr, ChildStdout, Command};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

type EventSender = mpsc::Sender<Result<BackendEvent, BackendError>>;

/// How the stdout reader stopped.
enum ReadEnd {
    /// A `result` line was forwarded.
    Completed,
    /// stdout closed before a `result` line.
    Eof,
    /// The consumer dropped the stream.
    Abandoned,
}

/// [`AgentBackend`] that drives the Claude CLI in print mode.
#[derive(Debug, Clone)]
pub struct ClaudeCliBackend {
    command: String,
    model: Option<String>,
    extra_args: Vec<String>,
}

impl ClaudeCliBackend {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            model: None,
            extra_args: Vec::new(),
        }
    }

    pub fn from_config(config: &FileBackendConfig) -> Self {
        Self {
            command: config.command.clone(),
            model: config.model.clone(),
            extra_args: config.extra_args.clone(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_extra_args(mut self, args: Vec<String>) -> Self {
        self.extra_args = args;
        self
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    /// Whether the configured executable can be found on `PATH`.
    pub fn is_available(&self) -> bool {
        which::which(&self.command).is_ok()
    }

    /// Command-line arguments for one request.
    pub fn build_args(&self, request: &BackendRequest) -> Vec<String> {
        let config = &request.config;
        let mut args = vec![
            "-p".to_string(),
            request.prompt.clone(),
            "--output-format".to_string(),
            "stream-json".to_string(),
            "--verbose".to_string(),
            "--max-turns".to_string(),
            config.max_turns().to_string(),
            "--max-budget-usd".to_string(),
            config.max_budget_usd().to_string(),
        ];
        if !request.instructions.trim().is_empty() {
            args.push("--append-system-prompt".to_string());
            args.push(request.instructions.clone());
        }
        if let Some(model) = &self.model {
            args.push("--model".to_string());
            args.push(model.clone());
        }
        args.extend(self.extra_args.iter().cloned());
        args
    }

    fn spawn(&self, request: &BackendRequest) -> Result<Child, ClaudeCliError> {
        let program = which::which(&self.command)
            .map_err(|e| ClaudeCliError::NotFound(format!("{}: {}", self.command, e)))?;

        debug!(
            agent = %request.agent_id,
            "Spawning {} (max_turns={}, budget=${:.2}, timeout={}s)",
            program.display(),
            request.config.max_turns(),
            request.config.max_budget_usd(),
            request.config.timeout_seconds()
        );

        let child = Command::new(program)
            .args(self.build_args(request))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(ClaudeCliError::SpawnError)?;
        Ok(child)
    }
}

impl Default for ClaudeCliBackend {
    fn default() -> Self {
        Self::from_config(&FileBackendConfig::default())
    }
}

#[async_trait]
impl AgentBackend for ClaudeCliBackend {
    async fn invoke(&self, request: &BackendRequest) -> Result<BackendStream, BackendError> {
        if request.prompt.trim().is_empty() {
            return Err(BackendError::InvalidRequest("prompt is empty".to_string()));
        }

        let mut child = self.spawn(request)?;
        let stdout = child.stdout.take().ok_or_else(|| {
            BackendError::Spawn("Failed to capture Claude CLI stdout".to_string())
        })?;
        let stderr = child.stderr.take();

        let (tx, rx) = mpsc::channel(64);
        tokio::spawn(drive_process(
            child,
            stdout,
            stderr,
            tx,
            request.agent_id.clone(),
            request.config.timeout(),
        ));

        Ok(BackendStream::new(rx))
    }
}

/// Pump one process to completion, forwarding its events into `tx`.
async fn drive_process(
    mut child: Child,
    stdout: ChildStdout,
    stderr: Option<ChildStderr>,
    tx: EventSender,
    agent_id: String,
    timeout: Duration,
) {
    let stderr_task = stderr.map(|mut stderr| {
        tokio::spawn(async move {
            let mut buf = String::new();
            let _ = stderr.read_to_string(&mut buf).await;
            buf
        })
    });

    let end = match tokio::time::timeout(timeout, forward_events(stdout, &tx, &agent_id)).await {
        Ok(Ok(end)) => end,
        Ok(Err(e)) => {
            warn!(agent = %agent_id, "Failed reading Claude CLI output: {}", e);
            let _ = child.start_kill();
            let _ = tx.send(Err(e.into())).await;
            return;
        }
        Err(_) => {
            warn!(
                agent = %agent_id,
                "Timed out after {}s, killing Claude CLI",
                timeout.as_secs()
            );
            let _ = child.start_kill();
            let _ = child.wait().await;
            let _ = tx
                .send(Err(ClaudeCliError::Timeout(timeout.as_secs()).into()))
                .await;
            return;
        }
    };

    match end {
        ReadEnd::Completed => {
            let _ = child.wait().await;
        }
        ReadEnd::Abandoned => {
            debug!(agent = %agent_id, "Stream dropped, killing Claude CLI");
            let _ = child.start_kill();
        }
        ReadEnd::Eof => {
            let status = match child.wait().await {
                Ok(status) => status.to_string(),
                Err(e) => e.to_string(),
            };
            let stderr = match stderr_task {
                Some(handle) => handle.await.unwrap_or_default(),
                None => String::new(),
            };
            let err = ClaudeCliError::Exited {
                status,
                stderr: stderr.trim().to_string(),
            };
            warn!(agent = %agent_id, "{}", err);
            let _ = tx.send(Err(err.into())).await;
        }
    }
}

async fn forward_events(
    stdout: ChildStdout,
    tx: &EventSender,
    agent_id: &str,
) -> Result<ReadEnd, ClaudeCliError> {
    let mut lines = BufReader::new(stdout).lines();

    while let Some(line) = lines.next_line().await? {
        let events = match parse_line(&line) {
            Ok(events) => events,
            Err(e) => {
                // The CLI occasionally prints plain-text notices on stdout.
                debug!(agent = %agent_id, "Skipping unparseable line: {}", e);
                continue;
            }
        };

        for event in events {
            let terminal = event.is_terminal();
            if terminal {
                info!(agent = %agent_id, "Claude CLI reported result");
            }
            if tx.send(Ok(event)).await.is_err() {
                return Ok(ReadEnd::Abandoned);
            }
            if terminal {
                return Ok(ReadEnd::Completed);
            }
        }
    }

    Ok(ReadEnd::Eof)
}
