// src/exec/process.rs

//! Engine backend that drives a long-lived interpreter child process.
//!
//! The child runs a small bridge script that speaks the JSON-lines protocol
//! in [`protocol`](super::protocol): it imports the engine module once, then
//! runs one invocation at a time, streaming output records back until a
//! terminal record.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command as ProcessCommand};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::exec::backend::{EngineBackend, EngineFault, EngineFuture};
use crate::exec::command::{Command, ResultRow};
use crate::exec::protocol::{Record, Request};
use crate::host::{HostAdapter, HostError};

const EXIT_GRACE: Duration = Duration::from_secs(5);

#[derive(Debug)]
pub struct ProcessEngine {
    program: String,
    args: Vec<String>,
    context: Option<EngineContext>,
    /// Set when a transport fault left the context unusable.
    broken: Option<String>,
}

#[derive(Debug)]
struct EngineContext {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
    line: Vec<u8>,
    host: HostAdapter,
    stderr_task: Option<JoinHandle<()>>,
}

impl ProcessEngine {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            context: None,
            broken: None,
        }
    }

    async fn start(&mut self, module: &Path, host: HostAdapter) -> Result<(), EngineFault> {
        if self.context.is_some() {
            return Err(EngineFault::Transport("engine context already open".into()));
        }

        info!(program = %self.program, args = ?self.args, "starting engine process");

        let mut child = ProcessCommand::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                EngineFault::Transport(format!("spawning engine process '{}': {e}", self.program))
            })?;

        let (Some(stdin), Some(stdout)) = (child.stdin.take(), child.stdout.take()) else {
            return Err(EngineFault::Transport("engine process stdio not captured".into()));
        };

        // Always consume stderr so the pipe never fills; it belongs on the
        // error channel.
        let stderr_task = child.stderr.take().map(|stderr| {
            let host = host.clone();
            tokio::spawn(async move {
                let mut reader = BufReader::new(stderr);
                let mut line = Vec::new();
                while matches!(reader.read_until(b'\n', &mut line).await, Ok(n) if n > 0) {
                    let text = String::from_utf8_lossy(&line);
                    host.on_error_line(text.trim_end_matches(['\n', '\r']));
                    line.clear();
                }
            })
        });

        let mut ctx = EngineContext {
            child,
            stdin,
            stdout: BufReader::new(stdout),
            line: Vec::new(),
            host,
            stderr_task,
        };

        let import = Request::Import {
            module: module.display().to_string(),
        };
        match ctx.request(&import).await {
            Ok(_) => {
                debug!(module = %module.display(), "engine module imported");
                self.context = Some(ctx);
                self.broken = None;
                Ok(())
            }
            Err(fault) => {
                ctx.shutdown().await;
                Err(fault)
            }
        }
    }

    async fn run(&mut self, command: Command) -> Result<Vec<ResultRow>, EngineFault> {
        let Some(ctx) = self.context.as_mut() else {
            return Err(EngineFault::Transport(match &self.broken {
                Some(cause) => format!("engine context unusable after earlier fault: {cause}"),
                None => "engine context not open".into(),
            }));
        };

        let result = ctx.request(&Request::from(&command)).await;

        // The rest of that request may still be in the pipe; nothing read
        // from this context can be trusted any more.
        if let Err(EngineFault::Transport(cause)) = &result {
            warn!(verb = %command.verb(), %cause, "engine context broken; shutting it down");
            self.broken = Some(cause.clone());
            if let Some(ctx) = self.context.take() {
                ctx.shutdown().await;
            }
        }
        result
    }

    async fn stop(&mut self) -> Result<(), EngineFault> {
        match self.context.take() {
            Some(ctx) => {
                ctx.shutdown().await;
                Ok(())
            }
            // Already shut down when it broke.
            None if self.broken.take().is_some() => Ok(()),
            None => Err(EngineFault::Transport("engine context not open".into())),
        }
    }
}

impl EngineContext {
    /// Send one request and route records until it terminates.
    async fn request(&mut self, request: &Request) -> Result<Vec<ResultRow>, EngineFault> {
        send(&mut self.stdin, request).await?;

        let mut rows = Vec::new();
        let mut refused: Option<HostError> = None;

        loop {
            let line = self.next_line().await?;

            if line.trim().is_empty() {
                continue;
            }

            let record = match Record::parse(line.trim()) {
                Ok(record) => record,
                Err(_) => {
                    // Bridges may let plain host output through unwrapped.
                    self.host.on_line(&line);
                    continue;
                }
            };

            match record {
                Record::Text { text } => self.host.on_text(&text),
                Record::Line { text } => self.host.on_line(&text),
                Record::Error { text } => self.host.on_error_line(&text),
                Record::Warning { text } => self.host.on_warning_line(&text),
                Record::Verbose { text } => self.host.on_verbose_line(&text),
                Record::Debug { text } => self.host.on_debug_line(&text),
                Record::Progress {
                    source_id,
                    percent,
                    activity,
                } => self.host.on_progress(source_id, percent, activity.as_deref()),
                Record::Row { fields } => rows.push(fields),
                Record::Prompt { capability } => {
                    let err = self.host.refuse(capability);
                    send(&mut self.stdin, &Request::Reject { capability }).await?;
                    refused.get_or_insert(err);
                }
                Record::Done => {
                    return match refused {
                        Some(err) => Err(err.into()),
                        None => Ok(rows),
                    };
                }
                Record::Failed { message } => {
                    return Err(match refused {
                        Some(err) => err.into(),
                        None => EngineFault::Script { message },
                    });
                }
            }
        }
    }

    /// Next output line, decoded lossily so stray bytes never break a read.
    async fn next_line(&mut self) -> Result<String, EngineFault> {
        self.line.clear();
        let read = self
            .stdout
            .read_until(b'\n', &mut self.line)
            .await
            .map_err(|e| EngineFault::Transport(format!("reading engine output: {e}")))?;
        if read == 0 {
            return Err(EngineFault::Transport("engine process closed its output".into()));
        }
        let text = String::from_utf8_lossy(&self.line);
        Ok(text.trim_end_matches(['\n', '\r']).to_string())
    }

    async fn shutdown(mut self) {
        if let Err(fault) = send(&mut self.stdin, &Request::Exit).await {
            debug!(%fault, "engine process did not accept exit request");
        }
        drop(self.stdin);

        match tokio::time::timeout(EXIT_GRACE, self.child.wait()).await {
            Ok(Ok(status)) => info!(exit_code = ?status.code(), "engine process exited"),
            Ok(Err(e)) => warn!(error = %e, "waiting for engine process failed"),
            Err(_) => {
                warn!("engine process did not exit in time; killing it");
                if let Err(e) = self.child.kill().await {
                    warn!(error = %e, "failed to kill engine process");
                }
            }
        }

        if let Some(task) = self.stderr_task.take() {
            let _ = task.await;
        }
    }
}

async fn send(stdin: &mut ChildStdin, request: &Request) -> Result<(), EngineFault> {
    let line = request
        .to_line()
        .map_err(|e| EngineFault::Transport(format!("encoding request: {e}")))?;
    stdin
        .write_all(line.as_bytes())
        .await
        .map_err(|e| EngineFault::Transport(format!("writing to engine process: {e}")))?;
    stdin
        .flush()
        .await
        .map_err(|e| EngineFault::Transport(format!("flushing engine input: {e}")))
}

impl EngineBackend for ProcessEngine {
    fn open<'a>(&'a mut self, module: &'a Path, host: HostAdapter) -> EngineFuture<'a, ()> {
        Box::pin(self.start(module, host))
    }

    fn invoke(&mut self, command: Command) -> EngineFuture<'_, Vec<ResultRow>> {
        Box::pin(self.run(command))
    }

    fn close(&mut self) -> EngineFuture<'_, ()> {
        Box::pin(self.stop())
    }
}
