use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};

use crate::types::{AbcError, SessionConfig};

/// A line-oriented, strictly sequential request/response stream.
///
/// [`SessionController`] implements it over the ABC child process; tests
/// substitute a scripted channel.
#[async_trait]
pub trait LineChannel: Send {
    /// Write one command line and flush it immediately.
    async fn write_line(&mut self, line: &str) -> Result<(), AbcError>;

    /// Block until one full line is available; trailing whitespace is trimmed.
    async fn read_line(&mut self) -> Result<String, AbcError>;

    /// Close the input side and wait for the peer to exit, returning its exit code.
    async fn close(&mut self) -> Result<Option<i32>, AbcError>;
}

/// Owns the ABC child process and its pipes.
///
/// Knows nothing about the response format: it writes newline-terminated
/// commands and reads raw lines back.
pub struct SessionController {
    child: Child,
    stdin: Option<BufWriter<ChildStdin>>,
    stdout: BufReader<ChildStdout>,
    history_path: PathBuf,
    quit_timeout_secs: u64,
}

impl SessionController {
    /// Spawn ABC with piped stdin/stdout.
    ///
    /// Removes a stale history file from a previous run first.
    pub fn spawn(config: &SessionConfig) -> Result<Self, AbcError> {
        let history_path = config.history_path();
        remove_history(&history_path);

        let mut cmd = Command::new(&config.executable);
        cmd.args(&config.args);
        if let Some(dir) = &config.working_dir {
            cmd.current_dir(dir);
        }

        let mut child = cmd
            .stdin(std::process::Stdio::piped())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(AbcError::Spawn)?;

        let stdin = BufWriter::new(
            child
                .stdin
                .take()
                .ok_or_else(|| AbcError::Protocol("Failed to capture stdin".into()))?,
        );
        let stdout = BufReader::new(
            child
                .stdout
                .take()
                .ok_or_else(|| AbcError::Protocol("Failed to capture stdout".into()))?,
        );

        tracing::debug!(
            executable = %config.executable.display(),
            pid = ?child.id(),
            "Spawned ABC session"
        );

        Ok(Self {
            child,
            stdin: Some(stdin),
            stdout,
            history_path,
            quit_timeout_secs: config.quit_timeout_secs,
        })
    }

    /// Close stdin, wait for ABC to exit and clean up its history file.
    ///
    /// If the process is still alive after `quit_timeout_secs` it is killed
    /// and [`AbcError::Timeout`] is returned.
    pub async fn terminate(&mut self) -> Result<Option<i32>, AbcError> {
        if let Some(mut stdin) = self.stdin.take() {
            // The engine may already be gone after `quit`; a broken pipe here is fine.
            let _ = stdin.flush().await;
            drop(stdin);
        }

        let timeout = Duration::from_secs(self.quit_timeout_secs);
        let status = match tokio::time::timeout(timeout, self.child.wait()).await {
            Ok(status) => status?,
            Err(_) => {
                tracing::warn!(
                    timeout_secs = self.quit_timeout_secs,
                    "ABC did not exit, killing it"
                );
                let _ = self.child.kill().await;
                remove_history(&self.history_path);
                return Err(AbcError::Timeout(self.quit_timeout_secs));
            }
        };

        remove_history(&self.history_path);
        tracing::debug!(code = ?status.code(), "ABC session exited");
        Ok(status.code())
    }
}

#[async_trait]
impl LineChannel for SessionController {
    async fn write_line(&mut self, line: &str) -> Result<(), AbcError> {
        let stdin = self.stdin.as_mut().ok_or(AbcError::SessionClosed)?;
        stdin.write_all(line.trim().as_bytes()).await?;
        stdin.write_all(b"\n").await?;
        stdin.flush().await?;
        Ok(())
    }

    async fn read_line(&mut self) -> Result<String, AbcError> {
        let mut line = String::new();
        match self.stdout.read_line(&mut line).await? {
            0 => Err(AbcError::ProcessDied),
            _ => Ok(line.trim_end().to_string()),
        }
    }

    async fn close(&mut self) -> Result<Option<i32>, AbcError> {
        self.terminate().await
    }
}

fn remove_history(path: &Path) {
    if path.exists() {
        match std::fs::remove_file(path) {
            Ok(()) => tracing::debug!(path = %path.display(), "Removed ABC history file"),
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "Could not remove ABC history file"),
        }
    }
}
