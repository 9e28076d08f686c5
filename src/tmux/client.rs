use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, warn};

use super::{Multiplexer, SessionStatus, STATUS_FORMAT};
use crate::error::{Error, Result};

/// stderr fragments meaning "there are simply no sessions yet"
const NO_SESSIONS: &[&str] = &["no server running", "no sessions", "error connecting"];

/// `list-sessions` failed only because no server or session exists.
fn means_no_sessions(stderr: &str) -> bool {
    NO_SESSIONS.iter().any(|s| stderr.contains(s))
}

/// `rename-session` renamed, then failed to refresh a client that isn't there.
fn is_benign_rename_failure(stderr: &str) -> bool {
    stderr.contains("no current client")
}

/// Client for interacting with tmux via CLI
pub struct TmuxClient {
    /// Path to tmux binary
    tmux_path: String,
    /// `-L` socket name
    socket: Option<String>,
}

impl TmuxClient {
    pub fn new(socket: Option<String>) -> Self {
        Self {
            tmux_path: "tmux".to_string(),
            socket,
        }
    }

    #[cfg(test)]
    pub fn with_path(mut self, tmux_path: impl Into<String>) -> Self {
        self.tmux_path = tmux_path.into();
        self
    }

    /// Full argument list, socket selector first
    fn args<I, S>(&self, rest: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut args = Vec::new();
        if let Some(socket) = &self.socket {
            args.push("-L".to_string());
            args.push(socket.clone());
        }
        args.extend(rest.into_iter().map(Into::into));
        args
    }

    async fn run(&self, args: Vec<String>) -> Result<String> {
        debug!(program = %self.tmux_path, ?args, "tmux");

        let output = Command::new(&self.tmux_path)
            .args(&args)
            .output()
            .await
            .map_err(|source| Error::Spawn {
                program: self.tmux_path.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(Error::command(&self.tmux_path, &args, &output));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    async fn list(&self, format: &str) -> Result<String> {
        match self.run(self.args(["list-sessions", "-F", format])).await {
            Ok(stdout) => Ok(stdout),
            Err(err) if err.stderr().is_some_and(means_no_sessions) => Ok(String::new()),
            Err(err) => Err(err),
        }
    }
}

impl Default for TmuxClient {
    fn default() -> Self {
        Self::new(None)
    }
}

#[async_trait]
impl Multiplexer for TmuxClient {
    async fn list_sessions(&self) -> Result<Vec<String>> {
        let stdout = self.list("#S").await?;
        Ok(stdout
            .lines()
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect())
    }

    async fn list_session_status(&self) -> Result<Vec<SessionStatus>> {
        let stdout = self.list(STATUS_FORMAT).await?;
        Ok(stdout.lines().filter_map(SessionStatus::parse).collect())
    }

    async fn new_session(&self, name: &str) -> Result<()> {
        self.run(self.args(["new-session", "-d", "-s", name])).await?;
        Ok(())
    }

    async fn rename_session(&self, old: &str, new: &str) -> Result<()> {
        match self.run(self.args(["rename-session", "-t", old, new])).await {
            Ok(_) => Ok(()),
            Err(err) if err.stderr().is_some_and(is_benign_rename_failure) => {
                warn!(%old, %new, "rename-session: no current client, ignoring");
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    async fn send(&self, name: &str, text: &str) -> Result<()> {
        self.run(self.args(["send", "-t", name, text])).await?;
        Ok(())
    }

    async fn send_keys(&self, name: &str, keys: &str) -> Result<()> {
        self.run(self.args(["send-keys", "-R", "-t", name, keys])).await?;
        Ok(())
    }

    fn attach_command(&self, name: &str) -> Vec<String> {
        let mut command = vec![self.tmux_path.clone()];
        command.extend(self.args(["attach", "-t", name]));
        command
    }
}
