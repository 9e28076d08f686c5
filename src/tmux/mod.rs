mod client;
pub mod pool;
pub mod watcher;

pub use client::TmuxClient;

use std::time::Duration;

use async_trait::async_trait;

use crate::error::{Error, Result};

/// Format passed to `list-sessions -F` for attachment polling
pub const STATUS_FORMAT: &str =
    "#S:#{?session_attached,X,}:#{window_width}x#{window_height}:#{pane_current_command}";

/// One line of `list-sessions -F STATUS_FORMAT`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStatus {
    pub name: String,
    pub attached: bool,
    /// `WxH`, as tmux prints it
    pub geometry: String,
    /// Foreground command of the active pane
    pub command: String,
}

impl SessionStatus {
    pub fn parse(line: &str) -> Option<Self> {
        let mut parts = line.splitn(4, ':');
        let name = parts.next()?;
        let attached = parts.next()?;
        let geometry = parts.next()?;
        let command = parts.next()?;

        if name.is_empty() {
            return None;
        }

        Some(Self {
            name: name.to_string(),
            attached: attached == "X",
            geometry: geometry.to_string(),
            command: command.to_string(),
        })
    }
}

/// The subset of tmux this tool drives
#[async_trait]
pub trait Multiplexer: Send + Sync {
    /// Names of all live sessions (`list-sessions -F #S`)
    async fn list_sessions(&self) -> Result<Vec<String>>;

    async fn list_session_status(&self) -> Result<Vec<SessionStatus>>;

    /// `new-session -d -s <name>`
    async fn new_session(&self, name: &str) -> Result<()>;

    /// `rename-session -t <old> <new>`
    async fn rename_session(&self, old: &str, new: &str) -> Result<()>;

    /// `send -t <name> <text>`
    async fn send(&self, name: &str, text: &str) -> Result<()>;

    /// `send-keys -R -t <name> <keys>`
    async fn send_keys(&self, name: &str, keys: &str) -> Result<()>;

    /// argv that attaches a client to `name`
    fn attach_command(&self, name: &str) -> Vec<String>;
}

/// Poll until `name` shows up in the session list.
pub async fn wait_for_session<M: Multiplexer + ?Sized>(
    mux: &M,
    name: &str,
    interval: Duration,
    deadline: Option<Duration>,
) -> Result<()> {
    let poll = async {
        loop {
            if mux.list_sessions().await?.iter().any(|s| s == name) {
                return Ok::<(), Error>(());
            }
            tokio::time::sleep(interval).await;
        }
    };

    match deadline {
        None => poll.await,
        Some(after) => tokio::time::timeout(after, poll)
            .await
            .map_err(|_| Error::Timeout {
                what: format!("session {}", name),
                after,
            })?,
    }
}

/// Wait for `name` to exist, then type `cmdline` into it followed by Enter.
pub async fn send_command<M: Multiplexer + ?Sized>(
    mux: &M,
    name: &str,
    cmdline: &str,
    deadline: Option<Duration>,
) -> Result<()> {
    wait_for_session(mux, name, Duration::from_millis(50), deadline).await?;
    mux.send(name, &format!("{}\n", cmdline)).await
}
