//! Detecting when a freshly attached session has its real size.
//!
//! tmux marks a session attached before the client has negotiated its size, and
//! a detached session reports the 80x24 default. There is no event for "resized",
//! so we poll `list-sessions` and treat the first attached 80x24 sighting as
//! still initializing. A real 80x24 terminal passes on the next poll.

use std::time::Duration;

use regex::Regex;
use tracing::{debug, info};

use super::{Multiplexer, SessionStatus};
use crate::error::{Error, Result};

/// Size tmux reports before a client has told it otherwise
pub const PLACEHOLDER_GEOMETRY: &str = "80x24";

pub const POLL_INTERVAL: Duration = Duration::from_millis(25);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttachState {
    Unattached,
    AttachedPlaceholderGeometry,
    /// Attached at its real size; holds the foreground command
    AttachedReady(String),
}

pub struct AttachWatcher {
    session: String,
    state: AttachState,
    placeholder_seen: bool,
}

impl AttachWatcher {
    pub fn new(session: impl Into<String>) -> Self {
        Self {
            session: session.into(),
            state: AttachState::Unattached,
            placeholder_seen: false,
        }
    }

    pub fn state(&self) -> &AttachState {
        &self.state
    }

    /// Feed one poll of the session list.
    pub fn observe(&mut self, statuses: &[SessionStatus]) -> &AttachState {
        if matches!(self.state, AttachState::AttachedReady(_)) {
            return &self.state;
        }

        let line = statuses
            .iter()
            .find(|s| s.attached && s.name == self.session);

        if let Some(line) = line {
            if line.geometry == PLACEHOLDER_GEOMETRY && !self.placeholder_seen {
                self.placeholder_seen = true;
                self.state = AttachState::AttachedPlaceholderGeometry;
            } else {
                self.state = AttachState::AttachedReady(line.command.clone());
            }
        }

        &self.state
    }
}

/// Block until `session` is attached at its real size; returns its foreground command.
///
/// With no deadline this waits forever.
pub async fn wait_attached<M: Multiplexer + ?Sized>(
    mux: &M,
    session: &str,
    interval: Duration,
    deadline: Option<Duration>,
) -> Result<String> {
    let mut watcher = AttachWatcher::new(session);

    let poll = async {
        loop {
            let statuses = mux.list_session_status().await?;
            if let AttachState::AttachedReady(command) = watcher.observe(&statuses) {
                return Ok::<String, Error>(command.clone());
            }
            debug!(%session, state = ?watcher.state(), "waiting for attach");
            tokio::time::sleep(interval).await;
        }
    };

    match deadline {
        None => poll.await,
        Some(after) => tokio::time::timeout(after, poll)
            .await
            .map_err(|_| Error::Timeout {
                what: format!("client to attach to {}", session),
                after,
            })?,
    }
}

/// Send C-l once the session is attached, if its foreground command matches `only_if`.
pub async fn clear_screen<M: Multiplexer + ?Sized>(
    mux: &M,
    session: &str,
    only_if: &Regex,
    deadline: Option<Duration>,
) -> Result<bool> {
    let command = wait_attached(mux, session, POLL_INTERVAL, deadline).await?;

    if !only_if.is_match(&command) {
        info!(%session, %command, "not clearing screen");
        return Ok(false);
    }

    mux.send_keys(session, "C-l").await?;
    Ok(true)
}
