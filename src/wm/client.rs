use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;
use tracing::debug;

use super::{Node, WindowManager, Workspace};
use crate::error::{Error, Result};

/// Talks to i3 (or sway) through its `*-msg` binary
pub struct I3Client {
    /// Path to i3-msg / swaymsg
    msg_path: String,
}

#[derive(Debug, Deserialize)]
struct CommandReply {
    success: bool,
    #[serde(default)]
    error: Option<String>,
}

impl I3Client {
    pub fn new(msg_path: impl Into<String>) -> Self {
        Self {
            msg_path: msg_path.into(),
        }
    }

    async fn run(&self, args: &[String]) -> Result<Vec<u8>> {
        debug!(program = %self.msg_path, ?args, "wm ipc");

        let output = Command::new(&self.msg_path)
            .args(args)
            .output()
            .await
            .map_err(|source| Error::Spawn {
                program: self.msg_path.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(Error::command(&self.msg_path, args, &output));
        }

        Ok(output.stdout)
    }
}

impl Default for I3Client {
    fn default() -> Self {
        Self::new("i3-msg")
    }
}

#[async_trait]
impl WindowManager for I3Client {
    async fn get_tree(&self) -> Result<Node> {
        let stdout = self.run(&["-t".to_string(), "get_tree".to_string()]).await?;
        Ok(serde_json::from_slice(&stdout)?)
    }

    async fn get_workspaces(&self) -> Result<Vec<Workspace>> {
        let stdout = self.run(&["-t".to_string(), "get_workspaces".to_string()]).await?;
        Ok(serde_json::from_slice(&stdout)?)
    }

    async fn command(&self, command: &str) -> Result<()> {
        let args = vec![command.to_string()];
        let stdout = self.run(&args).await?;

        let replies: Vec<CommandReply> = serde_json::from_slice(&stdout)?;
        if let Some(failed) = replies.into_iter().find(|r| !r.success) {
            return Err(Error::Command {
                program: self.msg_path.clone(),
                args,
                status: "success: false".to_string(),
                stderr: failed.error.unwrap_or_default(),
            });
        }

        Ok(())
    }
}
