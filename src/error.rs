use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Which level of the window-manager tree (or which lookup) came up empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotFound {
    /// `get_workspaces` returned no focused workspace
    FocusedWorkspace,
    /// No root child is named after the workspace's output
    Output { name: String },
    /// The output node has no `content` child
    Content { output: String },
    /// The content node has no child named after the workspace
    Workspace { name: String },
}

impl fmt::Display for NotFound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotFound::FocusedWorkspace => write!(f, "no focused workspace"),
            NotFound::Output { name } => write!(f, "no output node named '{}' in tree root", name),
            NotFound::Content { output } => {
                write!(f, "output node '{}' has no content node", output)
            }
            NotFound::Workspace { name } => {
                write!(f, "no workspace node named '{}' under content", name)
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("not found: {0}")]
    NotFound(NotFound),

    #[error("{program} {} failed ({status}): {stderr}", .args.join(" "))]
    Command {
        program: String,
        args: Vec<String>,
        status: String,
        stderr: String,
    },

    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("timed out after {after:?} waiting for {what}")]
    Timeout { what: String, after: Duration },

    #[error("invalid template '{template}': {reason}")]
    Template { template: String, reason: String },

    #[error(transparent)]
    Regex(#[from] regex::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<NotFound> for Error {
    fn from(value: NotFound) -> Self {
        Error::NotFound(value)
    }
}

impl Error {
    /// Build a `Command` error from a finished process.
    pub fn command(program: &str, args: &[String], output: &std::process::Output) -> Self {
        Error::Command {
            program: program.to_string(),
            args: args.to_vec(),
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        }
    }

    /// stderr of a failed external command, if that is what this is.
    pub fn stderr(&self) -> Option<&str> {
        match self {
            Error::Command { stderr, .. } => Some(stderr),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_names_level() {
        let err = Error::from(NotFound::Workspace { name: "3".into() });
        assert_eq!(
            err.to_string(),
            "not found: no workspace node named '3' under content"
        );

        let err = Error::from(NotFound::Content { output: "eDP-1".into() });
        assert!(err.to_string().contains("eDP-1"));
    }

    #[test]
    fn test_command_error_carries_args() {
        let err = Error::Command {
            program: "tmux".into(),
            args: vec!["new-session".into(), "-d".into(), "-s".into(), "x".into()],
            status: "exit status: 1".into(),
            stderr: "duplicate session: x".into(),
        };
        let text = err.to_string();
        assert!(text.contains("tmux new-session -d -s x"));
        assert!(text.contains("duplicate session"));
        assert_eq!(err.stderr(), Some("duplicate session: x"));
    }
}
