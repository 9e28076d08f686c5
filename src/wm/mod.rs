mod client;
pub mod tree;

pub use client::I3Client;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Container layout as reported by i3/sway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    #[serde(rename = "splith")]
    SplitH,
    #[serde(rename = "splitv")]
    SplitV,
    Stacked,
    Tabbed,
    #[serde(other)]
    #[default]
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Rect {
    #[serde(default)]
    pub x: i64,
    #[serde(default)]
    pub y: i64,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

/// A node of the layout tree (`get_tree`)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Node {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub focused: bool,
    #[serde(default)]
    pub rect: Rect,
    #[serde(default)]
    pub layout: Layout,
    #[serde(default)]
    pub nodes: Vec<Node>,
}

impl Node {
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }
}

/// A workspace as reported by `get_workspaces`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workspace {
    #[serde(default)]
    pub num: i32,
    pub name: String,
    #[serde(default)]
    pub focused: bool,
    pub output: String,
}

/// Window-manager IPC surface
#[async_trait]
pub trait WindowManager: Send + Sync {
    async fn get_tree(&self) -> Result<Node>;

    async fn get_workspaces(&self) -> Result<Vec<Workspace>>;

    /// Run a command (e.g. `split horizontal`)
    async fn command(&self, command: &str) -> Result<()>;
}
