//! Read-only queries over a `get_tree` snapshot.

use clap::ValueEnum;
use regex::Regex;

use super::{Layout, Node, Workspace};
use crate::error::{NotFound, Result};

/// A managed terminal found in the tree by its title
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Terminal {
    pub workspace: String,
    pub number: u32,
}

/// What to do with a title that matches the template but whose `%n` capture
/// is not an integer (e.g. a random-token title).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum UnparsableNumber {
    /// Not a terminal at all
    #[default]
    Skip,
    /// A terminal occupying number 0
    Zero,
}

/// A window together with the layout of the container it would be split in
#[derive(Debug, Clone, Copy)]
pub struct Pane<'a> {
    pub node: &'a Node,
    pub layout: Layout,
}

pub fn focused_workspace(workspaces: &[Workspace]) -> Result<&Workspace> {
    workspaces
        .iter()
        .find(|w| w.focused)
        .ok_or_else(|| NotFound::FocusedWorkspace.into())
}

/// Focused leaf of the tree, or the root itself when nothing is focused.
pub fn focused_window(tree: &Node) -> Pane<'_> {
    fn walk(node: &Node) -> Option<Pane<'_>> {
        for child in &node.nodes {
            if child.focused {
                return Some(Pane {
                    node: child,
                    layout: node.layout,
                });
            }
            if let Some(pane) = walk(child) {
                return Some(pane);
            }
        }
        None
    }

    walk(tree).unwrap_or(Pane {
        node: tree,
        layout: tree.layout,
    })
}

/// root → output → `content` → workspace
pub fn workspace_node<'a>(tree: &'a Node, workspace: &Workspace) -> Result<&'a Node> {
    let output = tree
        .nodes
        .iter()
        .find(|n| n.name() == workspace.output)
        .ok_or_else(|| NotFound::Output {
            name: workspace.output.clone(),
        })?;

    let content = output
        .nodes
        .iter()
        .find(|n| n.name() == "content")
        .ok_or_else(|| NotFound::Content {
            output: workspace.output.clone(),
        })?;

    let node = content
        .nodes
        .iter()
        .find(|n| n.name() == workspace.name)
        .ok_or_else(|| NotFound::Workspace {
            name: workspace.name.clone(),
        })?;

    Ok(node)
}

/// Largest named leaf under `root`, depth-first. Ties keep the first seen.
pub fn biggest_window(root: &Node) -> Option<Pane<'_>> {
    fn walk<'a>(parent: &'a Node, best: &mut Option<(Pane<'a>, u64)>) {
        for child in &parent.nodes {
            if child.nodes.is_empty() && !child.name().is_empty() {
                let area = child.rect.area();
                if best.as_ref().map_or(true, |(_, max)| area > *max) {
                    *best = Some((
                        Pane {
                            node: child,
                            layout: parent.layout,
                        },
                        area,
                    ));
                }
            }
            walk(child, best);
        }
    }

    let mut best = None;
    walk(root, &mut best);
    best.map(|(pane, _)| pane)
}

/// Turn a title template into a regex capturing `%w` and `%n`.
pub fn title_pattern(template: &str) -> Result<Regex> {
    let mut pattern = String::new();
    let mut seen_w = false;
    let mut seen_n = false;

    let mut rest = template;
    while let Some(pos) = rest.find('%') {
        pattern.push_str(&regex::escape(&rest[..pos]));
        let tail = &rest[pos..];
        if tail.starts_with("%w") {
            pattern.push_str(if seen_w { "[0-9a-z]+" } else { "(?P<w>[0-9a-z]+)" });
            seen_w = true;
            rest = &tail[2..];
        } else if tail.starts_with("%n") {
            pattern.push_str(if seen_n { "[0-9a-z]+" } else { "(?P<n>[0-9a-z]+)" });
            seen_n = true;
            rest = &tail[2..];
        } else {
            pattern.push('%');
            rest = &tail[1..];
        }
    }
    pattern.push_str(&regex::escape(rest));

    Ok(Regex::new(&pattern)?)
}

/// Terminals in `workspace` whose titles match `template`.
pub fn active_terminals(
    template: &str,
    tree: &Node,
    workspace: &Workspace,
    unparsable: UnparsableNumber,
) -> Result<Vec<Terminal>> {
    let node = workspace_node(tree, workspace)?;
    let pattern = title_pattern(template)?;

    let mut terminals = Vec::new();
    collect_terminals(&node.nodes, &pattern, unparsable, &mut terminals);
    Ok(terminals)
}

fn collect_terminals(
    nodes: &[Node],
    pattern: &Regex,
    unparsable: UnparsableNumber,
    out: &mut Vec<Terminal>,
) {
    for node in nodes {
        if let Some(caps) = pattern.captures(node.name()) {
            let workspace = caps.name("w").map(|m| m.as_str()).unwrap_or_default();
            let number = caps.name("n").map(|m| m.as_str().parse::<u32>());

            let number = match (number, unparsable) {
                (Some(Ok(n)), _) => Some(n),
                (Some(Err(_)), UnparsableNumber::Zero) => Some(0),
                _ => None,
            };

            if let Some(number) = number {
                out.push(Terminal {
                    workspace: workspace.to_string(),
                    number,
                });
            }
            continue;
        }

        collect_terminals(&node.nodes, pattern, unparsable, out);
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use crate::wm::Rect;

    pub fn leaf(id: i64, name: &str, width: u32, height: u32) -> Node {
        Node {
            id,
            name: Some(name.to_string()),
            rect: Rect {
                x: 0,
                y: 0,
                width,
                height,
            },
            ..Node::default()
        }
    }

    pub fn container(id: i64, name: Option<&str>, layout: Layout, nodes: Vec<Node>) -> Node {
        Node {
            id,
            name: name.map(str::to_string),
            layout,
            nodes,
            ..Node::default()
        }
    }

    pub fn workspace(name: &str) -> Workspace {
        Workspace {
            num: name.parse().unwrap_or(0),
            name: name.to_string(),
            focused: true,
            output: "eDP-1".to_string(),
        }
    }

    /// root → eDP-1 → content → workspace `ws` holding `windows`
    pub fn tree(ws: &str, windows: Vec<Node>) -> Node {
        let ws_node = container(10, Some(ws), Layout::SplitH, windows);
        let content = container(3, Some("content"), Layout::SplitH, vec![ws_node]);
        let output = container(2, Some("eDP-1"), Layout::Other, vec![content]);
        let xroot = container(4, Some("__i3"), Layout::Other, vec![]);
        container(1, Some("root"), Layout::SplitH, vec![xroot, output])
    }
}
