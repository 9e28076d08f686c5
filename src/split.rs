use tracing::debug;

use crate::error::Result;
use crate::wm::tree::{self, Pane};
use crate::wm::{Layout, Node, WindowManager, Workspace};

/// Where the new terminal should be placed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SplitMode {
    /// Let i3 place it
    #[default]
    None,
    /// Split the focused window along its longer side
    Smart,
    /// Focus the largest window of the workspace, then split it like `Smart`
    Biggest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Split {
    None,
    Horizontal,
    Vertical,
}

impl Split {
    pub fn command(self) -> Option<&'static str> {
        match self {
            Split::None => None,
            Split::Horizontal => Some("split horizontal"),
            Split::Vertical => Some("split vertical"),
        }
    }
}

/// Pick a split direction from the window's aspect ratio.
///
/// A side must exceed 4/3 of the other before we split along it, and a container
/// already split that way is left alone.
pub fn decide_split(pane: &Pane<'_>) -> Split {
    let width = f64::from(pane.node.rect.width);
    let height = f64::from(pane.node.rect.height);

    if width * 0.75 > height && pane.layout != Layout::SplitH {
        Split::Horizontal
    } else if height * 0.75 > width && pane.layout != Layout::SplitV {
        Split::Vertical
    } else {
        Split::None
    }
}

/// Issue the split (and focus, for `Biggest`) before a terminal is launched.
pub async fn apply_split<W: WindowManager + ?Sized>(
    wm: &W,
    mode: SplitMode,
    tree: &Node,
    workspace: &Workspace,
) -> Result<Split> {
    let pane = match mode {
        SplitMode::None => return Ok(Split::None),
        SplitMode::Smart => tree::focused_window(tree),
        SplitMode::Biggest => {
            let ws_node = tree::workspace_node(tree, workspace)?;
            match tree::biggest_window(ws_node) {
                Some(pane) => {
                    wm.command(&format!("[con_id={}] focus", pane.node.id)).await?;
                    pane
                }
                None => return Ok(Split::None),
            }
        }
    };

    let split = decide_split(&pane);
    debug!(
        window = pane.node.id,
        width = pane.node.rect.width,
        height = pane.node.rect.height,
        layout = ?pane.layout,
        ?split,
        "split decision"
    );

    if let Some(command) = split.command() {
        wm.command(command).await?;
    }

    Ok(split)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wm::fake::FakeWindowManager;
    use crate::wm::tree::fixtures::*;

    fn pane(node: &Node, layout: Layout) -> Pane<'_> {
        Pane { node, layout }
    }

    #[test]
    fn test_square_window_is_not_split() {
        let node = leaf(1, "a", 900, 900);
        assert_eq!(decide_split(&pane(&node, Layout::Other)), Split::None);
    }

    #[test]
    fn test_wide_window_splits_horizontally() {
        let node = leaf(1, "a", 1201, 900);
        assert_eq!(decide_split(&pane(&node, Layout::SplitV)), Split::Horizontal);

        let node = leaf(1, "a", 1200, 900);
        assert_eq!(decide_split(&pane(&node, Layout::SplitV)), Split::None);
    }

    #[test]
    fn test_tall_window_splits_vertically() {
        let node = leaf(1, "a", 900, 1201);
        assert_eq!(decide_split(&pane(&node, Layout::SplitH)), Split::Vertical);
    }

    #[test]
    fn test_matching_orientation_is_left_alone() {
        let wide = leaf(1, "a", 1920, 500);
        assert_eq!(decide_split(&pane(&wide, Layout::SplitH)), Split::None);

        let tall = leaf(1, "a", 500, 1920);
        assert_eq!(decide_split(&pane(&tall, Layout::SplitV)), Split::None);
    }

    #[tokio::test]
    async fn test_smart_split_issues_command() {
        let mut focused = leaf(11, "marvex-3-1", 1920, 1080);
        focused.focused = true;
        let tree = tree("3", vec![focused]);
        let wm = FakeWindowManager::new(tree.clone(), vec![workspace("3")]);

        // parent workspace is splith, so a wide window is left alone
        let split = apply_split(&wm, SplitMode::Smart, &tree, &workspace("3")).await.unwrap();
        assert_eq!(split, Split::None);
        assert!(wm.commands().is_empty());
    }

    #[tokio::test]
    async fn test_biggest_split_focuses_then_splits() {
        let column = container(
            20,
            None,
            Layout::SplitH,
            vec![leaf(21, "marvex-3-1", 400, 1000), leaf(22, "marvex-3-2", 400, 1300)],
        );
        let tree = tree("3", vec![column]);
        let wm = FakeWindowManager::new(tree.clone(), vec![workspace("3")]);

        let split = apply_split(&wm, SplitMode::Biggest, &tree, &workspace("3")).await.unwrap();
        assert_eq!(split, Split::Vertical);
        assert_eq!(wm.commands(), vec!["[con_id=22] focus", "split vertical"]);
    }

    #[tokio::test]
    async fn test_no_split_mode_does_nothing() {
        let tree = tree("3", vec![leaf(11, "a", 3000, 100)]);
        let wm = FakeWindowManager::new(tree.clone(), vec![workspace("3")]);
        let split = apply_split(&wm, SplitMode::None, &tree, &workspace("3")).await.unwrap();
        assert_eq!(split, Split::None);
        assert!(wm.commands().is_empty());
    }
}
