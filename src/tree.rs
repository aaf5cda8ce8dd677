//! The window manager's view of the world.
//!
//! [`Node`] mirrors the JSON returned by sway's `GET_TREE` request, reduced
//! to the fields the daemon reads.  [`WindowEvent`] / [`WindowChange`]
//! describe the `window` events the daemon subscribes to.
//!
//! These types are shared by the IPC adapter (which decodes them) and by the
//! workspace traversal (which consumes them), so neither side depends on
//! the other.

use serde::Deserialize;
use std::fmt;

/// Kind of a tree node, as reported in the node's `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    Root,
    Output,
    Workspace,
    Con,
    FloatingCon,
    /// Dock areas and anything a newer window manager might add.
    #[serde(other)]
    Other,
}

/// One node of the window tree.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Node {
    #[serde(default)]
    pub id: i64,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    /// Workspace name for workspace nodes, window title for views.
    /// Containers that are not views report `null`.
    #[serde(default)]
    pub name: Option<String>,
    /// Owning process; only present on views.
    #[serde(default)]
    pub pid: Option<u32>,
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub floating_nodes: Vec<Node>,
}

impl Node {
    /// Create a childless node.  Mostly useful for building trees by hand.
    pub fn new(node_type: NodeType, name: Option<&str>, pid: Option<u32>) -> Self {
        Self {
            id: 0,
            node_type,
            name: name.map(str::to_string),
            pid,
            nodes: Vec::new(),
            floating_nodes: Vec::new(),
        }
    }

    /// Builder-style helper appending tiled children.
    pub fn with_nodes(mut self, nodes: impl IntoIterator<Item = Node>) -> Self {
        self.nodes.extend(nodes);
        self
    }

    /// Builder-style helper appending floating children.
    pub fn with_floating(mut self, nodes: impl IntoIterator<Item = Node>) -> Self {
        self.floating_nodes.extend(nodes);
        self
    }

    /// The node name, or `""` when the window manager sent none.
    pub fn name_or_empty(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }

    /// A node that carries neither a pid nor a name.
    ///
    /// Such nodes show up transiently (e.g. while a window is being mapped)
    /// and cannot be resolved to anything.
    pub fn is_ghost(&self) -> bool {
        self.pid.is_none() && self.name_or_empty().is_empty()
    }
}

/// The `change` field of a window event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowChange {
    New,
    Close,
    Focus,
    Title,
    FullscreenMode,
    Move,
    Floating,
    Urgent,
    Mark,
    #[serde(other)]
    Other,
}

impl WindowChange {
    /// Whether this change can alter the set of windows (or their titles)
    /// on some workspace, and therefore the workspace names.
    pub fn affects_names(self) -> bool {
        matches!(
            self,
            WindowChange::New | WindowChange::Close | WindowChange::Title | WindowChange::Move
        )
    }
}

impl fmt::Display for WindowChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            WindowChange::New => "new",
            WindowChange::Close => "close",
            WindowChange::Focus => "focus",
            WindowChange::Title => "title",
            WindowChange::FullscreenMode => "fullscreen_mode",
            WindowChange::Move => "move",
            WindowChange::Floating => "floating",
            WindowChange::Urgent => "urgent",
            WindowChange::Mark => "mark",
            WindowChange::Other => "other",
        };
        write!(f, "{}", s)
    }
}

/// A `window` event as delivered on a subscribed IPC connection.
///
/// Only the change kind is kept; the daemon re-reads the whole tree anyway.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WindowEvent {
    pub change: WindowChange,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_minimal_tree() {
        let json = r#"{
            "id": 1,
            "type": "root",
            "name": "root",
            "nodes": [{
                "id": 3,
                "type": "output",
                "name": "eDP-1",
                "nodes": [{
                    "id": 4,
                    "type": "workspace",
                    "name": "1",
                    "nodes": [
                        { "id": 7, "type": "con", "name": "Terminal", "pid": 4242 },
                        { "id": 8, "type": "con", "name": null }
                    ],
                    "floating_nodes": [
                        { "id": 9, "type": "floating_con", "name": "Picture-in-Picture", "pid": 77 }
                    ]
                }]
            }]
        }"#;
        let tree: Node = serde_json::from_str(json).unwrap();
        assert_eq!(tree.node_type, NodeType::Root);
        let ws = &tree.nodes[0].nodes[0];
        assert_eq!(ws.node_type, NodeType::Workspace);
        assert_eq!(ws.nodes[0].pid, Some(4242));
        assert!(ws.nodes[1].is_ghost());
        assert_eq!(ws.floating_nodes[0].node_type, NodeType::FloatingCon);
    }

    #[test]
    fn unknown_node_type_is_other() {
        let node: Node = serde_json::from_str(r#"{ "type": "dockarea" }"#).unwrap();
        assert_eq!(node.node_type, NodeType::Other);
        assert!(node.nodes.is_empty());
    }

    #[test]
    fn named_node_without_pid_is_not_ghost() {
        let node = Node::new(NodeType::Con, Some("xwayland thing"), None);
        assert!(!node.is_ghost());
        let node = Node::new(NodeType::Con, Some(""), Some(12));
        assert!(!node.is_ghost());
    }

    #[test]
    fn window_event_change() {
        let ev: WindowEvent =
            serde_json::from_str(r#"{ "change": "title", "container": { "id": 1 } }"#).unwrap();
        assert_eq!(ev.change, WindowChange::Title);
        assert!(ev.change.affects_names());

        let ev: WindowEvent = serde_json::from_str(r#"{ "change": "focus" }"#).unwrap();
        assert!(!ev.change.affects_names());

        let ev: WindowEvent = serde_json::from_str(r#"{ "change": "something_new" }"#).unwrap();
        assert_eq!(ev.change, WindowChange::Other);
    }

    #[test]
    fn window_change_display() {
        assert_eq!(WindowChange::FullscreenMode.to_string(), "fullscreen_mode");
        assert_eq!(WindowChange::Move.to_string(), "move");
    }
}
