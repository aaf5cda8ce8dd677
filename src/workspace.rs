//! Per-event model of workspaces and the windows they contain.
//!
//! A fresh [`Workspaces`] collection is built from the window tree on every
//! event by [`collect_workspaces`] and dropped once the rename request has
//! been sent.  Nothing in here survives across events.

use crate::tree::{Node, NodeType};
use log::{debug, warn};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Name sway gives its scratchpad pseudo-workspace.
pub const SCRATCHPAD_WORKSPACE: &str = "__i3_scratch";

/// A window as far as icon resolution is concerned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowInfo {
    /// Owning process, if the window manager reported one.
    pub pid: Option<u32>,
    /// Raw window title.
    pub title: String,
}

/// One workspace of the current snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    /// Name as currently shown by the window manager.
    pub name: String,
    pub number: i64,
    /// Windows in tree traversal order.
    pub windows: Vec<WindowInfo>,
    /// Icons resolved for `windows`, in the same order.
    pub icons: Vec<String>,
}

impl Workspace {
    pub fn new(name: impl Into<String>, number: i64) -> Self {
        Self {
            name: name.into(),
            number,
            windows: Vec::new(),
            icons: Vec::new(),
        }
    }

    pub fn add_window(&mut self, window: WindowInfo) {
        self.windows.push(window);
    }

    pub fn add_icon(&mut self, icon: impl Into<String>) {
        self.icons.push(icon.into());
    }
}

impl fmt::Display for Workspace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Workspaces of one snapshot keyed by number, iterated in ascending order.
pub type Workspaces = BTreeMap<i64, Workspace>;

/// Walk `tree` once and collect every workspace with its windows.
///
/// `numbers` maps workspace names to numbers; workspaces missing from it
/// or numbered below zero are skipped, as is the scratchpad.  When two
/// workspaces share a number the first one in tree order is kept.  Ghost nodes are not recorded as
/// windows.
pub fn collect_workspaces(tree: &Node, numbers: &HashMap<String, i64>) -> Workspaces {
    let mut workspaces = Workspaces::new();
    collect_into(tree, numbers, &mut workspaces);
    workspaces
}

fn collect_into(node: &Node, numbers: &HashMap<String, i64>, workspaces: &mut Workspaces) {
    if node.node_type != NodeType::Workspace {
        for child in &node.nodes {
            collect_into(child, numbers, workspaces);
        }
        return;
    }

    let name = node.name_or_empty();
    if name == SCRATCHPAD_WORKSPACE {
        debug!("ignoring scratchpad workspace");
        return;
    }
    let Some(&number) = numbers.get(name) else {
        warn!("workspace {:?} has no number, skipping", name);
        return;
    };
    if number < 0 {
        debug!("workspace {:?} is unnumbered, skipping", name);
        return;
    }
    if let Some(first) = workspaces.get(&number) {
        warn!(
            "workspaces {:?} and {:?} share number {}, skipping the second",
            first.name, name, number
        );
        return;
    }

    let mut ws = Workspace::new(name, number);
    for child in node.nodes.iter().chain(&node.floating_nodes) {
        collect_windows(child, &mut ws);
    }
    workspaces.insert(number, ws);
}

fn collect_windows(node: &Node, ws: &mut Workspace) {
    if matches!(node.node_type, NodeType::Con | NodeType::FloatingCon) && !node.is_ghost() {
        ws.add_window(WindowInfo {
            pid: node.pid,
            title: node.name_or_empty().to_string(),
        });
    }
    for child in node.nodes.iter().chain(&node.floating_nodes) {
        collect_windows(child, ws);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn con(name: Option<&str>, pid: Option<u32>) -> Node {
        Node::new(NodeType::Con, name, pid)
    }

    fn workspace(name: &str, children: Vec<Node>) -> Node {
        Node::new(NodeType::Workspace, Some(name), None).with_nodes(children)
    }

    fn root(workspaces: Vec<Node>) -> Node {
        Node::new(NodeType::Root, Some("root"), None).with_nodes([Node::new(
            NodeType::Output,
            Some("eDP-1"),
            None,
        )
        .with_nodes(workspaces)])
    }

    fn numbers(pairs: &[(&str, i64)]) -> HashMap<String, i64> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn collects_windows_in_order() {
        let tree = root(vec![workspace(
            "1: old",
            vec![con(Some("Terminal"), Some(10)), con(Some("Firefox"), Some(11))],
        )]);
        let ws = collect_workspaces(&tree, &numbers(&[("1: old", 1)]));
        assert_eq!(ws.len(), 1);
        let titles: Vec<&str> = ws[&1].windows.iter().map(|w| w.title.as_str()).collect();
        assert_eq!(titles, vec!["Terminal", "Firefox"]);
        assert_eq!(ws[&1].name, "1: old");
    }

    #[test]
    fn nested_and_floating_windows() {
        // A split container (name: null, no pid) holding two views, plus a
        // floating window.
        let split = con(None, None).with_nodes([con(Some("a"), Some(1)), con(Some("b"), Some(2))]);
        let ws_node = workspace("2", vec![split]).with_floating([Node::new(
            NodeType::FloatingCon,
            Some("float"),
            Some(3),
        )]);
        let ws = collect_workspaces(&root(vec![ws_node]), &numbers(&[("2", 2)]));
        let pids: Vec<Option<u32>> = ws[&2].windows.iter().map(|w| w.pid).collect();
        assert_eq!(pids, vec![Some(1), Some(2), Some(3)]);
    }

    #[test]
    fn ghost_nodes_are_ignored() {
        let tree = root(vec![workspace(
            "3",
            vec![con(None, None), con(Some(""), None), con(Some("real"), None)],
        )]);
        let ws = collect_workspaces(&tree, &numbers(&[("3", 3)]));
        assert_eq!(ws[&3].windows.len(), 1);
        assert_eq!(ws[&3].windows[0].title, "real");
    }

    #[test]
    fn scratchpad_is_skipped() {
        let scratch = workspace(SCRATCHPAD_WORKSPACE, vec![con(Some("hidden"), Some(5))]);
        let tree = root(vec![scratch, workspace("1", vec![])]);
        let ws = collect_workspaces(
            &tree,
            &numbers(&[(SCRATCHPAD_WORKSPACE, -1), ("1", 1)]),
        );
        assert_eq!(ws.keys().copied().collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn workspace_without_number_is_skipped() {
        let tree = root(vec![workspace("mystery", vec![con(Some("x"), Some(1))])]);
        assert!(collect_workspaces(&tree, &HashMap::new()).is_empty());
    }

    #[test]
    fn unnumbered_workspaces_are_skipped() {
        let tree = root(vec![
            workspace("web", vec![con(Some("a"), Some(1))]),
            workspace("chat", vec![con(Some("b"), Some(2))]),
            workspace("3", vec![]),
        ]);
        let ws = collect_workspaces(&tree, &numbers(&[("web", -1), ("chat", -1), ("3", 3)]));
        assert_eq!(ws.keys().copied().collect::<Vec<_>>(), vec![3]);
    }

    #[test]
    fn shared_number_keeps_the_first() {
        let tree = root(vec![
            workspace("1: a", vec![con(Some("a"), Some(1))]),
            workspace("1: b", vec![con(Some("b"), Some(2))]),
        ]);
        let ws = collect_workspaces(&tree, &numbers(&[("1: a", 1), ("1: b", 1)]));
        assert_eq!(ws.len(), 1);
        assert_eq!(ws[&1].name, "1: a");
        assert_eq!(ws[&1].windows[0].title, "a");
    }

    #[test]
    fn empty_workspace_is_kept() {
        let tree = root(vec![workspace("4", vec![])]);
        let ws = collect_workspaces(&tree, &numbers(&[("4", 4)]));
        assert!(ws[&4].windows.is_empty());
    }

    #[test]
    fn workspace_display_is_name() {
        assert_eq!(Workspace::new("5: x", 5).to_string(), "5: x");
    }
}
