//! Branch filter: restrict the family graph to one branch's descendants.
//!
//! The traversal follows outgoing (parent → child) edges only and keeps a
//! visited set, so cycles in the data cannot make it loop. The root and the
//! root → branch edge are added back so the filtered view still shows where
//! the branch attaches.

use std::collections::HashSet;
use std::fmt;

use log::{debug, warn};
use petgraph::stable_graph::NodeIndex;
use serde::Serialize;

use crate::graph::{FamilyGraph, Relation};

/// What the branch selector asks for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Selection {
    /// The whole graph.
    All,
    /// One branch and everything below it.
    Branch(String),
}

impl Selection {
    /// Selector label for [`Selection::All`].
    pub const ALL_LABEL: &'static str = "All";

    /// Parse a selector value. `"All"` (any case) and blank select everything;
    /// anything else is a trimmed branch label.
    ///
    /// A branch literally labelled "All" therefore cannot be selected on its
    /// own; `branch_options` leaves such a sheet out of the selector and its
    /// people are shown in the whole-tree view.
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.is_empty() || value.eq_ignore_ascii_case(Self::ALL_LABEL) {
            Selection::All
        } else {
            Selection::Branch(value.to_string())
        }
    }

    /// The selector label.
    pub fn label(&self) -> &str {
        match self {
            Selection::All => Self::ALL_LABEL,
            Selection::Branch(branch) => branch,
        }
    }
}

impl From<&str> for Selection {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Nodes and edges of a filtered view, both in a stable order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilteredTree {
    pub nodes: Vec<String>,
    pub edges: Vec<Relation>,
}

impl FilteredTree {
    /// Whether a label is part of the view.
    pub fn contains(&self, label: &str) -> bool {
        self.nodes.iter().any(|node| node == label)
    }

    /// Whether the view has no nodes at all.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Materialise the view as a graph for layout.
    pub fn to_graph(&self) -> FamilyGraph {
        FamilyGraph::from_parts(self.nodes.iter().map(String::as_str), &self.edges)
    }
}

/// Filter the graph to the given selection.
///
/// `All` returns every node and edge in insertion order. `Branch(b)` returns
/// the root, `b`, and every descendant of `b` (depth-first preorder), with the
/// edge root → `b` first and then every edge leaving a collected node. An
/// unknown branch yields just the root (or nothing, if the root is missing
/// too).
pub fn filter_branch(graph: &FamilyGraph, root: &str, selection: &Selection) -> FilteredTree {
    let branch = match selection {
        Selection::All => {
            return FilteredTree {
                nodes: graph.persons().map(str::to_string).collect(),
                edges: graph.relations(),
            };
        }
        Selection::Branch(branch) => branch.as_str(),
    };

    let Some(start) = graph.index_of(branch) else {
        warn!("Branch '{branch}' is not in the graph; showing the root only");
        return FilteredTree {
            nodes: graph
                .index_of(root)
                .and_then(|index| graph.label(index))
                .map(|label| vec![label.to_string()])
                .unwrap_or_default(),
            edges: Vec::new(),
        };
    };

    let mut tree = FilteredTree::default();
    let mut seen_nodes: HashSet<NodeIndex> = HashSet::new();
    let mut seen_edges: HashSet<(NodeIndex, NodeIndex)> = HashSet::new();

    // Attachment point first.
    if let Some(root_index) = graph.index_of(root) {
        seen_nodes.insert(root_index);
        tree.nodes.push(root.to_string());
        if root_index != start {
            seen_edges.insert((root_index, start));
            tree.edges.push(Relation::new(root, branch));
        }
    } else {
        tree.nodes.push(root.to_string());
        tree.edges.push(Relation::new(root, branch));
    }

    collect_descendants(graph, start, &mut tree, &mut seen_nodes, &mut seen_edges);

    debug!(
        "Filtered branch '{branch}': {} nodes, {} edges",
        tree.nodes.len(),
        tree.edges.len()
    );
    tree
}

/// Iterative depth-first preorder from `start`, children in insertion order.
fn collect_descendants(
    graph: &FamilyGraph,
    start: NodeIndex,
    tree: &mut FilteredTree,
    seen_nodes: &mut HashSet<NodeIndex>,
    seen_edges: &mut HashSet<(NodeIndex, NodeIndex)>,
) {
    let mut stack = vec![start];
    let mut expanded: HashSet<NodeIndex> = HashSet::new();

    while let Some(node) = stack.pop() {
        if !expanded.insert(node) {
            continue;
        }
        if seen_nodes.insert(node) {
            if let Some(label) = graph.label(node) {
                tree.nodes.push(label.to_string());
            }
        }

        let children = graph.child_indices(node);
        for &child in &children {
            if seen_edges.insert((node, child)) {
                if let (Some(parent), Some(label)) = (graph.label(node), graph.label(child)) {
                    tree.edges.push(Relation::new(parent, label));
                }
            }
        }
        // Reversed so the first child is expanded first.
        for &child in children.iter().rev() {
            if !expanded.contains(&child) {
                stack.push(child);
            }
        }
    }
}

/// Every node reachable from `label` by outgoing edges, excluding `label`
/// itself unless a cycle leads back to it.
pub fn descendants(graph: &FamilyGraph, label: &str) -> HashSet<String> {
    let mut found = HashSet::new();
    let Some(start) = graph.index_of(label) else {
        return found;
    };
    let mut visited: HashSet<NodeIndex> = HashSet::new();
    let mut stack = vec![start];
    while let Some(node) = stack.pop() {
        for child in graph.child_indices(node) {
            if visited.insert(child) {
                if let Some(child_label) = graph.label(child) {
                    found.insert(child_label.to_string());
                }
                stack.push(child);
            }
        }
    }
    found
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    /// Random graphs over a small label pool, cycles and multi-parents included.
    fn graph_strategy() -> impl Strategy<Value = FamilyGraph> {
        prop::collection::vec((0u8..8, 0u8..8), 0..24).prop_map(|pairs| {
            let mut graph = FamilyGraph::new();
            graph.add_person("Root");
            for branch in ["B0", "B1"] {
                graph.add_relation("Root", branch);
            }
            for (p, c) in pairs {
                graph.add_relation(&format!("B{p}"), &format!("B{c}"));
            }
            graph
        })
    }

    proptest! {
        #[test]
        fn prop_branch_view_is_closed(graph in graph_strategy(), pick in 0u8..8) {
            let branch = format!("B{pick}");
            prop_assume!(graph.contains(&branch));

            let tree = filter_branch(&graph, "Root", &Selection::Branch(branch.clone()));

            let mut expected = descendants(&graph, &branch);
            expected.insert("Root".to_string());
            expected.insert(branch.clone());
            let got: HashSet<String> = tree.nodes.iter().cloned().collect();
            prop_assert_eq!(got, expected);
            prop_assert_eq!(tree.nodes.len(), tree.nodes.iter().collect::<HashSet<_>>().len());

            for edge in &tree.edges {
                prop_assert!(tree.contains(&edge.parent) && tree.contains(&edge.child));
            }
        }
    }
}
