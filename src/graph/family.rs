//! FamilyGraph - label-keyed directed graph of parent → child relations.
//!
//! Topology is stored in petgraph's StableGraph, with a map from person label
//! to node index. Node and edge insertion order is part of the contract:
//! `persons()` and `relations()` yield items in the order they were first
//! added, and `children()` lists a node's children in edge insertion order.
//! The hierarchy layout relies on that order for left-to-right placement.

use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableGraph};
use petgraph::visit::EdgeRef;
use petgraph::{Directed, Direction};
use std::collections::HashMap;

use super::relation::Relation;

/// Directed graph of person labels.
///
/// Invariants:
/// - no self-edges (`add_relation` refuses them)
/// - at most one edge per (parent, child) pair
/// - nodes and edges are never removed, so indices grow with insertion order
#[derive(Debug, Clone, Default)]
pub struct FamilyGraph {
    /// Nodes store their label; edges carry no weight.
    graph: StableGraph<String, (), Directed>,

    /// Map from label to petgraph NodeIndex
    label_to_index: HashMap<String, NodeIndex>,
}

impl FamilyGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a graph from an ordered node list and an ordered edge list.
    ///
    /// Edge endpoints missing from `nodes` are added on the fly; self-edges
    /// and duplicates are dropped as in [`FamilyGraph::add_relation`].
    pub fn from_parts<'a>(
        nodes: impl IntoIterator<Item = &'a str>,
        relations: impl IntoIterator<Item = &'a Relation>,
    ) -> Self {
        let mut graph = Self::new();
        for label in nodes {
            graph.add_person(label);
        }
        for relation in relations {
            graph.add_relation(&relation.parent, &relation.child);
        }
        graph
    }

    // =========================================================================
    // Node Operations
    // =========================================================================

    /// Add a person, returning the existing index if the label is known.
    pub fn add_person(&mut self, label: &str) -> NodeIndex {
        if let Some(&index) = self.label_to_index.get(label) {
            return index;
        }
        let index = self.graph.add_node(label.to_string());
        self.label_to_index.insert(label.to_string(), index);
        index
    }

    /// Whether a label is present.
    pub fn contains(&self, label: &str) -> bool {
        self.label_to_index.contains_key(label)
    }

    /// Get the node index of a label.
    pub fn index_of(&self, label: &str) -> Option<NodeIndex> {
        self.label_to_index.get(label).copied()
    }

    /// Get the label stored at a node index.
    pub fn label(&self, index: NodeIndex) -> Option<&str> {
        self.graph.node_weight(index).map(String::as_str)
    }

    /// Number of persons.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Node indices in insertion order.
    pub fn node_indices(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.node_indices()
    }

    /// Labels in insertion order.
    pub fn persons(&self) -> impl Iterator<Item = &str> + '_ {
        self.graph
            .node_indices()
            .filter_map(move |index| self.label(index))
    }

    // =========================================================================
    // Edge Operations
    // =========================================================================

    /// Add a parent → child edge, creating either endpoint if needed.
    ///
    /// Returns `None` for a self-edge, which is never inserted. Adding an
    /// existing pair returns the existing edge without duplicating it.
    pub fn add_relation(&mut self, parent: &str, child: &str) -> Option<EdgeIndex> {
        if parent == child {
            return None;
        }
        let parent_index = self.add_person(parent);
        let child_index = self.add_person(child);

        if let Some(existing) = self.graph.find_edge(parent_index, child_index) {
            return Some(existing);
        }
        Some(self.graph.add_edge(parent_index, child_index, ()))
    }

    /// Whether the edge parent → child exists.
    pub fn has_relation(&self, parent: &str, child: &str) -> bool {
        match (self.index_of(parent), self.index_of(child)) {
            (Some(p), Some(c)) => self.graph.find_edge(p, c).is_some(),
            _ => false,
        }
    }

    /// Number of relations.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Relations as borrowed label pairs, in insertion order.
    pub fn relation_pairs(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.graph.edge_indices().filter_map(move |edge| {
            let (source, target) = self.graph.edge_endpoints(edge)?;
            Some((self.label(source)?, self.label(target)?))
        })
    }

    /// Relations as owned values, in insertion order.
    pub fn relations(&self) -> Vec<Relation> {
        self.relation_pairs()
            .map(|(parent, child)| Relation::new(parent, child))
            .collect()
    }

    /// Child indices of a node, in edge insertion order.
    ///
    /// petgraph walks adjacency lists newest-first, so the edges are sorted
    /// back into insertion order by edge index.
    pub fn child_indices(&self, index: NodeIndex) -> Vec<NodeIndex> {
        let mut edges: Vec<(EdgeIndex, NodeIndex)> = self
            .graph
            .edges_directed(index, Direction::Outgoing)
            .map(|edge| (edge.id(), edge.target()))
            .collect();
        edges.sort_unstable_by_key(|&(edge, _)| edge);
        edges.into_iter().map(|(_, target)| target).collect()
    }

    /// Child labels of a person, in edge insertion order.
    pub fn children(&self, label: &str) -> Vec<&str> {
        self.index_of(label)
            .map(|index| {
                self.child_indices(index)
                    .into_iter()
                    .filter_map(|child| self.label(child))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Parent labels of a person, in edge insertion order.
    pub fn parents(&self, label: &str) -> Vec<&str> {
        let Some(index) = self.index_of(label) else {
            return Vec::new();
        };
        let mut edges: Vec<(EdgeIndex, NodeIndex)> = self
            .graph
            .edges_directed(index, Direction::Incoming)
            .map(|edge| (edge.id(), edge.source()))
            .collect();
        edges.sort_unstable_by_key(|&(edge, _)| edge);
        edges
            .into_iter()
            .filter_map(|(_, source)| self.label(source))
            .collect()
    }
}
