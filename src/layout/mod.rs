//! Layout algorithms for family tree views.
//!
//! [`compute_layout`] is the entry point renderers use: it runs the
//! recursive-subdivision [`hierarchy`] layout and, when that cannot place
//! every node, substitutes the seeded force-directed [`force`] layout. The
//! result says which of the two produced the coordinates.
//!
//! Nothing is cached between calls; every layout is a pure function of the
//! graph, the root and the configuration.

pub mod force;
pub mod hierarchy;

use std::collections::HashMap;
use std::fmt;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::error::LayoutError;
use crate::graph::FamilyGraph;

pub use force::{FallbackConfig, ForceLayout};
pub use hierarchy::HierarchyLayout;

/// Configuration shared by both layouts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
    /// Width of the frame the tree is drawn in (default: 1.0).
    pub total_width: f32,
    /// Vertical distance between generations (default: 0.2).
    pub vertical_gap: f32,
    /// Deepest generation the hierarchy layout will place (default: 50).
    pub max_depth: u32,
    /// Settings for the fallback simulation.
    pub fallback: FallbackConfig,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            total_width: 1.0,
            vertical_gap: 0.2,
            max_depth: 50,
            fallback: FallbackConfig::default(),
        }
    }
}

/// Position of one person.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersonPosition {
    pub label: String,
    pub x: f32,
    pub y: f32,
}

/// Label → (x, y) mapping that remembers insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PositionMap {
    entries: Vec<PersonPosition>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl PositionMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
        }
    }

    /// Set a label's position, replacing any earlier one in place.
    pub fn insert(&mut self, label: &str, x: f32, y: f32) {
        match self.index.get(label) {
            Some(&slot) => {
                self.entries[slot].x = x;
                self.entries[slot].y = y;
            }
            None => {
                self.index.insert(label.to_string(), self.entries.len());
                self.entries.push(PersonPosition {
                    label: label.to_string(),
                    x,
                    y,
                });
            }
        }
    }

    pub fn get(&self, label: &str) -> Option<(f32, f32)> {
        self.index
            .get(label)
            .map(|&slot| (self.entries[slot].x, self.entries[slot].y))
    }

    pub fn contains(&self, label: &str) -> bool {
        self.index.contains_key(label)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PersonPosition> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Interleaved `[x0, y0, x1, y1, ...]` in the order of `labels`.
    /// Labels without a position get `f32::NAN`.
    pub fn interleaved<'a>(&self, labels: impl IntoIterator<Item = &'a str>) -> Vec<f32> {
        labels
            .into_iter()
            .flat_map(|label| {
                let (x, y) = self.get(label).unwrap_or((f32::NAN, f32::NAN));
                [x, y]
            })
            .collect()
    }
}

/// Which algorithm produced a layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutKind {
    Hierarchical,
    Fallback,
}

impl LayoutKind {
    pub fn as_str(self) -> &'static str {
        match self {
            LayoutKind::Hierarchical => "hierarchical",
            LayoutKind::Fallback => "fallback",
        }
    }
}

impl fmt::Display for LayoutKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coordinates plus how they were obtained.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeLayout {
    pub positions: PositionMap,
    pub kind: LayoutKind,
    /// Why the hierarchy layout was abandoned, for fallback layouts.
    pub failure: Option<LayoutError>,
}

impl TreeLayout {
    pub fn is_fallback(&self) -> bool {
        self.kind == LayoutKind::Fallback
    }
}

/// Lay out `graph` from `root`, falling back to the force layout on failure.
///
/// Always returns a position for every node of `graph`.
pub fn compute_layout(graph: &FamilyGraph, root: &str, config: &LayoutConfig) -> TreeLayout {
    match HierarchyLayout::from_config(config).compute(graph, root) {
        Ok(positions) => {
            info!(
                "Hierarchical layout: {} nodes from '{root}'",
                positions.len()
            );
            TreeLayout {
                positions,
                kind: LayoutKind::Hierarchical,
                failure: None,
            }
        }
        Err(err) => {
            warn!("Hierarchical layout failed ({err}); using fallback layout");
            let root = graph.contains(root).then_some(root);
            let positions =
                ForceLayout::new(config.fallback.clone()).compute(graph, root, config.total_width);
            TreeLayout {
                positions,
                kind: LayoutKind::Fallback,
                failure: Some(err),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_level_tree() -> FamilyGraph {
        let mut graph = FamilyGraph::new();
        graph.add_relation("R", "A");
        graph.add_relation("R", "B");
        graph.add_relation("A", "C");
        graph
    }

    #[test]
    fn test_tree_uses_hierarchy() {
        let graph = three_level_tree();
        let layout = compute_layout(&graph, "R", &LayoutConfig::default());

        assert_eq!(layout.kind, LayoutKind::Hierarchical);
        assert!(layout.failure.is_none());
        assert_eq!(layout.positions.len(), 4);
    }

    #[test]
    fn test_zero_depth_triggers_fallback() {
        let graph = three_level_tree();
        let config = LayoutConfig {
            max_depth: 0,
            ..LayoutConfig::default()
        };
        let layout = compute_layout(&graph, "R", &config);

        assert!(layout.is_fallback());
        assert!(matches!(
            layout.failure,
            Some(LayoutError::DepthExceeded { positioned: 1, .. })
        ));
        assert_eq!(layout.positions.len(), 4);
    }

    #[test]
    fn test_missing_root_triggers_fallback() {
        let graph = three_level_tree();
        let layout = compute_layout(&graph, "Nobody", &LayoutConfig::default());

        assert_eq!(layout.kind, LayoutKind::Fallback);
        assert_eq!(
            layout.failure,
            Some(LayoutError::MissingRoot {
                root: "Nobody".into()
            })
        );
        assert_eq!(layout.positions.len(), 4);
    }

    #[test]
    fn test_fallback_is_deterministic() {
        let mut graph = three_level_tree();
        graph.add_relation("X", "Y");

        let config = LayoutConfig::default();
        let first = compute_layout(&graph, "R", &config);
        let second = compute_layout(&graph, "R", &config);

        assert!(first.is_fallback());
        assert_eq!(first.positions, second.positions);
    }

    #[test]
    fn test_position_map_insert_replaces() {
        let mut map = PositionMap::new();
        map.insert("a", 1.0, 2.0);
        map.insert("b", 3.0, 4.0);
        map.insert("a", 5.0, 6.0);

        assert_eq!(map.len(), 2);
        assert_eq!(map.get("a"), Some((5.0, 6.0)));
        assert!(map.contains("b"));
        assert!(!map.contains("c"));
    }

    #[test]
    fn test_interleaved_follows_label_order() {
        let mut map = PositionMap::new();
        map.insert("a", 1.0, 2.0);
        map.insert("b", 3.0, 4.0);

        assert_eq!(map.interleaved(["b", "a"]), vec![3.0, 4.0, 1.0, 2.0]);
        let missing = map.interleaved(["zz"]);
        assert!(missing[0].is_nan() && missing[1].is_nan());
    }

    #[test]
    fn test_layout_kind_labels() {
        assert_eq!(LayoutKind::Hierarchical.to_string(), "hierarchical");
        assert_eq!(LayoutKind::Fallback.as_str(), "fallback");
    }
}
