//! Recursive-subdivision hierarchy layout.
//!
//! A tidy-tree approximation: every node owns a horizontal band of width `w`
//! centred on its x position. Its children split that band evenly, left to
//! right in edge insertion order, one `vertical_gap` lower:
//!
//! ```text
//!               R (w)
//!       ┌───────┼───────┐
//!     A (w/3) B (w/3) C (w/3)
//! ```
//!
//! Two guards keep the walk finite on data that is not a tree:
//! - a depth limit; nothing deeper than `max_depth` is placed
//! - a node is placed once, by the first path that reaches it, and never
//!   re-entered (multi-parent nodes and cycles)
//!
//! If any node of the graph is left without a position the layout reports a
//! [`LayoutError`] instead of a partial result.

use std::collections::HashMap;

use petgraph::stable_graph::NodeIndex;

use super::{LayoutConfig, PositionMap};
use crate::error::LayoutError;
use crate::graph::FamilyGraph;

/// The hierarchy layout engine.
#[derive(Debug, Clone)]
pub struct HierarchyLayout {
    total_width: f32,
    vertical_gap: f32,
    max_depth: u32,
}

/// Mutable state of one layout pass.
struct Pass {
    positions: HashMap<NodeIndex, (f32, f32)>,
    /// Placement order, so output follows the walk deterministically.
    order: Vec<NodeIndex>,
    /// Set when the depth limit cut off at least one child.
    truncated: bool,
}

impl HierarchyLayout {
    /// Create a layout engine.
    pub fn new(total_width: f32, vertical_gap: f32, max_depth: u32) -> Self {
        Self {
            total_width,
            vertical_gap,
            max_depth,
        }
    }

    /// Create a layout engine from the shared layout configuration.
    pub fn from_config(config: &LayoutConfig) -> Self {
        Self::new(config.total_width, config.vertical_gap, config.max_depth)
    }

    /// Compute positions for every node of `graph`, rooted at `root`.
    ///
    /// The root sits at `(total_width / 2, 0)`; depth `d` sits at
    /// `y = -d * vertical_gap`.
    pub fn compute(&self, graph: &FamilyGraph, root: &str) -> Result<PositionMap, LayoutError> {
        let root_index = graph.index_of(root).ok_or_else(|| LayoutError::MissingRoot {
            root: root.to_string(),
        })?;

        let mut pass = Pass {
            positions: HashMap::with_capacity(graph.node_count()),
            order: Vec::with_capacity(graph.node_count()),
            truncated: false,
        };

        let root_x = self.total_width / 2.0;
        pass.positions.insert(root_index, (root_x, 0.0));
        pass.order.push(root_index);
        self.place_children(graph, root_index, root_x, 0.0, self.total_width, 0, &mut pass);

        let total = graph.node_count();
        if pass.positions.len() < total {
            if pass.truncated {
                return Err(LayoutError::DepthExceeded {
                    max_depth: self.max_depth,
                    positioned: pass.positions.len(),
                    total,
                });
            }
            let first = graph
                .node_indices()
                .find(|index| !pass.positions.contains_key(index))
                .and_then(|index| graph.label(index))
                .unwrap_or_default()
                .to_string();
            return Err(LayoutError::Unpositioned {
                count: total - pass.positions.len(),
                first,
            });
        }

        let mut positions = PositionMap::with_capacity(total);
        for index in pass.order {
            if let (Some(label), Some(&(x, y))) = (graph.label(index), pass.positions.get(&index)) {
                positions.insert(label, x, y);
            }
        }
        Ok(positions)
    }

    /// Place the unplaced children of `node`, then recurse into each of them.
    #[allow(clippy::too_many_arguments)]
    fn place_children(
        &self,
        graph: &FamilyGraph,
        node: NodeIndex,
        x: f32,
        y: f32,
        width: f32,
        depth: u32,
        pass: &mut Pass,
    ) {
        let fresh: Vec<NodeIndex> = graph
            .child_indices(node)
            .into_iter()
            .filter(|child| !pass.positions.contains_key(child))
            .collect();

        if fresh.is_empty() {
            return;
        }
        if depth >= self.max_depth {
            pass.truncated = true;
            return;
        }

        let child_width = width / fresh.len() as f32;
        let left = x - width / 2.0;
        let child_y = y - self.vertical_gap;

        for (slot, &child) in fresh.iter().enumerate() {
            let child_x = left + child_width * (slot as f32 + 0.5);
            pass.positions.insert(child, (child_x, child_y));
            pass.order.push(child);
        }

        for &child in &fresh {
            if let Some(&(child_x, _)) = pass.positions.get(&child) {
                self.place_children(graph, child, child_x, child_y, child_width, depth + 1, pass);
            }
        }
    }
}

impl Default for HierarchyLayout {
    fn default() -> Self {
        Self::from_config(&LayoutConfig::default())
    }
}
