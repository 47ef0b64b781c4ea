//! The build → filter → layout pipeline as one value.
//!
//! [`FamilyTree`] owns the graph built from a table set. Each call to
//! [`FamilyTree::view`] filters it to a selection and lays the result out,
//! returning everything a renderer needs in a [`TreeView`]. Nothing is kept
//! between views.

use serde::Serialize;

use crate::builder::{BuildConfig, TreeBuilder};
use crate::error::BuildWarning;
use crate::filter::{Selection, filter_branch};
use crate::graph::{FamilyGraph, Relation};
use crate::layout::{LayoutConfig, LayoutKind, PositionMap, compute_layout};
use crate::spatial::PersonIndex;
use crate::table::TableSet;

/// A built family graph together with its root and selector options.
#[derive(Debug, Clone)]
pub struct FamilyTree {
    graph: FamilyGraph,
    root: String,
    branches: Vec<String>,
    warnings: Vec<BuildWarning>,
}

impl FamilyTree {
    /// Build the family graph for `tables`.
    pub fn from_tables(tables: &TableSet, config: &BuildConfig) -> Self {
        let builder = TreeBuilder::new(config.clone());
        let outcome = builder.build(tables);
        Self {
            root: builder.root_label().to_string(),
            graph: outcome.graph,
            branches: builder.branch_options(tables),
            warnings: outcome.warnings,
        }
    }

    pub fn graph(&self) -> &FamilyGraph {
        &self.graph
    }

    pub fn root_label(&self) -> &str {
        &self.root
    }

    /// Selector options: "All" followed by the branch labels.
    pub fn branch_options(&self) -> &[String] {
        &self.branches
    }

    pub fn warnings(&self) -> &[BuildWarning] {
        &self.warnings
    }

    /// Filter to `selection` and lay the result out.
    pub fn view(&self, selection: &Selection, config: &LayoutConfig) -> TreeView {
        let filtered = filter_branch(&self.graph, &self.root, selection);
        let layout = match selection {
            Selection::All => compute_layout(&self.graph, &self.root, config),
            Selection::Branch(_) => compute_layout(&filtered.to_graph(), &self.root, config),
        };

        TreeView {
            selection: selection.label().to_string(),
            nodes: filtered.nodes,
            edges: filtered.edges,
            positions: layout.positions,
            layout: layout.kind,
            failure: layout.failure.map(|err| err.to_string()),
        }
    }
}

/// One rendered selection: filtered graph plus coordinates.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeView {
    pub selection: String,
    pub nodes: Vec<String>,
    pub edges: Vec<Relation>,
    pub positions: PositionMap,
    pub layout: LayoutKind,
    /// Why the hierarchy layout was abandoned, for fallback views.
    pub failure: Option<String>,
}

impl TreeView {
    /// Interleaved `[x0, y0, x1, y1, ...]` following `nodes`.
    pub fn interleaved_positions(&self) -> Vec<f32> {
        self.positions
            .interleaved(self.nodes.iter().map(String::as_str))
    }

    /// Build a hit-testing index over this view's coordinates.
    pub fn person_index(&self) -> PersonIndex {
        PersonIndex::from_positions(&self.positions)
    }
}
