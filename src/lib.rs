//! Family Tree - WASM Module
//!
//! Turns per-branch spreadsheet tables into a rooted family graph, filters it
//! to a single branch on request and lays it out for drawing. It is compiled
//! to WebAssembly and exposes a JavaScript-friendly API via wasm-bindgen.
//!
//! # Architecture
//!
//! - `table`: Cell and table model handed over by the spreadsheet loader
//! - `builder`: Tables → family graph (one branch per sheet, one lineage per row)
//! - `graph`: Family graph using petgraph's StableGraph, keyed by label
//! - `filter`: Branch selection (root + branch + descendants)
//! - `layout`: Hierarchy layout with a seeded force-directed fallback
//! - `spatial`: R-tree hit testing over laid-out persons
//! - `tree`: The whole pipeline as one value, used by the JS facade

use js_sys::Float32Array;
use log::Level;
use wasm_bindgen::prelude::*;

pub mod builder;
pub mod error;
pub mod filter;
pub mod graph;
pub mod layout;
pub mod spatial;
pub mod table;
pub mod tree;

use builder::{BuildConfig, branches_from_first_column};
use error::FamilyTreeError;
use filter::Selection;
use layout::LayoutConfig;
use spatial::PersonIndex;
use table::TableSet;
use tree::{FamilyTree, TreeView};

/// Initialize the WASM module: panic messages and `log` output go to the
/// browser console.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(Level::Info);
}

/// Deserialize an optional JS config; `undefined` and `null` mean defaults.
fn config_from_js<T>(
    value: JsValue,
    wrap: fn(serde_wasm_bindgen::Error) -> FamilyTreeError,
) -> error::Result<T>
where
    T: Default + serde::de::DeserializeOwned,
{
    if value.is_undefined() || value.is_null() {
        return Ok(T::default());
    }
    serde_wasm_bindgen::from_value(value).map_err(wrap)
}

fn to_js<T: serde::Serialize>(value: &T) -> error::Result<JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(FamilyTreeError::Serialize)
}

/// Read the root's direct children from the first column of the first sheet.
///
/// For workbooks that list the branches on a leading index sheet. Returns an
/// empty list when there are no sheets.
#[wasm_bindgen(js_name = branchesFromFirstColumn)]
pub fn branches_from_first_column_js(tables: JsValue) -> Result<Vec<String>, JsError> {
    let tables: TableSet =
        serde_wasm_bindgen::from_value(tables).map_err(FamilyTreeError::InvalidTables)?;
    Ok(first_sheet_branches(&tables))
}

fn first_sheet_branches(tables: &TableSet) -> Vec<String> {
    tables
        .first()
        .map(|(_, table)| branches_from_first_column(table))
        .unwrap_or_default()
}

/// Main entry point for the family tree.
///
/// Holds the graph built from one table set. Every call to `view` filters
/// and lays it out from scratch.
#[wasm_bindgen]
pub struct FamilyTreeWasm {
    tree: FamilyTree,
}

#[wasm_bindgen]
impl FamilyTreeWasm {
    /// Build the family graph from loader tables.
    ///
    /// # Arguments
    ///
    /// * `tables` - `{ branch: [[cell, ...], ...], ... }` or `[[branch, rows], ...]`
    /// * `config` - Optional `BuildConfig` (`rootLabel`, `chainPolicy`, `scanOrder`,
    ///   `headerRows`, `extraSentinels`)
    #[wasm_bindgen(constructor)]
    pub fn new(tables: JsValue, config: JsValue) -> Result<FamilyTreeWasm, JsError> {
        let tables: TableSet =
            serde_wasm_bindgen::from_value(tables).map_err(FamilyTreeError::InvalidTables)?;
        let config: BuildConfig = config_from_js(config, FamilyTreeError::InvalidBuildConfig)?;
        Ok(Self {
            tree: FamilyTree::from_tables(&tables, &config),
        })
    }

    // =========================================================================
    // Graph Info
    // =========================================================================

    /// Options for the branch selector, "All" first.
    #[wasm_bindgen(js_name = branchOptions)]
    pub fn branch_options(&self) -> Vec<String> {
        self.tree.branch_options().to_vec()
    }

    /// Problems recovered from while building, as `{ kind, ... }` objects.
    pub fn warnings(&self) -> Result<JsValue, JsError> {
        Ok(to_js(&self.tree.warnings())?)
    }

    #[wasm_bindgen(js_name = nodeCount)]
    pub fn node_count(&self) -> u32 {
        self.tree.graph().node_count() as u32
    }

    #[wasm_bindgen(js_name = edgeCount)]
    pub fn edge_count(&self) -> u32 {
        self.tree.graph().edge_count() as u32
    }

    #[wasm_bindgen(js_name = rootLabel)]
    pub fn root_label(&self) -> String {
        self.tree.root_label().to_string()
    }

    // =========================================================================
    // Views
    // =========================================================================

    /// Filter to a selector value ("All" or a branch label) and lay it out.
    ///
    /// `layout_config` is an optional `LayoutConfig` (`totalWidth`,
    /// `verticalGap`, `maxDepth`, `fallback`).
    pub fn view(&self, selection: &str, layout_config: JsValue) -> Result<FamilyTreeView, JsError> {
        let config: LayoutConfig =
            config_from_js(layout_config, FamilyTreeError::InvalidLayoutConfig)?;
        let view = self.tree.view(&Selection::parse(selection), &config);
        Ok(FamilyTreeView::new(view))
    }
}

/// One laid-out selection, with hit testing over its coordinates.
#[wasm_bindgen]
pub struct FamilyTreeView {
    view: TreeView,
    index: PersonIndex,
}

impl FamilyTreeView {
    fn new(view: TreeView) -> Self {
        let index = view.person_index();
        Self { view, index }
    }
}

#[wasm_bindgen]
impl FamilyTreeView {
    /// The whole view as a plain object: `{ selection, nodes, edges,
    /// positions, layout, failure }`.
    #[wasm_bindgen(js_name = toJs)]
    pub fn to_js(&self) -> Result<JsValue, JsError> {
        Ok(to_js(&self.view)?)
    }

    /// Node labels in view order.
    pub fn nodes(&self) -> Vec<String> {
        self.view.nodes.clone()
    }

    /// Positions as [x0, y0, x1, y1, ...] following `nodes()`.
    pub fn positions(&self) -> Float32Array {
        Float32Array::from(&self.view.interleaved_positions()[..])
    }

    /// "hierarchical" or "fallback".
    #[wasm_bindgen(js_name = layoutKind)]
    pub fn layout_kind(&self) -> String {
        self.view.layout.as_str().to_string()
    }

    /// Why the hierarchy layout was abandoned, if it was.
    pub fn failure(&self) -> Option<String> {
        self.view.failure.clone()
    }

    // =========================================================================
    // Spatial Queries
    // =========================================================================

    /// Find the person nearest to a point.
    ///
    /// Returns None only if the view is empty.
    #[wasm_bindgen(js_name = nearestPerson)]
    pub fn nearest_person(&self, x: f32, y: f32) -> Option<String> {
        self.index.nearest(x, y).map(str::to_string)
    }

    /// Find the person nearest to a point within a maximum distance.
    #[wasm_bindgen(js_name = personAt)]
    pub fn person_at(&self, x: f32, y: f32, max_distance: f32) -> Option<String> {
        self.index
            .nearest_within(x, y, max_distance)
            .map(str::to_string)
    }

    /// Find all persons within a radius of a point, in view order.
    #[wasm_bindgen(js_name = personsInRadius)]
    pub fn persons_in_radius(&self, x: f32, y: f32, radius: f32) -> Vec<String> {
        self.index
            .in_radius(x, y, radius)
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// Find all persons within a rectangular region, in view order.
    #[wasm_bindgen(js_name = personsInRect)]
    pub fn persons_in_rect(&self, min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Vec<String> {
        self.index
            .in_rect(min_x, min_y, max_x, max_y)
            .into_iter()
            .map(str::to_string)
            .collect()
    }
}

#[cfg(test)]
mod integration_tests {
    use super::*;
    use crate::builder::ChainPolicy;
    use crate::graph::Relation;
    use crate::layout::LayoutKind;
    use crate::table::{Cell, Table};

    /// Same pipeline as `FamilyTreeWasm::new` + `view`, without JS values.
    fn sample_tables() -> TableSet {
        TableSet::new()
            .with_sheet(
                "Alice",
                Table::from_strings(vec![vec!["Bob", "Carol"], vec!["Dave"]]),
            )
            .with_sheet("Eve", Table::from_strings(vec![vec!["Frank"]]))
    }

    #[test]
    fn test_tables_to_filtered_layout() {
        let tree = FamilyTree::from_tables(&sample_tables(), &BuildConfig::with_root("Root"));

        let edges: Vec<(&str, &str)> = tree.graph().relation_pairs().collect();
        assert_eq!(
            edges,
            vec![
                ("Root", "Alice"),
                ("Root", "Eve"),
                ("Alice", "Bob"),
                ("Bob", "Carol"),
                ("Alice", "Dave"),
                ("Eve", "Frank"),
            ]
        );

        let view = tree.view(&Selection::parse("Eve"), &LayoutConfig::default());
        assert_eq!(view.nodes, vec!["Root", "Eve", "Frank"]);
        assert_eq!(
            view.edges,
            vec![Relation::new("Root", "Eve"), Relation::new("Eve", "Frank")]
        );
        assert_eq!(view.layout, LayoutKind::Hierarchical);

        let (root_x, root_y) = view.positions.get("Root").unwrap();
        let (_, eve_y) = view.positions.get("Eve").unwrap();
        let (_, frank_y) = view.positions.get("Frank").unwrap();
        assert_eq!((root_x, root_y), (0.5, 0.0));
        assert!(frank_y < eve_y && eve_y < root_y);
    }

    #[test]
    fn test_full_view_siblings_ordered() {
        let tree = FamilyTree::from_tables(&sample_tables(), &BuildConfig::with_root("Root"));
        let view = tree.view(&Selection::All, &LayoutConfig::default());

        let (alice_x, alice_y) = view.positions.get("Alice").unwrap();
        let (eve_x, eve_y) = view.positions.get("Eve").unwrap();
        assert!(alice_x < eve_x);
        assert_eq!(alice_y, eve_y);

        let (bob_x, _) = view.positions.get("Bob").unwrap();
        let (dave_x, _) = view.positions.get("Dave").unwrap();
        assert!(bob_x < dave_x);
    }

    #[test]
    fn test_flat_policy_matches_single_level_rows() {
        let config = BuildConfig {
            chain_policy: ChainPolicy::Flat,
            ..BuildConfig::with_root("Root")
        };
        let tree = FamilyTree::from_tables(&sample_tables(), &config);

        assert!(tree.graph().has_relation("Alice", "Carol"));
        assert!(!tree.graph().has_relation("Bob", "Carol"));
    }

    #[test]
    fn test_messy_cells_end_to_end() {
        let tables = TableSet::new().with_sheet(
            " Alice ",
            Table::new(vec![
                vec![Cell::from("Bob"), Cell::Number(f64::NAN), Cell::from("Carol")],
                vec![Cell::Number(1990.0), Cell::Flag(true)],
                vec![Cell::from("note"), Cell::Blank],
            ]),
        );
        let tree = FamilyTree::from_tables(&tables, &BuildConfig::with_root("Root"));

        assert!(tree.graph().has_relation("Bob", "Carol"));
        assert!(tree.graph().has_relation("Alice", "1990"));
        assert!(tree.graph().has_relation("1990", "true"));
        assert!(!tree.graph().contains("note"));
        assert_eq!(tree.branch_options(), ["All", "Alice"]);
    }

    #[test]
    fn test_cyclic_data_falls_back_deterministically() {
        // Carol names Alice as a child, and a second sheet re-parents Bob.
        let tables = TableSet::new()
            .with_sheet("Alice", Table::from_strings(vec![vec!["Bob", "Carol", "Alice"]]))
            .with_sheet("Eve", Table::from_strings(vec![vec!["Bob"]]));
        let tree = FamilyTree::from_tables(&tables, &BuildConfig::with_root("Root"));

        // Cycles alone do not break the hierarchy layout.
        let view = tree.view(&Selection::All, &LayoutConfig::default());
        assert_eq!(view.layout, LayoutKind::Hierarchical);
        assert_eq!(view.positions.len(), tree.graph().node_count());

        let config = LayoutConfig {
            max_depth: 1,
            ..LayoutConfig::default()
        };
        let first = tree.view(&Selection::All, &config);
        let second = tree.view(&Selection::All, &config);
        assert_eq!(first.layout, LayoutKind::Fallback);
        assert_eq!(first.positions, second.positions);
        assert_eq!(first.positions.len(), tree.graph().node_count());
    }

    #[test]
    fn test_view_hit_testing() {
        let tree = FamilyTree::from_tables(&sample_tables(), &BuildConfig::with_root("Root"));
        let view = FamilyTreeView::new(tree.view(&Selection::All, &LayoutConfig::default()));

        assert_eq!(view.person_at(0.5, 0.0, 0.05), Some("Root".to_string()));
        assert_eq!(view.person_at(0.5, 5.0, 0.05), None);
        let top = view.persons_in_rect(0.0, -0.25, 1.0, 0.1);
        assert_eq!(top, vec!["Root", "Alice", "Eve"]);

        assert_eq!(view.nearest_person(0.75, -0.25), Some("Eve".to_string()));
        assert_eq!(view.persons_in_radius(0.5, 0.0, 0.05), vec!["Root"]);
    }

    #[test]
    fn test_first_sheet_branches() {
        let tables = TableSet::new()
            .with_sheet(
                "Index",
                Table::new(vec![
                    vec![Cell::from("Alice"), Cell::from("born 1901")],
                    vec![Cell::Blank],
                    vec![Cell::from("Eve")],
                ]),
            )
            .with_sheet("Alice", Table::from_strings(vec![vec!["Bob"]]));

        assert_eq!(first_sheet_branches(&tables), vec!["Alice", "Eve"]);
        assert!(first_sheet_branches(&TableSet::new()).is_empty());
    }

    #[test]
    fn test_sentinel_sheet_stays_out_of_view() {
        let tables = sample_tables().with_sheet("None", Table::from_strings(vec![vec!["Bob"]]));
        let tree = FamilyTree::from_tables(&tables, &BuildConfig::with_root("Root"));

        assert!(!tree.graph().contains("None"));
        assert_eq!(tree.branch_options(), ["All", "Alice", "Eve"]);
        let view = tree.view(&Selection::All, &LayoutConfig::default());
        assert!(!view.nodes.iter().any(|node| node == "None"));
    }
}
