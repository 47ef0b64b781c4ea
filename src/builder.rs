//! Tree builder: per-branch tables → one rooted family graph.
//!
//! Every sheet is one branch hanging directly off the root. Inside a sheet,
//! each row (or column, see [`ScanOrder`]) is one lineage: the qualifying
//! names in it are chained parent → child, starting from the branch label.
//!
//! ```text
//! root ─┬─ Alice ─┬─ Bob ── Carol      sheet "Alice": [Bob, Carol]
//!       │         └─ Dave                             [Dave]
//!       └─ Eve ──── Frank              sheet "Eve":   [Frank]
//! ```
//!
//! The builder is total: any table of scalars produces a graph. Problems that
//! would corrupt the graph (a person as their own parent) are skipped and
//! reported as [`BuildWarning`]s.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::error::BuildWarning;
use crate::filter::Selection;
use crate::graph::FamilyGraph;
use crate::table::{Cell, Table, TableSet, is_sentinel};

/// Root label used when the caller does not supply one.
pub const DEFAULT_ROOT_LABEL: &str = "Henrietta & Edmond";

/// How the names of one lineage are attached.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChainPolicy {
    /// Each name is the child of the previous name in the lineage.
    #[default]
    Sequential,
    /// Every name is a direct child of the branch.
    Flat,
}

/// Which direction of a table forms a lineage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ScanOrder {
    /// One lineage per row, read left to right.
    #[default]
    Rows,
    /// One lineage per column, read top to bottom.
    Columns,
}

/// Configuration for the tree builder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BuildConfig {
    /// The fixed ancestor every branch hangs from.
    pub root_label: String,
    /// Chaining rule within a lineage (default: sequential).
    pub chain_policy: ChainPolicy,
    /// Row- or column-wise lineages (default: rows).
    pub scan_order: ScanOrder,
    /// Leading rows of every table to ignore, e.g. a header row (default: 0).
    pub header_rows: usize,
    /// Additional tokens treated like the built-in sentinels.
    pub extra_sentinels: Vec<String>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            root_label: DEFAULT_ROOT_LABEL.to_string(),
            chain_policy: ChainPolicy::Sequential,
            scan_order: ScanOrder::Rows,
            header_rows: 0,
            extra_sentinels: Vec::new(),
        }
    }
}

impl BuildConfig {
    /// Default configuration with a specific root label.
    pub fn with_root(root_label: impl Into<String>) -> Self {
        Self {
            root_label: root_label.into(),
            ..Self::default()
        }
    }
}

/// Result of a build: the graph plus every recovered problem.
#[derive(Debug, Clone)]
pub struct BuildOutcome {
    pub graph: FamilyGraph,
    pub warnings: Vec<BuildWarning>,
}

/// The tree builder.
pub struct TreeBuilder {
    config: BuildConfig,
    root: String,
}

impl TreeBuilder {
    /// Create a builder with the given configuration.
    pub fn new(config: BuildConfig) -> Self {
        let root = config.root_label.trim().to_string();
        Self { config, root }
    }

    /// Create a builder with default configuration and the given root.
    pub fn with_root(root_label: impl Into<String>) -> Self {
        Self::new(BuildConfig::with_root(root_label))
    }

    /// The trimmed root label.
    pub fn root_label(&self) -> &str {
        &self.root
    }

    /// Build the family graph from a table set.
    ///
    /// Sheets, rows and cells are visited in the order supplied, so two
    /// builds of the same input insert nodes and edges identically.
    pub fn build(&self, tables: &TableSet) -> BuildOutcome {
        let mut graph = FamilyGraph::new();
        let mut warnings = Vec::new();

        graph.add_person(&self.root);

        // Branches first, so the root's relations lead the edge order.
        let mut branches: Vec<(&str, &Table)> = Vec::with_capacity(tables.len());
        for (position, (sheet, table)) in tables.iter().enumerate() {
            let branch = sheet.trim();
            if branch.is_empty() {
                warn!("Ignoring sheet #{position}: blank label");
                warnings.push(BuildWarning::BlankBranchLabel { position });
                continue;
            }
            if self.is_sentinel_label(branch) {
                warn!("Ignoring sheet #{position}: sentinel label '{branch}'");
                warnings.push(BuildWarning::SentinelBranchLabel {
                    label: branch.to_string(),
                    position,
                });
                continue;
            }
            graph.add_person(branch);
            self.link(&mut graph, &mut warnings, &self.root, branch, branch, 0);
            branches.push((branch, table));
        }

        for (branch, table) in branches {
            if table.is_blank() {
                debug!("Branch '{branch}': blank table, no descendants");
                continue;
            }

            let before = graph.edge_count();
            match self.config.scan_order {
                ScanOrder::Rows => {
                    for (row, cells) in table.rows().iter().enumerate().skip(self.config.header_rows) {
                        self.link_lineage(&mut graph, &mut warnings, branch, cells.iter(), row);
                    }
                }
                ScanOrder::Columns => {
                    for column in 0..table.column_count() {
                        let cells = table.column(column, self.config.header_rows);
                        self.link_lineage(&mut graph, &mut warnings, branch, cells, column);
                    }
                }
            }
            debug!(
                "Branch '{branch}': {} rows, {} new relations",
                table.row_count(),
                graph.edge_count() - before
            );
        }

        info!(
            "Built family graph rooted at '{}': {} persons, {} relations, {} warnings",
            self.root,
            graph.node_count(),
            graph.edge_count(),
            warnings.len()
        );

        BuildOutcome { graph, warnings }
    }

    /// Chain the names of one lineage under `branch`.
    ///
    /// Cells that are not names are skipped without breaking the chain: the
    /// next name still attaches to the last name seen (the anchor).
    fn link_lineage<'c>(
        &self,
        graph: &mut FamilyGraph,
        warnings: &mut Vec<BuildWarning>,
        branch: &str,
        cells: impl Iterator<Item = &'c Cell>,
        line: usize,
    ) {
        let mut anchor = branch.to_string();
        for cell in cells {
            let Some(name) = self.name_of(cell) else {
                continue;
            };
            let parent = match self.config.chain_policy {
                ChainPolicy::Sequential => anchor.as_str(),
                ChainPolicy::Flat => branch,
            };
            self.link(graph, warnings, parent, &name, branch, line);
            anchor = name;
        }
    }

    /// Insert parent → child unless it is a self-reference.
    fn link(
        &self,
        graph: &mut FamilyGraph,
        warnings: &mut Vec<BuildWarning>,
        parent: &str,
        child: &str,
        branch: &str,
        line: usize,
    ) {
        if parent == child {
            warn!("Skipping self-reference '{child}' in branch '{branch}' (line {line})");
            warnings.push(BuildWarning::SelfReferenceEdge {
                label: child.to_string(),
                branch: branch.to_string(),
                row: line,
            });
            return;
        }
        graph.add_relation(parent, child);
    }

    /// The person name in a cell, honouring configured extra sentinels.
    fn name_of(&self, cell: &Cell) -> Option<String> {
        let name = cell.name()?;
        if self.is_sentinel_label(&name) { None } else { Some(name) }
    }

    /// Built-in or configured sentinel.
    fn is_sentinel_label(&self, text: &str) -> bool {
        is_sentinel(text)
            || self
                .config
                .extra_sentinels
                .iter()
                .any(|token| text.trim().eq_ignore_ascii_case(token.trim()))
    }

    /// Selector options for `tables` under this builder's sentinel rules.
    pub fn branch_options(&self, tables: &TableSet) -> Vec<String> {
        branch_options(tables)
            .into_iter()
            .filter(|option| option == Selection::ALL_LABEL || !self.is_sentinel_label(option))
            .collect()
    }
}

/// Build with default settings and the given root label.
pub fn build_family_graph(tables: &TableSet, root_label: &str) -> BuildOutcome {
    TreeBuilder::with_root(root_label).build(tables)
}

/// Options for a branch selector: "All" followed by each branch label.
///
/// Labels are trimmed, and repeats collapsed, keeping the sheet order.
/// Blank and sentinel labels are dropped, as the builder ignores those
/// sheets. A sheet labelled "All" (any case) is dropped too: the selector
/// reads that value as the whole tree, and its people stay visible there.
pub fn branch_options(tables: &TableSet) -> Vec<String> {
    let mut options = vec![Selection::ALL_LABEL.to_string()];
    for (sheet, _) in tables.iter() {
        let branch = sheet.trim();
        if is_sentinel(branch) || branch.eq_ignore_ascii_case(Selection::ALL_LABEL) {
            continue;
        }
        if !options[1..].iter().any(|known| known == branch) {
            options.push(branch.to_string());
        }
    }
    options
}

/// Read direct-children labels from a table's first column.
///
/// A caller convention for workbooks whose first sheet lists the root's
/// children; the core does not depend on it.
pub fn branches_from_first_column(table: &Table) -> Vec<String> {
    let mut branches: Vec<String> = Vec::new();
    for cell in table.column(0, 0) {
        let text = cell.coerce();
        if !is_sentinel(&text) && !branches.contains(&text) {
            branches.push(text);
        }
    }
    branches
}
