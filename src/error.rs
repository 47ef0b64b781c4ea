//! Error and warning types.
//!
//! The core never aborts: ingestion problems become [`BuildWarning`] values
//! and hierarchy layout problems become [`LayoutError`] values that the caller
//! recovers from with the fallback layout. Only the JS facade can fail, when
//! the values handed over from JavaScript have the wrong shape.

use serde::Serialize;
use thiserror::Error;

/// Non-fatal condition reported while building the family graph.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum BuildWarning {
    /// A row tried to make a person their own parent. The edge was dropped.
    #[error("skipped self-reference '{label}' in branch '{branch}' (row {row})")]
    SelfReferenceEdge {
        label: String,
        branch: String,
        row: usize,
    },

    /// A sheet label was blank after trimming. The sheet was ignored.
    #[error("skipped sheet #{position} with a blank label")]
    BlankBranchLabel { position: usize },

    /// A sheet label was a sentinel token such as "None". The sheet was ignored.
    #[error("skipped sheet #{position} labelled with sentinel '{label}'")]
    SentinelBranchLabel { label: String, position: usize },
}

/// Reason the hierarchical layout could not position every node.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("root '{root}' is not in the graph")]
    MissingRoot { root: String },

    #[error("depth limit {max_depth} reached with {positioned} of {total} nodes positioned")]
    DepthExceeded {
        max_depth: u32,
        positioned: usize,
        total: usize,
    },

    /// Nodes unreachable from the root (disconnected pieces).
    #[error("{count} nodes unreachable from the root, first '{first}'")]
    Unpositioned { count: usize, first: String },
}

/// Errors surfaced by the WebAssembly facade.
#[derive(Debug, Error)]
pub enum FamilyTreeError {
    #[error("invalid table set: {0}")]
    InvalidTables(#[source] serde_wasm_bindgen::Error),

    #[error("invalid build config: {0}")]
    InvalidBuildConfig(#[source] serde_wasm_bindgen::Error),

    #[error("invalid layout config: {0}")]
    InvalidLayoutConfig(#[source] serde_wasm_bindgen::Error),

    #[error("failed to convert result for JavaScript: {0}")]
    Serialize(#[source] serde_wasm_bindgen::Error),
}

pub type Result<T> = std::result::Result<T, FamilyTreeError>;
