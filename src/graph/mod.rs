//! Graph data structures.
//!
//! [`FamilyGraph`] stores the family topology using petgraph's StableGraph,
//! keyed by person label. Its node and edge order is the insertion order,
//! which downstream layout treats as the left-to-right sibling order.

mod family;
mod relation;

pub use family::FamilyGraph;
pub use relation::Relation;
