//! Spatial indexing for O(log n) hit testing.
//!
//! Renderers use [`PersonIndex`] to map pointer coordinates back to the
//! person drawn there.

mod rtree;

pub use rtree::PersonIndex;
