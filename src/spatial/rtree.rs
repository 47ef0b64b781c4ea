//! R-tree hit testing over laid-out persons, using the rstar crate.
//!
//! Provides O(log n) queries a renderer needs to map a pointer back to a
//! person:
//! - Nearest person (optionally within a distance)
//! - Persons in a radius
//! - Persons in a rectangle

use rstar::{AABB, PointDistance, RTree, RTreeObject};

use crate::layout::PositionMap;

/// A laid-out person in the index. `slot` indexes the label table.
#[derive(Debug, Clone, Copy, PartialEq)]
struct PersonPoint {
    slot: usize,
    x: f32,
    y: f32,
}

impl RTreeObject for PersonPoint {
    type Envelope = AABB<[f32; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.x, self.y])
    }
}

impl PointDistance for PersonPoint {
    fn distance_2(&self, point: &[f32; 2]) -> f32 {
        let dx = self.x - point[0];
        let dy = self.y - point[1];
        dx * dx + dy * dy
    }

    fn contains_point(&self, point: &[f32; 2]) -> bool {
        (self.x - point[0]).abs() < f32::EPSILON && (self.y - point[1]).abs() < f32::EPSILON
    }
}

/// Spatial index over one layout's coordinates.
///
/// Built once per view; query results come back in layout order so repeated
/// queries are stable.
pub struct PersonIndex {
    tree: RTree<PersonPoint>,
    labels: Vec<String>,
}

impl PersonIndex {
    /// Bulk-load an index from a layout. Non-finite coordinates are left out.
    pub fn from_positions(positions: &PositionMap) -> Self {
        let mut labels = Vec::with_capacity(positions.len());
        let mut points = Vec::with_capacity(positions.len());
        for position in positions.iter() {
            if !(position.x.is_finite() && position.y.is_finite()) {
                continue;
            }
            points.push(PersonPoint {
                slot: labels.len(),
                x: position.x,
                y: position.y,
            });
            labels.push(position.label.clone());
        }

        Self {
            tree: RTree::bulk_load(points),
            labels,
        }
    }

    /// Find the person nearest to a point.
    pub fn nearest(&self, x: f32, y: f32) -> Option<&str> {
        self.tree
            .nearest_neighbor(&[x, y])
            .map(|point| self.labels[point.slot].as_str())
    }

    /// Find the nearest person within a maximum distance.
    pub fn nearest_within(&self, x: f32, y: f32, max_distance: f32) -> Option<&str> {
        let max_distance_sq = max_distance * max_distance;
        self.tree
            .nearest_neighbor(&[x, y])
            .filter(|point| point.distance_2(&[x, y]) <= max_distance_sq)
            .map(|point| self.labels[point.slot].as_str())
    }

    /// Find all persons within a rectangle.
    pub fn in_rect(&self, min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Vec<&str> {
        let envelope = AABB::from_corners([min_x, min_y], [max_x, max_y]);
        self.collect(self.tree.locate_in_envelope(&envelope))
    }

    /// Find all persons within a radius of a point.
    pub fn in_radius(&self, x: f32, y: f32, radius: f32) -> Vec<&str> {
        let radius_sq = radius * radius;
        self.collect(self.tree.locate_within_distance([x, y], radius_sq))
    }

    fn collect<'a>(&self, points: impl Iterator<Item = &'a PersonPoint>) -> Vec<&str> {
        let mut slots: Vec<usize> = points.map(|point| point.slot).collect();
        slots.sort_unstable();
        slots
            .into_iter()
            .map(|slot| self.labels[slot].as_str())
            .collect()
    }

    /// Number of indexed persons.
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    /// Check if the index is empty.
    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

impl Default for PersonIndex {
    fn default() -> Self {
        Self {
            tree: RTree::new(),
            labels: Vec::new(),
        }
    }
}
