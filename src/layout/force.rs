//! Seeded force-directed fallback layout.
//!
//! Used when the hierarchy layout cannot place every node (cycles that strand
//! nodes, disconnected pieces, depth limit). Initial positions are drawn from
//! a seeded RNG and the simulation runs a fixed number of steps, so the same
//! graph and configuration always produce the same picture.
//!
//! The raw simulation coordinates are normalised into the hierarchy layout's
//! frame: x spans `[0, total_width]` (aspect ratio kept, centred), y runs from
//! 0 downwards, and the picture is mirrored if needed so the root ends up in
//! the upper half.

use std::collections::HashMap;

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData, SimulationParameters};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::PositionMap;
use crate::graph::FamilyGraph;

/// Configuration for the fallback simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FallbackConfig {
    /// RNG seed for initial positions (default: 42).
    pub seed: u64,
    /// Simulation steps (default: 300).
    pub iterations: u32,
    /// Time step per simulation update (default: 0.035).
    pub time_step: f32,
    /// Side of the square initial positions are drawn from (default: 200.0).
    pub initial_spread: f32,
    /// Repulsion between nodes (default: 150.0).
    pub force_charge: f32,
    /// Spring strength along edges (default: 0.05).
    pub force_spring: f32,
    /// Force clamp (default: 100.0).
    pub force_max: f32,
    /// Velocity scale (default: 3000.0).
    pub node_speed: f32,
    /// Velocity damping per step (default: 0.9).
    pub damping_factor: f32,
    /// Mass of every node (default: 10.0).
    pub node_mass: f32,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            iterations: 300,
            time_step: 0.035,
            initial_spread: 200.0,
            force_charge: 150.0,
            force_spring: 0.05,
            force_max: 100.0,
            node_speed: 3000.0,
            damping_factor: 0.9,
            node_mass: 10.0,
        }
    }
}

/// The fallback layout engine.
#[derive(Debug, Clone, Default)]
pub struct ForceLayout {
    config: FallbackConfig,
}

impl ForceLayout {
    /// Create a fallback layout with the given configuration.
    pub fn new(config: FallbackConfig) -> Self {
        Self { config }
    }

    /// Lay out every node of `graph` into a frame `total_width` wide.
    pub fn compute(&self, graph: &FamilyGraph, root: Option<&str>, total_width: f32) -> PositionMap {
        let node_count = graph.node_count();
        let mut positions = PositionMap::with_capacity(node_count);
        if node_count == 0 {
            return positions;
        }

        let mut rng = StdRng::seed_from_u64(self.config.seed);
        let mut sim: ForceGraph<(), ()> = ForceGraph::new(SimulationParameters {
            force_charge: self.config.force_charge,
            force_spring: self.config.force_spring,
            force_max: self.config.force_max,
            node_speed: self.config.node_speed,
            damping_factor: self.config.damping_factor,
        });

        let defaults = FallbackConfig::default();
        let spread = positive_or(self.config.initial_spread, defaults.initial_spread);
        let time_step = positive_or(self.config.time_step, defaults.time_step);

        // Graph node order drives both RNG draws and simulation indices.
        let mut seeded: Vec<(String, DefaultNodeIdx, (f32, f32))> = Vec::with_capacity(node_count);
        let mut sim_index: HashMap<&str, DefaultNodeIdx> = HashMap::with_capacity(node_count);
        for label in graph.persons() {
            let start = (rng.gen_range(0.0..spread), rng.gen_range(0.0..spread));
            let idx = sim.add_node(NodeData {
                x: start.0,
                y: start.1,
                mass: self.config.node_mass,
                is_anchor: false,
                user_data: (),
            });
            sim_index.insert(label, idx);
            seeded.push((label.to_string(), idx, start));
        }

        for (parent, child) in graph.relation_pairs() {
            if let (Some(&a), Some(&b)) = (sim_index.get(parent), sim_index.get(child)) {
                sim.add_edge(a, b, EdgeData::default());
            }
        }

        for _ in 0..self.config.iterations {
            sim.update(time_step);
        }

        let mut settled: HashMap<DefaultNodeIdx, (f32, f32)> = HashMap::with_capacity(node_count);
        sim.visit_nodes(|node| {
            settled.insert(node.index(), (node.x(), node.y()));
        });

        let raw: Vec<(String, f32, f32)> = seeded
            .into_iter()
            .map(|(label, idx, start)| {
                let (x, y) = settled
                    .get(&idx)
                    .copied()
                    .filter(|(x, y)| x.is_finite() && y.is_finite())
                    .unwrap_or(start);
                (label, x, y)
            })
            .collect();

        for (label, x, y) in normalize(&raw, root, total_width) {
            positions.insert(&label, x, y);
        }
        positions
    }
}

/// `value` if it is finite and positive, `default` otherwise.
fn positive_or(value: f32, default: f32) -> f32 {
    if value.is_finite() && value > 0.0 { value } else { default }
}

/// Fit raw simulation coordinates into `[0, total_width]` × `[-height, 0]`.
fn normalize(raw: &[(String, f32, f32)], root: Option<&str>, total_width: f32) -> Vec<(String, f32, f32)> {
    let (mut min_x, mut max_x) = (f32::INFINITY, f32::NEG_INFINITY);
    let (mut min_y, mut max_y) = (f32::INFINITY, f32::NEG_INFINITY);
    for &(_, x, y) in raw {
        min_x = min_x.min(x);
        max_x = max_x.max(x);
        min_y = min_y.min(y);
        max_y = max_y.max(y);
    }

    let span_x = max_x - min_x;
    let span_y = max_y - min_y;
    let span = span_x.max(span_y);
    if !span.is_finite() || span <= f32::EPSILON {
        return raw
            .iter()
            .map(|(label, _, _)| (label.clone(), total_width / 2.0, 0.0))
            .collect();
    }

    let scale = total_width / span;
    let x_offset = (total_width - span_x * scale) / 2.0;
    let height = span_y * scale;

    let mut out: Vec<(String, f32, f32)> = raw
        .iter()
        .map(|(label, x, y)| {
            (
                label.clone(),
                (x - min_x) * scale + x_offset,
                -(y - min_y) * scale,
            )
        })
        .collect();

    let root_y = root.and_then(|root| out.iter().find(|(label, _, _)| label == root).map(|p| p.2));
    if let Some(root_y) = root_y {
        if root_y < -height / 2.0 {
            for point in &mut out {
                point.2 = -height - point.2;
            }
        }
    }
    out
}
