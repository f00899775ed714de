use std::collections::{HashMap, HashSet};

use tracing::trace;

use crate::types::{SpatialNode, Vec3};

/// Line segment joining two node positions.
///
/// The segment is anchored at `from` and extends toward `to`. Angles are in
/// degrees: `angle_x = atan2(dy, sqrt(dx^2 + dz^2))`, `angle_y = atan2(dx, dz)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConnectionGeometry {
    pub from: Vec3,
    pub to: Vec3,
    pub length: f64,
    pub angle_x: f64,
    pub angle_y: f64,
}

impl ConnectionGeometry {
    pub fn between(from: Vec3, to: Vec3) -> Self {
        let d = to.sub(from);
        let horizontal = (d.x * d.x + d.z * d.z).sqrt();
        Self {
            from,
            to,
            length: d.length(),
            angle_x: d.y.atan2(horizontal).to_degrees(),
            angle_y: d.x.atan2(d.z).to_degrees(),
        }
    }

    /// Point at fraction `t` of the way from the anchor.
    pub fn point_at(&self, t: f64) -> Vec3 {
        self.from.lerp(self.to, t.clamp(0.0, 1.0))
    }
}

/// A directed edge whose endpoints both resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConnection {
    pub source: String,
    pub target: String,
    pub source_index: usize,
    pub target_index: usize,
}

impl ResolvedConnection {
    /// True when `id` is either endpoint.
    pub fn touches(&self, id: &str) -> bool {
        self.source == id || self.target == id
    }
}

/// Resolve every drawable edge of the collection.
///
/// `index` maps each id to the node that represents it. Edges to unknown
/// ids, self references, repeats of the same source/target pair and edges
/// declared on shadowed duplicate nodes are skipped without error.
pub fn resolve_connections<C>(
    nodes: &[SpatialNode<C>],
    index: &HashMap<String, usize>,
) -> Vec<ResolvedConnection> {
    let mut seen: HashSet<(usize, usize)> = HashSet::new();
    let mut resolved = Vec::new();

    for (source_index, node) in nodes.iter().enumerate() {
        if index.get(&node.id) != Some(&source_index) {
            continue;
        }
        for target in &node.connections {
            let Some(&target_index) = index.get(target) else {
                trace!(source = %node.id, %target, "skipping connection to unknown node");
                continue;
            };
            if target_index == source_index {
                trace!(source = %node.id, "skipping self connection");
                continue;
            }
            if !seen.insert((source_index, target_index)) {
                continue;
            }
            resolved.push(ResolvedConnection {
                source: node.id.clone(),
                target: target.clone(),
                source_index,
                target_index,
            });
        }
    }

    resolved
}

/// Fixed-period looping pulse. Every connection completes one traversal per
/// period regardless of its length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowPulse {
    pub period: f64,
}

impl FlowPulse {
    pub fn new(period: f64) -> Self {
        Self {
            period: period.max(f64::EPSILON),
        }
    }

    /// Progress in `0..1` at clock time `elapsed`.
    pub fn progress(&self, elapsed: f64) -> f64 {
        (elapsed / self.period).rem_euclid(1.0)
    }
}

impl Default for FlowPulse {
    fn default() -> Self {
        Self::new(2.0)
    }
}
