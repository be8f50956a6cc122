// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use crate::{earth_distance, Graph, Node, NodeLocator};

/// KDTree implements the [k-d tree data structure](https://en.wikipedia.org/wiki/K-d_tree),
/// which speeds up resolving many addresses against a large road network.
/// [Graph::find_nearest_node] scans every node on every lookup, while the tree
/// trades memory usage for CPU time.
///
/// This implementation assumes euclidean geometry, even though the distance function
/// used is [earth_distance]. This results in undefined behavior when points
/// are close to the ante meridian (180°/-180° longitude) or poles (90°/-90° latitude),
/// which is acceptable for city-sized networks.
#[derive(Debug, Clone)]
pub struct KDTree {
    pivot: Node,
    left: Option<Box<KDTree>>,
    right: Option<Box<KDTree>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Lat,
    Lon,
}

impl Axis {
    #[inline]
    fn other(self) -> Self {
        match self {
            Self::Lat => Self::Lon,
            Self::Lon => Self::Lat,
        }
    }

    #[inline]
    fn of(self, lat: f32, lon: f32) -> f32 {
        match self {
            Self::Lat => lat,
            Self::Lon => lon,
        }
    }
}

impl KDTree {
    /// Builds a k-d tree over all nodes of a [Graph].
    /// Returns `None` if the graph is empty.
    pub fn from_graph(g: &Graph) -> Option<Self> {
        let mut nodes: Vec<Node> = g.iter().copied().collect();
        Self::build(&mut nodes)
    }

    /// Builds a k-d tree from a mutable slice of [Nodes](Node). Nodes will be reordered
    /// in the slice to facilitate building the tree.
    pub fn build(nodes: &mut [Node]) -> Option<Self> {
        Self::build_impl(nodes, Axis::Lat)
    }

    /// Finds the closest [Node] to the given position.
    pub fn find_nearest_node(&self, lat: f32, lon: f32) -> Node {
        self.find_nearest_node_impl(lat, lon, Axis::Lat).0
    }

    fn find_nearest_node_impl(&self, lat: f32, lon: f32, axis: Axis) -> (Node, f32) {
        let mut best = self.pivot;
        let mut best_dist = earth_distance(lat, lon, best.lat, best.lon);

        let (first, second) = if axis.of(lat, lon) < axis.of(self.pivot.lat, self.pivot.lon) {
            (&self.left, &self.right)
        } else {
            (&self.right, &self.left)
        };

        if let Some(branch) = first {
            let (alt, alt_dist) = branch.find_nearest_node_impl(lat, lon, axis.other());
            if alt_dist < best_dist {
                best = alt;
                best_dist = alt_dist;
            }
        }

        if let Some(branch) = second {
            // A closer node is possible in the second branch if and only if
            // the splitting axis is closer than the current best candidate.
            let (axis_lat, axis_lon) = match axis {
                Axis::Lat => (self.pivot.lat, lon),
                Axis::Lon => (lat, self.pivot.lon),
            };

            if earth_distance(lat, lon, axis_lat, axis_lon) < best_dist {
                let (alt, alt_dist) = branch.find_nearest_node_impl(lat, lon, axis.other());
                if alt_dist < best_dist {
                    best = alt;
                    best_dist = alt_dist;
                }
            }
        }

        (best, best_dist)
    }

    fn build_impl(nodes: &mut [Node], axis: Axis) -> Option<Self> {
        if nodes.is_empty() {
            return None;
        }

        nodes.sort_by(|a, b| axis.of(a.lat, a.lon).total_cmp(&axis.of(b.lat, b.lon)));
        let median = nodes.len() / 2;
        let pivot = nodes[median];
        let (left, right_and_pivot) = nodes.split_at_mut(median);

        Some(Self {
            pivot,
            left: Self::build_impl(left, axis.other()).map(Box::new),
            right: Self::build_impl(&mut right_and_pivot[1..], axis.other()).map(Box::new),
        })
    }
}

impl NodeLocator for KDTree {
    fn nearest_node(&self, lat: f32, lon: f32) -> Option<Node> {
        Some(self.find_nearest_node(lat, lon))
    }
}
