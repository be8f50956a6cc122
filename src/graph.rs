// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use crate::{earth_distance, Edge, Node, NodeLocator};
use std::collections::btree_map::{BTreeMap, Entry};
use std::collections::{BTreeSet, HashMap};

/// Represents a road network as a set of [Nodes](Node) and directed
/// [Edges](Edge) between them. Multiple parallel edges between the same
/// pair of nodes are allowed.
///
/// The graph is never mutated by route planning, and may be shared
/// between multiple planning runs.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Graph(pub(crate) BTreeMap<i64, (Node, Vec<Edge>)>);

impl Graph {
    /// Returns the number of nodes in the graph.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns an iterator over all [Nodes](Node) in the graph.
    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.0.iter().map(|(_, (node, _))| node)
    }

    /// Retrieves a [Node] with the provided id.
    pub fn get_node(&self, id: i64) -> Option<Node> {
        self.0.get(&id).map(|&(node, _)| node)
    }

    /// Creates or updates a [Node] with `node.id`.
    ///
    /// All outgoing and incoming edges are preserved.
    pub fn set_node(&mut self, node: Node) {
        assert_ne!(node.id, 0);

        match self.0.entry(node.id) {
            Entry::Vacant(e) => {
                e.insert((node, Vec::default()));
            }
            Entry::Occupied(mut e) => {
                debug_assert_eq!(e.get().0.id, node.id);
                e.get_mut().0 = node;
            }
        }
    }

    /// Deletes a [Node] with a given `id`.
    ///
    /// While all outgoing edges are removed, incoming edges are preserved
    /// (as this would require a walk over all nodes in the graph).
    pub fn delete_node(&mut self, id: i64) {
        self.0.remove(&id);
    }

    /// Finds the closest [Node] to the given position.
    ///
    /// This function requires computing the distance to every [Node] in the graph,
    /// and is not suitable for large graphs or many lookups - see [KDTree](crate::KDTree).
    pub fn find_nearest_node(&self, lat: f32, lon: f32) -> Option<Node> {
        self.0
            .values()
            .map(|&(nd, _)| (earth_distance(lat, lon, nd.lat, nd.lon), nd))
            .min_by(|(a_dist, _), (b_dist, _)| a_dist.total_cmp(b_dist))
            .map(|(_, nd)| nd)
    }

    /// Gets all outgoing [Edges](Edge) from a node with a given id.
    pub fn get_edges(&self, from_id: i64) -> &[Edge] {
        self.0
            .get(&from_id)
            .map(|(_, e)| e.as_slice())
            .unwrap_or_default()
    }

    /// Gets the first [Edge] from one node to another.
    /// Parallel edges beyond the first one are never returned.
    pub fn get_edge(&self, from_id: i64, to_id: i64) -> Option<&Edge> {
        self.get_edges(from_id).iter().find(|e| e.to == to_id)
    }

    /// Adds an [Edge] from a node with a given id, keeping any
    /// existing edges to the same node. Does nothing if `from_id` doesn't exist.
    pub fn add_edge(&mut self, from_id: i64, edge: Edge) {
        assert_ne!(from_id, 0);
        assert_ne!(edge.to, 0);

        if let Some((_, edges)) = self.0.get_mut(&from_id) {
            edges.push(edge);
        }
    }

    /// Removes all edges from one node to another.
    pub fn delete_edges(&mut self, from_id: i64, to_id: i64) {
        if let Some((_, edges)) = self.0.get_mut(&from_id) {
            edges.retain(|e| e.to != to_id);
        }
    }

    /// Returns `true` if every node can be reached from every other node.
    /// An empty graph is considered strongly connected.
    pub fn is_strongly_connected(&self) -> bool {
        self.strongly_connected_components().len() <= 1
    }

    /// Splits the graph into [strongly connected components](https://en.wikipedia.org/wiki/Strongly_connected_component)
    /// using [Kosaraju's algorithm](https://en.wikipedia.org/wiki/Kosaraju%27s_algorithm).
    /// Edges to nodes which don't exist are ignored.
    ///
    /// Components are returned largest first; node ids within a component are sorted.
    pub fn strongly_connected_components(&self) -> Vec<Vec<i64>> {
        let finish_order = self.finish_order();

        let mut reversed: HashMap<i64, Vec<i64>> = HashMap::default();
        for (&from_id, (_, edges)) in &self.0 {
            for e in edges.iter().filter(|e| self.0.contains_key(&e.to)) {
                reversed.entry(e.to).or_default().push(from_id);
            }
        }

        let mut assigned: BTreeSet<i64> = BTreeSet::default();
        let mut components: Vec<Vec<i64>> = Vec::default();

        for &root in finish_order.iter().rev() {
            if !assigned.insert(root) {
                continue;
            }

            let mut component = vec![root];
            let mut stack = vec![root];
            while let Some(at) = stack.pop() {
                for &prev in reversed.get(&at).map(Vec::as_slice).unwrap_or_default() {
                    if assigned.insert(prev) {
                        component.push(prev);
                        stack.push(prev);
                    }
                }
            }

            component.sort_unstable();
            components.push(component);
        }

        // Stable sort keeps the discovery order among equally-sized components
        components.sort_by(|a, b| b.len().cmp(&a.len()));
        components
    }

    /// Removes all nodes outside of the largest strongly connected component,
    /// together with any edges leading to them. Returns the number of removed nodes.
    pub fn retain_largest_strongly_connected_component(&mut self) -> usize {
        let keep: BTreeSet<i64> = match self.strongly_connected_components().into_iter().next() {
            Some(largest) => largest.into_iter().collect(),
            None => return 0,
        };

        let before = self.len();
        self.0.retain(|id, _| keep.contains(id));
        for (_, edges) in self.0.values_mut() {
            edges.retain(|e| keep.contains(&e.to));
        }
        before - self.len()
    }

    /// Iterative depth-first search over the whole graph, returning
    /// node ids in the order in which their search has finished.
    fn finish_order(&self) -> Vec<i64> {
        let mut visited: BTreeSet<i64> = BTreeSet::default();
        let mut order: Vec<i64> = Vec::with_capacity(self.len());

        for &root in self.0.keys() {
            if !visited.insert(root) {
                continue;
            }

            // Stack of (node, index of the next edge to explore)
            let mut stack: Vec<(i64, usize)> = vec![(root, 0)];
            while let Some(top) = stack.last_mut() {
                let at = top.0;
                if let Some(e) = self.get_edges(at).get(top.1) {
                    top.1 += 1;
                    if self.0.contains_key(&e.to) && visited.insert(e.to) {
                        stack.push((e.to, 0));
                    }
                } else {
                    order.push(at);
                    stack.pop();
                }
            }
        }

        order
    }
}

impl NodeLocator for Graph {
    fn nearest_node(&self, lat: f32, lon: f32) -> Option<Node> {
        self.find_nearest_node(lat, lon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{edge, grid, node};

    #[test]
    fn parallel_edges() {
        let mut g = Graph::default();
        g.set_node(node(1, 0.0, 0.0));
        g.set_node(node(2, 0.0, 0.001));
        g.add_edge(1, edge(2, "Via Roma", 100.0, 10.0));
        g.add_edge(1, edge(2, "Via Milano", 90.0, 20.0));

        assert_eq!(g.get_edges(1).len(), 2);
        let first = g.get_edge(1, 2).unwrap();
        assert_eq!(first.length, 100.0);
        assert!(g.get_edge(2, 1).is_none());

        g.delete_edges(1, 2);
        assert!(g.get_edges(1).is_empty());
    }

    #[test]
    fn find_nearest_node() {
        let g = grid();
        assert_eq!(g.find_nearest_node(0.0001, 0.0001).unwrap().id, 1);
        assert_eq!(g.find_nearest_node(0.0021, 0.0019).unwrap().id, 9);
        assert!(Graph::default().find_nearest_node(0.0, 0.0).is_none());
    }

    #[test]
    fn strongly_connected_grid() {
        assert!(grid().is_strongly_connected());
        assert!(Graph::default().is_strongly_connected());
    }

    #[test]
    fn retain_largest_strongly_connected_component() {
        let mut g = grid();

        // 10 -> 1 is a dead-end spur: reachable from nowhere
        g.set_node(node(10, -0.001, 0.0));
        g.add_edge(10, edge(1, "Spur", 100.0, 10.0));

        // 11 <-> 12 is an island
        g.set_node(node(11, 0.01, 0.01));
        g.set_node(node(12, 0.01, 0.011));
        g.add_edge(11, edge(12, "Island", 100.0, 10.0));
        g.add_edge(12, edge(11, "Island", 100.0, 10.0));

        // 9 -> 13 leads into a sink
        g.set_node(node(13, 0.003, 0.002));
        g.add_edge(9, edge(13, "Sink", 100.0, 10.0));

        assert!(!g.is_strongly_connected());
        let components = g.strongly_connected_components();
        assert_eq!(components[0], vec![1, 2, 3, 4, 5, 6, 7, 8, 9]);
        assert_eq!(components.len(), 4);

        assert_eq!(g.retain_largest_strongly_connected_component(), 4);
        assert_eq!(g.len(), 9);
        assert!(g.get_edge(9, 13).is_none());
        assert!(g.is_strongly_connected());
    }
}
