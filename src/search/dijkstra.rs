// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::{BinaryHeap, HashMap, HashSet};

use crate::{CostAttribute, Graph, SearchError};

#[derive(Debug, Clone, Copy)]
struct QueueItem {
    at: i64,
    cost: f32,
}

impl PartialEq for QueueItem {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other).is_eq()
    }
}

impl PartialOrd for QueueItem {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Eq for QueueItem {}

impl Ord for QueueItem {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // NOTE: We revert the order of comparison,
        // as lower costs are considered better ("higher"),
        // and Rust's BinaryHeap is a max-heap. Ties are broken on node ids
        // to keep the search independent of floating-point noise.
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.at.cmp(&self.at))
    }
}

/// Result of a single-source [Dijkstra search](https://en.wikipedia.org/wiki/Dijkstra%27s_algorithm)
/// over a [Graph], grown until a set of target nodes has been settled.
///
/// All parallel edges are considered, so the cheapest one always wins.
#[derive(Debug, Clone)]
pub struct ShortestPathTree {
    root: i64,
    came_from: HashMap<i64, i64>,
    costs: HashMap<i64, f32>,
}

impl ShortestPathTree {
    /// Runs the search from `root` until every node in `targets` has been settled,
    /// or until no more nodes are reachable. Unreachable targets are not an error -
    /// [ShortestPathTree::cost_to] returns `None` for them.
    ///
    /// `step_limit` limits how many nodes may be expanded during the search
    /// before returning [SearchError::StepLimitExceeded]. The recommended value is
    /// [DEFAULT_STEP_LIMIT](crate::DEFAULT_STEP_LIMIT).
    pub fn grow(
        g: &Graph,
        root: i64,
        targets: &[i64],
        attribute: CostAttribute,
        step_limit: usize,
    ) -> Result<Self, SearchError> {
        if g.get_node(root).is_none() {
            return Err(SearchError::InvalidReference(root));
        }

        let mut remaining: HashSet<i64> = targets.iter().copied().filter(|&t| t != root).collect();
        let mut queue: BinaryHeap<QueueItem> = BinaryHeap::default();
        let mut came_from: HashMap<i64, i64> = HashMap::default();
        let mut costs: HashMap<i64, f32> = HashMap::default();
        let mut settled: HashSet<i64> = HashSet::default();
        let mut steps: usize = 0;

        queue.push(QueueItem { at: root, cost: 0.0 });
        costs.insert(root, 0.0);

        while let Some(item) = queue.pop() {
            if remaining.is_empty() {
                break;
            }

            // Multiple items may be kept in the queue for the same node
            if !settled.insert(item.at) {
                continue;
            }
            remaining.remove(&item.at);

            steps += 1;
            if steps > step_limit {
                return Err(SearchError::StepLimitExceeded);
            }

            for edge in g.get_edges(item.at) {
                if settled.contains(&edge.to) || g.get_node(edge.to).is_none() {
                    continue;
                }

                let neighbor_cost = item.cost + edge.cost(attribute);
                if neighbor_cost >= costs.get(&edge.to).copied().unwrap_or(f32::INFINITY) {
                    continue;
                }

                came_from.insert(edge.to, item.at);
                costs.insert(edge.to, neighbor_cost);
                queue.push(QueueItem {
                    at: edge.to,
                    cost: neighbor_cost,
                });
            }
        }

        Ok(Self {
            root,
            came_from,
            costs,
        })
    }

    pub fn root(&self) -> i64 {
        self.root
    }

    /// Returns the cost of the cheapest known way from the root to `to`.
    ///
    /// Only costs of settled targets (and the root) are guaranteed to be minimal.
    pub fn cost_to(&self, to: i64) -> Option<f32> {
        self.costs.get(&to).copied()
    }

    /// Reconstructs the node path from the root to `to`, both inclusive.
    pub fn path_to(&self, to: i64) -> Option<Vec<i64>> {
        if !self.costs.contains_key(&to) {
            return None;
        }

        let mut path = vec![to];
        let mut last = to;
        while let Some(&nd) = self.came_from.get(&last) {
            path.push(nd);
            last = nd;
        }

        path.reverse();
        Some(path)
    }
}
