// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use crate::{CostAttribute, Graph, OptimizeError, SearchError, ShortestPathTree};

/// [Metric closure](https://en.wikipedia.org/wiki/Metric_closure) of a [Graph]
/// restricted to a set of targets: the cost of the cheapest path between
/// every ordered pair of targets, together with the paths themselves.
#[derive(Debug, Clone)]
pub(super) struct MetricClosure {
    targets: Vec<i64>,
    trees: Vec<ShortestPathTree>,
    costs: Vec<Vec<f64>>,
}

impl MetricClosure {
    /// Runs one [ShortestPathTree] search from every target.
    /// Fails with [OptimizeError::UnreachableTarget] if any target can't be
    /// reached from any other target.
    pub(super) fn build(
        g: &Graph,
        targets: &[i64],
        attribute: CostAttribute,
        step_limit: usize,
    ) -> Result<Self, OptimizeError> {
        let mut trees = Vec::with_capacity(targets.len());
        let mut costs = Vec::with_capacity(targets.len());

        for &from in targets {
            let tree = ShortestPathTree::grow(g, from, targets, attribute, step_limit).map_err(
                |e| match e {
                    SearchError::InvalidReference(id) => OptimizeError::InvalidReference(id),
                    SearchError::StepLimitExceeded => OptimizeError::StepLimitExceeded(from),
                },
            )?;

            let row = targets
                .iter()
                .map(|&to| {
                    tree.cost_to(to)
                        .map(f64::from)
                        .ok_or(OptimizeError::UnreachableTarget { from, to })
                })
                .collect::<Result<Vec<f64>, _>>()?;

            trees.push(tree);
            costs.push(row);
        }

        Ok(Self {
            targets: targets.to_vec(),
            trees,
            costs,
        })
    }

    pub(super) fn len(&self) -> usize {
        self.targets.len()
    }

    /// Cost of the cheapest path from the `from`-th to the `to`-th target.
    #[inline]
    pub(super) fn cost(&self, from: usize, to: usize) -> f64 {
        self.costs[from][to]
    }

    /// Total cost of a closed cycle of target indices.
    pub(super) fn cycle_cost(&self, cycle: &[usize]) -> f64 {
        cycle.windows(2).map(|p| self.cost(p[0], p[1])).sum()
    }

    /// Expands a closed cycle of target indices into a walkable node sequence,
    /// where every consecutive pair of nodes is connected by an edge.
    pub(super) fn expand(&self, cycle: &[usize]) -> Vec<i64> {
        let mut nodes = Vec::default();
        for p in cycle.windows(2) {
            let path = self.trees[p[0]]
                .path_to(self.targets[p[1]])
                .unwrap_or_default();
            nodes.extend_from_slice(&path[..path.len().saturating_sub(1)]);
        }
        if let Some(&last) = cycle.last() {
            nodes.push(self.targets[last]);
        }
        nodes
    }
}
