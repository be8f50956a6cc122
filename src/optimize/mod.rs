// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

mod anneal;
mod closure;
mod greedy;

use std::collections::HashSet;

use crate::{CostAttribute, Graph, OptimizeError, DEFAULT_STEP_LIMIT};
use closure::MetricClosure;

/// Parameters of the [simulated annealing](https://en.wikipedia.org/wiki/Simulated_annealing)
/// pass of [optimize].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnnealingOptions {
    /// Seed of the pseudo-random number generator. Identical seeds produce identical tours.
    pub seed: u64,

    /// Starting temperature, in units of the optimized [CostAttribute].
    pub initial_temperature: f64,

    /// Fraction of the temperature lost after every round, in `(0, 1]`.
    pub cooling: f64,

    /// Number of consecutive rounds without finding a better tour after which the search stops.
    pub max_stale_rounds: usize,

    /// Number of moves attempted in every round.
    pub inner_iterations: usize,
}

impl Default for AnnealingOptions {
    fn default() -> Self {
        Self {
            seed: 1,
            initial_temperature: 100.0,
            cooling: 0.01,
            max_stale_rounds: 10,
            inner_iterations: 100,
        }
    }
}

/// Additional controls for [optimize].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OptimizeOptions {
    /// Edge weight to minimize.
    pub cost: CostAttribute,

    /// Maximum number of node expansions of every shortest path search,
    /// see [ShortestPathTree::grow](crate::ShortestPathTree::grow).
    pub step_limit: usize,

    pub annealing: AnnealingOptions,
}

impl Default for OptimizeOptions {
    fn default() -> Self {
        Self {
            cost: CostAttribute::default(),
            step_limit: DEFAULT_STEP_LIMIT,
            annealing: AnnealingOptions::default(),
        }
    }
}

/// A closed walk over the road network, visiting every target at least once.
///
/// Consecutive nodes are always connected by an edge, and the first node
/// is repeated as the last one. The only exception is a tour over a single
/// target, which consists of just that node (no movement).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tour(Vec<i64>);

impl Tour {
    pub fn nodes(&self) -> &[i64] {
        &self.0
    }

    pub fn into_nodes(self) -> Vec<i64> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns `true` if the tour involves no movement.
    pub fn is_trivial(&self) -> bool {
        self.0.len() <= 1
    }

    /// Returns the total cost of the tour under the provided [CostAttribute],
    /// using the first edge between every pair of consecutive nodes.
    pub fn cost(&self, g: &Graph, attribute: CostAttribute) -> f64 {
        self.0
            .windows(2)
            .filter_map(|p| g.get_edge(p[0], p[1]))
            .map(|e| f64::from(e.cost(attribute)))
            .sum()
    }

    /// Wraps a node sequence without checking any invariants.
    #[cfg(test)]
    pub(crate) fn from_nodes(nodes: Vec<i64>) -> Self {
        Self(nodes)
    }
}

/// Approximates the cheapest closed [Tour] visiting all `targets`.
///
/// Duplicate targets are visited once. The tour starts and ends at the first target.
///
/// The visiting order is built in two phases: a greedy nearest-unvisited-target cycle
/// seeded at the first target, improved by a seeded simulated annealing pass
/// (see [AnnealingOptions]). Consecutive targets are then joined by their cheapest
/// paths, so that the returned tour is walkable edge by edge.
///
/// The road network must be strongly connected with respect to the targets,
/// otherwise [OptimizeError::UnreachableTarget] is returned.
pub fn optimize(
    g: &Graph,
    targets: &[i64],
    options: &OptimizeOptions,
) -> Result<Tour, OptimizeError> {
    let mut seen: HashSet<i64> = HashSet::default();
    let targets: Vec<i64> = targets.iter().copied().filter(|&t| seen.insert(t)).collect();

    if let Some(&missing) = targets.iter().find(|&&t| g.get_node(t).is_none()) {
        return Err(OptimizeError::InvalidReference(missing));
    }

    match targets.as_slice() {
        [] => return Err(OptimizeError::NoTargets),
        &[only] => return Ok(Tour(vec![only])),
        _ => {}
    }

    log::info!(
        "Computing shortest paths between {} delivery nodes",
        targets.len()
    );
    let closure = MetricClosure::build(g, &targets, options.cost, options.step_limit)?;

    let initial = greedy::nearest_neighbor_cycle(&closure, 0);
    let initial_cost = closure.cycle_cost(&initial);

    let cycle = anneal::anneal(&closure, initial, &options.annealing);
    log::info!(
        "Visiting order cost: {:.1} (greedy), {:.1} (annealed)",
        initial_cost,
        closure.cycle_cost(&cycle)
    );

    Ok(Tour(closure.expand(&cycle)))
}
