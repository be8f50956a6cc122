// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::closure::MetricClosure;
use super::AnnealingOptions;

/// Improves a closed cycle of target indices with
/// [simulated annealing](https://en.wikipedia.org/wiki/Simulated_annealing).
///
/// Every move swaps two randomly chosen targets, leaving the first (and last)
/// element of the cycle in place. Improving moves are always accepted, worsening
/// moves with probability `exp(-delta / temperature)`. After every round of
/// [AnnealingOptions::inner_iterations] moves the temperature decays by
/// [AnnealingOptions::cooling]; the search ends after
/// [AnnealingOptions::max_stale_rounds] rounds without a new best cycle.
///
/// The result only depends on the inputs and [AnnealingOptions::seed].
pub(super) fn anneal(
    closure: &MetricClosure,
    mut cycle: Vec<usize>,
    options: &AnnealingOptions,
) -> Vec<usize> {
    // Positions 1..movable can be swapped; at least two of them are needed.
    let movable = cycle.len().saturating_sub(1);
    if movable < 3 {
        return cycle;
    }

    let mut rng = StdRng::seed_from_u64(options.seed);
    let mut cost = closure.cycle_cost(&cycle);
    let mut best = cycle.clone();
    let mut best_cost = cost;
    let mut temperature = options.initial_temperature;
    let mut stale_rounds: usize = 0;

    while stale_rounds <= options.max_stale_rounds && temperature > 0.0 {
        stale_rounds += 1;

        for _ in 0..options.inner_iterations {
            let a = rng.random_range(1..movable);
            let mut b = rng.random_range(1..movable - 1);
            if b >= a {
                b += 1;
            }

            cycle.swap(a, b);
            let candidate_cost = closure.cycle_cost(&cycle);
            let delta = candidate_cost - cost;

            let accept = if delta <= 0.0 {
                true
            } else {
                (-delta / temperature).exp() >= rng.random::<f64>()
            };

            if accept {
                cost = candidate_cost;
                if cost < best_cost {
                    best.clone_from(&cycle);
                    best_cost = cost;
                    stale_rounds = 0;
                }
            } else {
                cycle.swap(a, b);
            }
        }

        temperature -= temperature * options.cooling;
        log::debug!(
            "annealing: temperature {:.3}, current cost {:.1}, best cost {:.1}",
            temperature,
            cost,
            best_cost
        );
    }

    best
}
