// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use super::closure::MetricClosure;

/// Builds a closed cycle over all targets of a [MetricClosure] using the
/// nearest-unvisited-neighbor heuristic, starting (and ending) at the `source`-th target.
///
/// Ties are broken in favor of the target which comes first.
pub(super) fn nearest_neighbor_cycle(closure: &MetricClosure, source: usize) -> Vec<usize> {
    let n = closure.len();
    let mut visited = vec![false; n];
    let mut cycle = Vec::with_capacity(n + 1);

    visited[source] = true;
    cycle.push(source);
    let mut at = source;

    while cycle.len() < n {
        let next = (0..n)
            .filter(|&candidate| !visited[candidate])
            .min_by(|&a, &b| {
                closure
                    .cost(at, a)
                    .total_cmp(&closure.cost(at, b))
                    .then(a.cmp(&b))
            });

        match next {
            Some(next) => {
                visited[next] = true;
                cycle.push(next);
                at = next;
            }
            None => break,
        }
    }

    cycle.push(source);
    cycle
}
