// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use crate::{DepotNotInTourError, Tour};

/// A [Tour] reindexed to start and end at the depot.
///
/// A route traverses exactly the same edges in exactly the same cyclic order
/// as the tour it was created from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route(Vec<i64>);

impl Route {
    pub fn nodes(&self) -> &[i64] {
        &self.0
    }

    pub fn into_nodes(self) -> Vec<i64> {
        self.0
    }

    /// Returns the first (and last) node of the route.
    pub fn depot(&self) -> i64 {
        self.0.first().copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns an iterator over traversed `(from, to)` node pairs.
    pub fn legs(&self) -> impl Iterator<Item = (i64, i64)> + '_ {
        self.0.windows(2).map(|p| (p[0], p[1]))
    }
}

/// Cyclically rotates a closed [Tour] so that it starts at `depot`,
/// and closes the cycle by appending `depot` at the end.
///
/// If the depot is visited multiple times, its first occurrence is used.
/// The direction and relative order of visits are never changed:
/// rotating `[X, Y, D, Z, X]` to `D` yields `[D, Z, X, Y, D]`.
///
/// The returned route is always closed: it ends with the depot, never with the
/// last delivery. A single-node tour is the only exception and yields `[depot]`.
pub fn rotate(tour: &Tour, depot: i64) -> Result<Route, DepotNotInTourError> {
    let nodes = tour.nodes();

    // Drop the closing node, leaving every node of the cycle exactly once per visit
    let cycle = match nodes {
        [] => return Err(DepotNotInTourError(depot)),
        [only] => {
            return if *only == depot {
                Ok(Route(vec![depot]))
            } else {
                Err(DepotNotInTourError(depot))
            }
        }
        [cycle @ .., _] => cycle,
    };

    let idx = cycle
        .iter()
        .position(|&n| n == depot)
        .ok_or(DepotNotInTourError(depot))?;

    let mut rotated = Vec::with_capacity(nodes.len());
    rotated.extend_from_slice(&cycle[idx..]);
    rotated.extend_from_slice(&cycle[..idx]);
    rotated.push(depot);
    Ok(Route(rotated))
}
