// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

//! Small synthetic road networks shared by unit tests.

use crate::{earth_distance, Edge, Graph, Node, StreetName};

pub fn node(id: i64, lat: f32, lon: f32) -> Node {
    Node { id, lat, lon }
}

pub fn edge(to: i64, name: &str, length: f32, travel_time: f32) -> Edge {
    Edge {
        to,
        length,
        travel_time,
        name: StreetName::parse(name),
        reference: None,
    }
}

const ROWS: [&str; 3] = ["Via Roma", "Via Verdi", "Via Dante"];
const COLUMNS: [&str; 3] = ["Corso Cavour", "Corso Garibaldi", "Corso Mazzini"];

/// Returns the id of the node at the given row and column of [grid].
pub fn grid_id(row: usize, col: usize) -> i64 {
    (row * 3 + col + 1) as i64
}

/// Builds a two-way 3×3 street grid with ~111 m long blocks:
///
/// ```text
///   7──8──9   Via Dante
///   │  │  │
///   4──5──6   Via Verdi
///   │  │  │
///   1──2──3   Via Roma
/// ```
///
/// Columns are named Corso Cavour, Corso Garibaldi and Corso Mazzini (left to right).
/// Every edge is driven at 10 m/s.
pub fn grid() -> Graph {
    let mut g = Graph::default();
    for row in 0..3 {
        for col in 0..3 {
            g.set_node(node(grid_id(row, col), row as f32 * 0.001, col as f32 * 0.001));
        }
    }

    for row in 0..3 {
        for col in 0..3 {
            if col + 1 < 3 {
                connect(&mut g, grid_id(row, col), grid_id(row, col + 1), ROWS[row]);
            }
            if row + 1 < 3 {
                connect(&mut g, grid_id(row, col), grid_id(row + 1, col), COLUMNS[col]);
            }
        }
    }
    g
}

/// Adds edges in both directions between two existing nodes.
pub fn connect(g: &mut Graph, a: i64, b: i64, name: &str) {
    let na = g.get_node(a).unwrap();
    let nb = g.get_node(b).unwrap();
    let length = earth_distance(na.lat, na.lon, nb.lat, nb.lon);
    g.add_edge(a, edge(b, name, length, length / 10.0));
    g.add_edge(b, edge(a, name, length, length / 10.0));
}
