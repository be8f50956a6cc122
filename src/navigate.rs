// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::iter::FusedIterator;

use crate::{Edge, Graph, NavigationError, StreetName};

/// Display name of edges with neither a name nor a reference code.
pub const UNKNOWN_STREET: &str = "Unknown";

/// Selects the display name of edges carrying multiple street names.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum NamePolicy {
    First,
    #[default]
    Last,
}

/// A maximal run of consecutive path edges sharing a street name.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub name: String,

    /// Sum of lengths of all merged edges, in meters.
    pub length: f32,

    /// Nodes spanned by this segment, in order. Consecutive segments share their
    /// boundary node: the last node of one segment is the first node of the next one.
    pub node_ids: Vec<i64>,
}

impl Segment {
    pub fn start(&self) -> i64 {
        self.node_ids.first().copied().unwrap_or(0)
    }

    pub fn end(&self) -> i64 {
        self.node_ids.last().copied().unwrap_or(0)
    }
}

/// Navigator converts a node path into street [Segments](Segment) in a single forward pass.
///
/// A path with a single node produces one zero-length [UNKNOWN_STREET] segment
/// starting and ending at that node; an empty path produces nothing.
///
/// If two consecutive nodes aren't connected by an edge, a
/// [NavigationError::MissingEdge] is returned and the iteration stops.
#[derive(Debug)]
pub struct Navigator<'a> {
    g: &'a Graph,
    path: &'a [i64],
    policy: NamePolicy,
    next_edge: usize,
    current: Option<Segment>,
    done: bool,
}

impl<'a> Navigator<'a> {
    pub fn new(g: &'a Graph, path: &'a [i64], policy: NamePolicy) -> Self {
        Self {
            g,
            path,
            policy,
            next_edge: 0,
            current: None,
            done: path.is_empty(),
        }
    }

    /// Derives the display name of an edge: its name, the reference code, or [UNKNOWN_STREET].
    fn street_name(&self, from: i64, edge: &Edge) -> String {
        match &edge.name {
            StreetName::Single(name) => name.clone(),

            StreetName::Multiple(names) => {
                let selected = match self.policy {
                    NamePolicy::First => names.first(),
                    NamePolicy::Last => names.last(),
                }
                .cloned()
                .unwrap_or_else(|| UNKNOWN_STREET.to_string());

                log::warn!(
                    "Edge {} -> {} has multiple names {:?}, using {:?}",
                    from,
                    edge.to,
                    names,
                    selected
                );
                selected
            }

            StreetName::Absent => edge
                .reference
                .clone()
                .unwrap_or_else(|| UNKNOWN_STREET.to_string()),
        }
    }
}

impl<'a> Iterator for Navigator<'a> {
    type Item = Result<Segment, NavigationError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        if let &[only] = self.path {
            self.done = true;
            return Some(Ok(Segment {
                name: UNKNOWN_STREET.to_string(),
                length: 0.0,
                node_ids: vec![only],
            }));
        }

        while self.next_edge + 1 < self.path.len() {
            let from = self.path[self.next_edge];
            let to = self.path[self.next_edge + 1];
            self.next_edge += 1;

            let edge = match self.g.get_edge(from, to) {
                Some(edge) => edge,
                None => {
                    self.done = true;
                    self.current = None;
                    return Some(Err(NavigationError::MissingEdge { from, to }));
                }
            };
            let name = self.street_name(from, edge);

            match self.current {
                // Still on the same street
                Some(ref mut segment) if segment.name == name => {
                    segment.length += edge.length;
                    segment.node_ids.push(to);
                }

                // Turning into a new street
                _ => {
                    let finished = self.current.replace(Segment {
                        name,
                        length: edge.length,
                        node_ids: vec![from, to],
                    });
                    if let Some(finished) = finished {
                        return Some(Ok(finished));
                    }
                }
            }
        }

        self.done = true;
        self.current.take().map(Ok)
    }
}

impl<'a> FusedIterator for Navigator<'a> {}

/// Shorthand for [Navigator::new].
pub fn navigate<'a>(g: &'a Graph, path: &'a [i64], policy: NamePolicy) -> Navigator<'a> {
    Navigator::new(g, path, policy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{edge, grid, node};
    use crate::{Edge, Graph};

    macro_rules! assert_almost_eq {
        ($a:expr, $b:expr) => {
            assert!(
                (($a - $b).abs() < 1e-3),
                "assertion failed: {} ≈ {}",
                $a,
                $b
            )
        };
    }

    fn collect(g: &Graph, path: &[i64], policy: NamePolicy) -> Vec<Segment> {
        navigate(g, path, policy)
            .collect::<Result<Vec<_>, _>>()
            .expect("path must be walkable")
    }

    /// A, B, C with "Main St" on A-B-C and "Oak St" on C-A
    fn triangle() -> Graph {
        let mut g = Graph::default();
        g.set_node(node(1, 0.0, 0.0));
        g.set_node(node(2, 0.0, 0.001));
        g.set_node(node(3, 0.001, 0.001));
        g.add_edge(1, edge(2, "Main St", 110.0, 11.0));
        g.add_edge(2, edge(3, "Main St", 112.5, 11.0));
        g.add_edge(3, edge(1, "Oak St", 157.0, 15.0));
        g
    }

    #[test]
    fn merges_same_street() {
        let g = triangle();
        let segments = collect(&g, &[1, 2, 3, 1], NamePolicy::default());

        assert_eq!(
            segments,
            vec![
                Segment {
                    name: "Main St".to_string(),
                    length: 222.5,
                    node_ids: vec![1, 2, 3],
                },
                Segment {
                    name: "Oak St".to_string(),
                    length: 157.0,
                    node_ids: vec![3, 1],
                },
            ]
        );
        assert_eq!(segments[0].start(), 1);
        assert_eq!(segments[0].end(), 3);
        assert_eq!(segments[1].start(), 3);
        assert_eq!(segments[1].end(), 1);
    }

    #[test]
    fn grid_route() {
        let g = grid();
        // Via Roma 1-2-3, Corso Mazzini 3-6-9, Via Dante 9-8, Corso Garibaldi 8-5
        let path = [1, 2, 3, 6, 9, 8, 5];
        let segments = collect(&g, &path, NamePolicy::default());

        let names: Vec<&str> = segments.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["Via Roma", "Corso Mazzini", "Via Dante", "Corso Garibaldi"]
        );

        // Spans cover the path, sharing boundary nodes
        let mut covered = vec![segments[0].start()];
        for s in &segments {
            assert_eq!(s.start(), *covered.last().unwrap());
            covered.extend_from_slice(&s.node_ids[1..]);
        }
        assert_eq!(covered, path);

        // Segment lengths add up to edge lengths
        let total: f32 = segments.iter().map(|s| s.length).sum();
        let expected: f32 = path
            .windows(2)
            .map(|p| g.get_edge(p[0], p[1]).unwrap().length)
            .sum();
        assert_almost_eq!(total, expected);
    }

    #[test]
    fn terminal_edge_is_emitted() {
        let g = grid();
        let segments = collect(&g, &[1, 2, 3, 6], NamePolicy::default());
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[1].name, "Corso Mazzini");
        assert_eq!(segments[1].node_ids, vec![3, 6]);
    }

    #[test]
    fn idempotent() {
        let g = grid();
        let path = [5, 6, 9, 8, 7, 4, 5];
        assert_eq!(
            collect(&g, &path, NamePolicy::default()),
            collect(&g, &path, NamePolicy::default())
        );
    }

    #[test]
    fn single_node() {
        let g = grid();
        let segments = collect(&g, &[5], NamePolicy::default());
        assert_eq!(
            segments,
            vec![Segment {
                name: UNKNOWN_STREET.to_string(),
                length: 0.0,
                node_ids: vec![5],
            }]
        );
        assert_eq!(segments[0].start(), 5);
        assert_eq!(segments[0].end(), 5);
    }

    #[test]
    fn empty_path() {
        let g = grid();
        assert_eq!(navigate(&g, &[], NamePolicy::default()).count(), 0);
    }

    #[test]
    fn missing_edge() {
        let g = grid();
        let mut nav = navigate(&g, &[1, 2, 9, 8], NamePolicy::default());
        assert_eq!(
            nav.next(),
            Some(Err(NavigationError::MissingEdge { from: 2, to: 9 }))
        );
        assert_eq!(nav.next(), None);
        assert_eq!(nav.next(), None);
    }

    #[test]
    fn name_fallbacks() {
        let mut g = Graph::default();
        for id in 1..=5 {
            g.set_node(node(id, 0.0, id as f32 * 0.001));
        }
        let mut with_ref = edge(3, "", 10.0, 1.0);
        with_ref.reference = Some("SS35".to_string());
        g.add_edge(1, edge(2, "", 10.0, 1.0));
        g.add_edge(2, with_ref);
        g.add_edge(3, Edge {
            to: 4,
            reference: Some("SS35".to_string()),
            ..edge(4, "", 20.0, 2.0)
        });
        g.add_edge(4, edge(5, "Via Roma;Corso Cavour", 30.0, 3.0));

        let last = collect(&g, &[1, 2, 3, 4, 5], NamePolicy::Last);
        let names: Vec<&str> = last.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec![UNKNOWN_STREET, "SS35", "Corso Cavour"]);
        assert_eq!(last[1].length, 30.0);
        assert_eq!(last[1].node_ids, vec![2, 3, 4]);

        let first = collect(&g, &[4, 5], NamePolicy::First);
        assert_eq!(first[0].name, "Via Roma");
    }

    #[test]
    fn first_parallel_edge_is_used() {
        let mut g = Graph::default();
        g.set_node(node(1, 0.0, 0.0));
        g.set_node(node(2, 0.0, 0.001));
        g.add_edge(1, edge(2, "Via Roma", 100.0, 50.0));
        g.add_edge(1, edge(2, "Tangenziale", 120.0, 5.0));

        let segments = collect(&g, &[1, 2], NamePolicy::default());
        assert_eq!(segments[0].name, "Via Roma");
        assert_eq!(segments[0].length, 100.0);
    }
}
