// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::HashSet;

use crate::{earth_distance, Edge, Graph, Node, StreetName};

use super::{model, Options};

/// Helper object used for storing state related to converting [OSM features](super::model::Feature)
/// into a road network [Graph].
pub(super) struct GraphBuilder<'a> {
    g: &'a mut Graph,
    options: &'a Options<'a>,
    unused_nodes: HashSet<i64>,
    ignore_bbox: bool,
    added_ways: usize,
    skipped_ways: usize,
}

/// Street attributes shared by all edges created from a single way.
struct WayAttributes {
    name: StreetName,
    reference: Option<String>,

    /// Speed in meters per second.
    speed: f32,
}

impl<'a> GraphBuilder<'a> {
    /// Create a new, empty graph builder.
    pub(super) fn new(g: &'a mut Graph, options: &'a Options<'a>) -> Self {
        let ignore_bbox =
            options.bbox.iter().all(|&x| x == 0.0) || options.bbox.iter().any(|x| !x.is_finite());

        Self {
            g,
            options,
            unused_nodes: HashSet::default(),
            ignore_bbox,
            added_ways: 0,
            skipped_ways: 0,
        }
    }

    /// Add all features from the provided iterator, then remove nodes
    /// not referenced by any routable way.
    pub(super) fn add_features<I, E>(&mut self, features: I) -> Result<(), E>
    where
        I: IntoIterator<Item = Result<model::Feature, E>>,
    {
        for f in features {
            self.add_feature(f?);
        }
        self.cleanup();
        Ok(())
    }

    fn cleanup(&mut self) {
        log::debug!(
            "Added {} ways, skipped {} ways, removing {} unused nodes",
            self.added_ways,
            self.skipped_ways,
            self.unused_nodes.len()
        );

        self.unused_nodes
            .iter()
            .for_each(|&id| self.g.delete_node(id));
    }

    fn add_feature(&mut self, f: model::Feature) {
        match f {
            model::Feature::Node(n) => self.add_node(n),
            model::Feature::Way(w) => self.add_way(w),
        }
    }

    fn add_node(&mut self, n: Node) {
        if self.is_in_bbox(n.lat, n.lon) {
            self.g.set_node(n);
            self.unused_nodes.insert(n.id);
        }
    }

    fn is_in_bbox(&self, lat: f32, lon: f32) -> bool {
        if self.ignore_bbox {
            return true;
        }
        let [min_lon, min_lat, max_lon, max_lat] = self.options.bbox;
        lat >= min_lat && lat <= max_lat && lon >= min_lon && lon <= max_lon
    }

    fn add_way(&mut self, w: model::Way) {
        let Some(kmh) = self.options.profile.way_speed(&w.tags) else {
            self.skipped_ways += 1;
            return;
        };

        let nodes = self.get_way_nodes(&w);
        if nodes.is_empty() {
            log::debug!("way {}: less than 2 known nodes, skipping", w.id);
            self.skipped_ways += 1;
            return;
        }

        let (forward, backward) = self.options.profile.way_direction(&w.tags);
        let attributes = WayAttributes {
            name: w.tag("name").map(StreetName::parse).unwrap_or_default(),
            reference: w
                .tag("ref")
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .map(str::to_string),
            speed: kmh / 3.6,
        };

        self.create_edges(&nodes, &attributes, forward, backward);
        nodes.iter().for_each(|node| {
            self.unused_nodes.remove(&node.id);
        });
        self.added_ways += 1;
    }

    fn get_way_nodes(&self, w: &model::Way) -> Vec<Node> {
        // Remove references to unknown nodes
        let nodes: Vec<Node> = w
            .nodes
            .iter()
            .filter_map(|&node_id| self.g.get_node(node_id))
            .collect();

        if nodes.len() < 2 {
            vec![]
        } else {
            nodes
        }
    }

    fn create_edges(
        &mut self,
        nodes: &[Node],
        attributes: &WayAttributes,
        forward: bool,
        backward: bool,
    ) {
        debug_assert!(nodes.len() >= 2);
        debug_assert!(attributes.speed.is_normal() && attributes.speed > 0.0);

        for pair in nodes.windows(2) {
            let (left, right) = (pair[0], pair[1]);
            let length = earth_distance(left.lat, left.lon, right.lat, right.lon);
            let travel_time = length / attributes.speed;

            let edge_to = |to: i64| Edge {
                to,
                length,
                travel_time,
                name: attributes.name.clone(),
                reference: attributes.reference.clone(),
            };

            if forward {
                self.g.add_edge(left.id, edge_to(right.id));
            }
            if backward {
                self.g.add_edge(right.id, edge_to(left.id));
            }
        }
    }
}
