// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

//! Rendering of planned routes as [GeoJSON](https://geojson.org/).

use std::io;

use serde_json::{json, Value};

use crate::{Graph, Plan};

/// Converts a [Plan] into a GeoJSON FeatureCollection.
///
/// The collection contains a LineString following the route (omitted for routes
/// without movement), and one Point for every delivery node with its addresses.
/// The depot Point has `"depot": true`. Nodes missing from the graph are skipped.
pub fn to_geojson(g: &Graph, plan: &Plan) -> Value {
    let mut features: Vec<Value> = Vec::with_capacity(plan.deliveries.len() + 1);

    let coordinates: Vec<[f32; 2]> = plan
        .route
        .nodes()
        .iter()
        .filter_map(|&id| g.get_node(id))
        .map(|n| [n.lon, n.lat])
        .collect();

    if coordinates.len() >= 2 {
        features.push(json!({
            "type": "Feature",
            "properties": {
                "kind": "route",
                "depot": plan.depot,
            },
            "geometry": {
                "type": "LineString",
                "coordinates": coordinates,
            },
        }));
    }

    for (node_id, addresses) in plan.deliveries.iter() {
        if let Some(n) = g.get_node(node_id) {
            features.push(json!({
                "type": "Feature",
                "properties": {
                    "kind": "delivery",
                    "node_id": node_id,
                    "addresses": addresses,
                    "depot": node_id == plan.depot,
                },
                "geometry": {
                    "type": "Point",
                    "coordinates": [n.lon, n.lat],
                },
            }));
        }
    }

    json!({
        "type": "FeatureCollection",
        "features": features,
    })
}

/// Writes [to_geojson] of a [Plan] into the provided writer.
pub fn write_geojson<W: io::Write>(writer: W, g: &Graph, plan: &Plan) -> serde_json::Result<()> {
    serde_json::to_writer_pretty(writer, &to_geojson(g, plan))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::grid;
    use crate::{Deliveries, Tour};

    fn plan(nodes: &[i64], deliveries: &[(i64, &str)]) -> Plan {
        let route = crate::rotate(&Tour::from_nodes(nodes.to_vec()), nodes[0]).unwrap();
        let mut d = Deliveries::default();
        for &(id, address) in deliveries {
            d.insert(id, address.to_string());
        }
        Plan {
            depot: route.depot(),
            route,
            deliveries: d,
        }
    }

    #[test]
    fn feature_collection() {
        let g = grid();
        let p = plan(
            &[1, 2, 3, 2, 1],
            &[(1, "Via Roma 1"), (3, "Via Roma 30"), (3, "Via Roma 31")],
        );

        let v = to_geojson(&g, &p);
        assert_eq!(v["type"], "FeatureCollection");

        let features = v["features"].as_array().unwrap();
        assert_eq!(features.len(), 3);

        assert_eq!(features[0]["geometry"]["type"], "LineString");
        assert_eq!(features[0]["geometry"]["coordinates"].as_array().unwrap().len(), 5);

        assert_eq!(features[1]["properties"]["node_id"], 1);
        assert_eq!(features[1]["properties"]["depot"], true);
        assert_eq!(features[2]["properties"]["depot"], false);
        assert_eq!(
            features[2]["properties"]["addresses"],
            json!(["Via Roma 30", "Via Roma 31"])
        );
    }

    #[test]
    fn no_movement() {
        let g = grid();
        let p = plan(&[5], &[(5, "Via Verdi 10")]);

        let v = to_geojson(&g, &p);
        let features = v["features"].as_array().unwrap();
        assert_eq!(features.len(), 1);
        assert_eq!(features[0]["geometry"]["type"], "Point");
    }

    #[test]
    fn write() {
        let g = grid();
        let p = plan(&[1, 2, 1], &[(1, "Via Roma 1"), (2, "Via Roma 20")]);

        let mut buf: Vec<u8> = Vec::default();
        write_geojson(&mut buf, &g, &p).unwrap();
        let parsed: Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(parsed["type"], "FeatureCollection");
        assert_eq!(parsed["features"].as_array().unwrap().len(), 3);
        assert_eq!(parsed["features"][2]["properties"]["addresses"], json!(["Via Roma 20"]));
    }
}
