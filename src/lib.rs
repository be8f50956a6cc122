// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

//! Delivery route planning over [OpenStreetMap](https://www.openstreetmap.org/) road networks.
//!
//! Given a road network and a list of delivery addresses, citymail resolves every address
//! to its nearest [Node], approximates the cheapest closed tour visiting all of them,
//! rotates that tour so it starts and ends at the depot (the first address),
//! and converts the resulting node path into street-level navigation [segments](Segment).
//!
//! # Example
//!
//! ```no_run
//! let mut g = citymail::Graph::default();
//! let osm_options = citymail::osm::Options {
//!     profile: &citymail::osm::DRIVE_PROFILE,
//!     file_format: citymail::osm::FileFormat::Xml,
//!     bbox: [0.0; 4],
//!     strongly_connected: true,
//! };
//! citymail::osm::add_features_from_file(&mut g, &osm_options, "path/to/pavia.osm")
//!     .expect("failed to load pavia.osm");
//!
//! let gazetteer = citymail::Gazetteer::from_path("path/to/addresses.csv")
//!     .expect("failed to load the gazetteer");
//! let planner = citymail::RoutePlanner::new(&g, &gazetteer, &g, citymail::PlannerOptions::default());
//!
//! let plan = planner
//!     .plan(&["Piazza della Vittoria 1", "Corso Strada Nuova 65"])
//!     .expect("failed to plan the route");
//!
//! for segment in plan.navigate(&g, citymail::NamePolicy::Last) {
//!     let segment = segment.expect("route must only contain existing edges");
//!     println!("Follow {} for {:.0} meters", segment.name, segment.length);
//! }
//! ```

mod distance;
mod error;
pub mod export;
mod gazetteer;
mod graph;
mod kd;
mod navigate;
mod optimize;
pub mod osm;
mod planner;
mod resolve;
mod rotate;
mod search;

#[cfg(test)]
mod fixtures;

pub use distance::earth_distance;
pub use error::{
    DepotNotInTourError, GazetteerError, NavigationError, OptimizeError, PlanError,
    ResolutionError, SearchError,
};
pub use gazetteer::Gazetteer;
pub use graph::Graph;
pub use kd::KDTree;
pub use navigate::{navigate, NamePolicy, Navigator, Segment, UNKNOWN_STREET};
pub use optimize::{optimize, AnnealingOptions, OptimizeOptions, Tour};
pub use planner::{Deliveries, Plan, PlannerOptions, RoutePlanner};
pub use resolve::{AddressData, AddressResolver, DeliveryTarget, Geocoder, NodeLocator};
pub use rotate::{rotate, Route};
pub use search::{ShortestPathTree, DEFAULT_STEP_LIMIT};

/// Represents an intersection or an address-proximate point of the [Graph].
///
/// Nodes with `id == 0` are disallowed, as zero is used to signify absence of nodes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Node {
    pub id: i64,
    pub lat: f32,
    pub lon: f32,
}

/// Street name attribute of an [Edge].
///
/// OpenStreetMap ways may carry several names separated by a semicolon
/// (e.g. where two named streets overlap); these are kept as [StreetName::Multiple].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum StreetName {
    #[default]
    Absent,
    Single(String),
    Multiple(Vec<String>),
}

impl StreetName {
    /// Parses a raw `name` tag value. Empty values result in [StreetName::Absent].
    pub fn parse(raw: &str) -> Self {
        let mut names: Vec<String> = raw
            .split(';')
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .collect();

        match names.len() {
            0 => Self::Absent,
            1 => Self::Single(names.pop().unwrap_or_default()),
            _ => Self::Multiple(names),
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }
}

/// Numeric edge weight minimized by the route optimizer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum CostAttribute {
    /// Expected travel time, in seconds.
    #[default]
    TravelTime,

    /// Physical length, in meters.
    Length,
}

/// Represents an outgoing (one-way) connection from a specific [Node].
///
/// `length` and `travel_time` must be finite and not negative.
///
/// Due to implementation details, `to` might not exist in the [Graph].
/// Users must silently ignore such edges.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub to: i64,

    /// Length of the connection, in meters.
    pub length: f32,

    /// Expected time to traverse the connection, in seconds.
    pub travel_time: f32,

    pub name: StreetName,

    /// Route reference code (the OSM `ref` tag), used when the street has no name.
    pub reference: Option<String>,
}

impl Edge {
    /// Returns the weight of this edge under the provided [CostAttribute].
    #[inline]
    pub fn cost(&self, attribute: CostAttribute) -> f32 {
        match attribute {
            CostAttribute::TravelTime => self.travel_time,
            CostAttribute::Length => self.length,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn street_name_parse() {
        assert_eq!(StreetName::parse(""), StreetName::Absent);
        assert_eq!(StreetName::parse(" ; "), StreetName::Absent);
        assert_eq!(
            StreetName::parse("Via Roma"),
            StreetName::Single("Via Roma".to_string())
        );
        assert_eq!(
            StreetName::parse("Via Roma;Corso Cavour"),
            StreetName::Multiple(vec!["Via Roma".to_string(), "Corso Cavour".to_string()]),
        );
    }

    #[test]
    fn edge_cost() {
        let e = Edge {
            to: 2,
            length: 120.0,
            travel_time: 9.5,
            name: StreetName::Absent,
            reference: None,
        };
        assert_eq!(e.cost(CostAttribute::Length), 120.0);
        assert_eq!(e.cost(CostAttribute::TravelTime), 9.5);
        assert_eq!(e.cost(CostAttribute::default()), 9.5);
    }
}
