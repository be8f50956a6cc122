// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::HashMap;

/// Describes how to convert OSM ways into [Edges](crate::Edge) of a road network.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Profile<'a> {
    /// Human readable name of the profile, customary the most specific
    /// [access tag](https://wiki.openstreetmap.org/wiki/Key:access).
    /// Not used for OSM data interpretation.
    pub name: &'a str,

    /// Ways which can be used for routing, with their default speeds.
    ///
    /// A way is matched against all [Speed] objects in order, and
    /// once an exact key and value match is found, the way is used for routing.
    /// The travel time of every edge is then its length divided by the way's
    /// `maxspeed` tag, falling back to [Speed::kmh] if the tag is missing
    /// or can't be understood.
    pub speeds: &'a [Speed<'a>],

    /// Array of OSM [access tags](https://wiki.openstreetmap.org/wiki/Key:access#Land-based_transportation)
    /// (in order from least to most specific) to consider when checking for road prohibitions
    /// and mode-specific one-way tags.
    pub access: &'a [&'a str],
}

/// Default speed of OSM ways with specific keys and values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Speed<'a> {
    /// Key of an OSM way for which this Speed applies, e.g. "highway".
    pub key: &'a str,

    /// Value under [Speed::key] of an OSM way for which this Speed applies,
    /// e.g. "primary" or "residential".
    pub value: &'a str,

    /// Assumed speed, in kilometers per hour. Must be finite and greater than zero.
    pub kmh: f32,
}

impl<'a> Profile<'a> {
    /// Returns the speed (in km/h) at which a way with given tags is traversed,
    /// or `None` if the way is not routable - because it doesn't match any [Speed],
    /// or because it is disallowed by the access tags (see [Profile::is_allowed]).
    pub fn way_speed(&self, tags: &HashMap<String, String>) -> Option<f32> {
        let default = self.default_speed(tags)?;
        if !self.is_allowed(tags) {
            return None;
        }

        let speed = tags
            .get("maxspeed")
            .and_then(|v| parse_maxspeed(v))
            .unwrap_or(default);

        if speed.is_normal() && speed > 0.0 {
            Some(speed)
        } else {
            None
        }
    }

    fn default_speed(&self, tags: &HashMap<String, String>) -> Option<f32> {
        self.speeds.iter().find_map(|s| {
            if tags.get(s.key).map(|v| v.as_str()) == Some(s.value) {
                Some(s.kmh)
            } else {
                None
            }
        })
    }

    /// Checks if the way is routable by considering the access tags ([Profile::access]).
    pub fn is_allowed(&self, tags: &HashMap<String, String>) -> bool {
        match self
            .access
            .iter()
            .rev()
            .find_map(|&mode| tags.get(mode).map(|v| v.as_str()))
        {
            Some("no") | Some("private") => false,
            _ => true,
        }
    }

    /// Checks if a way is traversable forward (first return value) and
    /// backwards (second return value) by investigating mode-specific and generic one-way tags.
    ///
    /// Some ways (highway=motorway, highway=motorway_link, junction=roundabout and
    /// junction=circular) default to being one-way, except if overridden by specific tags.
    pub fn way_direction(&self, tags: &HashMap<String, String>) -> (bool, bool) {
        let mut forward = true;
        let mut backward = true;

        if let Some("motorway" | "motorway_link") = tags.get("highway").map(|s| s.as_str()) {
            backward = false;
        }

        if let Some("roundabout" | "circular") = tags.get("junction").map(|s| s.as_str()) {
            backward = false;
        }

        match self.get_active_oneway_value(tags) {
            "yes" | "true" | "1" => {
                forward = true;
                backward = false;
            }

            "-1" | "reverse" => {
                forward = false;
                backward = true;
            }

            "no" => {
                forward = true;
                backward = true;
            }

            _ => {}
        }

        (forward, backward)
    }

    /// Returns the value of the most specific "oneway:MODE" tag (based on [Profile::access]),
    /// falling back to simply "oneway", and returning an empty string if no relevant tag was found.
    fn get_active_oneway_value<'t>(&self, tags: &'t HashMap<String, String>) -> &'t str {
        self.access
            .iter()
            .rev()
            .filter(|&&mode| mode != "access")
            .find_map(|&mode| tags.get(&format!("oneway:{}", mode)))
            .or_else(|| tags.get("oneway"))
            .map(|oneway_tag| oneway_tag.as_str())
            .unwrap_or("")
    }
}

/// Parses a [maxspeed](https://wiki.openstreetmap.org/wiki/Key:maxspeed) value into km/h.
/// Supports plain numbers (km/h) and numbers followed by "mph" or "knots".
/// Zone values (like "IT:urban") and other non-numeric values return `None`.
fn parse_maxspeed(value: &str) -> Option<f32> {
    // Multiple values, e.g. "50;30" - use the first one
    let value = value.split(';').next()?.trim();

    let (number, factor) = if let Some(n) = value.strip_suffix("mph") {
        (n, 1.609_344)
    } else if let Some(n) = value.strip_suffix("knots") {
        (n, 1.852)
    } else {
        (value, 1.0)
    };

    number
        .trim()
        .parse::<f32>()
        .ok()
        .map(|n| n * factor)
        .filter(|&kmh| kmh.is_normal() && kmh > 0.0)
}

/// Routing [Profile] for cars, with typical urban speeds for every road class and
/// appropriate [access tags](https://wiki.openstreetmap.org/wiki/Key:access).
pub const DRIVE_PROFILE: Profile = Profile {
    name: "motorcar",
    speeds: &[
        Speed {
            key: "highway",
            value: "motorway",
            kmh: 110.0,
        },
        Speed {
            key: "highway",
            value: "motorway_link",
            kmh: 60.0,
        },
        Speed {
            key: "highway",
            value: "trunk",
            kmh: 90.0,
        },
        Speed {
            key: "highway",
            value: "trunk_link",
            kmh: 50.0,
        },
        Speed {
            key: "highway",
            value: "primary",
            kmh: 60.0,
        },
        Speed {
            key: "highway",
            value: "primary_link",
            kmh: 40.0,
        },
        Speed {
            key: "highway",
            value: "secondary",
            kmh: 50.0,
        },
        Speed {
            key: "highway",
            value: "secondary_link",
            kmh: 40.0,
        },
        Speed {
            key: "highway",
            value: "tertiary",
            kmh: 40.0,
        },
        Speed {
            key: "highway",
            value: "tertiary_link",
            kmh: 30.0,
        },
        Speed {
            key: "highway",
            value: "unclassified",
            kmh: 30.0,
        },
        Speed {
            key: "highway",
            value: "residential",
            kmh: 30.0,
        },
        Speed {
            key: "highway",
            value: "living_street",
            kmh: 10.0,
        },
        Speed {
            key: "highway",
            value: "service",
            kmh: 15.0,
        },
    ],
    access: &["access", "vehicle", "motor_vehicle", "motorcar"],
};
