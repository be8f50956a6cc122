// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::io;
use std::path::Path;

use crate::{AddressData, Geocoder, GazetteerError, ResolutionError};

#[derive(Debug, serde::Deserialize)]
struct Record {
    address: String,
    lat: f32,
    lon: f32,
}

/// Offline [Geocoder] backed by a table of known addresses.
///
/// Lookups ignore letter case and differences in whitespace,
/// so "via  Roma 1 " matches "Via Roma 1".
#[derive(Debug, Default, Clone)]
pub struct Gazetteer(HashMap<String, AddressData>);

impl Gazetteer {
    /// Reads a gazetteer from a CSV file with an `address,lat,lon` header.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, GazetteerError> {
        let f = std::fs::File::open(path)?;
        Self::from_reader(f)
    }

    /// Reads a gazetteer from CSV data with an `address,lat,lon` header.
    /// Later rows override earlier rows with the same (normalized) address.
    pub fn from_reader<R: io::Read>(reader: R) -> Result<Self, GazetteerError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut entries = HashMap::default();
        for record in csv_reader.deserialize() {
            let record: Record = record?;
            entries.insert(
                normalize(&record.address),
                AddressData {
                    name: record.address,
                    lat: record.lat,
                    lon: record.lon,
                },
            );
        }

        log::debug!("Loaded {} gazetteer entries", entries.len());
        Ok(Self(entries))
    }

    /// Builds a gazetteer from in-memory `(address, lat, lon)` entries.
    pub fn from_entries<'a, I: IntoIterator<Item = (&'a str, f32, f32)>>(entries: I) -> Self {
        Self(
            entries
                .into_iter()
                .map(|(address, lat, lon)| {
                    let data = AddressData {
                        name: address.to_string(),
                        lat,
                        lon,
                    };
                    (normalize(address), data)
                })
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Geocoder for Gazetteer {
    fn geocode(&self, address: &str) -> Result<AddressData, ResolutionError> {
        self.0
            .get(&normalize(address))
            .cloned()
            .ok_or_else(|| ResolutionError::NoMatch(address.to_string()))
    }
}

fn normalize(address: &str) -> String {
    address
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}
