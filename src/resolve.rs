// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use crate::{Node, ResolutionError};

/// Geographic position of an address, as returned by a [Geocoder].
#[derive(Debug, Clone, PartialEq)]
pub struct AddressData {
    /// Canonical name of the place, as known by the geocoder.
    pub name: String,
    pub lat: f32,
    pub lon: f32,
}

/// Capability of converting free-form address strings into coordinates.
pub trait Geocoder {
    /// Geocodes a single address. Returns [ResolutionError::NoMatch] if the address is unknown;
    /// failures of the underlying service are reported as [ResolutionError::Geocoder].
    fn geocode(&self, address: &str) -> Result<AddressData, ResolutionError>;

    /// Geocodes multiple addresses, preserving their order. Stops at the first failure.
    fn geocode_all<S: AsRef<str>>(&self, addresses: &[S]) -> Result<Vec<AddressData>, ResolutionError> {
        addresses.iter().map(|a| self.geocode(a.as_ref())).collect()
    }
}

impl<G: Geocoder + ?Sized> Geocoder for &G {
    fn geocode(&self, address: &str) -> Result<AddressData, ResolutionError> {
        (**self).geocode(address)
    }
}

/// Capability of finding the node of a road network closest to a given position.
///
/// Implemented by [Graph](crate::Graph) (linear scan) and [KDTree](crate::KDTree).
pub trait NodeLocator {
    /// Returns `None` only if there are no nodes at all.
    fn nearest_node(&self, lat: f32, lon: f32) -> Option<Node>;
}

impl<L: NodeLocator + ?Sized> NodeLocator for &L {
    fn nearest_node(&self, lat: f32, lon: f32) -> Option<Node> {
        (**self).nearest_node(lat, lon)
    }
}

/// An address paired with the road network node it was resolved to.
#[derive(Debug, Clone, PartialEq)]
pub struct DeliveryTarget {
    pub address: String,
    pub node: Node,
}

/// Maps address strings onto road network nodes by geocoding them
/// and then looking up the nearest node.
#[derive(Debug, Clone)]
pub struct AddressResolver<G: Geocoder, L: NodeLocator> {
    geocoder: G,
    locator: L,
}

impl<G: Geocoder, L: NodeLocator> AddressResolver<G, L> {
    pub fn new(geocoder: G, locator: L) -> Self {
        Self { geocoder, locator }
    }

    /// Resolves a single address into a [DeliveryTarget].
    pub fn resolve(&self, address: &str) -> Result<DeliveryTarget, ResolutionError> {
        let data = self.geocoder.geocode(address)?;
        self.attach(address, &data)
    }

    /// Resolves every address in order, using the batch [Geocoder::geocode_all].
    /// Fails with [ResolutionError::IncompleteBatch] unless the geocoder
    /// returns exactly one result per address.
    pub fn resolve_all<S: AsRef<str>>(
        &self,
        addresses: &[S],
    ) -> Result<Vec<DeliveryTarget>, ResolutionError> {
        let data = self.geocoder.geocode_all(addresses)?;
        if data.len() != addresses.len() {
            return Err(ResolutionError::IncompleteBatch {
                expected: addresses.len(),
                got: data.len(),
            });
        }

        addresses
            .iter()
            .zip(data.iter())
            .map(|(address, data)| self.attach(address.as_ref(), data))
            .collect()
    }

    fn attach(&self, address: &str, data: &AddressData) -> Result<DeliveryTarget, ResolutionError> {
        let node = self
            .locator
            .nearest_node(data.lat, data.lon)
            .ok_or_else(|| ResolutionError::EmptyNetwork(address.to_string()))?;

        log::debug!(
            "Resolved {:?} ({}, {}) to node {}",
            address,
            data.lat,
            data.lon,
            node.id
        );

        Ok(DeliveryTarget {
            address: address.to_string(),
            node,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::grid;
    use crate::{Gazetteer, Graph};

    fn gazetteer() -> Gazetteer {
        Gazetteer::from_entries([
            ("Via Roma 1", 0.0001, 0.0),
            ("Via Dante 3", 0.002, 0.0021),
            ("Corso Garibaldi 12", 0.0011, 0.0009),
        ])
    }

    #[test]
    fn resolve() {
        let g = grid();
        let resolver = AddressResolver::new(gazetteer(), &g);

        let target = resolver.resolve("Via Dante 3").unwrap();
        assert_eq!(target.address, "Via Dante 3");
        assert_eq!(target.node.id, 9);
    }

    #[test]
    fn resolve_all_preserves_order() {
        let g = grid();
        let resolver = AddressResolver::new(gazetteer(), &g);

        let targets = resolver
            .resolve_all(&["Corso Garibaldi 12", "Via Roma 1", "Via Dante 3"])
            .unwrap();
        let nodes: Vec<i64> = targets.iter().map(|t| t.node.id).collect();
        assert_eq!(nodes, vec![5, 1, 9]);
    }

    #[test]
    fn unknown_address() {
        let g = grid();
        let resolver = AddressResolver::new(gazetteer(), &g);

        assert!(matches!(
            resolver.resolve("Piazza Grande 1"),
            Err(ResolutionError::NoMatch(a)) if a == "Piazza Grande 1",
        ));
    }

    /// Batch geocoder which only ever answers the first `limit` addresses.
    struct Truncating {
        inner: Gazetteer,
        limit: usize,
    }

    impl Geocoder for Truncating {
        fn geocode(&self, address: &str) -> Result<AddressData, ResolutionError> {
            self.inner.geocode(address)
        }

        fn geocode_all<S: AsRef<str>>(
            &self,
            addresses: &[S],
        ) -> Result<Vec<AddressData>, ResolutionError> {
            addresses
                .iter()
                .take(self.limit)
                .map(|a| self.inner.geocode(a.as_ref()))
                .collect()
        }
    }

    #[test]
    fn incomplete_batch() {
        let g = grid();
        for limit in [0, 1] {
            let geocoder = Truncating {
                inner: gazetteer(),
                limit,
            };
            let resolver = AddressResolver::new(geocoder, &g);

            assert!(matches!(
                resolver.resolve_all(&["Via Roma 1", "Via Dante 3"]),
                Err(ResolutionError::IncompleteBatch { expected: 2, got }) if got == limit,
            ));
        }
    }

    #[test]
    fn empty_network() {
        let g = Graph::default();
        let resolver = AddressResolver::new(gazetteer(), &g);

        assert!(matches!(
            resolver.resolve("Via Roma 1"),
            Err(ResolutionError::EmptyNetwork(_)),
        ));
    }
}
