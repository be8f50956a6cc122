// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::error::Error;

/// Error conditions which may occur when expanding a [ShortestPathTree](crate::ShortestPathTree).
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    /// The start node doesn't exist in a graph.
    #[error("invalid node: {0}")]
    InvalidReference(i64),

    /// Search has exceeded its limit of steps.
    ///
    /// Reaching every target may require traversing the whole graph,
    /// which can result in a denial-of-service. The step limit protects
    /// against resource exhaustion.
    #[error("step limit exceeded")]
    StepLimitExceeded,
}

/// An address could not be geocoded, or mapped onto a node of the road network.
#[derive(Debug, thiserror::Error)]
pub enum ResolutionError {
    #[error("no geocoding result for {0:?}")]
    NoMatch(String),

    #[error("no node in the road network to attach {0:?} to")]
    EmptyNetwork(String),

    /// A batch [Geocoder](crate::Geocoder) returned a different number of results than requested.
    #[error("geocoder returned {got} results for {expected} addresses")]
    IncompleteBatch { expected: usize, got: usize },

    #[error("geocoding {address:?} failed: {source}")]
    Geocoder {
        address: String,
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
}

/// Error conditions which may occur during [optimize](crate::optimize).
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum OptimizeError {
    #[error("no target nodes to visit")]
    NoTargets,

    #[error("invalid node: {0}")]
    InvalidReference(i64),

    /// The road network is not strongly connected with respect to the targets.
    #[error("target {to} is unreachable from {from}")]
    UnreachableTarget { from: i64, to: i64 },

    #[error("step limit exceeded while searching from {0}")]
    StepLimitExceeded(i64),
}

/// The depot passed to [rotate](crate::rotate) is not a part of the tour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("depot {0} does not appear in the tour")]
pub struct DepotNotInTourError(pub i64);

/// Error returned by a [Navigator](crate::Navigator) walking over a malformed path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum NavigationError {
    #[error("no edge from {from} to {to}")]
    MissingEdge { from: i64, to: i64 },
}

/// Any error which aborts [RoutePlanner::plan](crate::RoutePlanner::plan).
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    #[error("no delivery addresses provided")]
    NoAddresses,

    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error(transparent)]
    Optimize(#[from] OptimizeError),

    #[error(transparent)]
    DepotNotInTour(#[from] DepotNotInTourError),
}

/// Error conditions which may occur when loading a [Gazetteer](crate::Gazetteer).
#[derive(Debug, thiserror::Error)]
pub enum GazetteerError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}
