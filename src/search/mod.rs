// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

mod dijkstra;

pub use dijkstra::ShortestPathTree;

/// Recommended number of allowed node expansions when growing a
/// [ShortestPathTree] before [SearchError::StepLimitExceeded](crate::SearchError::StepLimitExceeded)
/// is returned.
pub const DEFAULT_STEP_LIMIT: usize = 1_000_000;
