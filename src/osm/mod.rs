// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

//! Loading of road networks from [OpenStreetMap](https://www.openstreetmap.org/) data.

mod profile;
mod reader;

pub use profile::{Profile, Speed, DRIVE_PROFILE};
pub use reader::{
    add_features_from_buffer, add_features_from_file, add_features_from_io, Error, FileFormat,
    Options,
};
