// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::fs::File;
use std::io::{self, BufRead};
use std::path::Path;

use graph_builder::GraphBuilder;

use crate::osm::{Profile, DRIVE_PROFILE};
use crate::Graph;

mod graph_builder;
mod model;
mod xml;

/// Format of the input OSM file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum FileFormat {
    /// Unknown format - guess the format based on the content
    #[default]
    Unknown,

    /// Force uncompressed [OSM XML](https://wiki.openstreetmap.org/wiki/OSM_XML)
    Xml,

    /// Force [OSM XML](https://wiki.openstreetmap.org/wiki/OSM_XML)
    /// with [gzip](https://en.wikipedia.org/wiki/Gzip) compression
    XmlGz,

    /// Force [OSM XML](https://wiki.openstreetmap.org/wiki/OSM_XML)
    /// with [bzip2](https://en.wikipedia.org/wiki/Bzip2) compression
    XmlBz2,
}

impl FileFormat {
    /// Guesses the format of a file by its leading bytes.
    /// Anything without a gzip or bzip2 signature is assumed to be plain XML.
    pub fn detect(head: &[u8]) -> Self {
        if head.starts_with(&[0x1F, 0x8B]) {
            Self::XmlGz
        } else if head.starts_with(b"BZh") {
            Self::XmlBz2
        } else {
            Self::Xml
        }
    }
}

/// Additional controls for interpreting OSM data as a road network [Graph].
#[derive(Debug, Clone, Copy)]
pub struct Options<'a> {
    /// How OSM features should be interpreted and converted into a [Graph].
    pub profile: &'a Profile<'a>,

    /// Format of the input data.
    pub file_format: FileFormat,

    /// Filter features by a specific bounding box. In order: left (min lon), bottom (min lat),
    /// right (max lon), top (max lat). Ignored if all values are set to zero, or at least one
    /// of them is not finite.
    pub bbox: [f32; 4],

    /// After loading, truncate the whole graph to its largest
    /// [strongly connected component](Graph::retain_largest_strongly_connected_component),
    /// guaranteeing a route between any pair of remaining nodes.
    pub strongly_connected: bool,
}

impl Default for Options<'static> {
    fn default() -> Self {
        Self {
            profile: &DRIVE_PROFILE,
            file_format: FileFormat::Unknown,
            bbox: [0.0; 4],
            strongly_connected: false,
        }
    }
}

/// Error which can occur when loading OSM data.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] io::Error),

    #[error("xml: {0}")]
    Xml(#[from] quick_xml::Error),
}

/// Parse OSM features from a reader into a [Graph] as per the provided [Options].
///
/// The provided stream will be automatically wrapped in a buffered reader.
pub fn add_features_from_io<'a, R: io::Read>(
    g: &'a mut Graph,
    options: &'a Options<'a>,
    reader: R,
) -> Result<(), Error> {
    let mut b = io::BufReader::new(reader);

    let format = match options.file_format {
        FileFormat::Unknown => FileFormat::detect(b.fill_buf()?),
        f => f,
    };
    log::debug!("Reading OSM data as {:?}", format);

    match format {
        FileFormat::Unknown | FileFormat::Xml => add_xml_features(g, options, b),

        FileFormat::XmlGz => {
            let d = flate2::read::MultiGzDecoder::new(b);
            add_xml_features(g, options, io::BufReader::new(d))
        }

        FileFormat::XmlBz2 => {
            let d = bzip2::read::MultiBzDecoder::new(b);
            add_xml_features(g, options, io::BufReader::new(d))
        }
    }
}

/// Parse OSM features from a file at the provided path into a [Graph] as per the provided [Options].
pub fn add_features_from_file<'a, P: AsRef<Path>>(
    g: &'a mut Graph,
    options: &'a Options<'a>,
    path: P,
) -> Result<(), Error> {
    let f = File::open(path)?;
    add_features_from_io(g, options, f)
}

/// Parse OSM features from a static buffer into a [Graph] as per the provided [Options].
pub fn add_features_from_buffer<'a>(
    g: &'a mut Graph,
    options: &'a Options<'a>,
    data: &[u8],
) -> Result<(), Error> {
    let format = match options.file_format {
        FileFormat::Unknown => FileFormat::detect(data),
        f => f,
    };

    if format == FileFormat::Xml {
        // Fast path is available for in-memory XML data
        GraphBuilder::new(g, options).add_features(xml::Reader::from_buffer(data))?;
        finish(g, options);
        Ok(())
    } else {
        // Wrap the buffer in a cursor and use the IO path
        add_features_from_io(g, options, io::Cursor::new(data))
    }
}

fn add_xml_features<'a, R: BufRead>(
    g: &'a mut Graph,
    options: &'a Options<'a>,
    reader: R,
) -> Result<(), Error> {
    GraphBuilder::new(g, options).add_features(xml::Reader::from_io(reader))?;
    finish(g, options);
    Ok(())
}

fn finish(g: &mut Graph, options: &Options) {
    if options.strongly_connected {
        let removed = g.retain_largest_strongly_connected_component();
        log::info!(
            "Kept {} nodes of the largest strongly connected component, removed {}",
            g.len(),
            removed
        );
    } else {
        log::info!("Loaded road network with {} nodes", g.len());
    }
}
