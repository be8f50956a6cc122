// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::HashSet;
use std::error::Error;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use clap::Parser;
use citymail::{
    osm, AnnealingOptions, CostAttribute, Gazetteer, Graph, KDTree, NamePolicy, OptimizeOptions,
    Plan, PlannerOptions, RoutePlanner, DEFAULT_STEP_LIMIT,
};

#[derive(Debug, thiserror::Error)]
#[error("{0}: {1}")]
struct GraphLoadError(PathBuf, #[source] osm::Error);

#[derive(Debug, thiserror::Error)]
#[error("{0}: {1}")]
struct InputError(PathBuf, #[source] Box<dyn Error>);

#[derive(Parser)]
#[command(about = "Plans a closed delivery route over a list of addresses")]
struct Cli {
    /// The path to the OSM file with the road network
    osm_file: PathBuf,

    /// The path to the CSV gazetteer with "address,lat,lon" records
    gazetteer: PathBuf,

    /// The path to a text file with one delivery address per line;
    /// the first address is the depot
    addresses: PathBuf,

    /// Format of the OSM file
    #[arg(long, value_enum, default_value_t = osm::FileFormat::Unknown)]
    format: osm::FileFormat,

    /// Edge attribute to minimize
    #[arg(long, value_enum, default_value_t = CostAttribute::TravelTime)]
    cost: CostAttribute,

    /// Which name to announce for streets with multiple names
    #[arg(long, value_enum, default_value_t = NamePolicy::Last)]
    name_policy: NamePolicy,

    /// Seed of the tour optimizer
    #[arg(long, default_value_t = 1)]
    seed: u64,

    /// Write the planned route as GeoJSON to this path
    #[arg(long)]
    geojson: Option<PathBuf>,
}

pub fn main() -> Result<(), Box<dyn Error>> {
    colog::init();
    let cli = Cli::parse();

    let g = load_graph(&cli.osm_file, cli.format)?;
    let gazetteer = Gazetteer::from_path(&cli.gazetteer)
        .map_err(|e| InputError(cli.gazetteer.clone(), e.into()))?;
    let addresses =
        read_addresses(&cli.addresses).map_err(|e| InputError(cli.addresses.clone(), e.into()))?;

    let options = PlannerOptions {
        optimize: OptimizeOptions {
            cost: cli.cost,
            step_limit: DEFAULT_STEP_LIMIT,
            annealing: AnnealingOptions {
                seed: cli.seed,
                ..AnnealingOptions::default()
            },
        },
        name_policy: cli.name_policy,
    };
    let locator = KDTree::from_graph(&g).ok_or("the road network is empty")?;
    let planner = RoutePlanner::new(&g, gazetteer, locator, options);

    log::info!("Planning a route over {} addresses", addresses.len());
    let plan = planner.plan(&addresses)?;

    let stdout = io::stdout();
    print_navigation(&mut stdout.lock(), &g, &plan, cli.name_policy)?;

    if let Some(path) = cli.geojson {
        let f = BufWriter::new(File::create(&path)?);
        citymail::export::write_geojson(f, &g, &plan)?;
        log::info!("Route written to {}", path.display());
    }

    Ok(())
}

fn load_graph<P: AsRef<Path>>(
    path: P,
    file_format: osm::FileFormat,
) -> Result<Graph, GraphLoadError> {
    let mut g = Graph::default();
    let options = osm::Options {
        profile: &osm::DRIVE_PROFILE,
        file_format,
        bbox: [0.0; 4],
        strongly_connected: true,
    };
    match osm::add_features_from_file(&mut g, &options, path.as_ref()) {
        Ok(()) => Ok(g),
        Err(e) => Err(GraphLoadError(PathBuf::from(path.as_ref()), e)),
    }
}

/// Reads non-empty lines of a file, skipping `#` comments.
fn read_addresses(path: &Path) -> io::Result<Vec<String>> {
    Ok(fs::read_to_string(path)?
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(str::to_string)
        .collect())
}

/// Prints turn-by-turn directions, announcing delivery addresses
/// on the segment which first reaches their node.
fn print_navigation<W: Write>(
    w: &mut W,
    g: &Graph,
    plan: &Plan,
    policy: NamePolicy,
) -> Result<(), Box<dyn Error>> {
    let mut announced: HashSet<i64> = HashSet::from([plan.depot]);
    for address in plan.deliveries.addresses(plan.depot) {
        writeln!(w, "Start from {}", address)?;
    }

    for segment in plan.navigate(g, policy) {
        let segment = segment?;
        if segment.length > 0.0 {
            writeln!(w, "Follow {} for {:.0} meters", segment.name, segment.length)?;
        }

        for &node_id in segment.node_ids.iter().skip(1) {
            if plan.deliveries.contains(node_id) && announced.insert(node_id) {
                for address in plan.deliveries.addresses(node_id) {
                    writeln!(w, "Deliver to {}", address)?;
                }
            }
        }
    }

    writeln!(w, "Back at the depot")?;
    Ok(())
}
