//! imbibi: query administrative boundaries from the terminal.
//!
//! Usage examples
//! --------------
//!
//! - Which unit contains a point?
//!   $ imbibi -i rwanda.geojson locate -- -1.9441 30.0619
//!
//! - Search units, optionally with a level keyword
//!   $ imbibi -i rwanda.geojson search kigali
//!   $ imbibi -i rwanda.geojson search :cell rukiri
//!
//! - Convert coordinate text (no data needed)
//!   $ imbibi coords parse "1°56'38.8\"S 30°03'42.8\"E"
//!   $ imbibi coords format -- -1.9441 30.0619
//!
//! Logging goes to stderr and follows `RUST_LOG` (default `warn`).

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use imbibi::coords::{format_coordinates, format_decimal, parse_coordinates};
use imbibi::{Atlas, Feature, IndexConfig, Level, SearchEntry, SearchOutcome};
use std::path::PathBuf;

/// CLI arguments for imbibi
#[derive(Debug, Parser)]
#[command(
    name = "imbibi",
    version,
    about = "Point-in-polygon lookup and name search over administrative boundaries"
)]
struct CliArgs {
    /// GeoJSON FeatureCollection of boundary polygons
    #[arg(short = 'i', long = "input", global = true)]
    input: Option<PathBuf>,

    /// JSON file overriding grid and search settings
    #[arg(short = 'c', long = "config", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(flatten)]
    Query(QueryCommand),

    /// Parse or format coordinate text
    Coords {
        #[command(subcommand)]
        action: CoordsAction,
    },
}

/// Commands that need boundary data
#[derive(Debug, Subcommand)]
enum QueryCommand {
    /// Find the unit containing a coordinate
    Locate {
        /// Latitude in decimal degrees
        lat: f64,
        /// Longitude in decimal degrees
        lon: f64,
    },

    /// Search units by name; prefix with `:level` to restrict the level
    Search {
        /// Query text (joined with spaces)
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },

    /// Show a unit by its search key
    Entry {
        /// Key as printed by `search`
        key: String,
    },

    /// Show index statistics
    Stats,
}

#[derive(Debug, Subcommand)]
enum CoordsAction {
    /// Parse decimal or DMS text into decimal degrees
    Parse {
        /// Coordinate text (joined with spaces)
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// Format decimal degrees as DMS
    Format {
        /// Latitude in decimal degrees
        lat: f64,
        /// Longitude in decimal degrees
        lon: f64,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = CliArgs::parse();

    match args.command {
        Commands::Coords { action } => run_coords(&action),
        Commands::Query(command) => {
            let atlas = load_atlas(args.input.as_ref(), args.config.as_ref())?;
            run_query(command, &atlas);
            Ok(())
        }
    }
}

fn run_query(command: QueryCommand, atlas: &Atlas) {
    match command {
        QueryCommand::Locate { lat, lon } => match atlas.locate_lat_lon(lat, lon) {
            Some(hit) => {
                println!("Feature #{}", hit.index);
                print_feature(hit.feature);
            }
            None => println!("No boundary contains {}", format_decimal(lat, lon)),
        },
        QueryCommand::Search { query } => print_outcome(&atlas.search(&query.join(" "))),
        QueryCommand::Entry { key } => match atlas.entry(&key) {
            Some(entry) => {
                print_entry(entry);
                for hit in atlas.features_of(entry) {
                    println!("  #{} {}", hit.index, hit.feature.id(entry.level));
                }
            }
            None => println!("No entry with key '{}'", key),
        },
        QueryCommand::Stats => {
            let stats = atlas.stats();
            println!("Index statistics:");
            println!("  Features: {}", stats.features);
            println!("  Grid: {0}x{0}", stats.grid_size);
            println!("  Populated cells: {}", stats.populated_cells);
            println!("  Search entries: {}", stats.entries);
        }
    }
}

fn load_atlas(input: Option<&PathBuf>, config: Option<&PathBuf>) -> anyhow::Result<Atlas> {
    let Some(input) = input else {
        bail!("this command needs boundary data: pass --input <file.geojson>");
    };
    let config = match config {
        Some(path) => IndexConfig::from_path(path)
            .with_context(|| format!("reading config {}", path.display()))?,
        None => IndexConfig::default(),
    };
    let features = imbibi::loader::features_from_path(input)
        .with_context(|| format!("loading boundaries from {}", input.display()))?;
    Ok(Atlas::with_config(features, &config))
}

fn run_coords(action: &CoordsAction) -> anyhow::Result<()> {
    match action {
        CoordsAction::Parse { text } => {
            let location = parse_coordinates(&text.join(" "))?;
            println!("{}", format_decimal(location.latitude, location.longitude));
        }
        CoordsAction::Format { lat, lon } => {
            println!("{}", format_coordinates(*lat, *lon));
        }
    }
    Ok(())
}

fn print_feature(feature: &Feature) {
    println!("  Country: {}", feature.country());
    for level in Level::ALL {
        println!(
            "  {}: {} ({})",
            level,
            feature.display_name(level),
            feature.id(level)
        );
    }
}

fn print_entry(entry: &SearchEntry) {
    let parent = if entry.parent_label.is_empty() {
        String::new()
    } else {
        format!(" in {}", entry.parent_label)
    };
    println!(
        "{} {}{} [{} feature(s)]",
        entry.level,
        entry.name,
        parent,
        entry.feature_count()
    );
    println!("  key: {}", entry.key);
}

fn print_outcome(outcome: &SearchOutcome<'_>) {
    let Some(results) = outcome.results() else {
        let keywords: Vec<_> = outcome
            .suggestions()
            .iter()
            .map(|level| format!(":{}", level.keyword()))
            .collect();
        if keywords.is_empty() {
            println!("Unknown level keyword");
        } else {
            println!("Did you mean: {}", keywords.join(", "));
        }
        return;
    };

    if results.is_empty() {
        println!("No matches");
        return;
    }
    for entry in results.name_matches() {
        print_entry(entry);
    }
    let parents: Vec<_> = results.parent_matches().collect();
    if !parents.is_empty() {
        println!("Within matching areas:");
        for entry in parents {
            print_entry(entry);
        }
    }
}
