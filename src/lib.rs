//! Point-in-polygon lookup and hierarchical name search over administrative boundaries.
//!
//! `imbibi` answers the two questions an interactive boundary map keeps asking:
//! *which unit contains this coordinate?* and *which units match this text?*
//! Both are answered from indices built once over an immutable list of
//! polygon features (province → district → sector → cell → village), fast
//! enough to run on every click or keystroke against tens of thousands of
//! polygons.
//!
//! # Features
//!
//! - **Adaptive grid** - Bounding boxes binned into a lattice sized to the data density
//! - **Exact containment** - Even-odd ray casting with holes and multi-polygons
//! - **Unit catalogue** - One search entry per (level, name, ancestor chain), never merged by name alone
//! - **Ranked search** - Prefix matches, then level, then specificity; `:level` shorthand with suggestions
//! - **Coordinate text** - Decimal and degree-minute-second parsing and formatting
//! - **Thread-Safe** - Immutable after construction; share freely across threads
//!
//! # Quick Start
//!
//! ```
//! use geo::polygon;
//! use imbibi::{Atlas, Feature, Level};
//!
//! let remera = Feature::new(
//!     polygon![
//!         (x: 30.10, y: -1.97),
//!         (x: 30.13, y: -1.97),
//!         (x: 30.13, y: -1.94),
//!         (x: 30.10, y: -1.94),
//!     ],
//!     [
//!         ("NAME_0", "Rwanda"),
//!         ("NAME_1", "Kigali City"),
//!         ("NAME_2", "Gasabo"),
//!         ("NAME_3", "Remera"),
//!     ],
//! );
//! let atlas = Atlas::new(vec![remera]);
//!
//! // Which unit contains this point?
//! let hit = atlas.locate_lat_lon(-1.955, 30.115).unwrap();
//! assert_eq!(hit.feature.name(Level::Sector), Some("Remera"));
//!
//! // Which units match this text?
//! let outcome = atlas.search("gasabo");
//! let results = outcome.results().unwrap();
//! assert_eq!(results.name_matches().count(), 1);
//! assert_eq!(results.parent_matches().count(), 1);
//! ```
//!
//! # Architecture
//!
//! ## Spatial Partition Index
//!
//! The combined extent of all features is divided into a `g × g` lattice with
//! `g = clamp(ceil(sqrt(n / 4)), 30, 80)`, aiming at about four features per
//! cell. Each feature is registered in every cell its bounding box touches.
//!
//! A lookup:
//!
//! 1. Rejects points outside the combined extent
//! 2. Computes the single cell holding the point
//! 3. Filters that cell's candidates by bounding box
//! 4. Confirms with an exact ray-casting test, returning the first match in input order
//!
//! ## Hierarchical Search Index
//!
//! Names are folded (diacritics stripped, lower-cased, whitespace collapsed)
//! and keyed together with their folded ancestor chain. Each key aggregates
//! the positions of all features that share it. A query of at least two
//! folded characters is matched as a substring of the unit name plus its
//! ancestors, ranked, and capped at 50 results.
//!
//! # Thread Safety
//!
//! Both indices are plain immutable data after construction. [`Atlas`] wraps
//! them in `Arc`s, so clones are cheap and can be handed to other threads:
//!
//! ```
//! use std::thread;
//!
//! let atlas = imbibi::Atlas::new(Vec::new());
//! let handles: Vec<_> = (0..4)
//!     .map(|i| {
//!         let atlas = atlas.clone();
//!         thread::spawn(move || atlas.locate_lat_lon(i as f64, 30.0).is_none())
//!     })
//!     .collect();
//!
//! for handle in handles {
//!     assert!(handle.join().unwrap());
//! }
//! ```
//!
//! To switch to new data, build a new [`Atlas`] and replace the old value;
//! readers still holding the old one are unaffected.
//!
//! # Limitations
//!
//! - **Cell boundaries**: only the cell holding the point is searched; floating
//!   point effects exactly on a cell edge can miss a polygon registered only next door
//! - **No projection**: coordinates are used as given, in degrees
//! - **Static**: no insertion or removal after construction
//!
//! # Modules
//!
//! - [`types`] - Core data structures ([`Feature`], [`Location`], [`Level`])
//! - [`spatial`] - The grid index ([`SpatialIndex`])
//! - [`search`] - The unit catalogue ([`SearchIndex`], [`SearchEntry`])
//! - [`coords`] - Coordinate text parsing and formatting
//! - [`loader`] - GeoJSON ingestion (feature `geojson`)

#![warn(missing_docs)]

mod atlas;
pub mod config;
pub mod coords;
pub mod error;
pub mod geometry;
#[cfg(feature = "geojson")]
pub mod loader;
pub mod query;
pub mod search;
pub mod spatial;
pub mod text;
pub mod types;

pub use atlas::{Atlas, AtlasStats};
pub use config::IndexConfig;
pub use coords::{format_coordinates, parse_coordinates};
pub use error::{CoordError, Error, Result};
pub use search::{SearchEntry, SearchIndex, SearchOutcome, SearchResults};
pub use spatial::SpatialIndex;
pub use types::{BoundingBox, Feature, FeatureRef, Geometry, Level, Location};

use std::sync::Arc;

/// Builds a [`SpatialIndex`] with default grid settings.
///
/// # Examples
///
/// ```
/// use geo::polygon;
/// use imbibi::{build_spatial_index, Feature, Location};
///
/// let square = Feature::new(
///     polygon![(x: 0.0, y: 0.0), (x: 2.0, y: 0.0), (x: 2.0, y: 2.0), (x: 0.0, y: 2.0)],
///     [("NAME_1", "Square")],
/// );
/// let index = build_spatial_index(vec![square]);
///
/// assert_eq!(index.locate(Location::new(1.0, 1.0)).map(|hit| hit.index), Some(0));
/// assert!(index.locate(Location::new(11.0, 11.0)).is_none());
/// ```
pub fn build_spatial_index(features: impl Into<Arc<[Feature]>>) -> SpatialIndex {
    SpatialIndex::new(features)
}

/// Builds a [`SearchIndex`] with default search settings.
pub fn build_search_index(features: &[Feature]) -> SearchIndex {
    SearchIndex::new(features)
}
