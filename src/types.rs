//! Core data structures for administrative boundaries.
//!
//! This module defines the fundamental types shared by both indices:
//!
//! - [`Location`] - A geographic point in decimal degrees
//! - [`BoundingBox`] - A cached (south, north, west, east) extent
//! - [`Level`] - One of the five administrative hierarchy levels
//! - [`Geometry`] - A polygon or multi-polygon boundary
//! - [`Feature`] - A boundary plus its hierarchy attributes
//! - [`FeatureRef`] - A borrowed feature together with its position

use geo::{MultiPolygon, Polygon};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sentinel returned for attributes that are missing, null, or blank.
pub const UNKNOWN: &str = "Unknown";

/// A coordinate pair in decimal degrees.
///
/// The indices never validate ranges; callers that accept user input should go
/// through [`parse_coordinates`](crate::coords::parse_coordinates), which does.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Latitude in decimal degrees (-90 to 90)
    pub latitude: f64,
    /// Longitude in decimal degrees (-180 to 180)
    pub longitude: f64,
}

impl Location {
    /// Constructs a new Location from coordinates.
    ///
    /// # Examples
    ///
    /// ```
    /// use imbibi::Location;
    ///
    /// let loc = Location::new(-1.9441, 30.0619);
    /// assert_eq!(loc.latitude, -1.9441);
    /// assert_eq!(loc.longitude, 30.0619);
    /// ```
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Returns `true` if both components lie inside the valid geographic ranges.
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// Axis-aligned extent of a geometry in geographic degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Minimum latitude
    pub south: f64,
    /// Maximum latitude
    pub north: f64,
    /// Minimum longitude
    pub west: f64,
    /// Maximum longitude
    pub east: f64,
}

impl BoundingBox {
    /// A zero-area box around a single coordinate.
    pub fn from_point(longitude: f64, latitude: f64) -> Self {
        Self {
            south: latitude,
            north: latitude,
            west: longitude,
            east: longitude,
        }
    }

    /// Grows the box to cover the given coordinate.
    pub fn extend(&mut self, longitude: f64, latitude: f64) {
        self.south = self.south.min(latitude);
        self.north = self.north.max(latitude);
        self.west = self.west.min(longitude);
        self.east = self.east.max(longitude);
    }

    /// Smallest box covering both `self` and `other`.
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            south: self.south.min(other.south),
            north: self.north.max(other.north),
            west: self.west.min(other.west),
            east: self.east.max(other.east),
        }
    }

    /// Inclusive containment test on all four edges.
    #[inline]
    pub fn contains(&self, location: &Location) -> bool {
        location.latitude >= self.south
            && location.latitude <= self.north
            && location.longitude >= self.west
            && location.longitude <= self.east
    }

    /// Latitude span in degrees.
    pub fn height(&self) -> f64 {
        self.north - self.south
    }

    /// Longitude span in degrees.
    pub fn width(&self) -> f64 {
        self.east - self.west
    }

    /// Midpoint of the box.
    pub fn center(&self) -> Location {
        Location::new(
            (self.south + self.north) / 2.0,
            (self.west + self.east) / 2.0,
        )
    }
}

/// Administrative hierarchy level, ordered root to leaf.
///
/// The ordering is meaningful: search results rank `Province` before
/// `District` before `Sector`, and so on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    /// First-order division (`NAME_1`)
    Province,
    /// Second-order division (`NAME_2`)
    District,
    /// Third-order division (`NAME_3`)
    Sector,
    /// Fourth-order division (`NAME_4`)
    Cell,
    /// Fifth-order division (`NAME_5`)
    Village,
}

impl Level {
    /// All levels, root to leaf.
    pub const ALL: [Level; 5] = [
        Level::Province,
        Level::District,
        Level::Sector,
        Level::Cell,
        Level::Village,
    ];

    /// Depth below the country, starting at 1 for `Province`.
    pub fn depth(self) -> usize {
        self as usize + 1
    }

    /// Lower-case keyword used by the `:level` query shorthand and in entry keys.
    pub fn keyword(self) -> &'static str {
        match self {
            Level::Province => "province",
            Level::District => "district",
            Level::Sector => "sector",
            Level::Cell => "cell",
            Level::Village => "village",
        }
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            Level::Province => "Province",
            Level::District => "District",
            Level::Sector => "Sector",
            Level::Cell => "Cell",
            Level::Village => "Village",
        }
    }

    /// Attribute holding this level's name, e.g. `NAME_4` for `Cell`.
    pub fn name_attribute(self) -> &'static str {
        match self {
            Level::Province => "NAME_1",
            Level::District => "NAME_2",
            Level::Sector => "NAME_3",
            Level::Cell => "NAME_4",
            Level::Village => "NAME_5",
        }
    }

    /// Attribute holding this level's identifier, e.g. `ID_4` for `Cell`.
    pub fn id_attribute(self) -> &'static str {
        match self {
            Level::Province => "ID_1",
            Level::District => "ID_2",
            Level::Sector => "ID_3",
            Level::Cell => "ID_4",
            Level::Village => "ID_5",
        }
    }

    /// Levels above this one, root first. Empty for `Province`.
    pub fn ancestors(self) -> &'static [Level] {
        let all: &'static [Level; 5] = &Self::ALL;
        &all[..self as usize]
    }

    /// Exact, case-insensitive keyword lookup.
    pub fn from_keyword(keyword: &str) -> Option<Level> {
        Self::ALL
            .into_iter()
            .find(|level| level.keyword().eq_ignore_ascii_case(keyword))
    }

    /// Levels whose keyword starts with `prefix` (case-insensitive), root first.
    pub fn matching_prefix(prefix: &str) -> Vec<Level> {
        let prefix = prefix.to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .filter(|level| level.keyword().starts_with(&prefix))
            .collect()
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Boundary geometry in (longitude, latitude) order.
///
/// Rings follow the usual convention: the first ring of each polygon is the
/// exterior, any further rings are holes.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    /// A single polygon with optional holes
    Polygon(Polygon<f64>),
    /// Several polygons; a point is inside if any of them contains it
    MultiPolygon(MultiPolygon<f64>),
}

impl Geometry {
    /// A geometry with no rings. It has no bounding box and contains nothing.
    pub fn empty() -> Self {
        Geometry::MultiPolygon(MultiPolygon::new(Vec::new()))
    }

    /// Iterates over the constituent polygons.
    pub fn polygons(&self) -> impl Iterator<Item = &Polygon<f64>> {
        let slice: &[Polygon<f64>] = match self {
            Geometry::Polygon(polygon) => std::slice::from_ref(polygon),
            Geometry::MultiPolygon(multi) => &multi.0,
        };
        slice.iter()
    }
}

impl From<Polygon<f64>> for Geometry {
    fn from(polygon: Polygon<f64>) -> Self {
        Geometry::Polygon(polygon)
    }
}

impl From<MultiPolygon<f64>> for Geometry {
    fn from(multi: MultiPolygon<f64>) -> Self {
        Geometry::MultiPolygon(multi)
    }
}

/// One administrative boundary with its hierarchy attributes.
///
/// Attributes are stored as given, minus values that are blank after trimming.
/// A feature has no identity of its own; both indices refer to it by its
/// position in the sequence they were built from.
///
/// # Examples
///
/// ```
/// use geo::polygon;
/// use imbibi::{Feature, Level};
///
/// let square = polygon![
///     (x: 30.0, y: -2.0),
///     (x: 30.1, y: -2.0),
///     (x: 30.1, y: -1.9),
///     (x: 30.0, y: -1.9),
/// ];
/// let feature = Feature::new(square, [("NAME_1", "Kigali City"), ("NAME_2", " ")]);
///
/// assert_eq!(feature.name(Level::Province), Some("Kigali City"));
/// assert_eq!(feature.name(Level::District), None);
/// assert_eq!(feature.attribute("NAME_2"), "Unknown");
/// ```
#[derive(Debug, Clone)]
pub struct Feature {
    geometry: Geometry,
    attributes: FxHashMap<String, String>,
}

impl Feature {
    /// Creates a feature, dropping attribute values that are blank after trimming.
    pub fn new<G, I, K, V>(geometry: G, attributes: I) -> Self
    where
        G: Into<Geometry>,
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<str>,
    {
        let attributes = attributes
            .into_iter()
            .filter_map(|(key, value)| {
                let value = value.as_ref().trim();
                (!value.is_empty()).then(|| (key.into(), value.to_string()))
            })
            .collect();

        Self {
            geometry: geometry.into(),
            attributes,
        }
    }

    /// The boundary geometry.
    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    /// All non-blank attributes.
    pub fn attributes(&self) -> &FxHashMap<String, String> {
        &self.attributes
    }

    /// Attribute value, or `None` when missing or blank.
    pub fn raw_attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// Attribute value with the [`UNKNOWN`] sentinel for missing or blank values.
    pub fn attribute(&self, key: &str) -> &str {
        self.raw_attribute(key).unwrap_or(UNKNOWN)
    }

    /// Country name (`NAME_0`).
    pub fn country(&self) -> &str {
        self.attribute("NAME_0")
    }

    /// Name at the given level, or `None` when the feature has none.
    pub fn name(&self, level: Level) -> Option<&str> {
        self.raw_attribute(level.name_attribute())
    }

    /// Name at the given level with the [`UNKNOWN`] sentinel.
    pub fn display_name(&self, level: Level) -> &str {
        self.attribute(level.name_attribute())
    }

    /// Identifier at the given level with the [`UNKNOWN`] sentinel.
    pub fn id(&self, level: Level) -> &str {
        self.attribute(level.id_attribute())
    }

    /// Deepest level for which the feature carries a name.
    pub fn finest_level(&self) -> Option<Level> {
        Level::ALL
            .into_iter()
            .rev()
            .find(|level| self.name(*level).is_some())
    }
}

/// A feature borrowed from an index, together with its position in the
/// sequence the index was built from.
#[derive(Debug, Clone, Copy)]
pub struct FeatureRef<'a> {
    /// Position in the original feature sequence
    pub index: usize,
    /// The feature itself
    pub feature: &'a Feature,
}
