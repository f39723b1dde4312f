//! Error types.
//!
//! Lookups that find nothing return `Option`; the errors here cover malformed
//! input only: coordinate text, configuration, and GeoJSON ingestion.

use thiserror::Error;

/// Convenience alias for results with [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while loading data or configuration.
#[derive(Debug, Error)]
pub enum Error {
    /// Reading an input file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// A JSON document could not be decoded
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// The GeoJSON parser rejected the document
    #[cfg(feature = "geojson")]
    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),
    /// The document parsed but does not describe boundary features
    #[error("invalid GeoJSON: {0}")]
    InvalidGeoJson(String),
    /// A configuration value is out of range
    #[error("invalid configuration: {0}")]
    Config(String),
    /// Coordinate text could not be parsed
    #[error(transparent)]
    Coord(#[from] CoordError),
}

/// Reasons a coordinate string is rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoordError {
    /// Input was empty or whitespace
    #[error("no coordinates given")]
    Empty,
    /// Input matches neither the decimal nor the degree-minute-second grammar
    #[error("unrecognised coordinate format: '{0}'")]
    InvalidFormat(String),
    /// Minutes or seconds outside [0, 60)
    #[error("{component} out of range: {value} (must be below 60)")]
    InvalidComponent {
        /// `"minutes"` or `"seconds"`
        component: &'static str,
        /// The offending value
        value: f64,
    },
    /// Latitude outside [-90, 90]
    #[error("latitude out of range: {0} (must be between -90 and 90)")]
    LatitudeOutOfRange(f64),
    /// Longitude outside [-180, 180]
    #[error("longitude out of range: {0} (must be between -180 and 180)")]
    LongitudeOutOfRange(f64),
}
