//! Tunables for index construction and search ranking.
//!
//! Defaults reproduce the behaviour the indices were tuned for on a
//! country-sized dataset of roughly 15-20k village polygons. They can be
//! overridden from JSON:
//!
//! ```
//! use imbibi::IndexConfig;
//!
//! let config = IndexConfig::from_json_str(r#"{ "grid": { "max_cells": 120 } }"#).unwrap();
//! assert_eq!(config.grid.max_cells, 120);
//! assert_eq!(config.grid.min_cells, 30);
//! assert_eq!(config.search.max_results, 50);
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Upper bound on grid cells per side, keeping cell keys within `u32` and
/// the number of cell lists a single feature can touch bounded.
pub const MAX_GRID_CELLS: u32 = 4096;

/// Resolution bounds for the adaptive spatial grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Smallest number of cells per side
    pub min_cells: u32,
    /// Largest number of cells per side
    pub max_cells: u32,
    /// Average number of features each cell should hold
    pub features_per_cell: f64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            min_cells: 30,
            max_cells: 80,
            features_per_cell: 4.0,
        }
    }
}

impl GridConfig {
    /// Cells per side for `n` features: `clamp(ceil(sqrt(n / per_cell)), min, max)`.
    ///
    /// ```
    /// use imbibi::config::GridConfig;
    ///
    /// let grid = GridConfig::default();
    /// assert_eq!(grid.grid_size(0), 30);
    /// assert_eq!(grid.grid_size(10_000), 50);
    /// assert_eq!(grid.grid_size(1_000_000), 80);
    /// ```
    pub fn grid_size(&self, n: usize) -> u32 {
        let min = self.min_cells.clamp(1, MAX_GRID_CELLS);
        let max = self.max_cells.clamp(min, MAX_GRID_CELLS);
        let per_cell = if self.features_per_cell > 0.0 {
            self.features_per_cell
        } else {
            GridConfig::default().features_per_cell
        };
        let side = (n as f64 / per_cell).sqrt().ceil();
        (side.min(max as f64) as u32).clamp(min, max)
    }

    fn validate(&self) -> Result<()> {
        if self.min_cells == 0 {
            return Err(Error::Config("grid.min_cells must be at least 1".into()));
        }
        if self.min_cells > self.max_cells {
            return Err(Error::Config(format!(
                "grid.min_cells ({}) exceeds grid.max_cells ({})",
                self.min_cells, self.max_cells
            )));
        }
        if self.max_cells > MAX_GRID_CELLS {
            return Err(Error::Config(format!(
                "grid.max_cells ({}) exceeds the limit of {}",
                self.max_cells, MAX_GRID_CELLS
            )));
        }
        if self.features_per_cell.is_nan() || self.features_per_cell <= 0.0 {
            return Err(Error::Config(
                "grid.features_per_cell must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// Search behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Results kept after ranking
    pub max_results: usize,
    /// Normalized query length below which the text filter is not applied
    pub min_query_chars: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_results: 50,
            min_query_chars: 2,
        }
    }
}

/// Top-level configuration for building an [`Atlas`](crate::Atlas).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Spatial grid settings
    pub grid: GridConfig,
    /// Text search settings
    pub search: SearchConfig,
}

impl IndexConfig {
    /// Parses and validates a JSON document. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: IndexConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a JSON configuration file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Checks the settings for values the indices cannot work with.
    pub fn validate(&self) -> Result<()> {
        self.grid.validate()?;
        if self.search.max_results == 0 {
            return Err(Error::Config("search.max_results must be at least 1".into()));
        }
        Ok(())
    }
}
