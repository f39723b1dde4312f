use crate::config::IndexConfig;
use crate::search::{SearchEntry, SearchIndex, SearchOutcome};
use crate::spatial::SpatialIndex;
use crate::types::{Feature, FeatureRef, Level, Location};
use serde::Serialize;
use std::sync::Arc;

/// Query façade over one immutable feature set.
///
/// Holds the features, the spatial index and the search index side by side.
/// Cloning is cheap and clones share the same indices; to pick up new data,
/// build a fresh `Atlas` and replace the old one. Existing clones keep
/// answering from the data they were built with.
#[derive(Clone)]
pub struct Atlas {
    features: Arc<[Feature]>,
    spatial: Arc<SpatialIndex>,
    search: Arc<SearchIndex>,
}

/// Summary counts for an [`Atlas`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AtlasStats {
    /// Features indexed
    pub features: usize,
    /// Cells per side of the spatial grid
    pub grid_size: u32,
    /// Grid cells holding at least one feature
    pub populated_cells: usize,
    /// Distinct named units in the search index
    pub entries: usize,
}

impl Atlas {
    /// Builds both indices with default settings.
    pub fn new(features: Vec<Feature>) -> Self {
        Self::with_config(features, &IndexConfig::default())
    }

    /// Builds both indices with explicit settings.
    pub fn with_config(features: Vec<Feature>, config: &IndexConfig) -> Self {
        let features: Arc<[Feature]> = features.into();
        let spatial = SpatialIndex::with_config(Arc::clone(&features), &config.grid);
        let search = SearchIndex::with_config(&features, config.search.clone());
        Self {
            features,
            spatial: Arc::new(spatial),
            search: Arc::new(search),
        }
    }

    /// Parses a GeoJSON document and builds both indices.
    #[cfg(feature = "geojson")]
    pub fn from_geojson_str(json: &str, config: &IndexConfig) -> crate::Result<Self> {
        let features = crate::loader::features_from_geojson_str(json)?;
        Ok(Self::with_config(features, config))
    }

    /// Feature containing `location`, if any.
    pub fn locate(&self, location: Location) -> Option<FeatureRef<'_>> {
        self.spatial.locate(location)
    }

    /// Shorthand for [`locate`](Self::locate) with raw coordinates.
    pub fn locate_lat_lon(&self, latitude: f64, longitude: f64) -> Option<FeatureRef<'_>> {
        self.locate(Location::new(latitude, longitude))
    }

    /// Free-text search with the `:level` shorthand.
    pub fn search(&self, input: &str) -> SearchOutcome<'_> {
        self.search.search(input, None)
    }

    /// Free-text search restricted to `level` unless the query names its own.
    pub fn search_level(&self, input: &str, level: Option<Level>) -> SearchOutcome<'_> {
        self.search.search(input, level)
    }

    /// Entry previously returned by a search, recovered from its key.
    pub fn entry(&self, key: &str) -> Option<&SearchEntry> {
        self.search.entry(key)
    }

    /// Features aggregated by `entry`, in input order.
    ///
    /// Indices that do not belong to this atlas are skipped, so entries from
    /// another instance never panic.
    pub fn features_of<'a>(
        &'a self,
        entry: &'a SearchEntry,
    ) -> impl Iterator<Item = FeatureRef<'a>> + 'a {
        entry.indices.iter().filter_map(move |&index| {
            self.features
                .get(index)
                .map(|feature| FeatureRef { index, feature })
        })
    }

    /// All features in input order.
    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    /// The spatial index.
    pub fn spatial(&self) -> &SpatialIndex {
        &self.spatial
    }

    /// The search index.
    pub fn search_index(&self) -> &SearchIndex {
        &self.search
    }

    /// Summary counts.
    pub fn stats(&self) -> AtlasStats {
        AtlasStats {
            features: self.features.len(),
            grid_size: self.spatial.grid_size(),
            populated_cells: self.spatial.populated_cells(),
            entries: self.search.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::polygon;
    use std::thread;

    fn atlas() -> Atlas {
        let cell = |sector: &str, west: f64| {
            Feature::new(
                polygon![
                    (x: west, y: 0.0),
                    (x: west + 1.0, y: 0.0),
                    (x: west + 1.0, y: 1.0),
                    (x: west, y: 1.0),
                ],
                [
                    ("NAME_1", "P"),
                    ("NAME_2", "X"),
                    ("NAME_3", sector),
                    ("NAME_4", "Kigali"),
                ],
            )
        };
        Atlas::new(vec![cell("A", 0.0), cell("B", 1.0)])
    }

    #[test]
    fn test_entry_maps_back_to_features() {
        let atlas = atlas();
        let key = "cell:kigali:p>x>b";
        let entry = atlas.entry(key).unwrap();
        let hits: Vec<_> = atlas.features_of(entry).map(|hit| hit.index).collect();
        assert_eq!(hits, vec![1]);
        assert!(atlas.entry("cell:kigali:p>x>c").is_none());
    }

    #[test]
    fn test_stats() {
        let stats = atlas().stats();
        assert_eq!(stats.features, 2);
        assert_eq!(stats.grid_size, 30);
        // P, X, A, B, Kigali(A), Kigali(B)
        assert_eq!(stats.entries, 6);
    }

    #[test]
    fn test_concurrent_queries_share_indices() {
        let atlas = atlas();
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let atlas = atlas.clone();
                thread::spawn(move || {
                    let west = (i % 2) as f64;
                    let hit = atlas.locate_lat_lon(0.5, west + 0.5).map(|hit| hit.index);
                    let found = atlas.search("kigali").into_entries().len();
                    (hit, found)
                })
            })
            .collect();

        for (i, handle) in handles.into_iter().enumerate() {
            assert_eq!(handle.join().unwrap(), (Some(i % 2), 2));
        }
    }
}
