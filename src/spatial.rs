use crate::config::GridConfig;
use crate::geometry::{bounding_box, geometry_contains};
use crate::types::{BoundingBox, Feature, FeatureRef, Location};
use rustc_hash::FxHashMap;
use std::sync::Arc;
use std::time::Instant;

/// Grid-partitioned point-in-polygon index.
///
/// The combined extent of all features is divided into a `grid_size ×
/// grid_size` lattice, and every feature is registered in each cell its
/// bounding box overlaps. A lookup inspects exactly one cell, rejects
/// candidates by bounding box, and confirms the rest with an exact ray-casting
/// test. The first feature in sequence order that contains the point wins.
///
/// The index is immutable once built and safe to share across threads.
pub struct SpatialIndex {
    features: Arc<[Feature]>,
    boxes: Vec<Option<BoundingBox>>,
    bounds: Option<BoundingBox>,
    grid_size: u32,
    cell_height: f64,
    cell_width: f64,
    /// Cell key (`row * grid_size + col`) to ascending feature indices.
    /// Cells without features are absent.
    grid: FxHashMap<u32, Vec<u32>>,
}

impl SpatialIndex {
    /// Builds an index with the default grid settings.
    pub fn new(features: impl Into<Arc<[Feature]>>) -> Self {
        Self::with_config(features, &GridConfig::default())
    }

    /// Builds an index with explicit grid settings.
    pub fn with_config(features: impl Into<Arc<[Feature]>>, config: &GridConfig) -> Self {
        let started = Instant::now();
        let features = features.into();

        let boxes: Vec<Option<BoundingBox>> = features
            .iter()
            .map(|feature| bounding_box(feature.geometry()))
            .collect();
        let bounds = boxes
            .iter()
            .flatten()
            .copied()
            .reduce(|acc, bbox| acc.union(&bbox));

        let grid_size = config.grid_size(features.len());
        let (cell_height, cell_width) = match &bounds {
            Some(bounds) => (
                cell_extent(bounds.height(), grid_size),
                cell_extent(bounds.width(), grid_size),
            ),
            None => (1.0, 1.0),
        };

        let mut index = Self {
            features,
            boxes,
            bounds,
            grid_size,
            cell_height,
            cell_width,
            grid: FxHashMap::default(),
        };
        index.grid = index.build_grid();

        log::debug!(
            "spatial index: {} features, {}x{} grid, {} populated cells, built in {:?}",
            index.features.len(),
            grid_size,
            grid_size,
            index.grid.len(),
            started.elapsed()
        );
        index
    }

    fn build_grid(&self) -> FxHashMap<u32, Vec<u32>> {
        let mut grid: FxHashMap<u32, Vec<u32>> = FxHashMap::default();
        let Some(bounds) = self.bounds else {
            return grid;
        };

        for (idx, bbox) in self.boxes.iter().enumerate() {
            let Some(bbox) = bbox else { continue };

            let row_lo = self.axis_cell(bbox.south - bounds.south, self.cell_height, f64::floor);
            let row_hi = self.axis_cell(bbox.north - bounds.south, self.cell_height, f64::ceil);
            let col_lo = self.axis_cell(bbox.west - bounds.west, self.cell_width, f64::floor);
            let col_hi = self.axis_cell(bbox.east - bounds.west, self.cell_width, f64::ceil);

            for row in row_lo..=row_hi {
                for col in col_lo..=col_hi {
                    grid.entry(self.cell_key(row, col))
                        .or_default()
                        .push(idx as u32);
                }
            }
        }
        grid
    }

    /// Returns the first feature, in sequence order, whose geometry contains
    /// `location`.
    ///
    /// Points outside the combined extent of all features are rejected without
    /// touching the grid. Only the single cell holding the point is searched,
    /// so a point lying exactly on a cell boundary may miss a polygon that was
    /// registered only in the neighbouring cell.
    pub fn locate(&self, location: Location) -> Option<FeatureRef<'_>> {
        let idx = self.locate_index(location)?;
        Some(FeatureRef {
            index: idx,
            feature: &self.features[idx],
        })
    }

    /// Like [`locate`](Self::locate) but returns only the feature position.
    pub fn locate_index(&self, location: Location) -> Option<usize> {
        let found = self
            .candidates(location)
            .iter()
            .map(|&idx| idx as usize)
            .find(|&idx| self.contains(idx, &location));

        log::trace!(
            "locate ({}, {}) -> {:?}",
            location.latitude,
            location.longitude,
            found
        );
        found
    }

    /// Feature indices registered in the cell holding `location`, before any
    /// containment test. Empty when the point is outside the indexed extent.
    pub fn candidates(&self, location: Location) -> &[u32] {
        self.grid_key(&location)
            .and_then(|key| self.grid.get(&key))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn contains(&self, idx: usize, location: &Location) -> bool {
        match &self.boxes[idx] {
            Some(bbox) if bbox.contains(location) => {
                geometry_contains(self.features[idx].geometry(), location)
            }
            _ => false,
        }
    }

    fn grid_key(&self, location: &Location) -> Option<u32> {
        let bounds = self.bounds.as_ref()?;
        if !bounds.contains(location) {
            return None;
        }
        let row = self.axis_cell(location.latitude - bounds.south, self.cell_height, f64::floor);
        let col = self.axis_cell(location.longitude - bounds.west, self.cell_width, f64::floor);
        Some(self.cell_key(row, col))
    }

    #[inline]
    fn cell_key(&self, row: u32, col: u32) -> u32 {
        row * self.grid_size + col
    }

    #[inline]
    fn axis_cell(&self, offset: f64, cell: f64, round: fn(f64) -> f64) -> u32 {
        let position = round(offset / cell);
        if position.is_nan() {
            return 0;
        }
        position.clamp(0.0, (self.grid_size - 1) as f64) as u32
    }

    /// The features this index was built from.
    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    /// Cached bounding box of the feature at `index`.
    pub fn feature_bounds(&self, index: usize) -> Option<&BoundingBox> {
        self.boxes.get(index).and_then(Option::as_ref)
    }

    /// Combined extent of every feature, or `None` for an empty index.
    pub fn bounds(&self) -> Option<&BoundingBox> {
        self.bounds.as_ref()
    }

    /// Cells per side of the lattice.
    pub fn grid_size(&self) -> u32 {
        self.grid_size
    }

    /// Number of cells holding at least one feature.
    pub fn populated_cells(&self) -> usize {
        self.grid.len()
    }

    /// Number of indexed features.
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// `true` when built from an empty sequence.
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

fn cell_extent(range: f64, grid_size: u32) -> f64 {
    if range > 0.0 {
        range / grid_size as f64
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Geometry;
    use geo::{polygon, MultiPolygon, Polygon};

    fn square(west: f64, south: f64, size: f64) -> Polygon<f64> {
        polygon![
            (x: west, y: south),
            (x: west + size, y: south),
            (x: west + size, y: south + size),
            (x: west, y: south + size),
        ]
    }

    /// `side × side` unit squares tiling [0, side) in both axes.
    fn tiles(side: usize) -> Vec<Feature> {
        (0..side * side)
            .map(|i| {
                let (row, col) = (i / side, i % side);
                Feature::new(
                    square(col as f64, row as f64, 1.0),
                    [("NAME_1", format!("tile-{row}-{col}"))],
                )
            })
            .collect()
    }

    #[test]
    fn test_empty_index_finds_nothing() {
        let index = SpatialIndex::new(Vec::<Feature>::new());
        assert!(index.is_empty());
        assert!(index.bounds().is_none());
        assert!(index.locate(Location::new(0.0, 0.0)).is_none());
        assert_eq!(index.grid_size(), 30);
    }

    #[test]
    fn test_locates_every_tile_center() {
        let side = 12;
        let index = SpatialIndex::new(tiles(side));
        for row in 0..side {
            for col in 0..side {
                let center = Location::new(row as f64 + 0.5, col as f64 + 0.5);
                let hit = index.locate(center).expect("tile center must resolve");
                assert_eq!(hit.index, row * side + col);
            }
        }
    }

    #[test]
    fn test_outside_bounds_skips_grid() {
        let index = SpatialIndex::new(tiles(4));
        let far = Location::new(14.0, 14.0);
        assert!(index.candidates(far).is_empty());
        assert!(index.locate(far).is_none());
    }

    #[test]
    fn test_inside_bounds_but_in_gap() {
        let features = vec![
            Feature::new(square(0.0, 0.0, 1.0), [("NAME_1", "a")]),
            Feature::new(square(9.0, 9.0, 1.0), [("NAME_1", "b")]),
        ];
        let index = SpatialIndex::new(features);
        assert!(index.locate(Location::new(5.0, 5.0)).is_none());
        assert_eq!(index.locate(Location::new(9.5, 9.5)).unwrap().index, 1);
    }

    #[test]
    fn test_large_feature_registered_in_many_cells() {
        let mut features = tiles(3);
        features.push(Feature::new(square(-1.0, -1.0, 5.0), [("NAME_1", "cover")]));
        let index = SpatialIndex::new(features);

        // The covering square spans every cell of the lattice
        assert_eq!(index.populated_cells(), 30 * 30);
        // Earlier features win when geometries overlap
        assert_eq!(index.locate(Location::new(0.5, 0.5)).unwrap().index, 0);
        assert_eq!(index.locate(Location::new(3.5, 3.5)).unwrap().index, 9);
    }

    #[test]
    fn test_features_without_coordinates_are_skipped() {
        let features = vec![
            Feature::new(Geometry::empty(), [("NAME_1", "nothing")]),
            Feature::new(square(0.0, 0.0, 1.0), [("NAME_1", "something")]),
        ];
        let index = SpatialIndex::new(features);
        assert!(index.feature_bounds(0).is_none());
        assert_eq!(index.locate(Location::new(0.5, 0.5)).unwrap().index, 1);
    }

    #[test]
    fn test_multipolygon_parts_far_apart() {
        let islands = MultiPolygon::new(vec![square(0.0, 0.0, 1.0), square(20.0, 20.0, 1.0)]);
        let features = vec![
            Feature::new(islands, [("NAME_1", "islands")]),
            Feature::new(square(10.0, 10.0, 1.0), [("NAME_1", "middle")]),
        ];
        let index = SpatialIndex::new(features);
        assert_eq!(index.locate(Location::new(20.5, 20.5)).unwrap().index, 0);
        assert_eq!(index.locate(Location::new(10.5, 10.5)).unwrap().index, 1);
        assert!(index.locate(Location::new(5.5, 5.5)).is_none());
    }

    #[test]
    fn test_oversized_grid_is_capped() {
        let config = GridConfig {
            min_cells: 70_000,
            max_cells: 70_000,
            features_per_cell: 4.0,
        };
        let features = vec![
            Feature::new(square(0.0, 0.0, 0.01), [("NAME_1", "south-west")]),
            Feature::new(square(10.0, 10.0, 0.01), [("NAME_1", "north-east")]),
        ];
        let index = SpatialIndex::with_config(features, &config);

        assert_eq!(index.grid_size(), crate::config::MAX_GRID_CELLS);
        assert_eq!(index.locate_index(Location::new(0.005, 0.005)), Some(0));
        assert_eq!(index.locate_index(Location::new(10.005, 10.005)), Some(1));
        assert!(index.locate_index(Location::new(5.0, 5.0)).is_none());
    }

    #[test]
    fn test_grid_size_follows_config() {
        let config = GridConfig {
            min_cells: 2,
            max_cells: 4,
            features_per_cell: 1.0,
        };
        let index = SpatialIndex::with_config(tiles(3), &config);
        assert_eq!(index.grid_size(), 3);
        assert_eq!(index.locate(Location::new(2.5, 0.5)).unwrap().index, 6);
    }
}
