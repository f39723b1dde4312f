//! Bounding boxes and exact point-in-polygon tests.
//!
//! Containment uses the even-odd ray casting rule: a horizontal ray is cast
//! from the point towards increasing longitude and every ring edge it crosses
//! toggles the inside flag. Rings with fewer than three points never contain
//! anything, and geometries without coordinates have no bounding box.

use crate::types::{BoundingBox, Geometry, Location};
use geo::{LineString, Polygon};

/// Computes the extent of every ring of every polygon in `geometry`.
///
/// Returns `None` for a geometry without a single coordinate.
pub fn bounding_box(geometry: &Geometry) -> Option<BoundingBox> {
    let mut coords = geometry
        .polygons()
        .flat_map(|polygon| std::iter::once(polygon.exterior()).chain(polygon.interiors()))
        .flat_map(|ring| ring.0.iter());

    let first = coords.next()?;
    let mut bbox = BoundingBox::from_point(first.x, first.y);
    for coord in coords {
        bbox.extend(coord.x, coord.y);
    }
    Some(bbox)
}

/// Even-odd containment test against a single ring.
///
/// A point exactly on an edge may land on either side; that ambiguity is
/// inherent to ray casting.
pub fn ring_contains(ring: &LineString<f64>, location: &Location) -> bool {
    let points = &ring.0;
    if points.len() < 3 {
        return false;
    }

    let (x, y) = (location.longitude, location.latitude);
    let mut inside = false;
    let mut j = points.len() - 1;
    for i in 0..points.len() {
        let (xi, yi) = (points[i].x, points[i].y);
        let (xj, yj) = (points[j].x, points[j].y);
        if (yi > y) != (yj > y) {
            let crossing = (xj - xi) * (y - yi) / (yj - yi) + xi;
            if x < crossing {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Inside the exterior ring and outside every hole.
pub fn polygon_contains(polygon: &Polygon<f64>, location: &Location) -> bool {
    ring_contains(polygon.exterior(), location)
        && !polygon
            .interiors()
            .iter()
            .any(|hole| ring_contains(hole, location))
}

/// Inside any constituent polygon.
pub fn geometry_contains(geometry: &Geometry, location: &Location) -> bool {
    geometry
        .polygons()
        .any(|polygon| polygon_contains(polygon, location))
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, MultiPolygon};

    fn square(west: f64, south: f64, size: f64) -> Polygon<f64> {
        polygon![
            (x: west, y: south),
            (x: west + size, y: south),
            (x: west + size, y: south + size),
            (x: west, y: south + size),
        ]
    }

    #[test]
    fn test_point_inside_square() {
        let geometry = Geometry::from(square(0.0, 0.0, 10.0));
        assert!(geometry_contains(&geometry, &Location::new(5.0, 5.0)));
        assert!(!geometry_contains(&geometry, &Location::new(5.0, 11.0)));
        assert!(!geometry_contains(&geometry, &Location::new(-0.1, 5.0)));
    }

    #[test]
    fn test_hole_excludes_points() {
        let hole = square(4.0, 4.0, 2.0).exterior().clone();
        let donut = Polygon::new(square(0.0, 0.0, 10.0).exterior().clone(), vec![hole]);
        let geometry = Geometry::from(donut);

        assert!(!geometry_contains(&geometry, &Location::new(5.0, 5.0)));
        assert!(geometry_contains(&geometry, &Location::new(2.0, 2.0)));
        assert!(geometry_contains(&geometry, &Location::new(8.0, 5.0)));
    }

    #[test]
    fn test_multipolygon_any_part() {
        let geometry = Geometry::from(MultiPolygon::new(vec![
            square(0.0, 0.0, 1.0),
            square(10.0, 10.0, 1.0),
        ]));
        assert!(geometry_contains(&geometry, &Location::new(0.5, 0.5)));
        assert!(geometry_contains(&geometry, &Location::new(10.5, 10.5)));
        assert!(!geometry_contains(&geometry, &Location::new(5.0, 5.0)));
    }

    #[test]
    fn test_concave_ring() {
        // U shape open to the north
        let u = polygon![
            (x: 0.0, y: 0.0),
            (x: 3.0, y: 0.0),
            (x: 3.0, y: 3.0),
            (x: 2.0, y: 3.0),
            (x: 2.0, y: 1.0),
            (x: 1.0, y: 1.0),
            (x: 1.0, y: 3.0),
            (x: 0.0, y: 3.0),
        ];
        let geometry = Geometry::from(u);
        assert!(geometry_contains(&geometry, &Location::new(2.0, 0.5)));
        assert!(!geometry_contains(&geometry, &Location::new(2.0, 1.5)));
        assert!(geometry_contains(&geometry, &Location::new(2.0, 2.5)));
    }

    #[test]
    fn test_degenerate_rings_contain_nothing() {
        let line = LineString::from(vec![(0.0, 0.0), (1.0, 1.0)]);
        assert!(!ring_contains(&line, &Location::new(0.5, 0.5)));

        let empty = Geometry::empty();
        assert!(!geometry_contains(&empty, &Location::new(0.0, 0.0)));
        assert_eq!(bounding_box(&empty), None);
    }

    #[test]
    fn test_bounding_box_covers_all_parts() {
        let geometry = Geometry::from(MultiPolygon::new(vec![
            square(0.0, 0.0, 1.0),
            square(10.0, -5.0, 1.0),
        ]));
        let bbox = bounding_box(&geometry).unwrap();
        assert_eq!(bbox.west, 0.0);
        assert_eq!(bbox.east, 11.0);
        assert_eq!(bbox.south, -5.0);
        assert_eq!(bbox.north, 1.0);
    }
}
