use std::collections::HashMap;

use nalgebra::Vector2;
use opencv::core::{Point, Vector};

use crate::error::{Result, VisionError};

/// Closed region in frame coordinates, given as an ordered vertex list.
/// The last vertex implicitly connects back to the first. Assumed simple
/// (non-self-intersecting); vertices live in the pixel space of the
/// owning camera's reference frame.
#[derive(Debug, Clone)]
pub struct Polygon {
    vertices: Vec<Vector2<i32>>,
}

impl Polygon {
    pub fn new(vertices: Vec<Vector2<i32>>) -> Self {
        Self { vertices }
    }

    pub fn vertices(&self) -> &[Vector2<i32>] {
        &self.vertices
    }

    pub fn to_cv_points(&self) -> Vector<Point> {
        self.vertices.iter().map(|v| Point::new(v.x, v.y)).collect()
    }

    /// Ray-casting containment test: a horizontal ray from `point` to the
    /// right crosses the polygon boundary an odd number of times iff the
    /// point is inside.
    pub fn contains(&self, point: Vector2<i32>) -> bool {
        let mut intersections = 0;
        let n = self.vertices.len();

        for i in 0..n {
            let p1 = &self.vertices[i];
            let p2 = &self.vertices[(i + 1) % n];

            if (p1.y > point.y) != (p2.y > point.y) {
                let intersection_x = (p2.x - p1.x) * (point.y - p1.y) / (p2.y - p1.y) + p1.x;
                if point.x < intersection_x {
                    intersections += 1;
                }
            }
        }

        intersections % 2 == 1
    }
}

/// Camera id to exclusion-zone lookup. A camera may legitimately have no
/// zones (empty list); an unregistered camera id is the same configuration
/// failure as a missing reference frame.
pub struct ZoneCatalog {
    zones: HashMap<u32, Vec<Polygon>>,
}

impl ZoneCatalog {
    pub fn new(entries: impl IntoIterator<Item = (u32, Vec<Polygon>)>) -> Self {
        Self {
            zones: entries.into_iter().collect(),
        }
    }

    pub fn zones(&self, camera: u32) -> Result<&[Polygon]> {
        self.zones
            .get(&camera)
            .map(Vec::as_slice)
            .ok_or(VisionError::UnknownCamera { camera })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x: i32, y: i32, side: i32) -> Polygon {
        Polygon::new(vec![
            Vector2::new(x, y),
            Vector2::new(x + side, y),
            Vector2::new(x + side, y + side),
            Vector2::new(x, y + side),
        ])
    }

    #[test]
    fn containment_inside_and_outside() {
        let zone = square(10, 10, 20);

        assert!(zone.contains(Vector2::new(15, 15)));
        assert!(zone.contains(Vector2::new(29, 29)));
        assert!(!zone.contains(Vector2::new(5, 15)));
        assert!(!zone.contains(Vector2::new(31, 15)));
        assert!(!zone.contains(Vector2::new(15, 35)));
    }

    #[test]
    fn containment_in_slanted_zone() {
        // Parallelogram leaning right, like a reflective window seen at an angle.
        let zone = Polygon::new(vec![
            Vector2::new(100, 10),
            Vector2::new(160, 30),
            Vector2::new(160, 120),
            Vector2::new(100, 90),
        ]);

        assert!(zone.contains(Vector2::new(130, 60)));
        assert!(!zone.contains(Vector2::new(110, 12)));
        assert!(!zone.contains(Vector2::new(90, 60)));
    }

    #[test]
    fn catalog_lookup_and_unknown_camera() {
        let catalog = ZoneCatalog::new([(7, vec![square(0, 0, 10)]), (8, vec![])]);

        assert_eq!(catalog.zones(7).unwrap().len(), 1);
        assert!(catalog.zones(8).unwrap().is_empty());
        assert!(matches!(
            catalog.zones(99),
            Err(VisionError::UnknownCamera { camera: 99 })
        ));
    }
}
