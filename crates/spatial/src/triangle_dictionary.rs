use std::collections::HashMap;

use foundation::math::Vec2;

use crate::error::{Result, SpatialError};
use crate::grid::GridCell;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Triangle {
    pub v1: Vec2,
    pub v2: Vec2,
    pub v3: Vec2,
    pub polygon_id: usize,
}

impl Triangle {
    /// Sign-consistency test against the three edges. Points on an edge
    /// count as inside only for triangles wound so the edge test is `>= 0`.
    pub fn contains(&self, p: Vec2) -> bool {
        let edge = |a: Vec2, b: Vec2| (p.x - a.x) * (b.y - a.y) - (p.y - a.y) * (b.x - a.x);
        let k1 = edge(self.v1, self.v2);
        let k2 = edge(self.v2, self.v3);
        let k3 = edge(self.v3, self.v1);
        if k1 < 0.0 {
            k2 < 0.0 && k3 < 0.0
        } else {
            k2 >= 0.0 && k3 >= 0.0
        }
    }
}

/// Triangulated polygons hashed by the cells their triangle bounds cover.
///
/// Cells are `10^decimals` per unit, so `decimals = 1` gives cells of 0.1.
/// Ordering contract: `get_polygon_at` returns the polygon of the first
/// containing triangle in insertion order.
#[derive(Debug, Clone)]
pub struct TriangleDictionary<T> {
    resolution: f64,
    tiles: HashMap<GridCell, Vec<usize>>,
    triangles: Vec<Triangle>,
    polygons: Vec<T>,
}

impl<T> TriangleDictionary<T> {
    pub fn new(decimals: f64) -> Self {
        Self {
            resolution: 10f64.powf(decimals),
            tiles: HashMap::new(),
            triangles: Vec::new(),
            polygons: Vec::new(),
        }
    }

    fn cell(&self, coord: f64) -> i64 {
        (coord * self.resolution).floor() as i64
    }

    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    pub fn polygon_count(&self) -> usize {
        self.polygons.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    pub fn polygon(&self, id: usize) -> Option<&T> {
        self.polygons.get(id)
    }

    /// Register a triangulated polygon. `indices` holds three vertex indices
    /// per triangle. Returns the new polygon id.
    pub fn add(&mut self, vertices: &[Vec2], indices: &[usize], value: T) -> Result<usize> {
        if let Some(&index) = indices.iter().find(|&&i| i >= vertices.len()) {
            return Err(SpatialError::TriangleIndexOutOfBounds {
                index,
                vertex_count: vertices.len(),
            });
        }

        let polygon_id = self.polygons.len();
        self.polygons.push(value);

        for tri in indices.chunks_exact(3) {
            let triangle = Triangle {
                v1: vertices[tri[0]],
                v2: vertices[tri[1]],
                v3: vertices[tri[2]],
                polygon_id,
            };
            let triangle_id = self.triangles.len();
            self.triangles.push(triangle);

            let xs = [triangle.v1.x, triangle.v2.x, triangle.v3.x];
            let ys = [triangle.v1.y, triangle.v2.y, triangle.v3.y];
            let min_x = self.cell(xs.iter().copied().fold(f64::INFINITY, f64::min));
            let max_x = self.cell(xs.iter().copied().fold(f64::NEG_INFINITY, f64::max));
            let min_y = self.cell(ys.iter().copied().fold(f64::INFINITY, f64::min));
            let max_y = self.cell(ys.iter().copied().fold(f64::NEG_INFINITY, f64::max));

            for x in min_x..=max_x {
                for y in min_y..=max_y {
                    self.tiles
                        .entry(GridCell::new(x, y))
                        .or_default()
                        .push(triangle_id);
                }
            }
        }

        Ok(polygon_id)
    }

    /// Payload of the polygon containing `target`, if any.
    pub fn get_polygon_at(&self, target: Vec2) -> Option<&T> {
        self.polygon_id_at(target).and_then(|id| self.polygons.get(id))
    }

    pub fn polygon_id_at(&self, target: Vec2) -> Option<usize> {
        let cell = GridCell::new(self.cell(target.x), self.cell(target.y));
        self.tiles
            .get(&cell)?
            .iter()
            .filter_map(|&t| self.triangles.get(t))
            .find(|t| t.contains(target))
            .map(|t| t.polygon_id)
    }

    pub fn clear(&mut self) {
        self.tiles.clear();
        self.triangles.clear();
        self.polygons.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::{Triangle, TriangleDictionary};
    use crate::error::SpatialError;
    use foundation::math::Vec2;

    fn square(x: f64, y: f64, size: f64) -> Vec<Vec2> {
        vec![
            Vec2::new(x, y),
            Vec2::new(x + size, y),
            Vec2::new(x + size, y + size),
            Vec2::new(x, y + size),
        ]
    }

    #[test]
    fn triangle_contains_either_winding() {
        let ccw = Triangle {
            v1: Vec2::new(0.0, 0.0),
            v2: Vec2::new(1.0, 0.0),
            v3: Vec2::new(0.0, 1.0),
            polygon_id: 0,
        };
        let cw = Triangle {
            v2: ccw.v3,
            v3: ccw.v2,
            ..ccw
        };
        for t in [ccw, cw] {
            assert!(t.contains(Vec2::new(0.2, 0.2)));
            assert!(!t.contains(Vec2::new(0.8, 0.8)));
            assert!(!t.contains(Vec2::new(-0.1, 0.5)));
        }
    }

    #[test]
    fn finds_polygon_under_point() {
        let mut d = TriangleDictionary::new(1.0);
        let a = d.add(&square(0.0, 0.0, 1.0), &[0, 1, 2, 0, 2, 3], "a").unwrap();
        let b = d.add(&square(2.0, 0.0, 1.0), &[0, 1, 2, 0, 2, 3], "b").unwrap();
        assert_eq!((a, b), (0, 1));
        assert_eq!(d.triangle_count(), 4);

        assert_eq!(d.get_polygon_at(Vec2::new(0.25, 0.75)), Some(&"a"));
        assert_eq!(d.get_polygon_at(Vec2::new(2.75, 0.25)), Some(&"b"));
        assert_eq!(d.get_polygon_at(Vec2::new(1.5, 0.5)), None);
        assert_eq!(d.get_polygon_at(Vec2::new(40.0, 40.0)), None);
    }

    #[test]
    fn fractional_decimals_scale_cells() {
        let mut d = TriangleDictionary::new(1.2);
        assert!((d.resolution() - 10f64.powf(1.2)).abs() < 1e-12);
        d.add(&square(-3.0, -3.0, 0.5), &[0, 1, 2, 0, 2, 3], 9).unwrap();
        assert_eq!(d.get_polygon_at(Vec2::new(-2.9, -2.6)), Some(&9));
    }

    #[test]
    fn rejects_out_of_range_indices() {
        let mut d = TriangleDictionary::new(0.0);
        let err = d.add(&square(0.0, 0.0, 1.0), &[0, 1, 4], ()).unwrap_err();
        assert_eq!(
            err,
            SpatialError::TriangleIndexOutOfBounds {
                index: 4,
                vertex_count: 4
            }
        );
        assert_eq!(d.polygon_count(), 0);
    }
}
