use earcutr::earcut;
use foundation::math::Vec2;
use tracing::debug;

use crate::error::{GeometryError, Result};

/// Filled polygon geometry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PolygonMesh {
    pub vertices: Vec<Vec2>,
    pub triangles: Vec<usize>,
}

/// Triangulate a simple ring (no holes) with earcut.
pub fn triangulate(points: &[Vec2]) -> Result<PolygonMesh> {
    let coords: Vec<f64> = points.iter().flat_map(|p| [p.x, p.y]).collect();
    let triangles =
        earcut(&coords, &[], 2).map_err(|e| GeometryError::Triangulation(format!("{e:?}")))?;
    if triangles.is_empty() {
        debug!(points = points.len(), "ring produced no triangles");
    }
    Ok(PolygonMesh {
        vertices: points.to_vec(),
        triangles,
    })
}

/// Drop a closing vertex that repeats the first one.
pub fn drop_closing_duplicate(points: &mut Vec<Vec2>, epsilon: f64) {
    if points.len() >= 2 && points[0].approx_eq(points[points.len() - 1], epsilon) {
        points.pop();
    }
}

/// Area-weighted centroid of a triangulated polygon, with its signed area.
///
/// Returns `None` when the triangles enclose no area.
pub fn center_of_mass(vertices: &[Vec2], triangles: &[usize]) -> Option<(Vec2, f64)> {
    let mut com = Vec2::ZERO;
    let mut total = 0.0;
    for tri in triangles.chunks_exact(3) {
        let (a, b, c) = (
            *vertices.get(tri[0])?,
            *vertices.get(tri[1])?,
            *vertices.get(tri[2])?,
        );
        let mass = (b - a).cross(c - a) * 0.5;
        com = com + (a + b + c) * (mass / 3.0);
        total += mass;
    }
    if total == 0.0 {
        return None;
    }
    Some((com * (1.0 / total), total))
}
