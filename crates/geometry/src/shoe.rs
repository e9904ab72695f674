use foundation::math::Vec2;

use crate::interpolator::LineInterpolator;

/// Trapezoid marking a casing shoe between two relative positions on a path.
///
/// Corners are listed in drawing order: top side, bottom side, bottom other
/// side, top other side.
pub fn shoe_quad(
    interp: &LineInterpolator,
    top: f64,
    bottom: f64,
    width_top: f64,
    width_bottom: f64,
) -> [Vec2; 4] {
    let from = interp.get_point(top).position;
    let to = interp.get_point(bottom).position;
    let normal = (to - from).rotate90().normalize();
    let n_top = normal * width_top;
    let n_bottom = normal * width_bottom;
    [from + n_top, to + n_bottom, to - n_bottom, from - n_top]
}

/// Fan triangulation of a convex four-corner outline.
pub fn quad_triangles() -> [u32; 6] {
    [0, 1, 2, 0, 2, 3]
}
