use foundation::math::Vec2;

/// Point on the segment `start -> end` closest to `point`.
pub fn closest_point_on_line(point: Vec2, start: Vec2, end: Vec2) -> Vec2 {
    let dir = end - start;
    let len = dir.magnitude();
    if len <= 0.0 {
        return start;
    }
    let along = (point - start).dot(dir) / len;
    if along < 0.0 {
        start
    } else if along > len {
        end
    } else {
        dir.rescale(along) + start
    }
}

/// Shortest distance from `point` to the segment `start -> end`.
///
/// Points projecting before the start measure to `start`, points projecting
/// past the end measure to `end`; everything else uses the perpendicular.
pub fn distance_to_line(point: Vec2, start: Vec2, end: Vec2) -> f64 {
    let dir = end - start;
    let len = dir.magnitude();
    let local = point - start;
    if len <= 0.0 {
        return local.magnitude();
    }
    let along = local.dot(dir) / len;
    if along < 0.0 {
        local.magnitude()
    } else if along > len {
        point.distance(end)
    } else {
        (local.cross(dir) / len).abs()
    }
}

/// Absolute displacement of `point` in the frame of the line through
/// `start -> end`: `x` along the line, `y` perpendicular to it.
pub fn displacement_to_line_origin(point: Vec2, start: Vec2, end: Vec2) -> Vec2 {
    let dir = (end - start).normalize();
    let local = point - start;
    if dir == Vec2::ZERO {
        return Vec2::new(local.x.abs(), local.y.abs());
    }
    Vec2::new(local.dot(dir).abs(), local.cross(dir).abs())
}
