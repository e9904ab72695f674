use foundation::math::Vec2;
use spatial::displacement_to_line_origin;

/// Drop points that add little information to a polyline.
///
/// The first two and the last point are always kept. A candidate is kept when
/// its perpendicular deviation from the current direction line exceeds
/// `max_deviation`, relaxed by `distance_weight` per unit travelled along the
/// line and tightened by sharp turns. Points within 0.01 of their predecessor
/// are skipped.
pub fn reduce(points: &[Vec2], max_deviation: f64, distance_weight: f64) -> Vec<Vec2> {
    if points.len() <= 3 {
        return points.to_vec();
    }

    let mut out = vec![points[0], points[1]];
    let mut line_start = points[0];
    let mut line_end = points[1];

    for i in 2..points.len() - 1 {
        let cur = points[i];
        if cur.approx_eq(points[i - 1], 0.01) {
            continue;
        }

        let disp = displacement_to_line_origin(cur, line_start, line_end);
        let angle = (line_end - line_start).angle_deg(cur - line_end);

        if disp.y > max_deviation + disp.x * distance_weight - angle * 0.075 {
            out.push(cur);
            line_start = line_end;
            line_end = cur;
        }
    }

    out.push(points[points.len() - 1]);
    out
}
