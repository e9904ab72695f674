use foundation::math::Vec2;

/// Quad-per-segment line geometry with per-vertex extrusion normals.
///
/// Each segment contributes four vertices (lower/upper at its start, then
/// lower/upper at its end). Normals point away from the centre line so a
/// shader can widen the line without rebuilding it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineMesh {
    pub vertices: Vec<Vec2>,
    pub triangles: Vec<u32>,
    pub normals: Vec<Vec2>,
}

impl LineMesh {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len() / 3
    }

    /// Append the quad for segment `cur -> next` and return the offset used.
    fn push_segment(&mut self, cur: Vec2, next: Vec2, half: f64, normals: [Vec2; 2]) -> Vec2 {
        //  1     3
        //
        //  0     2
        let offset = (next - cur).rotate90().rescale(half);
        let b = self.vertices.len() as u32;
        self.vertices
            .extend([cur - offset, cur + offset, next - offset, next + offset]);
        let [left, right] = normals;
        self.normals.extend([-left, left, -right, right]);
        self.triangles.extend([b, b + 1, b + 3, b, b + 3, b + 2]);
        offset
    }

    /// Fill the wedge between the quad starting at vertex `b` and the
    /// previous one, on the outer side of the turn.
    fn patch(&mut self, b: u32, offset: Vec2, upper_left: Vec2, prev_upper_right: Vec2) {
        let angle = offset.signed_angle(prev_upper_right - upper_left);
        if angle < 0.0 {
            self.triangles.extend([b, b - 2, b + 1]);
        } else {
            self.triangles.extend([b, b - 1, b + 1]);
        }
    }
}

fn bisector_normal(to: Vec2, from: Vec2) -> Vec2 {
    to.lerp_rot(from, 0.5).rotate90().normalize()
}

/// Open polyline of the given thickness. Fewer than two points produce an
/// empty mesh.
pub fn simple_line(points: &[Vec2], thickness: f64) -> LineMesh {
    let mut mesh = LineMesh::default();
    if points.len() < 2 {
        return mesh;
    }
    let half = thickness * 0.5;
    let last = points.len() - 1;
    let normal_at = |i: usize| -> Vec2 {
        if i == 0 {
            (points[1] - points[0]).rotate90().normalize()
        } else if i == last {
            (points[last] - points[last - 1]).rotate90().normalize()
        } else {
            bisector_normal(points[i] - points[i - 1], points[i + 1] - points[i])
        }
    };

    let mut prev_upper_right = None;
    for i in 0..last {
        let (cur, next) = (points[i], points[i + 1]);
        let b = mesh.vertices.len() as u32;
        let offset = mesh.push_segment(cur, next, half, [normal_at(i), normal_at(i + 1)]);
        if let Some(prev) = prev_upper_right {
            mesh.patch(b, offset, cur + offset, prev);
        }
        prev_upper_right = Some(next + offset);
    }
    mesh
}

/// Closed ring outline. The ring must not repeat its first point at the end;
/// the seam between the last and first segment is patched like any other
/// joint. Fewer than three points produce an empty mesh.
pub fn polygon_outline(points: &[Vec2], thickness: f64) -> LineMesh {
    let mut mesh = LineMesh::default();
    let n = points.len();
    if n < 3 {
        return mesh;
    }
    let half = thickness * 0.5;
    let at = |i: usize| points[i % n];

    let mut prev_upper_right = Vec2::ZERO;
    let mut first_upper_left = Vec2::ZERO;
    let mut first_offset = Vec2::ZERO;

    for i in 0..n {
        let prev = at(i + n - 1);
        let cur = at(i);
        let next = at(i + 1);
        let next2 = at(i + 2);

        let left = bisector_normal(cur - prev, next - cur);
        let right = bisector_normal(next - cur, next2 - next);

        let b = mesh.vertices.len() as u32;
        let offset = mesh.push_segment(cur, next, half, [left, right]);
        let upper_left = cur + offset;
        let upper_right = next + offset;

        if i == 0 {
            first_upper_left = upper_left;
            first_offset = offset;
        } else {
            mesh.patch(b, offset, upper_left, prev_upper_right);
        }

        if i == n - 1 {
            let angle = first_offset.signed_angle(upper_right - first_upper_left);
            if angle < 0.0 {
                mesh.triangles.extend([0, b + 2, 1]);
            } else {
                mesh.triangles.extend([0, b + 3, 1]);
            }
        }

        prev_upper_right = upper_right;
    }
    mesh
}
