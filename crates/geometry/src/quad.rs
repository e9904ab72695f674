use foundation::math::Vec2;

/// Axis-aligned textured quad, used for round root markers drawn by a
/// shader from the UVs.
#[derive(Debug, Clone, PartialEq)]
pub struct QuadMesh {
    pub vertices: [Vec2; 4],
    pub uvs: [[f32; 2]; 4],
    pub triangles: [u32; 6],
}

/// Square of half-size `radius` around `center`.
pub fn quad(center: Vec2, radius: f64) -> QuadMesh {
    // 2    3
    //
    // 0    1
    QuadMesh {
        vertices: [
            Vec2::new(center.x - radius, center.y - radius),
            Vec2::new(center.x + radius, center.y - radius),
            Vec2::new(center.x - radius, center.y + radius),
            Vec2::new(center.x + radius, center.y + radius),
        ],
        uvs: [[0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [1.0, 1.0]],
        triangles: [0, 2, 3, 0, 3, 1],
    }
}

#[cfg(test)]
mod tests {
    use super::quad;
    use foundation::math::Vec2;

    #[test]
    fn quad_surrounds_center() {
        let q = quad(Vec2::new(1.0, 2.0), 0.5);
        assert_eq!(q.vertices[0], Vec2::new(0.5, 1.5));
        assert_eq!(q.vertices[3], Vec2::new(1.5, 2.5));
        assert_eq!(q.triangles, [0, 2, 3, 0, 3, 1]);
    }
}
