use serde::{Deserialize, Serialize};

/// Planar vector in layer coordinates.
///
/// Conventions:
/// - `rotate90` turns counter-clockwise in a y-up frame: `(x, y) -> (-y, x)`.
/// - Operations on zero-length vectors never produce NaN; `normalize` returns
///   the zero vector unchanged.
#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };
    pub const UP: Vec2 = Vec2 { x: 0.0, y: 1.0 };
    pub const RIGHT: Vec2 = Vec2 { x: 1.0, y: 0.0 };
    pub const LEFT: Vec2 = Vec2 { x: -1.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn dot(self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// Z-component of the 3D cross product.
    pub fn cross(self, other: Self) -> f64 {
        self.x * other.y - self.y * other.x
    }

    pub fn magnitude(self) -> f64 {
        self.dot(self).sqrt()
    }

    pub fn distance(self, other: Self) -> f64 {
        (other - self).magnitude()
    }

    pub fn scale(self, s: f64) -> Self {
        Self::new(self.x * s, self.y * s)
    }

    pub fn normalize(self) -> Self {
        let len = self.magnitude();
        if len <= 0.0 {
            return self;
        }
        self.scale(1.0 / len)
    }

    /// Rescale to the given length, keeping direction.
    pub fn rescale(self, len: f64) -> Self {
        self.normalize().scale(len)
    }

    pub fn rotate90(self) -> Self {
        Self::new(-self.y, self.x)
    }

    pub fn rotate270(self) -> Self {
        Self::new(self.y, -self.x)
    }

    pub fn rotate(self, radians: f64) -> Self {
        let (s, c) = radians.sin_cos();
        Self::new(self.x * c - self.y * s, self.x * s + self.y * c)
    }

    /// Unsigned angle between two vectors, in degrees.
    pub fn angle_deg(self, other: Self) -> f64 {
        self.signed_angle(other).abs().to_degrees()
    }

    /// Signed angle (radians) rotating `self` onto `other`.
    pub fn signed_angle(self, other: Self) -> f64 {
        self.cross(other).atan2(self.dot(other))
    }

    /// Linear blend between two points.
    pub fn lerp(self, other: Self, t: f64) -> Self {
        Self::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
        )
    }

    /// Rotational blend: rotates `self` towards `other` by the fraction `t` of
    /// the angle between them while blending magnitudes linearly.
    pub fn lerp_rot(self, other: Self, t: f64) -> Self {
        let la = self.magnitude();
        let lb = other.magnitude();
        if la <= 0.0 || lb <= 0.0 {
            return self.lerp(other, t);
        }
        let angle = self.signed_angle(other);
        let len = la + (lb - la) * t;
        self.rotate(angle * t).rescale(len)
    }

    pub fn approx_eq(self, other: Self, epsilon: f64) -> bool {
        (self.x - other.x).abs() <= epsilon && (self.y - other.y).abs() <= epsilon
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<[f64; 2]> for Vec2 {
    fn from(a: [f64; 2]) -> Self {
        Self::new(a[0], a[1])
    }
}

impl std::ops::Add for Vec2 {
    type Output = Self;

    fn add(self, other: Self) -> Self::Output {
        Self::new(self.x + other.x, self.y + other.y)
    }
}

impl std::ops::Sub for Vec2 {
    type Output = Self;

    fn sub(self, other: Self) -> Self::Output {
        Self::new(self.x - other.x, self.y - other.y)
    }
}

impl std::ops::Mul<f64> for Vec2 {
    type Output = Self;

    fn mul(self, s: f64) -> Self::Output {
        self.scale(s)
    }
}

impl std::ops::Neg for Vec2 {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self::new(-self.x, -self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::Vec2;

    const EPS: f64 = 1e-12;

    #[test]
    fn vec2_add_sub() {
        let a = Vec2::new(1.0, 2.0);
        let b = Vec2::new(-0.5, 4.0);
        assert_eq!(a + b, Vec2::new(0.5, 6.0));
        assert_eq!(a - b, Vec2::new(1.5, -2.0));
        assert_eq!(-a, Vec2::new(-1.0, -2.0));
    }

    #[test]
    fn normalize_keeps_zero_vector() {
        assert_eq!(Vec2::ZERO.normalize(), Vec2::ZERO);
        let n = Vec2::new(3.0, 4.0).normalize();
        assert!((n.magnitude() - 1.0).abs() < EPS);
    }

    #[test]
    fn rotations_are_perpendicular() {
        let v = Vec2::new(2.0, 1.0);
        assert_eq!(v.rotate90(), Vec2::new(-1.0, 2.0));
        assert_eq!(v.rotate270(), Vec2::new(1.0, -2.0));
        assert_eq!(v.dot(v.rotate90()), 0.0);
    }

    #[test]
    fn signed_angle_sign_follows_turn() {
        assert!(Vec2::RIGHT.signed_angle(Vec2::UP) > 0.0);
        assert!(Vec2::UP.signed_angle(Vec2::RIGHT) < 0.0);
        assert!((Vec2::RIGHT.angle_deg(Vec2::UP) - 90.0).abs() < 1e-9);
    }

    #[test]
    fn lerp_rot_halfway_bisects() {
        let mid = Vec2::RIGHT.lerp_rot(Vec2::UP, 0.5).normalize();
        let expected = Vec2::new(1.0, 1.0).normalize();
        assert!(mid.approx_eq(expected, 1e-9));

        // Magnitude differences do not skew the bisector.
        let mid = Vec2::new(4.0, 0.0).lerp_rot(Vec2::new(0.0, 1.0), 0.5).normalize();
        assert!(mid.approx_eq(expected, 1e-9));
    }

    #[test]
    fn lerp_rot_endpoints() {
        let a = Vec2::new(1.0, 0.0);
        let b = Vec2::new(0.0, 2.0);
        assert!(a.lerp_rot(b, 0.0).approx_eq(a, 1e-9));
        assert!(a.lerp_rot(b, 1.0).approx_eq(b, 1e-9));
    }
}
