use serde::{Deserialize, Serialize};

use crate::math::Vec2;

/// Axis-aligned bounding box given by its corners.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Aabb2 {
    pub min: [f64; 2],
    pub max: [f64; 2],
}

impl Aabb2 {
    pub fn new(min: [f64; 2], max: [f64; 2]) -> Self {
        Aabb2 { min, max }
    }

    /// Tightest box around the given points, `None` when empty.
    pub fn from_points(points: &[Vec2]) -> Option<Self> {
        let first = points.first()?;
        let mut b = Aabb2::new([first.x, first.y], [first.x, first.y]);
        for p in &points[1..] {
            b.min[0] = b.min[0].min(p.x);
            b.min[1] = b.min[1].min(p.y);
            b.max[0] = b.max[0].max(p.x);
            b.max[1] = b.max[1].max(p.y);
        }
        Some(b)
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min[0] && p.x <= self.max[0] && p.y >= self.min[1] && p.y <= self.max[1]
    }
}

/// Rectangle with origin at its minimum corner, used for label boxes.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Rect {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Inclusive containment test.
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }

    /// Smallest rectangle covering both.
    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Rect::new(
            x,
            y,
            self.right().max(other.right()) - x,
            self.bottom().max(other.bottom()) - y,
        )
    }
}

impl From<Rect> for Aabb2 {
    fn from(r: Rect) -> Self {
        Aabb2::new([r.x, r.y], [r.right(), r.bottom()])
    }
}
