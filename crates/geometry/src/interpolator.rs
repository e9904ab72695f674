use foundation::math::Vec2;

use crate::error::{GeometryError, Result};

/// Precomputed sample of an interpolated path.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PathPoint {
    pub position: Vec2,
    /// Smoothed unit direction at the sample.
    pub direction: Vec2,
    /// Arc length from the first sample.
    pub distance: f64,
    /// `distance / length`, in `[0, 1]`.
    pub relative: f64,
}

/// Point produced by a query along the path.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SegmentPoint {
    pub position: Vec2,
    pub direction: Vec2,
    pub distance: f64,
}

impl SegmentPoint {
    fn lerp(prev: &PathPoint, cur: &PathPoint, frac: f64) -> Self {
        SegmentPoint {
            position: prev.position.lerp(cur.position, frac),
            direction: prev.direction.lerp_rot(cur.direction, frac).normalize(),
            distance: prev.distance * (1.0 - frac) + cur.distance * frac,
        }
    }
}

impl From<&PathPoint> for SegmentPoint {
    fn from(p: &PathPoint) -> Self {
        SegmentPoint {
            position: p.position,
            direction: p.direction,
            distance: p.distance,
        }
    }
}

/// Arc-length parameterization of an ordered point sequence.
///
/// Paths whose points all lie within `radius` of the first one are treated as
/// a single point: every query returns the first point pointing up with zero
/// distance.
#[derive(Debug, Clone, PartialEq)]
pub struct LineInterpolator {
    path: Vec<PathPoint>,
    length: f64,
    single_point: bool,
}

impl LineInterpolator {
    pub fn new(points: &[Vec2], radius: f64) -> Result<Self> {
        let root = *points.first().ok_or(GeometryError::EmptyPath)?;

        let mut path = Vec::with_capacity(points.len());
        path.push(PathPoint {
            position: root,
            direction: if points.len() >= 2 {
                (points[1] - root).normalize()
            } else {
                Vec2::RIGHT
            },
            distance: 0.0,
            relative: 0.0,
        });

        let mut length = 0.0;
        let mut single_point = true;
        for i in 1..points.len() {
            let point = points[i];
            length += point.distance(points[i - 1]);
            path.push(PathPoint {
                position: point,
                direction: direction_at(points, i),
                distance: length,
                relative: 0.0,
            });
            if point.distance(root) > radius {
                single_point = false;
            }
        }

        for p in path.iter_mut().skip(1) {
            p.relative = if length == 0.0 { 0.0 } else { p.distance / length };
        }

        Ok(Self {
            path,
            length,
            single_point,
        })
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn is_single_point(&self) -> bool {
        self.single_point
    }

    pub fn path(&self) -> &[PathPoint] {
        &self.path
    }

    pub fn first(&self) -> &PathPoint {
        &self.path[0]
    }

    pub fn last(&self) -> &PathPoint {
        &self.path[self.path.len() - 1]
    }

    fn collapsed(&self) -> SegmentPoint {
        SegmentPoint {
            position: self.first().position,
            direction: Vec2::UP,
            distance: 0.0,
        }
    }

    fn end(&self) -> SegmentPoint {
        SegmentPoint {
            distance: self.length,
            ..SegmentPoint::from(self.last())
        }
    }

    /// Blend between samples `base` and `base + 1` at `relative`.
    fn between(&self, base: usize, relative: f64) -> SegmentPoint {
        let prev = &self.path[base];
        let Some(cur) = self.path.get(base + 1) else {
            return SegmentPoint::from(prev);
        };
        let span = cur.relative - prev.relative;
        let frac = if span > 0.0 {
            (relative - prev.relative) / span
        } else {
            0.0
        };
        SegmentPoint::lerp(prev, cur, frac)
    }

    /// Point at `relative` arc length. Values outside `[0, 1)` clamp to the
    /// first or last sample.
    pub fn get_point(&self, relative: f64) -> SegmentPoint {
        if self.single_point {
            return self.collapsed();
        }
        if relative < 0.0 {
            return SegmentPoint {
                distance: 0.0,
                ..SegmentPoint::from(self.first())
            };
        }
        if relative >= 1.0 {
            return self.end();
        }
        self.between(self.closest_point_below(relative), relative)
    }

    /// Interpolated boundary at `start`, every sample strictly inside, then the
    /// interpolated boundary at `end`.
    pub fn get_section(&self, start: f64, end: f64) -> Vec<SegmentPoint> {
        if self.single_point {
            return vec![self.collapsed(); 2];
        }
        if start >= 1.0 {
            return vec![self.end(); 2];
        }

        let start = start.max(0.0);
        let base = self.closest_point_below(start);
        let mut points = vec![self.between(base, start)];

        for i in (base + 1)..self.path.len() {
            let cur = &self.path[i];
            if cur.relative >= end {
                points.push(self.between(i - 1, end));
                break;
            }
            points.push(SegmentPoint::from(cur));
        }
        points
    }

    /// Index of the last sample whose relative position is at or before
    /// `relative`, found by halving the search range.
    pub fn closest_point_below(&self, relative: f64) -> usize {
        let mut base = 0;
        let mut range = self.path.len();
        let mut idx = range / 2;
        while range > 1 {
            if relative < self.path[idx].relative {
                range /= 2;
            } else {
                base += range / 2;
                range = range.div_ceil(2);
            }
            idx = base + range / 2;
        }
        base
    }

    pub fn get_point_from_start(&self, distance: f64) -> SegmentPoint {
        self.get_point(distance / self.length)
    }

    pub fn get_point_from_end(&self, distance: f64) -> SegmentPoint {
        self.get_point(1.0 - distance / self.length)
    }

    /// `resolution + 1` evenly spaced points covering `width` world units
    /// starting at `relative`.
    pub fn get_range_from_start(&self, relative: f64, width: f64, resolution: usize) -> Vec<SegmentPoint> {
        let relative_end = relative + width / self.length;
        let step = (relative_end - relative) / resolution.max(1) as f64;
        (0..=resolution)
            .map(|i| self.get_point(relative + step * i as f64))
            .collect()
    }
}

fn direction_at(points: &[Vec2], idx: usize) -> Vec2 {
    let end = points.len() - 1;
    if idx == 0 {
        (points[1] - points[0]).normalize()
    } else if idx == end {
        (points[end] - points[end - 1]).normalize()
    } else {
        let cur = points[idx];
        let to = cur - points[idx - 1];
        let from = points[idx + 1] - cur;
        to.lerp_rot(from, 0.5).normalize()
    }
}

#[cfg(test)]
mod tests {
    use super::LineInterpolator;
    use crate::error::GeometryError;
    use foundation::math::Vec2;

    const EPS: f64 = 1e-9;

    fn zigzag() -> LineInterpolator {
        let pts = [
            Vec2::new(0.0, 0.0),
            Vec2::new(3.0, 4.0),
            Vec2::new(6.0, 0.0),
            Vec2::new(6.0, -2.0),
            Vec2::new(10.0, -2.0),
        ];
        LineInterpolator::new(&pts, 0.1).unwrap()
    }

    #[test]
    fn empty_path_is_an_error() {
        assert_eq!(LineInterpolator::new(&[], 1.0), Err(GeometryError::EmptyPath));
    }

    #[test]
    fn measures_length_and_relative_positions() {
        let l = zigzag();
        assert!((l.length() - 16.0).abs() < EPS);
        let rel: Vec<f64> = l.path().iter().map(|p| p.relative).collect();
        assert_eq!(rel, vec![0.0, 5.0 / 16.0, 10.0 / 16.0, 12.0 / 16.0, 1.0]);
        assert!(!l.is_single_point());
    }

    #[test]
    fn endpoints_match_input() {
        let l = zigzag();
        assert_eq!(l.get_point(0.0).position, Vec2::new(0.0, 0.0));
        assert_eq!(l.get_point(1.0).position, Vec2::new(10.0, -2.0));
        assert_eq!(l.get_point(1.0).distance, 16.0);
        assert_eq!(l.get_point(-0.5).distance, 0.0);
        assert_eq!(l.get_point(7.0).position, Vec2::new(10.0, -2.0));
    }

    #[test]
    fn distance_is_monotonic() {
        let l = zigzag();
        let mut prev = -1.0;
        for i in 0..=200 {
            let d = l.get_point(i as f64 / 200.0).distance;
            assert!(d >= prev, "distance decreased at step {i}");
            prev = d;
        }
    }

    #[test]
    fn get_point_interpolates_inside_segment() {
        let l = zigzag();
        let p = l.get_point(2.5 / 16.0);
        assert!(p.position.approx_eq(Vec2::new(1.5, 2.0), EPS));
        assert!((p.distance - 2.5).abs() < EPS);
        assert!((p.direction.magnitude() - 1.0).abs() < EPS);
    }

    #[test]
    fn closest_point_below_brackets() {
        let l = zigzag();
        assert_eq!(l.closest_point_below(0.0), 0);
        assert_eq!(l.closest_point_below(0.2), 0);
        assert_eq!(l.closest_point_below(5.0 / 16.0), 1);
        assert_eq!(l.closest_point_below(0.7), 2);
        assert_eq!(l.closest_point_below(0.99), 3);
    }

    #[test]
    fn full_section_preserves_length() {
        let l = zigzag();
        let section = l.get_section(0.0, 1.0);
        assert_eq!(section.len(), 5);
        let total: f64 = section
            .windows(2)
            .map(|w| w[0].position.distance(w[1].position))
            .sum();
        assert!((total - l.length()).abs() < EPS);
    }

    #[test]
    fn section_includes_only_inner_samples() {
        let l = zigzag();
        let section = l.get_section(0.25, 0.7);
        // start, samples 1 and 2, end
        assert_eq!(section.len(), 4);
        assert!((section[0].distance - 4.0).abs() < EPS);
        assert_eq!(section[1].position, Vec2::new(3.0, 4.0));
        assert_eq!(section[2].position, Vec2::new(6.0, 0.0));
        assert!((section[3].distance - 0.7 * 16.0).abs() < EPS);
    }

    #[test]
    fn section_past_end_repeats_last() {
        let l = zigzag();
        let section = l.get_section(1.0, 1.0);
        assert_eq!(section.len(), 2);
        assert_eq!(section[0], section[1]);
        assert_eq!(section[0].distance, 16.0);
    }

    #[test]
    fn single_point_collapses_queries() {
        let pts = [Vec2::new(2.0, 2.0), Vec2::new(2.05, 2.0), Vec2::new(2.0, 2.08)];
        let l = LineInterpolator::new(&pts, 0.1).unwrap();
        assert!(l.is_single_point());
        let p = l.get_point(0.6);
        assert_eq!(p.position, Vec2::new(2.0, 2.0));
        assert_eq!(p.direction, Vec2::UP);
        assert_eq!(p.distance, 0.0);
        assert_eq!(l.get_section(0.0, 1.0).len(), 2);

        let lone = LineInterpolator::new(&[Vec2::new(1.0, 1.0)], 0.0).unwrap();
        assert!(lone.is_single_point());
        assert_eq!(lone.first().direction, Vec2::RIGHT);
    }

    #[test]
    fn distance_helpers_delegate() {
        let l = zigzag();
        assert!(l.get_point_from_start(5.0).position.approx_eq(Vec2::new(3.0, 4.0), EPS));
        assert!(l.get_point_from_end(4.0).position.approx_eq(Vec2::new(6.0, -2.0), EPS));

        let range = l.get_range_from_start(0.0, 5.0, 10);
        assert_eq!(range.len(), 11);
        assert!(range[10].position.approx_eq(Vec2::new(3.0, 4.0), EPS));
        assert!((range[5].distance - 2.5).abs() < EPS);
    }
}
