use foundation::math::Vec2;
use serde::{Deserialize, Serialize};

use crate::interpolator::{LineInterpolator, SegmentPoint};

/// Per-vertex tag telling the shader which part of the ribbon it belongs to.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum VertexKind {
    Normal = 0,
    Highlighted = 1,
    Tick = 2,
}

/// Shape of the tick quads drawn at interval boundaries, as factors of the
/// ribbon thickness.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TickStyle {
    /// Half extent along the path.
    pub width_factor: f64,
    /// Half extent across the path.
    pub height_factor: f64,
}

impl Default for TickStyle {
    fn default() -> Self {
        Self {
            width_factor: 0.075,
            height_factor: 1.0,
        }
    }
}

/// Triangulated ribbon geometry.
///
/// `vertex_data` holds `(distance along path, side, normal.x, normal.y)` per
/// vertex, where side is 1 for the upper edge and 0 for the lower edge.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RibbonMesh {
    pub vertices: Vec<Vec2>,
    pub triangles: Vec<u32>,
    pub vertex_data: Vec<[f64; 4]>,
    pub kinds: Vec<VertexKind>,
}

impl RibbonMesh {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len() / 3
    }

    fn base(&self) -> u32 {
        self.vertices.len() as u32
    }

    fn append(&mut self, other: RibbonMesh) {
        let base = self.base();
        self.triangles.extend(other.triangles.iter().map(|t| t + base));
        self.vertices.extend(other.vertices);
        self.vertex_data.extend(other.vertex_data);
        self.kinds.extend(other.kinds);
    }
}

/// Builds ribbon meshes for a path with highlighted sub-intervals.
#[derive(Debug, Clone)]
pub struct RibbonBuilder<'a> {
    interp: &'a LineInterpolator,
    thickness: f64,
    tick: TickStyle,
}

impl<'a> RibbonBuilder<'a> {
    pub fn new(interp: &'a LineInterpolator, thickness: f64) -> Self {
        Self {
            interp,
            thickness,
            tick: TickStyle::default(),
        }
    }

    pub fn with_tick_style(mut self, tick: TickStyle) -> Self {
        self.tick = tick;
        self
    }

    /// Generate the ribbon. `intervals` are relative `[start, end]` pairs,
    /// sorted and non-overlapping.
    ///
    /// Output order: alternating normal/highlighted runs along the path, then
    /// one tick quad per interval boundary (a single one for intervals
    /// shorter than 0.001).
    pub fn generate(&self, intervals: &[[f64; 2]]) -> RibbonMesh {
        let mut mesh = RibbonMesh::default();

        if intervals.is_empty() {
            self.append_run(&mut mesh, 0.0, 1.0, VertexKind::Normal);
        } else {
            let mut p = 0.0;
            for &[start, end] in intervals {
                self.append_run(&mut mesh, p, start, VertexKind::Normal);
                self.append_run(&mut mesh, start, end, VertexKind::Highlighted);
                p = end;
            }
            if p < 1.0 {
                self.append_run(&mut mesh, p, 1.0, VertexKind::Normal);
            }
        }

        for &[start, end] in intervals {
            self.append_tick(&mut mesh, &self.interp.get_point(start));
            if (start - end).abs() < 0.001 {
                continue;
            }
            self.append_tick(&mut mesh, &self.interp.get_point(end));
        }

        mesh
    }

    fn append_run(&self, mesh: &mut RibbonMesh, start: f64, end: f64, kind: VertexKind) {
        let section = self.interp.get_section(start, end);
        mesh.append(ribbon_segment(&section, self.thickness, kind));
    }

    fn append_tick(&self, mesh: &mut RibbonMesh, p: &SegmentPoint) {
        // 2    3
        //
        // 0    1
        let along = p.direction * (self.thickness * self.tick.width_factor);
        let across = p.direction.rotate90() * (self.thickness * self.tick.height_factor);
        let b = mesh.base();

        mesh.vertices.extend([
            p.position - along - across,
            p.position + along - across,
            p.position - along + across,
            p.position + along + across,
        ]);
        mesh.triangles.extend([b, b + 2, b + 3, b, b + 3, b + 1]);
        mesh.kinds.extend([VertexKind::Tick; 4]);
        mesh.vertex_data.extend([
            [p.distance, 0.0, 0.0, 0.0],
            [p.distance, 0.0, 0.0, 0.0],
            [p.distance, 1.0, 0.0, 0.0],
            [p.distance, 1.0, 0.0, 0.0],
        ]);
    }
}

/// Intersection of the rays `p1 + t * d1` and `p2 + s * d2`, `None` when
/// they are parallel.
fn ray_intersection(p1: Vec2, d1: Vec2, p2: Vec2, d2: Vec2) -> Option<Vec2> {
    let denom = d1.y * d2.x - d1.x * d2.y;
    if denom.abs() < 1e-12 {
        return None;
    }
    let c = p1 - p2;
    let len = (c.x * d2.y - c.y * d2.x) / denom;
    Some(d1 * len + p1)
}

/// Constant-width strip along `points`: two vertices per sample, upper
/// first, two triangles per consecutive pair.
///
/// Interior samples use a miter join when the turn is below 90 degrees and a
/// plain perpendicular offset along the sample direction otherwise. The
/// diagonal of each quad follows the turn direction at its far edge.
pub fn ribbon_segment(points: &[SegmentPoint], thickness: f64, kind: VertexKind) -> RibbonMesh {
    let mut mesh = RibbonMesh::default();
    if points.len() < 2 {
        return mesh;
    }
    let half = thickness * 0.5;
    let push_pair = |mesh: &mut RibbonMesh, upper: Vec2, lower: Vec2, p: &SegmentPoint| {
        mesh.vertices.extend([upper, lower]);
        mesh.vertex_data.extend([
            [p.distance, 1.0, -p.direction.y, p.direction.x],
            [p.distance, 0.0, p.direction.y, -p.direction.x],
        ]);
        mesh.kinds.extend([kind, kind]);
    };

    let first = &points[0];
    let from0 = (points[1].position - first.position).rescale(half);
    push_pair(
        &mut mesh,
        first.position + from0.rotate90(),
        first.position + from0.rotate270(),
        first,
    );

    for i in 1..points.len() - 1 {
        let point = &points[i];
        let prev = points[i - 1].position;
        let cur = point.position;
        let next = points[i + 1].position;

        let to = cur - prev;
        let from = next - cur;

        let miter = if to.angle_deg(from) < 90.0 {
            let upper = ray_intersection(
                to.rotate90().rescale(half) + prev,
                to,
                from.rotate90().rescale(half) + next,
                from,
            );
            let lower = ray_intersection(
                to.rotate270().rescale(half) + prev,
                to,
                from.rotate270().rescale(half) + next,
                from,
            );
            upper.zip(lower)
        } else {
            None
        };
        let (upper, lower) = miter.unwrap_or_else(|| {
            (
                cur + point.direction.rotate90() * half,
                cur + point.direction.rotate270() * half,
            )
        });
        push_pair(&mut mesh, upper, lower, point);
        push_quad(&mut mesh, i, to.signed_angle(from));
    }

    let last = &points[points.len() - 1];
    let to_n = (last.position - points[points.len() - 2].position).rescale(half);
    push_pair(
        &mut mesh,
        last.position + to_n.rotate90(),
        last.position + to_n.rotate270(),
        last,
    );
    push_quad(&mut mesh, points.len() - 1, 0.0);

    mesh
}

/// Two triangles joining the vertex pairs of samples `i - 1` and `i`.
fn push_quad(mesh: &mut RibbonMesh, i: usize, turn: f64) {
    //  0     2
    //
    //  1     3
    let n = (i * 2) as u32;
    if turn < 0.0 {
        mesh.triangles.extend([n - 1, n - 2, n + 1, n - 2, n, n + 1]);
    } else {
        mesh.triangles.extend([n - 1, n - 2, n, n - 1, n, n + 1]);
    }
}
