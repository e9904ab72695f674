use foundation::Vec2;
use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerEventKind {
    Move,
    Out,
    Down,
    Up,
    Click,
}

/// Pointer input in geographic coordinates.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub kind: PointerEventKind,
    pub position: [f64; 2],
}

impl PointerEvent {
    pub fn new(kind: PointerEventKind, position: [f64; 2]) -> Self {
        Self { kind, position }
    }
}

/// Where the host delivers pointer events from its map widget.
pub trait EventPort {
    fn register(&mut self, kinds: &[PointerEventKind]);
    fn unregister(&mut self);
}

/// Geographic to planar projection supplied by the host map.
pub trait Projector {
    fn project(&self, coord: [f64; 2], zoom: Option<f64>) -> Vec2;

    fn project_path(&self, coords: &[[f64; 2]]) -> Vec<Vec2> {
        coords.iter().map(|&c| self.project(c, None)).collect()
    }
}

impl<F> Projector for F
where
    F: Fn([f64; 2], Option<f64>) -> Vec2,
{
    fn project(&self, coord: [f64; 2], zoom: Option<f64>) -> Vec2 {
        self(coord, zoom)
    }
}

/// Projection that keeps coordinates as they are.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct IdentityProjector;

impl Projector for IdentityProjector {
    fn project(&self, coord: [f64; 2], _zoom: Option<f64>) -> Vec2 {
        Vec2::from(coord)
    }
}

/// Identifies one submitted mesh across redraws.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MeshKey {
    Wellbore(usize),
    Root(usize),
    Detail(usize, String),
    Outline(usize),
    FieldFill(usize),
    FieldOutline(usize),
    Faultline(usize),
    FaultlineFill(usize),
}

/// Vertex and index buffers ready for upload. `attributes` holds
/// `attribute_size` floats per vertex.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshBuffers {
    pub vertices: Vec<[f32; 2]>,
    pub triangles: Vec<u32>,
    pub attributes: Vec<f32>,
    pub attribute_size: usize,
}

impl MeshBuffers {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len() / 3
    }
}

pub type Rgb = [f32; 3];

#[derive(Debug, Clone, PartialEq)]
pub enum ShaderParams {
    Wellbore {
        col1: Rgb,
        col2: Rgb,
        status: u8,
        completion_visible: bool,
        wellbore_visible: bool,
        visible: bool,
    },
    Root {
        col1: Rgb,
        col2: Rgb,
        active: bool,
        radius: f64,
    },
    Detail {
        color: Rgb,
        visible: bool,
    },
    Outline {
        color: Rgb,
        width: f64,
        visible: bool,
    },
    FieldFill {
        col1: Rgb,
        col2: Rgb,
        opacity: f32,
        hashed: bool,
        hash_width: f64,
    },
    Faultline {
        color: Rgb,
        alpha: f32,
    },
}

/// Consumer of generated geometry. The core never draws itself.
pub trait RenderBackend {
    fn submit(&mut self, key: MeshKey, mesh: &MeshBuffers, params: &ShaderParams, z_order: i64);
    fn remove(&mut self, key: &MeshKey);
}

pub(crate) fn to_f32(points: &[Vec2]) -> Vec<[f32; 2]> {
    points.iter().map(|p| [p.x as f32, p.y as f32]).collect()
}

#[cfg(test)]
mod tests {
    use super::{IdentityProjector, Projector};
    use foundation::Vec2;

    #[test]
    fn closures_project() {
        let shift = |c: [f64; 2], _zoom: Option<f64>| Vec2::new(c[0] + 1.0, -c[1]);
        assert_eq!(shift.project_path(&[[0.0, 1.0], [2.0, 3.0]]), vec![Vec2::new(1.0, -1.0), Vec2::new(3.0, -3.0)]);
        assert_eq!(IdentityProjector.project([4.0, 5.0], Some(3.0)), Vec2::new(4.0, 5.0));
    }
}
