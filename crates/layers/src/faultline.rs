use std::collections::BTreeSet;

use foundation::Vec2;
use geometry::{LineMesh, PolygonMesh, polygon_outline, simple_line, triangulate};
use runtime::RedrawRequest;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::host::{MeshBuffers, MeshKey, Projector, RenderBackend, Rgb, ShaderParams, to_f32};
use crate::layer::{LayerId, OverlayLayer};

/// Paths whose projected ends lie this close are drawn as filled polygons.
const CLOSED_PATH_EPSILON: f64 = 1e-6;

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FaultlineConfig {
    /// `0xRRGGBB`.
    pub color: u32,
    pub alpha: f32,
    pub outline_width: f64,
}

impl Default for FaultlineConfig {
    fn default() -> Self {
        Self {
            color: 0x727D88,
            alpha: 1.0,
            outline_width: 0.125,
        }
    }
}

impl FaultlineConfig {
    pub fn rgb(&self) -> Rgb {
        let channel = |shift: u32| ((self.color >> shift) & 0xFF) as f32 / 255.0;
        [channel(16), channel(8), channel(0)]
    }
}

/// One fault segment as delivered by the fault model service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FaultlineData {
    pub coordinates: Vec<[f64; 2]>,
    pub geometry: String,
    pub model_guid: String,
    #[serde(rename = "segID")]
    pub seg_id: i64,
    pub source: String,
    pub source_file_name: String,
}

#[derive(Debug, Clone)]
pub enum FaultlineShape {
    /// Open trace.
    Line(LineMesh),
    /// Closed trace: filled area with its rim.
    Polygon { fill: PolygonMesh, outline: LineMesh },
}

impl FaultlineShape {
    pub fn is_line(&self) -> bool {
        matches!(self, FaultlineShape::Line(_))
    }
}

/// Fault traces drawn in a single color.
pub struct FaultlineLayer {
    id: LayerId,
    config: FaultlineConfig,
    shapes: Vec<FaultlineShape>,
    projector: Box<dyn Projector>,
    redraw: RedrawRequest,
    submitted: BTreeSet<MeshKey>,
}

impl std::fmt::Debug for FaultlineLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FaultlineLayer")
            .field("id", &self.id)
            .field("config", &self.config)
            .field("shapes", &self.shapes.len())
            .finish_non_exhaustive()
    }
}

impl FaultlineLayer {
    pub fn new(id: LayerId, config: FaultlineConfig, projector: impl Projector + 'static) -> Self {
        Self {
            id,
            config,
            shapes: Vec::new(),
            projector: Box::new(projector),
            redraw: RedrawRequest::new(),
            submitted: BTreeSet::new(),
        }
    }

    pub fn config(&self) -> &FaultlineConfig {
        &self.config
    }

    pub fn shapes(&self) -> &[FaultlineShape] {
        &self.shapes
    }

    /// Replace the drawn faults. Returns how many were drawn as open lines.
    pub fn set(&mut self, data: &[FaultlineData]) -> usize {
        self.clear();
        let mut lines = 0;
        for fault in data {
            let projected = self.projector.project_path(&fault.coordinates);
            let Some(shape) = self.build(fault.seg_id, projected) else {
                continue;
            };
            if shape.is_line() {
                lines += 1;
            }
            self.shapes.push(shape);
        }
        if lines > 0 {
            info!(lines, "drawing faultline polygons as lines");
        }
        lines
    }

    fn build(&self, seg_id: i64, mut points: Vec<Vec2>) -> Option<FaultlineShape> {
        let width = self.config.outline_width;
        let (first, last) = (*points.first()?, *points.last()?);
        if !first.approx_eq(last, CLOSED_PATH_EPSILON) {
            return Some(FaultlineShape::Line(simple_line(&points, width)));
        }

        points.pop();
        if points.len() < 3 {
            warn!(seg_id, points = points.len(), "skipping degenerate faultline polygon");
            return None;
        }
        match triangulate(&points) {
            Ok(fill) => Some(FaultlineShape::Polygon {
                outline: polygon_outline(&points, width),
                fill,
            }),
            Err(err) => {
                warn!(seg_id, error = %err, "skipping faultline polygon");
                None
            }
        }
    }

    pub fn clear(&mut self) {
        self.shapes.clear();
        self.redraw.request();
    }

    /// Submit every shape when a redraw is pending; meshes of earlier sets
    /// that no longer exist are removed.
    pub fn flush(&mut self, backend: &mut dyn RenderBackend) -> bool {
        if !self.redraw.flush() {
            return false;
        }
        let params = ShaderParams::Faultline {
            color: self.config.rgb(),
            alpha: self.config.alpha,
        };
        let mut current = BTreeSet::new();
        for (i, shape) in self.shapes.iter().enumerate() {
            let line = match shape {
                FaultlineShape::Line(line) => line,
                FaultlineShape::Polygon { fill, outline } => {
                    let mesh = MeshBuffers {
                        vertices: to_f32(&fill.vertices),
                        triangles: fill.triangles.iter().map(|&t| t as u32).collect(),
                        attributes: Vec::new(),
                        attribute_size: 0,
                    };
                    backend.submit(MeshKey::FaultlineFill(i), &mesh, &params, 0);
                    current.insert(MeshKey::FaultlineFill(i));
                    outline
                }
            };
            let mesh = MeshBuffers {
                vertices: to_f32(&line.vertices),
                triangles: line.triangles.clone(),
                attributes: line.normals.iter().flat_map(|n| [n.x as f32, n.y as f32]).collect(),
                attribute_size: 2,
            };
            backend.submit(MeshKey::Faultline(i), &mesh, &params, 1);
            current.insert(MeshKey::Faultline(i));
        }
        for key in self.submitted.difference(&current) {
            backend.remove(key);
        }
        self.submitted = current;
        true
    }
}

impl OverlayLayer for FaultlineLayer {
    fn id(&self) -> LayerId {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::{FaultlineConfig, FaultlineData, FaultlineLayer, FaultlineShape};
    use crate::host::{IdentityProjector, MeshBuffers, MeshKey, RenderBackend, ShaderParams};
    use crate::layer::LayerId;
    use pretty_assertions::assert_eq;

    fn fault(coordinates: Vec<[f64; 2]>) -> FaultlineData {
        FaultlineData {
            coordinates,
            ..FaultlineData::default()
        }
    }

    fn layer() -> FaultlineLayer {
        FaultlineLayer::new(LayerId(4), FaultlineConfig::default(), IdentityProjector)
    }

    fn square(close: [f64; 2]) -> Vec<[f64; 2]> {
        vec![[0.0, 0.0], [2.0, 0.0], [2.0, 2.0], [0.0, 2.0], close]
    }

    #[derive(Default)]
    struct Meshes(BTreeMap<MeshKey, ShaderParams>);

    impl RenderBackend for Meshes {
        fn submit(&mut self, key: MeshKey, _mesh: &MeshBuffers, params: &ShaderParams, _z_order: i64) {
            self.0.insert(key, params.clone());
        }

        fn remove(&mut self, key: &MeshKey) {
            self.0.remove(key);
        }
    }

    #[test]
    fn open_traces_are_lines_and_closed_ones_polygons() {
        let mut layer = layer();
        let lines = layer.set(&[
            fault(vec![[0.0, 0.0], [1.0, 1.0], [3.0, 1.0]]),
            fault(square([0.0, 0.0])),
        ]);
        assert_eq!(lines, 1);
        assert_eq!(layer.shapes().len(), 2);
        match &layer.shapes()[0] {
            FaultlineShape::Line(line) => assert_eq!(line.vertex_count(), 8),
            other => panic!("expected a line, got {other:?}"),
        }
        match &layer.shapes()[1] {
            FaultlineShape::Polygon { fill, outline } => {
                assert_eq!(fill.vertices.len(), 4);
                assert_eq!(fill.triangles.len(), 6);
                assert!(outline.triangle_count() > 0);
            }
            other => panic!("expected a polygon, got {other:?}"),
        }
    }

    #[test]
    fn closure_tolerance_is_one_micro_unit() {
        let mut layer = layer();
        let lines = layer.set(&[
            fault(square([5e-7, -5e-7])),
            fault(square([1e-5, 0.0])),
        ]);
        assert_eq!(lines, 1);
        assert!(!layer.shapes()[0].is_line());
        assert!(layer.shapes()[1].is_line());
    }

    #[test]
    fn degenerate_traces_are_skipped() {
        let mut layer = layer();
        let lines = layer.set(&[
            fault(vec![]),
            fault(vec![[1.0, 1.0]]),
            fault(vec![[0.0, 0.0], [1.0, 0.0], [0.0, 0.0]]),
        ]);
        assert_eq!(lines, 0);
        assert!(layer.shapes().is_empty());
    }

    #[test]
    fn setting_again_replaces_previous_meshes() {
        let mut layer = layer();
        let mut backend = Meshes::default();
        layer.set(&[fault(square([0.0, 0.0])), fault(vec![[0.0, 0.0], [4.0, 4.0]])]);
        assert!(layer.flush(&mut backend));
        assert_eq!(
            backend.0.keys().cloned().collect::<Vec<_>>(),
            vec![MeshKey::Faultline(0), MeshKey::Faultline(1), MeshKey::FaultlineFill(0)]
        );

        layer.set(&[fault(vec![[9.0, 9.0], [8.0, 8.0]])]);
        assert_eq!(layer.shapes().len(), 1);
        assert!(layer.flush(&mut backend));
        assert_eq!(backend.0.keys().cloned().collect::<Vec<_>>(), vec![MeshKey::Faultline(0)]);

        layer.clear();
        assert!(layer.flush(&mut backend));
        assert!(backend.0.is_empty());
        assert!(!layer.flush(&mut backend));
    }

    #[test]
    fn config_defaults_and_color() {
        let config: FaultlineConfig = serde_json::from_str(r#"{"alpha":0.5}"#).unwrap();
        assert_eq!(config.color, 0x727D88);
        assert_eq!(config.outline_width, 0.125);
        assert_eq!(config.alpha, 0.5);
        let [r, g, b] = FaultlineConfig::default().rgb();
        assert_eq!((r * 255.0).round(), 114.0);
        assert_eq!((g * 255.0).round(), 125.0);
        assert_eq!((b * 255.0).round(), 136.0);
    }

    #[test]
    fn parses_fault_records() {
        let json = r#"{"coordinates":[[60.1,2.5],[60.2,2.6]],"segID":42,"modelGuid":"m-1","source":"fm"}"#;
        let data: FaultlineData = serde_json::from_str(json).unwrap();
        assert_eq!(data.seg_id, 42);
        assert_eq!(data.model_guid, "m-1");
        assert_eq!(data.coordinates.len(), 2);
    }
}
