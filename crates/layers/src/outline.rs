use std::collections::{BTreeMap, BTreeSet};

use foundation::{Vec2, inverse_lerp, lerp};
use geometry::{LineMesh, polygon_outline, simple_line};
use runtime::RedrawRequest;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::host::{MeshBuffers, MeshKey, Projector, RenderBackend, ShaderParams, to_f32};
use crate::layer::{LayerId, OverlayLayer};

/// Rings whose ends lie this close are treated as closed.
const CLOSED_RING_EPSILON: f64 = 1e-6;

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OutlineConfig {
    /// Line width before zoom scaling.
    pub base_width: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Extra width at `max_zoom`.
    pub min_extra_width: f64,
    /// Extra width at `min_zoom`.
    pub max_extra_width: f64,
}

impl Default for OutlineConfig {
    fn default() -> Self {
        Self {
            base_width: 0.1,
            min_zoom: 0.0,
            max_zoom: 18.0,
            min_extra_width: 0.1,
            max_extra_width: 10.0,
        }
    }
}

impl OutlineConfig {
    /// Extra width at `zoom`, shrinking linearly as the map zooms in.
    pub fn extra_width(&self, zoom: f64) -> f64 {
        let t = inverse_lerp(self.min_zoom, self.max_zoom, zoom);
        lerp(self.max_extra_width, self.min_extra_width, t)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OutlineMeta {
    pub name: String,
    pub stroke: [f32; 3],
    pub fill: String,
    pub default_on: bool,
    #[serde(rename = "type")]
    pub kind: String,
}

/// Named collection of rings drawn with one color.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutlineCollection {
    pub coordinates: Vec<Vec<[f64; 2]>>,
    pub meta: OutlineMeta,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct OutlineStyle {
    pub color: [f32; 3],
    pub width: f64,
    pub visible: bool,
}

#[derive(Debug, Clone)]
struct Outline {
    collection: String,
    mesh: LineMesh,
}

/// Contour lines, such as fluid contacts, drawn at a zoom-dependent width.
pub struct OutlineLayer {
    id: LayerId,
    config: OutlineConfig,
    extra_width: f64,
    styles: BTreeMap<String, OutlineStyle>,
    outlines: Vec<Outline>,
    projector: Box<dyn Projector>,
    redraw: RedrawRequest,
    submitted: usize,
}

impl std::fmt::Debug for OutlineLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutlineLayer")
            .field("id", &self.id)
            .field("config", &self.config)
            .field("outlines", &self.outlines.len())
            .finish_non_exhaustive()
    }
}

impl OutlineLayer {
    pub fn new(id: LayerId, config: OutlineConfig, projector: impl Projector + 'static) -> Self {
        Self {
            id,
            config,
            extra_width: 1.0,
            styles: BTreeMap::new(),
            outlines: Vec::new(),
            projector: Box::new(projector),
            redraw: RedrawRequest::new(),
            submitted: 0,
        }
    }

    pub fn style(&self, name: &str) -> Option<&OutlineStyle> {
        self.styles.get(name)
    }

    pub fn outline_count(&self) -> usize {
        self.outlines.len()
    }

    pub fn extra_width(&self) -> f64 {
        self.extra_width
    }

    /// Replace the drawn outlines. Rings ending on their first point become
    /// closed outlines, others open lines.
    pub fn set(&mut self, collections: &[OutlineCollection]) {
        self.clear();
        for collection in collections {
            let name = collection.meta.name.clone();
            self.styles.insert(
                name.clone(),
                OutlineStyle {
                    color: collection.meta.stroke,
                    width: self.extra_width,
                    visible: true,
                },
            );
            for ring in &collection.coordinates {
                let Some(mesh) = self.build_ring(&name, ring) else {
                    continue;
                };
                self.outlines.push(Outline {
                    collection: name.clone(),
                    mesh,
                });
            }
        }
        self.redraw.request();
    }

    fn build_ring(&self, name: &str, ring: &[[f64; 2]]) -> Option<LineMesh> {
        let mut projected: Vec<Vec2> = self.projector.project_path(ring);
        let (first, last) = (*projected.first()?, *projected.last()?);
        if first.approx_eq(last, CLOSED_RING_EPSILON) {
            projected.pop();
            if projected.len() <= 2 {
                warn!(collection = name, points = projected.len(), "skipping polygon outline");
                return None;
            }
            Some(polygon_outline(&projected, self.config.base_width))
        } else {
            if projected.len() <= 1 {
                warn!(collection = name, points = projected.len(), "skipping line outline");
                return None;
            }
            Some(simple_line(&projected, self.config.base_width))
        }
    }

    /// Show only the collections in `names`.
    pub fn set_visible_layers(&mut self, names: &[&str]) {
        for (name, style) in &mut self.styles {
            style.visible = names.contains(&name.as_str());
        }
        self.redraw.request();
    }

    pub fn clear(&mut self) {
        self.outlines.clear();
        self.styles.clear();
        self.redraw.request();
    }

    /// Submit every outline when a redraw is pending.
    pub fn flush(&mut self, backend: &mut dyn RenderBackend) -> bool {
        if !self.redraw.flush() {
            return false;
        }
        for (i, outline) in self.outlines.iter().enumerate() {
            let Some(style) = self.styles.get(&outline.collection) else {
                continue;
            };
            let mesh = MeshBuffers {
                vertices: to_f32(&outline.mesh.vertices),
                triangles: outline.mesh.triangles.clone(),
                attributes: outline
                    .mesh
                    .normals
                    .iter()
                    .flat_map(|n| [n.x as f32, n.y as f32])
                    .collect(),
                attribute_size: 2,
            };
            let params = ShaderParams::Outline {
                color: style.color,
                width: style.width,
                visible: style.visible,
            };
            backend.submit(MeshKey::Outline(i), &mesh, &params, 0);
        }
        let stale: BTreeSet<usize> = (self.outlines.len()..self.submitted).collect();
        for i in stale {
            backend.remove(&MeshKey::Outline(i));
        }
        self.submitted = self.outlines.len();
        true
    }
}

impl OverlayLayer for OutlineLayer {
    fn id(&self) -> LayerId {
        self.id
    }

    fn resize(&mut self, zoom: f64) {
        self.extra_width = self.config.extra_width(zoom);
        for style in self.styles.values_mut() {
            style.width = self.extra_width;
        }
        self.redraw.request();
    }
}

#[cfg(test)]
mod tests {
    use super::{OutlineCollection, OutlineConfig, OutlineLayer, OutlineMeta};
    use crate::host::IdentityProjector;
    use crate::layer::{LayerId, OverlayLayer};

    fn collection(name: &str, coordinates: Vec<Vec<[f64; 2]>>) -> OutlineCollection {
        OutlineCollection {
            coordinates,
            meta: OutlineMeta {
                name: name.into(),
                stroke: [0.0, 0.0, 1.0],
                ..OutlineMeta::default()
            },
        }
    }

    fn layer() -> OutlineLayer {
        OutlineLayer::new(LayerId(2), OutlineConfig::default(), IdentityProjector)
    }

    #[test]
    fn closed_and_open_rings() {
        let mut layer = layer();
        let square = vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0], [0.0, 0.0]];
        let open = vec![[5.0, 5.0], [6.0, 5.0], [7.0, 6.0]];
        layer.set(&[collection("OWC", vec![square, open])]);
        assert_eq!(layer.outline_count(), 2);
        // Closed ring: four quads, three joints and the closing patch.
        assert_eq!(layer.outlines[0].mesh.triangle_count(), 12);
        assert_eq!(layer.outlines[1].mesh.vertex_count(), 8);
    }

    #[test]
    fn degenerate_rings_are_skipped() {
        let mut layer = layer();
        let closed_pair = vec![[0.0, 0.0], [1.0, 0.0], [0.0, 0.0]];
        let lone = vec![[3.0, 3.0]];
        layer.set(&[collection("GOC", vec![closed_pair, lone, vec![]])]);
        assert_eq!(layer.outline_count(), 0);
        assert!(layer.style("GOC").is_some());
    }

    #[test]
    fn visible_layers_and_resize() {
        let mut layer = layer();
        let line = vec![[0.0, 0.0], [1.0, 1.0]];
        layer.set(&[collection("OWC", vec![line.clone()]), collection("GOC", vec![line])]);
        layer.set_visible_layers(&["GOC"]);
        assert!(!layer.style("OWC").unwrap().visible);
        assert!(layer.style("GOC").unwrap().visible);

        layer.resize(0.0);
        assert_eq!(layer.style("OWC").unwrap().width, 10.0);
        layer.resize(18.0);
        assert!((layer.extra_width() - 0.1).abs() < 1e-12);
        layer.resize(9.0);
        assert!((layer.style("GOC").unwrap().width - 5.05).abs() < 1e-12);
    }

    #[test]
    fn parses_outline_json() {
        let json = r#"{"coordinates":[[[1,2],[3,4]]],"meta":{"name":"OWC","stroke":[1,0,0],"type":"contact","defaultOn":true}}"#;
        let c: OutlineCollection = serde_json::from_str(json).unwrap();
        assert_eq!(c.meta.kind, "contact");
        assert!(c.meta.default_on);
        assert_eq!(c.coordinates[0].len(), 2);
    }
}
