use std::collections::HashMap;

use foundation::{Vec2, clamp01};
use geometry::{LineMesh, PolygonMesh, center_of_mass, polygon_outline, triangulate};
use runtime::RedrawRequest;
use serde::{Deserialize, Serialize};
use spatial::TriangleDictionary;
use tracing::{debug, warn};

use crate::error::Result;
use crate::host::{
    EventPort, MeshBuffers, MeshKey, PointerEvent, PointerEventKind, Projector, RenderBackend, Rgb,
    ShaderParams, to_f32,
};
use crate::layer::{LayerId, OverlayLayer};

const RED: Rgb = [0.8, 0.0, 0.0];
const GREEN: Rgb = [0.133, 0.6, 0.133];
const PINK: Rgb = [1.0, 0.753, 0.796];
const GRAY: Rgb = [0.6, 0.6, 0.6];
const OUTLINE_RED: Rgb = [0.6, 0.0, 0.0];
const OUTLINE_GRAY: Rgb = [0.5, 0.5, 0.5];

const HIGHLIGHT_FILL: (Rgb, Rgb) = ([0.5, 0.0, 0.5], [0.25, 0.0, 0.25]);
const HIGHLIGHT_OUTLINE: Rgb = [0.35, 0.0, 0.35];
const HIGHLIGHT_Z_BOOST: i64 = 10_000;

const OUTLINE_WIDTH: f64 = 0.15;
/// Cell resolution of the polygon index, as decimals.
const INDEX_DECIMALS: f64 = 1.2;

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FieldConfig {
    pub initial_hash: f64,
    pub min_hash: f64,
    pub max_hash: f64,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            initial_hash: 1.0,
            min_hash: 0.0,
            max_hash: f64::INFINITY,
        }
    }
}

/// GeoJSON geometry of a field record, in `[long, lat]` order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "coordinates")]
pub enum FieldGeometry {
    Polygon(Vec<Vec<[f64; 2]>>),
    MultiPolygon(Vec<Vec<Vec<[f64; 2]>>>),
}

impl FieldGeometry {
    /// Every ring, multipolygons flattened in order.
    pub fn rings(&self) -> Vec<&[[f64; 2]]> {
        match self {
            FieldGeometry::Polygon(rings) => rings.iter().map(Vec::as_slice).collect(),
            FieldGeometry::MultiPolygon(polygons) => polygons
                .iter()
                .flat_map(|rings| rings.iter().map(Vec::as_slice))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FieldProperties {
    pub label: String,
    pub discname: String,
    pub group: i64,
    pub guid: Option<u64>,
    pub hctype: String,
    pub lat: f64,
    pub long: f64,
    pub polygon_id: i64,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    #[serde(rename = "type", default)]
    pub kind: String,
    pub geometry: FieldGeometry,
    pub properties: FieldProperties,
}

/// Colors of a field polygon, picked from its hydrocarbon type.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FieldStyle {
    pub fill1: Rgb,
    pub fill2: Rgb,
    pub opacity: f32,
    pub outline: Rgb,
    pub hashed: bool,
}

impl FieldStyle {
    /// Fields without a guid are grey; the rest default to oil green.
    pub fn for_field(guid: Option<u64>, hctype: &str) -> Self {
        if guid.is_none_or(|g| g == 0) {
            return Self {
                fill1: GRAY,
                fill2: GRAY,
                opacity: 0.15,
                outline: OUTLINE_GRAY,
                hashed: false,
            };
        }
        let oil = Self {
            fill1: GREEN,
            fill2: GREEN,
            opacity: 0.6,
            outline: GREEN,
            hashed: false,
        };
        match hctype {
            "GAS" => Self {
                fill1: RED,
                fill2: RED,
                outline: OUTLINE_RED,
                ..oil
            },
            "GAS/CONDENSATE" => Self {
                fill1: PINK,
                fill2: RED,
                outline: OUTLINE_RED,
                hashed: true,
                ..oil
            },
            "OIL/GAS" => Self {
                fill1: RED,
                hashed: true,
                ..oil
            },
            _ => oil,
        }
    }
}

/// One drawn polygon of a field.
#[derive(Debug, Clone)]
pub struct FieldPolygon {
    pub field: usize,
    pub style: FieldStyle,
    /// Offset of the hash pattern so neighbouring polygons do not line up.
    pub hash_offset: f64,
    pub z_index: i64,
    pub fill: PolygonMesh,
    pub outline: LineMesh,
}

/// Candidate label anchor of a field: a polygon's center of mass and area.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LabelAnchor {
    pub position: Vec2,
    pub mass: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldLabel {
    pub name: String,
    pub anchors: Vec<LabelAnchor>,
}

#[derive(Debug, Clone)]
struct Saved {
    polygon: usize,
    style: FieldStyle,
    z_index: i64,
}

struct GroupedField<'a> {
    name: &'a str,
    guid: Option<u64>,
    rings: Vec<(&'a [[f64; 2]], &'a str)>,
}

/// Records sharing a label form one field, in first-seen order.
fn group_fields(data: &[Field]) -> Vec<GroupedField<'_>> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut grouped: Vec<GroupedField<'_>> = Vec::new();
    for field in data {
        let name = field.properties.label.as_str();
        let slot = *index.entry(name).or_insert_with(|| {
            grouped.push(GroupedField {
                name,
                guid: field.properties.guid,
                rings: Vec::new(),
            });
            grouped.len() - 1
        });
        let hctype = field.properties.hctype.as_str();
        grouped[slot]
            .rings
            .extend(field.geometry.rings().into_iter().map(|r| (r, hctype)));
    }
    grouped
}

/// Filled, outlined and hoverable field polygons.
pub struct FieldLayer {
    id: LayerId,
    config: FieldConfig,
    hash_width: f64,
    polygons: Vec<FieldPolygon>,
    labels: Vec<FieldLabel>,
    index: TriangleDictionary<usize>,
    highlighted: Option<usize>,
    saved: Vec<Saved>,
    projector: Box<dyn Projector>,
    redraw: RedrawRequest,
}

impl std::fmt::Debug for FieldLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldLayer")
            .field("id", &self.id)
            .field("polygons", &self.polygons.len())
            .field("highlighted", &self.highlighted)
            .finish_non_exhaustive()
    }
}

impl FieldLayer {
    pub fn new(id: LayerId, config: FieldConfig, projector: impl Projector + 'static) -> Self {
        Self {
            id,
            config,
            hash_width: clamp01(config.initial_hash),
            polygons: Vec::new(),
            labels: Vec::new(),
            index: TriangleDictionary::new(INDEX_DECIMALS),
            highlighted: None,
            saved: Vec::new(),
            projector: Box::new(projector),
            redraw: RedrawRequest::new(),
        }
    }

    pub fn polygons(&self) -> &[FieldPolygon] {
        &self.polygons
    }

    pub fn labels(&self) -> &[FieldLabel] {
        &self.labels
    }

    pub fn highlighted(&self) -> Option<usize> {
        self.highlighted
    }

    pub fn hash_width(&self) -> f64 {
        self.hash_width
    }

    /// Replace the drawn fields. Rings too small to fill are skipped.
    pub fn set(&mut self, data: &[Field]) -> Result<()> {
        self.polygons.clear();
        self.labels.clear();
        self.index.clear();
        self.highlighted = None;
        self.saved.clear();

        let mut z_index = 0;
        for (field_id, field) in group_fields(data).into_iter().enumerate() {
            let mut anchors = Vec::new();
            for (ring, hctype) in field.rings {
                let mut geo: Vec<Vec2> = ring.iter().map(|&c| Vec2::from(c)).collect();
                // Projection expects [lat, long].
                let mut projected: Vec<Vec2> = ring
                    .iter()
                    .map(|c| self.projector.project([c[1], c[0]], None))
                    .collect();
                geo.pop();
                projected.pop();
                if projected.len() < 3 {
                    warn!(field = field.name, points = projected.len(), "skipping field polygon");
                    continue;
                }

                let fill = triangulate(&projected)?;
                self.index.add(&geo, &fill.triangles, field_id)?;
                let outline = polygon_outline(&projected, OUTLINE_WIDTH);
                if let Some((position, mass)) = center_of_mass(&fill.vertices, &fill.triangles) {
                    anchors.push(LabelAnchor { position, mass });
                }

                let hash_offset = (self.polygons.len() as f64 * 0.618_033_988_75).fract() * 10.0;
                self.polygons.push(FieldPolygon {
                    field: field_id,
                    style: FieldStyle::for_field(field.guid, hctype),
                    hash_offset,
                    z_index,
                    fill,
                    outline,
                });
                z_index += 2;
            }
            self.labels.push(FieldLabel {
                name: field.name.to_string(),
                anchors,
            });
        }
        debug!(fields = self.labels.len(), polygons = self.polygons.len(), "fields set");
        self.redraw.request();
        Ok(())
    }

    /// Clamp the hash stripe width into the configured range.
    pub fn set_hash_width(&mut self, width: f64) {
        self.hash_width = width.clamp(self.config.min_hash, self.config.max_hash);
        self.redraw.request();
    }

    /// Highlight the field under `(lat, long)`, reverting the previous one.
    /// Returns whether a field is under the position.
    pub fn highlight(&mut self, lat: f64, long: f64) -> bool {
        let Some(&field) = self.index.get_polygon_at(Vec2::new(long, lat)) else {
            self.try_unselect();
            return false;
        };
        if self.highlighted == Some(field) {
            return true;
        }
        self.revert();
        for (i, polygon) in self.polygons.iter_mut().enumerate() {
            if polygon.field != field {
                continue;
            }
            self.saved.push(Saved {
                polygon: i,
                style: polygon.style,
                z_index: polygon.z_index,
            });
            polygon.style.fill1 = HIGHLIGHT_FILL.0;
            polygon.style.fill2 = HIGHLIGHT_FILL.1;
            polygon.style.outline = HIGHLIGHT_OUTLINE;
            polygon.z_index += HIGHLIGHT_Z_BOOST;
        }
        self.highlighted = Some(field);
        self.redraw.request();
        true
    }

    fn revert(&mut self) -> bool {
        if self.saved.is_empty() {
            return false;
        }
        for saved in self.saved.drain(..) {
            if let Some(polygon) = self.polygons.get_mut(saved.polygon) {
                polygon.style = saved.style;
                polygon.z_index = saved.z_index;
            }
        }
        true
    }

    pub fn try_unselect(&mut self) {
        if self.revert() {
            self.redraw.request();
        }
        self.highlighted = None;
    }

    /// Submit fills and outlines when a redraw is pending.
    pub fn flush(&mut self, backend: &mut dyn RenderBackend) -> bool {
        if !self.redraw.flush() {
            return false;
        }
        for (i, polygon) in self.polygons.iter().enumerate() {
            let fill = MeshBuffers {
                vertices: to_f32(&polygon.fill.vertices),
                triangles: polygon.fill.triangles.iter().map(|&t| t as u32).collect(),
                attributes: Vec::new(),
                attribute_size: 0,
            };
            let params = ShaderParams::FieldFill {
                col1: polygon.style.fill1,
                col2: polygon.style.fill2,
                opacity: polygon.style.opacity,
                hashed: polygon.style.hashed,
                hash_width: self.hash_width,
            };
            backend.submit(MeshKey::FieldFill(i), &fill, &params, polygon.z_index);

            let outline = MeshBuffers {
                vertices: to_f32(&polygon.outline.vertices),
                triangles: polygon.outline.triangles.clone(),
                attributes: polygon
                    .outline
                    .normals
                    .iter()
                    .flat_map(|n| [n.x as f32, n.y as f32])
                    .collect(),
                attribute_size: 2,
            };
            let params = ShaderParams::Outline {
                color: polygon.style.outline,
                width: 0.0,
                visible: true,
            };
            backend.submit(MeshKey::FieldOutline(i), &outline, &params, polygon.z_index + 1);
        }
        true
    }
}

impl OverlayLayer for FieldLayer {
    fn id(&self) -> LayerId {
        self.id
    }

    fn on_add(&mut self, port: &mut dyn EventPort) {
        port.register(&[PointerEventKind::Move, PointerEventKind::Out]);
    }

    fn on_remove(&mut self, port: &mut dyn EventPort) {
        port.unregister();
    }

    fn handle_pointer(&mut self, event: &PointerEvent) -> bool {
        match event.kind {
            PointerEventKind::Move => self.highlight(event.position[0], event.position[1]),
            PointerEventKind::Out => {
                self.try_unselect();
                false
            }
            _ => false,
        }
    }
}
