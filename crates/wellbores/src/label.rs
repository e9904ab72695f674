use foundation::{Aabb2, Rect, Vec2};
use geometry::LineInterpolator;
use serde::{Deserialize, Serialize};

/// Gap between a wellbore ribbon edge and its label.
const LABEL_GAP: f64 = 0.075;

/// View state shared by every label update.
///
/// Passed explicitly so label placement depends only on its inputs.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LabelContext {
    pub zoom: f64,
    pub scale: f64,
    /// Global label toggle; a hidden context hides every label.
    pub visible: bool,
    /// Vertical offset of the first root label below the root.
    pub root_displacement: f64,
    /// Unscaled height of one label line.
    pub label_height: f64,
    pub background_opacity: f64,
}

impl Default for LabelContext {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            scale: 1.0,
            visible: true,
            root_displacement: 1.0,
            label_height: 0.0,
            background_opacity: 0.5,
        }
    }
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LabelMetrics {
    pub width: f64,
    pub height: f64,
}

/// Text measurement supplied by the host's font backend.
pub trait TextMeasurer {
    fn measure(&self, text: &str) -> LabelMetrics;
}

/// Monospace estimate used when no font backend is available.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct EstimatedMetrics {
    pub font_size: f64,
}

impl TextMeasurer for EstimatedMetrics {
    fn measure(&self, text: &str) -> LabelMetrics {
        LabelMetrics {
            width: self.font_size * 0.6 * text.chars().count() as f64,
            height: self.font_size * 1.2,
        }
    }
}

/// Placement of a label in world space. The pivot is in unscaled label
/// units; rotation is in radians.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct LabelTransform {
    pub position: Vec2,
    pub pivot: Vec2,
    pub rotation: f64,
    pub scale: f64,
}

impl LabelTransform {
    pub fn apply(&self, local: Vec2) -> Vec2 {
        self.position + ((local - self.pivot) * self.scale).rotate(self.rotation)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub text: String,
    pub metrics: LabelMetrics,
    pub transform: LabelTransform,
    /// Stacked under the root instead of along the path.
    pub attach_to_root: bool,
    pub font_color: u32,
    pub background_tint: u32,
    pub background_alpha: f64,
    pub z_index: i32,
    visible: bool,
}

impl Label {
    pub fn new(text: impl Into<String>, metrics: LabelMetrics, font_color: u32, background: u32) -> Self {
        Self {
            text: text.into(),
            metrics,
            transform: LabelTransform::default(),
            attach_to_root: false,
            font_color,
            background_tint: background,
            background_alpha: 0.5,
            z_index: 0,
            visible: true,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool, ctx: &LabelContext) {
        self.visible = visible && ctx.visible;
    }

    /// World-space box of the label background.
    pub fn bounding_box(&self) -> Rect {
        let LabelMetrics { width, height } = self.metrics;
        let hw = width * 0.55;
        let hh = height * 0.525;
        let corners = [
            Vec2::new(-hw, -hh),
            Vec2::new(hw, -hh),
            Vec2::new(hw, hh),
            Vec2::new(-hw, hh),
        ]
        .map(|c| self.transform.apply(c));
        match Aabb2::from_points(&corners) {
            Some(b) => Rect::new(b.min[0], b.min[1], b.max[0] - b.min[0], b.max[1] - b.min[1]),
            None => Rect::default(),
        }
    }
}

/// Stack a label under its root, `index` slots below the first.
pub fn position_at_root(label: &mut Label, root: Vec2, index: usize, ctx: &LabelContext) {
    label.attach_to_root = true;
    let y = ctx.root_displacement
        + 5.0 * ctx.scale
        + index as f64 * (ctx.label_height + 5.0) * ctx.scale
        + root.y;
    label.transform = LabelTransform {
        position: Vec2::new(root.x, y),
        pivot: Vec2::new(0.0, -ctx.label_height * 0.5),
        rotation: 0.0,
        scale: ctx.scale,
    };
}

/// Place a label at the end of the path, rotated along its last stretch and
/// pushed clear of a ribbon of `width`.
///
/// Screen space has y pointing down. The label sits on the side given by the
/// path direction; `mirror` flips it across the path.
pub fn position_along_wellbore(
    label: &mut Label,
    interp: &LineInterpolator,
    width: f64,
    mirror: bool,
    ctx: &LabelContext,
) {
    label.attach_to_root = false;
    let LabelMetrics {
        width: text_width,
        height: text_height,
    } = label.metrics;
    let end = interp.get_point(1.0).position;
    let start = interp.get_point_from_end(text_width * ctx.scale).position;
    let dir = end - start;
    let offset = width * 0.5 + LABEL_GAP;

    let leftwards = dir.x < 0.0;
    let (reference, pivot_x) = if leftwards {
        (Vec2::LEFT, -text_width * 0.5)
    } else {
        (Vec2::RIGHT, text_width * 0.5)
    };
    let pivot_y = if mirror {
        text_height * 0.5
    } else {
        -text_height * 0.5
    };
    let side = if leftwards == mirror {
        dir.rotate90()
    } else {
        dir.rotate270()
    };

    label.transform = LabelTransform {
        position: side.rescale(offset) + end,
        pivot: Vec2::new(pivot_x, pivot_y),
        rotation: reference.signed_angle(dir),
        scale: ctx.scale,
    };
}
