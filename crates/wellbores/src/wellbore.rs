use std::collections::BTreeMap;

use foundation::Vec2;
use geometry::{LineInterpolator, RibbonBuilder, RibbonMesh};

use crate::colors::{Color, Colors};
use crate::config::TickConfig;
use crate::detail::{Detail, DetailMesh};
use crate::error::{Result, WellboreError};
use crate::group::GroupState;
use crate::ids::{GroupId, RootId};
use crate::label::{Label, LabelContext, LabelMetrics};
use crate::source::SourceData;
use crate::status::{FilterStatus, WellboreStatus};

const HIGHLIGHT_Z_BOOST: i64 = 100_000;
const SELECTED_Z_BOOST: i64 = 1_000_000;
const INTERACT_LABEL_ALPHA: f64 = 0.75;

/// Shader inputs of a wellbore ribbon.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct WellboreUniforms {
    pub status: FilterStatus,
    pub col1: [f32; 3],
    pub col2: [f32; 3],
    pub completion_visible: bool,
    pub wellbore_visible: bool,
}

/// Everything needed to build a wellbore from a projected path.
#[derive(Debug, Clone)]
pub struct NewWellbore {
    pub data: SourceData,
    pub group: GroupId,
    pub root: RootId,
    /// Projected path; the first point is the root position.
    pub coords: Vec<Vec2>,
    /// Paths entirely within this distance of their first point collapse to
    /// the root.
    pub point_threshold: f64,
    pub width: f64,
    pub tick: TickConfig,
    pub metrics: LabelMetrics,
}

/// One path entity. Lives in the store's arena and refers back to its group
/// and root by index.
#[derive(Debug, Clone)]
pub struct Wellbore {
    pub data: SourceData,
    pub group: GroupId,
    pub root: RootId,
    pub width: f64,
    pub interpolator: LineInterpolator,
    pub label: Label,
    mesh: Option<RibbonMesh>,
    uniforms: WellboreUniforms,
    status: WellboreStatus,
    filter: FilterStatus,
    z_index: i64,
    visible: bool,
    details_visible: bool,
    details: BTreeMap<String, DetailMesh>,
}

impl Wellbore {
    pub(crate) fn new(
        input: NewWellbore,
        colors: &Colors,
        state: GroupState,
        group_active: bool,
        ctx: &LabelContext,
    ) -> Result<Self> {
        if input.coords.is_empty() {
            return Err(WellboreError::EmptyPath);
        }
        let interpolator = LineInterpolator::new(&input.coords, input.point_threshold)?;
        let mut label = Label::new(
            input.data.label_short.clone(),
            input.metrics,
            colors.font_color,
            colors.default.label_bg,
        );
        label.background_alpha = ctx.background_opacity;

        let mesh = if interpolator.is_single_point() {
            label.attach_to_root = true;
            None
        } else {
            let intervals = input.data.relative_intervals();
            Some(
                RibbonBuilder::new(&interpolator, input.width)
                    .with_tick_style(input.tick)
                    .generate(&intervals),
            )
        };

        let mut wellbore = Self {
            data: input.data,
            group: input.group,
            root: input.root,
            width: input.width,
            interpolator,
            label,
            mesh,
            uniforms: WellboreUniforms {
                status: FilterStatus::None,
                col1: colors.default.col1,
                col2: colors.default.col2,
                completion_visible: state.completion_visible,
                wellbore_visible: state.wellbore_visible,
            },
            status: WellboreStatus::Normal,
            filter: FilterStatus::None,
            z_index: 0,
            visible: true,
            details_visible: true,
            details: BTreeMap::new(),
        };
        wellbore.update(group_active, ctx);
        Ok(wellbore)
    }

    pub fn mesh(&self) -> Option<&RibbonMesh> {
        self.mesh.as_ref()
    }

    pub fn uniforms(&self) -> &WellboreUniforms {
        &self.uniforms
    }

    pub fn status(&self) -> WellboreStatus {
        self.status
    }

    pub fn filter(&self) -> FilterStatus {
        self.filter
    }

    pub fn is_selected(&self) -> bool {
        self.status == WellboreStatus::Selected
    }

    pub fn is_highlighted(&self) -> bool {
        self.status.is_highlighted()
    }

    /// Filtered wellbores stay drawn but take no part in hit testing or root
    /// targeting.
    pub fn is_active(&self, group_active: bool) -> bool {
        group_active && self.filter == FilterStatus::None
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn details_visible(&self) -> bool {
        self.details_visible
    }

    pub fn details(&self) -> &BTreeMap<String, DetailMesh> {
        &self.details
    }

    pub fn z_index(&self) -> i64 {
        self.z_index
    }

    pub(crate) fn set_z_index(&mut self, z: i64) {
        self.z_index = z;
    }

    /// Draw order including the highlight and selection boost.
    pub fn z_order(&self) -> i64 {
        self.z_index
            + match self.status {
                WellboreStatus::Normal => 0,
                WellboreStatus::Highlighted | WellboreStatus::MultiHighlighted => HIGHLIGHT_Z_BOOST,
                WellboreStatus::Selected => SELECTED_Z_BOOST,
            }
    }

    pub fn color<'a>(&self, colors: &'a Colors) -> &'a Color {
        match self.status {
            WellboreStatus::Normal => &colors.default,
            WellboreStatus::Highlighted => &colors.highlight,
            WellboreStatus::MultiHighlighted => &colors.multi_highlight,
            WellboreStatus::Selected => &colors.selected,
        }
    }

    fn apply_color(&mut self, color: &Color) {
        self.uniforms.col1 = color.col1;
        self.uniforms.col2 = color.col2;
    }

    fn apply_label_style(&mut self, color: &Color, interacting: bool, ctx: &LabelContext) {
        if interacting {
            self.label.z_index = 1;
            self.label.background_alpha = INTERACT_LABEL_ALPHA;
        } else {
            self.label.z_index = 0;
            self.label.background_alpha = ctx.background_opacity;
        }
        self.label.background_tint = color.label_bg;
    }

    /// Returns whether the filter changed.
    pub(crate) fn set_filter(&mut self, filter: FilterStatus, group_active: bool, ctx: &LabelContext) -> bool {
        if self.filter == filter {
            return false;
        }
        self.filter = filter;
        self.update(group_active, ctx);
        true
    }

    /// Ignored while selected.
    pub(crate) fn set_highlight(&mut self, on: bool, multiple: bool, colors: &Colors, ctx: &LabelContext) {
        if self.is_selected() {
            return;
        }
        if on {
            self.status = if multiple {
                WellboreStatus::MultiHighlighted
            } else {
                WellboreStatus::Highlighted
            };
            let color = *self.color(colors);
            self.apply_color(&color);
            self.apply_label_style(&color, true, ctx);
            self.label.font_color = colors.interact_font_color;
        } else {
            self.status = WellboreStatus::Normal;
            self.apply_color(&colors.default);
            self.apply_label_style(&colors.default, false, ctx);
            self.label.font_color = colors.font_color;
        }
    }

    /// The caller recalculates the root afterwards.
    pub(crate) fn set_selected(&mut self, selected: bool, colors: &Colors, ctx: &LabelContext) {
        let color = if selected {
            self.status = WellboreStatus::Selected;
            colors.selected
        } else {
            self.status = WellboreStatus::Normal;
            colors.default
        };
        self.apply_color(&color);
        self.apply_label_style(&color, selected, ctx);
        self.label.font_color = colors.font_color;
    }

    /// Sync visibility with group activity and the filter. Labels and
    /// details only show when unfiltered.
    pub(crate) fn update(&mut self, group_active: bool, ctx: &LabelContext) {
        let unfiltered = self.filter == FilterStatus::None;
        if group_active {
            if self.mesh.is_some() {
                self.visible = true;
                self.uniforms.status = self.filter;
                self.details_visible = unfiltered;
            }
            self.label.set_visible(unfiltered, ctx);
        } else {
            if self.mesh.is_some() {
                self.visible = false;
                self.details_visible = false;
            }
            self.label.set_visible(false, ctx);
        }
    }

    pub(crate) fn set_completion_visibility(&mut self, visible: bool) {
        if self.mesh.is_some() {
            self.uniforms.completion_visible = visible;
        }
    }

    pub(crate) fn set_wellbore_visibility(&mut self, visible: bool) {
        if self.mesh.is_some() {
            self.uniforms.wellbore_visible = visible;
        }
    }

    /// Build `detail` for this wellbore. Single-point wellbores and records
    /// without detail positions get nothing.
    pub(crate) fn try_draw_detail(&mut self, key: &str, detail: &Detail, group_key: &str) {
        if self.mesh.is_none() {
            return;
        }
        let quads = detail.build(&self.data, group_key, &self.interpolator);
        if quads.is_empty() {
            return;
        }
        self.details.insert(
            key.to_string(),
            DetailMesh {
                quads,
                color: detail.color(),
                visible: detail.visible,
            },
        );
    }

    pub(crate) fn set_detail_visibility(&mut self, key: &str, visible: bool) {
        if let Some(mesh) = self.details.get_mut(key) {
            mesh.visible = visible;
        }
    }
}
