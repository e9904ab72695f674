use std::collections::{BTreeSet, HashMap};
use std::fmt;

use foundation::Vec2;
use geometry::{quad, quad_triangles};
use runtime::{BatchLoop, FrameBudget, RedrawRequest};
use spatial::{LineDictionary, PointDictionary};
use tracing::{debug, warn};
use wellbores::{
    DataFilter, DetailOptions, EstimatedMetrics, FilterStatus, GroupId, GroupOptions, Highlight,
    HighlightEvent, HitTarget, LabelContext, NewWellbore, RootId, SourceData, TextMeasurer,
    WellboreConfig, WellboreError, WellboreEventData, WellboreId, WellboreStore, hit_test,
};

use crate::error::Result;
use crate::host::{
    EventPort, IdentityProjector, MeshBuffers, MeshKey, PointerEvent, PointerEventKind, Projector,
    RenderBackend, ShaderParams, to_f32,
};
use crate::layer::{LayerId, OverlayLayer};

/// Root markers merge when closer than this.
const ROOT_MERGE_DISTANCE: f64 = 0.25;
/// Zoom the root index radius is sized for.
const ROOT_INDEX_ZOOM: f64 = 20.0;
/// Labels are only drawn when zoomed in past this level.
const LABEL_MIN_ZOOM: f64 = 10.0;
/// Paths collapse to their root within this many root radii.
const SINGLE_POINT_FACTOR: f64 = 1.5;

pub type HighlightOnCallback = Box<dyn FnMut(&HighlightEvent)>;
pub type HighlightOffCallback = Box<dyn FnMut()>;
pub type ClickCallback = Box<dyn FnMut(&WellboreEventData)>;
pub type ScalingFn = Box<dyn Fn(f64) -> f64>;

const POINTER_EVENTS: [PointerEventKind; 3] = [
    PointerEventKind::Move,
    PointerEventKind::Out,
    PointerEventKind::Click,
];

/// Wellbore overlay: owns the store, the spatial indices and the
/// interaction state, and turns host input into store updates.
///
/// Ordering contract:
/// - Hit testing checks roots, then root labels, then paths.
/// - `tick` adds records in input order and requests one redraw per batch.
/// - `flush` submits every mesh when a redraw is pending and removes meshes
///   whose entity is gone.
pub struct WellboreLayer {
    id: LayerId,
    config: WellboreConfig,
    store: WellboreStore,
    roots: PointDictionary<RootId>,
    lines: LineDictionary<WellboreId>,
    highlight: Highlight,
    batches: BatchLoop<String>,
    pending: HashMap<String, Vec<SourceData>>,
    redraw: RedrawRequest,
    ctx: LabelContext,
    current_zoom: f64,
    labels_shown: bool,
    deferred_selector: Option<DataFilter>,
    projector: Box<dyn Projector>,
    measurer: Box<dyn TextMeasurer>,
    scaling: Option<ScalingFn>,
    on_highlight_on: Option<HighlightOnCallback>,
    on_highlight_off: Option<HighlightOffCallback>,
    on_wellbore_click: Option<ClickCallback>,
    submitted: BTreeSet<MeshKey>,
}

impl fmt::Debug for WellboreLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WellboreLayer")
            .field("id", &self.id)
            .field("roots", &self.store.root_count())
            .field("wellbores", &self.store.wellbore_count())
            .field("current_zoom", &self.current_zoom)
            .finish_non_exhaustive()
    }
}

impl WellboreLayer {
    /// Build the layer with a `default` group registered. `config` is taken
    /// as given; `scale` is folded in here.
    pub fn new(id: LayerId, config: WellboreConfig) -> Result<Self> {
        let config = config.resolved();
        let roots = PointDictionary::new(
            ROOT_MERGE_DISTANCE,
            config.grid_size * 10.0,
            config.root_radius_at(ROOT_INDEX_ZOOM),
        )?;
        let lines = LineDictionary::new(config.grid_size);
        let measurer = EstimatedMetrics {
            font_size: config.font_size,
        };
        let ctx = LabelContext {
            scale: config.label_scale,
            label_height: measurer.measure("Ag").height,
            background_opacity: config.label_bg_opacity,
            ..LabelContext::default()
        };
        let mut layer = Self {
            id,
            config,
            store: WellboreStore::new(),
            roots,
            lines,
            highlight: Highlight::new(),
            batches: BatchLoop::new(),
            pending: HashMap::new(),
            redraw: RedrawRequest::new(),
            ctx,
            current_zoom: ROOT_INDEX_ZOOM,
            labels_shown: true,
            deferred_selector: None,
            projector: Box::new(IdentityProjector),
            measurer: Box::new(measurer),
            scaling: None,
            on_highlight_on: None,
            on_highlight_off: None,
            on_wellbore_click: None,
            submitted: BTreeSet::new(),
        };
        layer.register_group("default", &GroupOptions::default())?;
        Ok(layer)
    }

    pub fn with_projector(mut self, projector: impl Projector + 'static) -> Self {
        self.projector = Box::new(projector);
        self
    }

    pub fn with_measurer(mut self, measurer: impl TextMeasurer + 'static) -> Self {
        self.ctx.label_height = measurer.measure("Ag").height;
        self.measurer = Box::new(measurer);
        self
    }

    pub fn set_scaling(&mut self, scaling: impl Fn(f64) -> f64 + 'static) {
        self.scaling = Some(Box::new(scaling));
    }

    pub fn on_highlight_on(&mut self, callback: impl FnMut(&HighlightEvent) + 'static) {
        self.on_highlight_on = Some(Box::new(callback));
    }

    pub fn on_highlight_off(&mut self, callback: impl FnMut() + 'static) {
        self.on_highlight_off = Some(Box::new(callback));
    }

    pub fn on_wellbore_click(&mut self, callback: impl FnMut(&WellboreEventData) + 'static) {
        self.on_wellbore_click = Some(Box::new(callback));
    }

    pub fn config(&self) -> &WellboreConfig {
        &self.config
    }

    pub fn store(&self) -> &WellboreStore {
        &self.store
    }

    pub fn highlight(&self) -> &Highlight {
        &self.highlight
    }

    pub fn label_context(&self) -> &LabelContext {
        &self.ctx
    }

    pub fn labels_shown(&self) -> bool {
        self.labels_shown
    }

    pub fn current_zoom(&self) -> f64 {
        self.current_zoom
    }

    pub fn is_loading(&self) -> bool {
        !self.batches.is_idle()
    }

    pub fn redraw_requests(&self) -> &RedrawRequest {
        &self.redraw
    }

    pub fn register_group(&mut self, key: &str, options: &GroupOptions) -> Result<GroupId> {
        Ok(self.store.register_group(key, options)?)
    }

    pub fn register_detail(&mut self, group: &str, key: &str, options: DetailOptions) -> Result<()> {
        let gid = self.group_id(group)?;
        Ok(self.store.register_detail(gid, key, options)?)
    }

    pub fn set_detail_visibility(&mut self, group: &str, key: &str, visible: bool) {
        if let Some(gid) = self.store.group_id(group) {
            self.store.set_detail_visibility(gid, key, visible);
            self.redraw.request();
        }
    }

    fn group_id(&self, key: &str) -> Result<GroupId> {
        self.store
            .group_id(key)
            .ok_or_else(|| WellboreError::UnknownGroup(key.to_string()).into())
    }

    /// Replace the contents of group `key` with `wells`. The records are
    /// added over the following [`tick`](Self::tick) calls.
    pub fn set(&mut self, wells: Vec<SourceData>, key: &str) -> Result<()> {
        let gid = self.group_id(key)?;
        if self.store.group(gid).is_some_and(|g| !g.is_empty()) {
            self.clear(&[key]);
        }
        debug!(group = key, wells = wells.len(), "loading wellbores");
        self.batches
            .start(key.to_string(), wells.len(), self.config.batch_size);
        self.pending.insert(key.to_string(), wells);
        Ok(())
    }

    /// Run pending batches within `budget`. Returns the keys whose load
    /// completed during this tick.
    pub fn tick(&mut self, budget: &mut FrameBudget) -> Vec<String> {
        let mut completed = Vec::new();
        for step in self.batches.tick(budget) {
            let Some(gid) = self.store.group_id(&step.key) else {
                continue;
            };
            let records: Vec<SourceData> = self
                .pending
                .get(&step.key)
                .and_then(|wells| wells.get(step.range.clone()))
                .map(<[SourceData]>::to_vec)
                .unwrap_or_default();
            for data in records {
                let label = data.label.clone();
                if let Err(err) = self.add_to_group(data, gid) {
                    warn!(group = %step.key, label = %label, error = %err, "skipping wellbore");
                }
            }
            self.redraw.request();
            if step.finished {
                self.pending.remove(&step.key);
                completed.push(step.key);
            }
        }
        completed
    }

    /// Add one record to `group` right away.
    pub fn add_wellbore(&mut self, data: SourceData, group: &str) -> Result<WellboreId> {
        let gid = self.group_id(group)?;
        let id = self.add_to_group(data, gid)?;
        self.redraw.request();
        Ok(id)
    }

    fn add_root(&mut self, position: Vec2) -> RootId {
        if let Some(entry) = self.roots.get_overlapping(position) {
            return entry.value;
        }
        let rid = self.store.add_root(position);
        self.roots.add(position, rid);
        rid
    }

    fn add_to_group(&mut self, data: SourceData, gid: GroupId) -> Result<WellboreId> {
        if data.path.is_empty() {
            return Err(WellboreError::EmptyPath.into());
        }
        let coords = self.projector.project_path(&data.path);
        let root = self.add_root(coords[0]);
        let metrics = self.measurer.measure(&data.label_short);
        let input = NewWellbore {
            data,
            group: gid,
            root,
            coords,
            point_threshold: self.config.root_radius * SINGLE_POINT_FACTOR,
            width: self.config.wellbore_width,
            tick: self.config.tick,
            metrics,
        };
        let path = input.coords.clone();
        let id = self.store.add_wellbore(input, &self.ctx)?;

        let single_point = self
            .store
            .wellbore(id)
            .is_some_and(|w| w.interpolator.is_single_point());
        if !single_point {
            self.lines.add(&path, id)?;
        }

        let deferred_match = match (&self.deferred_selector, self.store.wellbore(id)) {
            (Some(select), Some(w)) => select(&w.data),
            _ => false,
        };
        if deferred_match {
            self.deferred_selector = None;
            self.store.set_selected(id, true, &self.ctx);
        }
        Ok(id)
    }

    /// Remove the wellbores of `keys`, or everything when `keys` is empty.
    /// Unknown keys are ignored.
    pub fn clear(&mut self, keys: &[&str]) {
        if keys.is_empty() {
            self.clear_all();
            return;
        }
        self.highlight.clear(&mut self.store, &self.ctx);
        let groups = self.store.resolve_groups(keys);
        for gid in &groups {
            if let Some(key) = self.store.group(*gid).map(|g| g.key.clone()) {
                self.batches.stop(&key);
                self.pending.remove(&key);
            }
        }
        let cleared = self.store.clear_groups(&groups, &self.ctx);
        let wellbores: BTreeSet<WellboreId> = cleared.wellbores.into_iter().collect();
        let roots: BTreeSet<RootId> = cleared.roots.into_iter().collect();
        self.lines.clear_where(|w, _| wellbores.contains(w));
        self.roots.clear_where(|r, _| roots.contains(r));
        self.redraw.request();
    }

    pub fn clear_all(&mut self) {
        self.highlight.reset();
        self.batches.stop_all();
        self.pending.clear();
        self.lines.clear();
        self.roots.clear();
        self.store.clear_all();
        self.redraw.request();
    }

    fn for_each_group(&mut self, keys: &[&str], mut f: impl FnMut(&mut WellboreStore, GroupId, &LabelContext)) {
        for gid in self.store.resolve_groups(keys) {
            f(&mut self.store, gid, &self.ctx);
        }
        self.redraw.request();
    }

    pub fn enable(&mut self, keys: &[&str]) {
        self.for_each_group(keys, |store, gid, ctx| store.set_group_active(gid, true, ctx));
    }

    pub fn disable(&mut self, keys: &[&str]) {
        self.for_each_group(keys, |store, gid, ctx| store.set_group_active(gid, false, ctx));
    }

    /// Grey out wellbores not passing `filter`.
    pub fn soft_filter(&mut self, filter: DataFilter, keys: &[&str]) {
        self.for_each_group(keys, |store, gid, ctx| store.soft_filter(gid, filter.clone(), ctx));
    }

    /// Turn wellbores not passing `filter` into ghost lines.
    pub fn hard_filter(&mut self, filter: DataFilter, keys: &[&str]) {
        self.for_each_group(keys, |store, gid, ctx| store.hard_filter(gid, filter.clone(), ctx));
    }

    pub fn clear_filter(&mut self, keys: &[&str]) {
        self.for_each_group(keys, |store, gid, ctx| store.clear_filter(gid, ctx));
    }

    pub fn set_completion_visibility(&mut self, visible: bool, keys: &[&str]) {
        self.for_each_group(keys, |store, gid, _| store.set_completion_visibility(gid, visible));
    }

    pub fn set_wellbore_visibility(&mut self, visible: bool, keys: &[&str]) {
        self.for_each_group(keys, |store, gid, _| store.set_wellbore_visibility(gid, visible));
    }

    /// Select every wellbore passing `select` and unselect the rest. When
    /// nothing matches, the first matching wellbore added later is selected.
    pub fn set_selected(&mut self, select: DataFilter, keys: &[&str]) -> usize {
        let mut selected = 0;
        for gid in self.store.resolve_groups(keys) {
            let members = self.store.group(gid).map(|g| g.wellbores().to_vec()).unwrap_or_default();
            for id in members {
                let Some(w) = self.store.wellbore(id) else {
                    continue;
                };
                if select(&w.data) {
                    self.store.set_selected(id, true, &self.ctx);
                    selected += 1;
                } else if w.is_selected() {
                    self.store.set_selected(id, false, &self.ctx);
                }
            }
        }
        if selected == 0 {
            debug!("no wellbore matched the selection, deferring");
            self.deferred_selector = Some(select);
        }
        self.redraw.request();
        selected
    }

    pub fn clear_selected(&mut self, keys: &[&str]) {
        for gid in self.store.resolve_groups(keys) {
            let members = self.store.group(gid).map(|g| g.wellbores().to_vec()).unwrap_or_default();
            for id in members {
                if self.store.wellbore(id).is_some_and(|w| w.is_selected()) {
                    self.store.set_selected(id, false, &self.ctx);
                }
            }
        }
        self.redraw.request();
    }

    /// Highlight the wellbore labelled `label`, searching `keys` in order.
    /// Pointer movement may override it.
    pub fn set_highlight(&mut self, label: &str, keys: &[&str]) -> Option<WellboreId> {
        let groups = self.store.resolve_groups(keys);
        let id = self.store.find_by_label(label, &groups)?;
        let root = self.store.wellbore(id)?.root;
        if self.highlight.set(&mut self.store, root, vec![id], &self.ctx) {
            self.redraw.request();
        }
        Some(id)
    }

    /// Returns whether a highlight was active.
    pub fn clear_highlight(&mut self) -> bool {
        if !self.highlight.clear(&mut self.store, &self.ctx) {
            return false;
        }
        if let Some(off) = self.on_highlight_off.as_mut() {
            off();
        }
        self.redraw.request();
        true
    }

    /// Toggle every label, independent of the zoom-driven visibility.
    pub fn set_label_visibility(&mut self, visible: bool) {
        self.ctx.visible = visible;
        self.store.set_label_visibility(&self.ctx);
        self.redraw.request();
    }

    /// Root radius matching the root shader's growth at `zoom`.
    pub fn root_radius(&self, zoom: f64) -> f64 {
        self.config.root_radius_at(zoom)
    }

    /// Hit test `pos` in projected space and update the highlight. Returns
    /// the event passed to the highlight callback, or `None` on a miss.
    pub fn update_highlighted(&mut self, pos: Vec2) -> Option<HighlightEvent> {
        let target = HitTarget {
            store: &self.store,
            roots: &self.roots,
            lines: &self.lines,
            root_radius: self.root_radius(self.current_zoom),
            labels_visible: self.labels_shown,
            path_distance: self.config.highlight_distance,
        };
        let Some(hits) = hit_test(pos, &target) else {
            if self.highlight.is_active() {
                self.clear_highlight();
            }
            return None;
        };
        let root = self.store.wellbore(*hits.first()?)?.root;
        let changed = !self.highlight.is_active() || !self.highlight.equals(root, &hits);
        if changed {
            self.highlight.set(&mut self.store, root, hits.clone(), &self.ctx);
            self.redraw.request();
        }
        let event = HighlightEvent {
            event_data: hits.iter().filter_map(|&id| self.event_data(id)).collect(),
            changed,
        };
        if let Some(on) = self.on_highlight_on.as_mut() {
            on(&event);
        }
        Some(event)
    }

    fn event_data(&self, id: WellboreId) -> Option<WellboreEventData> {
        let w = self.store.wellbore(id)?;
        let group = self.store.group(w.group)?;
        Some(WellboreEventData {
            group: group.key.clone(),
            data: w.data.clone(),
        })
    }

    /// Report the highlighted wellbore when exactly one is highlighted.
    pub fn click(&mut self) -> Option<WellboreEventData> {
        if !self.highlight.is_single() {
            return None;
        }
        let selection = self.event_data(self.highlight.first()?)?;
        if let Some(on_click) = self.on_wellbore_click.as_mut() {
            on_click(&selection);
        }
        Some(selection)
    }

    /// Submit every mesh when a redraw is pending. Returns whether anything
    /// was submitted.
    pub fn flush(&mut self, backend: &mut dyn RenderBackend) -> bool {
        if !self.redraw.flush() {
            return false;
        }
        let mut live = BTreeSet::new();
        let radius = self.root_radius(self.current_zoom);

        for (rid, root) in self.store.roots() {
            let marker = quad(root.position, radius);
            let mesh = MeshBuffers {
                vertices: to_f32(&marker.vertices),
                triangles: marker.triangles.to_vec(),
                attributes: marker.uvs.iter().flatten().copied().collect(),
                attribute_size: 2,
            };
            let params = ShaderParams::Root {
                col1: root.appearance.col1,
                col2: root.appearance.col2,
                active: root.appearance.active,
                radius,
            };
            let key = MeshKey::Root(rid.0);
            backend.submit(key.clone(), &mesh, &params, root.appearance.z_index as i64);
            live.insert(key);
        }

        for (id, w) in self.store.wellbores() {
            let Some(ribbon) = w.mesh() else {
                continue;
            };
            let attributes = ribbon
                .vertex_data
                .iter()
                .zip(&ribbon.kinds)
                .flat_map(|(d, &kind)| [d[0] as f32, d[1] as f32, d[2] as f32, d[3] as f32, kind as u8 as f32])
                .collect();
            let mesh = MeshBuffers {
                vertices: to_f32(&ribbon.vertices),
                triangles: ribbon.triangles.clone(),
                attributes,
                attribute_size: 5,
            };
            let uniforms = w.uniforms();
            let params = ShaderParams::Wellbore {
                col1: uniforms.col1,
                col2: uniforms.col2,
                status: match uniforms.status {
                    FilterStatus::None => 0,
                    FilterStatus::Soft => 1,
                    FilterStatus::Hard => 2,
                },
                completion_visible: uniforms.completion_visible,
                wellbore_visible: uniforms.wellbore_visible,
                visible: w.is_visible(),
            };
            let key = MeshKey::Wellbore(id.0);
            backend.submit(key.clone(), &mesh, &params, w.z_order());
            live.insert(key);

            for (name, detail) in w.details() {
                let mut mesh = MeshBuffers::default();
                for corners in &detail.quads {
                    let base = mesh.vertices.len() as u32;
                    mesh.vertices.extend(to_f32(corners));
                    mesh.triangles.extend(quad_triangles().map(|t| t + base));
                }
                let params = ShaderParams::Detail {
                    color: detail.color,
                    visible: detail.visible && w.details_visible(),
                };
                let key = MeshKey::Detail(id.0, name.clone());
                backend.submit(key.clone(), &mesh, &params, w.z_order());
                live.insert(key);
            }
        }

        for stale in self.submitted.difference(&live) {
            backend.remove(stale);
        }
        self.submitted = live;
        true
    }
}

impl OverlayLayer for WellboreLayer {
    fn id(&self) -> LayerId {
        self.id
    }

    /// Rescale labels and show them only when zoomed in.
    fn resize(&mut self, zoom: f64) {
        self.current_zoom = zoom;
        let input = zoom - self.config.zoom_origin;
        let scale = match &self.scaling {
            Some(scaling) => scaling(input),
            None => self.config.label_scale,
        };
        self.ctx.zoom = zoom;
        self.ctx.scale = if scale.is_finite() { scale } else { 1.0 };
        self.labels_shown = zoom > LABEL_MIN_ZOOM;
        if self.labels_shown && self.ctx.visible {
            let roots: Vec<RootId> = self.store.roots().map(|(id, _)| id).collect();
            for rid in roots {
                self.store.update_root_labels(rid, &self.ctx);
            }
        }
        self.redraw.request();
    }

    fn on_add(&mut self, port: &mut dyn EventPort) {
        port.register(&POINTER_EVENTS);
    }

    fn on_remove(&mut self, port: &mut dyn EventPort) {
        port.unregister();
    }

    fn handle_pointer(&mut self, event: &PointerEvent) -> bool {
        match event.kind {
            PointerEventKind::Move => {
                let pos = self.projector.project(event.position, None);
                self.update_highlighted(pos);
                self.highlight.is_active()
            }
            PointerEventKind::Out => self.clear_highlight(),
            PointerEventKind::Click => self.click().is_some(),
            PointerEventKind::Down | PointerEventKind::Up => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::WellboreLayer;
    use crate::error::LayerError;
    use crate::host::{PointerEvent, PointerEventKind};
    use crate::layer::{LayerId, OverlayLayer};
    use foundation::Vec2;
    use pretty_assertions::assert_eq;
    use runtime::FrameBudget;
    use wellbores::{
        GroupOptions, LabelMetrics, SourceData, TextMeasurer, WellboreConfig, WellboreError, WellboreStatus,
    };

    fn layer() -> WellboreLayer {
        let config = WellboreConfig {
            batch_size: 2,
            ..WellboreConfig::default()
        };
        WellboreLayer::new(LayerId(1), config).unwrap()
    }

    fn wells() -> Vec<SourceData> {
        vec![
            SourceData::new("A-1", vec![[0.0, 0.0], [0.0, 10.0]]),
            SourceData::new("A-2", vec![[0.05, 0.0], [10.0, 0.0]]),
            SourceData::new("B-1", vec![[40.0, 40.0], [40.0, 50.0]]),
            SourceData::new("C-1", vec![[80.0, 0.0]]),
        ]
    }

    fn loaded() -> WellboreLayer {
        let mut layer = layer();
        layer.set(wells(), "default").unwrap();
        layer.tick(&mut FrameBudget::unlimited());
        layer
    }

    #[test]
    fn loads_in_batches_and_merges_roots() {
        let mut layer = layer();
        layer.set(wells(), "default").unwrap();
        assert!(layer.is_loading());

        let done = layer.tick(&mut FrameBudget::new(1));
        assert!(done.is_empty());
        assert_eq!(layer.store().wellbore_count(), 2);

        let done = layer.tick(&mut FrameBudget::new(5));
        assert_eq!(done, vec!["default".to_string()]);
        assert!(!layer.is_loading());
        assert_eq!(layer.store().wellbore_count(), 4);
        // A-1 and A-2 share a root.
        assert_eq!(layer.store().root_count(), 3);
        assert_eq!(layer.redraw_requests().requests(), 2);
    }

    #[test]
    fn unknown_group_is_an_error() {
        let mut layer = layer();
        assert_eq!(
            layer.set(wells(), "nope"),
            Err(LayerError::Wellbore(WellboreError::UnknownGroup("nope".into())))
        );
    }

    #[test]
    fn empty_paths_are_skipped_during_loads() {
        let mut layer = layer();
        let mut input = wells();
        input.insert(1, SourceData::new("broken", vec![]));
        layer.set(input, "default").unwrap();
        layer.tick(&mut FrameBudget::unlimited());
        assert_eq!(layer.store().wellbore_count(), 4);
        assert!(layer.add_wellbore(SourceData::new("x", vec![]), "default").is_err());
    }

    #[test]
    fn reloading_a_group_replaces_it() {
        let mut layer = loaded();
        layer.set(wells()[..1].to_vec(), "default").unwrap();
        assert_eq!(layer.store().wellbore_count(), 0);
        assert_eq!(layer.store().root_count(), 0);
        layer.tick(&mut FrameBudget::unlimited());
        assert_eq!(layer.store().wellbore_count(), 1);
    }

    #[test]
    fn reloads_resolve_hits_to_the_new_records() {
        let mut layer = loaded();
        for _ in 0..3 {
            let mut reversed = wells();
            reversed.reverse();
            layer.set(reversed, "default").unwrap();
            layer.tick(&mut FrameBudget::unlimited());
        }
        assert_eq!(layer.store().wellbore_count(), 4);
        let hit = layer.update_highlighted(Vec2::new(0.0, 5.0)).unwrap();
        let labels: Vec<&str> = hit.event_data.iter().map(|d| d.data.label.as_str()).collect();
        assert_eq!(labels, vec!["A-1"]);
    }

    #[test]
    fn clearing_one_group_keeps_shared_roots() {
        let mut layer = loaded();
        layer.register_group("extra", &GroupOptions::default()).unwrap();
        layer
            .add_wellbore(SourceData::new("E-1", vec![[0.0, 0.0], [-10.0, 0.0]]), "extra")
            .unwrap();
        assert_eq!(layer.store().root_count(), 3);

        layer.clear(&["default"]);
        assert_eq!(layer.store().wellbore_count(), 1);
        assert_eq!(layer.store().root_count(), 1);
        assert!(layer.update_highlighted(Vec2::new(-5.0, 0.0)).is_some());
        assert!(layer.update_highlighted(Vec2::new(0.0, 5.0)).is_none());
    }

    #[test]
    fn pointer_move_highlights_path_and_click_reports_it() {
        let mut layer = loaded();
        let clicked = Rc::new(RefCell::new(Vec::new()));
        let sink = clicked.clone();
        layer.on_wellbore_click(move |e| sink.borrow_mut().push(e.data.label.clone()));

        let event = layer.update_highlighted(Vec2::new(40.2, 45.0)).unwrap();
        assert!(event.changed);
        assert_eq!(event.count(), 1);
        assert_eq!(event.event_data[0].data.label, "B-1");
        assert!(!layer.update_highlighted(Vec2::new(40.1, 46.0)).unwrap().changed);

        assert!(layer.handle_pointer(&PointerEvent::new(PointerEventKind::Click, [0.0, 0.0])));
        assert_eq!(*clicked.borrow(), vec!["B-1".to_string()]);

        assert!(layer.handle_pointer(&PointerEvent::new(PointerEventKind::Out, [0.0, 0.0])));
        assert!(!layer.highlight().is_active());
        assert!(!layer.handle_pointer(&PointerEvent::new(PointerEventKind::Click, [0.0, 0.0])));
    }

    #[test]
    fn root_hit_highlights_every_active_member() {
        let mut layer = loaded();
        let event = layer.update_highlighted(Vec2::new(0.1, 0.1)).unwrap();
        let labels: Vec<&str> = event.event_data.iter().map(|e| e.data.label.as_str()).collect();
        assert_eq!(labels, vec!["A-1", "A-2"]);
        let id = layer.highlight().first().unwrap();
        assert_eq!(layer.store().wellbore(id).unwrap().status(), WellboreStatus::MultiHighlighted);
    }

    #[test]
    fn deferred_selection_applies_to_later_records() {
        let mut layer = layer();
        let matched = layer.set_selected(Rc::new(|d: &SourceData| d.label == "B-1"), &[]);
        assert_eq!(matched, 0);
        layer.set(wells(), "default").unwrap();
        layer.tick(&mut FrameBudget::unlimited());
        let selected: Vec<&str> = layer
            .store()
            .wellbores()
            .filter(|(_, w)| w.is_selected())
            .map(|(_, w)| w.data.label.as_str())
            .collect();
        assert_eq!(selected, vec!["B-1"]);

        layer.clear_selected(&[]);
        assert!(layer.store().wellbores().all(|(_, w)| !w.is_selected()));
    }

    #[test]
    fn forced_highlight_finds_by_label() {
        let mut layer = loaded();
        let id = layer.set_highlight("A-2", &[]).unwrap();
        assert_eq!(layer.highlight().wellbores(), &[id]);
        assert_eq!(layer.set_highlight("missing", &[]), None);
        assert!(layer.clear_highlight());
        assert!(!layer.clear_highlight());
    }

    #[test]
    fn disabled_groups_are_not_hit() {
        let mut layer = loaded();
        layer.disable(&[]);
        assert!(layer.update_highlighted(Vec2::new(40.2, 45.0)).is_none());
        layer.enable(&["default"]);
        assert!(layer.update_highlighted(Vec2::new(40.2, 45.0)).is_some());
    }

    #[test]
    fn resize_toggles_labels_and_scales_them() {
        let mut layer = loaded();
        layer.set_scaling(|z| 2f64.powf(-z));
        layer.resize(4.0);
        assert!(!layer.labels_shown());
        assert_eq!(layer.label_context().scale, 2f64.powf(-4.0));
        layer.resize(12.0);
        assert!(layer.labels_shown());
        layer.set_scaling(|_| f64::NAN);
        layer.resize(13.0);
        assert_eq!(layer.label_context().scale, 1.0);
    }

    struct FixedMetrics;

    impl TextMeasurer for FixedMetrics {
        fn measure(&self, text: &str) -> LabelMetrics {
            LabelMetrics {
                width: 4.0 * text.len() as f64,
                height: 7.0,
            }
        }
    }

    #[test]
    fn labels_use_the_host_measurer() {
        let mut layer = layer().with_measurer(FixedMetrics);
        assert_eq!(layer.label_context().label_height, 7.0);
        layer.set(wells(), "default").unwrap();
        layer.tick(&mut FrameBudget::unlimited());
        let (_, a1) = layer.store().wellbores().next().unwrap();
        assert_eq!(a1.label.metrics.width, 4.0 * a1.data.label_short.len() as f64);
    }

    #[test]
    fn root_radius_grows_when_zoomed_out() {
        let layer = layer();
        assert!((layer.root_radius(12.0) - 1.4).abs() < 1e-12);
        assert!(layer.root_radius(8.0) > layer.root_radius(12.0));
    }
}
