use std::collections::BTreeSet;

use foundation::{Arena, Vec2};
use tracing::debug;

use crate::colors::Colors;
use crate::detail::DetailOptions;
use crate::error::{Result, WellboreError};
use crate::group::{DataFilter, Group, GroupOptions};
use crate::ids::{GroupId, RootId, WellboreId};
use crate::label::{LabelContext, position_along_wellbore, position_at_root};
use crate::root::{Root, RootAppearance};
use crate::wellbore::{NewWellbore, Wellbore};

/// Status outweighs any realistic group order when picking a root target.
const STATUS_WEIGHT: f64 = 1_000_000.0;

/// Entities removed by [`WellboreStore::clear_groups`], for pruning the
/// spatial indices.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Cleared {
    pub wellbores: Vec<WellboreId>,
    pub roots: Vec<RootId>,
}

/// Arena of groups, roots and wellbores.
///
/// Wellbores refer to their group and root by index and roots list their
/// members by index, so every cross-entity update goes through the store.
///
/// Ordering contract:
/// - Group-wide operations recalculate each affected root exactly once, in
///   ascending root order.
/// - Root targets prefer a selected member, then the highest status, then the
///   lowest group order; the first member in append order wins ties.
#[derive(Debug, Default)]
pub struct WellboreStore {
    groups: Vec<Group>,
    roots: Arena<Root>,
    wellbores: Arena<Wellbore>,
}

impl WellboreStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_group(&mut self, key: impl Into<String>, options: &GroupOptions) -> Result<GroupId> {
        let key = key.into();
        if self.group_id(&key).is_some() {
            return Err(WellboreError::GroupAlreadyRegistered(key));
        }
        self.groups.push(Group::new(key, options));
        Ok(GroupId(self.groups.len() - 1))
    }

    pub fn group_id(&self, key: &str) -> Option<GroupId> {
        self.groups.iter().position(|g| g.key == key).map(GroupId)
    }

    pub fn group(&self, id: GroupId) -> Option<&Group> {
        self.groups.get(id.0)
    }

    pub fn groups(&self) -> impl Iterator<Item = (GroupId, &Group)> {
        self.groups.iter().enumerate().map(|(i, g)| (GroupId(i), g))
    }

    /// Ids for `keys` in the given order, skipping unknown keys. No keys means
    /// every group.
    pub fn resolve_groups(&self, keys: &[&str]) -> Vec<GroupId> {
        if keys.is_empty() {
            return (0..self.groups.len()).map(GroupId).collect();
        }
        keys.iter().filter_map(|k| self.group_id(k)).collect()
    }

    pub fn root(&self, id: RootId) -> Option<&Root> {
        self.roots.get(id.0)
    }

    pub fn roots(&self) -> impl Iterator<Item = (RootId, &Root)> {
        self.roots.iter().map(|(i, r)| (RootId(i), r))
    }

    pub fn root_count(&self) -> usize {
        self.roots.len()
    }

    pub fn wellbore(&self, id: WellboreId) -> Option<&Wellbore> {
        self.wellbores.get(id.0)
    }

    pub fn wellbores(&self) -> impl Iterator<Item = (WellboreId, &Wellbore)> {
        self.wellbores.iter().map(|(i, w)| (WellboreId(i), w))
    }

    pub fn wellbore_count(&self) -> usize {
        self.wellbores.len()
    }

    pub fn colors_of(&self, id: WellboreId) -> Option<&Colors> {
        let w = self.wellbores.get(id.0)?;
        self.groups.get(w.group.0).map(|g| &g.colors)
    }

    fn group_active(&self, id: GroupId) -> bool {
        self.groups.get(id.0).is_some_and(|g| g.active)
    }

    fn group_order(&self, id: GroupId) -> i32 {
        self.groups.get(id.0).map_or(0, |g| g.order)
    }

    pub fn is_wellbore_active(&self, id: WellboreId) -> bool {
        self.wellbores
            .get(id.0)
            .is_some_and(|w| w.is_active(self.group_active(w.group)))
    }

    /// A root is active while its target is.
    pub fn is_root_active(&self, id: RootId) -> bool {
        self.roots
            .get(id.0)
            .and_then(|r| r.target)
            .is_some_and(|t| self.is_wellbore_active(t))
    }

    /// Active members of a root, in append order.
    pub fn active_members(&self, id: RootId) -> Vec<WellboreId> {
        self.roots.get(id.0).map_or_else(Vec::new, |r| {
            r.wellbores
                .iter()
                .copied()
                .filter(|&w| self.is_wellbore_active(w))
                .collect()
        })
    }

    pub fn add_root(&mut self, position: Vec2) -> RootId {
        RootId(self.roots.alloc(Root::new(position)))
    }

    /// Build a wellbore, append it to its group and then to its root.
    pub fn add_wellbore(&mut self, input: NewWellbore, ctx: &LabelContext) -> Result<WellboreId> {
        let gid = input.group;
        let rid = input.root;
        let group = self
            .groups
            .get(gid.0)
            .ok_or_else(|| WellboreError::UnknownGroup(format!("#{}", gid.0)))?;
        let mut wellbore = Wellbore::new(input, &group.colors, group.state, group.active, ctx)?;
        wellbore.set_z_index(i64::from(group.order) * 10_000 + group.wellbores.len() as i64);

        let filter = group.filter_status(&wellbore.data);
        let filtered = group.is_filtered();
        wellbore.set_filter(filter, group.active, ctx);
        for (key, detail) in group.details.iter().filter(|(_, d)| d.initialized) {
            wellbore.try_draw_detail(key, detail, &group.key);
        }

        let id = WellboreId(self.wellbores.alloc(wellbore));
        if let Some(group) = self.groups.get_mut(gid.0) {
            group.wellbores.push(id);
        }
        if filtered {
            self.recalculate_root(rid, true, ctx);
        }
        self.append_to_root(rid, id, ctx);
        Ok(id)
    }

    fn append_to_root(&mut self, rid: RootId, id: WellboreId, ctx: &LabelContext) {
        let Some(root) = self.roots.get_mut(rid.0) else {
            return;
        };
        root.wellbores.push(id);
        let target = root.target;
        if !self.is_wellbore_active(id) {
            return;
        }
        let Some(target) = target.and_then(|t| self.wellbores.get(t.0)) else {
            self.recalculate_root(rid, true, ctx);
            return;
        };
        let Some(w) = self.wellbores.get(id.0) else {
            return;
        };
        let beats_target =
            self.group_order(w.group) < self.group_order(target.group) && w.status() > target.status();
        if beats_target {
            self.recalculate_root(rid, true, ctx);
        } else if ctx.visible {
            self.position_label(rid, id, ctx);
        }
    }

    /// Recompute the root's target and appearance, optionally re-laying out
    /// its labels.
    pub fn recalculate_root(&mut self, rid: RootId, label_update: bool, ctx: &LabelContext) {
        let Some(root) = self.roots.get(rid.0) else {
            return;
        };
        let target = self.pick_target(root);
        let appearance = match target.and_then(|t| self.wellbores.get(t.0)) {
            Some(w) => {
                let colors = self.groups.get(w.group.0).map(|g| g.colors).unwrap_or_default();
                let color = w.color(&colors);
                RootAppearance {
                    active: w.is_active(self.group_active(w.group)),
                    col1: color.col1,
                    col2: color.col2,
                    z_index: w.status(),
                }
            }
            None => RootAppearance {
                active: false,
                ..root.appearance
            },
        };
        if let Some(root) = self.roots.get_mut(rid.0) {
            root.target = target;
            root.appearance = appearance;
            root.count_recalculation();
        }
        if label_update {
            self.update_root_labels(rid, ctx);
        }
    }

    fn pick_target(&self, root: &Root) -> Option<WellboreId> {
        let mut target = None;
        let mut smallest = f64::MAX;
        for &id in &root.wellbores {
            let Some(w) = self.wellbores.get(id.0) else {
                continue;
            };
            if !w.is_active(self.group_active(w.group)) {
                continue;
            }
            if w.is_selected() {
                return Some(id);
            }
            let weighted = f64::from(self.group_order(w.group)) - STATUS_WEIGHT * w.status().weight();
            if weighted < smallest {
                smallest = weighted;
                target = Some(id);
            }
        }
        target
    }

    /// Restack root labels and re-place path labels of every active member.
    pub fn update_root_labels(&mut self, rid: RootId, ctx: &LabelContext) {
        let Some(root) = self.roots.get_mut(rid.0) else {
            return;
        };
        root.reset_labels();
        if !ctx.visible {
            return;
        }
        for id in self.active_members(rid) {
            self.position_label(rid, id, ctx);
        }
    }

    fn position_label(&mut self, rid: RootId, id: WellboreId, ctx: &LabelContext) {
        let Self {
            groups,
            roots,
            wellbores,
        } = self;
        let (Some(root), Some(w)) = (roots.get_mut(rid.0), wellbores.get_mut(id.0)) else {
            return;
        };
        if w.label.attach_to_root {
            let index = root.label_index;
            root.label_index += 1;
            position_at_root(&mut w.label, root.position, index, ctx);
            root.extend_labels_bbox(w.label.bounding_box());
        } else {
            let mirror = groups.get(w.group.0).is_some_and(|g| g.mirror_labels);
            position_along_wellbore(&mut w.label, &w.interpolator, w.width, mirror, ctx);
        }
    }

    /// Apply `ctx.visible` to every root and its active labels.
    pub fn set_label_visibility(&mut self, ctx: &LabelContext) {
        let roots: Vec<RootId> = self.roots().map(|(id, _)| id).collect();
        for rid in roots {
            if ctx.visible {
                self.update_root_labels(rid, ctx);
            } else if let Some(root) = self.roots.get_mut(rid.0) {
                root.labels_bbox = None;
            }
            for id in self.active_members(rid) {
                if let Some(w) = self.wellbores.get_mut(id.0) {
                    w.label.set_visible(ctx.visible, ctx);
                }
            }
        }
    }

    /// Run `f` on every wellbore of the group, then recalculate each distinct
    /// root once.
    fn for_all(
        &mut self,
        gid: GroupId,
        ctx: &LabelContext,
        mut f: impl FnMut(&mut Wellbore, &Group),
    ) {
        let Some(group) = self.groups.get(gid.0) else {
            return;
        };
        let mut roots = BTreeSet::new();
        for &id in &group.wellbores {
            if let Some(w) = self.wellbores.get_mut(id.0) {
                f(w, group);
                roots.insert(w.root);
            }
        }
        debug!(group = %group.key, roots = roots.len(), "recalculating roots");
        for rid in roots {
            self.recalculate_root(rid, true, ctx);
        }
    }

    pub fn set_group_active(&mut self, gid: GroupId, active: bool, ctx: &LabelContext) {
        let Some(group) = self.groups.get_mut(gid.0) else {
            return;
        };
        if group.active == active {
            return;
        }
        group.active = active;
        self.for_all(gid, ctx, |w, g| w.update(g.active, ctx));
    }

    fn apply_filter(&mut self, gid: GroupId, filter: Option<(DataFilter, bool)>, ctx: &LabelContext) {
        let Some(group) = self.groups.get_mut(gid.0) else {
            return;
        };
        group.set_filter(filter);
        self.for_all(gid, ctx, |w, g| {
            let status = g.filter_status(&w.data);
            w.set_filter(status, g.active, ctx);
        });
    }

    /// Grey out wellbores not passing `filter`.
    pub fn soft_filter(&mut self, gid: GroupId, filter: DataFilter, ctx: &LabelContext) {
        self.apply_filter(gid, Some((filter, false)), ctx);
    }

    /// Reduce wellbores not passing `filter` to ghost lines.
    pub fn hard_filter(&mut self, gid: GroupId, filter: DataFilter, ctx: &LabelContext) {
        self.apply_filter(gid, Some((filter, true)), ctx);
    }

    pub fn clear_filter(&mut self, gid: GroupId, ctx: &LabelContext) {
        self.apply_filter(gid, None, ctx);
    }

    fn for_members(&mut self, gid: GroupId, mut f: impl FnMut(&mut Wellbore)) {
        let Some(group) = self.groups.get(gid.0) else {
            return;
        };
        for &id in &group.wellbores {
            if let Some(w) = self.wellbores.get_mut(id.0) {
                f(w);
            }
        }
    }

    pub fn set_completion_visibility(&mut self, gid: GroupId, visible: bool) {
        if let Some(group) = self.groups.get_mut(gid.0) {
            group.state.completion_visible = visible;
        }
        self.for_members(gid, |w| w.set_completion_visibility(visible));
    }

    pub fn set_wellbore_visibility(&mut self, gid: GroupId, visible: bool) {
        if let Some(group) = self.groups.get_mut(gid.0) {
            group.state.wellbore_visible = visible;
        }
        self.for_members(gid, |w| w.set_wellbore_visibility(visible));
    }

    pub fn register_detail(&mut self, gid: GroupId, key: impl Into<String>, options: DetailOptions) -> Result<()> {
        let group = self
            .groups
            .get_mut(gid.0)
            .ok_or_else(|| WellboreError::UnknownGroup(format!("#{}", gid.0)))?;
        group.register_detail(key, options)
    }

    /// Show or hide a registered detail. The first show builds it for every
    /// wellbore in the group. Unknown keys are ignored.
    pub fn set_detail_visibility(&mut self, gid: GroupId, key: &str, visible: bool) {
        let Self {
            groups, wellbores, ..
        } = self;
        let Some(group) = groups.get_mut(gid.0) else {
            return;
        };
        let Some(detail) = group.details.get_mut(key) else {
            return;
        };
        if visible && !detail.initialized {
            for &id in &group.wellbores {
                if let Some(w) = wellbores.get_mut(id.0) {
                    w.try_draw_detail(key, detail, &group.key);
                }
            }
            detail.initialized = true;
        }
        if detail.visible == visible {
            return;
        }
        for &id in &group.wellbores {
            if let Some(w) = wellbores.get_mut(id.0) {
                w.set_detail_visibility(key, visible);
            }
        }
        detail.visible = visible;
    }

    /// Line-level highlight only; the caller recalculates the root.
    pub fn set_highlight(&mut self, id: WellboreId, on: bool, multiple: bool, ctx: &LabelContext) {
        let Some(colors) = self.colors_of(id).copied() else {
            return;
        };
        if let Some(w) = self.wellbores.get_mut(id.0) {
            w.set_highlight(on, multiple, &colors, ctx);
        }
    }

    pub fn set_selected(&mut self, id: WellboreId, selected: bool, ctx: &LabelContext) {
        let Some(colors) = self.colors_of(id).copied() else {
            return;
        };
        let Some(w) = self.wellbores.get_mut(id.0) else {
            return;
        };
        w.set_selected(selected, &colors, ctx);
        let rid = w.root;
        self.recalculate_root(rid, false, ctx);
    }

    /// First wellbore whose full label matches, searching `groups` in order.
    pub fn find_by_label(&self, label: &str, groups: &[GroupId]) -> Option<WellboreId> {
        groups
            .iter()
            .filter_map(|g| self.groups.get(g.0))
            .flat_map(|g| g.wellbores.iter().copied())
            .find(|&id| self.wellbores.get(id.0).is_some_and(|w| w.data.label == label))
    }

    /// Remove every wellbore of `groups`. Roots left without members are
    /// removed too; the others are recalculated once.
    pub fn clear_groups(&mut self, groups: &[GroupId], ctx: &LabelContext) -> Cleared {
        let mut cleared = Cleared::default();
        let mut touched = BTreeSet::new();
        for gid in groups {
            let Some(group) = self.groups.get_mut(gid.0) else {
                continue;
            };
            for id in std::mem::take(&mut group.wellbores) {
                let Some(w) = self.wellbores.remove(id.0) else {
                    continue;
                };
                if let Some(root) = self.roots.get_mut(w.root.0) {
                    root.detach(id);
                }
                touched.insert(w.root);
                cleared.wellbores.push(id);
            }
        }
        for rid in touched {
            let empty = self.roots.get(rid.0).is_some_and(|r| r.wellbores.is_empty());
            if empty {
                self.roots.remove(rid.0);
                cleared.roots.push(rid);
            } else {
                self.recalculate_root(rid, true, ctx);
            }
        }
        debug!(
            wellbores = cleared.wellbores.len(),
            roots = cleared.roots.len(),
            "cleared groups"
        );
        cleared
    }

    /// Drop every root and wellbore; groups and their settings remain.
    pub fn clear_all(&mut self) {
        for group in &mut self.groups {
            group.wellbores.clear();
        }
        self.roots.clear();
        self.wellbores.clear();
    }
}
