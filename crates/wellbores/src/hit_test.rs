use foundation::Vec2;
use spatial::{LineDictionary, PointDictionary};

use crate::ids::{RootId, WellboreId};
use crate::store::WellboreStore;

/// Indices and thresholds consulted by [`hit_test`].
pub struct HitTarget<'a> {
    pub store: &'a WellboreStore,
    pub roots: &'a PointDictionary<RootId>,
    pub lines: &'a LineDictionary<WellboreId>,
    /// Current on-screen root radius.
    pub root_radius: f64,
    /// Whether root labels are drawn, and so hittable.
    pub labels_visible: bool,
    /// Path hit distance in grid cells.
    pub path_distance: f64,
}

/// Active members of the closest active root strictly within `radius`.
pub fn test_root(
    pos: Vec2,
    radius: f64,
    roots: &PointDictionary<RootId>,
    store: &WellboreStore,
) -> Option<Vec<WellboreId>> {
    let entry = roots.get_closest_under_where(pos, radius, |r| store.is_root_active(*r))?;
    let members = store.active_members(entry.value);
    (!members.is_empty()).then_some(members)
}

/// Wellbore whose root-stacked label covers `pos`.
pub fn test_label(pos: Vec2, store: &WellboreStore) -> Option<Vec<WellboreId>> {
    let candidates = store.roots().filter(|(id, root)| {
        store.is_root_active(*id) && root.labels_bbox.is_some_and(|b| b.contains(pos))
    });
    for (_, root) in candidates {
        for &id in &root.wellbores {
            let Some(w) = store.wellbore(id) else {
                continue;
            };
            if !w.label.attach_to_root || !store.is_wellbore_active(id) {
                continue;
            }
            let bbox = w.label.bounding_box();
            // Labels stack downwards; the rest lie below `pos`.
            if bbox.y > pos.y {
                break;
            }
            if bbox.contains(pos) {
                return Some(vec![id]);
            }
        }
    }
    None
}

/// Closest active path within `distance` grid cells.
pub fn test_path(
    pos: Vec2,
    lines: &LineDictionary<WellboreId>,
    store: &WellboreStore,
    distance: f64,
) -> Option<Vec<WellboreId>> {
    lines
        .get_closest_where(pos, distance, |w| store.is_wellbore_active(*w))
        .map(|&w| vec![w])
}

/// Roots first, then root labels, then paths; the first hit wins.
pub fn hit_test(pos: Vec2, target: &HitTarget<'_>) -> Option<Vec<WellboreId>> {
    test_root(pos, target.root_radius, target.roots, target.store)
        .or_else(|| {
            target
                .labels_visible
                .then(|| test_label(pos, target.store))
                .flatten()
        })
        .or_else(|| test_path(pos, target.lines, target.store, target.path_distance))
}

#[cfg(test)]
mod tests {
    use super::{HitTarget, hit_test, test_label, test_path, test_root};
    use crate::config::TickConfig;
    use crate::group::GroupOptions;
    use crate::ids::{GroupId, RootId, WellboreId};
    use crate::label::{LabelContext, LabelMetrics};
    use crate::source::SourceData;
    use crate::store::WellboreStore;
    use crate::wellbore::NewWellbore;
    use foundation::Vec2;
    use spatial::{LineDictionary, PointDictionary};

    struct Fixture {
        store: WellboreStore,
        roots: PointDictionary<RootId>,
        lines: LineDictionary<WellboreId>,
    }

    impl Fixture {
        fn new() -> Self {
            let mut store = WellboreStore::new();
            store.register_group("default", &GroupOptions::default()).unwrap();
            Self {
                store,
                roots: PointDictionary::new(0.25, 20.0, 3.0).unwrap(),
                lines: LineDictionary::new(2.0),
            }
        }

        fn add(&mut self, label: &str, coords: &[[f64; 2]]) -> WellboreId {
            let path: Vec<Vec2> = coords.iter().map(|&c| Vec2::from(c)).collect();
            let existing = self.roots.get_overlapping(path[0]).map(|e| e.value);
            let root = match existing {
                Some(root) => root,
                None => {
                    let id = self.store.add_root(path[0]);
                    self.roots.add(path[0], id);
                    id
                }
            };
            let input = NewWellbore {
                data: SourceData::new(label, coords.to_vec()),
                group: GroupId(0),
                root,
                coords: path.clone(),
                point_threshold: 0.6,
                width: 0.15,
                tick: TickConfig::default(),
                metrics: LabelMetrics {
                    width: 40.0,
                    height: 20.0,
                },
            };
            let ctx = LabelContext {
                scale: 0.05,
                label_height: 20.0,
                ..LabelContext::default()
            };
            let id = self.store.add_wellbore(input, &ctx).unwrap();
            if path.len() > 1 && !self.store.wellbore(id).unwrap().interpolator.is_single_point() {
                self.lines.add(&path, id).unwrap();
            }
            id
        }

        fn target(&self) -> HitTarget<'_> {
            HitTarget {
                store: &self.store,
                roots: &self.roots,
                lines: &self.lines,
                root_radius: 0.5,
                labels_visible: true,
                path_distance: 0.5,
            }
        }
    }

    #[test]
    fn root_hit_returns_every_active_member() {
        let mut f = Fixture::new();
        let a = f.add("A", &[[0.0, 0.0], [5.0, 0.0]]);
        let b = f.add("B", &[[0.1, 0.0], [0.0, 5.0]]);
        assert_eq!(test_root(Vec2::new(0.2, 0.1), 0.5, &f.roots, &f.store), Some(vec![a, b]));
        assert_eq!(test_root(Vec2::new(2.0, 0.0), 0.5, &f.roots, &f.store), None);
        assert_eq!(hit_test(Vec2::new(0.2, 0.1), &f.target()), Some(vec![a, b]));
    }

    #[test]
    fn path_hit_within_distance() {
        let mut f = Fixture::new();
        let a = f.add("A", &[[0.0, 0.0], [10.0, 0.0]]);
        assert_eq!(test_path(Vec2::new(6.0, 0.4), &f.lines, &f.store, 0.5), Some(vec![a]));
        assert_eq!(test_path(Vec2::new(6.0, 1.5), &f.lines, &f.store, 0.5), None);
        assert_eq!(hit_test(Vec2::new(6.0, 0.4), &f.target()), Some(vec![a]));
    }

    #[test]
    fn root_label_hit() {
        let mut f = Fixture::new();
        let a = f.add("A", &[[0.0, 0.0]]);
        let bbox = f.store.wellbore(a).unwrap().label.bounding_box();
        let inside = Vec2::new(bbox.x + bbox.width * 0.5, bbox.y + bbox.height * 0.5);
        assert_eq!(test_label(inside, &f.store), Some(vec![a]));
        assert_eq!(test_label(Vec2::new(bbox.right() + 1.0, bbox.y), &f.store), None);

        let hidden = HitTarget {
            labels_visible: false,
            ..f.target()
        };
        assert_eq!(hit_test(inside, &hidden), None);
    }
}
