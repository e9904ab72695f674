use foundation::{Rect, Vec2};

use crate::colors::Rgb;
use crate::ids::WellboreId;
use crate::status::WellboreStatus;

/// Aggregate look of a root marker, taken from its target wellbore.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct RootAppearance {
    pub active: bool,
    pub col1: Rgb,
    pub col2: Rgb,
    /// Status of the target, so highlighted roots draw on top.
    pub z_index: WellboreStatus,
}

/// Shared anchor of the wellbores starting at one position.
#[derive(Debug, Clone, PartialEq)]
pub struct Root {
    pub position: Vec2,
    pub wellbores: Vec<WellboreId>,
    /// Wellbore driving the root's appearance.
    pub target: Option<WellboreId>,
    pub appearance: RootAppearance,
    /// Next free label slot under the root.
    pub label_index: usize,
    /// Union of the boxes of labels stacked under the root.
    pub labels_bbox: Option<Rect>,
    recalculations: u64,
}

impl Root {
    pub fn new(position: Vec2) -> Self {
        Self {
            position,
            wellbores: Vec::new(),
            target: None,
            appearance: RootAppearance::default(),
            label_index: 0,
            labels_bbox: None,
            recalculations: 0,
        }
    }

    /// Times the target has been recomputed.
    pub fn recalculations(&self) -> u64 {
        self.recalculations
    }

    pub(crate) fn count_recalculation(&mut self) {
        self.recalculations += 1;
    }

    pub(crate) fn extend_labels_bbox(&mut self, bbox: Rect) {
        self.labels_bbox = Some(match self.labels_bbox {
            Some(current) => current.union(&bbox),
            None => bbox,
        });
    }

    pub(crate) fn reset_labels(&mut self) {
        self.label_index = 0;
        self.labels_bbox = None;
    }

    pub(crate) fn detach(&mut self, wellbore: WellboreId) {
        self.wellbores.retain(|&w| w != wellbore);
        if self.target == Some(wellbore) {
            self.target = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Root;
    use crate::ids::WellboreId;
    use foundation::{Rect, Vec2};

    #[test]
    fn label_box_grows_to_cover_all_labels() {
        let mut root = Root::new(Vec2::ZERO);
        root.extend_labels_bbox(Rect::new(0.0, 0.0, 2.0, 1.0));
        root.extend_labels_bbox(Rect::new(-1.0, 1.5, 1.0, 1.0));
        assert_eq!(root.labels_bbox, Some(Rect::new(-1.0, 0.0, 3.0, 2.5)));
        root.reset_labels();
        assert_eq!(root.labels_bbox, None);
    }

    #[test]
    fn detach_clears_stale_target() {
        let mut root = Root::new(Vec2::ZERO);
        root.wellbores = vec![WellboreId(1), WellboreId(2)];
        root.target = Some(WellboreId(2));
        root.detach(WellboreId(2));
        assert_eq!(root.wellbores, vec![WellboreId(1)]);
        assert_eq!(root.target, None);
    }
}
