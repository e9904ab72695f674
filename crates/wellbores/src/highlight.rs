use crate::ids::{RootId, WellboreId};
use crate::label::LabelContext;
use crate::store::WellboreStore;

/// Currently highlighted root and wellbores.
///
/// Changing only the wellbore set under the same root reverts and reapplies
/// the line-level highlight and recalculates that root once. Moving to another
/// root fully reverts the previous one first.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Highlight {
    root: Option<RootId>,
    wellbores: Vec<WellboreId>,
}

impl Highlight {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.root.is_some()
    }

    pub fn root(&self) -> Option<RootId> {
        self.root
    }

    pub fn wellbores(&self) -> &[WellboreId] {
        &self.wellbores
    }

    pub fn is_single(&self) -> bool {
        self.wellbores.len() == 1
    }

    pub fn first(&self) -> Option<WellboreId> {
        self.wellbores.first().copied()
    }

    /// Same root and the same wellbores in any order.
    pub fn equals(&self, root: RootId, wellbores: &[WellboreId]) -> bool {
        self.root == Some(root)
            && self.wellbores.len() == wellbores.len()
            && self.wellbores.iter().all(|w| wellbores.contains(w))
    }

    /// Highlight `wellbores` under `root`. Returns whether anything changed.
    pub fn set(
        &mut self,
        store: &mut WellboreStore,
        root: RootId,
        wellbores: Vec<WellboreId>,
        ctx: &LabelContext,
    ) -> bool {
        if self.equals(root, &wellbores) {
            return false;
        }
        match self.root {
            Some(previous) if previous != root => {
                self.clear_wellbores(store, ctx);
                store.recalculate_root(previous, false, ctx);
            }
            Some(_) => self.clear_wellbores(store, ctx),
            None => {}
        }
        self.root = Some(root);
        self.wellbores = wellbores;
        let multiple = self.wellbores.len() > 1;
        for &w in &self.wellbores {
            store.set_highlight(w, true, multiple, ctx);
        }
        store.recalculate_root(root, false, ctx);
        true
    }

    /// Revert the highlight. Returns whether one was active.
    pub fn clear(&mut self, store: &mut WellboreStore, ctx: &LabelContext) -> bool {
        let Some(root) = self.root.take() else {
            return false;
        };
        self.clear_wellbores(store, ctx);
        store.recalculate_root(root, false, ctx);
        true
    }

    /// Forget the highlight without touching entities, for when they were
    /// removed.
    pub fn reset(&mut self) {
        self.root = None;
        self.wellbores.clear();
    }

    fn clear_wellbores(&mut self, store: &mut WellboreStore, ctx: &LabelContext) {
        for w in self.wellbores.drain(..) {
            store.set_highlight(w, false, false, ctx);
        }
    }
}
