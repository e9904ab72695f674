use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::colors::{Colors, InputColors};
use crate::detail::{Detail, DetailOptions};
use crate::error::{Result, WellboreError};
use crate::ids::WellboreId;
use crate::source::SourceData;
use crate::status::FilterStatus;

/// Predicate over wellbore records. Records passing it are left unfiltered.
pub type DataFilter = Rc<dyn Fn(&SourceData) -> bool>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GroupOptions {
    pub order: i32,
    pub mirror_labels: bool,
    pub colors: Option<InputColors>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupState {
    pub completion_visible: bool,
    pub wellbore_visible: bool,
}

impl Default for GroupState {
    fn default() -> Self {
        Self {
            completion_visible: true,
            wellbore_visible: true,
        }
    }
}

/// Named collection of wellbores sharing visibility, filter, order and colors.
pub struct Group {
    pub key: String,
    pub colors: Colors,
    /// Lower order draws first and loses root targeting ties.
    pub order: i32,
    pub mirror_labels: bool,
    pub active: bool,
    pub state: GroupState,
    filter: Option<(DataFilter, bool)>,
    pub(crate) details: BTreeMap<String, Detail>,
    pub(crate) wellbores: Vec<WellboreId>,
}

impl fmt::Debug for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Group")
            .field("key", &self.key)
            .field("order", &self.order)
            .field("active", &self.active)
            .field("filtered", &self.filter.is_some())
            .field("wellbores", &self.wellbores.len())
            .finish()
    }
}

impl Group {
    pub fn new(key: impl Into<String>, options: &GroupOptions) -> Self {
        Self {
            key: key.into(),
            colors: options
                .colors
                .as_ref()
                .map(Colors::from_input)
                .unwrap_or_default(),
            order: options.order,
            mirror_labels: options.mirror_labels,
            active: true,
            state: GroupState::default(),
            filter: None,
            details: BTreeMap::new(),
            wellbores: Vec::new(),
        }
    }

    pub fn wellbores(&self) -> &[WellboreId] {
        &self.wellbores
    }

    pub fn len(&self) -> usize {
        self.wellbores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wellbores.is_empty()
    }

    pub fn is_filtered(&self) -> bool {
        self.filter.is_some()
    }

    pub(crate) fn set_filter(&mut self, filter: Option<(DataFilter, bool)>) {
        self.filter = filter;
    }

    /// Filter status the active filter assigns to `data`.
    pub fn filter_status(&self, data: &SourceData) -> FilterStatus {
        match &self.filter {
            Some((filter, hard)) => FilterStatus::for_match(filter(data), *hard),
            None => FilterStatus::None,
        }
    }

    pub fn register_detail(&mut self, key: impl Into<String>, options: DetailOptions) -> Result<()> {
        let key = key.into();
        if self.details.contains_key(&key) {
            return Err(WellboreError::DetailAlreadyRegistered {
                group: self.key.clone(),
                detail: key,
            });
        }
        self.details.insert(key, Detail::new(options));
        Ok(())
    }

    pub fn detail(&self, key: &str) -> Option<&Detail> {
        self.details.get(key)
    }
}

#[cfg(test)]
mod tests {
    use super::{Group, GroupOptions};
    use crate::colors::InputColors;
    use crate::detail::{DetailOptions, RelativePosition};
    use crate::error::WellboreError;
    use crate::source::SourceData;
    use crate::status::FilterStatus;
    use std::rc::Rc;

    #[test]
    fn options_apply_colors_and_order() {
        let options = GroupOptions {
            order: 3,
            mirror_labels: true,
            colors: Some(InputColors {
                selected_color1: Some([0.0, 0.0, 1.0]),
                ..InputColors::default()
            }),
        };
        let g = Group::new("planned", &options);
        assert_eq!(g.order, 3);
        assert!(g.mirror_labels);
        assert_eq!(g.colors.selected.col1, [0.0, 0.0, 1.0]);
        assert!(g.active && g.is_empty());
    }

    #[test]
    fn duplicate_detail_is_rejected() {
        let mut g = Group::new("drilled", &GroupOptions::default());
        let shoe = || DetailOptions::shoe(Box::new(|_, _| vec![RelativePosition::Span(0.1, 0.2)]), 1.0, 1.0);
        g.register_detail("shoe", shoe()).unwrap();
        assert_eq!(
            g.register_detail("shoe", shoe()),
            Err(WellboreError::DetailAlreadyRegistered {
                group: "drilled".into(),
                detail: "shoe".into()
            })
        );
    }

    #[test]
    fn filter_status_follows_filter_kind() {
        let mut g = Group::new("g", &GroupOptions::default());
        let data = SourceData::new("A", vec![[0.0, 0.0]]);
        assert_eq!(g.filter_status(&data), FilterStatus::None);
        g.set_filter(Some((Rc::new(|d: &SourceData| d.label == "B"), true)));
        assert_eq!(g.filter_status(&data), FilterStatus::Hard);
        g.set_filter(Some((Rc::new(|d: &SourceData| d.label == "B"), false)));
        assert_eq!(g.filter_status(&data), FilterStatus::Soft);
    }
}
