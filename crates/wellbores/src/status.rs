use serde::{Deserialize, Serialize};

/// Interaction state of a wellbore. Ordered so that a higher value wins the
/// root target.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WellboreStatus {
    #[default]
    Normal = 0,
    Highlighted = 1,
    MultiHighlighted = 2,
    Selected = 3,
}

impl WellboreStatus {
    pub fn weight(self) -> f64 {
        self as u8 as f64
    }

    pub fn is_highlighted(self) -> bool {
        matches!(self, Self::Highlighted | Self::MultiHighlighted)
    }
}

/// Filter state, independent of the interaction status. Soft filtering greys
/// a wellbore out; hard filtering leaves a ghost line.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterStatus {
    #[default]
    None = 0,
    Soft = 1,
    Hard = 2,
}

impl FilterStatus {
    /// Status for a wellbore given whether it passed the active filter.
    pub fn for_match(passed: bool, hard: bool) -> Self {
        match (passed, hard) {
            (true, _) => Self::None,
            (false, false) => Self::Soft,
            (false, true) => Self::Hard,
        }
    }
}
