use serde::Serialize;

use crate::source::SourceData;

/// Payload identifying one wellbore to host callbacks.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WellboreEventData {
    pub group: String,
    pub data: SourceData,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HighlightEvent {
    pub event_data: Vec<WellboreEventData>,
    /// False when the pointer moved but the highlighted set is unchanged.
    pub changed: bool,
}

impl HighlightEvent {
    pub fn count(&self) -> usize {
        self.event_data.len()
    }
}
