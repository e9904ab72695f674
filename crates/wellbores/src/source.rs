use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Completion interval along a wellbore.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceInterval {
    /// Interval category, e.g. "Screen" or "Perforation".
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Start as measured distance along the wellbore.
    #[serde(default)]
    pub start: f64,
    #[serde(default)]
    pub end: f64,
    /// Start as relative position in `[0, 1]`.
    pub l1: f64,
    pub l2: f64,
}

/// Caller-supplied wellbore record. Unknown keys are kept in `properties`
/// so filters and selectors can inspect them.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceData {
    pub label: String,
    #[serde(default)]
    pub label_short: String,
    /// Geographic path, projected by the host before indexing.
    pub path: Vec<[f64; 2]>,
    #[serde(default)]
    pub intervals: Vec<SourceInterval>,
    #[serde(flatten)]
    pub properties: Map<String, Value>,
}

impl SourceData {
    pub fn new(label: impl Into<String>, path: Vec<[f64; 2]>) -> Self {
        let label = label.into();
        Self {
            label_short: label.clone(),
            label,
            path,
            ..Self::default()
        }
    }

    pub fn with_interval(mut self, l1: f64, l2: f64) -> Self {
        self.intervals.push(SourceInterval {
            kind: String::new(),
            start: 0.0,
            end: 0.0,
            l1,
            l2,
        });
        self
    }

    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    /// Relative intervals, sorted and merged for the ribbon builder.
    pub fn relative_intervals(&self) -> Vec<[f64; 2]> {
        geometry::process_intervals(self.intervals.iter().map(|i| [i.l1, i.l2]))
    }
}

#[cfg(test)]
mod tests {
    use super::SourceData;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_record_with_extra_properties() {
        let json = r#"{
            "label": "NO 15/9-F-1",
            "labelShort": "15/9-F-1",
            "path": [[2.0, 58.0], [2.1, 58.1]],
            "intervals": [{"type": "Screen", "start": 10, "end": 20, "l1": 0.6, "l2": 0.8},
                          {"type": "Perforation", "start": 1, "end": 5, "l1": 0.1, "l2": 0.3}],
            "status": "drilling"
        }"#;
        let data: SourceData = serde_json::from_str(json).unwrap();
        assert_eq!(data.label_short, "15/9-F-1");
        assert_eq!(data.intervals[0].kind, "Screen");
        assert_eq!(data.property("status").and_then(|v| v.as_str()), Some("drilling"));
        assert_eq!(data.relative_intervals(), vec![[0.1, 0.3], [0.6, 0.8]]);
    }
}
