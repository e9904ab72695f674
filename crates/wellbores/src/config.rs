use serde::{Deserialize, Serialize};

/// Tick marker proportions relative to the ribbon thickness.
pub type TickConfig = geometry::TickStyle;

/// Root marker growth: `multiplier * base^-(zoom - zoom_reference)`.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResizeConfig {
    pub base: f64,
    pub multiplier: f64,
    pub zoom_reference: f64,
}

impl Default for ResizeConfig {
    fn default() -> Self {
        Self {
            base: 1.75,
            multiplier: 1.0,
            zoom_reference: 12.0,
        }
    }
}

impl ResizeConfig {
    pub fn extra(&self, zoom: f64) -> f64 {
        self.multiplier * self.base.powf(-(zoom - self.zoom_reference))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WellboreConfig {
    /// Relative scale of all components.
    pub scale: f64,
    pub wellbore_width: f64,
    pub root_radius: f64,
    /// Wellbores added per batch-loop step.
    pub batch_size: usize,
    /// Zoom level where the scaling function input is 0.
    pub zoom_origin: f64,
    /// Cell size of the wellbore line index; roots use ten times this.
    pub grid_size: f64,
    pub root_resize: ResizeConfig,
    pub label_bg_opacity: f64,
    pub label_scale: f64,
    pub font_size: f64,
    /// Pointer distance, in grid cells, for path hits.
    pub highlight_distance: f64,
    pub tick: TickConfig,
}

impl Default for WellboreConfig {
    fn default() -> Self {
        Self {
            scale: 1.0,
            wellbore_width: 0.15,
            root_radius: 0.4,
            batch_size: 15,
            zoom_origin: 0.0,
            grid_size: 2.0,
            root_resize: ResizeConfig::default(),
            label_bg_opacity: 0.5,
            label_scale: 0.011,
            font_size: 18.0,
            highlight_distance: 0.5,
            tick: TickConfig::default(),
        }
    }
}

impl WellboreConfig {
    /// Copy with `scale` folded into the wellbore width and root radius.
    pub fn resolved(&self) -> Self {
        Self {
            wellbore_width: self.wellbore_width * self.scale,
            root_radius: self.root_radius * self.scale,
            ..self.clone()
        }
    }

    /// Root marker radius at `zoom`, matching the root shader's growth curve.
    pub fn root_radius_at(&self, zoom: f64) -> f64 {
        self.root_radius + self.root_resize.extra(zoom)
    }
}

#[cfg(test)]
mod tests {
    use super::WellboreConfig;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg: WellboreConfig =
            serde_json::from_str(r#"{"scale":2.0,"gridSize":4,"rootResize":{"base":2.0}}"#).unwrap();
        assert_eq!(cfg.grid_size, 4.0);
        assert_eq!(cfg.batch_size, 15);
        assert_eq!(cfg.root_resize.base, 2.0);
        assert_eq!(cfg.root_resize.zoom_reference, 12.0);

        let resolved = cfg.resolved();
        assert!((resolved.wellbore_width - 0.3).abs() < 1e-12);
        assert!((resolved.root_radius - 0.8).abs() < 1e-12);
    }

    #[test]
    fn root_radius_shrinks_with_zoom() {
        let cfg = WellboreConfig::default();
        assert!((cfg.root_radius_at(12.0) - 1.4).abs() < 1e-12);
        assert!(cfg.root_radius_at(20.0) < cfg.root_radius_at(12.0));
        assert!(cfg.root_radius_at(20.0) > cfg.root_radius);
    }
}
