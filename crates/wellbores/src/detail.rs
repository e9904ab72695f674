use std::fmt;

use foundation::math::Vec2;
use geometry::{LineInterpolator, shoe_quad};
use tracing::debug;

use crate::source::SourceData;

/// Relative position along a wellbore: a single point or a `[start, end]` span.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum RelativePosition {
    At(f64),
    Span(f64, f64),
}

/// Extracts detail positions from a wellbore record and its group key.
pub type DetailSource = Box<dyn Fn(&SourceData, &str) -> Vec<RelativePosition>>;

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum DetailShape {
    /// Casing shoe trapezoid.
    Shoe { width_top: f64, width_bottom: f64 },
}

impl Default for DetailShape {
    fn default() -> Self {
        Self::Shoe {
            width_top: 1.0,
            width_bottom: 1.0,
        }
    }
}

pub struct DetailOptions {
    pub source: DetailSource,
    pub shape: DetailShape,
    pub color: [f32; 3],
}

impl DetailOptions {
    pub fn shoe(source: DetailSource, width_top: f64, width_bottom: f64) -> Self {
        Self {
            source,
            shape: DetailShape::Shoe {
                width_top,
                width_bottom,
            },
            color: [0.0, 0.0, 0.0],
        }
    }
}

/// Graphics drawn along wellbores of a group. Built lazily the first time
/// the detail is shown.
pub struct Detail {
    options: DetailOptions,
    pub initialized: bool,
    pub visible: bool,
}

impl fmt::Debug for Detail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Detail")
            .field("shape", &self.options.shape)
            .field("color", &self.options.color)
            .field("initialized", &self.initialized)
            .field("visible", &self.visible)
            .finish()
    }
}

impl Detail {
    pub fn new(options: DetailOptions) -> Self {
        Self {
            options,
            initialized: false,
            visible: false,
        }
    }

    pub fn color(&self) -> [f32; 3] {
        self.options.color
    }

    pub fn positions(&self, data: &SourceData, group: &str) -> Vec<RelativePosition> {
        (self.options.source)(data, group)
    }

    /// Quads for every position of `data`. Single points have no extent and
    /// are skipped.
    pub fn build(&self, data: &SourceData, group: &str, interp: &LineInterpolator) -> Vec<[Vec2; 4]> {
        let DetailShape::Shoe {
            width_top,
            width_bottom,
        } = self.options.shape;
        self.positions(data, group)
            .into_iter()
            .filter_map(|p| match p {
                RelativePosition::Span(top, bottom) => {
                    Some(shoe_quad(interp, top, bottom, width_top, width_bottom))
                }
                RelativePosition::At(at) => {
                    debug!(label = %data.label, at, "shoe detail needs a span");
                    None
                }
            })
            .collect()
    }
}

/// Detail geometry attached to one wellbore.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailMesh {
    pub quads: Vec<[Vec2; 4]>,
    pub color: [f32; 3],
    pub visible: bool,
}

#[cfg(test)]
mod tests {
    use super::{Detail, DetailOptions, RelativePosition};
    use crate::source::SourceData;
    use foundation::math::Vec2;
    use geometry::LineInterpolator;

    #[test]
    fn builds_one_quad_per_span() {
        let detail = Detail::new(DetailOptions::shoe(
            Box::new(|_, _| vec![RelativePosition::Span(0.5, 1.0), RelativePosition::At(0.2)]),
            0.5,
            0.25,
        ));
        let interp = LineInterpolator::new(&[Vec2::new(0.0, 0.0), Vec2::new(4.0, 0.0)], 0.1).unwrap();
        let data = SourceData::new("A", vec![[0.0, 0.0], [4.0, 0.0]]);
        let quads = detail.build(&data, "default", &interp);
        assert_eq!(quads.len(), 1);
        assert!(quads[0][0].approx_eq(Vec2::new(2.0, 0.5), 1e-9));
        assert!(quads[0][1].approx_eq(Vec2::new(4.0, 0.25), 1e-9));
        assert!(!detail.initialized);
    }
}
