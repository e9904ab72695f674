use geometry::GeometryError;
use spatial::SpatialError;
use thiserror::Error;
use wellbores::WellboreError;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayerError {
    #[error(transparent)]
    Wellbore(#[from] WellboreError),
    #[error(transparent)]
    Spatial(#[from] SpatialError),
    #[error(transparent)]
    Geometry(#[from] GeometryError),
}

pub type Result<T> = std::result::Result<T, LayerError>;
