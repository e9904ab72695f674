use geometry::GeometryError;
use spatial::SpatialError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum WellboreError {
    #[error("group [{0}] already registered")]
    GroupAlreadyRegistered(String),
    #[error("group [{0}] not registered")]
    UnknownGroup(String),
    #[error("detail {detail} already registered for group {group}")]
    DetailAlreadyRegistered { group: String, detail: String },
    #[error("empty wellbore path")]
    EmptyPath,
    #[error(transparent)]
    Spatial(#[from] SpatialError),
    #[error(transparent)]
    Geometry(#[from] GeometryError),
}

pub type Result<T> = std::result::Result<T, WellboreError>;
