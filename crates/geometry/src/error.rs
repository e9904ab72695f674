use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("path has no points")]
    EmptyPath,

    #[error("polygon triangulation failed: {0}")]
    Triangulation(String),
}

pub type Result<T> = std::result::Result<T, GeometryError>;
