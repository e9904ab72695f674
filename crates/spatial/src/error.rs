use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SpatialError {
    /// Point dictionaries only look at neighbouring cells, so a search radius
    /// larger than a cell would miss entries.
    #[error("grid size {grid_size} of point dictionary must be at least the root radius {radius}")]
    GridSmallerThanRadius { grid_size: f64, radius: f64 },

    #[error("cannot index a line without points")]
    EmptyPath,

    #[error("triangle index {index} out of bounds for {vertex_count} vertices")]
    TriangleIndexOutOfBounds { index: usize, vertex_count: usize },
}

pub type Result<T> = std::result::Result<T, SpatialError>;
