pub mod error;
pub mod interpolator;
pub mod intervals;
pub mod line_mesh;
pub mod polygon;
pub mod quad;
pub mod reduce;
pub mod ribbon;
pub mod shoe;

// Procedural geometry: path parameterization and triangulated meshes.
pub use error::*;
pub use interpolator::*;
pub use intervals::*;
pub use line_mesh::*;
pub use polygon::*;
pub use quad::*;
pub use reduce::*;
pub use ribbon::*;
pub use shoe::*;
