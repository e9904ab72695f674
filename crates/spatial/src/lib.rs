pub mod error;
pub mod grid;
pub mod line_dictionary;
pub mod line_point;
pub mod point_dictionary;
pub mod triangle_dictionary;

// Grid-hashed lookup structures answering "what is near this position?".
pub use error::*;
pub use grid::*;
pub use line_dictionary::*;
pub use line_point::*;
pub use point_dictionary::*;
pub use triangle_dictionary::*;
