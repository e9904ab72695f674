pub mod error;
pub mod faultline;
pub mod field;
pub mod host;
pub mod layer;
pub mod outline;
pub mod wellbore;

// Map overlays driven through host ports.
pub use error::*;
pub use faultline::*;
pub use field::*;
pub use host::*;
pub use layer::*;
pub use outline::*;
pub use wellbore::*;
