pub mod colors;
pub mod config;
pub mod detail;
pub mod error;
pub mod events;
pub mod group;
pub mod highlight;
pub mod hit_test;
pub mod ids;
pub mod label;
pub mod root;
pub mod source;
pub mod status;
pub mod store;
pub mod wellbore;

// Wellbore data model: groups, roots and paths in an index arena.
pub use colors::*;
pub use config::*;
pub use detail::*;
pub use error::*;
pub use events::*;
pub use group::*;
pub use highlight::*;
pub use hit_test::*;
pub use ids::*;
pub use label::*;
pub use root::*;
pub use source::*;
pub use status::*;
pub use store::*;
pub use wellbore::*;
