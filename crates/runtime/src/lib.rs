pub mod batch_loop;
pub mod budget;
pub mod redraw;

// Frame-driven cooperative scheduling primitives.
pub use batch_loop::*;
pub use budget::*;
pub use redraw::*;
