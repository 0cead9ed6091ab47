pub mod color;
pub mod heartbeat;
pub mod overlay;

pub use color::*;
pub use heartbeat::*;
pub use overlay::*;
