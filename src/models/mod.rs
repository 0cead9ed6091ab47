pub mod files;
pub mod messages;
pub mod presence;

pub use files::*;
pub use messages::*;
pub use presence::*;
