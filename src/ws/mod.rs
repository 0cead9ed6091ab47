pub mod collab;
pub mod wsclient;

pub use collab::*;
pub use wsclient::{WsCollabClient, WsCollabFactory};
