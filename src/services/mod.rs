pub mod chat;
pub mod doc_list;
pub mod identity;
pub mod message_log;

pub use chat::*;
pub use doc_list::*;
pub use identity::*;
pub use message_log::*;
