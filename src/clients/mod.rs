pub mod files_client;

pub use files_client::*;
