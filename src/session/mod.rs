pub mod active_session;
pub mod manager;

#[cfg(test)]
pub(crate) mod testing;

pub use active_session::*;
pub use manager::*;
