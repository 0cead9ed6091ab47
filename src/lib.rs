//! Client side of a shared editing surface.
//!
//! - `session`: the single current editor/collaboration pairing and its lifecycle
//! - `presence`: participant colors, remote cursor overlays and the presence heartbeat
//! - `services`: document list, local identity, message log and chat input
//! - `ws`: collaboration client contract and the WebSocket transport
//! - `editor`: editor surface contract plus mode/theme/keymap tables
//! - `clients`: document listing over HTTP
//! - `app`: context object and event loop tying everything together

pub mod app;
pub mod clients;
pub mod config;
pub mod editor;
pub mod models;
pub mod presence;
pub mod services;
pub mod session;
pub mod ws;
