//! HTTP surface for FanPlay.
//!
//! Exposes per-session moment analysis to the web client.

pub mod server;
pub mod sessions;

pub use server::{GatewayConfig, GatewayServer};
pub use sessions::SessionRegistry;
