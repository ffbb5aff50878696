//! Core type definitions for FanPlay.
//!
//! Broken down into submodules: the caller-facing vocabulary (sport,
//! persona), the normalized request, the guide returned to the caller,
//! and the engine wire contract.

pub mod engine;
pub mod guide;
pub mod persona;
pub mod request;
pub mod sport;

pub use engine::*;
pub use guide::*;
pub use persona::*;
pub use request::*;
pub use sport::*;
