//! Core types, traits, and error definitions for FanPlay.
//!
//! This crate provides the building blocks shared by the moment analysis
//! orchestrator, the engine gateway and the HTTP surface.

pub mod config;
pub mod error;
pub mod mocks;
pub mod traits;
pub mod types;

pub use error::{Error, Result};
pub use traits::*;
pub use types::*;
