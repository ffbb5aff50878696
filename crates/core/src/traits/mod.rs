//! Core traits for FanPlay.
//!
//! - `engine`: the external reasoning/search/vision engine seam

pub mod engine;

pub use engine::*;
