// src/strategy/mod.rs

pub mod extraction;
pub mod placement;
pub mod scoring;
pub mod traits;
