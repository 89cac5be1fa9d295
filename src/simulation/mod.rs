// src/simulation/mod.rs

pub mod comparison;
pub mod config;
pub mod engine;
pub mod error;
pub mod metrics;
