// src/io/mod.rs

pub mod color_source;
pub mod reporting;
