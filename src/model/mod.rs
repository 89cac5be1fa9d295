// src/model/mod.rs

pub mod buffer;
pub mod color;
pub mod network;
pub mod vehicle;
