// rov_runtime/src/runtime/mod.rs

pub mod config;
pub mod core;
pub mod plugins;
