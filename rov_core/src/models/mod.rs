// rov_core/src/models/mod.rs

pub mod dynamics;
