// rov_runtime/src/runtime/core/mod.rs

pub mod clock;
pub mod prng;
pub mod setup;
pub mod shared;
