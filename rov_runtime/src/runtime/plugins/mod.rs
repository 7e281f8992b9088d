// rov_runtime/src/runtime/plugins/mod.rs

pub mod control_loop;
pub mod io;
