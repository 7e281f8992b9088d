pub mod integrators;
