//! One OS thread per vehicle, blocking waits between attempts

pub mod driver;
pub mod vehicle_thread;

pub use driver::run_simulation;
pub use vehicle_thread::{drive, spawn_vehicle_thread};
