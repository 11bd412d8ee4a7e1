//! One tokio task per vehicle, futures-based wakeups between attempts

pub mod driver;
pub mod vehicle_task;

pub use driver::{run_simulation_async, run_simulation_on_runtime};
pub use vehicle_task::vehicle_task;
