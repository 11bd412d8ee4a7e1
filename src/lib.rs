pub mod lot;
pub mod vehicle;
pub mod ipc;
pub mod metrics;
pub mod threaded_impl;
pub mod async_impl;
pub mod config;
pub mod error;

pub use lot::{
    ChangeSignal, Crossing, Direction, EnterOutcome, EntranceGate, ExitOutcome, GatePass,
    LotObserver, NoopObserver, ParkingLot, SlotId, SpacePool, VehicleId,
};
pub use vehicle::{RetryPolicy, ScheduledVehicle, TrafficGenerator, TripOutcome, Vehicle};
pub use ipc::{spawn_status_listener, EventChannel, LotEvent, NotificationSink, OverflowPolicy, StatusLog};
pub use metrics::{LotMetrics, MetricsReport, SimulationReport};
pub use threaded_impl::run_simulation;
pub use async_impl::{run_simulation_async, run_simulation_on_runtime};
pub use config::{load_config, SimulationConfig};
pub use error::{ConfigError, SimulationError};
