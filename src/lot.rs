//! Lot module - space pool, entrance gate and the admission/departure protocol

pub mod coordinator;
pub mod gate;
pub mod observer;
pub mod signal;
pub mod space_pool;

pub type VehicleId = u32;
pub type SlotId = usize;

pub use coordinator::{Crossing, EnterOutcome, ExitOutcome, ParkingLot};
pub use gate::{Direction, EntranceGate, GatePass};
pub use observer::{LotObserver, NoopObserver};
pub use signal::ChangeSignal;
pub use space_pool::SpacePool;
