use std::any::Any;
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use crate::config::SimulationConfig;
use crate::error::SimulationError;
use crate::ipc::channels::LotEvent;
use crate::lot::ParkingLot;
use crate::metrics::{LotMetrics, SimulationReport};
use crate::vehicle::{RetryPolicy, TrafficGenerator};

use super::vehicle_thread::spawn_vehicle_thread;

/// Spawns `config.vehicles` vehicle threads with exponential stagger, waits
/// for all of them and reports the run.
///
/// Every thread is joined even if one panicked; the first panic is returned.
pub fn run_simulation(
    lot: Arc<ParkingLot>,
    config: &SimulationConfig,
) -> Result<SimulationReport, SimulationError> {
    config.validate()?;
    let traffic = TrafficGenerator::from_config(config)?;
    let policy = RetryPolicy::from_config(config);
    let metrics = LotMetrics::new();

    tracing::info!(
        vehicles = config.vehicles,
        capacity = lot.capacity(),
        "starting threaded simulation"
    );
    let started = Instant::now();

    let mut handles = Vec::with_capacity(config.vehicles);
    for scheduled in traffic.take(config.vehicles) {
        let handle = spawn_vehicle_thread(
            scheduled.vehicle,
            scheduled.dwell,
            Arc::clone(&lot),
            policy.clone(),
            metrics.clone(),
        );
        handles.push((scheduled.vehicle.id(), handle));
        thread::sleep(scheduled.stagger);
    }

    let mut outcomes = Vec::with_capacity(handles.len());
    let mut failure = None;
    for (vehicle, handle) in handles {
        match handle.join() {
            Ok(outcome) => outcomes.push(outcome),
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                tracing::error!(vehicle, %message, "vehicle thread panicked");
                failure.get_or_insert(SimulationError::VehiclePanicked { vehicle, message });
            }
        }
    }
    if let Some(err) = failure {
        return Err(err);
    }

    lot.emit(LotEvent::SimulationComplete { exits: lot.exits() });
    let report = SimulationReport::collect(&lot, outcomes, &metrics, started.elapsed());
    tracing::info!(
        exits = report.total_exits,
        starved = report.starved,
        elapsed = ?report.elapsed,
        "threaded simulation complete"
    );
    Ok(report)
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
