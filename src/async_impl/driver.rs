use std::sync::Arc;
use std::time::Instant;

use crate::config::SimulationConfig;
use crate::error::SimulationError;
use crate::ipc::channels::LotEvent;
use crate::lot::ParkingLot;
use crate::metrics::{LotMetrics, SimulationReport};
use crate::threaded_impl::driver::panic_message;
use crate::vehicle::{RetryPolicy, TrafficGenerator};

use super::vehicle_task::vehicle_task;

/// Task-per-vehicle variant of [`run_simulation`](crate::run_simulation).
/// Must be called from within a tokio runtime with the time driver enabled.
pub async fn run_simulation_async(
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
        "starting async simulation"
    );
    let started = Instant::now();

    let mut handles = Vec::with_capacity(config.vehicles);
    for scheduled in traffic.take(config.vehicles) {
        let handle = tokio::spawn(vehicle_task(
            scheduled.vehicle,
            scheduled.dwell,
            Arc::clone(&lot),
            policy.clone(),
            metrics.clone(),
        ));
        handles.push((scheduled.vehicle.id(), handle));
        tokio::time::sleep(scheduled.stagger).await;
    }

    let mut outcomes = Vec::with_capacity(handles.len());
    let mut failure = None;
    for (vehicle, handle) in handles {
        match handle.await {
            Ok(outcome) => outcomes.push(outcome),
            Err(err) if err.is_panic() => {
                let payload = err.into_panic();
                let message = panic_message(payload.as_ref());
                tracing::error!(vehicle, %message, "vehicle task panicked");
                failure.get_or_insert(SimulationError::VehiclePanicked { vehicle, message });
            }
            Err(err) => {
                failure.get_or_insert(SimulationError::Runtime(err.to_string()));
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
        "async simulation complete"
    );
    Ok(report)
}

/// Builds a multi-threaded runtime and runs the async simulation on it.
pub fn run_simulation_on_runtime(
    lot: Arc<ParkingLot>,
    config: &SimulationConfig,
) -> Result<SimulationReport, SimulationError> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_time()
        .build()
        .map_err(|e| SimulationError::Runtime(e.to_string()))?;
    runtime.block_on(run_simulation_async(lot, config))
}
