use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crate::ipc::channels::LotEvent;
use crate::lot::{EnterOutcome, ExitOutcome, ParkingLot};
use crate::metrics::LotMetrics;
use crate::vehicle::{RetryPolicy, TripOutcome, Vehicle};

/// Runs one vehicle on the calling thread: retry Enter until admitted, park
/// for `dwell`, then retry Exit until departed.
pub fn drive(
    vehicle: Vehicle,
    dwell: Duration,
    lot: &ParkingLot,
    policy: &RetryPolicy,
    metrics: &LotMetrics,
) -> TripOutcome {
    let id = vehicle.id();
    lot.emit(LotEvent::Arrived { vehicle: id });

    // 1. Get in
    let arrived = Instant::now();
    let mut entry_attempts = 0u32;
    let slot = loop {
        let ticket = lot.signal().ticket();
        entry_attempts += 1;
        metrics.record_enter_attempt();

        if let EnterOutcome::Admitted(slot) = lot.try_enter(id) {
            break slot;
        }

        if policy.entry_exhausted(entry_attempts) {
            tracing::warn!(vehicle = id, attempts = entry_attempts, "giving up on entry");
            metrics.record_starved();
            lot.emit(LotEvent::GaveUp {
                vehicle: id,
                attempts: entry_attempts,
            });
            return TripOutcome::Starved {
                vehicle: id,
                attempts: entry_attempts,
            };
        }
        back_off(lot, ticket, policy);
    };
    metrics.record_admission(arrived.elapsed());

    // 2. Park
    thread::sleep(dwell);

    // 3. Get out; never capped, the space has to come back
    let leaving = Instant::now();
    let mut exit_attempts = 0u32;
    loop {
        let ticket = lot.signal().ticket();
        exit_attempts += 1;
        metrics.record_exit_attempt();

        if lot.try_exit(id, slot) == ExitOutcome::Departed {
            break;
        }
        back_off(lot, ticket, policy);
    }
    metrics.record_departure(leaving.elapsed());

    TripOutcome::Completed {
        vehicle: id,
        slot,
        entry_attempts,
        exit_attempts,
    }
}

fn back_off(lot: &ParkingLot, ticket: u64, policy: &RetryPolicy) {
    if policy.wake_on_release {
        lot.signal().wait_since(ticket, policy.backoff);
    } else {
        thread::sleep(policy.backoff);
    }
}

pub fn spawn_vehicle_thread(
    vehicle: Vehicle,
    dwell: Duration,
    lot: Arc<ParkingLot>,
    policy: RetryPolicy,
    metrics: LotMetrics,
) -> thread::JoinHandle<TripOutcome> {
    thread::spawn(move || drive(vehicle, dwell, &lot, &policy, &metrics))
}
