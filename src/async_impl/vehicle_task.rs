use std::sync::Arc;
use tokio::sync::futures::Notified;
use tokio::time::{sleep, timeout, Duration, Instant};

use crate::ipc::channels::LotEvent;
use crate::lot::ParkingLot;
use crate::metrics::LotMetrics;
use crate::vehicle::{RetryPolicy, TripOutcome, Vehicle};

/// Same trip as the threaded actor, with the crossing hold and the waits
/// done as tokio sleeps so no worker thread is blocked.
pub async fn vehicle_task(
    vehicle: Vehicle,
    dwell: Duration,
    lot: Arc<ParkingLot>,
    policy: RetryPolicy,
    metrics: LotMetrics,
) -> TripOutcome {
    let id = vehicle.id();
    lot.emit(LotEvent::Arrived { vehicle: id });

    let arrived = Instant::now();
    let mut entry_attempts = 0u32;
    let slot = loop {
        let notified = lot.signal().notified();
        entry_attempts += 1;
        metrics.record_enter_attempt();

        if let Some(crossing) = lot.start_entry(id) {
            let slot = crossing.slot();
            sleep(lot.crossing_delay()).await;
            crossing.finish();
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
        back_off(notified, &policy).await;
    };
    metrics.record_admission(arrived.elapsed());

    sleep(dwell).await;

    let leaving = Instant::now();
    let mut exit_attempts = 0u32;
    loop {
        let notified = lot.signal().notified();
        exit_attempts += 1;
        metrics.record_exit_attempt();

        if let Some(crossing) = lot.start_exit(id, slot) {
            sleep(lot.crossing_delay()).await;
            crossing.finish();
            break;
        }
        back_off(notified, &policy).await;
    }
    metrics.record_departure(leaving.elapsed());

    TripOutcome::Completed {
        vehicle: id,
        slot,
        entry_attempts,
        exit_attempts,
    }
}

async fn back_off(notified: Notified<'_>, policy: &RetryPolicy) {
    if policy.wake_on_release {
        // Timing out is the normal polling path.
        let _ = timeout(policy.backoff, notified).await;
    } else {
        sleep(policy.backoff).await;
    }
}
