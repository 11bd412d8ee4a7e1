//! The lot itself: admission and departure through the shared lane.
//!
//! Lock order is gate token, then the space pool lock, then the exit counter,
//! then the notification sink. The pool lock is never held while the gate is
//! being acquired.
//!
//! `Entering` and `Left` are emitted while the lane is held. With
//! `OverflowPolicy::Block` a consumer that stops draining therefore stalls the
//! lane, so a blocking sink needs a listener running for the whole run
//! (`spawn_status_listener`).

use parking_lot::Mutex;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use super::gate::{Direction, EntranceGate, GatePass};
use super::observer::{LotObserver, NoopObserver};
use super::signal::ChangeSignal;
use super::space_pool::SpacePool;
use super::{SlotId, VehicleId};
use crate::config::SimulationConfig;
use crate::ipc::channels::{LotEvent, NotificationSink};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnterOutcome {
    Admitted(SlotId),
    NotAdmitted,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExitOutcome {
    Departed,
    NotDeparted,
}

// ============================================================================
// PARKING LOT
// ============================================================================

pub struct ParkingLot {
    pool: SpacePool,
    gate: EntranceGate,
    exits: Mutex<u64>,
    sink: NotificationSink,
    observer: Arc<dyn LotObserver>,
    signal: ChangeSignal,
    crossing_delay: Duration,
}

impl ParkingLot {
    pub fn new(capacity: usize, crossing_delay: Duration, sink: NotificationSink) -> Self {
        Self::with_observer(capacity, crossing_delay, sink, Arc::new(NoopObserver))
    }

    pub fn with_observer(
        capacity: usize,
        crossing_delay: Duration,
        sink: NotificationSink,
        observer: Arc<dyn LotObserver>,
    ) -> Self {
        Self {
            pool: SpacePool::with_observer(capacity, Arc::clone(&observer)),
            gate: EntranceGate::new(),
            exits: Mutex::new(0),
            sink,
            observer,
            signal: ChangeSignal::new(),
            crossing_delay,
        }
    }

    pub fn from_config(config: &SimulationConfig, sink: NotificationSink) -> Self {
        Self::new(config.capacity, config.crossing_delay(), sink)
    }

    /// Single non-blocking admission attempt. On success the lane is held for
    /// the crossing delay before this returns.
    pub fn try_enter(&self, vehicle: VehicleId) -> EnterOutcome {
        match self.start_entry(vehicle) {
            Some(crossing) => {
                let slot = crossing.slot();
                thread::sleep(self.crossing_delay);
                crossing.finish();
                EnterOutcome::Admitted(slot)
            }
            None => EnterOutcome::NotAdmitted,
        }
    }

    /// Single non-blocking departure attempt for a vehicle parked in `slot`.
    pub fn try_exit(&self, vehicle: VehicleId, slot: SlotId) -> ExitOutcome {
        match self.start_exit(vehicle, slot) {
            Some(crossing) => {
                thread::sleep(self.crossing_delay);
                crossing.finish();
                ExitOutcome::Departed
            }
            None => ExitOutcome::NotDeparted,
        }
    }

    /// Admission without the crossing hold. The returned guard keeps the lane
    /// until it is finished or dropped; the caller decides how to wait.
    pub fn start_entry(&self, vehicle: VehicleId) -> Option<Crossing<'_>> {
        if !self.pool.has_free_slot() {
            self.sink.emit(LotEvent::WaitingForSpace { vehicle });
            return None;
        }

        let pass = match self.gate.try_acquire(Direction::Entering) {
            Ok(pass) => pass,
            Err(Direction::Exiting) => {
                self.sink.emit(LotEvent::WaitingForEntrance { vehicle });
                return None;
            }
            // Same-direction traffic holds the lane; retry shortly.
            Err(_) => return None,
        };
        self.observer.direction_changed(Direction::Entering);

        match self.pool.claim_free_slot() {
            Some(slot) => {
                tracing::debug!(vehicle, slot, "admitted");
                self.sink.emit(LotEvent::Entering { vehicle, slot });
                Some(Crossing::new(self, pass, slot))
            }
            None => {
                // Last space went between the probe and the gate.
                tracing::debug!(vehicle, "lot filled while acquiring the gate");
                self.end_crossing(pass);
                None
            }
        }
    }

    /// Departure without the crossing hold.
    ///
    /// # Panics
    /// Panics if `slot` is not currently occupied.
    pub fn start_exit(&self, vehicle: VehicleId, slot: SlotId) -> Option<Crossing<'_>> {
        let pass = match self.gate.try_acquire(Direction::Exiting) {
            Ok(pass) => pass,
            Err(Direction::Entering) => {
                self.sink.emit(LotEvent::WaitingToExit { vehicle });
                return None;
            }
            Err(_) => return None,
        };
        self.observer.direction_changed(Direction::Exiting);

        self.pool.release(slot);
        let total_exits = {
            let mut exits = self.exits.lock();
            *exits += 1;
            *exits
        };

        tracing::debug!(vehicle, slot, total_exits, "departed");
        self.sink.emit(LotEvent::Left {
            vehicle,
            slot,
            total_exits,
        });
        Some(Crossing::new(self, pass, slot))
    }

    // Idle is reported while the pass is still held, so it can never arrive
    // after the next holder's direction.
    fn end_crossing(&self, pass: GatePass<'_>) {
        self.observer.direction_changed(Direction::Idle);
        pass.release();
        self.signal.notify();
    }

    pub fn emit(&self, event: LotEvent) {
        self.sink.emit(event);
    }

    pub fn exits(&self) -> u64 {
        *self.exits.lock()
    }

    pub fn capacity(&self) -> usize {
        self.pool.capacity()
    }

    pub fn occupied_count(&self) -> usize {
        self.pool.occupied_count()
    }

    pub fn direction(&self) -> Direction {
        self.gate.direction()
    }

    pub fn crossing_delay(&self) -> Duration {
        self.crossing_delay
    }

    pub fn pool(&self) -> &SpacePool {
        &self.pool
    }

    pub fn gate(&self) -> &EntranceGate {
        &self.gate
    }

    pub fn signal(&self) -> &ChangeSignal {
        &self.signal
    }

    pub fn sink(&self) -> &NotificationSink {
        &self.sink
    }
}

// ============================================================================
// CROSSING - a vehicle physically in the lane
// ============================================================================

/// Lane held by one vehicle. Finishing or dropping it frees the lane and
/// wakes waiting actors.
pub struct Crossing<'a> {
    lot: &'a ParkingLot,
    pass: Option<GatePass<'a>>,
    slot: SlotId,
}

impl<'a> Crossing<'a> {
    fn new(lot: &'a ParkingLot, pass: GatePass<'a>, slot: SlotId) -> Self {
        Self {
            lot,
            pass: Some(pass),
            slot,
        }
    }

    pub fn slot(&self) -> SlotId {
        self.slot
    }

    pub fn direction(&self) -> Direction {
        self.pass
            .as_ref()
            .map(|pass| pass.direction())
            .unwrap_or(Direction::Idle)
    }

    pub fn finish(self) {}
}

impl Drop for Crossing<'_> {
    fn drop(&mut self) {
        if let Some(pass) = self.pass.take() {
            self.lot.end_crossing(pass);
        }
    }
}
