use single_lane_parking::{
    run_simulation, Direction, EnterOutcome, ExitOutcome, LotObserver, NotificationSink,
    ParkingLot, SimulationConfig, SimulationError, SlotId, SpacePool,
};
use crossbeam::channel::{bounded, Receiver, Sender};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use std::thread::{self, JoinHandle};
use std::time::Duration;

// ============================================================================
// CONTRACT VIOLATIONS ARE FATAL
// ============================================================================

#[test]
#[should_panic(expected = "slot 0 is already occupied")]
fn occupying_an_occupied_slot_panics() {
    let pool = SpacePool::new(2);
    pool.occupy(0);
    pool.occupy(0);
}

#[test]
#[should_panic(expected = "slot 1 is already free")]
fn releasing_a_free_slot_panics() {
    let pool = SpacePool::new(2);
    pool.release(1);
}

#[test]
#[should_panic(expected = "out of range")]
fn slot_outside_the_lot_panics() {
    let pool = SpacePool::new(2);
    pool.occupy(2);
}

#[test]
fn exiting_from_an_empty_slot_panics_and_frees_the_lane() {
    let lot = Arc::new(ParkingLot::new(1, Duration::ZERO, NotificationSink::disabled()));

    let result = {
        let lot = Arc::clone(&lot);
        std::thread::spawn(move || lot.try_exit(9, 0)).join()
    };

    assert!(result.is_err(), "releasing a free slot must not succeed silently");
    assert_eq!(lot.direction(), Direction::Idle);
    assert_eq!(lot.exits(), 0);
}

// ============================================================================
// FORCED RACES
// ============================================================================

// Fills the last space the moment an entering vehicle takes the gate, i.e.
// between the free-space probe and the slot lookup.
struct StealLastSpace {
    lot: OnceLock<Arc<ParkingLot>>,
    armed: AtomicBool,
}

impl LotObserver for StealLastSpace {
    fn direction_changed(&self, direction: Direction) {
        if direction == Direction::Entering && self.armed.swap(false, Ordering::SeqCst) {
            if let Some(lot) = self.lot.get() {
                lot.pool().occupy(0);
            }
        }
    }
}

#[test]
fn lost_race_for_last_space_restores_idle() {
    let observer = Arc::new(StealLastSpace {
        lot: OnceLock::new(),
        armed: AtomicBool::new(true),
    });
    let lot = Arc::new(ParkingLot::with_observer(
        1,
        Duration::ZERO,
        NotificationSink::disabled(),
        observer.clone(),
    ));
    let _ = observer.lot.set(Arc::clone(&lot));

    assert_eq!(lot.try_enter(1), EnterOutcome::NotAdmitted);

    // No lockout of the opposite direction
    assert_eq!(lot.direction(), Direction::Idle);
    assert!(!lot.gate().is_held());
    assert_eq!(lot.try_exit(2, 0), ExitOutcome::Departed);
    assert_eq!(lot.try_enter(3), EnterOutcome::Admitted(0));
}

// Stalls the first Idle report until a second vehicle has tried to take the
// lane, and records directions in the order the renderer receives them.
struct StallFirstIdle {
    lot: OnceLock<Arc<ParkingLot>>,
    armed: AtomicBool,
    last_seen: Mutex<Direction>,
    rival: Mutex<Option<(JoinHandle<()>, Sender<()>)>>,
}

impl StallFirstIdle {
    fn new() -> Self {
        Self {
            lot: OnceLock::new(),
            armed: AtomicBool::new(true),
            last_seen: Mutex::new(Direction::Idle),
            rival: Mutex::new(None),
        }
    }

    // Vehicle 2 tries to enter and, if admitted, keeps the lane until told
    // to finish.
    fn start_rival(lot: Arc<ParkingLot>) -> (JoinHandle<()>, Sender<()>, Receiver<bool>) {
        let (admitted_tx, admitted_rx) = bounded(1);
        let (finish_tx, finish_rx) = bounded::<()>(1);
        let handle = thread::spawn(move || {
            let crossing = lot.start_entry(2);
            let _ = admitted_tx.send(crossing.is_some());
            let _ = finish_rx.recv();
            drop(crossing);
        });
        (handle, finish_tx, admitted_rx)
    }
}

impl LotObserver for StallFirstIdle {
    fn direction_changed(&self, direction: Direction) {
        if direction == Direction::Idle && self.armed.swap(false, Ordering::SeqCst) {
            if let Some(lot) = self.lot.get() {
                let (handle, finish_tx, admitted_rx) = Self::start_rival(Arc::clone(lot));
                let _ = admitted_rx.recv_timeout(Duration::from_secs(5));
                *self.rival.lock() = Some((handle, finish_tx));
            }
        }
        *self.last_seen.lock() = direction;
    }
}

#[test]
fn renderer_never_sees_a_stale_idle() {
    let observer = Arc::new(StallFirstIdle::new());
    let lot = Arc::new(ParkingLot::with_observer(
        2,
        Duration::ZERO,
        NotificationSink::disabled(),
        observer.clone(),
    ));
    let _ = observer.lot.set(Arc::clone(&lot));
    lot.pool().occupy(0);

    assert_eq!(lot.try_exit(1, 0), ExitOutcome::Departed);

    // Whatever vehicle 2 managed, the last report matches the lane
    assert_eq!(*observer.last_seen.lock(), lot.direction());

    if let Some((handle, finish_tx)) = observer.rival.lock().take() {
        let _ = finish_tx.send(());
        handle.join().expect("rival vehicle panicked");
    }
    assert_eq!(lot.direction(), Direction::Idle);
    assert_eq!(*observer.last_seen.lock(), Direction::Idle);
}

struct ExplodingObserver;

impl LotObserver for ExplodingObserver {
    fn slot_changed(&self, _slot: SlotId, occupied: bool) {
        if occupied {
            panic!("injected renderer failure");
        }
    }
}

#[test]
fn panicking_vehicle_is_reported() {
    let config = SimulationConfig {
        capacity: 2,
        vehicles: 2,
        time_unit_ms: 1,
        backoff_ms: 1,
        seed: Some(3),
        ..SimulationConfig::default()
    };
    let lot = Arc::new(ParkingLot::with_observer(
        config.capacity,
        config.crossing_delay(),
        NotificationSink::disabled(),
        Arc::new(ExplodingObserver),
    ));

    let err = run_simulation(Arc::clone(&lot), &config).unwrap_err();

    match err {
        SimulationError::VehiclePanicked { vehicle, message } => {
            assert_eq!(vehicle, 1);
            assert!(message.contains("injected renderer failure"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(lot.direction(), Direction::Idle, "unwinding released the gate");
}
