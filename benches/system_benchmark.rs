use criterion::{criterion_group, criterion_main, Criterion};
use single_lane_parking::lot::{Direction, EntranceGate, ParkingLot};
use single_lane_parking::NotificationSink;
use std::time::Duration;

fn benchmark_gate_cycle(c: &mut Criterion) {
    let gate = EntranceGate::new();
    c.bench_function("gate_acquire_release", |b| {
        b.iter(|| {
            if let Ok(pass) = gate.try_acquire(Direction::Entering) {
                pass.release();
            }
        })
    });
}

fn benchmark_enter_exit(c: &mut Criterion) {
    let lot = ParkingLot::new(20, Duration::ZERO, NotificationSink::disabled());
    c.bench_function("uncontended_enter_exit", |b| {
        b.iter(|| {
            if let single_lane_parking::EnterOutcome::Admitted(slot) = lot.try_enter(1) {
                lot.try_exit(1, slot);
            }
        })
    });
}

criterion_group!(benches, benchmark_gate_cycle, benchmark_enter_exit);
criterion_main!(benches);
