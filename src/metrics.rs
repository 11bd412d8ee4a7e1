//! Metrics module - wait times and retry counts across vehicle actors

use hdrhistogram::Histogram;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::lot::ParkingLot;
use crate::vehicle::TripOutcome;

fn new_histogram() -> Histogram<u64> {
    Histogram::new(3).expect("3 significant figures is within hdrhistogram's range")
}

// ============================================================================
// LOT METRICS - Thread-safe tracking shared by all vehicles
// ============================================================================

#[derive(Clone)]
pub struct LotMetrics {
    // Arrival until admission
    admission_wait_hist: Arc<Mutex<Histogram<u64>>>,
    // End of dwell until departure
    departure_wait_hist: Arc<Mutex<Histogram<u64>>>,
    enter_attempts: Arc<AtomicU64>,
    exit_attempts: Arc<AtomicU64>,
    admitted: Arc<AtomicU64>,
    departed: Arc<AtomicU64>,
    starved: Arc<AtomicU64>,
}

impl LotMetrics {
    pub fn new() -> Self {
        Self {
            admission_wait_hist: Arc::new(Mutex::new(new_histogram())),
            departure_wait_hist: Arc::new(Mutex::new(new_histogram())),
            enter_attempts: Arc::new(AtomicU64::new(0)),
            exit_attempts: Arc::new(AtomicU64::new(0)),
            admitted: Arc::new(AtomicU64::new(0)),
            departed: Arc::new(AtomicU64::new(0)),
            starved: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn record_enter_attempt(&self) {
        self.enter_attempts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_exit_attempt(&self) {
        self.exit_attempts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_admission(&self, waited: Duration) {
        self.admitted.fetch_add(1, Ordering::Relaxed);
        self.admission_wait_hist.lock().record(waited.as_nanos() as u64).ok();
    }

    pub fn record_departure(&self, waited: Duration) {
        self.departed.fetch_add(1, Ordering::Relaxed);
        self.departure_wait_hist.lock().record(waited.as_nanos() as u64).ok();
    }

    pub fn record_starved(&self) {
        self.starved.fetch_add(1, Ordering::Relaxed);
    }

    pub fn report(&self) -> MetricsReport {
        let admission = self.admission_wait_hist.lock();
        let departure = self.departure_wait_hist.lock();

        MetricsReport {
            admission_wait_p50: Duration::from_nanos(admission.value_at_quantile(0.5)),
            admission_wait_p99: Duration::from_nanos(admission.value_at_quantile(0.99)),
            admission_wait_max: Duration::from_nanos(admission.max()),
            departure_wait_p50: Duration::from_nanos(departure.value_at_quantile(0.5)),
            departure_wait_p99: Duration::from_nanos(departure.value_at_quantile(0.99)),
            departure_wait_max: Duration::from_nanos(departure.max()),
            enter_attempts: self.enter_attempts.load(Ordering::Relaxed),
            exit_attempts: self.exit_attempts.load(Ordering::Relaxed),
            admitted: self.admitted.load(Ordering::Relaxed),
            departed: self.departed.load(Ordering::Relaxed),
            starved: self.starved.load(Ordering::Relaxed),
        }
    }
}

impl Default for LotMetrics {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// METRICS REPORT - Summary statistics
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct MetricsReport {
    pub admission_wait_p50: Duration,
    pub admission_wait_p99: Duration,
    pub admission_wait_max: Duration,
    pub departure_wait_p50: Duration,
    pub departure_wait_p99: Duration,
    pub departure_wait_max: Duration,
    pub enter_attempts: u64,
    pub exit_attempts: u64,
    pub admitted: u64,
    pub departed: u64,
    pub starved: u64,
}

impl MetricsReport {
    /// Attempts beyond the first, per admitted vehicle.
    pub fn enter_retries_per_vehicle(&self) -> f64 {
        if self.admitted == 0 {
            return 0.0;
        }
        self.enter_attempts.saturating_sub(self.admitted) as f64 / self.admitted as f64
    }
}

// ============================================================================
// SIMULATION REPORT - End-of-run summary from either driver
// ============================================================================

#[derive(Debug, Clone)]
pub struct SimulationReport {
    pub vehicles: usize,
    pub completed: usize,
    pub starved: usize,
    pub total_exits: u64,
    pub capacity: usize,
    pub final_occupancy: usize,
    pub gate_acquisitions: u64,
    pub gate_contentions: u64,
    pub dropped_notifications: u64,
    pub elapsed: Duration,
    pub outcomes: Vec<TripOutcome>,
    pub metrics: MetricsReport,
}

impl SimulationReport {
    pub fn collect(
        lot: &ParkingLot,
        outcomes: Vec<TripOutcome>,
        metrics: &LotMetrics,
        elapsed: Duration,
    ) -> Self {
        let completed = outcomes.iter().filter(|o| o.is_completed()).count();

        Self {
            vehicles: outcomes.len(),
            completed,
            starved: outcomes.len() - completed,
            total_exits: lot.exits(),
            capacity: lot.capacity(),
            final_occupancy: lot.occupied_count(),
            gate_acquisitions: lot.gate().acquisitions(),
            gate_contentions: lot.gate().contentions(),
            dropped_notifications: lot.sink().dropped(),
            elapsed,
            outcomes,
            metrics: metrics.report(),
        }
    }
}
