//! Vehicle module - actor identity, retry policy and randomized traffic

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Exp};
use std::ops::RangeInclusive;
use std::time::Duration;

use crate::config::SimulationConfig;
use crate::error::ConfigError;
use crate::lot::{SlotId, VehicleId};

// ============================================================================
// VEHICLE
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Vehicle {
    id: VehicleId,
}

impl Vehicle {
    pub fn new(id: VehicleId) -> Self {
        Self { id }
    }

    pub fn id(&self) -> VehicleId {
        self.id
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TripOutcome {
    /// Parked in `slot` and left again.
    Completed {
        vehicle: VehicleId,
        slot: SlotId,
        entry_attempts: u32,
        exit_attempts: u32,
    },
    /// Never admitted within the entry attempt ceiling.
    Starved { vehicle: VehicleId, attempts: u32 },
}

impl TripOutcome {
    pub fn vehicle(&self) -> VehicleId {
        match self {
            TripOutcome::Completed { vehicle, .. } | TripOutcome::Starved { vehicle, .. } => *vehicle,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, TripOutcome::Completed { .. })
    }
}

// ============================================================================
// RETRY POLICY
// ============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    pub backoff: Duration,
    pub wake_on_release: bool,
    pub max_entry_attempts: Option<u32>,
}

impl RetryPolicy {
    pub fn from_config(config: &SimulationConfig) -> Self {
        Self {
            backoff: config.backoff(),
            wake_on_release: config.wake_on_release,
            max_entry_attempts: config.max_entry_attempts,
        }
    }

    pub fn entry_exhausted(&self, attempts: u32) -> bool {
        self.max_entry_attempts
            .is_some_and(|ceiling| attempts >= ceiling)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&SimulationConfig::default())
    }
}

// ============================================================================
// TRAFFIC GENERATOR - arrivals and parking durations
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScheduledVehicle {
    pub vehicle: Vehicle,
    /// Pause before the next vehicle is released.
    pub stagger: Duration,
    pub dwell: Duration,
}

pub struct TrafficGenerator {
    rng: StdRng,
    arrivals: Exp<f64>,
    dwell_units: RangeInclusive<u32>,
    time_unit: Duration,
    sequence_counter: VehicleId,
}

impl TrafficGenerator {
    pub fn new(
        seed: Option<u64>,
        arrival_rate: f64,
        dwell_units: RangeInclusive<u32>,
        time_unit: Duration,
    ) -> Result<Self, ConfigError> {
        if !arrival_rate.is_finite() || arrival_rate <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "arrival_rate must be a positive number, got {arrival_rate}"
            )));
        }
        let arrivals = Exp::new(arrival_rate).map_err(|e| {
            ConfigError::Invalid(format!("arrival_rate {arrival_rate}: {e}"))
        })?;
        if dwell_units.is_empty() {
            return Err(ConfigError::Invalid(format!(
                "empty dwell range {}..={}",
                dwell_units.start(),
                dwell_units.end()
            )));
        }
        if time_unit.checked_mul(*dwell_units.end()).is_none() {
            return Err(ConfigError::Invalid(format!(
                "{} time units of {time_unit:?} overflow a duration",
                dwell_units.end()
            )));
        }

        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Self {
            rng,
            arrivals,
            dwell_units,
            time_unit,
            sequence_counter: 0,
        })
    }

    pub fn from_config(config: &SimulationConfig) -> Result<Self, ConfigError> {
        Self::new(
            config.seed,
            config.arrival_rate,
            config.dwell_units(),
            config.time_unit(),
        )
    }

    pub fn next_vehicle(&mut self) -> ScheduledVehicle {
        self.sequence_counter += 1;
        let gap: f64 = self.arrivals.sample(&mut self.rng);
        let dwell_units = self.rng.gen_range(self.dwell_units.clone());

        ScheduledVehicle {
            vehicle: Vehicle::new(self.sequence_counter),
            // Saturates on an extreme sample instead of overflowing
            stagger: Duration::try_from_secs_f64(self.time_unit.as_secs_f64() * gap)
                .unwrap_or(Duration::MAX),
            dwell: self.time_unit * dwell_units,
        }
    }
}

impl Iterator for TrafficGenerator {
    type Item = ScheduledVehicle;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.next_vehicle())
    }
}
