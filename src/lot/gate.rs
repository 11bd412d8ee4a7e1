//! Single-lane entrance gate.
//!
//! Token ownership and traffic direction live in one atomic byte, so a
//! direction other than `Idle` always means the token is held and every
//! transition is a single compare-and-set.

use std::fmt;
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};

const IDLE: u8 = 0;
const ENTERING: u8 = 1;
const EXITING: u8 = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Idle,
    Entering,
    Exiting,
}

impl Direction {
    fn as_raw(self) -> u8 {
        match self {
            Direction::Idle => IDLE,
            Direction::Entering => ENTERING,
            Direction::Exiting => EXITING,
        }
    }

    fn from_raw(raw: u8) -> Self {
        match raw {
            ENTERING => Direction::Entering,
            EXITING => Direction::Exiting,
            _ => Direction::Idle,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Idle => write!(f, "Idle"),
            Direction::Entering => write!(f, "Entering"),
            Direction::Exiting => write!(f, "Exiting"),
        }
    }
}

// ============================================================================
// ENTRANCE GATE
// ============================================================================

#[derive(Debug, Default)]
pub struct EntranceGate {
    state: AtomicU8,
    acquisitions: AtomicU64,
    contentions: AtomicU64,
}

impl EntranceGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Non-blocking attempt to take the lane for `direction`.
    ///
    /// On success the caller is the sole holder until the returned pass is
    /// released or dropped. On failure the direction of the current holder is
    /// returned; it is never `Idle`.
    ///
    /// # Panics
    /// Panics if `direction` is `Idle`.
    pub fn try_acquire(&self, direction: Direction) -> Result<GatePass<'_>, Direction> {
        assert!(
            direction != Direction::Idle,
            "the gate cannot be acquired in the Idle direction"
        );

        match self.state.compare_exchange(
            IDLE,
            direction.as_raw(),
            Ordering::AcqRel,
            Ordering::Acquire,
        ) {
            Ok(_) => {
                self.acquisitions.fetch_add(1, Ordering::Relaxed);
                tracing::trace!(%direction, "gate acquired");
                Ok(GatePass {
                    gate: self,
                    direction,
                    released: false,
                })
            }
            Err(current) => {
                self.contentions.fetch_add(1, Ordering::Relaxed);
                let held_as = Direction::from_raw(current);
                tracing::trace!(wanted = %direction, %held_as, "gate busy");
                Err(held_as)
            }
        }
    }

    pub fn direction(&self) -> Direction {
        Direction::from_raw(self.state.load(Ordering::Acquire))
    }

    pub fn is_held(&self) -> bool {
        self.direction() != Direction::Idle
    }

    /// Successful acquisitions since construction.
    pub fn acquisitions(&self) -> u64 {
        self.acquisitions.load(Ordering::Relaxed)
    }

    /// Attempts that found the gate already held.
    pub fn contentions(&self) -> u64 {
        self.contentions.load(Ordering::Relaxed)
    }

    fn release_as(&self, direction: Direction) {
        if let Err(current) = self.state.compare_exchange(
            direction.as_raw(),
            IDLE,
            Ordering::AcqRel,
            Ordering::Acquire,
        ) {
            panic!(
                "gate released as {} while it is {}",
                direction,
                Direction::from_raw(current)
            );
        }
        tracing::trace!(%direction, "gate released");
    }
}

// ============================================================================
// GATE PASS - proof of holding the token
// ============================================================================

/// Held token. Releasing it (explicitly or on drop) returns the gate to `Idle`.
#[derive(Debug)]
pub struct GatePass<'a> {
    gate: &'a EntranceGate,
    direction: Direction,
    released: bool,
}

impl GatePass<'_> {
    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn release(mut self) {
        self.release_once();
    }

    fn release_once(&mut self) {
        if !self.released {
            self.released = true;
            self.gate.release_as(self.direction);
        }
    }
}

impl Drop for GatePass<'_> {
    fn drop(&mut self) {
        self.release_once();
    }
}
