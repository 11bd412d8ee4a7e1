use crossbeam::channel::{bounded, Receiver, Sender, TrySendError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::lot::{SlotId, VehicleId};

// ============================================================================
// LOT EVENTS - status stream consumed by an external observer
// ============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LotEvent {
    Arrived { vehicle: VehicleId },
    WaitingForSpace { vehicle: VehicleId },
    WaitingForEntrance { vehicle: VehicleId },
    Entering { vehicle: VehicleId, slot: SlotId },
    WaitingToExit { vehicle: VehicleId },
    Left { vehicle: VehicleId, slot: SlotId, total_exits: u64 },
    GaveUp { vehicle: VehicleId, attempts: u32 },
    SimulationComplete { exits: u64 },
}

impl fmt::Display for LotEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LotEvent::Arrived { vehicle } => write!(f, "vehicle {vehicle} arrived"),
            LotEvent::WaitingForSpace { vehicle } => {
                write!(f, "vehicle {vehicle} waiting for space")
            }
            LotEvent::WaitingForEntrance { vehicle } => {
                write!(f, "vehicle {vehicle} waiting for entrance")
            }
            LotEvent::Entering { vehicle, slot } => {
                write!(f, "vehicle {vehicle} entering slot {slot}")
            }
            LotEvent::WaitingToExit { vehicle } => write!(f, "vehicle {vehicle} waiting to exit"),
            LotEvent::Left { vehicle, slot, total_exits } => write!(
                f,
                "vehicle {vehicle} left slot {slot} (total exits: {total_exits})"
            ),
            LotEvent::GaveUp { vehicle, attempts } => {
                write!(f, "vehicle {vehicle} gave up after {attempts} attempts")
            }
            LotEvent::SimulationComplete { exits } => {
                write!(f, "simulation complete ({exits} exits)")
            }
        }
    }
}

// ============================================================================
// NOTIFICATION SINK - core side of the status stream
// ============================================================================

/// What the sink does when the consumer falls behind.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverflowPolicy {
    /// Discard the event and count it.
    #[default]
    Drop,
    /// Wait for room in the queue. Lane events are emitted with the gate
    /// held, so the consumer must keep draining or the lane stalls, and a
    /// tokio worker emitting into a full queue blocks until it drains.
    Block,
}

#[derive(Clone, Debug)]
pub struct NotificationSink {
    tx: Option<Sender<LotEvent>>,
    policy: OverflowPolicy,
    dropped: Arc<AtomicU64>,
}

impl NotificationSink {
    /// A sink that discards every event.
    pub fn disabled() -> Self {
        Self {
            tx: None,
            policy: OverflowPolicy::Drop,
            dropped: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn emit(&self, event: LotEvent) {
        let Some(tx) = &self.tx else {
            return;
        };

        match self.policy {
            OverflowPolicy::Drop => match tx.try_send(event) {
                Ok(()) | Err(TrySendError::Disconnected(_)) => {}
                Err(TrySendError::Full(event)) => {
                    let dropped = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
                    tracing::warn!(%event, dropped, "status queue full, event dropped");
                }
            },
            // A disconnected consumer means nobody is listening any more.
            OverflowPolicy::Block => {
                let _ = tx.send(event);
            }
        }
    }

    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    pub fn policy(&self) -> OverflowPolicy {
        self.policy
    }
}

// ============================================================================
// EVENT CHANNEL - sink plus the consumer end
// ============================================================================

#[derive(Clone)]
pub struct EventChannel {
    pub sink: NotificationSink,
    pub events_rx: Arc<Receiver<LotEvent>>,
}

impl EventChannel {
    pub fn new(buffer_size: usize, policy: OverflowPolicy) -> Self {
        let (events_tx, events_rx) = bounded(buffer_size);

        Self {
            sink: NotificationSink {
                tx: Some(events_tx),
                policy,
                dropped: Arc::new(AtomicU64::new(0)),
            },
            events_rx: Arc::new(events_rx),
        }
    }

    /// Everything queued right now, without waiting.
    pub fn drain(&self) -> Vec<LotEvent> {
        self.events_rx.try_iter().collect()
    }
}
