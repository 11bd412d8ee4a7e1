use super::gate::Direction;
use super::SlotId;

/// Hook for an external renderer of the lot.
///
/// Called synchronously on the thread that made the change, never while a
/// lot lock is held. Both methods default to no-ops.
pub trait LotObserver: Send + Sync {
    fn slot_changed(&self, _slot: SlotId, _occupied: bool) {}

    fn direction_changed(&self, _direction: Direction) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl LotObserver for NoopObserver {}
