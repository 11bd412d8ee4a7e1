use crossbeam::channel::Receiver;
use parking_lot::RwLock;
use std::collections::VecDeque;
use std::sync::Arc;
use std::thread;

use super::channels::LotEvent;

// Latest status lines, as a status bar would show them
#[derive(Clone)]
pub struct StatusLog {
    entries: Arc<RwLock<VecDeque<String>>>,
    max_size: usize,
}

impl StatusLog {
    pub fn new(max_size: usize) -> Self {
        Self {
            entries: Arc::new(RwLock::new(VecDeque::with_capacity(max_size))),
            max_size,
        }
    }

    pub fn write(&self, message: String) {
        let mut log = self.entries.write();
        log.push_back(message);
        if log.len() > self.max_size {
            log.pop_front();
        }
    }

    pub fn latest(&self) -> Option<String> {
        self.entries.read().back().cloned()
    }

    pub fn read_all(&self) -> Vec<String> {
        self.entries.read().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

/// Drains the status stream into `log` until every sender is dropped.
/// Returns the number of events consumed.
pub fn spawn_status_listener(
    events_rx: Arc<Receiver<LotEvent>>,
    log: StatusLog,
) -> thread::JoinHandle<u64> {
    thread::spawn(move || {
        let mut consumed = 0u64;
        for event in events_rx.iter() {
            tracing::info!(target: "parking::status", "{event}");
            log.write(event.to_string());
            consumed += 1;
        }
        consumed
    })
}
