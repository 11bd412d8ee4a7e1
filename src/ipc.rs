//! IPC module - status stream from the lot to whoever renders it

pub mod channels;
pub mod shared_resource;

pub use channels::{EventChannel, LotEvent, NotificationSink, OverflowPolicy};
pub use shared_resource::{spawn_status_listener, StatusLog};
