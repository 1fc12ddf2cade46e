//! Async tasks running next to the game loop.
//!
//! - `events`: Game event bus and the task that logs every event as JSON
//! - `battery`: Periodic battery sampling

pub mod battery;
pub mod events;

pub use battery::{BATTERY_MV, battery_task};
pub use events::{ChannelSink, EVENTS, event_log_task};
