//! Game event bus.
//!
//! The game publishes into [`EVENTS`] without waiting; when the queue is full
//! the oldest event is dropped. The log task is the one subscriber today and
//! prints each event over RTT as the same JSON a remote client would get.

use defmt::{info, warn};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::pubsub::{ImmediatePublisher, PubSubChannel, WaitResult};
use simon_common::notify::{EventSink, GameEvent, MAX_EVENT_JSON};

/// Queued events.
pub const EVENT_QUEUE: usize = 8;

/// Event subscribers.
pub const EVENT_SUBSCRIBERS: usize = 1;

/// Event publishers.
pub const EVENT_PUBLISHERS: usize = 1;

pub static EVENTS: PubSubChannel<CriticalSectionRawMutex, GameEvent, EVENT_QUEUE, EVENT_SUBSCRIBERS, EVENT_PUBLISHERS> =
    PubSubChannel::new();

/// [`EventSink`] publishing into [`EVENTS`].
pub struct ChannelSink {
    publisher:
        ImmediatePublisher<'static, CriticalSectionRawMutex, GameEvent, EVENT_QUEUE, EVENT_SUBSCRIBERS, EVENT_PUBLISHERS>,
}

impl ChannelSink {
    pub fn new() -> Self {
        Self {
            publisher: EVENTS.immediate_publisher(),
        }
    }
}

impl EventSink for ChannelSink {
    fn publish(
        &mut self,
        event: &GameEvent,
    ) {
        self.publisher.publish_immediate(event.clone());
    }
}

/// Log every published event as JSON.
#[embassy_executor::task]
pub async fn event_log_task() {
    let Ok(mut subscriber) = EVENTS.subscriber() else {
        warn!("[EVENTS] No subscriber slot left");
        return;
    };
    info!("[EVENTS] Event log task started");

    let mut buf = [0u8; MAX_EVENT_JSON];
    loop {
        match subscriber.next_message().await {
            WaitResult::Message(event) => match event.to_json(&mut buf) {
                Ok(json) => info!("[EVENTS] {=str}", json),
                Err(_) => warn!("[EVENTS] Could not encode {=str}", event.kind()),
            },
            WaitResult::Lagged(missed) => warn!("[EVENTS] Missed {} events", missed),
        }
    }
}
