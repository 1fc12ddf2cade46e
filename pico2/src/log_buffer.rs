//! `log` facade backend: defmt over RTT plus a ring of recent lines.
//!
//! The game core logs through `log::info!` and friends. Every record is
//! forwarded to defmt and mirrored into [`LOG_BUFFER`], which keeps the last
//! [`LOG_ENTRIES`] lines so they can be replayed later (see [`dump`]) by a
//! probe attached after the fact.
//!
//! Recording never blocks: if the buffer is locked the line is dropped.

use core::fmt::Write;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::Mutex;
use heapless::String;
use log::{Level, LevelFilter, Log, Metadata, Record};

/// Lines kept in the ring.
pub const LOG_ENTRIES: usize = 16;

/// Maximum characters per kept line.
pub const LOG_MSG_LEN: usize = 96;

/// A recorded log line.
#[derive(Clone)]
pub struct LogEntry {
    pub level: Level,
    pub message: String<LOG_MSG_LEN>,
    /// Milliseconds since boot.
    pub timestamp_ms: u32,
}

impl LogEntry {
    const EMPTY: Self = Self {
        level: Level::Info,
        message: String::new(),
        timestamp_ms: 0,
    };
}

/// Fixed ring of the most recent entries; the oldest is overwritten.
pub struct LogBuffer {
    entries: [LogEntry; LOG_ENTRIES],
    head: usize, // Next write position
    count: usize,
}

impl LogBuffer {
    pub const fn new() -> Self {
        Self {
            entries: [LogEntry::EMPTY; LOG_ENTRIES],
            head: 0,
            count: 0,
        }
    }

    pub fn push(
        &mut self,
        entry: LogEntry,
    ) {
        self.entries[self.head] = entry;
        self.head = (self.head + 1) % LOG_ENTRIES;
        self.count = (self.count + 1).min(LOG_ENTRIES);
    }

    /// Entries from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &LogEntry> {
        let start = if self.count < LOG_ENTRIES { 0 } else { self.head };
        (0..self.count).map(move |i| &self.entries[(start + i) % LOG_ENTRIES])
    }
}

/// Global ring of recent log lines.
pub static LOG_BUFFER: Mutex<CriticalSectionRawMutex, LogBuffer> = Mutex::new(LogBuffer::new());

struct DefmtLogger;

static LOGGER: DefmtLogger = DefmtLogger;

impl Log for DefmtLogger {
    fn enabled(
        &self,
        metadata: &Metadata,
    ) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(
        &self,
        record: &Record,
    ) {
        if !self.enabled(record.metadata()) {
            return;
        }

        // Overlong lines are cut, not dropped
        let mut message: String<LOG_MSG_LEN> = String::new();
        let _ = write!(Truncating(&mut message), "{}", record.args());

        match record.level() {
            Level::Error => defmt::error!("{=str}", message.as_str()),
            Level::Warn => defmt::warn!("{=str}", message.as_str()),
            Level::Info => defmt::info!("{=str}", message.as_str()),
            Level::Debug => defmt::debug!("{=str}", message.as_str()),
            Level::Trace => defmt::trace!("{=str}", message.as_str()),
        }

        if let Ok(mut buffer) = LOG_BUFFER.try_lock() {
            buffer.push(LogEntry {
                level: record.level(),
                message,
                timestamp_ms: embassy_time::Instant::now().as_millis() as u32,
            });
        }
    }

    fn flush(&self) {}
}

/// `fmt::Write` adapter that keeps whatever fits and ignores the rest.
struct Truncating<'a>(&'a mut String<LOG_MSG_LEN>);

impl Write for Truncating<'_> {
    fn write_str(
        &mut self,
        s: &str,
    ) -> core::fmt::Result {
        for c in s.chars() {
            if self.0.push(c).is_err() {
                break;
            }
        }
        Ok(())
    }
}

/// Install the logger. Later calls are ignored.
pub fn init(level: LevelFilter) {
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }
}

/// Replay the kept lines over RTT, oldest first.
pub async fn dump() {
    let buffer = LOG_BUFFER.lock().await;
    defmt::println!("---- last {} log lines ----", buffer.count);
    for entry in buffer.iter() {
        defmt::println!(
            "{=u32:>8} {=str} {=str}",
            entry.timestamp_ms,
            entry.level.as_str(),
            entry.message.as_str()
        );
    }
}
