//! Id generation for new items.

use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Deserialize;

/// Source of ids for newly added items.
pub trait IdSource: Send + Sync {
    /// Produces the id for the next item.
    fn next_id(&self) -> u64;

    /// Ensures every id produced afterwards is greater than `id`.
    fn advance_past(&self, id: u64);
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or(0)
}

/// Wall-clock milliseconds, as is.
///
/// Two ids taken within the same millisecond are equal.
#[derive(Debug, Default)]
pub struct TimestampIds;

impl IdSource for TimestampIds {
    fn next_id(&self) -> u64 {
        now_millis()
    }

    fn advance_past(&self, _id: u64) {}
}

/// Wall-clock milliseconds, bumped to one past the previous id when the
/// clock has not moved on (or went backwards).
#[derive(Debug, Default)]
pub struct ClockIds {
    last: AtomicU64,
}

impl ClockIds {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdSource for ClockIds {
    fn next_id(&self) -> u64 {
        let now = now_millis();
        let previous = self
            .last
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(now.max(last.saturating_add(1)))
            })
            .unwrap_or_else(|last| last);
        now.max(previous.saturating_add(1))
    }

    fn advance_past(&self, id: u64) {
        self.last.fetch_max(id, Ordering::SeqCst);
    }
}

/// A plain counter starting at 1.
#[derive(Debug)]
pub struct SequentialIds {
    next: AtomicU64,
}

impl SequentialIds {
    pub fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
        }
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::new()
    }
}

impl IdSource for SequentialIds {
    fn next_id(&self) -> u64 {
        self.next.fetch_add(1, Ordering::SeqCst)
    }

    fn advance_past(&self, id: u64) {
        self.next.fetch_max(id.saturating_add(1), Ordering::SeqCst);
    }
}

/// Named id strategy, as selected on the command line or in the config file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdStrategy {
    #[default]
    Clock,
    Timestamp,
    Sequential,
}

impl IdStrategy {
    pub fn build(self) -> Box<dyn IdSource> {
        match self {
            IdStrategy::Clock => Box::new(ClockIds::new()),
            IdStrategy::Timestamp => Box::new(TimestampIds),
            IdStrategy::Sequential => Box::new(SequentialIds::new()),
        }
    }
}

impl FromStr for IdStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "clock" => Ok(IdStrategy::Clock),
            "timestamp" => Ok(IdStrategy::Timestamp),
            "sequential" | "counter" => Ok(IdStrategy::Sequential),
            _ => Err(format!("unknown id strategy: {}", s)),
        }
    }
}

impl std::fmt::Display for IdStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IdStrategy::Clock => write!(f, "clock"),
            IdStrategy::Timestamp => write!(f, "timestamp"),
            IdStrategy::Sequential => write!(f, "sequential"),
        }
    }
}
