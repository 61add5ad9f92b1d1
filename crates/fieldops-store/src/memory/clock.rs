//! Monotonic server clock for resolving timestamp sentinels.

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde_json::Value;

/// Issues strictly increasing timestamps, even if the wall clock steps back.
#[derive(Debug, Default)]
pub struct ServerClock {
    last: Option<DateTime<Utc>>,
}

impl ServerClock {
    /// Create a clock with no history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Next timestamp: wall-clock now, or one microsecond past the last
    /// issued value if now is not later.
    pub fn next(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let issued = match self.last {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.last = Some(issued);
        issued
    }
}

/// Encode a timestamp the way documents store it.
pub fn timestamp_value(ts: DateTime<Utc>) -> Value {
    Value::String(ts.to_rfc3339_opts(SecondsFormat::Micros, true))
}
