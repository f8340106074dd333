use std::fmt;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Serialize, Serializer};

use crate::engine::errors::{TopNError, TopNResult};

/// Half-open time bucket `[start, end)` identifying one result bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Interval {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl Interval {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> TopNResult<Self> {
        if end < start {
            return Err(TopNError::Configuration(format!(
                "interval end {} precedes start {}",
                end.to_rfc3339(),
                start.to_rfc3339()
            )));
        }
        Ok(Self { start, end })
    }

    /// Parses `start/end` where each side is RFC3339 or a bare `YYYY-MM-DD`.
    pub fn parse(input: &str) -> TopNResult<Self> {
        let (start, end) = input.trim().split_once('/').ok_or_else(|| {
            TopNError::Configuration(format!("interval '{}' is not of the form start/end", input))
        })?;
        let start = parse_instant(start)
            .ok_or_else(|| TopNError::Configuration(format!("bad interval start '{}'", start)))?;
        let end = parse_instant(end)
            .ok_or_else(|| TopNError::Configuration(format!("bad interval end '{}'", end)))?;
        Self::new(start, end)
    }

    /// Interval spanning all representable time.
    pub fn eternity() -> Self {
        Self {
            start: DateTime::<Utc>::MIN_UTC,
            end: DateTime::<Utc>::MAX_UTC,
        }
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant < self.end
    }
}

fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()?;
    Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?))
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.start.to_rfc3339(), self.end.to_rfc3339())
    }
}

impl Serialize for Interval {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}
