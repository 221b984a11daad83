//! Capture timestamps: one canonical parse, one display rule.
//!
//! Incidents arrive with either a compact camera-style stamp
//! (`YYYYMMDD_HHMMSS`, often embedded in a file name) or an ISO-8601
//! date-time. Both are parsed into [`CapturedAt`] when a record is
//! normalized; everything downstream only formats.

use std::sync::OnceLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

pub const INVALID_DATE: &str = "Invalid Date";
pub const UNKNOWN_TIMESTAMP: &str = "Unknown timestamp";

/// e.g. `September 21, 2024 at 11:23:04 AM`
const DISPLAY_FORMAT: &str = "%B %-d, %Y at %-I:%M:%S %p";

static COMPACT_PATTERN: OnceLock<Regex> = OnceLock::new();

fn compact_pattern() -> &'static Regex {
    COMPACT_PATTERN.get_or_init(|| {
        Regex::new(r"(\d{4})(\d{2})(\d{2})_(\d{2})(\d{2})(\d{2})").expect("valid regex")
    })
}

/// Capture time of an incident, resolved at the fetch boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "lowercase")]
pub enum CapturedAt {
    Missing,
    /// Present on the wire but not a date we understand.
    Invalid(String),
    At(DateTime<Utc>),
}

impl CapturedAt {
    pub fn from_raw(raw: Option<&str>) -> Self {
        match raw {
            None => CapturedAt::Missing,
            Some(s) if s.trim().is_empty() => CapturedAt::Missing,
            Some(s) => parse_timestamp(s),
        }
    }

    pub fn datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            CapturedAt::At(dt) => Some(*dt),
            _ => None,
        }
    }

    pub fn display(&self) -> String {
        match self {
            CapturedAt::Missing => UNKNOWN_TIMESTAMP.to_string(),
            CapturedAt::Invalid(_) => INVALID_DATE.to_string(),
            CapturedAt::At(dt) => dt.format(DISPLAY_FORMAT).to_string(),
        }
    }
}

/// Parse a raw timestamp in any supported shape.
///
/// Compact stamps carry no zone and are taken as UTC wall-clock time.
pub fn parse_timestamp(raw: &str) -> CapturedAt {
    let raw = raw.trim();

    if let Some(caps) = compact_pattern().captures(raw) {
        let field = |i: usize| caps[i].parse::<u32>().ok();
        let parsed = (|| {
            let year = caps[1].parse::<i32>().ok()?;
            NaiveDate::from_ymd_opt(year, field(2)?, field(3)?)?
                .and_hms_opt(field(4)?, field(5)?, field(6)?)
        })();

        return match parsed {
            Some(naive) => CapturedAt::At(naive.and_utc()),
            None => CapturedAt::Invalid(raw.to_string()),
        };
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return CapturedAt::At(dt.with_timezone(&Utc));
    }

    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return CapturedAt::At(naive.and_utc());
        }
    }

    CapturedAt::Invalid(raw.to_string())
}

/// Parse and format in one step.
pub fn format_timestamp(raw: &str) -> String {
    parse_timestamp(raw).display()
}
