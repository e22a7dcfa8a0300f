//! Free-text date/time inference.
//!
//! Ordered fallback: all-digit input is tried as an integer epoch (seconds,
//! then milliseconds), digits-dot-digits as a float epoch (same two steps),
//! everything else goes to the free-form parsers (RFC 3339 first, then
//! natural-language via `interim`). Every step fails soft; the first success
//! wins.

use std::sync::OnceLock;

use chrono::{DateTime, FixedOffset, Local, NaiveDateTime, TimeZone};
use chrono_tz::Tz;
use interim::{parse_date_string, Dialect};
use regex::Regex;
use tracing::{debug, trace};

use crate::types::Instant;

/// Epoch range the seconds interpretation accepts: years 1 through 9999.
///
/// Inputs beyond this are re-tried as milliseconds, which is what makes a
/// 13-digit timestamp land in the right century instead of year 55000.
const MIN_EPOCH_SECONDS: i64 = -62_135_596_800; // 0001-01-01
const MAX_EPOCH_SECONDS: i64 = 253_402_300_799; // 9999-12-31T23:59:59

struct Patterns {
    all_digits: Regex,
    digits_dot: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns {
        all_digits: Regex::new(r"^\d+$").unwrap(),
        digits_dot: Regex::new(r"^\d+\.\d*$").unwrap(),
    })
}

/// A parsed point in time that still needs anchoring to a zone.
///
/// Epoch input and offset-free text resolve to a local wall-clock reading,
/// text with an explicit offset resolves to an absolute instant. The two are
/// anchored differently: attaching a timezone to a wall-clock value keeps
/// the clock fields, converting an absolute value shifts them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Parsed {
    /// Wall-clock reading in local time, no zone carried by the input.
    Wall(NaiveDateTime),
    /// Absolute instant, the input carried an offset.
    Absolute(DateTime<FixedOffset>),
}

impl Parsed {
    /// Resolve in the system local zone.
    #[must_use]
    pub fn anchor_local(&self) -> Option<Instant> {
        let dt = match self {
            Self::Wall(naive) => Local.from_local_datetime(naive).earliest()?,
            Self::Absolute(dt) => dt.with_timezone(&Local),
        };
        Some(Instant::new(dt.fixed_offset()))
    }

    /// Keep the wall-clock fields and attach `tz`.
    ///
    /// For absolute input this drops the original offset, mirroring how the
    /// interactive flow re-anchors freshly typed input to a chosen zone.
    #[must_use]
    pub fn anchor_wall(&self, tz: Tz) -> Option<Instant> {
        let naive = match self {
            Self::Wall(naive) => *naive,
            Self::Absolute(dt) => dt.naive_local(),
        };
        let dt = tz.from_local_datetime(&naive).earliest()?;
        Some(Instant::new(dt.fixed_offset()))
    }

    /// Resolve to an absolute instant and convert into `tz`.
    #[must_use]
    pub fn convert_to(&self, tz: Tz) -> Option<Instant> {
        let dt = match self {
            Self::Wall(naive) => Local
                .from_local_datetime(naive)
                .earliest()?
                .with_timezone(&tz),
            Self::Absolute(dt) => dt.with_timezone(&tz),
        };
        Some(Instant::new(dt.fixed_offset()))
    }
}

/// Parse raw text into a best-effort point in time.
///
/// Returns `None` when no strategy applies; never panics on any input.
#[must_use]
pub fn parse(text: &str) -> Option<Parsed> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    if patterns().all_digits.is_match(trimmed) {
        if let Ok(value) = trimmed.parse::<i64>() {
            if let Some(parsed) = integer_epoch(value) {
                trace!(value, "parsed as integer epoch");
                return Some(parsed);
            }
        } else if let Ok(value) = trimmed.parse::<f64>() {
            // Wider than i64; almost certainly out of range, but the
            // milliseconds fallback still gets its chance.
            if let Some(parsed) = float_epoch(value) {
                return Some(parsed);
            }
        }
    }

    if patterns().digits_dot.is_match(trimmed) {
        if let Ok(value) = trimmed.parse::<f64>() {
            if let Some(parsed) = float_epoch(value) {
                trace!(value, "parsed as fractional epoch");
                return Some(parsed);
            }
        }
    }

    freeform(trimmed)
}

/// Integer epoch: seconds first, milliseconds when seconds are out of range.
fn integer_epoch(value: i64) -> Option<Parsed> {
    if let Some(parsed) = epoch_wall(value, 0) {
        return Some(parsed);
    }
    let secs = value.div_euclid(1000);
    let nanos = u32::try_from(value.rem_euclid(1000)).ok()? * 1_000_000;
    epoch_wall(secs, nanos)
}

/// Float epoch: seconds first, then milliseconds, fractional part kept.
fn float_epoch(value: f64) -> Option<Parsed> {
    if let Some(parsed) = epoch_wall_f(value) {
        return Some(parsed);
    }
    epoch_wall_f(value / 1000.0)
}

fn epoch_wall_f(value: f64) -> Option<Parsed> {
    if !value.is_finite() {
        return None;
    }
    let secs = value.trunc() as i64;
    let nanos = ((value.fract() * 1e9).round() as u32).min(999_999_999);
    epoch_wall(secs, nanos)
}

/// The local wall-clock reading of an epoch value, or `None` out of range.
fn epoch_wall(secs: i64, nanos: u32) -> Option<Parsed> {
    if !(MIN_EPOCH_SECONDS..=MAX_EPOCH_SECONDS).contains(&secs) {
        return None;
    }
    Local
        .timestamp_opt(secs, nanos)
        .single()
        .map(|dt| Parsed::Wall(dt.naive_local()))
}

/// Free-form text: RFC 3339, then natural-language expressions anchored at
/// now (partial dates default their missing fields to the current date).
fn freeform(text: &str) -> Option<Parsed> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(Parsed::Absolute(dt));
    }

    match parse_date_string(text, Local::now(), Dialect::Us) {
        Ok(dt) => Some(Parsed::Wall(dt.naive_local())),
        Err(err) => {
            debug!(text, %err, "free-form parse failed");
            None
        }
    }
}
