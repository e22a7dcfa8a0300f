//! Core types for Whence.
//!
//! These types flow between the parser, the renderer, and the interaction
//! flow; the host only ever sees [`Suggestion`] values.

use chrono::{DateTime, FixedOffset, SecondsFormat};
use serde::{Deserialize, Serialize};

/// Suffix appended to every rendering description.
pub const COPY_HINT: &str = "(press Enter to copy to clipboard)";

/// An absolute point in time with its resolved timezone offset.
///
/// Immutable once constructed; every rendering of one suggestion set derives
/// from the same `Instant`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instant(DateTime<FixedOffset>);

impl Instant {
    /// Wrap an offset-carrying datetime.
    #[must_use]
    pub fn new(dt: DateTime<FixedOffset>) -> Self {
        Self(dt)
    }

    /// The underlying datetime.
    #[must_use]
    pub fn datetime(&self) -> &DateTime<FixedOffset> {
        &self.0
    }

    /// Seconds since the Unix epoch, truncated.
    ///
    /// Returns `None` for instants before 1970-01-01T00:00:00Z: negative
    /// epochs get no timestamp rendering, while ISO renderings still apply.
    #[must_use]
    pub fn epoch_seconds(&self) -> Option<i64> {
        let secs = self.0.timestamp();
        (secs >= 0).then_some(secs)
    }

    /// Milliseconds since the Unix epoch. Same range rule as
    /// [`epoch_seconds`](Self::epoch_seconds).
    #[must_use]
    pub fn epoch_millis(&self) -> Option<i64> {
        self.epoch_seconds().map(|_| self.0.timestamp_millis())
    }

    /// ISO 8601 with second precision, e.g. `2024-05-01T13:37:00+02:00`.
    #[must_use]
    pub fn iso_seconds(&self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::Secs, false)
    }

    /// ISO 8601 with microsecond precision.
    #[must_use]
    pub fn iso_micros(&self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::Micros, false)
    }
}

/// One offered rendering or timezone choice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    /// The text offered to the user (and copied on commit).
    pub label: String,
    /// Short human description.
    pub description: String,
    /// Strategy tag, e.g. `epoch-seconds`, `iso-micros`, or an IANA zone id.
    pub tag: String,
    /// Whether further text input is expected after selecting this item.
    pub accepts_input: bool,
    /// Whether selecting this item keeps producing similar items.
    pub loop_on_select: bool,
}

/// One step of the user's drill-down path.
///
/// Built by the host per selection cycle; the flow only inspects the first
/// element's tag, the chain length, and the trailing labels/tags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub label: String,
    pub tag: String,
}

impl Selection {
    #[must_use]
    pub fn new(label: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            tag: tag.into(),
        }
    }
}

impl From<&Suggestion> for Selection {
    fn from(s: &Suggestion) -> Self {
        Self::new(s.label.clone(), s.tag.clone())
    }
}

/// How the host should treat a published candidate set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Ranking {
    /// Host applies its usual matching and sorting.
    #[default]
    HostDefault,
    /// Match any substring, keep the published order.
    KeepOrder,
}

/// Receives candidate sets as the flow produces them.
///
/// The timezone branch publishes twice: once with the offline listing,
/// once more with online results appended.
pub trait SuggestionSink {
    fn publish(&mut self, suggestions: Vec<Suggestion>, ranking: Ranking);
}

impl SuggestionSink for Vec<Suggestion> {
    fn publish(&mut self, suggestions: Vec<Suggestion>, _ranking: Ranking) {
        *self = suggestions;
    }
}

/// Lets the host abandon a pending online lookup when the user kept typing.
pub trait CancelGate {
    /// Returns `true` when the pending work should be abandoned after
    /// waiting at most `window`.
    fn should_cancel(&self, window: std::time::Duration) -> bool;
}

/// Gate that never cancels (hosts without keystroke debouncing).
#[derive(Debug, Default, Clone, Copy)]
pub struct NeverCancel;

impl CancelGate for NeverCancel {
    fn should_cancel(&self, _window: std::time::Duration) -> bool {
        false
    }
}
