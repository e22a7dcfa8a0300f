//! Whence Core
//!
//! Turns free-text input into a date/time value and offers it back in many
//! renderings: unix timestamps (seconds/milliseconds), ISO 8601, configured
//! strftime formats under configured locales, and timezone conversions.
//!
//! # Quick Start
//!
//! ```
//! use whence_core::{Flow, NeverCancel, Selection, Settings, Suggestion};
//!
//! let flow = Flow::new(Settings {
//!     online: false,
//!     ..Settings::default()
//! });
//!
//! // The user picked the "time" entry point and typed a timestamp
//! let chain = [Selection::new("Time:", "time")];
//! let mut out: Vec<Suggestion> = Vec::new();
//! flow.suggest("86400", &chain, &mut out, &NeverCancel);
//!
//! // The timestamp itself comes back, alongside ISO renderings
//! assert!(out.iter().any(|s| s.label == "86400"));
//! assert!(out.iter().any(|s| s.tag == "iso-seconds"));
//! ```
//!
//! # Parsing alone
//!
//! ```
//! use whence_core::parse;
//!
//! let parsed = parse("1700000000000").expect("13 digits resolve as milliseconds");
//! let instant = parsed.convert_to(chrono_tz::UTC).unwrap();
//! assert_eq!(instant.epoch_seconds(), Some(1_700_000_000));
//! ```

pub mod flow;
pub mod locale;
pub mod lookup;
pub mod parse;
pub mod render;
pub mod settings;
pub mod types;
pub mod zones;

pub use flow::{Flow, Mode, TIME_TAG, ZONE_TAG};
pub use lookup::{HttpTransport, LookupError, OnlineResolver, Place, Transport};
pub use parse::{parse, Parsed};
pub use render::{render, InputPolicy};
pub use settings::Settings;
pub use types::{
    CancelGate, Instant, NeverCancel, Ranking, Selection, Suggestion, SuggestionSink, COPY_HINT,
};
pub use zones::list_zones;

#[cfg(test)]
mod tests {
    use super::*;

    /// Regression test: a rendering label must survive a full re-parse
    /// round trip, since drill-down re-derives the instant from it.
    #[test]
    fn rendered_iso_labels_re_parse_to_the_same_instant() {
        let flow = Flow::new(Settings {
            online: false,
            ..Settings::default()
        });
        let chain = [Selection::new("Time:", "time")];
        let mut out: Vec<Suggestion> = Vec::new();
        flow.suggest("86400", &chain, &mut out, &NeverCancel);

        let iso = out
            .iter()
            .find(|s| s.tag == "iso-seconds")
            .expect("iso rendering present");
        let reparsed = parse(&iso.label)
            .expect("label re-parses")
            .convert_to(chrono_tz::UTC)
            .unwrap();
        assert_eq!(reparsed.epoch_seconds(), Some(86400));
    }
}
