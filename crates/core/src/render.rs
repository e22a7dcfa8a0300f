//! Suggestion rendering.
//!
//! Given one resolved [`Instant`], produces the ordered candidate list: four
//! fixed renderings (epoch seconds/millis, ISO with second/microsecond
//! precision), then every configured format under every configured locale.
//! Labels are deduplicated, first occurrence wins.

use std::fmt::Write as _;

use tracing::warn;

use crate::locale;
use crate::settings::Settings;
use crate::types::{Instant, Suggestion, COPY_HINT};

/// Tags of the fixed renderings, in output order.
pub const EPOCH_SECONDS_TAG: &str = "epoch-seconds";
pub const EPOCH_MILLIS_TAG: &str = "epoch-millis";
pub const ISO_SECONDS_TAG: &str = "iso-seconds";
pub const ISO_MICROS_TAG: &str = "iso-micros";

const FIXED_TAGS: [&str; 4] = [
    EPOCH_SECONDS_TAG,
    EPOCH_MILLIS_TAG,
    ISO_SECONDS_TAG,
    ISO_MICROS_TAG,
];

/// Per-tag "accepts further input" policy, resolved at render time.
///
/// The default lets every rendering be re-parsed by typing after it; the
/// legacy variant excludes the four fixed renderings. Both stay selectable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputPolicy {
    fixed_accept: bool,
}

impl InputPolicy {
    /// Fixed renderings do not accept further input.
    #[must_use]
    pub fn legacy() -> Self {
        Self {
            fixed_accept: false,
        }
    }

    /// Whether a suggestion with this tag accepts further text input.
    #[must_use]
    pub fn accepts_input(&self, tag: &str) -> bool {
        self.fixed_accept || !FIXED_TAGS.contains(&tag)
    }
}

impl Default for InputPolicy {
    fn default() -> Self {
        Self { fixed_accept: true }
    }
}

/// Render one instant into the ordered, label-deduplicated candidate list.
#[must_use]
pub fn render(instant: &Instant, settings: &Settings, policy: &InputPolicy) -> Vec<Suggestion> {
    let mut suggestions = Vec::new();

    // Both timestamp renderings are suppressed together when the instant is
    // out of the representable epoch range; ISO renderings always apply.
    if let (Some(secs), Some(millis)) = (instant.epoch_seconds(), instant.epoch_millis()) {
        suggestions.push(rendering(
            secs.to_string(),
            format!(
                "Time as unix timestamp (seconds since Jan 01 1970. (UTC)) {}",
                COPY_HINT
            ),
            EPOCH_SECONDS_TAG,
            policy,
        ));
        suggestions.push(rendering(
            millis.to_string(),
            format!(
                "Time as timestamp (milliseconds since Jan 01 1970. (UTC)) {}",
                COPY_HINT
            ),
            EPOCH_MILLIS_TAG,
            policy,
        ));
    }

    suggestions.push(rendering(
        instant.iso_seconds(),
        format!("Time in ISO 8601 format {}", COPY_HINT),
        ISO_SECONDS_TAG,
        policy,
    ));
    suggestions.push(rendering(
        instant.iso_micros(),
        format!("Time in ISO 8601 format {}", COPY_HINT),
        ISO_MICROS_TAG,
        policy,
    ));

    for (idx, fmt) in settings.formats.iter().enumerate() {
        for loc in &settings.locales {
            let resolved = match locale::resolve(loc) {
                Ok(resolved) => resolved,
                Err(err) => {
                    warn!(format = %fmt, locale = %loc, %err, "skipping format/locale pair");
                    continue;
                }
            };

            // An invalid format specifier surfaces as a fmt error here;
            // that pair is skipped, rendering continues.
            let mut label = String::new();
            if write!(
                label,
                "{}",
                instant.datetime().format_localized(fmt, resolved)
            )
            .is_err()
            {
                warn!(format = %fmt, locale = %loc, "format string failed to render");
                continue;
            }

            if contains_label(&suggestions, &label) {
                continue;
            }

            let shown_locale = if loc.is_empty() { "system default" } else { loc };
            let tag = format!("format_{}_{}", idx, loc);
            suggestions.push(rendering(
                label,
                format!("Time in format '{}' in locale {} {}", fmt, shown_locale, COPY_HINT),
                &tag,
                policy,
            ));
        }
    }

    suggestions
}

fn rendering(label: String, description: String, tag: &str, policy: &InputPolicy) -> Suggestion {
    Suggestion {
        label,
        description,
        tag: tag.to_string(),
        accepts_input: policy.accepts_input(tag),
        loop_on_select: true,
    }
}

fn contains_label(suggestions: &[Suggestion], label: &str) -> bool {
    suggestions.iter().any(|s| s.label == label)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, TimeZone};
    use pretty_assertions::assert_eq;

    fn utc_instant(secs: i64) -> Instant {
        let offset = FixedOffset::east_opt(0).unwrap();
        Instant::new(offset.timestamp_opt(secs, 0).unwrap())
    }

    fn settings(formats: &[&str], locales: &[&str]) -> Settings {
        Settings {
            formats: formats.iter().map(|s| s.to_string()).collect(),
            locales: locales.iter().map(|s| s.to_string()).collect(),
            ..Settings::default()
        }
    }

    #[test]
    fn fixed_renderings_come_first_in_order() {
        let out = render(
            &utc_instant(86400),
            &settings(&[], &[]),
            &InputPolicy::default(),
        );
        let tags: Vec<&str> = out.iter().map(|s| s.tag.as_str()).collect();
        assert_eq!(
            tags,
            vec!["epoch-seconds", "epoch-millis", "iso-seconds", "iso-micros"]
        );
        assert_eq!(out[0].label, "86400");
        assert_eq!(out[1].label, "86400000");
        assert_eq!(out[2].label, "1970-01-02T00:00:00+00:00");
    }

    #[test]
    fn out_of_range_epoch_keeps_iso_only() {
        let out = render(
            &utc_instant(-86400),
            &settings(&[], &[]),
            &InputPolicy::default(),
        );
        let tags: Vec<&str> = out.iter().map(|s| s.tag.as_str()).collect();
        assert_eq!(tags, vec!["iso-seconds", "iso-micros"]);
        assert_eq!(out[0].label, "1969-12-31T00:00:00+00:00");
    }

    #[test]
    fn duplicate_labels_keep_the_first_pair() {
        // Same format under two locales that render it identically
        let out = render(
            &utc_instant(86400),
            &settings(&["%Y-%m-%d"], &["C", "C"]),
            &InputPolicy::default(),
        );
        let formatted: Vec<&Suggestion> =
            out.iter().filter(|s| s.tag.starts_with("format_")).collect();
        assert_eq!(formatted.len(), 1);
        assert_eq!(formatted[0].label, "1970-01-02");
        assert_eq!(formatted[0].tag, "format_0_C");
    }

    #[test]
    fn unsupported_locale_skips_only_that_pair() {
        let out = render(
            &utc_instant(86400),
            &settings(&["%Y"], &["xx_YY", "C"]),
            &InputPolicy::default(),
        );
        let formatted: Vec<&Suggestion> =
            out.iter().filter(|s| s.tag.starts_with("format_")).collect();
        assert_eq!(formatted.len(), 1);
        assert_eq!(formatted[0].tag, "format_0_C");
        assert_eq!(formatted[0].label, "1970");
    }

    #[test]
    fn rendering_is_deterministic() {
        let settings = settings(&["%c", "%x"], &["C"]);
        let instant = utc_instant(1_700_000_000);
        let first = render(&instant, &settings, &InputPolicy::default());
        let second = render(&instant, &settings, &InputPolicy::default());
        assert_eq!(first, second);
    }

    #[test]
    fn legacy_policy_pins_fixed_renderings() {
        let out = render(
            &utc_instant(86400),
            &settings(&["%x"], &["C"]),
            &InputPolicy::legacy(),
        );
        for s in &out {
            if s.tag.starts_with("format_") {
                assert!(s.accepts_input, "{} should accept input", s.tag);
            } else {
                assert!(!s.accepts_input, "{} should not accept input", s.tag);
            }
        }
    }

    #[test]
    fn descriptions_carry_the_copy_hint() {
        let out = render(
            &utc_instant(86400),
            &settings(&["%x"], &["C"]),
            &InputPolicy::default(),
        );
        assert!(out.iter().all(|s| s.description.contains(COPY_HINT)));
    }
}
