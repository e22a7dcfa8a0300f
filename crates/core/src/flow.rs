//! Interaction flow.
//!
//! Orchestrates the parser, the renderer, and the timezone resolvers over
//! the host's selection chain. The chain shape alone decides the current
//! mode: its first element's tag ("time" vs "timezone") and its length
//! parity. Odd chains continue their own track, even chains (longer than
//! one) have crossed over to the other one.

use std::time::Duration;

use chrono_tz::Tz;
use tracing::debug;

use crate::lookup::OnlineResolver;
use crate::parse::{self, Parsed};
use crate::render::{self, InputPolicy};
use crate::settings::Settings;
use crate::types::{CancelGate, Ranking, Selection, Suggestion, SuggestionSink};
use crate::zones;

/// Tag of the "time" entry point.
pub const TIME_TAG: &str = "time";
/// Tag of the "timezone" entry point.
pub const ZONE_TAG: &str = "timezone";

/// Purely numeric input below this is rejected before any parse attempt.
///
/// Inherited boundary, preserved bit-for-bit: the comparison is exclusive
/// and only applies when the entire input parses as an integer.
const MIN_TIMESTAMP: i64 = 86400;

/// How long to wait for the user to pause before an online lookup.
const DEBOUNCE: Duration = Duration::from_millis(500);

/// What the flow expects next, derived from the chain alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// A time-like input is expected (or already present).
    TimeNext,
    /// A timezone selection is expected.
    ZoneNext,
    /// Chain shape matches neither track; produce nothing.
    Idle,
}

impl Mode {
    /// Classify a selection chain.
    #[must_use]
    pub fn classify(chain: &[Selection]) -> Self {
        let Some(first) = chain.first() else {
            return Self::Idle;
        };
        let len = chain.len();
        let odd = len % 2 == 1;

        match first.tag.as_str() {
            TIME_TAG if odd => Self::TimeNext,
            TIME_TAG if len > 1 => Self::ZoneNext,
            ZONE_TAG if odd => Self::ZoneNext,
            ZONE_TAG if len > 1 => Self::TimeNext,
            _ => Self::Idle,
        }
    }
}

/// The orchestrator a host embeds.
pub struct Flow {
    settings: Settings,
    policy: InputPolicy,
    resolver: OnlineResolver,
}

impl Flow {
    /// Build a flow with the default online resolver.
    #[must_use]
    pub fn new(settings: Settings) -> Self {
        Self::with_resolver(settings, OnlineResolver::new())
    }

    /// Build a flow with a custom resolver (tests, alternative endpoints).
    #[must_use]
    pub fn with_resolver(settings: Settings, resolver: OnlineResolver) -> Self {
        Self {
            settings,
            policy: InputPolicy::default(),
            resolver,
        }
    }

    /// Select the legacy "fixed renderings take no input" policy.
    #[must_use]
    pub fn with_policy(mut self, policy: InputPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Current settings snapshot.
    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Swap in fresh settings and rebuild the catalog.
    pub fn rebuild(&mut self, settings: Settings) -> Vec<Suggestion> {
        self.settings = settings;
        self.catalog()
    }

    /// The two top-level entry points. Rebuilding the catalog is the one
    /// writer that clears the lookup caches.
    #[must_use]
    pub fn catalog(&self) -> Vec<Suggestion> {
        self.resolver.clear_cache();
        vec![
            Suggestion {
                label: self.settings.item_label.clone(),
                description: "Date and time parsing and formatting".into(),
                tag: TIME_TAG.into(),
                accepts_input: true,
                loop_on_select: false,
            },
            Suggestion {
                label: self.settings.item_label2.clone(),
                description: "Current date in different timezones".into(),
                tag: ZONE_TAG.into(),
                accepts_input: true,
                loop_on_select: false,
            },
        ]
    }

    /// Produce the candidate set for one input event.
    ///
    /// Publishes through `sink`; the timezone track may publish twice (the
    /// offline listing first, online results appended once available unless
    /// `gate` reports the user kept typing).
    pub fn suggest(
        &self,
        user_input: &str,
        chain: &[Selection],
        sink: &mut dyn SuggestionSink,
        gate: &dyn CancelGate,
    ) {
        match Mode::classify(chain) {
            Mode::TimeNext => self.suggest_time(user_input, chain, sink),
            Mode::ZoneNext => self.suggest_zone(user_input, sink, gate),
            Mode::Idle => {}
        }
    }

    fn suggest_time(&self, user_input: &str, chain: &[Selection], sink: &mut dyn SuggestionSink) {
        // A zone selected earlier in the chain re-anchors the result.
        let zone: Option<Tz> = (chain.len() > 1)
            .then(|| chain.last().and_then(|sel| sel.tag.parse().ok()))
            .flatten();
        debug!(?zone, chain_len = chain.len(), "time track");

        let instant = if !user_input.is_empty() {
            if rejected_by_guard(user_input) {
                debug!(user_input, "timestamps smaller than 86400 do not work");
                return;
            }
            let Some(parsed) = parse::parse(user_input) else {
                debug!(user_input, "input did not parse");
                return;
            };
            match zone {
                Some(tz) => parsed.anchor_wall(tz),
                None => parsed.anchor_local(),
            }
        } else {
            let first_tag = chain.first().map(|sel| sel.tag.as_str());
            let rederive = (first_tag == Some(TIME_TAG) && chain.len() > 1)
                || (first_tag == Some(ZONE_TAG) && chain.len() > 2);

            let parsed = if rederive {
                let prior = &chain[chain.len() - 2].label;
                match parse::parse(prior) {
                    Some(parsed) => parsed,
                    None => {
                        debug!(%prior, "prior label did not re-parse");
                        return;
                    }
                }
            } else {
                Parsed::Wall(chrono::Local::now().naive_local())
            };
            match zone {
                Some(tz) => parsed.convert_to(tz),
                None => parsed.anchor_local(),
            }
        };

        let Some(instant) = instant else {
            debug!("instant did not resolve in the requested zone");
            return;
        };

        let suggestions = render::render(&instant, &self.settings, &self.policy);
        sink.publish(suggestions, Ranking::KeepOrder);
    }

    fn suggest_zone(&self, user_input: &str, sink: &mut dyn SuggestionSink, gate: &dyn CancelGate) {
        let mut suggestions = zones::list_zones();
        sink.publish(suggestions.clone(), Ranking::HostDefault);

        if self.settings.online && !user_input.is_empty() && !gate.should_cancel(DEBOUNCE) {
            suggestions.extend(self.resolver.resolve(user_input));
            sink.publish(suggestions, Ranking::HostDefault);
        }
    }
}

impl Default for Flow {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

/// True when the whole input is an integer below the timestamp floor.
fn rejected_by_guard(input: &str) -> bool {
    input
        .trim()
        .parse::<i64>()
        .is_ok_and(|value| value < MIN_TIMESTAMP)
}
