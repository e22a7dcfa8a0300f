//! Online place-name to timezone resolution.
//!
//! Two chained GET requests: geocode the free-text query to candidate
//! places, then reverse-geocode each candidate's coordinates to an IANA
//! zone. Both steps are cached (query text → places, coordinate pair →
//! zone response) until the next catalog rebuild clears the caches. Every
//! failure degrades to an empty result; nothing here ever reaches the user
//! as an error.

use std::collections::HashMap;
use std::io::Read;
use std::sync::Mutex;
use std::time::Duration;

use chrono_tz::Tz;
use flate2::read::GzDecoder;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::types::Suggestion;
use crate::zones::current_offset;

const GEOCODE_URL: &str = "https://nominatim.openstreetmap.org/search";
const ZONE_URL: &str = "https://api.geotimezone.com/public/timezone";

/// At most this many geocode results are chased per query.
const MAX_PLACES: usize = 5;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors inside the lookup chain. Callers only ever log these.
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("request failed: {0}")]
    Http(String),

    #[error("malformed response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("response body unreadable: {0}")]
    Body(#[from] std::io::Error),
}

/// HTTP seam, object-safe so tests can count and fake calls.
pub trait Transport {
    /// GET a URL and decode the JSON body.
    fn get_json(&self, url: &str) -> Result<Value, LookupError>;
}

/// Real transport: ureq agent with a descriptive client identifier.
///
/// Requests advertise gzip support; a gzip-encoded body is detected via the
/// response header and decompressed before JSON decoding.
pub struct HttpTransport {
    agent: ureq::Agent,
}

impl HttpTransport {
    #[must_use]
    pub fn new() -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION"),
                " (+",
                env!("CARGO_PKG_REPOSITORY"),
                ")"
            ))
            .build();
        Self { agent }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for HttpTransport {
    fn get_json(&self, url: &str) -> Result<Value, LookupError> {
        let response = self
            .agent
            .get(url)
            .set("Accept-Encoding", "gzip")
            .call()
            .map_err(|err| LookupError::Http(err.to_string()))?;

        let gzipped = response
            .header("Content-Encoding")
            .is_some_and(|enc| enc.eq_ignore_ascii_case("gzip"));

        let mut body = Vec::new();
        response.into_reader().read_to_end(&mut body)?;

        if gzipped {
            let mut decoded = Vec::new();
            GzDecoder::new(body.as_slice()).read_to_end(&mut decoded)?;
            Ok(serde_json::from_slice(&decoded)?)
        } else {
            Ok(serde_json::from_slice(&body)?)
        }
    }
}

/// One geocoding candidate. Coordinates stay strings, exactly as the
/// endpoint sends them; they double as cache keys.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Place {
    pub lat: String,
    pub lon: String,
    pub display_name: String,
    pub name: String,
}

/// Resolves free-text place names to timezone suggestions.
pub struct OnlineResolver {
    transport: Box<dyn Transport>,
    geocode_url: String,
    zone_url: String,
    place_cache: Mutex<HashMap<String, Vec<Place>>>,
    zone_cache: Mutex<HashMap<(String, String), Value>>,
}

impl OnlineResolver {
    #[must_use]
    pub fn new() -> Self {
        Self::with_transport(Box::new(HttpTransport::new()))
    }

    /// Build with a custom transport (tests, proxies).
    #[must_use]
    pub fn with_transport(transport: Box<dyn Transport>) -> Self {
        Self {
            transport,
            geocode_url: GEOCODE_URL.to_string(),
            zone_url: ZONE_URL.to_string(),
            place_cache: Mutex::new(HashMap::new()),
            zone_cache: Mutex::new(HashMap::new()),
        }
    }

    /// Drop everything cached. Called on every catalog rebuild.
    pub fn clear_cache(&self) {
        if let Ok(mut cache) = self.place_cache.lock() {
            cache.clear();
        }
        if let Ok(mut cache) = self.zone_cache.lock() {
            cache.clear();
        }
    }

    /// Resolve a query to timezone suggestions. Empty on any failure.
    #[must_use]
    pub fn resolve(&self, query: &str) -> Vec<Suggestion> {
        match self.try_resolve(query) {
            Ok(suggestions) => suggestions,
            Err(err) => {
                debug!(query, %err, "online lookup failed");
                Vec::new()
            }
        }
    }

    fn try_resolve(&self, query: &str) -> Result<Vec<Suggestion>, LookupError> {
        let places = self.places_for(query)?;

        let mut suggestions = Vec::new();
        for place in places.iter().take(MAX_PLACES) {
            let response = self.zone_for(&place.lat, &place.lon)?;
            let Some(zone_id) = response.get("iana_timezone").and_then(Value::as_str) else {
                debug!(lat = %place.lat, lon = %place.lon, "no iana_timezone in response");
                continue;
            };
            let Ok(tz) = zone_id.parse::<Tz>() else {
                debug!(zone_id, "zone id not in the local database");
                continue;
            };

            suggestions.push(Suggestion {
                label: format!(
                    "{}: {} in timezone {} ({})",
                    query,
                    place.name,
                    zone_id,
                    current_offset(tz)
                ),
                description: format!("Time in '{}'", place.display_name),
                tag: zone_id.to_string(),
                accepts_input: true,
                loop_on_select: true,
            });
        }
        Ok(suggestions)
    }

    /// Geocode results for a query, cached by the raw query text.
    fn places_for(&self, query: &str) -> Result<Vec<Place>, LookupError> {
        if let Ok(cache) = self.place_cache.lock() {
            if let Some(hit) = cache.get(query) {
                debug!(query, "geocode cache hit");
                return Ok(hit.clone());
            }
        }

        let url = format!(
            "{}?format=json&q={}",
            self.geocode_url,
            utf8_percent_encode(query, NON_ALPHANUMERIC)
        );
        let raw = self.transport.get_json(&url)?;
        let places: Vec<Place> = serde_json::from_value(raw)?;

        if let Ok(mut cache) = self.place_cache.lock() {
            cache.insert(query.to_string(), places.clone());
        }
        Ok(places)
    }

    /// Zone response for a coordinate pair, cached by the pair.
    fn zone_for(&self, lat: &str, lon: &str) -> Result<Value, LookupError> {
        let key = (lat.to_string(), lon.to_string());
        if let Ok(cache) = self.zone_cache.lock() {
            if let Some(hit) = cache.get(&key) {
                debug!(lat, lon, "zone cache hit");
                return Ok(hit.clone());
            }
        }

        let url = format!(
            "{}?latitude={}&longitude={}",
            self.zone_url,
            utf8_percent_encode(lat, NON_ALPHANUMERIC),
            utf8_percent_encode(lon, NON_ALPHANUMERIC)
        );
        let raw = self.transport.get_json(&url)?;

        if let Ok(mut cache) = self.zone_cache.lock() {
            cache.insert(key, raw.clone());
        }
        Ok(raw)
    }
}

impl Default for OnlineResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    use std::sync::Arc;

    /// Records every requested URL and serves canned bodies.
    struct FakeTransport {
        calls: Arc<Mutex<Vec<String>>>,
        geocode_body: Value,
        zone_body: Value,
        fail: bool,
    }

    impl FakeTransport {
        fn new(geocode_body: Value, zone_body: Value) -> Self {
            Self {
                calls: Arc::new(Mutex::new(Vec::new())),
                geocode_body,
                zone_body,
                fail: false,
            }
        }

        fn failing() -> Self {
            let mut transport = Self::new(Value::Null, Value::Null);
            transport.fail = true;
            transport
        }

        /// Shared handle to the call log, kept after the box moves away.
        fn log(&self) -> Arc<Mutex<Vec<String>>> {
            Arc::clone(&self.calls)
        }
    }

    impl Transport for FakeTransport {
        fn get_json(&self, url: &str) -> Result<Value, LookupError> {
            self.calls.lock().unwrap().push(url.to_string());
            if self.fail {
                return Err(LookupError::Http("connection refused".into()));
            }
            if url.contains("format=json&q=") {
                Ok(self.geocode_body.clone())
            } else {
                Ok(self.zone_body.clone())
            }
        }
    }

    fn place(lat: &str, lon: &str, name: &str) -> Value {
        json!({
            "lat": lat,
            "lon": lon,
            "display_name": format!("{}, Somewhere", name),
            "name": name,
        })
    }

    fn resolver_with(transport: FakeTransport) -> (OnlineResolver, Arc<Mutex<Vec<String>>>) {
        let log = transport.log();
        (OnlineResolver::with_transport(Box::new(transport)), log)
    }

    fn calls(log: &Arc<Mutex<Vec<String>>>) -> Vec<String> {
        log.lock().unwrap().clone()
    }

    #[test]
    fn composes_label_from_query_place_zone_and_offset() {
        let transport = FakeTransport::new(
            json!([place("52.52", "13.40", "Berlin")]),
            json!({"iana_timezone": "Europe/Berlin"}),
        );
        let (resolver, _) = resolver_with(transport);

        let out = resolver.resolve("berlin");
        assert_eq!(out.len(), 1);
        assert!(out[0].label.starts_with("berlin: Berlin in timezone Europe/Berlin (+0"));
        assert_eq!(out[0].tag, "Europe/Berlin");
        assert_eq!(out[0].description, "Time in 'Berlin, Somewhere'");
    }

    #[test]
    fn second_identical_query_skips_the_geocode_call() {
        let transport = FakeTransport::new(
            json!([place("52.52", "13.40", "Berlin")]),
            json!({"iana_timezone": "Europe/Berlin"}),
        );
        let (resolver, log) = resolver_with(transport);

        resolver.resolve("berlin");
        resolver.resolve("berlin");

        let geocode_calls = calls(&log)
            .iter()
            .filter(|url| url.contains("format=json&q="))
            .count();
        assert_eq!(geocode_calls, 1);
    }

    #[test]
    fn coordinate_cache_spans_queries() {
        let transport = FakeTransport::new(
            json!([place("52.52", "13.40", "Berlin")]),
            json!({"iana_timezone": "Europe/Berlin"}),
        );
        let (resolver, log) = resolver_with(transport);

        resolver.resolve("berlin");
        resolver.resolve("berlin");

        let zone_calls = calls(&log)
            .iter()
            .filter(|url| url.contains("latitude="))
            .count();
        assert_eq!(zone_calls, 1);
    }

    #[test]
    fn clearing_the_cache_forces_a_refetch() {
        let transport = FakeTransport::new(
            json!([place("52.52", "13.40", "Berlin")]),
            json!({"iana_timezone": "Europe/Berlin"}),
        );
        let (resolver, log) = resolver_with(transport);

        resolver.resolve("berlin");
        resolver.clear_cache();
        resolver.resolve("berlin");

        let geocode_calls = calls(&log)
            .iter()
            .filter(|url| url.contains("format=json&q="))
            .count();
        assert_eq!(geocode_calls, 2);
    }

    #[test]
    fn caps_results_at_five() {
        let places: Vec<Value> = (0..7)
            .map(|i| place(&format!("{}.0", i), "0.0", &format!("Place{}", i)))
            .collect();
        let transport = FakeTransport::new(
            Value::Array(places),
            json!({"iana_timezone": "Europe/Berlin"}),
        );
        let (resolver, _) = resolver_with(transport);

        assert_eq!(resolver.resolve("somewhere").len(), 5);
    }

    #[test]
    fn network_failure_degrades_to_empty() {
        let (resolver, _) = resolver_with(FakeTransport::failing());
        assert!(resolver.resolve("berlin").is_empty());
    }

    #[test]
    fn missing_zone_field_skips_that_place() {
        let transport = FakeTransport::new(
            json!([place("52.52", "13.40", "Berlin")]),
            json!({"unexpected": true}),
        );
        let (resolver, _) = resolver_with(transport);
        assert!(resolver.resolve("berlin").is_empty());
    }

    #[test]
    fn query_text_is_url_encoded() {
        let transport = FakeTransport::new(json!([]), Value::Null);
        let (resolver, log) = resolver_with(transport);

        resolver.resolve("new york");
        let urls = calls(&log);
        assert!(urls[0].ends_with("format=json&q=new%20york"));
    }
}
