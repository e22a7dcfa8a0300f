//! Offline timezone listing.
//!
//! Enumerates the bundled IANA database; every zone becomes one suggestion
//! labeled with its current UTC offset. Offsets are computed at call time,
//! so they are DST-correct for "now" only.

use chrono::Utc;
use chrono_tz::Tz;

use crate::types::Suggestion;

/// Current UTC offset of a zone, in `%z` form (e.g. `+0200`).
#[must_use]
pub fn current_offset(tz: Tz) -> String {
    Utc::now().with_timezone(&tz).format("%z").to_string()
}

/// One suggestion per known zone, in database order.
#[must_use]
pub fn list_zones() -> Vec<Suggestion> {
    chrono_tz::TZ_VARIANTS
        .iter()
        .map(|&tz| {
            let name = tz.name();
            Suggestion {
                label: format!("{} ({})", name.replace('_', " "), current_offset(tz)),
                description: format!("Time in timezone '{}'", name),
                tag: name.to_string(),
                accepts_input: true,
                loop_on_select: true,
            }
        })
        .collect()
}
