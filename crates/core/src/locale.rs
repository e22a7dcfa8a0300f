//! Locale identifier resolution for localized rendering.
//!
//! Locale identifiers are opaque config strings. `""` asks for the platform
//! default (taken from `LC_ALL`/`LC_TIME`/`LANG`, POSIX precedence), `"C"`
//! and `"POSIX"` name the invariant locale, anything else must match a
//! locale known to chrono's bundled tables. Unknown identifiers fail soft:
//! the caller skips that format/locale pairing.

use chrono::Locale;

/// A locale identifier the platform tables don't know.
#[derive(Debug, thiserror::Error)]
#[error("unsupported locale identifier: {0:?}")]
pub struct UnsupportedLocale(pub String);

/// Resolve an opaque identifier to a concrete locale.
pub fn resolve(identifier: &str) -> Result<Locale, UnsupportedLocale> {
    match identifier {
        "" => Ok(platform_default()),
        "C" | "POSIX" => Ok(Locale::POSIX),
        other => lookup(other).ok_or_else(|| UnsupportedLocale(other.to_string())),
    }
}

/// The platform default locale, or POSIX when the environment names none.
fn platform_default() -> Locale {
    ["LC_ALL", "LC_TIME", "LANG"]
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .filter(|value| !value.is_empty())
        .find_map(|value| lookup(&value))
        .unwrap_or(Locale::POSIX)
}

/// Look up an identifier, tolerating `de-DE` spelling and an `.UTF-8` suffix.
fn lookup(identifier: &str) -> Option<Locale> {
    let trimmed = identifier.split('.').next().unwrap_or(identifier);
    let normalized = trimmed.replace('-', "_");
    Locale::try_from(normalized.as_str()).ok()
}
