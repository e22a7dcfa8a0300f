//! Runtime settings supplied by the host.
//!
//! The core never persists these; the host re-reads its own configuration
//! on change and hands a fresh snapshot to [`Flow::rebuild`](crate::Flow::rebuild).

use serde::Deserialize;

/// Snapshot of the host configuration the core needs.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Ordered strftime format strings tried for every locale.
    pub formats: Vec<String>,
    /// Ordered locale identifiers; `""` means the platform default.
    pub locales: Vec<String>,
    /// Label of the "time" catalog entry.
    pub item_label: String,
    /// Label of the "timezone" catalog entry.
    pub item_label2: String,
    /// Whether online place-name lookups are allowed.
    pub online: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            formats: vec!["%c".into(), "%x".into()],
            locales: vec![String::new(), "C".into()],
            item_label: "Time:".into(),
            item_label2: "Timezone:".into(),
            online: true,
        }
    }
}
