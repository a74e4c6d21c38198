use chrono::{Local, NaiveDateTime};

/// Human-readable format used for `created_at`, e.g. `Apr 23, 2025 14:30:45`.
pub const DISPLAY_FORMAT: &str = "%b %d, %Y %H:%M:%S";

/// Sortable format used to derive default names, e.g. `20250423_143045`.
pub const SORTABLE_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Both renderings of a single creation instant.
///
/// Taking one clock reading for both keeps a default name and its timestamp in agreement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreationStamp {
    display: String,
    sortable: String,
}

impl CreationStamp {
    /// Stamps the current local time.
    pub fn now() -> Self {
        Self::at(Local::now().naive_local())
    }

    pub fn at(instant: NaiveDateTime) -> Self {
        CreationStamp {
            display: instant.format(DISPLAY_FORMAT).to_string(),
            sortable: instant.format(SORTABLE_FORMAT).to_string(),
        }
    }

    /// Default display name for an entity: `<prefix>_<sortable>`.
    pub fn default_name(&self, prefix: &str) -> String {
        format!("{}_{}", prefix, self.sortable)
    }

    pub(crate) fn into_display(self) -> String {
        self.display
    }
}
