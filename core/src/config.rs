//! Location of the store on disk.

use std::path::PathBuf;

use crate::storage::{Error, Result};

/// Directory name used under the platform's local data directory.
pub const APP_DIR_NAME: &str = "scanshelf";

/// Name of the preference file holding the folder collection.
pub const DEFAULT_PREFERENCES_NAME: &str = "document_folders";

const FILES_DIR_NAME: &str = "files";
const PREFERENCES_DIR_NAME: &str = "shared_prefs";

/// Where a [`MetadataStore`](crate::storage::MetadataStore) keeps its data.
///
/// Layout below `data_dir`:
///
/// ```text
/// shared_prefs/<preferences_name>.json   folder collection
/// files/<folder_id>/<name>.pdf           PDF attachments
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub data_dir: PathBuf,
    pub preferences_name: String,
}

impl StoreConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        StoreConfig {
            data_dir: data_dir.into(),
            preferences_name: DEFAULT_PREFERENCES_NAME.to_string(),
        }
    }

    /// Uses `<local data dir>/scanshelf`, e.g. `~/.local/share/scanshelf` on Linux.
    pub fn default_location() -> Result<Self> {
        let base = dirs::data_local_dir().ok_or(Error::NoDataDirectory)?;
        Ok(Self::new(base.join(APP_DIR_NAME)))
    }

    pub fn with_preferences_name(mut self, name: impl Into<String>) -> Self {
        self.preferences_name = name.into();
        self
    }

    pub fn files_dir(&self) -> PathBuf {
        self.data_dir.join(FILES_DIR_NAME)
    }

    pub fn preferences_dir(&self) -> PathBuf {
        self.data_dir.join(PREFERENCES_DIR_NAME)
    }
}
