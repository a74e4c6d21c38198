//! Wire format of the persisted folder collection.
//!
//! The records here mirror the JSON document field for field. They are kept separate
//! from [`Folder`] and [`Page`] so the in-memory entities can enforce their own
//! invariants (no id reassignment, owned pages) independent of the storage shape.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::storage::timestamp::CreationStamp;
use crate::storage::{Error, Folder, FolderId, Page, Result};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub(crate) struct FolderRecord {
    id: String,
    name: String,
    // Older collections may lack timestamps; a fresh one is stamped on load.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    timestamp: Option<String>,
    documents: Vec<PageRecord>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub(crate) struct PageRecord {
    uri: String,
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    timestamp: Option<String>,
}

impl From<&Page> for PageRecord {
    fn from(page: &Page) -> Self {
        PageRecord {
            uri: page.image_ref().to_string(),
            name: page.name().to_string(),
            timestamp: Some(page.created_at().to_string()),
        }
    }
}

impl From<&Folder> for FolderRecord {
    fn from(folder: &Folder) -> Self {
        FolderRecord {
            id: folder.id().to_string(),
            name: folder.name().to_string(),
            timestamp: Some(folder.created_at().to_string()),
            documents: folder.pages().iter().map(PageRecord::from).collect(),
        }
    }
}

impl PageRecord {
    fn into_page(self) -> Page {
        let created_at = self.timestamp.unwrap_or_else(|| {
            warn!("Page '{}' has no stored timestamp, stamping current time", self.uri);
            CreationStamp::now().into_display()
        });
        Page::restore(self.uri, self.name, created_at)
    }
}

impl FolderRecord {
    fn into_folder(self) -> Folder {
        let created_at = self.timestamp.unwrap_or_else(|| {
            warn!("Folder '{}' has no stored timestamp, stamping current time", self.id);
            CreationStamp::now().into_display()
        });
        let pages = self.documents.into_iter().map(PageRecord::into_page).collect();
        Folder::restore(FolderId::from(self.id), self.name, created_at, pages)
    }
}

/// Serializes the full collection into the value stored under the folders key.
pub(crate) fn encode(folders: &[Folder]) -> Result<Value> {
    let records: Vec<FolderRecord> = folders.iter().map(FolderRecord::from).collect();
    Ok(serde_json::to_value(records)?)
}

/// Decodes and validates a stored collection.
///
/// Fails on any structural mismatch, on blank ids and on duplicate ids.
pub(crate) fn decode(value: Value) -> Result<Vec<Folder>> {
    let records: Vec<FolderRecord> = serde_json::from_value(value)?;

    {
        let mut seen = HashSet::with_capacity(records.len());
        for record in &records {
            if record.id.trim().is_empty() {
                return Err(Error::InvalidDocument("folder with blank id".to_string()));
            }
            if !seen.insert(record.id.as_str()) {
                return Err(Error::InvalidDocument(format!("duplicate folder id '{}'", record.id)));
            }
        }
    }

    Ok(records.into_iter().map(FolderRecord::into_folder).collect())
}
