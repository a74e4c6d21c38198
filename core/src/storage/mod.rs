//! Persistent storage for scan folders, their pages and PDF attachments.
//!
//! # Core Concepts
//!
//! *   **[`Folder`]:** One scan session. A folder has a generated [`FolderId`], a display
//!     name, a creation timestamp and an ordered list of pages (scan order).
//! *   **[`Page`]:** One scanned page. The page only holds a reference (URI) to the image;
//!     the image bytes are owned by whoever produced them.
//! *   **[`MetadataStore`]:** Loads and saves the *whole* folder collection as one JSON
//!     document stored under a single key of a [`Preferences`] backend. Every mutation is
//!     a read-modify-write of that document.
//! *   **[`PdfFile`]:** A PDF attachment stored next to the metadata, at
//!     `<files_dir>/<folder_id>/<file_name>.pdf`. Attachments are not part of the JSON
//!     document; they are found again by recomputing the same path.
//!
//! # Persisted Document
//!
//! The collection is stored under the `folders` key:
//!
//! ```text
//! { "folders": [
//!     { "id": "...", "name": "...", "timestamp": "...",
//!       "documents": [ { "uri": "...", "name": "...", "timestamp": "..." } ] } ] }
//! ```
//!
//! Decoding is strict: a blob that does not match this shape, or that contains empty or
//! duplicate folder ids, is treated as unreadable. [`MetadataStore::load_all`] never fails
//! the caller; an unreadable blob is logged and yields an empty collection.
//!
//! # Concurrency
//!
//! A store instance serializes all of its read-modify-write operations behind one async
//! mutex, so concurrent upserts through the same (shared) instance never lose each
//! other's changes. Separate store instances, or separate processes, pointing at the same
//! preference file are not coordinated.
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use scanshelf_core::storage::{Folder, MemoryPreferences, MetadataStore, Page};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let files_dir = std::env::temp_dir().join("scanshelf-example");
//!     let store = MetadataStore::new(Arc::new(MemoryPreferences::new()), files_dir);
//!
//!     let mut folder = Folder::new();
//!     folder.add_page(Page::new("content://scanner/page-1.jpg"));
//!     store.upsert(&folder).await?;
//!
//!     let loaded = store.find_by_id(folder.id().as_str()).await;
//!     assert_eq!(loaded.as_ref(), Some(&folder));
//!     Ok(())
//! }
//! ```

pub use self::attachment::{is_valid_file_name, PdfFile, PDF_EXTENSION};
pub use self::folder::{Folder, FolderId};
pub use self::page::Page;
pub use self::preferences::{FilePreferences, MemoryPreferences, Preferences};
pub use self::store::{MetadataStore, Upsert};
pub use self::timestamp::CreationStamp;

mod attachment;
mod folder;
mod metadata;
mod page;
mod preferences;
mod store;
mod timestamp;

use std::path::PathBuf;
use thiserror::Error;

/// Key under which the folder collection is stored in the preference backend.
pub const FOLDERS_KEY: &str = "folders";

#[derive(Debug, Error)]
pub enum Error {
    #[error("Metadata serialization/deserialization error")]
    Metadata(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Persisted folder document is invalid: {0}")]
    InvalidDocument(String),

    #[error("Preference file does not contain a JSON object: {0}")]
    InvalidPreferences(PathBuf),

    #[error("Invalid folder id: {0:?}")]
    InvalidFolderId(String),

    #[error("Invalid attachment file name: {0:?}")]
    InvalidFileName(String),

    #[error("Path is not absolute: {0}")]
    RelativePath(PathBuf),

    #[error("Name must not be blank")]
    BlankName,

    #[error("Attachment already exists at target path: {0}")]
    AttachmentConflict(PathBuf),

    #[error("Could not determine a data directory for this platform")]
    NoDataDirectory,
}

// Define a standard Result type for the library
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_message_keeps_cause() {
        let err = Error::from(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only volume"));
        assert_eq!(err.to_string(), "IO error: read-only volume");
    }
}
