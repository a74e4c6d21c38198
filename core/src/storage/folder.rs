use crate::storage::page::Page;
use crate::storage::timestamp::CreationStamp;
use std::fmt;
use uuid::Uuid;

const DEFAULT_NAME_PREFIX: &str = "Scan";

/// Opaque identifier of a [`Folder`].
///
/// New ids are UUID v4 strings. Ids read back from storage are kept verbatim, so
/// collections written by older versions (which used wall-clock milliseconds) stay
/// addressable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FolderId(String);

impl FolderId {
    /// Generates a fresh, unique identifier.
    pub fn generate() -> Self {
        FolderId(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl From<String> for FolderId {
    fn from(id: String) -> Self {
        FolderId(id)
    }
}

impl From<&str> for FolderId {
    fn from(id: &str) -> Self {
        FolderId(id.to_string())
    }
}

impl PartialEq<str> for FolderId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl fmt::Display for FolderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One scan session: an identified, named, ordered group of pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Folder {
    id: FolderId,
    name: String,
    created_at: String,
    pages: Vec<Page>,
}

impl Folder {
    /// Creates an empty folder with a generated id, named `Scan_<yyyyMMdd_HHmmss>`.
    pub fn new() -> Self {
        Self::with_id(FolderId::generate())
    }

    /// Creates an empty folder under an id assigned elsewhere.
    pub fn with_id(id: impl Into<FolderId>) -> Self {
        let stamp = CreationStamp::now();
        Folder {
            id: id.into(),
            name: stamp.default_name(DEFAULT_NAME_PREFIX),
            created_at: stamp.into_display(),
            pages: Vec::new(),
        }
    }

    /// Rebuilds a folder from persisted fields.
    pub(crate) fn restore(id: FolderId, name: String, created_at: String, pages: Vec<Page>) -> Self {
        Folder { id, name, created_at, pages }
    }

    pub fn id(&self) -> &FolderId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn created_at(&self) -> &str {
        &self.created_at
    }

    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Pages in scan order.
    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn page_mut(&mut self, index: usize) -> Option<&mut Page> {
        self.pages.get_mut(index)
    }

    /// Appends a page; pages keep the order in which they are added.
    pub fn add_page(&mut self, page: Page) {
        self.pages.push(page);
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Image reference of the first page, used as the folder's preview.
    pub fn thumbnail(&self) -> Option<&str> {
        self.pages.first().map(Page::image_ref)
    }
}

impl Default for Folder {
    fn default() -> Self {
        Self::new()
    }
}
