use crate::storage::timestamp::CreationStamp;

const DEFAULT_NAME_PREFIX: &str = "Page";

/// One scanned page inside a [`Folder`](crate::storage::Folder).
///
/// The page references its image by URI; the bytes behind that URI are owned by the
/// producer (usually the scanner) and are never copied by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    image_ref: String,
    name: String,
    created_at: String,
}

impl Page {
    /// Creates a page for the given image URI, named `Page_<yyyyMMdd_HHmmss>`.
    pub fn new(image_ref: impl Into<String>) -> Self {
        let stamp = CreationStamp::now();
        Page {
            image_ref: image_ref.into(),
            name: stamp.default_name(DEFAULT_NAME_PREFIX),
            created_at: stamp.into_display(),
        }
    }

    /// Rebuilds a page from persisted fields.
    pub(crate) fn restore(image_ref: String, name: String, created_at: String) -> Self {
        Page { image_ref, name, created_at }
    }

    pub fn image_ref(&self) -> &str {
        &self.image_ref
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
}
