//! Turning a finished scan session into a stored folder.

use std::path::{Path, PathBuf};

use tokio::fs::File;
use tokio::io::BufReader;
use tracing::{info, instrument, warn};

use crate::storage::{is_valid_file_name, Error, Folder, MetadataStore, Page, PdfFile, Result};

/// What the scanner hands back at the end of a session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanResult {
    /// Image URIs of the scanned pages, in scan order.
    pub pages: Vec<String>,
    /// Location of the PDF rendering of the session, if one was produced.
    pub pdf: Option<PathBuf>,
}

/// A scan that has been stored.
#[derive(Debug)]
pub struct ImportedScan {
    pub folder: Folder,
    /// Outcome of copying the PDF, or `None` if the scan had no PDF.
    pub pdf: Option<Result<PdfFile>>,
}

impl MetadataStore {
    /// Stores a scan session as a new folder.
    ///
    /// The folder is named `name` unless that is blank, in which case the default
    /// name is kept. A name that cannot serve as an attachment file name fails with
    /// [`Error::InvalidFileName`] and nothing is stored.
    ///
    /// If the scan produced a PDF, it is copied under the folder's name. A failed PDF
    /// copy does not prevent the folder from being stored; it is reported through
    /// [`ImportedScan::pdf`].
    #[instrument(skip(self, scan), fields(pages = scan.pages.len(), has_pdf = scan.pdf.is_some()))]
    pub async fn import_scan(&self, scan: ScanResult, name: Option<&str>) -> Result<ImportedScan> {
        let name = name.map(str::trim).filter(|name| !name.is_empty());
        if let Some(name) = name.filter(|name| !is_valid_file_name(name)) {
            warn!("Rejecting scan import under unusable name {:?}", name);
            return Err(Error::InvalidFileName(name.to_string()));
        }

        let mut folder = Folder::new();
        if let Some(name) = name {
            folder.rename(name);
        }
        for uri in scan.pages {
            folder.add_page(Page::new(uri));
        }

        let pdf = match scan.pdf {
            Some(source) => Some(self.copy_pdf(&source, &folder).await),
            None => None,
        };

        self.upsert(&folder).await?;
        info!("Imported scan '{}' with {} pages", folder.name(), folder.page_count());
        Ok(ImportedScan { folder, pdf })
    }

    async fn copy_pdf(&self, source: &Path, folder: &Folder) -> Result<PdfFile> {
        let file = File::open(source).await.map_err(|e| {
            warn!("Cannot open scanned PDF '{}': {}", source.display(), e);
            Error::Io(e)
        })?;
        let mut reader = BufReader::new(file);
        self.save_pdf(&mut reader, folder.id().as_str(), folder.name()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryPreferences;
    use std::sync::Arc;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_import_scan_with_pdf() {
        let dir = tempdir().unwrap();
        let store = MetadataStore::new(Arc::new(MemoryPreferences::new()), dir.path().join("files"));
        let source = dir.path().join("scan.pdf");
        tokio::fs::write(&source, b"%PDF scan").await.unwrap();

        let scan = ScanResult {
            pages: vec!["content://scan/1".into(), "content://scan/2".into()],
            pdf: Some(source),
        };
        let imported = store.import_scan(scan, Some(" Invoices ")).await.unwrap();

        assert_eq!(imported.folder.name(), "Invoices");
        let refs: Vec<_> = imported.folder.pages().iter().map(Page::image_ref).collect();
        assert_eq!(refs, vec!["content://scan/1", "content://scan/2"]);

        let pdf = imported.pdf.unwrap().unwrap();
        assert_eq!(pdf.read_content().await.unwrap(), b"%PDF scan");
        assert_eq!(store.pdf_for(&imported.folder).await, Some(pdf));
        assert_eq!(store.find_by_id(imported.folder.id().as_str()).await, Some(imported.folder));
    }

    #[tokio::test]
    async fn test_import_scan_keeps_default_name_when_blank() {
        let dir = tempdir().unwrap();
        let store = MetadataStore::new(Arc::new(MemoryPreferences::new()), dir.path());

        let imported = store.import_scan(ScanResult::default(), Some("   ")).await.unwrap();
        assert!(imported.folder.name().starts_with("Scan_"));
        assert!(imported.pdf.is_none());
    }

    #[tokio::test]
    async fn test_import_scan_rejects_path_like_name_before_storing() {
        let dir = tempdir().unwrap();
        let store = MetadataStore::new(Arc::new(MemoryPreferences::new()), dir.path().join("files"));
        let source = dir.path().join("scan.pdf");
        tokio::fs::write(&source, b"%PDF scan").await.unwrap();

        let scan = ScanResult { pages: vec!["content://scan/1".into()], pdf: Some(source) };
        let result = store.import_scan(scan, Some("a/b")).await;

        assert!(matches!(result, Err(Error::InvalidFileName(_))));
        assert!(store.load_all().await.is_empty());
        assert!(!dir.path().join("files").exists());
    }

    #[tokio::test]
    async fn test_import_scan_stores_folder_when_pdf_is_missing() {
        let dir = tempdir().unwrap();
        let store = MetadataStore::new(Arc::new(MemoryPreferences::new()), dir.path());

        let scan = ScanResult {
            pages: vec!["content://scan/1".into()],
            pdf: Some(dir.path().join("does-not-exist.pdf")),
        };
        let imported = store.import_scan(scan, None).await.unwrap();

        assert!(matches!(imported.pdf, Some(Err(Error::Io(_)))));
        assert_eq!(store.load_all().await.len(), 1);
    }
}
