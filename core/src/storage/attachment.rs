use std::path::{Component, Path, PathBuf};

use tokio::fs;
use tokio::io::{AsyncRead, AsyncWriteExt};
use tracing::{debug, warn};
use url::Url;
use uuid::Uuid;

use crate::storage::{Error, Result};

pub const PDF_EXTENSION: &str = "pdf";

/// Handle to a PDF attachment stored on disk.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PdfFile {
    path: PathBuf,
}

impl PdfFile {
    pub(crate) fn new(path: PathBuf) -> Self {
        PdfFile { path }
    }

    /// Returns the absolute path to the file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file_name(&self) -> Option<&str> {
        self.path.file_name()?.to_str()
    }

    pub fn mime_type(&self) -> mime::Mime {
        mime::APPLICATION_PDF
    }

    /// Percent-encoded `file://` URI handed to external viewers.
    pub fn uri(&self) -> Result<Url> {
        Url::from_file_path(&self.path).map_err(|()| Error::RelativePath(self.path.clone()))
    }

    /// Asynchronously reads the entire content of the file into a byte vector.
    pub async fn read_content(&self) -> Result<Vec<u8>> {
        fs::read(&self.path).await.map_err(Error::Io)
    }
}

/// Computes `<files_dir>/<folder_id>/<file_name>.pdf`.
///
/// Both components must be single, non-blank path segments.
pub(crate) fn pdf_path(files_dir: &Path, folder_id: &str, file_name: &str) -> Result<PathBuf> {
    if !is_single_segment(folder_id) {
        return Err(Error::InvalidFolderId(folder_id.to_string()));
    }
    if !is_valid_file_name(file_name) {
        return Err(Error::InvalidFileName(file_name.to_string()));
    }
    Ok(files_dir.join(folder_id).join(format!("{}.{}", file_name, PDF_EXTENSION)))
}

/// Whether `name` can name a PDF attachment: one non-blank path segment.
///
/// Folder names become attachment file names, so this also decides which folder names
/// the store accepts.
pub fn is_valid_file_name(name: &str) -> bool {
    is_single_segment(name)
}

fn is_single_segment(name: &str) -> bool {
    if name.trim().is_empty() || name.contains(['/', '\\', '\0']) {
        return false;
    }
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

/// Drains `reader` into `path`, creating the parent directory if needed.
///
/// The bytes go to a temp file first, so `path` only ever holds a complete copy.
pub(crate) async fn write_pdf<R>(path: &Path, reader: &mut R) -> Result<PdfFile>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let dir = path.parent().ok_or_else(|| Error::InvalidFileName(path.display().to_string()))?;
    fs::create_dir_all(dir).await.map_err(Error::Io)?;

    let temp_path = dir.join(format!(".tmp_{}", Uuid::new_v4()));
    let written = async {
        let mut file = fs::File::create(&temp_path).await?;
        let bytes = tokio::io::copy(reader, &mut file).await?;
        file.flush().await?;
        file.sync_all().await?;
        fs::rename(&temp_path, path).await?;
        Ok::<u64, std::io::Error>(bytes)
    }
    .await;

    match written {
        Ok(bytes) => {
            debug!("Saved PDF ({} bytes) to {}", bytes, path.display());
            Ok(PdfFile::new(path.to_path_buf()))
        }
        Err(e) => {
            warn!("Failed to save PDF to {}: {}", path.display(), e);
            let _ = fs::remove_file(&temp_path).await;
            Err(Error::Io(e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_pdf_path_layout() {
        let path = pdf_path(Path::new("/data/files"), "F1", "Report").unwrap();
        assert_eq!(path, PathBuf::from("/data/files/F1/Report.pdf"));
    }

    #[test]
    fn test_pdf_path_allows_spaces_and_dots() {
        let path = pdf_path(Path::new("/d"), "F1", "Scan 2025.04.23").unwrap();
        assert_eq!(path, PathBuf::from("/d/F1/Scan 2025.04.23.pdf"));
    }

    #[test]
    fn test_pdf_path_rejects_traversal() {
        let files = Path::new("/d");
        assert!(matches!(pdf_path(files, "..", "a"), Err(Error::InvalidFolderId(_))));
        assert!(matches!(pdf_path(files, "", "a"), Err(Error::InvalidFolderId(_))));
        assert!(matches!(pdf_path(files, "F1", "../x"), Err(Error::InvalidFileName(_))));
        assert!(matches!(pdf_path(files, "F1", "a/b"), Err(Error::InvalidFileName(_))));
        assert!(matches!(pdf_path(files, "F1", "."), Err(Error::InvalidFileName(_))));
        assert!(matches!(pdf_path(files, "F1", "  "), Err(Error::InvalidFileName(_))));
    }

    #[test]
    fn test_uri_is_percent_encoded() {
        let path = pdf_path(Path::new("/data/files"), "F1", "Q1 #2 100%").unwrap();
        let uri = PdfFile::new(path.clone()).uri().unwrap();

        assert_eq!(uri.as_str(), "file:///data/files/F1/Q1%20%232%20100%25.pdf");
        assert_eq!(uri.fragment(), None);
        assert_eq!(uri.to_file_path().unwrap(), path);
    }

    #[test]
    fn test_uri_rejects_relative_path() {
        let pdf = PdfFile::new(PathBuf::from("data/files/F1/Report.pdf"));
        assert!(matches!(pdf.uri(), Err(Error::RelativePath(_))));
    }

    #[test]
    fn test_is_valid_file_name() {
        assert!(is_valid_file_name("Scan_20250423_143045"));
        assert!(is_valid_file_name("Q1 #2"));
        assert!(!is_valid_file_name("a/b"));
        assert!(!is_valid_file_name(".."));
        assert!(!is_valid_file_name("a\\b"));
    }

    #[tokio::test]
    async fn test_write_pdf_creates_directory() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("F1").join("Report.pdf");
        let mut reader: &[u8] = b"%PDF-1.7 test";

        let pdf = write_pdf(&path, &mut reader).await.unwrap();
        assert_eq!(pdf.path(), path);
        assert_eq!(pdf.file_name(), Some("Report.pdf"));
        assert_eq!(pdf.mime_type(), mime::APPLICATION_PDF);
        assert_eq!(pdf.uri().unwrap().to_file_path().unwrap(), path);
        assert_eq!(pdf.read_content().await.unwrap(), b"%PDF-1.7 test");
    }

    #[tokio::test]
    async fn test_write_pdf_overwrites_existing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("F1").join("Report.pdf");
        write_pdf(&path, &mut &b"first"[..]).await.unwrap();
        let pdf = write_pdf(&path, &mut &b"second"[..]).await.unwrap();
        assert_eq!(pdf.read_content().await.unwrap(), b"second");
    }
}
