use std::path::PathBuf;
use std::sync::Arc;

use tokio::fs;
use tokio::io::AsyncRead;
use tokio::sync::Mutex;
use tracing::{debug, error, info, instrument, warn};

use crate::config::StoreConfig;
use crate::storage::attachment::{self, PdfFile};
use crate::storage::preferences::{FilePreferences, Preferences};
use crate::storage::{metadata, Error, Folder, Result, FOLDERS_KEY};

/// Outcome of [`MetadataStore::upsert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    /// No folder with this id existed; the folder was appended.
    Inserted,
    /// An existing folder with this id was replaced in place.
    Replaced,
    /// The folder was refused (blank id); nothing was written.
    Rejected,
}

/// Persists the folder collection and its PDF attachments.
///
/// Share one instance (e.g. behind an `Arc`) between all writers: the store's write
/// guard is what keeps concurrent read-modify-write cycles from overwriting each other.
#[derive(Debug)]
pub struct MetadataStore {
    preferences: Arc<dyn Preferences>,
    files_dir: PathBuf,
    write_lock: Mutex<()>,
}

impl MetadataStore {
    /// Creates a store over `preferences`, keeping attachments below `files_dir`.
    ///
    /// A relative `files_dir` is resolved against the current directory, so attachment
    /// paths and their URIs are always absolute.
    pub fn new(preferences: Arc<dyn Preferences>, files_dir: impl Into<PathBuf>) -> Self {
        let files_dir = files_dir.into();
        let files_dir = match std::path::absolute(&files_dir) {
            Ok(absolute) => absolute,
            Err(e) => {
                warn!("Cannot resolve files directory {}: {}", files_dir.display(), e);
                files_dir
            }
        };
        MetadataStore {
            preferences,
            files_dir,
            write_lock: Mutex::new(()),
        }
    }

    /// Opens the file-backed store described by `config`.
    pub fn open(config: &StoreConfig) -> Self {
        let preferences = FilePreferences::new(&config.preferences_dir(), &config.preferences_name);
        debug!("Opening metadata store at {}", preferences.path().display());
        Self::new(Arc::new(preferences), config.files_dir())
    }

    /// Loads the full folder collection.
    ///
    /// A missing collection yields an empty list. So does an unreadable or invalid one;
    /// the failure is logged and never reaches the caller.
    #[instrument(skip(self))]
    pub async fn load_all(&self) -> Vec<Folder> {
        match self.try_load_all().await {
            Ok(folders) => {
                debug!("Loaded {} folders", folders.len());
                folders
            }
            Err(e) => {
                error!("Error loading folders, continuing with an empty collection: {}", e);
                Vec::new()
            }
        }
    }

    async fn try_load_all(&self) -> Result<Vec<Folder>> {
        match self.preferences.get(FOLDERS_KEY).await? {
            Some(value) => metadata::decode(value),
            None => Ok(Vec::new()),
        }
    }

    /// Replaces the persisted collection with `folders`. No merge takes place.
    #[instrument(skip(self, folders), fields(count = folders.len()))]
    pub async fn save_all(&self, folders: &[Folder]) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.write_all(folders).await
    }

    // Callers must hold `write_lock`.
    async fn write_all(&self, folders: &[Folder]) -> Result<()> {
        let value = metadata::encode(folders)?;
        if let Err(e) = self.preferences.set(FOLDERS_KEY, value).await {
            error!("Error saving folders: {}", e);
            return Err(e);
        }
        debug!("Saved {} folders", folders.len());
        Ok(())
    }

    /// Returns the folder with the given id, if any.
    #[instrument(skip(self))]
    pub async fn find_by_id(&self, id: &str) -> Option<Folder> {
        let found = self.load_all().await.into_iter().find(|folder| folder.id() == id);
        if found.is_none() {
            debug!("Folder not found with ID: {}", id);
        }
        found
    }

    /// Inserts `folder`, or replaces the stored folder with the same id in place.
    ///
    /// A folder with a blank id is rejected and nothing is written.
    #[instrument(skip(self, folder), fields(folder_id = %folder.id()))]
    pub async fn upsert(&self, folder: &Folder) -> Result<Upsert> {
        if folder.id().is_empty() {
            error!("Cannot update folder with blank ID");
            return Ok(Upsert::Rejected);
        }

        let _guard = self.write_lock.lock().await;
        let mut folders = self.load_all().await;

        let outcome = match folders.iter_mut().find(|existing| existing.id() == folder.id()) {
            Some(existing) => {
                debug!("Updating existing folder");
                *existing = folder.clone();
                Upsert::Replaced
            }
            None => {
                debug!("Adding new folder");
                folders.push(folder.clone());
                Upsert::Inserted
            }
        };

        self.write_all(&folders).await?;
        Ok(outcome)
    }

    /// Same as [`upsert`](Self::upsert).
    pub async fn update_folder(&self, folder: &Folder) -> Result<Upsert> {
        self.upsert(folder).await
    }

    /// Applies `change` to the stored folder with the given id and persists the result,
    /// all under the write guard.
    ///
    /// Returns the updated folder, or `None` if no folder has this id.
    #[instrument(skip(self, change))]
    pub async fn modify<F>(&self, id: &str, change: F) -> Result<Option<Folder>>
    where
        F: FnOnce(&mut Folder) + Send,
    {
        let _guard = self.write_lock.lock().await;
        let mut folders = self.load_all().await;

        let Some(folder) = folders.iter_mut().find(|folder| folder.id() == id) else {
            warn!("Cannot modify missing folder: {}", id);
            return Ok(None);
        };
        change(folder);
        let updated = folder.clone();

        self.write_all(&folders).await?;
        Ok(Some(updated))
    }

    /// Renames a folder. A PDF stored under the old name is moved along, so it can
    /// still be found through [`pdf_for`](Self::pdf_for).
    ///
    /// The new name must be usable as an attachment file name, whether or not the
    /// folder has a PDF yet.
    #[instrument(skip(self))]
    pub async fn rename_folder(&self, id: &str, new_name: &str) -> Result<Option<Folder>> {
        let new_name = new_name.trim();
        if new_name.is_empty() {
            warn!("Ignoring blank folder name");
            return Err(Error::BlankName);
        }
        if !attachment::is_valid_file_name(new_name) {
            warn!("Rejecting folder name that cannot name a file: {:?}", new_name);
            return Err(Error::InvalidFileName(new_name.to_string()));
        }

        let _guard = self.write_lock.lock().await;
        let mut folders = self.load_all().await;

        let Some(folder) = folders.iter_mut().find(|folder| folder.id() == id) else {
            warn!("Cannot rename missing folder: {}", id);
            return Ok(None);
        };
        if folder.name() == new_name {
            return Ok(Some(folder.clone()));
        }

        let moved = self.move_pdf(id, folder.name(), new_name).await?;
        let old_name = folder.name().to_string();
        folder.rename(new_name);
        let updated = folder.clone();

        if let Err(e) = self.write_all(&folders).await {
            if let Some((from, to)) = moved {
                if let Err(undo) = fs::rename(&to, &from).await {
                    warn!("Could not move PDF back to {}: {}", from.display(), undo);
                }
            }
            return Err(e);
        }
        info!("Renamed folder '{}' to '{}'", old_name, new_name);
        Ok(Some(updated))
    }

    /// Moves the PDF stored under `old_name` to `new_name`, if there is one.
    async fn move_pdf(&self, id: &str, old_name: &str, new_name: &str) -> Result<Option<(PathBuf, PathBuf)>> {
        let from = match attachment::pdf_path(&self.files_dir, id, old_name) {
            Ok(path) => path,
            // An old name that cannot be a file name cannot have a PDF either.
            Err(_) => return Ok(None),
        };
        if !fs::try_exists(&from).await.map_err(Error::Io)? {
            return Ok(None);
        }

        let to = attachment::pdf_path(&self.files_dir, id, new_name)?;
        if fs::try_exists(&to).await.map_err(Error::Io)? {
            return Err(Error::AttachmentConflict(to));
        }
        debug!("Moving PDF {} -> {}", from.display(), to.display());
        fs::rename(&from, &to).await.map_err(Error::Io)?;
        Ok(Some((from, to)))
    }

    /// Renames the page at `index` of the given folder.
    ///
    /// Returns `None` if the folder does not exist or has no page at `index`.
    #[instrument(skip(self))]
    pub async fn rename_page(&self, id: &str, index: usize, new_name: &str) -> Result<Option<Folder>> {
        let new_name = new_name.trim();
        if new_name.is_empty() {
            warn!("Ignoring blank page name");
            return Err(Error::BlankName);
        }

        let _guard = self.write_lock.lock().await;
        let mut folders = self.load_all().await;

        let Some(folder) = folders.iter_mut().find(|folder| folder.id() == id) else {
            warn!("Cannot rename page of missing folder: {}", id);
            return Ok(None);
        };
        let Some(page) = folder.page_mut(index) else {
            warn!("Folder {} has no page at index {}", id, index);
            return Ok(None);
        };
        page.rename(new_name);
        let updated = folder.clone();

        self.write_all(&folders).await?;
        Ok(Some(updated))
    }

    /// Stores a PDF at `<files_dir>/<folder_id>/<file_name>.pdf`, draining `reader`
    /// completely before the handle is returned.
    #[instrument(skip(self, reader))]
    pub async fn save_pdf<R>(&self, reader: &mut R, folder_id: &str, file_name: &str) -> Result<PdfFile>
    where
        R: AsyncRead + Unpin + ?Sized,
    {
        let path = attachment::pdf_path(&self.files_dir, folder_id, file_name)?;
        attachment::write_pdf(&path, reader).await
    }

    /// Looks up the PDF stored for `folder_id` under `file_name`.
    #[instrument(skip(self))]
    pub async fn get_pdf(&self, folder_id: &str, file_name: &str) -> Option<PdfFile> {
        let path = match attachment::pdf_path(&self.files_dir, folder_id, file_name) {
            Ok(path) => path,
            Err(e) => {
                warn!("Cannot look up PDF: {}", e);
                return None;
            }
        };

        match fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => {
                debug!("Found PDF file: {}", path.display());
                Some(PdfFile::new(path))
            }
            _ => {
                debug!("PDF file not found: {}", path.display());
                None
            }
        }
    }

    /// Looks up the PDF of `folder`, stored under the folder's current name.
    pub async fn pdf_for(&self, folder: &Folder) -> Option<PdfFile> {
        self.get_pdf(folder.id().as_str(), folder.name()).await
    }
}
