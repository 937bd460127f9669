use crate::storage::{extension_for_media_type, PageMeta, StorageError, StorageResult};
use std::fs;
use std::path::{Path, PathBuf};

/// Atomic writer and reader for page content and metadata
///
/// All writes land in a `.tmp` sibling first and are renamed into place, so
/// readers walking the layout never see partial files. A content file
/// without its metadata record may exist transiently; readers tolerate it.
pub struct PageStore {
    db_root: PathBuf,
}

impl PageStore {
    pub fn new<P: Into<PathBuf>>(db_root: P) -> Self {
        Self {
            db_root: db_root.into(),
        }
    }

    pub fn db_root(&self) -> &Path {
        &self.db_root
    }

    fn pages_dir(&self, host: &str) -> PathBuf {
        self.db_root.join(host).join("pages")
    }

    fn meta_dir(&self, host: &str) -> PathBuf {
        self.pages_dir(host).join("meta")
    }

    /// Path of the content file for a page, by media type
    pub fn content_path(&self, host: &str, id: &str, mime: &str) -> PathBuf {
        self.pages_dir(host)
            .join(format!("{}{}", id, extension_for_media_type(mime)))
    }

    /// Path of the metadata record for a page
    pub fn meta_path(&self, host: &str, id: &str) -> PathBuf {
        self.meta_dir(host).join(format!("{}.meta.json", id))
    }

    /// Saves a fetched body and its success metadata
    ///
    /// The content file is written and renamed before the metadata record,
    /// so a visible metadata record implies the content is in place.
    pub fn save(
        &self,
        host: &str,
        id: &str,
        canonical: &str,
        mime: &str,
        body: &[u8],
    ) -> StorageResult<()> {
        fs::create_dir_all(self.pages_dir(host))?;

        let content = self.content_path(host, id, mime);
        let tmp = content.with_extension(tmp_extension(&content));
        fs::write(&tmp, body)?;
        fs::rename(&tmp, &content)?;

        self.write_meta(host, id, &PageMeta::success(canonical, mime, body.len() as u64))
    }

    /// Records a failed fetch: metadata only, no content file
    pub fn save_error(
        &self,
        host: &str,
        id: &str,
        canonical: &str,
        status: &str,
        size_bytes: u64,
    ) -> StorageResult<()> {
        self.write_meta(host, id, &PageMeta::error(canonical, status, size_bytes))
    }

    /// Loads the metadata record for a page
    ///
    /// Returns `Ok(None)` when the record is missing or its JSON is corrupt
    /// (a corrupt record is treated as absent so the page can be re-fetched
    /// and repaired); I/O failures other than not-found are reported.
    pub fn load_meta(&self, host: &str, id: &str) -> StorageResult<Option<PageMeta>> {
        let bytes = match fs::read(self.meta_path(host, id)) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StorageError::Io(e)),
        };

        match serde_json::from_slice(&bytes) {
            Ok(meta) => Ok(Some(meta)),
            Err(_) => Ok(None),
        }
    }

    fn write_meta(&self, host: &str, id: &str, meta: &PageMeta) -> StorageResult<()> {
        fs::create_dir_all(self.meta_dir(host))?;

        let json = serde_json::to_vec_pretty(meta)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        let path = self.meta_path(host, id);
        let tmp = path.with_extension(tmp_extension(&path));
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}

/// Extension of the temporary sibling: the final extension plus ".tmp"
fn tmp_extension(path: &Path) -> String {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{}.tmp", ext),
        None => "tmp".to_string(),
    }
}
