//! Local file cache and mapped method store
//!
//! [`FileCache`] keeps downloaded source files in a cache folder
//! (`<tmp>/lciafmt` unless configured otherwise). [`MethodStore`] persists
//! mapped methods so they are generated only once.

use crate::methods::Method;
use crate::table::{self, CharacterizationTable};
use crate::{LciaError, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// Folder of cached source files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileCache {
    folder: PathBuf,
    /// Download timeout; `None` waits indefinitely
    timeout: Option<Duration>,
}

impl Default for FileCache {
    fn default() -> Self {
        Self::new(Self::default_folder())
    }
}

impl FileCache {
    pub fn new(folder: impl Into<PathBuf>) -> Self {
        Self {
            folder: folder.into(),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// `<tmp>/lciafmt`
    pub fn default_folder() -> PathBuf {
        std::env::temp_dir().join("lciafmt")
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    /// Full path of `file_name` inside the cache folder
    pub fn path_for(&self, file_name: &str) -> PathBuf {
        self.folder.join(file_name)
    }

    pub fn exists(&self, file_name: &str) -> bool {
        self.path_for(file_name).is_file()
    }

    fn ensure_folder(&self) -> Result<()> {
        fs::create_dir_all(&self.folder).map_err(|e| LciaError::io_error(&self.folder, e))
    }

    /// Download `url` into the cache as `file_name` and return its path
    pub fn download(&self, url: &str, file_name: &str) -> Result<PathBuf> {
        self.ensure_folder()?;
        let path = self.path_for(file_name);
        info!("downloading from {} to {}", url, path.display());

        let download_error = |message: String| LciaError::DownloadError {
            url: url.to_string(),
            message,
        };
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| download_error(format!("Failed to build HTTP client: {e}")))?;
        let response = client
            .get(url)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| download_error(e.to_string()))?;
        let bytes = response
            .bytes()
            .map_err(|e| download_error(format!("Failed to read response: {e}")))?;

        // written beside the target and renamed, so a failed write never
        // leaves a partial file behind as a cache hit
        let mut part =
            NamedTempFile::new_in(&self.folder).map_err(|e| LciaError::io_error(&self.folder, e))?;
        part.write_all(&bytes)
            .and_then(|_| part.flush())
            .map_err(|e| LciaError::io_error(part.path(), e))?;
        part.persist(&path)
            .map_err(|e| LciaError::io_error(&path, e.error))?;
        Ok(path)
    }

    /// Cached path of `file_name`, downloading it from `url` when missing
    pub fn get_or_download(&self, file_name: &str, url: &str) -> Result<PathBuf> {
        if self.exists(file_name) {
            info!("take {} from cache", file_name);
            return Ok(self.path_for(file_name));
        }
        self.download(url, file_name)
    }

    /// Delete the cache folder and everything in it
    pub fn clear(&self) -> Result<()> {
        if !self.folder.is_dir() {
            return Ok(());
        }
        info!("delete cache folder {}", self.folder.display());
        fs::remove_dir_all(&self.folder).map_err(|e| LciaError::io_error(&self.folder, e))
    }
}

/// Persistence of mapped methods
pub trait MethodStore {
    /// Stored table of `method`, `None` when nothing is stored
    fn read_method(&self, method: Method) -> Result<Option<CharacterizationTable>>;

    fn store_method(&self, table: &CharacterizationTable, method: Method) -> Result<()>;
}

/// Stores each method as `<folder>/<Method::filename()>.json`
#[derive(Debug, Clone)]
pub struct LocalMethodStore {
    folder: PathBuf,
}

impl LocalMethodStore {
    pub fn new(folder: impl Into<PathBuf>) -> Self {
        Self {
            folder: folder.into(),
        }
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    pub fn path_for(&self, method: Method) -> PathBuf {
        self.folder.join(format!("{}.json", method.filename()))
    }
}

impl Default for LocalMethodStore {
    fn default() -> Self {
        Self::new(FileCache::default_folder().join("methods"))
    }
}

impl MethodStore for LocalMethodStore {
    fn read_method(&self, method: Method) -> Result<Option<CharacterizationTable>> {
        let path = self.path_for(method);
        if !path.is_file() {
            debug!("No stored table for {} at {}", method, path.display());
            return Ok(None);
        }
        table::read_path(&path).map(Some)
    }

    fn store_method(&self, table: &CharacterizationTable, method: Method) -> Result<()> {
        let path = self.path_for(method);
        table::write_path(table, &path)?;
        info!("stored {} rows of {} in {}", table.len(), method, path.display());
        Ok(())
    }
}
