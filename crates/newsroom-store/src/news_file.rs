// ABOUTME: File-backed news store: the whole collection is one pretty-printed JSON array.
// ABOUTME: Replaces the document atomically and regenerates share pages after every write.

use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use newsroom_core::{NewsCollection, NewsItem};
use thiserror::Error;

use crate::share_dir::{ShareDirectory, ShareReport};

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// The canonical news collection, stored as a single JSON document.
///
/// Every write replaces the whole document; there is no merge and no
/// cross-process locking. Callers that share a store between tasks must
/// serialize access themselves.
#[derive(Debug)]
pub struct NewsStore {
    path: PathBuf,
    shares: ShareDirectory,
}

impl NewsStore {
    /// Bind a store to a document path and share directory.
    /// Creates the document's parent directory if it does not exist.
    pub fn open(path: impl Into<PathBuf>, shares: ShareDirectory) -> Result<Self, StoreError> {
        let path = path.into();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        Ok(Self { path, shares })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn shares(&self) -> &ShareDirectory {
        &self.shares
    }

    /// Read the full collection.
    ///
    /// A missing document is bootstrapped to `[]` on disk. A document that is not
    /// JSON, or whose top level is not an array, yields an empty collection and is
    /// left as-is. Array entries are returned verbatim whatever their shape.
    pub fn load(&self) -> Result<NewsCollection, StoreError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::info!("news document {} not found, initializing", self.path.display());
                self.write_document(&[])?;
                return Ok(Vec::new());
            }
            Err(e) if e.kind() == ErrorKind::InvalidData => {
                tracing::warn!(
                    "news document {} is not valid UTF-8, serving empty collection",
                    self.path.display()
                );
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str::<NewsCollection>(&contents) {
            Ok(items) => Ok(items),
            Err(e) => {
                tracing::warn!(
                    "news document {} is malformed ({}), serving empty collection",
                    self.path.display(),
                    e
                );
                Ok(Vec::new())
            }
        }
    }

    /// Overwrite the document with `items`, then regenerate every share page.
    ///
    /// Only the document write can fail the call. Once it is in place, a share
    /// directory failure is logged and reported as `None`.
    pub fn replace(&self, items: &[NewsItem]) -> Result<Option<ShareReport>, StoreError> {
        self.write_document(items)?;
        tracing::info!("news document replaced with {} items", items.len());
        Ok(self.refresh_shares(items))
    }

    /// Load the current collection and rebuild its share pages.
    /// The report is `None` when the share directory could not be regenerated.
    pub fn regenerate(&self) -> Result<(NewsCollection, Option<ShareReport>), StoreError> {
        let items = self.load()?;
        let report = self.refresh_shares(&items);
        Ok((items, report))
    }

    fn refresh_shares(&self, items: &[NewsItem]) -> Option<ShareReport> {
        match self.shares.regenerate_all(items) {
            Ok(report) => Some(report),
            Err(e) => {
                tracing::error!(
                    "failed to regenerate share pages in {}: {}",
                    self.shares.dir().display(),
                    e
                );
                None
            }
        }
    }

    /// Atomic write: serialize to a sibling .tmp file, fsync, rename over the document.
    fn write_document(&self, items: &[NewsItem]) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(items)?;

        let mut tmp_name = self.path.as_os_str().to_owned();
        tmp_name.push(".tmp");
        let tmp_path = PathBuf::from(tmp_name);

        let mut file = File::create(&tmp_path)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;
        drop(file);

        fs::rename(&tmp_path, &self.path)?;

        Ok(())
    }
}
