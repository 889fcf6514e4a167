// ABOUTME: Writes one static share page per news item into a dedicated directory.
// ABOUTME: Regeneration is a full rebuild; stale pages are pruned or kept per retention policy.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use newsroom_core::{ExportError, NewsItem, render_share_page};
use thiserror::Error;

/// Errors that can occur while regenerating share pages.
#[derive(Debug, Error)]
pub enum ShareError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("render error: {0}")]
    Export(#[from] ExportError),
}

/// What to do with share pages whose id is no longer in the collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShareRetention {
    /// Delete pages for removed ids so the directory mirrors the collection.
    #[default]
    Prune,
    /// Leave pages for removed ids in place so previously shared links keep unfurling.
    Keep,
}

impl FromStr for ShareRetention {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "prune" => Ok(Self::Prune),
            "keep" => Ok(Self::Keep),
            other => Err(other.to_string()),
        }
    }
}

/// Counts from a single regeneration pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShareReport {
    pub written: usize,
    pub unchanged: usize,
    pub skipped: usize,
    pub pruned: usize,
}

/// The directory holding `<id>.html` share pages.
#[derive(Debug, Clone)]
pub struct ShareDirectory {
    dir: PathBuf,
    retention: ShareRetention,
}

impl ShareDirectory {
    pub fn new(dir: impl Into<PathBuf>, retention: ShareRetention) -> Self {
        Self {
            dir: dir.into(),
            retention,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn retention(&self) -> ShareRetention {
        self.retention
    }

    /// Path of the share page for a given share key.
    pub fn page_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.html", key))
    }

    /// Rewrite the share page of every item, creating the directory if needed.
    ///
    /// Items without a usable id, and items whose page cannot be rendered or
    /// written, are skipped with a warning; the rest of the pass still runs.
    /// Files whose content already matches are left untouched. With
    /// `ShareRetention::Prune`, `.html` files that belong to no current item
    /// are removed afterwards. Only a directory that cannot be created or
    /// listed fails the pass.
    pub fn regenerate_all(&self, items: &[NewsItem]) -> Result<ShareReport, ShareError> {
        fs::create_dir_all(&self.dir)?;

        let mut report = ShareReport::default();
        let mut live_keys = HashSet::new();

        for item in items {
            let Some(key) = item.id().and_then(|id| id.share_key()) else {
                tracing::warn!("skipping share page for item without usable id: {}", item.as_value());
                report.skipped += 1;
                continue;
            };

            // An existing page for this key is never pruned, even if rewriting it fails.
            live_keys.insert(key.clone());

            match self.write_page(&key, item) {
                Ok(true) => report.written += 1,
                Ok(false) => report.unchanged += 1,
                Err(e) => {
                    tracing::warn!("skipping share page {}: {}", key, e);
                    report.skipped += 1;
                }
            }
        }

        if self.retention == ShareRetention::Prune {
            report.pruned = self.prune(&live_keys)?;
        }

        tracing::debug!(
            written = report.written,
            unchanged = report.unchanged,
            skipped = report.skipped,
            pruned = report.pruned,
            "share pages regenerated"
        );

        Ok(report)
    }

    /// Write one page. Returns false when the file already held the same bytes.
    /// Duplicate ids: the last item in iteration order wins.
    fn write_page(&self, key: &str, item: &NewsItem) -> Result<bool, ShareError> {
        let html = render_share_page(item)?;
        let path = self.page_path(key);

        if fs::read(&path).ok().as_deref() == Some(html.as_bytes()) {
            return Ok(false);
        }
        fs::write(&path, html)?;
        Ok(true)
    }

    fn prune(&self, live_keys: &HashSet<String>) -> Result<usize, ShareError> {
        let mut pruned = 0;

        for entry in fs::read_dir(&self.dir)? {
            let Ok(entry) = entry else {
                continue;
            };
            if !entry.file_type().is_ok_and(|t| t.is_file()) {
                continue;
            }

            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("html") {
                continue;
            }

            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };

            if live_keys.contains(stem) {
                continue;
            }
            match fs::remove_file(&path) {
                Ok(()) => {
                    tracing::info!("pruned stale share page {}", path.display());
                    pruned += 1;
                }
                Err(e) => tracing::warn!("failed to prune {}: {}", path.display(), e),
            }
        }

        Ok(pruned)
    }
}
