// ABOUTME: Persistence layer for newsroom, owning the news document and the share page directory.
// ABOUTME: Provides whole-document load/replace and full regeneration of derived share pages.

pub mod news_file;
pub mod share_dir;

pub use news_file::{NewsStore, StoreError};
pub use share_dir::{ShareDirectory, ShareError, ShareReport, ShareRetention};
