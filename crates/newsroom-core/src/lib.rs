// ABOUTME: Core library for newsroom, containing the news domain types and share-page rendering.
// ABOUTME: This crate is pure (no I/O) and is shared by the store and server crates.

pub mod export;
pub mod model;

pub use export::{ExportError, render_share_page};
pub use model::{NewsCollection, NewsId, NewsItem};
