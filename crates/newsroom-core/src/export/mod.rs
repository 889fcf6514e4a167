// ABOUTME: Module root for derived artifacts rendered from news items.
// ABOUTME: Re-exports the share-page renderer and its error type.

pub mod share;

pub use share::{ExportError, render_share_page};
