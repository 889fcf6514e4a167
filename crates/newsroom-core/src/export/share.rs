// ABOUTME: Renders the static share-preview page for a single news item.
// ABOUTME: Crawlers read the Open Graph tags; browsers are redirected to the app with ?news=<id>.

use askama::Template;
use thiserror::Error;
use url::form_urlencoded;

use crate::model::NewsItem;

/// Errors that can occur while rendering an export.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("template error: {0}")]
    Template(#[from] askama::Error),

    #[error("news item has no string or numeric id")]
    MissingId,
}

/// Share page template. All fields are HTML-escaped on render.
#[derive(Template)]
#[template(path = "share.html")]
struct SharePage<'a> {
    title: &'a str,
    excerpt: &'a str,
    image: &'a str,
    news_param: String,
}

/// Render the complete share page HTML for an item.
///
/// Output depends only on the item's id, title, excerpt and image, so rendering
/// the same item twice yields identical bytes.
pub fn render_share_page(item: &NewsItem) -> Result<String, ExportError> {
    let id = item.id().ok_or(ExportError::MissingId)?.to_string();
    let (title, excerpt, image) = (item.title(), item.excerpt(), item.image());
    let page = SharePage {
        title: &title,
        excerpt: &excerpt,
        image: &image,
        news_param: form_urlencoded::byte_serialize(id.as_bytes()).collect(),
    };
    Ok(page.render()?)
}
