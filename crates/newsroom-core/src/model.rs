// ABOUTME: News domain types: the item identifier, a single news item, and the collection.
// ABOUTME: Items keep their exact client JSON; typed accessors read the fields the backend uses.

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

/// Longest share key whose `<key>.html` still fits a 255-byte file name.
pub const MAX_SHARE_KEY_LEN: usize = 250;

/// Client-assigned identifier of a news item. Either a JSON string or a JSON number.
#[derive(Debug, Clone, PartialEq)]
pub enum NewsId {
    Number(Number),
    Text(String),
}

impl NewsId {
    /// Read an id from a JSON value. Only strings and numbers are ids.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => Some(NewsId::Number(n.clone())),
            Value::String(s) => Some(NewsId::Text(s.clone())),
            _ => None,
        }
    }

    /// File stem used for this item's share page.
    ///
    /// Returns None when the id cannot be used as a single path component
    /// (empty, `.`/`..`, containing a separator or NUL, or too long for a file name).
    pub fn share_key(&self) -> Option<String> {
        let key = self.to_string();
        let unusable = key.is_empty()
            || key == "."
            || key == ".."
            || key.len() > MAX_SHARE_KEY_LEN
            || key.contains(['/', '\\', '\0']);
        (!unusable).then_some(key)
    }
}

impl fmt::Display for NewsId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NewsId::Number(n) => write!(f, "{}", n),
            NewsId::Text(s) => f.write_str(s),
        }
    }
}

impl From<NewsId> for Value {
    fn from(id: NewsId) -> Self {
        match id {
            NewsId::Number(n) => Value::Number(n),
            NewsId::Text(s) => Value::String(s),
        }
    }
}

impl From<&str> for NewsId {
    fn from(value: &str) -> Self {
        NewsId::Text(value.to_string())
    }
}

impl From<String> for NewsId {
    fn from(value: String) -> Self {
        NewsId::Text(value)
    }
}

macro_rules! news_id_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for NewsId {
                fn from(value: $t) -> Self {
                    NewsId::Number(Number::from(value))
                }
            }
        )*
    };
}

news_id_from_int!(i32, i64, u64);

/// A single news item as stored in the document and served by the API.
///
/// The JSON is kept verbatim so that whatever the admin posts is what gets
/// stored and served back, including fields the backend does not interpret,
/// explicit nulls, and entries that do not look like news at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NewsItem(Value);

impl NewsItem {
    pub fn new(id: impl Into<NewsId>, title: impl Into<String>) -> Self {
        let id: NewsId = id.into();
        let mut fields = Map::new();
        fields.insert("id".to_string(), Value::from(id));
        fields.insert("title".to_string(), Value::String(title.into()));
        Self(Value::Object(fields))
    }

    pub fn with_excerpt(self, excerpt: impl Into<String>) -> Self {
        self.with_field("excerpt", excerpt.into())
    }

    pub fn with_image(self, image: impl Into<String>) -> Self {
        self.with_field("image", image.into())
    }

    /// Set an arbitrary field. No-op on items that are not JSON objects.
    pub fn with_field(mut self, key: &str, value: impl Into<Value>) -> Self {
        if let Value::Object(fields) = &mut self.0 {
            fields.insert(key.to_string(), value.into());
        }
        self
    }

    /// The item's id, when it has a string or numeric `id` field.
    pub fn id(&self) -> Option<NewsId> {
        self.0.get("id").and_then(NewsId::from_value)
    }

    pub fn title(&self) -> Cow<'_, str> {
        self.text("title")
    }

    pub fn excerpt(&self) -> Cow<'_, str> {
        self.text("excerpt")
    }

    pub fn image(&self) -> Cow<'_, str> {
        self.text("image")
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Scalar field as text; absent, null, and structured values read as "".
    fn text(&self, key: &str) -> Cow<'_, str> {
        match self.0.get(key) {
            Some(Value::String(s)) => Cow::Borrowed(s),
            Some(Value::Number(n)) => Cow::Owned(n.to_string()),
            Some(Value::Bool(b)) => Cow::Owned(b.to_string()),
            _ => Cow::Borrowed(""),
        }
    }
}

impl From<Value> for NewsItem {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// The full ordered list of news items, persisted and replaced as one unit.
pub type NewsCollection = Vec<NewsItem>;
