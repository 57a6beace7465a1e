//! Post model as exchanged with the WordPress REST API.
//!
//! [`Post`] mirrors the `context=edit` representation of `/wp/v2/posts/{id}`.
//! Only the fields projected into [`EditableMetadata`] (plus the raw body)
//! take part in change detection; everything else is carried along so the
//! cached snapshot is a faithful copy of what the server returned.

use std::fmt;

use chrono::NaiveDateTime;
use serde::de::{self, Deserializer, SeqAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

/// Identifier assigned to a post by the backend.
pub type PostId = u64;

/// A `{ raw, rendered }` pair as WordPress returns for title, content, excerpt and guid.
///
/// Some endpoints and plugins flatten these to a plain string or wrap them in
/// an array, so deserialization accepts all three shapes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedContent {
    /// Source text as stored in the database
    pub raw: Option<String>,
    /// HTML as rendered for display
    pub rendered: Option<String>,
}

impl RenderedContent {
    /// Content with only the raw half set.
    pub fn raw(text: impl Into<String>) -> Self {
        Self {
            raw: Some(text.into()),
            rendered: None,
        }
    }

    fn from_text(text: Option<String>) -> Self {
        Self {
            raw: text.clone(),
            rendered: text,
        }
    }
}

impl fmt::Display for RenderedContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = self
            .rendered
            .as_deref()
            .or(self.raw.as_deref())
            .unwrap_or_default();
        f.write_str(text)
    }
}

impl Serialize for RenderedContent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = self.raw.is_some() as usize + self.rendered.is_some() as usize;
        let mut map = serializer.serialize_map(Some(len))?;
        if let Some(raw) = &self.raw {
            map.serialize_entry("raw", raw)?;
        }
        if let Some(rendered) = &self.rendered {
            map.serialize_entry("rendered", rendered)?;
        }
        map.end()
    }
}

#[derive(Deserialize)]
struct RenderedObject {
    #[serde(default)]
    raw: Option<String>,
    #[serde(default)]
    rendered: Option<String>,
}

impl From<RenderedObject> for RenderedContent {
    fn from(obj: RenderedObject) -> Self {
        Self {
            raw: obj.raw,
            rendered: obj.rendered,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RenderedElement {
    Text(String),
    Object(RenderedObject),
    Other(serde::de::IgnoredAny),
}

impl From<RenderedElement> for RenderedContent {
    fn from(element: RenderedElement) -> Self {
        match element {
            RenderedElement::Text(text) => RenderedContent::from_text(Some(text)),
            RenderedElement::Object(obj) => obj.into(),
            RenderedElement::Other(_) => RenderedContent::default(),
        }
    }
}

impl<'de> Deserialize<'de> for RenderedContent {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RenderedVisitor;

        impl<'de> Visitor<'de> for RenderedVisitor {
            type Value = RenderedContent;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a string, an object with raw/rendered, or an array of those")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                Ok(RenderedContent::from_text(Some(v.to_string())))
            }

            fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
                Ok(RenderedContent::from_text(Some(v)))
            }

            fn visit_map<A: de::MapAccess<'de>>(self, map: A) -> Result<Self::Value, A::Error> {
                let obj = RenderedObject::deserialize(de::value::MapAccessDeserializer::new(map))?;
                Ok(obj.into())
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
                let first: Option<RenderedElement> = seq.next_element()?;
                while seq.next_element::<de::IgnoredAny>()?.is_some() {}
                Ok(first.map(Into::into).unwrap_or_default())
            }
        }

        deserializer.deserialize_any(RenderedVisitor)
    }
}

/// A post as returned by the remote backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Post {
    /// Backend-assigned identifier
    pub id: PostId,

    /// Publish date in the site's timezone
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDateTime>,

    /// Publish date in UTC
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_gmt: Option<NaiveDateTime>,

    /// Globally unique identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guid: Option<RenderedContent>,

    /// Last modification date in the site's timezone
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified: Option<NaiveDateTime>,

    /// Last modification date in UTC
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_gmt: Option<NaiveDateTime>,

    /// URL slug
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,

    /// `publish`, `draft`, `pending`, `private`, `future`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    /// Post type, usually `post`
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    /// Public URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,

    /// Title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<RenderedContent>,

    /// Body
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<RenderedContent>,

    /// Excerpt
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<RenderedContent>,

    /// Password protecting the post, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Author user id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<u64>,

    /// Attachment id of the featured image (0 for none)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub featured_media: Option<u64>,

    /// `open` or `closed`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment_status: Option<String>,

    /// `open` or `closed`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ping_status: Option<String>,

    /// Pinned to the front page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sticky: Option<bool>,

    /// Theme template
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,

    /// Post format, e.g. `standard`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    /// Category term ids
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<u64>>,

    /// Tag term ids
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<u64>>,

    /// Permalink with a `%postname%` placeholder
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permalink_template: Option<String>,

    /// Slug WordPress would generate from the title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_slug: Option<String>,

    /// CSS classes for the post container
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_list: Option<Vec<String>>,
}

impl Post {
    /// Raw body text, empty when the server sent none.
    pub fn body(&self) -> &str {
        self.content
            .as_ref()
            .and_then(|c| c.raw.as_deref())
            .unwrap_or_default()
    }

    /// Raw title, if any.
    pub fn raw_title(&self) -> Option<&str> {
        self.title.as_ref().and_then(|t| t.raw.as_deref())
    }

    /// The editable projection of this post.
    pub fn editable_metadata(&self) -> EditableMetadata {
        EditableMetadata::from(self)
    }
}

/// The user-editable subset of a post's metadata.
///
/// Field declaration order is the canonical order used for fingerprinting;
/// do not reorder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditableMetadata {
    /// Raw title
    #[serde(default)]
    pub title: Option<String>,
    /// URL slug
    #[serde(default)]
    pub slug: Option<String>,
    /// Publication status
    #[serde(default)]
    pub status: Option<String>,
    /// Publish date, site-local
    #[serde(default, with = "iso_date")]
    pub date: Option<NaiveDateTime>,
    /// Raw excerpt
    #[serde(default)]
    pub excerpt: Option<String>,
    /// Attachment id of the featured image (0 for none)
    #[serde(default)]
    pub featured_media: Option<u64>,
    /// `open` or `closed`
    #[serde(default)]
    pub comment_status: Option<String>,
    /// `open` or `closed`
    #[serde(default)]
    pub ping_status: Option<String>,
}

impl From<&Post> for EditableMetadata {
    fn from(post: &Post) -> Self {
        Self {
            title: post.raw_title().map(String::from),
            slug: post.slug.clone(),
            status: post.status.clone(),
            date: post.date,
            excerpt: post.excerpt.as_ref().and_then(|e| e.raw.clone()),
            featured_media: post.featured_media,
            comment_status: post.comment_status.clone(),
            ping_status: post.ping_status.clone(),
        }
    }
}

/// ISO-8601 without offset, the format WordPress uses for `date`.
mod iso_date {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

    pub fn serialize<S: Serializer>(
        date: &Option<NaiveDateTime>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match date {
            Some(date) => serializer.serialize_str(&date.format(FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveDateTime>, D::Error> {
        let text: Option<String> = Option::deserialize(deserializer)?;
        match text.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(text) => NaiveDateTime::parse_from_str(text, FORMAT)
                .or_else(|_| text.parse::<NaiveDateTime>())
                .map(Some)
                .map_err(serde::de::Error::custom),
        }
    }
}

/// Fields sent to the backend when creating or updating a post.
///
/// Absent fields are left untouched remotely (or defaulted on create).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PostUpdate {
    /// Raw body
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Raw title
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// URL slug
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    /// Publication status
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Publish date, site-local
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDateTime>,
    /// Raw excerpt
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    /// Attachment id of the featured image
    #[serde(skip_serializing_if = "Option::is_none")]
    pub featured_media: Option<u64>,
    /// `open` or `closed`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment_status: Option<String>,
    /// `open` or `closed`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ping_status: Option<String>,
    /// Category term ids, replacing the current set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<u64>>,
    /// Tag term ids, replacing the current set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<u64>>,
}

impl PostUpdate {
    /// Carry the body.
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Carry every editable metadata field.
    pub fn with_metadata(mut self, meta: &EditableMetadata) -> Self {
        self.title = meta.title.clone();
        self.slug = meta.slug.clone();
        self.status = meta.status.clone();
        self.date = meta.date;
        self.excerpt = meta.excerpt.clone();
        self.featured_media = meta.featured_media;
        self.comment_status = meta.comment_status.clone();
        self.ping_status = meta.ping_status.clone();
        self
    }

    /// True when the update would not change anything.
    pub fn is_empty(&self) -> bool {
        *self == PostUpdate::default()
    }
}
