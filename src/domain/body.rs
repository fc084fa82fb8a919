//! Structured rich body: an ordered sequence of typed blocks.
//!
//! Decoding is lenient at the element level. A block whose `_type` is unknown,
//! or whose payload does not match its declared type, becomes
//! [`BodyBlock::Unknown`] and the rest of the body still decodes.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::entities::{AssetRef, Cta, ImageRef};
use super::types::{BlockStyle, CalloutKind, ListKind};
use super::wire::{decode_lenient, nullable, slug_current};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RichBody(Vec<BodyBlock>);

impl RichBody {
    pub fn new(blocks: Vec<BodyBlock>) -> Self {
        Self(blocks)
    }

    pub fn blocks(&self) -> &[BodyBlock] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Text blocks styled as outline headings, with their level.
    pub fn headings(&self) -> impl Iterator<Item = (u8, &TextBlock)> {
        self.0.iter().filter_map(|block| match block {
            BodyBlock::Text(text) => text.style.heading_level().map(|level| (level, text)),
            _ => None,
        })
    }

    /// Plain text of all text blocks, one line per block.
    pub fn plain_text(&self) -> String {
        self.0
            .iter()
            .filter_map(|block| match block {
                BodyBlock::Text(text) => Some(text.plain_text()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl<'de> Deserialize<'de> for RichBody {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let values = Vec::<Value>::deserialize(deserializer)?;
        Ok(Self(decode_lenient(values, |_| BodyBlock::Unknown)))
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "_type")]
pub enum BodyBlock {
    #[serde(rename = "block")]
    Text(TextBlock),
    #[serde(rename = "image")]
    Image(ImageBlock),
    #[serde(rename = "callout")]
    Callout(CalloutBlock),
    #[serde(rename = "internalLink")]
    InternalLink(InternalLinkBlock),
    #[serde(rename = "video")]
    Video(VideoBlock),
    #[serde(rename = "cta")]
    Cta(Cta),
    #[serde(other)]
    Unknown,
}

impl BodyBlock {
    pub fn kind(&self) -> &'static str {
        match self {
            BodyBlock::Text(_) => "block",
            BodyBlock::Image(_) => "image",
            BodyBlock::Callout(_) => "callout",
            BodyBlock::InternalLink(_) => "internalLink",
            BodyBlock::Video(_) => "video",
            BodyBlock::Cta(_) => "cta",
            BodyBlock::Unknown => "unknown",
        }
    }

    pub fn key(&self) -> Option<&str> {
        match self {
            BodyBlock::Text(block) => block.key.as_deref(),
            BodyBlock::Image(block) => block.key.as_deref(),
            BodyBlock::Callout(block) => block.key.as_deref(),
            BodyBlock::InternalLink(block) => block.key.as_deref(),
            BodyBlock::Video(block) => block.key.as_deref(),
            BodyBlock::Cta(block) => block.key.as_deref(),
            BodyBlock::Unknown => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TextBlock {
    #[serde(rename = "_key")]
    pub key: Option<String>,
    #[serde(deserialize_with = "nullable")]
    pub style: BlockStyle,
    pub list_item: Option<ListKind>,
    #[serde(deserialize_with = "nullable")]
    pub children: Vec<Span>,
    #[serde(deserialize_with = "nullable")]
    pub mark_defs: Vec<MarkDef>,
}

impl TextBlock {
    pub fn plain_text(&self) -> String {
        self.children.iter().map(|span| span.text.as_str()).collect()
    }

    pub fn mark_def(&self, key: &str) -> Option<&MarkDef> {
        self.mark_defs.iter().find(|def| def.key == key)
    }
}

/// Inline run of text. `marks` holds decorator names or keys into `markDefs`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct Span {
    #[serde(rename = "_key")]
    pub key: Option<String>,
    #[serde(deserialize_with = "nullable")]
    pub text: String,
    #[serde(deserialize_with = "nullable")]
    pub marks: Vec<String>,
}

/// Annotation attached to spans by key (links are the only kind rendered).
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct MarkDef {
    #[serde(rename = "_key", deserialize_with = "nullable")]
    pub key: String,
    #[serde(rename = "_type", deserialize_with = "nullable")]
    pub kind: String,
    pub href: Option<String>,
    #[serde(deserialize_with = "nullable")]
    pub blank: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct ImageBlock {
    #[serde(rename = "_key")]
    pub key: Option<String>,
    pub asset: Option<AssetRef>,
    pub alt: Option<String>,
    pub caption: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct CalloutBlock {
    #[serde(rename = "_key")]
    pub key: Option<String>,
    #[serde(rename = "type", deserialize_with = "nullable")]
    pub kind: CalloutKind,
    pub title: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InternalLinkBlock {
    #[serde(rename = "_key")]
    pub key: Option<String>,
    pub reference: Option<LinkTarget>,
    pub link_text: Option<String>,
}

/// Dereferenced target of an internal link.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct LinkTarget {
    #[serde(rename = "_type")]
    pub kind: Option<String>,
    pub title: Option<String>,
    #[serde(deserialize_with = "slug_current")]
    pub slug: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct VideoBlock {
    #[serde(rename = "_key")]
    pub key: Option<String>,
    pub url: Option<String>,
    pub caption: Option<String>,
}

/// Ordered media gallery attached to an article.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Gallery(Vec<GalleryItem>);

impl Gallery {
    pub fn new(items: Vec<GalleryItem>) -> Self {
        Self(items)
    }

    pub fn items(&self) -> &[GalleryItem] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'de> Deserialize<'de> for Gallery {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let values = Vec::<Value>::deserialize(deserializer)?;
        Ok(Self(decode_lenient(values, |_| GalleryItem::Unknown)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "_type", rename_all = "camelCase")]
pub enum GalleryItem {
    GalleryImage {
        #[serde(rename = "_key", default)]
        key: Option<String>,
        #[serde(default)]
        image: Option<ImageRef>,
        #[serde(default)]
        caption: Option<String>,
        #[serde(default)]
        alt: Option<String>,
    },
    GalleryVideo {
        #[serde(rename = "_key", default)]
        key: Option<String>,
        #[serde(default)]
        url: Option<String>,
        #[serde(default)]
        caption: Option<String>,
    },
    #[serde(other)]
    Unknown,
}
