//! Editorial documents as they arrive from the content store.
//!
//! Every schema field that authors may leave empty is optional here, and
//! explicit JSON `null` (what projections return for absent fields) decodes to
//! the same value as a missing key.

use serde::Deserialize;
use time::OffsetDateTime;

use super::body::{Gallery, RichBody};
use super::types::{ArticleStatus, CtaSize, CtaVariant};
use super::wire::{lenient_list, nullable, slug_current, timestamp};

pub const MAX_RELATED_ARTICLES: usize = 3;
pub const MAX_CTA_BLOCKS: usize = 3;
pub const MAX_TITLE_LEN: usize = 100;
pub const MAX_SEO_TITLE_LEN: usize = 60;
pub const MAX_SEO_DESCRIPTION_LEN: usize = 160;
pub const MAX_INTRO_LEN: usize = 300;
pub const MAX_CONCLUSION_LEN: usize = 500;
pub const MAX_AUTHOR_BIO_LEN: usize = 300;
pub const MAX_CATEGORY_DESCRIPTION_LEN: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct AssetRef {
    pub url: Option<String>,
    #[serde(rename = "_ref")]
    pub reference: Option<String>,
}

impl AssetRef {
    /// Absolute URL when the projection resolved the asset.
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref().filter(|url| !url.trim().is_empty())
    }

    /// Raw asset document id (`image-<id>-<w>x<h>-<fmt>`), when unresolved.
    pub fn document_ref(&self) -> Option<&str> {
        self.reference
            .as_deref()
            .filter(|reference| !reference.trim().is_empty())
    }
}

/// Image field: resolved asset plus the editorial text around it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct ImageRef {
    pub asset: Option<AssetRef>,
    pub alt: Option<String>,
    pub caption: Option<String>,
}

impl ImageRef {
    pub fn url(&self) -> Option<&str> {
        self.asset.as_ref().and_then(AssetRef::url)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct SocialHandles {
    pub twitter: Option<String>,
    pub linkedin: Option<String>,
    pub github: Option<String>,
}

impl SocialHandles {
    pub fn is_empty(&self) -> bool {
        self.twitter.is_none() && self.linkedin.is_none() && self.github.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Author {
    #[serde(rename = "_id", deserialize_with = "nullable")]
    pub id: String,
    #[serde(deserialize_with = "nullable")]
    pub name: String,
    #[serde(deserialize_with = "slug_current")]
    pub slug: String,
    pub avatar: Option<ImageRef>,
    pub bio: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    pub social_media: Option<SocialHandles>,
}

/// Author row for the index page, with the derived count of published articles.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorListing {
    #[serde(flatten)]
    pub author: Author,
    #[serde(default, deserialize_with = "nullable")]
    pub article_count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct Category {
    #[serde(rename = "_id", deserialize_with = "nullable")]
    pub id: String,
    #[serde(deserialize_with = "nullable")]
    pub name: String,
    #[serde(deserialize_with = "slug_current")]
    pub slug: String,
    pub description: Option<String>,
    pub color: Option<String>,
    pub image: Option<ImageRef>,
    #[serde(deserialize_with = "nullable")]
    pub featured: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct Tag {
    #[serde(rename = "_id", deserialize_with = "nullable")]
    pub id: String,
    #[serde(deserialize_with = "nullable")]
    pub name: String,
    #[serde(deserialize_with = "slug_current")]
    pub slug: String,
}

/// Call-to-action button. `text` and `href` are required for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct Cta {
    #[serde(rename = "_key")]
    pub key: Option<String>,
    pub text: Option<String>,
    pub href: Option<String>,
    #[serde(deserialize_with = "nullable")]
    pub variant: CtaVariant,
    #[serde(deserialize_with = "nullable")]
    pub size: CtaSize,
}

impl Cta {
    /// Text and target, when both are present and non-blank.
    pub fn target(&self) -> Option<(&str, &str)> {
        let text = self.text.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
        let href = self.href.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
        Some((text, href))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Quote {
    #[serde(deserialize_with = "nullable")]
    pub text: String,
    #[serde(deserialize_with = "nullable")]
    pub author: String,
    pub author_title: Option<String>,
}

/// Listing projection of an article: enough for cards and search hits.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ArticleSummary {
    #[serde(rename = "_id", deserialize_with = "nullable")]
    pub id: String,
    #[serde(deserialize_with = "nullable")]
    pub title: String,
    #[serde(deserialize_with = "slug_current")]
    pub slug: String,
    pub intro: Option<String>,
    pub hero: Option<ImageRef>,
    pub author: Option<Author>,
    pub category: Option<Category>,
    #[serde(deserialize_with = "timestamp")]
    pub published_at: Option<OffsetDateTime>,
    #[serde(deserialize_with = "nullable")]
    pub featured: bool,
    #[serde(deserialize_with = "nullable")]
    pub status: ArticleStatus,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Article {
    #[serde(rename = "_id", deserialize_with = "nullable")]
    pub id: String,
    #[serde(deserialize_with = "nullable")]
    pub title: String,
    pub seo_title: Option<String>,
    pub seo_description: Option<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub seo_keywords: Vec<String>,
    #[serde(deserialize_with = "slug_current")]
    pub slug: String,
    pub intro: Option<String>,
    #[serde(deserialize_with = "nullable")]
    pub body: RichBody,
    pub hero: Option<ImageRef>,
    pub author: Option<Author>,
    pub category: Option<Category>,
    #[serde(deserialize_with = "lenient_list")]
    pub tags: Vec<Tag>,
    #[serde(deserialize_with = "timestamp")]
    pub published_at: Option<OffsetDateTime>,
    #[serde(deserialize_with = "nullable")]
    pub featured: bool,
    #[serde(deserialize_with = "nullable")]
    pub status: ArticleStatus,
    pub conclusion: Option<String>,
    pub quote: Option<Quote>,
    #[serde(deserialize_with = "nullable")]
    pub gallery: Gallery,
    #[serde(deserialize_with = "lenient_list")]
    pub related_articles: Vec<ArticleSummary>,
    #[serde(deserialize_with = "nullable")]
    pub cta_blocks: Vec<Cta>,
    #[serde(deserialize_with = "nullable")]
    pub show_table_of_contents: bool,
    #[serde(deserialize_with = "nullable")]
    pub show_newsletter_signup: bool,
}

impl Article {
    /// Title used for `<title>` and Open Graph.
    pub fn display_title(&self) -> &str {
        self.seo_title
            .as_deref()
            .map(str::trim)
            .filter(|title| !title.is_empty())
            .unwrap_or(&self.title)
    }

    /// Enforce the list caps the authoring schema declares.
    pub fn truncate_lists(&mut self) {
        self.related_articles.truncate(MAX_RELATED_ARTICLES);
        self.cta_blocks.truncate(MAX_CTA_BLOCKS);
    }
}

/// Static page authored in the store (about, privacy, ...).
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Page {
    #[serde(rename = "_id", deserialize_with = "nullable")]
    pub id: String,
    #[serde(deserialize_with = "nullable")]
    pub title: String,
    #[serde(deserialize_with = "slug_current")]
    pub slug: String,
    pub seo_title: Option<String>,
    pub seo_description: Option<String>,
    #[serde(deserialize_with = "nullable")]
    pub body: RichBody,
}
