//! Page metadata: document title, description, Open Graph and canonical URL.

use url::Url;

use crate::config::ServerSettings;
use crate::presentation::views::PageMetaView;

/// Site-wide identity used as the fallback for every page's metadata.
#[derive(Debug, Clone)]
pub struct SiteIdentity {
    pub title: String,
    pub description: String,
    /// Always ends with `/`.
    pub public_site_url: Url,
}

impl From<&ServerSettings> for SiteIdentity {
    fn from(settings: &ServerSettings) -> Self {
        Self {
            title: settings.site_title.clone(),
            description: settings.site_description.clone(),
            public_site_url: settings.public_site_url.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OgType {
    #[default]
    Website,
    Article,
    Profile,
}

impl OgType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Website => "website",
            Self::Article => "article",
            Self::Profile => "profile",
        }
    }
}

/// What a composer knows about its page. Absent fields fall back to the site.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeoFields {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub keywords: Vec<String>,
    pub og_type: OgType,
}

impl SeoFields {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    pub fn with_image(mut self, image: Option<String>) -> Self {
        self.image = image;
        self
    }

    pub fn with_keywords(mut self, keywords: Vec<String>) -> Self {
        self.keywords = keywords;
        self
    }

    pub fn with_type(mut self, og_type: OgType) -> Self {
        self.og_type = og_type;
        self
    }
}

/// A composed page: its metadata inputs, route path and view model.
pub struct Composed<T> {
    pub seo: SeoFields,
    pub path: String,
    pub content: T,
}

impl<T> Composed<T> {
    pub fn new(seo: SeoFields, path: impl Into<String>, content: T) -> Self {
        Self {
            seo,
            path: path.into(),
            content,
        }
    }
}

pub fn canonical_url(base: &Url, path: &str) -> String {
    let relative = path.trim_start_matches('/');
    base.join(relative)
        .map(String::from)
        .unwrap_or_else(|_| format!("{base}{relative}"))
}

pub fn page_meta(site: &SiteIdentity, seo: &SeoFields, path: &str) -> PageMetaView {
    let og_title = non_blank(seo.title.as_deref())
        .unwrap_or(site.title.as_str())
        .to_string();
    let title = match non_blank(seo.title.as_deref()) {
        Some(title) => format!("{title} | {}", site.title),
        None => site.title.clone(),
    };
    let description = non_blank(seo.description.as_deref())
        .unwrap_or(site.description.as_str())
        .to_string();

    let keywords: Vec<&str> = seo
        .keywords
        .iter()
        .map(|keyword| keyword.trim())
        .filter(|keyword| !keyword.is_empty())
        .collect();

    PageMetaView {
        title,
        og_title,
        og_description: description.clone(),
        description,
        og_type: seo.og_type.as_str(),
        og_image: non_blank(seo.image.as_deref()).map(str::to_string),
        keywords: (!keywords.is_empty()).then(|| keywords.join(", ")),
        canonical: canonical_url(&site.public_site_url, path),
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}
