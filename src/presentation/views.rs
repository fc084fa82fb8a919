use crate::application::error::{ErrorReport, HttpError};
use askama::{Error as AskamaError, Template};
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("{public_message}")]
pub struct TemplateRenderError {
    pub(crate) source: &'static str,
    pub(crate) public_message: &'static str,
    #[source]
    pub(crate) error: AskamaError,
}

impl TemplateRenderError {
    pub fn new(source: &'static str, public_message: &'static str, error: AskamaError) -> Self {
        Self {
            source,
            public_message,
            error,
        }
    }
}

impl From<TemplateRenderError> for HttpError {
    fn from(err: TemplateRenderError) -> Self {
        let TemplateRenderError {
            source,
            public_message,
            error,
        } = err;

        HttpError::from_error(
            source,
            StatusCode::INTERNAL_SERVER_ERROR,
            public_message,
            &error,
        )
    }
}

pub fn render_template<T: Template>(template: T) -> Result<Html<String>, HttpError> {
    template.render().map(Html).map_err(|err| {
        TemplateRenderError::new(
            "presentation::views::render_template",
            "Template rendering failed",
            err,
        )
        .into()
    })
}

pub fn render_template_response<T: Template>(template: T, status: StatusCode) -> Response {
    match render_template(template) {
        Ok(html) => (status, html).into_response(),
        Err(err) => err.into_response(),
    }
}

pub fn render_not_found_response(chrome: LayoutChrome, content: ErrorPageView) -> Response {
    let title = content.title.clone();
    let chrome = chrome.with_title(&title);
    let view = LayoutContext::new(chrome, content);
    let mut response = render_template_response(NotFoundTemplate { view }, StatusCode::NOT_FOUND);
    ErrorReport::from_message(
        "presentation::views::render_not_found_response",
        StatusCode::NOT_FOUND,
        "Resource not found",
    )
    .attach(&mut response);
    response
}

/// Renders the generic failure page while keeping the error's report for the
/// response logger.
pub fn render_error_response(chrome: LayoutChrome, error: HttpError) -> Response {
    let status = error.status();
    let content = ErrorPageView::failure(error.public_message());
    let chrome = chrome.with_title(&content.title);
    let view = LayoutContext::new(chrome, content);

    let mut response = render_template_response(ErrorTemplate { view }, status);
    error.into_report().attach(&mut response);
    response
}

#[derive(Clone)]
pub struct NavigationView {
    pub entries: Vec<NavigationLinkView>,
}

#[derive(Clone)]
pub struct FooterView {
    pub copy: String,
}

#[derive(Clone)]
pub struct BrandView {
    pub title: String,
    pub href: String,
}

#[derive(Clone)]
pub struct NavigationLinkView {
    pub label: String,
    pub href: String,
}

#[derive(Clone)]
pub struct LayoutChrome {
    pub brand: BrandView,
    pub navigation: NavigationView,
    pub footer: FooterView,
    pub meta: PageMetaView,
}

impl LayoutChrome {
    pub fn with_canonical(self, canonical: String) -> Self {
        Self {
            meta: self.meta.with_canonical(canonical),
            ..self
        }
    }

    pub fn with_meta(self, meta: PageMetaView) -> Self {
        Self { meta, ..self }
    }

    /// Prefix the document title, keeping the site name as suffix.
    pub fn with_title(self, title: &str) -> Self {
        let meta = PageMetaView {
            title: format!("{title} | {}", self.brand.title),
            og_title: title.to_string(),
            ..self.meta
        };
        Self { meta, ..self }
    }
}

#[derive(Clone)]
pub struct LayoutContext<T> {
    pub brand: BrandView,
    pub navigation: NavigationView,
    pub footer: FooterView,
    pub meta: PageMetaView,
    pub content: T,
}

impl<T> LayoutContext<T> {
    pub fn new(chrome: LayoutChrome, content: T) -> Self {
        Self {
            brand: chrome.brand,
            navigation: chrome.navigation,
            footer: chrome.footer,
            meta: chrome.meta,
            content,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageMetaView {
    pub title: String,
    pub description: String,
    pub og_title: String,
    pub og_description: String,
    pub og_type: &'static str,
    pub og_image: Option<String>,
    /// Comma separated, absent when there are none.
    pub keywords: Option<String>,
    pub canonical: String,
}

impl PageMetaView {
    pub fn with_canonical(self, canonical: String) -> Self {
        Self { canonical, ..self }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LinkView {
    pub label: String,
    pub href: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CategoryBadgeView {
    pub name: String,
    pub href: String,
    pub color: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArticleCardView {
    pub title: String,
    pub href: String,
    pub intro: Option<String>,
    pub hero_url: Option<String>,
    pub hero_alt: String,
    pub author: Option<LinkView>,
    pub category: Option<CategoryBadgeView>,
    pub published: Option<String>,
    pub iso_date: Option<String>,
    pub featured: bool,
}

pub struct HomeView {
    pub featured: Vec<ArticleCardView>,
    pub latest: Vec<ArticleCardView>,
}

#[derive(Template)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub view: LayoutContext<HomeView>,
}

pub struct ArticleIndexView {
    pub heading: String,
    pub description: String,
    pub articles: Vec<ArticleCardView>,
}

#[derive(Template)]
#[template(path = "article_index.html")]
pub struct ArticleIndexTemplate {
    pub view: LayoutContext<ArticleIndexView>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TocView {
    pub events: Vec<TocEvent>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TocEvent {
    StartList,
    EndList,
    StartItem(TocLinkView),
    EndItem,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TocLinkView {
    pub anchor: String,
    pub title: String,
    pub level: u8,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuoteView {
    pub text: String,
    pub author: String,
    pub author_title: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CtaView {
    pub text: String,
    pub href: String,
    pub class: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BylineView {
    pub name: String,
    pub href: String,
    pub avatar_url: Option<String>,
}

pub struct ArticleDetailView {
    pub title: String,
    pub intro: Option<String>,
    pub hero_url: Option<String>,
    pub hero_alt: String,
    pub byline: Option<BylineView>,
    pub category: Option<CategoryBadgeView>,
    pub tags: Vec<LinkView>,
    pub published: Option<String>,
    pub iso_date: Option<String>,
    pub body_html: String,
    pub toc: Option<TocView>,
    pub gallery: Vec<String>,
    pub quote: Option<QuoteView>,
    pub conclusion: Option<String>,
    pub ctas: Vec<CtaView>,
    pub related: Vec<ArticleCardView>,
    pub show_newsletter: bool,
}

#[derive(Template)]
#[template(path = "article.html")]
pub struct ArticleTemplate {
    pub view: LayoutContext<ArticleDetailView>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthorCardView {
    pub name: String,
    pub href: String,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub article_count: u32,
}

pub struct AuthorIndexView {
    pub authors: Vec<AuthorCardView>,
}

#[derive(Template)]
#[template(path = "author_index.html")]
pub struct AuthorIndexTemplate {
    pub view: LayoutContext<AuthorIndexView>,
}

pub struct AuthorDetailView {
    pub name: String,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    pub social_links: Vec<LinkView>,
    pub articles: Vec<ArticleCardView>,
}

#[derive(Template)]
#[template(path = "author.html")]
pub struct AuthorTemplate {
    pub view: LayoutContext<AuthorDetailView>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CategoryCardView {
    pub name: String,
    pub href: String,
    pub description: Option<String>,
    pub color: Option<String>,
    pub featured: bool,
}

pub struct CategoryIndexView {
    pub categories: Vec<CategoryCardView>,
}

#[derive(Template)]
#[template(path = "category_index.html")]
pub struct CategoryIndexTemplate {
    pub view: LayoutContext<CategoryIndexView>,
}

pub struct CategoryDetailView {
    pub name: String,
    pub description: Option<String>,
    pub color: Option<String>,
    pub articles: Vec<ArticleCardView>,
}

#[derive(Template)]
#[template(path = "category.html")]
pub struct CategoryTemplate {
    pub view: LayoutContext<CategoryDetailView>,
}

pub struct TagDetailView {
    pub heading: String,
    pub articles: Vec<ArticleCardView>,
}

#[derive(Template)]
#[template(path = "tag.html")]
pub struct TagTemplate {
    pub view: LayoutContext<TagDetailView>,
}

pub struct StaticPageView {
    pub title: String,
    pub body_html: String,
}

#[derive(Template)]
#[template(path = "page.html")]
pub struct PageTemplate {
    pub view: LayoutContext<StaticPageView>,
}

pub struct SearchPageView {
    pub query: String,
    pub searched: bool,
    pub min_query_chars: usize,
    pub results: Vec<ArticleCardView>,
}

#[derive(Template)]
#[template(path = "search.html")]
pub struct SearchTemplate {
    pub view: LayoutContext<SearchPageView>,
}

pub struct ErrorPageView {
    pub title: String,
    pub message: String,
    pub primary_action: Option<ErrorAction>,
}

impl ErrorPageView {
    pub fn not_found() -> Self {
        Self {
            title: "Not Found".to_string(),
            message: "The page you requested does not exist. Try returning to the homepage to continue exploring.".to_string(),
            primary_action: Some(ErrorAction::home()),
        }
    }

    pub fn article_not_found() -> Self {
        Self {
            title: "Article Not Found".to_string(),
            message: "The article you're looking for doesn't exist or has been removed."
                .to_string(),
            primary_action: Some(ErrorAction::articles()),
        }
    }

    pub fn failure(message: &str) -> Self {
        Self {
            title: "Something Went Wrong".to_string(),
            message: format!("{message}. Please try again in a moment."),
            primary_action: Some(ErrorAction::home()),
        }
    }
}

pub struct ErrorAction {
    pub href: String,
    pub label: String,
}

impl ErrorAction {
    pub fn home() -> Self {
        Self {
            href: "/".to_string(),
            label: "Back to home".to_string(),
        }
    }

    pub fn articles() -> Self {
        Self {
            href: "/articles".to_string(),
            label: "Browse all articles".to_string(),
        }
    }
}

#[derive(Template)]
#[template(path = "not_found.html")]
pub struct NotFoundTemplate {
    pub view: LayoutContext<ErrorPageView>,
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub view: LayoutContext<ErrorPageView>,
}
