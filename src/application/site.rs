//! Page composers: each gathers its content through [`ContentQueries`],
//! renders rich bodies and maps domain records into view models.

use std::sync::Arc;

use tracing::debug;

use crate::application::error::HttpError;
use crate::application::metadata::{Composed, OgType, SeoFields};
use crate::application::queries::ContentQueries;
use crate::application::render::{BodyRenderer, allowed_href};
use crate::application::repos::StoreError;
use crate::application::search::SearchService;
use crate::domain::dates::{format_human_date, format_iso};
use crate::domain::entities::{
    Article, ArticleSummary, Author, AuthorListing, Category, Cta, ImageRef, Quote,
    SocialHandles,
};
use crate::domain::image::ImageUrlBuilder;
use crate::domain::toc::{TableOfContents, TocEntry};
use crate::presentation::views::{
    ArticleCardView, ArticleDetailView, ArticleIndexView, AuthorCardView, AuthorDetailView,
    AuthorIndexView, BylineView, CategoryBadgeView, CategoryCardView, CategoryDetailView,
    CategoryIndexView, CtaView, HomeView, LinkView, QuoteView, SearchPageView, StaticPageView,
    TagDetailView, TocEvent, TocLinkView, TocView,
};

const SOURCE: &str = "application::site::SiteService";

pub const FEATURED_LIMIT: usize = 2;
pub const LATEST_LIMIT: usize = 6;

#[derive(Clone)]
pub struct SiteService {
    queries: ContentQueries,
    renderer: Arc<BodyRenderer>,
    images: ImageUrlBuilder,
    search: Arc<SearchService>,
}

impl SiteService {
    pub fn new(
        queries: ContentQueries,
        images: ImageUrlBuilder,
        search: Arc<SearchService>,
    ) -> Self {
        Self {
            queries,
            renderer: Arc::new(BodyRenderer::new(images.clone())),
            images,
            search,
        }
    }

    pub fn search(&self) -> &Arc<SearchService> {
        &self.search
    }

    pub async fn home(&self) -> Result<Composed<HomeView>, HttpError> {
        let articles = self
            .queries
            .published_articles()
            .await
            .map_err(|err| store_failure("published_articles", err))?;

        let (featured, latest) = partition_home(&articles);
        let content = HomeView {
            featured: featured.into_iter().map(|a| self.card(a)).collect(),
            latest: latest.into_iter().map(|a| self.card(a)).collect(),
        };

        Ok(Composed::new(SeoFields::default(), "/", content))
    }

    pub async fn article_index(&self) -> Result<Composed<ArticleIndexView>, HttpError> {
        let articles = self
            .queries
            .published_articles()
            .await
            .map_err(|err| store_failure("published_articles", err))?;

        let description = "Browse all our published articles, tutorials, and insights";
        let content = ArticleIndexView {
            heading: "All Articles".to_string(),
            description: description.to_string(),
            articles: self.cards(&articles),
        };

        let seo = SeoFields::titled("All Articles").with_description(Some(description.to_string()));
        Ok(Composed::new(seo, "/articles", content))
    }

    pub async fn article_detail(
        &self,
        slug: &str,
    ) -> Result<Option<Composed<ArticleDetailView>>, HttpError> {
        let article = self
            .queries
            .article_by_slug(slug)
            .await
            .map_err(|err| store_failure("article_by_slug", err))?;

        let Some(article) = article else {
            return Ok(None);
        };

        let seo = SeoFields::titled(article.display_title())
            .with_description(article.seo_description.clone())
            .with_image(self.image_url(article.hero.as_ref()))
            .with_keywords(article.seo_keywords.clone())
            .with_type(OgType::Article);
        let path = format!("/articles/{}", article.slug);
        let content = self.article_view(article);

        Ok(Some(Composed::new(seo, path, content)))
    }

    pub async fn author_index(&self) -> Result<Composed<AuthorIndexView>, HttpError> {
        let authors = self
            .queries
            .authors()
            .await
            .map_err(|err| store_failure("authors", err))?;

        let content = AuthorIndexView {
            authors: authors.iter().map(|a| self.author_card(a)).collect(),
        };
        let seo = SeoFields::titled("Authors").with_description(Some(
            "Meet the talented writers behind our content".to_string(),
        ));
        Ok(Composed::new(seo, "/authors", content))
    }

    pub async fn author_detail(
        &self,
        slug: &str,
    ) -> Result<Option<Composed<AuthorDetailView>>, HttpError> {
        let (author, articles) = tokio::try_join!(
            self.queries.author_by_slug(slug),
            self.queries.articles_by_author(slug),
        )
        .map_err(|err| store_failure("author_detail", err))?;

        let Some(author) = author else {
            return Ok(None);
        };

        let description = non_blank(author.bio.as_deref())
            .map(str::to_string)
            .unwrap_or_else(|| format!("Articles and posts by {}", author.name));
        let avatar_url = self.image_url(author.avatar.as_ref());
        let seo = SeoFields::titled(author.name.clone())
            .with_description(Some(description))
            .with_image(avatar_url.clone())
            .with_type(OgType::Profile);
        let path = format!("/authors/{}", author.slug);

        let content = AuthorDetailView {
            social_links: social_links(&author),
            name: author.name,
            bio: non_blank_owned(author.bio),
            avatar_url,
            email: non_blank_owned(author.email),
            website: non_blank(author.website.as_deref())
                .and_then(allowed_href)
                .map(str::to_string),
            articles: self.cards(&articles),
        };

        Ok(Some(Composed::new(seo, path, content)))
    }

    pub async fn category_index(&self) -> Result<Composed<CategoryIndexView>, HttpError> {
        let categories = self
            .queries
            .categories()
            .await
            .map_err(|err| store_failure("categories", err))?;

        let content = CategoryIndexView {
            categories: categories.iter().map(category_card).collect(),
        };
        let seo = SeoFields::titled("Categories")
            .with_description(Some("Browse articles by category".to_string()));
        Ok(Composed::new(seo, "/categories", content))
    }

    pub async fn category_detail(
        &self,
        slug: &str,
    ) -> Result<Option<Composed<CategoryDetailView>>, HttpError> {
        let (category, articles) = tokio::try_join!(
            self.queries.category_by_slug(slug),
            self.queries.articles_by_category(slug),
        )
        .map_err(|err| store_failure("category_detail", err))?;

        let Some(category) = category else {
            return Ok(None);
        };

        let seo = SeoFields::titled(category.name.clone())
            .with_description(category.description.clone())
            .with_image(self.image_url(category.image.as_ref()));
        let path = format!("/categories/{}", category.slug);
        let content = CategoryDetailView {
            name: category.name,
            description: non_blank_owned(category.description),
            color: non_blank_owned(category.color),
            articles: self.cards(&articles),
        };

        Ok(Some(Composed::new(seo, path, content)))
    }

    pub async fn tag_detail(
        &self,
        slug: &str,
    ) -> Result<Option<Composed<TagDetailView>>, HttpError> {
        let (tag, articles) = tokio::try_join!(
            self.queries.tag_by_slug(slug),
            self.queries.articles_by_tag(slug),
        )
        .map_err(|err| store_failure("tag_detail", err))?;

        let Some(tag) = tag else {
            return Ok(None);
        };

        let heading = format!("Articles tagged \"{}\"", tag.name);
        let seo = SeoFields::titled(heading.clone())
            .with_description(Some(format!("Articles tagged with {}", tag.name)));
        let path = format!("/tags/{}", tag.slug);
        let content = TagDetailView {
            heading,
            articles: self.cards(&articles),
        };

        Ok(Some(Composed::new(seo, path, content)))
    }

    pub async fn static_page(
        &self,
        slug: &str,
    ) -> Result<Option<Composed<StaticPageView>>, HttpError> {
        let page = self
            .queries
            .page_by_slug(slug)
            .await
            .map_err(|err| store_failure("page_by_slug", err))?;

        let Some(page) = page else {
            return Ok(None);
        };

        let title = non_blank(page.seo_title.as_deref())
            .unwrap_or(&page.title)
            .to_string();
        let seo = SeoFields::titled(title).with_description(page.seo_description.clone());
        let path = format!("/pages/{}", page.slug);
        let content = StaticPageView {
            body_html: self.renderer.render(&page.body).html(),
            title: page.title,
        };

        Ok(Some(Composed::new(seo, path, content)))
    }

    pub async fn search_page(&self, query: Option<&str>) -> Composed<SearchPageView> {
        let query = query.map(str::trim).unwrap_or_default();
        let searched = self.search.is_searchable(query);
        let results = if searched {
            self.search.search(query).await
        } else {
            Vec::new()
        };

        let content = SearchPageView {
            query: query.to_string(),
            searched,
            min_query_chars: self.search.config().min_query_chars,
            results: self.cards(&results),
        };
        Composed::new(SeoFields::titled("Search"), "/search", content)
    }

    fn article_view(&self, article: Article) -> ArticleDetailView {
        let body = self.renderer.render(&article.body);
        let toc = if article.show_table_of_contents {
            build_toc_view(&TableOfContents::extract(&article.body))
        } else {
            None
        };
        let gallery = self
            .renderer
            .render_gallery(&article.gallery)
            .into_iter()
            .map(|block| block.html)
            .collect();

        debug!(
            target = "nostalgia::application::site",
            slug = %article.slug,
            blocks = body.blocks.len(),
            toc = toc.is_some(),
            "composed article"
        );

        ArticleDetailView {
            hero_url: self.image_url(article.hero.as_ref()),
            hero_alt: image_alt(article.hero.as_ref(), &article.title),
            byline: article.author.as_ref().map(|author| BylineView {
                name: author.name.clone(),
                href: format!("/authors/{}", author.slug),
                avatar_url: self.image_url(author.avatar.as_ref()),
            }),
            category: article.category.as_ref().map(category_badge),
            tags: article
                .tags
                .iter()
                .map(|tag| LinkView {
                    label: tag.name.clone(),
                    href: format!("/tags/{}", tag.slug),
                })
                .collect(),
            published: article.published_at.map(format_human_date),
            iso_date: article.published_at.map(format_iso),
            body_html: body.html(),
            toc,
            gallery,
            quote: article.quote.as_ref().and_then(quote_view),
            conclusion: non_blank(article.conclusion.as_deref()).map(str::to_string),
            ctas: article.cta_blocks.iter().filter_map(cta_view).collect(),
            related: self.cards(&article.related_articles),
            show_newsletter: article.show_newsletter_signup,
            intro: non_blank_owned(article.intro),
            title: article.title,
        }
    }

    fn cards(&self, articles: &[ArticleSummary]) -> Vec<ArticleCardView> {
        articles.iter().map(|article| self.card(article)).collect()
    }

    fn card(&self, article: &ArticleSummary) -> ArticleCardView {
        ArticleCardView {
            title: article.title.clone(),
            href: format!("/articles/{}", article.slug),
            intro: non_blank(article.intro.as_deref()).map(str::to_string),
            hero_url: self.image_url(article.hero.as_ref()),
            hero_alt: image_alt(article.hero.as_ref(), &article.title),
            author: article.author.as_ref().map(|author| LinkView {
                label: author.name.clone(),
                href: format!("/authors/{}", author.slug),
            }),
            category: article.category.as_ref().map(category_badge),
            published: article.published_at.map(format_human_date),
            iso_date: article.published_at.map(format_iso),
            featured: article.featured,
        }
    }

    fn author_card(&self, listing: &AuthorListing) -> AuthorCardView {
        let author = &listing.author;
        AuthorCardView {
            name: author.name.clone(),
            href: format!("/authors/{}", author.slug),
            avatar_url: self.image_url(author.avatar.as_ref()),
            bio: non_blank(author.bio.as_deref()).map(str::to_string),
            article_count: listing.article_count,
        }
    }

    fn image_url(&self, image: Option<&ImageRef>) -> Option<String> {
        self.images.resolve(image?.asset.as_ref()?)
    }
}

/// First featured articles, then the newest of the rest, from one listing.
pub fn partition_home(articles: &[ArticleSummary]) -> (Vec<&ArticleSummary>, Vec<&ArticleSummary>) {
    let featured = articles
        .iter()
        .filter(|article| article.featured)
        .take(FEATURED_LIMIT)
        .collect();
    let latest = articles
        .iter()
        .filter(|article| !article.featured)
        .take(LATEST_LIMIT)
        .collect();
    (featured, latest)
}

fn store_failure(operation: &'static str, err: StoreError) -> HttpError {
    HttpError::store(SOURCE, operation, &err)
}

pub(crate) fn build_toc_view(toc: &TableOfContents) -> Option<TocView> {
    if toc.is_empty() {
        return None;
    }

    let mut events = Vec::new();
    append_toc_events(toc.entries(), &mut events);
    Some(TocView { events })
}

fn append_toc_events(entries: &[TocEntry], events: &mut Vec<TocEvent>) {
    events.push(TocEvent::StartList);

    for entry in entries {
        events.push(TocEvent::StartItem(TocLinkView {
            anchor: entry.id.clone(),
            title: entry.text.trim().to_string(),
            level: entry.level,
        }));

        if !entry.children.is_empty() {
            append_toc_events(&entry.children, events);
        }

        events.push(TocEvent::EndItem);
    }

    events.push(TocEvent::EndList);
}

fn category_badge(category: &Category) -> CategoryBadgeView {
    CategoryBadgeView {
        name: category.name.clone(),
        href: format!("/categories/{}", category.slug),
        color: non_blank(category.color.as_deref()).map(str::to_string),
    }
}

fn category_card(category: &Category) -> CategoryCardView {
    CategoryCardView {
        name: category.name.clone(),
        href: format!("/categories/{}", category.slug),
        description: non_blank(category.description.as_deref()).map(str::to_string),
        color: non_blank(category.color.as_deref()).map(str::to_string),
        featured: category.featured,
    }
}

fn quote_view(quote: &Quote) -> Option<QuoteView> {
    let text = non_blank(Some(quote.text.as_str()))?;
    Some(QuoteView {
        text: text.to_string(),
        author: quote.author.trim().to_string(),
        author_title: non_blank(quote.author_title.as_deref()).map(str::to_string),
    })
}

fn cta_view(cta: &Cta) -> Option<CtaView> {
    let (text, href) = cta.target()?;
    let Some(href) = allowed_href(href) else {
        debug!(target = SOURCE, href, "dropping call to action with disallowed link");
        return None;
    };
    Some(CtaView {
        text: text.to_string(),
        href: href.to_string(),
        class: format!("cta cta--{} cta--{}", cta.variant.as_str(), cta.size.as_str()),
    })
}

fn social_links(author: &Author) -> Vec<LinkView> {
    let mut links = Vec::new();
    let Some(SocialHandles {
        twitter,
        linkedin,
        github,
    }) = author.social_media.as_ref()
    else {
        return links;
    };

    if let Some(handle) = non_blank(twitter.as_deref()) {
        links.push(LinkView {
            label: "Twitter".to_string(),
            href: format!("https://twitter.com/{}", handle.trim_start_matches('@')),
        });
    }
    if let Some(profile) = non_blank(linkedin.as_deref()).and_then(allowed_href) {
        links.push(LinkView {
            label: "LinkedIn".to_string(),
            href: profile.to_string(),
        });
    }
    if let Some(handle) = non_blank(github.as_deref()) {
        links.push(LinkView {
            label: "GitHub".to_string(),
            href: format!("https://github.com/{handle}"),
        });
    }
    links
}

fn image_alt(image: Option<&ImageRef>, fallback: &str) -> String {
    image
        .and_then(|image| non_blank(image.alt.as_deref()))
        .unwrap_or(fallback)
        .to_string()
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

fn non_blank_owned(value: Option<String>) -> Option<String> {
    non_blank(value.as_deref()).map(str::to_string)
}
