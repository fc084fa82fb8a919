//! Typed read queries against the content store.
//!
//! Every article query filters to `status == "published"` in GROQ and again on
//! the decoded result, so drafts never reach a page even if the store (or a
//! test double) returns one.

use std::{sync::Arc, time::Duration};

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::application::repos::{ContentStore, StoreError, StoreQuery};
use crate::domain::entities::{Article, ArticleSummary, Author, AuthorListing, Category, Page, Tag};
use crate::domain::slug::validate_route_slug;

const SOURCE: &str = "nostalgia::application::queries";

macro_rules! summary_projection {
    () => {
        r#"{
  _id, title, slug, intro, status, publishedAt, featured,
  hero { asset->{ url }, alt },
  author->{ _id, name, slug, avatar { asset->{ url } } },
  category->{ _id, name, slug, color }
}"#
    };
}

macro_rules! body_projection {
    () => {
        r#"body[] {
    ...,
    _type == "image" => { ..., asset->{ _id, url } },
    _type == "internalLink" => { ..., "reference": reference->{ _type, title, slug } }
  }"#
    };
}

const PUBLISHED_ARTICLES: &str = concat!(
    r#"*[_type == "article" && status == "published"] | order(publishedAt desc) "#,
    summary_projection!()
);

const ARTICLE_BY_SLUG: &str = concat!(
    r#"*[_type == "article" && slug.current == $slug && status == "published"][0] {
  _id, title, seoTitle, seoDescription, seoKeywords, slug, intro, status, featured,
  publishedAt, conclusion, quote, ctaBlocks, showNewsletterSignup, showTableOfContents,
  hero { asset->{ url }, alt },
  author->{ _id, name, slug, bio, avatar { asset->{ url } } },
  category->{ _id, name, slug, color },
  "tags": tags[]->[defined(@)] { _id, name, slug },
  gallery[] {
    _type, _key,
    _type == "galleryImage" => { image { asset->{ url } }, caption, alt },
    _type == "galleryVideo" => { url, caption }
  },
  "relatedArticles": relatedArticles[]->[status == "published"] "#,
    summary_projection!(),
    ",\n  ",
    body_projection!(),
    "\n}"
);

const ARTICLES_BY_CATEGORY: &str = concat!(
    r#"*[_type == "article" && status == "published" && category->slug.current == $category] | order(publishedAt desc) "#,
    summary_projection!()
);

const ARTICLES_BY_TAG: &str = concat!(
    r#"*[_type == "article" && status == "published" && $tag in tags[]->slug.current] | order(publishedAt desc) "#,
    summary_projection!()
);

const ARTICLES_BY_AUTHOR: &str = concat!(
    r#"*[_type == "article" && status == "published" && author->slug.current == $author] | order(publishedAt desc) "#,
    summary_projection!()
);

const AUTHOR_BY_SLUG: &str = r#"*[_type == "author" && slug.current == $slug][0] {
  _id, name, slug, bio, email, website,
  socialMedia { twitter, linkedin, github },
  avatar { asset->{ url } }
}"#;

const AUTHORS: &str = r#"*[_type == "author"] | order(name asc) {
  _id, name, slug, bio,
  avatar { asset->{ url } },
  "articleCount": count(*[_type == "article" && status == "published" && references(^._id)])
}"#;

const CATEGORIES: &str = r#"*[_type == "category"] | order(name asc) {
  _id, name, slug, description, color, featured,
  image { asset->{ url } }
}"#;

const CATEGORY_BY_SLUG: &str = r#"*[_type == "category" && slug.current == $slug][0] {
  _id, name, slug, description, color, featured,
  image { asset->{ url } }
}"#;

const TAG_BY_SLUG: &str = r#"*[_type == "tag" && slug.current == $slug][0] { _id, name, slug }"#;

const PAGE_BY_SLUG: &str = concat!(
    r#"*[_type == "page" && slug.current == $slug][0] {
  _id, title, slug, seoTitle, seoDescription,
  "#,
    body_projection!(),
    "\n}"
);

const SEARCH_ARTICLES: &str = concat!(
    r#"*[_type == "article" && status == "published" && (title match $term || intro match $term || pt::text(body) match $term)]
  | score(title match $term, intro match $term, pt::text(body) match $term)
  | order(_score desc) [0...$limit] "#,
    summary_projection!()
);

/// Revalidation windows applied to the two classes of query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryWindows {
    /// Article listings and article detail.
    pub listing: Duration,
    /// Slower-moving entities: authors, categories, tags, pages.
    pub entity: Duration,
}

impl Default for QueryWindows {
    fn default() -> Self {
        Self {
            listing: Duration::from_secs(60),
            entity: Duration::from_secs(900),
        }
    }
}

impl From<&crate::config::CacheSettings> for QueryWindows {
    fn from(settings: &crate::config::CacheSettings) -> Self {
        Self {
            listing: settings.listing_revalidate,
            entity: settings.entity_revalidate,
        }
    }
}

#[derive(Clone)]
pub struct ContentQueries {
    store: Arc<dyn ContentStore>,
    windows: QueryWindows,
}

impl ContentQueries {
    pub fn new(store: Arc<dyn ContentStore>, windows: QueryWindows) -> Self {
        Self { store, windows }
    }

    pub async fn published_articles(&self) -> Result<Vec<ArticleSummary>, StoreError> {
        let query = StoreQuery::new("published_articles", PUBLISHED_ARTICLES, self.windows.listing);
        let articles = self.fetch_list(&query).await?;
        Ok(newest_first(retain_published(query.name, articles)))
    }

    pub async fn article_by_slug(&self, slug: &str) -> Result<Option<Article>, StoreError> {
        let Some(slug) = route_slug("article_by_slug", slug) else {
            return Ok(None);
        };
        let query = StoreQuery::new("article_by_slug", ARTICLE_BY_SLUG, self.windows.listing)
            .param("slug", slug);

        let Some(mut article) = self.fetch_one::<Article>(&query).await? else {
            return Ok(None);
        };

        if !article.status.is_published() {
            warn!(
                target = SOURCE,
                query = query.name,
                slug = %article.slug,
                status = article.status.as_str(),
                "dropping unpublished article returned by store"
            );
            return Ok(None);
        }

        article.related_articles =
            retain_published(query.name, std::mem::take(&mut article.related_articles));
        article.truncate_lists();
        Ok(Some(article))
    }

    pub async fn articles_by_category(
        &self,
        category: &str,
    ) -> Result<Vec<ArticleSummary>, StoreError> {
        let Some(category) = route_slug("articles_by_category", category) else {
            return Ok(Vec::new());
        };
        let query = StoreQuery::new(
            "articles_by_category",
            ARTICLES_BY_CATEGORY,
            self.windows.listing,
        )
        .param("category", category);
        let articles = self.fetch_list(&query).await?;
        Ok(newest_first(retain_published(query.name, articles)))
    }

    pub async fn articles_by_tag(&self, tag: &str) -> Result<Vec<ArticleSummary>, StoreError> {
        let Some(tag) = route_slug("articles_by_tag", tag) else {
            return Ok(Vec::new());
        };
        let query = StoreQuery::new("articles_by_tag", ARTICLES_BY_TAG, self.windows.listing)
            .param("tag", tag);
        let articles = self.fetch_list(&query).await?;
        Ok(newest_first(retain_published(query.name, articles)))
    }

    pub async fn articles_by_author(
        &self,
        author: &str,
    ) -> Result<Vec<ArticleSummary>, StoreError> {
        let Some(author) = route_slug("articles_by_author", author) else {
            return Ok(Vec::new());
        };
        let query = StoreQuery::new("articles_by_author", ARTICLES_BY_AUTHOR, self.windows.listing)
            .param("author", author);
        let articles = self.fetch_list(&query).await?;
        Ok(newest_first(retain_published(query.name, articles)))
    }

    pub async fn author_by_slug(&self, slug: &str) -> Result<Option<Author>, StoreError> {
        let Some(slug) = route_slug("author_by_slug", slug) else {
            return Ok(None);
        };
        let query = StoreQuery::new("author_by_slug", AUTHOR_BY_SLUG, self.windows.entity)
            .param("slug", slug);
        self.fetch_one(&query).await
    }

    pub async fn authors(&self) -> Result<Vec<AuthorListing>, StoreError> {
        let query = StoreQuery::new("authors", AUTHORS, self.windows.entity);
        self.fetch_list(&query).await
    }

    pub async fn categories(&self) -> Result<Vec<Category>, StoreError> {
        let query = StoreQuery::new("categories", CATEGORIES, self.windows.entity);
        self.fetch_list(&query).await
    }

    pub async fn category_by_slug(&self, slug: &str) -> Result<Option<Category>, StoreError> {
        let Some(slug) = route_slug("category_by_slug", slug) else {
            return Ok(None);
        };
        let query = StoreQuery::new("category_by_slug", CATEGORY_BY_SLUG, self.windows.entity)
            .param("slug", slug);
        self.fetch_one(&query).await
    }

    pub async fn tag_by_slug(&self, slug: &str) -> Result<Option<Tag>, StoreError> {
        let Some(slug) = route_slug("tag_by_slug", slug) else {
            return Ok(None);
        };
        let query =
            StoreQuery::new("tag_by_slug", TAG_BY_SLUG, self.windows.entity).param("slug", slug);
        self.fetch_one(&query).await
    }

    pub async fn page_by_slug(&self, slug: &str) -> Result<Option<Page>, StoreError> {
        let Some(slug) = route_slug("page_by_slug", slug) else {
            return Ok(None);
        };
        let query =
            StoreQuery::new("page_by_slug", PAGE_BY_SLUG, self.windows.entity).param("slug", slug);
        self.fetch_one(&query).await
    }

    /// Prefix-match `term` against title, intro and body text, best match first.
    pub async fn search_articles(
        &self,
        term: &str,
        limit: usize,
    ) -> Result<Vec<ArticleSummary>, StoreError> {
        let query = StoreQuery::new("search_articles", SEARCH_ARTICLES, self.windows.listing)
            .param("term", format!("{term}*"))
            .param("limit", limit);
        let mut hits = retain_published(query.name, self.fetch_list(&query).await?);
        hits.truncate(limit);
        Ok(hits)
    }

    async fn fetch_list<T: DeserializeOwned>(
        &self,
        query: &StoreQuery,
    ) -> Result<Vec<T>, StoreError> {
        match self.store.fetch(query).await? {
            Value::Null => Ok(Vec::new()),
            value => serde_json::from_value(value).map_err(|err| StoreError::decode(query.name, err)),
        }
    }

    async fn fetch_one<T: DeserializeOwned>(
        &self,
        query: &StoreQuery,
    ) -> Result<Option<T>, StoreError> {
        match self.store.fetch(query).await? {
            Value::Null => Ok(None),
            value => serde_json::from_value(value)
                .map(Some)
                .map_err(|err| StoreError::decode(query.name, err)),
        }
    }
}

fn route_slug<'a>(query: &'static str, raw: &'a str) -> Option<&'a str> {
    match validate_route_slug(raw) {
        Ok(slug) => Some(slug),
        Err(err) => {
            debug!(target = SOURCE, query, error = %err, "skipping lookup for invalid slug");
            None
        }
    }
}

fn retain_published(query: &'static str, articles: Vec<ArticleSummary>) -> Vec<ArticleSummary> {
    articles
        .into_iter()
        .filter(|article| {
            let published = article.status.is_published();
            if !published {
                warn!(
                    target = SOURCE,
                    query,
                    slug = %article.slug,
                    status = article.status.as_str(),
                    "dropping unpublished article returned by store"
                );
            }
            published
        })
        .collect()
}

fn newest_first(mut articles: Vec<ArticleSummary>) -> Vec<ArticleSummary> {
    articles.sort_by(|a, b| b.published_at.cmp(&a.published_at));
    articles
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::json;

    use super::*;

    struct CannedStore {
        result: Value,
        seen: Mutex<Vec<StoreQuery>>,
    }

    impl CannedStore {
        fn new(result: Value) -> Arc<Self> {
            Arc::new(Self {
                result,
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl ContentStore for CannedStore {
        async fn fetch(&self, query: &StoreQuery) -> Result<Value, StoreError> {
            self.seen.lock().expect("lock").push(query.clone());
            Ok(self.result.clone())
        }
    }

    fn summary(slug: &str, status: &str, published_at: &str) -> Value {
        json!({
            "_id": slug,
            "title": slug,
            "slug": { "current": slug },
            "status": status,
            "publishedAt": published_at
        })
    }

    #[tokio::test]
    async fn listings_drop_unpublished_and_sort_newest_first() {
        let store = CannedStore::new(json!([
            summary("older", "published", "1927-09-30T00:00:00Z"),
            summary("draft", "draft", "1990-01-01T00:00:00Z"),
            summary("newer", "published", "1932-10-01T00:00:00Z"),
            summary("archived", "archived", "1950-01-01T00:00:00Z"),
        ]));
        let queries = ContentQueries::new(store, QueryWindows::default());

        let slugs: Vec<_> = queries
            .published_articles()
            .await
            .expect("listing")
            .into_iter()
            .map(|article| article.slug)
            .collect();

        assert_eq!(slugs, vec!["newer", "older"]);
    }

    #[tokio::test]
    async fn category_and_author_listings_filter_by_slug() {
        let store = CannedStore::new(json!([
            summary("merkle", "published", "1908-09-23T00:00:00Z"),
            summary("pending", "draft", "1999-01-01T00:00:00Z"),
            summary("larsen", "published", "1956-10-08T00:00:00Z"),
        ]));
        let queries = ContentQueries::new(store.clone(), QueryWindows::default());

        let by_category: Vec<_> = queries
            .articles_by_category("world-series")
            .await
            .expect("category listing")
            .into_iter()
            .map(|article| article.slug)
            .collect();
        let by_author: Vec<_> = queries
            .articles_by_author("red-smith")
            .await
            .expect("author listing")
            .into_iter()
            .map(|article| article.slug)
            .collect();

        assert_eq!(by_category, vec!["larsen", "merkle"]);
        assert_eq!(by_author, vec!["larsen", "merkle"]);

        let seen = store.seen.lock().expect("lock");
        assert_eq!(seen[0].name, "articles_by_category");
        assert!(seen[0].groq.contains("category->slug.current == $category"));
        assert_eq!(seen[0].params.get("category"), Some(&json!("world-series")));
        assert_eq!(seen[1].name, "articles_by_author");
        assert_eq!(seen[1].params.get("author"), Some(&json!("red-smith")));
    }

    #[tokio::test]
    async fn by_slug_returns_none_for_null_result() {
        let store = CannedStore::new(Value::Null);
        let queries = ContentQueries::new(store.clone(), QueryWindows::default());

        let article = queries
            .article_by_slug("ruth-calls-his-shot")
            .await
            .expect("query succeeds");

        assert!(article.is_none());
        let seen = store.seen.lock().expect("lock");
        assert_eq!(seen[0].params.get("slug"), Some(&json!("ruth-calls-his-shot")));
        assert_eq!(seen[0].revalidate, Duration::from_secs(60));
    }

    #[tokio::test]
    async fn invalid_slug_skips_the_store() {
        let store = CannedStore::new(Value::Null);
        let queries = ContentQueries::new(store.clone(), QueryWindows::default());

        assert!(queries.author_by_slug("  ").await.expect("ok").is_none());
        assert!(queries.articles_by_tag("a/b").await.expect("ok").is_empty());
        assert!(store.seen.lock().expect("lock").is_empty());
    }

    #[tokio::test]
    async fn draft_detail_is_hidden() {
        let store = CannedStore::new(summary("leak", "draft", "1932-10-01T00:00:00Z"));
        let queries = ContentQueries::new(store, QueryWindows::default());
        assert!(queries.article_by_slug("leak").await.expect("ok").is_none());
    }

    #[tokio::test]
    async fn related_articles_are_capped_and_published_only() {
        let store = CannedStore::new(json!({
            "_id": "a",
            "title": "A",
            "slug": { "current": "a" },
            "status": "published",
            "relatedArticles": [
                summary("r1", "published", "1930-01-01T00:00:00Z"),
                summary("r2", "draft", "1930-01-01T00:00:00Z"),
                summary("r3", "published", "1930-01-01T00:00:00Z"),
                summary("r4", "published", "1930-01-01T00:00:00Z"),
                summary("r5", "published", "1930-01-01T00:00:00Z"),
            ]
        }));
        let queries = ContentQueries::new(store, QueryWindows::default());

        let article = queries.article_by_slug("a").await.expect("ok").expect("found");
        let related: Vec<_> = article
            .related_articles
            .iter()
            .map(|r| r.slug.as_str())
            .collect();
        assert_eq!(related, vec!["r1", "r3", "r4"]);
    }

    #[tokio::test]
    async fn search_appends_prefix_wildcard() {
        let store = CannedStore::new(json!([]));
        let queries = ContentQueries::new(store.clone(), QueryWindows::default());

        queries.search_articles("bab", 5).await.expect("ok");

        let seen = store.seen.lock().expect("lock");
        assert_eq!(seen[0].params.get("term"), Some(&json!("bab*")));
        assert_eq!(seen[0].params.get("limit"), Some(&json!(5)));
    }

    #[tokio::test]
    async fn decode_failures_are_reported() {
        let store = CannedStore::new(json!({ "not": "a list" }));
        let queries = ContentQueries::new(store, QueryWindows::default());
        let err = queries.categories().await.expect_err("decode error");
        assert!(matches!(err, StoreError::Decode { query: "categories", .. }));
    }
}
