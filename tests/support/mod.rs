#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use nostalgia::application::{
    chrome::ChromeService,
    metadata::SiteIdentity,
    queries::{ContentQueries, QueryWindows},
    repos::{ContentStore, StoreError, StoreQuery},
    search::{SearchConfig, SearchService},
    site::SiteService,
};
use nostalgia::domain::image::ImageUrlBuilder;
use nostalgia::infra::http::{HttpState, build_router};
use serde_json::{Value, json};
use tower::ServiceExt;
use url::Url;

/// In-memory store answering by query name. Unknown queries return `null`.
#[derive(Default)]
pub struct FixtureStore {
    results: HashMap<&'static str, Value>,
    failing: HashSet<&'static str>,
    seen: Mutex<Vec<StoreQuery>>,
}

impl FixtureStore {
    pub fn with(mut self, query: &'static str, result: Value) -> Self {
        self.results.insert(query, result);
        self
    }

    pub fn failing(mut self, query: &'static str) -> Self {
        self.failing.insert(query);
        self
    }

    pub fn seen(&self) -> Vec<StoreQuery> {
        self.seen.lock().expect("seen lock").clone()
    }

    pub fn seen_names(&self) -> Vec<&'static str> {
        self.seen().iter().map(|query| query.name).collect()
    }
}

#[async_trait]
impl ContentStore for FixtureStore {
    async fn fetch(&self, query: &StoreQuery) -> Result<Value, StoreError> {
        self.seen.lock().expect("seen lock").push(query.clone());
        if self.failing.contains(query.name) {
            return Err(StoreError::transport("connection refused"));
        }
        Ok(self.results.get(query.name).cloned().unwrap_or(Value::Null))
    }
}

pub fn site_identity() -> SiteIdentity {
    SiteIdentity {
        title: "Numbers & Nostalgia".to_string(),
        description: "Stories from baseball's past".to_string(),
        public_site_url: Url::parse("https://nostalgia.test/").expect("valid url"),
    }
}

pub fn router(store: Arc<FixtureStore>) -> Router {
    let queries = ContentQueries::new(store, QueryWindows::default());
    let images = ImageUrlBuilder::new("abc123", "production").expect("valid project");
    let search = Arc::new(SearchService::new(queries.clone(), SearchConfig::default()));

    build_router(HttpState {
        site: Arc::new(SiteService::new(queries, images, search)),
        chrome: Arc::new(ChromeService::new(site_identity())),
    })
}

pub async fn get(router: Router, uri: &str) -> (StatusCode, String) {
    let response = router
        .oneshot(
            Request::builder()
                .uri(uri)
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("router responds");

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body collects");
    (status, String::from_utf8(bytes.to_vec()).expect("utf-8 body"))
}

pub fn author() -> Value {
    json!({
        "_id": "author-mel",
        "name": "Mel Allen",
        "slug": { "current": "mel-allen" },
        "avatar": { "asset": { "url": "https://cdn.test/mel.jpg" } }
    })
}

pub fn category() -> Value {
    json!({
        "_id": "cat-legends",
        "name": "Legends",
        "slug": { "current": "legends" },
        "color": "blue"
    })
}

pub fn summary(slug: &str, title: &str, published_at: &str, featured: bool) -> Value {
    json!({
        "_id": format!("article-{slug}"),
        "title": title,
        "slug": { "current": slug },
        "intro": format!("{title} intro"),
        "status": "published",
        "publishedAt": published_at,
        "featured": featured,
        "author": author(),
        "category": category()
    })
}

fn text_block(key: &str, style: &str, text: &str) -> Value {
    json!({
        "_type": "block",
        "_key": key,
        "style": style,
        "markDefs": [],
        "children": [{ "_type": "span", "_key": format!("{key}-s"), "text": text, "marks": [] }]
    })
}

pub fn called_shot() -> Value {
    json!({
        "_id": "article-called-shot",
        "title": "Ruth Calls His Shot",
        "seoTitle": "The Called Shot, 1932",
        "seoDescription": "Game three of the 1932 World Series at Wrigley Field.",
        "seoKeywords": ["babe ruth", "world series"],
        "slug": { "current": "called-shot" },
        "intro": "Did he point to center field?",
        "status": "published",
        "publishedAt": "1932-10-01T15:00:00Z",
        "showTableOfContents": true,
        "hero": { "asset": { "url": "https://cdn.test/wrigley.jpg" }, "alt": "Wrigley Field" },
        "author": author(),
        "category": category(),
        "tags": [{ "_id": "tag-ws", "name": "World Series", "slug": { "current": "world-series" } }],
        "quote": { "text": "It's a lie, I never pointed.", "author": "Charlie Root" },
        "body": [
            text_block("b1", "h2", "The Pitch"),
            text_block("b2", "normal", "Root delivered a curveball."),
            text_block("b3", "h3", "Aftermath"),
            { "_type": "mysteryWidget", "_key": "b4" }
        ],
        "relatedArticles": [summary("merkles-boner", "Merkle's Boner", "1908-09-23T00:00:00Z", false)]
    })
}
