mod support;

use std::sync::Arc;

use axum::http::StatusCode;
use serde_json::{Value, json};

use support::{FixtureStore, author, called_shot, category, get, router, summary};

fn listing() -> Value {
    json!([
        summary("called-shot", "Ruth Calls His Shot", "1932-10-01T15:00:00Z", true),
        summary("shot-heard", "The Shot Heard Round the World", "1951-10-03T00:00:00Z", false),
        {
            "_id": "article-draft",
            "title": "Unfinished Business",
            "slug": { "current": "unfinished" },
            "status": "draft",
            "publishedAt": "1999-01-01T00:00:00Z"
        }
    ])
}

#[tokio::test]
async fn home_lists_published_articles_only() {
    let store = Arc::new(FixtureStore::default().with("published_articles", listing()));

    let (status, body) = get(router(store), "/").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("<title>Numbers &amp; Nostalgia</title>"));
    assert!(body.contains("Featured Stories"));
    assert!(body.contains("href=\"/articles/called-shot\""));
    assert!(body.contains("The Shot Heard Round the World"));
    assert!(!body.contains("Unfinished Business"));
}

#[tokio::test]
async fn article_page_renders_body_outline_and_metadata() {
    let store = Arc::new(FixtureStore::default().with("article_by_slug", called_shot()));

    let (status, body) = get(router(store.clone()), "/articles/called-shot").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("<title>The Called Shot, 1932 | Numbers &amp; Nostalgia</title>"));
    assert!(body.contains(
        "<link rel=\"canonical\" href=\"https://nostalgia.test/articles/called-shot\">"
    ));
    assert!(body.contains("<meta property=\"og:type\" content=\"article\">"));
    assert!(body.contains("<meta property=\"og:image\" content=\"https://cdn.test/wrigley.jpg\">"));
    assert!(body.contains("<meta name=\"keywords\" content=\"babe ruth, world series\">"));

    assert!(body.contains("<h2 id=\"the-pitch\">The Pitch</h2>"));
    assert!(body.contains("<h3 id=\"aftermath\">Aftermath</h3>"));
    assert!(body.contains("href=\"#the-pitch\""));
    assert!(body.contains("href=\"#aftermath\""));
    assert!(body.contains("<p>Root delivered a curveball.</p>"));

    assert!(body.contains("href=\"/authors/mel-allen\""));
    assert!(body.contains("href=\"/tags/world-series\""));
    assert!(body.contains("Charlie Root"));
    assert!(body.contains("Related Articles"));

    let seen = store.seen();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].params.get("slug"), Some(&json!("called-shot")));
}

#[tokio::test]
async fn dangling_tag_reference_still_renders_article() {
    let mut article = called_shot();
    article["tags"] = json!([
        { "_id": "tag-ws", "name": "World Series", "slug": { "current": "world-series" } },
        null
    ]);
    let store = Arc::new(FixtureStore::default().with("article_by_slug", article));

    let (status, body) = get(router(store), "/articles/called-shot").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("href=\"/tags/world-series\""));
}

#[tokio::test]
async fn outline_is_hidden_unless_enabled() {
    let mut article = called_shot();
    article["showTableOfContents"] = json!(false);
    let store = Arc::new(FixtureStore::default().with("article_by_slug", article));

    let (status, body) = get(router(store), "/articles/called-shot").await;

    assert_eq!(status, StatusCode::OK);
    assert!(!body.contains("Table of Contents"));
    assert!(body.contains("<h2 id=\"the-pitch\">"));
}

#[tokio::test]
async fn missing_article_renders_article_not_found() {
    let store = Arc::new(FixtureStore::default());

    let (status, body) = get(router(store), "/articles/nobody-home").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("Article Not Found"));
    assert!(body.contains("href=\"/articles\""));
}

#[tokio::test]
async fn unpublished_article_is_not_found() {
    let mut article = called_shot();
    article["status"] = json!("draft");
    let store = Arc::new(FixtureStore::default().with("article_by_slug", article));

    let (status, _) = get(router(store), "/articles/called-shot").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn top_level_slug_resolves_static_page() {
    let store = Arc::new(FixtureStore::default().with(
        "page_by_slug",
        json!({
            "_id": "page-about",
            "title": "About Us",
            "slug": { "current": "about" },
            "body": [{
                "_type": "block",
                "_key": "p1",
                "style": "normal",
                "children": [{ "_type": "span", "text": "We love box scores.", "marks": [] }]
            }]
        }),
    ));

    let (status, body) = get(router(store.clone()), "/about").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("<title>About Us | Numbers &amp; Nostalgia</title>"));
    assert!(body.contains("<p>We love box scores.</p>"));
    assert_eq!(store.seen_names(), vec!["page_by_slug"]);
}

#[tokio::test]
async fn nested_unknown_path_is_not_found_without_store_lookup() {
    let store = Arc::new(FixtureStore::default());

    let (status, body) = get(router(store.clone()), "/box/scores/1927").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("<h1>Not Found</h1>"));
    assert!(store.seen().is_empty());
}

#[tokio::test]
async fn store_failure_renders_error_page() {
    let store = Arc::new(FixtureStore::default().failing("published_articles"));

    let (status, body) = get(router(store), "/articles").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.contains("Something Went Wrong"));
    assert!(body.contains("Content is temporarily unavailable"));
    assert!(!body.contains("connection refused"));
}

#[tokio::test]
async fn tag_page_lists_tagged_articles() {
    let store = Arc::new(
        FixtureStore::default()
            .with(
                "tag_by_slug",
                json!({ "_id": "tag-ws", "name": "World Series", "slug": { "current": "world-series" } }),
            )
            .with("articles_by_tag", listing()),
    );

    let (status, body) = get(router(store), "/tags/world-series").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("<h1>Articles tagged "));
    assert!(body.contains("World Series"));
    assert!(body.contains("Ruth Calls His Shot"));
}

#[tokio::test]
async fn unknown_tag_is_not_found() {
    let store = Arc::new(FixtureStore::default().with("articles_by_tag", listing()));

    let (status, _) = get(router(store), "/tags/no-such-tag").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn category_page_lists_its_published_articles_newest_first() {
    let store = Arc::new(
        FixtureStore::default()
            .with("category_by_slug", category())
            .with("articles_by_category", listing()),
    );

    let (status, body) = get(router(store.clone()), "/categories/legends").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("<title>Legends | Numbers &amp; Nostalgia</title>"));
    assert!(body.contains("data-color=\"blue\""));
    assert!(!body.contains("Unfinished Business"));
    let newer = body
        .find("The Shot Heard Round the World")
        .expect("1951 article listed");
    let older = body.find("Ruth Calls His Shot").expect("1932 article listed");
    assert!(newer < older);

    let seen = store.seen();
    let listing_query = seen
        .iter()
        .find(|query| query.name == "articles_by_category")
        .expect("category listing fetched");
    assert_eq!(listing_query.params.get("category"), Some(&json!("legends")));
}

#[tokio::test]
async fn unknown_category_is_not_found() {
    let store = Arc::new(FixtureStore::default().with("articles_by_category", listing()));

    let (status, _) = get(router(store), "/categories/no-such-category").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn author_page_lists_articles_and_safe_links_only() {
    let mut profile = author();
    profile["website"] = json!("javascript:alert(1)");
    profile["socialMedia"] = json!({ "twitter": "@melallen", "linkedin": "javascript:void(0)" });
    let store = Arc::new(
        FixtureStore::default()
            .with("author_by_slug", profile)
            .with("articles_by_author", listing()),
    );

    let (status, body) = get(router(store.clone()), "/authors/mel-allen").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("<h1>Mel Allen</h1>"));
    assert!(body.contains("Ruth Calls His Shot"));
    assert!(!body.contains("Unfinished Business"));
    assert!(body.contains("href=\"https://twitter.com/melallen\""));
    assert!(!body.contains("javascript:"));
    assert!(!body.contains(">Website<"));

    let seen = store.seen();
    let listing_query = seen
        .iter()
        .find(|query| query.name == "articles_by_author")
        .expect("author listing fetched");
    assert_eq!(listing_query.params.get("author"), Some(&json!("mel-allen")));
}

#[tokio::test]
async fn search_api_returns_matches_as_json() {
    let store = Arc::new(FixtureStore::default().with(
        "search_articles",
        json!([summary("called-shot", "Ruth Calls His Shot", "1932-10-01T15:00:00Z", false)]),
    ));

    let (status, body) = get(router(store.clone()), "/api/search?q=%20ruth%20").await;

    assert_eq!(status, StatusCode::OK);
    let payload: Value = serde_json::from_str(&body).expect("json body");
    assert_eq!(payload["query"], "ruth");
    assert_eq!(payload["results"][0]["href"], "/articles/called-shot");
    assert_eq!(payload["results"][0]["title"], "Ruth Calls His Shot");

    let seen = store.seen();
    assert_eq!(seen[0].params.get("term"), Some(&json!("ruth*")));
    assert_eq!(seen[0].params.get("limit"), Some(&json!(5)));
}

#[tokio::test]
async fn short_search_query_skips_the_store() {
    let store = Arc::new(FixtureStore::default());

    let (status, body) = get(router(store.clone()), "/api/search?q=r").await;

    assert_eq!(status, StatusCode::OK);
    let payload: Value = serde_json::from_str(&body).expect("json body");
    assert_eq!(payload["results"], json!([]));
    assert!(store.seen().is_empty());
}

#[tokio::test]
async fn search_page_prompts_until_query_is_long_enough() {
    let store = Arc::new(FixtureStore::default());

    let (status, body) = get(router(store), "/search").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Type at least 2 characters to search."));
}

#[tokio::test]
async fn health_check_answers_ok() {
    let (status, body) = get(router(Arc::new(FixtureStore::default())), "/_health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "ok");
}
