use std::sync::Arc;

use askama::Template;
use axum::{
    Json, Router,
    body::Body,
    extract::{Path, Query, State},
    http::{Request, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};

use crate::{
    application::{
        chrome::ChromeService,
        error::HttpError,
        metadata::Composed,
        search::SearchHit,
        site::SiteService,
    },
    presentation::views::{
        ArticleIndexTemplate, ArticleTemplate, AuthorIndexTemplate, AuthorTemplate,
        CategoryIndexTemplate, CategoryTemplate, ErrorPageView, HomeTemplate, LayoutContext,
        PageTemplate, SearchTemplate, TagTemplate, render_error_response,
        render_not_found_response, render_template_response,
    },
};

use super::middleware::{log_responses, set_request_context};

#[derive(Clone)]
pub struct HttpState {
    pub site: Arc<SiteService>,
    pub chrome: Arc<ChromeService>,
}

pub fn build_router(state: HttpState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/articles", get(article_index))
        .route("/articles/{slug}", get(article_detail))
        .route("/authors", get(author_index))
        .route("/authors/{slug}", get(author_detail))
        .route("/categories", get(category_index))
        .route("/categories/{slug}", get(category_detail))
        .route("/tags/{slug}", get(tag_detail))
        .route("/pages/{slug}", get(static_page))
        .route("/search", get(search_page))
        .route("/api/search", get(search_api))
        .route("/_health", get(health))
        .fallback(fallback_router)
        .with_state(state)
        .layer(middleware::from_fn(log_responses))
        .layer(middleware::from_fn(set_request_context))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SearchQuery {
    q: Option<String>,
}

#[derive(Debug, Serialize)]
struct SearchResponse {
    query: String,
    results: Vec<SearchHit>,
}

async fn home(State(state): State<HttpState>) -> Response {
    let result = state.site.home().await;
    respond(&state, result, |view| HomeTemplate { view })
}

async fn article_index(State(state): State<HttpState>) -> Response {
    let result = state.site.article_index().await;
    respond(&state, result, |view| ArticleIndexTemplate { view })
}

async fn article_detail(State(state): State<HttpState>, Path(slug): Path<String>) -> Response {
    let result = state.site.article_detail(&slug).await;
    respond_found(
        &state,
        result,
        ErrorPageView::article_not_found,
        |view| ArticleTemplate { view },
    )
}

async fn author_index(State(state): State<HttpState>) -> Response {
    let result = state.site.author_index().await;
    respond(&state, result, |view| AuthorIndexTemplate { view })
}

async fn author_detail(State(state): State<HttpState>, Path(slug): Path<String>) -> Response {
    let result = state.site.author_detail(&slug).await;
    respond_found(&state, result, ErrorPageView::not_found, |view| {
        AuthorTemplate { view }
    })
}

async fn category_index(State(state): State<HttpState>) -> Response {
    let result = state.site.category_index().await;
    respond(&state, result, |view| CategoryIndexTemplate { view })
}

async fn category_detail(State(state): State<HttpState>, Path(slug): Path<String>) -> Response {
    let result = state.site.category_detail(&slug).await;
    respond_found(&state, result, ErrorPageView::not_found, |view| {
        CategoryTemplate { view }
    })
}

async fn tag_detail(State(state): State<HttpState>, Path(slug): Path<String>) -> Response {
    let result = state.site.tag_detail(&slug).await;
    respond_found(&state, result, ErrorPageView::not_found, |view| {
        TagTemplate { view }
    })
}

async fn static_page(State(state): State<HttpState>, Path(slug): Path<String>) -> Response {
    let result = state.site.static_page(&slug).await;
    respond_found(&state, result, ErrorPageView::not_found, |view| {
        PageTemplate { view }
    })
}

async fn search_page(State(state): State<HttpState>, Query(query): Query<SearchQuery>) -> Response {
    let page = state.site.search_page(query.q.as_deref()).await;
    respond(&state, Ok(page), |view| SearchTemplate { view })
}

async fn search_api(State(state): State<HttpState>, Query(query): Query<SearchQuery>) -> Response {
    let query = query.q.unwrap_or_default().trim().to_string();
    let results = state.site.search().search(&query).await;

    Json(SearchResponse {
        results: results.iter().map(SearchHit::from).collect(),
        query,
    })
    .into_response()
}

async fn health() -> &'static str {
    "ok"
}

/// Top-level single-segment paths resolve to static pages (`/about`).
async fn fallback_router(State(state): State<HttpState>, request: Request<Body>) -> Response {
    let slug = request.uri().path().trim_matches('/');

    if slug.is_empty() || slug.contains('/') {
        return render_not_found_response(state.chrome.load(), ErrorPageView::not_found());
    }

    let result = state.site.static_page(slug).await;
    respond_found(&state, result, ErrorPageView::not_found, |view| {
        PageTemplate { view }
    })
}

fn respond<T, P, F>(state: &HttpState, result: Result<Composed<T>, HttpError>, template: F) -> Response
where
    P: Template,
    F: FnOnce(LayoutContext<T>) -> P,
{
    match result {
        Ok(page) => {
            let chrome = state.chrome.for_page(&page.seo, &page.path);
            let view = LayoutContext::new(chrome, page.content);
            render_template_response(template(view), StatusCode::OK)
        }
        Err(err) => render_error_response(state.chrome.load(), err),
    }
}

fn respond_found<T, P, F>(
    state: &HttpState,
    result: Result<Option<Composed<T>>, HttpError>,
    not_found: fn() -> ErrorPageView,
    template: F,
) -> Response
where
    P: Template,
    F: FnOnce(LayoutContext<T>) -> P,
{
    match result {
        Ok(Some(page)) => respond(state, Ok(page), template),
        Ok(None) => render_not_found_response(state.chrome.load(), not_found()),
        Err(err) => render_error_response(state.chrome.load(), err),
    }
}
