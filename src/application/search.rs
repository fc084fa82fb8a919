//! Article search and the debounced search session behind interactive input.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use metrics::counter;
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::application::queries::ContentQueries;
use crate::cache::mutex_lock;
use crate::domain::entities::ArticleSummary;

const SOURCE: &str = "nostalgia::application::search";

pub(crate) const METRIC_SEARCH_REQUESTS: &str = "nostalgia_search_requests_total";
pub(crate) const METRIC_SEARCH_DISCARDED: &str = "nostalgia_search_discarded_total";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchConfig {
    pub debounce: Duration,
    pub min_query_chars: usize,
    pub max_results: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(300),
            min_query_chars: 2,
            max_results: 5,
        }
    }
}

impl From<&crate::config::SearchSettings> for SearchConfig {
    fn from(settings: &crate::config::SearchSettings) -> Self {
        Self {
            debounce: settings.debounce,
            min_query_chars: settings.min_query_chars,
            max_results: settings.max_results,
        }
    }
}

/// Serialisable view of a search match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchHit {
    pub title: String,
    pub slug: String,
    pub intro: Option<String>,
    pub href: String,
}

impl From<&ArticleSummary> for SearchHit {
    fn from(article: &ArticleSummary) -> Self {
        Self {
            title: article.title.clone(),
            slug: article.slug.clone(),
            intro: article.intro.clone(),
            href: format!("/articles/{}", article.slug),
        }
    }
}

/// Stateless lookup. Short queries and store failures both yield no results.
pub struct SearchService {
    queries: ContentQueries,
    config: SearchConfig,
}

impl SearchService {
    pub fn new(queries: ContentQueries, config: SearchConfig) -> Self {
        Self { queries, config }
    }

    pub fn config(&self) -> SearchConfig {
        self.config
    }

    pub fn is_searchable(&self, query: &str) -> bool {
        query.trim().chars().count() >= self.config.min_query_chars
    }

    pub async fn search(&self, query: &str) -> Vec<ArticleSummary> {
        let term = query.trim();
        if !self.is_searchable(term) {
            return Vec::new();
        }

        counter!(METRIC_SEARCH_REQUESTS).increment(1);
        match self
            .queries
            .search_articles(term, self.config.max_results)
            .await
        {
            Ok(hits) => hits,
            Err(err) => {
                warn!(target = SOURCE, query = term, error = %err, "search lookup failed");
                Vec::new()
            }
        }
    }
}

/// What an interactive search box shows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchState {
    pub query: String,
    pub results: Vec<ArticleSummary>,
    /// A lookup for `query` is scheduled or in flight.
    pub searching: bool,
    /// Bumped on every submission; results carry the generation they were
    /// scheduled under and are only applied while it is still current.
    pub generation: u64,
}

/// Debounced search for one input. Each submission cancels the pending
/// lookup and schedules a new one after the debounce delay; a lookup only
/// publishes if no newer submission has been made since it was scheduled.
pub struct SearchSession {
    service: Arc<SearchService>,
    debounce: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
    state: Arc<watch::Sender<SearchState>>,
}

impl SearchSession {
    pub fn new(service: Arc<SearchService>) -> Self {
        let debounce = service.config().debounce;
        let (state, _) = watch::channel(SearchState::default());
        Self {
            service,
            debounce,
            pending: Mutex::new(None),
            state: Arc::new(state),
        }
    }

    /// Must be called within a Tokio runtime.
    pub fn submit(&self, query: impl Into<String>) {
        let query = query.into();
        let searchable = self.service.is_searchable(&query);

        let mut pending = mutex_lock(&self.pending, SOURCE, "submit");
        if let Some(previous) = pending.take() {
            if !previous.is_finished() {
                previous.abort();
                counter!(METRIC_SEARCH_DISCARDED).increment(1);
                debug!(target = SOURCE, "cancelled pending search");
            }
        }

        // The generation moves under the watch lock, so a lookup that
        // finishes after this point can no longer match it.
        let mut generation = 0;
        self.state.send_modify(|state| {
            state.generation += 1;
            generation = state.generation;
            state.query = query.clone();
            state.searching = searchable;
            if !searchable {
                state.results.clear();
            }
        });

        if !searchable {
            return;
        }

        let service = Arc::clone(&self.service);
        let state = Arc::clone(&self.state);
        let debounce = self.debounce;

        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            let results = service.search(&query).await;

            let applied = state.send_if_modified(|current| {
                if current.generation != generation {
                    return false;
                }
                current.results = results;
                current.searching = false;
                true
            });
            if !applied {
                counter!(METRIC_SEARCH_DISCARDED).increment(1);
                debug!(target = SOURCE, generation, "discarding superseded search results");
            }
        }));
    }

    pub fn latest(&self) -> SearchState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.state.subscribe()
    }
}

impl Drop for SearchSession {
    fn drop(&mut self) {
        if let Some(handle) = mutex_lock(&self.pending, SOURCE, "drop").take() {
            handle.abort();
        }
    }
}
