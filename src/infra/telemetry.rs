use std::sync::Once;

use metrics::{Unit, describe_counter, describe_histogram};
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::application::search::{METRIC_SEARCH_DISCARDED, METRIC_SEARCH_REQUESTS};
use crate::cache::{METRIC_CACHE_EVICT, METRIC_CACHE_HIT, METRIC_CACHE_MISS};
use crate::config::{LogFormat, LoggingSettings};

use super::error::InfraError;
use super::http::METRIC_HTTP_RESPONSES;
use super::store::{METRIC_STORE_DURATION_MS, METRIC_STORE_FAILURES, METRIC_STORE_QUERIES};

static METRIC_DESCRIPTIONS: Once = Once::new();

/// Install a global tracing subscriber using the provided logging settings.
pub fn init(logging: &LoggingSettings) -> Result<(), InfraError> {
    describe_metrics();

    let env_filter = EnvFilter::builder()
        .with_default_directive(logging.level.into())
        .from_env_lossy();

    let fmt_layer = match logging.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .boxed(),
        LogFormat::Compact => fmt::layer().compact().with_target(true).boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(ErrorLayer::default())
        .with(fmt_layer)
        .try_init()
        .map_err(|err| {
            InfraError::telemetry(format!("failed to install tracing subscriber: {err}"))
        })
}

fn describe_metrics() {
    METRIC_DESCRIPTIONS.call_once(|| {
        describe_counter!(
            METRIC_STORE_QUERIES,
            Unit::Count,
            "Total number of queries issued to the content store."
        );
        describe_counter!(
            METRIC_STORE_FAILURES,
            Unit::Count,
            "Total number of content store queries that failed."
        );
        describe_histogram!(
            METRIC_STORE_DURATION_MS,
            Unit::Milliseconds,
            "Content store query latency in milliseconds."
        );
        describe_counter!(
            METRIC_CACHE_HIT,
            Unit::Count,
            "Total number of query results served from cache."
        );
        describe_counter!(
            METRIC_CACHE_MISS,
            Unit::Count,
            "Total number of query cache misses, including expired entries."
        );
        describe_counter!(
            METRIC_CACHE_EVICT,
            Unit::Count,
            "Total number of query cache evictions due to capacity."
        );
        describe_counter!(
            METRIC_SEARCH_REQUESTS,
            Unit::Count,
            "Total number of search lookups sent to the content store."
        );
        describe_counter!(
            METRIC_SEARCH_DISCARDED,
            Unit::Count,
            "Total number of search results dropped because a newer query superseded them."
        );
        describe_counter!(
            METRIC_HTTP_RESPONSES,
            Unit::Count,
            "Total number of HTTP responses by status code."
        );
    });
}
