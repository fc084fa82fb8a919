//! Configuration layer: typed settings with layered precedence (file → env → CLI).

use std::{net::SocketAddr, str::FromStr, time::Duration};

use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;
use url::Url;

mod cli;

pub use cli::*;

#[cfg(test)]
mod tests;

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "nostalgia";
const ENV_PREFIX: &str = "NOSTALGIA";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_GRACEFUL_SHUTDOWN_SECS: u64 = 30;
const DEFAULT_PUBLIC_SITE_URL: &str = "http://localhost:3000/";
const DEFAULT_SITE_TITLE: &str = "Numbers & Nostalgia";
const DEFAULT_SITE_DESCRIPTION: &str = "Numbers & Nostalgia is a baseball history blog dedicated to uncovering the stories of legendary players, memorable games, and America's pastime.";
const DEFAULT_DATASET: &str = "production";
const DEFAULT_API_VERSION: &str = "2024-01-01";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
const DEFAULT_CACHE_MAX_ENTRIES: usize = 512;
const DEFAULT_LISTING_REVALIDATE_SECS: u64 = 60;
const DEFAULT_ENTITY_REVALIDATE_SECS: u64 = 900;
const DEFAULT_SEARCH_DEBOUNCE_MS: u64 = 300;
const DEFAULT_SEARCH_MIN_QUERY_CHARS: usize = 2;
const DEFAULT_SEARCH_MAX_RESULTS: usize = 5;

#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub logging: LoggingSettings,
    pub store: StoreSettings,
    pub cache: CacheSettings,
    pub search: SearchSettings,
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub public_addr: SocketAddr,
    pub graceful_shutdown: Duration,
    /// Always ends with `/`.
    pub public_site_url: Url,
    pub site_title: String,
    pub site_description: String,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Clone)]
pub struct StoreSettings {
    pub project_id: String,
    pub dataset: String,
    pub api_version: String,
    pub token: Option<String>,
    pub use_cdn: bool,
    /// Replaces the hosted API base when set; always ends with `/`.
    pub api_host: Option<Url>,
    pub request_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct CacheSettings {
    pub enabled: bool,
    pub max_entries: usize,
    pub listing_revalidate: Duration,
    pub entity_revalidate: Duration,
}

#[derive(Debug, Clone)]
pub struct SearchSettings {
    pub debounce: Duration,
    pub min_query_chars: usize,
    pub max_results: usize,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(Environment::with_prefix(ENV_PREFIX).separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;

    match cli.command.as_ref() {
        Some(Command::Serve(args)) => raw.apply_serve_overrides(&args.overrides),
        Some(Command::Search(args)) => raw.apply_store_overrides(&args.store),
        Some(Command::Toc(args)) => raw.apply_store_overrides(&args.store),
        None => raw.apply_serve_overrides(&ServeOverrides::default()),
    }

    Settings::from_raw(raw)
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    server: RawServerSettings,
    logging: RawLoggingSettings,
    store: RawStoreSettings,
    cache: RawCacheSettings,
    search: RawSearchSettings,
}

impl RawSettings {
    fn apply_serve_overrides(&mut self, overrides: &ServeOverrides) {
        if let Some(host) = overrides.server_host.as_ref() {
            self.server.host = Some(host.clone());
        }
        if let Some(port) = overrides.server_port {
            self.server.port = Some(port);
        }
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
        if let Some(enabled) = overrides.cache_enabled {
            self.cache.enabled = Some(enabled);
        }

        self.apply_store_overrides(&overrides.store);
    }

    fn apply_store_overrides(&mut self, overrides: &StoreOverrides) {
        if let Some(project) = overrides.project_id.as_ref() {
            self.store.project_id = Some(project.clone());
        }
        if let Some(dataset) = overrides.dataset.as_ref() {
            self.store.dataset = Some(dataset.clone());
        }
        if let Some(token) = overrides.token.as_ref() {
            self.store.token = Some(token.clone());
        }
        if let Some(use_cdn) = overrides.use_cdn {
            self.store.use_cdn = Some(use_cdn);
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            server,
            logging,
            store,
            cache,
            search,
        } = raw;

        let server = build_server_settings(server)?;
        let logging = build_logging_settings(logging)?;
        let store = build_store_settings(store)?;
        let cache = build_cache_settings(cache)?;
        let search = build_search_settings(search)?;

        Ok(Self {
            server,
            logging,
            store,
            cache,
            search,
        })
    }
}

fn build_server_settings(server: RawServerSettings) -> Result<ServerSettings, LoadError> {
    let host = server.host.unwrap_or_else(|| DEFAULT_HOST.to_string());

    let port = server.port.unwrap_or(DEFAULT_PORT);
    if port == 0 {
        return Err(LoadError::invalid(
            "server.port",
            "port must be greater than zero",
        ));
    }

    let public_addr = parse_socket_addr(&host, port)
        .map_err(|reason| LoadError::invalid("server.public_addr", reason))?;

    let graceful_secs = server
        .graceful_shutdown_seconds
        .unwrap_or(DEFAULT_GRACEFUL_SHUTDOWN_SECS);
    if graceful_secs == 0 {
        return Err(LoadError::invalid(
            "server.graceful_shutdown_seconds",
            "must be greater than zero",
        ));
    }

    let public_site_url = parse_base_url(
        server
            .public_site_url
            .as_deref()
            .unwrap_or(DEFAULT_PUBLIC_SITE_URL),
    )
    .map_err(|reason| LoadError::invalid("server.public_site_url", reason))?;

    let site_title = non_blank(server.site_title).unwrap_or_else(|| DEFAULT_SITE_TITLE.to_string());
    let site_description = non_blank(server.site_description)
        .unwrap_or_else(|| DEFAULT_SITE_DESCRIPTION.to_string());

    Ok(ServerSettings {
        public_addr,
        graceful_shutdown: Duration::from_secs(graceful_secs),
        public_site_url,
        site_title,
        site_description,
    })
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::INFO,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn build_store_settings(store: RawStoreSettings) -> Result<StoreSettings, LoadError> {
    let project_id = non_blank(store.project_id)
        .ok_or_else(|| LoadError::invalid("store.project_id", "must be provided"))?;
    if !project_id
        .chars()
        .all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-')
    {
        return Err(LoadError::invalid(
            "store.project_id",
            "may only contain lowercase letters, digits and `-`",
        ));
    }

    let dataset = non_blank(store.dataset).unwrap_or_else(|| DEFAULT_DATASET.to_string());
    if !dataset
        .chars()
        .all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-' || ch == '_')
    {
        return Err(LoadError::invalid(
            "store.dataset",
            "may only contain lowercase letters, digits, `-` and `_`",
        ));
    }

    let api_version =
        non_blank(store.api_version).unwrap_or_else(|| DEFAULT_API_VERSION.to_string());
    let api_version = api_version
        .strip_prefix('v')
        .map(str::to_string)
        .unwrap_or(api_version);
    if !is_valid_api_version(&api_version) {
        return Err(LoadError::invalid(
            "store.api_version",
            format!("`{api_version}` is not `YYYY-MM-DD`, `1` or `X`"),
        ));
    }

    let api_host = non_blank(store.api_host)
        .map(|host| parse_base_url(&host))
        .transpose()
        .map_err(|reason| LoadError::invalid("store.api_host", reason))?;

    let timeout_secs = store
        .request_timeout_seconds
        .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);
    if timeout_secs == 0 {
        return Err(LoadError::invalid(
            "store.request_timeout_seconds",
            "must be greater than zero",
        ));
    }

    Ok(StoreSettings {
        project_id,
        dataset,
        api_version,
        token: non_blank(store.token),
        use_cdn: store.use_cdn.unwrap_or(true),
        api_host,
        request_timeout: Duration::from_secs(timeout_secs),
    })
}

fn build_cache_settings(cache: RawCacheSettings) -> Result<CacheSettings, LoadError> {
    let max_entries = cache.max_entries.unwrap_or(DEFAULT_CACHE_MAX_ENTRIES);
    if max_entries == 0 {
        return Err(LoadError::invalid(
            "cache.max_entries",
            "must be greater than zero",
        ));
    }

    Ok(CacheSettings {
        enabled: cache.enabled.unwrap_or(true),
        max_entries,
        listing_revalidate: Duration::from_secs(
            cache
                .listing_revalidate_seconds
                .unwrap_or(DEFAULT_LISTING_REVALIDATE_SECS),
        ),
        entity_revalidate: Duration::from_secs(
            cache
                .entity_revalidate_seconds
                .unwrap_or(DEFAULT_ENTITY_REVALIDATE_SECS),
        ),
    })
}

fn build_search_settings(search: RawSearchSettings) -> Result<SearchSettings, LoadError> {
    let min_query_chars = search
        .min_query_chars
        .unwrap_or(DEFAULT_SEARCH_MIN_QUERY_CHARS);
    if min_query_chars == 0 {
        return Err(LoadError::invalid(
            "search.min_query_chars",
            "must be greater than zero",
        ));
    }

    let max_results = search.max_results.unwrap_or(DEFAULT_SEARCH_MAX_RESULTS);
    if max_results == 0 {
        return Err(LoadError::invalid(
            "search.max_results",
            "must be greater than zero",
        ));
    }

    Ok(SearchSettings {
        debounce: Duration::from_millis(search.debounce_ms.unwrap_or(DEFAULT_SEARCH_DEBOUNCE_MS)),
        min_query_chars,
        max_results,
    })
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawServerSettings {
    host: Option<String>,
    port: Option<u16>,
    graceful_shutdown_seconds: Option<u64>,
    public_site_url: Option<String>,
    site_title: Option<String>,
    site_description: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawStoreSettings {
    project_id: Option<String>,
    dataset: Option<String>,
    api_version: Option<String>,
    token: Option<String>,
    use_cdn: Option<bool>,
    api_host: Option<String>,
    request_timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawCacheSettings {
    enabled: Option<bool>,
    max_entries: Option<usize>,
    listing_revalidate_seconds: Option<u64>,
    entity_revalidate_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSearchSettings {
    debounce_ms: Option<u64>,
    min_query_chars: Option<usize>,
    max_results: Option<usize>,
}

fn parse_socket_addr(host: &str, port: u16) -> Result<SocketAddr, String> {
    let candidate = format!("{host}:{port}");
    candidate
        .parse()
        .map_err(|err| format!("invalid address `{candidate}`: {err}"))
}

fn parse_base_url(value: &str) -> Result<Url, String> {
    let mut url = Url::parse(value.trim()).map_err(|err| format!("invalid url `{value}`: {err}"))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(format!("unsupported scheme `{}`", url.scheme()));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

fn is_valid_api_version(version: &str) -> bool {
    if matches!(version, "1" | "X") {
        return true;
    }
    let parts: Vec<&str> = version.split('-').collect();
    matches!(parts.as_slice(), [year, month, day]
        if year.len() == 4 && month.len() == 2 && day.len() == 2
            && parts.iter().all(|part| part.chars().all(|ch| ch.is_ascii_digit())))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.and_then(|value| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}

/// Resolve configuration using the supplied CLI arguments, returning both for downstream use.
pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}
