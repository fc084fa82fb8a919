use std::{future::IntoFuture, process, sync::Arc};

use nostalgia::{
    application::{
        chrome::ChromeService,
        error::AppError,
        metadata::SiteIdentity,
        queries::{ContentQueries, QueryWindows},
        repos::ContentStore,
        search::{SearchConfig, SearchService, SearchSession, SearchState},
        site::SiteService,
    },
    cache::{CacheConfig, CachedContentStore},
    config,
    domain::{image::ImageUrlBuilder, toc::TableOfContents},
    infra::{
        error::InfraError,
        http::{self, HttpState},
        store::HttpContentStore,
        telemetry,
    },
};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::oneshot;
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
        config::Command::Search(_) => run_search(settings).await,
        config::Command::Toc(args) => run_toc(settings, &args.slug).await,
    }
}

struct ContentStack {
    queries: ContentQueries,
    images: ImageUrlBuilder,
}

fn build_content_stack(settings: &config::Settings) -> Result<ContentStack, AppError> {
    let client = HttpContentStore::new(&settings.store)?;
    info!(
        endpoint = %client.endpoint(),
        cache_enabled = settings.cache.enabled,
        "content store configured"
    );

    let store: Arc<dyn ContentStore> = Arc::new(CachedContentStore::new(
        Arc::new(client),
        &CacheConfig::from(&settings.cache),
    ));
    let queries = ContentQueries::new(store, QueryWindows::from(&settings.cache));
    let images = ImageUrlBuilder::new(
        settings.store.project_id.clone(),
        settings.store.dataset.clone(),
    )?;

    Ok(ContentStack { queries, images })
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let ContentStack { queries, images } = build_content_stack(&settings)?;

    let search = Arc::new(SearchService::new(
        queries.clone(),
        SearchConfig::from(&settings.search),
    ));
    let state = HttpState {
        site: Arc::new(SiteService::new(queries, images, search)),
        chrome: Arc::new(ChromeService::new(SiteIdentity::from(&settings.server))),
    };

    serve_http(&settings, state).await
}

async fn serve_http(settings: &config::Settings, state: HttpState) -> Result<(), AppError> {
    let router = http::build_router(state);
    let addr = settings.server.public_addr;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|err| AppError::from(InfraError::bind(addr, err)))?;
    info!(addr = %addr, "listening");

    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let server = axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(async move {
            let _ = stop_rx.await;
        })
        .into_future();
    let mut server = tokio::spawn(server);

    tokio::select! {
        joined = &mut server => return server_outcome(joined),
        signal = tokio::signal::ctrl_c() => {
            if let Err(err) = signal {
                warn!(error = %err, "failed to listen for shutdown signal");
            }
        }
    }

    info!(
        grace_secs = settings.server.graceful_shutdown.as_secs(),
        "shutdown requested; draining connections"
    );
    let _ = stop_tx.send(());

    match tokio::time::timeout(settings.server.graceful_shutdown, &mut server).await {
        Ok(joined) => server_outcome(joined),
        Err(_) => {
            warn!("graceful shutdown timed out; aborting open connections");
            server.abort();
            Ok(())
        }
    }
}

fn io_failure(err: std::io::Error) -> AppError {
    AppError::from(InfraError::from(err))
}

fn server_outcome(
    joined: Result<std::io::Result<()>, tokio::task::JoinError>,
) -> Result<(), AppError> {
    match joined {
        Ok(Ok(())) => Ok(()),
        Ok(Err(err)) => Err(io_failure(err)),
        Err(err) => Err(AppError::unexpected(format!("server task failed: {err}"))),
    }
}

async fn run_search(settings: config::Settings) -> Result<(), AppError> {
    let ContentStack { queries, .. } = build_content_stack(&settings)?;
    let config = SearchConfig::from(&settings.search);
    let session = SearchSession::new(Arc::new(SearchService::new(queries, config)));

    let mut updates = session.subscribe();
    let printer = tokio::spawn(async move {
        let mut stdout = tokio::io::stdout();
        while updates.changed().await.is_ok() {
            let state = updates.borrow_and_update().clone();
            if state.searching {
                continue;
            }
            let rendered = format_search_state(&state, config.min_query_chars);
            if let Err(err) = stdout.write_all(rendered.as_bytes()).await {
                warn!(error = %err, "failed to write search results");
                break;
            }
            let _ = stdout.flush().await;
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines
        .next_line()
        .await
        .map_err(io_failure)?
    {
        session.submit(line);
    }

    session
        .subscribe()
        .wait_for(|state| !state.searching)
        .await
        .map_err(|_| AppError::unexpected("search session closed before settling"))?;
    drop(session);

    printer
        .await
        .map_err(|err| AppError::unexpected(format!("search printer failed: {err}")))
}

fn format_search_state(state: &SearchState, min_query_chars: usize) -> String {
    let query = state.query.trim();
    if query.chars().count() < min_query_chars {
        return format!("(type at least {min_query_chars} characters to search)\n");
    }
    if state.results.is_empty() {
        return format!("no articles match \"{query}\"\n");
    }

    let mut out = format!("{} result(s) for \"{query}\"\n", state.results.len());
    for article in &state.results {
        out.push_str(&format!("  {}  /articles/{}\n", article.title, article.slug));
    }
    out
}

async fn run_toc(settings: config::Settings, slug: &str) -> Result<(), AppError> {
    let ContentStack { queries, .. } = build_content_stack(&settings)?;

    let article = queries
        .article_by_slug(slug)
        .await?
        .ok_or_else(|| AppError::not_found(format!("article `{slug}`")))?;
    let toc = TableOfContents::extract(&article.body);

    let mut out = format!("{}\n", article.title);
    if toc.is_empty() {
        out.push_str("  (no headings)\n");
    }
    for (depth, entry) in toc.flatten() {
        let indent = "  ".repeat(depth + 1);
        out.push_str(&format!("{indent}{}  #{}\n", entry.text, entry.id));
    }

    let mut stdout = tokio::io::stdout();
    stdout
        .write_all(out.as_bytes())
        .await
        .map_err(io_failure)?;
    stdout
        .flush()
        .await
        .map_err(io_failure)
}
