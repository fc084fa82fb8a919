use super::*;

fn raw_with_project() -> RawSettings {
    let mut raw = RawSettings::default();
    raw.store.project_id = Some("abc123".to_string());
    raw
}

#[test]
fn defaults_are_applied() {
    let settings = Settings::from_raw(raw_with_project()).expect("valid settings");

    assert_eq!(settings.server.public_addr.to_string(), "127.0.0.1:3000");
    assert_eq!(settings.server.public_site_url.as_str(), "http://localhost:3000/");
    assert_eq!(settings.server.site_title, "Numbers & Nostalgia");
    assert_eq!(settings.store.dataset, "production");
    assert_eq!(settings.store.api_version, "2024-01-01");
    assert!(settings.store.use_cdn);
    assert!(settings.store.token.is_none());
    assert_eq!(settings.store.request_timeout, Duration::from_secs(10));
    assert!(settings.cache.enabled);
    assert_eq!(settings.cache.max_entries, 512);
    assert_eq!(settings.cache.listing_revalidate, Duration::from_secs(60));
    assert_eq!(settings.cache.entity_revalidate, Duration::from_secs(900));
    assert_eq!(settings.search.debounce, Duration::from_millis(300));
    assert_eq!(settings.search.min_query_chars, 2);
    assert_eq!(settings.search.max_results, 5);
    assert_eq!(settings.logging.level, LevelFilter::INFO);
    assert!(matches!(settings.logging.format, LogFormat::Compact));
}

#[test]
fn project_id_is_required() {
    let err = Settings::from_raw(RawSettings::default()).expect_err("missing project");
    assert!(matches!(err, LoadError::Invalid { key: "store.project_id", .. }));

    let mut raw = RawSettings::default();
    raw.store.project_id = Some("   ".to_string());
    assert!(Settings::from_raw(raw).is_err());
}

#[test]
fn project_id_rejects_uppercase_and_punctuation() {
    for project in ["ABC123", "abc.123", "abc 123"] {
        let mut raw = RawSettings::default();
        raw.store.project_id = Some(project.to_string());
        let err = Settings::from_raw(raw).expect_err("invalid project id");
        assert!(matches!(err, LoadError::Invalid { key: "store.project_id", .. }));
    }
}

#[test]
fn api_version_accepts_dates_and_named_versions() {
    for (input, expected) in [
        ("2021-10-21", "2021-10-21"),
        ("v2023-05-03", "2023-05-03"),
        ("X", "X"),
        ("1", "1"),
    ] {
        let mut raw = raw_with_project();
        raw.store.api_version = Some(input.to_string());
        let settings = Settings::from_raw(raw).expect("valid api version");
        assert_eq!(settings.store.api_version, expected);
    }

    for input in ["2021-1-1", "latest", "2021/10/21"] {
        let mut raw = raw_with_project();
        raw.store.api_version = Some(input.to_string());
        let err = Settings::from_raw(raw).expect_err("invalid api version");
        assert!(matches!(err, LoadError::Invalid { key: "store.api_version", .. }));
    }
}

#[test]
fn base_urls_gain_trailing_slash() {
    let mut raw = raw_with_project();
    raw.server.public_site_url = Some("https://numbersandnostalgia.com".to_string());
    raw.store.api_host = Some("http://127.0.0.1:4000/proxy".to_string());

    let settings = Settings::from_raw(raw).expect("valid settings");
    assert_eq!(
        settings.server.public_site_url.as_str(),
        "https://numbersandnostalgia.com/"
    );
    assert_eq!(
        settings.store.api_host.as_ref().map(Url::as_str),
        Some("http://127.0.0.1:4000/proxy/")
    );
}

#[test]
fn public_site_url_requires_http_scheme() {
    let mut raw = raw_with_project();
    raw.server.public_site_url = Some("ftp://example.com".to_string());
    let err = Settings::from_raw(raw).expect_err("invalid scheme");
    assert!(matches!(err, LoadError::Invalid { key: "server.public_site_url", .. }));
}

#[test]
fn zero_limits_are_rejected() {
    let mut raw = raw_with_project();
    raw.server.port = Some(0);
    assert!(Settings::from_raw(raw).is_err());

    let mut raw = raw_with_project();
    raw.cache.max_entries = Some(0);
    assert!(Settings::from_raw(raw).is_err());

    let mut raw = raw_with_project();
    raw.search.max_results = Some(0);
    assert!(Settings::from_raw(raw).is_err());

    let mut raw = raw_with_project();
    raw.store.request_timeout_seconds = Some(0);
    assert!(Settings::from_raw(raw).is_err());
}

#[test]
fn cli_overrides_take_highest_precedence() {
    let mut raw = raw_with_project();
    raw.server.port = Some(4000);
    raw.logging.level = Some("info".to_string());
    raw.store.use_cdn = Some(true);

    let overrides = ServeOverrides {
        server_port: Some(4321),
        log_level: Some("debug".to_string()),
        cache_enabled: Some(false),
        store: StoreOverrides {
            dataset: Some("staging".to_string()),
            use_cdn: Some(false),
            ..Default::default()
        },
        ..Default::default()
    };

    raw.apply_serve_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert_eq!(settings.server.public_addr.port(), 4321);
    assert_eq!(settings.logging.level, LevelFilter::DEBUG);
    assert!(!settings.cache.enabled);
    assert_eq!(settings.store.dataset, "staging");
    assert!(!settings.store.use_cdn);
}

#[test]
fn cli_json_logging_enforces_format() {
    let mut raw = raw_with_project();
    let overrides = ServeOverrides {
        log_json: Some(true),
        ..Default::default()
    };

    raw.apply_serve_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert!(matches!(settings.logging.format, LogFormat::Json));
}

#[test]
fn blank_token_is_treated_as_absent() {
    let mut raw = raw_with_project();
    raw.store.token = Some("  ".to_string());
    let settings = Settings::from_raw(raw).expect("valid settings");
    assert!(settings.store.token.is_none());
}

#[test]
fn default_to_serve_command() {
    let args = CliArgs::parse_from(["nostalgia"]);
    let command = args
        .command
        .unwrap_or(Command::Serve(Box::<ServeArgs>::default()));
    assert!(matches!(command, Command::Serve(_)));
}

#[test]
fn parse_serve_overrides() {
    let args = CliArgs::parse_from([
        "nostalgia",
        "serve",
        "--server-host",
        "0.0.0.0",
        "--server-port",
        "8080",
        "--store-project-id",
        "abc123",
        "--store-use-cdn",
        "false",
        "--cache-enabled",
        "no",
        "--log-json",
        "1",
    ]);

    match args.command.expect("serve command") {
        Command::Serve(serve) => {
            let overrides = serve.overrides;
            assert_eq!(overrides.server_host.as_deref(), Some("0.0.0.0"));
            assert_eq!(overrides.server_port, Some(8080));
            assert_eq!(overrides.store.project_id.as_deref(), Some("abc123"));
            assert_eq!(overrides.store.use_cdn, Some(false));
            assert_eq!(overrides.cache_enabled, Some(false));
            assert_eq!(overrides.log_json, Some(true));
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn parse_toc_arguments() {
    let args = CliArgs::parse_from([
        "nostalgia",
        "toc",
        "--store-dataset",
        "staging",
        "ruth-calls-his-shot",
    ]);

    match args.command.expect("toc command") {
        Command::Toc(toc) => {
            assert_eq!(toc.slug, "ruth-calls-his-shot");
            assert_eq!(toc.store.dataset.as_deref(), Some("staging"));
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn parse_search_arguments() {
    let args = CliArgs::parse_from(["nostalgia", "search", "--store-token", "sk-read"]);
    match args.command.expect("search command") {
        Command::Search(search) => {
            assert_eq!(search.store.token.as_deref(), Some("sk-read"));
        }
        other => panic!("unexpected command: {other:?}"),
    }
}
