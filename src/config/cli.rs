use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, builder::BoolishValueParser};

/// Command-line arguments for the nostalgia binary.
#[derive(Debug, Parser)]
#[command(
    name = "nostalgia",
    version,
    about = "Numbers & Nostalgia baseball history site"
)]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "NOSTALGIA_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run the public HTTP site.
    Serve(Box<ServeArgs>),
    /// Search published articles interactively; each stdin line replaces the query.
    Search(SearchArgs),
    /// Print the table of contents of a published article.
    Toc(TocArgs),
}

#[derive(Debug, Args, Default, Clone)]
pub struct StoreOverrides {
    /// Override the content store project id.
    #[arg(long = "store-project-id", value_name = "ID")]
    pub project_id: Option<String>,

    /// Override the content store dataset.
    #[arg(long = "store-dataset", value_name = "NAME")]
    pub dataset: Option<String>,

    /// Override the read token sent to the content store.
    #[arg(long = "store-token", value_name = "TOKEN")]
    pub token: Option<String>,

    /// Read through the store's CDN (true/false).
    #[arg(
        long = "store-use-cdn",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub use_cdn: Option<bool>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeArgs {
    #[command(flatten)]
    pub overrides: ServeOverrides,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeOverrides {
    #[command(flatten)]
    pub store: StoreOverrides,

    /// Override the listener host.
    #[arg(long = "server-host", value_name = "HOST")]
    pub server_host: Option<String>,

    /// Override the listener port.
    #[arg(long = "server-port", value_name = "PORT")]
    pub server_port: Option<u16>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Emit logs as JSON (true/false).
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,

    /// Enable or disable the in-process query cache (true/false).
    #[arg(
        long = "cache-enabled",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub cache_enabled: Option<bool>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct SearchArgs {
    #[command(flatten)]
    pub store: StoreOverrides,
}

#[derive(Debug, Args, Clone)]
pub struct TocArgs {
    #[command(flatten)]
    pub store: StoreOverrides,

    /// Slug of the article to inspect.
    #[arg(value_name = "SLUG")]
    pub slug: String,
}
