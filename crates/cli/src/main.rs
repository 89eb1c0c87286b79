//! Scray query CLI entry point.
//!
//! This binary is the composition root. Responsibilities:
//!
//! 1. **Parse configuration** — command-line flags (with `SCRAY_*` environment
//!    fallbacks) and an optional JSON transport configuration file.
//! 2. **Wire observability** — configure `tracing-subscriber` with an
//!    `EnvFilter` (`RUST_LOG`, default `info`) and either the human-readable
//!    or the JSON formatting layer. Logs go to stderr.
//! 3. **Construct infrastructure** — build an `HttpConnector` and inject it
//!    into a `StatelessQueryAdapter`.
//! 4. **Run** — submit one query, then fetch `--pages` pages in order and
//!    print each as one JSON line on stdout: `{"page": n, "frame": ...}`.

use std::io::Write;
use std::path::{Path, PathBuf};

use adapter::StatelessQueryAdapter;
use anyhow::{Context, Result};
use clap::Parser;
use http_transport::{HttpConnector, HttpTransportConfig};
use qmodel::{Query, QueryAdapter, QueryTimeout};
use tracing::info;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Submit a query to a Scray query service and print its result pages.
#[derive(Debug, Parser)]
#[command(name = "scray-query", version)]
struct Cli {
    /// Query service address (`host:port` or a full URL).
    #[arg(long, env = "SCRAY_ENDPOINT")]
    endpoint: String,

    /// Query payload as JSON text.
    #[arg(long, conflicts_with = "query_file", required_unless_present = "query_file")]
    query: Option<String>,

    /// File containing the query payload as JSON.
    #[arg(long)]
    query_file: Option<PathBuf>,

    /// Number of result pages to fetch.
    #[arg(long, default_value_t = 1)]
    pages: u32,

    /// Per-call timeout in whole seconds.
    #[arg(long, env = "SCRAY_TIMEOUT_SECS", default_value_t = 30)]
    timeout_secs: u32,

    /// JSON file with HTTP transport settings.
    #[arg(long)]
    transport_config: Option<PathBuf>,

    /// Emit logs as JSON.
    #[arg(long)]
    log_json: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let config = load_transport_config(cli.transport_config.as_deref())?;
    let connector = HttpConnector::new(config).context("invalid transport configuration")?;
    let query = load_query(cli.query.as_deref(), cli.query_file.as_deref())?;
    let timeout = QueryTimeout::from_secs(cli.timeout_secs);

    let mut adapter = StatelessQueryAdapter::new(cli.endpoint, connector);
    let id = adapter
        .query(query, timeout)
        .context("query submission failed")?;
    info!(correlation_id = %id, endpoint = %adapter.endpoint(), "Query accepted");

    let mut out = std::io::stdout().lock();
    for _ in 0..cli.pages {
        let page = adapter.page_cursor();
        let frame = adapter
            .get_results(id, timeout)
            .with_context(|| format!("fetching page {page} failed"))?;

        serde_json::to_writer(&mut out, &serde_json::json!({ "page": page, "frame": frame }))?;
        writeln!(out)?;
    }
    out.flush()?;

    Ok(())
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry.with(fmt::layer().with_writer(std::io::stderr)).init();
    }
}

fn load_transport_config(path: Option<&Path>) -> Result<HttpTransportConfig> {
    let Some(path) = path else {
        return Ok(HttpTransportConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading transport config {}", path.display()))?;
    HttpTransportConfig::from_json_str(&text)
        .with_context(|| format!("loading transport config {}", path.display()))
}

fn load_query(inline: Option<&str>, file: Option<&Path>) -> Result<Query> {
    let text = match (inline, file) {
        (Some(text), _) => text.to_string(),
        (None, Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("reading query file {}", path.display()))?,
        (None, None) => anyhow::bail!("either --query or --query-file is required"),
    };
    Query::from_json_str(&text).context("query is not valid JSON")
}
