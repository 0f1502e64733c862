//! 🚀 esbulk-cli — the front door, the bouncer, the maitre d' of esbulk.
//!
//! 🎬 *[narrator voice]* "It all started with a simple main() function..."
//! 📦 This binary is the thin wrapper that parses flags, layers the config,
//! sets up logging, and then lets the library do the heavy lifting.
//! Like a manager. 🦆

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// 🖥️ Bulk index NDJSON documents into Elasticsearch, concurrently.
///
/// Every flag is optional on the command line: anything unset falls back to
/// `ESBULK_*` environment variables, then the `--config` TOML file, then the
/// built-in defaults. Only the flags actually given are serialized into the
/// top config layer.
#[derive(Debug, Parser, Serialize)]
#[command(name = "esbulk", version, about)]
struct Cli {
    /// TOML config file
    #[arg(long)]
    #[serde(skip)]
    config: Option<PathBuf>,

    /// Elasticsearch URL, scheme + host + port [default: http://localhost:9200]
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    server: Option<String>,

    /// index name
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    index: Option<String>,

    /// document type [default: default]
    #[arg(long = "type")]
    #[serde(rename = "doc_type", skip_serializing_if = "Option::is_none")]
    doc_type: Option<String>,

    /// bulk batch size [default: 1000]
    #[arg(long = "size")]
    #[serde(rename = "batch_size", skip_serializing_if = "Option::is_none")]
    batch_size: Option<usize>,

    /// number of workers [default: number of CPUs]
    #[arg(short = 'w', long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    workers: Option<usize>,

    /// intake queue capacity [default: number of workers]
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    queue_capacity: Option<usize>,

    /// name of the field to use as document id
    #[arg(long = "id")]
    #[serde(rename = "id_field", skip_serializing_if = "Option::is_none")]
    id_field: Option<String>,

    /// http basic auth, username:password, like curl -u
    #[arg(short = 'u', long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    user: Option<String>,

    /// mapping string or filename to apply before indexing
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    mapping: Option<String>,

    /// output progress and a summary
    #[arg(long)]
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    verbose: bool,

    /// purge the index before indexing
    #[arg(long)]
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    purge: bool,

    /// input is gzipped
    #[arg(short = 'z', long)]
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    gzip: bool,

    /// NDJSON input file
    #[serde(skip_serializing_if = "Option::is_none")]
    input: Option<PathBuf>,
}

/// 🚀 main() — where it all begins. The "I pressed F5 and held my breath" moment.
///
/// 🔧 Steps:
/// 1. Parse flags
/// 2. Layer the config (defaults, TOML, env, flags)
/// 3. Init tracing, louder when verbose
/// 4. Run the thing (send it and pray 🙏)
/// 5. Handle errors (cry)
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let app_config = esbulk::load_config(cli.config.as_deref(), &cli)
        .context("💀 In esbulk-cli, main, we couldn't load the config. Check the flags, the ESBULK_* variables and the config file, in that order of suspicion")?;

    // 📡 RUST_LOG wins; otherwise --verbose picks between info and warn
    let fallback = if app_config.verbose { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.config.as_deref() {
        Some(path) => info!("🔧 configuration loaded from {}, ESBULK_* and flags", path.display()),
        None => info!("🔧 configuration loaded from ESBULK_* and flags"),
    }

    let verbose = app_config.verbose;
    let result = esbulk::run(app_config).await;

    match result {
        Ok(summary) => {
            if verbose {
                info!("📊 {}", summary.summary_line());
                info!("\n{}", summary.render_table());
            }
            if summary.has_losses() {
                warn!(
                    "⚠️ not every document made it: {} malformed, {} rejected, {} lost with failed batches",
                    summary.totals.docs_malformed,
                    summary.totals.docs_rejected,
                    summary.totals.docs_lost
                );
            }
            Ok(())
        }
        Err(err) => {
            error!("💀 error: {}", err);
            // -- 🧅 peel the onion of sadness, one tear-jerking layer at a time
            let mut the_vibes_are_giving_connection_issues = false;
            for cause in err.chain().skip(1) {
                error!("⚠️  cause: {}", cause);
                let cause_str = cause.to_string();
                if cause_str.contains("error sending request")
                    || cause_str.contains("connection refused")
                    || cause_str.contains("Connection refused")
                    || cause_str.contains("tcp connect error")
                    || cause_str.contains("dns error")
                {
                    the_vibes_are_giving_connection_issues = true;
                }
            }

            // -- 📡 if it smells like a connection problem, it's probably a connection problem
            if the_vibes_are_giving_connection_issues {
                error!(
                    "🔧 hint: looks like Elasticsearch isn't reachable. \
                    Double-check --server and that the cluster is actually running. \
                    If you're using Docker, try `docker ps` to see what's up. ☕"
                );
            }

            // 🗑️ Exit with prejudice. Process exitus maximus.
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn the_one_where_only_given_flags_reach_the_config() {
        let cli = Cli::parse_from(["esbulk", "--index", "books", "--size", "10", "-z", "in.ndjson.gz"]);
        let app_config = esbulk::load_config(None, &cli).expect("config should load");

        assert_eq!(app_config.index, "books");
        assert_eq!(app_config.batch_size, 10);
        assert!(app_config.gzip);
        assert!(!app_config.purge);
        assert_eq!(app_config.input, Some(PathBuf::from("in.ndjson.gz")));
        assert_eq!(app_config.doc_type, "default", "unset flag keeps the default");
    }

    #[test]
    fn the_one_where_the_old_flag_names_still_work() {
        let cli = Cli::parse_from([
            "esbulk", "--type", "book", "--id", "isbn", "-w", "3", "-u", "elastic:changeme", "x.ndjson",
        ]);
        assert_eq!(cli.doc_type.as_deref(), Some("book"));
        assert_eq!(cli.id_field.as_deref(), Some("isbn"));
        assert_eq!(cli.workers, Some(3));
        assert_eq!(cli.user.as_deref(), Some("elastic:changeme"));
    }
}
