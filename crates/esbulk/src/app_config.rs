//! 🔧 App Configuration — the sacred flags-to-struct pipeline.
//!
//! 📡 "Config not found: We looked everywhere. Under the couch. Behind the fridge.
//! In the junk drawer. Nothing." — every developer at 3am 🦆
//!
//! 🏗️ Powered by Figment. Layers, lowest priority first:
//!   1. `AppConfig::default()`, the factory settings
//!   2. an optional TOML file
//!   3. `ESBULK_*` environment variables
//!   4. whatever the CLI actually received
//!
//! The result is immutable for the rest of the run. Nobody gets to mutate it.
//! Not the workers, not the supervisor, not you.

use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

/// 📦 The whole load, described. One struct to rule them all.
///
/// Field names double as TOML keys and as `ESBULK_<UPPERCASE>` env var names.
/// No serde aliases: figment merges every layer into one dict, and a key present
/// under both its name and an alias is a duplicate field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// 📡 scheme + host + port. One field, no separate host and port.
    pub server: String,
    /// 🎯 target index. Required. There is no default index, only disappointment.
    pub index: String,
    /// 🏷️ document type label for the action line
    pub doc_type: String,
    /// 📦 documents per bulk request
    pub batch_size: usize,
    /// 🧵 number of bulk workers
    pub workers: usize,
    /// 🚰 intake queue capacity. `None` means "same as the worker count".
    pub queue_capacity: Option<usize>,
    /// 🔑 field whose value becomes `_id`. `None` lets the cluster make one up.
    pub id_field: Option<String>,
    /// 🔒 `username:password`, curl -u style
    pub user: Option<String>,
    pub verbose: bool,
    /// 🗑️ delete the index before loading
    pub purge: bool,
    /// 📐 mapping: a path to a JSON file, or the JSON itself
    pub mapping: Option<String>,
    /// 🫁 input is gzipped
    pub gzip: bool,
    /// 📂 the NDJSON file to load
    pub input: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: "http://localhost:9200".to_string(),
            index: String::new(),
            doc_type: "default".to_string(),
            batch_size: 1000,
            // -- 🧵 one worker per core
            workers: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            queue_capacity: None,
            id_field: None,
            user: None,
            verbose: false,
            purge: false,
            mapping: None,
            gzip: false,
            input: None,
        }
    }
}

/// 🔒 Basic-auth credentials, split out of `user`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl AppConfig {
    /// ✅ Reject configurations that would fail halfway through a 40GB load.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.index.trim().is_empty() {
            bail!("💀 index name required. We can't load into the void. We tried. The void said no.");
        }
        if self.batch_size == 0 {
            bail!("💀 batch_size must be at least 1. A batch of zero is just an HTTP request with commitment issues.");
        }
        if self.workers == 0 {
            bail!("💀 workers must be at least 1. Zero workers is a union strike, not a load.");
        }
        if self.queue_capacity == Some(0) {
            bail!("💀 queue_capacity must be at least 1.");
        }
        if self.input.is_none() {
            bail!("💀 no input file given. Usage: esbulk [OPTIONS] <FILE>");
        }
        let url = reqwest::Url::parse(&self.server)
            .with_context(|| format!("💀 server '{}' is not a valid URL", self.server))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            bail!(
                "💀 server '{}' must use http or https, got '{}'",
                self.server,
                url.scheme()
            );
        }
        // -- 🔒 parse now so a typo in -u dies before any index gets touched
        self.credentials()?;
        Ok(())
    }

    /// 🔒 Split `user` into username and password.
    ///
    /// Exactly one `:` is allowed. `alice` and `alice:pass:word` are both fatal.
    pub fn credentials(&self) -> anyhow::Result<Option<Credentials>> {
        let Some(user) = self.user.as_deref() else {
            return Ok(None);
        };
        let parts: Vec<&str> = user.split(':').collect();
        match parts.as_slice() {
            [username, password] => Ok(Some(Credentials {
                username: username.to_string(),
                password: password.to_string(),
            })),
            _ => bail!("💀 http basic auth syntax is: username:password"),
        }
    }

    /// 🚰 Effective intake queue capacity.
    pub fn effective_queue_capacity(&self) -> usize {
        self.queue_capacity.unwrap_or(self.workers).max(1)
    }
}

/// 🚀 Load the config from defaults, an optional TOML file, `ESBULK_*` env vars,
/// and finally `overrides` (usually the parsed CLI flags).
///
/// `overrides` should skip fields the user never set, otherwise it flattens
/// every lower layer with its own blanks.
///
/// 💀 Returns an error if config is unparseable. The message names every source
/// we consulted, so at least you know where to look.
pub fn load_config<T: Serialize>(
    config_file_name: Option<&Path>,
    overrides: &T,
) -> anyhow::Result<AppConfig> {
    let config = Figment::from(Serialized::defaults(AppConfig::default()));

    // 🎯 TOML only if a file was actually provided. No "config.toml" assumptions.
    let config = match config_file_name {
        Some(file_name) => config.merge(Toml::file(file_name)),
        None => config,
    };

    let config = config
        .merge(Env::prefixed("ESBULK_"))
        .merge(Serialized::defaults(overrides));

    let context_msg = match config_file_name {
        Some(path) => format!(
            "💀 Failed to parse configuration from file '{}', environment variables (ESBULK_*) and flags.",
            path.display()
        ),
        None => "💀 Failed to parse configuration from environment variables (ESBULK_*) and flags."
            .to_string(),
    };

    config.extract().context(context_msg)
}
