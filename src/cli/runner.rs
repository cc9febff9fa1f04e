//! CLI runner - executes commands

use crate::cli::commands::{Cli, OutputFormat};
use crate::config::{auth_provider, Settings};
use crate::engine::{Collection, Collector, RunState};
use crate::error::Result;
use crate::fetch::PageFetcher;
use crate::http::HttpApiClient;
use crate::progress::LogProgress;
use crate::shutdown::ShutdownSignal;
use crate::store::JsonFileStore;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// CLI runner
pub struct Runner {
    cli: Cli,
    shutdown: ShutdownSignal,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self {
            cli,
            shutdown: ShutdownSignal::new(),
        }
    }

    /// Use an externally owned shutdown signal
    #[must_use]
    pub fn with_shutdown(mut self, shutdown: ShutdownSignal) -> Self {
        self.shutdown = shutdown;
        self
    }

    /// Run the CLI command and return the terminal state of the collection.
    ///
    /// The record is saved for `Done` and `Partial` runs alike.
    pub async fn run(&self) -> Result<RunState> {
        let settings = Settings::load(self.cli.config.as_deref())?;
        let client = Arc::new(HttpApiClient::with_config(settings.http_client_config())?);
        let auth = auth_provider(self.cli.token.as_deref());
        let fetcher = PageFetcher::new(client, auth).with_config(settings.fetcher_config());

        let listener = self.shutdown.listen_for_ctrl_c();
        let collection = self.collect(fetcher, &settings).await;
        listener.abort();
        let collection = collection?;

        let key = self.cli.command.output_key();
        let store = JsonFileStore::new(self.output_dir(&settings));
        collection.save(&store, &key).await?;
        let path = store.path_for(&key)?;

        match collection.state {
            RunState::Done => info!(key = key.as_str(), path = %path.display(), "Saved collection"),
            _ => warn!(key = key.as_str(), path = %path.display(), "Saved partial collection"),
        }
        self.output_message(&summary(&key, &path, &collection));
        Ok(collection.state)
    }

    /// Build the collector for the parsed command and drive it to completion
    async fn collect(&self, fetcher: PageFetcher, settings: &Settings) -> Result<Collection> {
        let command = &self.cli.command;
        let args = command.collect_args();
        let kind = command.kind();

        let mut collector = Collector::new(fetcher, kind, command.target())
            .with_config(settings.collector_config())
            .with_count(args.count)
            .with_params(args.overrides())
            .with_progress(Arc::new(LogProgress::new(kind.as_str())));
        if let Some(extended) = args.extended_mode() {
            collector = collector.with_extended(extended);
        }
        if let Some(since) = command.since() {
            collector = collector.with_since(since);
        }

        collector.run_until_shutdown(&self.shutdown).await
    }

    /// Output directory: `--output-dir` wins over the settings file
    fn output_dir(&self, settings: &Settings) -> PathBuf {
        self.cli
            .output_dir
            .clone()
            .unwrap_or_else(|| settings.output.dir.clone())
    }

    /// Output a message
    fn output_message(&self, msg: &Value) {
        match self.cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string(msg).unwrap_or_default());
            }
            OutputFormat::Pretty => {
                println!("{}", serde_json::to_string_pretty(msg).unwrap_or_default());
            }
        }
    }
}

/// One-object summary of a finished run
pub fn summary(key: &str, path: &std::path::Path, collection: &Collection) -> Value {
    json!({
        "key": key,
        "path": path.display().to_string(),
        "kind": collection.kind,
        "state": collection.state,
        "stop_reason": collection.stop_reason,
        "loaded_count": collection.aggregate.loaded_count,
        "total_count": collection.aggregate.total_count,
        "error": collection.error.as_ref().map(ToString::to_string),
        "stats": collection.stats,
    })
}
