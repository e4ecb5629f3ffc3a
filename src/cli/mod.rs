//! # CLI Module
//!
//! Command implementations behind the `spotpipe` binary. Each stage command
//! wires configuration into a [`SpotifyClient`] and an object store, runs the
//! matching pipeline stage and turns its [`StageReport`] into console output
//! and an exit status.
//!
//! ## Commands
//!
//! - [`artists`] - enrich the seed ranking, writes `artists.json`
//! - [`albums`] - fetch discographies, writes one `albums.json` per artist
//! - [`songs`] - fetch track listings, writes one `songs.json` per album
//!
//! ## Exit Status
//!
//! A run exits with status 1 when the stage itself fails (missing input,
//! unreadable configuration, Ctrl-C) or when any entity ended up in the
//! failure manifest. The manifest is printed as a table before exiting.
//!
//! ## Dry Runs
//!
//! With `--dry-run` every read still goes to the bucket, but writes are
//! diverted into `--dry-run-dir` with the object key flattened into the file
//! name, so a run can be inspected without touching stored data.

mod albums;
mod artists;
mod songs;

use std::path::PathBuf;

use tabled::Table;

pub use albums::albums;
pub use artists::artists;
pub use songs::songs;

use crate::{
    Res, config, error,
    fetch::{CancellationToken, RetryingFetcher},
    management::Stage,
    pipeline::{PipelineError, StageOptions, StageReport},
    spotify::SpotifyClient,
    storage::{DryRunStore, LocalStore, ObjectStore, StoreError},
    success, warning,
};

/// Settings shared by every stage command.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub bucket: String,
    pub dry_run: bool,
    pub dry_run_dir: PathBuf,
    pub fail_fast: bool,
    pub shutdown: CancellationToken,
}

impl RunContext {
    fn stage_options(&self, pacing: std::time::Duration) -> StageOptions {
        StageOptions {
            fail_fast: self.fail_fast,
            pacing,
            show_progress: true,
        }
    }

    fn store(&self) -> RunStore {
        let local = LocalStore::new(config::storage_root(), &self.bucket);
        if self.dry_run {
            RunStore::DryRun(DryRunStore::new(local, &self.dry_run_dir))
        } else {
            RunStore::Local(local)
        }
    }
}

/// The store a command runs against, picked at runtime.
pub enum RunStore {
    Local(LocalStore),
    DryRun(DryRunStore<LocalStore>),
}

impl ObjectStore for RunStore {
    async fn get(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        match self {
            RunStore::Local(store) => store.get(key).await,
            RunStore::DryRun(store) => store.get(key).await,
        }
    }

    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<(), StoreError> {
        match self {
            RunStore::Local(store) => store.put(key, bytes, content_type).await,
            RunStore::DryRun(store) => store.put(key, bytes, content_type).await,
        }
    }
}

/// Builds the Spotify client from the environment.
pub fn build_client(shutdown: &CancellationToken) -> Res<SpotifyClient> {
    let token = config::spotify_access_token()?;
    let policy = config::retry_policy()?;
    let timeout = config::request_timeout()?;

    let fetcher = RetryingFetcher::new(policy).with_shutdown(shutdown.clone());
    Ok(SpotifyClient::new(fetcher, &config::spotify_apiurl(), &token).with_timeout(timeout))
}

fn client_or_exit(ctx: &RunContext) -> SpotifyClient {
    match build_client(&ctx.shutdown) {
        Ok(client) => client,
        Err(e) => error!("Cannot set up the Spotify client. Err: {}", e),
    }
}

fn finish(stage: Stage, store: &RunStore, result: Result<StageReport, PipelineError>) {
    let report = match result {
        Ok(report) => report,
        Err(e) if e.is_cancelled() => error!("{} stage interrupted. Err: {}", stage, e),
        Err(e) => error!("{} stage failed. Err: {}", stage, e),
    };

    if let RunStore::DryRun(store) = store {
        warning!(
            "Dry run: {} objects written to {}",
            store.written_keys().len(),
            store.out_dir().display()
        );
    }

    if report.failures.is_empty() {
        success!(
            "{} stage finished: {} processed, {} objects written",
            stage,
            report.processed,
            report.written.len()
        );
        return;
    }

    warning!(
        "{} stage finished with {} failures ({} processed)",
        stage,
        report.failures.len(),
        report.processed
    );
    println!("{}", Table::new(report.failures.table_rows()));
    error!("Some {} could not be processed", stage);
}
