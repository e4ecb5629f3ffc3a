//! # Pipeline Stages
//!
//! The three acquisition stages, each reading the previous stage's documents
//! from an [`ObjectStore`](crate::storage::ObjectStore), calling Spotify through
//! a [`SpotifyClient`](crate::spotify::SpotifyClient), and writing its own
//! documents back.
//!
//! ```text
//! seed.json ──artists──▶ artists.json ──albums──▶ {artist}/albums.json
//!                                     └─songs───▶ {artist}/{album}/songs.json
//! ```
//!
//! Entities are processed one at a time. A failure for one artist or album is
//! recorded in the stage's [`FailureManifest`] and the stage moves on, unless
//! [`StageOptions::fail_fast`] is set. Failing to read the stage input is
//! always fatal.

mod albums;
mod artists;
mod songs;

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use thiserror::Error;

pub use albums::run_albums;
pub use artists::run_artists;
pub use songs::{ArtistBatch, run_songs};

use crate::{management::FailureManifest, spotify::SpotifyError, storage::StoreError};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Spotify(#[from] SpotifyError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("{entity}: {source}")]
    Entity {
        entity: String,
        #[source]
        source: Box<PipelineError>,
    },
}

impl PipelineError {
    /// True when the run was interrupted by a shutdown signal.
    pub fn is_cancelled(&self) -> bool {
        match self {
            PipelineError::Spotify(e) => e.is_cancelled(),
            PipelineError::Entity { source, .. } => source.is_cancelled(),
            PipelineError::Store(_) => false,
        }
    }

    fn for_entity(entity: &str, source: impl Into<PipelineError>) -> Self {
        PipelineError::Entity {
            entity: entity.to_string(),
            source: Box::new(source.into()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StageOptions {
    /// Abort on the first entity failure instead of recording it.
    /// Cancellation always aborts.
    pub fail_fast: bool,
    /// Pause between consecutive API calls.
    pub pacing: Duration,
    pub show_progress: bool,
}

impl Default for StageOptions {
    fn default() -> Self {
        Self {
            fail_fast: false,
            pacing: Duration::ZERO,
            show_progress: true,
        }
    }
}

/// What a stage run produced.
#[derive(Debug)]
pub struct StageReport {
    /// Entities processed successfully.
    pub processed: usize,
    /// Object keys written, in write order.
    pub written: Vec<String>,
    pub failures: FailureManifest,
}

impl StageReport {
    fn new(failures: FailureManifest) -> Self {
        Self {
            processed: 0,
            written: Vec::new(),
            failures,
        }
    }
}

fn progress_bar(len: usize, message: &str, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::with_template("{spinner:.blue} {msg} [{bar:30.blue}] {pos}/{len} ({eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
            .progress_chars("=> "),
    );
    pb.set_message(message.to_string());
    pb
}

async fn pace(options: &StageOptions) {
    if !options.pacing.is_zero() {
        tokio::time::sleep(options.pacing).await;
    }
}
