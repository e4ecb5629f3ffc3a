use tracing::{info, warn};

use super::{PipelineError, StageOptions, StageReport, pace, progress_bar};
use crate::{
    fetch::{Sleeper, Transport},
    management::{BlobLayout, FailureManifest, Stage},
    spotify::{SpotifyClient, artists::MAX_ARTIST_IDS},
    storage::{self, ObjectStore},
    types::{ArtistRecord, SeedArtist},
    utils,
};

/// Enriches the seed ranking with Spotify catalog data and writes `artists.json`.
///
/// Artists are looked up in batches of 50. When a whole batch fails, every
/// artist in it is recorded as failed; ids unknown to Spotify are recorded
/// one by one. `artists.json` only contains successfully enriched artists.
///
/// # Arguments
///
/// * `client` - Spotify client used for the batched artist lookups
/// * `store` - Bucket holding the seed ranking and receiving the output
/// * `layout` - Object keys for the ranking page being processed
/// * `options` - Fail-fast, pacing and progress settings
///
/// # Returns
///
/// A [`StageReport`] listing the written keys, the number of enriched artists
/// and the failure manifest (also persisted when not empty).
///
/// # Errors
///
/// This function will return an error if:
/// - The seed ranking cannot be read or decoded
/// - A batch fails while `fail_fast` is set, or the run is cancelled
/// - `artists.json` or the failure manifest cannot be written
pub async fn run_artists<T, S, St>(
    client: &SpotifyClient<T, S>,
    store: &St,
    layout: &BlobLayout,
    options: &StageOptions,
) -> Result<StageReport, PipelineError>
where
    T: Transport,
    S: Sleeper,
    St: ObjectStore,
{
    let seeds: Vec<SeedArtist> = storage::read_json(store, &layout.seed()).await?;
    info!(stage = %Stage::Artists, artists = seeds.len(), "processing seed artists");

    let mut report = StageReport::new(FailureManifest::new(Stage::Artists));
    let mut records: Vec<ArtistRecord> = Vec::with_capacity(seeds.len());
    let pb = progress_bar(seeds.len(), "Enriching artists", options.show_progress);

    for (i, batch) in seeds.chunks(MAX_ARTIST_IDS).enumerate() {
        if i > 0 {
            pace(options).await;
        }

        let ids: Vec<String> = batch.iter().map(|s| s.spotify_id.clone()).collect();
        match client.several_artists(&ids).await {
            Ok(found) => {
                let processed_at = utils::processed_at_now();
                for (seed, artist) in batch.iter().zip(found) {
                    match artist {
                        Some(artist) => {
                            records.push(utils::artist_record(seed, &artist, &processed_at));
                            report.processed += 1;
                        }
                        None => {
                            warn!(spotify_id = %seed.spotify_id, "artist not found on Spotify");
                            report.failures.add(
                                &seed.spotify_id,
                                &seed.artist_name,
                                "artist not found on Spotify",
                            );
                        }
                    }
                }
            }
            Err(e) => {
                if options.fail_fast || e.is_cancelled() {
                    pb.finish_and_clear();
                    return Err(PipelineError::for_entity(&format!("artist batch {}", i + 1), e));
                }
                warn!(batch = i + 1, error = %e, "artist batch failed");
                let message = e.to_string();
                for seed in batch {
                    report
                        .failures
                        .add(&seed.spotify_id, &seed.artist_name, &message);
                }
            }
        }
        pb.inc(batch.len() as u64);
    }
    pb.finish_and_clear();

    let key = layout.artists();
    storage::write_json(store, &key, &records).await?;
    report.written.push(key);

    if let Some(key) = report.failures.persist(store, layout).await? {
        report.written.push(key);
    }

    info!(
        stage = %Stage::Artists,
        processed = report.processed,
        failed = report.failures.len(),
        "stage finished"
    );
    Ok(report)
}
