use tracing::{info, warn};

use super::{PipelineError, StageOptions, StageReport, pace, progress_bar};
use crate::{
    fetch::{Sleeper, Transport},
    management::{BlobLayout, FailureManifest, Stage},
    spotify::{
        SpotifyClient,
        albums::{DEFAULT_INCLUDE_GROUPS, DEFAULT_MARKET},
    },
    storage::{self, ObjectStore},
    types::{AlbumRecord, ArtistRecord},
    utils,
};

/// Fetches each artist's discography and writes one `albums.json` per artist.
///
/// `num_artists` limits the run to the first N artists of `artists.json`
/// (0 processes all of them).
///
/// # Arguments
///
/// * `client` - Spotify client used to list each artist's albums
/// * `store` - Bucket holding `artists.json` and receiving the output
/// * `layout` - Object keys for the ranking page being processed
/// * `num_artists` - How many artists to process, 0 for all
/// * `options` - Fail-fast, pacing and progress settings
///
/// # Returns
///
/// A [`StageReport`] with one written key per processed artist and the
/// failure manifest (also persisted when not empty).
///
/// # Errors
///
/// This function will return an error if:
/// - `artists.json` cannot be read or decoded
/// - An artist fails while `fail_fast` is set, or the run is cancelled
/// - The failure manifest cannot be written
pub async fn run_albums<T, S, St>(
    client: &SpotifyClient<T, S>,
    store: &St,
    layout: &BlobLayout,
    num_artists: usize,
    options: &StageOptions,
) -> Result<StageReport, PipelineError>
where
    T: Transport,
    S: Sleeper,
    St: ObjectStore,
{
    let all_artists: Vec<ArtistRecord> = storage::read_json(store, &layout.artists()).await?;
    let artists = utils::take_first(&all_artists, num_artists);
    info!(stage = %Stage::Albums, artists = artists.len(), "fetching albums");

    let mut report = StageReport::new(FailureManifest::new(Stage::Albums));
    let pb = progress_bar(artists.len(), "Fetching albums", options.show_progress);

    for (i, artist) in artists.iter().enumerate() {
        if i > 0 {
            pace(options).await;
        }
        pb.set_message(artist.artist_name.clone());

        match albums_for_artist(client, store, layout, artist).await {
            Ok((key, count)) => {
                info!(artist = %artist.artist_name, albums = count, "albums written");
                report.written.push(key);
                report.processed += 1;
            }
            Err(e) => {
                if options.fail_fast || e.is_cancelled() {
                    pb.finish_and_clear();
                    return Err(PipelineError::for_entity(&artist.artist_name, e));
                }
                warn!(artist = %artist.artist_name, error = %e, "skipping artist");
                report
                    .failures
                    .add(&artist.spotify_id, &artist.artist_name, e);
            }
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    if let Some(key) = report.failures.persist(store, layout).await? {
        report.written.push(key);
    }
    Ok(report)
}

async fn albums_for_artist<T, S, St>(
    client: &SpotifyClient<T, S>,
    store: &St,
    layout: &BlobLayout,
    artist: &ArtistRecord,
) -> Result<(String, usize), PipelineError>
where
    T: Transport,
    S: Sleeper,
    St: ObjectStore,
{
    let albums: Vec<AlbumRecord> = client
        .artist_albums(&artist.spotify_id, DEFAULT_INCLUDE_GROUPS, DEFAULT_MARKET)
        .await?
        .into_iter()
        .map(|album| utils::album_record(&artist.artist_name, album))
        .collect();

    let key = layout.albums(&artist.spotify_id, &artist.artist_name);
    storage::write_json(store, &key, &albums).await?;
    Ok((key, albums.len()))
}
