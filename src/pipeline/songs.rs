use tracing::{info, warn};

use super::{PipelineError, StageOptions, StageReport, pace, progress_bar};
use crate::{
    fetch::{Sleeper, Transport},
    management::{BlobLayout, FailureManifest, Stage},
    spotify::SpotifyClient,
    storage::{self, ObjectStore},
    types::{AlbumRecord, ArtistRecord, SongRecord},
    utils,
};

/// Which slice of `artists.json` a songs run covers.
#[derive(Debug, Clone, Copy)]
pub struct ArtistBatch {
    /// 1-based.
    pub number: usize,
    /// 0 means all artists form a single batch.
    pub size: usize,
}

impl Default for ArtistBatch {
    fn default() -> Self {
        Self { number: 1, size: 0 }
    }
}

/// Fetches the tracks of every full-length album and writes one `songs.json` per album.
///
/// Each artist's `albums.json` must already exist. A missing or unreadable
/// albums document is recorded against the artist; a failed track listing is
/// recorded against the album, and the artist's other albums still run.
///
/// # Arguments
///
/// * `client` - Spotify client used to list album tracks
/// * `store` - Bucket holding the artist and album documents
/// * `layout` - Object keys for the ranking page being processed
/// * `batch` - Slice of `artists.json` to cover
/// * `options` - Fail-fast, pacing and progress settings
///
/// # Returns
///
/// A [`StageReport`] with one written key per processed album and the
/// failure manifest (also persisted when not empty).
///
/// # Errors
///
/// This function will return an error if:
/// - `artists.json` cannot be read or decoded
/// - An artist or album fails while `fail_fast` is set
/// - The run is cancelled while fetching tracks
/// - The failure manifest cannot be written
pub async fn run_songs<T, S, St>(
    client: &SpotifyClient<T, S>,
    store: &St,
    layout: &BlobLayout,
    batch: ArtistBatch,
    options: &StageOptions,
) -> Result<StageReport, PipelineError>
where
    T: Transport,
    S: Sleeper,
    St: ObjectStore,
{
    let all_artists: Vec<ArtistRecord> = storage::read_json(store, &layout.artists()).await?;
    let artists = utils::batch_slice(&all_artists, batch.number, batch.size);
    info!(
        stage = %Stage::Songs,
        batch = batch.number,
        artists = artists.len(),
        "fetching songs"
    );

    let mut report = StageReport::new(FailureManifest::new(Stage::Songs));
    let pb = progress_bar(artists.len(), "Fetching songs", options.show_progress);
    let mut first_call = true;

    for artist in artists {
        pb.set_message(artist.artist_name.clone());

        let albums_key = layout.albums(&artist.spotify_id, &artist.artist_name);
        let albums: Vec<AlbumRecord> = match storage::read_json(store, &albums_key).await {
            Ok(albums) => utils::full_albums(albums),
            Err(e) => {
                if options.fail_fast {
                    pb.finish_and_clear();
                    return Err(PipelineError::for_entity(&artist.artist_name, e));
                }
                warn!(artist = %artist.artist_name, error = %e, "cannot read albums");
                report
                    .failures
                    .add(&artist.spotify_id, &artist.artist_name, e);
                pb.inc(1);
                continue;
            }
        };

        let mut written = 0usize;
        for album in &albums {
            if !first_call {
                pace(options).await;
            }
            first_call = false;

            match songs_for_album(client, store, layout, artist, album).await {
                Ok(key) => {
                    report.written.push(key);
                    report.processed += 1;
                    written += 1;
                }
                Err(e) => {
                    if options.fail_fast || e.is_cancelled() {
                        pb.finish_and_clear();
                        return Err(PipelineError::for_entity(&album.name, e));
                    }
                    warn!(album = %album.name, error = %e, "skipping album");
                    report.failures.add(&album.spotify_id, &album.name, e);
                }
            }
        }

        info!(
            artist = %artist.artist_name,
            albums = written,
            "songs written"
        );
        pb.inc(1);
    }
    pb.finish_and_clear();

    if let Some(key) = report.failures.persist(store, layout).await? {
        report.written.push(key);
    }
    Ok(report)
}

async fn songs_for_album<T, S, St>(
    client: &SpotifyClient<T, S>,
    store: &St,
    layout: &BlobLayout,
    artist: &ArtistRecord,
    album: &AlbumRecord,
) -> Result<String, PipelineError>
where
    T: Transport,
    S: Sleeper,
    St: ObjectStore,
{
    let songs: Vec<SongRecord> = client
        .album_tracks(&album.spotify_id)
        .await?
        .into_iter()
        .map(|track| utils::song_record(album, track))
        .collect();

    let key = layout.songs(&artist.spotify_id, &artist.artist_name, &album.spotify_id);
    storage::write_json(store, &key, &songs).await?;
    Ok(key)
}
