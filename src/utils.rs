use chrono::Local;

use crate::types::{
    AlbumRecord, ArtistRecord, KworbMetrics, Metrics, SeedArtist, SimplifiedAlbum,
    SimplifiedTrack, SongRecord, SpotifyArtist, SpotifyMeta, SpotifyMetrics,
};

pub const PROCESSED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn processed_at_now() -> String {
    Local::now().format(PROCESSED_AT_FORMAT).to_string()
}

pub fn artist_record(seed: &SeedArtist, artist: &SpotifyArtist, processed_at: &str) -> ArtistRecord {
    ArtistRecord {
        spotify_id: seed.spotify_id.clone(),
        artist_name: seed.artist_name.clone(),
        spotify_url: artist.external_urls.spotify.clone(),
        init_processed_at: processed_at.to_string(),
        metrics: Metrics {
            kworb: KworbMetrics {
                monthly_listeners: seed.monthly_listeners,
            },
            spotify: SpotifyMetrics {
                followers: artist.followers.total,
                popularity: artist.popularity,
            },
        },
        spotify_meta: SpotifyMeta {
            genres: artist.genres.clone(),
            images: artist.images.clone(),
        },
    }
}

pub fn album_record(artist_name: &str, album: SimplifiedAlbum) -> AlbumRecord {
    AlbumRecord {
        spotify_id: album.id,
        name: album.name,
        artist_name: artist_name.to_string(),
        url: album.external_urls.spotify,
        album_type: album.album_type,
        release_date: album.release_date,
        total_tracks: album.total_tracks,
        is_processed: false,
        images: album.images,
    }
}

pub fn song_record(album: &AlbumRecord, track: SimplifiedTrack) -> SongRecord {
    let artists: Vec<String> = track.artists.into_iter().map(|a| a.name).collect();
    SongRecord {
        spotify_id: track.id,
        name: track.name,
        album: album.name.clone(),
        primary_artist: artists.first().cloned().unwrap_or_default(),
        artists,
        spotify_url: track.external_urls.spotify,
        release_date: album.release_date.clone(),
        duration_ms: track.duration_ms,
        explicit: track.explicit,
    }
}

/// Only full-length albums get their tracks fetched; singles and compilations are skipped.
pub fn full_albums(albums: Vec<AlbumRecord>) -> Vec<AlbumRecord> {
    albums
        .into_iter()
        .filter(|a| a.album_type == "album")
        .collect()
}

/// The `batch_number`-th (1-based) slice of `batch_size` items.
///
/// A `batch_size` of 0 means everything is one batch.
pub fn batch_slice<T>(items: &[T], batch_number: usize, batch_size: usize) -> &[T] {
    if batch_size == 0 {
        return items;
    }
    let start = batch_number.saturating_sub(1).saturating_mul(batch_size);
    if start >= items.len() {
        return &[];
    }
    let end = start.saturating_add(batch_size).min(items.len());
    &items[start..end]
}

/// First `limit` items; 0 keeps all.
pub fn take_first<T>(items: &[T], limit: usize) -> &[T] {
    if limit == 0 {
        items
    } else {
        &items[..limit.min(items.len())]
    }
}
