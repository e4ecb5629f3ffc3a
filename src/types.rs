use serde::{Deserialize, Serialize};
use tabled::Tabled;

// Spotify Web API shapes. Only the fields the pipeline reads are declared.

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExternalUrls {
    #[serde(default)]
    pub spotify: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub url: String,
    pub height: Option<u32>,
    pub width: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Followers {
    #[serde(default)]
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpotifyArtist {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub external_urls: ExternalUrls,
    #[serde(default)]
    pub followers: Followers,
    #[serde(default)]
    pub popularity: u32,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub images: Vec<Image>,
}

/// `GET /artists?ids=...`; unknown ids come back as `null`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeveralArtistsResponse {
    pub artists: Vec<Option<SpotifyArtist>>,
}

/// Offset-based paging object wrapping most Spotify list endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paging<T> {
    pub items: Vec<T>,
    pub next: Option<String>,
    pub total: Option<u64>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimplifiedAlbum {
    pub id: String,
    pub name: String,
    pub album_type: String,
    pub release_date: String,
    pub total_tracks: u32,
    #[serde(default)]
    pub external_urls: ExternalUrls,
    #[serde(default)]
    pub images: Vec<Image>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackArtist {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimplifiedTrack {
    pub id: String,
    pub name: String,
    pub artists: Vec<TrackArtist>,
    #[serde(default)]
    pub external_urls: ExternalUrls,
    pub duration_ms: u64,
    #[serde(default)]
    pub explicit: bool,
}

// Documents stored in the bucket.

/// One row of the listeners ranking the artists stage starts from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedArtist {
    pub spotify_id: String,
    pub artist_name: String,
    pub monthly_listeners: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtistRecord {
    pub spotify_id: String,
    pub artist_name: String,
    pub spotify_url: String,
    pub init_processed_at: String,
    pub metrics: Metrics,
    pub spotify_meta: SpotifyMeta,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub kworb: KworbMetrics,
    pub spotify: SpotifyMetrics,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KworbMetrics {
    pub monthly_listeners: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpotifyMetrics {
    pub followers: u64,
    pub popularity: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpotifyMeta {
    pub genres: Vec<String>,
    pub images: Vec<Image>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlbumRecord {
    pub spotify_id: String,
    pub name: String,
    pub artist_name: String,
    pub url: String,
    #[serde(rename = "type")]
    pub album_type: String,
    pub release_date: String,
    pub total_tracks: u32,
    pub is_processed: bool,
    pub images: Vec<Image>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SongRecord {
    pub spotify_id: String,
    pub name: String,
    pub album: String,
    pub artists: Vec<String>,
    pub primary_artist: String,
    pub spotify_url: String,
    pub release_date: String,
    pub duration_ms: u64,
    pub explicit: bool,
}

/// An entity a stage could not process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailedEntity {
    pub stage: String,
    pub entity_id: String,
    pub entity_name: String,
    pub error: String,
}

#[derive(Tabled)]
pub struct FailureTableRow {
    pub id: String,
    pub name: String,
    pub error: String,
}
