use super::{SpotifyClient, SpotifyError};
use crate::{
    fetch::{Sleeper, Transport},
    types::{SimplifiedAlbum, SimplifiedTrack},
};

pub const PAGE_LIMIT: u32 = 50;
pub const DEFAULT_INCLUDE_GROUPS: &str = "album,single,compilation";
pub const DEFAULT_MARKET: &str = "US";

impl<T: Transport, S: Sleeper> SpotifyClient<T, S> {
    /// Retrieves the complete discography of an artist.
    ///
    /// `include_groups` is the comma-separated list Spotify expects
    /// (`album`, `single`, `appears_on`, `compilation`). Releases are returned
    /// in the order the API lists them, across all pages.
    pub async fn artist_albums(
        &self,
        artist_id: &str,
        include_groups: &str,
        market: &str,
    ) -> Result<Vec<SimplifiedAlbum>, SpotifyError> {
        if artist_id.is_empty() {
            return Err(SpotifyError::InvalidInput("artist id is empty".into()));
        }

        let first = self
            .request(&format!("/artists/{}/albums", artist_id))
            .query("limit", PAGE_LIMIT)
            .query("include_groups", include_groups)
            .query("market", market);
        self.collect_pages(first).await
    }

    /// Retrieves every track of an album, across all pages.
    pub async fn album_tracks(&self, album_id: &str) -> Result<Vec<SimplifiedTrack>, SpotifyError> {
        if album_id.is_empty() {
            return Err(SpotifyError::InvalidInput("album id is empty".into()));
        }

        let first = self
            .request(&format!("/albums/{}/tracks", album_id))
            .query("limit", PAGE_LIMIT);
        self.collect_pages(first).await
    }
}
