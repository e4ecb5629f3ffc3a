use super::{SpotifyClient, SpotifyError};
use crate::{
    fetch::{Sleeper, Transport},
    types::{SeveralArtistsResponse, SpotifyArtist},
};

/// Most ids the `/artists` endpoint accepts in one call.
pub const MAX_ARTIST_IDS: usize = 50;

impl<T: Transport, S: Sleeper> SpotifyClient<T, S> {
    /// Retrieves catalog data for up to 50 artists in a single call.
    ///
    /// The result has one entry per requested id, in request order. Ids the
    /// API does not know come back as `None`.
    ///
    /// # Errors
    ///
    /// - [`SpotifyError::InvalidInput`] for an empty batch or more than 50 ids
    /// - [`SpotifyError::Fetch`] when the request fails after retries
    /// - [`SpotifyError::Decode`] when the body is not the expected shape
    /// - [`SpotifyError::UnexpectedBody`] when the number of returned artists
    ///   does not match the number of ids
    pub async fn several_artists(
        &self,
        ids: &[String],
    ) -> Result<Vec<Option<SpotifyArtist>>, SpotifyError> {
        if ids.is_empty() || ids.len() > MAX_ARTIST_IDS {
            return Err(SpotifyError::InvalidInput(format!(
                "expected 1 to {} artist ids, got {}",
                MAX_ARTIST_IDS,
                ids.len()
            )));
        }

        let request = self.request("/artists").query("ids", ids.join(","));
        let response: SeveralArtistsResponse = self.get_json(&request).await?;

        if response.artists.len() != ids.len() {
            return Err(SpotifyError::UnexpectedBody {
                url: request.url,
                reason: format!(
                    "asked for {} artists, received {}",
                    ids.len(),
                    response.artists.len()
                ),
            });
        }
        Ok(response.artists)
    }
}
