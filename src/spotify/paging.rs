use serde::de::DeserializeOwned;
use tracing::debug;

use super::{SpotifyClient, SpotifyError};
use crate::{
    fetch::{FetchRequest, Sleeper, Transport},
    types::Paging,
};

impl<T: Transport, S: Sleeper> SpotifyClient<T, S> {
    /// Follows `next` links from `first` and returns every item in page order.
    pub async fn collect_pages<D: DeserializeOwned>(
        &self,
        first: FetchRequest,
    ) -> Result<Vec<D>, SpotifyError> {
        let mut items = Vec::new();
        let mut request = first;

        for page in 1..=self.max_pages {
            let body: Paging<D> = self.get_json(&request).await?;
            debug!(
                url = %request.url,
                page,
                items = body.items.len(),
                total = ?body.total,
                "page fetched"
            );
            items.extend(body.items);

            match body.next {
                Some(next) if !next.is_empty() => request = request.follow(next),
                _ => return Ok(items),
            }
        }

        Err(SpotifyError::TooManyPages {
            url: request.url,
            max_pages: self.max_pages,
        })
    }
}
