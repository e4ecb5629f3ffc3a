use std::time::Duration;

use super::{RunContext, client_or_exit, finish};
use crate::{
    info,
    management::{BlobLayout, Stage},
    pipeline::{self, ArtistBatch},
};

/// Pause between track listings of consecutive albums.
const ALBUM_PACING: Duration = Duration::from_millis(500);

pub async fn songs(ctx: &RunContext, page_number: u32, batch_number: usize, batch_size: usize) {
    let layout = BlobLayout::for_page(page_number);
    let store = ctx.store();
    let client = client_or_exit(ctx);

    let batch = ArtistBatch {
        number: batch_number,
        size: batch_size,
    };
    if batch.size == 0 {
        info!("Fetching songs for all artists in {}", layout.artists());
    } else {
        info!(
            "Fetching songs for artist batch {} (size {})",
            batch.number, batch.size
        );
    }
    let result = pipeline::run_songs(
        &client,
        &store,
        &layout,
        batch,
        &ctx.stage_options(ALBUM_PACING),
    )
    .await;
    finish(Stage::Songs, &store, result);
}
