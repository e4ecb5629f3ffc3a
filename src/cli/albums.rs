use std::time::Duration;

use super::{RunContext, client_or_exit, finish};
use crate::{
    info,
    management::{BlobLayout, Stage},
    pipeline,
};

pub async fn albums(ctx: &RunContext, page_number: u32, num_artists: usize) {
    let layout = BlobLayout::for_page(page_number);
    let store = ctx.store();
    let client = client_or_exit(ctx);

    if num_artists == 0 {
        info!("Fetching albums for all artists in {}", layout.artists());
    } else {
        info!(
            "Fetching albums for the first {} artists in {}",
            num_artists,
            layout.artists()
        );
    }
    let result = pipeline::run_albums(
        &client,
        &store,
        &layout,
        num_artists,
        &ctx.stage_options(Duration::ZERO),
    )
    .await;
    finish(Stage::Albums, &store, result);
}
