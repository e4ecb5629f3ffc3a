use std::time::Duration;

use super::{RunContext, client_or_exit, finish};
use crate::{
    info,
    management::{BlobLayout, Stage},
    pipeline,
};

/// Pause between batches of 50 artist ids.
const BATCH_PACING: Duration = Duration::from_secs(1);

pub async fn artists(ctx: &RunContext, page_number: u32) {
    let layout = BlobLayout::for_page(page_number);
    let store = ctx.store();
    let client = client_or_exit(ctx);

    info!("Enriching artists from {}", layout.seed());
    let result =
        pipeline::run_artists(&client, &store, &layout, &ctx.stage_options(BATCH_PACING)).await;
    finish(Stage::Artists, &store, result);
}
