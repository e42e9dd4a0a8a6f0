use anyhow::Result;
use ctfpost_core::scheduler::Scheduler;
use tracing::info;

use super::Context;

pub async fn run(start: bool) -> Result<()> {
    let ctx = Context::load()?;
    let lock = ctx.store.lock_daemon()?;
    let scheduler = Scheduler::new(ctx.syncer()?);

    if start {
        scheduler.start().await?;
    } else {
        // The loop idles until the persisted run flag is set.
        scheduler.ensure_running();
    }

    let document = ctx.store.read().await?;
    info!(
        data_file = %ctx.store.path().display(),
        lock = %lock.path().display(),
        running = document.state.running,
        channels = document.channels.len(),
        "ctfpost daemon started"
    );

    tokio::signal::ctrl_c().await?;
    info!("Shutting down");
    scheduler.shutdown().await;

    Ok(())
}
