use anyhow::Result;
use ctfpost_core::scheduler::Scheduler;
use owo_colors::OwoColorize;

use super::Context;
use crate::render::Render;
use crate::utils::tui::create_spinner;

pub async fn run() -> Result<()> {
    let ctx = Context::load()?;
    let scheduler = Scheduler::new(ctx.syncer()?);

    if ctx.store.read().await?.channels.is_empty() {
        println!(
            "{}",
            "No channels registered; events will be tracked but not posted.".yellow()
        );
    }

    let spinner = create_spinner("Syncing events".to_string());
    let result = scheduler.run_once().await;
    spinner.finish_and_clear();

    let report = result?;
    println!("{}", report.render());
    Ok(())
}
