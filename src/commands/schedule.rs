use anyhow::Result;
use owo_colors::OwoColorize;

use super::Context;

pub async fn start() -> Result<()> {
    let ctx = Context::load()?;
    let was_running = ctx
        .store
        .update(|doc| std::mem::replace(&mut doc.state.running, true))
        .await?;

    if was_running {
        println!("Sync is already enabled.");
    } else {
        println!("{}", "Sync enabled.".green());
    }
    println!(
        "{}",
        "A running `ctfpost serve` picks this up on its next tick.".dimmed()
    );
    Ok(())
}

pub async fn stop() -> Result<()> {
    let ctx = Context::load()?;
    let was_running = ctx
        .store
        .update(|doc| std::mem::replace(&mut doc.state.running, false))
        .await?;

    if was_running {
        println!("{}", "Sync disabled.".yellow());
    } else {
        println!("Sync is already disabled.");
    }
    Ok(())
}
