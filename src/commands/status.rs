use std::time::Duration;

use anyhow::Result;
use chrono::Utc;
use ctfpost_core::EventStatus;
use owo_colors::OwoColorize;

use super::Context;
use crate::render::Render;

pub async fn run() -> Result<()> {
    let ctx = Context::load()?;
    let document = ctx.store.read().await?;
    let state = &document.state;

    let running = if state.running {
        "enabled".green().to_string()
    } else {
        "disabled".yellow().to_string()
    };
    println!("{}", "Scheduler".bold());
    println!("  Sync:       {running}");

    let last_run = match state.last_run {
        Some(at) => {
            // Clamp to whole seconds so humantime prints "3m 12s", not nanos.
            let age = (Utc::now() - at).num_seconds().max(0) as u64;
            format!(
                "{} ({} ago)",
                at.format("%Y-%m-%d %H:%M:%S UTC"),
                humantime::format_duration(Duration::from_secs(age))
            )
        }
        None => "never".dimmed().to_string(),
    };
    println!("  Last run:   {last_run}");
    println!();

    println!("{}", document.settings.render());
    println!();

    let count = |status: EventStatus| state.events.values().filter(|s| s.status == status).count();
    println!("{}", "Tracking".bold());
    println!("  Channels:   {}", document.channels.len());
    println!(
        "  Events:     {} ({} upcoming, {} running, {} ended)",
        document.tracked_events(),
        count(EventStatus::Upcoming),
        count(EventStatus::Running),
        count(EventStatus::Ended)
    );

    Ok(())
}
