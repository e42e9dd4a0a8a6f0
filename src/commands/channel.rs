use anyhow::Result;
use ctfpost_core::document::ChannelId;
use ctfpost_core::publisher::ChannelDirectory;
use owo_colors::OwoColorize;

use super::Context;

pub async fn add(input: &str) -> Result<()> {
    let ctx = Context::load()?;
    let directory = ctx.publisher()?;

    let channel = directory
        .resolve(input)
        .await
        .map_err(|e| anyhow::anyhow!("Could not resolve channel {input:?}: {e}"))?;

    let allowed = directory
        .can_post(&channel)
        .await
        .map_err(|e| anyhow::anyhow!("Could not check permissions in {channel}: {e}"))?;
    if !allowed {
        anyhow::bail!(
            "The bot is not an administrator of {input} ({channel}).\n\
            Add it as an admin with permission to post messages, then try again."
        );
    }

    let added = ctx.store.update(|doc| doc.add_channel(channel.clone())).await?;
    if added {
        println!("{} {} ({})", "Added".green(), input, channel.dimmed());
    } else {
        println!("{} is already registered.", channel);
    }
    Ok(())
}

/// Removal works on the stored id directly, so a channel the bot has lost
/// access to can still be unregistered. `@name` is resolved when possible.
pub async fn remove(input: &str) -> Result<()> {
    let ctx = Context::load()?;

    let mut channel = ChannelId::new(input);
    if input.trim().starts_with('@') {
        let directory = ctx.publisher()?;
        match directory.resolve(input).await {
            Ok(resolved) => channel = resolved,
            Err(e) => tracing::warn!(error = %e, "Could not resolve {input}, trying it as-is"),
        }
    }

    let removed = ctx.store.update(|doc| doc.remove_channel(&channel)).await?;
    if removed {
        println!("{} {}", "Removed".red(), channel);
    } else {
        println!("{} is not registered.", channel);
    }
    Ok(())
}

pub async fn list() -> Result<()> {
    let ctx = Context::load()?;
    let document = ctx.store.read().await?;

    if document.channels.is_empty() {
        println!("No channels registered.");
        println!("{}", "Add one with: ctfpost channel add @yourchannel".dimmed());
        return Ok(());
    }

    for channel in &document.channels {
        let messages = document
            .state
            .events
            .values()
            .filter(|sync| sync.messages.contains_key(channel))
            .count();
        println!("📣 {}  {}", channel, format!("{messages} messages").dimmed());
    }
    Ok(())
}
