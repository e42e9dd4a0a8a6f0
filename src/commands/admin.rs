use anyhow::Result;
use owo_colors::OwoColorize;

use super::Context;

pub async fn claim(user_id: i64) -> Result<()> {
    let ctx = Context::load()?;
    let (claimed, is_admin, admins) = ctx
        .store
        .update(|doc| (doc.claim_admin(user_id), doc.is_admin(user_id), doc.admins.clone()))
        .await?;

    match (claimed, is_admin) {
        (true, _) => println!("{} {}", "Admin set to".green(), user_id),
        (false, true) => println!("{user_id} is already the admin."),
        (false, false) => {
            let current: Vec<String> = admins.iter().map(|id| id.to_string()).collect();
            anyhow::bail!("An admin is already set ({})", current.join(", "));
        }
    }
    Ok(())
}

pub async fn list() -> Result<()> {
    let ctx = Context::load()?;
    let document = ctx.store.read().await?;

    if document.admins.is_empty() {
        println!("No admin claimed yet.");
    }
    for id in &document.admins {
        println!("{id}");
    }
    Ok(())
}
