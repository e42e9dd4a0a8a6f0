use anyhow::Result;
use ctfpost_core::setting::{Setting, SettingKey};
use owo_colors::OwoColorize;

use super::Context;
use crate::render::Render;

pub async fn set(key: &str, value: &str) -> Result<()> {
    let key: SettingKey = key.parse()?;

    let ctx = Context::load()?;
    let setting = ctx
        .store
        .try_update(|doc| {
            let setting = Setting::parse(key, value)?;
            doc.apply_setting(setting);
            Ok(setting)
        })
        .await?;

    println!("{}", setting.to_string().green());
    if matches!(setting, Setting::Interval(_)) {
        println!("{}", "Takes effect after the current sleep.".dimmed());
    }
    Ok(())
}

pub async fn show() -> Result<()> {
    let ctx = Context::load()?;
    let document = ctx.store.read().await?;
    println!("{}", document.settings.render());
    Ok(())
}
