use anyhow::Result;
use ctfpost_core::config::AppConfig;
use owo_colors::OwoColorize;

pub fn run() -> Result<()> {
    let config_path = AppConfig::config_path()?;
    let config = AppConfig::load()?;

    println!("{}", "Paths".bold());
    println!("  Config:     {}", config_path.display());
    println!("  Data:       {}", config.data_file.display());
    println!();
    println!("{}", "Endpoints".bold());
    println!("  CTFtime:    {}", config.ctftime_api_url);
    println!("  Telegram:   {}", config.telegram_api_url);

    let token = if config.bot_token.is_some() {
        "set".green().to_string()
    } else {
        "missing (set bot_token or CTFPOST_BOT_TOKEN)".red().to_string()
    };
    println!("  Bot token:  {token}");

    Ok(())
}
