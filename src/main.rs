mod commands;
mod render;
mod utils;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "ctfpost")]
#[command(about = "Post upcoming CTF events to Telegram channels and keep them up to date")]
#[command(version)]
struct Cli {
    /// Verbose logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the sync daemon in the foreground
    Serve {
        /// Set the run flag before starting, so cycles begin immediately
        #[arg(long)]
        start: bool,
    },
    /// Enable periodic syncing (picked up by a running daemon)
    Start,
    /// Disable periodic syncing; the daemon keeps running idle
    Stop,
    /// Run one sync cycle now
    Cycle,
    /// Manage the channels events are posted to
    Channel {
        #[command(subcommand)]
        command: ChannelCommand,
    },
    /// Change a setting (interval, horizon, min-weight, preview)
    Set { key: String, value: String },
    /// Show current settings
    Settings,
    /// Show scheduler status and sync statistics
    Status,
    /// Record the admin user id (first claim wins)
    Admin {
        #[command(subcommand)]
        command: AdminCommand,
    },
    /// Show config and data file locations
    Config,
}

#[derive(Subcommand)]
enum AdminCommand {
    /// Claim the admin slot for a Telegram user id
    Claim { user_id: i64 },
    /// Show the admin list
    List,
}

#[derive(Subcommand)]
enum ChannelCommand {
    /// Register a channel by @username or numeric id
    Add {
        #[arg(allow_hyphen_values = true)]
        channel: String,
    },
    /// Unregister a channel
    Remove {
        #[arg(allow_hyphen_values = true)]
        channel: String,
    },
    /// List registered channels
    List,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    match cli.command {
        Commands::Serve { start } => commands::serve::run(start).await,
        Commands::Start => commands::schedule::start().await,
        Commands::Stop => commands::schedule::stop().await,
        Commands::Cycle => commands::cycle::run().await,
        Commands::Channel { command } => match command {
            ChannelCommand::Add { channel } => commands::channel::add(&channel).await,
            ChannelCommand::Remove { channel } => commands::channel::remove(&channel).await,
            ChannelCommand::List => commands::channel::list().await,
        },
        Commands::Set { key, value } => commands::settings::set(&key, &value).await,
        Commands::Settings => commands::settings::show().await,
        Commands::Status => commands::status::run().await,
        Commands::Admin { command } => match command {
            AdminCommand::Claim { user_id } => commands::admin::claim(user_id).await,
            AdminCommand::List => commands::admin::list().await,
        },
        Commands::Config => commands::config::run(),
    }
}

fn init_tracing(debug: bool) {
    let default_filter = if debug {
        "ctfpost_core=debug,ctfpost_telegram=debug,ctfpost_cli=debug,info"
    } else {
        "ctfpost_core=info,ctfpost_telegram=info,ctfpost_cli=info,warn"
    };

    // RUST_LOG wins over the built-in defaults
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let layer = fmt::layer()
        .with_target(debug)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .compact();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(layer)
        .init();
}
