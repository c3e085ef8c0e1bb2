use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use signboard_core::{Config, CoreError, Gateway};

mod commands;

#[derive(Parser)]
#[command(name = "signboard", version, about = "Signboard CLI")]
struct Cli {
    /// Backend server URL (overrides the config file).
    #[arg(long, global = true)]
    server: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit a message to the board
    Submit {
        line1: String,
        #[arg(default_value = "")]
        line2: String,
        #[arg(default_value = "")]
        line3: String,
        #[arg(default_value = "")]
        line4: String,
    },
    /// Print the message queue as JSON
    List,
    /// Print queue statistics as JSON
    Stats,
    /// Delete a single message
    Delete {
        id: i64,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Clear the whole queue
    Clear {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Mark every message unshown again
    ResetShown,
    /// Fire a celebration on connected displays
    Celebrate,
    /// Run the unattended display loop
    Display {
        /// Start in fast rotation mode (5s instead of 25s)
        #[arg(long)]
        fast: bool,
    },
    /// Live admin view: stats and queue, refreshed every 2s
    Watch,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CoreError> {
    let config = Config::load()?;
    let url = cli
        .server
        .unwrap_or_else(|| config.server.url.clone());
    let gateway = Gateway::new(&url)?;

    match cli.command {
        Commands::Submit {
            line1,
            line2,
            line3,
            line4,
        } => commands::submit::run(&gateway, &line1, &line2, &line3, &line4).await,
        Commands::List => commands::admin::list(&gateway).await,
        Commands::Stats => commands::admin::stats(&gateway).await,
        Commands::Delete { id, yes } => commands::admin::delete(&gateway, id, yes).await,
        Commands::Clear { yes } => commands::admin::clear(&gateway, yes).await,
        Commands::ResetShown => commands::admin::reset_shown(&gateway).await,
        Commands::Celebrate => commands::admin::celebrate(&gateway).await,
        Commands::Display { fast } => commands::display::run(gateway, &config, fast).await,
        Commands::Watch => commands::watch::run(gateway, &config).await,
    }
}
