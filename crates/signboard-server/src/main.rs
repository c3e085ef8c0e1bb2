use std::path::PathBuf;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod routes;
mod store;
mod triggers;

use routes::AppState;
use store::Store;

#[derive(Parser)]
#[command(name = "signboard-server", version, about = "Signboard backend server")]
struct Args {
    /// Address to listen on.
    #[arg(long, default_value = "0.0.0.0:3000")]
    listen: String,

    /// Path to the SQLite database file.
    #[arg(long, default_value = "signboard.db")]
    db: PathBuf,

    /// Keep the queue in memory only (testing).
    #[arg(long)]
    in_memory: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();
    let store = if args.in_memory {
        Store::open_memory()?
    } else {
        Store::open(&args.db)?
    };

    let app = routes::router(AppState::new(store));
    let listener = tokio::net::TcpListener::bind(&args.listen).await?;
    info!(listen = %args.listen, "signboard server up");
    axum::serve(listener, app).await?;
    Ok(())
}
