use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use back::{app, store::TodoStore, AppState};
use clap::Parser;

#[derive(Parser)]
#[command(about = "Todo tracking server with a JSON API and a web interface")]
struct Args {
    /// Port to listen on.
    #[arg(long, default_value_t = 5000)]
    port: u16,

    /// Path of the todo snapshot file.
    #[arg(long, default_value = "todos.ron")]
    data: PathBuf,
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    let store = TodoStore::open(&args.data)?;
    let state = Arc::new(AppState::new(store)?);

    let listener = tokio::net::TcpListener::bind(SocketAddr::from(([0; 4], args.port))).await?;
    tracing::info!(port = args.port, "listening");

    axum::serve(listener, app(state)).await?;

    Ok(())
}
