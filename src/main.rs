use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use projectboard::{api, config::Config};

#[derive(Parser)]
#[command(name = "pboard")]
#[command(about = "Project, feature and task record keeper")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server (default)
    Serve(ServeArgs),
}

#[derive(Args, Default)]
struct ServeArgs {
    /// Address to bind [env: PROJECTBOARD_HOST]
    #[arg(long)]
    host: Option<String>,

    /// Port for HTTP API [env: PROJECTBOARD_PORT]
    #[arg(short, long)]
    port: Option<u16>,

    /// SQLite database file [env: PROJECTBOARD_DB]
    #[arg(long, conflicts_with = "memory")]
    db: Option<PathBuf>,

    /// Keep everything in memory; data is lost on exit
    #[arg(long)]
    memory: bool,
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "projectboard=debug,tower_http=debug".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let args = match cli.command {
        Some(Commands::Serve(args)) => args,
        None => ServeArgs::default(),
    };

    let config =
        Config::from_env()?.with_overrides(args.host, args.port, args.db, args.memory);
    serve(config).await
}

async fn serve(config: Config) -> anyhow::Result<()> {
    tracing::info!("Opening database: {:?}", config.database);
    let db = config.database.open()?;

    let app = match &config.cors_origins {
        Some(origins) => api::create_router_with_origins(db, origins)?,
        None => api::create_router(db),
    };

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Project board listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Resolves on SIGINT (Ctrl+C) or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received SIGINT, shutting down"),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}
