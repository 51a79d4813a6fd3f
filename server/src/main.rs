use anyhow::Result;
use axum::Router;
use clap::Parser;
use pantry_server::{build_app, AppOptions};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
struct Args {
    /// Catalog path (.json, .jsonl, or a directory); also the source for /admin/reload
    #[arg(long)]
    catalog: Option<String>,
    /// Prebuilt index directory, used instead of indexing the catalog at startup
    #[arg(long)]
    index: Option<String>,
    /// Inventory JSON file
    #[arg(long)]
    inventory: Option<String>,
    /// Ranking config JSON file
    #[arg(long)]
    config: Option<String>,
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 8080)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();
    let app: Router = build_app(AppOptions {
        catalog: args.catalog,
        index: args.index,
        inventory: args.inventory,
        config: args.config,
    })?;

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
