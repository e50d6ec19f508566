//! Tilehall server binary.

use tilehall::TilehallServer;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let addr = std::env::var("TILEHALL_ADDR")
        .unwrap_or_else(|_| "127.0.0.1:9876".to_string());

    let server = TilehallServer::builder().bind(&addr).build().await?;
    tracing::info!(%addr, "tilehall listening");
    server.run().await?;
    Ok(())
}
