use tracing::info;
use webserver::config::Config;
use webserver::server::{Server, Stopped};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    let cfg = Config::load()?;
    let server = Server::bind(&cfg.server).await?;

    info!("open {} with your browser!", server.url()?);

    let handle = server.start()?;

    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received, press Ctrl-C again to exit immediately");

    let stopped = handle
        .stop_or_abort(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for second signal: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await?;

    if stopped == Stopped::Aborted {
        info!("Exiting without waiting for open connections");
    }
    Ok(())
}
