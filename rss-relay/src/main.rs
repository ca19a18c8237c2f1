use rss_relay::{Pipeline, RelayConfig};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = RelayConfig::load()?;
    info!("Starting RSS relay: {:?}", config);

    let pipeline = Pipeline::from_config(&config)?;
    let scheduler = config.scheduler();

    if config.once {
        match scheduler.run_once(&pipeline).await {
            Ok(outcome) => info!("Check finished: {:?}", outcome),
            Err(e) => {
                error!("Check failed: {}", e);
                return Err(e.into());
            }
        }
        return Ok(());
    }

    scheduler.run(&pipeline).await;
    info!("RSS relay stopped");
    Ok(())
}
