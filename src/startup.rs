use crate::components::feed_relay::FeedRelay;
use crate::components::{ComponentManager, FeedRelayHandle};
use crate::config::Config;
use crate::error::Error;
use crate::shutdown;
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Initialize logging with environment-based configuration
pub fn init_logging() -> miette::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,reqwest=warn,hyper=warn")),
        )
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| Error::Other(format!("Failed to set up logging: {}", e)))?;

    Ok(())
}

/// Load the application config
pub fn load_config() -> miette::Result<Arc<Config>> {
    match Config::load() {
        Ok(config) => {
            info!("Loaded configuration: {:?}", config);
            Ok(Arc::new(config))
        }
        Err(e) => {
            error!("Failed to load configuration: {:?}", e);
            Err(e.into())
        }
    }
}

/// Run the relay: one pass, or periodic passes until a shutdown signal
pub async fn start_service(config: Arc<Config>) -> miette::Result<()> {
    if !config.is_periodic() {
        return run_once(&config).await;
    }

    // Initialize component manager
    let mut component_manager = ComponentManager::new(Arc::clone(&config));

    // Register feed relay component
    component_manager.register(FeedRelay::new());

    let component_manager = Arc::new(component_manager);
    component_manager.init_all().await?;

    // Create shutdown channel
    let (shutdown_send, shutdown_recv) = oneshot::channel();

    // Spawn signal handler task
    let shutdown_components = Arc::clone(&component_manager);
    tokio::spawn(async move {
        shutdown::handle_signals(shutdown_send, shutdown_components).await;
    });

    info!("Feed relay running");
    let _ = shutdown_recv.await;
    info!("Received shutdown signal, exiting");

    Ok(())
}

/// Process a single feed snapshot and exit
async fn run_once(config: &Config) -> miette::Result<()> {
    info!("Running a single feed pass for {}", config.feed_url);

    let handle = FeedRelayHandle::new(config)?;
    let result = handle.run_pass().await;
    handle.shutdown().await?;

    let report = result?;
    info!(
        events = report.events_found,
        prepared = report.prepared,
        delivered = report.delivered,
        failed = report.failed,
        "Feed pass finished"
    );

    Ok(())
}
