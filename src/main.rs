use inboxics::startup;
use tracing::info;

#[tokio::main]
async fn main() -> miette::Result<()> {
    // Initialize logging
    startup::init_logging()?;

    info!("Starting Inboxics");

    // Load configuration
    let config = startup::load_config()?;

    // Run the relay
    startup::start_service(config).await
}
