use std::io;

use comingsoon::configuration::Settings;
use comingsoon::startup::Application;
use comingsoon::telemetry::{get_subscriber, init_subscriber};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    let subscriber = get_subscriber("comingsoon".into(), "info".into(), io::stdout);
    init_subscriber(subscriber);

    // Retrieve settings
    let config = Settings::get_config()?;

    // Build the application and serve until stopped
    let application = Application::build(config).await?;
    tracing::info!(port = application.port(), "Accepting subscriptions");
    application.run_until_stopped().await?;

    Ok(())
}
