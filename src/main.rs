use dotenvy::dotenv;

use verishot::config::VerifyConfig;
use verishot::logging::{init_logging, LoggingConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenv();
    let _guard = init_logging(LoggingConfig::default())?;

    let config = VerifyConfig::load();
    tracing::info!(
        "Verifying that '{}' on {} renders and is reachable by scrolling",
        config.section_selector,
        config.target_url
    );

    verishot::verify::run(&config).await?;

    tracing::info!("Verification artifact: {}", config.output_path.display());
    Ok(())
}
