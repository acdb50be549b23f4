//! `lexline gateway`: Start the HTTP API server.

use lexline_config::AppConfig;
use tracing::info;

pub async fn run(port_override: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    if let Some(port) = port_override {
        info!(port, "Port overridden from the command line");
        config.gateway.port = port;
    }

    println!("⚖️  Lexline Gateway");
    println!("   Listening: {}:{}", config.gateway.host, config.gateway.port);
    println!("   Provider:  {} ({})", config.default_provider, config.default_model);
    println!("   Sessions:  {}", config.sessions.backend);

    lexline_gateway::start(config).await?;

    Ok(())
}
