//! `lexline ask`: One exchange from the terminal, without a stored session.

use lexline_advisor::{Exchange, PromptSettings, ResponseSource, profile};
use lexline_config::AppConfig;
use lexline_core::category::Category;
use lexline_core::context::ContextLedger;
use lexline_core::error::ModelFailure;
use tracing::{debug, info};

pub async fn run(message: String, category: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    if !config.has_api_key() {
        eprintln!("  ⚠️  No API key configured; answers will come from the offline guidance.");
        eprintln!("     Set OPENAI_API_KEY or add api_key to {}", AppConfig::config_dir().join("config.toml").display());
        eprintln!();
    }

    let provider = lexline_providers::build_from_config(&config)?;
    let exchange = Exchange::new(provider, PromptSettings::from_config(&config));
    debug!(provider = %exchange.provider().name(), model = %config.default_model, "Provider chain ready");

    let outcome = exchange
        .run_exchange("cli", &message, category.as_deref(), &ContextLedger::new())
        .await?;

    println!("{}\n", outcome.result.response_text);
    println!("Category:    {}", outcome.result.category);
    println!("Citations:   {}", outcome.result.citations);
    println!("Response id: {}", outcome.result.response_id);
    match outcome.source {
        ResponseSource::Model { provider, model } => {
            info!(%provider, %model, response_id = %outcome.result.response_id, "Model answered");
        }
        ResponseSource::Fallback { reason } => {
            info!(%reason, response_id = %outcome.result.response_id, "Answered from built-in guidance");
            println!("{}", fallback_note(outcome.result.category, reason));
        }
    }

    Ok(())
}

fn fallback_note(category: Category, reason: ModelFailure) -> String {
    format!(
        "(model {reason}; showing built-in {} guidance)",
        profile(category).label
    )
}
