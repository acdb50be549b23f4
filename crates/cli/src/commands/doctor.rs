//! `lexline doctor`: Diagnose configuration and provider health.

use lexline_advisor::{ChatService, ConnectionStatus, Exchange, PromptSettings};
use lexline_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("🩺 Lexline Doctor: System Diagnostics");
    println!("=====================================\n");

    let mut issues = 0;

    let config_path = AppConfig::config_dir().join("config.toml");
    if !config_path.exists() {
        println!("  ⚠️  No config file, using defaults; run `lexline onboard`");
        issues += 1;
    }

    let config = match AppConfig::load() {
        Ok(config) => {
            println!("  ✅ Config valid");
            config
        }
        Err(e) => {
            println!("  ❌ Config invalid: {e}");
            println!("\n  ⚠️  1 blocking issue found.");
            return Ok(());
        }
    };

    if config.has_api_key() {
        println!("  ✅ API key configured");
    } else {
        println!("  ⚠️  No API key configured; add api_key to config.toml or set OPENAI_API_KEY");
        issues += 1;
    }

    let provider = match lexline_providers::build_from_config(&config) {
        Ok(provider) => {
            println!("  ✅ Provider chain: {}", provider.name());
            provider
        }
        Err(e) => {
            println!("  ❌ Provider chain invalid: {e}");
            println!("\n  ⚠️  {} issue(s) found.", issues + 1);
            return Ok(());
        }
    };

    match lexline_sessions::open(&config.sessions).await {
        Ok(store) => {
            println!("  ✅ Session store: {}", store.name());
            let chat = ChatService::new(
                Exchange::new(provider, PromptSettings::from_config(&config)),
                store,
            );
            match chat.health_check().await {
                ConnectionStatus::Connected => println!("  ✅ Model reachable ({})", config.default_model),
                ConnectionStatus::Disconnected => {
                    println!("  ❌ Model unreachable ({}); answers will use fallback guidance", config.default_model);
                    issues += 1;
                }
            }
        }
        Err(e) => {
            println!("  ❌ Session store unavailable: {e}");
            issues += 1;
        }
    }

    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}
