//! Diagnostic CLI for the shared AI configuration
//!
//! ```text
//! ai-gateway test [--mode credits|subscription] <model>
//! ai-gateway models [--mode credits|subscription]
//! ai-gateway providers
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use ai_gateway::config::SystemConfig;
use ai_gateway::{init_tracing, AIConfig, AIConfigMode, AiGateway, ModelListRequest};

#[derive(Parser, Debug)]
#[command(
    name = "ai-gateway",
    version,
    about = "Checks the shared AI credentials against their provider"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sends a short connection test with the given model
    Test {
        #[arg(long, value_enum, default_value_t = SharedMode::Credits)]
        mode: SharedMode,
        model: String,
    },
    /// Lists the models the shared credential can see
    Models {
        #[arg(long, value_enum, default_value_t = SharedMode::Credits)]
        mode: SharedMode,
    },
    /// Prints the built-in providers
    Providers,
}

/// Modes served by the shared credential; `custom` needs a per-user key
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SharedMode {
    Credits,
    Subscription,
}

impl From<SharedMode> for AIConfigMode {
    fn from(mode: SharedMode) -> Self {
        match mode {
            SharedMode::Credits => AIConfigMode::Credits,
            SharedMode::Subscription => AIConfigMode::Subscription,
        }
    }
}

fn shared_config(system: &SystemConfig, mode: SharedMode) -> Result<AIConfig> {
    system
        .config_for(mode.into())
        .context("shared AI config unavailable (set COMMON_AI_PROVIDER and COMMON_AI_API_KEY)")
}

#[tokio::main]
async fn main() -> Result<()> {
    match dotenvy::dotenv() {
        Ok(path) => eprintln!("Loaded {}", path.display()),
        Err(e) if e.not_found() => {}
        Err(e) => eprintln!("Failed to load .env: {}", e),
    }

    let cli = Cli::parse();
    init_tracing();

    let gateway = AiGateway::new();
    let system = SystemConfig::load();

    match cli.command {
        Command::Test { mode, model } => {
            let config = shared_config(&system, mode)?.with_model(model);

            let result = gateway.test_connection(&config).await;
            println!("{}", serde_json::to_string_pretty(&result)?);
            if !result.success {
                std::process::exit(1);
            }
        }
        Command::Models { mode } => {
            let config = shared_config(&system, mode)?;

            let models = gateway
                .list_models(&ModelListRequest::from(&config))
                .await
                .with_context(|| format!("listing {} models", config.provider))?;
            println!("{}", serde_json::to_string_pretty(&models)?);
        }
        Command::Providers => {
            println!("{}", serde_json::to_string_pretty(&gateway.registry().metadata())?);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn test_parse_test_command() {
        let cli = Cli::try_parse_from(["ai-gateway", "test", "--mode", "subscription", "gpt-4o"]).unwrap();
        match cli.command {
            Command::Test { mode, model } => {
                assert_eq!(mode, SharedMode::Subscription);
                assert_eq!(model, "gpt-4o");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_mode_defaults_to_credits() {
        let cli = Cli::try_parse_from(["ai-gateway", "models"]).unwrap();
        assert!(matches!(cli.command, Command::Models { mode: SharedMode::Credits }));
        assert_eq!(AIConfigMode::from(SharedMode::Credits), AIConfigMode::Credits);
    }

    #[test]
    fn test_misspelled_mode_rejected() {
        let err = Cli::try_parse_from(["ai-gateway", "models", "--mode", "subscripton"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidValue);
    }

    #[test]
    fn test_custom_mode_rejected() {
        let err = Cli::try_parse_from(["ai-gateway", "test", "--mode", "custom", "llama3"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidValue);
    }

    #[test]
    fn test_test_requires_model() {
        let err = Cli::try_parse_from(["ai-gateway", "test"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }
}
