//! AI Gateway - One call surface over several LLM vendors
//!
//! Lets an application call OpenAI, DeepSeek, Claude, Gemini or any
//! OpenAI-compatible endpoint through a single normalized interface.
//!
//! ## Features
//!
//! - Normalized `{content, usage}` responses regardless of vendor wire format
//! - Model listing with deduplicated, sorted identifiers
//! - Bring-your-own-key resolution with AES-GCM encrypted storage
//! - Shared platform credentials for credits and subscription calls
//! - Connection self-test that reports failures as data
//!
//! ## Architecture
//!
//! - **Providers**: one adapter per vendor behind the `Provider` trait
//! - **Gateway**: dispatches calls through the provider registry
//! - **Models**: model enumeration, independent of the call path
//! - **Config**: per-user and shared credential resolution
//! - **Security**: secure strings, log sanitization, key encryption
//!
//! ```no_run
//! use ai_gateway::{call_ai, AICallParams, AIConfig, AIProvider};
//!
//! # async fn demo() -> Result<(), ai_gateway::ProviderError> {
//! let config = AIConfig::new(AIProvider::Claude, "claude-3-haiku", "sk-ant-...");
//! let response = call_ai(AICallParams::new(config, "Hello").with_max_tokens(100)).await?;
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod gateway;
pub mod models;
pub mod providers;
pub mod security;

pub use config::{AIConfigMode, ConfigError, ConfigResolver};
pub use gateway::{call_ai, test_ai_connection, AiGateway, ConnectionDetails, ConnectionTestResult};
pub use models::{list_ai_models, ModelLister};
pub use providers::{
    AICallParams, AIConfig, AIProvider, AIResponse, ModelListRequest, Provider, ProviderError,
    ProviderRegistry, TokenUsage,
};

use tracing_subscriber::EnvFilter;

/// Default filter when `RUST_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "ai_gateway=debug,info";

/// Installs a fmt subscriber filtered by `RUST_LOG`
///
/// Safe to call more than once; later calls are no-ops.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
