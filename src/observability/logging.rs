//! Structured logging.
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - JSON format for production, pretty format for development
//! - `RUST_LOG` wins over the configured level

use tracing_subscriber::{fmt, EnvFilter};

use crate::config::ObservabilityConfig;

/// Set to `1` to force JSON output regardless of config.
pub const LOG_JSON_ENV_VAR: &str = "SOLTIX_LOG_JSON";

/// Install the global subscriber. Safe to call more than once.
pub fn init_logging(config: &ObservabilityConfig) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("soltix_wallet={}", config.log_level)));
    let use_json = config.json_logs
        || std::env::var(LOG_JSON_ENV_VAR)
            .map(|value| value == "1")
            .unwrap_or(false);

    if use_json {
        let _ = fmt::Subscriber::builder()
            .with_env_filter(env_filter)
            .json()
            .with_writer(std::io::stderr)
            .try_init();
    } else {
        let _ = fmt::Subscriber::builder()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .try_init();
    }
}
