//! Logging setup
//!
//! Initialises `tracing-subscriber` from [`LoggingConfig`]. `RUST_LOG` wins
//! over the configured level when set.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;

/// Build the env filter: `RUST_LOG` if present, otherwise `jocarsa_suite=<level>`
/// plus any extra directives (e.g. `tower_http=debug` for the server).
pub fn env_filter(config: &LoggingConfig, extra: &[&str]) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let mut directives = format!("jocarsa_suite={}", config.level);
        for directive in extra {
            directives.push(',');
            directives.push_str(directive);
        }
        EnvFilter::new(directives)
    })
}

/// Install the global subscriber. Calling this twice is harmless: the second
/// attempt is ignored.
pub fn init_logging(config: &LoggingConfig, extra: &[&str]) {
    let filter = env_filter(config, extra);

    let result = if config.format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()
    };

    if let Err(e) = result {
        eprintln!("logging already initialised: {}", e);
    }
}
