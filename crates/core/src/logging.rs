//! Structured logging infrastructure for TrustCore.
//!
//! Logging is initialized once per process from the `[logging]` section,
//! as text or as JSON for log aggregation.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;

/// Initialize logging from the `[logging]` configuration section.
///
/// `RUST_LOG` still wins over the configured level when it is set. Output goes
/// to stderr so that command output on stdout stays machine readable.
///
/// # Example
/// ```no_run
/// use trustcore_core::{logging, LoggingConfig};
///
/// logging::init_from_config(&LoggingConfig::default());
/// tracing::info!(service = "trustcore-node", "Service started");
/// ```
pub fn init_from_config(config: &LoggingConfig) {
    let filter = env_filter(&config.level);

    if config.json {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    }
}

fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}
