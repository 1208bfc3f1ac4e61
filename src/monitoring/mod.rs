//! Logging bootstrap for embedding applications

use crate::config::MonitoringConfig;
use crate::error::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber from the monitoring configuration.
///
/// `RUST_LOG` takes precedence over the configured level. Calling this more
/// than once is harmless; later calls leave the installed subscriber alone.
pub fn init_logging(config: &MonitoringConfig) -> Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));

    let registry = tracing_subscriber::registry().with(env_filter);
    if config.json_logging {
        let _ = registry
            .with(tracing_subscriber::fmt::layer().json().with_target(false))
            .try_init();
    } else {
        let _ = registry
            .with(tracing_subscriber::fmt::layer().with_target(false))
            .try_init();
    }

    Ok(())
}
