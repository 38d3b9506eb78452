//! Tracing subscriber setup

use once_cell::sync::OnceCell;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;
use crate::error::ConfigError;

static INSTALLED: OnceCell<()> = OnceCell::new();

/// Install the global fmt subscriber.
///
/// `RUST_LOG` takes precedence over `config.level`. Returns `Ok(false)` when a
/// global subscriber was already installed.
pub fn init(config: &LoggingConfig) -> Result<bool, ConfigError> {
    if INSTALLED.get().is_some() {
        return Ok(false);
    }

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| ConfigError::Logging(e.to_string()))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    let installed = if config.json {
        builder.json().try_init().is_ok()
    } else {
        builder.try_init().is_ok()
    };

    if installed {
        let _ = INSTALLED.set(());
    }
    Ok(installed)
}
